//! Running totals for a simulation session

use super::lane_store::Lanes;

/// Counters updated by the intersection as commands are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub scheduler_ticks: u64,
    pub phase_changes: u64,
    pub preemptions: u64,
    pub emergencies_cleared: u64,
    /// Vehicles added to any lane
    pub vehicles_arrived: u64,
    /// Vehicles that left a lane while it was green, the ambulance included.
    /// Resets of a red lane are not departures.
    pub vehicles_departed: u64,
    pub elapsed_time: f32,
}

impl SimulationStats {
    /// Share of arrived vehicles that have left again, in percent
    pub fn throughput_rate(&self) -> f32 {
        if self.vehicles_arrived > 0 {
            (self.vehicles_departed as f32 / self.vehicles_arrived as f32) * 100.0
        } else {
            0.0
        }
    }

    /// Account for the vehicle count changes between two committed lane sets
    pub fn record_lane_changes(&mut self, before: &Lanes, after: &Lanes) {
        for (old, new) in before.iter().zip(after.iter()) {
            if new.vehicle_count > old.vehicle_count {
                self.vehicles_arrived += u64::from(new.vehicle_count - old.vehicle_count);
            } else if old.is_green() {
                self.vehicles_departed += u64::from(old.vehicle_count - new.vehicle_count);
            }
        }
    }
}
