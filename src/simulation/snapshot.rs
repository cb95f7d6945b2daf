//! Read-only view of the intersection handed to display and telemetry code

use super::events::TrafficEvent;
use super::lane_store::Lanes;
use super::stats::SimulationStats;
use super::types::{LaneId, SignalState, SimTime, LANE_ORDER};
use super::vehicle_queue::Vehicle;

/// Owned copy of the intersection state at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub time: SimTime,
    pub lanes: Lanes,
    /// Tracked vehicles per lane, indexed by `LaneId::index`
    pub vehicles: [Vec<Vehicle>; 4],
    /// Newest first
    pub events: Vec<TrafficEvent>,
    pub stats: SimulationStats,
}

impl Snapshot {
    pub fn lane_vehicles(&self, id: LaneId) -> &[Vehicle] {
        &self.vehicles[id.index()]
    }

    pub fn green_lane(&self) -> Option<LaneId> {
        self.lanes.iter().find(|l| l.is_green()).map(|l| l.id)
    }

    pub fn emergency_lane(&self) -> Option<LaneId> {
        self.lanes.iter().find(|l| l.is_emergency).map(|l| l.id)
    }

    /// Print a summary of the intersection state
    pub fn print_summary(&self) {
        println!("=== Intersection Summary ===");
        println!("Time: {}", self.time);
        for lane in &self.lanes {
            let signal = match lane.signal {
                SignalState::Green => "GREEN",
                SignalState::Yellow => "YELLOW",
                SignalState::Red => "red",
            };
            println!(
                "  {} ({}): {:>6} timer={:>4.0}s vehicles={}{}{}",
                lane.id,
                lane.label,
                signal,
                lane.timer,
                lane.vehicle_count,
                if lane.is_emergency { " EMERGENCY" } else { "" },
                if lane.ambulance_at_front {
                    " (ambulance at stop line)"
                } else {
                    ""
                }
            );
        }
        println!(
            "Phase changes: {}, Preemptions: {}, Arrived: {}, Departed: {}",
            self.stats.phase_changes,
            self.stats.preemptions,
            self.stats.vehicles_arrived,
            self.stats.vehicles_departed
        );
        if !self.events.is_empty() {
            println!("--- Recent Events ---");
            for event in self.events.iter().take(5) {
                println!("  [{}] {}", event.at, event.message);
            }
        }
    }

    /// Draw the queues as one text row per lane, head of queue on the left
    ///
    /// `A` marks the ambulance, `o` a waiting car, `.` a car pulling away.
    pub fn draw_map(&self) {
        for id in LANE_ORDER {
            let lane = &self.lanes[id.index()];
            let light = if lane.is_green() { 'G' } else { 'R' };

            let mut queue: Vec<&Vehicle> = self.vehicles[id.index()]
                .iter()
                .filter(|v| v.is_active())
                .collect();
            queue.sort_by_key(|v| v.queue_position);

            let active: String = queue
                .iter()
                .map(|v| if v.is_emergency_vehicle { 'A' } else { 'o' })
                .collect();
            let exiting = self.vehicles[id.index()]
                .iter()
                .filter(|v| v.exiting)
                .count();

            println!("{} [{}]|{}{}", id, light, ".".repeat(exiting), active);
        }
    }
}
