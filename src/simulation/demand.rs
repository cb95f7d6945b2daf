//! Demand input for the intersection
//!
//! Detector readings arrive as text (`lane_2=7`) and are validated here
//! before they become commands. For headless runs a seeded random generator
//! stands in for the detectors.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;

use super::snapshot::Snapshot;
use super::types::{LaneId, SimTime, LANE_ORDER};
use super::world::Command;

/// A vehicle count reported for one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandUpdate {
    pub lane: LaneId,
    pub count: u32,
}

impl DemandUpdate {
    pub fn into_command(self) -> Command {
        Command::SetVehicleCount {
            lane: self.lane,
            count: self.count,
        }
    }
}

impl FromStr for DemandUpdate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (lane, count) = s
            .split_once('=')
            .with_context(|| format!("Expected LANE=COUNT, got '{}'", s))?;
        let lane: LaneId = lane.parse()?;
        let count: i64 = count
            .trim()
            .parse()
            .with_context(|| format!("Invalid vehicle count '{}' for {}", count.trim(), lane))?;
        if count < 0 {
            bail!("Vehicle count for {} cannot be negative ({})", lane, count);
        }
        let count = u32::try_from(count).with_context(|| format!("Vehicle count for {} is too large", lane))?;
        Ok(Self { lane, count })
    }
}

/// Random arrivals and departures for a headless run
pub struct RandomDemand {
    /// Optional seeded RNG for reproducible runs
    rng: Option<StdRng>,
    /// Chance per lane per second that one vehicle arrives
    pub arrival_rate: f64,
    /// Chance per second that the green lane lets one vehicle through
    pub discharge_rate: f64,
    /// Raise an emergency on a random lane this often (ms)
    pub emergency_every_ms: Option<u64>,
    last_emergency: SimTime,
}

impl RandomDemand {
    fn new_internal(rng: Option<StdRng>, arrival_rate: f64, discharge_rate: f64) -> Self {
        Self {
            rng,
            arrival_rate: arrival_rate.clamp(0.0, 1.0),
            discharge_rate: discharge_rate.clamp(0.0, 1.0),
            emergency_every_ms: None,
            last_emergency: SimTime::ZERO,
        }
    }

    pub fn new(arrival_rate: f64, discharge_rate: f64) -> Self {
        Self::new_internal(None, arrival_rate, discharge_rate)
    }

    /// Create a generator with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64, arrival_rate: f64, discharge_rate: f64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)), arrival_rate, discharge_rate)
    }

    pub fn with_emergencies_every(mut self, secs: u64) -> Self {
        self.emergency_every_ms = (secs > 0).then_some(secs * 1000);
        self
    }

    fn random_bool(&mut self, p: f64) -> bool {
        match &mut self.rng {
            Some(rng) => rng.random_bool(p),
            None => rand::rng().random_bool(p),
        }
    }

    fn random_lane(&mut self) -> LaneId {
        let index = match &mut self.rng {
            Some(rng) => rng.random_range(0..LANE_ORDER.len()),
            None => rand::rng().random_range(0..LANE_ORDER.len()),
        };
        LANE_ORDER[index]
    }

    /// Demand commands for the next second, given the current state
    pub fn generate(&mut self, snapshot: &Snapshot) -> Vec<Command> {
        let lanes = &snapshot.lanes;
        let now = snapshot.time;
        let mut commands = Vec::new();

        if let Some(green) = lanes.iter().find(|l| l.is_green()) {
            // The ambulance leaves through the scheduler, not as a discharge
            let ambulance_first = green.is_emergency
                && snapshot
                    .lane_vehicles(green.id)
                    .iter()
                    .any(|v| v.is_active() && v.is_emergency_vehicle && v.queue_position == 0);
            if green.vehicle_count > 0 && !ambulance_first && self.random_bool(self.discharge_rate) {
                commands.push(Command::SetVehicleCount {
                    lane: green.id,
                    count: green.vehicle_count - 1,
                });
            }
        }

        for lane in LANE_ORDER {
            if self.random_bool(self.arrival_rate) {
                commands.push(Command::AddTraffic { lane, amount: 1 });
            }
        }

        if let Some(every) = self.emergency_every_ms {
            let any_emergency = lanes.iter().any(|l| l.is_emergency);
            if !any_emergency && now.since(self.last_emergency) >= every {
                self.last_emergency = now;
                commands.push(Command::ToggleEmergency(self.random_lane()));
            }
        }

        commands
    }
}
