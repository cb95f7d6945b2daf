//! Core types for the intersection simulation
//!
//! These are plain data types shared by the lane store, the vehicle queues
//! and the scheduler.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// One of the four approaches into the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneId {
    Lane1,
    Lane2,
    Lane3,
    Lane4,
}

/// Fixed cyclic order of the lanes, also used to break ties
pub const LANE_ORDER: [LaneId; 4] = [LaneId::Lane1, LaneId::Lane2, LaneId::Lane3, LaneId::Lane4];

impl LaneId {
    /// Position of this lane in `LANE_ORDER`
    pub fn index(self) -> usize {
        match self {
            LaneId::Lane1 => 0,
            LaneId::Lane2 => 1,
            LaneId::Lane3 => 2,
            LaneId::Lane4 => 3,
        }
    }

    /// The lane after this one in the cyclic order
    pub fn next(self) -> LaneId {
        LANE_ORDER[(self.index() + 1) % LANE_ORDER.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LaneId::Lane1 => "lane_1",
            LaneId::Lane2 => "lane_2",
            LaneId::Lane3 => "lane_3",
            LaneId::Lane4 => "lane_4",
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaneId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lane_1" | "1" => Ok(LaneId::Lane1),
            "lane_2" | "2" => Ok(LaneId::Lane2),
            "lane_3" | "3" => Ok(LaneId::Lane3),
            "lane_4" | "4" => Ok(LaneId::Lane4),
            other => bail!("Unknown lane '{}', expected lane_1..lane_4", other),
        }
    }
}

/// What a citizen reported on an approach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentKind {
    Accident,
    Breakdown,
    Roadworks,
    Waterlogging,
}

impl IncidentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentKind::Accident => "accident",
            IncidentKind::Breakdown => "breakdown",
            IncidentKind::Roadworks => "roadworks",
            IncidentKind::Waterlogging => "waterlogging",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accident" => Ok(IncidentKind::Accident),
            "breakdown" => Ok(IncidentKind::Breakdown),
            "roadworks" => Ok(IncidentKind::Roadworks),
            "waterlogging" => Ok(IncidentKind::Waterlogging),
            other => bail!("Unknown incident '{}'", other),
        }
    }
}

/// Signal shown to a lane
///
/// `Yellow` is part of the signal vocabulary but the scheduler never
/// transitions through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalState {
    #[default]
    Red,
    Yellow,
    Green,
}

impl SignalState {
    pub fn is_green(self) -> bool {
        self == SignalState::Green
    }
}

/// A wrapper type for vehicle IDs, unique within a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

/// Logical simulation time in milliseconds since start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1000)
    }

    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / 1000.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn add_millis(self, millis: u64) -> SimTime {
        SimTime(self.0 + millis)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s", self.as_secs_f32())
    }
}
