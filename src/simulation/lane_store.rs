//! Authoritative record of the four lanes
//!
//! The store only ever accepts whole lane sets. A write that would leave the
//! lanes unchanged is dropped so that tasks reacting to commits do not wake
//! each other forever.

use log::debug;

use super::types::{LaneId, SignalState, LANE_ORDER};

/// State of one approach into the intersection
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id: LaneId,
    pub label: String,
    /// Externally supplied demand
    pub vehicle_count: u32,
    pub signal: SignalState,
    /// Seconds remaining in the current phase
    pub timer: f32,
    pub is_emergency: bool,
    /// Set by the ambulance bridge while the ambulance dwells at the stop line
    pub ambulance_at_front: bool,
}

impl Lane {
    pub fn new(id: LaneId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            vehicle_count: 0,
            signal: SignalState::Red,
            timer: 0.0,
            is_emergency: false,
            ambulance_at_front: false,
        }
    }

    pub fn is_green(&self) -> bool {
        self.signal.is_green()
    }

    /// Force this lane red with no time left
    pub fn set_red(&mut self) {
        self.signal = SignalState::Red;
        self.timer = 0.0;
    }

    pub fn set_green(&mut self, timer: f32) {
        self.signal = SignalState::Green;
        self.timer = timer.max(0.0);
    }
}

/// The full lane set, indexed by `LaneId::index`
pub type Lanes = [Lane; 4];

/// Build the default lane set with the intersection's approach names
pub fn default_lanes() -> Lanes {
    LANE_ORDER.map(|id| {
        let label = match id {
            LaneId::Lane1 => "North Approach",
            LaneId::Lane2 => "East Approach",
            LaneId::Lane3 => "South Approach",
            LaneId::Lane4 => "West Approach",
        };
        Lane::new(id, label)
    })
}

/// Single-writer store of the lane set
#[derive(Debug, Clone)]
pub struct LaneStore {
    lanes: Lanes,
    /// Bumped on every committed change
    revision: u64,
}

impl Default for LaneStore {
    fn default() -> Self {
        Self::new(default_lanes())
    }
}

impl LaneStore {
    pub fn new(lanes: Lanes) -> Self {
        Self { lanes, revision: 0 }
    }

    pub fn lanes(&self) -> &Lanes {
        &self.lanes
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id.index()]
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the whole lane set. Returns `false` when `next` equals the
    /// current lanes and nothing was written.
    pub fn commit(&mut self, next: Lanes) -> bool {
        if next == self.lanes {
            return false;
        }
        self.lanes = next;
        self.revision += 1;
        debug!("Lane store committed revision {}", self.revision);
        true
    }
}
