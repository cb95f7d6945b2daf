//! Shared helpers for the integration tests

#![allow(dead_code)]

use junction_sim::simulation::{default_lanes, LaneId, LaneQueue, Lanes, SignalState, VehicleQueues, LANE_ORDER};

/// Lane set built from `(count, signal, timer)` per lane in `LANE_ORDER`
pub fn lanes_from(setup: [(u32, SignalState, f32); 4]) -> Lanes {
    let mut lanes = default_lanes();
    for (lane, (count, signal, timer)) in lanes.iter_mut().zip(setup) {
        lane.vehicle_count = count;
        lane.signal = signal;
        lane.timer = timer;
    }
    lanes
}

pub fn green_lanes(lanes: &Lanes) -> Vec<LaneId> {
    lanes.iter().filter(|l| l.is_green()).map(|l| l.id).collect()
}

/// Active positions are exactly 0..n, ids are unique and at most one
/// active vehicle is the ambulance
pub fn assert_queue_consistent(queue: &LaneQueue) {
    let mut positions: Vec<u32> = queue.active().iter().map(|v| v.queue_position).collect();
    positions.sort_unstable();
    let expected: Vec<u32> = (0..positions.len() as u32).collect();
    assert_eq!(positions, expected, "{} positions are not contiguous", queue.lane);

    let mut ids: Vec<_> = queue.vehicles().iter().map(|v| v.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), queue.vehicles().len(), "{} has duplicate vehicle ids", queue.lane);

    let ambulances = queue
        .vehicles()
        .iter()
        .filter(|v| v.is_active() && v.is_emergency_vehicle)
        .count();
    assert!(ambulances <= 1, "{} has {} ambulances", queue.lane, ambulances);
}

pub fn assert_queues_consistent(queues: &VehicleQueues) {
    for id in LANE_ORDER {
        assert_queue_consistent(queues.lane(id));
    }
}

pub fn assert_lanes_consistent(lanes: &Lanes) {
    assert!(green_lanes(lanes).len() <= 1, "More than one green lane: {:?}", green_lanes(lanes));
    for lane in lanes {
        assert!(lane.timer >= 0.0, "{} has negative timer {}", lane.id, lane.timer);
    }
}
