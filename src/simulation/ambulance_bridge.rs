//! Feeds the ambulance's queue position back into the lane store
//!
//! The scheduler only sees lanes, never vehicles. While the ambulance waits
//! at the stop line its lane carries `ambulance_at_front`, which makes the
//! scheduler pin the emergency timer.

use super::config::SignalConfig;
use super::lane_store::{Lane, Lanes};
use super::types::SimTime;
use super::vehicle_queue::{LaneQueue, VehicleQueues};

/// Whether the lane's ambulance is at the head of the queue and still owed
/// dwell time
pub fn ambulance_at_front(lane: &Lane, queue: &LaneQueue, now: SimTime, config: &SignalConfig) -> bool {
    if !lane.is_emergency {
        return false;
    }
    queue.ambulance().is_some_and(|ambulance| {
        ambulance.queue_position == 0
            && !ambulance.dwell_released
            && ambulance
                .stopped_at_front
                .is_none_or(|since| now.since(since) < config.ambulance_stop_duration_ms)
    })
}

/// Lane set with `ambulance_at_front` re-derived from the queues, or `None`
/// when every lane already holds the derived value
pub fn sync(lanes: &Lanes, queues: &VehicleQueues, now: SimTime, config: &SignalConfig) -> Option<Lanes> {
    let mut next = lanes.clone();
    let mut changed = false;

    for lane in next.iter_mut() {
        let derived = ambulance_at_front(lane, queues.lane(lane.id), now, config);
        if lane.ambulance_at_front != derived {
            lane.ambulance_at_front = derived;
            changed = true;
        }
    }

    changed.then_some(next)
}
