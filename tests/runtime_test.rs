//! Threaded runtime tests

mod common;

use common::{assert_lanes_consistent, assert_queues_consistent, green_lanes};
use junction_sim::simulation::{spawn, Command, Intersection, LaneId, SignalConfig};
use std::thread;
use std::time::Duration;

fn fast_config() -> SignalConfig {
    SignalConfig {
        scheduler_tick_ms: 20,
        prune_interval_ms: 10,
        ambulance_poll_interval_ms: 10,
        ..SignalConfig::default()
    }
}

#[test]
fn test_runtime_applies_commands_and_ticks() {
    let handle = spawn(Intersection::new(fast_config())).expect("runtime starts");
    handle
        .send(Command::SetVehicleCount {
            lane: LaneId::Lane3,
            count: 4,
        })
        .expect("command accepted");

    thread::sleep(Duration::from_millis(200));
    let snapshot = handle.snapshot().expect("snapshot answered");

    assert_eq!(snapshot.lanes[LaneId::Lane3.index()].vehicle_count, 4);
    assert_eq!(snapshot.lane_vehicles(LaneId::Lane3).len(), 4);
    assert!(snapshot.stats.scheduler_ticks > 0);
    assert_eq!(green_lanes(&snapshot.lanes).len(), 1);

    let intersection = handle.shutdown().expect("clean shutdown");
    assert_lanes_consistent(intersection.lanes());
    assert_queues_consistent(intersection.queues());
}

#[test]
fn test_runtime_preempts_for_emergency() {
    let handle = spawn(Intersection::new(fast_config())).expect("runtime starts");
    handle
        .send(Command::SetVehicleCount {
            lane: LaneId::Lane1,
            count: 6,
        })
        .expect("command accepted");
    handle
        .send(Command::ToggleEmergency(LaneId::Lane4))
        .expect("command accepted");

    thread::sleep(Duration::from_millis(200));
    let snapshot = handle.snapshot().expect("snapshot answered");
    assert_eq!(snapshot.green_lane(), Some(LaneId::Lane4));
    assert_eq!(snapshot.emergency_lane(), Some(LaneId::Lane4));
    assert!(snapshot.lanes[LaneId::Lane4.index()].ambulance_at_front);

    handle.shutdown().expect("clean shutdown");
}

#[test]
fn test_dropped_handle_stops_runtime() {
    let handle = spawn(Intersection::default()).expect("runtime starts");
    handle.send(Command::SchedulerTick).expect("command accepted");
    drop(handle);
}
