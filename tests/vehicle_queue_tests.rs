//! Vehicle queue reconciliation tests

mod common;

use common::assert_queue_consistent;
use junction_sim::simulation::{LaneId, LaneQueue, QueueEvent, SignalConfig, SimTime, VehicleId};

fn reconcile(queue: &mut LaneQueue, target: u32, emergency: bool, at_ms: u64) -> Vec<QueueEvent> {
    let mut events = Vec::new();
    queue.reconcile(target, emergency, SimTime(at_ms), &SignalConfig::default(), &mut events);
    assert_queue_consistent(queue);
    events
}

#[test]
fn test_arrivals_append_at_back() {
    let mut queue = LaneQueue::new(LaneId::Lane1);
    reconcile(&mut queue, 3, false, 0);
    reconcile(&mut queue, 5, false, 100);

    let active = queue.active();
    assert_eq!(active.len(), 5);
    for (position, vehicle) in active.iter().enumerate() {
        assert_eq!(vehicle.queue_position, position as u32);
        assert_eq!(vehicle.id, VehicleId(position));
    }
}

#[test]
fn test_departures_leave_from_head_and_shift_queue() {
    let mut queue = LaneQueue::new(LaneId::Lane2);
    reconcile(&mut queue, 5, false, 0);
    reconcile(&mut queue, 2, false, 500);

    let exiting: Vec<_> = queue.vehicles().iter().filter(|v| v.exiting).collect();
    assert_eq!(exiting.len(), 3);
    assert!(exiting.iter().all(|v| v.exited_at == Some(SimTime(500))));
    assert!(exiting.iter().all(|v| v.id.0 < 3));

    let active = queue.active();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].id, VehicleId(3));
    assert_eq!(active[0].queue_position, 0);
    assert_eq!(active[1].id, VehicleId(4));
    assert_eq!(active[1].queue_position, 1);
}

#[test]
fn test_add_then_remove_returns_to_starting_count() {
    let mut queue = LaneQueue::new(LaneId::Lane3);
    reconcile(&mut queue, 3, false, 0);
    reconcile(&mut queue, 7, false, 100);
    reconcile(&mut queue, 3, false, 200);

    assert_eq!(queue.active_count(), 3);
    assert!(queue
        .active()
        .iter()
        .all(|v| !v.is_emergency_vehicle && v.stopped_at_front.is_none()));
}

#[test]
fn test_unchanged_target_is_a_no_op() {
    let mut queue = LaneQueue::new(LaneId::Lane1);
    let config = SignalConfig::default();
    let mut events = Vec::new();
    assert!(queue.reconcile(4, false, SimTime(0), &config, &mut events));
    assert!(!queue.reconcile(4, false, SimTime(100), &config, &mut events));
}

#[test]
fn test_ambulance_is_placed_at_the_tail() {
    let mut queue = LaneQueue::new(LaneId::Lane3);
    reconcile(&mut queue, 3, false, 0);
    let events = reconcile(&mut queue, 4, true, 100);

    let ambulance = queue.ambulance().expect("ambulance designated");
    assert_eq!(ambulance.queue_position, 3);
    assert_eq!(ambulance.id, VehicleId(3));
    assert!(ambulance.stopped_at_front.is_none());
    assert_eq!(
        events,
        vec![QueueEvent::AmbulanceDesignated {
            lane: LaneId::Lane3,
            vehicle: VehicleId(3)
        }]
    );
}

#[test]
fn test_adding_more_vehicles_keeps_one_ambulance() {
    let mut queue = LaneQueue::new(LaneId::Lane3);
    reconcile(&mut queue, 2, true, 0);
    reconcile(&mut queue, 6, true, 100);

    let ambulance = queue.ambulance().expect("ambulance designated");
    assert_eq!(ambulance.queue_position, 1);
}

#[test]
fn test_emergency_flag_without_new_arrivals_designates_tail() {
    let mut queue = LaneQueue::new(LaneId::Lane4);
    reconcile(&mut queue, 3, false, 0);
    reconcile(&mut queue, 3, true, 100);

    let ambulance = queue.ambulance().expect("ambulance designated");
    assert_eq!(ambulance.queue_position, 2);
}

#[test]
fn test_ambulance_reaching_front_starts_dwell() {
    let mut queue = LaneQueue::new(LaneId::Lane3);
    reconcile(&mut queue, 2, false, 0);
    reconcile(&mut queue, 3, true, 100);
    let events = reconcile(&mut queue, 1, true, 2_000);

    let ambulance = queue.ambulance().expect("ambulance still queued");
    assert_eq!(ambulance.queue_position, 0);
    assert_eq!(ambulance.stopped_at_front, Some(SimTime(2_000)));
    assert!(events.contains(&QueueEvent::DwellStarted {
        lane: LaneId::Lane3,
        vehicle: ambulance.id
    }));
}

#[test]
fn test_ambulance_in_empty_lane_dwells_immediately() {
    let mut queue = LaneQueue::new(LaneId::Lane1);
    reconcile(&mut queue, 1, true, 500);

    let ambulance = queue.ambulance().expect("ambulance designated");
    assert_eq!(ambulance.queue_position, 0);
    assert_eq!(ambulance.stopped_at_front, Some(SimTime(500)));
}

#[test]
fn test_dwelling_ambulance_is_not_removed_or_shifted() {
    let mut queue = LaneQueue::new(LaneId::Lane3);
    reconcile(&mut queue, 1, true, 0);
    reconcile(&mut queue, 4, true, 1_000);
    // Three cars queue up behind the ambulance, two of them leave
    reconcile(&mut queue, 2, true, 3_000);

    let active = queue.active();
    assert_eq!(active.len(), 2);
    assert!(active[0].is_emergency_vehicle);
    assert_eq!(active[0].queue_position, 0);
    assert_eq!(active[1].id, VehicleId(3));
    assert_eq!(active[1].queue_position, 1);
}

#[test]
fn test_dwelling_ambulance_survives_lane_clear() {
    let mut queue = LaneQueue::new(LaneId::Lane2);
    reconcile(&mut queue, 1, true, 0);
    reconcile(&mut queue, 0, true, 4_000);

    let ambulance = queue.ambulance().expect("ambulance held at stop line");
    assert_eq!(ambulance.queue_position, 0);
    assert!(!ambulance.exiting);
}

#[test]
fn test_dwell_expires_and_is_not_restarted() {
    let mut queue = LaneQueue::new(LaneId::Lane3);
    reconcile(&mut queue, 1, true, 0);

    reconcile(&mut queue, 1, true, 9_999);
    assert_eq!(queue.ambulance().and_then(|a| a.stopped_at_front), Some(SimTime(0)));

    let events = reconcile(&mut queue, 1, true, 10_000);
    let ambulance = queue.ambulance().expect("ambulance still queued");
    assert!(ambulance.stopped_at_front.is_none());
    assert!(ambulance.dwell_released);
    assert!(matches!(events.as_slice(), [QueueEvent::DwellReleased { .. }]));

    reconcile(&mut queue, 1, true, 11_000);
    let ambulance = queue.ambulance().expect("ambulance still queued");
    assert!(ambulance.stopped_at_front.is_none());

    // Released ambulance leaves on the next count decrease
    reconcile(&mut queue, 0, true, 12_000);
    assert_eq!(queue.active_count(), 0);
}

#[test]
fn test_cancelled_emergency_strips_ambulance() {
    let mut queue = LaneQueue::new(LaneId::Lane4);
    reconcile(&mut queue, 1, true, 0);
    reconcile(&mut queue, 1, false, 1_000);

    assert!(queue.ambulance().is_none());
    assert!(queue
        .active()
        .iter()
        .all(|v| v.stopped_at_front.is_none() && !v.dwell_released));
}

#[test]
fn test_finished_exit_animations_are_pruned() {
    let config = SignalConfig::default();
    let mut queue = LaneQueue::new(LaneId::Lane1);
    reconcile(&mut queue, 3, false, 0);
    reconcile(&mut queue, 1, false, 1_000);
    assert_eq!(queue.vehicles().len(), 3);

    assert!(!queue.prune(SimTime(1_999), &config));
    assert_eq!(queue.vehicles().len(), 3);

    assert!(queue.prune(SimTime(2_000), &config));
    assert_eq!(queue.vehicles().len(), 1);
    assert_eq!(queue.active_count(), 1);
}
