//! Per-lane vehicle queues
//!
//! The lane store only knows how many vehicles wait in a lane. This module
//! keeps an identity for each of them so that a display can animate arrivals
//! and departures, and so that the ambulance can be followed from the back of
//! the queue to the stop line.

use log::debug;

use super::config::SignalConfig;
use super::lane_store::Lanes;
use super::types::{LaneId, SimTime, VehicleId, LANE_ORDER};

/// A vehicle waiting in (or just leaving) a lane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    /// 0 is the head of the queue
    pub queue_position: u32,
    pub is_emergency_vehicle: bool,
    pub exiting: bool,
    pub exited_at: Option<SimTime>,
    /// When the ambulance first reached the head of the queue
    pub stopped_at_front: Option<SimTime>,
    /// The ambulance already served its dwell and may leave
    pub dwell_released: bool,
}

impl Vehicle {
    fn new(id: VehicleId, queue_position: u32) -> Self {
        Self {
            id,
            queue_position,
            is_emergency_vehicle: false,
            exiting: false,
            exited_at: None,
            stopped_at_front: None,
            dwell_released: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.exiting
    }

    /// Exit animation finished, the vehicle can be dropped
    pub fn exit_finished(&self, now: SimTime, config: &SignalConfig) -> bool {
        self.exiting
            && self
                .exited_at
                .is_none_or(|t| now.since(t) >= config.exit_animation_duration_ms)
    }

    /// Ambulance stopped at the head of the queue with dwell time left
    pub fn is_dwelling(&self, now: SimTime, config: &SignalConfig) -> bool {
        self.is_active()
            && self.is_emergency_vehicle
            && self.queue_position == 0
            && self
                .stopped_at_front
                .is_some_and(|t| now.since(t) < config.ambulance_stop_duration_ms)
    }

    fn mark_exiting(&mut self, now: SimTime) {
        self.exiting = true;
        self.exited_at = Some(now);
        self.stopped_at_front = None;
    }

    fn clear_emergency(&mut self) {
        self.is_emergency_vehicle = false;
        self.stopped_at_front = None;
        self.dwell_released = false;
    }
}

/// Notable changes produced while reconciling a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    AmbulanceDesignated { lane: LaneId, vehicle: VehicleId },
    DwellStarted { lane: LaneId, vehicle: VehicleId },
    DwellReleased { lane: LaneId, vehicle: VehicleId },
}

/// Tracked vehicles of one lane
#[derive(Debug, Clone)]
pub struct LaneQueue {
    pub lane: LaneId,
    vehicles: Vec<Vehicle>,
    next_id: usize,
}

impl LaneQueue {
    pub fn new(lane: LaneId) -> Self {
        Self {
            lane,
            vehicles: Vec::new(),
            next_id: 0,
        }
    }

    /// Every tracked vehicle, exiting ones included
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Non-exiting vehicles ordered by queue position
    pub fn active(&self) -> Vec<&Vehicle> {
        let mut active: Vec<&Vehicle> = self.vehicles.iter().filter(|v| v.is_active()).collect();
        active.sort_by_key(|v| v.queue_position);
        active
    }

    pub fn active_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.is_active()).count()
    }

    pub fn ambulance(&self) -> Option<&Vehicle> {
        self.vehicles
            .iter()
            .find(|v| v.is_active() && v.is_emergency_vehicle)
    }

    fn allocate_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Drop vehicles whose exit animation is over. Returns `true` if any were
    /// dropped.
    pub fn prune(&mut self, now: SimTime, config: &SignalConfig) -> bool {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| !v.exit_finished(now, config));
        self.vehicles.len() != before
    }

    /// Bring the queue in line with the lane's `target` count and emergency
    /// flag. Returns `true` if the tracked set changed.
    pub fn reconcile(
        &mut self,
        target: u32,
        is_emergency: bool,
        now: SimTime,
        config: &SignalConfig,
        events: &mut Vec<QueueEvent>,
    ) -> bool {
        let mut next = self.vehicles.clone();
        next.retain(|v| !v.exit_finished(now, config));

        let active_count = next.iter().filter(|v| v.is_active()).count() as u32;

        if target > active_count {
            let has_ambulance = next.iter().any(|v| v.is_active() && v.is_emergency_vehicle);
            for position in active_count..target {
                let mut vehicle = Vehicle::new(self.allocate_id(), position);
                if is_emergency && !has_ambulance && position == target - 1 {
                    vehicle.is_emergency_vehicle = true;
                    events.push(QueueEvent::AmbulanceDesignated {
                        lane: self.lane,
                        vehicle: vehicle.id,
                    });
                }
                next.push(vehicle);
            }
        } else if target < active_count {
            remove_from_head(&mut next, active_count - target, now, config);
        }

        maintain_ambulance(self.lane, &mut next, is_emergency, now, config, events);

        if next == self.vehicles {
            return false;
        }
        self.vehicles = next;
        true
    }
}

/// Mark the `count` vehicles nearest the stop line as exiting and move the
/// rest forward. An ambulance still dwelling at the head stays put and the
/// vehicles right behind it leave instead.
fn remove_from_head(vehicles: &mut [Vehicle], count: u32, now: SimTime, config: &SignalConfig) {
    let held = vehicles.iter().any(|v| v.is_dwelling(now, config));
    let offset = u32::from(held);

    for vehicle in vehicles.iter_mut().filter(|v| v.is_active()) {
        if held && vehicle.queue_position == 0 {
            continue;
        }
        let rank = vehicle.queue_position - offset;
        if rank < count {
            if vehicle.is_emergency_vehicle && vehicle.stopped_at_front.is_some() {
                vehicle.dwell_released = true;
            }
            vehicle.mark_exiting(now);
        } else {
            vehicle.queue_position -= count;
        }
    }
}

fn maintain_ambulance(
    lane: LaneId,
    vehicles: &mut [Vehicle],
    is_emergency: bool,
    now: SimTime,
    config: &SignalConfig,
    events: &mut Vec<QueueEvent>,
) {
    if !is_emergency {
        for vehicle in vehicles.iter_mut().filter(|v| v.is_active()) {
            vehicle.clear_emergency();
        }
        return;
    }

    let has_ambulance = vehicles.iter().any(|v| v.is_active() && v.is_emergency_vehicle);
    if !has_ambulance {
        // Flag raised without new arrivals: the tail vehicle is the ambulance
        if let Some(tail) = vehicles
            .iter_mut()
            .filter(|v| v.is_active())
            .max_by_key(|v| v.queue_position)
        {
            tail.is_emergency_vehicle = true;
            events.push(QueueEvent::AmbulanceDesignated {
                lane,
                vehicle: tail.id,
            });
        }
    }

    let Some(ambulance) = vehicles
        .iter_mut()
        .find(|v| v.is_active() && v.is_emergency_vehicle)
    else {
        return;
    };

    match ambulance.stopped_at_front {
        None if ambulance.queue_position == 0 && !ambulance.dwell_released => {
            ambulance.stopped_at_front = Some(now);
            events.push(QueueEvent::DwellStarted {
                lane,
                vehicle: ambulance.id,
            });
        }
        Some(since) if now.since(since) >= config.ambulance_stop_duration_ms => {
            ambulance.stopped_at_front = None;
            ambulance.dwell_released = true;
            events.push(QueueEvent::DwellReleased {
                lane,
                vehicle: ambulance.id,
            });
        }
        _ => {}
    }
}

/// Vehicle queues of all four lanes
#[derive(Debug, Clone)]
pub struct VehicleQueues {
    queues: [LaneQueue; 4],
}

impl Default for VehicleQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleQueues {
    pub fn new() -> Self {
        Self {
            queues: LANE_ORDER.map(LaneQueue::new),
        }
    }

    pub fn lane(&self, id: LaneId) -> &LaneQueue {
        &self.queues[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaneQueue> {
        self.queues.iter()
    }

    /// Reconcile every lane against the lane store. Returns `true` if any
    /// lane's vehicles changed.
    pub fn reconcile_all(
        &mut self,
        lanes: &Lanes,
        now: SimTime,
        config: &SignalConfig,
        events: &mut Vec<QueueEvent>,
    ) -> bool {
        let mut changed = false;
        for (queue, lane) in self.queues.iter_mut().zip(lanes.iter()) {
            if queue.reconcile(lane.vehicle_count, lane.is_emergency, now, config, events) {
                debug!(
                    "Queue {} now holds {} active vehicles",
                    lane.id,
                    queue.active_count()
                );
                changed = true;
            }
        }
        changed
    }

    /// Periodic sweep that only drops finished exit animations
    pub fn prune_all(&mut self, now: SimTime, config: &SignalConfig) -> bool {
        let mut changed = false;
        for queue in self.queues.iter_mut() {
            changed |= queue.prune(now, config);
        }
        changed
    }
}
