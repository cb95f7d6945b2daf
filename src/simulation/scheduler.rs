//! Adaptive signal scheduler
//!
//! One call to [`tick`] is one scheduler period. It is a pure function of the
//! current lane set; the caller commits the result to the lane store.

use super::config::SignalConfig;
use super::lane_store::{Lane, Lanes};
use super::types::{LaneId, LANE_ORDER};

/// What a scheduler tick decided, used for logging and the event log
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerDecision {
    /// Emergency lane forced green and every other lane red
    Preempted(LaneId),
    /// Ambulance dwelling at the stop line, timer pinned
    AmbulanceHold(LaneId),
    /// Emergency green counting down
    EmergencyCountdown(LaneId),
    /// Emergency green ran out, the ambulance has left
    EmergencyCleared(LaneId),
    /// No lane was green, the busiest lane got the phase
    InitialGreen(LaneId),
    /// Empty green lane cut short because others are waiting
    EarlyRelease(LaneId),
    Countdown(LaneId),
    /// Green ran out but only the current lane has traffic
    Extended(LaneId),
    /// Every lane was empty, phase moved on in cyclic order
    RoundRobin { from: LaneId, to: LaneId },
    /// Green ran out and the busiest waiting lane took over
    Switched { from: LaneId, to: LaneId },
}

impl SchedulerDecision {
    /// Whether this decision moved the green phase to a different lane
    pub fn changes_phase(&self) -> bool {
        matches!(
            self,
            SchedulerDecision::Preempted(_)
                | SchedulerDecision::InitialGreen(_)
                | SchedulerDecision::RoundRobin { .. }
                | SchedulerDecision::Switched { .. }
        )
    }
}

/// Lane with the highest vehicle count; ties go to the earlier lane in
/// `LANE_ORDER`
fn busiest<'a>(lanes: impl Iterator<Item = &'a Lane>) -> Option<&'a Lane> {
    let mut best: Option<&'a Lane> = None;
    for lane in lanes {
        if best.is_none_or(|b| lane.vehicle_count > b.vehicle_count) {
            best = Some(lane);
        }
    }
    best
}

/// Make `id` the only green lane with `timer` seconds
fn grant_green(lanes: &Lanes, id: LaneId, timer: f32) -> Lanes {
    let mut next = lanes.clone();
    for lane in next.iter_mut() {
        if lane.id == id {
            lane.set_green(timer);
        } else {
            lane.set_red();
        }
    }
    next
}

/// Advance the signal state machine by one period
pub fn tick(lanes: &Lanes, config: &SignalConfig) -> (Lanes, SchedulerDecision) {
    // First flagged lane in cyclic order wins if several are flagged
    if let Some(emergency) = LANE_ORDER
        .iter()
        .map(|id| &lanes[id.index()])
        .find(|l| l.is_emergency)
    {
        return emergency_tick(lanes, emergency, config);
    }

    let Some(current) = lanes.iter().find(|l| l.is_green()) else {
        // Lanes are never empty, busiest always finds one
        let id = busiest(lanes.iter()).map_or(LaneId::Lane1, |l| l.id);
        let count = lanes[id.index()].vehicle_count;
        return (
            grant_green(lanes, id, config.green_time_for(count)),
            SchedulerDecision::InitialGreen(id),
        );
    };

    let green_id = current.id;
    let others_waiting = lanes
        .iter()
        .any(|l| l.id != green_id && l.vehicle_count > 0);

    // Granting the current lane again also forces any stray second green red
    if current.vehicle_count == 0
        && others_waiting
        && current.timer > config.min_timer_before_switch
    {
        return (
            grant_green(lanes, green_id, config.min_timer_before_switch),
            SchedulerDecision::EarlyRelease(green_id),
        );
    }

    if current.timer > 1.0 {
        let timer = (current.timer - config.timer_reduction_rate).max(0.0);
        return (grant_green(lanes, green_id, timer), SchedulerDecision::Countdown(green_id));
    }

    // Green expired, pick the next phase
    if !others_waiting {
        if current.vehicle_count > 0 {
            return (
                grant_green(lanes, green_id, config.default_extend_timer),
                SchedulerDecision::Extended(green_id),
            );
        }

        let to = green_id.next();
        let timer = config.green_time_for(lanes[to.index()].vehicle_count);
        return (
            grant_green(lanes, to, timer),
            SchedulerDecision::RoundRobin { from: green_id, to },
        );
    }

    let candidate = busiest(lanes.iter().filter(|l| l.id != green_id))
        .map_or(green_id.next(), |l| l.id);
    let timer = config.green_time_for(lanes[candidate.index()].vehicle_count);
    (
        grant_green(lanes, candidate, timer),
        SchedulerDecision::Switched {
            from: green_id,
            to: candidate,
        },
    )
}

fn emergency_tick(lanes: &Lanes, emergency: &Lane, config: &SignalConfig) -> (Lanes, SchedulerDecision) {
    let id = emergency.id;
    let other_green = lanes.iter().any(|l| l.id != id && l.is_green());

    if !emergency.is_green() || other_green {
        let timer = if emergency.is_green() {
            emergency.timer
        } else {
            config.emergency_green_time
        };
        return (grant_green(lanes, id, timer), SchedulerDecision::Preempted(id));
    }

    if emergency.ambulance_at_front {
        return (
            grant_green(lanes, id, config.ambulance_hold_timer),
            SchedulerDecision::AmbulanceHold(id),
        );
    }

    if emergency.timer > 0.0 {
        let timer = (emergency.timer - config.timer_reduction_rate).max(0.0);
        return (
            grant_green(lanes, id, timer),
            SchedulerDecision::EmergencyCountdown(id),
        );
    }

    let mut next = lanes.clone();
    let lane = &mut next[id.index()];
    lane.is_emergency = false;
    lane.timer = config.emergency_clearance_timer;
    lane.vehicle_count = lane.vehicle_count.saturating_sub(1);
    (next, SchedulerDecision::EmergencyCleared(id))
}
