//! The intersection actor
//!
//! `Intersection` is the only owner of the lane store, the vehicle queues and
//! the clock. Periodic tasks and demand updates reach it as [`Command`]s, and
//! every state change goes through a whole-set commit that is skipped when
//! nothing changed.

use log::{debug, info, warn};

use super::ambulance_bridge;
use super::config::SignalConfig;
use super::events::EventLog;
use super::lane_store::{default_lanes, Lane, LaneStore, Lanes};
use super::scheduler::{self, SchedulerDecision};
use super::snapshot::Snapshot;
use super::stats::SimulationStats;
use super::types::{IncidentKind, LaneId, SimTime, LANE_ORDER};
use super::vehicle_queue::{QueueEvent, VehicleQueues};

/// Everything that can be asked of the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Detector reading for a lane
    SetVehicleCount { lane: LaneId, count: u32 },
    AddTraffic { lane: LaneId, amount: u32 },
    ClearLane(LaneId),
    /// Raw emergency flag from a detector, no count change
    SetEmergency { lane: LaneId, active: bool },
    /// Operator control: raise or cancel the emergency on a lane
    ToggleEmergency(LaneId),
    /// Citizen report, recorded in the event log only
    ReportIncident { lane: LaneId, kind: IncidentKind },
    SchedulerTick,
    PruneSweep,
    BridgePoll,
}

/// First deadline on `due`'s period grid that is not before `now`
fn next_boundary(due: SimTime, now: SimTime, period_ms: u64) -> SimTime {
    if due >= now {
        return due;
    }
    let period = period_ms.max(1);
    due.add_millis(now.since(due).div_ceil(period) * period)
}

/// Single owner of all intersection state
pub struct Intersection {
    config: SignalConfig,
    store: LaneStore,
    queues: VehicleQueues,
    now: SimTime,
    events: EventLog,
    stats: SimulationStats,
    next_scheduler_tick: SimTime,
    next_prune: SimTime,
    next_bridge_poll: SimTime,
}

impl Default for Intersection {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

impl Intersection {
    pub fn new(config: SignalConfig) -> Self {
        Self::with_lanes(config, default_lanes())
    }

    /// Start from an explicit lane set; vehicle queues are built to match it
    pub fn with_lanes(config: SignalConfig, lanes: Lanes) -> Self {
        let mut intersection = Self {
            next_scheduler_tick: SimTime(config.scheduler_tick_ms.max(1)),
            next_prune: SimTime(config.prune_interval_ms.max(1)),
            next_bridge_poll: SimTime(config.ambulance_poll_interval_ms.max(1)),
            config,
            store: LaneStore::new(lanes),
            queues: VehicleQueues::new(),
            now: SimTime::ZERO,
            events: EventLog::default(),
            stats: SimulationStats::default(),
        };
        intersection.reconcile_queues();
        intersection.events.push(SimTime::ZERO, "System initialized.");
        intersection
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn lanes(&self) -> &Lanes {
        self.store.lanes()
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        self.store.lane(id)
    }

    pub fn queues(&self) -> &VehicleQueues {
        &self.queues
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Number of committed lane store writes so far
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Move the clock forward without running periodic tasks
    ///
    /// Periods skipped by the jump are dropped, not replayed: each periodic
    /// task next fires on its first period boundary at or after `now`.
    pub fn set_time(&mut self, now: SimTime) {
        if now < self.now {
            warn!("Ignoring clock update to {} which is before {}", now, self.now);
            return;
        }
        self.now = now;
        self.stats.elapsed_time = now.as_secs_f32();

        self.next_prune = next_boundary(self.next_prune, now, self.config.prune_interval_ms);
        self.next_bridge_poll = next_boundary(self.next_bridge_poll, now, self.config.ambulance_poll_interval_ms);
        self.next_scheduler_tick = next_boundary(self.next_scheduler_tick, now, self.config.scheduler_tick_ms);
    }

    /// Apply one command at the current time
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::SetVehicleCount { lane, count } => {
                if self.update_lane(lane, |l| l.vehicle_count = count) {
                    self.log_event(format!("Sensor: {} vehicles on {}.", count, self.lane(lane).label));
                }
            }
            Command::AddTraffic { lane, amount } => {
                if self.update_lane(lane, |l| l.vehicle_count = l.vehicle_count.saturating_add(amount)) {
                    self.log_event(format!("Sensor: Detected +{} vehicles on {}.", amount, self.lane(lane).label));
                }
            }
            Command::ClearLane(lane) => {
                if self.update_lane(lane, |l| l.vehicle_count = 0) {
                    self.log_event(format!("Admin: Reset queue for {}.", self.lane(lane).label));
                }
            }
            Command::SetEmergency { lane, active } => {
                if self.update_lane(lane, |l| l.is_emergency = active) {
                    let label = self.lane(lane).label.clone();
                    if active {
                        self.log_event(format!("Emergency vehicle detected on {}.", label));
                    } else {
                        self.log_event(format!("Emergency flag lowered on {}.", label));
                    }
                }
            }
            Command::ToggleEmergency(lane) => self.toggle_emergency(lane),
            Command::ReportIncident { lane, kind } => {
                let label = self.lane(lane).label.clone();
                self.log_event(format!("USER REPORT: Citizen reported {} on {}.", kind, label));
            }
            Command::SchedulerTick => self.scheduler_tick(),
            Command::PruneSweep => {
                if self.queues.prune_all(self.now, &self.config) {
                    debug!("Pruned finished exit animations at {}", self.now);
                }
            }
            Command::BridgePoll => {
                self.sync_ambulance_flags();
            }
        }
    }

    /// Drive the periodic tasks on the logical clock up to `target`
    ///
    /// Tasks due at the same instant run as prune, bridge poll, scheduler so
    /// the scheduler sees the freshest ambulance flag.
    pub fn run_until(&mut self, target: SimTime) {
        loop {
            let due = self
                .next_prune
                .min(self.next_bridge_poll)
                .min(self.next_scheduler_tick);
            if due > target {
                break;
            }
            if due > self.now {
                self.set_time(due);
            }

            if self.next_prune == due {
                self.handle(Command::PruneSweep);
                self.next_prune = due.add_millis(self.config.prune_interval_ms.max(1));
            }
            if self.next_bridge_poll == due {
                self.handle(Command::BridgePoll);
                self.next_bridge_poll = due.add_millis(self.config.ambulance_poll_interval_ms.max(1));
            }
            if self.next_scheduler_tick == due {
                self.handle(Command::SchedulerTick);
                self.next_scheduler_tick = due.add_millis(self.config.scheduler_tick_ms.max(1));
            }
        }
        self.set_time(target.max(self.now));
    }

    /// Run the periodic tasks for the next `millis` of logical time
    pub fn advance(&mut self, millis: u64) {
        self.run_until(self.now.add_millis(millis));
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut stats = self.stats.clone();
        stats.elapsed_time = self.now.as_secs_f32();
        Snapshot {
            time: self.now,
            lanes: self.store.lanes().clone(),
            vehicles: LANE_ORDER.map(|id| self.queues.lane(id).vehicles().to_vec()),
            events: self.events.to_vec(),
            stats,
        }
    }

    fn log_event(&mut self, message: String) {
        info!("[{}] {}", self.now, message);
        self.events.push(self.now, message);
    }

    fn update_lane<F>(&mut self, id: LaneId, f: F) -> bool
    where
        F: FnOnce(&mut Lane),
    {
        let mut next = self.store.lanes().clone();
        f(&mut next[id.index()]);
        self.commit_lanes(next)
    }

    /// Commit a new lane set and let the vehicle queues follow it
    fn commit_lanes(&mut self, next: Lanes) -> bool {
        let before = self.store.lanes().clone();
        if !self.store.commit(next) {
            return false;
        }
        self.stats.record_lane_changes(&before, self.store.lanes());
        self.reconcile_queues();
        true
    }

    fn reconcile_queues(&mut self) {
        let mut events = Vec::new();
        let changed = self
            .queues
            .reconcile_all(self.store.lanes(), self.now, &self.config, &mut events);
        for event in events {
            self.record_queue_event(event);
        }
        if changed {
            self.sync_ambulance_flags();
        }
    }

    /// Write re-derived ambulance flags back to the store. Only the flags
    /// change, so the queues are not reconciled again.
    fn sync_ambulance_flags(&mut self) -> bool {
        let Some(next) = ambulance_bridge::sync(self.store.lanes(), &self.queues, self.now, &self.config) else {
            return false;
        };
        for (old, new) in self.store.lanes().iter().zip(next.iter()) {
            if old.ambulance_at_front != new.ambulance_at_front {
                debug!("{} ambulance_at_front -> {}", new.id, new.ambulance_at_front);
            }
        }
        self.store.commit(next)
    }

    fn toggle_emergency(&mut self, id: LaneId) {
        let activating = !self.lane(id).is_emergency;
        let clearance = self.config.emergency_clearance_timer;
        let mut next = self.store.lanes().clone();

        for lane in next.iter_mut() {
            if lane.id == id {
                if activating {
                    lane.is_emergency = true;
                    lane.vehicle_count = lane.vehicle_count.saturating_add(1);
                } else {
                    lane.is_emergency = false;
                    if lane.is_green() {
                        lane.timer = clearance;
                    }
                }
            } else if activating && lane.is_emergency {
                warn!("Emergency on {} replaced by {}", lane.id, id);
                lane.is_emergency = false;
            }
        }

        if self.commit_lanes(next) {
            let label = self.lane(id).label.clone();
            if activating {
                self.log_event(format!("AMBULANCE DETECTED: Priority corridor for {}.", label));
            } else {
                self.log_event(format!("System: Emergency cleared for {}.", label));
            }
        }
    }

    fn scheduler_tick(&mut self) {
        let (next, decision) = scheduler::tick(self.store.lanes(), &self.config);
        self.stats.scheduler_ticks += 1;
        self.record_decision(decision, &next);

        // The queues are reconciled on every tick even when the lanes did
        // not change, so an ambulance's dwell can expire while its timer
        // is pinned.
        if !self.commit_lanes(next) {
            self.reconcile_queues();
        }
    }

    fn record_decision(&mut self, decision: SchedulerDecision, next: &Lanes) {
        if decision.changes_phase() {
            self.stats.phase_changes += 1;
        }
        let label = |id: LaneId| next[id.index()].label.clone();
        let timer = |id: LaneId| next[id.index()].timer;

        match decision {
            SchedulerDecision::Preempted(id) => {
                self.stats.preemptions += 1;
                self.log_event(format!("Signal override: {} forced green ({:.0}s).", label(id), timer(id)));
            }
            SchedulerDecision::EmergencyCleared(id) => {
                self.stats.emergencies_cleared += 1;
                self.log_event(format!("Ambulance cleared {}, resuming normal cycle.", label(id)));
            }
            SchedulerDecision::InitialGreen(id) => {
                self.log_event(format!("{} green for {:.0}s.", label(id), timer(id)));
            }
            SchedulerDecision::Switched { from, to } | SchedulerDecision::RoundRobin { from, to } => {
                self.log_event(format!(
                    "Switching green from {} to {} for {:.0}s.",
                    label(from),
                    label(to),
                    timer(to)
                ));
            }
            SchedulerDecision::Extended(id) => {
                debug!("Extending green on {} by {:.0}s", id, timer(id));
            }
            SchedulerDecision::EarlyRelease(id) => {
                debug!("{} is empty, cutting green to {:.0}s", id, timer(id));
            }
            SchedulerDecision::AmbulanceHold(id) => {
                debug!("Holding {} while the ambulance waits at the stop line", id);
            }
            SchedulerDecision::EmergencyCountdown(_) | SchedulerDecision::Countdown(_) => {}
        }
    }

    fn record_queue_event(&mut self, event: QueueEvent) {
        match event {
            QueueEvent::AmbulanceDesignated { lane, vehicle } => {
                debug!("Vehicle {:?} on {} is the ambulance", vehicle, lane);
            }
            QueueEvent::DwellStarted { lane, .. } => {
                let label = self.lane(lane).label.clone();
                self.log_event(format!("Ambulance stopped at the front of {}.", label));
            }
            QueueEvent::DwellReleased { lane, .. } => {
                let label = self.lane(lane).label.clone();
                self.log_event(format!("Ambulance released from the stop line on {}.", label));
            }
        }
    }
}
