//! Signal timing constants
//!
//! The constants mirror the defaults of [`SignalConfig`]; tests and the CLI
//! build their own config when they need different values.

/// Green time granted when an emergency preempts the intersection
pub const EMERGENCY_GREEN_TIME: f32 = 30.0;

/// Seconds removed from the active timer on each scheduler tick
pub const TIMER_REDUCTION_RATE: f32 = 1.0;

/// Remaining green an empty lane is cut down to when others are waiting
pub const MIN_TIMER_BEFORE_SWITCH: f32 = 5.0;

/// Extension given to a lone busy lane when its green runs out
pub const DEFAULT_EXTEND_TIMER: f32 = 10.0;

/// Green left on the emergency lane once the ambulance has gone
pub const EMERGENCY_CLEARANCE_TIMER: f32 = 5.0;

/// Timer value pinned while the ambulance dwells at the stop line
pub const AMBULANCE_HOLD_TIMER: f32 = 10.0;

/// How long an ambulance stays at the head of its queue (ms)
pub const AMBULANCE_STOP_DURATION_MS: u64 = 10_000;

/// How long an exiting vehicle stays tracked for display (ms)
pub const EXIT_ANIMATION_DURATION_MS: u64 = 1_000;

/// Period of the exit-animation prune sweep (ms)
pub const PRUNE_INTERVAL_MS: u64 = 300;

/// Period of the ambulance bridge safety-net poll (ms)
pub const AMBULANCE_POLL_INTERVAL_MS: u64 = 500;

/// Period of the signal scheduler (ms)
pub const SCHEDULER_TICK_MS: u64 = 1_000;

/// Green time bounds and per-vehicle increment
pub const MIN_GREEN_TIME: f32 = 10.0;
pub const MAX_GREEN_TIME: f32 = 60.0;
pub const SECONDS_PER_VEHICLE: f32 = 2.0;

/// Number of entries kept in the intersection event log
pub const EVENT_LOG_CAPACITY: usize = 64;

/// All tunables read by the scheduler, the vehicle queues and the actor loop
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub emergency_green_time: f32,
    pub timer_reduction_rate: f32,
    pub min_timer_before_switch: f32,
    pub default_extend_timer: f32,
    pub emergency_clearance_timer: f32,
    pub ambulance_hold_timer: f32,
    pub ambulance_stop_duration_ms: u64,
    pub exit_animation_duration_ms: u64,
    pub prune_interval_ms: u64,
    pub ambulance_poll_interval_ms: u64,
    pub scheduler_tick_ms: u64,
    pub min_green_time: f32,
    pub max_green_time: f32,
    pub seconds_per_vehicle: f32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            emergency_green_time: EMERGENCY_GREEN_TIME,
            timer_reduction_rate: TIMER_REDUCTION_RATE,
            min_timer_before_switch: MIN_TIMER_BEFORE_SWITCH,
            default_extend_timer: DEFAULT_EXTEND_TIMER,
            emergency_clearance_timer: EMERGENCY_CLEARANCE_TIMER,
            ambulance_hold_timer: AMBULANCE_HOLD_TIMER,
            ambulance_stop_duration_ms: AMBULANCE_STOP_DURATION_MS,
            exit_animation_duration_ms: EXIT_ANIMATION_DURATION_MS,
            prune_interval_ms: PRUNE_INTERVAL_MS,
            ambulance_poll_interval_ms: AMBULANCE_POLL_INTERVAL_MS,
            scheduler_tick_ms: SCHEDULER_TICK_MS,
            min_green_time: MIN_GREEN_TIME,
            max_green_time: MAX_GREEN_TIME,
            seconds_per_vehicle: SECONDS_PER_VEHICLE,
        }
    }
}

impl SignalConfig {
    /// Green duration for a lane holding `vehicle_count` vehicles
    ///
    /// Grows linearly with the queue and is clamped to
    /// `[min_green_time, max_green_time]`.
    pub fn green_time_for(&self, vehicle_count: u32) -> f32 {
        let raw = self.min_green_time + vehicle_count as f32 * self.seconds_per_vehicle;
        raw.clamp(self.min_green_time, self.max_green_time)
    }
}
