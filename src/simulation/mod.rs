//! Four-lane adaptive signal simulation
//!
//! This module contains the intersection core: the lane store, the signal
//! scheduler, the per-lane vehicle queues and the ambulance bridge between
//! them, all owned by the [`Intersection`] actor. Everything runs on a
//! logical clock and can be driven without any threads.

mod ambulance_bridge;
mod config;
mod demand;
mod events;
mod lane_store;
mod runtime;
mod scheduler;
mod snapshot;
mod stats;
mod types;
mod vehicle_queue;
mod world;

pub use ambulance_bridge::{ambulance_at_front, sync as sync_ambulance_flags};
pub use config::{
    SignalConfig, AMBULANCE_HOLD_TIMER, AMBULANCE_POLL_INTERVAL_MS, AMBULANCE_STOP_DURATION_MS,
    DEFAULT_EXTEND_TIMER, EMERGENCY_CLEARANCE_TIMER, EMERGENCY_GREEN_TIME, EVENT_LOG_CAPACITY,
    EXIT_ANIMATION_DURATION_MS, MAX_GREEN_TIME, MIN_GREEN_TIME, MIN_TIMER_BEFORE_SWITCH,
    PRUNE_INTERVAL_MS, SCHEDULER_TICK_MS, SECONDS_PER_VEHICLE, TIMER_REDUCTION_RATE,
};
pub use demand::{DemandUpdate, RandomDemand};
pub use events::{EventLog, TrafficEvent};
pub use lane_store::{default_lanes, Lane, LaneStore, Lanes};
pub use runtime::{spawn, IntersectionHandle};
pub use scheduler::{tick, SchedulerDecision};
pub use snapshot::Snapshot;
pub use stats::SimulationStats;
pub use types::{IncidentKind, LaneId, SignalState, SimTime, VehicleId, LANE_ORDER};
pub use vehicle_queue::{LaneQueue, QueueEvent, Vehicle, VehicleQueues};
pub use world::{Command, Intersection};
