//! Junction Simulation Library
//!
//! An adaptive four-lane traffic signal with emergency-vehicle preemption,
//! runnable headless on a logical clock or on background threads.

pub mod simulation;
