//! # Taskpulse
//!
//! Urgency scoring and filtering for a personal task tracker.
//!
//! The engine is pure: every operation takes the tasks and an explicit `now`
//! and returns numbers or booleans. Nothing reads the clock or mutates the
//! records it is given.
//!
//! - [`datetime`]: zone-free calendar values and their instants.
//! - [`interval`]: cadence arithmetic ("every N weeks").
//! - [`urgency`]: bounded sigmoid scoring per task variant, priority weighted.
//! - [`filter`]: declarative OR-of-AND filters compiled into predicates.
//!
//! [`storage`], [`config`], [`logging`] and [`commands`] back the
//! `taskpulse` binary.

pub mod commands;
pub mod config;
pub mod datetime;
pub mod error;
pub mod filter;
pub mod interval;
pub mod logging;
pub mod models;
pub mod storage;
pub mod urgency;

pub use datetime::{from_instant, to_instant, DateTime, Instant};
pub use error::{Error, Result};
pub use filter::{process_filter, Bounds, CompiledFilter, Filter, FilterConfig};
pub use interval::{
    add_interval, difference_in_intervals, sub_interval, Frequency, Interval, Recurrence,
};
pub use models::{Completion, Deadline, Priority, Task, TaskKind, TaskSettings};
pub use urgency::{calc_urgency, rank_by_urgency, sigmoid, CurveShape};
