//! Error types for the urgency and filter engine.

/// Top-level error type.
///
/// Engine variants are construction-time rejections of malformed input;
/// `Io`/`Json` only come out of the storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Interval or recurrence with a zero count.
    #[error("interval count must be at least 1, got {count}")]
    InvalidInterval { count: u32 },

    /// Priority outside of [-2, 2].
    #[error("priority must be within -2..=2, got {0}")]
    InvalidPriority(i64),

    /// Task or completion points of zero.
    #[error("points must be at least 1")]
    InvalidPoints,

    /// Calendar fields that do not name a real day (month is zero-based).
    #[error("invalid date {year}-{month}-{day} (zero-based month)")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Time-of-day fields out of range.
    #[error("invalid time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    /// Interval arithmetic left the representable calendar.
    #[error("date arithmetic out of range")]
    DateOutOfRange,

    /// Once-task deadline and its warning lead time must come as a pair.
    #[error("deadline and deadlineWarning must be given together")]
    UnpairedDeadline,

    /// Curve parameters that would not produce a bounded curve.
    #[error("invalid curve shape: {0}")]
    InvalidCurve(String),

    /// Named filter not found among built-in or user filters.
    #[error("unknown filter `{0}`")]
    UnknownFilter(String),

    /// Task id not present in storage.
    #[error("task {0} not found")]
    TaskNotFound(u64),

    /// Logger setup failed or conflicting re-initialization.
    #[error("logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or invalid JSON payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
