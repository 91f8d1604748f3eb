//! Urgency scoring.
//!
//! Every task gets a bounded score from a sigmoid curve, so a wildly overdue
//! task saturates instead of drowning out everything else. The curve input is
//! the time left until the task's anchor instant: negative once overdue,
//! positive while there is still room. Recurring tasks measure that distance
//! in their own cadence; one-off tasks measure it in days.
//!
//! Bucket tasks skip the curve: their score is `1 + share of quota left`.
//!
//! The base score is then weighted by [`PRIORITY_MULTIPLIERS`].

use log::trace;

use crate::datetime::Instant;
use crate::error::{Error, Result};
use crate::interval::{days_between, difference_in_intervals, sub_interval};
use crate::models::{Priority, Task, TaskSettings};

/// Parameters of `c / (1 + exp(k·x − b/2)) + d`.
///
/// For `k > 0` the curve falls from `c + d` (x → −∞) to `d` (x → +∞).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveShape {
    /// Shifts the inflection point.
    pub b: f64,
    /// Height.
    pub c: f64,
    /// Vertical offset.
    pub d: f64,
    /// Steepness; the sign sets direction.
    pub k: f64,
}

impl CurveShape {
    pub const DEFAULT: CurveShape = CurveShape {
        b: 0.0,
        c: 2.0,
        d: 0.0,
        k: 0.1,
    };

    /// Validated constructor for user-supplied shapes.
    pub fn new(b: f64, c: f64, d: f64, k: f64) -> Result<Self> {
        if ![b, c, d, k].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidCurve("parameters must be finite".into()));
        }
        if c <= 0.0 {
            return Err(Error::InvalidCurve(format!("height must be positive, got {c}")));
        }
        Ok(Self { b, c, d, k })
    }

    /// Default shape with a different steepness.
    pub const fn with_steepness(k: f64) -> Self {
        CurveShape {
            k,
            ..CurveShape::DEFAULT
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.c / (1.0 + (self.k * x - self.b / 2.0).exp()) + self.d
    }

    /// Value at the inflection point.
    pub fn midpoint(&self) -> f64 {
        self.d + self.c / 2.0
    }
}

impl Default for CurveShape {
    fn default() -> Self {
        CurveShape::DEFAULT
    }
}

/// Evaluates the curve at `x`.
pub fn sigmoid(x: f64, shape: &CurveShape) -> f64 {
    shape.eval(x)
}

/// Curve for recurring tasks, input in recurrence intervals.
pub const RECURRING_CURVE: CurveShape = CurveShape::with_steepness(0.11);

/// Gentler curve for one-off tasks, input in days.
pub const ONCE_CURVE: CurveShape = CurveShape::with_steepness(0.05);

/// Priority weights, lowest priority first.
pub const PRIORITY_MULTIPLIERS: [(i8, f64); 5] =
    [(-2, 0.5), (-1, 0.75), (0, 1.0), (1, 1.5), (2, 2.0)];

pub fn priority_multiplier(priority: Priority) -> f64 {
    PRIORITY_MULTIPLIERS
        .iter()
        .find(|(p, _)| *p == priority.value())
        .map_or(1.0, |(_, m)| *m)
}

/// Instant a task's curve is measured against.
///
/// Recurring: the scheduled occurrence. Once: the scheduled date, else the
/// deadline minus its warning, else the creation time. Bucket tasks have none.
pub fn anchor_instant(task: &Task) -> Result<Option<Instant>> {
    match &task.settings {
        TaskSettings::Recurring(s) => Ok(Some(s.scheduled.instant())),
        TaskSettings::Bucket(_) => Ok(None),
        TaskSettings::Once(s) => {
            if let Some(scheduled) = s.scheduled {
                return Ok(Some(scheduled.instant()));
            }
            if let Some(deadline) = s.deadline {
                let start = sub_interval(deadline.warning.into(), &deadline.due)?;
                return Ok(Some(start.instant()));
            }
            Ok(Some(task.created_at))
        }
    }
}

/// Urgency before priority weighting.
pub fn base_urgency(task: &Task, now: Instant) -> Result<f64> {
    let base = match &task.settings {
        TaskSettings::Recurring(s) => {
            let overdue = difference_in_intervals(s.recurrence.into(), s.scheduled.instant(), now);
            sigmoid(-overdue, &RECURRING_CURVE)
        }
        TaskSettings::Bucket(_) => {
            let target = f64::from(task.points.get());
            let logged = f64::from(task.period_points(now));
            // Unclamped: logging past the quota drives the score below 1.
            1.0 + (target - logged) / target
        }
        TaskSettings::Once(_) => {
            let anchor = anchor_instant(task)?.unwrap_or(task.created_at);
            sigmoid(-days_between(anchor, now), &ONCE_CURVE)
        }
    };
    Ok(base)
}

/// Priority-weighted urgency at `now`. Higher sorts first.
pub fn calc_urgency(task: &Task, now: Instant) -> Result<f64> {
    let base = base_urgency(task, now)?;
    let urgency = base * priority_multiplier(task.priority);
    trace!(
        "event=urgency module=urgency task_id={} kind={} base={:.4} urgency={:.4}",
        task.id,
        task.kind(),
        base,
        urgency
    );
    Ok(urgency)
}

/// Scores every task and sorts most urgent first. Ties keep input order.
pub fn rank_by_urgency(tasks: &[Task], now: Instant) -> Result<Vec<(&Task, f64)>> {
    let mut ranked = tasks
        .iter()
        .map(|t| calc_urgency(t, now).map(|u| (t, u)))
        .collect::<Result<Vec<_>>>()?;
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranked)
}
