use std::collections::BTreeSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::datetime::{DateTime, Instant};
use crate::error::{Error, Result};
use crate::interval::{difference_in_intervals, Interval, Recurrence};

/// User-assigned importance, always within `-2..=2`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i8", into = "i8")]
pub struct Priority(i8);

impl Priority {
    pub const MIN: Priority = Priority(-2);
    pub const MAX: Priority = Priority(2);
    pub const HIGH: Priority = Priority(1);

    /// Every valid priority, lowest first.
    pub const ALL: [Priority; 5] = [
        Priority(-2),
        Priority(-1),
        Priority(0),
        Priority(1),
        Priority(2),
    ];

    pub fn new(value: i8) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidPriority(i64::from(value)))
        }
    }

    pub fn value(self) -> i8 {
        self.0
    }
}

impl TryFrom<i8> for Priority {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        Priority::new(value)
    }
}

impl From<Priority> for i8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

/// Discriminant of [`TaskSettings`], used by filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Recurring,
    Bucket,
    Once,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TaskKind::Recurring => "recurring",
            TaskKind::Bucket => "bucket",
            TaskKind::Once => "once",
        })
    }
}

/// How a task is scheduled. Exactly one shape applies per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskSettings {
    /// Repeats indefinitely from `scheduled`.
    Recurring(RecurringSettings),
    /// Points quota per rolling window; no due date.
    Bucket(BucketSettings),
    /// One-off, optionally scheduled and/or with a deadline.
    Once(OnceSettings),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSettings {
    pub scheduled: DateTime,
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSettings {
    /// Length of the rolling window the task's points are a quota for.
    pub interval: Interval,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OnceRecord", into = "OnceRecord")]
pub struct OnceSettings {
    pub scheduled: Option<DateTime>,
    pub deadline: Option<Deadline>,
}

/// Stored shape of [`OnceSettings`]: the deadline's due date and warning
/// lead time sit side by side and must both be present or both absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OnceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline_warning: Option<Recurrence>,
}

impl TryFrom<OnceRecord> for OnceSettings {
    type Error = Error;

    fn try_from(r: OnceRecord) -> Result<Self> {
        let deadline = match (r.deadline, r.deadline_warning) {
            (Some(due), Some(warning)) => Some(Deadline { due, warning }),
            (None, None) => None,
            _ => return Err(Error::UnpairedDeadline),
        };
        Ok(Self {
            scheduled: r.scheduled,
            deadline,
        })
    }
}

impl From<OnceSettings> for OnceRecord {
    fn from(s: OnceSettings) -> Self {
        Self {
            scheduled: s.scheduled,
            deadline: s.deadline.map(|d| d.due),
            deadline_warning: s.deadline.map(|d| d.warning),
        }
    }
}

/// A hard due date plus the lead time at which the task starts to show as due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub due: DateTime,
    pub warning: Recurrence,
}

/// One discrete piece of logged work. Never edited once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub date: DateTime,
    pub points: NonZeroU32,
    /// Marks the task (or current occurrence) as done, not just progressed.
    #[serde(default)]
    pub is_full: bool,
}

impl Completion {
    pub fn new(date: DateTime, points: u32, is_full: bool) -> Result<Self> {
        Ok(Self {
            date,
            points: NonZeroU32::new(points).ok_or(Error::InvalidPoints)?,
            is_full,
        })
    }
}

/// A task together with its completion history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    /// Points budget; for bucket tasks, the quota per window.
    pub points: NonZeroU32,
    /// Points logged toward the current period as last stored. Scoring and
    /// filtering recompute it from `completions` via [`Task::period_points`].
    #[serde(default)]
    pub running_points: u32,
    #[serde(default)]
    pub tag_ids: BTreeSet<String>,
    pub created_at: Instant,
    pub settings: TaskSettings,
    #[serde(default)]
    pub completions: Vec<Completion>,
}

impl Task {
    /// Creates a task with default priority, no tags and no history.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        points: u32,
        created_at: Instant,
        settings: TaskSettings,
    ) -> Result<Self> {
        Ok(Self {
            id,
            name: name.into(),
            priority: Priority::default(),
            points: NonZeroU32::new(points).ok_or(Error::InvalidPoints)?,
            running_points: 0,
            tag_ids: BTreeSet::new(),
            created_at,
            settings,
            completions: Vec::new(),
        })
    }

    pub fn kind(&self) -> TaskKind {
        match self.settings {
            TaskSettings::Recurring(_) => TaskKind::Recurring,
            TaskSettings::Bucket(_) => TaskKind::Bucket,
            TaskSettings::Once(_) => TaskKind::Once,
        }
    }

    /// The scheduled date, if the task has one. Bucket tasks never do.
    pub fn scheduled(&self) -> Option<DateTime> {
        match &self.settings {
            TaskSettings::Recurring(s) => Some(s.scheduled),
            TaskSettings::Bucket(_) => None,
            TaskSettings::Once(s) => s.scheduled,
        }
    }

    pub fn deadline(&self) -> Option<Deadline> {
        match &self.settings {
            TaskSettings::Once(s) => s.deadline,
            TaskSettings::Recurring(_) | TaskSettings::Bucket(_) => None,
        }
    }

    /// Date of the most recent completion.
    pub fn last_completed_at(&self) -> Option<DateTime> {
        self.completions
            .iter()
            .map(|c| c.date)
            .max_by_key(DateTime::instant)
    }

    /// Whether the task is done as of `now`.
    ///
    /// - once: any full completion.
    /// - recurring: a full completion on or after the current occurrence.
    /// - bucket: the points logged in the window ending at `now` reached the
    ///   quota.
    pub fn is_completed(&self, now: Instant) -> bool {
        match &self.settings {
            TaskSettings::Once(_) => self.completions.iter().any(|c| c.is_full),
            TaskSettings::Recurring(s) => {
                let occurrence = s.scheduled.instant();
                self.completions
                    .iter()
                    .any(|c| c.is_full && c.date.instant() >= occurrence)
            }
            TaskSettings::Bucket(_) => self.period_points(now) >= self.points.get(),
        }
    }

    /// Budget left in the period containing `now`; negative when overshot.
    pub fn points_remaining(&self, now: Instant) -> i64 {
        i64::from(self.points.get()) - i64::from(self.period_points(now))
    }

    /// Recomputes the running points from the completion history.
    ///
    /// Bucket tasks count the window ending at `now`; other tasks count
    /// partial completions logged after the latest full one.
    pub fn period_points(&self, now: Instant) -> u32 {
        match &self.settings {
            TaskSettings::Bucket(s) => points_in_window(&self.completions, s.interval, now),
            TaskSettings::Recurring(_) | TaskSettings::Once(_) => {
                let last_full = self
                    .completions
                    .iter()
                    .filter(|c| c.is_full)
                    .map(|c| c.date.instant())
                    .max();
                self.completions
                    .iter()
                    .filter(|c| !c.is_full)
                    .filter(|c| last_full.map_or(true, |full| c.date.instant() > full))
                    .map(|c| c.points.get())
                    .sum()
            }
        }
    }
}

/// Sum of completion points less than one `interval` old at `now`.
pub fn points_in_window(completions: &[Completion], interval: Interval, now: Instant) -> u32 {
    completions
        .iter()
        .filter(|c| difference_in_intervals(interval, c.date.instant(), now) < 1.0)
        .map(|c| c.points.get())
        .sum()
}
