//! Declarative task filters.
//!
//! A [`FilterConfig`] is a flat set of optional constraints, all of which must
//! hold. A [`Filter`] holds several configs and matches a task when any one of
//! them does. Unset fields never constrain; a filter with no configs matches
//! everything.
//!
//! Compilation looks up one predicate per set field in a process-wide table,
//! so matching never dispatches on field names at runtime.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::datetime::{DateTime, Instant};
use crate::models::{Priority, Task, TaskKind};

/// Inclusive `[min, max]` range; a missing side is unbounded.
///
/// Serialized as a two-element array, `null` for a missing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds<T>(pub Option<T>, pub Option<T>);

impl<T> Bounds<T> {
    pub fn is_unbounded(&self) -> bool {
        self.0.is_none() && self.1.is_none()
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Bounds<U> {
        Bounds(self.0.as_ref().map(&mut f), self.1.as_ref().map(&mut f))
    }
}

impl<T: PartialOrd> Bounds<T> {
    pub fn contains(&self, value: &T) -> bool {
        is_in_range(self, value)
    }
}

/// Whether `value` lies within `range`, both ends inclusive.
pub fn is_in_range<T: PartialOrd>(range: &Bounds<T>, value: &T) -> bool {
    range.0.as_ref().map_or(true, |min| value >= min)
        && range.1.as_ref().map_or(true, |max| value <= max)
}

/// Instant-based check for calendar ranges. A task without a date only
/// passes when the range is unbounded.
fn date_in_range(range: &Bounds<DateTime>, value: Option<DateTime>) -> bool {
    if range.is_unbounded() {
        return true;
    }
    value.is_some_and(|dt| range.map(DateTime::instant).contains(&dt.instant()))
}

/// One AND-combined set of constraints over a single task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Task carries at least one of these tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    /// Task carries none of these tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<BTreeSet<TaskKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Bounds<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_remaining: Option<Bounds<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Bounds<Priority>>,
    /// Task has a scheduled date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_deadline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Bounds<DateTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<Bounds<DateTime>>,
}

/// Named OR-combination of configs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub configs: Vec<FilterConfig>,
}

/// One key of [`FilterConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Tags,
    ExcludeTags,
    Types,
    Points,
    PointsRemaining,
    Priority,
    Scheduled,
    HasDeadline,
    Completed,
    ScheduledAt,
    LastCompletedAt,
}

impl FilterField {
    pub const ALL: [FilterField; 11] = [
        FilterField::Tags,
        FilterField::ExcludeTags,
        FilterField::Types,
        FilterField::Points,
        FilterField::PointsRemaining,
        FilterField::Priority,
        FilterField::Scheduled,
        FilterField::HasDeadline,
        FilterField::Completed,
        FilterField::ScheduledAt,
        FilterField::LastCompletedAt,
    ];

    /// Whether `config` constrains this field.
    pub fn is_set(self, config: &FilterConfig) -> bool {
        match self {
            FilterField::Tags => config.tags.as_ref().is_some_and(|t| !t.is_empty()),
            FilterField::ExcludeTags => {
                config.exclude_tags.as_ref().is_some_and(|t| !t.is_empty())
            }
            FilterField::Types => config.types.as_ref().is_some_and(|t| !t.is_empty()),
            FilterField::Points => config.points.is_some(),
            FilterField::PointsRemaining => config.points_remaining.is_some(),
            FilterField::Priority => config.priority.is_some(),
            FilterField::Scheduled => config.scheduled.is_some(),
            FilterField::HasDeadline => config.has_deadline.is_some(),
            FilterField::Completed => config.completed.is_some(),
            FilterField::ScheduledAt => config.scheduled_at.is_some(),
            FilterField::LastCompletedAt => config.last_completed_at.is_some(),
        }
    }
}

/// Checks one field of a config against a task as of an instant; `true` when
/// the field is unset.
pub type Predicate = fn(&FilterConfig, &Task, Instant) -> bool;

static PREDICATES: Lazy<HashMap<FilterField, Predicate>> = Lazy::new(|| {
    HashMap::from([
        (FilterField::Tags, match_tags as Predicate),
        (FilterField::ExcludeTags, match_exclude_tags as Predicate),
        (FilterField::Types, match_types as Predicate),
        (FilterField::Points, match_points as Predicate),
        (FilterField::PointsRemaining, match_points_remaining as Predicate),
        (FilterField::Priority, match_priority as Predicate),
        (FilterField::Scheduled, match_scheduled as Predicate),
        (FilterField::HasDeadline, match_has_deadline as Predicate),
        (FilterField::Completed, match_completed as Predicate),
        (FilterField::ScheduledAt, match_scheduled_at as Predicate),
        (FilterField::LastCompletedAt, match_last_completed_at as Predicate),
    ])
});

fn match_tags(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.tags
        .as_ref()
        .map_or(true, |tags| tags.is_empty() || !tags.is_disjoint(&t.tag_ids))
}

fn match_exclude_tags(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.exclude_tags
        .as_ref()
        .map_or(true, |tags| tags.is_disjoint(&t.tag_ids))
}

fn match_types(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.types
        .as_ref()
        .map_or(true, |types| types.is_empty() || types.contains(&t.kind()))
}

fn match_points(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.points.as_ref().map_or(true, |r| r.contains(&t.points.get()))
}

fn match_points_remaining(c: &FilterConfig, t: &Task, now: Instant) -> bool {
    c.points_remaining
        .as_ref()
        .map_or(true, |r| r.contains(&t.points_remaining(now)))
}

fn match_priority(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.priority.as_ref().map_or(true, |r| r.contains(&t.priority))
}

fn match_scheduled(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.scheduled.map_or(true, |want| t.scheduled().is_some() == want)
}

fn match_has_deadline(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.has_deadline.map_or(true, |want| t.deadline().is_some() == want)
}

fn match_completed(c: &FilterConfig, t: &Task, now: Instant) -> bool {
    c.completed.map_or(true, |want| t.is_completed(now) == want)
}

fn match_scheduled_at(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.scheduled_at
        .as_ref()
        .map_or(true, |r| date_in_range(r, t.scheduled()))
}

fn match_last_completed_at(c: &FilterConfig, t: &Task, _now: Instant) -> bool {
    c.last_completed_at
        .as_ref()
        .map_or(true, |r| date_in_range(r, t.last_completed_at()))
}

fn predicate_for(field: FilterField) -> Option<Predicate> {
    PREDICATES.get(&field).copied()
}

/// A config reduced to the predicates of its set fields.
#[derive(Clone)]
struct CompiledConfig {
    config: FilterConfig,
    checks: Vec<Predicate>,
}

impl CompiledConfig {
    fn compile(config: &FilterConfig) -> Self {
        let checks = FilterField::ALL
            .iter()
            .filter(|field| field.is_set(config))
            .filter_map(|field| predicate_for(*field))
            .collect();
        Self {
            config: config.clone(),
            checks,
        }
    }

    fn matches(&self, task: &Task, now: Instant) -> bool {
        self.checks.iter().all(|check| check(&self.config, task, now))
    }
}

/// Reusable matcher built from a [`Filter`].
#[derive(Clone, Default)]
pub struct CompiledFilter {
    configs: Vec<CompiledConfig>,
}

impl CompiledFilter {
    pub fn compile(filter: &Filter) -> Self {
        let configs: Vec<CompiledConfig> =
            filter.configs.iter().map(CompiledConfig::compile).collect();
        debug!(
            "event=filter_compile module=filter filter_id={} name={:?} configs={} checks={}",
            filter.id,
            filter.name,
            configs.len(),
            configs.iter().map(|c| c.checks.len()).sum::<usize>()
        );
        Self { configs }
    }

    /// Matches everything.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Whether any config holds for `task` as of `now`.
    pub fn matches(&self, task: &Task, now: Instant) -> bool {
        self.configs.is_empty() || self.configs.iter().any(|c| c.matches(task, now))
    }
}

/// Compiles `filter` into a predicate evaluated as of `now`. `None` matches
/// every task.
pub fn process_filter(filter: Option<&Filter>, now: Instant) -> impl Fn(&Task) -> bool {
    let compiled = filter.map_or_else(CompiledFilter::identity, CompiledFilter::compile);
    move |task: &Task| compiled.matches(task, now)
}

/// Tasks from `tasks` matching `filter` as of `now`, in input order.
pub fn apply<'a>(filter: Option<&Filter>, tasks: &'a [Task], now: Instant) -> Vec<&'a Task> {
    let matches = process_filter(filter, now);
    tasks.iter().filter(|t| matches(t)).collect()
}

/// Filters shipped with the application.
pub fn builtin_filters() -> Vec<Filter> {
    vec![
        Filter {
            id: 1,
            name: "All".into(),
            configs: Vec::new(),
        },
        Filter {
            id: 2,
            name: "Open".into(),
            configs: vec![FilterConfig {
                completed: Some(false),
                ..FilterConfig::default()
            }],
        },
        Filter {
            id: 3,
            name: "Buckets".into(),
            configs: vec![FilterConfig {
                types: Some(BTreeSet::from([TaskKind::Bucket])),
                ..FilterConfig::default()
            }],
        },
        Filter {
            id: 4,
            name: "Important".into(),
            configs: vec![FilterConfig {
                priority: Some(Bounds(Some(Priority::HIGH), None)),
                ..FilterConfig::default()
            }],
        },
    ]
}

/// Looks up a filter by case-insensitive name, user filters first.
pub fn find_filter<'a>(
    user: &'a [Filter],
    builtin: &'a [Filter],
    name: &str,
) -> Option<&'a Filter> {
    user.iter()
        .chain(builtin)
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_table_covers_every_field() {
        for field in FilterField::ALL {
            assert!(predicate_for(field).is_some(), "{field:?} has no predicate");
        }
        assert_eq!(PREDICATES.len(), FilterField::ALL.len());
    }

    #[test]
    fn compile_skips_unset_fields() {
        let config = FilterConfig {
            scheduled: Some(true),
            tags: Some(BTreeSet::new()),
            types: Some(BTreeSet::new()),
            ..FilterConfig::default()
        };
        assert_eq!(CompiledConfig::compile(&config).checks.len(), 1);
    }

    #[test]
    fn bounds_serialize_as_pairs() {
        let json = serde_json::to_value(Bounds::<u32>(None, Some(5))).unwrap();
        assert_eq!(json, serde_json::json!([null, 5]));
    }
}
