use std::collections::BTreeSet;

use chrono::NaiveDate;
use taskpulse::datetime::{DateTime, Instant};
use taskpulse::filter::{
    apply, builtin_filters, find_filter, is_in_range, process_filter, Bounds, CompiledFilter,
    Filter, FilterConfig,
};
use taskpulse::interval::{Frequency, Interval, Recurrence};
use taskpulse::models::{
    BucketSettings, Completion, Deadline, OnceSettings, Priority, RecurringSettings, Task,
    TaskKind, TaskSettings,
};
use taskpulse::urgency::base_urgency;

fn created() -> Instant {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn now() -> Instant {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn day(month0: u32, d: u32) -> DateTime {
    DateTime::date(2025, month0, d).unwrap()
}

fn tags(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn once_task(id: u64, points: u32) -> Task {
    Task::new(id, "once", points, created(), TaskSettings::Once(OnceSettings::default())).unwrap()
}

fn recurring_task(id: u64, scheduled: DateTime) -> Task {
    let settings = TaskSettings::Recurring(RecurringSettings {
        scheduled,
        recurrence: Recurrence::new(Frequency::Day, 2).unwrap(),
    });
    Task::new(id, "recurring", 2, created(), settings).unwrap()
}

fn bucket_task(id: u64) -> Task {
    let settings = TaskSettings::Bucket(BucketSettings {
        interval: Interval::new(Frequency::Week, 1).unwrap(),
    });
    Task::new(id, "bucket", 20, created(), settings).unwrap()
}

fn filter(configs: Vec<FilterConfig>) -> Filter {
    Filter {
        id: 42,
        name: "test".into(),
        configs,
    }
}

fn sample_tasks() -> Vec<Task> {
    let mut tagged = once_task(1, 5);
    tagged.tag_ids = tags(&["home", "chores"]);
    tagged.priority = Priority::new(1).unwrap();

    let mut work = recurring_task(2, day(2, 10));
    work.tag_ids = tags(&["work"]);

    let mut deadline = once_task(3, 8);
    deadline.settings = TaskSettings::Once(OnceSettings {
        scheduled: None,
        deadline: Some(Deadline {
            due: day(5, 1),
            warning: Recurrence::new(Frequency::Week, 1).unwrap(),
        }),
    });
    deadline.completions = vec![Completion::new(day(4, 2), 8, true).unwrap()];

    let mut quota = bucket_task(4);
    quota.completions = vec![Completion::new(day(4, 30), 12, false).unwrap()];
    quota.priority = Priority::MIN;

    vec![tagged, work, deadline, quota]
}

fn matching_ids(filter: Option<&Filter>, tasks: &[Task]) -> Vec<u64> {
    apply(filter, tasks, now()).iter().map(|t| t.id).collect()
}

#[test]
fn missing_filter_matches_everything() {
    let matches = process_filter(None, now());
    assert!(sample_tasks().iter().all(|t| matches(t)));
}

#[test]
fn filter_without_configs_matches_everything() {
    let tasks = sample_tasks();
    let f = filter(Vec::new());
    assert_eq!(matching_ids(Some(&f), &tasks), vec![1, 2, 3, 4]);
}

#[test]
fn empty_config_matches_everything() {
    let tasks = sample_tasks();
    let f = filter(vec![FilterConfig::default()]);
    assert_eq!(matching_ids(Some(&f), &tasks), vec![1, 2, 3, 4]);
}

#[test]
fn range_bounds_are_inclusive() {
    let config = FilterConfig {
        points: Some(Bounds(Some(5), Some(10))),
        ..FilterConfig::default()
    };
    let matches = process_filter(Some(&filter(vec![config])), now());
    for points in 1..=15 {
        let expected = (5..=10).contains(&points);
        assert_eq!(matches(&once_task(1, points)), expected, "points {points}");
    }
}

#[test]
fn missing_bound_is_unconstrained() {
    assert!(is_in_range(&Bounds(None, Some(5)), &-100));
    assert!(is_in_range(&Bounds(None, Some(5)), &5));
    assert!(!is_in_range(&Bounds(None, Some(5)), &6));
    assert!(is_in_range(&Bounds(Some(3), None), &1000));
    assert!(is_in_range(&Bounds::<i32>(None, None), &i32::MIN));
}

#[test]
fn config_fields_are_anded() {
    let tasks = sample_tasks();
    let config = FilterConfig {
        types: Some(BTreeSet::from([TaskKind::Once])),
        points: Some(Bounds(Some(6), None)),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![config])), &tasks), vec![3]);
}

#[test]
fn configs_are_ored() {
    let tasks = sample_tasks();
    let work = FilterConfig {
        tags: Some(tags(&["work"])),
        ..FilterConfig::default()
    };
    let buckets = FilterConfig {
        types: Some(BTreeSet::from([TaskKind::Bucket])),
        ..FilterConfig::default()
    };
    let forward = filter(vec![work.clone(), buckets.clone()]);
    let backward = filter(vec![buckets, work]);
    assert_eq!(matching_ids(Some(&forward), &tasks), vec![2, 4]);
    assert_eq!(matching_ids(Some(&backward), &tasks), vec![2, 4]);
}

#[test]
fn tag_membership_and_exclusion() {
    let tasks = sample_tasks();
    let any_of = FilterConfig {
        tags: Some(tags(&["chores", "work"])),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![any_of])), &tasks), vec![1, 2]);

    let none_of = FilterConfig {
        exclude_tags: Some(tags(&["home"])),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![none_of])), &tasks), vec![2, 3, 4]);
}

#[test]
fn priority_and_points_remaining_ranges() {
    let tasks = sample_tasks();
    let important = FilterConfig {
        priority: Some(Bounds(Some(Priority::HIGH), None)),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![important])), &tasks), vec![1]);

    let nearly_done = FilterConfig {
        points_remaining: Some(Bounds(None, Some(8))),
        types: Some(BTreeSet::from([TaskKind::Bucket])),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![nearly_done])), &tasks), vec![4]);
}

#[test]
fn boolean_flags() {
    let tasks = sample_tasks();
    let scheduled = FilterConfig {
        scheduled: Some(true),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![scheduled])), &tasks), vec![2]);

    let with_deadline = FilterConfig {
        has_deadline: Some(true),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![with_deadline])), &tasks), vec![3]);

    let open = FilterConfig {
        completed: Some(false),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![open])), &tasks), vec![1, 2, 4]);
}

#[test]
fn recurring_completion_counts_for_current_occurrence_only() {
    let mut task = recurring_task(2, day(2, 10));
    task.completions = vec![Completion::new(day(2, 8), 2, true).unwrap()];
    assert!(!task.is_completed(now()));
    task.completions.push(Completion::new(day(2, 10), 2, true).unwrap());
    assert!(task.is_completed(now()));
}

#[test]
fn bucket_completion_agrees_with_urgency() {
    let open = filter(vec![FilterConfig {
        completed: Some(false),
        ..FilterConfig::default()
    }]);
    let is_open = process_filter(Some(&open), now());
    let mut quota = Task::new(1, "bucket", 10, created(), bucket_task(1).settings).unwrap();

    // A stale stored counter does not count as logged work.
    quota.running_points = 10;
    assert!(!quota.is_completed(now()));
    assert!(is_open(&quota));
    assert_eq!(quota.points_remaining(now()), 10);
    assert_eq!(base_urgency(&quota, now()).unwrap(), 2.0);

    // Work logged inside the window completes the quota.
    quota.running_points = 0;
    quota.completions = vec![Completion::new(day(4, 30), 10, false).unwrap()];
    assert!(quota.is_completed(now()));
    assert!(!is_open(&quota));
    assert_eq!(quota.points_remaining(now()), 0);
    assert_eq!(base_urgency(&quota, now()).unwrap(), 1.0);

    // Once the window has moved past it, the quota is open again.
    let later = now() + chrono::Duration::days(8);
    assert!(!quota.is_completed(later));
    assert!(process_filter(Some(&open), later)(&quota));
    assert_eq!(base_urgency(&quota, later).unwrap(), 2.0);
}

#[test]
fn empty_type_set_does_not_constrain() {
    let tasks = sample_tasks();
    let config = FilterConfig {
        types: Some(BTreeSet::new()),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![config])), &tasks), vec![1, 2, 3, 4]);
}

#[test]
fn date_ranges() {
    let tasks = sample_tasks();
    let march = FilterConfig {
        scheduled_at: Some(Bounds(Some(day(2, 1)), Some(day(2, 31)))),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![march])), &tasks), vec![2]);

    let completed_in_may = FilterConfig {
        last_completed_at: Some(Bounds(Some(day(4, 1)), None)),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![completed_in_may])), &tasks), vec![3, 4]);

    let unbounded = FilterConfig {
        last_completed_at: Some(Bounds(None, None)),
        ..FilterConfig::default()
    };
    assert_eq!(matching_ids(Some(&filter(vec![unbounded])), &tasks), vec![1, 2, 3, 4]);
}

#[test]
fn compiled_filter_is_reusable() {
    let tasks = sample_tasks();
    let compiled = CompiledFilter::compile(&filter(vec![FilterConfig {
        types: Some(BTreeSet::from([TaskKind::Recurring, TaskKind::Bucket])),
        ..FilterConfig::default()
    }]));
    let first: Vec<bool> = tasks.iter().map(|t| compiled.matches(t, now())).collect();
    let second: Vec<bool> = tasks.iter().map(|t| compiled.matches(t, now())).collect();
    assert_eq!(first, vec![false, true, false, true]);
    assert_eq!(first, second);
    assert!(CompiledFilter::identity().matches(&tasks[0], now()));
}

#[test]
fn filter_reads_from_json() {
    let json = r#"{
        "id": 7,
        "name": "Due soon",
        "configs": [
            { "points": [null, 10], "types": ["once", "recurring"] },
            { "scheduledAt": [{ "date": [2025, 2, 1] }, null], "completed": false }
        ]
    }"#;
    let f: Filter = serde_json::from_str(json).unwrap();
    assert_eq!(f.configs.len(), 2);
    assert_eq!(f.configs[0].points, Some(Bounds(None, Some(10))));
    assert_eq!(f.configs[1].scheduled_at, Some(Bounds(Some(day(2, 1)), None)));
    assert_eq!(matching_ids(Some(&f), &sample_tasks()), vec![1, 2, 3]);
}

#[test]
fn builtin_filters_resolve_by_name() {
    let builtin = builtin_filters();
    let user = vec![Filter {
        id: 100,
        name: "open".into(),
        configs: vec![FilterConfig {
            types: Some(BTreeSet::from([TaskKind::Bucket])),
            ..FilterConfig::default()
        }],
    }];
    assert_eq!(find_filter(&[], &builtin, "OPEN").map(|f| f.id), Some(2));
    assert_eq!(find_filter(&user, &builtin, "Open").map(|f| f.id), Some(100));
    assert!(find_filter(&user, &builtin, "nope").is_none());

    let tasks = sample_tasks();
    let all = find_filter(&[], &builtin, "all").unwrap();
    assert_eq!(matching_ids(Some(all), &tasks), vec![1, 2, 3, 4]);
    let important = find_filter(&[], &builtin, "important").unwrap();
    assert_eq!(matching_ids(Some(important), &tasks), vec![1]);
}
