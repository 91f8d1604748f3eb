use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use log::info;

use crate::config::Config;
use crate::datetime::Instant;
use crate::error::{Error, Result};
use crate::filter::{builtin_filters, find_filter, process_filter, Filter};
use crate::interval::days_between;
use crate::models::Task;
use crate::storage::{load_filters, load_tasks};
use crate::urgency::{
    anchor_instant, base_urgency, calc_urgency, priority_multiplier, rank_by_urgency,
};

/// Tasks matching `filter`, most urgent first.
pub fn select_tasks<'a>(
    tasks: &'a [Task],
    filter: Option<&Filter>,
    now: Instant,
) -> Result<Vec<(&'a Task, f64)>> {
    let matches = process_filter(filter, now);
    let mut ranked = rank_by_urgency(tasks, now)?;
    ranked.retain(|(task, _)| matches(task));
    Ok(ranked)
}

/// Resolves a filter name against user filters, then built-ins.
pub fn resolve_filter(config: &Config, name: Option<&str>) -> Result<Option<Filter>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let user = load_filters(&config.filters_path)?;
    let builtin = builtin_filters();
    find_filter(&user, &builtin, name)
        .cloned()
        .map(Some)
        .ok_or_else(|| Error::UnknownFilter(name.to_string()))
}

/// Renders ranked tasks as a table.
pub fn task_table(rows: &[(&Task, f64)], now: Instant) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Tags").add_attribute(Attribute::Bold),
            Cell::new("Scheduled").add_attribute(Attribute::Bold),
            Cell::new("Points").add_attribute(Attribute::Bold),
            Cell::new("Prio").add_attribute(Attribute::Bold),
            Cell::new("Urg").add_attribute(Attribute::Bold),
        ]);

    for (t, urgency) in rows {
        let scheduled = t
            .scheduled()
            .map(|s| {
                let days = days_between(now, s.instant()).round() as i64;
                match days {
                    d if d < 0 => format!("{s} ({}d overdue)", d.abs()),
                    0 => format!("{s} (today)"),
                    d => format!("{s} ({d}d)"),
                }
            })
            .unwrap_or_else(|| "-".into());

        let urgency_color = if t.is_completed(now) {
            Color::Grey
        } else if *urgency > 1.5 {
            Color::Red
        } else if *urgency > 1.0 {
            Color::Yellow
        } else {
            Color::Green
        };

        let tags = t.tag_ids.iter().cloned().collect::<Vec<_>>().join(", ");

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(t.kind()),
            Cell::new(tags),
            Cell::new(scheduled),
            Cell::new(format!("{}/{}", t.period_points(now), t.points)),
            Cell::new(t.priority.value()),
            Cell::new(format!("{:.2}", urgency)).fg(urgency_color),
        ]);
    }
    table
}

/// Lists tasks matching the named filter, sorted by urgency.
pub fn cmd_list(config: &Config, filter: Option<&str>, now: Instant) -> Result<()> {
    let tasks = load_tasks(&config.tasks_path)?;
    let filter = resolve_filter(config, filter)?;
    let rows = select_tasks(&tasks, filter.as_ref(), now)?;
    info!(
        "event=list module=commands filter={:?} total={} shown={}",
        filter.as_ref().map(|f| f.name.as_str()),
        tasks.len(),
        rows.len()
    );
    if rows.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    println!("{}", task_table(&rows, now));
    Ok(())
}

/// Shows how a single task's urgency is derived.
pub fn cmd_show(config: &Config, id: u64, now: Instant) -> Result<()> {
    let tasks = load_tasks(&config.tasks_path)?;
    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or(Error::TaskNotFound(id))?;

    let anchor = anchor_instant(task)?;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Name".to_string(), task.name.clone()]);
    table.add_row(vec!["Type".to_string(), task.kind().to_string()]);
    table.add_row(vec![
        "Anchor".to_string(),
        anchor.map_or_else(|| "-".into(), |a| a.format("%Y-%m-%d %H:%M").to_string()),
    ]);
    if let Some(a) = anchor {
        table.add_row(vec![
            "Days past anchor".to_string(),
            format!("{:.2}", days_between(a, now)),
        ]);
    }
    table.add_row(vec![
        "Points this period".to_string(),
        format!("{}/{}", task.period_points(now), task.points),
    ]);
    table.add_row(vec![
        "Base urgency".to_string(),
        format!("{:.4}", base_urgency(task, now)?),
    ]);
    table.add_row(vec![
        "Priority multiplier".to_string(),
        format!("{} (priority {})", priority_multiplier(task.priority), task.priority.value()),
    ]);
    table.add_row(vec![
        "Urgency".to_string(),
        format!("{:.4}", calc_urgency(task, now)?),
    ]);
    println!("{table}");
    Ok(())
}

/// Lists built-in and user-defined filters.
pub fn cmd_filters(config: &Config) -> Result<()> {
    let user = load_filters(&config.filters_path)?;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Source", "Configs"]);
    for (source, filters) in [("built-in", builtin_filters()), ("user", user)] {
        for f in filters {
            table.add_row(vec![f.name, source.to_string(), f.configs.len().to_string()]);
        }
    }
    println!("{table}");
    Ok(())
}
