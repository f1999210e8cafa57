//! Pure aggregation over stored documents.
//!
//! Everything here is a deterministic function of its inputs: column
//! classification, Kanban grouping (sorting, done-window filtering,
//! backlog truncation), the cross-project review queue, project summary
//! cards, and standup parsing. No I/O and no clock access; `now` is an
//! argument wherever the window filter needs it.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Board, Project, ProjectCard, ReviewQueueItem, StandupSummary, Task};

/// Days a done task stays on the board before the window filter hides it.
const DONE_WINDOW_DAYS: i64 = 7;

/// Backlog entries shown unless the caller asks for all of them.
const BACKLOG_LIMIT: usize = 10;

/// The review type that pulls a task into the queue regardless of state.
const SAM_REQUIRED: &str = "sam-required";

// ── Columns ───────────────────────────────────────────────────────────

/// The five fixed Kanban buckets. Ordering is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Backlog,
    Planned,
    InProgress,
    Review,
    Done,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub const ALL: [Column; 5] = [
        Self::Backlog,
        Self::Planned,
        Self::InProgress,
        Self::Review,
        Self::Done,
    ];
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "planned" => Ok(Self::Planned),
            "in-progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid column: {}", s)),
        }
    }
}

/// Map a task to its column. Total: every state string lands somewhere,
/// and anything unrecognized is backlog.
pub fn classify(task: &Task) -> Column {
    match task.state.to_lowercase().as_str() {
        "done" | "completed" => Column::Done,
        "in-progress" | "active" => Column::InProgress,
        "review" | "in-review" => Column::Review,
        "planned" => Column::Planned,
        _ => Column::Backlog,
    }
}

/// A state that counts as finished for the review queue and for the
/// move-task completion stamp. Same set `classify` maps to `Done`.
pub fn is_completed_state(state: &str) -> bool {
    matches!(state.to_lowercase().as_str(), "done" | "completed")
}

/// Priority sort rank: `p0` < `p1` < `p2` < `p3` < anything else.
pub fn priority_rank(priority: Option<&str>) -> u8 {
    match priority {
        Some("p0") => 0,
        Some("p1") => 1,
        Some("p2") => 2,
        Some("p3") => 3,
        _ => 4,
    }
}

// ── Kanban grouping ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupOptions {
    /// Include done tasks older than the 7-day window.
    pub show_all_done: bool,
    /// Skip the 10-entry backlog truncation.
    pub show_all_backlog: bool,
}

/// Group tasks into columns for display.
///
/// Every column is sorted by priority rank, ties broken by ascending
/// creation timestamp (lexicographic ISO-8601; tasks without one sort
/// last). The sort is stable, so full ties keep storage order. The done
/// column drops tasks whose effective date is older than the window, the
/// backlog is capped, and all five columns are always present in the
/// result.
pub fn group_by_column(
    tasks: &[Task],
    opts: GroupOptions,
    now: DateTime<Utc>,
) -> BTreeMap<Column, Vec<Task>> {
    let mut columns: BTreeMap<Column, Vec<Task>> =
        Column::ALL.iter().map(|c| (*c, Vec::new())).collect();

    let cutoff = now - Duration::days(DONE_WINDOW_DAYS);
    for task in tasks {
        let column = classify(task);
        if column == Column::Done && !opts.show_all_done && older_than(task, cutoff) {
            continue;
        }
        columns.entry(column).or_default().push(task.clone());
    }

    for tasks in columns.values_mut() {
        sort_for_column(tasks);
    }

    if !opts.show_all_backlog
        && let Some(backlog) = columns.get_mut(&Column::Backlog)
    {
        backlog.truncate(BACKLOG_LIMIT);
    }

    columns
}

/// Stable sort: priority rank ascending, then creation time ascending,
/// missing creation times last.
fn sort_for_column(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        priority_rank(a.priority.as_deref())
            .cmp(&priority_rank(b.priority.as_deref()))
            .then_with(|| match (&a.created, &b.created) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });
}

/// True when the task's effective date (completed, else updated, else
/// created) parses and is older than `cutoff`. A task with no parseable
/// date is never "old": exclusion needs positive evidence of age.
fn older_than(task: &Task, cutoff: DateTime<Utc>) -> bool {
    let effective = task
        .completed
        .as_deref()
        .or(task.updated.as_deref())
        .or(task.created.as_deref());
    match effective.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
        Some(date) => date.with_timezone(&Utc) < cutoff,
        None => false,
    }
}

// ── Review queue ──────────────────────────────────────────────────────

/// A task needs review if it classifies into the review column, or its
/// review type demands a named reviewer's sign-off and it isn't finished.
pub fn needs_review(task: &Task) -> bool {
    classify(task) == Column::Review
        || (task.review_type.as_deref() == Some(SAM_REQUIRED)
            && !is_completed_state(&task.state))
}

/// Cross-project review queue: priority rank ascending, ties broken by
/// most recently updated first. Pure and idempotent.
pub fn review_queue(boards: &[(Project, Board)]) -> Vec<ReviewQueueItem> {
    let mut items: Vec<ReviewQueueItem> = boards
        .iter()
        .flat_map(|(project, board)| {
            board
                .tasks
                .iter()
                .filter(|task| needs_review(task))
                .map(|task| ReviewQueueItem {
                    project_id: project.id.clone(),
                    project_name: project.name.clone(),
                    task: task.clone(),
                })
        })
        .collect();

    items.sort_by_key(|item| {
        (
            priority_rank(item.task.priority.as_deref()),
            Reverse(item.task.updated.clone()),
        )
    });
    items
}

// ── Project cards ─────────────────────────────────────────────────────

/// Summary card for the dashboard landing view. `last_updated` is None
/// when the project has no board yet.
pub fn project_card(project: &Project, board: Option<&Board>) -> ProjectCard {
    let tasks: &[Task] = board.map(|b| b.tasks.as_slice()).unwrap_or_default();
    ProjectCard {
        id: project.id.clone(),
        name: project.name.clone(),
        status: project.status.clone(),
        description: project.description.clone(),
        priority: project.priority.clone(),
        task_count: tasks.len(),
        in_progress_count: tasks
            .iter()
            .filter(|t| classify(t) == Column::InProgress)
            .count(),
        review_count: tasks.iter().filter(|t| needs_review(t)).count(),
        last_updated: board.and_then(|b| b.last_updated.clone()),
    }
}

// ── Standup parsing ───────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Completed,
    InProgress,
    NeedsAttention,
}

/// Which section a heading line selects, if any.
fn section_for_heading(heading: &str) -> Option<Section> {
    let lower = heading.to_lowercase();
    if lower.contains("completed") || lower.contains("done") || heading.contains('✅') {
        Some(Section::Completed)
    } else if lower.contains("in progress") || heading.contains('🔄') {
        Some(Section::InProgress)
    } else if lower.contains("attention") || lower.contains("blocked") || heading.contains('⚠') {
        Some(Section::NeedsAttention)
    } else {
        None
    }
}

/// Parse standup markdown into its three sections.
///
/// A single current-section variable drives the machine: headings with a
/// recognized marker switch it (an unrecognized heading clears it, so a
/// later unrelated section doesn't leak into the previous one), bullet
/// lines append to whatever is current with `**` markers stripped, and
/// every other line is dropped. Malformed input can't fail; worst case
/// all sections come back empty.
pub fn parse_standup(text: &str) -> StandupSummary {
    let mut summary = StandupSummary::default();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            current = section_for_heading(trimmed);
            continue;
        }
        if let Some(item) = trimmed.strip_prefix("- ") {
            let item = item.replace("**", "");
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match current {
                Some(Section::Completed) => summary.completed.push(item.to_string()),
                Some(Section::InProgress) => summary.in_progress.push(item.to_string()),
                Some(Section::NeedsAttention) => summary.needs_attention.push(item.to_string()),
                None => {}
            }
        }
    }

    summary
}
