use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};

use now_core::markdown::{self, Span, SpanStyle};
use now_core::task::Task;
use now_core::views::{self, Stats, TaskStatus};

pub const NOTES: &str = "\
Notes:
  Specify due dates in task descriptions by using the @due:YYYY-MM-DD format
  Basic markdown is supported when adding task descriptions. Use:
    Single asterisks (*) to emphasize the text
    Double asterisks (**) to make the text bold
    Double hashtags (##) to highlight the text, closing with a single #";

pub fn format_date(value: DateTime<Local>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn paint_span(span: &Span) -> ColoredString {
    let text = span.text.as_str();
    match span.style {
        SpanStyle::Plain => text.normal(),
        SpanStyle::Bold => text.bold(),
        SpanStyle::Italic => text.italic(),
        SpanStyle::Highlight => text.cyan(),
    }
}

pub fn paint_description(description: &str) -> String {
    markdown::render(description)
        .iter()
        .map(|span| paint_span(span).to_string())
        .collect()
}

fn paint_status(status: TaskStatus) -> ColoredString {
    let marker = status.marker();
    match status {
        TaskStatus::Done => marker.green(),
        TaskStatus::Overdue => marker.red(),
        TaskStatus::Open => marker.normal(),
    }
}

/// `  3. [ ] description (2d) added: 2025-01-01, done: ..., due: ...`
pub fn task_line(task: &Task, now: DateTime<Local>, raw: bool) -> String {
    let status = views::task_status(task, now);
    let description = if raw {
        task.description.clone()
    } else {
        paint_description(&task.description)
    };

    let mut line = format!(
        "{} {} {} {} {} {}",
        format!("{:>3}.", task.id).yellow(),
        paint_status(status),
        description,
        format!("({}d)", views::age_days(task, now)).dimmed(),
        "added:".dimmed(),
        format_date(task.created_at),
    );
    if task.done {
        if let Some(completed) = task.completed_at {
            line.push_str(&format!(", {} {}", "done:".green(), format_date(completed)));
        }
    }
    if let Some(due) = task.due_at {
        let label = if status == TaskStatus::Overdue {
            "overdue:"
        } else {
            "due:"
        };
        line.push_str(&format!(", {} {}", label.red(), format_date(due)));
    }
    line
}

pub fn stats_block(stats: &Stats) -> String {
    let next_due = stats
        .next_due
        .map(format_date)
        .unwrap_or_else(|| "none".to_string());
    format!(
        "{}\nTotal tasks: {}\nCompleted:   {}\nPending:     {}\nOverdue:     {}\nNext due:    {}",
        "Your task statistics:".bold(),
        stats.total,
        stats.done,
        stats.pending,
        stats.overdue,
        next_due,
    )
}
