//! Task command implementations.

use super::{Workspace, format_ms, parse_due};
use crate::cli::{TaskCommands, TaskCreateArgs, TaskFieldArgs, TaskListArgs};
use crate::error::Result;
use crate::model::{NewTask, Task, TaskPriority, TaskQuery, TaskStatus, TaskUpdate};
use crate::validate::{normalize_priority, normalize_status, require_title};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Output for task list.
#[derive(Serialize)]
struct TaskListOutput<'a> {
    tasks: &'a [Task],
    count: usize,
    total: i64,
    page: u32,
    limit: u32,
}

/// Output for bulk operations and delete.
#[derive(Serialize)]
struct AffectedOutput<'a> {
    action: &'a str,
    ids: &'a [i64],
    affected: usize,
}

/// Execute task commands.
///
/// # Errors
///
/// Returns validation errors for bad input, `TaskNotFound` for unknown IDs,
/// or a storage error.
pub fn execute(command: &TaskCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let ws = Workspace::open(db_path)?;

    match command {
        TaskCommands::Create(args) => create(&ws, args, json),
        TaskCommands::Show { id } => print_task(&ws.tasks.get_by_id(*id)?, json),
        TaskCommands::List(args) => list(&ws, args, json),
        TaskCommands::Update { id, fields } => {
            let task = ws.tasks.update(*id, &to_update(fields)?)?;
            print_task(&task, json)
        }
        TaskCommands::Delete { id } => {
            ws.tasks.delete(*id)?;
            print_affected("deleted", &[*id], 1, json)
        }
        TaskCommands::BulkUpdate { ids, fields } => {
            let affected = ws.tasks.bulk_update(ids, &to_update(fields)?)?;
            print_affected("updated", ids, affected, json)
        }
        TaskCommands::BulkDelete { ids } => {
            let affected = ws.tasks.bulk_delete(ids)?;
            print_affected("deleted", ids, affected, json)
        }
        TaskCommands::Stats => stats(&ws, json),
        TaskCommands::ByEmail { email_id } => {
            print_tasks(&ws.tasks.list_by_email_id(email_id)?, json)
        }
        TaskCommands::ByCategory { category } => {
            print_tasks(&ws.tasks.list_by_category(category)?, json)
        }
    }
}

fn create(ws: &Workspace, args: &TaskCreateArgs, json: bool) -> Result<()> {
    let title = require_title(&args.title)?;

    let new_task = NewTask {
        title: title.to_string(),
        description: args.description.clone(),
        status: args.status.as_deref().map(normalize_status).transpose()?,
        priority: args.priority.as_deref().map(normalize_priority).transpose()?,
        category: args.category.clone(),
        email_id: args.email_id.clone(),
        one_line_summary: args.summary.clone(),
        due_date: args.due.as_deref().map(parse_due).transpose()?,
    };

    let task = ws.tasks.create(&new_task)?;

    if json {
        println!("{}", serde_json::to_string(&task)?);
    } else {
        println!("Created task #{}: {}", task.id, task.title);
        println!("  Status: {}", task.status);
        println!("  Priority: {}", task.priority);
    }
    Ok(())
}

fn to_update(fields: &TaskFieldArgs) -> Result<TaskUpdate> {
    let title = fields
        .title
        .as_deref()
        .map(|t| require_title(t).map(ToString::to_string))
        .transpose()?;

    Ok(TaskUpdate {
        title,
        description: fields.description.clone(),
        status: fields.status.as_deref().map(normalize_status).transpose()?,
        priority: fields.priority.as_deref().map(normalize_priority).transpose()?,
        category: fields.category.clone(),
        email_id: fields.email_id.clone(),
        one_line_summary: fields.summary.clone(),
        due_date: fields.due.as_deref().map(parse_due).transpose()?,
    })
}

fn list(ws: &Workspace, args: &TaskListArgs, json: bool) -> Result<()> {
    let query = TaskQuery {
        page: args.page,
        limit: args.limit.unwrap_or(ws.config.page_size),
        status: args.status.as_deref().map(normalize_status).transpose()?,
        priority: args.priority.as_deref().map(normalize_priority).transpose()?,
        search: args.search.clone(),
    };

    let page = ws.tasks.list(&query)?;

    if json {
        let output = TaskListOutput {
            tasks: &page.tasks,
            count: page.tasks.len(),
            total: page.total,
            page: query.page.max(1),
            limit: query.limit,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if page.tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    for task in &page.tasks {
        print_task_line(task);
    }
    println!();
    println!(
        "{}",
        format!(
            "Page {} · showing {} of {} matching",
            query.page.max(1),
            page.tasks.len(),
            page.total
        )
        .dimmed()
    );
    Ok(())
}

fn stats(ws: &Workspace, json: bool) -> Result<()> {
    let stats = ws.tasks.stats()?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    println!("{} {}", "Tasks".cyan().bold(), stats.total_tasks);
    if stats.overdue_tasks > 0 {
        println!("  {} {}", "Overdue:".red().bold(), stats.overdue_tasks);
    }

    println!("{}", "By status".cyan().bold());
    for status in TaskStatus::ALL {
        let count = stats.by_status.get(status.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {count}", status.as_str());
    }

    println!("{}", "By priority".cyan().bold());
    for priority in TaskPriority::ALL {
        let count = stats.by_priority.get(priority.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {count}", priority.as_str());
    }

    if !stats.by_category.is_empty() {
        println!("{}", "By category".cyan().bold());
        for (category, count) in &stats.by_category {
            println!("  {category:<12} {count}");
        }
    }
    Ok(())
}

fn print_task(task: &Task, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(task)?);
        return Ok(());
    }

    println!("{} {}", format!("#{}", task.id).bold(), task.title.bold());
    println!("  Status:   {}", colored_status(task.status));
    println!("  Priority: {}", colored_priority(task.priority));
    if !task.category.is_empty() {
        println!("  Category: {}", task.category);
    }
    if let Some(due) = task.due_date {
        println!("  Due:      {}", format_ms(due));
    }
    if let Some(ref email_id) = task.email_id {
        println!("  Email:    {email_id}");
    }
    if let Some(ref summary) = task.one_line_summary {
        println!("  Summary:  {summary}");
    }
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
    println!();
    println!("{}", format!("Created {}", format_ms(task.created_at)).dimmed());
    if let Some(done) = task.completed_at {
        println!("{}", format!("Completed {}", format_ms(done)).dimmed());
    }
    Ok(())
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({ "tasks": tasks, "count": tasks.len() });
        println!("{output}");
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks found.");
    }
    for task in tasks {
        print_task_line(task);
    }
    Ok(())
}

fn print_task_line(task: &Task) {
    let category = if task.category.is_empty() {
        String::new()
    } else {
        format!(" [{}]", task.category).dimmed().to_string()
    };
    println!(
        "{:>5}  {:<11}  {:<6}  {}{category}",
        format!("#{}", task.id),
        colored_status(task.status),
        colored_priority(task.priority),
        task.title
    );
}

fn print_affected(action: &str, ids: &[i64], affected: usize, json: bool) -> Result<()> {
    if json {
        let output = AffectedOutput {
            action,
            ids,
            affected,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let noun = if affected == 1 { "task" } else { "tasks" };
        println!("{} {affected} {noun}", capitalize(action));
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

fn colored_status(status: TaskStatus) -> colored::ColoredString {
    let text = status.as_str();
    match status {
        TaskStatus::Pending => text.yellow(),
        TaskStatus::InProgress => text.blue(),
        TaskStatus::Completed => text.green(),
        TaskStatus::Cancelled => text.dimmed(),
    }
}

fn colored_priority(priority: TaskPriority) -> colored::ColoredString {
    let text = priority.as_str();
    match priority {
        TaskPriority::Low => text.dimmed(),
        TaskPriority::Medium => text.normal(),
        TaskPriority::High => text.yellow(),
        TaskPriority::Urgent => text.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_update_normalizes_synonyms() {
        let fields = TaskFieldArgs {
            status: Some("done".to_string()),
            priority: Some("critical".to_string()),
            ..TaskFieldArgs::default()
        };
        let update = to_update(&fields).unwrap();
        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert_eq!(update.priority, Some(TaskPriority::Urgent));
        assert!(update.title.is_none());
    }

    #[test]
    fn test_to_update_rejects_blank_title() {
        let fields = TaskFieldArgs {
            title: Some("  ".to_string()),
            ..TaskFieldArgs::default()
        };
        assert!(to_update(&fields).is_err());
    }

    #[test]
    fn test_empty_fields_make_empty_update() {
        let update = to_update(&TaskFieldArgs::default()).unwrap();
        assert!(update.title.is_none() && update.status.is_none() && update.due_date.is_none());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("deleted"), "Deleted");
        assert_eq!(capitalize(""), "");
    }
}
