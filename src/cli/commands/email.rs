//! Email command implementations.

use super::{Workspace, format_ms};
use crate::cli::EmailCommands;
use crate::error::{Error, Result};
use crate::model::{Email, EmailPage};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

/// Accepts either a single email object or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmailInput {
    One(Box<Email>),
    Many(Vec<Email>),
}

impl EmailInput {
    fn into_vec(self) -> Vec<Email> {
        match self {
            Self::One(email) => vec![*email],
            Self::Many(emails) => emails,
        }
    }
}

/// Output for email save.
#[derive(Serialize)]
struct SaveOutput {
    saved: Vec<Email>,
    count: usize,
}

/// Execute email commands.
///
/// # Errors
///
/// Returns `Validation` for bad input, `EmailNotFound` for unknown IDs,
/// or a storage error.
pub fn execute(command: &EmailCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let ws = Workspace::open(db_path)?;

    match command {
        EmailCommands::Save { file } => save(&ws, file, json),
        EmailCommands::Show { id } => print_email(&ws.emails.get_by_id(id)?, json),
        EmailCommands::List {
            limit,
            offset,
            category,
        } => {
            let limit = limit.unwrap_or(ws.config.page_size);
            let emails = ws.emails.list(limit, *offset, category.as_deref())?;
            print_emails(&emails, json)
        }
        EmailCommands::Search {
            query,
            page,
            per_page,
        } => {
            let per_page = per_page.unwrap_or(ws.config.page_size);
            let results = ws.emails.search(query, *page, per_page)?;
            print_search(&results, *page, json)
        }
        EmailCommands::Thread { conversation_id } => {
            print_emails(&ws.emails.get_conversation(conversation_id)?, json)
        }
        EmailCommands::Classify { id, category } => classify(&ws, id, category, json),
        EmailCommands::Stats { top } => stats(&ws, top.unwrap_or(ws.config.top_senders), json),
        EmailCommands::Accuracy => accuracy(&ws, json),
    }
}

fn save(ws: &Workspace, file: &str, json: bool) -> Result<()> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| Error::Other(format!("Could not read {file}: {e}")))?
    };

    let emails = serde_json::from_str::<EmailInput>(&raw)
        .map_err(|e| Error::Validation(format!("invalid email JSON: {e}")))?
        .into_vec();
    if let Some(bad) = emails.iter().find(|e| e.id.trim().is_empty()) {
        return Err(Error::Validation(format!(
            "email id must not be empty (subject: {:?})",
            bad.subject
        )));
    }

    let saved = emails
        .iter()
        .map(|email| ws.emails.save(email))
        .collect::<Result<Vec<_>>>()?;

    if json {
        let output = SaveOutput {
            count: saved.len(),
            saved,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for email in &saved {
            println!("Saved email {}", email.id.bold());
        }
    }
    Ok(())
}

fn classify(ws: &Workspace, id: &str, category: &str, json: bool) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::Validation("category must not be empty".to_string()));
    }
    ws.emails.update_classification(id, category)?;

    if json {
        let output = serde_json::json!({ "id": id, "category": category });
        println!("{output}");
    } else {
        println!("Classified {} as {}", id.bold(), category.green());
    }
    Ok(())
}

fn stats(ws: &Workspace, top: u32, json: bool) -> Result<()> {
    let stats = ws.emails.stats(top)?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    println!("{} {}", "Emails".cyan().bold(), stats.total_emails);
    println!("{}", "By AI category".cyan().bold());
    for (category, count) in &stats.by_category {
        println!("  {category:<16} {count}");
    }
    if !stats.top_senders.is_empty() {
        println!("{}", "Top senders".cyan().bold());
        for sender in &stats.top_senders {
            println!("  {:<32} {}", sender.sender, sender.count);
        }
    }
    Ok(())
}

fn accuracy(ws: &Workspace, json: bool) -> Result<()> {
    let stats = ws.emails.accuracy_stats()?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    println!("{}", "Classifier accuracy".cyan().bold());
    println!("  Classified:  {}", stats.total_classified);
    println!("  Corrected:   {}", stats.user_corrected);
    println!("  Accuracy:    {:.1}%", stats.accuracy_percentage);
    println!("  Confidence:  {:.2}", stats.average_confidence);
    Ok(())
}

fn print_email(email: &Email, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(email)?);
        return Ok(());
    }

    println!("{}", email.subject.as_deref().unwrap_or("(no subject)").bold());
    println!("  ID:       {}", email.id);
    if let Some(ref sender) = email.sender {
        println!("  From:     {sender}");
    }
    if let Some(ref recipient) = email.recipient {
        println!("  To:       {recipient}");
    }
    if let Some(received) = email.received_time {
        println!("  Received: {}", format_ms(received));
    }
    if let Some(ref category) = email.category {
        println!("  Category: {}", category.green());
    }
    if let Some(ref ai_category) = email.ai_category {
        let confidence = email
            .ai_confidence
            .map(|c| format!(" ({c:.2})"))
            .unwrap_or_default();
        println!("  AI:       {ai_category}{}", confidence.dimmed());
    }
    if let Some(ref summary) = email.one_line_summary {
        println!("  Summary:  {summary}");
    }
    if let Some(ref content) = email.content {
        println!();
        println!("{content}");
    }
    Ok(())
}

fn print_emails(emails: &[Email], json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({ "emails": emails, "count": emails.len() });
        println!("{output}");
        return Ok(());
    }

    if emails.is_empty() {
        println!("No emails found.");
    }
    for email in emails {
        print_email_line(email);
    }
    Ok(())
}

fn print_search(results: &EmailPage, page: u32, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "emails": results.emails,
            "count": results.emails.len(),
            "total": results.total,
            "page": page.max(1),
        });
        println!("{output}");
        return Ok(());
    }

    print_emails(&results.emails, false)?;
    println!();
    println!(
        "{}",
        format!(
            "Page {} · showing {} of {} matching",
            page.max(1),
            results.emails.len(),
            results.total
        )
        .dimmed()
    );
    Ok(())
}

fn print_email_line(email: &Email) {
    let received = email.received_time.map(format_ms).unwrap_or_default();
    let category = email
        .category
        .as_deref()
        .or(email.ai_category.as_deref())
        .map(|c| format!(" [{c}]").dimmed().to_string())
        .unwrap_or_default();
    println!(
        "{:<16}  {:<24}  {}{category}  {}",
        received,
        email.sender.as_deref().unwrap_or("-"),
        email.subject.as_deref().unwrap_or("(no subject)"),
        email.id.dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_input_accepts_single_object() {
        let input: EmailInput = serde_json::from_str(r#"{"id": "m1"}"#).unwrap();
        assert_eq!(input.into_vec().len(), 1);
    }

    #[test]
    fn test_email_input_accepts_array() {
        let input: EmailInput =
            serde_json::from_str(r#"[{"id": "m1"}, {"id": "m2", "ai_confidence": 0.5}]"#).unwrap();
        let emails = input.into_vec();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[1].ai_confidence, Some(0.5));
    }
}
