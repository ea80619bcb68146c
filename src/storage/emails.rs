//! Email persistence.
//!
//! Emails are keyed by the provider's message id and saved with upsert
//! semantics; there is no field-by-field update apart from the user's
//! classification correction.

use crate::error::{Error, Result};
use crate::model::{AccuracyStats, Email, EmailPage, EmailStats, SenderCount};
use crate::storage::handle::ConnectionProvider;
use crate::storage::query::{Param, Predicates, as_params, contains_pattern};
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const EMAIL_COLUMNS: &str = "id, user_id, subject, sender, recipient, content, received_date, \
     category, ai_category, ai_confidence, ai_reasoning, one_line_summary, conversation_id, processed_at";

/// Bucket for mail the classifier has not labelled.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Store for email records.
#[derive(Clone)]
pub struct EmailStore {
    provider: Arc<dyn ConnectionProvider>,
}

impl EmailStore {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    /// Insert or fully replace an email, stamping `processed_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, or a database error if the write fails.
    pub fn save(&self, email: &Email) -> Result<Email> {
        let db = self.provider.acquire()?;
        let now = chrono::Utc::now().timestamp_millis();

        db.mutate("save_email", |tx| {
            tx.execute(
                "INSERT INTO emails (id, user_id, subject, sender, recipient, content, received_date,
                                     category, ai_category, ai_confidence, ai_reasoning, one_line_summary,
                                     conversation_id, processed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(id) DO UPDATE SET
                   user_id = excluded.user_id,
                   subject = excluded.subject,
                   sender = excluded.sender,
                   recipient = excluded.recipient,
                   content = excluded.content,
                   received_date = excluded.received_date,
                   category = excluded.category,
                   ai_category = excluded.ai_category,
                   ai_confidence = excluded.ai_confidence,
                   ai_reasoning = excluded.ai_reasoning,
                   one_line_summary = excluded.one_line_summary,
                   conversation_id = excluded.conversation_id,
                   processed_at = excluded.processed_at",
                rusqlite::params![
                    email.id,
                    email.user_id,
                    email.subject,
                    email.sender,
                    email.recipient,
                    email.content,
                    email.received_time,
                    email.category,
                    email.ai_category,
                    email.ai_confidence,
                    email.ai_reasoning,
                    email.one_line_summary,
                    email.conversation_id,
                    now
                ],
            )?;
            Ok(())
        })?;

        debug!(id = %email.id, "Saved email");
        self.get_by_id(&email.id)
    }

    /// Get an email by ID.
    ///
    /// # Errors
    ///
    /// Returns `EmailNotFound` if no row has this ID.
    pub fn get_by_id(&self, id: &str) -> Result<Email> {
        let db = self.provider.acquire()?;
        db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {EMAIL_COLUMNS} FROM emails WHERE id = ?1"),
                [id],
                map_email_row,
            )
            .optional()?
            .ok_or_else(|| Error::EmailNotFound { id: id.to_string() })
        })
    }

    /// List emails, most recently received first.
    ///
    /// A category matches either the user-confirmed or the AI category.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list(&self, limit: u32, offset: u32, category: Option<&str>) -> Result<Vec<Email>> {
        let db = self.provider.acquire()?;

        let mut preds = Predicates::new();
        if let Some(cat) = category.filter(|c| !c.is_empty()) {
            preds.push_many(
                "(category = ? OR ai_category = ?)",
                vec![Box::new(cat.to_string()), Box::new(cat.to_string())],
            );
        }

        let sql = format!(
            "SELECT {EMAIL_COLUMNS} FROM emails{}
             ORDER BY received_date DESC, id ASC LIMIT ? OFFSET ?",
            preds.where_clause()
        );
        let mut params: Vec<Param> = preds.into_params();
        params.push(Box::new(i64::from(limit)));
        params.push(Box::new(i64::from(offset)));

        db.with_conn(|conn| query_emails(conn, &sql, &params))
    }

    /// Substring search over subject, sender and content.
    ///
    /// `%` and `_` in the query match literally.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty query or a zero page size.
    pub fn search(&self, query: &str, page: u32, per_page: u32) -> Result<EmailPage> {
        let db = self.provider.acquire()?;
        if query.is_empty() {
            return Err(Error::Validation("search query must not be empty".to_string()));
        }
        if per_page == 0 {
            return Err(Error::Validation("per_page must be at least 1".to_string()));
        }

        let pattern = contains_pattern(query);
        let mut preds = Predicates::new();
        preds.push_many(
            "(subject LIKE ? ESCAPE '\\' OR sender LIKE ? ESCAPE '\\' OR content LIKE ? ESCAPE '\\')",
            vec![
                Box::new(pattern.clone()),
                Box::new(pattern.clone()),
                Box::new(pattern),
            ],
        );
        let where_clause = preds.where_clause();
        let offset = i64::from(page.max(1) - 1) * i64::from(per_page);

        db.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM emails{where_clause}"),
                as_params(preds.params()).as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "SELECT {EMAIL_COLUMNS} FROM emails{where_clause}
                 ORDER BY received_date DESC, id ASC LIMIT ? OFFSET ?"
            );
            let mut params = preds.into_params();
            params.push(Box::new(i64::from(per_page)));
            params.push(Box::new(offset));

            let emails = query_emails(conn, &sql, &params)?;
            Ok(EmailPage { emails, total })
        })
    }

    /// All emails in a thread, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty conversation ID.
    pub fn get_conversation(&self, conversation_id: &str) -> Result<Vec<Email>> {
        let db = self.provider.acquire()?;
        if conversation_id.is_empty() {
            return Err(Error::Validation(
                "conversation_id must not be empty".to_string(),
            ));
        }

        let sql = format!(
            "SELECT {EMAIL_COLUMNS} FROM emails WHERE conversation_id = ?
             ORDER BY received_date ASC, id ASC"
        );
        let params: Vec<Param> = vec![Box::new(conversation_id.to_string())];
        db.with_conn(|conn| query_emails(conn, &sql, &params))
    }

    /// Record the user's category. `ai_category` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `EmailNotFound` if no row has this ID.
    pub fn update_classification(&self, id: &str, category: &str) -> Result<()> {
        let db = self.provider.acquire()?;
        db.mutate("update_email_classification", |tx| {
            let rows = tx.execute(
                "UPDATE emails SET category = ?1 WHERE id = ?2",
                rusqlite::params![category, id],
            )?;
            if rows == 0 {
                return Err(Error::EmailNotFound { id: id.to_string() });
            }
            Ok(())
        })?;

        debug!(id, category, "Updated email classification");
        Ok(())
    }

    /// Totals, per-AI-category counts and the busiest senders.
    ///
    /// # Errors
    ///
    /// Returns a database error if any aggregate query fails.
    pub fn stats(&self, top_senders_limit: u32) -> Result<EmailStats> {
        let db = self.provider.acquire()?;

        db.with_conn(|conn| {
            let total_emails: i64 =
                conn.query_row("SELECT COUNT(*) FROM emails", [], |row| row.get(0))?;

            let mut stmt = conn.prepare(
                "SELECT COALESCE(NULLIF(ai_category, ''), ?1) AS bucket, COUNT(*) FROM emails GROUP BY bucket",
            )?;
            let by_category = stmt
                .query_map([UNCATEGORIZED], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT sender, COUNT(*) AS n FROM emails
                 WHERE sender IS NOT NULL AND sender != ''
                 GROUP BY sender ORDER BY n DESC, sender ASC LIMIT ?1",
            )?;
            let top_senders = stmt
                .query_map([i64::from(top_senders_limit)], |row| {
                    Ok(SenderCount {
                        sender: row.get(0)?,
                        count: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(EmailStats {
                total_emails,
                by_category,
                top_senders,
            })
        })
    }

    /// How often the user kept the classifier's category.
    ///
    /// Only emails with both a non-empty `ai_category` and a non-empty
    /// `category` count as classified.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn accuracy_stats(&self) -> Result<AccuracyStats> {
        let db = self.provider.acquire()?;

        db.with_conn(|conn| {
            let (total_classified, user_corrected): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(CASE WHEN category != ai_category THEN 1 ELSE 0 END), 0)
                 FROM emails
                 WHERE ai_category IS NOT NULL AND ai_category != ''
                   AND category IS NOT NULL AND category != ''",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let average_confidence: Option<f64> = conn.query_row(
                "SELECT AVG(ai_confidence) FROM emails WHERE ai_confidence IS NOT NULL",
                [],
                |row| row.get(0),
            )?;

            Ok(AccuracyStats::from_counts(
                total_classified,
                user_corrected,
                average_confidence,
            ))
        })
    }
}

fn query_emails(conn: &Connection, sql: &str, params: &[Param]) -> Result<Vec<Email>> {
    let mut stmt = conn.prepare(sql)?;
    let emails = stmt
        .query_map(as_params(params).as_slice(), map_email_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(emails)
}

fn map_email_row(row: &Row) -> rusqlite::Result<Email> {
    Ok(Email {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject: row.get(2)?,
        sender: row.get(3)?,
        recipient: row.get(4)?,
        content: row.get(5)?,
        received_time: row.get(6)?,
        category: row.get(7)?,
        ai_category: row.get(8)?,
        ai_confidence: row.get(9)?,
        ai_reasoning: row.get(10)?,
        one_line_summary: row.get(11)?,
        conversation_id: row.get(12)?,
        processed_at: row.get(13)?,
    })
}
