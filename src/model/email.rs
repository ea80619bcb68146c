//! Email model for mailtask.
//!
//! Emails arrive from the mail bridge already annotated by the classifier
//! (`ai_*` fields). The store keys them by the provider's message id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An email record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Provider message identifier
    pub id: String,
    #[serde(default = "crate::model::default_user_id")]
    pub user_id: i64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Provider receive timestamp (Unix milliseconds)
    #[serde(default)]
    pub received_time: Option<i64>,
    /// User-confirmed category
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ai_category: Option<String>,
    #[serde(default)]
    pub ai_confidence: Option<f64>,
    #[serde(default)]
    pub ai_reasoning: Option<String>,
    #[serde(default)]
    pub one_line_summary: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Stamped by the store on every save (Unix milliseconds)
    #[serde(default)]
    pub processed_at: Option<i64>,
}

impl Email {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: crate::model::DEFAULT_USER_ID,
            subject: None,
            sender: None,
            recipient: None,
            content: None,
            received_time: None,
            category: None,
            ai_category: None,
            ai_confidence: None,
            ai_reasoning: None,
            one_line_summary: None,
            conversation_id: None,
            processed_at: None,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    #[must_use]
    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.to_string());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    #[must_use]
    pub fn with_received_time(mut self, received_ms: i64) -> Self {
        self.received_time = Some(received_ms);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Attach classifier output.
    #[must_use]
    pub fn with_ai(mut self, category: &str, confidence: f64) -> Self {
        self.ai_category = Some(category.to_string());
        self.ai_confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = Some(conversation_id.to_string());
        self
    }
}

/// One page of search results plus the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPage {
    pub emails: Vec<Email>,
    pub total: i64,
}

/// Message count for one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderCount {
    pub sender: String,
    pub count: i64,
}

/// Aggregate email counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailStats {
    pub total_emails: i64,
    /// Keyed by `ai_category`, with unclassified mail under `uncategorized`
    pub by_category: BTreeMap<String, i64>,
    pub top_senders: Vec<SenderCount>,
}

/// How often the user agreed with the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub total_classified: i64,
    pub user_corrected: i64,
    pub accuracy_percentage: f64,
    pub average_confidence: f64,
}

impl AccuracyStats {
    /// Derive the percentages from raw counts.
    ///
    /// Both ratios are 0 when there is nothing to divide by.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(
        total_classified: i64,
        user_corrected: i64,
        average_confidence: Option<f64>,
    ) -> Self {
        let accuracy_percentage = if total_classified == 0 {
            0.0
        } else {
            (total_classified - user_corrected) as f64 / total_classified as f64 * 100.0
        };

        Self {
            total_classified,
            user_corrected,
            accuracy_percentage,
            average_confidence: average_confidence.unwrap_or(0.0),
        }
    }
}
