//! Input validation for values typed at the command line.
//!
//! Provides O(1) synonym maps so users can write natural words for
//! statuses and priorities. Three-tier resolution: exact match → synonym
//! lookup → error with suggestion.

use crate::error::{Error, Result};
use crate::model::{TaskPriority, TaskStatus};
use std::collections::HashMap;
use std::sync::LazyLock;

// ── Synonym maps ─────────────────────────────────────────────

pub static STATUS_SYNONYMS: LazyLock<HashMap<&str, TaskStatus>> = LazyLock::new(|| {
    [
        ("done", TaskStatus::Completed),
        ("complete", TaskStatus::Completed),
        ("finished", TaskStatus::Completed),
        ("closed", TaskStatus::Completed),
        ("resolved", TaskStatus::Completed),
        ("wip", TaskStatus::InProgress),
        ("working", TaskStatus::InProgress),
        ("active", TaskStatus::InProgress),
        ("started", TaskStatus::InProgress),
        ("in-progress", TaskStatus::InProgress),
        ("todo", TaskStatus::Pending),
        ("new", TaskStatus::Pending),
        ("open", TaskStatus::Pending),
        ("canceled", TaskStatus::Cancelled),
        ("dropped", TaskStatus::Cancelled),
        ("wontfix", TaskStatus::Cancelled),
    ]
    .into_iter()
    .collect()
});

pub static PRIORITY_SYNONYMS: LazyLock<HashMap<&str, TaskPriority>> = LazyLock::new(|| {
    [
        ("critical", TaskPriority::Urgent),
        ("crit", TaskPriority::Urgent),
        ("asap", TaskPriority::Urgent),
        ("highest", TaskPriority::Urgent),
        ("important", TaskPriority::High),
        ("normal", TaskPriority::Medium),
        ("default", TaskPriority::Medium),
        ("med", TaskPriority::Medium),
        ("minor", TaskPriority::Low),
        ("lowest", TaskPriority::Low),
        ("trivial", TaskPriority::Low),
    ]
    .into_iter()
    .collect()
});

/// Resolve a status word to a [`TaskStatus`].
///
/// # Errors
///
/// Returns `Validation` naming the closest known word, if any.
pub fn normalize_status(input: &str) -> Result<TaskStatus> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if let Ok(status) = lower.parse::<TaskStatus>() {
        return Ok(status);
    }

    // Tier 2: synonym lookup
    if let Some(&status) = STATUS_SYNONYMS.get(lower.as_str()) {
        return Ok(status);
    }

    // Tier 3: find closest suggestion
    let canonical = TaskStatus::ALL.map(|s| s.as_str());
    let suggestion = closest_match(&lower, &canonical, &STATUS_SYNONYMS, TaskStatus::as_str);
    Err(invalid("status", input, suggestion))
}

/// Resolve a priority word to a [`TaskPriority`].
///
/// # Errors
///
/// Returns `Validation` naming the closest known word, if any.
pub fn normalize_priority(input: &str) -> Result<TaskPriority> {
    let lower = input.trim().to_lowercase();

    if let Ok(priority) = lower.parse::<TaskPriority>() {
        return Ok(priority);
    }

    if let Some(&priority) = PRIORITY_SYNONYMS.get(lower.as_str()) {
        return Ok(priority);
    }

    let canonical = TaskPriority::ALL.map(|p| p.as_str());
    let suggestion = closest_match(&lower, &canonical, &PRIORITY_SYNONYMS, TaskPriority::as_str);
    Err(invalid("priority", input, suggestion))
}

/// Reject blank titles before they reach the store.
///
/// # Errors
///
/// Returns `Validation` if the title is empty or only whitespace.
pub fn require_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("title must not be empty".to_string()));
    }
    Ok(trimmed)
}

fn invalid(field: &str, input: &str, suggestion: Option<String>) -> Error {
    match suggestion {
        Some(s) => Error::Validation(format!("unknown {field} '{input}' (did you mean '{s}'?)")),
        None => Error::Validation(format!("unknown {field} '{input}'")),
    }
}

/// Find the closest canonical word across the valid set and synonyms.
///
/// Synonym hits are reported as the canonical value they map to.
fn closest_match<T: Copy>(
    input: &str,
    valid: &[&'static str],
    synonyms: &HashMap<&str, T>,
    name: fn(&T) -> &'static str,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            let shown = synonyms.get(v).map_or(v, name);
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status("pending").unwrap(), TaskStatus::Pending);
        assert_eq!(normalize_status("done").unwrap(), TaskStatus::Completed);
        assert_eq!(normalize_status("wip").unwrap(), TaskStatus::InProgress);
        assert_eq!(normalize_status("In_Progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(normalize_status("todo").unwrap(), TaskStatus::Pending);
        assert!(normalize_status("nonsense").is_err());
    }

    #[test]
    fn test_status_suggestion() {
        let err = normalize_status("completd").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("did you mean 'completed'"));
    }

    #[test]
    fn test_synonym_suggestion_shows_canonical() {
        let err = normalize_status("finishd").unwrap_err();
        assert!(err.to_string().contains("'completed'"));
    }

    #[test]
    fn test_normalize_priority() {
        assert_eq!(normalize_priority("high").unwrap(), TaskPriority::High);
        assert_eq!(normalize_priority("critical").unwrap(), TaskPriority::Urgent);
        assert_eq!(normalize_priority("normal").unwrap(), TaskPriority::Medium);
        assert_eq!(normalize_priority(" LOW ").unwrap(), TaskPriority::Low);
        assert!(normalize_priority("nonsense").is_err());
    }

    #[test]
    fn test_require_title() {
        assert_eq!(require_title("  Ship report ").unwrap(), "Ship report");
        assert!(matches!(require_title("   "), Err(Error::Validation(_))));
        assert!(matches!(require_title(""), Err(Error::Validation(_))));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }
}
