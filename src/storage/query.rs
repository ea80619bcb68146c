//! Small SQL fragment builders.
//!
//! Values only ever travel as bound parameters; the builders join static
//! column/operator skeletons and never interpolate caller input.

use rusqlite::ToSql;

/// Boxed bound parameter.
pub type Param = Box<dyn ToSql>;

/// Borrow a list of boxed params as the slice rusqlite expects.
pub fn as_params(params: &[Param]) -> Vec<&dyn ToSql> {
    params.iter().map(|b| b.as_ref()).collect()
}

/// Conjunction of `(predicate, bound values)` pairs.
#[derive(Default)]
pub struct Predicates {
    clauses: Vec<&'static str>,
    params: Vec<Param>,
}

impl Predicates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate with exactly one `?` placeholder.
    pub fn push<T: ToSql + 'static>(&mut self, predicate: &'static str, value: T) -> &mut Self {
        self.clauses.push(predicate);
        self.params.push(Box::new(value));
        self
    }

    /// Add a predicate whose placeholders are bound in order to `values`.
    pub fn push_many(&mut self, predicate: &'static str, values: Vec<Param>) -> &mut Self {
        debug_assert_eq!(predicate.matches('?').count(), values.len());
        self.clauses.push(predicate);
        self.params.extend(values);
        self
    }

    /// ` WHERE a AND (b OR c)` or an empty string when nothing was pushed.
    #[must_use]
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Consume into the bound values, for appending LIMIT/OFFSET.
    #[must_use]
    pub fn into_params(self) -> Vec<Param> {
        self.params
    }
}

/// Comma-joined `column = ?` assignments for an UPDATE.
#[derive(Default)]
pub struct Assignments {
    columns: Vec<&'static str>,
    params: Vec<Param>,
}

impl Assignments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: ToSql + 'static>(&mut self, column: &'static str, value: T) -> &mut Self {
        self.columns.push(column);
        self.params.push(Box::new(value));
        self
    }

    /// Set `column` only when `value` is present.
    pub fn set_opt<T: ToSql + 'static>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    /// `a = ?, b = ?`
    #[must_use]
    pub fn set_clause(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// Escape LIKE metacharacters so `%`, `_` and `\` match literally.
///
/// Pair with `ESCAPE '\'` in the SQL.
#[must_use]
pub fn like_escape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%term%` with metacharacters escaped.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", like_escape(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_escape_special_chars() {
        assert_eq!(like_escape("50%"), "50\\%");
        assert_eq!(like_escape("a_b"), "a\\_b");
        assert_eq!(like_escape("a\\b"), "a\\\\b");
        assert_eq!(like_escape("plain"), "plain");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("100%_done"), "%100\\%\\_done%");
    }

    #[test]
    fn test_predicates_join_with_and() {
        let mut preds = Predicates::new();
        assert_eq!(preds.where_clause(), "");

        preds.push("status = ?", "pending".to_string());
        preds.push_many(
            "(title LIKE ? OR description LIKE ?)",
            vec![Box::new("%x%".to_string()), Box::new("%x%".to_string())],
        );
        assert_eq!(
            preds.where_clause(),
            " WHERE status = ? AND (title LIKE ? OR description LIKE ?)"
        );
        assert_eq!(preds.params().len(), 3);
    }

    #[test]
    fn test_assignments_skip_absent() {
        let mut sets = Assignments::new();
        sets.set("updated_at", 1_i64);
        sets.set_opt("title", Some("t".to_string()));
        sets.set_opt::<String>("description", None);
        assert_eq!(sets.set_clause(), "updated_at = ?, title = ?");
        assert_eq!(sets.params().len(), 2);
    }

    #[test]
    fn test_bound_values_execute() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT); INSERT INTO t VALUES ('50%'), ('500');")
            .unwrap();

        let mut preds = Predicates::new();
        preds.push("name LIKE ? ESCAPE '\\'", contains_pattern("50%"));
        let sql = format!("SELECT COUNT(*) FROM t{}", preds.where_clause());
        let count: i64 = conn
            .query_row(&sql, as_params(preds.params()).as_slice(), |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
