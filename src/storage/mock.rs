//! Expectation-replaying implementation of [`Connection`] for tests
//!
//! A `MockConnection` starts with no expectations. Tests register the
//! statements a handler is supposed to issue, with the exact argument list
//! and the canned result, then drive the handler and finally check
//! [`MockConnection::expectations_were_met`]. Any call that does not match
//! fails with an error and is remembered, so the final check reports it even
//! when the handler swallowed the failure into a 500.
//!
//! ```rust,ignore
//! use master_api::params;
//! use master_api::core::{CommandTag, Connection};
//! use master_api::storage::MockConnection;
//!
//! let mock = MockConnection::new();
//! mock.expect_execute("CALL delete_master_violation($1)")
//!     .with_args(params![1])
//!     .will_return_result(CommandTag::new("CALL", 1));
//!
//! mock.execute("CALL delete_master_violation($1)", &params![1]).await?;
//! mock.expectations_were_met()?;
//! ```

use crate::core::{CommandTag, Connection, Row, SqlParam};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Kind of statement an expectation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Execute,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Query => write!(f, "query"),
            CallKind::Execute => write!(f, "execute"),
        }
    }
}

/// An invocation received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub sql: String,
    pub args: Vec<SqlParam>,
}

impl fmt::Display for RecordedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} `{}` with [{}]", self.kind, self.sql, args)
    }
}

/// Canned result rows, built column-first like a result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockRows {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl MockRows {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; values are matched to columns by position
    ///
    /// # Panics
    ///
    /// Panics if the number of values differs from the number of columns.
    pub fn add_row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row has {} values for {} columns",
            values.len(),
            self.columns.len()
        );
        self.rows
            .push(self.columns.iter().cloned().zip(values).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Rows(Vec<Row>),
    Result(CommandTag),
    Error(String),
}

#[derive(Debug, Clone)]
struct Expectation {
    kind: CallKind,
    sql: String,
    args: Option<Vec<SqlParam>>,
    outcome: Outcome,
    fulfilled: bool,
}

impl Expectation {
    fn matches(&self, kind: CallKind, sql: &str, args: &[SqlParam]) -> bool {
        self.kind == kind
            && self.sql == normalize_sql(sql)
            && self.args.as_deref().is_none_or(|expected| expected == args)
    }

    fn describe(&self) -> String {
        match &self.args {
            Some(args) => {
                let args = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} `{}` with [{}]", self.kind, self.sql, args)
            }
            None => format!("{} `{}` with any arguments", self.kind, self.sql),
        }
    }
}

#[derive(Debug)]
struct MockState {
    expectations: Vec<Expectation>,
    ordered: bool,
    calls: Vec<RecordedCall>,
    unexpected: Vec<String>,
    closed: bool,
}

/// In-memory test double for [`Connection`]
///
/// Cloning yields another handle to the same expectations, so a test can keep
/// one handle while the router owns the other.
#[derive(Debug, Clone)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    /// Create a mock with no expectations, matching them in order
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                expectations: Vec::new(),
                ordered: true,
                calls: Vec::new(),
                unexpected: Vec::new(),
                closed: false,
            })),
        }
    }

    /// Choose whether calls must arrive in registration order (default `true`)
    pub fn match_expectations_in_order(&self, ordered: bool) {
        self.lock().ordered = ordered;
    }

    /// Expect a row-returning statement
    pub fn expect_query(&self, sql: impl AsRef<str>) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, CallKind::Query, sql.as_ref())
    }

    /// Expect a data-modifying statement
    pub fn expect_execute(&self, sql: impl AsRef<str>) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, CallKind::Execute, sql.as_ref())
    }

    /// Every invocation received so far, matched or not
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Whether [`Connection::close`] was called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Fail if an expectation was never met or an unexpected call arrived
    pub fn expectations_were_met(&self) -> Result<()> {
        let state = self.lock();
        let mut problems: Vec<String> = state
            .unexpected
            .iter()
            .map(|call| format!("unexpected call: {}", call))
            .collect();

        problems.extend(
            state
                .expectations
                .iter()
                .filter(|e| !e.fulfilled)
                .map(|e| format!("expected {} was not called", e.describe())),
        );

        if problems.is_empty() {
            Ok(())
        } else {
            bail!("{}", problems.join("; "))
        }
    }

    /// Panicking form of [`expectations_were_met`](Self::expectations_were_met)
    ///
    /// # Panics
    ///
    /// Panics with the mismatch report.
    pub fn assert_expectations_met(&self) {
        if let Err(e) = self.expectations_were_met() {
            panic!("unmet database expectations: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the expectation report.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn push(&self, expectation: Expectation) {
        self.lock().expectations.push(expectation);
    }

    fn dispatch(&self, kind: CallKind, sql: &str, args: &[SqlParam]) -> Result<Outcome> {
        let mut state = self.lock();
        let call = RecordedCall {
            kind,
            sql: normalize_sql(sql),
            args: args.to_vec(),
        };
        state.calls.push(call.clone());

        let candidate = if state.ordered {
            state
                .expectations
                .iter()
                .position(|e| !e.fulfilled)
                .filter(|&i| state.expectations[i].matches(kind, sql, args))
        } else {
            state
                .expectations
                .iter()
                .position(|e| !e.fulfilled && e.matches(kind, sql, args))
        };

        let Some(index) = candidate else {
            let report = match state.expectations.iter().find(|e| !e.fulfilled) {
                Some(next) if state.ordered => {
                    format!("{}, next expected {}", call, next.describe())
                }
                _ => call.to_string(),
            };
            state.unexpected.push(report.clone());
            return Err(anyhow!("unexpected call: {}", report));
        };

        let expectation = &mut state.expectations[index];
        expectation.fulfilled = true;
        Ok(expectation.outcome.clone())
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(&self, sql: &str, args: &[SqlParam]) -> Result<Vec<Row>> {
        match self.dispatch(CallKind::Query, sql, args)? {
            Outcome::Rows(rows) => Ok(rows),
            Outcome::Result(tag) => bail!("query `{}` was scripted to return {}", sql, tag),
            Outcome::Error(msg) => Err(anyhow!(msg)),
        }
    }

    async fn execute(&self, sql: &str, args: &[SqlParam]) -> Result<CommandTag> {
        match self.dispatch(CallKind::Execute, sql, args)? {
            Outcome::Result(tag) => Ok(tag),
            Outcome::Rows(_) => Ok(CommandTag::for_statement(sql, 0)),
            Outcome::Error(msg) => Err(anyhow!(msg)),
        }
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {
        self.lock().closed = true;
    }
}

/// Builder returned by `expect_query` / `expect_execute`
///
/// The expectation is registered by one of the `will_return_*` methods.
#[must_use = "an expectation is only registered by a will_return_* call"]
#[derive(Debug)]
pub struct ExpectationBuilder<'a> {
    mock: &'a MockConnection,
    kind: CallKind,
    sql: String,
    args: Option<Vec<SqlParam>>,
}

impl<'a> ExpectationBuilder<'a> {
    fn new(mock: &'a MockConnection, kind: CallKind, sql: &str) -> Self {
        Self {
            mock,
            kind,
            sql: normalize_sql(sql),
            args: None,
        }
    }

    /// Require exactly these arguments, in this order
    pub fn with_args(mut self, args: Vec<SqlParam>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn will_return_rows(self, rows: MockRows) -> &'a MockConnection {
        self.register(Outcome::Rows(rows.into_rows()))
    }

    pub fn will_return_result(self, tag: CommandTag) -> &'a MockConnection {
        self.register(Outcome::Result(tag))
    }

    /// Make the call fail with the given database error message
    pub fn will_return_error(self, message: impl Into<String>) -> &'a MockConnection {
        self.register(Outcome::Error(message.into()))
    }

    fn register(self, outcome: Outcome) -> &'a MockConnection {
        self.mock.push(Expectation {
            kind: self.kind,
            sql: self.sql,
            args: self.args,
            outcome,
            fulfilled: false,
        });
        self.mock
    }
}

fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde_json::json;

    const INSERT: &str = "CALL insert_master_violation($1, $2, $3)";
    const LIST: &str = "SELECT * FROM get_master_violations()";

    #[tokio::test]
    async fn test_matching_execute_returns_scripted_tag() {
        let mock = MockConnection::new();
        mock.expect_execute(INSERT)
            .with_args(params!["Violation A", "High", 1])
            .will_return_result(CommandTag::new("CALL", 1));

        let tag = mock
            .execute(INSERT, &params!["Violation A", "High", 1])
            .await
            .unwrap();

        assert_eq!(tag, CommandTag::new("CALL", 1));
        assert!(mock.expectations_were_met().is_ok());
    }

    #[tokio::test]
    async fn test_sql_whitespace_and_semicolon_are_ignored() {
        let mock = MockConnection::new();
        mock.expect_execute(INSERT)
            .will_return_result(CommandTag::new("CALL", 1));

        mock.execute(
            "\n\t\tCALL insert_master_violation($1, $2, $3);\n\t",
            &params!["x", "y", 0],
        )
        .await
        .unwrap();

        mock.assert_expectations_met();
    }

    #[tokio::test]
    async fn test_wrong_args_fail_and_are_reported() {
        let mock = MockConnection::new();
        mock.expect_execute(INSERT)
            .with_args(params!["Violation A", "High", 1])
            .will_return_result(CommandTag::new("CALL", 1));

        let result = mock.execute(INSERT, &params!["High", "Violation A", 1]).await;
        assert!(result.is_err());

        let report = mock.expectations_were_met().unwrap_err().to_string();
        assert!(report.contains("unexpected call"));
        assert!(report.contains("was not called"));
    }

    #[tokio::test]
    async fn test_missing_call_is_reported() {
        let mock = MockConnection::new();
        mock.expect_query(LIST).will_return_rows(MockRows::new(["id"]));

        let report = mock.expectations_were_met().unwrap_err().to_string();
        assert!(report.contains("get_master_violations"));
    }

    #[tokio::test]
    async fn test_call_without_expectation_fails() {
        let mock = MockConnection::new();
        assert!(mock.query(LIST, &[]).await.is_err());
        assert!(mock.expectations_were_met().is_err());
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_query_returns_rows_in_order() {
        let mock = MockConnection::new();
        mock.expect_query(LIST).will_return_rows(
            MockRows::new(["id", "violation_name"])
                .add_row([json!(1), json!("Violation A")])
                .add_row([json!(2), json!("Violation B")]),
        );

        let rows = mock.query(LIST, &[]).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[1]["violation_name"], json!("Violation B"));
    }

    #[tokio::test]
    async fn test_ordered_matching_rejects_out_of_order_calls() {
        let mock = MockConnection::new();
        mock.expect_execute("CALL delete_master_product($1)")
            .with_args(params![1])
            .will_return_result(CommandTag::new("CALL", 1))
            .expect_execute("CALL delete_master_product($1)")
            .with_args(params![2])
            .will_return_result(CommandTag::new("CALL", 1));

        let sql = "CALL delete_master_product($1)";
        assert!(mock.execute(sql, &params![2]).await.is_err());
    }

    #[tokio::test]
    async fn test_unordered_matching_accepts_any_order() {
        let mock = MockConnection::new();
        mock.match_expectations_in_order(false);
        let sql = "CALL delete_master_product($1)";
        mock.expect_execute(sql)
            .with_args(params![1])
            .will_return_result(CommandTag::new("CALL", 1))
            .expect_execute(sql)
            .with_args(params![2])
            .will_return_result(CommandTag::new("CALL", 1));

        mock.execute(sql, &params![2]).await.unwrap();
        mock.execute(sql, &params![1]).await.unwrap();
        mock.assert_expectations_met();
    }

    #[tokio::test]
    async fn test_scripted_error_is_returned() {
        let mock = MockConnection::new();
        mock.expect_execute(INSERT)
            .will_return_error("relation does not exist");

        let err = mock.execute(INSERT, &params!["a", "b", 1]).await.unwrap_err();
        assert_eq!(err.to_string(), "relation does not exist");
        assert!(mock.expectations_were_met().is_ok());
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_unexpected() {
        let mock = MockConnection::new();
        mock.expect_query(LIST).will_return_rows(MockRows::new(["id"]));

        assert!(mock.execute(LIST, &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_health_check_and_close() {
        let mock = MockConnection::new();
        assert!(mock.health_check().await.is_ok());
        assert!(!mock.is_closed());

        let handle = mock.clone();
        handle.close().await;
        assert!(mock.is_closed());
    }

    #[test]
    #[should_panic(expected = "row has 1 values for 2 columns")]
    fn test_add_row_checks_width() {
        let _ = MockRows::new(["a", "b"]).add_row([json!(1)]);
    }
}
