//! Typed stored-procedure descriptors
//!
//! Every database routine the API touches is declared once as a
//! [`Procedure`]: its name, how it is invoked, and the ordered types of its
//! positional parameters. Handlers never build SQL strings themselves; they
//! bind a descriptor with the arguments of a validated record and hand the
//! resulting [`BoundCall`] to a [`Connection`].

use super::connection::{CommandTag, Connection, Row, SqlParam};
use anyhow::Result;
use thiserror::Error;

/// Type of a positional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Text,
}

impl ParamType {
    fn matches(self, param: &SqlParam) -> bool {
        matches!(
            (self, param),
            (ParamType::Int, SqlParam::Int(_)) | (ParamType::Text, SqlParam::Text(_))
        )
    }
}

/// How the routine is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// `CALL name(...)`, returns a command tag
    Call,
    /// `SELECT * FROM name(...)`, returns rows
    SelectFrom,
}

/// Errors raised while binding or verifying descriptors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcedureError {
    #[error("{procedure} expects {expected} argument(s), got {actual}")]
    Arity {
        procedure: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{procedure} argument ${position} must be {expected:?}, got {actual}")]
    ArgumentType {
        procedure: &'static str,
        position: usize,
        expected: ParamType,
        actual: String,
    },

    #[error("{procedure} is invoked with {style:?} and cannot be used this way")]
    WrongStyle {
        procedure: &'static str,
        style: CallStyle,
    },

    #[error("'{name}' is not a valid routine name")]
    InvalidName { name: &'static str },

    #[error("routine '{name}' is declared more than once")]
    Duplicate { name: &'static str },
}

/// Descriptor of a stored procedure or set-returning function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Procedure {
    name: &'static str,
    style: CallStyle,
    params: &'static [ParamType],
}

impl Procedure {
    /// Declare a procedure invoked with `CALL`
    pub const fn call(name: &'static str, params: &'static [ParamType]) -> Self {
        Self {
            name,
            style: CallStyle::Call,
            params,
        }
    }

    /// Declare a set-returning function read with `SELECT * FROM`
    pub const fn select_from(name: &'static str, params: &'static [ParamType]) -> Self {
        Self {
            name,
            style: CallStyle::SelectFrom,
            params,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn style(&self) -> CallStyle {
        self.style
    }

    pub fn params(&self) -> &'static [ParamType] {
        self.params
    }

    /// Render the statement text with `$n` placeholders
    pub fn sql(&self) -> String {
        let placeholders = (1..=self.params.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");

        match self.style {
            CallStyle::Call => format!("CALL {}({})", self.name, placeholders),
            CallStyle::SelectFrom => format!("SELECT * FROM {}({})", self.name, placeholders),
        }
    }

    /// Check the arguments against the declared parameter list
    pub fn bind(&'static self, args: Vec<SqlParam>) -> Result<BoundCall, ProcedureError> {
        if args.len() != self.params.len() {
            return Err(ProcedureError::Arity {
                procedure: self.name,
                expected: self.params.len(),
                actual: args.len(),
            });
        }

        for (index, (expected, arg)) in self.params.iter().zip(&args).enumerate() {
            if !expected.matches(arg) {
                return Err(ProcedureError::ArgumentType {
                    procedure: self.name,
                    position: index + 1,
                    expected: *expected,
                    actual: arg.to_string(),
                });
            }
        }

        Ok(BoundCall {
            procedure: self,
            sql: self.sql(),
            args,
        })
    }

    /// Reject names that could not be spliced into SQL as a bare identifier
    pub fn verify_name(&self) -> Result<(), ProcedureError> {
        let mut chars = self.name.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if valid {
            Ok(())
        } else {
            Err(ProcedureError::InvalidName { name: self.name })
        }
    }
}

/// A descriptor together with type-checked arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundCall {
    procedure: &'static Procedure,
    sql: String,
    args: Vec<SqlParam>,
}

impl BoundCall {
    pub fn procedure(&self) -> &'static Procedure {
        self.procedure
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[SqlParam] {
        &self.args
    }

    /// Invoke a `CALL`-style procedure
    pub async fn execute(&self, connection: &dyn Connection) -> Result<CommandTag> {
        self.expect_style(CallStyle::Call)?;
        connection.execute(&self.sql, &self.args).await
    }

    /// Read rows from a `SELECT * FROM`-style function
    pub async fn query(&self, connection: &dyn Connection) -> Result<Vec<Row>> {
        self.expect_style(CallStyle::SelectFrom)?;
        connection.query(&self.sql, &self.args).await
    }

    fn expect_style(&self, style: CallStyle) -> Result<(), ProcedureError> {
        if self.procedure.style == style {
            Ok(())
        } else {
            Err(ProcedureError::WrongStyle {
                procedure: self.procedure.name,
                style: self.procedure.style,
            })
        }
    }
}

/// Records that know which procedure they feed and in which argument order
pub trait ProcedureArgs {
    /// Descriptor invoked with this record
    const PROCEDURE: &'static Procedure;

    /// Arguments in the declared positional order
    fn args(&self) -> Vec<SqlParam>;

    /// Bind the record to its descriptor
    fn bind(&self) -> Result<BoundCall, ProcedureError> {
        Self::PROCEDURE.bind(self.args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    static INSERT: Procedure =
        Procedure::call("insert_thing", &[ParamType::Int, ParamType::Text]);
    static LIST: Procedure = Procedure::select_from("get_things", &[]);

    #[test]
    fn test_call_sql_has_numbered_placeholders() {
        assert_eq!(INSERT.sql(), "CALL insert_thing($1, $2)");
    }

    #[test]
    fn test_select_sql_without_params() {
        assert_eq!(LIST.sql(), "SELECT * FROM get_things()");
    }

    #[test]
    fn test_bind_accepts_matching_args() {
        let call = INSERT.bind(params![3, "widget"]).unwrap();
        assert_eq!(call.sql(), "CALL insert_thing($1, $2)");
        assert_eq!(call.args(), params![3, "widget"].as_slice());
        assert_eq!(call.procedure().name(), "insert_thing");
    }

    #[test]
    fn test_bind_rejects_wrong_arity() {
        let err = INSERT.bind(params![3]).unwrap_err();
        assert_eq!(
            err,
            ProcedureError::Arity {
                procedure: "insert_thing",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_bind_rejects_swapped_types() {
        let err = INSERT.bind(params!["widget", 3]).unwrap_err();
        assert!(matches!(
            err,
            ProcedureError::ArgumentType { position: 1, expected: ParamType::Int, .. }
        ));
    }

    #[test]
    fn test_verify_name() {
        assert!(INSERT.verify_name().is_ok());
        assert!(Procedure::call("drop table x;", &[]).verify_name().is_err());
        assert!(Procedure::call("", &[]).verify_name().is_err());
        assert!(Procedure::call("9lives", &[]).verify_name().is_err());
    }

    #[tokio::test]
    async fn test_execute_on_select_style_is_rejected() {
        let mock = crate::storage::MockConnection::new();
        let call = LIST.bind(params![]).unwrap();

        let err = call.execute(&mock).await.unwrap_err();
        assert!(err.to_string().contains("get_things"));
        assert!(mock.calls().is_empty());
    }
}
