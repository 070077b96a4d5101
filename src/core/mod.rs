//! Core module containing the connection abstraction, procedure descriptors
//! and error types shared by every handler

pub mod connection;
pub mod error;
pub mod procedure;

pub use connection::{CommandTag, Connection, Row, SqlParam, decode_rows};
pub use error::{ApiError, ErrorResponse, StartupError};
pub use procedure::{BoundCall, CallStyle, ParamType, Procedure, ProcedureArgs, ProcedureError};
