//! Request and response records
//!
//! Each write record is tied to exactly one stored procedure through
//! [`ProcedureArgs`](crate::core::ProcedureArgs), which fixes the positional
//! order of its arguments. Read records mirror the columns returned by the
//! listing functions.

pub mod order_status;
pub mod product;
pub mod violation;

pub use order_status::OrderStatus;
pub use product::{NewProduct, ProductId, ProductUpdate};
pub use violation::{NewViolation, Violation, ViolationId, ViolationUpdate};
