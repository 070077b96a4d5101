//! Server module for building the HTTP service
//!
//! [`ServerBuilder`] wires a [`Connection`](crate::core::Connection) into the
//! route table, verifies the procedure catalog and runs the listener with
//! graceful shutdown.

pub mod builder;
pub mod router;
mod shutdown;

pub use builder::ServerBuilder;
pub use router::build_routes;
pub use shutdown::shutdown_signal;
