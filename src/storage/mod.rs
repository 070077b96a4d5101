//! Connection implementations for different backends

pub mod mock;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use mock::{MockConnection, MockRows, RecordedCall};
#[cfg(feature = "postgres")]
pub use postgres::PooledConnection;
