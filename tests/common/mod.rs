//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use axum_test::TestServer;
use master_api::core::CommandTag;
use master_api::server::ServerBuilder;
use master_api::storage::MockConnection;

/// Router over `mock`, with the same layers the binary serves
pub fn make_server(mock: &MockConnection) -> TestServer {
    let router = ServerBuilder::new()
        .with_connection(mock.clone())
        .build()
        .unwrap();
    TestServer::try_new(router).unwrap()
}

/// Tag a successful `CALL` reports
pub fn call_ok() -> CommandTag {
    CommandTag::new("CALL", 0)
}
