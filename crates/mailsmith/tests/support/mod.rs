//! Shared test fixtures.

// One scripted server serves both crates' integration tests.
#[path = "../../../mailsmith-smtp/tests/support/mock_server.rs"]
pub mod mock_server;
