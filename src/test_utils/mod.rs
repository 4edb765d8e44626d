//! Helpers shared by unit tests and, behind the `test-util` feature, by the
//! integration tests in `tests/`.

pub mod collecting_channel;
pub mod mock_endpoint;
