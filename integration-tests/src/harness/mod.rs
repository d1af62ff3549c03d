pub mod fixtures;
pub mod server;
pub mod tracing;

pub use fixtures::{RunFixture, log_line, status_line};
pub use server::TestServer;
pub use tracing::{CapturedEvent, init_test_tracing};
