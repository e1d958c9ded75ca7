// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod category;
pub mod clock;
pub mod config;
pub mod error;
pub mod number_format;
pub mod round;
pub mod runtime;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod ui;
