//! Core process state shared across commands.

mod state;

pub use state::{enable_graceful_shutdown, is_shutdown, setup_shutdown_handler};
