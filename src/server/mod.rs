/**
 * Server
 *
 * Configuration loading, shared application state, and app assembly.
 */

pub mod config;
pub mod init;
pub mod state;

pub use config::{Config, SmtpConfig};
pub use init::create_app;
pub use state::AppState;
