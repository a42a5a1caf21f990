//! Venue Server - karaoke restaurant management backend
//!
//! REST API over an embedded document store covering the venue's daily
//! operation: user accounts with role-gated access, table accounts with
//! song queues and running bills, orders, the song and product catalogs
//! with fuzzy search and CSV bulk import, and the immutable closing-history
//! audit trail.
//!
//! # Module structure
//!
//! ```text
//! venue-server/src/
//! ├── core/      # configuration, state, HTTP server
//! ├── auth/      # JWT authentication and role gating
//! ├── db/        # embedded SurrealDB: models and repositories
//! ├── billing/   # ledger arithmetic and account settlement
//! ├── search/    # fuzzy search and faceted filtering
//! ├── import/    # CSV bulk ingestion
//! ├── api/       # HTTP routes and handlers
//! └── utils/     # errors, logging, shared helpers
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod import;
pub mod search;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};
pub use utils::{init_logger, init_logger_with_file};

// Security logging macro - structured events on the "security" target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, create the working directory tree and start logging.
/// Called once at the top of `main`.
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    if config.is_production() {
        let log_dir = config.log_dir();
        init_logger_with_file(None, log_dir.to_str());
    } else {
        init_logger();
    }

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 _   __
| | / /__  ____  __  _____
| |/ / _ \/ __ \/ / / / _ \
|   /  __/ / / / /_/ /  __/
|__/\___/_/ /_/\__,_/\___/
   ____
  / __/__  ______   _____  _____
  \ \/ _ \/ ___/ | / / _ \/ ___/
 __/ /  __/ /   | |/ /  __/ /
/___/\___/_/    |___/\___/_/
    "#
    );
}
