//! Utility module - shared helpers and types
//!
//! - [`AppError`] - application error type
//! - [`AppResponse`] - API response envelope
//! - logging, validation, code generation helpers

pub mod codes;
pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use codes::new_order_code;
pub use error::{AppError, AppResponse, ok, ok_with_message};
pub use logger::{init_logger, init_logger_with_file};
pub use result::AppResult;
