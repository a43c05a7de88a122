//! Fitcheck application fit service
//!
//! Compares a résumé against a job description, drafts a cover letter from
//! model summaries, and reflows the résumé into a clean PDF.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::create_router;
pub use state::AppState;
