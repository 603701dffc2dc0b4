pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod comments;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tmdb;
pub mod utils;

pub use api::{create_router, ApiServer, AppState};
pub use config::{load_config, Config};
pub use error::{AppError, Result};
