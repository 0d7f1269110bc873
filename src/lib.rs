pub mod config;
pub mod db;
pub mod directions;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod ranking;
pub mod repository;
pub mod routes;
pub mod session;
pub mod utils;

use sea_orm::DatabaseConnection;

use crate::directions::HttpDirections;

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub directions: HttpDirections,
}
