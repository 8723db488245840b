//! HTTP controllers for handling requests

pub mod health;
pub mod tables;

pub use health::*;
pub use tables::*;

use std::sync::Arc;

use crate::application::TableService;
use crate::infrastructure::ConnectionManager;

/// Application state containing services
#[derive(Clone)]
pub struct AppState {
    pub table_service: Arc<dyn TableService>,
    pub connection: Arc<ConnectionManager>,
}
