//! Application state management

use std::sync::Arc;

use crate::db::Database;
use crate::images::ImageService;
use crate::jwt::JwtManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub db: Database,
    /// Upload protocol service
    pub images: ImageService,
    /// Bearer token manager
    pub jwt_manager: Arc<JwtManager>,
}
