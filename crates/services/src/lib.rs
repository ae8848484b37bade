#![forbid(unsafe_code)]

pub mod admin;
pub mod api;
pub mod app_services;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod game_service;
pub mod moderator;
pub mod preferences_service;

pub use dedaena_core::Clock;

pub use admin::{AdminApi, AdminService, HttpAdminApi, UserBoard, UserList};
pub use api::ApiClient;
pub use app_services::AppServices;
pub use auth::{AuthService, Registration};
pub use config::ApiConfig;
pub use content::{ContentSource, HttpContentSource, InMemoryContentSource};
pub use error::{
    AdminError, ApiError, AppServicesError, AuthError, GameError, ModerationError,
    PreferencesError,
};
pub use game_service::{GameService, GameSession};
pub use moderator::{ContentBoard, HttpModerationApi, ModerationApi, ModerationService};
pub use preferences_service::PreferencesService;
