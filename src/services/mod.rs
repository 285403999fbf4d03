//! Domain resources over the fixed `videos`, `contacts` and `admins` collections

pub mod admin_service;
pub mod contact_service;
pub mod video_service;

pub use admin_service::{AdminService, AdminUser, Credentials, LoginResponse};
pub use contact_service::{ContactInput, ContactService};
pub use video_service::{Pagination, VideoInput, VideoListQuery, VideoPage, VideoService};

use crate::auth::{PasswordError, TokenError};
use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}
