pub mod api_key;
pub mod auth;
pub mod response;

pub use api_key::{api_key_middleware, API_KEY_HEADER, API_USER_HEADER};
pub use auth::jwt_auth_middleware;
pub use response::{ApiResponse, ApiResult};
