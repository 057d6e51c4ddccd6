pub mod auth;
pub mod response;

pub use auth::{require_admin, CurrentUser};
pub use response::{ApiResponse, ApiResult};
