pub mod auth;
pub mod gate;
pub mod response;

pub use auth::{jwt_auth_middleware, CurrentUser};
pub use gate::{require_roles, RequireAdmin, RequireBroker, RequireSession, RequireTrainer};
pub use response::{ApiResponse, ApiResult};
