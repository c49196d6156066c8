pub mod auth;
pub mod ownership;
pub mod response;

pub use auth::{require_auth, AuthUser};
pub use ownership::{require_ownership, require_profile_ownership, OwnedResource};
pub use response::{ApiResponse, ApiResult};
