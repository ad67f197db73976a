pub mod auth;
pub mod logging;

pub use auth::{optional_auth_middleware, require_admin};
pub use logging::http_logging_middleware;
