pub mod auth;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{AllowAll, Authenticated, Authenticator, DenyAll, Principal, bearer_token};
pub use config::ServiceConfig;
pub use error::{FieldErrors, ServiceError};
pub use module::Module;
pub use types::{MAX_PAGE_SIZE, Page, PageParams, new_id, now_rfc3339};
