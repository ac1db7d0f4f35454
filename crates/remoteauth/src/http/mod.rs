pub mod forward;
pub mod remote_auth;

pub use ::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
