//! HTTP API handlers for isapi-mock

pub mod auth;
pub mod device_info;
pub mod dispatch;
pub mod search;

pub use auth::{auth_middleware, AuthChallenge};
pub use dispatch::{dispatch, Endpoint};
