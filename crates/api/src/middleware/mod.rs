pub mod admin_auth;
pub mod cors;
pub mod request_tracing;
