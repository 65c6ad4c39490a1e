pub mod aggregate;
pub mod common;
pub mod request;
pub mod validate;
