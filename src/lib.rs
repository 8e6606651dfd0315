pub mod api;
pub mod auth;
pub mod crypto;
pub mod db;
pub mod error;
pub mod workspace;

pub use error::{Error, ErrorBody, Result};
