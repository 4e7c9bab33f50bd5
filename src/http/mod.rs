//! REST client with status-driven error classification.

mod client;
mod config;
mod error;

pub use client::{RestApi, RestClient, set_headers};
pub use config::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_IDLE, DEFAULT_MAX_IDLE_PER_HOST,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use error::{RestLibError, is_distinguished_status, status_code};
