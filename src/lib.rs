//! Small JSON REST client.
//!
//! [`RestClient`] prefixes every resource with a fixed API root, sends GET or
//! POST requests on single-use connections and decodes JSON answers into a
//! caller-owned value. A 429 or 403 answer surfaces as [`RestLibError`] so
//! callers can implement their own backoff; nothing is retried here.
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod http;

pub use http::{ClientConfig, RestApi, RestClient, RestLibError, set_headers, status_code};
