//! Utility functions used across the application.
//!
//! - [`id_generator`] - Short id generation
//! - [`request_headers`] - Owner and client address extraction from HTTP headers

pub mod id_generator;
pub mod request_headers;
