//! # VK HTTP API
//!
//! A client for the VK social-platform API. It supports:
//!
//! - Signed requests (sorted parameters plus an MD5 signature over the app secret)
//! - OAuth requests with a bearer access token
//! - Three token grants: password, authorization code and client credentials
//! - Delivery of each response to a callback or as a named event
//! - An event emitter ("on"/"off") API and a typed broadcast stream
//!
//! For usage examples, see `demos/simple.rs`.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod query;
pub mod request;
pub mod response;
pub mod signature;
pub mod utils;
