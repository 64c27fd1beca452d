//! Async API client for the class announcement board.
//!
//! # Overview
//! Six named operations (login, user profile, global board, section board)
//! each mapped to one fixed REST endpoint and executed through one shared
//! HTTP transport.
//!
//! # Design
//! - `BoardClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, no I/O in between.
//! - `Transport` performs the round-trip; `ReqwestTransport` is the
//!   production implementation, tests plug in their own.
//! - `BoardApi` ties the two together as async methods. Failures propagate
//!   as `ApiError` without retry or recovery.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod transport;
pub mod types;

pub use client::BoardClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use registry::BoardApi;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Credentials, ErrorBody, LoginResponse, NewMessage, Post, UserProfile};
