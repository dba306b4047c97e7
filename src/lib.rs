//! pdf2web Server Library
//!
//! Serves PDF files and converted page assets over HTTP.
//!
//! # Modules
//!
//! - `adapter`: Streams storage content into HTTP responses
//! - `mapper`: Storage key naming for converted page assets
//! - `response`: Response sink abstraction and its buffered implementation
//! - `storage`: Local and S3-compatible storage backends
//! - `routes`: axum routes exposing the adapter

pub mod adapter;
pub mod config;
pub mod error;
pub mod mapper;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
