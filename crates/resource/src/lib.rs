//! Resource providers for the kolreport export pipeline.
//!
//! This crate provides the platform implementations of the
//! `ResourceProvider` trait from kolreport-traits.
//!
//! ## Available Providers
//!
//! - [`FilesystemResourceProvider`]: Loads resources from the local filesystem
//! - [`HttpResourceProvider`]: Fetches resources over HTTP(S)
//!
//! ## Re-exports
//!
//! - [`InMemoryResourceProvider`]: Pre-populated in-memory storage

mod filesystem;
mod http;

pub use filesystem::FilesystemResourceProvider;
pub use http::HttpResourceProvider;

pub use kolreport_traits::InMemoryResourceProvider;
