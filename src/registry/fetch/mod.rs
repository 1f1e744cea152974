//! Network fetching for remote template sources.

pub mod http;

pub use http::HttpFetcher;
