//! Error types for memeplot operations.
//!
//! This module defines [`MemeError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Transport and service failures ([`MemeError::Network`],
//!   [`MemeError::Service`]) are *transient*: the template cache downgrades
//!   them to warnings whenever stale data can be served instead
//! - [`MemeError::TemplateNotFound`] and [`MemeError::CatalogParse`] are never
//!   downgraded; they describe a real absence or a real defect
//! - Use `anyhow::Error` (via `MemeError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for memeplot operations.
#[derive(Debug, Error)]
pub enum MemeError {
    /// The remote source could not be reached (DNS, connect, timeout, ...).
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The remote source answered but rejected the request or sent garbage.
    #[error("Service error from {url} (HTTP {status}): {message}")]
    Service {
        url: String,
        status: u16,
        message: String,
    },

    /// The key does not resolve to any known template.
    #[error("Template '{id}' not found")]
    TemplateNotFound { id: String },

    /// A local-path key points at a file that does not exist.
    #[error("Template image file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The on-disk catalog document exists but cannot be read.
    #[error("Corrupt template catalog at {path}: {message}")]
    CatalogParse { path: PathBuf, message: String },

    /// Payload bytes are not in a recognized image format.
    #[error("Unsupported or corrupt image data from {origin}")]
    UnsupportedImage { origin: String },

    /// A caller-supplied argument was rejected.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Whether this error is a transient fetch failure that a stale cached
    /// value may paper over.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Service { .. })
    }
}

/// Result type alias for memeplot operations.
pub type Result<T> = std::result::Result<T, MemeError>;
