//! Error type definitions.
//!
//! This module defines the errors reported while synthesizing probe requests.
//! Per-target failures are values: the caller logs them and moves on to the
//! next target.

use std::net::IpAddr;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::target::IpVersion;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),
}

/// Errors reported by a target's resolution capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The target's known address is not of the requested family.
    #[error("no {version} address (IP: {ip}) for {name}")]
    VersionMismatch {
        name: String,
        ip: IpAddr,
        version: IpVersion,
    },

    /// The lookup succeeded but returned nothing usable.
    #[error("no {version} address found for {name}")]
    NoAddress { name: String, version: IpVersion },

    /// The lookup itself failed.
    #[error("lookup of {name} failed: {cause}")]
    Lookup { name: String, cause: String },

    /// The target-set deadline passed before the lookup finished.
    #[error("resolution of {0} exceeded the deadline")]
    DeadlineExceeded(String),
}

/// Category of a per-target build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// The resolution capability returned an error.
    Resolve,
    /// The assembled URL or the method failed validation.
    Malformed,
}

/// A per-target, non-fatal failure to build a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("target: {target}, resolve error: {cause}")]
    Resolve { target: String, cause: String },

    #[error("target: {target}, error creating HTTP request: {cause}")]
    Malformed { target: String, cause: String },
}

impl BuildError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BuildError::Resolve { .. } => FailureKind::Resolve,
            BuildError::Malformed { .. } => FailureKind::Malformed,
        }
    }

    /// Name of the target the failure belongs to.
    pub fn target(&self) -> &str {
        match self {
            BuildError::Resolve { target, .. } | BuildError::Malformed { target, .. } => target,
        }
    }

    pub fn cause(&self) -> &str {
        match self {
            BuildError::Resolve { cause, .. } | BuildError::Malformed { cause, .. } => cause,
        }
    }
}
