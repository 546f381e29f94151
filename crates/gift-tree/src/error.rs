//! Error types shared across the core.
//!
//! The browser host performs every network call and reports failures back as
//! a [`Failure`]. The coordinator converts it into the error type of the
//! operation that was pending, so store failures and blessing failures keep
//! their own taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad failure category reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service answered and refused the request.
    Rejected,
    /// The request never got an answer (offline, DNS, CORS, timeout).
    Network,
    /// Rate limit or quota exhausted.
    Quota,
    /// The answer could not be understood.
    Malformed,
    #[default]
    Other,
}

/// Failure payload as sent by the host alongside a request id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub kind: FailureKind,
    #[serde(default)]
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors from the gift and memory store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("store unreachable: {0}")]
    Network(String),

    #[error("malformed store payload: {0}")]
    Malformed(String),

    #[error("store failure: {0}")]
    Other(String),
}

impl From<Failure> for StoreError {
    fn from(failure: Failure) -> Self {
        match failure.kind {
            FailureKind::Rejected | FailureKind::Quota => StoreError::Rejected(failure.message),
            FailureKind::Network => StoreError::Network(failure.message),
            FailureKind::Malformed => StoreError::Malformed(failure.message),
            FailureKind::Other => StoreError::Other(failure.message),
        }
    }
}

/// Errors from the blessing generator.
///
/// These never reach the user; they are logged with their kind and replaced
/// by a canned blessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlessingError {
    #[error("generator unreachable: {0}")]
    Network(String),

    #[error("generator quota exceeded: {0}")]
    Quota(String),

    #[error("malformed generator response: {0}")]
    Malformed(String),

    #[error("generator failure: {0}")]
    Other(String),
}

impl BlessingError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BlessingError::Network(_) => "network",
            BlessingError::Quota(_) => "quota",
            BlessingError::Malformed(_) => "malformed",
            BlessingError::Other(_) => "other",
        }
    }
}

impl From<Failure> for BlessingError {
    fn from(failure: Failure) -> Self {
        match failure.kind {
            FailureKind::Network => BlessingError::Network(failure.message),
            FailureKind::Quota => BlessingError::Quota(failure.message),
            FailureKind::Malformed => BlessingError::Malformed(failure.message),
            FailureKind::Rejected | FailureKind::Other => BlessingError::Other(failure.message),
        }
    }
}

/// Errors while loading a [`SceneConfig`](crate::SceneConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
