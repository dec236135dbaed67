//! Core identifier types for the job engine.
//!
//! These types provide type-safe identifiers for jobs and the clients that submit them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a string is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} format: {value}")]
pub struct InvalidIdError {
    kind: &'static str,
    value: String,
}

impl InvalidIdError {
    /// Which identifier kind failed to parse ("job id", "client_id").
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Unique identifier for a job, assigned at admission and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

/// Identifier of the client that submitted a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl JobId {
    /// Generate a new random JobId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a JobId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a JobId from its hyphenated textual form.
    pub fn from_string(s: &str) -> Result<Self, InvalidIdError> {
        Uuid::parse_str(s).map(Self).map_err(|_| InvalidIdError {
            kind: "job id",
            value: s.to_string(),
        })
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for JobId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl ClientId {
    /// Create a ClientId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a ClientId from its hyphenated textual form.
    pub fn from_string(s: &str) -> Result<Self, InvalidIdError> {
        Uuid::parse_str(s).map(Self).map_err(|_| InvalidIdError {
            kind: "client_id",
            value: s.to_string(),
        })
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ClientId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
