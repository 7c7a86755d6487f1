//! Error types for the todo client and the synchronization controller.
//!
//! # Design
//! `ApiError` describes why a single remote call failed. `NotFound` gets a
//! dedicated variant because callers distinguish "the todo does not exist"
//! from "the server returned an unexpected status". `SyncError` is what the
//! controller's entry points return: validation failures that never reach the
//! service, plus wrapped remote failures.

use thiserror::Error;

use crate::types::TodoId;

/// Errors returned by `TodoClient` parse methods and by transports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-success status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialize(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// No response was obtained (connection refused, reset, DNS, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Errors returned by `Controller` entry points.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("no user configured")]
    UserNotConfigured,

    #[error("title should not be empty")]
    EmptyTitle,

    #[error("a todo is already being added")]
    CreateInFlight,

    #[error("todo {0} is not in the list")]
    UnknownTodo(TodoId),

    #[error(transparent)]
    Remote(#[from] ApiError),

    /// Some calls of a batch failed; the others were reconciled.
    #[error("{} of the batched calls failed", .failed.len())]
    Partial { failed: Vec<TodoId> },
}

/// Errors raised while reading `SyncConfig` from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid user id {0:?}: expected a positive integer")]
    InvalidUserId(String),

    #[error("invalid base url {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),

    #[error("invalid notice duration {0:?}: expected milliseconds")]
    InvalidNoticeDuration(String),
}
