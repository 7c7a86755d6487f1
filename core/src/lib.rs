//! Optimistic todo-list synchronization against a remote todo service.
//!
//! # Overview
//! Two layers:
//! - the remote client: `TodoClient` builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network (host-does-IO), a
//!   `Transport` performs the round-trip, and `RemoteTodos` combines both
//!   into the `TodoService` contract;
//! - the `Controller`, which owns the authoritative list, shows optimistic
//!   placeholders, tracks busy ids, reconciles server responses and surfaces
//!   transient notices.
//!
//! # Design
//! - `TodoClient` is stateless apart from `base_url` and the user id.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//! - The controller is generic over `TodoService` so protocols can be tested
//!   against an in-memory service.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod notice;
pub mod service;
pub mod state;
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use config::SyncConfig;
pub use controller::{Controller, RenameOutcome};
pub use error::{ApiError, ConfigError, SyncError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notice::{Notice, NoticeBoard};
pub use service::{RemoteTodos, TodoService};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreateTodo, Filter, ListEntry, PendingTodo, Todo, TodoId, UpdateTodo, UserId};
