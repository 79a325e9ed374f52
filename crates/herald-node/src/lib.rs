//! # Herald Node
//!
//! HTTP and WebSocket server for Herald.
//!
//! Clients hold a WebSocket open to hear about catalog changes and chat
//! with each other. The HTTP side manages categories and items; every
//! successful change is announced to all connected clients in plain text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Herald Node                     │
//! ├─────────────────────────────────────────────────────┤
//! │  HTTP API Layer                                     │
//! │  • /categories, /items (CRUD)                       │
//! │  • /ws/{client_id} (WebSocket sessions)             │
//! │  • /health, /metrics, /api/realtime/stats           │
//! │                        │                            │
//! │          ┌─────────────┴─────────────┐              │
//! │          ▼                           ▼              │
//! │   CatalogStore ── change ──> Notifier ──> Hub ──>   │
//! │                                          clients    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin herald-node -- --port 8000
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Router assembly, shared state and error mapping
//! - [`catalog_api`] - Category and item endpoints
//! - [`realtime_api`] - WebSocket endpoint and hub statistics
//! - [`config`] - Layered node configuration
//! - [`observability`] - Logging, metrics and request tracing
//! - [`validation`] - Validated JSON request bodies

pub mod api;
pub mod catalog_api;
pub mod config;
pub mod observability;
pub mod realtime_api;
pub mod validation;

pub use api::{create_router, ApiError, AppState};
pub use config::NodeConfig;
