//! HTTP server module for the research registry.
//!
//! This module provides an axum-based HTTP server that exposes the
//! research opportunity lookups as a REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parsing and validation                           │
//! │  - JSON serialization                                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (db::services)                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Routes
//!
//! | Method | Path        | Query             | Response              |
//! |--------|-------------|-------------------|-----------------------|
//! | GET    | `/getrange` | `range` (def. 10) | JSON array of records |
//! | GET    | `/getone`   | none              | one JSON record       |
//! | GET    | `/health`   | none              | health object         |

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use router::create_router;
pub use state::AppState;
