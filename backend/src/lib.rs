//! # Research Registry Backend
//!
//! REST backend serving research opportunity records.
//!
//! The HTTP surface is two lookups: `/getrange` returns the first N
//! records and `/getone` returns a single record under a randomly drawn key.
//! Everything behind it goes through a repository trait so the storage
//! backend can be swapped between an in-memory store and PostgreSQL.
//!
//! ## Architecture
//!
//! - [`api`]: Record types shared by every layer
//! - [`db`]: Repository pattern, backends, factory and service functions
//! - [`services`]: Key sources for the random lookup
//! - [`http`]: Axum-based HTTP server and request handlers

#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
