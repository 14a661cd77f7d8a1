//! PSV inspection server library.
//!
//! This library provides the core functionality for the inspection server,
//! including the inspection wizard, database operations, authentication,
//! and API services.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
