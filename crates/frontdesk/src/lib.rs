//! Repair Desk front desk library.
//!
//! This crate provides the web front-end as a library, allowing it to be
//! tested and reused. The binary only adds Sentry and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
