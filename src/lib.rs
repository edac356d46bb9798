//! Lead lifecycle and conversion engine
//!
//! Leads move through named worklists, get deduplicated, bulk-edited and
//! finally converted into an account, a contact and optionally a deal. The
//! engine lives in [`engine`]; the rest of the crate serves it over HTTP.

pub mod api;
pub mod app;
pub mod auth;
pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod routes;
pub mod services;
pub mod store;

pub use engine::{Engine, EngineOptions};
