//! CRM Lead Pipeline API Library
//!
//! This library provides the lead/metrics model behind the CRM dashboard and
//! the HTTP handlers that expose it.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `config`: Configuration management.
//! - `demo_data`: Seed data for the in-memory store.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `interactions`: Calls, meetings and lead timelines.
//! - `leads`: Lead validation, filtering, sorting and search.
//! - `metrics`: Dashboard metric series, trend and derivation.
//! - `models`: Core data models.
//! - `pipeline`: Status grouping and conversion analytics.
//! - `scoring`: Rule-based lead scoring.
//! - `session`: Session and persisted preferences.
//! - `store`: In-memory lead storage.

pub mod api;
pub mod core;

pub mod config;
pub mod demo_data;
pub mod errors;
pub mod handlers;
pub mod interactions;
pub mod leads;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod scoring;
pub mod session;
pub mod store;
