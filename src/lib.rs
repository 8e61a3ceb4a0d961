//! Funnel: step orchestration core for a guided registration flow.

pub mod config;
pub mod error;
pub mod registry;
pub mod routes;
pub mod service;
pub mod store;
pub mod summary;
pub mod validation;
pub mod values;
