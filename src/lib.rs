//! # workshop-tracker
//!
//! Machine status, usage sessions, and maintenance incidents for a small
//! workshop, served as a REST API over Postgres.
//!
//! Two rules carry the domain: incident reports are de-duplicated per machine
//! by a four-token description signature ([`rules::duplicate`]), and a
//! machine has at most one active usage session ([`rules::usage`]).

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod rules;
pub mod seed;
pub mod store;
pub mod telemetry;
