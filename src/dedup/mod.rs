//! Workout duplicate detection.
//!
//! - [`normalizer`]: canonical embedding text for a workout
//! - [`decision`]: threshold filter over ranked similarity results
//! - [`service`]: the add / check / lint / list pipeline
//! - [`embedding`], [`translation`], [`grammar`]: external collaborators
//! - [`persistence`]: catalog storage and vector search

pub mod api;
pub mod decision;
pub mod defaults;
pub mod domain;
pub mod embedding;
pub mod grammar;
pub mod normalizer;
pub mod persistence;
pub mod security;
pub mod service;
pub mod telemetry;
pub mod translation;
