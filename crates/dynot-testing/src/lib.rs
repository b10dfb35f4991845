//! Testing infrastructure for dynot integration tests.
//!
//! This crate provides utilities for writing integration tests:
//! - `TestWorld`: Isolated scratch directory for running the CLI
//! - `assertions`: Checks over spans recorded by the mock tracer
//! - `context`: Factory contexts serving the in-process mock tracer
//! - `fixtures`: Tracer configuration documents
//! - `plugin`: Locating the built mock tracer library

pub mod assertions;
pub mod context;
pub mod fixtures;
pub mod plugin;
pub mod world;

pub use context::{MOCKTRACER_LIBRARY, MockTracerFactoryContext};
pub use world::TestWorld;
