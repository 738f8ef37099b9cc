// McWatch - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, chrono, regex.
// Must NOT depend on: ui, platform, app, or any I/O.

pub mod classifier;
pub mod membership;
pub mod model;
pub mod parser;
