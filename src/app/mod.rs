// McWatch - app/mod.rs
//
// Application layer: stream engine, line feed, server supervision, and the
// watch loop that ties them together.
// Dependencies: core and util layers.
// Must NOT depend on: ui, platform.

pub mod engine;
pub mod feed;
pub mod server;
pub mod watch;
