// McWatch - ui/mod.rs
//
// Presentation layer: renders engine events to the console.

pub mod console;
