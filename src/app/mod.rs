//! Demo host: runs observers against a shared cache on a fixed tick.

mod demo;

pub use demo::run_demo;
