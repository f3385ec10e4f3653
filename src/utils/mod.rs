//! Utility modules
//! Contains the settings file format.

pub mod settings;

pub use settings::{CacheSettings, ObserverSettings, StreamerSettings, cadence_warnings};
