//! Error taxonomy shared by the cache, its backends and configuration.

use glam::Vec3;

use super::coord::ChunkCoord;

/// A backend could not create the resource for a chunk.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("chunk {0} is already loaded by the backend")]
    AlreadyLoaded(ChunkCoord),
    #[error("backend is full ({capacity} chunks)")]
    Exhausted { capacity: usize },
    #[error("backend failed to load chunk {coord}: {reason}")]
    Backend { coord: ChunkCoord, reason: String },
}

/// A backend could not destroy the resource for a chunk.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum UnloadError {
    #[error("chunk {0} is not loaded by the backend")]
    NotLoaded(ChunkCoord),
    #[error("backend failed to unload chunk {coord}: {reason}")]
    Backend { coord: ChunkCoord, reason: String },
}

/// Rejected cache configuration. Always fatal at construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("chunk size must be positive and finite, got {0}")]
    InvalidChunkSize(f32),
    #[error("{field} must be a non-negative finite number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f32 },
    #[error("max_chunks_per_request must be at least 1")]
    ZeroRequestLimit,
}

/// A request region that cannot be quantized.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("region is not finite (center {center}, half extents {half_extents})")]
    NonFinite { center: Vec3, half_extents: Vec3 },
    #[error("region reaches past the addressable chunk range (center {center}, half extents {half_extents})")]
    OutOfRange { center: Vec3, half_extents: Vec3 },
    #[error("region covers more than {limit} chunks")]
    TooManyChunks { limit: usize },
}

/// Failure to read or write a settings file.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("settings file I/O failed")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid settings")]
    Config(#[from] ConfigError),
}
