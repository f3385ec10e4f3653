//! Chunk loading backends
//!
//! The cache never creates chunk content itself. It asks a backend through
//! [`ChunkLoaderPort`] and only records a chunk once the backend succeeded.
//! The set of bundled backends is closed and chosen once at startup through
//! [`BackendKind`].

use std::fmt;

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{ChunkCoord, LoadError, UnloadError};

/// Creates and destroys the resources behind chunks.
pub trait ChunkLoaderPort {
    fn load_chunk(&mut self, coord: ChunkCoord) -> Result<(), LoadError>;

    fn unload_chunk(&mut self, coord: ChunkCoord) -> Result<(), UnloadError>;
}

/// Backend selection, as written in settings files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One placeholder cube per chunk
    #[default]
    Cube,
    /// Log loads and unloads without creating anything
    Log,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Cube => write!(f, "cube"),
            BackendKind::Log => write!(f, "log"),
        }
    }
}

/// Placeholder geometry spawned for a chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub position: Vec3,
    pub scale: Vec3,
}

/// Spawns a chunk-sized cube centered on every loaded chunk.
#[derive(Debug, Default)]
pub struct CubeBackend {
    chunk_size: f32,
    capacity: Option<usize>,
    cubes: FxHashMap<ChunkCoord, Cube>,
}

impl CubeBackend {
    pub fn new(chunk_size: f32) -> Self {
        Self {
            chunk_size,
            capacity: None,
            cubes: FxHashMap::default(),
        }
    }

    /// Refuse loads once `capacity` cubes exist.
    pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn cube(&self, coord: ChunkCoord) -> Option<&Cube> {
        self.cubes.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }
}

impl ChunkLoaderPort for CubeBackend {
    fn load_chunk(&mut self, coord: ChunkCoord) -> Result<(), LoadError> {
        if self.cubes.contains_key(&coord) {
            return Err(LoadError::AlreadyLoaded(coord));
        }
        if let Some(capacity) = self.capacity {
            if self.cubes.len() >= capacity {
                return Err(LoadError::Exhausted { capacity });
            }
        }

        let cube = Cube {
            position: coord.center(self.chunk_size),
            scale: Vec3::splat(self.chunk_size),
        };
        tracing::trace!("Spawned cube for chunk {} at {}", coord, cube.position);
        self.cubes.insert(coord, cube);
        Ok(())
    }

    fn unload_chunk(&mut self, coord: ChunkCoord) -> Result<(), UnloadError> {
        match self.cubes.remove(&coord) {
            Some(_) => Ok(()),
            None => Err(UnloadError::NotLoaded(coord)),
        }
    }
}

/// Logs every load and unload. Never fails.
#[derive(Debug, Default)]
pub struct LogBackend {
    chunk_size: f32,
    loads: u64,
    unloads: u64,
}

impl LogBackend {
    pub fn new(chunk_size: f32) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> u64 {
        self.loads
    }

    pub fn unloads(&self) -> u64 {
        self.unloads
    }
}

impl ChunkLoaderPort for LogBackend {
    fn load_chunk(&mut self, coord: ChunkCoord) -> Result<(), LoadError> {
        self.loads += 1;
        tracing::info!("Load chunk {} at {}", coord, coord.center(self.chunk_size));
        Ok(())
    }

    fn unload_chunk(&mut self, coord: ChunkCoord) -> Result<(), UnloadError> {
        self.unloads += 1;
        tracing::info!("Destroy chunk {} at {}", coord, coord.center(self.chunk_size));
        Ok(())
    }
}

/// One of the bundled backends, chosen once at startup.
#[derive(Debug)]
pub enum Backend {
    Cube(CubeBackend),
    Log(LogBackend),
}

impl Backend {
    pub fn new(kind: BackendKind, chunk_size: f32, capacity: Option<usize>) -> Self {
        match kind {
            BackendKind::Cube => {
                let backend = CubeBackend::new(chunk_size);
                Backend::Cube(match capacity {
                    Some(limit) => backend.with_capacity_limit(limit),
                    None => backend,
                })
            }
            BackendKind::Log => Backend::Log(LogBackend::new(chunk_size)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Cube(_) => BackendKind::Cube,
            Backend::Log(_) => BackendKind::Log,
        }
    }
}

impl ChunkLoaderPort for Backend {
    fn load_chunk(&mut self, coord: ChunkCoord) -> Result<(), LoadError> {
        match self {
            Backend::Cube(backend) => backend.load_chunk(coord),
            Backend::Log(backend) => backend.load_chunk(coord),
        }
    }

    fn unload_chunk(&mut self, coord: ChunkCoord) -> Result<(), UnloadError> {
        match self {
            Backend::Cube(backend) => backend.unload_chunk(coord),
            Backend::Log(backend) => backend.unload_chunk(coord),
        }
    }
}
