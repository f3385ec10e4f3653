use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::core::{ConfigError, SettingsError};
use crate::player::{Observer, StaticBounds};
use crate::world::{Backend, BackendKind, CacheConfig};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StreamerSettings {
    #[serde(default)]
    pub backend: BackendKind,
    /// Only used by the cube backend
    #[serde(default)]
    pub cube_capacity: Option<usize>,
    pub cache: CacheSettings,
    #[serde(default)]
    pub observers: Vec<ObserverSettings>,
}

impl Default for StreamerSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            cube_capacity: None,
            cache: CacheSettings::default(),
            observers: vec![ObserverSettings::default()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheSettings {
    pub chunk_size: f32,
    #[serde(default = "default_staleness")]
    pub staleness_threshold_secs: f32,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: f32,
    /// Requests covering more chunks than this are rejected
    #[serde(default = "default_max_chunks_per_request")]
    pub max_chunks_per_request: usize,
}

fn default_staleness() -> f32 {
    DEFAULT_STALENESS_SECS
}
fn default_sweep_interval() -> f32 {
    DEFAULT_SWEEP_INTERVAL_SECS
}
fn default_max_chunks_per_request() -> usize {
    DEFAULT_MAX_CHUNKS_PER_REQUEST
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            staleness_threshold_secs: DEFAULT_STALENESS_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            max_chunks_per_request: DEFAULT_MAX_CHUNKS_PER_REQUEST,
        }
    }
}

impl CacheSettings {
    pub fn to_config(&self) -> Result<CacheConfig, ConfigError> {
        CacheConfig::new(
            self.chunk_size,
            secs("staleness_threshold_secs", self.staleness_threshold_secs)?,
            secs("sweep_interval_secs", self.sweep_interval_secs)?,
        )?
        .with_max_chunks_per_request(self.max_chunks_per_request)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ObserverSettings {
    pub name: String,
    pub position: Vec3,
    /// Distance from the position to each face of the box, not its size
    pub half_extents: Vec3,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f32,
}

fn default_poll_interval() -> f32 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            name: "origin".to_string(),
            position: Vec3::ZERO,
            half_extents: Vec3::splat(DEFAULT_OBSERVER_HALF_EXTENT),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl ObserverSettings {
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        secs("poll_interval_secs", self.poll_interval_secs)
    }

    pub fn build(&self) -> Result<Observer<StaticBounds>, ConfigError> {
        Ok(Observer::new(
            self.name.clone(),
            StaticBounds::new(self.position, self.half_extents),
            self.poll_interval()?,
        ))
    }
}

impl StreamerSettings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let settings: StreamerSettings = toml::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check every field the cache and observers depend on. Cadence problems
    /// that only risk premature eviction are logged, not rejected.
    pub fn validate(&self) -> Result<CacheConfig, ConfigError> {
        let config = self.cache.to_config()?;

        for observer in &self.observers {
            cadence_warnings(&config, &observer.name, observer.poll_interval()?);
        }

        Ok(config)
    }

    pub fn build_backend(&self) -> Backend {
        Backend::new(self.backend, self.cache.chunk_size, self.cube_capacity)
    }

    pub fn build_observers(&self) -> Result<Vec<Observer<StaticBounds>>, ConfigError> {
        self.observers.iter().map(ObserverSettings::build).collect()
    }
}

/// Log the cadence hazards between `config` and an observer polling every
/// `poll`. Returns how many warnings were emitted.
pub fn cadence_warnings(config: &CacheConfig, name: &str, poll: Duration) -> usize {
    let mut warnings = 0;
    if config.sweep_interval() > poll {
        tracing::warn!(
            "Observer {} polls every {:?} but the sweep runs every {:?}; chunks may be evicted before it re-requests them",
            name,
            poll,
            config.sweep_interval()
        );
        warnings += 1;
    }
    if config.staleness_threshold() <= poll {
        tracing::warn!(
            "Observer {} polls every {:?}, not faster than the {:?} staleness threshold",
            name,
            poll,
            config.staleness_threshold()
        );
        warnings += 1;
    }
    warnings
}

fn secs(field: &'static str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = StreamerSettings::default();
        let config = settings.validate().unwrap();
        assert_eq!(config.chunk_size(), 1000.0);
        assert_eq!(config.staleness_threshold(), Duration::from_secs(2));
        assert_eq!(settings.build_observers().unwrap().len(), 1);
    }

    #[test]
    fn rejects_non_positive_chunk_size() {
        let mut settings = StreamerSettings::default();
        settings.cache.chunk_size = 0.0;
        assert_eq!(settings.validate(), Err(ConfigError::InvalidChunkSize(0.0)));
    }

    #[test]
    fn rejects_negative_durations() {
        let mut settings = StreamerSettings::default();
        settings.cache.staleness_threshold_secs = -1.0;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::InvalidDuration {
                field: "staleness_threshold_secs",
                value: -1.0
            })
        );

        let mut settings = StreamerSettings::default();
        settings.observers[0].poll_interval_secs = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_request_cap() {
        let mut settings = StreamerSettings::default();
        settings.cache.max_chunks_per_request = 0;
        assert_eq!(settings.validate(), Err(ConfigError::ZeroRequestLimit));
    }

    #[test]
    fn cadence_warnings_flag_slow_sweeps_and_short_staleness() {
        let config = StreamerSettings::default().validate().unwrap();
        let poll = Duration::from_secs_f32(DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(cadence_warnings(&config, "default", poll), 0);

        // Sweep (0.1s) slower than the poll
        assert_eq!(cadence_warnings(&config, "fast", Duration::from_millis(10)), 1);
        // Poll at or beyond the 2s staleness threshold
        assert_eq!(cadence_warnings(&config, "slow", Duration::from_secs(2)), 1);

        let tight = CacheConfig::new(1000.0, Duration::from_millis(5), Duration::from_millis(100)).unwrap();
        assert_eq!(cadence_warnings(&tight, "both", Duration::from_millis(10)), 2);
    }

    #[test]
    fn parses_minimal_toml() {
        let text = r#"
            backend = "log"

            [cache]
            chunk_size = 64.0

            [[observers]]
            name = "camera"
            position = [10.0, 0.0, -5.0]
            half_extents = [32.0, 32.0, 32.0]
        "#;
        let settings: StreamerSettings = toml::from_str(text).unwrap();

        assert_eq!(settings.backend, BackendKind::Log);
        assert_eq!(settings.cache.staleness_threshold_secs, DEFAULT_STALENESS_SECS);
        assert_eq!(settings.cache.max_chunks_per_request, DEFAULT_MAX_CHUNKS_PER_REQUEST);
        assert_eq!(settings.observers[0].position, Vec3::new(10.0, 0.0, -5.0));
        assert_eq!(settings.observers[0].poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert!(matches!(settings.build_backend(), Backend::Log(_)));
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let path = std::env::temp_dir().join(format!("chunk-streamer-{}.toml", std::process::id()));
        let mut settings = StreamerSettings::default();
        settings.cube_capacity = Some(128);

        settings.save(&path).unwrap();
        let loaded = StreamerSettings::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = StreamerSettings::load("/nonexistent/chunk-streamer.toml");
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }
}
