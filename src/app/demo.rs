use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use glam::Vec3;

use chunk_streamer::{
    BackendKind, BoundsSource, ChunkCache, ConfigError, DEFAULT_DEMO_TICK_MS, DEFAULT_DEMO_TICKS,
    DEFAULT_OBSERVER_HALF_EXTENT, DEFAULT_POLL_INTERVAL_SECS, DEMO_OBSERVER_SPEED, Observer, Region,
    SettingsError, SharedChunkCache, StreamerSettings, SweepWorker, SystemClock, cadence_warnings,
};

/// Chunk streaming demo host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the backend from the settings file
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Number of update ticks to run
    #[arg(long, default_value_t = DEFAULT_DEMO_TICKS)]
    ticks: u32,

    /// Milliseconds per tick
    #[arg(long, default_value_t = DEFAULT_DEMO_TICK_MS)]
    tick_ms: u64,

    /// Write the default settings to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to start sweep worker")]
    Worker(#[from] io::Error),
}

/// Observer that walks along a straight line.
struct Patrol {
    origin: Vec3,
    velocity: Vec3,
    half_extents: Vec3,
    elapsed: Duration,
}

impl Patrol {
    fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }
}

impl BoundsSource for Patrol {
    fn region(&self) -> Region {
        let position = self.origin + self.velocity * self.elapsed.as_secs_f32();
        Region::new(position, self.half_extents)
    }
}

/// Demo entry point - call this from the actual main() function
pub fn run_demo() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                tracing::error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), DemoError> {
    if let Some(path) = &args.write_default_config {
        StreamerSettings::default().save(path)?;
        tracing::info!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let mut settings = match &args.config {
        Some(path) => StreamerSettings::load(path)?,
        None => StreamerSettings::default(),
    };
    if let Some(kind) = args.backend {
        settings.backend = kind;
    }

    let config = settings.validate()?;
    tracing::info!(
        "Streaming {} chunks with the {} backend ({:?} staleness, {:?} sweep)",
        config.chunk_size(),
        settings.backend,
        config.staleness_threshold(),
        config.sweep_interval()
    );

    // The patrol follows the first configured observer's cadence
    let patrol_poll = match settings.observers.first() {
        Some(observer) => observer.poll_interval()?,
        None => Duration::from_secs_f32(DEFAULT_POLL_INTERVAL_SECS),
    };
    cadence_warnings(&config, "patrol", patrol_poll);

    let cache: SharedChunkCache =
        ChunkCache::new(config, settings.build_backend(), SystemClock::new())?.into_shared();
    let mut observers = settings.build_observers()?;
    let mut patrol = Observer::new(
        "patrol",
        Patrol {
            origin: Vec3::ZERO,
            velocity: Vec3::new(DEMO_OBSERVER_SPEED, 0.0, 0.0),
            half_extents: Vec3::splat(DEFAULT_OBSERVER_HALF_EXTENT),
            elapsed: Duration::ZERO,
        },
        patrol_poll,
    );

    let sweeper = SweepWorker::spawn(cache.clone())?;
    let dt = Duration::from_millis(args.tick_ms);

    for tick in 0..args.ticks {
        patrol.source_mut().advance(dt);

        {
            // Requests first, then marking, so nothing requested this tick gets marked
            let mut cache = cache.lock();
            for observer in &mut observers {
                observer.drive(dt, &mut *cache);
            }
            patrol.drive(dt, &mut *cache);

            let now = cache.now();
            cache.mark_stale(now);
        }

        if tick % 60 == 0 {
            let stats = cache.lock().stats();
            tracing::info!(
                "Tick {}: {} loaded, {} queued, {} unloaded so far",
                tick,
                stats.loaded,
                stats.queued,
                stats.unloads
            );
        }

        thread::sleep(dt);
    }

    sweeper.shutdown();

    let mut cache = cache.lock();
    cache.unload_all();
    let stats = cache.stats();
    tracing::info!(
        "Done: {} loads ({} failed), {} unloads ({} failed), {} cancelled evictions",
        stats.loads,
        stats.load_failures,
        stats.unloads,
        stats.unload_failures,
        stats.cancelled
    );

    Ok(())
}
