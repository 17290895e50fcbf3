//! gesture_racer — command-line entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use gesture_command::Config;
use gesture_racer::app::{run, AppConfig, SourceKind};
use gesture_racer::sink::Backend;

#[derive(Parser, Debug)]
#[command(name = "gesture_racer", about = "Drive keyboard and mouse from body gestures")]
struct Cli {
    /// TOML config file; missing or invalid files fall back to defaults
    #[arg(short, long, default_value = "gesture_racer.toml")]
    config: PathBuf,

    /// Replay newline-delimited JSON pose events ("-" for stdin) instead of the demo
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Frame rate for pacing the source (0 = as fast as possible)
    #[arg(long)]
    fps: Option<u32>,

    /// Input backend: log or enigo
    #[arg(long, default_value = "log")]
    backend: Backend,

    /// Calibrate the pan neutral point on the first frame
    #[arg(long)]
    calibrate_first: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_racer=info,gesture_command=info".into()),
        )
        .init();

    info!("gesture_racer v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_default(&cli.config);
    if let Some(fps) = cli.fps {
        config.pipeline.fps = fps;
    }

    #[cfg(not(feature = "enigo"))]
    info!("backend: {} (dry run; build with --features enigo to inject input)", cli.backend);
    #[cfg(feature = "enigo")]
    info!("backend: {}", cli.backend);

    let cfg = AppConfig {
        config,
        source:          cli.replay.map_or(SourceKind::Demo, SourceKind::Replay),
        backend:         cli.backend,
        calibrate_first: cli.calibrate_first,
    };

    run(cfg)?;
    Ok(())
}
