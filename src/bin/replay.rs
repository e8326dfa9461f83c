//! critter-ar-replay binary
//!
//! Replays a recorded AR session script through the placement pipeline and
//! prints the resulting scene and stats as JSON.
//!
//! ## Configuration (TOML file and env via `config` crate, flags override)
//!
//! | Key                          | Default      | Description                         |
//! |------------------------------|--------------|-------------------------------------|
//! | `CRITTER_AR_INITIAL_KIND`    | `fox`        | Kind selected at startup            |
//! | `CRITTER_AR_ASSET_DIR`       | *(none)*     | Directory of `<kind>.json` assets   |
//! | `CRITTER_AR_MAX_INSTANCES`   | *(none)*     | Cap on placed instances             |
//! | `CRITTER_AR_REFRESH_HZ`      | `60`         | Replay frame rate, 1 to 1000 Hz     |

use anyhow::{Context, Result};
use clap::Parser;
use critter_ar::{
    replay::{self, ScriptedSession, SessionScript},
    AnimalKind, AppConfig, AppStats, ArApp, PlacedInstance, Renderer, Reticle, Scene,
};
use serde::Serialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "critter-ar-replay", about = "Replay an AR session script", version)]
struct Args {
    /// Session script (JSON)
    script: PathBuf,

    /// Optional TOML config file
    #[arg(long, short, env = "CRITTER_AR_CONFIG")]
    config: Option<PathBuf>,

    /// Kind selected at startup (fox, rabbit, bird)
    #[arg(long)]
    kind: Option<String>,

    /// Directory of prototype assets
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// Cap on placed instances (oldest evicted)
    #[arg(long)]
    max_instances: Option<usize>,

    /// Replay frame rate (Hz)
    #[arg(long)]
    refresh_hz: Option<f32>,

    /// Run frames back to back instead of pacing them
    #[arg(long)]
    no_pacing: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

const MIN_REFRESH_HZ: f32 = 1.0;
const MAX_REFRESH_HZ: f32 = 1000.0;

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = &args.config {
        builder = builder.add_source(config::File::from(path.as_path()));
    }
    builder = builder.add_source(config::Environment::with_prefix("CRITTER_AR").try_parsing(true));

    let mut cfg: AppConfig = builder
        .build()
        .context("reading configuration")?
        .try_deserialize()
        .context("parsing configuration")?;

    if let Some(kind) = &args.kind {
        cfg.initial_kind = kind
            .parse::<AnimalKind>()
            .with_context(|| format!("--kind {}", kind))?;
    }
    if let Some(dir) = &args.asset_dir {
        cfg.asset_dir = Some(dir.clone());
    }
    if let Some(max) = args.max_instances {
        cfg.max_instances = Some(max);
    }
    if let Some(hz) = args.refresh_hz {
        cfg.refresh_hz = hz;
    }
    anyhow::ensure!(
        cfg.refresh_hz.is_finite() && (MIN_REFRESH_HZ..=MAX_REFRESH_HZ).contains(&cfg.refresh_hz),
        "refresh_hz must be between {} and {} (got {})",
        MIN_REFRESH_HZ,
        MAX_REFRESH_HZ,
        cfg.refresh_hz
    );
    Ok(cfg)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Renderer that traces what would be drawn each frame.
#[derive(Default)]
struct TraceRenderer {
    frame: u64,
}

impl Renderer for TraceRenderer {
    fn render(&mut self, scene: &Scene, reticle: &Reticle) {
        self.frame += 1;
        tracing::trace!(
            frame = self.frame,
            instances = scene.len(),
            reticle_visible = reticle.visible,
            "render"
        );
    }
}

#[derive(Serialize)]
struct Report<'a> {
    stats: AppStats,
    reticle: &'a Reticle,
    instances: Vec<&'a PlacedInstance>,
    feed_releases: u64,
    sessions: u64,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("critter_ar=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let cfg = load_config(&args)?;

    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let script = SessionScript::from_json(&text)
        .with_context(|| format!("parsing {}", args.script.display()))?;

    tracing::info!(
        frames = script.frames.len(),
        kind = %cfg.initial_kind,
        refresh_hz = cfg.refresh_hz,
        "Starting replay"
    );

    let mut app: ArApp<ScriptedSession> = ArApp::new(&cfg);
    let mut session = ScriptedSession::for_script(&script);
    let mut renderer = TraceRenderer::default();

    if args.no_pacing {
        replay::run_script(&mut app, &mut session, &script, &mut renderer);
    } else {
        replay::run_paced(&mut app, &mut session, &script, &mut renderer, cfg.refresh_hz).await;
    }

    let report = Report {
        stats: app.stats(),
        reticle: app.reticle(),
        instances: app.scene().instances().collect(),
        feed_releases: session.releases(),
        sessions: session.sessions(),
    };
    let out = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", out);
    Ok(())
}
