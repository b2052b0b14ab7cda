mod sim;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use rev_core::{apply_search, export_memories, import_memories, sample_field};
use rev_session::{Session, SessionConfig, VideoFrame};

use crate::sim::{
    LevelSentiment, RenderTally, SimCapture, SimDetector, SimSpeech, TallyRenderer, radial_image,
};

#[derive(Parser)]
#[command(name = "rev", about = "Reverie interaction core demo driver")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted headless session and print a summary
    Demo {
        /// Render ticks to run
        #[arg(long, default_value_t = 400)]
        ticks: usize,

        /// Target point count for the sampled cloud
        #[arg(long, default_value_t = 800)]
        points: usize,
    },

    /// Run a short scripted session and export its memories as JSON
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Import memories from a JSON export and list them
    Import {
        /// Input file path
        path: PathBuf,
    },

    /// Print core constants and a sampled-cloud summary
    Stats,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Demo { ticks, points } => cmd_demo(*ticks, *points).await,
        Commands::Export { path } => cmd_export(path).await,
        Commands::Import { path } => cmd_import(path),
        Commands::Stats => cmd_stats(),
    }
}

/// Drive a full scripted session: choreographed gestures, streamed speech,
/// chunked audio sentiment, and two memory saves along the way.
async fn run_session(ticks: usize, points: usize) -> Result<(Session, RenderTally)> {
    let tally = RenderTally::default();
    let mut session = Session::new(
        SessionConfig {
            cloud_points: points,
            chunk_period: Duration::from_millis(250),
        },
        Box::new(SimDetector::choreography()),
        Box::new(TallyRenderer {
            tally: tally.clone(),
        }),
        Box::new(SimSpeech::new(&[
            "walking by the sea at dusk",
            "city lights from the rooftop",
            "quiet forest morning",
        ])),
        Arc::new(LevelSentiment),
        Box::new(SimCapture::new(0.4)),
    );

    session.load_image("demo://radial", radial_image(96)?);
    session
        .start_recording()
        .context("failed to start recording")?;

    let first_save = ticks * 2 / 3;
    for tick in 0..ticks {
        let frame = VideoFrame {
            data: Vec::new(),
            timestamp_ms: tick as f64 * 16.0,
        };
        session.poll_detection(&frame);
        session.render_tick(16.0);

        if tick == first_save || tick + 2 == ticks {
            session.save_memory();
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    session.stop_recording();
    Ok((session, tally))
}

async fn cmd_demo(ticks: usize, points: usize) -> Result<()> {
    let (session, tally) = run_session(ticks, points).await?;

    println!("frames:    {}", tally.frames.load(Ordering::SeqCst));
    println!(
        "cloud:     {} points (generation {})",
        session.state.cloud.len(),
        session.state.cloud_generation
    );

    let (mut spawn, mut fly, mut dock) = (0usize, 0usize, 0usize);
    for glyph in session.engine().glyphs() {
        match glyph.phase().name() {
            "spawn" => spawn += 1,
            "fly" => fly += 1,
            _ => dock += 1,
        }
    }
    println!(
        "glyphs:    {} live ({spawn} spawn / {fly} fly / {dock} dock)",
        session.engine().glyph_count()
    );
    println!("memories:  {} saved", session.state.memories.len());
    println!("sentiment: {}", session.state.sentiment.as_str());

    let mut memories = session.state.memories.clone();
    if apply_search(&mut memories, "sea") {
        println!(
            "search \"sea\": best \"{}\" (score {:.2})",
            memories[0].transcript, memories[0].match_score
        );
    } else {
        println!("search \"sea\": no match");
    }
    Ok(())
}

async fn cmd_export(path: &Path) -> Result<()> {
    let (session, _) = run_session(240, 400).await?;
    let json = export_memories(&session.state.memories)
        .map_err(|e| anyhow::anyhow!("export failed: {e}"))?;
    std::fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "exported {} memories to {}",
        session.state.memories.len(),
        path.display()
    );
    Ok(())
}

fn cmd_import(path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let memories = import_memories(&json).map_err(|e| anyhow::anyhow!("import failed: {e}"))?;

    println!("imported {} memories", memories.len());
    for memory in &memories {
        println!(
            "  [{}] {} \"{}\" ({} segments)",
            rev_core::time::unix_millis_to_iso8601(memory.timestamp_ms),
            memory.sentiment.as_str(),
            memory.transcript,
            memory.voice_segments.len()
        );
    }
    Ok(())
}

fn cmd_stats() -> Result<()> {
    println!("golden angle:   {:.6} rad", rev_core::GOLDEN_ANGLE);
    println!("cloud extent:   {:.1}", rev_core::CLOUD_EXTENT);
    println!("glyph cap:      {}", rev_core::GLYPH_CAP);
    println!("pinch distance: {}", rev_core::PINCH_DISTANCE);

    let image = radial_image(64)?;
    let mut rng = SmallRng::seed_from_u64(42);
    let cloud = sample_field(&image, 500, &mut rng);
    let (near, far) = cloud.iter().fold((f32::MIN, f32::MAX), |(near, far), p| {
        (near.max(p.position.z), far.min(p.position.z))
    });
    println!("sampled:        {} points from a 64x64 image", cloud.len());
    println!("depth span:     {far:.2} .. {near:.2}");
    Ok(())
}
