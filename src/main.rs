//! Cuetrace CLI: evaluate a pattern file and trace which source ranges play.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cuetrace::{
    Config, Decorations, DocumentSource, Editor, LiveSession, MappingContext, MiniEngine,
};

#[derive(Parser)]
#[command(name = "cuetrace")]
#[command(about = "Trace playing pattern events back to their source", long_about = None)]
struct Cli {
    /// Pattern source file
    file: PathBuf,

    /// Number of highlight frames to simulate
    #[arg(short, long, default_value = "16")]
    frames: usize,

    /// Playback speed in cycles per second (overrides config)
    #[arg(long)]
    cps: Option<f64>,

    /// Config file (default: ~/.cuetrace/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cuetrace: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let document = std::fs::read_to_string(&cli.file)?;
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    if let Some(cps) = cli.cps {
        config.cps = cps;
    }

    let context = MappingContext::build(&document, &config.substitutions);
    println!(
        "cuetrace v{}: {} setup line(s), {} block(s), {} substitution(s)",
        env!("CARGO_PKG_VERSION"),
        context.setup_lines().len(),
        context.blocks().len(),
        context.substitutions().len()
    );
    for block in context.blocks() {
        println!("  block @ line {}: {}", block.start_line + 1, block.code);
    }
    println!("--- assembled ---\n{}\n-----------------", context.assembled_text());

    let mut session = LiveSession::new(
        Editor::new(&document),
        MiniEngine::new(),
        Decorations::new(),
        &config,
    );
    let marks = session.evaluate()?;
    println!("{marks} static location(s)");

    if !session.play()? {
        return Ok(());
    }
    let text = session.editor().text();
    let interval = config.frame_interval();
    for frame in 0..cli.frames {
        session.tick(Instant::now(), interval);
        let decorations = session.driver().sink();
        let active: Vec<&str> = decorations
            .active()
            .iter()
            .filter_map(|range| range.slice(&text))
            .collect();
        println!(
            "frame {frame:>4} @ {:>8.4}: {}",
            decorations.frame_time().unwrap_or(0.0),
            active.join(" ")
        );
    }
    session.stop();
    Ok(())
}
