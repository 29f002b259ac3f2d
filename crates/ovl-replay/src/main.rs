//! Replay a script of editor actions against a headless scene and print the
//! resulting layers.
//!
//! State is persisted to `--state` between runs, so consecutive invocations
//! continue the same session. Logs go to stderr at `info`; set
//! `RUST_LOG=debug` to trace each step.

mod script;

use clap::Parser;
use ovl_editor::{Editor, EditorConfig, EditorError, FileStore, HeadlessScene, StateStore};
use script::{Replay, ReplayError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "ovl-replay",
    about = "Replay overlay editor actions against a headless scene",
    version
)]
struct Args {
    /// JSON file holding an array of actions.
    script: PathBuf,

    /// File the editor state is persisted to.
    #[arg(long, default_value = "ovl-state.json")]
    state: PathBuf,

    /// Editor config (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discard any saved state before replaying.
    #[arg(long)]
    fresh: bool,
}

fn run(args: &Args) -> Result<String, ReplayError> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path).map_err(EditorError::from)?,
        None => EditorConfig::default(),
    };

    let mut store = FileStore::new(&args.state);
    if args.fresh {
        store.clear().map_err(EditorError::from)?;
    }

    let script = std::fs::read_to_string(&args.script).map_err(|source| ReplayError::Io {
        path: args.script.display().to_string(),
        source,
    })?;
    let actions = script::parse_script(&script)?;

    let scene = HeadlessScene::new(config.default_canvas_width, config.default_canvas_height);
    let editor = Editor::new(scene, store, config)?;
    let mut replay = Replay::new(editor);
    replay.run_all(actions)?;

    Ok(serde_json::to_string_pretty(&replay.report())?)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("replay failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
