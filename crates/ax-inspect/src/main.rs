//! Axis editor clip inspector
//!
//! Lists the clips and bind poses of a GLB asset and samples a clip at a
//! given time, printing JSON to stdout.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ax_anim::{
    AnimationPlayer, AssetError, LoopMode, NodeBindPose, NodeTransformTable, PlayerError,
    load_animation_set,
};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ax-inspect")]
#[command(about = "Inspect animation clips in a binary glTF asset")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clip names, durations and animated node counts
    List { file: PathBuf },
    /// Node bind poses as JSON
    Nodes { file: PathBuf },
    /// Sample a clip and print the node transform table
    Sample {
        file: PathBuf,
        /// Clip to sample; the first clip when omitted
        #[arg(long)]
        clip: Option<String>,
        /// Time in seconds
        #[arg(long, conflicts_with = "percent")]
        time: Option<f32>,
        /// Fraction of the clip duration, 0 to 1
        #[arg(long)]
        percent: Option<f32>,
        /// Wrap times outside the clip instead of clamping
        #[arg(long = "loop")]
        looped: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum InspectError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<serde_json::Error> for InspectError {
    fn from(e: serde_json::Error) -> Self {
        InspectError::Output(e.to_string())
    }
}

#[derive(Serialize)]
struct ClipSummary<'a> {
    name: &'a str,
    duration: f32,
    nodes: usize,
}

#[derive(Serialize)]
struct SampleReport<'a> {
    clip: Option<&'a str>,
    time: f32,
    duration: f32,
    nodes: &'a NodeTransformTable,
}

fn list(file: &Path) -> Result<String, InspectError> {
    let set = load_animation_set(file)?;
    let clips: Vec<ClipSummary> = set
        .clips
        .iter()
        .map(|c| ClipSummary {
            name: &c.name,
            duration: c.duration,
            nodes: c.tracks.len(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&clips)?)
}

fn nodes(file: &Path) -> Result<String, InspectError> {
    let set = load_animation_set(file)?;
    let poses: Vec<&NodeBindPose> = set.nodes.values().collect();
    Ok(serde_json::to_string_pretty(&poses)?)
}

fn sample(
    file: &Path,
    clip: Option<&str>,
    time: Option<f32>,
    percent: Option<f32>,
    looped: bool,
) -> Result<String, InspectError> {
    let set = load_animation_set(file)?;
    let table = NodeTransformTable::for_set(&set);
    let mut player = AnimationPlayer::new(set, table, ax_anim::DEFAULT_FRAME_RATE);
    if let Some(name) = clip {
        player.set_clip(name)?;
    }
    if looped {
        player.set_loop_mode(LoopMode::Loop);
    }
    match (time, percent) {
        (_, Some(p)) => player.seek_percent(p),
        (t, None) => player.set_time(t.unwrap_or(0.0)),
    }

    let report = SampleReport {
        clip: player.clip_name(),
        time: player.current_time(),
        duration: player.duration(),
        nodes: player.sink(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn run(cli: Cli) -> Result<String, InspectError> {
    match cli.command {
        Command::List { file } => list(&file),
        Command::Nodes { file } => nodes(&file),
        Command::Sample {
            file,
            clip,
            time,
            percent,
            looped,
        } => sample(&file, clip.as_deref(), time, percent, looped),
    }
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ax_inspect=info,ax_anim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("{:?}", cli);

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sample_arguments() {
        let cli = Cli::try_parse_from([
            "ax-inspect", "sample", "rig.glb", "--clip", "wave", "--percent", "0.5", "--loop",
        ])
        .unwrap();
        match cli.command {
            Command::Sample {
                clip,
                percent,
                looped,
                time,
                ..
            } => {
                assert_eq!(clip.as_deref(), Some("wave"));
                assert_eq!(percent, Some(0.5));
                assert_eq!(time, None);
                assert!(looped);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(
            Cli::try_parse_from(["ax-inspect", "sample", "a.glb", "--time", "1", "--percent", "0.5"])
                .is_err()
        );
    }

    #[test]
    fn test_missing_file_is_an_asset_error() {
        let result = list(Path::new("/definitely/not/here.glb"));
        assert!(matches!(result, Err(InspectError::Asset(AssetError::Io(_)))));
    }
}
