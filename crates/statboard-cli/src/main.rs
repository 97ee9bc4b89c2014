use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use statboard_core::{IndicatorsCardGroup, SubjectId, TeamCard, TeamGrid, team_cards};
use statboard_geometry::{OverlayPosition, Rect, compute_position};
use statboard_overlay::{JsonDirSource, OverlayContent, OverlayController, OverlaySettings};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with overlay settings; defaults apply when omitted
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print where a click overlay would be placed
    Position {
        /// Anchor rect as `top,left,width,height`
        #[arg(long, value_parser = parse_rect)]
        anchor: Rect,

        /// Container rect as `top,left,width,height`
        #[arg(long, value_parser = parse_rect)]
        container: Rect,
    },

    /// Open the team overlay against a directory of `<team>.json` files
    Inspect {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        #[arg(short, long)]
        team: i64,

        #[arg(long, value_parser = parse_rect, default_value = "0,0,120,40")]
        anchor: Rect,

        #[arg(long, value_parser = parse_rect, default_value = "0,0,1440,900")]
        container: Rect,
    },

    /// Lay out team tiles from a JSON array into the dashboard grid
    Grid {
        file: PathBuf,

        /// Team whose overlay is open
        #[arg(long)]
        open: Option<i64>,
    },
}

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    team: SubjectId,
    phase: String,
    position: Option<OverlayPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cards: Option<&'a [IndicatorsCardGroup]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn parse_rect(raw: &str) -> Result<Rect, String> {
    let parts: Vec<f32> = raw
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in rect `{raw}`: {e}"))?;

    match parts.as_slice() {
        [top, left, width, height] => Ok(Rect::new(*top, *left, *width, *height)),
        _ => Err(format!(
            "expected `top,left,width,height`, got {} values",
            parts.len()
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let settings = OverlaySettings::load_or_default(args.settings.as_deref())?;

    match args.command {
        Command::Position { anchor, container } => {
            let position = compute_position(
                anchor,
                container,
                settings.overlay_width,
                settings.side_padding,
                settings.vertical_offset,
            );
            println!("{}", serde_json::to_string_pretty(&position)?);
        }
        Command::Inspect {
            dir,
            team,
            anchor,
            container,
        } => inspect(settings, dir, SubjectId(team), anchor, container).await?,
        Command::Grid { file, open } => grid(file, open.map(SubjectId))?,
    }

    Ok(())
}

async fn inspect(
    settings: OverlaySettings,
    dir: PathBuf,
    team: SubjectId,
    anchor: Rect,
    container: Rect,
) -> Result<()> {
    info!(dir = %dir.display(), %team, "Inspecting team overlay");
    let mut overlay = OverlayController::new(
        settings,
        JsonDirSource::new(dir),
        team_cards,
        Handle::current(),
    );

    overlay
        .activate(Some(anchor), Some(container), team)
        .with_context(|| format!("Failed to open overlay for team {team}"))?;
    overlay.settle_next().await;

    let view = overlay.render();
    let (cards, error) = match view.content {
        OverlayContent::Ready(cards) => (Some(cards.as_slice()), None),
        OverlayContent::Error(message) => (None, Some(message)),
        OverlayContent::Loading | OverlayContent::Nothing => (None, None),
    };
    let snapshot = Snapshot {
        team,
        phase: format!("{:?}", view.phase),
        position: view.position,
        cards,
        error,
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn grid(file: PathBuf, open: Option<SubjectId>) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read teams from {}", file.display()))?;
    let teams: Vec<TeamCard> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse teams in {}", file.display()))?;

    let grid = TeamGrid::new(&teams);
    for (n, column) in grid.columns.iter().enumerate() {
        println!("column {}", n + 1);
        for team in column {
            let marker = if TeamGrid::is_active(team, open) { "*" } else { " " };
            println!(
                " {marker} {:<24} {:<20} {:>6}",
                team.title, team.leader, team.count
            );
        }
    }
    println!("total {}", grid.total);
    Ok(())
}
