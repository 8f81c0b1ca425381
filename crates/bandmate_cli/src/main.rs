//! CLI probe for the Bandmate core.
//!
//! # Responsibility
//! - Verify `bandmate_core` linkage without the mobile runtime.
//! - Rank feed fixtures and inspect stored board snapshots locally.

use bandmate_core::db::open_db;
use bandmate_core::{rank, Post, SqliteBoardRepository, UserProfile, WorkflowService};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "bandmate", version, about = "Bandmate core probe")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core ping and version.
    Ping,
    /// Rank a JSON array of posts for one JSON profile.
    Rank {
        #[arg(long)]
        profile: PathBuf,
        #[arg(long)]
        posts: PathBuf,
    },
    /// Print the stored board snapshot of one project as JSON.
    Boards {
        #[arg(long)]
        project: Uuid,
        #[arg(long, env = "BANDMATE_DB_PATH")]
        db: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Ping => {
            println!("bandmate_core ping={}", bandmate_core::ping());
            println!("bandmate_core version={}", bandmate_core::core_version());
            Ok(())
        }
        Command::Rank { profile, posts } => {
            let profile: UserProfile = read_json(&profile)?;
            let posts: Vec<Post> = read_json(&posts)?;
            let ranked = rank(&profile, &posts);
            print_json(&ranked)
        }
        Command::Boards { project, db } => {
            let conn = open_db(&db)
                .map_err(|err| format!("failed to open `{}`: {err}", db.display()))?;
            let repo = SqliteBoardRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let boards = WorkflowService::new(repo)
                .boards(project)
                .map_err(|err| err.to_string())?;
            print_json(&boards)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid json in `{}`: {err}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| format!("failed to encode: {err}"))?;
    println!("{rendered}");
    Ok(())
}
