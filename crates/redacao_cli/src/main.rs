//! Command-line probe over the essay store.
//!
//! Reads `REDACAO_*` environment overrides, so the same data directory the
//! app uses can be inspected or repaired from a shell.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use redacao_core::{display_title, EssayService, StoreConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "redacao")]
#[command(about = "Inspect and edit locally stored essays")]
#[command(version)]
struct Cli {
    /// Directory for rolling log files (absolute path)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,
    /// List essays, newest first
    List,
    /// Save a new essay
    Add {
        title: String,
        body: String,
    },
    /// Replace title and body of an essay
    Edit {
        id: String,
        title: String,
        body: String,
    },
    /// Remove an essay
    Rm { id: String },
    /// Write an essay as a .txt file into a directory
    Export {
        id: String,
        #[arg(default_value = ".")]
        out_dir: PathBuf,
    },
    /// Discard all stored essays
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        redacao_core::init_logging(
            redacao_core::default_log_level(),
            &log_dir.to_string_lossy(),
        )
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    }

    if let Commands::Ping = cli.command {
        println!("redacao_core ping={}", redacao_core::ping());
        println!("redacao_core version={}", redacao_core::core_version());
        return Ok(());
    }

    let config = StoreConfig::from_env().map_err(anyhow::Error::msg)?;
    let store = config
        .open_store()
        .await
        .with_context(|| format!("failed to open store in {}", config.data_dir.display()))?;
    let service = EssayService::new(store);

    match cli.command {
        Commands::Ping => {}
        Commands::List => {
            let essays = service.list_recent_first().await?;
            if essays.is_empty() {
                println!("No essays.");
            }
            for essay in essays {
                println!(
                    "{}  {}  ({} chars)",
                    essay.id,
                    display_title(&essay.title),
                    essay.body.chars().count()
                );
            }
        }
        Commands::Add { title, body } => {
            let created = service.create_essay(&title, &body).await?;
            println!("{}", created.id);
        }
        Commands::Edit { id, title, body } => {
            let updated = service.update_essay(&id, &title, &body).await?;
            println!("Updated {}", updated.id);
        }
        Commands::Rm { id } => {
            service.delete_essay(&id).await?;
            println!("Removed {id}");
        }
        Commands::Export { id, out_dir } => {
            let export = service.export_text(&id).await?;
            let path = out_dir.join(&export.file_name);
            tokio::fs::write(&path, export.contents)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Commands::Reset => {
            service.reset_collection().await?;
            println!("Essay collection reset.");
        }
    }

    Ok(())
}
