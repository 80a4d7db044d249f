//! metaed - command-line binding for a MetaEdit session
//!
//! Drives a [`SessionController`] against a running metadata engine:
//! - `inspect` loads a file and prints its fields
//! - `export` writes `<stem>_metadata.json`
//! - `edit` applies `--set KEY=VALUE` edits and writes `<stem>_modified<ext>`

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use metaed_common::config::{load_toml_config, resolve_log_level};
use metaed_common::events::{EventBus, SessionEvent, SessionState, Severity};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metaed_session::config::ClientConfig;
use metaed_session::{FileHandle, HttpMetadataEngine, SessionController};

#[derive(Parser, Debug)]
#[command(name = "metaed")]
#[command(about = "Inspect and edit file metadata through a MetaEdit engine")]
#[command(version)]
struct Args {
    /// Base URL of the metadata engine
    #[arg(long, env = "METAED_ENGINE_URL", global = true)]
    engine_url: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the metadata of a file
    Inspect {
        file: PathBuf,
    },
    /// Write the metadata of a file as JSON
    Export {
        file: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Edit fields and write the modified file
    Edit {
        file: PathBuf,
        /// Field assignment, repeatable
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {:?}", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = load_toml_config(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| resolve_log_level(&toml_config).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::resolve(args.engine_url.clone(), &toml_config);
    info!("Using metadata engine at {}", config.engine_url);

    let event_bus = EventBus::new(64);
    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::StateChanged { new_state, .. } if new_state.is_busy() => {
                    info!(state = %new_state, "Waiting for metadata engine");
                }
                event => debug!(?event, "Session event"),
            }
        }
    });

    let engine = HttpMetadataEngine::new(config.engine_url.clone())?;
    let mut controller = SessionController::new(engine, config.policy, config.timings, event_bus);

    match args.command {
        Command::Inspect { file } => {
            load(&mut controller, &file).await?;
            println!("{}", controller.session().filename());
            for row in controller.rows() {
                let marker = if row.read_only { "  (read-only)" } else { "" };
                println!("  {}: {}{}", row.key, row.value, marker);
            }
        }
        Command::Export { file, out } => {
            load(&mut controller, &file).await?;
            let artifact = controller.export_json()?;
            let path = artifact
                .write_to(&out)
                .with_context(|| format!("writing into {}", out.display()))?;
            println!("Wrote {}", path.display());
        }
        Command::Edit { file, set, out } => {
            load(&mut controller, &file).await?;
            controller.on_edit_clicked()?;
            for (key, value) in &set {
                let change = controller.on_field_edited(key, value.as_str())?;
                if controller.policy().is_read_only(key) {
                    eprintln!("warning: {} is read-only and will not be written", key);
                }
                debug!(field = %key, modified = change.modified, "Field set");
            }

            if !controller.can_submit() {
                println!("No changes to submit.");
                return Ok(());
            }

            let download = controller.on_submit_clicked().await?;
            let message = controller
                .notification()
                .map(|n| (n.severity, n.message.clone()));

            match download {
                Some(artifact) => {
                    let path = artifact
                        .write_to(&out)
                        .with_context(|| format!("writing into {}", out.display()))?;
                    if let Some((severity, message)) = message {
                        println!("{}: {}", severity, message);
                    }
                    println!("Wrote {}", path.display());
                }
                None => {
                    let message = message
                        .filter(|(severity, _)| *severity == Severity::Error)
                        .map(|(_, message)| message)
                        .unwrap_or_else(|| "Modification failed.".to_string());
                    return Err(anyhow!(message));
                }
            }
        }
    }

    Ok(())
}

/// Upload `path` and wait for extraction; an extraction failure becomes the error
async fn load(controller: &mut SessionController<HttpMetadataEngine>, path: &Path) -> Result<()> {
    let file =
        FileHandle::from_path(path).with_context(|| format!("reading {}", path.display()))?;

    if controller.on_file_selected(file).await? != SessionState::Viewing {
        let message = controller
            .notification()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "Failed to extract metadata.".to_string());
        return Err(anyhow!(message));
    }
    Ok(())
}
