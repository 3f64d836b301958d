mod app;
mod config;
mod controller;
mod engine;
mod event;
mod observer;
mod store;
mod tui;
mod ui;
mod view;

use std::fs::File;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use config::Config;

#[derive(Parser)]
#[command(
    name = "trisplit",
    about = "A resizable three-pane split layout for the terminal"
)]
struct Cli {
    /// Storage key for the persisted layout (overrides the config file)
    #[arg(short = 'k', long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the persisted layout record
    State,
    /// Delete the persisted layout record
    Reset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();
    let config = Config::load();

    match cli.command {
        None => {
            tui::install_panic_hook();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(app::App::run(config, cli.key))
        }
        Some(Commands::State) => {
            match storage_key(&cli, &config) {
                Some(key) => match store::load(&key) {
                    Some(layout) => println!("{}", serde_json::to_string_pretty(&layout)?),
                    None => println!("no saved layout under key \"{key}\""),
                },
                None => println!("persistence is disabled"),
            }
            Ok(())
        }
        Some(Commands::Reset) => {
            match storage_key(&cli, &config) {
                Some(key) => {
                    let path = store::layout_file_path(&key);
                    if path.exists() {
                        std::fs::remove_file(&path)?;
                        println!("removed {}", path.display());
                    } else {
                        println!("nothing saved under key \"{key}\"");
                    }
                }
                None => println!("persistence is disabled"),
            }
            Ok(())
        }
    }
}

fn storage_key(cli: &Cli, config: &Config) -> Option<String> {
    cli.key
        .clone()
        .or_else(|| config.layout.storage_key.clone())
}

/// File-based logging, gated on TRISPLIT_LOG so diagnostics never land in
/// the alternate screen.
fn init_logging() {
    if std::env::var_os("TRISPLIT_LOG").is_none() {
        return;
    }
    let path = store::data_dir().join("trisplit.log");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = File::create(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
}
