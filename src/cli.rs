use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the static reader site (index, assets, catalog, images).
    Serve(ServeArgs),
    /// Render one navigation without a browser and print the mounted view.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// Site root directory. Must contain `index.html`.
    #[arg(long, default_value = "site")]
    pub site: PathBuf,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Catalog location: an http/https URL or a local JSON file.
    #[arg(long, env = "MANGASHELF_CATALOG")]
    pub catalog: String,

    /// Fragment to navigate to first.
    #[arg(long, default_value = "#/", allow_hyphen_values = true)]
    pub fragment: String,

    /// Key to press after the first navigation (repeatable), e.g.
    /// `ArrowRight`, `Shift+ArrowLeft`, `+`, `-`.
    #[arg(long = "key", allow_hyphen_values = true)]
    pub keys: Vec<String>,

    /// JSON file holding persisted preferences. Without it, preferences last
    /// for this run only.
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// JSON file overriding site settings (asset root, storage key, ...).
    #[arg(long)]
    pub config: Option<PathBuf>,
}
