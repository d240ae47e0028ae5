#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context as _;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser as _;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(not(target_arch = "wasm32"))]
async fn try_main() -> anyhow::Result<()> {
    let cli = mangashelf::cli::Cli::parse();
    let directives = match cli.command {
        mangashelf::cli::Command::Serve(_) => mangashelf::logging::SERVER,
        mangashelf::cli::Command::Render(_) => mangashelf::logging::QUIET,
    };
    mangashelf::logging::init(directives).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        mangashelf::cli::Command::Serve(args) => {
            mangashelf::serve::run(args).await.context("serve")?;
        }
        mangashelf::cli::Command::Render(args) => {
            mangashelf::render::run(args).await.context("render")?;
        }
    }

    Ok(())
}

// The browser build starts from `mangashelf::web::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}
