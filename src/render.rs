//! `mangashelf render`: the navigation pipeline against [`HeadlessHost`].

use std::io::Write as _;
use std::rc::Rc;

use anyhow::Context as _;

use crate::app::{App, Screen};
use crate::catalog::{CatalogLoader, source_for};
use crate::cli::RenderArgs;
use crate::config::SiteConfig;
use crate::headless::HeadlessHost;
use crate::prefs::{DisplayPreference, FileStorage, MemoryStorage, PreferenceStorage};
use crate::reader::KeyInput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub fragment: String,
    pub screen: Screen,
    pub width: i64,
    pub html: String,
}

pub async fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read: {}", path.display()))?;
            serde_json::from_str(&raw).context("parse site config")?
        }
        None => SiteConfig::default(),
    };
    let storage: Box<dyn PreferenceStorage> = match &args.prefs {
        Some(path) => Box::new(FileStorage::new(path)),
        None => Box::new(MemoryStorage::new()),
    };
    let keys: Vec<KeyInput> = args.keys.iter().map(|key| KeyInput::parse(key)).collect();

    let outcome = render(
        config,
        CatalogLoader::new(source_for(&args.catalog)),
        storage,
        &args.fragment,
        &keys,
    )
    .await;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "fragment: {}", outcome.fragment).context("write stdout")?;
    writeln!(stdout, "width: {}", outcome.width).context("write stdout")?;
    writeln!(stdout, "{}", outcome.html).context("write stdout")?;

    if outcome.screen == Screen::Failure {
        anyhow::bail!("navigation to {} failed", outcome.fragment);
    }
    Ok(())
}

/// Boots a session at `fragment`, then replays `keys`. Every fragment the
/// reader writes is followed like a `hashchange`.
pub async fn render(
    config: SiteConfig,
    catalog: CatalogLoader,
    storage: Box<dyn PreferenceStorage>,
    fragment: &str,
    keys: &[KeyInput],
) -> RenderOutcome {
    let host = Rc::new(HeadlessHost::new(fragment));
    let prefs = Rc::new(DisplayPreference::restore(
        config.width_key.clone(),
        storage,
        host.clone(),
    ));
    let app = App::new(config, catalog, Rc::clone(&prefs), host.clone());

    let mut screen = app.navigate(fragment).await;
    for key in keys {
        host.press(key);
        if let Some(next) = host.take_pending() {
            screen = app.navigate(&next).await;
        }
    }

    RenderOutcome {
        fragment: host.fragment(),
        screen,
        width: prefs.width(),
        html: host.mounted_html(),
    }
}
