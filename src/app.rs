//! Navigation pipeline: fragment in, exactly one mounted view out.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::catalog::{Catalog, CatalogLoader};
use crate::config::SiteConfig;
use crate::node::Node;
use crate::prefs::DisplayPreference;
use crate::reader::{KeyInput, Navigator, ReaderCommand, preload_target};
use crate::route::{self, Route};
use crate::view;

pub type KeyHandler = Box<dyn Fn(&KeyInput)>;

/// Everything the reader needs from the page it lives in.
pub trait Host {
    /// Replaces whatever is currently mounted.
    fn mount(&self, view: Node) -> anyhow::Result<()>;

    /// Rewrites the URL fragment. The host reports the change back through
    /// [`App::navigate`], the same way a `hashchange` would.
    fn set_fragment(&self, fragment: &str);

    /// Best-effort background fetch of an image into the cache.
    fn preload_image(&self, src: &str);

    /// Starts delivering key presses to `handler` until the returned binding
    /// is dropped.
    fn listen_keys(&self, handler: KeyHandler) -> KeyBinding;
}

/// An active key listener. Dropping it removes the listener.
#[must_use = "the listener is removed as soon as the binding is dropped"]
pub struct KeyBinding {
    release: Option<Box<dyn FnOnce()>>,
}

impl KeyBinding {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for KeyBinding {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// What a navigation ended up showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Series,
    Reader,
    About,
    NotFound,
    Failure,
    /// A newer navigation started while this one waited for the catalog.
    Superseded,
}

/// Session-wide state: catalog cache, width preference, the host and the
/// currently bound reader keys.
pub struct App {
    config: SiteConfig,
    catalog: CatalogLoader,
    prefs: Rc<DisplayPreference>,
    host: Rc<dyn Host>,
    keys: RefCell<Option<KeyBinding>>,
    generation: Cell<u64>,
}

impl App {
    pub fn new(
        config: SiteConfig,
        catalog: CatalogLoader,
        prefs: Rc<DisplayPreference>,
        host: Rc<dyn Host>,
    ) -> Self {
        Self {
            config,
            catalog,
            prefs,
            host,
            keys: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn prefs(&self) -> &DisplayPreference {
        &self.prefs
    }

    pub fn has_key_binding(&self) -> bool {
        self.keys.borrow().is_some()
    }

    /// Handles an initial load or a fragment change. Never fails: any error
    /// ends up on screen as the failure view.
    pub async fn navigate(&self, fragment: &str) -> Screen {
        // Whatever was bound belongs to the previous fragment.
        self.keys.borrow_mut().take();
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let route = route::resolve(fragment);
        let screen = match self.dispatch(&route, generation).await {
            Ok(screen) => screen,
            Err(err) => {
                tracing::warn!(fragment, "navigation failed: {err:#}");
                if let Err(mount_err) = self.host.mount(view::failure(&err.to_string())) {
                    tracing::error!("failed to mount failure view: {mount_err:#}");
                }
                Screen::Failure
            }
        };
        tracing::debug!(fragment, ?screen, "navigation finished");
        screen
    }

    async fn dispatch(&self, route: &Route, generation: u64) -> anyhow::Result<Screen> {
        if *route == Route::About {
            self.host.mount(view::about())?;
            return Ok(Screen::About);
        }

        let catalog = self.catalog.load().await;
        if self.generation.get() != generation {
            return Ok(Screen::Superseded);
        }
        let catalog = catalog?;

        match route {
            Route::Home | Route::About => {
                self.host.mount(view::home(&self.config, catalog))?;
                Ok(Screen::Home)
            }
            Route::Series { id } => match catalog.series(id) {
                Some(series) => {
                    self.host.mount(view::series(series))?;
                    Ok(Screen::Series)
                }
                None => self.not_found(),
            },
            Route::Read {
                series_id,
                chapter,
                page,
            } => self.open_reader(catalog, series_id, *chapter, *page),
        }
    }

    fn open_reader(
        &self,
        catalog: &Catalog,
        series_id: &str,
        chapter: i64,
        page: i64,
    ) -> anyhow::Result<Screen> {
        let Some(series) = catalog.series(series_id) else {
            return self.not_found();
        };
        let Some(nav) = Navigator::clamp(series, chapter, page) else {
            return self.not_found();
        };
        let at = nav.position();

        self.host.mount(view::reader(
            &self.config,
            series,
            &nav,
            self.prefs.width(),
        ))?;

        if let Some(next) = preload_target(series, at) {
            self.host.preload_image(&self.config.asset_url(next));
        }

        let binding = self.host.listen_keys(reader_keys(
            series_id.to_owned(),
            nav,
            Rc::clone(&self.host),
            Rc::clone(&self.prefs),
        ));
        *self.keys.borrow_mut() = Some(binding);

        tracing::debug!(series = series_id, chapter = at.chapter, page = at.page, "reader mounted");
        Ok(Screen::Reader)
    }

    fn not_found(&self) -> anyhow::Result<Screen> {
        self.host.mount(view::not_found())?;
        Ok(Screen::NotFound)
    }
}

fn reader_keys(
    series_id: String,
    nav: Navigator,
    host: Rc<dyn Host>,
    prefs: Rc<DisplayPreference>,
) -> KeyHandler {
    Box::new(move |input| match nav.command(input) {
        Some(ReaderCommand::Goto(target)) => {
            tracing::debug!(key = %input.key, shift = input.shift, ?target, "reader step");
            host.set_fragment(&Route::read(&series_id, target).fragment());
        }
        Some(ReaderCommand::Widen) => {
            prefs.widen();
        }
        Some(ReaderCommand::Narrow) => {
            prefs.narrow();
        }
        None => {}
    })
}
