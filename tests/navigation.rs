use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use mangashelf::app::{App, Screen};
use mangashelf::catalog::{Catalog, CatalogLoadError, CatalogLoader, CatalogSource};
use mangashelf::config::SiteConfig;
use mangashelf::headless::HeadlessHost;
use mangashelf::prefs::{DisplayPreference, MemoryStorage};
use mangashelf::reader::KeyInput;

const CATALOG: &str = r#"{
    "series": [
        {
            "id": "s1",
            "title": "Night Harbor",
            "author": "K. Aoyama",
            "cover": "s1/cover.jpg",
            "chapters": [
                { "name": "Lanterns", "pages": ["s1/1/1.jpg", "s1/1/2.jpg", "s1/1/3.jpg"] },
                { "name": "Tide", "pages": ["s1/2/1.jpg", "s1/2/2.jpg"] }
            ]
        },
        {
            "id": "hollow",
            "title": "Hollow",
            "cover": "hollow/cover.jpg",
            "chapters": [ { "name": "Blank", "pages": [] } ]
        },
        {
            "id": "tide line",
            "title": "Tide Line",
            "cover": "tide/cover.jpg",
            "chapters": [ { "name": "Ebb", "pages": ["tide/1.jpg", "tide/2.jpg"] } ]
        }
    ]
}"#;

struct StubSource {
    fetches: Rc<Cell<usize>>,
    failures_left: Cell<usize>,
    yield_first: bool,
}

#[async_trait(?Send)]
impl CatalogSource for StubSource {
    async fn fetch(&self) -> Result<Catalog, CatalogLoadError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.yield_first {
            tokio::task::yield_now().await;
        }
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(CatalogLoadError::Status { status: 500 });
        }
        Catalog::parse(CATALOG)
    }

    fn describe(&self) -> String {
        "stub".to_owned()
    }
}

struct Session {
    app: App,
    host: Rc<HeadlessHost>,
    fetches: Rc<Cell<usize>>,
}

impl Session {
    fn with(storage: MemoryStorage, failures: usize, yield_first: bool) -> Self {
        let fetches = Rc::new(Cell::new(0));
        let source = StubSource {
            fetches: Rc::clone(&fetches),
            failures_left: Cell::new(failures),
            yield_first,
        };
        let config = SiteConfig::default();
        let host = Rc::new(HeadlessHost::new("#/"));
        let prefs = Rc::new(DisplayPreference::restore(
            config.width_key.clone(),
            Box::new(storage),
            host.clone(),
        ));
        let app = App::new(
            config,
            CatalogLoader::new(Box::new(source)),
            prefs,
            host.clone(),
        );
        Self {
            app,
            host,
            fetches,
        }
    }

    fn new() -> Self {
        Self::with(MemoryStorage::new(), 0, false)
    }

    /// Presses a key and follows the fragment change, if the key caused one.
    async fn press(&self, key: &str) -> Option<Screen> {
        self.host.press(&KeyInput::parse(key));
        match self.host.take_pending() {
            Some(fragment) => Some(self.app.navigate(&fragment).await),
            None => None,
        }
    }

    fn text(&self) -> String {
        self.host.mounted().map(|node| node.text_content()).unwrap_or_default()
    }
}

#[tokio::test]
async fn home_lists_series() {
    let session = Session::new();
    assert_eq!(session.app.navigate("#/").await, Screen::Home);

    let html = session.host.mounted_html();
    assert!(html.contains(r##"href="#/series/s1""##));
    assert!(html.contains(r##"href="#/series/hollow""##));
    assert!(html.contains("K. Aoyama • 2 chapters"));
    assert!(html.contains("Unknown author • 1 chapters"));
}

#[tokio::test]
async fn unrecognised_paths_render_home() {
    let session = Session::new();
    assert_eq!(session.app.navigate("#/library/s1").await, Screen::Home);
    assert_eq!(session.app.navigate("").await, Screen::Home);
}

#[tokio::test]
async fn series_detail_and_unknown_series() {
    let session = Session::new();
    assert_eq!(session.app.navigate("#/series/s1").await, Screen::Series);
    assert!(session.text().contains("Lanterns3 pages"));

    assert_eq!(
        session.app.navigate("#/series/unknown-id").await,
        Screen::NotFound
    );
    assert_eq!(session.text(), "Page not found");
    assert_eq!(
        session.app.navigate("#/read/unknown-id/0/0").await,
        Screen::NotFound
    );
}

#[tokio::test]
async fn ids_with_spaces_survive_the_fragment() {
    let session = Session::new();
    session.app.navigate("#/").await;
    assert!(session.host.mounted_html().contains(r##"href="#/series/tide%20line""##));

    assert_eq!(
        session.app.navigate("#/series/tide%20line").await,
        Screen::Series
    );
    assert!(session.text().contains("Ebb2 pages"));

    assert_eq!(
        session.app.navigate("#/read/tide%20line/0/0").await,
        Screen::Reader
    );
    assert_eq!(session.press("ArrowRight").await, Some(Screen::Reader));
    assert_eq!(session.host.fragment(), "#/read/tide%20line/0/1");
    assert!(session.text().contains("Tide Line · Ebb · page 2 / 2"));
}

#[tokio::test]
async fn reader_indices_are_clamped() {
    let session = Session::new();
    assert_eq!(session.app.navigate("#/read/s1/5/3").await, Screen::Reader);
    assert!(session.text().contains("Night Harbor · Tide · page 2 / 2"));

    assert_eq!(session.app.navigate("#/read/s1/-3/x").await, Screen::Reader);
    assert!(session.text().contains("Lanterns · page 1 / 3"));
}

#[tokio::test]
async fn chapter_without_pages_is_not_found() {
    let session = Session::new();
    assert_eq!(
        session.app.navigate("#/read/hollow/0/0").await,
        Screen::NotFound
    );
    assert!(!session.app.has_key_binding());
}

#[tokio::test]
async fn about_does_not_need_the_catalog() {
    let session = Session::with(MemoryStorage::new(), 1, false);
    assert_eq!(session.app.navigate("#/about").await, Screen::About);
    assert_eq!(session.fetches.get(), 0);
    assert!(session.text().contains("Keyboard shortcuts"));
}

#[tokio::test]
async fn catalog_failure_is_shown_and_retried() {
    let session = Session::with(MemoryStorage::new(), 1, false);
    assert_eq!(session.app.navigate("#/").await, Screen::Failure);
    assert_eq!(session.text(), "Error: failed to load catalog (HTTP 500)");

    assert_eq!(session.app.navigate("#/").await, Screen::Home);
    assert_eq!(session.fetches.get(), 2);

    session.app.navigate("#/series/s1").await;
    assert_eq!(session.fetches.get(), 2);
}

#[tokio::test]
async fn arrow_keys_walk_across_chapters() {
    let session = Session::new();
    session.app.navigate("#/read/s1/0/2").await;

    assert_eq!(session.press("ArrowRight").await, Some(Screen::Reader));
    assert_eq!(session.host.fragment(), "#/read/s1/1/0");
    assert!(session.text().contains("Tide · page 1 / 2"));

    session.press("ArrowLeft").await;
    assert_eq!(session.host.fragment(), "#/read/s1/0/2");

    session.press("Shift+ArrowRight").await;
    assert_eq!(session.host.fragment(), "#/read/s1/1/0");

    session.press("ArrowRight").await;
    assert_eq!(session.host.fragment(), "#/read/s1/1/1");

    // Last page of the last chapter.
    assert_eq!(session.press("ArrowRight").await, None);
    assert_eq!(session.press("Shift+ArrowRight").await, None);
    assert_eq!(session.host.fragment(), "#/read/s1/1/1");

    session.press("Shift+ArrowLeft").await;
    assert_eq!(session.host.fragment(), "#/read/s1/0/0");
    assert_eq!(session.press("ArrowLeft").await, None);
}

#[tokio::test]
async fn only_one_key_listener_is_ever_active() {
    let session = Session::new();
    session.app.navigate("#/read/s1/0/0").await;
    assert_eq!(session.host.listener_count(), 1);

    for _ in 0..4 {
        session.press("ArrowRight").await;
        assert_eq!(session.host.listener_count(), 1);
    }

    session.app.navigate("#/series/s1").await;
    assert_eq!(session.host.listener_count(), 0);

    session.app.navigate("#/read/s1/0/0").await;
    session.app.navigate("#/series/unknown").await;
    assert_eq!(session.host.listener_count(), 0);
    assert!(!session.app.has_key_binding());
}

#[tokio::test]
async fn next_page_is_preloaded_within_the_chapter() {
    let session = Session::new();
    session.app.navigate("#/read/s1/0/0").await;
    assert_eq!(session.host.preloads(), vec!["/s1/1/2.jpg"]);

    session.app.navigate("#/read/s1/0/2").await;
    assert_eq!(session.host.preloads(), vec!["/s1/1/2.jpg"]);
}

#[tokio::test]
async fn width_keys_are_capped_and_persisted() {
    let storage = MemoryStorage::new();
    let session = Session::with(storage.clone(), 0, false);
    assert_eq!(session.host.display_width(), Some(980));

    session.app.navigate("#/read/s1/0/0").await;
    for _ in 0..20 {
        assert_eq!(session.press("+").await, None);
    }
    assert_eq!(session.app.prefs().width(), 1600);
    assert_eq!(session.host.display_width(), Some(1600));
    assert_eq!(storage.get("fitWidth").as_deref(), Some("1600"));

    let reloaded = Session::with(storage, 0, false);
    assert_eq!(reloaded.host.display_width(), Some(1600));
    reloaded.app.navigate("#/read/s1/0/0").await;
    assert!(reloaded.text().contains("Width: 1600px"));
}

#[tokio::test]
async fn narrowing_stops_at_the_floor() {
    let storage = MemoryStorage::with_value("fitWidth", "520");
    let session = Session::with(storage, 0, false);
    session.app.navigate("#/read/s1/0/0").await;

    session.press("-").await;
    session.press("\u{2212}").await;
    assert_eq!(session.app.prefs().width(), 520);
}

#[tokio::test]
async fn width_keys_do_nothing_outside_the_reader() {
    let session = Session::new();
    session.app.navigate("#/").await;
    session.press("+").await;
    assert_eq!(session.app.prefs().width(), 980);
}

#[tokio::test]
async fn overlapping_first_loads_share_one_fetch() {
    let session = Session::with(MemoryStorage::new(), 0, true);
    let (first, second) = tokio::join!(
        session.app.navigate("#/series/s1"),
        session.app.navigate("#/")
    );
    assert_eq!(first, Screen::Superseded);
    assert_eq!(second, Screen::Home);
    assert_eq!(session.fetches.get(), 1);
    assert_eq!(session.host.mount_count(), 1);
}
