//! Persisted reader width.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::route::parse_index;

pub const DEFAULT_WIDTH: i64 = 980;
pub const MIN_WIDTH: i64 = 520;
pub const MAX_WIDTH: i64 = 1600;
pub const WIDTH_STEP: i64 = 40;

/// String key/value storage that survives across sessions.
pub trait PreferenceStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Receives the live width for the presentation layer.
pub trait Layout {
    fn set_display_width(&self, px: i64);
}

/// The user's page width. One instance per session, shared by reference.
pub struct DisplayPreference {
    key: String,
    storage: Box<dyn PreferenceStorage>,
    layout: Rc<dyn Layout>,
    width: Cell<i64>,
}

impl DisplayPreference {
    /// Reads the stored width and applies it. The stored value is not
    /// clamped; only missing, unparseable or zero values fall back to the
    /// default.
    pub fn restore(
        key: impl Into<String>,
        storage: Box<dyn PreferenceStorage>,
        layout: Rc<dyn Layout>,
    ) -> Self {
        let key = key.into();
        let stored = storage
            .load(&key)
            .map(|raw| parse_index(&raw))
            .filter(|px| *px != 0);
        let width = stored.unwrap_or(DEFAULT_WIDTH);
        tracing::debug!(key = %key, ?stored, width, "restored display width");

        let pref = Self {
            key,
            storage,
            layout,
            width: Cell::new(width),
        };
        pref.set(width);
        pref
    }

    pub fn width(&self) -> i64 {
        self.width.get()
    }

    /// Stores `px` and pushes it to the layout.
    pub fn set(&self, px: i64) {
        self.width.set(px);
        if let Err(err) = self.storage.store(&self.key, &px.to_string()) {
            tracing::warn!(key = %self.key, px, "failed to persist display width: {err:#}");
        }
        self.layout.set_display_width(px);
    }

    pub fn widen(&self) -> i64 {
        let px = self.width().saturating_add(WIDTH_STEP).min(MAX_WIDTH);
        self.set(px);
        tracing::info!(px, "display width increased");
        px
    }

    pub fn narrow(&self) -> i64 {
        let px = self.width().saturating_sub(WIDTH_STEP).max(MIN_WIDTH);
        self.set(px);
        tracing::info!(px, "display width decreased");
        px
    }
}

/// In-memory storage. Clones share the same map, so one handle can stand in
/// for a browser profile across several sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        storage
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn store(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use anyhow::Context as _;

    use super::PreferenceStorage;

    /// A JSON object on disk, rewritten atomically on every store.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        fn read_all(&self) -> anyhow::Result<BTreeMap<String, String>> {
            let bytes = match std::fs::read(&self.path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(BTreeMap::new());
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("read: {}", self.path.display()));
                }
            };
            serde_json::from_slice(&bytes).context("parse preferences json")
        }
    }

    impl PreferenceStorage for FileStorage {
        fn load(&self, key: &str) -> Option<String> {
            match self.read_all() {
                Ok(mut values) => values.remove(key),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), "ignoring preferences: {err:#}");
                    None
                }
            }
        }

        fn store(&self, key: &str, value: &str) -> anyhow::Result<()> {
            let mut values = self.read_all().unwrap_or_default();
            values.insert(key.to_owned(), value.to_owned());
            write_json_atomic(&self.path, &values)
        }
    }

    fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir: {}", parent.display()))?;
        }

        let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
        let data = serde_json::to_vec_pretty(value).context("serialize json")?;
        std::fs::write(&tmp_path, &data)
            .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("rename tmp to final: {}", path.display()))?;
        Ok(())
    }
}
