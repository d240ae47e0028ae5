use serde::Deserialize;

/// Fixed locations and names shared by the site, the reader and the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Catalog document, relative to the site root.
    pub catalog_path: String,
    /// Prefix for cover and page image paths from the catalog.
    pub asset_root: String,
    /// Storage key of the persisted width.
    pub width_key: String,
    /// CSS custom property consumed by the reader canvas.
    pub width_var: String,
    /// Element id the views are mounted into.
    pub mount_id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            catalog_path: "/data/manga.json".to_owned(),
            asset_root: "/".to_owned(),
            width_key: "fitWidth".to_owned(),
            width_var: "--fit-width".to_owned(),
            mount_id: "app".to_owned(),
        }
    }
}

impl SiteConfig {
    pub fn asset_url(&self, path: &str) -> String {
        format!("{}{path}", self.asset_root)
    }
}
