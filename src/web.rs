//! Browser host: the real DOM, `localStorage`, `fetch` and `hashchange`.

use std::rc::Rc;

use async_trait::async_trait;
use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, KeyboardEvent, Window};

use crate::app::{App, Host, KeyBinding, KeyHandler};
use crate::catalog::{Catalog, CatalogLoadError, CatalogLoader, CatalogSource};
use crate::config::SiteConfig;
use crate::node::Node;
use crate::prefs::{DisplayPreference, Layout, PreferenceStorage};
use crate::reader::KeyInput;

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{err:?}")
}

pub struct WebHost {
    window: Window,
    document: Document,
    mount_id: String,
    width_var: String,
}

impl WebHost {
    pub fn new(window: Window, config: &SiteConfig) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        Ok(Self {
            window,
            document,
            mount_id: config.mount_id.clone(),
            width_var: config.width_var.clone(),
        })
    }

    fn current_fragment(&self) -> String {
        self.window.location().hash().unwrap_or_default()
    }

    fn build(&self, node: &Node) -> Result<web_sys::Node, JsValue> {
        match node {
            Node::Text(text) => Ok(self.document.create_text_node(text).into()),
            Node::Element(element) => {
                let dom = self.document.create_element(element.tag)?;
                for (name, value) in &element.attrs {
                    dom.set_attribute(name, value)?;
                }
                for child in &element.children {
                    dom.append_child(&self.build(child)?)?;
                }
                Ok(dom.into())
            }
        }
    }
}

impl Host for WebHost {
    fn mount(&self, view: Node) -> anyhow::Result<()> {
        let root = self
            .document
            .get_element_by_id(&self.mount_id)
            .ok_or_else(|| anyhow::anyhow!("missing mount element #{}", self.mount_id))?;
        let dom = self.build(&view).map_err(js_error)?;
        root.set_inner_html("");
        root.append_child(&dom).map_err(js_error)?;
        Ok(())
    }

    fn set_fragment(&self, fragment: &str) {
        if let Err(err) = self.window.location().set_hash(fragment) {
            tracing::warn!(fragment, "failed to set location hash: {err:?}");
        }
    }

    fn preload_image(&self, src: &str) {
        if let Ok(image) = HtmlImageElement::new() {
            image.set_src(src);
        }
    }

    fn listen_keys(&self, handler: KeyHandler) -> KeyBinding {
        let listener = EventListener::new(&self.window, "keydown", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                handler(&KeyInput::new(event.key(), event.shift_key()));
            }
        });
        KeyBinding::new(move || drop(listener))
    }
}

impl Layout for WebHost {
    fn set_display_width(&self, px: i64) {
        let Some(root) = self
            .document
            .document_element()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        if let Err(err) = root.style().set_property(&self.width_var, &format!("{px}px")) {
            tracing::warn!(px, "failed to set {}: {err:?}", self.width_var);
        }
    }
}

pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl PreferenceStorage for LocalStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn store(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("localStorage is unavailable"))?;
        storage.set_item(key, value).map_err(js_error)
    }
}

/// `fetch` with `cache: 'no-store'`.
pub struct FetchCatalogSource {
    url: String,
}

impl FetchCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl CatalogSource for FetchCatalogSource {
    async fn fetch(&self) -> Result<Catalog, CatalogLoadError> {
        let response = gloo_net::http::Request::get(&self.url)
            .cache(web_sys::RequestCache::NoStore)
            .send()
            .await
            .map_err(CatalogLoadError::Transport)?;
        if !response.ok() {
            return Err(CatalogLoadError::Status {
                status: response.status(),
            });
        }
        let raw = response
            .text()
            .await
            .map_err(CatalogLoadError::Transport)?;
        Catalog::parse(&raw)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Entry point of the wasm module.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    crate::logging::init().map_err(|err| JsValue::from_str(&format!("init logging: {err:#}")))?;

    let config = SiteConfig::default();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let host = Rc::new(WebHost::new(window.clone(), &config)?);
    let prefs = Rc::new(DisplayPreference::restore(
        config.width_key.clone(),
        Box::new(LocalStorage::new(&window)),
        host.clone(),
    ));
    let catalog = CatalogLoader::new(Box::new(FetchCatalogSource::new(
        config.catalog_path.clone(),
    )));
    let app = Rc::new(App::new(config, catalog, prefs, host.clone()));

    // Reader buttons carry their target fragment in `data-goto`.
    EventListener::new(&host.document, "click", {
        let host = Rc::clone(&host);
        move |event| {
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|element| element.closest("[data-goto]").ok().flatten())
                .and_then(|element| element.get_attribute("data-goto"));
            if let Some(fragment) = target {
                host.set_fragment(&fragment);
            }
        }
    })
    .forget();

    EventListener::new(&window, "hashchange", {
        let app = Rc::clone(&app);
        let host = Rc::clone(&host);
        move |_| {
            let app = Rc::clone(&app);
            let fragment = host.current_fragment();
            wasm_bindgen_futures::spawn_local(async move {
                app.navigate(&fragment).await;
            });
        }
    })
    .forget();

    let fragment = host.current_fragment();
    wasm_bindgen_futures::spawn_local(async move {
        app.navigate(&fragment).await;
    });
    Ok(())
}
