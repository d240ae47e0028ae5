//! A host without a browser: the mounted view, fragment, preloads and width
//! are kept in memory, and key presses are delivered by calling
//! [`HeadlessHost::press`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::app::{Host, KeyBinding, KeyHandler};
use crate::node::Node;
use crate::prefs::Layout;
use crate::reader::KeyInput;

type Listeners = Rc<RefCell<Vec<(u64, Rc<dyn Fn(&KeyInput)>)>>>;

#[derive(Default)]
pub struct HeadlessHost {
    fragment: RefCell<String>,
    pending: RefCell<Option<String>>,
    mounted: RefCell<Option<Node>>,
    mounts: Cell<usize>,
    preloads: RefCell<Vec<String>>,
    width: Cell<Option<i64>>,
    listeners: Listeners,
    next_listener: Cell<u64>,
}

impl HeadlessHost {
    pub fn new(fragment: &str) -> Self {
        let host = Self::default();
        host.fragment.replace(fragment.to_owned());
        host
    }

    pub fn fragment(&self) -> String {
        self.fragment.borrow().clone()
    }

    /// A fragment written by the reader that has not been navigated to yet.
    pub fn take_pending(&self) -> Option<String> {
        self.pending.borrow_mut().take()
    }

    pub fn mounted(&self) -> Option<Node> {
        self.mounted.borrow().clone()
    }

    pub fn mounted_html(&self) -> String {
        self.mounted
            .borrow()
            .as_ref()
            .map(Node::to_html)
            .unwrap_or_default()
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.get()
    }

    pub fn preloads(&self) -> Vec<String> {
        self.preloads.borrow().clone()
    }

    /// Last value pushed to the layout, if any.
    pub fn display_width(&self) -> Option<i64> {
        self.width.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers a key press to every active listener.
    pub fn press(&self, input: &KeyInput) {
        let handlers: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(input);
        }
    }
}

impl Host for HeadlessHost {
    fn mount(&self, view: Node) -> anyhow::Result<()> {
        self.mounted.replace(Some(view));
        self.mounts.set(self.mounts.get() + 1);
        Ok(())
    }

    fn set_fragment(&self, fragment: &str) {
        // Browsers fire no `hashchange` when the hash does not change.
        if *self.fragment.borrow() == fragment {
            return;
        }
        self.fragment.replace(fragment.to_owned());
        self.pending.replace(Some(fragment.to_owned()));
    }

    fn preload_image(&self, src: &str) {
        self.preloads.borrow_mut().push(src.to_owned());
    }

    fn listen_keys(&self, handler: KeyHandler) -> KeyBinding {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::from(handler)));

        let listeners = Rc::clone(&self.listeners);
        KeyBinding::new(move || {
            listeners.borrow_mut().retain(|(other, _)| *other != id);
        })
    }
}

impl Layout for HeadlessHost {
    fn set_display_width(&self, px: i64) {
        self.width.set(Some(px));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::el;

    #[test]
    fn dropping_a_binding_removes_its_listener() {
        let host = HeadlessHost::new("#/");
        let hits = Rc::new(Cell::new(0));

        let first = {
            let hits = Rc::clone(&hits);
            host.listen_keys(Box::new(move |_| hits.set(hits.get() + 1)))
        };
        let second = host.listen_keys(Box::new(|_| {}));
        assert_eq!(host.listener_count(), 2);

        host.press(&KeyInput::parse("ArrowRight"));
        assert_eq!(hits.get(), 1);

        drop(first);
        assert_eq!(host.listener_count(), 1);
        host.press(&KeyInput::parse("ArrowRight"));
        assert_eq!(hits.get(), 1);

        drop(second);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn unchanged_fragment_is_not_pending() {
        let host = HeadlessHost::new("#/about");
        host.set_fragment("#/about");
        assert_eq!(host.take_pending(), None);

        host.set_fragment("#/");
        assert_eq!(host.fragment(), "#/");
        assert_eq!(host.take_pending().as_deref(), Some("#/"));
        assert_eq!(host.take_pending(), None);
    }

    #[test]
    fn mount_replaces_previous_view() {
        let host = HeadlessHost::new("#/");
        host.mount(el("p").child("one").into()).unwrap();
        host.mount(el("p").child("two").into()).unwrap();
        assert_eq!(host.mounted_html(), "<p>two</p>");
        assert_eq!(host.mount_count(), 2);
    }
}
