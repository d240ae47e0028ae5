//! A small element tree that views build and hosts turn into DOM or HTML.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

impl Element {
    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn attr_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl Node {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => escape_into(out, text),
            Self::Element(element) => {
                let _ = write!(out, "<{}", element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {name}=\"");
                    escape_into(out, value);
                    out.push('"');
                }
                out.push('>');
                if is_void(element.tag) {
                    return;
                }
                for child in &element.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element(element) => element.children.iter().map(Node::text_content).collect(),
        }
    }

    /// Depth-first list of every element carrying `name`, paired with its value.
    pub fn attr_values(&self, name: &str) -> Vec<String> {
        let mut values = Vec::new();
        self.collect_attr(name, &mut values);
        values
    }

    fn collect_attr(&self, name: &str, values: &mut Vec<String>) {
        if let Self::Element(element) = self {
            if let Some(value) = element.get_attr(name) {
                values.push(value.to_owned());
            }
            for child in &element.children {
                child.collect_attr(name, values);
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "input" | "meta" | "link")
}

fn escape_into(out: &mut String, raw: &str) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_nested_elements() {
        let node: Node = el("div")
            .class("card")
            .child(el("span").child("hi"))
            .child(el("img").attr("src", "/a.png"))
            .into();
        assert_eq!(
            node.to_html(),
            r#"<div class="card"><span>hi</span><img src="/a.png"></div>"#
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let node: Node = el("a")
            .attr("title", r#"say "hi" & <go>"#)
            .child("<script>")
            .into();
        assert_eq!(
            node.to_html(),
            r#"<a title="say &quot;hi&quot; &amp; &lt;go&gt;">&lt;script&gt;</a>"#
        );
    }

    #[test]
    fn text_content_and_attr_values_walk_the_tree() {
        let node: Node = el("div")
            .child(el("a").attr("href", "#/a").child("A"))
            .child(" and ")
            .child(el("p").child(el("a").attr("href", "#/b").child("B")))
            .into();
        assert_eq!(node.text_content(), "A and B");
        assert_eq!(node.attr_values("href"), vec!["#/a", "#/b"]);
    }

    #[test]
    fn attr_opt_skips_none() {
        let element = el("button")
            .attr_opt("data-goto", None::<String>)
            .attr_opt("title", Some("t"));
        assert_eq!(element.get_attr("data-goto"), None);
        assert_eq!(element.get_attr("title"), Some("t"));
    }
}
