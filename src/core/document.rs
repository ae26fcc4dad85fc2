//! HTML document model on top of `scraper`.
//!
//! Parsing follows the HTML5 tree builder, so implied end tags (`<li>`, `<p>`, `<td>`, ...) close
//! the way a browser closes them. Edits happen on the parsed tree; `html()` serializes it again.

use crate::utils::error::{Result, ScaffoldError};
use chrono::Datelike;
use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Snapshot of one element: its tree handle plus name and attributes at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: NodeId,
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order; boolean attributes have an empty value.
    pub attrs: Vec<(String, String)>,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            id: element.id(),
            name: element.value().name().to_string(),
            attrs: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    html: Html,
    // 片段沒有 <html>/<body>，輸出時只序列化內容
    fragment: bool,
}

fn is_full_document(html: &str) -> bool {
    let head: String = html
        .trim_start()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();
    ["<!doctype", "<html", "<head", "<body"]
        .iter()
        .any(|prefix| head.starts_with(prefix))
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScaffoldError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Copies `source` and its subtree under `parent` in another tree.
fn copy_subtree(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    let Some(mut parent_node) = tree.get_mut(parent) else {
        return;
    };
    let copied = parent_node.append(source.value().clone()).id();
    for child in source.children() {
        copy_subtree(tree, copied, child);
    }
}

/// A detached `scraper` element carrying `attrs`; the caller restores the real tag name.
fn element_with_attrs(attrs: &[(String, String)]) -> Option<scraper::node::Element> {
    let mut tag = String::from("<span");
    for (name, value) in attrs {
        tag.push_str(&format!(" {}=\"{}\"", name, escape_text(value)));
    }
    tag.push_str("></span>");

    let parsed = Html::parse_fragment(&tag);
    let span = parsed.root_element().first_child()?;
    span.value().as_element().cloned()
}

impl Document {
    pub fn parse(html: impl Into<String>) -> Self {
        let html = html.into();
        let fragment = !is_full_document(&html);
        let parsed = if fragment {
            Html::parse_fragment(&html)
        } else {
            Html::parse_document(&html)
        };
        Self {
            html: parsed,
            fragment,
        }
    }

    pub fn html(&self) -> String {
        if self.fragment {
            self.html.root_element().inner_html()
        } else {
            self.html.html()
        }
    }

    pub fn into_html(self) -> String {
        self.html()
    }

    fn root_id(&self) -> NodeId {
        self.html.root_element().id()
    }

    fn element_ref(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Elements still attached to the tree, in document order. Content removed by an edit stays
    /// in the node arena, so `Html::select` cannot be used directly.
    fn attached(&self) -> impl Iterator<Item = ElementRef<'_>> {
        let root = self.root_id();
        let fragment = self.fragment;
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(move |el| !(fragment && el.id() == root))
    }

    /// All elements in document order. The wrapper element of a fragment is not included.
    pub fn elements(&self) -> Vec<Element> {
        self.attached().map(Element::from_ref).collect()
    }

    pub fn select(&self, selector: &str) -> Result<Vec<Element>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .attached()
            .filter(|el| selector.matches(el))
            .map(Element::from_ref)
            .collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.select(selector)?.into_iter().next())
    }

    /// Re-reads an element so attribute edits made after the snapshot are visible.
    pub fn refresh(&self, element: &Element) -> Option<Element> {
        self.element_ref(element.id).map(Element::from_ref)
    }

    pub fn inner_html(&self, element: &Element) -> String {
        self.element_ref(element.id)
            .map(|el| el.inner_html())
            .unwrap_or_default()
    }

    /// True when `inner` sits somewhere below `outer`.
    pub fn is_inside(&self, outer: &Element, inner: &Element) -> bool {
        self.html
            .tree
            .get(inner.id)
            .is_some_and(|node| node.ancestors().any(|a| a.id() == outer.id))
    }

    /// Replaces the content of the first element matching `selector`.
    pub fn set_inner_html(&mut self, selector: &str, html: &str) -> Result<()> {
        let element = self
            .select_first(selector)?
            .ok_or_else(|| ScaffoldError::ContainerNotFound {
                selector: selector.to_string(),
            })?;
        self.replace_inner(&element, html);
        Ok(())
    }

    pub fn replace_inner(&mut self, element: &Element, html: &str) {
        if element.is_void() {
            tracing::debug!("Ignoring content for void element <{}>", element.name);
            return;
        }

        let children: Vec<NodeId> = match self.html.tree.get(element.id) {
            Some(node) => node.children().map(|c| c.id()).collect(),
            None => return,
        };
        for child in children {
            if let Some(mut node) = self.html.tree.get_mut(child) {
                node.detach();
            }
        }
        self.append_html(element, html);
    }

    pub fn append_html(&mut self, element: &Element, html: &str) {
        if element.is_void() {
            return;
        }

        let fragment = Html::parse_fragment(html);
        for child in fragment.root_element().children() {
            copy_subtree(&mut self.html.tree, element.id, child);
        }
    }

    pub fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
        let Some(current) = self.refresh(element) else {
            return;
        };

        let mut attrs = current.attrs;
        let name = name.to_ascii_lowercase();
        match attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attrs.push((name, value.to_string())),
        }

        // 整個元素重建，scraper 的 id/class 快取才會跟著更新
        let Some(mut updated) = element_with_attrs(&attrs) else {
            return;
        };
        if let Some(mut node) = self.html.tree.get_mut(element.id) {
            if let Node::Element(existing) = node.value() {
                updated.name = existing.name.clone();
                *existing = updated;
            }
        }
    }

    /// Adds or removes a single class, leaving the other classes and attributes alone.
    pub fn set_class(&mut self, element: &Element, class: &str, enabled: bool) {
        let Some(current) = self.refresh(element) else {
            return;
        };
        let existing = current.attr("class").unwrap_or("");
        let mut classes: Vec<&str> = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        if enabled {
            classes.push(class);
        }

        let updated = classes.join(" ");
        if updated == existing || (updated.is_empty() && current.attr("class").is_none()) {
            return;
        }
        self.set_attribute(&current, "class", &updated);
    }

    /// `#app`, else `<body>`, else the document itself.
    pub fn app_container(&self) -> Element {
        let elements = self.elements();
        elements
            .iter()
            .find(|el| el.attr("id") == Some("app"))
            .or_else(|| elements.iter().find(|el| el.name == "body"))
            .cloned()
            .unwrap_or_else(|| Element::from_ref(self.html.root_element()))
    }

    pub fn clear_app(&mut self) {
        let app = self.app_container();
        self.replace_inner(&app, "");
    }

    pub fn render_heading(&mut self, text: &str) {
        let app = self.app_container();
        self.append_html(&app, &format!("<h1>{}</h1>", escape_text(text)));
    }

    pub fn render_paragraph(&mut self, text: &str) {
        let app = self.app_container();
        self.append_html(&app, &format!("<p>{}</p>", escape_text(text)));
    }

    pub fn set_title(&mut self, title: &str) {
        let elements = self.elements();
        if let Some(existing) = elements.iter().find(|el| el.name == "title") {
            self.replace_inner(existing, &escape_text(title));
        } else if let Some(head) = elements.iter().find(|el| el.name == "head") {
            self.append_html(head, &format!("<title>{}</title>", escape_text(title)));
        } else {
            tracing::debug!("Document has no <head>, title not set");
        }
    }

    /// Returns false when no element carries the id.
    pub fn set_text_by_id(&mut self, id: &str, text: &str) -> bool {
        let target = self
            .elements()
            .into_iter()
            .find(|el| el.attr("id") == Some(id));
        match target {
            Some(el) => {
                self.replace_inner(&el, &escape_text(text));
                true
            }
            None => false,
        }
    }

    /// Fills `#site-year` with the current year.
    pub fn setup_year_element(&mut self) -> bool {
        let year = chrono::Local::now().year();
        self.set_text_by_id("site-year", &year.to_string())
    }
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
