//! Serde formats hosts use to hand a box tree in and read geometry out.
//!
//! A [`DocumentDescription`] is what a parse/cascade step would produce:
//! nested boxes with tag names, attributes, raw style strings, and text.
//! [`GeometrySnapshot`] is the resolved geometry after a layout pass.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use weft_common::warning::warn_once;

use crate::geometry::{BoxEdges, Rect, Size};
use crate::host::{Container, ContainerConfig};
use crate::style::cache::Property;
use crate::style::keywords::Display;
use crate::tree::{BoxId, BoxKind, BoxTree, ImageState, Tag};

/// A whole document: container configuration plus the root box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentDescription {
    /// Container configuration for the layout pass.
    pub container: ContainerConfig,
    /// The root box.
    pub root: BoxDescription,
}

/// One box as produced by the cascade.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoxDescription {
    /// Element tag name. Anonymous boxes have none.
    pub tag: Option<String>,
    /// Element attributes.
    pub attributes: HashMap<String, String>,
    /// CSS property name to raw value.
    pub style: BTreeMap<String, String>,
    /// Text content.
    pub text: Option<String>,
    /// Loading state, for image boxes.
    pub image: Option<ImageState>,
    /// Child boxes in document order.
    pub children: Vec<BoxDescription>,
}

/// [HTML Living Standard § 15.3 Non-replaced elements](https://html.spec.whatwg.org/multipage/rendering.html#non-replaced-elements)
///
/// The user agent stylesheet's `display` for a tag.
#[must_use]
pub fn default_display(tag: &str) -> Display {
    match tag {
        // [§ 15.3.1 Hidden elements]
        "area" | "base" | "datalist" | "head" | "link" | "meta" | "noscript" | "script"
        | "style" | "template" | "title" => Display::None,
        // [§ 15.3.3 Flow content]
        "address" | "article" | "aside" | "blockquote" | "body" | "center" | "dd" | "details"
        | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure" | "footer" | "form"
        | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hr" | "html" | "legend"
        | "main" | "menu" | "nav" | "ol" | "p" | "pre" | "section" | "summary" | "ul" => {
            Display::Block
        }
        // [§ 15.3.7 Lists]
        "li" => Display::ListItem,
        // [§ 15.3.8 Tables]
        "table" => Display::Table,
        "caption" => Display::TableCaption,
        "colgroup" => Display::TableColumnGroup,
        "col" => Display::TableColumn,
        "thead" => Display::TableHeaderGroup,
        "tbody" => Display::TableRowGroup,
        "tfoot" => Display::TableFooterGroup,
        "tr" => Display::TableRow,
        "td" | "th" => Display::TableCell,
        // [§ 15.5 Form controls]
        "input" | "button" | "textarea" | "select" => Display::InlineBlock,
        _ => Display::Inline,
    }
}

impl BoxTree {
    /// Build a tree from a description.
    ///
    /// Inherited properties are copied from the parent before the box's own
    /// declarations apply. Text of a box that also has children becomes a
    /// leading anonymous inline child, and runs of inline-level children
    /// next to block-level ones are wrapped in anonymous blocks.
    #[must_use]
    pub fn from_description(root: &BoxDescription) -> Self {
        let mut tree = Self::new();
        if let Some(name) = &root.tag {
            tree[BoxId::ROOT].tag = Some(tag_of(name, &root.attributes));
        }
        apply_style(&mut tree, BoxId::ROOT, root);
        // [§ 9.7](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
        // "Otherwise, if the element is the root element, 'display' is set
        // according to the table below."
        if tree.display(BoxId::ROOT).is_inline_level() {
            tree.set_style(BoxId::ROOT, Property::Display, "block");
        }
        fill(&mut tree, BoxId::ROOT, root);
        tree
    }
}

fn tag_of(name: &str, attributes: &HashMap<String, String>) -> Tag {
    let mut tag = Tag::new(name);
    tag.attributes.clone_from(attributes);
    tag
}

fn kind_of(description: &BoxDescription) -> BoxKind {
    let name = description.tag.as_deref().map(str::to_ascii_lowercase);
    match (name.as_deref(), description.image) {
        (_, Some(state)) => BoxKind::Image(state),
        (Some("img"), None) => BoxKind::Image(ImageState::Pending),
        (Some("hr"), None) => BoxKind::Rule,
        _ => BoxKind::Generic,
    }
}

fn build(tree: &mut BoxTree, parent: BoxId, description: &BoxDescription) {
    let tag = description
        .tag
        .as_ref()
        .map(|name| tag_of(name, &description.attributes));
    let id = tree.append_new(parent, kind_of(description), tag);
    inherit(tree, parent, id);
    apply_style(tree, id, description);
    fill(tree, id, description);
}

/// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
///
/// "Some values are inherited by the children of an element in the
/// document tree."
///
/// Font size is inherited as the keyword `inherit`, so it keeps following
/// the parent's resolved size.
fn inherit(tree: &mut BoxTree, parent: BoxId, id: BoxId) {
    for property in Property::all().filter(|p| p.is_inherited()) {
        if property == Property::FontSize {
            tree.set_style(id, property, "inherit");
            continue;
        }
        if tree[parent].style.is_specified(property) {
            let raw = tree[parent].style.raw(property).to_string();
            tree.set_style(id, property, raw);
        }
    }
}

fn apply_style(tree: &mut BoxTree, id: BoxId, description: &BoxDescription) {
    let name = tree[id].tag_name().map(ToString::to_string);
    if let Some(name) = &name {
        let display = default_display(name);
        tree.set_style(id, Property::Display, <&str>::from(display));
        // [§ 15.3.7 Lists] "ol { list-style-type: decimal; }"
        if name == "ol" {
            tree.set_style(id, Property::ListStyleType, "decimal");
        }
        // [§ 15.4.3 Attributes for embedded content and images]
        // "The width and height attributes map to the dimension properties
        // 'width' and 'height' on the element."
        if name == "img" {
            for (attribute, property) in [("width", Property::Width), ("height", Property::Height)] {
                if let Some(value) = description.attributes.get(attribute) {
                    let value = value.trim();
                    let value = if value.ends_with('%') || value.ends_with("px") {
                        value.to_string()
                    } else {
                        format!("{value}px")
                    };
                    tree.set_style(id, property, value);
                }
            }
        }
    }
    for (property, value) in &description.style {
        match Property::from_str(property.trim()) {
            Ok(property) => tree.set_style(id, property, value.clone()),
            Err(_) => warn_once("CSS", &format!("unsupported property '{property}'")),
        }
    }
}

fn fill(tree: &mut BoxTree, id: BoxId, description: &BoxDescription) {
    if let Some(text) = description.text.as_deref().filter(|t| !t.trim().is_empty()) {
        if description.children.is_empty() {
            tree.set_text(id, text);
        } else {
            let anonymous = tree.append_new(id, BoxKind::Generic, None);
            inherit(tree, id, anonymous);
            tree.set_text(anonymous, text);
        }
    }
    for child in &description.children {
        build(tree, id, child);
    }
    wrap_inline_runs(tree, id);
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "if a block container box (such as that generated for the DIV above)
/// has a block-level box inside it (such as the P above), then we force it
/// to have only block-level boxes inside it."
fn wrap_inline_runs(tree: &mut BoxTree, id: BoxId) {
    let children = tree.children(id).to_vec();
    let is_inline = |tree: &BoxTree, child: BoxId| tree.used_display(child).is_inline_level();
    let has_block = children.iter().any(|&c| {
        let display = tree.used_display(c);
        display != Display::None && !display.is_inline_level()
    });
    if !has_block || !children.iter().any(|&c| is_inline(tree, c)) {
        return;
    }

    tree[id].children.clear();
    let mut run: Option<BoxId> = None;
    for child in children {
        if is_inline(tree, child) {
            let anonymous = match run {
                Some(anonymous) => anonymous,
                None => {
                    let anonymous = tree.append_new(id, BoxKind::Generic, None);
                    inherit(tree, id, anonymous);
                    tree.set_style(anonymous, Property::Display, "block");
                    run = Some(anonymous);
                    anonymous
                }
            };
            tree.append_child(anonymous, child);
        } else {
            run = None;
            tree.append_child(id, child);
        }
    }
}

/// Geometry of every displayed box after a layout pass.
#[derive(Debug, Clone, Serialize)]
pub struct GeometrySnapshot {
    /// Aggregate document size.
    pub document: Size,
    /// Boxes in document order.
    pub boxes: Vec<BoxGeometry>,
}

/// Resolved geometry of one box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxGeometry {
    /// Arena index.
    pub id: BoxId,
    /// Parent box.
    pub parent: Option<BoxId>,
    /// Element tag name.
    pub tag: Option<String>,
    /// Used `display`.
    pub display: Display,
    /// Border box.
    pub rect: Rect,
    /// Resolved margins.
    pub margin: BoxEdges,
    /// Resolved border widths.
    pub border: BoxEdges,
    /// Resolved paddings.
    pub padding: BoxEdges,
    /// Paint order hint.
    pub stack_level: i32,
    /// Text of the box's own words.
    pub text: Option<String>,
    /// Line boxes laid out inside the box.
    pub lines: Vec<LineGeometry>,
    /// List marker glyph and rectangle.
    pub marker: Option<MarkerGeometry>,
}

/// One line box.
#[derive(Debug, Clone, Serialize)]
pub struct LineGeometry {
    /// Union of the contributing rectangles.
    pub rect: Rect,
    /// Each contributing box's rectangle on this line.
    pub boxes: Vec<(BoxId, Rect)>,
}

/// A list marker.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerGeometry {
    /// Marker text.
    pub text: String,
    /// Marker box.
    pub rect: Rect,
}

impl GeometrySnapshot {
    /// Capture the geometry of `tree` and the aggregate size of
    /// `container`.
    #[must_use]
    pub fn capture(tree: &mut BoxTree, container: &Container) -> Self {
        let mut ids = vec![BoxId::ROOT];
        ids.extend(tree.descendants(BoxId::ROOT));

        let mut boxes = Vec::with_capacity(ids.len());
        for id in ids {
            let display = tree.used_display(id);
            if display == Display::None || tree.ancestors(id).any(|a| tree.display(a) == Display::None)
            {
                continue;
            }
            let margin = tree.margins(id);
            let border = tree.borders(id);
            let padding = tree.paddings(id);
            let node = &tree[id];
            let lines = node
                .line_boxes
                .iter()
                .map(|line| LineGeometry {
                    rect: line
                        .rects
                        .values()
                        .copied()
                        .reduce(|a, b| a.union(&b))
                        .unwrap_or_default(),
                    boxes: line.rects.iter().map(|(&id, &rect)| (id, rect)).collect(),
                })
                .collect();
            let marker = node.list_marker.map(|marker| MarkerGeometry {
                text: words_text(tree, marker).unwrap_or_default(),
                rect: tree[marker].rect(),
            });
            boxes.push(BoxGeometry {
                id,
                parent: node.parent,
                tag: node.tag_name().map(ToString::to_string),
                display,
                rect: node.rect(),
                margin,
                border,
                padding,
                stack_level: node.stack_level,
                text: words_text(tree, id),
                lines,
                marker,
            });
        }
        Self {
            document: container.actual_size(),
            boxes,
        }
    }

    /// The geometry of one box, if it was captured.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&BoxGeometry> {
        self.boxes.iter().find(|b| b.id == id)
    }
}

fn words_text(tree: &BoxTree, id: BoxId) -> Option<String> {
    let words: Vec<&str> = tree[id]
        .words
        .iter()
        .filter_map(|w| match &w.content {
            crate::tree::WordContent::Text(text) => Some(text.as_str()),
            crate::tree::WordContent::Image => None,
        })
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_by_tag() {
        assert_eq!(default_display("div"), Display::Block);
        assert_eq!(default_display("li"), Display::ListItem);
        assert_eq!(default_display("td"), Display::TableCell);
        assert_eq!(default_display("script"), Display::None);
        assert_eq!(default_display("span"), Display::Inline);
    }

    #[test]
    fn test_mixed_content_is_wrapped() {
        let description: BoxDescription = serde_json::from_str(
            r#"{
                "tag": "div",
                "children": [
                    { "tag": "span", "text": "before" },
                    { "tag": "p", "text": "para" },
                    { "tag": "em", "text": "after" },
                    { "tag": "b", "text": "more" }
                ]
            }"#,
        )
        .unwrap();
        let tree = BoxTree::from_description(&description);
        let children = tree.children(BoxId::ROOT).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.display(children[0]), Display::Block);
        assert!(tree[children[0]].tag.is_none());
        assert_eq!(tree[children[1]].tag_name(), Some("p"));
        assert_eq!(tree.children(children[2]).len(), 2);
    }

    #[test]
    fn test_inherited_values_are_copied() {
        let description: BoxDescription = serde_json::from_str(
            r#"{
                "tag": "div",
                "style": { "color": "red", "font-size": "20px", "width": "50px" },
                "children": [ { "tag": "p", "text": "hi" } ]
            }"#,
        )
        .unwrap();
        let mut tree = BoxTree::from_description(&description);
        let p = tree.children(BoxId::ROOT)[0];
        assert_eq!(tree[p].style.raw(Property::Color), "red");
        assert_eq!(tree[p].style.raw(Property::Width), "auto");
        assert_eq!(tree.font_size(p), 20.0);
    }
}
