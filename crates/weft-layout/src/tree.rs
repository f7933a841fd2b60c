//! Arena-based box tree.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "The following sections describe the types of boxes that may be
//! generated in CSS 2.1."
//!
//! # Design
//!
//! Boxes live in a contiguous vector and refer to each other through
//! [`BoxId`] indices. A parent owns the ordered list of its children; a
//! child stores its parent's index. Parent walks are O(1) and there are no
//! reference cycles or lifetimes to manage.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut, Range};

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};
use crate::layout::inline::LineBox;
use crate::style::cache::{Property, StyleValueCache};

/// A type-safe index into the box tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(pub usize);

impl BoxId {
    /// The root box is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Loading state of a replaced image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageState {
    /// Still being fetched or decoded.
    #[default]
    Pending,
    /// Decoded; the intrinsic size is known.
    Loaded {
        /// Intrinsic width in pixels.
        width: f64,
        /// Intrinsic height in pixels.
        height: f64,
    },
    /// The load failed. Laid out as "no image".
    Failed,
}

/// The closed set of box kinds. Layout dispatches on this with a single
/// `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// An ordinary element or anonymous box.
    Generic,
    /// A horizontal rule (`<hr>`).
    Rule,
    /// A replaced image.
    Image(ImageState),
    /// Placeholder occupying the grid slots of a cell that spans rows.
    SpacingCell {
        /// The cell whose row span this placeholder stands in for.
        extended: BoxId,
        /// Rows covered by the spanning cell.
        rows: Range<usize>,
    },
}

/// Source element identity: tag name and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Lowercased local name.
    pub name: String,
    /// Element attributes.
    pub attributes: HashMap<String, String>,
}

impl Tag {
    /// A tag with no attributes.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attributes: HashMap::new(),
        }
    }

    /// Look up an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// What a [`Word`] displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WordContent {
    /// A run of text with no breakable whitespace.
    Text(String),
    /// The single placeholder of an image box.
    Image,
}

/// One unbreakable inline item of a box: a text run or an image.
///
/// Positions are absolute and written by the inline formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    /// Text or image.
    pub content: WordContent,
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Measured width.
    pub width: f64,
    /// Measured height.
    pub height: f64,
    /// Whether whitespace followed this word in the source text.
    pub has_space_after: bool,
    /// Width of that whitespace, including `word-spacing`.
    pub space_width: f64,
}

impl Word {
    /// An unmeasured text word.
    #[must_use]
    pub fn text(text: &str, has_space_after: bool) -> Self {
        Self {
            content: WordContent::Text(text.to_string()),
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            has_space_after,
            space_width: 0.0,
        }
    }

    /// An unmeasured image placeholder.
    #[must_use]
    pub const fn image() -> Self {
        Self {
            content: WordContent::Image,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            has_space_after: false,
            space_width: 0.0,
        }
    }

    /// The word's rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    /// Whether this is an image placeholder.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self.content, WordContent::Image)
    }
}

/// One CSS box.
#[derive(Debug, Clone)]
pub struct BoxNode {
    /// Polymorphic kind.
    pub kind: BoxKind,
    /// Source element, `None` for anonymous boxes.
    pub tag: Option<Tag>,
    /// Parent box. `None` for the root and for detached boxes.
    pub parent: Option<BoxId>,
    /// Ordered children.
    pub children: Vec<BoxId>,
    /// Top-left of the border box.
    pub location: Point,
    /// Border-box size.
    pub size: Size,
    /// Paint order hint (`z-index` of positioned boxes).
    pub stack_level: i32,
    /// Translation applied by `position: relative` in the last pass.
    pub relative_offset: Point,
    /// Top margin after collapsing, as used in the last pass.
    pub collapsed_margin_top: f64,
    /// Raw and actual style values.
    pub style: StyleValueCache,
    /// Inline content owned directly by this box.
    pub words: Vec<Word>,
    /// Lines of inline content laid out inside this box.
    pub line_boxes: Vec<LineBox>,
    /// Synthesized marker box for list items.
    pub list_marker: Option<BoxId>,
}

impl BoxNode {
    fn new(kind: BoxKind, tag: Option<Tag>) -> Self {
        let words = if matches!(kind, BoxKind::Image(_)) {
            vec![Word::image()]
        } else {
            Vec::new()
        };
        Self {
            kind,
            tag,
            parent: None,
            children: Vec::new(),
            location: Point::ZERO,
            size: Size::ZERO,
            stack_level: 0,
            relative_offset: Point::ZERO,
            collapsed_margin_top: 0.0,
            style: StyleValueCache::new(),
            words,
            line_boxes: Vec::new(),
            list_marker: None,
        }
    }

    /// `location.x + size.width`.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.location.x + self.size.width
    }

    /// `location.y + size.height`.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.location.y + self.size.height
    }

    /// Move the bottom edge by changing the height; `location` stays put.
    pub fn set_bottom(&mut self, bottom: f64) {
        self.size.height = bottom - self.location.y;
    }

    /// Move the right edge by changing the width.
    pub fn set_right(&mut self, right: f64) {
        self.size.width = right - self.location.x;
    }

    /// Bottom edge before any relative offset; the position following
    /// siblings flow from.
    #[must_use]
    pub fn flow_bottom(&self) -> f64 {
        self.bottom() - self.relative_offset.y
    }

    /// The border-box rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(
            self.location.x,
            self.location.y,
            self.size.width,
            self.size.height,
        )
    }

    /// Lowercased tag name, if any.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_ref().map(|t| t.name.as_str())
    }
}

/// Arena of boxes.
#[derive(Debug, Clone)]
pub struct BoxTree {
    nodes: Vec<BoxNode>,
    /// Percentage basis of the root box.
    pub(crate) initial_containing_block: Size,
}

impl Default for BoxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxTree {
    /// A tree holding only an anonymous block root.
    #[must_use]
    pub fn new() -> Self {
        let mut root = BoxNode::new(BoxKind::Generic, None);
        root.style.set_raw(Property::Display, "block");
        Self {
            nodes: vec![root],
            initial_containing_block: Size::ZERO,
        }
    }

    /// The root box.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        BoxId::ROOT
    }

    /// Number of boxes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a box by id.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&BoxNode> {
        self.nodes.get(id.0)
    }

    /// Get a mutable box by id.
    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut BoxNode> {
        self.nodes.get_mut(id.0)
    }

    /// All box ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = BoxId> + use<> {
        (0..self.nodes.len()).map(BoxId)
    }

    /// Allocate a detached box.
    pub fn alloc(&mut self, kind: BoxKind, tag: Option<Tag>) -> BoxId {
        let id = BoxId(self.nodes.len());
        self.nodes.push(BoxNode::new(kind, tag));
        id
    }

    /// Allocate a box and append it to `parent`.
    pub fn append_new(&mut self, parent: BoxId, kind: BoxKind, tag: Option<Tag>) -> BoxId {
        let id = self.alloc(kind, tag);
        self.append_child(parent, id);
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: BoxId, child: BoxId) {
        debug_assert!(
            parent != child && !self.is_descendant_of(parent, child),
            "appending {child} under {parent} would create a cycle"
        );
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: BoxId, child: BoxId) -> bool {
        let children = &mut self.nodes[parent.0].children;
        let before = children.len();
        children.retain(|&c| c != child);
        if children.len() == before {
            return false;
        }
        self.nodes[child.0].parent = None;
        true
    }

    /// The parent of a box.
    #[must_use]
    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The children of a box.
    #[must_use]
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The sibling immediately before `id`.
    #[must_use]
    pub fn previous_sibling(&self, id: BoxId) -> Option<BoxId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&c| c == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Siblings before `id`, nearest first.
    pub fn preceding_siblings(&self, id: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        let siblings = self.parent(id).map_or(&[][..], |p| self.children(p));
        let index = siblings.iter().position(|&c| c == id).unwrap_or(0);
        siblings[..index].iter().rev().copied()
    }

    /// Ancestors of `id`, parent first.
    #[must_use]
    pub fn ancestors(&self, id: BoxId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Whether `descendant` lies below `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: BoxId, ancestor: BoxId) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// Every box below `id` in pre-order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: BoxId) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut stack: Vec<BoxId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Replace the box's words with `text` split at whitespace.
    pub fn set_text(&mut self, id: BoxId, text: &str) {
        let mut words = Vec::new();
        let mut pieces = text.split_whitespace().peekable();
        while let Some(piece) = pieces.next() {
            let last = pieces.peek().is_none();
            let has_space_after = !last || text.ends_with(char::is_whitespace);
            words.push(Word::text(piece, has_space_after));
        }
        self.nodes[id.0].words = words;
    }

    /// Drop every memoized style value in the tree.
    pub fn invalidate_actual_values(&mut self) {
        for node in &mut self.nodes {
            node.style.invalidate_all();
        }
    }

    /// Set a raw style value on one box.
    ///
    /// A font property also drops the memos of every descendant and list
    /// marker below `id`, whose font size may be inherited or relative to
    /// this one.
    pub fn set_style(&mut self, id: BoxId, property: Property, value: impl Into<String>) {
        self.nodes[id.0].style.set_raw(property, value);
        if !property.affects_font() {
            return;
        }
        if let Some(marker) = self.nodes[id.0].list_marker {
            self.nodes[marker.0].style.invalidate_all();
        }
        for descendant in self.descendants(id) {
            let node = &mut self.nodes[descendant.0];
            node.style.invalidate_all();
            if let Some(marker) = node.list_marker {
                self.nodes[marker.0].style.invalidate_all();
            }
        }
    }
}

impl Index<BoxId> for BoxTree {
    type Output = BoxNode;

    fn index(&self, id: BoxId) -> &BoxNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut BoxNode {
        &mut self.nodes[id.0]
    }
}

/// Iterator over ancestors of a box.
pub struct Ancestors<'a> {
    tree: &'a BoxTree,
    current: Option<BoxId>,
}

impl Iterator for Ancestors<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
