//! Integration tests for building trees from descriptions and reading
//! geometry snapshots back.

use weft_layout::{
    ApproximateMeasurer, BoxId, BoxTree, Container, DocumentDescription, FontCache,
    GeometrySnapshot, LayoutContext, RecordingHost, layout,
};

/// Helper: parse a JSON document description, lay it out, and capture the
/// geometry.
fn layout_json(json: &str) -> (BoxTree, GeometrySnapshot, RecordingHost) {
    let document: DocumentDescription =
        serde_json::from_str(json).expect("valid document description");
    let mut tree = BoxTree::from_description(&document.root);
    let mut host = RecordingHost::new();
    let mut container = Container::new(document.container);
    let mut fonts = FontCache::new();
    let mut ctx = LayoutContext::new(&ApproximateMeasurer, &mut host, &mut container, &mut fonts);
    layout(&mut tree, &mut ctx);
    let snapshot = GeometrySnapshot::capture(&mut tree, &container);
    (tree, snapshot, host)
}

/// Helper: the first box with the given tag.
fn find(tree: &BoxTree, tag: &str) -> BoxId {
    tree.ids()
        .find(|&id| tree[id].tag_name() == Some(tag))
        .unwrap_or_else(|| panic!("no <{tag}> box"))
}

#[test]
fn test_document_lays_out_from_json() {
    let (tree, snapshot, host) = layout_json(
        r#"{
            "container": { "max_width": 400 },
            "root": {
                "tag": "html",
                "children": [{
                    "tag": "body",
                    "style": { "margin-left": "8px", "margin-right": "8px" },
                    "children": [
                        { "tag": "div", "style": { "height": "50px" } },
                        { "tag": "p", "text": "hello world" }
                    ]
                }]
            }
        }"#,
    );
    assert!(host.reports().is_empty());

    let body = find(&tree, "body");
    let div = find(&tree, "div");
    let p = find(&tree, "p");
    assert_eq!(tree[body].location.x, 8.0);
    assert_eq!(tree[body].size.width, 384.0);
    assert_eq!(tree[div].size.height, 50.0);
    assert_eq!(tree[p].location.y, 50.0);
    assert_eq!(tree[p].line_boxes.len(), 1);

    let geometry = snapshot.get(p).expect("p captured");
    assert_eq!(geometry.tag.as_deref(), Some("p"));
    assert_eq!(geometry.text.as_deref(), Some("hello world"));
    assert_eq!(geometry.lines.len(), 1);
    assert_eq!(snapshot.document.width, 400.0);
}

/// Hidden elements and their subtrees are left out of the snapshot.
#[test]
fn test_snapshot_skips_hidden_boxes() {
    let (tree, snapshot, _) = layout_json(
        r#"{
            "container": { "max_width": 200 },
            "root": {
                "tag": "body",
                "children": [
                    { "tag": "head", "children": [{ "tag": "title", "text": "x" }] },
                    { "tag": "div", "style": { "display": "none" }, "children": [{ "tag": "p" }] },
                    { "tag": "section" }
                ]
            }
        }"#,
    );
    let section = find(&tree, "section");
    assert!(snapshot.get(section).is_some());
    assert!(snapshot.get(find(&tree, "title")).is_none());
    assert!(snapshot.get(find(&tree, "p")).is_none());
    assert_eq!(snapshot.boxes.len(), 2);
}

/// Inherited properties flow from parent to child.
#[test]
fn test_inherited_font_size_affects_lines() {
    let (tree, _, _) = layout_json(
        r#"{
            "container": { "max_width": 300 },
            "root": {
                "tag": "div",
                "style": { "font-size": "20px", "text-align": "right" },
                "children": [{ "tag": "p", "text": "ab" }]
            }
        }"#,
    );
    let p = find(&tree, "p");
    assert!((tree[p].size.height - 24.0).abs() < 1e-6);
    assert!((tree[p].words[0].left - (300.0 - 24.0)).abs() < 1e-6);
}

/// `<ol start>` and `<li>` produce numbered markers in the snapshot.
#[test]
fn test_ordered_list_markers_in_snapshot() {
    let (tree, snapshot, _) = layout_json(
        r#"{
            "container": { "max_width": 300 },
            "root": {
                "tag": "ol",
                "attributes": { "start": "7" },
                "style": { "padding-left": "40px" },
                "children": [
                    { "tag": "li", "text": "seven" },
                    { "tag": "li", "text": "eight" }
                ]
            }
        }"#,
    );
    let items: Vec<BoxId> = tree.children(BoxId::ROOT).to_vec();
    let markers: Vec<String> = items
        .iter()
        .filter_map(|&item| snapshot.get(item)?.marker.as_ref())
        .map(|marker| marker.text.clone())
        .collect();
    assert_eq!(markers, vec!["7.".to_string(), "8.".to_string()]);
}

/// Image attributes map to the dimension properties.
#[test]
fn test_image_attributes_and_state() {
    let (tree, _, _) = layout_json(
        r#"{
            "container": { "max_width": 300 },
            "root": {
                "tag": "p",
                "children": [
                    { "tag": "img", "attributes": { "width": "60" },
                      "image": { "loaded": { "width": 30, "height": 20 } } }
                ]
            }
        }"#,
    );
    let img = find(&tree, "img");
    assert_eq!(tree[img].size.width, 60.0);
    assert_eq!(tree[img].size.height, 40.0);
}

/// The snapshot serializes to JSON with the documented shape.
#[test]
fn test_snapshot_serializes() {
    let (_, snapshot, _) = layout_json(
        r#"{
            "container": { "max_width": 100 },
            "root": { "tag": "div", "text": "one two" }
        }"#,
    );
    let value = serde_json::to_value(&snapshot).expect("snapshot serializes");
    assert_eq!(value["document"]["width"], 100.0);
    let root = &value["boxes"][0];
    assert_eq!(root["id"], 0);
    assert_eq!(root["tag"], "div");
    assert_eq!(root["display"], "Block");
    assert_eq!(root["lines"].as_array().map(Vec::len), Some(1));
}

/// An inline root is blockified; unknown properties are ignored.
#[test]
fn test_inline_root_and_unknown_properties() {
    let (tree, _, host) = layout_json(
        r#"{
            "container": { "max_width": 100 },
            "root": { "tag": "span", "style": { "text-shadow": "none" }, "text": "x" }
        }"#,
    );
    assert_eq!(tree[BoxId::ROOT].size.width, 100.0);
    assert!(host.reports().is_empty());
}
