//! The constrained vector-layer format.
//!
//! A layer is a tree of named groups and paths. Names are significant: any
//! node whose name decodes to coloring rules becomes addressable by the
//! compositor. This is deliberately not a general SVG model: it carries
//! exactly what the rule machinery and the rasterizer need.
//!
//! [`LayerSource`] is the serializable form delivered by asset bundles;
//! each structural redraw instantiates it into a fresh tree of shared
//! [`DrawableRef`] handles so that rule bindings can mutate paint on
//! individual nodes while the tailor retains the root for rasterization.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::rules::{self, Rule};

/// Shared handle to a node of an instantiated layer tree.
pub type DrawableRef = Rc<RefCell<Drawable>>;

// ============================================================================
// Drawable
// ============================================================================

/// One node of an instantiated layer tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// The authored element name (may be empty, may encode rules).
    pub name: String,

    /// Current fill color, if any.
    pub fill: Option<Color>,

    /// Current stroke color, if any.
    pub stroke: Option<Color>,

    /// SVG path data for leaf paths. Nodes without path data serialize as
    /// groups; a node with path data is a leaf and its children are ignored.
    pub path: Option<String>,

    pub children: Vec<DrawableRef>,
}

impl Drawable {
    /// Creates an empty group node.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fill: None,
            stroke: None,
            path: None,
            children: Vec::new(),
        }
    }

    /// Creates a leaf path node.
    pub fn path(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fill: None,
            stroke: None,
            path: Some(data.into()),
            children: Vec::new(),
        }
    }

    pub fn into_ref(self) -> DrawableRef {
        Rc::new(RefCell::new(self))
    }

    /// Sets a paint property on this node and its whole subtree. Painting
    /// a named group recolors every path beneath it.
    pub fn set_paint(&mut self, property: rules::PaintProperty, color: Color) {
        match property {
            rules::PaintProperty::Fill => self.fill = Some(color),
            rules::PaintProperty::Stroke => self.stroke = Some(color),
        }
        for child in &self.children {
            child.borrow_mut().set_paint(property, color);
        }
    }
}

// ============================================================================
// Rule Collection
// ============================================================================

/// A node whose name decoded to at least one coloring rule.
pub struct RuleNode {
    /// The authored element name the rules came from.
    pub name: String,

    /// Handle to the node itself.
    pub node: DrawableRef,

    /// The decoded rules, in authoring order.
    pub rules: Vec<Rule>,
}

/// Walks a layer tree depth-first and collects every node whose name
/// carries coloring rules. Unnamed nodes and nodes whose names decode to
/// nothing are skipped.
pub fn collect_rule_nodes(root: &DrawableRef) -> Vec<RuleNode> {
    let mut out = Vec::new();
    visit(root, &mut out);
    out
}

fn visit(node: &DrawableRef, out: &mut Vec<RuleNode>) {
    let borrowed = node.borrow();
    if !borrowed.name.is_empty() {
        let rules = rules::parse(&borrowed.name);
        if !rules.is_empty() {
            out.push(RuleNode {
                name: borrowed.name.clone(),
                node: Rc::clone(node),
                rules,
            });
        }
    }
    for child in &borrowed.children {
        visit(child, out);
    }
}

// ============================================================================
// LayerSource
// ============================================================================

/// Serializable layer content, as delivered by asset bundles.
///
/// Mirrors the [`Drawable`] tree shape; `name` defaults to empty and all
/// paint/path fields are optional, so minimal authored JSON stays minimal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerSource>,
}

impl LayerSource {
    /// Creates a group source.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a leaf path source.
    pub fn path(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(data.into()),
            ..Self::default()
        }
    }

    /// Sets the authored fill color.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Sets the authored stroke color.
    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke = Some(color);
        self
    }

    /// Appends child sources.
    pub fn with_children(mut self, children: impl IntoIterator<Item = LayerSource>) -> Self {
        self.children.extend(children);
        self
    }

    /// Instantiates a fresh drawable tree. Each call produces new handles;
    /// handles from a previous instantiation are unrelated.
    pub fn instantiate(&self) -> DrawableRef {
        Drawable {
            name: self.name.clone(),
            fill: self.fill,
            stroke: self.stroke,
            path: self.path.clone(),
            children: self.children.iter().map(LayerSource::instantiate).collect(),
        }
        .into_ref()
    }
}

// ============================================================================
// Markup Serialization
// ============================================================================

/// Serializes an instantiated (and possibly recolored) layer tree to SVG
/// markup sized for a square canvas. With `flip_x` the whole layer is
/// mirrored about the canvas's vertical axis.
pub fn to_svg_markup(root: &DrawableRef, size: u32, flip_x: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
    );
    if flip_x {
        let _ = write!(out, r#"<g transform="translate({size} 0) scale(-1 1)">"#);
    }
    write_node(&mut out, root);
    if flip_x {
        out.push_str("</g>");
    }
    out.push_str("</svg>");
    out
}

fn write_node(out: &mut String, node: &DrawableRef) {
    let node = node.borrow();
    let mut paint = String::new();
    if let Some(fill) = node.fill {
        let _ = write!(paint, r#" fill="{}""#, fill.to_hex());
    }
    if let Some(stroke) = node.stroke {
        let _ = write!(paint, r#" stroke="{}""#, stroke.to_hex());
    }
    match &node.path {
        Some(data) => {
            let _ = write!(out, r#"<path d="{data}"{paint}/>"#);
        }
        None => {
            let _ = write!(out, "<g{paint}>");
            for child in &node.children {
                write_node(out, child);
            }
            out.push_str("</g>");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::PaintProperty;

    fn sample_source() -> LayerSource {
        LayerSource::group("").with_children([
            LayerSource::path("fill::shirt", "M0 0h10v10H0z").with_fill(Color::new(10, 20, 30)),
            LayerSource::group("shirt-f:darker::stroke::collar")
                .with_children([LayerSource::path("", "M0 0h4v4H0z")]),
        ])
    }

    #[test]
    fn instantiate_builds_an_equivalent_tree() {
        let root = sample_source().instantiate();
        let root = root.borrow();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].borrow().name, "fill::shirt");
        assert_eq!(root.children[0].borrow().fill, Some(Color::new(10, 20, 30)));
        assert_eq!(root.children[1].borrow().children.len(), 1);
    }

    #[test]
    fn collect_rule_nodes_skips_unnamed_and_plain_nodes() {
        let root = sample_source().instantiate();
        let nodes = collect_rule_nodes(&root);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "fill::shirt");
        assert_eq!(nodes[1].name, "shirt-f:darker::stroke::collar");
        assert!(nodes[0].rules[0].is_local());
        assert!(!nodes[1].rules[0].is_local());
    }

    #[test]
    fn set_paint_recolors_the_whole_subtree() {
        let root = sample_source().instantiate();
        let group = Rc::clone(&root.borrow().children[1]);
        group
            .borrow_mut()
            .set_paint(PaintProperty::Stroke, Color::new(1, 2, 3));

        assert_eq!(group.borrow().stroke, Some(Color::new(1, 2, 3)));
        assert_eq!(
            group.borrow().children[0].borrow().stroke,
            Some(Color::new(1, 2, 3))
        );
    }

    #[test]
    fn markup_carries_paint_attributes() {
        let root = sample_source().instantiate();
        let markup = to_svg_markup(&root, 100, false);
        assert!(markup.starts_with("<svg "));
        assert!(markup.contains(r#"viewBox="0 0 100 100""#));
        assert!(markup.contains(r##"fill="#0a141e""##));
        assert!(markup.contains(r#"d="M0 0h10v10H0z""#));
    }

    #[test]
    fn flip_wraps_the_layer_in_a_mirror_transform() {
        let root = sample_source().instantiate();
        let markup = to_svg_markup(&root, 100, true);
        assert!(markup.contains(r#"transform="translate(100 0) scale(-1 1)""#));
    }

    #[test]
    fn layer_source_deserializes_with_defaults() {
        let source: LayerSource =
            serde_json::from_str(r#"{"children":[{"name":"fill::cap","path":"M0 0"}]}"#).unwrap();
        assert_eq!(source.name, "");
        assert_eq!(source.children.len(), 1);
        assert_eq!(source.children[0].name, "fill::cap");
        assert_eq!(source.children[0].fill, None);
    }
}
