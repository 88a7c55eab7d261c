//! Human-readable dumps of a laid out subtree.

use crate::enums::{Dimension, Gutter};
use crate::style::{Edges, Style};
use crate::tree::{LayoutTree, NodeId};
use crate::value::Value;
use core::fmt;

/// What [`node_to_string`] includes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PrintOptions {
    /// Snapped size and offset of each node.
    pub layout: bool,
    /// Style properties that differ from the defaults.
    pub style: bool,
    /// Recurse into children.
    pub children: bool,
}

impl PrintOptions {
    pub const fn all() -> Self {
        Self {
            layout: true,
            style: true,
            children: true,
        }
    }
}

fn push_property(out: &mut String, name: &str, value: impl fmt::Display) {
    out.push_str(&format!("{name}: {value}; "));
}

fn push_edges(out: &mut String, prefix: &str, edges: &Edges, defaults: &Edges) {
    for (edge, value) in edges.defined() {
        if value != defaults.get(edge) {
            let name = if prefix.is_empty() {
                edge.as_str().to_owned()
            } else {
                format!("{prefix}-{}", edge.as_str())
            };
            push_property(out, &name, value);
        }
    }
}

fn push_dimension(out: &mut String, name: &str, value: Value, default: Value) {
    if value != default {
        push_property(out, name, value);
    }
}

/// CSS-like list of the style properties of `style` that differ from `defaults`.
fn style_attribute(style: &Style, defaults: &Style) -> String {
    let mut out = String::new();
    if style.direction != defaults.direction {
        push_property(&mut out, "direction", format!("{:?}", style.direction).to_lowercase());
    }
    if style.flex_direction != defaults.flex_direction {
        push_property(&mut out, "flex-direction", style.flex_direction.as_str());
    }
    if style.justify_content != defaults.justify_content {
        push_property(&mut out, "justify-content", style.justify_content.as_str());
    }
    if style.align_content != defaults.align_content {
        push_property(&mut out, "align-content", style.align_content.as_str());
    }
    if style.align_items != defaults.align_items {
        push_property(&mut out, "align-items", style.align_items.as_str());
    }
    if style.align_self != defaults.align_self {
        push_property(&mut out, "align-self", style.align_self.as_str());
    }
    if style.position_type != defaults.position_type {
        push_property(&mut out, "position", style.position_type.as_str());
    }
    if style.flex_wrap != defaults.flex_wrap {
        push_property(&mut out, "flex-wrap", style.flex_wrap.as_str());
    }
    if style.overflow != defaults.overflow {
        push_property(&mut out, "overflow", style.overflow.as_str());
    }
    if style.display != defaults.display {
        push_property(&mut out, "display", style.display.as_str());
    }
    if let Some(grow) = style.flex_grow {
        push_property(&mut out, "flex-grow", grow);
    }
    if let Some(shrink) = style.flex_shrink {
        push_property(&mut out, "flex-shrink", shrink);
    }
    push_dimension(&mut out, "flex-basis", style.flex_basis, defaults.flex_basis);
    push_edges(&mut out, "margin", &style.margin, &defaults.margin);
    push_edges(&mut out, "padding", &style.padding, &defaults.padding);
    push_edges(&mut out, "border", &style.border, &defaults.border);
    for (gutter, name) in [
        (Gutter::Column, "column-gap"),
        (Gutter::Row, "row-gap"),
        (Gutter::All, "gap"),
    ] {
        let value = style.gap.get(gutter.index()).copied().unwrap_or_default();
        let default = defaults.gap.get(gutter.index()).copied().unwrap_or_default();
        push_dimension(&mut out, name, value, default);
    }
    for (dim, name) in [(Dimension::Width, "width"), (Dimension::Height, "height")] {
        push_dimension(&mut out, name, style.dimension(dim), defaults.dimension(dim));
        push_dimension(
            &mut out,
            &format!("min-{name}"),
            style.min_dimension(dim),
            defaults.min_dimension(dim),
        );
        push_dimension(
            &mut out,
            &format!("max-{name}"),
            style.max_dimension(dim),
            defaults.max_dimension(dim),
        );
    }
    if let Some(ratio) = style.aspect_ratio {
        push_property(&mut out, "aspect-ratio", ratio);
    }
    push_edges(&mut out, "", &style.position, &defaults.position);
    out.trim_end().to_owned()
}

/// Render `node` and, if requested, its descendants as nested `<div>` elements.
pub fn node_to_string(tree: &LayoutTree, node: NodeId, options: PrintOptions) -> String {
    let mut out = String::new();
    let defaults = Style::for_config(tree.default_config());
    write_node(tree, node, options, &defaults, 0, &mut out);
    out
}

fn write_node(
    tree: &LayoutTree,
    node: NodeId,
    options: PrintOptions,
    defaults: &Style,
    depth: usize,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push_str("<div");
    if options.layout {
        let layout = tree.layout(node);
        out.push_str(&format!(
            " layout=\"width: {}; height: {}; top: {}; left: {};\"",
            layout.width(),
            layout.height(),
            layout.top(),
            layout.left()
        ));
    }
    if options.style {
        let style = style_attribute(tree.style(node), defaults);
        if !style.is_empty() {
            out.push_str(&format!(" style=\"{style}\""));
        }
    }
    if tree.has_measure_func(node) {
        out.push_str(" has-custom-measure=\"true\"");
    }
    out.push('>');

    let children = tree.children(node);
    if options.children && !children.is_empty() {
        out.push('\n');
        for &child in children {
            write_node(tree, child, options, defaults, depth + 1, out);
        }
        out.push_str(&indent);
    }
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::FlexDirection;

    #[test]
    /// Only properties that differ from the defaults are printed.
    ///
    /// # Panics
    /// Panics if a default property leaks into the dump or a set one is missing.
    fn prints_non_default_style() {
        let defaults = Style::default();
        let mut style = Style::default();
        style.flex_direction = FlexDirection::Row;
        style.flex_grow = Some(1.0);
        style.dimensions[Dimension::Width.index()] = Value::percent(50.0);
        let printed = style_attribute(&style, &defaults);
        assert_eq!(printed, "flex-direction: row; flex-grow: 1; width: 50%;");
        assert!(style_attribute(&defaults, &defaults).is_empty());
    }

    #[test]
    /// Children nest inside their owner, indented one level deeper.
    ///
    /// # Panics
    /// Panics if the tree dump is malformed.
    fn nests_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        tree.add_child(root, child);
        tree.set_width(child, Value::points(10.0));
        let printed = node_to_string(
            &tree,
            root,
            PrintOptions {
                style: true,
                children: true,
                ..PrintOptions::default()
            },
        );
        assert_eq!(printed, "<div>\n  <div style=\"width: 10;\"></div>\n</div>\n");
    }
}
