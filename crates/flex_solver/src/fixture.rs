//! JSON descriptions of styled trees, used to drive scenario tests and benchmarks.
//!
//! A fixture node looks like
//! `{"style": {"flexDirection": "row", "width": 300}, "children": [...]}`. Style keys are the
//! camelCase CSS property names; lengths are numbers or strings such as `"50%"` or `"auto"`.
//! A `measure` entry turns the node into a leaf of fixed content size, and a `layout` entry
//! records the expected snapped result for [`check_layout`].

use crate::enums::{Edge, Gutter};
use crate::tree::{LayoutTree, MeasureFunc, NodeId, Size};
use crate::value::Value;
use anyhow::{Context as _, bail, ensure};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Content size reported by a fixture leaf, whatever the constraints.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct FixtureMeasure {
    pub width: f64,
    pub height: f64,
}

/// Expected snapped layout of a fixture node.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct FixtureLayout {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

/// One node of a fixture tree.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureNode {
    pub style: BTreeMap<String, Json>,
    pub measure: Option<FixtureMeasure>,
    pub layout: Option<FixtureLayout>,
    pub children: Vec<Self>,
}

fn keyword<T: DeserializeOwned>(name: &str, raw: &Json) -> anyhow::Result<T> {
    serde_json::from_value(raw.clone()).with_context(|| format!("invalid keyword {raw} for `{name}`"))
}

fn length(name: &str, raw: &Json) -> anyhow::Result<Value> {
    serde_json::from_value(raw.clone()).with_context(|| format!("invalid length {raw} for `{name}`"))
}

fn number(name: &str, raw: &Json) -> anyhow::Result<f64> {
    raw.as_f64()
        .with_context(|| format!("`{name}` expects a number, got {raw}"))
}

/// Edge named by the suffix of a property such as `marginLeft`; the bare name means all edges.
fn edge_suffix(suffix: &str) -> Option<Edge> {
    Some(match suffix {
        "" => Edge::All,
        "Left" => Edge::Left,
        "Top" => Edge::Top,
        "Right" => Edge::Right,
        "Bottom" => Edge::Bottom,
        "Start" => Edge::Start,
        "End" => Edge::End,
        "Horizontal" => Edge::Horizontal,
        "Vertical" => Edge::Vertical,
        _ => return None,
    })
}

/// Apply one style property to `id`.
///
/// # Errors
/// Returns an error for an unknown property name or a value of the wrong shape.
pub fn apply_property(tree: &mut LayoutTree, id: NodeId, name: &str, raw: &Json) -> anyhow::Result<()> {
    match name {
        "direction" => tree.set_direction(id, keyword(name, raw)?),
        "flexDirection" => tree.set_flex_direction(id, keyword(name, raw)?),
        "justifyContent" => tree.set_justify_content(id, keyword(name, raw)?),
        "alignContent" => tree.set_align_content(id, keyword(name, raw)?),
        "alignItems" => tree.set_align_items(id, keyword(name, raw)?),
        "alignSelf" => tree.set_align_self(id, keyword(name, raw)?),
        "position" | "positionType" => tree.set_position_type(id, keyword(name, raw)?),
        "flexWrap" => tree.set_flex_wrap(id, keyword(name, raw)?),
        "overflow" => tree.set_overflow(id, keyword(name, raw)?),
        "display" => tree.set_display(id, keyword(name, raw)?),
        "flexGrow" => tree.set_flex_grow(id, number(name, raw)?),
        "flexShrink" => tree.set_flex_shrink(id, number(name, raw)?),
        "flexBasis" => tree.set_flex_basis(id, length(name, raw)?),
        "width" => tree.set_width(id, length(name, raw)?),
        "height" => tree.set_height(id, length(name, raw)?),
        "minWidth" => tree.set_min_width(id, length(name, raw)?),
        "minHeight" => tree.set_min_height(id, length(name, raw)?),
        "maxWidth" => tree.set_max_width(id, length(name, raw)?),
        "maxHeight" => tree.set_max_height(id, length(name, raw)?),
        "aspectRatio" => tree.set_aspect_ratio(id, Some(number(name, raw)?)),
        "gap" => tree.set_gap(id, Gutter::All, number(name, raw)?),
        "rowGap" => tree.set_gap(id, Gutter::Row, number(name, raw)?),
        "columnGap" => tree.set_gap(id, Gutter::Column, number(name, raw)?),
        "left" | "top" | "right" | "bottom" | "start" | "end" => {
            let mut capitalised = name.to_owned();
            if let Some(first) = capitalised.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            let edge = edge_suffix(&capitalised).with_context(|| format!("unknown edge `{name}`"))?;
            tree.set_position(id, edge, length(name, raw)?);
        }
        _ => return apply_edge_property(tree, id, name, raw),
    }
    Ok(())
}

fn apply_edge_property(tree: &mut LayoutTree, id: NodeId, name: &str, raw: &Json) -> anyhow::Result<()> {
    let edge_of = |prefix: &str| name.strip_prefix(prefix).and_then(edge_suffix);
    if let Some(edge) = edge_of("margin") {
        tree.set_margin(id, edge, length(name, raw)?);
    } else if let Some(edge) = edge_of("padding") {
        tree.set_padding(id, edge, length(name, raw)?);
    } else if let Some(edge) = edge_of("border") {
        tree.set_border(id, edge, number(name, raw)?);
    } else {
        bail!("unknown style property `{name}`");
    }
    Ok(())
}

/// Instantiate `fixture` under `tree` and return its root.
///
/// # Errors
/// Returns an error for unknown properties or keywords, or a measured node with children.
pub fn build_tree(tree: &mut LayoutTree, fixture: &FixtureNode) -> anyhow::Result<NodeId> {
    let id = tree.new_node();
    for (name, raw) in &fixture.style {
        apply_property(tree, id, name, raw)?;
    }
    if let Some(measure) = fixture.measure {
        ensure!(
            fixture.children.is_empty(),
            "a measured fixture node cannot have children"
        );
        let content: MeasureFunc = Arc::new(move |_, _, _, _, _| Size {
            width: measure.width,
            height: measure.height,
        });
        tree.set_measure_func(id, Some(content));
    }
    for child in &fixture.children {
        let child_id = build_tree(tree, child)?;
        tree.add_child(id, child_id);
    }
    Ok(id)
}

/// Parse a JSON fixture and instantiate it.
///
/// # Errors
/// Returns an error if the JSON is malformed or the fixture is invalid.
pub fn load_str(tree: &mut LayoutTree, text: &str) -> anyhow::Result<(NodeId, FixtureNode)> {
    let fixture: FixtureNode = serde_json::from_str(text).context("failed to parse layout fixture")?;
    let root = build_tree(tree, &fixture)?;
    Ok((root, fixture))
}

/// Compare the snapped layout of `id` and its children against the fixture's expectations.
///
/// Nodes without a `layout` entry are not checked, but their children are.
///
/// # Errors
/// Returns an error naming the first node whose layout differs by more than a hundredth.
pub fn check_layout(tree: &LayoutTree, id: NodeId, fixture: &FixtureNode) -> anyhow::Result<()> {
    if let Some(expected) = fixture.layout {
        let layout = tree.layout(id);
        let actual = [layout.width(), layout.height(), layout.left(), layout.top()];
        let wanted = [expected.width, expected.height, expected.left, expected.top];
        let matches = actual
            .iter()
            .zip(wanted.iter())
            .all(|(got, want)| (got - want).abs() < 0.01);
        ensure!(
            matches,
            "{id:?}: expected width/height/left/top {wanted:?}, got {actual:?}"
        );
    }
    ensure!(
        tree.child_count(id) == fixture.children.len(),
        "{id:?}: expected {} children, got {}",
        fixture.children.len(),
        tree.child_count(id)
    );
    for (&child, child_fixture) in tree.children(id).iter().zip(&fixture.children) {
        check_layout(tree, child, child_fixture)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::FlexDirection;

    #[test]
    /// Style keys map onto the setters, including edge shorthands.
    ///
    /// # Errors
    /// Returns an error if a valid fixture is rejected.
    fn builds_styled_tree() -> anyhow::Result<()> {
        let mut tree = LayoutTree::new();
        let (root, _) = load_str(
            &mut tree,
            r#"{"style": {"flexDirection": "row", "width": "50%", "marginHorizontal": 4, "borderTop": 2},
                "children": [{"measure": {"width": 10, "height": 5}}]}"#,
        )?;
        let style = tree.style(root);
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.dimensions[0], Value::percent(50.0));
        assert_eq!(style.margin.get(Edge::Horizontal), Value::points(4.0));
        assert_eq!(style.border.get(Edge::Top), Value::points(2.0));
        let leaf = tree.child(root, 0).context("leaf missing")?;
        assert!(tree.has_measure_func(leaf));
        Ok(())
    }

    #[test]
    /// Unknown names and keywords are reported instead of ignored.
    ///
    /// # Panics
    /// Panics if an invalid fixture is accepted.
    fn rejects_unknown_input() {
        let mut tree = LayoutTree::new();
        assert!(matches!(load_str(&mut tree, r#"{"style": {"float": "left"}}"#), Err(_)));
        assert!(matches!(
            load_str(&mut tree, r#"{"style": {"flexDirection": "diagonal"}}"#),
            Err(_)
        ));
        assert!(matches!(load_str(&mut tree, r#"{"style": {"marginMiddle": 3}}"#), Err(_)));
        assert!(matches!(load_str(&mut tree, r#"{"colour": "red"}"#), Err(_)));
    }
}
