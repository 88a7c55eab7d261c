#![cfg(test)]

use flex_solver::print::{PrintOptions, node_to_string};
use flex_solver::{Align, Config, Direction, FlexDirection, LayoutTree, MeasureFunc, NodeId, Size, Value};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 0.01
}

#[test]
/// Inserting, removing and reordering children keeps owner links consistent.
///
/// # Panics
/// Panics if the child list or owner links are wrong after an edit.
fn child_list_edits() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    let first = tree.new_node();
    let second = tree.new_node();
    let third = tree.new_node();
    tree.add_child(root, first);
    tree.add_child(root, third);
    tree.insert_child(root, second, 1);
    assert_eq!(tree.children(root), &[first, second, third]);
    assert_eq!(tree.owner(second), Some(root));

    tree.remove_child(root, second);
    assert_eq!(tree.children(root), &[first, third]);
    assert_eq!(tree.owner(second), None);

    tree.remove_all_children(root);
    assert_eq!(tree.child_count(root), 0);
    assert_eq!(tree.owner(first), None);
    assert_eq!(tree.child(root, 0), None);
}

#[test]
/// Freed slots are reused and a recursively freed subtree disappears.
///
/// # Panics
/// Panics if freed nodes survive.
fn free_recursive_releases_subtree() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    let branch = tree.new_node();
    let leaf = tree.new_node();
    tree.add_child(root, branch);
    tree.add_child(branch, leaf);
    assert_eq!(tree.len(), 3);

    tree.free_recursive(branch);
    assert_eq!(tree.len(), 1);
    assert!(!tree.contains(branch));
    assert!(!tree.contains(leaf));
    assert_eq!(tree.child_count(root), 0);
}

#[test]
/// A shallow clone shares children until it is laid out, then owns private copies.
///
/// # Panics
/// Panics if laying out the clone disturbs the original tree.
fn cloned_tree_copies_on_write() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_width(root, Value::points(100.0));
    tree.set_height(root, Value::points(100.0));
    let child = tree.new_node();
    tree.add_child(root, child);
    tree.calculate_layout(root, None, None, Direction::Ltr);

    let copy = tree.clone_node(root);
    assert_eq!(tree.children(copy), &[child]);
    tree.set_width(copy, Value::points(200.0));
    tree.calculate_layout(copy, None, None, Direction::Ltr);
    tree.calculate_layout(root, None, None, Direction::Ltr);

    let copied_child = tree.children(copy)[0];
    assert_ne!(copied_child, child);
    assert_eq!(tree.owner(child), Some(root));
    assert_eq!(tree.owner(copied_child), Some(copy));
    assert!(close(tree.layout(child).width(), 100.0));
    assert!(close(tree.layout(copied_child).width(), 200.0));
}

#[test]
/// Resetting a node restores default style and layout.
///
/// # Panics
/// Panics if state survives the reset.
fn reset_restores_defaults() {
    init_logging();
    let mut tree = LayoutTree::new();
    let node = tree.new_node();
    tree.set_width(node, Value::points(10.0));
    tree.calculate_layout(node, None, None, Direction::Ltr);
    tree.reset(node);
    assert!(tree.style(node).dimensions[0].is_undefined());
    assert!(close(tree.layout(node).width(), 0.0));
}

#[test]
/// The scale factor of a node's config sets the pixel grid.
///
/// # Panics
/// Panics if results are not snapped to half points at scale two.
fn scale_factor_sets_grid() {
    init_logging();
    let mut config = Config::default();
    config.set_point_scale_factor(2.0);
    let mut tree = LayoutTree::with_config(config);
    let root = tree.new_node();
    tree.set_width(root, Value::points(10.3));
    tree.set_height(root, Value::points(10.0));
    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(root).width(), 10.5));

    let exact = Config::from_json(r#"{"pointScaleFactor": 0}"#);
    assert!(matches!(exact, Ok(ref parsed) if parsed.point_scale_factor.abs() < f64::EPSILON));
    assert!(matches!(Config::from_json(r#"{"pointScaleFactor": -1}"#), Err(_)));
}

#[test]
/// The tree dump shows layout, style and measured leaves.
///
/// # Panics
/// Panics if the dump is missing a laid out node.
fn dump_after_layout() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_width(root, Value::points(30.0));
    tree.set_height(root, Value::points(20.0));
    let leaf = tree.new_node();
    let measure: MeasureFunc = Arc::new(|_, _, _, _, _| Size {
        width: 5.0,
        height: 5.0,
    });
    tree.set_measure_func(leaf, Some(measure));
    tree.add_child(root, leaf);
    tree.calculate_layout(root, None, None, Direction::Ltr);

    let dump = node_to_string(&tree, root, PrintOptions::all());
    assert!(dump.starts_with("<div layout=\"width: 30; height: 20; top: 0; left: 0;\" style=\"width: 30; height: 20;\">"));
    assert!(dump.contains("has-custom-measure=\"true\""));
    assert!(dump.ends_with("</div>\n"));
}

/// A column holding an unstretched row whose only item can grow; returns the root and the row.
fn content_sized_row(tree: &mut LayoutTree) -> (NodeId, NodeId) {
    let root = tree.new_node();
    tree.set_width(root, Value::points(200.0));
    tree.set_height(root, Value::points(200.0));
    tree.set_align_items(root, Align::FlexStart);
    let row = tree.new_node();
    tree.set_flex_direction(row, FlexDirection::Row);
    tree.add_child(root, row);
    let item = tree.new_node();
    tree.set_flex_grow(item, 1.0);
    tree.set_width(item, Value::points(50.0));
    tree.set_height(item, Value::points(10.0));
    tree.add_child(row, item);
    (root, row)
}

#[test]
/// The legacy stretch diff records that the flag changed the layout and frees its scratch copy.
///
/// # Panics
/// Panics if the flag is not recorded, the legacy result is replaced, or the copy leaks.
fn legacy_stretch_diff_is_recorded() {
    init_logging();
    let config = Config {
        use_legacy_stretch_behaviour: true,
        diff_legacy_stretch_behaviour: true,
        ..Config::default()
    };
    let mut tree = LayoutTree::with_config(config);
    let (root, row) = content_sized_row(&mut tree);
    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(tree.layout(root).did_legacy_stretch_flag_affect_layout);
    assert!(close(tree.layout(row).width(), 200.0), "width {}", tree.layout(row).width());
    assert_eq!(tree.len(), 3);

    let mut modern = LayoutTree::new();
    let (root, row) = content_sized_row(&mut modern);
    modern.calculate_layout(root, None, None, Direction::Ltr);
    assert!(!modern.layout(root).did_legacy_stretch_flag_affect_layout);
    assert!(close(modern.layout(row).width(), 50.0));
}
