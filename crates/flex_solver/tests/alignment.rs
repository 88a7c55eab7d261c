#![cfg(test)]

use flex_solver::{
    Align, BaselineFunc, Direction, Edge, FlexDirection, Justify, LayoutTree, NodeId, PositionType,
    Value, Wrap,
};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 0.01
}

#[test]
/// Absolute children are pinned by their insets against the container's edges.
///
/// # Panics
/// Panics if an absolute child is sized or placed incorrectly.
fn absolute_children_follow_insets() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_width(root, Value::points(200.0));
    tree.set_height(root, Value::points(200.0));

    let corner = tree.new_node();
    tree.set_position_type(corner, PositionType::Absolute);
    tree.set_position(corner, Edge::Right, Value::points(10.0));
    tree.set_position(corner, Edge::Bottom, Value::points(20.0));
    tree.set_width(corner, Value::points(50.0));
    tree.set_height(corner, Value::points(40.0));
    tree.add_child(root, corner);

    let band = tree.new_node();
    tree.set_position_type(band, PositionType::Absolute);
    tree.set_position(band, Edge::Left, Value::points(5.0));
    tree.set_position(band, Edge::Right, Value::points(5.0));
    tree.set_height(band, Value::points(10.0));
    tree.add_child(root, band);

    tree.calculate_layout(root, None, None, Direction::Ltr);

    let corner_layout = tree.layout(corner);
    assert!(close(corner_layout.left(), 140.0), "left {}", corner_layout.left());
    assert!(close(corner_layout.top(), 140.0), "top {}", corner_layout.top());
    let band_layout = tree.layout(band);
    assert!(close(band_layout.width(), 190.0));
    assert!(close(band_layout.left(), 5.0));
    assert!(close(band_layout.top(), 0.0));
}

#[test]
/// Absolute children do not take part in the flow of their siblings.
///
/// # Panics
/// Panics if an absolute child moves an in-flow sibling.
fn absolute_children_leave_flow() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_width(root, Value::points(100.0));
    tree.set_height(root, Value::points(100.0));
    let overlay = tree.new_node();
    tree.set_position_type(overlay, PositionType::Absolute);
    tree.set_height(overlay, Value::points(30.0));
    tree.add_child(root, overlay);
    let content = tree.new_node();
    tree.set_height(content, Value::points(10.0));
    tree.add_child(root, content);

    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(content).top(), 0.0));
    assert!(close(tree.layout(content).width(), 100.0));
}

#[test]
/// `align-content: center` centres the block of lines in the cross axis.
///
/// # Panics
/// Panics if the lines are not centred.
fn align_content_centres_lines() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row);
    tree.set_flex_wrap(root, Wrap::Wrap);
    tree.set_align_content(root, Align::Center);
    tree.set_width(root, Value::points(100.0));
    tree.set_height(root, Value::points(100.0));
    let items: Vec<_> = (0..2)
        .map(|_| {
            let item = tree.new_node();
            tree.set_width(item, Value::points(60.0));
            tree.set_height(item, Value::points(20.0));
            tree.add_child(root, item);
            item
        })
        .collect();

    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(items[0]).top(), 30.0));
    assert!(close(tree.layout(items[1]).top(), 50.0));
}

#[test]
/// Baseline alignment lines up the items' baselines with the tallest ascent.
///
/// # Panics
/// Panics if baselines do not line up.
fn baseline_alignment_uses_baseline_callback() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row);
    tree.set_align_items(root, Align::Baseline);
    tree.set_width(root, Value::points(200.0));
    tree.set_height(root, Value::points(100.0));

    let tall = tree.new_node();
    tree.set_width(tall, Value::points(50.0));
    tree.set_height(tall, Value::points(40.0));
    tree.add_child(root, tall);

    let short = tree.new_node();
    tree.set_width(short, Value::points(50.0));
    tree.set_height(short, Value::points(20.0));
    let baseline: BaselineFunc = Arc::new(|_, _, _| 10.0);
    tree.set_baseline_func(short, Some(baseline));
    tree.add_child(root, short);

    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(tall).top(), 0.0));
    assert!(close(tree.layout(short).top(), 30.0));
}

#[test]
/// Auto margins absorb free space before justification.
///
/// # Panics
/// Panics if the auto margin does not push the item to the far edge.
fn auto_margin_pushes_item() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row);
    tree.set_width(root, Value::points(200.0));
    tree.set_height(root, Value::points(50.0));
    let item = tree.new_node();
    tree.set_width(item, Value::points(50.0));
    tree.set_margin(item, Edge::Left, Value::AUTO);
    tree.add_child(root, item);

    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(item).left(), 150.0));
}

#[test]
/// Padding and border offset children and are reported on the container.
///
/// # Panics
/// Panics if the box edges are missing from the layout.
fn padding_and_border_inset_children() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_width(root, Value::points(100.0));
    tree.set_height(root, Value::points(100.0));
    tree.set_padding(root, Edge::All, Value::points(5.0));
    tree.set_border(root, Edge::Left, 3.0);
    let child = tree.new_node();
    tree.set_height(child, Value::points(10.0));
    tree.add_child(root, child);

    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(root).padding(Edge::Top), 5.0));
    assert!(close(tree.layout(root).border(Edge::Left), 3.0));
    assert!(close(tree.layout(child).left(), 8.0));
    assert!(close(tree.layout(child).top(), 5.0));
    assert!(close(tree.layout(child).width(), 87.0));
}

/// A 300x100 row justified with `justify`, holding `siblings` 50-wide items and a 20x20 absolute
/// child without insets.
fn row_with_absolute(tree: &mut LayoutTree, justify: Justify, siblings: usize) -> (NodeId, NodeId) {
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row);
    tree.set_justify_content(root, justify);
    tree.set_width(root, Value::points(300.0));
    tree.set_height(root, Value::points(100.0));
    for _ in 0..siblings {
        let item = tree.new_node();
        tree.set_width(item, Value::points(50.0));
        tree.add_child(root, item);
    }
    let overlay = tree.new_node();
    tree.set_position_type(overlay, PositionType::Absolute);
    tree.set_width(overlay, Value::points(20.0));
    tree.set_height(overlay, Value::points(20.0));
    tree.add_child(root, overlay);
    (root, overlay)
}

#[test]
/// An absolute child without insets is justified as the only item of its container, whatever
/// its in-flow siblings are.
///
/// # Panics
/// Panics if the absolute child's offset depends on its siblings or ignores the justify mode.
fn absolute_child_justified_as_sole_item() {
    init_logging();
    for (justify, expected) in [
        (Justify::SpaceAround, 140.0),
        (Justify::SpaceEvenly, 140.0),
        (Justify::Center, 140.0),
        (Justify::FlexEnd, 280.0),
        (Justify::SpaceBetween, 0.0),
        (Justify::FlexStart, 0.0),
    ] {
        for siblings in [0, 2] {
            let mut tree = LayoutTree::new();
            let (root, overlay) = row_with_absolute(&mut tree, justify, siblings);
            tree.calculate_layout(root, None, None, Direction::Ltr);
            let left = tree.layout(overlay).left();
            assert!(close(left, expected), "{justify:?} with {siblings} siblings: left {left}");
            assert!(close(tree.layout(overlay).top(), 0.0));
        }
    }
}

#[test]
/// The container's leading border offsets a centred absolute child.
///
/// # Panics
/// Panics if the border is left out of the absolute child's offset.
fn absolute_child_centres_inside_border() {
    init_logging();
    let mut tree = LayoutTree::new();
    let (root, overlay) = row_with_absolute(&mut tree, Justify::SpaceAround, 2);
    tree.set_border(root, Edge::Left, 10.0);
    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(overlay).left(), 145.0));
}

#[test]
/// The aspect ratio derives the missing side in the basis pass, under stretch, and for
/// absolute children.
///
/// # Panics
/// Panics if a derived side does not follow the ratio.
fn aspect_ratio_couples_sides() {
    init_logging();
    let mut tree = LayoutTree::new();
    let column = tree.new_node();
    tree.set_width(column, Value::points(200.0));
    tree.set_height(column, Value::points(300.0));
    let banner = tree.new_node();
    tree.set_aspect_ratio(banner, Some(2.0));
    tree.add_child(column, banner);
    let badge = tree.new_node();
    tree.set_position_type(badge, PositionType::Absolute);
    tree.set_width(badge, Value::points(80.0));
    tree.set_aspect_ratio(badge, Some(2.0));
    tree.add_child(column, badge);
    tree.calculate_layout(column, None, None, Direction::Ltr);
    assert!(close(tree.layout(banner).width(), 200.0));
    assert!(close(tree.layout(banner).height(), 100.0));
    assert!(close(tree.layout(badge).height(), 40.0));

    let row = tree.new_node();
    tree.set_flex_direction(row, FlexDirection::Row);
    tree.set_width(row, Value::points(300.0));
    tree.set_height(row, Value::points(100.0));
    let tile = tree.new_node();
    tree.set_width(tile, Value::points(50.0));
    tree.set_aspect_ratio(tile, Some(2.0));
    tree.add_child(row, tile);
    tree.calculate_layout(row, None, None, Direction::Ltr);
    assert!(close(tree.layout(tile).height(), 25.0), "height {}", tree.layout(tile).height());
}

#[test]
/// `align-content: stretch` grows every line and relays stretched items to the new line size.
///
/// # Panics
/// Panics if the second line's item keeps its collapsed height.
fn stretched_lines_restretch_items() {
    init_logging();
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row);
    tree.set_flex_wrap(root, Wrap::Wrap);
    tree.set_align_content(root, Align::Stretch);
    tree.set_width(root, Value::points(100.0));
    tree.set_height(root, Value::points(100.0));
    let fixed = tree.new_node();
    tree.set_width(fixed, Value::points(60.0));
    tree.set_height(fixed, Value::points(20.0));
    tree.add_child(root, fixed);
    let stretchy = tree.new_node();
    tree.set_width(stretchy, Value::points(60.0));
    tree.add_child(root, stretchy);

    tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(close(tree.layout(fixed).top(), 0.0));
    assert!(close(tree.layout(fixed).height(), 20.0));
    assert!(close(tree.layout(stretchy).top(), 60.0), "top {}", tree.layout(stretchy).top());
    assert!(close(tree.layout(stretchy).height(), 40.0));
}
