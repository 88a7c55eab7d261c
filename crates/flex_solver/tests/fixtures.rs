#![cfg(test)]

use flex_solver::fixture::{check_layout, load_str};
use flex_solver::{Direction, LayoutTree};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a fixture, lay it out from its own size and compare every recorded box.
fn run_fixture(text: &str) -> anyhow::Result<()> {
    init_logging();
    let mut tree = LayoutTree::new();
    let (root, fixture) = load_str(&mut tree, text)?;
    tree.calculate_layout(root, None, None, Direction::Ltr);
    check_layout(&tree, root, &fixture)
}

#[test]
/// Grow factors split a padded row in proportion.
///
/// # Errors
/// Returns an error if a box differs from the fixture.
fn row_grow() -> anyhow::Result<()> {
    run_fixture(include_str!("fixtures/row_grow.json"))
}

#[test]
/// A column stacks a centred measured leaf row above a margined block.
///
/// # Errors
/// Returns an error if a box differs from the fixture.
fn nested_column() -> anyhow::Result<()> {
    run_fixture(include_str!("fixtures/nested_column.json"))
}

#[test]
/// A mismatching expectation is reported rather than accepted.
///
/// # Panics
/// Panics if a wrong expectation passes.
fn mismatch_is_reported() {
    let result = run_fixture(
        r#"{"style": {"width": 10, "height": 10}, "layout": {"width": 11, "height": 10}}"#,
    );
    assert!(matches!(result, Err(_)));
}
