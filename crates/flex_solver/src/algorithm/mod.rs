//! The flexbox solver.
//!
//! A pass runs in this order for every container it visits:
//! flex basis, line collection, free-space resolution, main-axis justification,
//! cross-axis alignment, `align-content`, final sizing, then absolutely positioned children.
//! [`LayoutTree::calculate_layout`] drives one pass from a root and finishes with pixel rounding.

mod absolute;
mod basis;
mod box_model;
mod cache;
mod cross;
mod flex;
mod justify;
mod leaf;
mod lines;
mod resolve;
pub mod round;

use crate::config::Config;
use crate::enums::{Align, Direction, FlexDirection, MeasureMode, PositionType};
use crate::layout::LayoutResults;
use crate::print::{PrintOptions, node_to_string};
use crate::style::Style;
use crate::tree::{LayoutTree, NodeId};
use box_model::BoxModel;
use log::{debug, log_enabled, trace, Level};
use std::sync::Arc;
use tracing::info_span;

/// Counters for the most recent [`LayoutTree::calculate_layout`] call.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LayoutStats {
    /// Full layouts computed (positions committed).
    pub layouts: usize,
    /// Measure-only layouts computed.
    pub measures: usize,
    /// Visits answered from a node's cache.
    pub cache_hits: usize,
    /// Invocations of measure callbacks.
    pub measure_callbacks: usize,
}

/// Why a node is being visited; only used for tracing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum LayoutReason {
    Initial,
    AbsoluteLayout,
    AbsoluteMeasure,
    Stretch,
    MultilineStretch,
    FlexLayout,
    FlexMeasure,
    Measure,
}

/// Constraints for one recursive visit of a node.
///
/// Available sizes include the node's margins. A size is `None` exactly when its mode is
/// [`MeasureMode::Undefined`].
#[derive(Copy, Clone, Debug)]
pub(crate) struct LayoutRequest {
    pub available_width: Option<f64>,
    pub available_height: Option<f64>,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub owner_direction: Direction,
    pub owner_width: Option<f64>,
    pub owner_height: Option<f64>,
    pub perform_layout: bool,
    pub reason: LayoutReason,
}

/// Pair a size with its mode so that an undefined mode never carries a size.
#[inline]
pub(crate) fn constraint(size: Option<f64>, mode: MeasureMode) -> (Option<f64>, MeasureMode) {
    match (size, mode) {
        (_, MeasureMode::Undefined) | (None, _) => (None, MeasureMode::Undefined),
        (Some(value), _) => (Some(value), mode),
    }
}

/// The node's own direction, or the owner's when it inherits. The root inherits left-to-right.
#[inline]
pub(crate) const fn resolve_direction(own: Direction, owner: Direction) -> Direction {
    match (own, owner) {
        (Direction::Inherit, Direction::Inherit) => Direction::Ltr,
        (Direction::Inherit, inherited) => inherited,
        (explicit, _) => explicit,
    }
}

/// Effective cross alignment of `child` inside `container`.
///
/// Baseline alignment only exists for row containers; columns treat it as `flex-start`.
#[inline]
pub(crate) fn align_item(container: &Style, child: &Style) -> Align {
    let align = if child.align_self == Align::Auto {
        container.align_items
    } else {
        child.align_self
    };
    if align == Align::Baseline && container.flex_direction.is_column() {
        Align::FlexStart
    } else {
        align
    }
}

/// State shared by every recursive visit of one layout pass.
pub(crate) struct LayoutContext<'tree> {
    pub tree: &'tree mut LayoutTree,
    pub generation: u64,
}

impl LayoutContext<'_> {
    #[inline]
    pub fn style(&self, id: NodeId) -> Style {
        self.tree.node(id).style
    }

    #[inline]
    pub fn layout(&self, id: NodeId) -> &LayoutResults {
        &self.tree.node(id).layout
    }

    #[inline]
    pub fn layout_mut(&mut self, id: NodeId) -> &mut LayoutResults {
        &mut self.tree.node_mut(id).layout
    }

    pub fn config(&self, id: NodeId) -> &Config {
        &self.tree.node(id).config
    }

    /// Grow factor; the root never flexes.
    pub fn flex_grow(&self, id: NodeId) -> f64 {
        let node = self.tree.node(id);
        if node.owner.is_none() {
            return 0.0;
        }
        node.style.flex_grow.unwrap_or(0.0)
    }

    /// Shrink factor; web defaults shrink unstyled items.
    pub fn flex_shrink(&self, id: NodeId) -> f64 {
        let node = self.tree.node(id);
        if node.owner.is_none() {
            return 0.0;
        }
        let default = if node.config.use_web_defaults { 1.0 } else { 0.0 };
        node.style.flex_shrink.unwrap_or(default)
    }

    pub fn is_flexible(&self, id: NodeId) -> bool {
        self.tree.node(id).style.position_type != PositionType::Absolute
            && (self.flex_grow(id) != 0.0 || self.flex_shrink(id) != 0.0)
    }

    /// Size committed or measured along `axis`, if any, counting only non-negative values.
    pub fn is_layout_dim_defined(&self, id: NodeId, axis: FlexDirection) -> bool {
        self.layout(id)
            .measured(axis.dimension())
            .is_some_and(|size| size >= 0.0)
    }

    /// Measured size plus margins along `axis`.
    pub fn dim_with_margin(
        &self,
        id: NodeId,
        direction: Direction,
        axis: FlexDirection,
        width_size: Option<f64>,
    ) -> f64 {
        let style = self.style(id);
        let model = BoxModel::new(&style, resolve_direction(style.direction, direction));
        self.layout(id).measured_or_zero(axis.dimension()) + model.margin_for_axis(axis, width_size)
    }

    /// Seed the node's offsets with its margins and relative shift, in its owner's frame.
    pub fn set_initial_position(
        &mut self,
        id: NodeId,
        owner_direction: Direction,
        width: Option<f64>,
        height: Option<f64>,
        owner_width: Option<f64>,
    ) {
        let style = self.style(id);
        let model = BoxModel::new(&style, resolve_direction(style.direction, owner_direction));
        let layout = self.layout_mut(id);
        for (axis, size) in [
            (FlexDirection::Row.resolve(owner_direction), width),
            (FlexDirection::Column, height),
        ] {
            let relative = model.relative_position(axis, size);
            layout.set_position(axis.leading_edge(), model.leading_margin(axis, owner_width) + relative);
            layout.set_position(
                axis.trailing_edge(),
                model.trailing_margin(axis, owner_width) + relative,
            );
        }
    }

    /// Reset a hidden subtree to an empty, clean layout.
    pub fn zero_out_layout_recursively(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.tree.clone_children_if_needed(current);
            let node = self.tree.node_mut(current);
            node.layout = LayoutResults::default();
            node.has_new_layout = true;
            node.is_dirty = false;
            node.subtree_dirty = false;
            stack.extend(node.children.iter().copied());
        }
    }

    /// Lay out `root` against the owner size, as the entry point of a pass.
    fn layout_root(
        &mut self,
        root: NodeId,
        owner_width: Option<f64>,
        owner_height: Option<f64>,
        owner_direction: Direction,
    ) {
        let style = self.style(root);
        let direction = resolve_direction(style.direction, owner_direction);
        let model = BoxModel::new(&style, direction);
        let (available_width, width_mode) =
            root_constraint(&model, FlexDirection::Row, owner_width, owner_width);
        let (available_height, height_mode) =
            root_constraint(&model, FlexDirection::Column, owner_height, owner_width);
        debug!(
            target: "flex_solver::cache",
            "[LAYOUT] root {root:?} width={available_width:?} ({width_mode:?}) height={available_height:?} ({height_mode:?})"
        );
        self.layout_node(
            root,
            LayoutRequest {
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_direction,
                owner_width,
                owner_height,
                perform_layout: true,
                reason: LayoutReason::Initial,
            },
        );
        self.set_initial_position(root, direction, owner_width, owner_height, owner_width);
    }
}

/// Root constraint along one axis: its own size, else its max size, else the owner size.
fn root_constraint(
    model: &BoxModel<'_>,
    axis: FlexDirection,
    owner_size: Option<f64>,
    owner_width: Option<f64>,
) -> (Option<f64>, MeasureMode) {
    if model.is_style_dim_defined(axis, owner_size)
        && let Some(size) = model.resolved_style_dim(axis, owner_size)
    {
        return (
            Some(size + model.margin_for_axis(axis, owner_width)),
            MeasureMode::Exactly,
        );
    }
    if let Some(max) = model.max_dim(axis, owner_size).filter(|max| *max >= 0.0) {
        return (Some(max), MeasureMode::AtMost);
    }
    constraint(owner_size, MeasureMode::Exactly)
}

impl LayoutTree {
    /// Lay out the subtree rooted at `root` within the given owner size.
    ///
    /// Each call is one pass: the generation counter advances, dirty or unconstrained nodes are
    /// recomputed, the rest answer from their caches, and the snapped results are refreshed for
    /// the whole subtree.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        owner_width: Option<f64>,
        owner_height: Option<f64>,
        owner_direction: Direction,
    ) {
        let _span = info_span!("calculate_layout", root = root.index()).entered();
        self.stats = LayoutStats::default();
        self.run_pass(root, owner_width, owner_height, owner_direction);

        let config = Arc::clone(&self.node(root).config);
        if config.use_legacy_stretch_behaviour && config.diff_legacy_stretch_behaviour {
            self.diff_legacy_stretch(root, owner_width, owner_height, owner_direction);
        }
        if config.print_tree && log_enabled!(target: "flex_solver::tree", Level::Trace) {
            trace!(
                target: "flex_solver::tree",
                "{}",
                node_to_string(self, root, PrintOptions::all())
            );
        }
        debug!(
            target: "flex_solver::cache",
            "[LAYOUT] pass {} done: {:?}",
            self.generation,
            self.stats
        );
    }

    fn run_pass(
        &mut self,
        root: NodeId,
        owner_width: Option<f64>,
        owner_height: Option<f64>,
        owner_direction: Direction,
    ) {
        self.generation += 1;
        let generation = self.generation;
        let mut context = LayoutContext {
            tree: self,
            generation,
        };
        context.layout_root(root, owner_width, owner_height, owner_direction);
        self.round_layout(root);
    }

    /// Relay a copy of the subtree without the legacy stretch flag and record whether the
    /// flag changed any geometry.
    fn diff_legacy_stretch(
        &mut self,
        root: NodeId,
        owner_width: Option<f64>,
        owner_height: Option<f64>,
        owner_direction: Direction,
    ) {
        let used_flag = self
            .subtree(root)
            .into_iter()
            .any(|id| self.node(id).layout.did_use_legacy_flag);
        if !used_flag {
            return;
        }
        let saved_stats = self.stats;
        let modern = Arc::new(Config {
            use_legacy_stretch_behaviour: false,
            diff_legacy_stretch_behaviour: false,
            print_tree: false,
            ..self.node(root).config.as_ref().clone()
        });
        let copy = self.clone_subtree(root);
        for id in self.subtree(copy) {
            let node = self.node_mut(id);
            node.config = Arc::clone(&modern);
            node.is_dirty = true;
            node.subtree_dirty = true;
            node.layout.invalidate_cache();
            node.layout.computed_flex_basis = None;
            node.layout.did_use_legacy_flag = false;
        }
        self.run_pass(copy, owner_width, owner_height, owner_direction);

        let affected = self
            .subtree(root)
            .into_iter()
            .zip(self.subtree(copy))
            .any(|(original, modern_copy)| {
                !self
                    .node(original)
                    .layout
                    .same_geometry(&self.node(modern_copy).layout)
            });
        debug!(
            target: "flex_solver::cache",
            "[LAYOUT] legacy stretch affected layout of {root:?}: {affected}"
        );
        self.node_mut(root).layout.did_legacy_stretch_flag_affect_layout = affected;
        self.free_recursive(copy);
        self.stats = saved_stats;
    }

    /// Nodes of the subtree in pre-order.
    pub(crate) fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        order
    }

    /// Counters of the last pass.
    pub fn stats(&self) -> LayoutStats {
        self.stats
    }

    /// Snapped offset of `id` from the top-left corner of its root.
    pub fn absolute_position(&self, id: NodeId) -> (f64, f64) {
        let mut left = 0.0;
        let mut top = 0.0;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            left += node.layout.left();
            top += node.layout.top();
            cursor = node.owner;
        }
        (left, top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Inheritance falls back to the owner, and to left-to-right at the root.
    ///
    /// # Panics
    /// Panics if direction inheritance is wrong.
    fn direction_inherits() {
        assert_eq!(resolve_direction(Direction::Inherit, Direction::Inherit), Direction::Ltr);
        assert_eq!(resolve_direction(Direction::Inherit, Direction::Rtl), Direction::Rtl);
        assert_eq!(resolve_direction(Direction::Ltr, Direction::Rtl), Direction::Ltr);
    }

    #[test]
    /// Baseline alignment degrades to flex-start inside columns.
    ///
    /// # Panics
    /// Panics if a column container keeps baseline alignment.
    fn baseline_needs_rows() {
        let mut container = Style::default();
        let mut child = Style::default();
        child.align_self = Align::Baseline;
        assert_eq!(align_item(&container, &child), Align::FlexStart);
        container.flex_direction = FlexDirection::Row;
        assert_eq!(align_item(&container, &child), Align::Baseline);
        child.align_self = Align::Auto;
        assert_eq!(align_item(&container, &child), Align::Stretch);
    }

    #[test]
    /// A size with an undefined mode is dropped.
    ///
    /// # Panics
    /// Panics if normalisation keeps an unconstrained size.
    fn constraint_normalises() {
        assert_eq!(
            constraint(Some(5.0), MeasureMode::Undefined),
            (None, MeasureMode::Undefined)
        );
        assert_eq!(constraint(None, MeasureMode::AtMost), (None, MeasureMode::Undefined));
        assert_eq!(
            constraint(Some(5.0), MeasureMode::Exactly),
            (Some(5.0), MeasureMode::Exactly)
        );
    }
}
