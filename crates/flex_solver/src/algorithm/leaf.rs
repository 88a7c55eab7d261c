//! Sizing of nodes that need no flex pass: measured leaves, empty containers and fixed sizes.

use super::LayoutContext;
use super::box_model::BoxModel;
use crate::enums::{Dimension, FlexDirection, MeasureMode};
use crate::tree::NodeId;
use log::trace;
use std::sync::Arc;

/// Available size of a node with its own margins already removed.
#[derive(Copy, Clone, Debug)]
pub(super) struct LeafConstraints {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub owner_width: Option<f64>,
    pub owner_height: Option<f64>,
}

/// Negative or non-finite callback output counts as zero.
#[inline]
fn sanitize(size: f64) -> f64 {
    if size.is_finite() { size.max(0.0) } else { 0.0 }
}

impl LayoutContext<'_> {
    fn set_measured_size(&mut self, id: NodeId, width: f64, height: f64) {
        let layout = self.layout_mut(id);
        layout.set_measured(Dimension::Width, width);
        layout.set_measured(Dimension::Height, height);
    }

    /// Size a leaf through its measure callback, skipped when both axes are exact.
    pub(super) fn measure_leaf(&mut self, id: NodeId, model: &BoxModel<'_>, leaf: &LeafConstraints) {
        let pb_row = model.padding_and_border_for_axis(FlexDirection::Row, leaf.owner_width);
        let pb_column = model.padding_and_border_for_axis(FlexDirection::Column, leaf.owner_width);
        let exact_width = leaf.width.unwrap_or(0.0);
        let exact_height = leaf.height.unwrap_or(0.0);

        if leaf.width_mode == MeasureMode::Exactly && leaf.height_mode == MeasureMode::Exactly {
            let width = model.bound_axis(FlexDirection::Row, exact_width, leaf.owner_width, leaf.owner_width);
            let height = model.bound_axis(
                FlexDirection::Column,
                exact_height,
                leaf.owner_height,
                leaf.owner_width,
            );
            self.set_measured_size(id, width, height);
            return;
        }

        let Some(measure) = self.tree.node(id).measure.as_ref().map(Arc::clone) else {
            return;
        };
        let inner_width = leaf.width.map(|width| (width - pb_row).max(0.0));
        let inner_height = leaf.height.map(|height| (height - pb_column).max(0.0));
        self.tree.stats.measure_callbacks += 1;
        let measured = measure(id, inner_width, leaf.width_mode, inner_height, leaf.height_mode);
        trace!(
            target: "flex_solver::cache",
            "[MEASURE] {id:?} ({inner_width:?} {:?}, {inner_height:?} {:?}) -> {}x{}",
            leaf.width_mode,
            leaf.height_mode,
            measured.width,
            measured.height
        );

        let content_width = if leaf.width_mode == MeasureMode::Exactly {
            exact_width
        } else {
            sanitize(measured.width) + pb_row
        };
        let content_height = if leaf.height_mode == MeasureMode::Exactly {
            exact_height
        } else {
            sanitize(measured.height) + pb_column
        };
        let width = model.bound_axis(FlexDirection::Row, content_width, leaf.owner_width, leaf.owner_width);
        let height = model.bound_axis(
            FlexDirection::Column,
            content_height,
            leaf.owner_height,
            leaf.owner_width,
        );
        self.set_measured_size(id, width, height);
    }

    /// A childless container is as large as its padding and border unless sized exactly.
    pub(super) fn size_empty_container(
        &mut self,
        id: NodeId,
        model: &BoxModel<'_>,
        leaf: &LeafConstraints,
    ) {
        let width = match (leaf.width_mode, leaf.width) {
            (MeasureMode::Exactly, Some(width)) => width,
            _ => model.padding_and_border_for_axis(FlexDirection::Row, leaf.owner_width),
        };
        let height = match (leaf.height_mode, leaf.height) {
            (MeasureMode::Exactly, Some(height)) => height,
            _ => model.padding_and_border_for_axis(FlexDirection::Column, leaf.owner_width),
        };
        let width = model.bound_axis(FlexDirection::Row, width, leaf.owner_width, leaf.owner_width);
        let height = model.bound_axis(FlexDirection::Column, height, leaf.owner_height, leaf.owner_width);
        self.set_measured_size(id, width, height);
    }

    /// Settle the size without visiting children when the constraints already fix it.
    ///
    /// Applies when both axes are exact, or when either axis is bounded at or below zero.
    pub(super) fn size_fixed(&mut self, id: NodeId, model: &BoxModel<'_>, leaf: &LeafConstraints) -> bool {
        let collapsed = |mode: MeasureMode, size: Option<f64>| {
            mode == MeasureMode::AtMost && size.is_some_and(|value| value <= 0.0)
        };
        let fixed = collapsed(leaf.width_mode, leaf.width)
            || collapsed(leaf.height_mode, leaf.height)
            || (leaf.width_mode == MeasureMode::Exactly && leaf.height_mode == MeasureMode::Exactly);
        if !fixed {
            return false;
        }
        let axis_size = |size: Option<f64>| size.map_or(0.0, |value| value.max(0.0));
        let width = model.bound_axis(
            FlexDirection::Row,
            axis_size(leaf.width),
            leaf.owner_width,
            leaf.owner_width,
        );
        let height = model.bound_axis(
            FlexDirection::Column,
            axis_size(leaf.height),
            leaf.owner_height,
            leaf.owner_width,
        );
        self.set_measured_size(id, width, height);
        true
    }
}
