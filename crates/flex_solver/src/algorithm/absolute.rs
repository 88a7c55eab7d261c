//! Absolutely positioned children, laid out after the container has its final size.

use super::box_model::BoxModel;
use super::flex::FlexFrame;
use super::{LayoutContext, LayoutReason, LayoutRequest, align_item, constraint};
use crate::enums::{Align, Dimension, FlexDirection, Justify, MeasureMode, Wrap};
use crate::tree::NodeId;
use log::trace;

/// Fraction of the free space placed before the only item of a line under `justify`, or `None`
/// when the item stays at the leading edge.
const fn sole_item_share(justify: Justify) -> Option<f64> {
    match justify {
        Justify::FlexStart | Justify::SpaceBetween => None,
        Justify::Center | Justify::SpaceAround | Justify::SpaceEvenly => Some(0.5),
        Justify::FlexEnd => Some(1.0),
    }
}

impl LayoutContext<'_> {
    /// Size of `child` along `axis` from its style, or from both insets when it has no size.
    fn absolute_axis_size(
        &self,
        frame: &FlexFrame,
        model: &BoxModel<'_>,
        axis: FlexDirection,
    ) -> Option<f64> {
        let owner_size = frame.inner_for(axis);
        let margin = model.margin_for_axis(axis, frame.inner_width);
        if model.is_style_dim_defined(axis, owner_size) {
            return model.resolved_style_dim(axis, owner_size).map(|size| size + margin);
        }
        if !(model.is_leading_position_defined(axis) && model.is_trailing_position_defined(axis)) {
            return None;
        }
        let container = frame.model();
        let size = self.layout(frame.node).measured_or_zero(axis.dimension())
            - container.leading_border(axis)
            - container.trailing_border(axis)
            - model.leading_position(axis, owner_size)
            - model.trailing_position(axis, owner_size);
        Some(model.bound_axis(axis, size, owner_size, frame.inner_width))
    }

    /// Size `child` against the container's padding box and place it by its insets.
    ///
    /// Without a leading inset, a trailing inset pins the child to the far edge; otherwise
    /// `justify-content` and the child's alignment pick the position.
    pub(super) fn layout_absolute_child(&mut self, frame: &FlexFrame, child: NodeId) {
        let style = self.style(child);
        let model = BoxModel::for_child(&style, frame.direction);
        let margin_row = model.margin_for_axis(FlexDirection::Row, frame.inner_width);
        let margin_column = model.margin_for_axis(FlexDirection::Column, frame.inner_width);
        let mut width = self.absolute_axis_size(frame, &model, FlexDirection::Row);
        let mut height = self.absolute_axis_size(frame, &model, FlexDirection::Column);

        if let Some(ratio) = style.aspect_ratio {
            match (width, height) {
                (None, Some(known)) => width = Some(margin_row + (known - margin_column) * ratio),
                (Some(known), None) => height = Some(margin_column + (known - margin_row) / ratio),
                _ => {}
            }
        }

        if width.is_none() || height.is_none() {
            let mut width_mode = if width.is_some() {
                MeasureMode::Exactly
            } else {
                MeasureMode::Undefined
            };
            let height_mode = if height.is_some() {
                MeasureMode::Exactly
            } else {
                MeasureMode::Undefined
            };
            // Text in an unsized child wraps at the container's width.
            if !frame.is_main_row
                && width.is_none()
                && frame.width_mode != MeasureMode::Undefined
                && let Some(limit) = frame.inner_width.filter(|limit| *limit > 0.0)
            {
                width = Some(limit);
                width_mode = MeasureMode::AtMost;
            }
            let (available_width, width_mode) = constraint(width, width_mode);
            let (available_height, height_mode) = constraint(height, height_mode);
            self.layout_node(
                child,
                LayoutRequest {
                    available_width,
                    available_height,
                    width_mode,
                    height_mode,
                    owner_direction: frame.direction,
                    owner_width: frame.inner_width,
                    owner_height: frame.inner_height,
                    perform_layout: false,
                    reason: LayoutReason::AbsoluteMeasure,
                },
            );
            let layout = self.layout(child);
            width = Some(layout.measured_or_zero(Dimension::Width) + margin_row);
            height = Some(layout.measured_or_zero(Dimension::Height) + margin_column);
        }

        let (available_width, width_mode) = constraint(width, MeasureMode::Exactly);
        let (available_height, height_mode) = constraint(height, MeasureMode::Exactly);
        self.layout_node(
            child,
            LayoutRequest {
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_direction: frame.direction,
                owner_width: frame.inner_width,
                owner_height: frame.inner_height,
                perform_layout: true,
                reason: LayoutReason::AbsoluteLayout,
            },
        );

        self.place_absolute(frame, child, &model, frame.main_axis);
        self.place_absolute(frame, child, &model, frame.cross_axis);
        trace!(
            target: "flex_solver::absolute",
            "[ABSOLUTE] {child:?} at {:?} size {}x{}",
            self.layout(child).position,
            self.layout(child).measured_or_zero(Dimension::Width),
            self.layout(child).measured_or_zero(Dimension::Height)
        );
    }

    /// Leading offset of an absolute child along `axis` when it is not given by a leading inset.
    ///
    /// Without a trailing inset the child is placed as the only item of the container would be.
    fn place_absolute(&mut self, frame: &FlexFrame, child: NodeId, model: &BoxModel<'_>, axis: FlexDirection) {
        if model.is_leading_position_defined(axis) {
            return;
        }
        let dim = axis.dimension();
        let container = frame.model();
        let container_size = self.layout(frame.node).measured_or_zero(dim);
        let child_size = self.layout(child).measured_or_zero(dim);
        if model.is_trailing_position_defined(axis) {
            let offset = container_size
                - child_size
                - container.trailing_border(axis)
                - model.trailing_margin(axis, frame.inner_width)
                - model.trailing_position(axis, frame.inner_for(axis));
            self.layout_mut(child).set_position(axis.leading_edge(), offset);
            return;
        }
        let share = if axis == frame.main_axis {
            sole_item_share(frame.style.justify_content)
        } else {
            let align = align_item(&frame.style, model.style);
            let wrap_reverse = frame.style.flex_wrap == Wrap::WrapReverse;
            if align == Align::Center {
                Some(0.5)
            } else if (align == Align::FlexEnd) != wrap_reverse {
                Some(1.0)
            } else {
                None
            }
        };
        let Some(share) = share else {
            return;
        };
        let free = container_size
            - container.leading_border(axis)
            - container.trailing_border(axis)
            - child_size
            - model.margin_for_axis(axis, frame.inner_width);
        let offset = container.leading_border(axis)
            + model.leading_margin(axis, frame.inner_width)
            + free * share;
        self.layout_mut(child).set_position(axis.leading_edge(), offset);
    }
}
