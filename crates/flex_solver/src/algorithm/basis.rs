//! Hypothetical main size of every child before free space is distributed.

use super::box_model::BoxModel;
use super::flex::FlexFrame;
use super::{LayoutContext, LayoutReason, LayoutRequest, align_item, constraint};
use crate::enums::{Align, Display, FlexDirection, MeasureMode, Overflow, PositionType};
use crate::style::Style;
use crate::tree::NodeId;
use crate::value::resolve_value;
use log::debug;

impl LayoutContext<'_> {
    /// Compute the flex basis of every in-flow child and return their sum including margins.
    ///
    /// Hidden children are zeroed out here; absolutely positioned children are skipped.
    pub(super) fn compute_flex_basis_for_children(&mut self, frame: &FlexFrame) -> f64 {
        let single_flex_child = if frame.main_mode == MeasureMode::Exactly {
            self.single_flex_child(frame)
        } else {
            None
        };
        let mut total_outer_basis = 0.0;
        for &child in &frame.children {
            let style = self.style(child);
            if style.display == Display::None {
                self.zero_out_layout_recursively(child);
                continue;
            }
            if frame.perform_layout {
                self.set_initial_position(
                    child,
                    frame.direction,
                    frame.inner_width,
                    frame.inner_height,
                    frame.inner_width,
                );
            }
            if style.position_type == PositionType::Absolute {
                continue;
            }
            if single_flex_child == Some(child) {
                let generation = self.generation;
                let layout = self.layout_mut(child);
                layout.computed_flex_basis = Some(0.0);
                layout.computed_flex_basis_generation = generation;
                layout.computed_flex_basis_owner = frame.inner_main;
            } else {
                self.compute_flex_basis_for_child(frame, child, &style);
            }
            let model = BoxModel::for_child(&style, frame.direction);
            total_outer_basis += self.layout(child).computed_flex_basis.unwrap_or(0.0)
                + model.margin_for_axis(frame.main_axis, frame.inner_width);
        }
        total_outer_basis
    }

    /// The only flexible child, if exactly one child both grows and shrinks.
    ///
    /// Its basis is irrelevant on an exact main axis since it takes whatever space is left.
    fn single_flex_child(&self, frame: &FlexFrame) -> Option<NodeId> {
        let mut found = None;
        for &child in &frame.children {
            if self.style(child).display == Display::None || !self.is_flexible(child) {
                continue;
            }
            if found.is_some() || self.flex_grow(child) == 0.0 || self.flex_shrink(child) == 0.0 {
                return None;
            }
            found = Some(child);
        }
        found
    }

    fn compute_flex_basis_for_child(&mut self, frame: &FlexFrame, child: NodeId, style: &Style) {
        let model = BoxModel::for_child(style, frame.direction);
        let main_axis = frame.main_axis;
        let owner_width = frame.inner_width;
        let owner_height = frame.inner_height;
        let resolved_basis = resolve_value(style.flex_basis, frame.inner_main);
        let row_defined = model.is_style_dim_defined(FlexDirection::Row, owner_width);
        let column_defined = model.is_style_dim_defined(FlexDirection::Column, owner_height);
        let generation = self.generation;
        let recompute_each_pass = self.config(child).experimental_web_flex_basis;

        let basis = if let (Some(basis), Some(_)) = (resolved_basis, frame.inner_main) {
            let layout = self.layout(child);
            let stale = layout.computed_flex_basis.is_none()
                || layout.computed_flex_basis_owner != frame.inner_main
                || (recompute_each_pass && layout.computed_flex_basis_generation != generation);
            if !stale {
                self.layout_mut(child).computed_flex_basis_generation = generation;
                return;
            }
            basis.max(model.padding_and_border_for_axis(main_axis, owner_width))
        } else if frame.is_main_row && row_defined {
            model
                .resolved_style_dim(FlexDirection::Row, owner_width)
                .unwrap_or(0.0)
                .max(model.padding_and_border_for_axis(FlexDirection::Row, owner_width))
        } else if !frame.is_main_row && column_defined {
            model
                .resolved_style_dim(FlexDirection::Column, owner_height)
                .unwrap_or(0.0)
                .max(model.padding_and_border_for_axis(FlexDirection::Column, owner_width))
        } else {
            self.measure_flex_basis(frame, child, style, row_defined, column_defined)
        };
        debug!(target: "flex_solver::basis", "[FLEX-BASIS] {child:?} basis={basis}");
        let layout = self.layout_mut(child);
        layout.computed_flex_basis = Some(basis);
        layout.computed_flex_basis_generation = generation;
        layout.computed_flex_basis_owner = frame.inner_main;
    }

    /// Basis from a measure pass over the child under the container's constraints.
    fn measure_flex_basis(
        &mut self,
        frame: &FlexFrame,
        child: NodeId,
        style: &Style,
        row_defined: bool,
        column_defined: bool,
    ) -> f64 {
        let model = BoxModel::for_child(style, frame.direction);
        let owner_width = frame.inner_width;
        let owner_height = frame.inner_height;
        let margin_row = model.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = model.margin_for_axis(FlexDirection::Column, owner_width);
        let is_row = frame.is_main_row;

        let mut width = None;
        let mut width_mode = MeasureMode::Undefined;
        let mut height = None;
        let mut height_mode = MeasureMode::Undefined;
        if row_defined {
            width = model
                .resolved_style_dim(FlexDirection::Row, owner_width)
                .map(|size| size + margin_row);
            width_mode = MeasureMode::Exactly;
        }
        if column_defined {
            height = model
                .resolved_style_dim(FlexDirection::Column, owner_height)
                .map(|size| size + margin_column);
            height_mode = MeasureMode::Exactly;
        }

        // Scroll containers leave their main axis unbounded for measurement.
        let scroll = frame.style.overflow == Overflow::Scroll;
        if (!is_row || !scroll) && width.is_none() && owner_width.is_some() {
            width = owner_width;
            width_mode = MeasureMode::AtMost;
        }
        if (is_row || !scroll) && height.is_none() && owner_height.is_some() {
            height = owner_height;
            height_mode = MeasureMode::AtMost;
        }

        if let Some(ratio) = style.aspect_ratio {
            if !is_row && width_mode == MeasureMode::Exactly
                && let Some(exact) = width
            {
                height = Some(margin_column + (exact - margin_row) / ratio);
                height_mode = MeasureMode::Exactly;
            } else if is_row && height_mode == MeasureMode::Exactly
                && let Some(exact) = height
            {
                width = Some(margin_row + (exact - margin_column) * ratio);
                width_mode = MeasureMode::Exactly;
            }
        }

        let stretch = align_item(&frame.style, style) == Align::Stretch;
        let has_exact_width = owner_width.is_some() && frame.width_mode == MeasureMode::Exactly;
        if !is_row && !row_defined && has_exact_width && stretch && width_mode != MeasureMode::Exactly {
            width = owner_width;
            width_mode = MeasureMode::Exactly;
            if let (Some(ratio), Some(exact)) = (style.aspect_ratio, width) {
                height = Some((exact - margin_row) / ratio);
                height_mode = MeasureMode::Exactly;
            }
        }
        let has_exact_height = owner_height.is_some() && frame.height_mode == MeasureMode::Exactly;
        if is_row && !column_defined && has_exact_height && stretch && height_mode != MeasureMode::Exactly {
            height = owner_height;
            height_mode = MeasureMode::Exactly;
            if let (Some(ratio), Some(exact)) = (style.aspect_ratio, height) {
                width = Some((exact - margin_column) * ratio);
                width_mode = MeasureMode::Exactly;
            }
        }

        model.constrain_max_size_for_mode(
            FlexDirection::Row,
            owner_width,
            owner_width,
            &mut width_mode,
            &mut width,
        );
        model.constrain_max_size_for_mode(
            FlexDirection::Column,
            owner_height,
            owner_width,
            &mut height_mode,
            &mut height,
        );
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
                owner_width,
                owner_height,
                perform_layout: false,
                reason: LayoutReason::Measure,
            },
        );
        self.layout(child)
            .measured_or_zero(frame.main_axis.dimension())
            .max(model.padding_and_border_for_axis(frame.main_axis, owner_width))
    }
}
