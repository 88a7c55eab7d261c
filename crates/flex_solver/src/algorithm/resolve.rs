//! Distributing a line's free space among its flexible items.

use super::box_model::BoxModel;
use super::flex::FlexFrame;
use super::lines::FlexLine;
use super::{LayoutContext, LayoutReason, LayoutRequest, align_item, constraint};
use crate::enums::{Align, MeasureMode};
use crate::tree::NodeId;
use crate::value::Unit;
use log::debug;

impl LayoutContext<'_> {
    fn bounded_basis(&self, frame: &FlexFrame, child: NodeId, model: &BoxModel<'_>) -> f64 {
        let basis = self.layout(child).computed_flex_basis.unwrap_or(0.0);
        model
            .bound_axis_within_min_max(frame.main_axis, Some(basis), frame.main_owner_size)
            .unwrap_or(basis)
    }

    /// Resolve the main size of every item on the line and lay each one out.
    ///
    /// Items whose share would break their min or max are frozen at that bound first and leave
    /// the rest of the space to the others.
    pub(super) fn resolve_flexible_length(&mut self, frame: &FlexFrame, line: &mut FlexLine) {
        let original_free_space = line.remaining_free_space;
        self.freeze_clamped_items(frame, line);
        let distributed = self.distribute_free_space(frame, line);
        line.remaining_free_space = original_free_space - distributed;
        debug!(
            target: "flex_solver::resolve",
            "[FLEX-RESOLVE] {:?} free {original_free_space} -> {}",
            frame.node,
            line.remaining_free_space
        );
    }

    /// Take items clamped by min/max out of the flexible totals.
    fn freeze_clamped_items(&self, frame: &FlexFrame, line: &mut FlexLine) {
        let mut delta_free_space = 0.0;
        for &child in &line.items {
            let style = self.style(child);
            let model = BoxModel::for_child(&style, frame.direction);
            let basis = self.bounded_basis(frame, child, &model);
            let remaining = line.remaining_free_space;
            let (factor, total) = if remaining < 0.0 {
                (-self.flex_shrink(child) * basis, line.total_flex_shrink_scaled)
            } else if remaining > 0.0 {
                (self.flex_grow(child), line.total_flex_grow)
            } else {
                continue;
            };
            if factor == 0.0 || total == 0.0 {
                continue;
            }
            let base_size = basis + remaining / total * factor;
            let bound_size =
                model.bound_axis(frame.main_axis, base_size, frame.inner_main, frame.inner_width);
            if (base_size - bound_size).abs() > f64::EPSILON {
                delta_free_space += bound_size - basis;
                if remaining < 0.0 {
                    line.total_flex_shrink_scaled -= factor;
                } else {
                    line.total_flex_grow -= factor;
                }
            }
        }
        line.remaining_free_space -= delta_free_space;
    }

    /// Give every item its share and lay it out; returns the space handed out.
    fn distribute_free_space(&mut self, frame: &FlexFrame, line: &FlexLine) -> f64 {
        let mut delta_free_space = 0.0;
        let remaining = line.remaining_free_space;
        for &child in &line.items {
            let style = self.style(child);
            let model = BoxModel::for_child(&style, frame.direction);
            let basis = self.bounded_basis(frame, child, &model);
            let mut main_size = basis;
            if remaining < 0.0 {
                let factor = -self.flex_shrink(child) * basis;
                if factor != 0.0 {
                    let size = if line.total_flex_shrink_scaled == 0.0 {
                        basis + factor
                    } else {
                        basis + remaining / line.total_flex_shrink_scaled * factor
                    };
                    main_size = model.bound_axis(frame.main_axis, size, frame.inner_main, frame.inner_width);
                }
            } else if remaining > 0.0 {
                let factor = self.flex_grow(child);
                if factor != 0.0 && line.total_flex_grow != 0.0 {
                    main_size = model.bound_axis(
                        frame.main_axis,
                        basis + remaining / line.total_flex_grow * factor,
                        frame.inner_main,
                        frame.inner_width,
                    );
                }
            }
            delta_free_space += main_size - basis;
            self.layout_flexed_child(frame, child, &model, main_size);
        }
        delta_free_space
    }

    /// Lay out one item at its resolved main size, picking the cross constraint it gets.
    fn layout_flexed_child(
        &mut self,
        frame: &FlexFrame,
        child: NodeId,
        model: &BoxModel<'_>,
        main_size: f64,
    ) {
        let margin_main = model.margin_for_axis(frame.main_axis, frame.inner_width);
        let margin_cross = model.margin_for_axis(frame.cross_axis, frame.inner_width);
        let mut main = Some(main_size + margin_main);
        let mut main_mode = MeasureMode::Exactly;
        let cross_defined = model.is_style_dim_defined(frame.cross_axis, frame.inner_cross);
        let stretch = align_item(&frame.style, model.style) == Align::Stretch;
        let auto_cross_margin = model.leading_margin_value(frame.cross_axis).is_auto()
            || model.trailing_margin_value(frame.cross_axis).is_auto();

        let (mut cross, mut cross_mode) = if let Some(ratio) = model.style.aspect_ratio {
            let cross_content = if frame.is_main_row {
                main_size / ratio
            } else {
                main_size * ratio
            };
            (Some(cross_content + margin_cross), MeasureMode::Exactly)
        } else if frame.inner_cross.is_some()
            && !cross_defined
            && frame.cross_mode == MeasureMode::Exactly
            && !(frame.is_wrap && frame.flex_basis_overflows)
            && stretch
            && !auto_cross_margin
        {
            (frame.inner_cross, MeasureMode::Exactly)
        } else if !cross_defined {
            (frame.inner_cross, MeasureMode::AtMost)
        } else {
            let value = model.style.resolved_dimension(frame.cross_axis.dimension());
            let size = model
                .resolved_style_dim(frame.cross_axis, frame.inner_cross)
                .map(|size| size + margin_cross);
            let loose_percent =
                value.unit == Unit::Percent && frame.cross_mode != MeasureMode::Exactly;
            let mode = if loose_percent {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            (size, mode)
        };

        model.constrain_max_size_for_mode(
            frame.main_axis,
            frame.inner_main,
            frame.inner_width,
            &mut main_mode,
            &mut main,
        );
        model.constrain_max_size_for_mode(
            frame.cross_axis,
            frame.inner_cross,
            frame.inner_width,
            &mut cross_mode,
            &mut cross,
        );
        let requires_stretch = !cross_defined && stretch && !auto_cross_margin;
        let (main, main_mode) = constraint(main, main_mode);
        let (cross, cross_mode) = constraint(cross, cross_mode);
        let ((available_width, width_mode), (available_height, height_mode)) = if frame.is_main_row {
            ((main, main_mode), (cross, cross_mode))
        } else {
            ((cross, cross_mode), (main, main_mode))
        };
        let perform_layout = frame.perform_layout && !requires_stretch;
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
                perform_layout,
                reason: if perform_layout {
                    LayoutReason::FlexLayout
                } else {
                    LayoutReason::FlexMeasure
                },
            },
        );
        if self.layout(child).had_overflow {
            self.layout_mut(frame.node).had_overflow = true;
        }
    }
}
