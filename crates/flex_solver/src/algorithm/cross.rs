//! Cross-axis alignment within a line, `align-content` across lines, and baselines.

use super::box_model::BoxModel;
use super::flex::FlexFrame;
use super::lines::FlexLine;
use super::{LayoutContext, LayoutReason, LayoutRequest, align_item, constraint};
use crate::enums::{Align, Display, Edge, FlexDirection, MeasureMode, PositionType};
use crate::tree::NodeId;
use crate::value::floats_equal;
use log::debug;

/// Offset of the first line and extra cross space added to every line.
fn align_content_spacing(align: Align, remaining: f64, line_count: usize) -> (f64, f64) {
    let lines = line_count as f64;
    match align {
        Align::FlexEnd => (remaining, 0.0),
        Align::Center => (remaining / 2.0, 0.0),
        Align::Stretch if remaining > 0.0 && line_count > 0 => (0.0, remaining / lines),
        Align::SpaceAround if remaining > 0.0 && line_count > 0 => {
            (remaining / (2.0 * lines), remaining / lines)
        }
        Align::SpaceBetween if remaining > 0.0 && line_count > 1 => {
            (0.0, remaining / (lines - 1.0))
        }
        _ => (0.0, 0.0),
    }
}

impl LayoutContext<'_> {
    /// Place the items of one line on the cross axis, stretching them when asked to.
    pub(super) fn align_line_cross(
        &mut self,
        frame: &FlexFrame,
        line: &FlexLine,
        container_cross: f64,
        line_offset: f64,
    ) {
        let cross_edge = frame.cross_axis.leading_edge();
        let container = frame.model();
        for index in line.start..line.end {
            let child = frame.children[index];
            let style = self.style(child);
            if style.display == Display::None {
                continue;
            }
            let model = BoxModel::for_child(&style, frame.direction);
            if style.position_type == PositionType::Absolute {
                let mut offset = container.leading_border(frame.cross_axis)
                    + model.leading_margin(frame.cross_axis, frame.inner_width);
                if model.is_leading_position_defined(frame.cross_axis) {
                    offset += model.leading_position(frame.cross_axis, frame.inner_cross);
                }
                self.layout_mut(child).set_position(cross_edge, offset);
                continue;
            }

            let align = align_item(&frame.style, &style);
            let leading_auto = model.leading_margin_value(frame.cross_axis).is_auto();
            let trailing_auto = model.trailing_margin_value(frame.cross_axis).is_auto();
            let mut leading_cross = frame.leading_pb_cross;
            if align == Align::Stretch && !leading_auto && !trailing_auto {
                if !model.is_style_dim_defined(frame.cross_axis, frame.inner_cross) {
                    self.stretch_child(frame, child, &model, line.cross_dim);
                }
            } else {
                let remaining = container_cross
                    - self.dim_with_margin(child, frame.direction, frame.cross_axis, frame.inner_width);
                leading_cross += match (leading_auto, trailing_auto, align) {
                    (true, true, _) => (remaining / 2.0).max(0.0),
                    (false, true, _) | (false, false, Align::FlexStart) => 0.0,
                    (true, false, _) => remaining.max(0.0),
                    (false, false, Align::Center) => remaining / 2.0,
                    (false, false, _) => remaining,
                };
            }
            let layout = self.layout_mut(child);
            let offset = layout.position_at(cross_edge) + line_offset + leading_cross;
            layout.set_position(cross_edge, offset);
        }
    }

    /// Relayout `child` with its cross size forced to the line's.
    fn stretch_child(&mut self, frame: &FlexFrame, child: NodeId, model: &BoxModel<'_>, line_cross: f64) {
        let main_measured = self.layout(child).measured_or_zero(frame.main_axis.dimension());
        let mut cross = Some(model.style.aspect_ratio.map_or(line_cross, |ratio| {
            let content = if frame.is_main_row {
                main_measured / ratio
            } else {
                main_measured * ratio
            };
            model.margin_for_axis(frame.cross_axis, frame.inner_width) + content
        }));
        let mut main = Some(main_measured + model.margin_for_axis(frame.main_axis, frame.inner_width));
        let mut main_mode = MeasureMode::Exactly;
        let mut cross_mode = MeasureMode::Exactly;
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
        let ((width, width_mode), (height, height_mode)) = if frame.is_main_row {
            ((main, main_mode), (cross, cross_mode))
        } else {
            ((cross, cross_mode), (main, main_mode))
        };
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
                perform_layout: true,
                reason: LayoutReason::Stretch,
            },
        );
    }

    /// Distribute leftover cross space between lines and realign every item in its line.
    pub(super) fn align_content(&mut self, frame: &FlexFrame, line_count: usize, total_line_cross: f64) {
        let container = frame.model();
        let available_cross = match (frame.cross_mode, frame.inner_cross) {
            (MeasureMode::Exactly, Some(inner)) => inner,
            _ => {
                container.bound_axis(
                    frame.cross_axis,
                    total_line_cross + frame.pb_cross,
                    frame.cross_owner_size,
                    frame.owner_width,
                ) - frame.pb_cross
            }
        };
        let remaining = available_cross - total_line_cross;
        let (lead, cross_dim_lead) =
            align_content_spacing(frame.style.align_content, remaining, line_count);
        let mut current_lead = frame.leading_pb_cross + lead;
        debug!(
            target: "flex_solver::cross",
            "[ALIGN-CONTENT] {:?} {:?} lines={line_count} free={remaining}",
            frame.node,
            frame.style.align_content
        );

        let mut end = 0;
        for line_index in 0..line_count {
            let start = end;
            let mut line_height = 0.0_f64;
            let mut max_ascent = 0.0_f64;
            let mut max_descent = 0.0_f64;
            end = frame.children.len();
            for (index, &child) in frame.children.iter().enumerate().skip(start) {
                let style = self.style(child);
                if style.display == Display::None || style.position_type != PositionType::Relative {
                    continue;
                }
                if self.tree.node(child).line_index != line_index {
                    end = index;
                    break;
                }
                let model = BoxModel::for_child(&style, frame.direction);
                if self.is_layout_dim_defined(child, frame.cross_axis) {
                    line_height = line_height.max(
                        self.layout(child).measured_or_zero(frame.cross_axis.dimension())
                            + model.margin_for_axis(frame.cross_axis, frame.inner_width),
                    );
                }
                if align_item(&frame.style, &style) == Align::Baseline {
                    let (ascent, descent) = self.ascent_descent(child, &model, frame.inner_width);
                    max_ascent = max_ascent.max(ascent);
                    max_descent = max_descent.max(descent);
                    line_height = line_height.max(max_ascent + max_descent);
                }
            }
            line_height += cross_dim_lead;
            if line_index > 0 {
                current_lead += frame.cross_gap;
            }
            for &child in frame.children.get(start..end).unwrap_or_default() {
                self.align_in_line(frame, child, current_lead, line_height, max_ascent);
            }
            current_lead += line_height;
        }
    }

    /// Ascent and descent of `child` around its baseline, margins included.
    fn ascent_descent(&self, child: NodeId, model: &BoxModel<'_>, width_size: Option<f64>) -> (f64, f64) {
        let ascent = self.baseline(child) + model.leading_margin(FlexDirection::Column, width_size);
        let descent = self.layout(child).measured_or_zero(FlexDirection::Column.dimension())
            + model.margin_for_axis(FlexDirection::Column, width_size)
            - ascent;
        (ascent, descent)
    }

    /// Position `child` within a line that starts at `lead` and is `line_height` tall.
    fn align_in_line(
        &mut self,
        frame: &FlexFrame,
        child: NodeId,
        lead: f64,
        line_height: f64,
        max_ascent: f64,
    ) {
        let style = self.style(child);
        if style.display == Display::None || style.position_type != PositionType::Relative {
            return;
        }
        let model = BoxModel::for_child(&style, frame.direction);
        let cross_edge = frame.cross_axis.leading_edge();
        let cross_dim = frame.cross_axis.dimension();
        let measured_cross = self.layout(child).measured_or_zero(cross_dim);
        match align_item(&frame.style, &style) {
            Align::FlexStart => {
                let offset = lead + model.leading_margin(frame.cross_axis, frame.inner_width);
                self.layout_mut(child).set_position(cross_edge, offset);
            }
            Align::FlexEnd => {
                let offset = lead + line_height
                    - model.trailing_margin(frame.cross_axis, frame.inner_width)
                    - measured_cross;
                self.layout_mut(child).set_position(cross_edge, offset);
            }
            Align::Center => {
                let offset = lead + (line_height - measured_cross) / 2.0;
                self.layout_mut(child).set_position(cross_edge, offset);
            }
            Align::Stretch => {
                let offset = lead + model.leading_margin(frame.cross_axis, frame.inner_width);
                self.layout_mut(child).set_position(cross_edge, offset);
                if !model.is_style_dim_defined(frame.cross_axis, frame.inner_cross) {
                    self.restretch_child(frame, child, &model, line_height);
                }
            }
            Align::Baseline => {
                let offset = lead + max_ascent - self.baseline(child)
                    + model.leading_position(FlexDirection::Column, frame.inner_cross);
                self.layout_mut(child).set_position(Edge::Top, offset);
            }
            Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
        }
    }

    /// Relayout a stretched item whose line grew past its measured cross size.
    fn restretch_child(&mut self, frame: &FlexFrame, child: NodeId, model: &BoxModel<'_>, line_height: f64) {
        let layout = self.layout(child);
        let main = layout.measured_or_zero(frame.main_axis.dimension())
            + model.margin_for_axis(frame.main_axis, frame.inner_width);
        let (width, height) = if frame.is_main_row {
            (main, line_height)
        } else {
            (line_height, main)
        };
        let unchanged = floats_equal(Some(width), layout.measured(FlexDirection::Row.dimension()))
            && floats_equal(Some(height), layout.measured(FlexDirection::Column.dimension()));
        if unchanged {
            return;
        }
        self.layout_node(
            child,
            LayoutRequest {
                available_width: Some(width),
                available_height: Some(height),
                width_mode: MeasureMode::Exactly,
                height_mode: MeasureMode::Exactly,
                owner_direction: frame.direction,
                owner_width: frame.inner_width,
                owner_height: frame.inner_height,
                perform_layout: true,
                reason: LayoutReason::MultilineStretch,
            },
        );
    }

    /// Distance from the top of `id` to its first line's baseline.
    ///
    /// A baseline callback wins; otherwise the baseline comes from the first child that aligns
    /// on baselines or is marked as the reference, else the first in-flow child, else the
    /// node's own height.
    pub(super) fn baseline(&self, id: NodeId) -> f64 {
        let node = self.tree.node(id);
        let height = node.layout.measured_or_zero(FlexDirection::Column.dimension());
        if let Some(baseline) = &node.baseline {
            let width = node.layout.measured_or_zero(FlexDirection::Row.dimension());
            let value = baseline(id, width, height);
            return if value.is_finite() { value } else { height };
        }
        let mut baseline_child = None;
        for &child in &node.children {
            let child_node = self.tree.node(child);
            if child_node.line_index > 0 {
                break;
            }
            if child_node.style.position_type == PositionType::Absolute
                || child_node.style.display == Display::None
            {
                continue;
            }
            if align_item(&node.style, &child_node.style) == Align::Baseline
                || child_node.is_reference_baseline
            {
                baseline_child = Some(child);
                break;
            }
            baseline_child.get_or_insert(child);
        }
        baseline_child.map_or(height, |child| {
            self.baseline(child) + self.layout(child).position_at(Edge::Top)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Leftover cross space is split per `align-content` mode.
    ///
    /// # Panics
    /// Panics if a mode distributes space wrongly.
    fn content_spacing_per_mode() {
        let close = |(left, right): (f64, f64), (expected_left, expected_right): (f64, f64)| {
            (left - expected_left).abs() < 0.01 && (right - expected_right).abs() < 0.01
        };
        assert!(close(align_content_spacing(Align::FlexStart, 40.0, 2), (0.0, 0.0)));
        assert!(close(align_content_spacing(Align::FlexEnd, 40.0, 2), (40.0, 0.0)));
        assert!(close(align_content_spacing(Align::Center, 40.0, 2), (20.0, 0.0)));
        assert!(close(align_content_spacing(Align::Stretch, 40.0, 2), (0.0, 20.0)));
        assert!(close(align_content_spacing(Align::SpaceBetween, 40.0, 3), (0.0, 20.0)));
        assert!(close(align_content_spacing(Align::SpaceAround, 40.0, 2), (10.0, 20.0)));
        assert!(close(align_content_spacing(Align::Stretch, -10.0, 2), (0.0, 0.0)));
    }
}
