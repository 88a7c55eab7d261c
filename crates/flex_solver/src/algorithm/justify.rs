//! Main-axis placement of a line's items (`justify-content` and auto margins).

use super::box_model::BoxModel;
use super::flex::FlexFrame;
use super::lines::FlexLine;
use super::LayoutContext;
use crate::enums::{Display, FlexDirection, Justify, MeasureMode, PositionType};
use log::trace;

/// Leading offset and spacing between items for `justify`.
fn justify_spacing(justify: Justify, remaining: f64, item_count: usize) -> (f64, f64) {
    if item_count == 0 {
        return (0.0, 0.0);
    }
    let items = item_count as f64;
    match justify {
        Justify::FlexStart => (0.0, 0.0),
        Justify::Center => (remaining / 2.0, 0.0),
        Justify::FlexEnd => (remaining, 0.0),
        Justify::SpaceBetween if item_count > 1 => (0.0, remaining.max(0.0) / (items - 1.0)),
        Justify::SpaceBetween => (0.0, 0.0),
        Justify::SpaceEvenly => {
            let spacing = remaining / (items + 1.0);
            (spacing, spacing)
        }
        Justify::SpaceAround => (remaining / items / 2.0, remaining / items),
    }
}

impl LayoutContext<'_> {
    /// Position the line's items along the main axis and measure the line's extent.
    ///
    /// Sets `main_dim` and `cross_dim` on the line.
    pub(super) fn justify_main_axis(&mut self, frame: &FlexFrame, line: &mut FlexLine) {
        let main_edge = frame.main_axis.leading_edge();
        let container = frame.model();
        let mut remaining = line.remaining_free_space;
        if frame.main_mode == MeasureMode::AtMost && remaining > 0.0 {
            let used = line.available_main.unwrap_or(0.0) - remaining;
            remaining = match frame.min_inner_main {
                Some(min_inner) if min_inner >= 0.0 => (min_inner - used).max(0.0),
                _ => 0.0,
            };
        }

        let auto_margins: usize = line
            .items
            .iter()
            .map(|&child| {
                let style = self.style(child);
                let model = BoxModel::for_child(&style, frame.direction);
                usize::from(model.leading_margin_value(frame.main_axis).is_auto())
                    + usize::from(model.trailing_margin_value(frame.main_axis).is_auto())
            })
            .sum();
        let (leading, between) = if auto_margins == 0 {
            justify_spacing(frame.style.justify_content, remaining, line.items.len())
        } else {
            (0.0, 0.0)
        };
        let auto_margin_share = if auto_margins == 0 {
            0.0
        } else {
            remaining / auto_margins as f64
        };

        let baseline_layout = self.is_baseline_layout(frame);
        let can_skip_flex = !frame.perform_layout && frame.cross_mode == MeasureMode::Exactly;
        let mut main_dim = frame.leading_pb_main + leading;
        let mut cross_dim = 0.0_f64;
        let mut max_ascent = 0.0_f64;
        let mut max_descent = 0.0_f64;
        let mut first = true;
        for index in line.start..line.end {
            let child = frame.children[index];
            let style = self.style(child);
            if style.display == Display::None {
                continue;
            }
            let model = BoxModel::for_child(&style, frame.direction);
            if style.position_type == PositionType::Absolute {
                if !frame.perform_layout {
                    continue;
                }
                let border = container.leading_border(frame.main_axis);
                let layout = self.layout_mut(child);
                if model.is_leading_position_defined(frame.main_axis) {
                    let offset = model.leading_position(frame.main_axis, frame.inner_main)
                        + border
                        + model.leading_margin(frame.main_axis, frame.inner_width);
                    layout.set_position(main_edge, offset);
                } else {
                    let offset = layout.position_at(main_edge) + border;
                    layout.set_position(main_edge, offset);
                }
                continue;
            }

            if !first {
                main_dim += between + frame.main_gap;
            }
            first = false;
            if model.leading_margin_value(frame.main_axis).is_auto() {
                main_dim += auto_margin_share;
            }
            if frame.perform_layout {
                let layout = self.layout_mut(child);
                let offset = layout.position_at(main_edge) + main_dim;
                layout.set_position(main_edge, offset);
            }
            if model.trailing_margin_value(frame.main_axis).is_auto() {
                main_dim += auto_margin_share;
            }

            if can_skip_flex {
                main_dim += model.margin_for_axis(frame.main_axis, frame.inner_width)
                    + self.layout(child).computed_flex_basis.unwrap_or(0.0);
                cross_dim = frame.inner_cross.unwrap_or(0.0);
                continue;
            }
            main_dim += self.dim_with_margin(child, frame.direction, frame.main_axis, frame.inner_width);
            if baseline_layout {
                let ascent = self.baseline(child)
                    + model.leading_margin(FlexDirection::Column, frame.inner_width);
                let descent = self.layout(child).measured_or_zero(FlexDirection::Column.dimension())
                    + model.margin_for_axis(FlexDirection::Column, frame.inner_width)
                    - ascent;
                max_ascent = max_ascent.max(ascent);
                max_descent = max_descent.max(descent);
            } else {
                cross_dim = cross_dim.max(self.dim_with_margin(
                    child,
                    frame.direction,
                    frame.cross_axis,
                    frame.inner_width,
                ));
            }
        }
        main_dim += frame.trailing_pb_main;
        if baseline_layout {
            cross_dim = max_ascent + max_descent;
        }
        trace!(
            target: "flex_solver::justify",
            "[FLEX-JUSTIFY] {:?} {:?} leading={leading} between={between} main={main_dim} cross={cross_dim}",
            frame.node,
            frame.style.justify_content
        );
        line.main_dim = main_dim;
        line.cross_dim = cross_dim;
    }
}
