//! Breaking children into flex lines.

use super::LayoutContext;
use super::box_model::BoxModel;
use super::flex::FlexFrame;
use crate::enums::{Display, PositionType};
use crate::tree::NodeId;
use smallvec::SmallVec;

/// One line of in-flow items and the free space bookkeeping for it.
#[derive(Clone, Debug, Default)]
pub(super) struct FlexLine {
    /// Index of the first child considered for this line.
    pub start: usize,
    /// One past the last child of this line.
    pub end: usize,
    pub items: SmallVec<NodeId, 8>,
    pub total_flex_grow: f64,
    /// Sum of `-shrink * basis` over the line's items.
    pub total_flex_shrink_scaled: f64,
    /// Bounded bases plus margins and gaps of the items.
    pub size_consumed: f64,
    /// Main size the items are resolved against.
    pub available_main: Option<f64>,
    pub remaining_free_space: f64,
    pub main_dim: f64,
    pub cross_dim: f64,
}

impl FlexLine {
    /// Grow factors below one still fill the line; shrink factors below one still empty it.
    fn apply_factor_floors(&mut self) {
        if self.total_flex_grow > 0.0 && self.total_flex_grow < 1.0 {
            self.total_flex_grow = 1.0;
        }
        if self.total_flex_shrink_scaled > -1.0 && self.total_flex_shrink_scaled < 0.0 {
            self.total_flex_shrink_scaled = -1.0;
        }
    }
}

impl LayoutContext<'_> {
    /// Collect the items of the line that starts at child `start`.
    ///
    /// A wrapping container breaks before the first item that would overflow the inner main
    /// size, but every line holds at least one item.
    pub(super) fn collect_line(&mut self, frame: &FlexFrame, start: usize, line_index: usize) -> FlexLine {
        let mut line = FlexLine {
            start,
            end: start,
            ..FlexLine::default()
        };
        for (index, &child) in frame.children.iter().enumerate().skip(start) {
            line.end = index;
            let style = self.style(child);
            if style.display == Display::None || style.position_type == PositionType::Absolute {
                line.end = index + 1;
                continue;
            }
            self.tree.node_mut(child).line_index = line_index;
            let model = BoxModel::for_child(&style, frame.direction);
            let margin = model.margin_for_axis(frame.main_axis, frame.inner_width);
            let basis = self.layout(child).computed_flex_basis.unwrap_or(0.0);
            let bounded_basis = model
                .bound_axis_within_min_max(frame.main_axis, Some(basis), frame.main_owner_size)
                .unwrap_or(basis);
            let gap = if line.items.is_empty() { 0.0 } else { frame.main_gap };
            let outer = bounded_basis + margin + gap;
            let overflows = frame
                .inner_main
                .is_some_and(|available| line.size_consumed + outer > available);
            if frame.is_wrap && overflows && !line.items.is_empty() {
                break;
            }
            line.size_consumed += outer;
            line.items.push(child);
            line.end = index + 1;
            if self.is_flexible(child) {
                line.total_flex_grow += self.flex_grow(child);
                line.total_flex_shrink_scaled -= self.flex_shrink(child) * basis;
            }
        }
        line.apply_factor_floors();
        line
    }
}
