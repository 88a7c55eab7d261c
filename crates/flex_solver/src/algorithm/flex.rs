//! One visit of a node: box edges, leaf shortcuts, and the flex container pass.

use super::box_model::BoxModel;
use super::leaf::LeafConstraints;
use super::lines::FlexLine;
use super::{LayoutContext, LayoutRequest, resolve_direction};
use crate::enums::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, MeasureMode, Overflow,
    PositionType, Wrap,
};
use crate::style::Style;
use crate::tree::NodeId;
use log::debug;
use core::iter;

/// Container-level values shared by every sub-pass of one flex layout.
#[derive(Clone, Debug)]
pub(super) struct FlexFrame {
    pub node: NodeId,
    pub style: Style,
    pub children: Vec<NodeId>,
    pub direction: Direction,
    pub main_axis: FlexDirection,
    pub cross_axis: FlexDirection,
    pub is_main_row: bool,
    pub is_wrap: bool,
    pub perform_layout: bool,
    /// Modes the container itself was given.
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub main_mode: MeasureMode,
    pub cross_mode: MeasureMode,
    pub owner_width: Option<f64>,
    pub main_owner_size: Option<f64>,
    pub cross_owner_size: Option<f64>,
    /// Content-box sizes available to children.
    pub inner_width: Option<f64>,
    pub inner_height: Option<f64>,
    pub inner_main: Option<f64>,
    pub inner_cross: Option<f64>,
    pub min_inner_main: Option<f64>,
    pub max_inner_main: Option<f64>,
    pub leading_pb_main: f64,
    pub trailing_pb_main: f64,
    pub leading_pb_cross: f64,
    pub pb_main: f64,
    pub pb_cross: f64,
    pub main_gap: f64,
    pub cross_gap: f64,
    pub flex_basis_overflows: bool,
}

impl FlexFrame {
    pub fn model(&self) -> BoxModel<'_> {
        BoxModel::new(&self.style, self.direction)
    }

    /// Inner size along a physical axis.
    pub const fn inner_for(&self, axis: FlexDirection) -> Option<f64> {
        if axis.is_row() {
            self.inner_width
        } else {
            self.inner_height
        }
    }
}

/// Content-box size along `axis`: the outer size minus margin, padding and border, kept within
/// the inner min/max and never negative.
fn available_inner_dim(
    model: &BoxModel<'_>,
    axis: FlexDirection,
    available: Option<f64>,
    owner_size: Option<f64>,
    owner_width: Option<f64>,
) -> Option<f64> {
    let margin = model.margin_for_axis(axis, owner_width);
    let padding_and_border = model.padding_and_border_for_axis(axis, owner_width);
    let mut inner = available? - margin - padding_and_border;
    if let Some(max_inner) = model.max_dim(axis, owner_size).map(|max| max - padding_and_border) {
        inner = inner.min(max_inner);
    }
    if let Some(min_inner) = model.min_dim(axis, owner_size).map(|min| min - padding_and_border) {
        inner = inner.max(min_inner);
    }
    Some(inner.max(0.0))
}

impl LayoutContext<'_> {
    /// Compute the layout of `id` without consulting its cache.
    pub(super) fn layout_impl(&mut self, id: NodeId, request: &LayoutRequest) {
        let style = self.style(id);
        let direction = resolve_direction(style.direction, request.owner_direction);
        let model = BoxModel::new(&style, direction);
        self.record_box_edges(id, &model, request.owner_width);

        let margin_row = model.margin_for_axis(FlexDirection::Row, request.owner_width);
        let margin_column = model.margin_for_axis(FlexDirection::Column, request.owner_width);
        let leaf = LeafConstraints {
            width: request.available_width.map(|width| width - margin_row),
            height: request.available_height.map(|height| height - margin_column),
            width_mode: request.width_mode,
            height_mode: request.height_mode,
            owner_width: request.owner_width,
            owner_height: request.owner_height,
        };

        let node = self.tree.node(id);
        if node.measure.is_some() {
            self.measure_leaf(id, &model, &leaf);
            return;
        }
        if node.children.is_empty() {
            self.size_empty_container(id, &model, &leaf);
            return;
        }
        if !request.perform_layout && self.size_fixed(id, &model, &leaf) {
            return;
        }

        self.tree.clone_children_if_needed(id);
        self.layout_mut(id).had_overflow = false;
        let mut frame = self.flex_frame(id, style, direction, request);
        self.layout_flex_container(&mut frame, &leaf);
    }

    /// Store resolved margin, border and padding on the layout, physically and logically.
    fn record_box_edges(&mut self, id: NodeId, model: &BoxModel<'_>, owner_width: Option<f64>) {
        let row = FlexDirection::Row.resolve(model.direction);
        let layout = self.layout_mut(id);
        layout.direction = model.direction;
        for (axis, leading_logical, trailing_logical) in [
            (row, Some(Edge::Start), Some(Edge::End)),
            (FlexDirection::Column, None, None),
        ] {
            let edges = [
                (axis.leading_edge(), leading_logical, true),
                (axis.trailing_edge(), trailing_logical, false),
            ];
            for (physical, logical, leading) in edges {
                let (margin, border, padding) = if leading {
                    (
                        model.leading_margin(axis, owner_width),
                        model.leading_border(axis),
                        model.leading_padding(axis, owner_width),
                    )
                } else {
                    (
                        model.trailing_margin(axis, owner_width),
                        model.trailing_border(axis),
                        model.trailing_padding(axis, owner_width),
                    )
                };
                for edge in iter::once(physical).chain(logical) {
                    layout.set_margin(edge, margin);
                    layout.set_border(edge, border);
                    layout.set_padding(edge, padding);
                }
            }
        }
    }

    fn flex_frame(
        &self,
        id: NodeId,
        style: Style,
        direction: Direction,
        request: &LayoutRequest,
    ) -> FlexFrame {
        let model = BoxModel::new(&style, direction);
        let main_axis = style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_row = main_axis.is_row();
        let owner_width = request.owner_width;
        let (main_owner_size, cross_owner_size) = if is_main_row {
            (request.owner_width, request.owner_height)
        } else {
            (request.owner_height, request.owner_width)
        };
        let (main_mode, cross_mode) = if is_main_row {
            (request.width_mode, request.height_mode)
        } else {
            (request.height_mode, request.width_mode)
        };
        let pb_main = model.padding_and_border_for_axis(main_axis, owner_width);
        let inner_width = available_inner_dim(
            &model,
            FlexDirection::Row,
            request.available_width,
            request.owner_width,
            owner_width,
        );
        let inner_height = available_inner_dim(
            &model,
            FlexDirection::Column,
            request.available_height,
            request.owner_height,
            owner_width,
        );
        let (inner_main, inner_cross) = if is_main_row {
            (inner_width, inner_height)
        } else {
            (inner_height, inner_width)
        };
        FlexFrame {
            node: id,
            style,
            children: self.tree.children(id).to_vec(),
            direction,
            main_axis,
            cross_axis,
            is_main_row,
            is_wrap: style.flex_wrap != Wrap::NoWrap,
            perform_layout: request.perform_layout,
            width_mode: request.width_mode,
            height_mode: request.height_mode,
            main_mode,
            cross_mode,
            owner_width,
            main_owner_size,
            cross_owner_size,
            inner_width,
            inner_height,
            inner_main,
            inner_cross,
            min_inner_main: model.min_dim(main_axis, main_owner_size).map(|min| min - pb_main),
            max_inner_main: model.max_dim(main_axis, main_owner_size).map(|max| max - pb_main),
            leading_pb_main: model.leading_padding_and_border(main_axis, owner_width),
            trailing_pb_main: model.trailing_padding_and_border(main_axis, owner_width),
            leading_pb_cross: model.leading_padding_and_border(cross_axis, owner_width),
            pb_main,
            pb_cross: model.padding_and_border_for_axis(cross_axis, owner_width),
            main_gap: model.gap_for_axis(main_axis, inner_width),
            cross_gap: model.gap_for_axis(cross_axis, inner_width),
            flex_basis_overflows: false,
        }
    }

    fn layout_flex_container(&mut self, frame: &mut FlexFrame, leaf: &LeafConstraints) {
        let total_outer_basis = self.compute_flex_basis_for_children(frame);
        frame.flex_basis_overflows = frame.main_mode != MeasureMode::Undefined
            && frame.inner_main.is_some_and(|available| total_outer_basis > available);
        if frame.is_wrap && frame.flex_basis_overflows && frame.main_mode == MeasureMode::AtMost {
            frame.main_mode = MeasureMode::Exactly;
        }

        let model_style = frame.style;
        let model = BoxModel::new(&model_style, frame.direction);
        let mut start = 0;
        let mut line_count = 0;
        let mut total_line_cross = 0.0_f64;
        let mut max_line_main = 0.0_f64;
        while start < frame.children.len() {
            let mut line = self.collect_line(frame, start, line_count);
            self.size_line_main(frame, &mut line);
            let can_skip_flex = !frame.perform_layout && frame.cross_mode == MeasureMode::Exactly;
            if !can_skip_flex {
                self.resolve_flexible_length(frame, &mut line);
            }
            if line.remaining_free_space < 0.0 {
                self.layout_mut(frame.node).had_overflow = true;
            }
            self.justify_main_axis(frame, &mut line);

            let mut container_cross = frame.inner_cross.unwrap_or(0.0);
            if frame.cross_mode != MeasureMode::Exactly {
                container_cross = model.bound_axis(
                    frame.cross_axis,
                    line.cross_dim + frame.pb_cross,
                    frame.cross_owner_size,
                    frame.owner_width,
                ) - frame.pb_cross;
            }
            if !frame.is_wrap && frame.cross_mode == MeasureMode::Exactly {
                line.cross_dim = frame.inner_cross.unwrap_or(0.0);
            }
            line.cross_dim = model.bound_axis(
                frame.cross_axis,
                line.cross_dim + frame.pb_cross,
                frame.cross_owner_size,
                frame.owner_width,
            ) - frame.pb_cross;

            let line_offset = if line_count == 0 {
                total_line_cross
            } else {
                total_line_cross + frame.cross_gap
            };
            if frame.perform_layout {
                self.align_line_cross(frame, &line, container_cross, line_offset);
            }
            debug!(
                target: "flex_solver::lines",
                "[FLEX-LINE] {:?} line {line_count}: items {}..{} main={} cross={} free={}",
                frame.node,
                line.start,
                line.end,
                line.main_dim,
                line.cross_dim,
                line.remaining_free_space
            );
            total_line_cross = line_offset + line.cross_dim;
            max_line_main = max_line_main.max(line.main_dim);
            line_count += 1;
            start = line.end;
        }

        if frame.perform_layout && (frame.is_wrap || self.is_baseline_layout(frame)) {
            self.align_content(frame, line_count, total_line_cross);
        }
        self.set_container_size(frame, leaf, max_line_main, total_line_cross);

        if !frame.perform_layout {
            return;
        }
        if frame.style.flex_wrap == Wrap::WrapReverse {
            self.flip_wrap_reverse(frame);
        }
        for child in frame.children.clone() {
            let child_style = self.style(child);
            if child_style.display != Display::None
                && child_style.position_type == PositionType::Absolute
            {
                self.layout_absolute_child(frame, child);
            }
        }
        self.set_trailing_positions(frame);
    }

    /// Free space of one line, after sizing content-based containers to their items.
    fn size_line_main(&mut self, frame: &FlexFrame, line: &mut FlexLine) {
        let consumed = line.size_consumed;
        let mut available = frame.inner_main;
        let mut size_based_on_content = false;
        if frame.main_mode != MeasureMode::Exactly {
            if let Some(min) = frame.min_inner_main.filter(|min| consumed < *min) {
                available = Some(min);
            } else if let Some(max) = frame.max_inner_main.filter(|max| consumed > *max) {
                available = Some(max);
            } else {
                let legacy = self.config(frame.node).use_legacy_stretch_behaviour;
                if legacy {
                    self.layout_mut(frame.node).did_use_legacy_flag = true;
                } else if line.total_flex_grow == 0.0 || self.flex_grow(frame.node) == 0.0 {
                    available = Some(consumed);
                }
                size_based_on_content = !legacy;
            }
        }
        line.available_main = available;
        line.remaining_free_space = match available {
            Some(size) if !size_based_on_content => size - consumed,
            _ if consumed < 0.0 => -consumed,
            _ => 0.0,
        };
    }

    /// Final measured size of the container from its constraints or its content.
    fn set_container_size(
        &mut self,
        frame: &FlexFrame,
        leaf: &LeafConstraints,
        max_line_main: f64,
        total_line_cross: f64,
    ) {
        let model = frame.model();
        let scroll = frame.style.overflow == Overflow::Scroll;
        let mut width = model.bound_axis(
            FlexDirection::Row,
            leaf.width.unwrap_or(0.0),
            leaf.owner_width,
            leaf.owner_width,
        );
        let mut height = model.bound_axis(
            FlexDirection::Column,
            leaf.height.unwrap_or(0.0),
            leaf.owner_height,
            leaf.owner_width,
        );
        let content_size = |axis: FlexDirection,
                            mode: MeasureMode,
                            content: f64,
                            inner: Option<f64>,
                            owner_size: Option<f64>,
                            padding_and_border: f64| {
            match mode {
                MeasureMode::Undefined => {
                    Some(model.bound_axis(axis, content, owner_size, frame.owner_width))
                }
                MeasureMode::AtMost if !scroll => {
                    Some(model.bound_axis(axis, content, owner_size, frame.owner_width))
                }
                MeasureMode::AtMost => {
                    let bounded = model
                        .bound_axis_within_min_max(axis, Some(content), owner_size)
                        .unwrap_or(content);
                    let limit = inner.map_or(bounded, |size| size + padding_and_border);
                    Some(limit.min(bounded).max(padding_and_border))
                }
                MeasureMode::Exactly => None,
            }
        };
        let main = content_size(
            frame.main_axis,
            frame.main_mode,
            max_line_main,
            frame.inner_main,
            frame.main_owner_size,
            frame.pb_main,
        );
        let cross = content_size(
            frame.cross_axis,
            frame.cross_mode,
            total_line_cross + frame.pb_cross,
            frame.inner_cross,
            frame.cross_owner_size,
            frame.pb_cross,
        );
        let (row_content, column_content) = if frame.is_main_row {
            (main, cross)
        } else {
            (cross, main)
        };
        if let Some(content) = row_content {
            width = content;
        }
        if let Some(content) = column_content {
            height = content;
        }
        let layout = self.layout_mut(frame.node);
        layout.set_measured(Dimension::Width, width);
        layout.set_measured(Dimension::Height, height);
    }

    /// Mirror in-flow children across the cross axis for `wrap-reverse`.
    fn flip_wrap_reverse(&mut self, frame: &FlexFrame) {
        let edge = frame.cross_axis.leading_edge();
        let dim = frame.cross_axis.dimension();
        let container_cross = self.layout(frame.node).measured_or_zero(dim);
        for &child in &frame.children {
            let style = self.style(child);
            if style.display == Display::None || style.position_type != PositionType::Relative {
                continue;
            }
            let layout = self.layout_mut(child);
            let flipped = container_cross - layout.position_at(edge) - layout.measured_or_zero(dim);
            layout.set_position(edge, flipped);
        }
    }

    /// On reversed axes, derive the physical leading offset from the stored trailing one.
    fn set_trailing_positions(&mut self, frame: &FlexFrame) {
        let axes = [frame.main_axis, frame.cross_axis];
        if !axes.iter().any(|axis| axis.is_reverse()) {
            return;
        }
        for &child in &frame.children {
            if self.style(child).display == Display::None {
                continue;
            }
            for axis in axes.into_iter().filter(|axis| axis.is_reverse()) {
                let dim = axis.dimension();
                let container = self.layout(frame.node).measured_or_zero(dim);
                let layout = self.layout_mut(child);
                let trailing =
                    container - layout.measured_or_zero(dim) - layout.position_at(axis.leading_edge());
                layout.set_position(axis.trailing_edge(), trailing);
            }
        }
    }

    /// Rows whose items align on their baselines need the baseline pass.
    pub(super) fn is_baseline_layout(&self, frame: &FlexFrame) -> bool {
        if frame.style.flex_direction.is_column() {
            return false;
        }
        if frame.style.align_items == Align::Baseline {
            return true;
        }
        frame.children.iter().any(|child| {
            let style = self.style(*child);
            style.position_type == PositionType::Relative && style.align_self == Align::Baseline
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    /// Inner space subtracts margin, padding and border and honours inner min/max.
    ///
    /// # Panics
    /// Panics if the inner size is computed wrongly.
    fn inner_dimension_subtracts_box() {
        let mut style = Style::default();
        style.padding.set(Edge::All, Value::points(10.0));
        style.margin.set(Edge::Left, Value::points(5.0));
        style.max_dimensions = [Value::points(100.0), Value::UNDEFINED];
        let model = BoxModel::new(&style, Direction::Ltr);
        let inner = available_inner_dim(&model, FlexDirection::Row, Some(300.0), None, None);
        assert_eq!(inner, Some(80.0));
        let narrow = available_inner_dim(&model, FlexDirection::Row, Some(20.0), None, None);
        assert_eq!(narrow, Some(0.0));
        assert_eq!(available_inner_dim(&model, FlexDirection::Row, None, None, None), None);
    }
}
