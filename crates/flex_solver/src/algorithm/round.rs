//! Snapping computed layouts to the device pixel grid.

use crate::enums::{Dimension, Edge, NodeType};
use crate::tree::{LayoutTree, NodeId};
use log::trace;

const PIXEL_EPSILON: f64 = 0.0001;

#[inline]
fn near(left: f64, right: f64) -> bool {
    (left - right).abs() < PIXEL_EPSILON
}

/// Snap `value` to the nearest multiple of `1 / scale`.
///
/// Halves round up. `force_ceil` and `force_floor` pick a direction for values that are not
/// already on the grid. Values within a ten-thousandth of a pixel count as on the grid.
pub fn round_value_to_pixel_grid(value: f64, scale: f64, force_ceil: bool, force_floor: bool) -> f64 {
    let scaled = value * scale;
    let fraction = scaled - scaled.floor();
    let snapped = if near(fraction, 0.0) {
        scaled - fraction
    } else if near(fraction, 1.0) || force_ceil {
        scaled - fraction + 1.0
    } else if force_floor {
        scaled - fraction
    } else if fraction > 0.5 || near(fraction, 0.5) {
        scaled - fraction + 1.0
    } else {
        scaled - fraction
    };
    snapped / scale
}

/// Snap an absolute edge pair and return the snapped leading edge and size.
///
/// Text keeps whole glyph pixels: its leading edge floors, and its trailing edge ceils
/// when the raw size is fractional.
fn snap_span(start: f64, size: f64, scale: f64, text: bool) -> (f64, f64) {
    let scaled_size = size * scale;
    let fraction = scaled_size - scaled_size.floor();
    let fractional = !near(fraction, 0.0) && !near(fraction, 1.0);
    let leading = round_value_to_pixel_grid(start, scale, false, text);
    let trailing = round_value_to_pixel_grid(start + size, scale, text && fractional, text && !fractional);
    (leading, trailing - leading)
}

impl LayoutTree {
    /// Refresh the snapped origin and size of every node below `root` from its raw layout.
    ///
    /// Absolute edges are snapped independently so adjacent boxes neither overlap nor leave
    /// gaps; offsets stay relative to the owner's snapped origin. A scale of zero keeps the raw
    /// values.
    pub(crate) fn round_layout(&mut self, root: NodeId) {
        let scale = self.node(root).config.point_scale_factor;
        // (node, owner's raw absolute origin, owner's snapped absolute origin)
        let mut stack = vec![(root, [0.0_f64; 2], [0.0_f64; 2])];
        while let Some((id, owner_raw, owner_snapped)) = stack.pop() {
            let node = self.node_mut(id);
            let text = node.node_type == NodeType::Text;
            let layout = &mut node.layout;
            let raw_origin = [
                owner_raw[0] + layout.position_at(Edge::Left),
                owner_raw[1] + layout.position_at(Edge::Top),
            ];
            let raw_size = [
                layout.raw_dimension(Dimension::Width),
                layout.raw_dimension(Dimension::Height),
            ];
            let (snapped_origin, size) = if scale == 0.0 {
                (raw_origin, raw_size)
            } else {
                let (left, width) = snap_span(raw_origin[0], raw_size[0], scale, text);
                let (top, height) = snap_span(raw_origin[1], raw_size[1], scale, text);
                ([left, top], [width, height])
            };
            let origin = [
                snapped_origin[0] - owner_snapped[0],
                snapped_origin[1] - owner_snapped[1],
            ];
            layout.set_rounded(origin, size);
            trace!(
                target: "flex_solver::round",
                "[ROUND] {id:?} {raw_origin:?} {raw_size:?} -> {origin:?} {size:?}"
            );
            stack.extend(
                node.children
                    .iter()
                    .map(|&child| (child, raw_origin, snapped_origin)),
            );
        }
    }
}
