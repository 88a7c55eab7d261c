//! Per-node computed layout and its measurement cache.

use crate::enums::{Dimension, Direction, Edge, MeasureMode};
use crate::value::EPSILON;

/// Number of ring-buffered measurement slots kept per node.
pub const MAX_CACHED_MEASUREMENTS: usize = 16;

/// One remembered (constraints → size) result of a measure or layout invocation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CachedMeasurement {
    pub available_width: Option<f64>,
    pub available_height: Option<f64>,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub computed_width: f64,
    pub computed_height: f64,
}

/// Mutable layout output of one node.
///
/// `position` and `dimensions` are the solver's raw output: offsets relative to the owner's
/// border box indexed by physical edge, and the committed border-box size. The pixel-snapped
/// values read through [`Self::left`], [`Self::top`], [`Self::width`] and [`Self::height`].
/// `margin`, `border` and `padding` hold the four physical edges followed by `Start` and `End`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResults {
    pub position: [f64; 4],
    pub dimensions: [f64; 2],
    /// Snapped left and top offsets relative to the owner.
    pub(crate) rounded_origin: [f64; 2],
    /// Snapped width and height.
    pub(crate) rounded_size: [f64; 2],
    pub margin: [f64; 6],
    pub border: [f64; 6],
    pub padding: [f64; 6],
    /// Resolved direction used for the last layout.
    pub direction: Direction,
    /// Raw solver output before pixel rounding.
    pub measured_dimensions: [Option<f64>; 2],
    pub had_overflow: bool,
    /// Pass counter value of the last pass that visited this node.
    pub generation_count: u64,
    /// Direction of the owner during the last visit; `None` before the first one.
    pub last_owner_direction: Option<Direction>,
    pub computed_flex_basis: Option<f64>,
    pub computed_flex_basis_generation: u64,
    /// Owner inner main size the cached basis was resolved against.
    pub computed_flex_basis_owner: Option<f64>,
    pub did_use_legacy_flag: bool,
    pub did_legacy_stretch_flag_affect_layout: bool,
    pub(crate) cached_layout: Option<CachedMeasurement>,
    pub(crate) cached_measurements: [Option<CachedMeasurement>; MAX_CACHED_MEASUREMENTS],
    pub(crate) next_cached_measurement: usize,
}

impl Default for LayoutResults {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [0.0; 2],
            rounded_origin: [0.0; 2],
            rounded_size: [0.0; 2],
            margin: [0.0; 6],
            border: [0.0; 6],
            padding: [0.0; 6],
            direction: Direction::Inherit,
            measured_dimensions: [None; 2],
            had_overflow: false,
            generation_count: 0,
            last_owner_direction: None,
            computed_flex_basis: None,
            computed_flex_basis_generation: 0,
            computed_flex_basis_owner: None,
            did_use_legacy_flag: false,
            did_legacy_stretch_flag_affect_layout: false,
            cached_layout: None,
            cached_measurements: [None; MAX_CACHED_MEASUREMENTS],
            next_cached_measurement: 0,
        }
    }
}

/// Slot of `edge` in the six-entry margin/border/padding arrays.
#[inline]
const fn box_slot(edge: Edge) -> usize {
    match edge {
        Edge::Left | Edge::Horizontal | Edge::All => 0,
        Edge::Top | Edge::Vertical => 1,
        Edge::Right => 2,
        Edge::Bottom => 3,
        Edge::Start => 4,
        Edge::End => 5,
    }
}

impl LayoutResults {
    #[inline]
    pub fn left(&self) -> f64 {
        self.rounded_origin[0]
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.rounded_origin[1]
    }

    /// Raw offset of the right margin edge from the owner's right border edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.position_at(Edge::Right)
    }

    /// Raw offset of the bottom margin edge from the owner's bottom border edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.position_at(Edge::Bottom)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.dimension(Dimension::Width)
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.dimension(Dimension::Height)
    }

    /// Snapped size along `dim`.
    #[inline]
    pub fn dimension(&self, dim: Dimension) -> f64 {
        self.rounded_size.get(dim.index()).copied().unwrap_or(0.0)
    }

    /// Committed size along `dim` before rounding.
    #[inline]
    pub fn raw_dimension(&self, dim: Dimension) -> f64 {
        self.dimensions.get(dim.index()).copied().unwrap_or(0.0)
    }

    /// Raw offset stored for a physical edge; logical edges read as zero.
    #[inline]
    pub fn position_at(&self, edge: Edge) -> f64 {
        self.position.get(edge.index()).copied().unwrap_or(0.0)
    }

    pub fn margin(&self, edge: Edge) -> f64 {
        self.margin.get(box_slot(edge)).copied().unwrap_or(0.0)
    }

    pub fn border(&self, edge: Edge) -> f64 {
        self.border.get(box_slot(edge)).copied().unwrap_or(0.0)
    }

    pub fn padding(&self, edge: Edge) -> f64 {
        self.padding.get(box_slot(edge)).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn measured(&self, dim: Dimension) -> Option<f64> {
        self.measured_dimensions.get(dim.index()).copied().flatten()
    }

    /// Measured size, reading an unmeasured axis as zero.
    #[inline]
    pub fn measured_or_zero(&self, dim: Dimension) -> f64 {
        self.measured(dim).unwrap_or(0.0)
    }

    pub(crate) fn set_position(&mut self, edge: Edge, value: f64) {
        if let Some(slot) = self.position.get_mut(edge.index()) {
            *slot = value;
        }
    }

    pub(crate) fn set_dimension(&mut self, dim: Dimension, value: f64) {
        if let Some(slot) = self.dimensions.get_mut(dim.index()) {
            *slot = value;
        }
    }

    pub(crate) fn set_rounded(&mut self, origin: [f64; 2], size: [f64; 2]) {
        self.rounded_origin = origin;
        self.rounded_size = size;
    }

    pub(crate) fn set_measured(&mut self, dim: Dimension, value: f64) {
        if let Some(slot) = self.measured_dimensions.get_mut(dim.index()) {
            *slot = Some(value);
        }
    }

    pub(crate) fn set_margin(&mut self, edge: Edge, value: f64) {
        if let Some(slot) = self.margin.get_mut(box_slot(edge)) {
            *slot = value;
        }
    }

    pub(crate) fn set_border(&mut self, edge: Edge, value: f64) {
        if let Some(slot) = self.border.get_mut(box_slot(edge)) {
            *slot = value;
        }
    }

    pub(crate) fn set_padding(&mut self, edge: Edge, value: f64) {
        if let Some(slot) = self.padding.get_mut(box_slot(edge)) {
            *slot = value;
        }
    }

    /// Forget every cached measurement and the cached layout.
    pub(crate) fn invalidate_cache(&mut self) {
        self.cached_layout = None;
        self.cached_measurements = [None; MAX_CACHED_MEASUREMENTS];
        self.next_cached_measurement = 0;
    }

    /// Cached measurements currently held, in slot order.
    pub(crate) fn cached_measurements(&self) -> impl Iterator<Item = &CachedMeasurement> {
        self.cached_measurements.iter().flatten()
    }

    /// Store a measurement in the ring buffer, overwriting the oldest entry once full.
    pub(crate) fn push_measurement(&mut self, entry: CachedMeasurement) {
        let slot_index = self.next_cached_measurement % MAX_CACHED_MEASUREMENTS;
        if let Some(slot) = self.cached_measurements.get_mut(slot_index) {
            *slot = Some(entry);
        }
        self.next_cached_measurement = (slot_index + 1) % MAX_CACHED_MEASUREMENTS;
    }

    /// Whether the committed geometry of two results matches within tolerance.
    pub fn same_geometry(&self, other: &Self) -> bool {
        let close = |lhs: &f64, rhs: &f64| (lhs - rhs).abs() < EPSILON;
        self.rounded_origin
            .iter()
            .zip(other.rounded_origin.iter())
            .all(|(lhs, rhs)| close(lhs, rhs))
            && self
                .rounded_size
                .iter()
                .zip(other.rounded_size.iter())
                .all(|(lhs, rhs)| close(lhs, rhs))
            && self.margin.iter().zip(other.margin.iter()).all(|(lhs, rhs)| close(lhs, rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(width: f64) -> CachedMeasurement {
        CachedMeasurement {
            available_width: Some(width),
            available_height: None,
            width_mode: MeasureMode::AtMost,
            height_mode: MeasureMode::Undefined,
            computed_width: width,
            computed_height: 10.0,
        }
    }

    #[test]
    /// The ring buffer never holds more than its capacity and drops the oldest entry.
    ///
    /// # Panics
    /// Panics if the ring buffer grows or keeps the oldest entry.
    fn ring_buffer_overwrites_oldest() {
        let mut layout = LayoutResults::default();
        for step in 0..=MAX_CACHED_MEASUREMENTS {
            layout.push_measurement(entry(step as f64));
        }
        assert_eq!(layout.cached_measurements().count(), MAX_CACHED_MEASUREMENTS);
        assert!(
            layout
                .cached_measurements()
                .all(|cached| cached.available_width != Some(0.0))
        );
        layout.invalidate_cache();
        assert_eq!(layout.cached_measurements().count(), 0);
    }

    #[test]
    /// Logical edges live in their own slots.
    ///
    /// # Panics
    /// Panics if `Start` aliases a physical edge.
    fn logical_box_slots_are_separate() {
        let mut layout = LayoutResults::default();
        layout.set_margin(Edge::Left, 4.0);
        layout.set_margin(Edge::Start, 4.0);
        layout.set_margin(Edge::End, 9.0);
        assert!((layout.margin(Edge::Left) - 4.0).abs() < f64::EPSILON);
        assert!((layout.margin(Edge::End) - 9.0).abs() < f64::EPSILON);
        assert!(layout.margin(Edge::Right).abs() < f64::EPSILON);
    }
}
