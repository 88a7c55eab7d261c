//! Margin, border, padding and offset lookups along a flex axis.

use super::resolve_direction;
use crate::enums::{Direction, Edge, FlexDirection, Gutter, MeasureMode};
use crate::style::{Edges, Style};
use crate::value::{Unit, Value, resolve_value, resolve_value_margin};

/// A style read under a resolved direction.
///
/// Logical `Start`/`End` edges map onto `Left`/`Right` by `direction`, so every lookup is
/// physical once the axis is known.
#[derive(Copy, Clone)]
pub(super) struct BoxModel<'style> {
    pub style: &'style Style,
    pub direction: Direction,
}

/// Style value for a physical edge, letting an explicit logical edge win.
fn physical_value(edges: &Edges, edge: Edge, direction: Direction, default: Value) -> Value {
    let logical = match (edge, direction) {
        (Edge::Left, Direction::Rtl) | (Edge::Right, Direction::Ltr | Direction::Inherit) => {
            Some(Edge::End)
        }
        (Edge::Left, Direction::Ltr | Direction::Inherit) | (Edge::Right, Direction::Rtl) => {
            Some(Edge::Start)
        }
        _ => None,
    };
    if let Some(logical_edge) = logical {
        let raw = edges.get(logical_edge);
        if !raw.is_undefined() {
            return raw;
        }
    }
    edges.computed(edge, default)
}

impl<'style> BoxModel<'style> {
    pub const fn new(style: &'style Style, direction: Direction) -> Self {
        Self { style, direction }
    }

    /// A child's style, read under its own direction inherited from `owner_direction`.
    pub const fn for_child(style: &'style Style, owner_direction: Direction) -> Self {
        Self::new(style, resolve_direction(style.direction, owner_direction))
    }

    fn margin_value(&self, edge: Edge) -> Value {
        physical_value(&self.style.margin, edge, self.direction, Value::ZERO)
    }

    /// Raw leading margin, used to detect `auto`.
    pub fn leading_margin_value(&self, axis: FlexDirection) -> Value {
        self.margin_value(axis.leading_edge())
    }

    pub fn trailing_margin_value(&self, axis: FlexDirection) -> Value {
        self.margin_value(axis.trailing_edge())
    }

    pub fn leading_margin(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        resolve_value_margin(self.leading_margin_value(axis), width_size).unwrap_or(0.0)
    }

    pub fn trailing_margin(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        resolve_value_margin(self.trailing_margin_value(axis), width_size).unwrap_or(0.0)
    }

    pub fn margin_for_axis(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        self.leading_margin(axis, width_size) + self.trailing_margin(axis, width_size)
    }

    fn border_at(&self, edge: Edge) -> f64 {
        resolve_value(
            physical_value(&self.style.border, edge, self.direction, Value::ZERO),
            None,
        )
        .unwrap_or(0.0)
        .max(0.0)
    }

    pub fn leading_border(&self, axis: FlexDirection) -> f64 {
        self.border_at(axis.leading_edge())
    }

    pub fn trailing_border(&self, axis: FlexDirection) -> f64 {
        self.border_at(axis.trailing_edge())
    }

    fn padding_at(&self, edge: Edge, width_size: Option<f64>) -> f64 {
        resolve_value(
            physical_value(&self.style.padding, edge, self.direction, Value::ZERO),
            width_size,
        )
        .unwrap_or(0.0)
        .max(0.0)
    }

    pub fn leading_padding(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        self.padding_at(axis.leading_edge(), width_size)
    }

    pub fn trailing_padding(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        self.padding_at(axis.trailing_edge(), width_size)
    }

    pub fn leading_padding_and_border(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        self.leading_padding(axis, width_size) + self.leading_border(axis)
    }

    pub fn trailing_padding_and_border(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        self.trailing_padding(axis, width_size) + self.trailing_border(axis)
    }

    pub fn padding_and_border_for_axis(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        self.leading_padding_and_border(axis, width_size)
            + self.trailing_padding_and_border(axis, width_size)
    }

    fn position_value(&self, edge: Edge) -> Value {
        physical_value(&self.style.position, edge, self.direction, Value::UNDEFINED)
    }

    pub fn is_leading_position_defined(&self, axis: FlexDirection) -> bool {
        !self.position_value(axis.leading_edge()).is_undefined()
    }

    pub fn is_trailing_position_defined(&self, axis: FlexDirection) -> bool {
        !self.position_value(axis.trailing_edge()).is_undefined()
    }

    /// Leading offset, zero when absent or unresolvable.
    pub fn leading_position(&self, axis: FlexDirection, axis_size: Option<f64>) -> f64 {
        resolve_value(self.position_value(axis.leading_edge()), axis_size).unwrap_or(0.0)
    }

    pub fn trailing_position(&self, axis: FlexDirection, axis_size: Option<f64>) -> f64 {
        resolve_value(self.position_value(axis.trailing_edge()), axis_size).unwrap_or(0.0)
    }

    /// Shift applied by relative offsets; the leading offset wins over the trailing one.
    pub fn relative_position(&self, axis: FlexDirection, axis_size: Option<f64>) -> f64 {
        if self.is_leading_position_defined(axis) {
            self.leading_position(axis, axis_size)
        } else {
            -self.trailing_position(axis, axis_size)
        }
    }

    /// Whether the style size along `axis` is usable against `owner_size`.
    pub fn is_style_dim_defined(&self, axis: FlexDirection, owner_size: Option<f64>) -> bool {
        let value = self.style.resolved_dimension(axis.dimension());
        match value.unit {
            Unit::Undefined | Unit::Auto => false,
            Unit::Point => value.value >= 0.0,
            Unit::Percent => value.value >= 0.0 && owner_size.is_some(),
        }
    }

    pub fn resolved_style_dim(&self, axis: FlexDirection, owner_size: Option<f64>) -> Option<f64> {
        resolve_value(self.style.resolved_dimension(axis.dimension()), owner_size)
    }

    pub fn min_dim(&self, axis: FlexDirection, axis_size: Option<f64>) -> Option<f64> {
        resolve_value(self.style.min_dimension(axis.dimension()), axis_size)
    }

    pub fn max_dim(&self, axis: FlexDirection, axis_size: Option<f64>) -> Option<f64> {
        resolve_value(self.style.max_dimension(axis.dimension()), axis_size)
    }

    /// Clamp `value` to the style min/max; an undefined value stays undefined.
    pub fn bound_axis_within_min_max(
        &self,
        axis: FlexDirection,
        value: Option<f64>,
        axis_size: Option<f64>,
    ) -> Option<f64> {
        let mut bounded = value?;
        if let Some(max) = self.max_dim(axis, axis_size).filter(|max| *max >= 0.0)
            && bounded > max
        {
            bounded = max;
        }
        if let Some(min) = self.min_dim(axis, axis_size).filter(|min| *min >= 0.0)
            && bounded < min
        {
            bounded = min;
        }
        Some(bounded)
    }

    /// Like [`Self::bound_axis_within_min_max`], never smaller than padding plus border.
    pub fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f64,
        axis_size: Option<f64>,
        width_size: Option<f64>,
    ) -> f64 {
        self.bound_axis_within_min_max(axis, Some(value), axis_size)
            .unwrap_or(value)
            .max(self.padding_and_border_for_axis(axis, width_size))
    }

    /// Tighten a (mode, size) constraint with the style max size plus margins.
    pub fn constrain_max_size_for_mode(
        &self,
        axis: FlexDirection,
        owner_axis_size: Option<f64>,
        owner_width: Option<f64>,
        mode: &mut MeasureMode,
        size: &mut Option<f64>,
    ) {
        let Some(max_size) = self
            .max_dim(axis, owner_axis_size)
            .map(|max| max + self.margin_for_axis(axis, owner_width))
        else {
            return;
        };
        match *mode {
            MeasureMode::Exactly | MeasureMode::AtMost => {
                if size.is_none_or(|current| max_size < current) {
                    *size = Some(max_size);
                }
            }
            MeasureMode::Undefined => {
                *mode = MeasureMode::AtMost;
                *size = Some(max_size);
            }
        }
    }

    /// Gap between neighbours along `axis`: column gap on rows, row gap on columns.
    pub fn gap_for_axis(&self, axis: FlexDirection, width_size: Option<f64>) -> f64 {
        let gutter = if axis.is_row() { Gutter::Column } else { Gutter::Row };
        resolve_value(self.style.gap(gutter), width_size)
            .unwrap_or(0.0)
            .max(0.0)
    }
}
