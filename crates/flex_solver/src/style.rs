//! Per-node style record.

use crate::config::Config;
use crate::enums::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, Gutter, Justify, Overflow,
    PositionType, Wrap,
};
use crate::value::Value;

/// Nine-slot edge array for margin, padding, border and position offsets.
///
/// A specific edge overrides its directional shorthand, which overrides `All`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edges([Value; 9]);

impl Default for Edges {
    fn default() -> Self {
        Self([Value::UNDEFINED; 9])
    }
}

impl Edges {
    /// The raw value stored for `edge`, without shorthand fallback.
    #[inline]
    pub fn get(&self, edge: Edge) -> Value {
        self.0.get(edge.index()).copied().unwrap_or_default()
    }

    #[inline]
    pub fn set(&mut self, edge: Edge, value: Value) {
        if let Some(slot) = self.0.get_mut(edge.index()) {
            *slot = value;
        }
    }

    /// Value for `edge` after shorthand fallback.
    ///
    /// `Start`/`End` never fall back to `All`; the physical edge is consulted by the caller instead.
    pub fn computed(&self, edge: Edge, default: Value) -> Value {
        let own = self.get(edge);
        if !own.is_undefined() {
            return own;
        }
        let vertical = self.get(Edge::Vertical);
        if matches!(edge, Edge::Top | Edge::Bottom) && !vertical.is_undefined() {
            return vertical;
        }
        let horizontal = self.get(Edge::Horizontal);
        if matches!(edge, Edge::Left | Edge::Right | Edge::Start | Edge::End)
            && !horizontal.is_undefined()
        {
            return horizontal;
        }
        let all = self.get(Edge::All);
        if !all.is_undefined() {
            return all;
        }
        if matches!(edge, Edge::Start | Edge::End) {
            return Value::UNDEFINED;
        }
        default
    }

    /// Edges carrying an explicit value, in storage order.
    pub fn defined(&self) -> impl Iterator<Item = (Edge, Value)> + '_ {
        Edge::ALL_EDGES
            .iter()
            .zip(self.0.iter())
            .filter(|(_, value)| !value.is_undefined())
            .map(|(edge, value)| (*edge, *value))
    }
}

/// Style inputs of one node. Immutable for the duration of a layout pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,
    pub flex_grow: Option<f64>,
    pub flex_shrink: Option<f64>,
    pub flex_basis: Value,
    pub margin: Edges,
    pub position: Edges,
    pub padding: Edges,
    pub border: Edges,
    /// Indexed by [`Gutter`].
    pub gap: [Value; 3],
    /// Indexed by [`Dimension`].
    pub dimensions: [Value; 2],
    pub min_dimensions: [Value; 2],
    pub max_dimensions: [Value; 2],
    /// Width divided by height.
    pub aspect_ratio: Option<f64>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Value::AUTO,
            margin: Edges::default(),
            position: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            gap: [Value::UNDEFINED; 3],
            dimensions: [Value::AUTO; 2],
            min_dimensions: [Value::UNDEFINED; 2],
            max_dimensions: [Value::UNDEFINED; 2],
            aspect_ratio: None,
        }
    }
}

impl Style {
    /// Defaults for a node created under `config`.
    ///
    /// Web defaults switch the main axis to rows and stretch wrapped lines.
    pub fn for_config(config: &Config) -> Self {
        let mut style = Self::default();
        if config.use_web_defaults {
            style.flex_direction = FlexDirection::Row;
            style.align_content = Align::Stretch;
        }
        style
    }

    #[inline]
    pub fn dimension(&self, dim: Dimension) -> Value {
        self.dimensions.get(dim.index()).copied().unwrap_or_default()
    }

    #[inline]
    pub fn min_dimension(&self, dim: Dimension) -> Value {
        self.min_dimensions.get(dim.index()).copied().unwrap_or_default()
    }

    #[inline]
    pub fn max_dimension(&self, dim: Dimension) -> Value {
        self.max_dimensions.get(dim.index()).copied().unwrap_or_default()
    }

    /// The size the algorithm treats as the node's preferred size.
    ///
    /// A max equal to the min pins the dimension.
    pub fn resolved_dimension(&self, dim: Dimension) -> Value {
        let max = self.max_dimension(dim);
        if !max.is_undefined() && max == self.min_dimension(dim) {
            max
        } else {
            self.dimension(dim)
        }
    }

    /// Gap value for `gutter`, falling back to the `All` gutter.
    pub fn gap(&self, gutter: Gutter) -> Value {
        let own = self.gap.get(gutter.index()).copied().unwrap_or_default();
        if own.is_undefined() {
            self.gap.get(Gutter::All.index()).copied().unwrap_or_default()
        } else {
            own
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Specific edges beat shorthands, which beat `All`.
    ///
    /// # Panics
    /// Panics if the edge cascade resolves in the wrong order.
    fn edge_cascade_prefers_specific() {
        let mut edges = Edges::default();
        edges.set(Edge::All, Value::points(1.0));
        edges.set(Edge::Horizontal, Value::points(2.0));
        edges.set(Edge::Left, Value::points(3.0));
        assert_eq!(edges.computed(Edge::Left, Value::ZERO), Value::points(3.0));
        assert_eq!(edges.computed(Edge::Right, Value::ZERO), Value::points(2.0));
        assert_eq!(edges.computed(Edge::Top, Value::ZERO), Value::points(1.0));
        assert_eq!(edges.computed(Edge::Start, Value::ZERO), Value::points(2.0));
    }

    #[test]
    /// Logical edges do not fall back to the caller default.
    ///
    /// # Panics
    /// Panics if `Start` resolves to the default.
    fn logical_edges_stay_undefined() {
        let edges = Edges::default();
        assert!(edges.computed(Edge::Start, Value::ZERO).is_undefined());
        assert_eq!(edges.computed(Edge::Bottom, Value::ZERO), Value::ZERO);
    }

    #[test]
    /// Equal min and max pin the resolved dimension.
    ///
    /// # Panics
    /// Panics if the resolved dimension ignores the pinned bounds.
    fn pinned_dimension_uses_max() {
        let mut style = Style::default();
        style.dimensions = [Value::points(10.0), Value::AUTO];
        style.min_dimensions = [Value::points(40.0), Value::UNDEFINED];
        style.max_dimensions = [Value::points(40.0), Value::UNDEFINED];
        assert_eq!(style.resolved_dimension(Dimension::Width), Value::points(40.0));
        assert!(style.resolved_dimension(Dimension::Height).is_auto());
    }

    #[test]
    /// Web defaults change the main axis and line packing.
    ///
    /// # Panics
    /// Panics if the web defaults are not applied.
    fn web_defaults_flip_direction() {
        let config = Config {
            use_web_defaults: true,
            ..Config::default()
        };
        let style = Style::for_config(&config);
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.align_content, Align::Stretch);
    }
}
