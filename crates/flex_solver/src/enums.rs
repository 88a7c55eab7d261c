//! Keyword enums used by styles and by the solver.

use serde::{Deserialize, Serialize};

/// Inline base direction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Take the owner's resolved direction (left-to-right at the root).
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

/// Main axis of a flex container.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

impl FlexDirection {
    /// True for `row` and `row-reverse`.
    #[inline]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// True for `column` and `column-reverse`.
    #[inline]
    pub const fn is_column(self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }

    /// True for the reversed directions.
    #[inline]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }

    /// Flip row directions for right-to-left content.
    #[inline]
    pub const fn resolve(self, direction: Direction) -> Self {
        match (self, direction) {
            (Self::Row, Direction::Rtl) => Self::RowReverse,
            (Self::RowReverse, Direction::Rtl) => Self::Row,
            _ => self,
        }
    }

    /// The axis perpendicular to this one, resolved for `direction`.
    #[inline]
    pub const fn cross(self, direction: Direction) -> Self {
        if self.is_column() {
            Self::Row.resolve(direction)
        } else {
            Self::Column
        }
    }

    /// Physical edge where items start along this axis.
    #[inline]
    pub const fn leading_edge(self) -> Edge {
        match self {
            Self::Column => Edge::Top,
            Self::ColumnReverse => Edge::Bottom,
            Self::Row => Edge::Left,
            Self::RowReverse => Edge::Right,
        }
    }

    /// Physical edge where items end along this axis.
    #[inline]
    pub const fn trailing_edge(self) -> Edge {
        match self {
            Self::Column => Edge::Bottom,
            Self::ColumnReverse => Edge::Top,
            Self::Row => Edge::Right,
            Self::RowReverse => Edge::Left,
        }
    }

    /// Dimension measured along this axis.
    #[inline]
    pub const fn dimension(self) -> Dimension {
        if self.is_row() {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::ColumnReverse => "column-reverse",
            Self::Row => "row",
            Self::RowReverse => "row-reverse",
        }
    }
}

/// Distribution of free space along the main axis.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl Justify {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FlexStart => "flex-start",
            Self::Center => "center",
            Self::FlexEnd => "flex-end",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
            Self::SpaceEvenly => "space-evenly",
        }
    }
}

/// Cross-axis alignment shared by `align-items`, `align-self` and `align-content`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    /// Defer to the owner's `align-items` (only meaningful for `align-self`).
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
}

impl Align {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FlexStart => "flex-start",
            Self::Center => "center",
            Self::FlexEnd => "flex-end",
            Self::Stretch => "stretch",
            Self::Baseline => "baseline",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
        }
    }
}

/// Whether a node takes part in flex layout or is positioned against its owner.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

impl PositionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }
}

/// Line wrapping behaviour of a flex container.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wrap {
    #[default]
    #[serde(alias = "nowrap")]
    NoWrap,
    Wrap,
    WrapReverse,
}

impl Wrap {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoWrap => "nowrap",
            Self::Wrap => "wrap",
            Self::WrapReverse => "wrap-reverse",
        }
    }
}

/// Content overflow behaviour.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

impl Overflow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Scroll => "scroll",
        }
    }
}

/// Whether a node is laid out at all.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Flex,
    None,
}

impl Display {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flex => "flex",
            Self::None => "none",
        }
    }
}

/// Constraint kind attached to an available size.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MeasureMode {
    /// No constraint; the size is `None`.
    #[default]
    Undefined,
    /// The result must equal the size.
    Exactly,
    /// The size is an upper bound.
    AtMost,
}

/// How a node's content is sized.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    #[default]
    Default,
    /// Measured externally; rounded so glyph pixels are never clipped.
    Text,
}

/// Box edges addressable in style edge arrays.
///
/// The first four are physical and index layout position arrays.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
    Horizontal,
    Vertical,
    All,
}

impl Edge {
    /// Every edge in storage order.
    pub const ALL_EDGES: [Self; 9] = [
        Self::Left,
        Self::Top,
        Self::Right,
        Self::Bottom,
        Self::Start,
        Self::End,
        Self::Horizontal,
        Self::Vertical,
        Self::All,
    ];

    /// Slot of this edge in a nine-entry style array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Start => "start",
            Self::End => "end",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::All => "all",
        }
    }
}

/// Width or height.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Which gap a `gap` setter addresses.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gutter {
    /// Space between columns (along rows).
    Column,
    /// Space between rows (along columns).
    Row,
    /// Both of the above.
    All,
}

impl Gutter {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}
