//! Flexbox layout solver.
//!
//! Build a tree of styled nodes in a [`LayoutTree`], call [`LayoutTree::calculate_layout`] on
//! its root and read each node's snapped box through [`LayoutTree::layout`]. Leaves whose size
//! depends on content, such as text, report it through a [`MeasureFunc`].
//!
//! Results are cached per node and only dirty subtrees are recomputed on later passes.
#![allow(
    clippy::module_name_repetitions,
    reason = "Type names like LayoutTree and FixtureNode read better at use sites"
)]

pub mod algorithm;
pub mod config;
pub mod enums;
pub mod fixture;
pub mod layout;
pub mod print;
pub mod style;
pub mod tree;
pub mod value;

pub use algorithm::LayoutStats;
pub use config::Config;
pub use enums::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, Gutter, Justify, MeasureMode,
    NodeType, Overflow, PositionType, Wrap,
};
pub use layout::LayoutResults;
pub use style::{Edges, Style};
pub use tree::{BaselineFunc, LayoutTree, MeasureFunc, NodeId, Size};
pub use value::{Unit, Value};
