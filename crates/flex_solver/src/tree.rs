//! Node arena: ownership, dirty tracking and the style mutation API.

use crate::algorithm::LayoutStats;
use crate::config::Config;
use crate::enums::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, Gutter, Justify, MeasureMode,
    NodeType, Overflow, PositionType, Wrap,
};
use crate::layout::LayoutResults;
use crate::style::Style;
use crate::value::Value;
use core::mem;
use log::trace;
use std::sync::Arc;

/// Handle of a node inside a [`LayoutTree`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Size reported by a measure callback.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// External content measurement: `(node, width, width_mode, height, height_mode) -> size`.
pub type MeasureFunc =
    Arc<dyn Fn(NodeId, Option<f64>, MeasureMode, Option<f64>, MeasureMode) -> Size + Send + Sync>;

/// External baseline: `(node, width, height) -> distance from the top edge`.
pub type BaselineFunc = Arc<dyn Fn(NodeId, f64, f64) -> f64 + Send + Sync>;

/// One box of the layout tree.
#[derive(Clone)]
pub struct Node {
    pub(crate) style: Style,
    pub(crate) layout: LayoutResults,
    pub(crate) children: Vec<NodeId>,
    pub(crate) owner: Option<NodeId>,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) node_type: NodeType,
    pub(crate) is_dirty: bool,
    /// Set when the node and all of its owned descendants were dirtied together.
    pub(crate) subtree_dirty: bool,
    pub(crate) has_new_layout: bool,
    pub(crate) is_reference_baseline: bool,
    /// Wrap line the node landed on during its owner's last layout.
    pub(crate) line_index: usize,
    pub(crate) config: Arc<Config>,
    live: bool,
}

impl Node {
    fn new(config: Arc<Config>) -> Self {
        Self {
            style: Style::for_config(&config),
            layout: LayoutResults::default(),
            children: Vec::new(),
            owner: None,
            measure: None,
            baseline: None,
            node_type: NodeType::Default,
            is_dirty: false,
            subtree_dirty: false,
            has_new_layout: true,
            is_reference_baseline: false,
            line_index: 0,
            config,
            live: true,
        }
    }
}

/// Arena of nodes addressed by [`NodeId`].
///
/// A child has at most one owner. Trees built from clones may share children until the first
/// mutation, at which point the sharing node copies its children and takes ownership of the copies.
pub struct LayoutTree {
    nodes: Vec<Node>,
    free_slots: Vec<usize>,
    default_config: Arc<Config>,
    /// Incremented once per `calculate_layout`.
    pub(crate) generation: u64,
    pub(crate) stats: LayoutStats,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// A tree whose nodes default to `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            nodes: Vec::new(),
            free_slots: Vec::new(),
            default_config: Arc::new(config),
            generation: 0,
            stats: LayoutStats::default(),
        }
    }

    /// Config given to nodes created after this call.
    pub fn set_default_config(&mut self, config: Config) {
        self.default_config = Arc::new(config);
    }

    pub fn default_config(&self) -> &Config {
        &self.default_config
    }

    /// Create a standalone node with the default config.
    pub fn new_node(&mut self) -> NodeId {
        let config = Arc::clone(&self.default_config);
        self.new_node_with_config(config)
    }

    pub fn new_node_with_config(&mut self, config: Arc<Config>) -> NodeId {
        self.allocate(Node::new(config))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(slot) = self.free_slots.pop()
            && let Some(entry) = self.nodes.get_mut(slot)
        {
            *entry = node;
            return NodeId(slot);
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn release(&mut self, id: NodeId) {
        assert!(self.contains(id), "Cannot free node {id:?}: it was already freed");
        let node = self.node_mut(id);
        node.live = false;
        node.children.clear();
        node.owner = None;
        node.measure = None;
        node.baseline = None;
        self.free_slots.push(id.0);
        trace!(target: "flex_solver::tree", "[TREE] freed {id:?}");
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        let node = &self.nodes[id.0];
        debug_assert!(node.live, "node {id:?} was freed");
        node
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let node = &mut self.nodes[id.0];
        debug_assert!(node.live, "node {id:?} was freed");
        node
    }

    /// Whether `id` refers to a live node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| node.live)
    }

    #[inline]
    pub fn style(&self, id: NodeId) -> &Style {
        &self.node(id).style
    }

    #[inline]
    pub fn layout(&self, id: NodeId) -> &LayoutResults {
        &self.node(id).layout
    }

    pub fn config(&self, id: NodeId) -> &Config {
        &self.node(id).config
    }

    pub fn set_config(&mut self, id: NodeId, config: Arc<Config>) {
        let node = self.node_mut(id);
        if *node.config != *config {
            node.config = config;
            self.mark_dirty(id);
        }
    }

    // Ownership

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).owner
    }

    /// Insert `child` at `index` (clamped to the child count).
    ///
    /// # Panics
    /// Panics if `child` already has an owner or `owner` has a measure function.
    pub fn insert_child(&mut self, owner: NodeId, child: NodeId, index: usize) {
        assert!(
            self.node(child).owner.is_none(),
            "Child already has an owner, it must be removed first."
        );
        assert!(
            self.node(owner).measure.is_none(),
            "Cannot add child: nodes with measure functions cannot have children."
        );
        self.clone_children_if_needed(owner);
        let children = &mut self.node_mut(owner).children;
        let position = index.min(children.len());
        children.insert(position, child);
        self.node_mut(child).owner = Some(owner);
        trace!(target: "flex_solver::tree", "[TREE] insert {child:?} into {owner:?} at {position}");
        self.mark_dirty(owner);
    }

    /// Append `child` to `owner`.
    ///
    /// # Panics
    /// Panics under the same conditions as [`Self::insert_child`].
    pub fn add_child(&mut self, owner: NodeId, child: NodeId) {
        let count = self.child_count(owner);
        self.insert_child(owner, child, count);
    }

    /// Detach `child` from `owner`. A child still owned elsewhere is only dropped from the list.
    pub fn remove_child(&mut self, owner: NodeId, child: NodeId) {
        let children = &mut self.node_mut(owner).children;
        let Some(position) = children.iter().position(|candidate| *candidate == child) else {
            return;
        };
        children.remove(position);
        let detached = self.node_mut(child);
        if detached.owner == Some(owner) {
            detached.layout = LayoutResults::default();
            detached.owner = None;
        }
        trace!(target: "flex_solver::tree", "[TREE] remove {child:?} from {owner:?}");
        self.mark_dirty(owner);
    }

    pub fn remove_all_children(&mut self, owner: NodeId) {
        let children = mem::take(&mut self.node_mut(owner).children);
        if children.is_empty() {
            return;
        }
        for child in children {
            let detached = self.node_mut(child);
            if detached.owner == Some(owner) {
                detached.layout = LayoutResults::default();
                detached.owner = None;
            }
        }
        self.mark_dirty(owner);
    }

    /// Give `id` private copies of any children it shares with another tree.
    pub(crate) fn clone_children_if_needed(&mut self, id: NodeId) {
        let shared = self
            .node(id)
            .children
            .iter()
            .any(|child| self.node(*child).owner != Some(id));
        if !shared {
            return;
        }
        let children = self.node(id).children.clone();
        for (index, child) in children.into_iter().enumerate() {
            if self.node(child).owner == Some(id) {
                continue;
            }
            let copy = self.clone_node(child);
            self.node_mut(copy).owner = Some(id);
            if let Some(slot) = self.node_mut(id).children.get_mut(index) {
                *slot = copy;
            }
            trace!(target: "flex_solver::tree", "[TREE] copy-on-write {child:?} -> {copy:?} under {id:?}");
        }
    }

    // Lifecycle

    /// Shallow copy: same style, layout and callbacks, sharing the original's children.
    ///
    /// The copy has no owner. Its children stay owned by the original until the copy is mutated
    /// or laid out.
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.node(id).clone();
        copy.owner = None;
        copy.live = true;
        self.allocate(copy)
    }

    /// Deep copy of the subtree rooted at `id`; every copied child is owned by its copied owner.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let copy = self.clone_node(id);
        let children = self.node(id).children.clone();
        let copied_children: Vec<NodeId> = children
            .into_iter()
            .map(|child| {
                let child_copy = self.clone_subtree(child);
                self.node_mut(child_copy).owner = Some(copy);
                child_copy
            })
            .collect();
        self.node_mut(copy).children = copied_children;
        copy
    }

    /// Restore a detached, childless node to its initial state, keeping its config.
    ///
    /// # Panics
    /// Panics if the node was freed, or still has children or an owner.
    pub fn reset(&mut self, id: NodeId) {
        assert!(self.contains(id), "Cannot reset node {id:?}: it was freed");
        let node = self.node_mut(id);
        assert!(
            node.children.is_empty(),
            "Cannot reset a node which still has children attached"
        );
        assert!(node.owner.is_none(), "Cannot reset a node still attached to an owner");
        *node = Node::new(Arc::clone(&node.config));
    }

    /// Free a detached, childless node.
    ///
    /// # Panics
    /// Panics if the node was already freed, or still has children or an owner.
    pub fn free(&mut self, id: NodeId) {
        assert!(self.contains(id), "Cannot free node {id:?}: it was already freed");
        let node = self.node(id);
        assert!(node.children.is_empty(), "Cannot free a node which still has children");
        assert!(node.owner.is_none(), "Cannot free a node still attached to an owner");
        self.release(id);
    }

    /// Detach `id` from its owner and free it with every descendant it owns, bottom-up.
    pub fn free_recursive(&mut self, id: NodeId) {
        if let Some(owner) = self.node(id).owner {
            self.remove_child(owner, id);
        }
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(
                self.node(current)
                    .children
                    .iter()
                    .copied()
                    .filter(|child| self.node(*child).owner == Some(current)),
            );
        }
        for current in order.into_iter().rev() {
            self.release(current);
        }
    }

    // Callbacks and flags

    /// Attach or clear the measure callback. Measured nodes become text nodes.
    ///
    /// # Panics
    /// Panics if a callback is set on a node with children.
    pub fn set_measure_func(&mut self, id: NodeId, measure: Option<MeasureFunc>) {
        let node = self.node_mut(id);
        if measure.is_some() {
            assert!(
                node.children.is_empty(),
                "Cannot set measure function: nodes with measure functions cannot have children."
            );
            node.node_type = NodeType::Text;
        } else {
            node.node_type = NodeType::Default;
        }
        node.measure = measure;
        self.mark_dirty(id);
    }

    pub fn has_measure_func(&self, id: NodeId) -> bool {
        self.node(id).measure.is_some()
    }

    pub fn set_baseline_func(&mut self, id: NodeId, baseline: Option<BaselineFunc>) {
        self.node_mut(id).baseline = baseline;
        self.mark_dirty(id);
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) {
        if self.node(id).node_type != node_type {
            self.node_mut(id).node_type = node_type;
            self.mark_dirty(id);
        }
    }

    pub fn is_reference_baseline(&self, id: NodeId) -> bool {
        self.node(id).is_reference_baseline
    }

    pub fn set_is_reference_baseline(&mut self, id: NodeId, is_reference: bool) {
        if self.node(id).is_reference_baseline != is_reference {
            self.node_mut(id).is_reference_baseline = is_reference;
            self.mark_dirty(id);
        }
    }

    /// Wrap line the node landed on during its owner's last layout.
    pub fn line_index(&self, id: NodeId) -> usize {
        self.node(id).line_index
    }

    pub fn has_new_layout(&self, id: NodeId) -> bool {
        self.node(id).has_new_layout
    }

    pub fn set_has_new_layout(&mut self, id: NodeId, has_new_layout: bool) {
        self.node_mut(id).has_new_layout = has_new_layout;
    }

    // Dirty tracking

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.node(id).is_dirty
    }

    /// Invalidate `id`: it and every descendant it owns become dirty and drop their cached flex
    /// basis, then owners are dirtied upward until one is already dirty.
    ///
    /// Descendants whose whole subtree is already dirty with no cached basis are not walked again.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.is_dirty = true;
            node.subtree_dirty = true;
            node.layout.computed_flex_basis = None;
            let children = node.children.clone();
            stack.extend(children.into_iter().filter(|child| {
                let child_node = self.node(*child);
                child_node.owner == Some(current)
                    && (!child_node.subtree_dirty
                        || child_node.layout.computed_flex_basis.is_some())
            }));
        }
        let mut cursor = self.node(id).owner;
        while let Some(owner) = cursor {
            let node = self.node_mut(owner);
            if node.is_dirty {
                break;
            }
            node.is_dirty = true;
            node.layout.computed_flex_basis = None;
            cursor = node.owner;
        }
        trace!(target: "flex_solver::tree", "[TREE] dirty {id:?}");
    }

    // Style mutation

    /// Replace the whole style; marks dirty only when it changed.
    pub fn set_style(&mut self, id: NodeId, style: Style) {
        if self.node(id).style != style {
            self.node_mut(id).style = style;
            self.mark_dirty(id);
        }
    }

    /// Edit the style in place; marks dirty only when the edit changed something.
    pub fn update_style(&mut self, id: NodeId, edit: impl FnOnce(&mut Style)) {
        let mut style = self.node(id).style;
        edit(&mut style);
        self.set_style(id, style);
    }

    /// Copy `src`'s style onto `dst`.
    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) {
        let style = self.node(src).style;
        self.set_style(dst, style);
    }

    pub fn set_direction(&mut self, id: NodeId, direction: Direction) {
        self.update_style(id, |style| style.direction = direction);
    }

    pub fn set_flex_direction(&mut self, id: NodeId, flex_direction: FlexDirection) {
        self.update_style(id, |style| style.flex_direction = flex_direction);
    }

    pub fn set_justify_content(&mut self, id: NodeId, justify: Justify) {
        self.update_style(id, |style| style.justify_content = justify);
    }

    pub fn set_align_content(&mut self, id: NodeId, align: Align) {
        self.update_style(id, |style| style.align_content = align);
    }

    pub fn set_align_items(&mut self, id: NodeId, align: Align) {
        self.update_style(id, |style| style.align_items = align);
    }

    pub fn set_align_self(&mut self, id: NodeId, align: Align) {
        self.update_style(id, |style| style.align_self = align);
    }

    pub fn set_position_type(&mut self, id: NodeId, position_type: PositionType) {
        self.update_style(id, |style| style.position_type = position_type);
    }

    pub fn set_flex_wrap(&mut self, id: NodeId, wrap: Wrap) {
        self.update_style(id, |style| style.flex_wrap = wrap);
    }

    pub fn set_overflow(&mut self, id: NodeId, overflow: Overflow) {
        self.update_style(id, |style| style.overflow = overflow);
    }

    pub fn set_display(&mut self, id: NodeId, display: Display) {
        self.update_style(id, |style| style.display = display);
    }

    pub fn set_flex_grow(&mut self, id: NodeId, grow: f64) {
        self.update_style(id, |style| style.flex_grow = grow.is_finite().then_some(grow));
    }

    pub fn set_flex_shrink(&mut self, id: NodeId, shrink: f64) {
        self.update_style(id, |style| style.flex_shrink = shrink.is_finite().then_some(shrink));
    }

    pub fn set_flex_basis(&mut self, id: NodeId, basis: Value) {
        self.update_style(id, |style| style.flex_basis = basis);
    }

    pub fn set_margin(&mut self, id: NodeId, edge: Edge, margin: Value) {
        self.update_style(id, |style| style.margin.set(edge, margin));
    }

    pub fn set_padding(&mut self, id: NodeId, edge: Edge, padding: Value) {
        self.update_style(id, |style| style.padding.set(edge, padding));
    }

    /// Border widths are plain points.
    pub fn set_border(&mut self, id: NodeId, edge: Edge, border: f64) {
        self.update_style(id, |style| style.border.set(edge, Value::points(border)));
    }

    pub fn set_position(&mut self, id: NodeId, edge: Edge, offset: Value) {
        self.update_style(id, |style| style.position.set(edge, offset));
    }

    pub fn set_gap(&mut self, id: NodeId, gutter: Gutter, gap: f64) {
        self.update_style(id, |style| {
            if let Some(slot) = style.gap.get_mut(gutter.index()) {
                *slot = Value::points(gap);
            }
        });
    }

    pub fn set_width(&mut self, id: NodeId, width: Value) {
        self.set_dimension_value(id, Dimension::Width, width);
    }

    pub fn set_height(&mut self, id: NodeId, height: Value) {
        self.set_dimension_value(id, Dimension::Height, height);
    }

    fn set_dimension_value(&mut self, id: NodeId, dim: Dimension, value: Value) {
        self.update_style(id, |style| {
            if let Some(slot) = style.dimensions.get_mut(dim.index()) {
                *slot = value;
            }
        });
    }

    pub fn set_min_width(&mut self, id: NodeId, width: Value) {
        self.update_style(id, |style| style.min_dimensions[0] = width);
    }

    pub fn set_min_height(&mut self, id: NodeId, height: Value) {
        self.update_style(id, |style| style.min_dimensions[1] = height);
    }

    pub fn set_max_width(&mut self, id: NodeId, width: Value) {
        self.update_style(id, |style| style.max_dimensions[0] = width);
    }

    pub fn set_max_height(&mut self, id: NodeId, height: Value) {
        self.update_style(id, |style| style.max_dimensions[1] = height);
    }

    /// Width-to-height ratio; zero or non-finite values clear it.
    pub fn set_aspect_ratio(&mut self, id: NodeId, ratio: Option<f64>) {
        let ratio = ratio.filter(|value| value.is_finite() && *value > 0.0);
        self.update_style(id, |style| style.aspect_ratio = ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(tree: &mut LayoutTree) -> (NodeId, NodeId, NodeId) {
        let root = tree.new_node();
        let middle = tree.new_node();
        let leaf = tree.new_node();
        tree.add_child(root, middle);
        tree.add_child(middle, leaf);
        (root, middle, leaf)
    }

    fn clear_dirty(tree: &mut LayoutTree, ids: &[NodeId]) {
        for id in ids {
            let node = tree.node_mut(*id);
            node.is_dirty = false;
            node.subtree_dirty = false;
        }
    }

    #[test]
    /// Dirtying a node reaches its descendants and every clean ancestor.
    ///
    /// # Panics
    /// Panics if dirty propagation misses a node.
    fn dirty_propagates_both_ways() {
        let mut tree = LayoutTree::new();
        let (root, middle, leaf) = chain(&mut tree);
        clear_dirty(&mut tree, &[root, middle, leaf]);
        tree.node_mut(leaf).layout.computed_flex_basis = Some(5.0);
        tree.mark_dirty(middle);
        assert!(tree.is_dirty(root));
        assert!(tree.is_dirty(middle));
        assert!(tree.is_dirty(leaf));
        assert_eq!(tree.layout(leaf).computed_flex_basis, None);
    }

    #[test]
    /// Setting an unchanged style value does not dirty the tree.
    ///
    /// # Panics
    /// Panics if an identical value marks the node dirty.
    fn unchanged_setter_keeps_clean() {
        let mut tree = LayoutTree::new();
        let (root, middle, leaf) = chain(&mut tree);
        tree.set_width(leaf, Value::points(10.0));
        clear_dirty(&mut tree, &[root, middle, leaf]);
        tree.set_width(leaf, Value::points(10.0));
        assert!(!tree.is_dirty(root));
        tree.set_width(leaf, Value::points(11.0));
        assert!(tree.is_dirty(root));
    }

    #[test]
    /// Removing a child resets its layout and frees it for reinsertion.
    ///
    /// # Panics
    /// Panics if the removed child keeps its owner or layout.
    fn remove_resets_child() {
        let mut tree = LayoutTree::new();
        let (root, middle, _leaf) = chain(&mut tree);
        tree.node_mut(middle).layout.dimensions = [3.0, 4.0];
        tree.remove_child(root, middle);
        assert_eq!(tree.owner(middle), None);
        assert_eq!(tree.layout(middle), &LayoutResults::default());
        assert_eq!(tree.child_count(root), 0);
        tree.add_child(root, middle);
        assert_eq!(tree.owner(middle), Some(root));
    }

    #[test]
    #[should_panic(expected = "already has an owner")]
    /// A node cannot be inserted under two owners.
    ///
    /// # Panics
    /// Panics when the node is inserted a second time.
    fn double_insert_panics() {
        let mut tree = LayoutTree::new();
        let (root, middle, _leaf) = chain(&mut tree);
        tree.add_child(root, middle);
    }

    #[test]
    #[should_panic(expected = "cannot have children")]
    /// Measured nodes refuse children.
    ///
    /// # Panics
    /// Panics when a child is added to a measured node.
    fn measured_node_rejects_children() {
        let mut tree = LayoutTree::new();
        let leaf = tree.new_node();
        let child = tree.new_node();
        let measure: MeasureFunc = Arc::new(|_, _, _, _, _| Size::default());
        tree.set_measure_func(leaf, Some(measure));
        tree.add_child(leaf, child);
    }

    #[test]
    /// A clone shares children until it is mutated, then owns private copies.
    ///
    /// # Panics
    /// Panics if the original tree observes the clone's mutation.
    fn clone_copies_children_on_write() {
        let mut tree = LayoutTree::new();
        let (root, middle, _leaf) = chain(&mut tree);
        let copy = tree.clone_node(root);
        assert_eq!(tree.children(copy), &[middle]);
        assert_eq!(tree.owner(middle), Some(root));
        let extra = tree.new_node();
        tree.add_child(copy, extra);
        let copied_middle = tree.child(copy, 0);
        assert_ne!(copied_middle, Some(middle));
        assert_eq!(copied_middle.and_then(|child| tree.owner(child)), Some(copy));
        assert_eq!(tree.children(root), &[middle]);
        assert_eq!(tree.owner(middle), Some(root));
    }

    #[test]
    /// Recursive free returns every owned slot to the arena.
    ///
    /// # Panics
    /// Panics if any node of the subtree stays alive.
    fn free_recursive_releases_subtree() {
        let mut tree = LayoutTree::new();
        let (root, middle, leaf) = chain(&mut tree);
        tree.free_recursive(middle);
        assert!(tree.contains(root));
        assert!(!tree.contains(middle));
        assert!(!tree.contains(leaf));
        assert_eq!(tree.child_count(root), 0);
        let reused = tree.new_node();
        assert!(reused == middle || reused == leaf);
    }

    #[test]
    #[should_panic(expected = "still has children")]
    /// Freeing a node with children is a usage error.
    ///
    /// # Panics
    /// Panics when the node still has children.
    fn free_with_children_panics() {
        let mut tree = LayoutTree::new();
        let (root, _middle, _leaf) = chain(&mut tree);
        tree.free(root);
    }

    #[test]
    #[should_panic(expected = "already freed")]
    /// A freed slot cannot be released a second time.
    ///
    /// # Panics
    /// Panics when the node is freed twice.
    fn double_free_panics() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.free(node);
        tree.free(node);
    }

    #[test]
    /// Freeing once hands each slot to exactly one new node.
    ///
    /// # Panics
    /// Panics if two new nodes share a slot.
    fn freed_slot_is_reused_once() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.free(node);
        let first = tree.new_node();
        let second = tree.new_node();
        assert_ne!(first, second);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    /// A node dirtied from below still dirties its clean children when it is marked itself.
    ///
    /// # Panics
    /// Panics if a clean descendant survives a dirty mark on its ancestor.
    fn upward_dirty_node_still_walks_children() {
        let mut tree = LayoutTree::new();
        let (root, middle, leaf) = chain(&mut tree);
        let sibling = tree.new_node();
        tree.add_child(middle, sibling);
        clear_dirty(&mut tree, &[root, middle, leaf, sibling]);

        tree.mark_dirty(leaf);
        assert!(tree.is_dirty(middle));
        assert!(!tree.is_dirty(sibling));

        tree.mark_dirty(root);
        assert!(tree.is_dirty(sibling));
    }

    #[test]
    /// Changing the node type dirties the node; setting the same type does not.
    ///
    /// # Panics
    /// Panics if the dirty flag does not follow the node type.
    fn node_type_marks_dirty_on_change() {
        let mut tree = LayoutTree::new();
        let (root, middle, leaf) = chain(&mut tree);
        clear_dirty(&mut tree, &[root, middle, leaf]);
        tree.set_node_type(leaf, NodeType::Default);
        assert!(!tree.is_dirty(root));
        tree.set_node_type(leaf, NodeType::Text);
        assert!(tree.is_dirty(leaf));
        assert!(tree.is_dirty(root));
    }
}
