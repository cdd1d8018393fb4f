//! Arena-allocated MCTS search tree.
//!
//! Nodes live in a vector of slots and refer to each other through `NodeId`
//! handles. A child is owned by exactly one parent; the parent handle stored
//! in a child is a back-reference used for the exploration bonus and for
//! backpropagation. Released nodes leave an empty slot that is recycled by
//! later allocations. Each slot carries a generation that is bumped on
//! release, so a handle to a released node stays invalid after its slot is
//! reused.
//!
//! Subtree release and backpropagation are iterative, so tree depth is
//! bounded only by memory.

use crate::board::Move;
use crate::constants::ROOT_PRIOR;

/// Handle to a node in a `SearchTree`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct TreeNode {
    /// Parent handle, `None` for the root
    parent: Option<NodeId>,
    /// Children in creation order, keyed by the move leading to them
    children: Vec<(Move, NodeId)>,
    /// Number of backpropagated updates
    visits: u32,
    /// Mean of all backpropagated values, from the view of the player to move
    q: f64,
    /// Exploration bonus from the last `value` call
    u: f64,
    /// Prior probability
    p: f64,
}

impl TreeNode {
    fn new(parent: Option<NodeId>, p: f64) -> Self {
        Self {
            parent,
            children: Vec::new(),
            visits: 0,
            q: 0.0,
            u: 0.0,
            p,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[(Move, NodeId)] {
        &self.children
    }

    /// True if the node has not been expanded.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn visits(&self) -> u32 {
        self.visits
    }

    #[inline]
    pub fn q(&self) -> f64 {
        self.q
    }

    #[inline]
    pub fn u(&self) -> f64 {
        self.u
    }

    #[inline]
    pub fn p(&self) -> f64 {
        self.p
    }
}

/// Arena slot. `generation` counts how many nodes this slot has released.
#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

/// The search tree, rooted at the position the engine is searching from.
#[derive(Debug)]
pub struct SearchTree {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the arena grows
    free: Vec<usize>,
    root: NodeId,
    live: usize,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    /// Create a tree holding a single unvisited root.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(TreeNode::new(None, ROOT_PRIOR)),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            live: 1,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Get a node by handle.
    ///
    /// # Panics
    /// Panics if the node has been released, even if its slot now holds
    /// another node.
    pub fn get(&self, id: NodeId) -> &TreeNode {
        match self.slots.get(id.index) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("access to released tree node {id:?}"),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        match self.slots.get_mut(id.index) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("access to released tree node {id:?}"),
        }
    }

    /// True if `id` refers to a node that has not been released.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index)
            .is_some_and(|slot| slot.generation == id.generation && slot.node.is_some())
    }

    fn allocate(&mut self, node: TreeNode) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Child of `node` reached by `action`, if it exists.
    pub fn find_child(&self, node: NodeId, action: Move) -> Option<NodeId> {
        self.get(node)
            .children
            .iter()
            .find(|(m, _)| *m == action)
            .map(|(_, id)| *id)
    }

    /// Add a child for every candidate action not already present.
    ///
    /// Existing children keep their statistics.
    pub fn expand(&mut self, node: NodeId, candidates: &[(Move, f64)]) {
        for &(action, prior) in candidates {
            if self.find_child(node, action).is_some() {
                continue;
            }
            let child = self.allocate(TreeNode::new(Some(node), prior));
            self.get_mut(node).children.push((action, child));
        }
    }

    /// Selection score `Q + u` of a node, caching `u` on the node.
    ///
    /// `u = c_puct * p * sqrt(parent visits) / (1 + visits)`, so the bonus is
    /// zero while the parent is unvisited, and for the root.
    pub fn value(&mut self, node: NodeId, c_puct: f64) -> f64 {
        let parent_visits = self
            .get(node)
            .parent
            .map_or(0, |parent| self.get(parent).visits);

        let n = self.get_mut(node);
        n.u = c_puct * n.p * (parent_visits as f64).sqrt() / (1.0 + n.visits as f64);
        n.q + n.u
    }

    /// Child of `node` with the strictly greatest `value`.
    ///
    /// Ties go to the child created first. `None` if `node` is a leaf.
    pub fn select(&mut self, node: NodeId, c_puct: f64) -> Option<(Move, NodeId)> {
        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;

        for i in 0..self.get(node).children.len() {
            let (action, child) = self.get(node).children[i];
            let value = self.value(child, c_puct);
            if value > best_value {
                best_value = value;
                best = Some((action, child));
            }
        }
        best
    }

    /// Record one leaf evaluation on a single node.
    pub fn update(&mut self, node: NodeId, leaf_value: f64) {
        let n = self.get_mut(node);
        n.visits += 1;
        n.q += (leaf_value - n.q) / n.visits as f64;
    }

    /// Update `node` and all its ancestors, flipping the sign at each step
    /// since players alternate.
    pub fn update_recursive(&mut self, node: NodeId, leaf_value: f64) {
        let mut current = Some(node);
        let mut value = leaf_value;
        while let Some(id) = current {
            self.update(id, value);
            value = -value;
            current = self.get(id).parent;
        }
    }

    /// Root child with the most visits. Ties go to the child created first.
    pub fn most_visited_child(&self, node: NodeId) -> Option<(Move, NodeId)> {
        let mut best: Option<(Move, NodeId, u32)> = None;
        for &(action, child) in &self.get(node).children {
            let visits = self.get(child).visits;
            match best {
                Some((_, _, best_visits)) if visits <= best_visits => {}
                _ => best = Some((action, child, visits)),
            }
        }
        best.map(|(action, child, _)| (action, child))
    }

    /// Make a child of the root the new root, releasing the old root and
    /// every subtree other than the promoted one.
    ///
    /// # Panics
    /// Panics if `child` is not a child of the current root.
    pub fn promote(&mut self, child: NodeId) {
        let old_root = self.root;
        assert_eq!(
            self.get(child).parent,
            Some(old_root),
            "only a child of the root can be promoted"
        );

        self.get_mut(child).parent = None;
        self.get_mut(old_root).children.retain(|(_, id)| *id != child);
        self.root = child;
        self.release(old_root);
    }

    /// Drop the whole tree and start again from a fresh root.
    ///
    /// Slots are kept for reuse, and every old handle is invalidated.
    pub fn reset(&mut self) {
        self.release(self.root);
        self.root = self.allocate(TreeNode::new(None, ROOT_PRIOR));
    }

    /// Release `id` and all its descendants.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let slot = &mut self.slots[id.index];
            if slot.generation != id.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                stack.extend(node.children.iter().map(|(_, child)| *child));
                self.free.push(id.index);
                self.live -= 1;
            }
        }
    }
}
