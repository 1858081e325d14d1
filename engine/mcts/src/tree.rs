//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices. A tree lives for one search and is
//! dropped as a whole afterwards.

use engine_core::Action;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<P> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<P>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl<P> MctsTree<P> {
    /// Create a new tree rooted at the given position.
    pub fn new(root_position: P) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_position)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<P> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<P> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode<P>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select the child of a node with the highest PUCT score.
    ///
    /// Children are kept in ascending action order and only a strictly higher
    /// score replaces the current best, so ties go to the lowest action.
    pub fn select_child(&self, node_id: NodeId, c_puct: f32, default_q: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        // Pre-compute sqrt once instead of per-child comparison
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        let mut best: Option<(f32, NodeId)> = None;
        for &(_, id) in &node.children {
            let score = self.get(id).ucb_score(parent_visits_sqrt, c_puct, default_q);
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, id)),
            }
        }
        best.map(|(_, id)| id)
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, action: Action, prior: f32) -> NodeId {
        let child_id = self.allocate(MctsNode::new_child(parent_id, action, prior));

        // Add to parent's children
        self.get_mut(parent_id).children.push((action, child_id));

        child_id
    }

    /// Backpropagate a leaf value along the path taken, leaf last.
    ///
    /// `value` is from the perspective of the side to move at the leaf. Every
    /// node on the path gets one visit; the value flips sign once per level
    /// because the side to move alternates.
    pub fn backpropagate(&mut self, path: &[NodeId], value: f32) {
        let mut current_value = value;

        for &node_id in path.iter().rev() {
            let node = self.get_mut(node_id);
            node.visit_count += 1;
            node.value_sum += current_value;

            // Negate for opponent's perspective
            current_value = -current_value;
        }
    }

    /// Get the most visited root action, lowest action on ties.
    /// Returns (action, visit_count) or None if root has no children.
    pub fn best_action(&self) -> Option<(Action, u32)> {
        let root = self.get(self.root);
        let mut best: Option<(Action, u32)> = None;
        for &(action, id) in &root.children {
            let visits = self.get(id).visit_count;
            match best {
                Some((_, best_visits)) if visits <= best_visits => {}
                _ => best = Some((action, visits)),
            }
        }
        best
    }

    /// Visit counts of the root's children as (action, N) pairs.
    pub fn root_visits(&self) -> Vec<(Action, u32)> {
        let root = self.get(self.root);
        root.children
            .iter()
            .map(|&(action, id)| (action, self.get(id).visit_count))
            .collect()
    }

    /// The policy target: N(child) / sum N(children) over the full action space.
    /// All zeros when no child has been visited.
    pub fn root_policy(&self, num_actions: usize) -> Vec<f32> {
        let mut policy = vec![0.0; num_actions];
        let visits = self.root_visits();

        let total: u32 = visits.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return policy;
        }

        for (action, n) in visits {
            policy[action as usize] = n as f32 / total as f32;
        }
        policy
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        // Children are always allocated after their parent, so one forward
        // pass over the arena sees every parent's depth first.
        let mut depth = vec![0u32; self.nodes.len()];
        let mut max_depth = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.parent.is_some() && node.position.is_some() {
                depth[i] = depth[node.parent.0 as usize] + 1;
                max_depth = max_depth.max(depth[i]);
            }
        }
        max_depth
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    /// Deepest materialised node
    pub max_depth: u32,
}
