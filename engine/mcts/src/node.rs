//! MCTS tree node representation.
//!
//! Each node represents a position reached by taking an action from the parent.
//! Nodes store visit statistics used for PUCT selection and the policy target.

use engine_core::Action;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode<P> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Action that led to this node from parent
    pub action: Action,

    /// Position at this node. Children are created without one and get it
    /// the first time selection walks into them.
    pub position: Option<P>,

    /// Number of times this node has been visited (N)
    pub visit_count: u32,

    /// Sum of values backpropagated through this node (W), from the
    /// perspective of the side to move at this node.
    pub value_sum: f32,

    /// Prior probability P(s,a) assigned at the parent's expansion.
    pub prior: f32,

    /// Whether the position is game-over
    pub is_terminal: bool,

    /// Outcome for the side to move here (only valid if is_terminal)
    pub terminal_value: f32,

    /// Set once the evaluator has been queried and children created
    pub expanded: bool,

    /// Children as (action, NodeId) pairs in ascending action order.
    pub children: Vec<(Action, NodeId)>,
}

impl<P> MctsNode<P> {
    /// Create a new root node.
    pub fn new_root(position: P) -> Self {
        Self {
            parent: NodeId::NONE,
            action: 0,
            position: Some(position),
            visit_count: 0,
            value_sum: 0.0,
            prior: 1.0, // Root has prior 1.0
            is_terminal: false,
            terminal_value: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Create a new, not yet materialised child node.
    pub fn new_child(parent: NodeId, action: Action, prior: f32) -> Self {
        Self {
            parent,
            action,
            position: None,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            is_terminal: false,
            terminal_value: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Calculate mean value W/N from this node's own perspective.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// PUCT score of this node as seen from its parent:
    /// Q(s,a) + c_puct * P(s,a) * sqrt(N_parent) / (1 + N(s,a))
    ///
    /// The stored value is from the child's side to move, which is the
    /// parent's opponent, so Q is the negated mean. An unvisited child scores
    /// `default_q` instead.
    ///
    /// Takes pre-computed sqrt(parent_visits) to avoid redundant sqrt calls
    /// when comparing multiple children.
    #[inline]
    pub fn ucb_score(&self, parent_visits_sqrt: f32, c_puct: f32, default_q: f32) -> f32 {
        let q = if self.visit_count == 0 {
            default_q
        } else {
            -self.mean_value()
        };
        let u = c_puct * self.prior * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        q + u
    }

    /// Check if this is a leaf node (not expanded or terminal).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = MctsNode::new_root(7u32);

        assert!(node.parent.is_none());
        assert_eq!(node.visit_count, 0);
        assert!((node.prior - 1.0).abs() < 1e-6);
        assert!(!node.is_terminal);
        assert!(!node.expanded);
        assert!(node.children.is_empty());
        assert_eq!(node.position, Some(7));
    }

    #[test]
    fn test_new_child_is_lazy() {
        let node: MctsNode<u32> = MctsNode::new_child(NodeId(0), 12, 0.25);
        assert_eq!(node.parent, NodeId(0));
        assert_eq!(node.action, 12);
        assert!(node.position.is_none());
    }

    #[test]
    fn test_mean_value() {
        let mut node = MctsNode::new_root(());

        // Unvisited
        assert!((node.mean_value()).abs() < 1e-6);

        // After visits
        node.visit_count = 4;
        node.value_sum = 2.0;
        assert!((node.mean_value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ucb_score() {
        let mut node: MctsNode<()> = MctsNode::new_child(NodeId(0), 0, 0.5);
        node.visit_count = 10;
        node.value_sum = 5.0; // Q from child's perspective = 0.5

        // UCB = -0.5 + 1.0 * 0.5 * 10 / 11 ≈ -0.0455
        let ucb = node.ucb_score(10.0, 1.0, 0.0);
        assert!((ucb - (-0.0455)).abs() < 0.01);
    }

    #[test]
    fn test_ucb_score_unvisited_uses_default_q() {
        let node: MctsNode<()> = MctsNode::new_child(NodeId(0), 0, 0.5);

        // U = 1.0 * 0.5 * 4 / 1 = 2.0
        assert!((node.ucb_score(4.0, 1.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((node.ucb_score(4.0, 1.0, -1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_leaf() {
        let mut node = MctsNode::new_root(());

        // Initially a leaf (not expanded)
        assert!(node.is_leaf());

        node.expanded = true;
        node.children.push((0, NodeId(1)));
        assert!(!node.is_leaf());

        // Terminal nodes are always leaves
        node.is_terminal = true;
        assert!(node.is_leaf());
    }
}
