//! Expression dependency graph with a post-dominator tree.
//!
//! Nodes live in an arena in topological order (inputs before consumers, the
//! root last) and refer to each other by [`NodeId`]. A node's dominator parent
//! is the closest node that lies on every path from it to the root: the least
//! common ancestor, in the dominator tree, of all of its consumers.

use std::collections::HashMap;
use std::sync::Arc;

use dfpat_ir::{Expr, ExprKey, ExprKind};
use tracing::trace;

/// Index of a node in a [`DependencyGraph`]; also its topological position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub expr: Arc<Expr>,
    /// Nodes this one reads, in evaluation order (a call's callee first).
    pub inputs: Vec<NodeId>,
    /// Nodes that read this one.
    pub outputs: Vec<NodeId>,
    /// Depth in the post-dominator tree; the root has depth 0.
    pub depth: usize,
    pub dominator_parent: Option<NodeId>,
    /// Nodes whose dominator parent is this node.
    pub dominator_children: Vec<NodeId>,
}

/// Dependency graph of every expression reachable from a root.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<ExprKey, NodeId>,
}

impl DependencyGraph {
    #[tracing::instrument(skip_all, fields(root = root.id))]
    pub fn new(root: &Arc<Expr>) -> Self {
        let order = root.toposort();
        let index: HashMap<ExprKey, NodeId> =
            order.iter().enumerate().map(|(i, e)| (ExprKey(e.clone()), NodeId(i))).collect();

        let mut nodes: Vec<GraphNode> = order
            .into_iter()
            .map(|expr| GraphNode {
                expr,
                inputs: Vec::new(),
                outputs: Vec::new(),
                depth: 0,
                dominator_parent: None,
                dominator_children: Vec::new(),
            })
            .collect();

        for i in 0..nodes.len() {
            let inputs: Vec<NodeId> =
                nodes[i].expr.children().into_iter().map(|c| index[&ExprKey(c.clone())]).collect();
            for &input in &inputs {
                nodes[input.0].outputs.push(NodeId(i));
            }
            nodes[i].inputs = inputs;
        }

        let mut graph = Self { nodes, index };
        graph.build_post_dominator_tree();
        trace!(nodes = graph.nodes.len(), "dependency graph built");
        graph
    }

    /// Consumers are always later in topological order, so walking backwards
    /// sees every consumer's dominator parent before the node itself.
    fn build_post_dominator_tree(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            if self.nodes[i].outputs.is_empty() {
                self.nodes[i].depth = 0;
                self.nodes[i].dominator_parent = None;
                continue;
            }
            let parent = self.least_common_ancestor_of(&self.nodes[i].outputs);
            self.nodes[i].depth = parent.map_or(1, |p| self.nodes[p.0].depth + 1);
            self.nodes[i].dominator_parent = parent;
            if let Some(p) = parent {
                self.nodes[p.0].dominator_children.push(NodeId(i));
            }
        }
    }

    fn least_common_ancestor_of(&self, nodes: &[NodeId]) -> Option<NodeId> {
        let (&first, rest) = nodes.split_first()?;
        rest.iter().try_fold(first, |acc, &n| self.least_common_ancestor(acc, n))
    }

    fn least_common_ancestor(&self, mut lhs: NodeId, mut rhs: NodeId) -> Option<NodeId> {
        while lhs != rhs {
            let (ld, rd) = (self.nodes[lhs.0].depth, self.nodes[rhs.0].depth);
            if ld < rd {
                rhs = self.nodes[rhs.0].dominator_parent?;
            } else if ld > rd {
                lhs = self.nodes[lhs.0].dominator_parent?;
            } else {
                lhs = self.nodes[lhs.0].dominator_parent?;
                rhs = self.nodes[rhs.0].dominator_parent?;
            }
        }
        Some(lhs)
    }

    pub fn root(&self) -> Option<&Arc<Expr>> {
        self.nodes.last().map(|n| &n.expr)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_id(&self, expr: &Arc<Expr>) -> Option<NodeId> {
        self.index.get(&ExprKey(expr.clone())).copied()
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    /// Node wrapping `expr`; panics if `expr` is not reachable from the root.
    pub fn expect_node(&self, expr: &Arc<Expr>) -> &GraphNode {
        match self.node_id(expr) {
            Some(id) => self.node(id),
            None => panic!("expression {expr} (id {}) is not part of the dependency graph", expr.id),
        }
    }

    /// Nodes in topological order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Whether `expr` is the callee position of the call `consumer`.
    pub(crate) fn is_callee_of(expr: &Arc<Expr>, consumer: &Arc<Expr>) -> bool {
        matches!(consumer.kind(), ExprKind::Call { op, .. } if op.id == expr.id)
    }
}
