//! The composer tree.
//!
//! A [`Composer`] is a tree of nodes, each accumulating `(key, operator,
//! argument)` triples for one fragment of a statement (a `SET` list, a
//! `WHERE` list, ...). All nodes live in one arena owned by the composer and
//! are addressed by [`NodeId`]; a node's parent link is a plain id, never an
//! owning handle.
//!
//! Placeholder numbers are anchored at the root: `$N = root.diff + root.cursor`.
//! Advancing a child's cursor also advances its parent's, so walking children
//! one after another yields consecutive numbers.
//!
//! # Example
//! ```ignore
//! use pgcomp::{Composer, NullString, operator};
//!
//! let mut comp = Composer::new(1, 1, &[1, 3]);
//! let update = comp.compose(&[]);
//! let filter = comp.compose(&[]);
//!
//! comp.add_arg(10_i64); // $1, LIMIT
//!
//! comp.at(update).add_expr("u.username", operator::E, "johnsnow");
//! comp.at(update).add_expr("u.last_name", operator::E, NullString::null()); // dropped
//! comp.at(filter).add_expr("u.id", operator::E, 1_i64);
//!
//! let mut set = String::new();
//! let mut node = comp.at(update);
//! while node.next() {
//!     set.push_str(if node.first() { "SET " } else { ", " });
//!     set.push_str(&format!("{} {} {}", node.key()?, node.oper()?, node.placeholder()?));
//! }
//! // set == "SET u.username = $2"
//! ```

mod cursor;
mod node;

pub use node::{NodeMut, NodeRef};

use crate::arg::{Arg, ArgList};
use crate::filter::{self, Admission};
use crate::layout::Layout;
use crate::value::Classify;
use std::borrow::Cow;
use std::fmt;

/// Handle of a node inside a [`Composer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every composer.
    pub const ROOT: NodeId = NodeId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node state. `keys`, `operators` and `arguments` are parallel and only
/// ever grow together.
#[derive(Debug)]
struct Node {
    keys: Vec<Cow<'static, str>>,
    operators: Vec<Cow<'static, str>>,
    arguments: Vec<Arg>,
    /// Values added with `add_arg`, not tied to an expression.
    extra_args: Vec<Arg>,
    /// Number of consumed expressions (also bumped by direct children).
    cursor: usize,
    /// Argument capacity reserved at construction; fixed afterwards.
    diff: usize,
    /// Number of pooled children already vended.
    composed: usize,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(parent: Option<NodeId>, args: usize, exprs: usize) -> Self {
        Self {
            keys: Vec::with_capacity(exprs),
            operators: Vec::with_capacity(exprs),
            arguments: Vec::with_capacity(exprs),
            extra_args: Vec::with_capacity(args),
            cursor: 0,
            diff: args,
            composed: 0,
            children: Vec::new(),
            parent,
        }
    }

    fn arg_count(&self) -> usize {
        self.extra_args.len() + self.arguments.len()
    }
}

/// Tree of conditional expression accumulators sharing one placeholder
/// numbering.
#[derive(Debug)]
pub struct Composer {
    nodes: Vec<Node>,
}

impl Composer {
    /// Allocate a composer whose root reserves `args` arguments and `exprs`
    /// expressions, with one pooled child per entry of `child_exprs`.
    ///
    /// Each entry is used as both the argument and the expression capacity
    /// of its child. Capacities are hints: appends beyond them still succeed.
    pub fn new(args: usize, exprs: usize, child_exprs: &[usize]) -> Self {
        let mut comp = Composer {
            nodes: Vec::with_capacity(1 + child_exprs.len()),
        };
        comp.alloc(None, args, exprs, child_exprs);
        comp
    }

    /// Allocate a composer from a capacity [`Layout`].
    pub fn with_layout(layout: &Layout) -> Self {
        Self::new(layout.args, layout.exprs, &layout.children)
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Total number of nodes ever allocated, including discarded pool entries.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mutable view of a node.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this composer.
    pub fn at(&mut self, id: NodeId) -> NodeMut<'_> {
        self.check(id);
        NodeMut::new(self, id)
    }

    /// Read-only view of a node.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this composer.
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        self.check(id);
        NodeRef::new(self, id)
    }

    /// Vend the root's next child. See [`NodeMut::compose`].
    pub fn compose(&mut self, child_exprs: &[usize]) -> NodeId {
        self.compose_under(NodeId::ROOT, child_exprs)
    }

    /// Add a static argument to the root. See [`NodeMut::add_arg`].
    pub fn add_arg<T>(&mut self, value: T)
    where
        T: tokio_postgres::types::ToSql + Send + Sync + 'static,
    {
        self.push_arg(NodeId::ROOT, Arg::new(value));
    }

    /// Add a conditional expression to the root. See [`NodeMut::add_expr`].
    pub fn add_expr<K, O, V>(&mut self, key: K, operator: O, value: V)
    where
        K: Into<Cow<'static, str>>,
        O: Into<Cow<'static, str>>,
        V: Classify,
    {
        self.expr(NodeId::ROOT, key.into(), operator.into(), value);
    }

    /// Arguments of the root and its direct children. See [`NodeRef::args`].
    pub fn args(&self) -> ArgList {
        self.args_of(NodeId::ROOT)
    }

    /// Number of expressions recorded on the root itself.
    pub fn len(&self) -> usize {
        self.nodes[0].keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset the cursor of every node, so the whole tree can be walked again
    /// and produce the same placeholders.
    pub fn rewind(&mut self) {
        for node in &mut self.nodes {
            node.cursor = 0;
        }
    }

    // ==================== Tree & pool ====================

    fn check(&self, id: NodeId) {
        assert!(
            id.0 < self.nodes.len(),
            "node {id} does not belong to this composer ({} nodes)",
            self.nodes.len()
        );
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn alloc(
        &mut self,
        parent: Option<NodeId>,
        args: usize,
        exprs: usize,
        child_exprs: &[usize],
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(parent, args, exprs));
        let children = self.alloc_children(id, child_exprs);
        self.node_mut(id).children = children;
        id
    }

    fn alloc_children(&mut self, parent: NodeId, child_exprs: &[usize]) -> Vec<NodeId> {
        child_exprs
            .iter()
            .map(|&cap| self.alloc(Some(parent), cap, cap, &[]))
            .collect()
    }

    pub(crate) fn compose_under(&mut self, parent: NodeId, child_exprs: &[usize]) -> NodeId {
        let node = self.node(parent);
        let pooled = node.children.get(node.composed).copied();

        let child = match pooled {
            Some(child) => {
                if !child_exprs.is_empty() {
                    // Previously pooled grandchildren are discarded, not reused.
                    let replaced = self.node(child).children.len();
                    let fresh = self.alloc_children(child, child_exprs);
                    self.node_mut(child).children = fresh;

                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        target: "pgcomp",
                        parent = %parent,
                        child = %child,
                        replaced,
                        capacities = ?child_exprs,
                        "pooled child re-capacitated"
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = replaced;
                }

                #[cfg(feature = "tracing")]
                tracing::trace!(target: "pgcomp", parent = %parent, child = %child, "vended pooled child");
                child
            }
            None => {
                let child = self.alloc(Some(parent), 0, 0, child_exprs);
                self.node_mut(parent).children.push(child);

                #[cfg(feature = "tracing")]
                tracing::trace!(target: "pgcomp", parent = %parent, child = %child, "allocated child");
                child
            }
        };

        self.node_mut(parent).composed += 1;
        child
    }

    // ==================== Accumulation ====================

    pub(crate) fn push_arg(&mut self, id: NodeId, arg: Arg) {
        self.node_mut(id).extra_args.push(arg);
    }

    pub(crate) fn expr<V: Classify>(
        &mut self,
        id: NodeId,
        key: Cow<'static, str>,
        operator: Cow<'static, str>,
        value: V,
    ) {
        match filter::admit(value.classify()) {
            Admission::Record(arg) => self.record(id, key, operator, arg),
            Admission::Expand(args) => {
                for arg in args {
                    self.record(id, key.clone(), operator.clone(), arg);
                }
            }
            Admission::Drop(reason) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    target: "pgcomp",
                    node = %id,
                    key = %key,
                    operator = %operator,
                    %reason,
                    "expression dropped"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = (key, operator, reason);
            }
        }
    }

    fn record(&mut self, id: NodeId, key: Cow<'static, str>, operator: Cow<'static, str>, arg: Arg) {
        let node = self.node_mut(id);
        node.keys.push(key);
        node.operators.push(operator);
        node.arguments.push(arg);
    }

    // ==================== Flattening ====================

    /// Own arguments (static first, then expression arguments), followed by
    /// the same for each direct child in creation order. Grandchildren are
    /// not included.
    pub(crate) fn args_of(&self, id: NodeId) -> ArgList {
        let node = self.node(id);
        let children = node.children.iter().map(|&c| self.node(c));

        let capacity = node.arg_count() + children.clone().map(Node::arg_count).sum::<usize>();
        let mut args = ArgList::with_capacity(capacity);

        args.extend_from_slice(&node.extra_args);
        args.extend_from_slice(&node.arguments);
        for child in children {
            args.extend_from_slice(&child.extra_args);
            args.extend_from_slice(&child.arguments);
        }
        args
    }
}

#[cfg(test)]
mod tests;
