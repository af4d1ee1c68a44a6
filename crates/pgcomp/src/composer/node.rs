//! Views over a single node of a [`Composer`].

use super::{Composer, NodeId};
use crate::arg::{Arg, ArgList};
use crate::error::ComposeResult;
use crate::value::Classify;
use std::borrow::Cow;
use tokio_postgres::types::ToSql;

/// Read-only view of a node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Composer,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(super) fn new(tree: &'a Composer, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Number of expressions recorded on this node (children not counted).
    pub fn len(&self) -> usize {
        self.tree.node(self.id).keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor position (0 before the first `next`).
    pub fn cursor(&self) -> usize {
        self.tree.node(self.id).cursor
    }

    /// True right after the first successful `next` of an iteration.
    pub fn first(&self) -> bool {
        self.tree.first_of(self.id)
    }

    /// Key of the expression under the cursor.
    pub fn key(&self) -> ComposeResult<&'a str> {
        self.tree.key_of(self.id)
    }

    /// Operator of the expression under the cursor.
    pub fn oper(&self) -> ComposeResult<&'a str> {
        self.tree.oper_of(self.id)
    }

    /// Placeholder (`$N`) of the expression under the cursor.
    pub fn placeholder(&self) -> ComposeResult<String> {
        self.tree.placeholder_of(self.id)
    }

    /// This node's arguments followed by those of its direct children.
    ///
    /// Deeper descendants are not flattened; call `args` on them separately.
    pub fn args(&self) -> ArgList {
        self.tree.args_of(self.id)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.tree.node(self.id).parent
    }

    /// Pooled children, vended or not, in creation order.
    pub fn children(&self) -> &'a [NodeId] {
        &self.tree.node(self.id).children
    }

    /// Number of children vended by `compose` so far.
    pub fn composed(&self) -> usize {
        self.tree.node(self.id).composed
    }
}

/// Mutable view of a node, obtained from [`Composer::at`].
#[derive(Debug)]
pub struct NodeMut<'a> {
    tree: &'a mut Composer,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    pub(super) fn new(tree: &'a mut Composer, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Reborrow as a read-only view.
    pub fn as_ref(&self) -> NodeRef<'_> {
        NodeRef::new(&*self.tree, self.id)
    }

    /// Add a static argument. It is never filtered.
    pub fn add_arg<T: ToSql + Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.tree.push_arg(self.id, Arg::new(value));
        self
    }

    /// Add an expression if `value` passes the [filter](crate::filter).
    ///
    /// Sequences record one expression per element, all sharing `key` and
    /// `operator`.
    pub fn add_expr<K, O, V>(&mut self, key: K, operator: O, value: V) -> &mut Self
    where
        K: Into<Cow<'static, str>>,
        O: Into<Cow<'static, str>>,
        V: Classify,
    {
        self.tree.expr(self.id, key.into(), operator.into(), value);
        self
    }

    /// Vend the next pooled child, or allocate a new one once the pool is
    /// exhausted.
    ///
    /// A non-empty `child_exprs` replaces the vended child's own children with
    /// fresh ones of those capacities.
    pub fn compose(&mut self, child_exprs: &[usize]) -> NodeId {
        self.tree.compose_under(self.id, child_exprs)
    }

    /// Move the cursor to the next expression. Returns false at the end.
    pub fn next(&mut self) -> bool {
        self.tree.next_of(self.id)
    }

    /// Set this node's cursor back to 0. The parent's cursor is untouched.
    pub fn reset(&mut self) {
        self.tree.reset_of(self.id)
    }

    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_ref().is_empty()
    }

    pub fn first(&self) -> bool {
        self.tree.first_of(self.id)
    }

    pub fn key(&self) -> ComposeResult<&str> {
        self.tree.key_of(self.id)
    }

    pub fn oper(&self) -> ComposeResult<&str> {
        self.tree.oper_of(self.id)
    }

    pub fn placeholder(&self) -> ComposeResult<String> {
        self.tree.placeholder_of(self.id)
    }

    pub fn args(&self) -> ArgList {
        self.tree.args_of(self.id)
    }
}
