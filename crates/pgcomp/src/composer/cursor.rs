use super::{Composer, NodeId};
use crate::error::{ComposeError, ComposeResult};

impl Composer {
    /// Advance `id` by one expression. The parent (one level only) is bumped
    /// as well, which is what keeps root-anchored placeholders consecutive.
    pub(crate) fn next_of(&mut self, id: NodeId) -> bool {
        let node = self.node_mut(id);
        if node.cursor >= node.keys.len() {
            return false;
        }
        node.cursor += 1;

        if let Some(parent) = node.parent {
            self.node_mut(parent).cursor += 1;
        }
        true
    }

    /// Rewind `id` only; the parent keeps its position.
    pub(crate) fn reset_of(&mut self, id: NodeId) {
        self.node_mut(id).cursor = 0;
    }

    /// Index of the expression under the cursor.
    fn current(&self, id: NodeId) -> ComposeResult<usize> {
        let node = self.node(id);
        if (1..=node.keys.len()).contains(&node.cursor) {
            Ok(node.cursor - 1)
        } else {
            Err(ComposeError::cursor_out_of_range(node.cursor, node.keys.len()))
        }
    }

    pub(crate) fn key_of(&self, id: NodeId) -> ComposeResult<&str> {
        let idx = self.current(id)?;
        Ok(&self.node(id).keys[idx])
    }

    pub(crate) fn oper_of(&self, id: NodeId) -> ComposeResult<&str> {
        let idx = self.current(id)?;
        Ok(&self.node(id).operators[idx])
    }

    pub(crate) fn first_of(&self, id: NodeId) -> bool {
        self.node(id).cursor == 1
    }

    /// `$N` for the expression under the cursor of `id`, numbered by the root:
    /// `N = root.diff + root.cursor`.
    pub(crate) fn placeholder_of(&self, id: NodeId) -> ComposeResult<String> {
        let node = self.node(id);
        if node.cursor == 0 {
            return Err(ComposeError::cursor_out_of_range(0, node.keys.len()));
        }

        let mut root = node;
        while let Some(parent) = root.parent {
            root = self.node(parent);
        }
        Ok(format!("${}", root.diff + root.cursor))
    }
}
