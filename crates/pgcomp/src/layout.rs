use crate::composer::Composer;
use crate::error::ComposeResult;
use serde::{Deserialize, Serialize};

/// Capacity plan for a [`Composer`].
///
/// Mirrors the arguments of [`Composer::new`] so capacity hints can live in
/// configuration instead of code:
///
/// ```toml
/// args = 1
/// exprs = 0
/// children = [4, 3]
/// ```
///
/// All fields default to zero / empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Arguments reserved ahead of the root's expressions (`$1..$args`).
    pub args: usize,
    /// Expression capacity of the root.
    pub exprs: usize,
    /// Capacity of each pooled child, in vending order.
    pub children: Vec<usize>,
}

impl Layout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a layout from TOML.
    pub fn from_toml_str(s: &str) -> ComposeResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Set the reserved argument count.
    pub fn with_args(mut self, args: usize) -> Self {
        self.args = args;
        self
    }

    /// Set the root expression capacity.
    pub fn with_exprs(mut self, exprs: usize) -> Self {
        self.exprs = exprs;
        self
    }

    /// Append one pooled child with the given capacity.
    pub fn with_child(mut self, capacity: usize) -> Self {
        self.children.push(capacity);
        self
    }

    /// Replace the pooled children.
    pub fn with_children(mut self, capacities: impl IntoIterator<Item = usize>) -> Self {
        self.children = capacities.into_iter().collect();
        self
    }

    /// Allocate a composer with this layout.
    pub fn build(&self) -> Composer {
        Composer::with_layout(self)
    }
}
