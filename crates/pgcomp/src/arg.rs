//! Argument storage using Arc for clone-friendly composers.

use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A single driver-ready argument.
///
/// Cloning an `Arg` shares the underlying value, so flattening a tree into an
/// [`ArgList`] never copies parameter data.
#[derive(Clone)]
pub struct Arg(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Arg {
    /// Create a new argument from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Arg(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

// `ToSql: Debug`, so the wrapped value is always printable.
impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.0, f)
    }
}

/// Flattened, ordered arguments of a composer node.
#[derive(Clone, Debug, Default)]
pub struct ArgList {
    args: Vec<Arg>,
}

impl ArgList {
    /// Create a new empty argument list.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            args: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn extend_from_slice(&mut self, args: &[Arg]) {
        self.args.extend_from_slice(args);
    }

    /// Get the argument count.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Get the argument at `idx` (0-based; `$1` is index 0 for a root node).
    pub fn get(&self, idx: usize) -> Option<&Arg> {
        self.args.get(idx)
    }

    /// Iterate over the arguments in placeholder order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.args.iter()
    }

    /// Get all arguments as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|a| a.as_ref()).collect()
    }

    /// Consume the list, returning the underlying vector.
    pub fn into_vec(self) -> Vec<Arg> {
        self.args
    }
}

impl<'a> IntoIterator for &'a ArgList {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

impl IntoIterator for ArgList {
    type Item = Arg;
    type IntoIter = std::vec::IntoIter<Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}
