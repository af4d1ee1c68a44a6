//! # pgcomp
//!
//! Conditional SQL fragment composer for PostgreSQL.
//!
//! A [`Composer`] collects `(key, operator, value)` triples for the `SET` and
//! `WHERE` parts of a statement, silently skipping values that should not
//! appear (absent, invalid nullable, zero timestamps, ...), and hands out
//! `$N` placeholders that stay consecutive across sibling fragments.
//!
//! ## Features
//!
//! - **Filtered expressions**: `add_expr` records a value only if the
//!   [`filter`] admits it; sequences expand into one expression per element
//! - **Pooled children**: capacities for sub-fragments are reserved up front
//!   and vended in order by `compose`
//! - **Root-anchored placeholders**: `$N` continues after the arguments the
//!   root reserved (e.g. a `LIMIT $1`)
//! - **Driver-ready arguments**: [`ArgList::as_refs`] feeds `tokio-postgres`
//!   directly
//!
//! ## Example
//!
//! ```ignore
//! use pgcomp::{Composer, NullInt64, operator};
//!
//! let mut comp = Composer::new(1, 0, &[3, 2]);
//! let set = comp.compose(&[]);
//! let filter = comp.compose(&[]);
//! comp.add_arg(10_i64);
//!
//! comp.at(set).add_expr("first_name", operator::E, "John");
//! comp.at(filter).add_expr("id", operator::E, 1_i64);
//! comp.at(filter).add_expr("age", operator::GT, NullInt64::null()); // skipped
//!
//! let mut sql = String::from("UPDATE users SET ");
//! let mut node = comp.at(set);
//! while node.next() {
//!     if !node.first() {
//!         sql.push_str(", ");
//!     }
//!     sql.push_str(&format!("{} {} {}", node.key()?, node.oper()?, node.placeholder()?));
//! }
//! // ...
//! let rows = client.query(&sql, &comp.args().as_refs()).await?;
//! ```

pub mod arg;
pub mod composer;
pub mod error;
pub mod filter;
pub mod layout;
pub mod operator;
pub mod value;

pub use arg::{Arg, ArgList};
pub use composer::{Composer, NodeId, NodeMut, NodeRef};
pub use error::{ComposeError, ComposeResult};
pub use filter::{Admission, DropReason, admit};
pub use layout::Layout;
pub use operator::{Operator, SortOrder};
pub use value::{
    Appear, Candidate, Classify, Null, NullBool, NullFloat64, NullInt32, NullInt64, NullScalar,
    NullString, Nullable, NullableValue, Raw, Timestamp,
};

// Re-export the driver types argument lists are built from.
pub use tokio_postgres;
