//! Canonical operator tokens.
//!
//! The composer treats operators as opaque strings; [`Operator`] is only a
//! convenience so callers do not scatter literals. Short and long names for
//! the same comparison resolve to one variant.
//!
//! # Example
//! ```ignore
//! use pgcomp::{Composer, Operator, operator};
//!
//! let mut comp = Composer::new(0, 2, &[]);
//! comp.add_expr("age", operator::GT, 18i32);
//! comp.add_expr("name", Operator::Like, "a%");
//! comp.add_expr("tags", "&&", vec!["a".to_string()]);
//! ```

use crate::error::{ComposeError, ComposeResult};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Comparison operator placed between a key and its placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<=`
    LessThanOrEqual,
    /// `LIKE`
    Like,
    /// `ILIKE`
    ILike,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// Containment: `@>`
    Contains,
    /// Containment: `<@`
    ContainedBy,
    /// Overlap: `&&`
    Overlap,
}

/// Alias of [`Operator::Equal`].
pub const E: Operator = Operator::Equal;
/// Alias of [`Operator::NotEqual`].
pub const NE: Operator = Operator::NotEqual;
/// Alias of [`Operator::GreaterThan`].
pub const GT: Operator = Operator::GreaterThan;
/// Alias of [`Operator::LessThan`].
pub const LT: Operator = Operator::LessThan;
/// Alias of [`Operator::GreaterThanOrEqual`].
pub const GTE: Operator = Operator::GreaterThanOrEqual;
/// Alias of [`Operator::LessThanOrEqual`].
pub const LTE: Operator = Operator::LessThanOrEqual;

impl Operator {
    /// All variants, in declaration order.
    pub const ALL: [Operator; 16] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
        Operator::Like,
        Operator::ILike,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::Contains,
        Operator::ContainedBy,
        Operator::Overlap,
    ];

    /// SQL token for this operator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Contains => "@>",
            Operator::ContainedBy => "<@",
            Operator::Overlap => "&&",
        }
    }

    /// Short and long names accepted by [`FromStr`] besides the SQL token.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Operator::Equal => &["e", "eq", "equal", "=="],
            Operator::NotEqual => &["ne", "neq", "not_equal", "!="],
            Operator::GreaterThan => &["gt", "greater_than"],
            Operator::LessThan => &["lt", "less_than"],
            Operator::GreaterThanOrEqual => &["gte", "ge", "greater_than_or_equal"],
            Operator::LessThanOrEqual => &["lte", "le", "less_than_or_equal"],
            Operator::Like => &["like"],
            Operator::ILike => &["ilike"],
            Operator::NotLike => &["not_like"],
            Operator::In => &["in"],
            Operator::NotIn => &["not_in"],
            Operator::IsNull => &["is_null"],
            Operator::IsNotNull => &["is_not_null"],
            Operator::Contains => &["contains"],
            Operator::ContainedBy => &["contained_by"],
            Operator::Overlap => &["overlap", "overlaps"],
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ComposeError;

    /// Resolve a SQL token (`"<>"`), short name (`"NE"`) or long name
    /// (`"not_equal"`). Names are case-insensitive; surrounding whitespace
    /// and repeated inner spaces in tokens are ignored.
    fn from_str(s: &str) -> ComposeResult<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let lower = normalized.to_ascii_lowercase();
        Operator::ALL
            .into_iter()
            .find(|op| {
                op.as_str().eq_ignore_ascii_case(&normalized)
                    || op.aliases().iter().any(|alias| *alias == lower)
            })
            .ok_or_else(|| ComposeError::UnknownOperator(s.to_string()))
    }
}

impl From<Operator> for Cow<'static, str> {
    fn from(op: Operator) -> Self {
        Cow::Borrowed(op.as_str())
    }
}

/// Sort direction, for callers assembling `ORDER BY` alongside composed
/// fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Alias of [`SortOrder::Asc`].
pub const ASC: SortOrder = SortOrder::Asc;
/// Alias of [`SortOrder::Desc`].
pub const DESC: SortOrder = SortOrder::Desc;

impl SortOrder {
    /// SQL keyword for this direction.
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ComposeError;

    fn from_str(s: &str) -> ComposeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ComposeError::UnknownOperator(s.to_string())),
        }
    }
}
