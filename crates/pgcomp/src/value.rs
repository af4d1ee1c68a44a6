//! Value classification for [`add_expr`](crate::NodeMut::add_expr).
//!
//! Every value handed to `add_expr` is first turned into exactly one
//! [`Candidate`] through the [`Classify`] trait. The candidate is then judged
//! by the ordered decision table in [`filter`](crate::filter), which is the
//! only place that decides whether an expression is recorded.
//!
//! # Custom types
//!
//! Types that know whether they should take part in a query implement
//! [`Appear`] and opt in through [`Candidate::presence`]:
//!
//! ```ignore
//! use pgcomp::{Appear, Candidate, Classify};
//!
//! #[derive(Debug)]
//! struct Nickname(String);
//!
//! impl Appear for Nickname {
//!     fn appear(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! // ToSql impl omitted
//!
//! impl Classify for Nickname {
//!     fn classify(self) -> Candidate {
//!         Candidate::presence(self)
//!     }
//! }
//! ```

use crate::arg::Arg;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::types::{Json, ToSql};
use uuid::Uuid;

/// A value that can tell whether it should appear in a query at all.
pub trait Appear {
    /// Returns true if the value should be recorded by `add_expr`.
    fn appear(&self) -> bool;
}

/// Conversion of a caller value into its [`Candidate`] classification.
pub trait Classify {
    /// Classify a present value.
    fn classify(self) -> Candidate;

    /// Classification of an absent (`None`) value of this type.
    ///
    /// Defaults to [`Candidate::Null`]; reference-like types report their own
    /// typed absence so the decision table can tell them apart.
    fn absent() -> Candidate
    where
        Self: Sized,
    {
        Candidate::Null
    }
}

/// Closed classification of a candidate expression value.
///
/// Variants are listed in the priority order used by the filter.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// The untyped absence marker.
    Null,
    /// A value exposing its own presence check.
    Presence { appear: bool, arg: Arg },
    /// A nullable-scalar wrapper, `None` for a nil reference to one.
    Nullable(Option<NullScalar>),
    /// A byte sequence, `None` for a nil reference.
    Bytes(Option<Vec<u8>>),
    /// A timestamp, `None` for a nil reference.
    Timestamp(Option<Timestamp>),
    /// Any other sequence, already split into one argument per element.
    Sequence(Option<Vec<Arg>>),
    /// Plain numeric, string or boolean value.
    Scalar(Arg),
    /// Anything else the driver can encode.
    Opaque(Arg),
}

impl Candidate {
    /// Classify a presence-capable value, evaluating its check now.
    pub fn presence<T>(value: T) -> Self
    where
        T: Appear + ToSql + Send + Sync + 'static,
    {
        Candidate::Presence {
            appear: value.appear(),
            arg: Arg::new(value),
        }
    }

    /// Classify a value as a plain scalar.
    pub fn scalar<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Candidate::Scalar(Arg::new(value))
    }

    /// Classify a value the filter has no specific rule for.
    pub fn opaque<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Candidate::Opaque(Arg::new(value))
    }

    /// Classify a present sequence; each item becomes its own argument.
    pub fn sequence<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSql + Send + Sync + 'static,
    {
        Candidate::Sequence(Some(items.into_iter().map(Arg::new).collect()))
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Candidate::Null => "null",
            Candidate::Presence { .. } => "presence",
            Candidate::Nullable(_) => "nullable",
            Candidate::Bytes(_) => "bytes",
            Candidate::Timestamp(_) => "timestamp",
            Candidate::Sequence(_) => "sequence",
            Candidate::Scalar(_) => "scalar",
            Candidate::Opaque(_) => "opaque",
        }
    }
}

impl Classify for Candidate {
    fn classify(self) -> Candidate {
        self
    }
}

/// The untyped absence marker. Never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Null;

impl Classify for Null {
    fn classify(self) -> Candidate {
        Candidate::Null
    }
}

impl<T: Classify> Classify for Option<T> {
    fn classify(self) -> Candidate {
        match self {
            Some(value) => value.classify(),
            None => T::absent(),
        }
    }
}

// ==================== Nullable scalars ====================

/// A raw scalar paired with a validity flag (SQL `NULL`-style optionality).
///
/// The default value is invalid, mirroring an unset database column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Nullable<T> {
    pub value: T,
    pub valid: bool,
}

pub type NullBool = Nullable<bool>;
pub type NullString = Nullable<String>;
pub type NullInt32 = Nullable<i32>;
pub type NullInt64 = Nullable<i64>;
pub type NullFloat64 = Nullable<f64>;

impl<T> Nullable<T> {
    /// A valid wrapper around `value`.
    pub fn new(value: T) -> Self {
        Self { value, valid: true }
    }

    /// An invalid wrapper.
    pub fn null() -> Self
    where
        T: Default,
    {
        Self {
            value: T::default(),
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The wrapped value, if valid.
    pub fn into_option(self) -> Option<T> {
        self.valid.then_some(self.value)
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::new(v),
            None => Self::null(),
        }
    }
}

/// A nullable wrapper of one of the supported scalar kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NullScalar {
    Bool(NullBool),
    String(NullString),
    Int32(NullInt32),
    Int64(NullInt64),
    Float64(NullFloat64),
}

impl NullScalar {
    pub fn is_valid(&self) -> bool {
        match self {
            NullScalar::Bool(n) => n.valid,
            NullScalar::String(n) => n.valid,
            NullScalar::Int32(n) => n.valid,
            NullScalar::Int64(n) => n.valid,
            NullScalar::Float64(n) => n.valid,
        }
    }

    /// The raw wrapped value as an argument, if valid.
    pub fn into_arg(self) -> Option<Arg> {
        match self {
            NullScalar::Bool(n) => n.into_option().map(Arg::new),
            NullScalar::String(n) => n.into_option().map(Arg::new),
            NullScalar::Int32(n) => n.into_option().map(Arg::new),
            NullScalar::Int64(n) => n.into_option().map(Arg::new),
            NullScalar::Float64(n) => n.into_option().map(Arg::new),
        }
    }
}

/// Scalar kinds that may be wrapped in [`Nullable`].
pub trait NullableValue: Clone + Sized {
    fn wrap(nullable: Nullable<Self>) -> NullScalar;
}

macro_rules! impl_nullable_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl NullableValue for $ty {
                fn wrap(nullable: Nullable<Self>) -> NullScalar {
                    NullScalar::$variant(nullable)
                }
            }
        )*
    };
}

impl_nullable_value!(
    bool => Bool,
    String => String,
    i32 => Int32,
    i64 => Int64,
    f64 => Float64,
);

impl<T: NullableValue> Classify for Nullable<T> {
    fn classify(self) -> Candidate {
        Candidate::Nullable(Some(T::wrap(self)))
    }

    fn absent() -> Candidate {
        Candidate::Nullable(None)
    }
}

impl<T: NullableValue> Classify for &Nullable<T> {
    fn classify(self) -> Candidate {
        self.clone().classify()
    }

    fn absent() -> Candidate {
        Candidate::Nullable(None)
    }
}

// ==================== Byte sequences ====================

impl Classify for Vec<u8> {
    fn classify(self) -> Candidate {
        Candidate::Bytes(Some(self))
    }

    fn absent() -> Candidate {
        Candidate::Bytes(None)
    }
}

impl Classify for &[u8] {
    fn classify(self) -> Candidate {
        Candidate::Bytes(Some(self.to_vec()))
    }

    fn absent() -> Candidate {
        Candidate::Bytes(None)
    }
}

// ==================== Timestamps ====================

/// A point in time accepted by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Utc(DateTime<Utc>),
    Naive(NaiveDateTime),
    System(SystemTime),
}

impl Timestamp {
    /// True for the zero value of the underlying type (its `Default`, the
    /// Unix epoch).
    pub fn is_zero(&self) -> bool {
        match self {
            Timestamp::Utc(ts) => is_epoch(ts),
            Timestamp::Naive(ts) => is_epoch(&ts.and_utc()),
            Timestamp::System(ts) => *ts == UNIX_EPOCH,
        }
    }

    pub fn into_arg(self) -> Arg {
        match self {
            Timestamp::Utc(ts) => Arg::new(ts),
            Timestamp::Naive(ts) => Arg::new(ts),
            Timestamp::System(ts) => Arg::new(ts),
        }
    }
}

fn is_epoch(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() == 0 && ts.timestamp_subsec_nanos() == 0
}

macro_rules! impl_classify_timestamp {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Classify for $ty {
                fn classify(self) -> Candidate {
                    Candidate::Timestamp(Some(Timestamp::$variant(self)))
                }

                fn absent() -> Candidate {
                    Candidate::Timestamp(None)
                }
            }

            impl Classify for &$ty {
                fn classify(self) -> Candidate {
                    Candidate::Timestamp(Some(Timestamp::$variant(*self)))
                }

                fn absent() -> Candidate {
                    Candidate::Timestamp(None)
                }
            }
        )*
    };
}

impl_classify_timestamp!(
    DateTime<Utc> => Utc,
    NaiveDateTime => Naive,
    SystemTime => System,
);

// ==================== Sequences ====================

macro_rules! impl_classify_sequence {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Classify for Vec<$ty> {
                fn classify(self) -> Candidate {
                    Candidate::sequence(self)
                }

                fn absent() -> Candidate {
                    Candidate::Sequence(None)
                }
            }

            impl Classify for &[$ty] {
                fn classify(self) -> Candidate {
                    Candidate::sequence(self.iter().cloned())
                }

                fn absent() -> Candidate {
                    Candidate::Sequence(None)
                }
            }
        )*
    };
}

impl_classify_sequence!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
);

impl Classify for Vec<&str> {
    fn classify(self) -> Candidate {
        Candidate::sequence(self.into_iter().map(str::to_owned))
    }

    fn absent() -> Candidate {
        Candidate::Sequence(None)
    }
}

impl Classify for &[&str] {
    fn classify(self) -> Candidate {
        Candidate::sequence(self.iter().map(|s| (*s).to_owned()))
    }

    fn absent() -> Candidate {
        Candidate::Sequence(None)
    }
}

// ==================== Scalars ====================

macro_rules! impl_classify_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Classify for $ty {
                fn classify(self) -> Candidate {
                    Candidate::scalar(self)
                }
            }
        )*
    };
}

impl_classify_scalar!(bool, i8, i16, i32, i64, u32, f32, f64, String, Uuid, NaiveDate);

impl Classify for &str {
    fn classify(self) -> Candidate {
        Candidate::scalar(self.to_owned())
    }
}

impl Classify for &String {
    fn classify(self) -> Candidate {
        Candidate::scalar(self.clone())
    }
}

// ==================== Opaque ====================

/// Wrapper that records any driver-encodable value without inspection.
#[derive(Debug, Clone)]
pub struct Raw<T>(pub T);

impl<T: ToSql + Send + Sync + 'static> Classify for Raw<T> {
    fn classify(self) -> Candidate {
        Candidate::opaque(self.0)
    }
}

impl<T> Classify for Json<T>
where
    T: serde::Serialize + std::fmt::Debug + Send + Sync + 'static,
{
    fn classify(self) -> Candidate {
        Candidate::opaque(self)
    }
}

impl Classify for serde_json::Value {
    fn classify(self) -> Candidate {
        Candidate::opaque(self)
    }
}

impl Classify for Arg {
    fn classify(self) -> Candidate {
        Candidate::Opaque(self)
    }
}
