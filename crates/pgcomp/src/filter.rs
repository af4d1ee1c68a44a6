//! Inclusion policy for candidate expression values.
//!
//! [`admit`] is a single ordered table over [`Candidate`]. A value matches
//! exactly one row; the first rows are the narrowest. Unknown kinds fall
//! through to [`Candidate::Opaque`] and are always recorded.

use crate::arg::Arg;
use crate::value::Candidate;
use std::fmt;

/// Outcome of judging a candidate value.
#[derive(Debug, Clone)]
pub enum Admission {
    /// Nothing is recorded.
    Drop(DropReason),
    /// One expression is recorded with this argument.
    Record(Arg),
    /// One expression is recorded per argument, sharing key and operator.
    Expand(Vec<Arg>),
}

impl Admission {
    /// Number of expressions this admission records.
    pub fn count(&self) -> usize {
        match self {
            Admission::Drop(_) => 0,
            Admission::Record(_) => 1,
            Admission::Expand(args) => args.len(),
        }
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Admission::Drop(_))
    }
}

/// Why a candidate was not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The untyped absence marker.
    Null,
    /// A presence check answered false.
    NotAppearing,
    /// A nullable-scalar wrapper with its validity flag unset.
    Invalid,
    /// A nil reference to a wrapper, byte sequence, timestamp or sequence.
    NilReference,
    /// The zero-valued timestamp.
    ZeroTimestamp,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DropReason::Null => "null",
            DropReason::NotAppearing => "not appearing",
            DropReason::Invalid => "invalid nullable",
            DropReason::NilReference => "nil reference",
            DropReason::ZeroTimestamp => "zero timestamp",
        })
    }
}

/// Decide whether (and how) a candidate value is recorded.
pub fn admit(candidate: Candidate) -> Admission {
    match candidate {
        Candidate::Null => Admission::Drop(DropReason::Null),

        Candidate::Presence { appear: true, arg } => Admission::Record(arg),
        Candidate::Presence { appear: false, .. } => Admission::Drop(DropReason::NotAppearing),

        Candidate::Nullable(Some(wrapper)) => match wrapper.into_arg() {
            Some(arg) => Admission::Record(arg),
            None => Admission::Drop(DropReason::Invalid),
        },
        Candidate::Nullable(None) => Admission::Drop(DropReason::NilReference),

        // An empty but present byte sequence is still a value.
        Candidate::Bytes(Some(bytes)) => Admission::Record(Arg::new(bytes)),
        Candidate::Bytes(None) => Admission::Drop(DropReason::NilReference),

        Candidate::Timestamp(Some(ts)) if ts.is_zero() => {
            Admission::Drop(DropReason::ZeroTimestamp)
        }
        Candidate::Timestamp(Some(ts)) => Admission::Record(ts.into_arg()),
        Candidate::Timestamp(None) => Admission::Drop(DropReason::NilReference),

        Candidate::Sequence(Some(items)) => Admission::Expand(items),
        Candidate::Sequence(None) => Admission::Drop(DropReason::NilReference),

        Candidate::Scalar(arg) => Admission::Record(arg),
        Candidate::Opaque(arg) => Admission::Record(arg),
    }
}
