//! Edge signs: friend (+1) or enemy (-1).

use std::fmt;

use crate::error::GraphError;

/// The label on a signed edge.
///
/// There is deliberately no zero variant; "no relationship" is the absence of
/// an edge, never a stored sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "i8", try_from = "i64"))]
pub enum Sign {
    /// Friend, `+1`
    Positive,
    /// Enemy, `-1`
    Negative,
}

impl Sign {
    /// Numeric value of the sign.
    pub const fn value(self) -> i8 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }

    /// The opposite sign.
    pub const fn flipped(self) -> Self {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }

    pub const fn is_positive(self) -> bool {
        matches!(self, Sign::Positive)
    }

    pub const fn is_negative(self) -> bool {
        matches!(self, Sign::Negative)
    }

    /// Single-character symbol used in triangle labels.
    pub const fn symbol(self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

impl TryFrom<i64> for Sign {
    type Error = GraphError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Sign::Positive),
            -1 => Ok(Sign::Negative),
            other => Err(GraphError::InvalidSign(other)),
        }
    }
}

impl TryFrom<i8> for Sign {
    type Error = GraphError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Sign::try_from(i64::from(value))
    }
}

impl From<Sign> for i8 {
    fn from(sign: Sign) -> Self {
        sign.value()
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
