//! Element data types for dataflow tensors.
//!
//! A [`DType`] is either a scalar element type or a fixed-width vector of
//! scalars. Every dtype has a canonical lowercase name (`float32`,
//! `int64x4`, ...) used when dtypes travel through string-typed attribute
//! values, so [`Display`](std::fmt::Display) and [`FromStr`] round-trip.

pub mod error;
pub mod ext;

#[cfg(any(test, feature = "proptest"))]
pub mod test;

use std::fmt;
use std::str::FromStr;

pub use error::{Error, Result};

/// Scalar data types (base numeric types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ScalarDType {
    Bool,

    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,

    Float16,
    BFloat16,
    Float32,
    Float64,

    /// Opaque values without element storage (handles, tokens).
    Void,
}

impl ScalarDType {
    pub const fn bits(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 16,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 => 64,
            Self::Void => 0,
        }
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }
}

/// Data type: a scalar or a SIMD-style vector of scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Scalar type (single value).
    Scalar(ScalarDType),

    /// Vector type with `count` lanes.
    Vector { scalar: ScalarDType, count: usize },
}

impl From<ScalarDType> for DType {
    fn from(scalar: ScalarDType) -> Self {
        Self::Scalar(scalar)
    }
}

impl DType {
    /// Create a vector dtype from this dtype's scalar base.
    ///
    /// A lane count of 1 collapses back to the scalar.
    pub fn vec(&self, count: usize) -> Self {
        match count {
            1 => Self::Scalar(self.base()),
            _ => Self::Vector { scalar: self.base(), count },
        }
    }

    /// Get the scalar type if this is a scalar.
    pub fn scalar(&self) -> Option<ScalarDType> {
        match self {
            Self::Scalar(s) => Some(*s),
            Self::Vector { .. } => None,
        }
    }

    /// Scalar base of this dtype (the lane type for vectors).
    pub fn base(&self) -> ScalarDType {
        match self {
            Self::Scalar(s) => *s,
            Self::Vector { scalar, .. } => *scalar,
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector { .. })
    }

    /// Number of lanes (1 for scalars).
    pub fn lanes(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector { count, .. } => *count,
        }
    }

    pub fn bits(&self) -> usize {
        self.base().bits() * self.lanes()
    }

    pub fn is_bool(&self) -> bool {
        self.base().is_bool()
    }

    pub fn is_int(&self) -> bool {
        self.base().is_int()
    }

    pub fn is_float(&self) -> bool {
        self.base().is_float()
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Scalar(ScalarDType::Void))
    }
}

#[allow(non_upper_case_globals)]
impl DType {
    pub const Bool: Self = Self::Scalar(ScalarDType::Bool);
    pub const Int8: Self = Self::Scalar(ScalarDType::Int8);
    pub const Int16: Self = Self::Scalar(ScalarDType::Int16);
    pub const Int32: Self = Self::Scalar(ScalarDType::Int32);
    pub const Int64: Self = Self::Scalar(ScalarDType::Int64);
    pub const UInt8: Self = Self::Scalar(ScalarDType::UInt8);
    pub const UInt16: Self = Self::Scalar(ScalarDType::UInt16);
    pub const UInt32: Self = Self::Scalar(ScalarDType::UInt32);
    pub const UInt64: Self = Self::Scalar(ScalarDType::UInt64);
    pub const Float16: Self = Self::Scalar(ScalarDType::Float16);
    pub const BFloat16: Self = Self::Scalar(ScalarDType::BFloat16);
    pub const Float32: Self = Self::Scalar(ScalarDType::Float32);
    pub const Float64: Self = Self::Scalar(ScalarDType::Float64);
    pub const Void: Self = Self::Scalar(ScalarDType::Void);
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Vector { scalar, count } => write!(f, "{scalar}x{count}"),
        }
    }
}

impl FromStr for DType {
    type Err = Error;

    /// Parse a canonical dtype name: `float32`, `int8x4`, `bool`.
    fn from_str(s: &str) -> Result<Self> {
        let parse_scalar = |name: &str| {
            ScalarDType::from_str(name).map_err(|_| Error::UnknownDType { name: s.to_string() })
        };

        // `x` never appears inside a scalar name, so the last one separates the lane count.
        match s.rsplit_once('x') {
            Some((scalar, count)) if !scalar.is_empty() && count.chars().all(|c| c.is_ascii_digit()) => {
                let count: usize = count.parse().map_err(|_| Error::UnknownDType { name: s.to_string() })?;
                snafu::ensure!(count > 1, error::InvalidLaneCountSnafu { name: s.to_string(), count });
                Ok(DType::Scalar(parse_scalar(scalar)?).vec(count))
            }
            _ => Ok(DType::Scalar(parse_scalar(s)?)),
        }
    }
}
