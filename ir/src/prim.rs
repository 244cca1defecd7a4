//! Symbolic integer expressions used for shape dimensions.
//!
//! A dimension is either a concrete integer or an expression over symbolic
//! variables (batch size, sequence length, ...). Equality of two symbolic
//! dimensions is decided by an [`Analyzer`](crate::arith::Analyzer), never by
//! comparing trees directly.
//!
//! # Examples
//!
//! ```rust
//! # use dfpat_ir::prim::{PrimExpr, SymVar};
//! let n = SymVar::new("n");
//! let dim = PrimExpr::from(&n) * 2 + 1;
//! assert_eq!(dim.to_string(), "((n * 2) + 1)");
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static SYM_VAR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Symbolic integer variable.
///
/// Identity is the `id`; two variables created with the same name are
/// different variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymVar {
    pub id: u64,
    pub name: Arc<str>,
}

impl SymVar {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self { id: SYM_VAR_COUNTER.fetch_add(1, Ordering::Relaxed), name: Arc::from(name.as_ref()) }
    }
}

impl fmt::Display for SymVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Binary operators of the symbolic integer language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimBinOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    FloorMod,
    Min,
    Max,
}

impl PrimBinOp {
    fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::FloorDiv => "//",
            Self::FloorMod => "%",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Symbolic integer expression.
///
/// Derived equality is syntactic; use an analyzer for semantic equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimExpr {
    Int(i64),
    Var(SymVar),
    Binary(PrimBinOp, Arc<PrimExpr>, Arc<PrimExpr>),
}

impl PrimExpr {
    pub fn binary(op: PrimBinOp, lhs: PrimExpr, rhs: PrimExpr) -> Self {
        PrimExpr::Binary(op, Arc::new(lhs), Arc::new(rhs))
    }

    pub fn floordiv(self, rhs: impl Into<PrimExpr>) -> Self {
        Self::binary(PrimBinOp::FloorDiv, self, rhs.into())
    }

    pub fn floormod(self, rhs: impl Into<PrimExpr>) -> Self {
        Self::binary(PrimBinOp::FloorMod, self, rhs.into())
    }

    pub fn min(self, rhs: impl Into<PrimExpr>) -> Self {
        Self::binary(PrimBinOp::Min, self, rhs.into())
    }

    pub fn max(self, rhs: impl Into<PrimExpr>) -> Self {
        Self::binary(PrimBinOp::Max, self, rhs.into())
    }

    /// Concrete value if this is an integer immediate.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PrimExpr::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether `var` occurs anywhere in this expression.
    pub fn mentions(&self, var: &SymVar) -> bool {
        match self {
            PrimExpr::Int(_) => false,
            PrimExpr::Var(v) => v == var,
            PrimExpr::Binary(_, lhs, rhs) => lhs.mentions(var) || rhs.mentions(var),
        }
    }
}

impl From<i64> for PrimExpr {
    fn from(v: i64) -> Self {
        PrimExpr::Int(v)
    }
}

impl From<i32> for PrimExpr {
    fn from(v: i32) -> Self {
        PrimExpr::Int(v as i64)
    }
}

impl From<usize> for PrimExpr {
    fn from(v: usize) -> Self {
        PrimExpr::Int(v as i64)
    }
}

impl From<SymVar> for PrimExpr {
    fn from(v: SymVar) -> Self {
        PrimExpr::Var(v)
    }
}

impl From<&SymVar> for PrimExpr {
    fn from(v: &SymVar) -> Self {
        PrimExpr::Var(v.clone())
    }
}

macro_rules! impl_prim_ops {
    ($(($Trait:ident, $method:ident, $op:expr)),* $(,)?) => {
        $(
            impl<R: Into<PrimExpr>> $Trait<R> for PrimExpr {
                type Output = PrimExpr;
                fn $method(self, rhs: R) -> PrimExpr {
                    PrimExpr::binary($op, self, rhs.into())
                }
            }
        )*
    };
}

impl_prim_ops! {
    (Add, add, PrimBinOp::Add),
    (Sub, sub, PrimBinOp::Sub),
    (Mul, mul, PrimBinOp::Mul),
}

impl Neg for PrimExpr {
    type Output = PrimExpr;
    fn neg(self) -> PrimExpr {
        PrimExpr::binary(PrimBinOp::Mul, self, PrimExpr::Int(-1))
    }
}

impl fmt::Display for PrimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimExpr::Int(v) => write!(f, "{v}"),
            PrimExpr::Var(v) => write!(f, "{v}"),
            PrimExpr::Binary(op @ (PrimBinOp::Min | PrimBinOp::Max), lhs, rhs) => {
                write!(f, "{}({lhs}, {rhs})", op.symbol())
            }
            PrimExpr::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}
