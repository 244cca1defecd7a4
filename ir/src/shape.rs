//! Shape annotations of dataflow expressions.

use std::fmt;
use std::sync::Arc;

use crate::prim::PrimExpr;
use crate::{Expr, ExprKind};

/// Shape of an expression's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeInfo {
    /// Dimensions known symbolically at compile time.
    Known(Vec<PrimExpr>),
    /// Shape only known once the program runs (data-dependent outputs).
    RuntimeDep,
}

impl ShapeInfo {
    pub fn known(dims: impl IntoIterator<Item = impl Into<PrimExpr>>) -> Self {
        ShapeInfo::Known(dims.into_iter().map(Into::into).collect())
    }

    pub fn dims(&self) -> Option<&[PrimExpr]> {
        match self {
            ShapeInfo::Known(dims) => Some(dims),
            ShapeInfo::RuntimeDep => None,
        }
    }

    pub fn is_runtime_dep(&self) -> bool {
        matches!(self, ShapeInfo::RuntimeDep)
    }
}

impl fmt::Display for ShapeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeInfo::Known(dims) => {
                write!(f, "[")?;
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{dim}")?;
                }
                write!(f, "]")
            }
            ShapeInfo::RuntimeDep => write!(f, "[runtime]"),
        }
    }
}

/// Shape of an expression: its annotation, or the static shape of a constant.
pub fn shape_of(expr: &Arc<Expr>) -> Option<ShapeInfo> {
    if let Some(shape) = expr.shape_annotation() {
        return Some(shape.clone());
    }
    match expr.kind() {
        ExprKind::Constant(c) => Some(ShapeInfo::known(c.shape.iter().copied())),
        _ => None,
    }
}
