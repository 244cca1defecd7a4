//! Dataflow expressions.

pub mod constructors;
pub mod core;
pub mod structural;
pub mod tree;

pub use core::{Constant, Expr, ExprKey, ExprKind, Var, VarId};
pub use structural::{StructuralEq, structural_equal};
