//! Common imports for building expression graphs.
//!
//! ```rust,ignore
//! use dfpat_ir::prelude::*;
//! ```

pub use crate::attrs::{Attrs, DictAttrs};
pub use crate::expr::{Expr, ExprKey, ExprKind, StructuralEq, structural_equal};
pub use crate::operator::Operator;
pub use crate::prim::{PrimExpr, SymVar};
pub use crate::shape::ShapeInfo;
pub use crate::ty::Type;
pub use crate::types::{ConstValue, Object, RetValue};

pub use dfpat_dtype::DType;
