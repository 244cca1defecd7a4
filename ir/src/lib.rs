//! Dataflow intermediate representation consumed by the pattern matcher.
//!
//! # Module Organization
//!
//! - [`expr`] - Expression nodes, constructors, structural equality, tree printing
//! - [`operator`] - Operator registry and per-operator attribute maps
//! - [`attrs`] - Call attribute records and function attribute dictionaries
//! - [`types`] - Literal values: constants, attribute objects, runtime values
//! - [`ty`] - Expression types and type deduction
//! - [`shape`] - Shape annotations
//! - [`prim`] - Symbolic integers
//! - [`arith`] - Symbolic integer equality prover
//! - [`error`] - Error types and result handling

pub mod arith;
pub mod attrs;
pub mod error;
pub mod expr;
pub mod operator;
pub mod prelude;
pub mod prim;
pub mod shape;
pub mod ty;
pub mod types;


pub use arith::{Analyzer, ArithAnalyzer};
pub use attrs::{Attrs, DictAttrs};
pub use error::{Error, Result};
pub use expr::{Constant, Expr, ExprKey, ExprKind, StructuralEq, Var, VarId, structural_equal};
pub use operator::{OpPattern, Operator, TOP_PATTERN};
pub use prim::{PrimBinOp, PrimExpr, SymVar};
pub use shape::{ShapeInfo, shape_of};
pub use ty::{Type, infer_type};
pub use types::{ConstValue, Object, RetValue};

pub use dfpat_dtype::DType;
