//! Literal values carried by IR nodes and attributes.
//!
//! - [`ConstValue`]: one element of a constant tensor.
//! - [`Object`]: a literal value written into a pattern or a function
//!   attribute dictionary.
//! - [`RetValue`]: a dynamically-kinded value read back from an attribute
//!   table at runtime (operator attribute maps, call attribute objects).

use std::fmt;
use std::sync::Arc;

use dfpat_dtype::DType;

use crate::prim::PrimExpr;
use crate::ty::Type;
use crate::Expr;

/// One element of a constant tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl ConstValue {
    /// Bitwise equality: `NaN` equals itself, `0.0` differs from `-0.0`.
    pub fn bit_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}u"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_const_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(impl From<$ty> for ConstValue {
            fn from(v: $ty) -> Self {
                ConstValue::$variant(v as $cast)
            }
        })*
    };
}

impl_const_from! {
    i8 => Int as i64, i16 => Int as i64, i32 => Int as i64, i64 => Int as i64,
    u8 => UInt as u64, u16 => UInt as u64, u32 => UInt as u64, u64 => UInt as u64,
    f32 => Float as f64, f64 => Float as f64,
}

impl From<bool> for ConstValue {
    fn from(v: bool) -> Self {
        ConstValue::Bool(v)
    }
}

/// Literal object value.
///
/// Two string representations exist side by side: [`Object::StringImm`] is a
/// string immediate of the symbolic-integer language, [`Object::Str`] a plain
/// string object. Attribute comparison treats them as interchangeable, structural
/// equality does not.
#[derive(Debug, Clone)]
pub enum Object {
    IntImm(i64),
    FloatImm(f64),
    StringImm(String),
    Str(String),
    DType(DType),
    Prim(PrimExpr),
    Type(Type),
    Expr(Arc<Expr>),
    Array(Vec<Object>),
}

impl Object {
    /// String content if this object is either string representation.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringImm(s) | Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::IntImm(v)
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::FloatImm(v)
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::Str(v.to_string())
    }
}

impl From<DType> for Object {
    fn from(v: DType) -> Self {
        Object::DType(v)
    }
}

impl From<PrimExpr> for Object {
    fn from(v: PrimExpr) -> Self {
        Object::Prim(v)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntImm(v) => write!(f, "{v}"),
            Self::FloatImm(v) => write!(f, "{v:?}"),
            Self::StringImm(s) | Self::Str(s) => write!(f, "{s:?}"),
            Self::DType(d) => write!(f, "{d}"),
            Self::Prim(p) => write!(f, "{p}"),
            Self::Type(t) => write!(f, "{t}"),
            Self::Expr(e) => write!(f, "{e}"),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Dynamically-kinded attribute value as read from an attribute table.
#[derive(Debug, Clone)]
pub enum RetValue {
    /// Absent value.
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    DataType(DType),
    Object(Object),
    /// Opaque runtime handle (packed function, device pointer).
    Handle(usize),
}

impl RetValue {
    /// Short name of the value kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::DataType(_) => "dtype",
            Self::Object(_) => "object",
            Self::Handle(_) => "handle",
        }
    }
}

impl From<i64> for RetValue {
    fn from(v: i64) -> Self {
        RetValue::Int(v)
    }
}

impl From<f64> for RetValue {
    fn from(v: f64) -> Self {
        RetValue::Float(v)
    }
}

impl From<&str> for RetValue {
    fn from(v: &str) -> Self {
        RetValue::Str(v.to_string())
    }
}

impl From<DType> for RetValue {
    fn from(v: DType) -> Self {
        RetValue::DataType(v)
    }
}

impl From<Object> for RetValue {
    fn from(v: Object) -> Self {
        RetValue::Object(v)
    }
}

impl fmt::Display for RetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::DataType(d) => write!(f, "{d}"),
            Self::Object(o) => write!(f, "{o}"),
            Self::Handle(h) => write!(f, "<handle {h:#x}>"),
        }
    }
}
