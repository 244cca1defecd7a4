//! Element dtypes of Rust scalar types.

use crate::{DType, ScalarDType};

/// A Rust scalar type that stores elements of one fixed dtype.
pub trait HasDType {
    const SCALAR: ScalarDType;
    const DTYPE: DType = DType::Scalar(Self::SCALAR);
}

/// Dtype of a value, by its Rust type.
pub fn dtype_of<T: HasDType>(_: &T) -> DType {
    T::DTYPE
}

macro_rules! has_dtype {
    ($($variant:ident: $($ty:ty),+;)*) => {
        $($(impl HasDType for $ty { const SCALAR: ScalarDType = ScalarDType::$variant; })+)*
    };
}

has_dtype! {
    Bool: bool;
    Int8: i8; Int16: i16; Int32: i32; Int64: i64;
    UInt8: u8; UInt16: u16; UInt32: u32; UInt64: u64;
    Float32: f32; Float64: f64;
}
