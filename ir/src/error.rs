use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operator name is not present in the operator registry.
    #[snafu(display("unknown operator {name:?}; register it with Operator::register first"))]
    UnknownOperator { name: String },

    /// Call argument count disagrees with the operator's declared arity.
    #[snafu(display("operator {op} expects {expected} arguments, got {actual}"))]
    CallArityMismatch { op: String, expected: usize, actual: usize },

    /// Tuple projection past the end of a tuple with known arity.
    #[snafu(display("tuple index {index} out of bounds for tuple with {arity} fields"))]
    TupleIndexOutOfBounds { index: usize, arity: usize },

    /// Function parameters must be variables.
    #[snafu(display("function parameter {position} is not a variable: {param}"))]
    FunctionParamNotVar { position: usize, param: String },

    /// Constant payload length does not fill the declared shape.
    #[snafu(display("constant with shape {shape:?} needs {expected} elements, got {actual}"))]
    ConstantSizeMismatch { shape: Vec<usize>, expected: usize, actual: usize },

    /// Symbolic variable bound to an expression that mentions itself.
    #[snafu(display("cannot bind {var} to {value}: the value refers back to {var}"))]
    CyclicBinding { var: String, value: String },
}
