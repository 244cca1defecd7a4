use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Building the expression a pattern refers to failed.
    #[snafu(display("invalid pattern expression: {source}"))]
    Ir { source: dfpat_ir::Error },

    /// Tuple projection index below -1 (the "any index" marker).
    #[snafu(display("tuple index {index} is invalid; use -1 to accept any index"))]
    InvalidTupleIndex { index: i64 },
}
