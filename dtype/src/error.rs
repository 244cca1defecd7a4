use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Name does not spell a known scalar or vector dtype.
    #[snafu(display("unknown dtype name {name:?}"))]
    UnknownDType { name: String },

    /// Vector dtypes need at least two lanes.
    #[snafu(display("invalid lane count {count} in dtype {name:?}: vectors need at least 2 lanes"))]
    InvalidLaneCount { name: String, count: usize },
}
