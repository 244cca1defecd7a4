//! Generators and tests for dtypes.
