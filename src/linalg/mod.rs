//! Linear algebra support.

pub mod rcond;
