#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod config;
pub mod endpoint;
pub mod error;
pub mod linearity;
pub mod math;
pub mod report;
pub mod transfer;

pub use error::LinearityError;

pub type Result<T> = ::std::result::Result<T, LinearityError>;

/// Index of a quantiser level, contiguous and zero based.
pub type Code = usize;
