#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod aggregate;
pub mod assay;
pub mod blank;
pub mod channel;
pub mod config;
pub mod error;
pub mod fit;
pub mod loader;
pub mod logbook;
pub mod math;
pub mod resolve;

pub use assay::{quantify, Assay, Fitted, Report, Unfitted};
pub use config::{Config, ExtrapolationPolicy, Standard};
pub use error::AssayError;

pub type Result<T> = ::std::result::Result<T, AssayError>;
