use num_traits::Float;
use serde::Serialize;

use crate::aggregate::AggregatedChannel;

/// A channel mean with the blank mean subtracted
///
/// The value may be negative when a reading falls below the blank; it is not clamped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrectedValue<E> {
    pub name: String,
    pub absorbance: E,
}

/// Subtract the blank from `other`
///
/// Standards and samples are corrected identically.
pub fn correct<E: Float>(
    blank: &AggregatedChannel<E>,
    other: &AggregatedChannel<E>,
) -> CorrectedValue<E> {
    CorrectedValue {
        name: other.name.clone(),
        absorbance: other.mean - blank.mean,
    }
}
