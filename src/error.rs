use thiserror::Error;

/// Failures that abort a quantification run
///
/// Every variant names the channel (or point count) at fault, so the caller can trace the failure
/// back to the input table or configuration.
#[derive(Debug, Error)]
pub enum AssayError {
    #[error("channel '{channel}' has no valid readings")]
    EmptyChannel { channel: String },

    #[error("blank channel '{channel}' is missing from the table")]
    MissingBlank { channel: String },

    #[error("standard channel '{channel}' is missing from the table")]
    MissingStandard { channel: String },

    #[error(
        "calibration is degenerate: {distinct} distinct absorbance value(s) across {points} point(s), at least 2 are required"
    )]
    DegenerateFit { distinct: usize, points: usize },

    #[error("calibration over {points} point(s) overflowed to a non-finite line")]
    NonFiniteFit { points: usize },

    #[error("channel '{channel}' produced a non-finite value")]
    NonFinite { channel: String },

    #[error("{count} standard channel(s) configured, at least 2 are required")]
    InsufficientStandards { count: usize },

    #[error("standard '{channel}' has invalid concentration {concentration}, it must be finite and positive")]
    InvalidConcentration {
        channel: String,
        concentration: String,
    },

    #[error("standards '{first}' and '{second}' share the same concentration")]
    DuplicateConcentration { first: String, second: String },

    #[error("channel '{channel}' appears more than once in the table")]
    DuplicateChannel { channel: String },

    #[error("channel '{channel}' is configured both as the blank and as a standard")]
    BlankIsStandard { channel: String },

    #[error("record {record} has {cells} cells but the header names {columns} channels")]
    RaggedRecord {
        record: usize,
        cells: usize,
        columns: usize,
    },

    #[error(
        "sample '{sample}' resolves to {concentration}, outside the calibrated range [{min}, {max}]"
    )]
    Extrapolation {
        sample: String,
        concentration: String,
        min: String,
        max: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
