use thiserror::Error;

/// Errors that can occur while reading values out of an incoming bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Attempted to read past the end of the buffer
    #[error("Attempted to read bit {bit_index} of a {bit_total}-bit buffer")]
    OutOfBounds { bit_index: u32, bit_total: u32 },

    /// An enum discriminant that does not map to any variant (SECURITY: potentially malicious record)
    #[error("Invalid {type_name} discriminant {index}")]
    InvalidDiscriminant { type_name: &'static str, index: u8 },

    /// A decoded integer does not fit into the requested type
    #[error("Decoded value {value} does not fit into {type_name}")]
    ValueOutOfRange {
        value: i128,
        type_name: &'static str,
    },
}
