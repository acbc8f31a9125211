use core::fmt;

/// Parameter store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// No parameter registered under that name
    UnknownParameter,
    /// Value outside the parameter's allowed range
    OutOfRange,
    /// NaN or infinite value
    NotFinite,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter => write!(f, "unknown parameter"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::NotFinite => write!(f, "value is not finite"),
        }
    }
}
