use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum PduParseErr {
    #[error("invalid pdu type: expected {expected}, found {found}")]
    InvalidPduType { expected: u64, found: u64 },
    #[error("buffer ended while reading {field:?}")]
    BufferEnded { field: Option<&'static str> },
    #[error("invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: u64 },
    #[error("inconsistent length: expected {expected}, found {found}")]
    InconsistentLength { expected: usize, found: usize },
}

/// Checks whether a value matches an expected value. If not, returns PduParseErr::InvalidValue
#[macro_export]
macro_rules! expect_value {
    ($value:ident, $expected:expr) => {
        $crate::expect_value!(@inner $value, $expected, stringify!($value))
    };
    ($value:expr, $expected:expr, $field:expr) => {
        $crate::expect_value!(@inner $value, $expected, $field)
    };

    (@inner $value:expr, $expected:expr, $field:expr) => {{
        let val = $value;
        if val == $expected {
            Ok(())
        } else {
            Err($crate::PduParseErr::InvalidValue {
                field: $field,
                value: val.into(),
            })
        }
    }};
}
