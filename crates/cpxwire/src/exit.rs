use std::fmt;
use std::io;

use cpxwire_codec::CodecError;

use crate::json::JsonError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    let code = match err {
        CodecError::ConnectionInterrupted => FAILURE,
        CodecError::AllocFailed { .. } => INTERNAL,
        CodecError::OutOfBounds { .. }
        | CodecError::BadEnvelope { .. }
        | CodecError::BadRootType { .. }
        | CodecError::UnknownTag { .. }
        | CodecError::UnknownDescriptor { .. }
        | CodecError::MalformedString { .. }
        | CodecError::InteriorNul { .. }
        | CodecError::TooLarge { .. }
        | CodecError::DepthExceeded { .. } => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn json_error(context: &str, err: JsonError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_maps_to_data_invalid() {
        let err = codec_error(
            "decode",
            CodecError::OutOfBounds {
                offset: 4,
                needed: 4,
                remaining: 0,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("decode: out-of-bounds read"));
    }

    #[test]
    fn interrupted_and_alloc_have_distinct_codes() {
        assert_eq!(
            codec_error("x", CodecError::ConnectionInterrupted).code,
            FAILURE
        );
        assert_eq!(
            codec_error("x", CodecError::AllocFailed { requested: 8 }).code,
            INTERNAL
        );
    }

    #[test]
    fn missing_file_is_usage_error() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, USAGE);
    }
}
