/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A read would run past the end of the message.
    #[error("out-of-bounds read at offset {offset} ({needed} bytes needed, {remaining} remaining)")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The inline payload does not start with the CPX@ v5 magic.
    #[error("invalid envelope magic {found:02x?} (expected \"CPX@\" version 5)")]
    BadEnvelope { found: [u8; 8] },

    /// The root value is not a dictionary.
    #[error("root value has tag {tag:#x} (expected dictionary)")]
    BadRootType { tag: u32 },

    /// A value record carries a tag this codec does not know.
    #[error("unknown value tag {tag:#x} at offset {offset}")]
    UnknownTag { tag: u32, offset: usize },

    /// The complex-message body carries an unsupported descriptor.
    #[error("unsupported message descriptor type {descriptor_type}")]
    UnknownDescriptor { descriptor_type: u8 },

    /// A string field could not be decoded.
    #[error("malformed string at offset {offset}: {reason}")]
    MalformedString { offset: usize, reason: &'static str },

    /// The message is the kernel's connection-interrupted notification.
    #[error("connection interrupted")]
    ConnectionInterrupted,

    /// The output buffer could not be grown.
    #[error("allocation of {requested} bytes failed")]
    AllocFailed { requested: usize },

    /// A string or dictionary key contains a NUL byte and cannot be framed.
    #[error("string written at offset {offset} contains an interior NUL byte")]
    InteriorNul { offset: usize },

    /// A length, count or message size exceeds what the wire can carry.
    #[error("{what} too large ({size} bytes)")]
    TooLarge { what: &'static str, size: usize },

    /// Containers are nested deeper than the configured limit.
    #[error("value nesting exceeds maximum depth {max}")]
    DepthExceeded { max: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
