/// Default initial encode buffer bytes reserved per top-level entry.
pub const DEFAULT_BYTES_PER_ENTRY: usize = 32;

/// Default maximum total kernel message size: 64 MiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Default maximum container nesting accepted on decode.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration for the message codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Initial encode buffer bytes reserved per top-level content entry.
    pub bytes_per_entry_hint: usize,
    /// Maximum total size of an encoded kernel message. Never above `u32::MAX`.
    pub max_message_size: usize,
    /// Maximum container nesting depth accepted while decoding.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            bytes_per_entry_hint: DEFAULT_BYTES_PER_ENTRY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
