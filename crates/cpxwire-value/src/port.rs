//! Kernel port handles carried out-of-band.

use serde::{Deserialize, Serialize};

/// Port right disposition: move the receive right.
pub const MOVE_RECEIVE: u8 = 16;
/// Port right disposition: move a send right.
pub const MOVE_SEND: u8 = 17;
/// Port right disposition: move a send-once right.
pub const MOVE_SEND_ONCE: u8 = 18;
/// Port right disposition: copy a send right.
pub const COPY_SEND: u8 = 19;
/// Port right disposition: make a send right from a receive right.
pub const MAKE_SEND: u8 = 20;
/// Port right disposition: make a send-once right from a receive right.
pub const MAKE_SEND_ONCE: u8 = 21;
/// Port right disposition: copy the receive right.
pub const COPY_RECEIVE: u8 = 22;

/// A kernel port name paired with the disposition of the right it carries.
///
/// Ports identify kernel endpoints; they do not own kernel state. Releasing
/// the underlying right is the caller's concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    /// Opaque 32-bit kernel name.
    pub name: u32,
    /// Right disposition (`MOVE_SEND`, `COPY_SEND`, ...).
    pub disposition: u8,
}

impl Port {
    /// The null port (`name == 0`).
    pub const NULL: Port = Port {
        name: 0,
        disposition: 0,
    };

    /// Create a port.
    pub const fn new(name: u32, disposition: u8) -> Self {
        Self { name, disposition }
    }

    /// Returns true if this is the null port.
    pub const fn is_null(&self) -> bool {
        self.name == 0
    }
}

/// Returns a human-readable name for a port disposition.
pub fn disposition_name(disposition: u8) -> &'static str {
    match disposition {
        0 => "NONE",
        MOVE_RECEIVE => "MOVE_RECEIVE",
        MOVE_SEND => "MOVE_SEND",
        MOVE_SEND_ONCE => "MOVE_SEND_ONCE",
        COPY_SEND => "COPY_SEND",
        MAKE_SEND => "MAKE_SEND",
        MAKE_SEND_ONCE => "MAKE_SEND_ONCE",
        COPY_RECEIVE => "COPY_RECEIVE",
        _ => "UNKNOWN",
    }
}
