//! On-wire value tags.
//!
//! Tags are the platform's value-type ordinals and must match the peer
//! exactly. The set is closed: any other tag is a decode error.

/// The wire tag of a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ValueType {
    Null = 0x1,
    Bool = 0x2,
    Int64 = 0x3,
    Uint64 = 0x4,
    Double = 0x5,
    Data = 0x8,
    String = 0x9,
    Uuid = 0xa,
    Fd = 0xb,
    SendPort = 0xd,
    Array = 0xe,
    Dictionary = 0xf,
    RecvPort = 0x15,
}

impl ValueType {
    /// Every tag this codec understands.
    pub const ALL: [ValueType; 13] = [
        ValueType::Null,
        ValueType::Bool,
        ValueType::Int64,
        ValueType::Uint64,
        ValueType::Double,
        ValueType::Data,
        ValueType::String,
        ValueType::Uuid,
        ValueType::Fd,
        ValueType::SendPort,
        ValueType::Array,
        ValueType::Dictionary,
        ValueType::RecvPort,
    ];

    /// The raw 32-bit tag written on the wire.
    pub const fn tag(self) -> u32 {
        self as u32
    }

    /// Human-readable name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int64 => "int64",
            ValueType::Uint64 => "uint64",
            ValueType::Double => "double",
            ValueType::Data => "data",
            ValueType::String => "string",
            ValueType::Uuid => "uuid",
            ValueType::Fd => "fd",
            ValueType::SendPort => "send_port",
            ValueType::Array => "array",
            ValueType::Dictionary => "dictionary",
            ValueType::RecvPort => "recv_port",
        }
    }

    /// Returns true for containers (ARRAY, DICT).
    pub const fn is_container(self) -> bool {
        matches!(self, ValueType::Array | ValueType::Dictionary)
    }

    /// Returns true for values whose payload travels as a port descriptor.
    pub const fn is_port(self) -> bool {
        matches!(
            self,
            ValueType::Fd | ValueType::SendPort | ValueType::RecvPort
        )
    }
}

impl TryFrom<u32> for ValueType {
    /// The unrecognized tag.
    type Error = u32;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        ValueType::ALL
            .iter()
            .copied()
            .find(|ty| ty.tag() == tag)
            .ok_or(tag)
    }
}

impl From<ValueType> for u32 {
    fn from(ty: ValueType) -> Self {
        ty.tag()
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_tag_matches_wire() {
        assert_eq!(ValueType::Dictionary.tag(), 0x0f);
        assert_eq!(ValueType::Dictionary.tag().to_le_bytes(), [0x0f, 0, 0, 0]);
    }

    #[test]
    fn try_from_accepts_every_known_tag() {
        for ty in ValueType::ALL {
            assert_eq!(ValueType::try_from(ty.tag()), Ok(ty));
        }
    }

    #[test]
    fn try_from_rejects_unknown_tags() {
        // pointer, date and shmem exist on the platform but are not carried here
        assert_eq!(ValueType::try_from(0x6), Err(0x6));
        assert_eq!(ValueType::try_from(0x7), Err(0x7));
        assert_eq!(ValueType::try_from(0xc), Err(0xc));
        assert_eq!(ValueType::try_from(0), Err(0));
        assert_eq!(ValueType::try_from(0xf000), Err(0xf000));
    }

    #[test]
    fn classification() {
        assert!(ValueType::Array.is_container());
        assert!(ValueType::Dictionary.is_container());
        assert!(!ValueType::String.is_container());
        assert!(ValueType::Fd.is_port());
        assert!(ValueType::SendPort.is_port());
        assert!(ValueType::RecvPort.is_port());
        assert!(!ValueType::Uuid.is_port());
    }
}
