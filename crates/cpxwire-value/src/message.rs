use crate::dictionary::Dictionary;
use crate::port::Port;
use crate::value::Value;

/// Well-known message id the kernel delivers when the peer goes away.
pub const MSGID_CONNECTION_INTERRUPTED: i32 = 71;

/// Error string placed in the synthetic connection-interrupted payload.
pub const CONNECTION_INTERRUPTED_ERROR: &str = "Connection interrupted";

/// A message as seen by codec callers: routing ports, id and content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    /// Destination port and the disposition applied to it.
    pub remote_port: Port,
    /// Reply port and the disposition applied to it.
    pub local_port: Port,
    pub id: i32,
    /// Root of the value tree. Always a dictionary on the wire.
    pub content: Dictionary,
}

impl Message {
    pub fn new(remote_port: Port, local_port: Port, id: i32, content: Dictionary) -> Self {
        Self {
            remote_port,
            local_port,
            id,
            content,
        }
    }

    /// The message synthesized for `MSGID_CONNECTION_INTERRUPTED`.
    pub fn connection_interrupted(remote_port: Port, local_port: Port) -> Self {
        let mut content = Dictionary::with_capacity(1);
        content.set("error", Value::from(CONNECTION_INTERRUPTED_ERROR));
        Self::new(
            remote_port,
            local_port,
            MSGID_CONNECTION_INTERRUPTED,
            content,
        )
    }

    /// Ports in the content, in the order they travel as descriptors.
    pub fn ports(&self) -> Vec<Port> {
        let mut ports = Vec::new();
        self.content.visit_ports(&mut |_, port| ports.push(port));
        ports
    }
}
