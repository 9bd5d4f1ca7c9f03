use bytes::Bytes;
use uuid::Uuid;

use crate::array::Array;
use crate::dictionary::Dictionary;
use crate::port::Port;
use crate::types::ValueType;

/// A node of the value tree.
///
/// Each variant maps to exactly one [`ValueType`]. Values own their payloads;
/// dropping a container drops its children.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Uint64(u64),
    Int64(i64),
    Double(f64),
    String(String),
    Data(Bytes),
    Uuid(Uuid),
    Array(Array),
    Dictionary(Dictionary),
    /// File descriptor carried as a port right.
    Fd(Port),
    SendPort(Port),
    RecvPort(Port),
}

impl Value {
    /// The wire tag for this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Uint64(_) => ValueType::Uint64,
            Value::Int64(_) => ValueType::Int64,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Data(_) => ValueType::Data,
            Value::Uuid(_) => ValueType::Uuid,
            Value::Array(_) => ValueType::Array,
            Value::Dictionary(_) => ValueType::Dictionary,
            Value::Fd(_) => ValueType::Fd,
            Value::SendPort(_) => ValueType::SendPort,
            Value::RecvPort(_) => ValueType::RecvPort,
        }
    }

    /// The port carried by FD, SEND_PORT and RECV_PORT values.
    pub fn port(&self) -> Option<Port> {
        match self {
            Value::Fd(port) | Value::SendPort(port) | Value::RecvPort(port) => Some(*port),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Value::Uuid(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(v) => Some(v),
            _ => None,
        }
    }

    /// Visit every port in the tree in pre-order.
    ///
    /// This is the order in which the encoder collects port descriptors, and
    /// the order in which the decoder hands them back out.
    pub fn visit_ports<F: FnMut(&Value, Port)>(&self, visit: &mut F) {
        match self {
            Value::Array(array) => {
                for value in array.iter() {
                    value.visit_ports(visit);
                }
            }
            Value::Dictionary(dict) => dict.visit_ports(visit),
            Value::Fd(port) | Value::SendPort(port) | Value::RecvPort(port) => {
                visit(self, *port)
            }
            _ => {}
        }
    }

    /// Collect every port in the tree in pre-order.
    pub fn ports(&self) -> Vec<Port> {
        let mut ports = Vec::new();
        self.visit_ports(&mut |_, port| ports.push(port));
        ports
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Data(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Data(Bytes::from(v))
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Dictionary> for Value {
    fn from(v: Dictionary) -> Self {
        Value::Dictionary(v)
    }
}
