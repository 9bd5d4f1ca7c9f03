#![cfg(target_endian = "little")]

use cpxwire_codec::mach::{
    msgh_bits, BODY_SIZE, MACH_MSGH_BITS_COMPLEX, MACH_MSG_PORT_DESCRIPTOR, PORT_DESCRIPTOR_SIZE,
};
use cpxwire_codec::{
    deserialize, serialize, serialize_envelope, CodecConfig, CodecError, Decoded, MachHeader,
    HEADER_SIZE, MAGIC,
};
use cpxwire_value::port::{COPY_SEND, MAKE_SEND, MOVE_RECEIVE, MOVE_SEND};
use cpxwire_value::{Array, Dictionary, Message, Port, Value};
use uuid::Uuid;

fn message(content: Dictionary) -> Message {
    Message::new(Port::new(0x103, COPY_SEND), Port::NULL, 0, content)
}

fn inline_bytes(content: &Dictionary) -> Vec<u8> {
    serialize_envelope(content, &CodecConfig::default())
        .expect("envelope should encode")
        .into_parts()
        .0
}

fn decode(bytes: &[u8]) -> Message {
    deserialize(bytes)
        .expect("message should decode")
        .into_message()
        .expect("message should not be an interruption")
}

fn single_string() -> Dictionary {
    let mut content = Dictionary::new();
    content.set("k", Value::from("v"));
    content
}

fn kitchen_sink() -> Dictionary {
    let mut nested = Dictionary::new();
    nested.set("recv", Value::RecvPort(Port::new(0x2b03, MOVE_RECEIVE)));
    nested.set("empty", Value::Dictionary(Dictionary::new()));

    let mut list = Array::new();
    list.set(0, Value::from("zero"));
    list.set(3, Value::SendPort(Port::new(0x3c07, MAKE_SEND)));

    let mut content = Dictionary::new();
    content.set("null", Value::Null);
    content.set("yes", Value::Bool(true));
    content.set("no", Value::Bool(false));
    content.set("u", Value::from(u64::MAX));
    content.set("i", Value::from(-42i64));
    content.set("pi", Value::from(std::f64::consts::PI));
    content.set("s", Value::from("hello, world"));
    content.set("b", Value::from(vec![1u8, 2, 3, 4, 5]));
    content.set(
        "id",
        Value::Uuid(Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff)),
    );
    content.set("send", Value::SendPort(Port::new(0x1a03, MOVE_SEND)));
    content.set("nested", Value::Dictionary(nested));
    content.set("list", Value::Array(list));
    content.set("fd", Value::Fd(Port::new(0x4d0b, COPY_SEND)));
    content
}

#[test]
fn minimal_empty_dictionary_envelope() {
    let inline = inline_bytes(&Dictionary::new());
    assert_eq!(
        inline,
        [
            0x43, 0x50, 0x58, 0x40, 0x05, 0x00, 0x00, 0x00, // magic
            0x0f, 0x00, 0x00, 0x00, // DICT
            0x04, 0x00, 0x00, 0x00, // byte size covers the count only
            0x00, 0x00, 0x00, 0x00, // count
        ]
    );

    let wire = serialize(&Message::default()).unwrap();
    let header = wire.header().unwrap();
    assert_eq!(header.bits, 0);
    assert_eq!(header.size as usize, HEADER_SIZE + inline.len());
    assert_eq!(&wire.as_bytes()[HEADER_SIZE..], inline.as_slice());

    assert!(decode(wire.as_bytes()).content.is_empty());
}

#[test]
fn single_string_entry() {
    let inline = inline_bytes(&single_string());
    assert_eq!(
        inline,
        [
            0x43, 0x50, 0x58, 0x40, 0x05, 0x00, 0x00, 0x00, // magic
            0x0f, 0x00, 0x00, 0x00, // DICT
            0x14, 0x00, 0x00, 0x00, // byte size 20
            0x01, 0x00, 0x00, 0x00, // count
            0x6b, 0x00, 0x00, 0x00, // "k"
            0x09, 0x00, 0x00, 0x00, // STRING
            0x02, 0x00, 0x00, 0x00, // length incl. NUL
            0x76, 0x00, 0x00, 0x00, // "v"
        ]
    );

    let wire = serialize(&message(single_string())).unwrap();
    assert_eq!(decode(wire.as_bytes()).content, single_string());
}

#[test]
fn integer_and_double_entries() {
    let mut content = Dictionary::new();
    content.set("n", Value::from(0x0102_0304_0506_0708u64));
    content.set("d", Value::from(1.5));

    let inline = inline_bytes(&content);
    assert_eq!(
        &inline[12..],
        [
            0x24, 0x00, 0x00, 0x00, // byte size 36
            0x02, 0x00, 0x00, 0x00, // count
            0x6e, 0x00, 0x00, 0x00, // "n"
            0x04, 0x00, 0x00, 0x00, // UINT64
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, //
            0x64, 0x00, 0x00, 0x00, // "d"
            0x05, 0x00, 0x00, 0x00, // DOUBLE
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x3f, // 1.5
        ]
    );

    let decoded = decode(serialize(&message(content.clone())).unwrap().as_bytes());
    let keys: Vec<&str> = decoded.content.keys().collect();
    assert_eq!(keys, vec!["n", "d"]);
    assert_eq!(decoded.content, content);
}

#[test]
fn port_travels_as_descriptor() {
    let mut content = Dictionary::new();
    content.set("p", Value::SendPort(Port::new(0xdead_beef, 17)));
    let wire = serialize(&message(content.clone())).unwrap();
    let bytes = wire.as_bytes();

    let header = MachHeader::parse(bytes).unwrap();
    assert_eq!(
        header.bits,
        MACH_MSGH_BITS_COMPLEX | msgh_bits(COPY_SEND, 0)
    );
    assert_eq!(header.remote_port, 0x103);
    assert_eq!(header.size as usize, bytes.len());
    assert_eq!(bytes.len(), HEADER_SIZE + BODY_SIZE + PORT_DESCRIPTOR_SIZE + 28);

    assert_eq!(
        &bytes[HEADER_SIZE..],
        [
            0x01, 0x00, 0x00, 0x00, // descriptor count
            0xef, 0xbe, 0xad, 0xde, // name
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
            0x11, // disposition
            MACH_MSG_PORT_DESCRIPTOR,
            0x43, 0x50, 0x58, 0x40, 0x05, 0x00, 0x00, 0x00, // magic
            0x0f, 0x00, 0x00, 0x00, // DICT
            0x0c, 0x00, 0x00, 0x00, // byte size 12
            0x01, 0x00, 0x00, 0x00, // count
            0x70, 0x00, 0x00, 0x00, // "p"
            0x0d, 0x00, 0x00, 0x00, // SEND_PORT, no payload
        ]
    );

    let decoded = decode(bytes);
    assert_eq!(
        decoded.content.get("p"),
        Some(&Value::SendPort(Port::new(0xdead_beef, 17)))
    );
    assert_eq!(decoded.remote_port, Port::new(0x103, COPY_SEND));
}

#[test]
fn connection_interrupted_is_not_parsed() {
    let mut bytes = Vec::new();
    MachHeader {
        size: (HEADER_SIZE + 8) as u32,
        id: 71,
        ..MachHeader::default()
    }
    .write_to(&mut bytes);
    // garbage where the envelope would be
    bytes.extend_from_slice(&[0xff; 8]);

    let decoded = deserialize(&bytes).unwrap();
    assert!(decoded.is_connection_interrupted());
    let Decoded::ConnectionInterrupted(msg) = decoded else {
        panic!("expected an interruption");
    };
    assert_eq!(
        msg.content.get("error").and_then(Value::as_str),
        Some("Connection interrupted")
    );
    assert_eq!(msg.content.len(), 1);
}

#[test]
fn dropping_the_last_byte_is_out_of_bounds() {
    let mut bytes = serialize(&message(single_string())).unwrap().into_bytes();
    bytes.pop();

    assert!(matches!(
        deserialize(&bytes),
        Err(CodecError::OutOfBounds { .. })
    ));

    // same truncation with a header that agrees with the shorter buffer
    let size = bytes.len() as u32;
    bytes[4..8].copy_from_slice(&size.to_ne_bytes());
    assert!(matches!(
        deserialize(&bytes),
        Err(CodecError::OutOfBounds { .. })
    ));
}

#[test]
fn truncation_anywhere_is_an_error() {
    let full = serialize(&message(kitchen_sink())).unwrap().into_bytes();

    for cut in 0..full.len() {
        let truncated = &full[..cut];
        assert!(
            matches!(deserialize(truncated), Err(CodecError::OutOfBounds { .. })),
            "cut at {cut}"
        );

        if cut >= HEADER_SIZE {
            let mut patched = truncated.to_vec();
            patched[4..8].copy_from_slice(&(cut as u32).to_ne_bytes());
            assert!(
                matches!(
                    deserialize(&patched),
                    Err(CodecError::OutOfBounds { .. } | CodecError::MalformedString { .. })
                ),
                "patched cut at {cut}"
            );
        }
    }
}

#[test]
fn corrupt_magic_is_a_bad_envelope() {
    let mut bytes = serialize(&message(single_string())).unwrap().into_bytes();
    bytes[HEADER_SIZE + 4] = 0x04; // version 4

    let err = deserialize(&bytes).unwrap_err();
    let CodecError::BadEnvelope { found } = err else {
        panic!("expected BadEnvelope, got {err:?}");
    };
    assert_eq!(&found[..4], b"CPX@");
    assert_eq!(found[4], 0x04);
}

#[test]
fn unknown_root_tag_is_rejected() {
    let mut bytes = serialize(&Message::default()).unwrap().into_bytes();
    let tag_at = HEADER_SIZE + MAGIC.len();
    bytes[tag_at..tag_at + 4].copy_from_slice(&0x6u32.to_ne_bytes());

    assert!(matches!(
        deserialize(&bytes),
        Err(CodecError::UnknownTag { tag: 0x6, offset }) if offset == tag_at
    ));
}

#[test]
fn roundtrip_preserves_structure() {
    let msg = Message::new(
        Port::new(0x103, COPY_SEND),
        Port::new(0x207, MAKE_SEND),
        0x1234,
        kitchen_sink(),
    );
    let decoded = decode(serialize(&msg).unwrap().as_bytes());
    assert_eq!(decoded, msg);
}

#[test]
fn array_gaps_roundtrip_as_null() {
    let mut list = Array::new();
    list.set(4, Value::from(1u64));
    let mut content = Dictionary::new();
    content.set("gaps", Value::Array(list));

    let decoded = decode(serialize(&message(content)).unwrap().as_bytes());
    let list = decoded.content.get("gaps").and_then(Value::as_array).unwrap();
    assert_eq!(list.len(), 5);
    assert!(list.iter().take(4).all(Value::is_null));
}

#[test]
fn decoded_ports_follow_descriptor_order() {
    let content = kitchen_sink();
    let wire = serialize(&message(content.clone())).unwrap();
    let bytes = wire.as_bytes();

    let count = u32::from_ne_bytes(bytes[HEADER_SIZE..HEADER_SIZE + 4].try_into().unwrap());
    let descriptors: Vec<Port> = (0..count as usize)
        .map(|i| {
            let at = HEADER_SIZE + BODY_SIZE + i * PORT_DESCRIPTOR_SIZE;
            Port::new(
                u32::from_ne_bytes(bytes[at..at + 4].try_into().unwrap()),
                bytes[at + 10],
            )
        })
        .collect();

    let decoded = decode(bytes);
    assert_eq!(decoded.ports(), descriptors);
    assert_eq!(
        descriptors,
        vec![
            Port::new(0x1a03, MOVE_SEND),
            Port::new(0x2b03, MOVE_RECEIVE),
            Port::new(0x3c07, MAKE_SEND),
            Port::new(0x4d0b, COPY_SEND),
        ]
    );
}

#[test]
fn root_byte_size_covers_the_payload() {
    let inline = inline_bytes(&kitchen_sink());
    assert_eq!(inline.len() % 4, 0);
    let byte_size = u32::from_ne_bytes(inline[12..16].try_into().unwrap()) as usize;
    assert_eq!(byte_size, inline.len() - 16);
}

#[test]
fn reserialization_is_byte_identical() {
    let msg = Message::new(
        Port::new(0x103, COPY_SEND),
        Port::new(0x207, MAKE_SEND),
        7,
        kitchen_sink(),
    );
    let first = serialize(&msg).unwrap();
    let second = serialize(&decode(first.as_bytes())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn duplicate_wire_keys_survive_roundtrip() {
    let mut content = Dictionary::new();
    content.push("k".to_string(), Value::from(1u64));
    content.push("k".to_string(), Value::from(2u64));
    let wire = serialize(&message(content)).unwrap();

    let decoded = decode(wire.as_bytes());
    let values: Vec<u64> = decoded
        .content
        .iter()
        .filter_map(|(_, v)| v.as_u64())
        .collect();
    assert_eq!(values, vec![1, 2]);
    assert_eq!(serialize(&decoded).unwrap(), wire);
}
