use netpulse::{CodecError, MessageBuffer};

#[test]
fn test_known_encoding() {
    let mut buf = MessageBuffer::new();
    buf.write_var_u32(300);
    assert_eq!(buf.as_bytes(), [0xAC, 0x02]);

    let mut buf = MessageBuffer::from_bytes(vec![0xAC, 0x02]);
    assert_eq!(buf.read_var_u32().unwrap(), 300);
    assert_eq!(buf.read_position(), 16);
}

#[test]
fn test_single_byte_values() {
    for value in [0u32, 1, 42, 127] {
        let mut buf = MessageBuffer::new();
        buf.write_var_u32(value);
        assert_eq!(buf.byte_length(), 1, "value {value}");
        assert_eq!(buf.read_var_u32().unwrap(), value);
    }
}

#[test]
fn test_signed_small_magnitudes_stay_one_byte() {
    for value in [0i32, -1, 1, -2, 2] {
        let mut buf = MessageBuffer::new();
        buf.write_var_i32(value);
        assert_eq!(buf.byte_length(), 1, "value {value}");
        assert_eq!(buf.read_var_i32().unwrap(), value);
    }
}

#[test]
fn test_extreme_values() {
    let mut buf = MessageBuffer::new();
    buf.write_var_u32(u32::MAX);
    buf.write_var_u64(u64::MAX);
    buf.write_var_i32(i32::MIN);
    buf.write_var_i32(i32::MAX);
    buf.write_var_i64(i64::MIN);
    buf.write_var_i64(i64::MAX);

    assert_eq!(buf.read_var_u32().unwrap(), u32::MAX);
    assert_eq!(buf.read_var_u64().unwrap(), u64::MAX);
    assert_eq!(buf.read_var_i32().unwrap(), i32::MIN);
    assert_eq!(buf.read_var_i32().unwrap(), i32::MAX);
    assert_eq!(buf.read_var_i64().unwrap(), i64::MIN);
    assert_eq!(buf.read_var_i64().unwrap(), i64::MAX);
}

#[test]
fn test_maximum_encoded_widths() {
    let mut buf = MessageBuffer::new();
    buf.write_var_u32(u32::MAX);
    assert_eq!(buf.byte_length(), 5);

    let mut buf = MessageBuffer::new();
    buf.write_var_u64(u64::MAX);
    assert_eq!(buf.byte_length(), 10);
}

#[test]
fn test_overlong_chain_is_malformed() {
    let mut buf = MessageBuffer::from_bytes(vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
    assert_eq!(buf.read_var_u32(), Err(CodecError::MalformedVarint));
    assert_eq!(buf.read_position(), 0);

    let mut buf = MessageBuffer::from_bytes(vec![0x80; 11]);
    assert_eq!(buf.read_var_u64(), Err(CodecError::MalformedVarint));
    assert_eq!(buf.read_position(), 0);
}

#[test]
fn test_truncated_chain_rewinds() {
    let mut buf = MessageBuffer::from_bytes(vec![0x80]);
    assert_eq!(buf.read_var_u32(), Err(CodecError::ReadOverflow));
    assert_eq!(buf.read_position(), 0);
}

#[test]
fn test_varint_at_unaligned_offset() {
    let mut buf = MessageBuffer::new();
    buf.write_bool(true);
    buf.write_var_u32(300);
    assert!(buf.read_bool().unwrap());
    assert_eq!(buf.read_var_u32().unwrap(), 300);
    assert_eq!(buf.read_position(), 17);
}
