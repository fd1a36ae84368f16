use netpulse::{MessageBuffer, bits_to_hold_u32, bits_to_hold_u64};

#[test]
fn test_bits_to_hold() {
    assert_eq!(bits_to_hold_u32(0), 1);
    assert_eq!(bits_to_hold_u32(1), 1);
    assert_eq!(bits_to_hold_u32(2), 2);
    assert_eq!(bits_to_hold_u32(255), 8);
    assert_eq!(bits_to_hold_u32(256), 9);
    assert_eq!(bits_to_hold_u32(u32::MAX), 32);
    assert_eq!(bits_to_hold_u64(u64::MAX), 64);
}

#[test]
fn test_unit_float_zero_is_not_representable() {
    // Reader and writer both bias by one; the smallest decodable value is
    // 1 / 2^bits, never 0.0. Wire quirk, kept for interop.
    let mut buf = MessageBuffer::new();
    buf.write_unit_f32(0.0, 8);
    assert_eq!(buf.read_unit_f32(8).unwrap(), 1.0 / 256.0);
}

#[test]
fn test_unit_float_one_roundtrips() {
    let mut buf = MessageBuffer::new();
    buf.write_unit_f32(1.0, 8);
    assert_eq!(buf.read_unit_f32(8).unwrap(), 1.0);
}

#[test]
fn test_unit_float_error_bound() {
    for bits in [4u32, 8, 12, 16] {
        let step = 1.0 / (1u64 << bits) as f32;
        for i in 0..=20 {
            let value = i as f32 / 20.0;
            let mut buf = MessageBuffer::new();
            buf.write_unit_f32(value, bits);
            let got = buf.read_unit_f32(bits).unwrap();
            assert!(
                (got - value).abs() <= 1.5 * step,
                "{value} in {bits} bits decoded to {got}"
            );
        }
    }
}

#[test]
fn test_signed_unit_float_error_bound() {
    for value in [-1.0f32, -0.5, -0.01, 0.25, 0.99, 1.0] {
        let mut buf = MessageBuffer::new();
        buf.write_signed_unit_f32(value, 10);
        let got = buf.read_signed_unit_f32(10).unwrap();
        assert!((got - value).abs() <= 3.0 / 1024.0, "{value} -> {got}");
    }
}

#[test]
fn test_ranged_float() {
    let mut buf = MessageBuffer::new();
    buf.write_ranged_f32(72.5, -100.0, 100.0, 16);
    assert_eq!(buf.bit_length(), 16);
    let got = buf.read_ranged_f32(-100.0, 100.0, 16).unwrap();
    assert!((got - 72.5).abs() <= 200.0 / 65535.0, "got {got}");
}

#[test]
fn test_ranged_float_endpoints_are_exact() {
    let mut buf = MessageBuffer::new();
    buf.write_ranged_f32(-100.0, -100.0, 100.0, 12);
    buf.write_ranged_f32(100.0, -100.0, 100.0, 12);
    assert_eq!(buf.read_ranged_f32(-100.0, 100.0, 12).unwrap(), -100.0);
    assert_eq!(buf.read_ranged_f32(-100.0, 100.0, 12).unwrap(), 100.0);
}

#[test]
fn test_ranged_integer_width_and_value() {
    let mut buf = MessageBuffer::new();
    let bits = buf.write_ranged_i32(7, 0, 10);
    assert_eq!(bits, 4);
    assert_eq!(buf.bit_length(), 4);
    assert_eq!(buf.read_ranged_i32(0, 10).unwrap(), 7);
}

#[test]
fn test_ranged_integer_negative_bounds() {
    let mut buf = MessageBuffer::new();
    let bits = buf.write_ranged_i32(-5, -10, 10);
    assert_eq!(bits, 5); // span 20 needs five bits
    assert_eq!(buf.read_ranged_i32(-10, 10).unwrap(), -5);
}

#[test]
fn test_ranged_integer_full_domain() {
    let mut buf = MessageBuffer::new();
    let bits = buf.write_ranged_i64(i64::MIN + 3, i64::MIN, i64::MAX);
    assert_eq!(bits, 64);
    assert_eq!(
        buf.read_ranged_i64(i64::MIN, i64::MAX).unwrap(),
        i64::MIN + 3
    );
}

#[test]
fn test_ranged_integer_degenerate_range() {
    let mut buf = MessageBuffer::new();
    let bits = buf.write_ranged_i32(42, 42, 42);
    assert_eq!(bits, 1);
    assert_eq!(buf.read_ranged_i32(42, 42).unwrap(), 42);
}
