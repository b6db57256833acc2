use super::*;

#[test]
fn mulaw_reference_values() {
    assert_eq!(mulaw_to_linear(0xFF), 0);
    assert_eq!(mulaw_to_linear(0x7F), 0);
    assert_eq!(mulaw_to_linear(0x00), -32124);
    assert_eq!(mulaw_to_linear(0x80), 32124);
}

#[test]
fn alaw_reference_values() {
    assert_eq!(alaw_to_linear(0xD5), 8);
    assert_eq!(alaw_to_linear(0x55), -8);
    assert_eq!(alaw_to_linear(0xAA), 32256);
    assert_eq!(alaw_to_linear(0x2A), -32256);
}

#[test]
fn expansion_is_sign_symmetric() {
    for b in 0u8..0x80 {
        assert_eq!(mulaw_to_linear(b), -mulaw_to_linear(b | 0x80));
        assert_eq!(alaw_to_linear(b), -alaw_to_linear(b | 0x80));
    }
}
