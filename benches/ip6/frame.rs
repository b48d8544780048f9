// fixed header, hop-by-hop (router alert), destination options, udp
#[allow(dead_code)]
pub static FRAME_BYTES: [u8; 80] = [
    0x60, 0x00, 0x00, 0x00, 0x00, 0x28, 0x00, 0x40, 0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x3c, 0x00, 0x05, 0x02, 0x00, 0x00, 0x01, 0x00,
    0x11, 0x00, 0x01, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x35, 0x13, 0x88, 0x00, 0x18, 0x00, 0x00,
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];

/// `FRAME_BYTES` with the udp payload grown to `payload_len` bytes.
#[allow(dead_code)]
pub fn large_frame(payload_len: usize) -> Vec<u8> {
    let mut pkt = FRAME_BYTES[..64].to_vec();
    pkt.extend((0..payload_len).map(|i| i as u8));
    let plen = (pkt.len() - 40) as u16;
    pkt[4..6].copy_from_slice(&plen.to_be_bytes());
    let ulen = (8 + payload_len) as u16;
    pkt[60..62].copy_from_slice(&ulen.to_be_bytes());
    pkt
}
