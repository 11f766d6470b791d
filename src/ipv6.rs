//! IPv6 parsing and reserved-range classification.
//!
//! The parser accepts the RFC 4291 textual forms: full eight-group form,
//! `::` compression, and a dotted-quad tail (`::ffff:192.0.2.1`). Zone
//! identifiers (`%eth0`) are not accepted.

use std::net::Ipv6Addr;

use crate::ip::{Parsed, UNPARSEABLE};
use crate::ipv4::{classify_ipv4, parse_ipv4};

/// Parse a textual IPv6 address (without brackets) into 16 big-endian bytes.
pub fn parse_ipv6(text: &str) -> Parsed<[u8; 16]> {
    match parse_hextets(text) {
        Some(hextets) => Parsed::Addr(pack(hextets)),
        None => Parsed::Unparseable,
    }
}

fn parse_hextets(text: &str) -> Option<[u16; 8]> {
    let mut sides = text.split("::");
    let left = sides.next()?;
    let right = sides.next();
    if sides.next().is_some() {
        // More than one "::".
        return None;
    }

    let mut hextets = [0u16; 8];
    match right {
        None => {
            let groups = parse_side(left)?;
            if groups.len() != 8 {
                return None;
            }
            hextets.copy_from_slice(&groups);
        }
        Some(right) => {
            let head = parse_side(left)?;
            let tail = parse_side(right)?;
            // "::" stands for at least one zero group.
            if head.len() + tail.len() > 7 {
                return None;
            }
            hextets[..head.len()].copy_from_slice(&head);
            hextets[8 - tail.len()..].copy_from_slice(&tail);
        }
    }
    Some(hextets)
}

/// Parse one side of a `::` (or the whole address when there is none).
fn parse_side(side: &str) -> Option<Vec<u16>> {
    let mut groups = Vec::with_capacity(8);
    if side.is_empty() {
        return Some(groups);
    }

    let segments: Vec<&str> = side.split(':').collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.into_iter().enumerate() {
        if segment.contains('.') {
            if i != last {
                return None;
            }
            let v4 = parse_ipv4(segment).addr()?;
            groups.push((v4 >> 16) as u16);
            groups.push(v4 as u16);
        } else {
            if segment.is_empty()
                || segment.len() > 4
                || !segment.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return None;
            }
            groups.push(u16::from_str_radix(segment, 16).ok()?);
        }
        if groups.len() > 8 {
            return None;
        }
    }
    Some(groups)
}

fn pack(hextets: [u16; 8]) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    for (chunk, hextet) in bytes.chunks_exact_mut(2).zip(hextets) {
        chunk.copy_from_slice(&hextet.to_be_bytes());
    }
    bytes
}

/// Render 16 bytes in canonical compressed form (RFC 5952).
pub fn format_ipv6(bytes: [u8; 16]) -> String {
    Ipv6Addr::from(bytes).to_string()
}

/// Classify a parsed address. Returns the block reason, if any.
pub fn classify_ipv6(bytes: &[u8; 16]) -> Option<&'static str> {
    if bytes.iter().all(|&b| b == 0) {
        return Some("unspecified address (::)");
    }

    if bytes[..15].iter().all(|&b| b == 0) && bytes[15] == 1 {
        return Some("loopback address (::1)");
    }

    // IPv4-mapped (::ffff:a.b.c.d): the embedded address decides.
    if bytes[..10].iter().all(|&b| b == 0) && bytes[10] == 0xff && bytes[11] == 0xff {
        return classify_ipv4(embedded_ipv4(bytes));
    }

    // IPv4-compatible (::a.b.c.d), deprecated but still routed by some stacks.
    if bytes[..12].iter().all(|&b| b == 0) {
        return classify_ipv4(embedded_ipv4(bytes));
    }

    if bytes[0] & 0xfe == 0xfc {
        return Some("unique-local address (fc00::/7)");
    }

    if bytes[0] == 0xfe && bytes[1] & 0xc0 == 0x80 {
        return Some("link-local address (fe80::/10)");
    }

    if bytes[0] == 0xff {
        return Some("multicast address (ff00::/8)");
    }

    None
}

fn embedded_ipv4(bytes: &[u8; 16]) -> u32 {
    u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]])
}

/// Whether a textual IPv6 address is blocked. Unparseable input is blocked.
pub fn is_blocked_ipv6(text: &str) -> bool {
    blocked_reason(parse_ipv6(text)).is_some()
}

fn blocked_reason(parsed: Parsed<[u8; 16]>) -> Option<&'static str> {
    match parsed {
        Parsed::Addr(bytes) => classify_ipv6(&bytes),
        Parsed::Unparseable => Some(UNPARSEABLE),
    }
}
