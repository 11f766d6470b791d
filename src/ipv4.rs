//! IPv4 parsing and reserved-range classification.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::ip::{Parsed, UNPARSEABLE};

/// Reserved IPv4 ranges, checked in order.
const BLOCKED_RANGES: &[(Ipv4Net, &str)] = &[
    (
        Ipv4Net::new_assert(Ipv4Addr::new(0, 0, 0, 0), 8),
        "\"this\" network (0.0.0.0/8)",
    ),
    (
        Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 8),
        "private address (10.0.0.0/8)",
    ),
    (
        Ipv4Net::new_assert(Ipv4Addr::new(127, 0, 0, 0), 8),
        "loopback address (127.0.0.0/8)",
    ),
    (
        Ipv4Net::new_assert(Ipv4Addr::new(169, 254, 0, 0), 16),
        "link-local address (169.254.0.0/16)",
    ),
    (
        Ipv4Net::new_assert(Ipv4Addr::new(172, 16, 0, 0), 12),
        "private address (172.16.0.0/12)",
    ),
    (
        Ipv4Net::new_assert(Ipv4Addr::new(192, 168, 0, 0), 16),
        "private address (192.168.0.0/16)",
    ),
    (
        Ipv4Net::new_assert(Ipv4Addr::new(100, 64, 0, 0), 10),
        "shared address space (100.64.0.0/10)",
    ),
];

const BROADCAST: u32 = u32::MAX;

/// Parse strict dotted-decimal: four groups of 0-255, digits only.
///
/// Leading zeros are rejected since other parsers read them as octal
/// (`0177.0.0.1` is `127.0.0.1` to them).
pub fn parse_ipv4(text: &str) -> Parsed<u32> {
    let mut value: u32 = 0;
    let mut groups = 0;

    for part in text.split('.') {
        groups += 1;
        if groups > 4
            || part.is_empty()
            || !part.bytes().all(|b| b.is_ascii_digit())
            || (part.len() > 1 && part.starts_with('0'))
        {
            return Parsed::Unparseable;
        }
        let Ok(octet) = part.parse::<u8>() else {
            return Parsed::Unparseable;
        };
        value = (value << 8) | u32::from(octet);
    }

    if groups == 4 {
        Parsed::Addr(value)
    } else {
        Parsed::Unparseable
    }
}

/// CIDR membership: shift both sides right by the host bits and compare.
pub fn in_cidr(addr: u32, net: &Ipv4Net) -> bool {
    let host_bits = 32 - u32::from(net.prefix_len());
    let base = u32::from(net.network());
    // A /0 shifts by 32, which would overflow; everything matches it.
    addr.checked_shr(host_bits).unwrap_or(0) == base.checked_shr(host_bits).unwrap_or(0)
}

/// Classify a parsed address. Returns the block reason, if any.
pub fn classify_ipv4(addr: u32) -> Option<&'static str> {
    if addr == BROADCAST {
        return Some("limited broadcast (255.255.255.255)");
    }
    BLOCKED_RANGES
        .iter()
        .find(|(net, _)| in_cidr(addr, net))
        .map(|(_, reason)| *reason)
}

/// Whether a dotted-decimal string is blocked. Unparseable input is blocked.
pub fn is_blocked_ipv4(text: &str) -> bool {
    blocked_reason(parse_ipv4(text)).is_some()
}

fn blocked_reason(parsed: Parsed<u32>) -> Option<&'static str> {
    match parsed {
        Parsed::Addr(addr) => classify_ipv4(addr),
        Parsed::Unparseable => Some(UNPARSEABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_packs_most_significant_first() {
        assert_eq!(parse_ipv4("127.0.0.1"), Parsed::Addr(0x7f00_0001));
        assert_eq!(parse_ipv4("192.0.2.1"), Parsed::Addr(0xc000_0201));
        assert_eq!(parse_ipv4("0.0.0.0"), Parsed::Addr(0));
        assert_eq!(parse_ipv4("255.255.255.255"), Parsed::Addr(u32::MAX));
    }

    #[test]
    fn test_parse_rejects_wrong_group_count() {
        assert!(parse_ipv4("127.1").is_unparseable());
        assert!(parse_ipv4("127.0.1").is_unparseable());
        assert!(parse_ipv4("1.2.3.4.5").is_unparseable());
        assert!(parse_ipv4("2130706433").is_unparseable());
        assert!(parse_ipv4("").is_unparseable());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_ipv4("1.2.3.4 ").is_unparseable());
        assert!(parse_ipv4(" 1.2.3.4").is_unparseable());
        assert!(parse_ipv4("1.2..4").is_unparseable());
        assert!(parse_ipv4("1.2.3.").is_unparseable());
        assert!(parse_ipv4("+1.2.3.4").is_unparseable());
        assert!(parse_ipv4("256.0.0.1").is_unparseable());
        assert!(parse_ipv4("1.2.3.1000").is_unparseable());
    }

    #[test]
    fn test_parse_rejects_octal_and_hex() {
        assert!(parse_ipv4("0177.0.0.1").is_unparseable());
        assert!(parse_ipv4("127.0.0.01").is_unparseable());
        assert!(parse_ipv4("0x7f.0.0.1").is_unparseable());
        assert!(parse_ipv4("0x7f000001").is_unparseable());
    }

    #[test]
    fn test_blocked_examples() {
        assert!(is_blocked_ipv4("127.0.0.1"));
        assert!(!is_blocked_ipv4("8.8.8.8"));
        assert!(is_blocked_ipv4("100.64.0.1"));
        assert!(is_blocked_ipv4("255.255.255.255"));
    }

    #[test]
    fn test_unparseable_is_blocked() {
        assert!(is_blocked_ipv4("not-an-ip"));
        assert!(is_blocked_ipv4("127.1"));
        assert!(is_blocked_ipv4("8.8.8"));
    }

    #[test]
    fn test_range_boundaries() {
        let cases = [
            ("0.255.255.255", true),
            ("1.0.0.0", false),
            ("9.255.255.255", false),
            ("10.0.0.0", true),
            ("10.255.255.255", true),
            ("11.0.0.0", false),
            ("126.255.255.255", false),
            ("127.255.255.255", true),
            ("128.0.0.0", false),
            ("169.253.255.255", false),
            ("169.254.169.254", true),
            ("169.255.0.0", false),
            ("172.15.255.255", false),
            ("172.16.0.0", true),
            ("172.31.255.255", true),
            ("172.32.0.0", false),
            ("192.167.255.255", false),
            ("192.168.0.0", true),
            ("192.168.255.255", true),
            ("192.169.0.0", false),
            ("100.63.255.255", false),
            ("100.64.0.0", true),
            ("100.127.255.255", true),
            ("100.128.0.0", false),
            ("255.255.255.254", false),
            ("93.184.216.34", false),
            ("203.0.113.9", false),
        ];
        for (addr, blocked) in cases {
            assert_eq!(is_blocked_ipv4(addr), blocked, "{addr}");
        }
    }

    #[test]
    fn test_in_cidr_edges() {
        let all = Ipv4Net::new_assert(Ipv4Addr::new(0, 0, 0, 0), 0);
        assert!(in_cidr(0, &all));
        assert!(in_cidr(u32::MAX, &all));

        let host = Ipv4Net::new_assert(Ipv4Addr::new(192, 0, 2, 7), 32);
        assert!(in_cidr(0xc000_0207, &host));
        assert!(!in_cidr(0xc000_0208, &host));
    }

    proptest! {
        #[test]
        fn prop_in_cidr_agrees_with_ipnet(addr: u32, base: u32, prefix in 0u8..=32) {
            let net = Ipv4Net::new(Ipv4Addr::from(base), prefix).unwrap().trunc();
            prop_assert_eq!(in_cidr(addr, &net), net.contains(&Ipv4Addr::from(addr)));
        }

        #[test]
        fn prop_parse_agrees_with_display(addr: u32) {
            let text = Ipv4Addr::from(addr).to_string();
            prop_assert_eq!(parse_ipv4(&text), Parsed::Addr(addr));
        }

        #[test]
        fn prop_parse_never_panics(text in "\\PC{0,24}") {
            let _ = parse_ipv4(&text);
        }
    }
}
