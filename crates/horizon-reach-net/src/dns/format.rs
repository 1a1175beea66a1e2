//! Address formatting helpers.

use std::net::Ipv4Addr;

/// Format a raw 4-byte IPv4 address (network byte order) as dotted decimal.
///
/// Returns `None` when `data` is not exactly four bytes long or holds the
/// unspecified address `0.0.0.0`. Both are ordinary "no answer" shapes, not
/// errors.
///
/// # Example
///
/// ```
/// use horizon_reach_net::dns::format_ipv4;
///
/// assert_eq!(format_ipv4(&[192, 168, 1, 20]).as_deref(), Some("192.168.1.20"));
/// assert_eq!(format_ipv4(&[0, 0, 0, 0]), None);
/// assert_eq!(format_ipv4(&[10, 0, 0]), None);
/// ```
pub fn format_ipv4(data: &[u8]) -> Option<String> {
    let octets: [u8; 4] = data.try_into().ok()?;
    let address = Ipv4Addr::from(octets);
    if address.is_unspecified() {
        return None;
    }
    Some(address.to_string())
}
