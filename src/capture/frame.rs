//! Link/IP/TCP header walk
//!
//! Strips Ethernet, IPv4/IPv6 and TCP headers from a raw frame and hands
//! back the TCP payload with its ports. Anything we cannot (or choose not
//! to) decode -- non-IP ethertypes, fragments, extension headers, short or
//! empty segments -- yields `None`; the capture loop counts the skip and
//! moves on.

/// The interesting part of a frame: TCP ports plus the payload slice.
#[derive(Debug, PartialEq, Eq)]
pub struct TcpSegment<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

const ETHERNET_HEADER_LEN: usize = 14;
const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86DD;
const ETHERTYPE_VLAN: u16 = 0x8100;
const IPV6_HEADER_LEN: usize = 40;
const TCP_MIN_HEADER_LEN: usize = 20;
const IPPROTO_TCP: u8 = 6;

/// Extract the TCP payload from an Ethernet frame.
#[must_use]
pub fn tcp_segment(frame: &[u8]) -> Option<TcpSegment<'_>> {
    if frame.len() < ETHERNET_HEADER_LEN {
        return None;
    }
    let (mut ethertype, mut rest) = (
        u16::from_be_bytes([frame[12], frame[13]]),
        &frame[ETHERNET_HEADER_LEN..],
    );
    // one 802.1Q tag is common enough on mirrored ports to be worth peeling
    if ethertype == ETHERTYPE_VLAN {
        if rest.len() < 4 {
            return None;
        }
        ethertype = u16::from_be_bytes([rest[2], rest[3]]);
        rest = &rest[4..];
    }
    match ethertype {
        ETHERTYPE_IPV4 => ipv4_segment(rest),
        ETHERTYPE_IPV6 => ipv6_segment(rest),
        _ => None,
    }
}

fn ipv4_segment(datagram: &[u8]) -> Option<TcpSegment<'_>> {
    let version_ihl = *datagram.first()?;
    if version_ihl >> 4 != 4 {
        return None;
    }
    let header_len = usize::from(version_ihl & 0x0f) * 4;
    if header_len < 20 || datagram.len() < header_len {
        return None;
    }
    // reassembly is a non-goal: skip anything fragmented
    let flags_frag = u16::from_be_bytes([datagram[6], datagram[7]]);
    if flags_frag & 0x2000 != 0 || flags_frag & 0x1fff != 0 {
        return None;
    }
    if datagram[9] != IPPROTO_TCP {
        return None;
    }
    // total length strips any Ethernet trailer padding
    let total_len = usize::from(u16::from_be_bytes([datagram[2], datagram[3]]));
    let end = total_len.clamp(header_len, datagram.len());
    tcp_payload(&datagram[header_len..end])
}

fn ipv6_segment(datagram: &[u8]) -> Option<TcpSegment<'_>> {
    if datagram.len() < IPV6_HEADER_LEN || *datagram.first()? >> 4 != 6 {
        return None;
    }
    // extension header chains (fragments included) are skipped wholesale
    if datagram[6] != IPPROTO_TCP {
        return None;
    }
    let payload_len = usize::from(u16::from_be_bytes([datagram[4], datagram[5]]));
    let end = (IPV6_HEADER_LEN + payload_len).min(datagram.len());
    tcp_payload(&datagram[IPV6_HEADER_LEN..end])
}

fn tcp_payload(segment: &[u8]) -> Option<TcpSegment<'_>> {
    if segment.len() < TCP_MIN_HEADER_LEN {
        return None;
    }
    let data_offset = usize::from(segment[12] >> 4) * 4;
    if data_offset < TCP_MIN_HEADER_LEN || segment.len() < data_offset {
        return None;
    }
    let payload = &segment[data_offset..];
    if payload.is_empty() {
        return None;
    }
    Some(TcpSegment {
        src_port: u16::from_be_bytes([segment[0], segment[1]]),
        dst_port: u16::from_be_bytes([segment[2], segment[3]]),
        payload,
    })
}
