//! Stateless memcache ASCII decoder
//!
//! Input is a single TCP payload plus the connection's ports; output is
//! zero or more `(key, size)` events. Decoding is one packet at a time:
//! lines that straddle a segment boundary are missed by design, and any
//! malformed or partial line is skipped without error. The decoder must
//! never abort capture on a parse failure, so every fallible path here
//! degrades to "no event".
//!
//! Keys are arbitrary non-whitespace bytes on the wire; they are decoded
//! lossily for display and hashing.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{digit1, space1},
    combinator::{map, map_res, opt},
    multi::separated_list1,
    sequence::preceded,
};

use crate::constants::protocol::CRLF;
use crate::queue::Event;

/// Recognizes memcache ASCII traffic for a single configured server port.
///
/// Traffic where neither endpoint matches the server port is ignored.
/// By default only the response side (`VALUE` lines) produces events, so
/// that `size` reflects real bandwidth; `count_requests` additionally
/// emits a zero-size event per requested key.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    server_port: u16,
    count_requests: bool,
}

impl Decoder {
    #[must_use]
    pub fn new(server_port: u16, count_requests: bool) -> Self {
        Self {
            server_port,
            count_requests,
        }
    }

    /// Decode one TCP payload into events.
    #[must_use]
    pub fn decode(&self, src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<Event> {
        if src_port == self.server_port {
            decode_response(payload)
        } else if dst_port == self.server_port && self.count_requests {
            decode_request(payload)
        } else {
            Vec::new()
        }
    }
}

/// Server -> client: every complete `VALUE <key> <flags> <bytes>` line
/// yields an event. `END` and data lines fail the parse and are skipped.
fn decode_response(payload: &[u8]) -> Vec<Event> {
    crlf_lines(payload)
        .filter_map(|line| value_line(line).ok().map(|(_, event)| event))
        .collect()
}

/// Client -> server: each key of a `GET`/`GETS` line yields a zero-size
/// event.
fn decode_request(payload: &[u8]) -> Vec<Event> {
    crlf_lines(payload)
        .filter_map(|line| get_line(line).ok())
        .flat_map(|(_, keys)| keys)
        .map(|key| Event::new(lossy_key(key), 0))
        .collect()
}

/// Iterator over complete CRLF-terminated lines. Trailing bytes without a
/// terminator are never yielded, which is what skips partial lines.
fn crlf_lines(payload: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    let mut rest = payload;
    std::iter::from_fn(move || {
        let pos = rest.windows(CRLF.len()).position(|w| w == CRLF)?;
        let line = &rest[..pos];
        rest = &rest[pos + CRLF.len()..];
        Some(line)
    })
}

fn lossy_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// A key is any run of non-whitespace bytes.
fn key_token(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(|c: u8| !c.is_ascii_whitespace()).parse(input)
}

fn number_u32(input: &[u8]) -> IResult<&[u8], u32> {
    map_res(digit1, |digits: &[u8]| {
        std::str::from_utf8(digits)
            .map_err(|_| ())
            .and_then(|s| s.parse::<u32>().map_err(|_| ()))
    })
    .parse(input)
}

/// `VALUE <key> <flags> <bytes> [<cas>]` -- the cas unique is present on
/// `gets` responses and ignored either way.
fn value_line(input: &[u8]) -> IResult<&[u8], Event> {
    map(
        (
            tag_no_case("VALUE"),
            space1,
            key_token,
            space1,
            digit1,
            space1,
            number_u32,
            opt(preceded(space1, digit1)),
        ),
        |(_, _, key, _, _flags, _, size, _cas)| Event::new(lossy_key(key), size),
    )
    .parse(input)
}

/// `GET <key>+` / `GETS <key>+` -- one or more space-separated keys.
fn get_line(input: &[u8]) -> IResult<&[u8], Vec<&[u8]>> {
    preceded(
        (alt((tag_no_case("GETS"), tag_no_case("GET"))), space1),
        separated_list1(space1, key_token),
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORT: u16 = 11211;

    fn response_decoder() -> Decoder {
        Decoder::new(PORT, false)
    }

    #[test]
    fn test_single_value_response() {
        let decoder = response_decoder();
        let events = decoder.decode(PORT, 49152, b"VALUE foo 0 3\r\nbar\r\nEND\r\n");
        assert_eq!(events, vec![Event::new("foo", 3)]);
    }

    #[test]
    fn test_multi_value_response() {
        let decoder = response_decoder();
        let events = decoder.decode(
            PORT,
            49152,
            b"VALUE a 0 1\r\nx\r\nVALUE b 0 2\r\nyy\r\nEND\r\n",
        );
        assert_eq!(events, vec![Event::new("a", 1), Event::new("b", 2)]);
    }

    #[test]
    fn test_gets_response_with_cas() {
        let decoder = response_decoder();
        let events = decoder.decode(PORT, 49152, b"VALUE counter 16 4 98765\r\n1234\r\nEND\r\n");
        assert_eq!(events, vec![Event::new("counter", 4)]);
    }

    #[test]
    fn test_end_only_emits_nothing() {
        let decoder = response_decoder();
        assert!(decoder.decode(PORT, 49152, b"END\r\n").is_empty());
    }

    #[test]
    fn test_malformed_value_line_skipped() {
        let decoder = response_decoder();
        assert!(decoder.decode(PORT, 49152, b"VALUE incomplete").is_empty());
        assert!(decoder.decode(PORT, 49152, b"VALUE onlykey\r\n").is_empty());
        assert!(decoder.decode(PORT, 49152, b"VALUE k x y\r\n").is_empty());
        assert!(decoder.decode(PORT, 49152, b"VALUEX k 0 1\r\n").is_empty());
    }

    #[test]
    fn test_partial_line_straddling_segment_skipped() {
        let decoder = response_decoder();
        // first VALUE line is complete, the second straddles the boundary
        let events = decoder.decode(PORT, 49152, b"VALUE a 0 1\r\nx\r\nVALUE b 0");
        assert_eq!(events, vec![Event::new("a", 1)]);
    }

    #[test]
    fn test_requests_ignored_by_default() {
        let decoder = response_decoder();
        assert!(decoder.decode(49152, PORT, b"GET foo\r\n").is_empty());
    }

    #[test]
    fn test_request_counting_when_enabled() {
        let decoder = Decoder::new(PORT, true);
        let events = decoder.decode(49152, PORT, b"GET foo bar baz\r\n");
        assert_eq!(
            events,
            vec![
                Event::new("foo", 0),
                Event::new("bar", 0),
                Event::new("baz", 0),
            ]
        );
    }

    #[test]
    fn test_gets_request_case_insensitive() {
        let decoder = Decoder::new(PORT, true);
        assert_eq!(
            decoder.decode(49152, PORT, b"gets session:1\r\n"),
            vec![Event::new("session:1", 0)]
        );
        assert_eq!(
            decoder.decode(49152, PORT, b"get session:2\r\n"),
            vec![Event::new("session:2", 0)]
        );
    }

    #[test]
    fn test_unknown_verbs_ignored() {
        let decoder = Decoder::new(PORT, true);
        assert!(decoder.decode(49152, PORT, b"SET foo 0 0 3\r\nbar\r\n").is_empty());
        assert!(decoder.decode(49152, PORT, b"DELETE foo\r\n").is_empty());
        assert!(decoder.decode(49152, PORT, b"GETTER foo\r\n").is_empty());
    }

    #[test]
    fn test_unrelated_ports_ignored() {
        let decoder = Decoder::new(PORT, true);
        assert!(decoder.decode(80, 49152, b"VALUE foo 0 3\r\n").is_empty());
        assert!(decoder.decode(49152, 80, b"GET foo\r\n").is_empty());
    }

    #[test]
    fn test_binary_key_bytes_tolerated() {
        let decoder = response_decoder();
        let events = decoder.decode(PORT, 49152, b"VALUE k\xff\xfe 0 9\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].size, 9);
        assert!(!events[0].key.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let decoder = response_decoder();
        assert!(decoder.decode(PORT, 49152, b"").is_empty());
    }
}
