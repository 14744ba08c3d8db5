//! Wire packets of the v1 serialization format.
//!
//! A serialized macaroon is base64 over a stream of packets, each one laid out
//! as `HHHH key data\n` where `HHHH` is the total packet length (header
//! included) in four lowercase hex digits.

use super::{DecodeError, EncodeError};
use base64ct::{Base64Unpadded, Base64UrlUnpadded, Encoding};
use std::fmt;

pub const HEADER_LEN: usize = 4;
pub const MAX_PACKET_LEN: usize = 0xffff;

// header + one key byte + separator + terminator
const MIN_PACKET_LEN: usize = HEADER_LEN + 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKey {
    Location,
    Identifier,
    Cid,
    Vid,
    Cl,
    Signature,
}

impl PacketKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Identifier => "identifier",
            Self::Cid => "cid",
            Self::Vid => "vid",
            Self::Cl => "cl",
            Self::Signature => "signature",
        }
    }

    fn from_bytes(key: &[u8]) -> Option<Self> {
        match key {
            b"location" => Some(Self::Location),
            b"identifier" => Some(Self::Identifier),
            b"cid" => Some(Self::Cid),
            b"vid" => Some(Self::Vid),
            b"cl" => Some(Self::Cl),
            b"signature" => Some(Self::Signature),
            _ => None,
        }
    }
}

/// One decoded `key data` record.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    key: PacketKey,
    data: Vec<u8>,
}

impl Packet {
    pub fn new(key: PacketKey, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            data: data.into(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> PacketKey {
        self.key
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Total encoded length of this packet, header included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.key.as_str().len() + 1 + self.data.len() + 1
    }

    fn write_to(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let len = self.encoded_len();
        if len > MAX_PACKET_LEN {
            return Err(EncodeError::PacketTooLarge {
                key: self.key.as_str(),
                len,
            });
        }

        out.extend_from_slice(format!("{len:04x}").as_bytes());
        out.extend_from_slice(self.key.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(&self.data);
        out.push(b'\n');

        Ok(())
    }
}

// Packet data may carry the raw signature, only its length is printed.
impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("key", &self.key)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Decode a base64 token into its packet sequence.
///
/// Both the URL-safe and the standard alphabet are accepted, with or without
/// padding.
///
/// # Errors
///
/// Returns [`DecodeError::Base64`] if the input is not base64 and
/// [`DecodeError::Malformed`] if the packet stream is truncated or garbled.
pub fn decode(serialized: &str) -> Result<Vec<Packet>, DecodeError> {
    let raw = decode_base64(serialized)?;
    parse(&raw)
}

/// Encode packets as URL-safe unpadded base64.
///
/// # Errors
///
/// Returns [`EncodeError::PacketTooLarge`] if a packet exceeds the length the
/// four-digit header can express.
pub fn encode(packets: &[Packet]) -> Result<String, EncodeError> {
    let mut raw = Vec::new();
    for packet in packets {
        packet.write_to(&mut raw)?;
    }
    Ok(Base64UrlUnpadded::encode_string(&raw))
}

/// Parse a raw (already base64-decoded) packet stream.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] on an empty stream, a bad length prefix,
/// a missing terminator or separator, or an unknown key.
pub fn parse(mut raw: &[u8]) -> Result<Vec<Packet>, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Malformed("empty packet stream"));
    }

    let mut packets = Vec::new();
    while !raw.is_empty() {
        let (packet, rest) = parse_one(raw)?;
        packets.push(packet);
        raw = rest;
    }

    Ok(packets)
}

fn parse_one(raw: &[u8]) -> Result<(Packet, &[u8]), DecodeError> {
    let header = raw
        .get(..HEADER_LEN)
        .ok_or(DecodeError::Malformed("truncated length prefix"))?;
    let len = parse_header(header)?;
    if len < MIN_PACKET_LEN {
        return Err(DecodeError::Malformed("length prefix too small"));
    }

    let body = raw
        .get(HEADER_LEN..len)
        .ok_or(DecodeError::Malformed("truncated packet"))?;
    let body = body
        .strip_suffix(b"\n")
        .ok_or(DecodeError::Malformed("missing packet terminator"))?;
    let split = body
        .iter()
        .position(|&b| b == b' ')
        .ok_or(DecodeError::Malformed("missing key separator"))?;
    let key = PacketKey::from_bytes(&body[..split])
        .ok_or(DecodeError::Malformed("unknown packet key"))?;

    Ok((Packet::new(key, &body[split + 1..]), &raw[len..]))
}

fn parse_header(header: &[u8]) -> Result<usize, DecodeError> {
    header
        .iter()
        .try_fold(0usize, |acc, &b| {
            char::from(b)
                .to_digit(16)
                .map(|digit| acc * 16 + digit as usize)
        })
        .ok_or(DecodeError::Malformed("invalid length prefix"))
}

fn decode_base64(serialized: &str) -> Result<Vec<u8>, DecodeError> {
    let normalized: String = serialized
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    Base64Unpadded::decode_vec(&normalized).map_err(|_| DecodeError::Base64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CAVEATS: &str = "MDAxY2xvY2F0aW9uIGh0dHA6Ly9teWJhbmsvCjAwMjZpZGVudGlmaWVyIHdlIHVzZWQgb3VyIHNlY3JldCBrZXkKMDAyZnNpZ25hdHVyZSDj2eApCFJsTAA5rhURQRXZf91ovyujebNCqvD2F9BVLwo";

    fn raw_packet(key: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Packet::new(PacketKey::from_bytes(key.as_bytes()).unwrap(), data)
            .write_to(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn decodes_reference_token() {
        let packets = decode(NO_CAVEATS).unwrap();
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].key(), PacketKey::Location);
        assert_eq!(packets[0].data(), b"http://mybank/");
        assert_eq!(packets[1].key(), PacketKey::Identifier);
        assert_eq!(packets[1].data(), b"we used our secret key");
        assert_eq!(packets[2].key(), PacketKey::Signature);
        assert_eq!(packets[2].data().len(), 32);
    }

    #[test]
    fn encode_reproduces_reference_token() {
        let packets = decode(NO_CAVEATS).unwrap();
        assert_eq!(encode(&packets).unwrap(), NO_CAVEATS);
    }

    #[test]
    fn accepts_standard_alphabet_with_padding() {
        let raw = [
            raw_packet("location", b"loc"),
            raw_packet("cid", &[0xfb, 0xff, 0xfe]),
        ]
        .concat();
        let standard = base64ct::Base64::encode_string(&raw);
        assert!(standard.contains('+') || standard.contains('/'));

        let packets = decode(&standard).unwrap();
        assert_eq!(packets[1].data(), &[0xfb, 0xff, 0xfe]);
        assert_eq!(decode(&encode(&packets).unwrap()).unwrap(), packets);
    }

    #[test]
    fn header_is_lowercase_hex() {
        let raw = raw_packet("identifier", &[b'x'; 200]);
        assert_eq!(&raw[..HEADER_LEN], b"00d8");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(decode("not base64!"), Err(DecodeError::Base64));
    }

    #[test]
    fn rejects_empty_stream() {
        assert!(matches!(parse(b""), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn rejects_truncated_prefix() {
        assert_eq!(
            parse(b"00"),
            Err(DecodeError::Malformed("truncated length prefix"))
        );
    }

    #[test]
    fn rejects_non_hex_prefix() {
        assert_eq!(
            parse(b"00zzlocation x\n"),
            Err(DecodeError::Malformed("invalid length prefix"))
        );
    }

    #[test]
    fn rejects_length_past_end() {
        let mut raw = raw_packet("location", b"somewhere");
        raw.truncate(raw.len() - 3);
        assert_eq!(
            parse(&raw),
            Err(DecodeError::Malformed("truncated packet"))
        );
    }

    #[test]
    fn rejects_tiny_length() {
        assert_eq!(
            parse(b"0004"),
            Err(DecodeError::Malformed("length prefix too small"))
        );
    }

    #[test]
    fn rejects_missing_terminator() {
        let mut raw = raw_packet("location", b"somewhere");
        let last = raw.len() - 1;
        raw[last] = b'!';
        assert_eq!(
            parse(&raw),
            Err(DecodeError::Malformed("missing packet terminator"))
        );
    }

    #[test]
    fn rejects_unknown_key() {
        assert_eq!(
            parse(b"000cfoo bar\n"),
            Err(DecodeError::Malformed("unknown packet key"))
        );
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(
            parse(b"000anospc\n"),
            Err(DecodeError::Malformed("missing key separator"))
        );
    }

    #[test]
    fn data_may_be_empty_or_contain_spaces() {
        let raw = [raw_packet("location", b""), raw_packet("cid", b"a = b")].concat();
        let packets = parse(&raw).unwrap();
        assert!(packets[0].data().is_empty());
        assert_eq!(packets[1].data(), b"a = b");
    }

    #[test]
    fn encode_rejects_oversized_packet() {
        let packet = Packet::new(PacketKey::Cid, vec![b'a'; MAX_PACKET_LEN]);
        assert!(matches!(
            encode(&[packet]),
            Err(EncodeError::PacketTooLarge { key: "cid", .. })
        ));
    }

    #[test]
    fn debug_hides_packet_data() {
        let packet = Packet::new(PacketKey::Signature, b"secret-bytes".to_vec());
        let debug = format!("{packet:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len"));
    }

    #[test]
    fn garbage_bytes_never_panic() {
        let samples: [&[u8]; 5] = [
            b"\xff\xff\xff\xff\xff",
            b"0007a \n0003",
            b"ffff",
            b"0007\n \n",
            b"000a\xff\xfe \x00\x01\n",
        ];
        for sample in samples {
            assert!(parse(sample).is_err());
        }
    }
}
