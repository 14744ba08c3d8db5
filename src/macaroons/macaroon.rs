use super::{
    chain::{self, Tag},
    packet::{self, Packet, PacketKey, MAX_PACKET_LEN},
    Caveat, DecodeError, EncodeError,
};
use std::{fmt, fmt::Write as _};

/// A decoded macaroon.
///
/// Holding a `Macaroon` says nothing about its authenticity, the signature is
/// only checked by [`super::Verifier`].
#[derive(Clone, PartialEq, Eq)]
pub struct Macaroon {
    location: String,
    identifier: Vec<u8>,
    caveats: Vec<Caveat>,
    signature: Tag,
}

impl Macaroon {
    /// Decode a serialized token.
    ///
    /// Packets must appear as `location`, `identifier`, zero or more `cid`,
    /// then `signature`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the token is not a well-formed first-party
    /// macaroon.
    pub fn deserialize(token: &str) -> Result<Self, DecodeError> {
        Self::from_packets(packet::decode(token)?)
    }

    /// Encode as URL-safe base64, the inverse of [`Macaroon::deserialize`].
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if a field does not fit in a packet.
    pub fn serialize(&self) -> Result<String, EncodeError> {
        let mut packets = Vec::with_capacity(self.caveats.len() + 3);
        packets.push(Packet::new(PacketKey::Location, self.location.as_bytes()));
        packets.push(Packet::new(PacketKey::Identifier, self.identifier.as_slice()));
        for caveat in &self.caveats {
            packets.push(Packet::new(PacketKey::Cid, caveat.predicate()));
        }
        packets.push(Packet::new(PacketKey::Signature, self.signature.as_slice()));

        packet::encode(&packets)
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Raw identifier bytes, covered by the signature.
    #[must_use]
    pub fn identifier(&self) -> &[u8] {
        &self.identifier
    }

    #[must_use]
    pub fn caveats(&self) -> &[Caveat] {
        &self.caveats
    }

    #[must_use]
    pub const fn signature(&self) -> &Tag {
        &self.signature
    }

    /// Attenuate the macaroon with one more first-party caveat.
    ///
    /// The new signature is chained from the current one, so no root key is
    /// needed and the caveat can't be stripped later.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::PacketTooLarge`] if the predicate would not fit
    /// in a packet.
    pub fn add_first_party_caveat(
        &mut self,
        predicate: impl Into<Vec<u8>>,
    ) -> Result<(), EncodeError> {
        let caveat = Caveat::new(predicate);
        let len = Packet::new(PacketKey::Cid, caveat.predicate()).encoded_len();
        if len > MAX_PACKET_LEN {
            return Err(EncodeError::PacketTooLarge {
                key: PacketKey::Cid.as_str(),
                len,
            });
        }

        self.signature = chain::extend(&self.signature, caveat.predicate());
        self.caveats.push(caveat);

        Ok(())
    }

    /// Human readable dump, one `key value` line per packet.
    #[must_use]
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "location {}", self.location);
        let _ = writeln!(out, "identifier {}", String::from_utf8_lossy(&self.identifier));
        for caveat in &self.caveats {
            let _ = writeln!(out, "cid {caveat}");
        }
        let _ = write!(out, "signature ");
        for byte in self.signature {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    fn from_packets(packets: Vec<Packet>) -> Result<Self, DecodeError> {
        let mut packets = packets.into_iter();

        let location = text_field(packets.next(), PacketKey::Location)?;
        let identifier = field(packets.next(), PacketKey::Identifier)?;

        let mut caveats = Vec::new();
        let signature = loop {
            let packet = packets
                .next()
                .ok_or(DecodeError::MissingField(PacketKey::Signature.as_str()))?;

            match packet.key() {
                PacketKey::Cid => caveats.push(Caveat::new(packet.into_data())),
                PacketKey::Signature => break signature_tag(packet.data())?,
                PacketKey::Vid | PacketKey::Cl => return Err(DecodeError::UnsupportedCaveat),
                key => return Err(DecodeError::UnexpectedField(key.as_str())),
            }
        };

        if let Some(extra) = packets.next() {
            return Err(DecodeError::UnexpectedField(extra.key().as_str()));
        }

        Ok(Self {
            location,
            identifier,
            caveats,
            signature,
        })
    }
}

impl fmt::Debug for Macaroon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macaroon")
            .field("location", &self.location)
            .field("identifier", &String::from_utf8_lossy(&self.identifier))
            .field("caveats", &self.caveats)
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

fn field(packet: Option<Packet>, key: PacketKey) -> Result<Vec<u8>, DecodeError> {
    match packet {
        Some(packet) if packet.key() == key => Ok(packet.into_data()),
        _ => Err(DecodeError::MissingField(key.as_str())),
    }
}

// The location is not signed; identifier and caveat bytes stay raw until
// the signature has been checked.
fn text_field(packet: Option<Packet>, key: PacketKey) -> Result<String, DecodeError> {
    String::from_utf8(field(packet, key)?)
        .map_err(|_| DecodeError::Malformed("location is not valid UTF-8"))
}

fn signature_tag(data: &[u8]) -> Result<Tag, DecodeError> {
    data.try_into()
        .map_err(|_| DecodeError::SignatureLength(data.len()))
}

#[cfg(test)]
impl Macaroon {
    pub(crate) fn mint(key: &chain::RootKey, location: &str, identifier: &str) -> Self {
        Self {
            location: location.to_string(),
            identifier: identifier.as_bytes().to_vec(),
            caveats: Vec::new(),
            signature: chain::initial(key, identifier.as_bytes()),
        }
    }
}
