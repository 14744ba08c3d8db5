#![allow(clippy::unwrap_used, clippy::expect_used)]

use macaroon_auth::auth::{AuthConfig, AuthError, Authenticator};
use macaroon_auth::macaroons::{
    chain,
    packet::{self, Packet, PacketKey},
    verify_token, Caveat, DecodeError, RootKey, VerificationError, Verifier,
};
use secrecy::SecretString;

const SECRET: &str = "this is our super secret key; only we should know it";
const LOCATION: &str = "https://issuer.tld";

fn packets(secret: &str, identifier: &str, caveats: &[&str]) -> Vec<Packet> {
    let key = RootKey::derive(secret.as_bytes()).expect("secret must not be empty");
    let chain: Vec<Caveat> = caveats.iter().map(|c| Caveat::new(*c)).collect();
    let signature = chain::fold(&key, identifier.as_bytes(), &chain);

    let mut packets = vec![
        Packet::new(PacketKey::Location, LOCATION),
        Packet::new(PacketKey::Identifier, identifier),
    ];
    packets.extend(caveats.iter().map(|c| Packet::new(PacketKey::Cid, *c)));
    packets.push(Packet::new(PacketKey::Signature, signature.to_vec()));
    packets
}

fn mint(secret: &str, identifier: &str, caveats: &[&str]) -> String {
    packet::encode(&packets(secret, identifier, caveats)).unwrap()
}

fn root_key() -> RootKey {
    RootKey::derive(SECRET.as_bytes()).unwrap()
}

// Every token obtained by flipping a single bit of the identifier, a caveat
// or the signature.
fn single_bit_flips(packets: &[Packet]) -> Vec<(PacketKey, usize, String)> {
    let mut tokens = Vec::new();
    for (index, target) in packets.iter().enumerate() {
        if target.key() == PacketKey::Location {
            continue;
        }
        for byte in 0..target.data().len() {
            for bit in 0..8 {
                let mut data = target.data().to_vec();
                data[byte] ^= 1 << bit;

                let mut tampered = packets.to_vec();
                tampered[index] = Packet::new(target.key(), data);
                tokens.push((target.key(), byte, packet::encode(&tampered).unwrap()));
            }
        }
    }
    tokens
}

#[test]
fn round_trip_accepts_minted_token() {
    let token = mint(SECRET, "ada;lovelace", &["status = student"]);
    let verifier = Verifier::new().satisfy_exact("status = student");

    let identity = verify_token(&token, &root_key(), &verifier).unwrap();
    assert_eq!(identity.identifier, b"ada;lovelace");
    assert_eq!(identity.location, LOCATION);
}

#[test]
fn token_without_caveats_needs_no_predicates() {
    let token = mint(SECRET, "ada;lovelace", &[]);
    assert!(verify_token(&token, &root_key(), &Verifier::new()).is_ok());
}

#[test]
fn any_single_bit_flip_breaks_the_signature() {
    let packets = packets(SECRET, "ada;lovelace", &["status = student", "year = 2"]);
    let verifier = Verifier::new()
        .satisfy_exact("status = student")
        .satisfy_exact("year = 2");

    let tokens = single_bit_flips(&packets);
    assert_eq!(tokens.len(), (12 + 16 + 8 + 32) * 8);

    for (key, byte, token) in tokens {
        assert_eq!(
            verify_token(&token, &root_key(), &verifier),
            Err(VerificationError::SignatureMismatch),
            "flipped bit in {key:?} byte {byte} was not detected"
        );
    }
}

#[test]
fn high_bit_flip_is_a_signature_mismatch() {
    let verifier = Verifier::new().satisfy_exact("status = student");

    for target in [PacketKey::Identifier, PacketKey::Cid] {
        let mut packets = packets(SECRET, "ada;lovelace", &["status = student"]);
        let index = packets.iter().position(|p| p.key() == target).unwrap();
        let mut data = packets[index].data().to_vec();
        data[0] ^= 0x80;
        packets[index] = Packet::new(target, data);

        let token = packet::encode(&packets).unwrap();
        assert_eq!(
            verify_token(&token, &root_key(), &verifier),
            Err(VerificationError::SignatureMismatch)
        );
    }
}

#[test]
fn dropping_a_caveat_breaks_the_signature() {
    let mut packets = packets(SECRET, "ada;lovelace", &["status = student", "year = 2"]);
    packets.remove(2);
    let token = packet::encode(&packets).unwrap();

    let verifier = Verifier::new().satisfy_exact("year = 2");
    assert_eq!(
        verify_token(&token, &root_key(), &verifier),
        Err(VerificationError::SignatureMismatch)
    );
}

#[test]
fn caveat_order_is_signed() {
    let mut packets = packets(SECRET, "ada;lovelace", &["status = student", "year = 2"]);
    packets.swap(2, 3);
    let token = packet::encode(&packets).unwrap();

    let verifier = Verifier::new()
        .satisfy_exact("status = student")
        .satisfy_exact("year = 2");
    assert_eq!(
        verify_token(&token, &root_key(), &verifier),
        Err(VerificationError::SignatureMismatch)
    );
}

#[test]
fn wrong_key_is_rejected() {
    let token = mint("another secret", "ada;lovelace", &[]);
    assert_eq!(
        verify_token(&token, &root_key(), &Verifier::new()),
        Err(VerificationError::SignatureMismatch)
    );
}

#[test]
fn unmatched_caveat_is_rejected() {
    let token = mint(SECRET, "ada;lovelace", &["status = student", "year = 2"]);
    let verifier = Verifier::new().satisfy_exact("status = student");
    assert_eq!(
        verify_token(&token, &root_key(), &verifier),
        Err(VerificationError::CaveatUnsatisfied("year = 2".to_string()))
    );
}

#[test]
fn general_predicates_are_ored_with_exact_ones() {
    let token = mint(SECRET, "ada;lovelace", &["status = student", "year = 2"]);
    let verifier = Verifier::new()
        .satisfy_exact("status = student")
        .satisfy_general(|predicate: &str| predicate.starts_with("year = "));
    assert!(verify_token(&token, &root_key(), &verifier).is_ok());
}

#[test]
fn third_party_caveats_are_unsupported() {
    let mut packets = packets(SECRET, "ada;lovelace", &["status = student"]);
    packets.insert(3, Packet::new(PacketKey::Vid, vec![0u8; 8]));
    packets.insert(4, Packet::new(PacketKey::Cl, "https://auth.tld"));
    let token = packet::encode(&packets).unwrap();

    assert_eq!(
        verify_token(&token, &root_key(), &Verifier::new().satisfy_exact("status = student")),
        Err(VerificationError::Decode(DecodeError::UnsupportedCaveat))
    );
}

#[test]
fn padded_standard_base64_is_accepted() {
    let token = mint(SECRET, "ada;lovelace", &[]);
    let mut standard = token.replace('-', "+").replace('_', "/");
    while standard.len() % 4 != 0 {
        standard.push('=');
    }
    assert!(verify_token(&standard, &root_key(), &Verifier::new()).is_ok());
}

#[test]
fn cookie_login_end_to_end() {
    let config = AuthConfig::new(SecretString::from(SECRET)).with_caveat_condition("status = student");
    let authenticator = Authenticator::new(&config).unwrap();

    let token = mint(SECRET, "ada;lovelace", &["status = student"]);
    let header = format!("theme=dark; das-macaroon={token}");
    let outcome = authenticator.login_from_cookie_header(&header).unwrap();
    assert_eq!(outcome.login, "adalovelace");
    assert_eq!(outcome.email, "ada.lovelace@company.tld");
    assert_eq!(outcome.firstname.as_deref(), Some("ada"));
    assert_eq!(outcome.lastname.as_deref(), Some("lovelace"));

    let forged = mint("pocsecret", "ada;lovelace", &["status = student"]);
    assert_eq!(
        authenticator.authenticate(&forged),
        Err(AuthError::Verification(VerificationError::SignatureMismatch))
    );
    assert!(authenticator
        .login_from_cookie_header(&format!("das-macaroon={forged}"))
        .is_none());
}
