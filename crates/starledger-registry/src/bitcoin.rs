//! Bitcoin signed-message verification.
//!
//! Wallets that sign with Bitcoin Core's `signmessage` or with
//! `bitcoinjs-message` produce a base64, 65-byte compact signature: one
//! header byte carrying the recovery id and key compression, then `r || s`.
//! The signer's public key is recovered from it and hashed into a P2PKH
//! address, which must equal the claimed one.
//!
//! Only P2PKH addresses are supported. Headers 35 and up (the segwit
//! extensions) are rejected.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use starledger_core::Address;

use crate::verifier::SignatureVerifier;

/// Prefix every signed message is hashed under.
const MESSAGE_MAGIC: &str = "Bitcoin Signed Message:\n";

/// Mainnet P2PKH version byte.
const P2PKH_VERSION: u8 = 0x00;

/// First header value; `27 + recovery id`, plus 4 for a compressed key.
const HEADER_BASE: u8 = 27;

/// Verifier for Bitcoin signed messages against P2PKH addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcoinMessageVerifier;

#[async_trait]
impl SignatureVerifier for BitcoinMessageVerifier {
    async fn verify(&self, message: &str, address: &Address, signature: &str) -> bool {
        recover_address(message, signature).is_some_and(|signer| signer == address.as_str())
    }
}

/// The P2PKH address whose key produced `signature` over `message`.
///
/// Returns `None` when the signature is not a well-formed compact
/// signature or no key can be recovered from it.
pub fn recover_address(message: &str, signature: &str) -> Option<String> {
    let raw: [u8; 65] = BASE64.decode(signature.trim()).ok()?.try_into().ok()?;
    let (recovery_id, compressed) = parse_header(raw[0])?;

    let signature = Signature::from_slice(&raw[1..]).ok()?;
    // Mirroring s flips the parity of the recovered R.
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(low) => (
            low,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    let key =
        VerifyingKey::recover_from_prehash(&message_digest(message), &signature, recovery_id)
            .ok()?;
    Some(p2pkh_address(key.to_encoded_point(compressed).as_bytes()))
}

/// Double SHA-256 of the magic prefix and `message`, each length-prefixed.
pub fn message_digest(message: &str) -> [u8; 32] {
    let mut data = Vec::with_capacity(MESSAGE_MAGIC.len() + message.len() + 10);
    write_varint(&mut data, MESSAGE_MAGIC.len() as u64);
    data.extend_from_slice(MESSAGE_MAGIC.as_bytes());
    write_varint(&mut data, message.len() as u64);
    data.extend_from_slice(message.as_bytes());

    Sha256::digest(Sha256::digest(&data)).into()
}

/// Base58Check address of a SEC1-encoded public key.
pub fn p2pkh_address(public_key: &[u8]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(P2PKH_VERSION);
    payload.extend_from_slice(&Ripemd160::digest(Sha256::digest(public_key)));
    bs58::encode(payload).with_check().into_string()
}

fn parse_header(header: u8) -> Option<(RecoveryId, bool)> {
    let flags = header.checked_sub(HEADER_BASE)?;
    if flags > 7 {
        return None;
    }
    Some((RecoveryId::from_byte(flags & 3)?, flags >= 4))
}

fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    const WALLET: &str = "1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs";
    const MESSAGE: &str = "1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs:1544454641:starRegistry";
    const SIGNATURE: &str =
        "IASF4L7Q1nsXn2MzW2uc8apjIARMRCfirsGVhq5ZwA37IxUsurYGyHtU0k/kBmIwWLLUNqitUHPMhZJMFZ5SSnA=";

    fn sign(key: &SigningKey, message: &str, compressed: bool) -> String {
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(&message_digest(message))
            .unwrap();
        let mut raw = [0u8; 65];
        raw[0] = HEADER_BASE + recovery_id.to_byte() + if compressed { 4 } else { 0 };
        raw[1..].copy_from_slice(&signature.to_bytes());
        BASE64.encode(raw)
    }

    #[tokio::test]
    async fn test_wallet_signature_verifies() {
        assert_eq!(recover_address(MESSAGE, SIGNATURE).as_deref(), Some(WALLET));
        assert!(
            BitcoinMessageVerifier
                .verify(MESSAGE, &Address::from(WALLET), SIGNATURE)
                .await
        );
    }

    #[tokio::test]
    async fn test_bitcoinjs_message_vector() {
        let message = "This is an example of a signed message.";
        let signature =
            "H9L5yLFjti0QTHhPyFrZCT1V/MMnBtXKmoiKDZ78NDBjERki6ZTQZdSMCtkgoNmp17By9ItJr8o7ChX0XxY91nk=";
        let address = Address::from("1F3sAm6ZtwLAUnj7d38pGFxtP3RVEvtsbV");

        assert!(BitcoinMessageVerifier.verify(message, &address, signature).await);
    }

    #[tokio::test]
    async fn test_other_message_or_address_rejected() {
        let later = "1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs:1544454642:starRegistry";
        assert!(
            !BitcoinMessageVerifier
                .verify(later, &Address::from(WALLET), SIGNATURE)
                .await
        );

        let other = Address::from("1F3sAm6ZtwLAUnj7d38pGFxtP3RVEvtsbV");
        assert!(!BitcoinMessageVerifier.verify(MESSAGE, &other, SIGNATURE).await);
    }

    #[test]
    fn test_bad_header_rejected() {
        // Same r and s as the valid signature, header byte 20.
        let signature =
            "FASF4L7Q1nsXn2MzW2uc8apjIARMRCfirsGVhq5ZwA37IxUsurYGyHtU0k/kBmIwWLLUNqitUHPMhZJMFZ5SSnA=";
        assert!(recover_address(MESSAGE, signature).is_none());

        let mut raw: [u8; 65] = BASE64.decode(SIGNATURE).unwrap().try_into().unwrap();
        for header in [0, 26, 35, 42, 255] {
            raw[0] = header;
            assert!(recover_address(MESSAGE, &BASE64.encode(raw)).is_none(), "header {}", header);
        }
    }

    #[tokio::test]
    async fn test_malformed_input_is_false() {
        let wallet = Address::from(WALLET);
        let short = BASE64.encode([1u8; 64]);
        for signature in ["fake-signature", "", "AAAA", short.as_str()] {
            assert!(!BitcoinMessageVerifier.verify(MESSAGE, &wallet, signature).await);
        }
        assert!(
            !BitcoinMessageVerifier
                .verify(MESSAGE, &Address::from("fake-address"), SIGNATURE)
                .await
        );
    }

    #[test]
    fn test_high_s_signature_recovers_same_signer() {
        // The valid signature with s mirrored and the parity bit flipped.
        let mirrored =
            "HwSF4L7Q1nsXn2MzW2uc8apjIARMRCfirsGVhq5ZwA373OrTRUn5N4SrLbAb+Z3Ppgfapj4B+CxvOkASdzHj9tE=";
        assert_eq!(recover_address(MESSAGE, mirrored).as_deref(), Some(WALLET));
    }

    #[test]
    fn test_compression_flag_selects_address() {
        let key = SigningKey::from_slice(&[0x11; 32]).unwrap();
        let point = key.verifying_key();
        let compressed = p2pkh_address(point.to_encoded_point(true).as_bytes());
        let uncompressed = p2pkh_address(point.to_encoded_point(false).as_bytes());
        assert_ne!(compressed, uncompressed);

        let message = "freshly signed:1:starRegistry";
        assert_eq!(recover_address(message, &sign(&key, message, true)), Some(compressed));
        assert_eq!(recover_address(message, &sign(&key, message, false)), Some(uncompressed));
    }

    #[test]
    fn test_long_message_uses_wide_length_prefix() {
        let key = SigningKey::from_slice(&[0x22; 32]).unwrap();
        let expected = p2pkh_address(key.verifying_key().to_encoded_point(true).as_bytes());

        let message = "x".repeat(300);
        assert_eq!(recover_address(&message, &sign(&key, &message, true)), Some(expected));

        let mut prefix = Vec::new();
        write_varint(&mut prefix, 300);
        assert_eq!(prefix, [0xfd, 0x2c, 0x01]);
    }
}
