//! Hash primitives and the provider seams the VM depends on.
//!
//! The instruction set never names a concrete hash or signature library;
//! it is assembled over the [`Sha256`], [`Ripemd160`], and
//! [`Secp256k1Verifier`] traits. Providers must be reentrant: they own no
//! mutable state and may be shared across concurrent evaluations.

use ripemd::Ripemd160 as Ripemd160Engine;
use sha2::{Digest, Sha256 as Sha256Engine};

/// Computes the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256Engine::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes the RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160Engine::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes HASH160: RIPEMD-160 of SHA-256.
///
/// The standard address hash, used by OP_HASH160 and the P2SH template.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Computes HASH256: double SHA-256.
///
/// The standard transaction hash, and the final step of the signing
/// serialization digest.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// A SHA-256 implementation.
pub trait Sha256: Send + Sync {
    /// Returns the 32-byte digest of `data`.
    fn hash(&self, data: &[u8]) -> [u8; 32];
}

/// A RIPEMD-160 implementation.
pub trait Ripemd160: Send + Sync {
    /// Returns the 20-byte digest of `data`.
    fn hash(&self, data: &[u8]) -> [u8; 20];
}

/// An ECDSA verifier over secp256k1 for strict-DER, low-S signatures.
pub trait Secp256k1Verifier: Send + Sync {
    /// Verifies `signature` (DER, without the sighash-type byte) by
    /// `public_key` over the 32-byte `digest`.
    ///
    /// Callers have already validated both encodings; implementations may
    /// simply reject anything their backend cannot parse.
    fn verify_signature_der_low_s(
        &self,
        signature: &[u8],
        public_key: &[u8],
        digest: &[u8; 32],
    ) -> bool;
}

/// [`Sha256`] backed by the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSha256;

impl Sha256 for StandardSha256 {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        sha256(data)
    }
}

/// [`Ripemd160`] backed by the `ripemd` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRipemd160;

impl Ripemd160 for StandardRipemd160 {
    fn hash(&self, data: &[u8]) -> [u8; 20] {
        ripemd160(data)
    }
}

/// A verifier that accepts every signature.
///
/// This is the default when the `secp256k1` Cargo feature is disabled:
/// OP_CHECKSIG still performs all encoding checks and computes the real
/// signing digest, but the final curve operation is skipped. Useful for
/// script tooling and debugging without key material.
///
/// **Never use this to validate real transactions or protect real funds.**
#[derive(Debug, Clone, Copy, Default)]
pub struct StubSecp256k1;

impl Secp256k1Verifier for StubSecp256k1 {
    fn verify_signature_der_low_s(
        &self,
        _signature: &[u8],
        _public_key: &[u8],
        _digest: &[u8; 32],
    ) -> bool {
        true
    }
}

/// Real ECDSA verification via the `secp256k1` crate.
#[cfg(feature = "secp256k1")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSecp256k1;

#[cfg(feature = "secp256k1")]
impl Secp256k1Verifier for StandardSecp256k1 {
    fn verify_signature_der_low_s(
        &self,
        signature: &[u8],
        public_key: &[u8],
        digest: &[u8; 32],
    ) -> bool {
        use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};

        let parsed_signature = match Signature::from_der(signature) {
            Ok(s) => s,
            Err(_) => return false,
        };

        let parsed_key = match PublicKey::from_slice(public_key) {
            Ok(k) => k,
            Err(_) => return false,
        };

        let message = Message::from_digest(*digest);

        Secp256k1::verification_only()
            .verify_ecdsa(&message, &parsed_signature, &parsed_key)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_empty() {
        let result = sha256(b"");
        assert_eq!(
            result,
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn ripemd160_empty() {
        let result = ripemd160(b"");
        assert_eq!(result, hex!("9c1185a5c5e9fc54612808977ee8f548b2258d31"));
    }

    #[test]
    fn hash160_empty() {
        let result = hash160(b"");
        assert_eq!(result, hex!("b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"));
    }

    #[test]
    fn hash256_empty() {
        let result = hash256(b"");
        assert_eq!(
            result,
            hex!("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
        );
    }

    #[test]
    fn hash160_is_ripemd160_of_sha256() {
        let data = b"test composition";
        assert_eq!(hash160(data), ripemd160(&sha256(data)));
    }

    #[test]
    fn hash256_is_double_sha256() {
        let data = b"test composition";
        assert_eq!(hash256(data), sha256(&sha256(data)));
    }

    #[test]
    fn providers_delegate() {
        assert_eq!(Sha256::hash(&StandardSha256, b"abc"), sha256(b"abc"));
        assert_eq!(
            Ripemd160::hash(&StandardRipemd160, b"abc"),
            ripemd160(b"abc")
        );
    }

    #[test]
    fn stub_accepts_anything() {
        assert!(StubSecp256k1.verify_signature_der_low_s(&[], &[], &[0u8; 32]));
    }
}
