// SPDX-License-Identifier: CC0-1.0

//! Named outcomes for raw integer-returning secp256k1 primitives.
//!
//! The C API reports results as bare `int`s with per-function meanings: `1`
//! for success here, `0` for equality there, `-1` for "right-hand side is
//! greater" somewhere else. The enums in this module give each convention a
//! name so call sites match on what happened instead of comparing magic
//! numbers, and the free functions wrap the primitives whose raw codes carry
//! more information than a plain `Result` preserves.

use core::cmp::Ordering;
use core::fmt;

use crate::ffi::types::c_int;
use crate::ffi::{self, CPtr};
use crate::{ecdsa, Context, Error, Message, PublicKey, Secp256k1, Verification};

/// Outcome of a secp256k1 call that reports plain success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallResult {
    /// The call succeeded (raw code `1`).
    Success,
    /// The call failed (raw code `0`).
    Failure,
}

impl CallResult {
    /// Classifies a raw return code. Any nonzero code counts as success,
    /// matching how the C library's callers test its results.
    pub fn from_raw(code: c_int) -> CallResult {
        if code != 0 {
            CallResult::Success
        } else {
            CallResult::Failure
        }
    }

    /// Whether the call succeeded.
    pub fn is_success(self) -> bool {
        self == CallResult::Success
    }

    /// Converts the outcome into a [`Result`], using `error` for the failure
    /// case.
    pub fn into_result(self, error: Error) -> Result<(), Error> {
        match self {
            CallResult::Success => Ok(()),
            CallResult::Failure => Err(error),
        }
    }
}

/// Outcome of comparing two public keys in their compressed serialization,
/// lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKeyComparison {
    /// Both keys serialize identically (raw code `0`).
    Equal,
    /// The left-hand key sorts after the right-hand key (positive raw code).
    LhsIsGreater,
    /// The right-hand key sorts after the left-hand key (negative raw code).
    RhsIsGreater,
}

impl PublicKeyComparison {
    /// Classifies a raw three-way comparison code by its sign.
    pub fn from_raw(code: c_int) -> PublicKeyComparison {
        match code {
            0 => PublicKeyComparison::Equal,
            c if c > 0 => PublicKeyComparison::LhsIsGreater,
            _ => PublicKeyComparison::RhsIsGreater,
        }
    }
}

impl From<Ordering> for PublicKeyComparison {
    fn from(ordering: Ordering) -> PublicKeyComparison {
        match ordering {
            Ordering::Equal => PublicKeyComparison::Equal,
            Ordering::Greater => PublicKeyComparison::LhsIsGreater,
            Ordering::Less => PublicKeyComparison::RhsIsGreater,
        }
    }
}

impl From<PublicKeyComparison> for Ordering {
    fn from(comparison: PublicKeyComparison) -> Ordering {
        match comparison {
            PublicKeyComparison::Equal => Ordering::Equal,
            PublicKeyComparison::LhsIsGreater => Ordering::Greater,
            PublicKeyComparison::RhsIsGreater => Ordering::Less,
        }
    }
}

impl fmt::Display for PublicKeyComparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            PublicKeyComparison::Equal => "equal",
            PublicKeyComparison::LhsIsGreater => "left-hand key is greater",
            PublicKeyComparison::RhsIsGreater => "right-hand key is greater",
        };
        f.write_str(s)
    }
}

/// Whether an ECDSA signature was already in lower-S form before
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureNormalization {
    /// The signature was already normalized (raw code `0`).
    AlreadyNormalized,
    /// The signature had a high `s` value and was brought into lower-S form
    /// (raw code `1`).
    WasntNormalized,
}

impl SignatureNormalization {
    /// Classifies the raw return code of `secp256k1_ecdsa_signature_normalize`.
    pub fn from_raw(code: c_int) -> SignatureNormalization {
        if code != 0 {
            SignatureNormalization::WasntNormalized
        } else {
            SignatureNormalization::AlreadyNormalized
        }
    }
}

/// Outcome of verifying an ECDSA signature.
///
/// The C primitive folds "could not parse" and "incorrect" into one failure
/// code; this enum keeps that collapse visible instead of surfacing it as an
/// error, since a failed verification is an answer, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVerification {
    /// The signature is correct and in lower-S form (raw code `1`).
    Valid,
    /// The signature is incorrect, not in lower-S form, or unparsable
    /// (raw code `0`).
    Invalid,
}

impl SignatureVerification {
    /// Classifies the raw return code of `secp256k1_ecdsa_verify`.
    pub fn from_raw(code: c_int) -> SignatureVerification {
        if code != 0 {
            SignatureVerification::Valid
        } else {
            SignatureVerification::Invalid
        }
    }

    /// Whether the signature verified.
    pub fn is_valid(self) -> bool {
        self == SignatureVerification::Valid
    }
}

/// Whether [`validate_signature`] accepts malleable (high-S) signatures.
///
/// `secp256k1_ecdsa_verify` only ever accepts lower-S signatures. With
/// [`Accepted`](MalleabilityStrictness::Accepted) the input is normalized
/// first, so a high-S variant of a correct signature passes; with
/// [`Rejected`](MalleabilityStrictness::Rejected) it only passes if it was
/// already in lower-S form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalleabilityStrictness {
    /// Accept signatures that are correct after normalization.
    Accepted,
    /// Require signatures to already be in lower-S form.
    Rejected,
}

/// Compares two public keys by their compressed serialization,
/// lexicographically.
pub fn compare_public_keys<C: Context>(
    secp: &Secp256k1<C>,
    lhs: &PublicKey,
    rhs: &PublicKey,
) -> PublicKeyComparison {
    let ret = unsafe {
        ffi::secp256k1_ec_pubkey_cmp(secp.ctx().as_ptr(), lhs.as_c_ptr(), rhs.as_c_ptr())
    };
    PublicKeyComparison::from_raw(ret)
}

/// Brings a signature into lower-S form, reporting whether it already was.
///
/// The returned signature always verifies wherever the input's normalized
/// form does.
pub fn normalize_signature(
    sig: &ecdsa::Signature,
) -> (ecdsa::Signature, SignatureNormalization) {
    let mut normalized = unsafe { ffi::Signature::new() };
    let ret = unsafe {
        ffi::secp256k1_ecdsa_signature_normalize(
            ffi::secp256k1_context_no_precomp,
            &mut normalized,
            sig.as_c_ptr(),
        )
    };

    (ecdsa::Signature::from(normalized), SignatureNormalization::from_raw(ret))
}

/// Verifies an ECDSA signature, reporting the outcome as a
/// [`SignatureVerification`] instead of an error.
///
/// Only lower-S signatures can verify; see [`validate_signature`] for a
/// variant that decides how to treat high-S inputs.
pub fn verify_signature<C: Verification>(
    secp: &Secp256k1<C>,
    sig: &ecdsa::Signature,
    msg: &Message,
    pk: &PublicKey,
) -> SignatureVerification {
    let ret = unsafe {
        ffi::secp256k1_ecdsa_verify(
            secp.ctx().as_ptr(),
            sig.as_c_ptr(),
            msg.as_c_ptr(),
            pk.as_c_ptr(),
        )
    };
    SignatureVerification::from_raw(ret)
}

/// Verifies an ECDSA signature under the given malleability policy.
///
/// The signature is normalized first and the normalized form is verified.
/// When `strictness` is [`MalleabilityStrictness::Rejected`] an input that
/// needed normalization is reported [`Invalid`](SignatureVerification::Invalid)
/// even if its normalized form is correct.
pub fn validate_signature<C: Verification>(
    secp: &Secp256k1<C>,
    sig: &ecdsa::Signature,
    msg: &Message,
    pk: &PublicKey,
    strictness: MalleabilityStrictness,
) -> SignatureVerification {
    let (normalized, normalization) = normalize_signature(sig);
    let verification = verify_signature(secp, &normalized, msg, pk);

    match (verification, normalization) {
        (SignatureVerification::Valid, SignatureNormalization::AlreadyNormalized) => {
            SignatureVerification::Valid
        }
        (SignatureVerification::Valid, SignatureNormalization::WasntNormalized) => {
            match strictness {
                MalleabilityStrictness::Accepted => SignatureVerification::Valid,
                MalleabilityStrictness::Rejected => SignatureVerification::Invalid,
            }
        }
        (SignatureVerification::Invalid, _) => SignatureVerification::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::thread_rng;
    use crate::{SecretKey, SECP256K1};

    // The group order of secp256k1, big endian.
    const CURVE_ORDER: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c,
        0xd0, 0x36, 0x41, 0x41,
    ];

    /// Replaces `s` with `n - s`, producing the other signature in the
    /// malleable pair.
    fn negate_s(compact: &mut [u8; 64]) {
        let mut borrow = 0u16;
        for i in (32..64).rev() {
            let diff = i16::from(CURVE_ORDER[i - 32]) - i16::from(compact[i]) - borrow as i16;
            if diff < 0 {
                compact[i] = (diff + 256) as u8;
                borrow = 1;
            } else {
                compact[i] = diff as u8;
                borrow = 0;
            }
        }
        assert_eq!(borrow, 0);
    }

    fn random_signed_message() -> (ecdsa::Signature, Message, crate::PublicKey) {
        let (sk, pk) = SECP256K1.generate_keypair(&mut thread_rng());
        let msg = Message::from_slice(&[0x3b; 32]).unwrap();
        (SECP256K1.sign_ecdsa(&msg, &sk), msg, pk)
    }

    #[test]
    fn call_result_classification() {
        assert_eq!(CallResult::from_raw(1), CallResult::Success);
        assert_eq!(CallResult::from_raw(-1), CallResult::Success);
        assert_eq!(CallResult::from_raw(0), CallResult::Failure);

        assert!(CallResult::Success.is_success());
        assert_eq!(CallResult::Success.into_result(Error::CannotComputeSharedSecret), Ok(()));
        assert_eq!(
            CallResult::Failure.into_result(Error::CannotComputeSharedSecret),
            Err(Error::CannotComputeSharedSecret)
        );
    }

    #[test]
    fn comparing_a_key_with_its_copy_is_equal() {
        let (_, pk) = SECP256K1.generate_keypair(&mut thread_rng());
        let copy = crate::PublicKey::from_slice(&pk.serialize()).unwrap();

        assert_eq!(compare_public_keys(SECP256K1, &pk, &copy), PublicKeyComparison::Equal);
    }

    #[test]
    fn comparison_follows_the_compressed_serialization() {
        for _ in 0..10 {
            let (_, lhs) = SECP256K1.generate_keypair(&mut thread_rng());
            let (_, rhs) = SECP256K1.generate_keypair(&mut thread_rng());

            let comparison = compare_public_keys(SECP256K1, &lhs, &rhs);
            let expected: PublicKeyComparison =
                lhs.serialize().cmp(&rhs.serialize()).into();
            assert_eq!(comparison, expected);

            // Swapping the operands flips the answer.
            let flipped = compare_public_keys(SECP256K1, &rhs, &lhs);
            assert_eq!(Ordering::from(flipped), Ordering::from(comparison).reverse());
        }
    }

    #[test]
    fn comparison_converts_to_and_from_ordering() {
        for &ordering in &[Ordering::Less, Ordering::Equal, Ordering::Greater] {
            assert_eq!(Ordering::from(PublicKeyComparison::from(ordering)), ordering);
        }
    }

    #[test]
    fn normalization_flips_a_high_s_value() {
        // r = 1, s = n - 1. The upper half of the s range, so normalization
        // must map it to s = 1.
        let mut compact = [0u8; 64];
        compact[31] = 1;
        compact[32..].copy_from_slice(&CURVE_ORDER);
        compact[63] -= 1;

        let sig = ecdsa::Signature::from_compact(&compact).unwrap();
        let (normalized, outcome) = normalize_signature(&sig);
        assert_eq!(outcome, SignatureNormalization::WasntNormalized);

        let mut expected = [0u8; 64];
        expected[31] = 1;
        expected[63] = 1;
        assert_eq!(normalized.serialize_compact(), expected);

        // Normalizing the result is a no-op.
        let (again, outcome) = normalize_signature(&normalized);
        assert_eq!(outcome, SignatureNormalization::AlreadyNormalized);
        assert_eq!(again, normalized);
    }

    #[test]
    fn freshly_signed_messages_verify() {
        let (sig, msg, pk) = random_signed_message();

        assert_eq!(verify_signature(SECP256K1, &sig, &msg, &pk), SignatureVerification::Valid);
        assert!(verify_signature(SECP256K1, &sig, &msg, &pk).is_valid());

        let other = Message::from_slice(&[0x90; 32]).unwrap();
        assert_eq!(
            verify_signature(SECP256K1, &sig, &other, &pk),
            SignatureVerification::Invalid
        );
    }

    #[test]
    fn verification_rejects_the_wrong_key() {
        let (sig, msg, _) = random_signed_message();

        let other = SECP256K1.generate_keypair(&mut thread_rng()).1;
        assert_eq!(
            verify_signature(SECP256K1, &sig, &msg, &other),
            SignatureVerification::Invalid
        );
    }

    #[test]
    fn strictness_decides_the_fate_of_high_s_signatures() {
        let (sig, msg, pk) = random_signed_message();

        let mut compact = sig.serialize_compact();
        negate_s(&mut compact);
        let high_s = ecdsa::Signature::from_compact(&compact).unwrap();

        // The plain verifier insists on lower-S form.
        assert_eq!(
            verify_signature(SECP256K1, &high_s, &msg, &pk),
            SignatureVerification::Invalid
        );

        assert_eq!(
            validate_signature(SECP256K1, &high_s, &msg, &pk, MalleabilityStrictness::Accepted),
            SignatureVerification::Valid
        );
        assert_eq!(
            validate_signature(SECP256K1, &high_s, &msg, &pk, MalleabilityStrictness::Rejected),
            SignatureVerification::Invalid
        );

        // A signature already in lower-S form passes either way.
        for &strictness in
            &[MalleabilityStrictness::Accepted, MalleabilityStrictness::Rejected]
        {
            assert_eq!(
                validate_signature(SECP256K1, &sig, &msg, &pk, strictness),
                SignatureVerification::Valid
            );
        }
    }

    #[test]
    fn validation_still_rejects_garbage() {
        let (_, msg, pk) = random_signed_message();

        let (other_sig, _, _) = random_signed_message();
        for &strictness in
            &[MalleabilityStrictness::Accepted, MalleabilityStrictness::Rejected]
        {
            assert_eq!(
                validate_signature(SECP256K1, &other_sig, &msg, &pk, strictness),
                SignatureVerification::Invalid
            );
        }
    }

    #[test]
    fn scalar_one_is_a_valid_secret_key() {
        // Keeps the curve order constant honest: n - 1 must be a valid
        // scalar while n itself is not.
        let mut bytes = CURVE_ORDER;
        assert!(SecretKey::from_slice(&bytes).is_err());
        bytes[31] -= 1;
        assert!(SecretKey::from_slice(&bytes).is_ok());
    }
}
