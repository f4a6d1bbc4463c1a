// SPDX-License-Identifier: CC0-1.0

//! Support for additional serializations of the ECDH shared secret.
//!
//! `secp256k1_ecdh` lets its caller pick how the shared point is turned into
//! bytes by supplying a hash function callback. This module wires up the
//! callbacks needed to interoperate with ecosystems that do not use the
//! upstream default (SHA-256 of the compressed point): the raw `x` coordinate
//! as serialized in ANSI X9.63 key agreement, and the whole uncompressed
//! point for custom constructions such as ECIES.
//!
//! WARNING: the unhashed serializations return secrets that are curve points,
//! not uniformly distributed bytes. Run them through a key derivation
//! function before using them as symmetric key material. [`RawSharedPoint`]
//! additionally exposes the `y` coordinate and must never be used as a key
//! directly.

use core::{fmt, ptr, str};

use crate::ffi::types::{c_int, c_uchar, c_void};
use crate::ffi::{self, CPtr};
use crate::outcome::CallResult;
use crate::{constants, from_hex, Error, PublicKey, SecretKey};

pub use secp256k1::ecdh::{shared_secret_point, SharedSecret};

/// Size of one affine coordinate of a curve point.
pub const COORDINATE_SIZE: usize = 32;

/// Size of an x-only (ANSI X9.63) shared secret.
pub const X_ONLY_SHARED_SECRET_SIZE: usize = COORDINATE_SIZE;

/// Size of a whole shared point in uncompressed encoding.
pub const RAW_SHARED_POINT_SIZE: usize = constants::UNCOMPRESSED_PUBLIC_KEY_SIZE;

/// Size of a shared secret produced by the upstream default serialization.
pub const HASHED_SHARED_SECRET_SIZE: usize = 32;

/// How `secp256k1_ecdh` serializes the shared point before returning it.
///
/// The callback slot of the C primitive is an open function pointer, but only
/// these policies are wired up; the set is closed on purpose. Every policy
/// fills the whole output buffer and reports [`CallResult::Success`], or
/// reports [`CallResult::Failure`] leaving the buffer contents unspecified,
/// which the primitive turns into an overall ECDH failure. The serializations
/// below cannot fail on valid 32-byte coordinates; the failure branch exists
/// because the callback protocol is generic over policies that can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedSecretSerialization {
    /// The upstream libsecp256k1 default: SHA-256 of the compressed shared
    /// point. 32 bytes. Accepts arbitrary pass-through data, which the
    /// default hash function ignores.
    Sha256Compressed,
    /// The raw `x` coordinate of the shared point, unhashed, as serialized in
    /// [ANSI X9.63] key agreement. 32 bytes. Apply your own KDF before using
    /// the result as key material.
    ///
    /// [ANSI X9.63]: https://webstore.ansi.org/standards/ascx9/ansix9632011r2017
    AnsiX963,
    /// The whole shared point in uncompressed encoding, `0x04 || x || y`,
    /// unhashed. 65 bytes. Follows no standard; see the warning on
    /// [`RawSharedPoint`].
    UnsafeWholePoint,
}

impl SharedSecretSerialization {
    /// Number of bytes this serialization writes.
    pub const fn output_len(self) -> usize {
        match self {
            SharedSecretSerialization::Sha256Compressed => HASHED_SHARED_SECRET_SIZE,
            SharedSecretSerialization::AnsiX963 => X_ONLY_SHARED_SECRET_SIZE,
            SharedSecretSerialization::UnsafeWholePoint => RAW_SHARED_POINT_SIZE,
        }
    }

    /// The C callback implementing this serialization, in the shape
    /// `secp256k1_ecdh` expects.
    fn hash_function(self) -> ffi::EcdhHashFn {
        match self {
            SharedSecretSerialization::Sha256Compressed => unsafe {
                ffi::secp256k1_ecdh_hash_function_default
            },
            SharedSecretSerialization::AnsiX963 => Some(serialize_x_only),
            SharedSecretSerialization::UnsafeWholePoint => Some(serialize_whole_point),
        }
    }

    /// Applies this serialization to the affine coordinates of a shared
    /// point, outside of any ECDH computation.
    ///
    /// `output` must be exactly [`output_len`](Self::output_len) bytes. On
    /// [`CallResult::Failure`] the buffer contents are unspecified and must
    /// not be read.
    pub fn serialize(
        self,
        x: &[u8; COORDINATE_SIZE],
        y: &[u8; COORDINATE_SIZE],
        output: &mut [u8],
    ) -> CallResult {
        assert_eq!(
            output.len(),
            self.output_len(),
            "output buffer does not match the serialization length"
        );

        let ret = match self.hash_function() {
            Some(hashfp) => unsafe {
                hashfp(output.as_mut_ptr(), x.as_ptr(), y.as_ptr(), ptr::null_mut())
            },
            None => 0,
        };

        CallResult::from_raw(ret)
    }
}

/// `EcdhHashFn` writing the raw `x` coordinate, unhashed.
///
/// Backs [`SharedSecretSerialization::AnsiX963`].
unsafe extern "C" fn serialize_x_only(
    output: *mut c_uchar,
    x32: *const c_uchar,
    _y32: *const c_uchar,
    _data: *mut c_void,
) -> c_int {
    ptr::copy_nonoverlapping(x32, output, COORDINATE_SIZE);
    1
}

/// `EcdhHashFn` writing `0x04 || x || y`, the uncompressed point encoding,
/// unhashed.
///
/// Backs [`SharedSecretSerialization::UnsafeWholePoint`].
unsafe extern "C" fn serialize_whole_point(
    output: *mut c_uchar,
    x32: *const c_uchar,
    y32: *const c_uchar,
    _data: *mut c_void,
) -> c_int {
    *output = 0x04;
    ptr::copy_nonoverlapping(x32, output.add(1), COORDINATE_SIZE);
    ptr::copy_nonoverlapping(y32, output.add(1 + COORDINATE_SIZE), COORDINATE_SIZE);
    1
}

/// `EcdhHashFn` writing `x || y` with no marker byte, used to hand the raw
/// coordinates to a caller-supplied closure.
unsafe extern "C" fn extract_coordinates(
    output: *mut c_uchar,
    x32: *const c_uchar,
    y32: *const c_uchar,
    _data: *mut c_void,
) -> c_int {
    ptr::copy_nonoverlapping(x32, output, COORDINATE_SIZE);
    ptr::copy_nonoverlapping(y32, output.add(COORDINATE_SIZE), COORDINATE_SIZE);
    1
}

/// Drives `secp256k1_ecdh` with the given callback and pass-through data.
///
/// The callback must not write more than `output.len()` bytes.
fn ecdh(
    point: &PublicKey,
    scalar: &SecretKey,
    hashfp: ffi::EcdhHashFn,
    data: *mut c_void,
    output: &mut [u8],
) -> c_int {
    unsafe {
        ffi::secp256k1_ecdh(
            ffi::secp256k1_context_no_precomp,
            output.as_mut_ptr(),
            point.as_c_ptr(),
            scalar.as_c_ptr(),
            hashfp,
            data,
        )
    }
}

/// Computes an ECDH shared secret with a runtime-selected serialization.
///
/// `arbitrary_data` is threaded through to the serialization callback
/// unmodified; all current serializations ignore it, and a missing or empty
/// slice is passed as a null pointer. The returned buffer is
/// [`SharedSecretSerialization::output_len`] bytes.
#[cfg(feature = "std")]
pub fn key_exchange(
    point: &PublicKey,
    scalar: &SecretKey,
    serialization: SharedSecretSerialization,
    arbitrary_data: Option<&[u8]>,
) -> Result<Vec<u8>, Error> {
    let mut output = vec![0u8; serialization.output_len()];

    let data = match arbitrary_data {
        Some(bytes) => bytes.as_c_ptr() as *mut c_void,
        None => ptr::null_mut(),
    };

    let ret = ecdh(point, scalar, serialization.hash_function(), data, &mut output);
    CallResult::from_raw(ret).into_result(Error::CannotComputeSharedSecret)?;

    Ok(output)
}

/// Computes the shared point and lets `hash_function` turn its affine
/// coordinates into the caller's representation.
///
/// Closure capture takes the role of the opaque data pointer that
/// `secp256k1_ecdh` threads through to its C callback: any context the
/// serialization needs can simply be captured.
pub fn shared_secret_with<F, R>(point: &PublicKey, scalar: &SecretKey, hash_function: F) -> R
where
    F: FnOnce(&[u8; COORDINATE_SIZE], &[u8; COORDINATE_SIZE]) -> R,
{
    let mut xy = [0u8; 2 * COORDINATE_SIZE];
    let ret = ecdh(point, scalar, Some(extract_coordinates), ptr::null_mut(), &mut xy);
    debug_assert_eq!(ret, 1);

    let mut x = [0u8; COORDINATE_SIZE];
    let mut y = [0u8; COORDINATE_SIZE];
    x.copy_from_slice(&xy[..COORDINATE_SIZE]);
    y.copy_from_slice(&xy[COORDINATE_SIZE..]);

    hash_function(&x, &y)
}

/// An ECDH shared secret serialized as the raw `x` coordinate of the shared
/// point, following ANSI X9.63.
///
/// The secret is unhashed: it is a field element, not uniformly distributed
/// bytes. Callers are expected to apply their own key derivation function
/// before using it as symmetric key material.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XOnlySharedSecret([u8; X_ONLY_SHARED_SECRET_SIZE]);

impl XOnlySharedSecret {
    /// Computes the shared secret between `point` and `scalar`, keeping only
    /// the `x` coordinate.
    pub fn new(point: &PublicKey, scalar: &SecretKey) -> XOnlySharedSecret {
        let mut output = [0u8; X_ONLY_SHARED_SECRET_SIZE];
        let ret = ecdh(point, scalar, Some(serialize_x_only), ptr::null_mut(), &mut output);
        debug_assert_eq!(ret, 1);

        XOnlySharedSecret(output)
    }

    /// Creates an [`XOnlySharedSecret`] directly from a slice.
    #[inline]
    pub fn from_slice(data: &[u8]) -> Result<XOnlySharedSecret, Error> {
        match data.len() {
            X_ONLY_SHARED_SECRET_SIZE => {
                let mut ret = [0; X_ONLY_SHARED_SECRET_SIZE];
                ret[..].copy_from_slice(data);
                Ok(XOnlySharedSecret(ret))
            }
            _ => Err(Error::InvalidSharedSecret),
        }
    }

    /// Obtains the inner bytes of the secret.
    pub fn to_bytes(&self) -> [u8; X_ONLY_SHARED_SECRET_SIZE] {
        self.0
    }

    /// Obtains a reference to the inner bytes of the secret.
    pub fn as_bytes(&self) -> &[u8; X_ONLY_SHARED_SECRET_SIZE] {
        &self.0
    }
}

impl From<[u8; X_ONLY_SHARED_SECRET_SIZE]> for XOnlySharedSecret {
    fn from(bytes: [u8; X_ONLY_SHARED_SECRET_SIZE]) -> Self {
        XOnlySharedSecret(bytes)
    }
}

impl From<XOnlySharedSecret> for [u8; X_ONLY_SHARED_SECRET_SIZE] {
    fn from(secret: XOnlySharedSecret) -> Self {
        secret.0
    }
}

impl AsRef<[u8]> for XOnlySharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for XOnlySharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "XOnlySharedSecret(")?;
        for i in self.0.iter() {
            write!(f, "{:02x}", i)?;
        }
        write!(f, ")")
    }
}

impl fmt::LowerHex for XOnlySharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ch in &self.0[..] {
            write!(f, "{:02x}", *ch)?;
        }
        Ok(())
    }
}

impl fmt::Display for XOnlySharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl str::FromStr for XOnlySharedSecret {
    type Err = Error;
    fn from_str(s: &str) -> Result<XOnlySharedSecret, Error> {
        let mut res = [0; X_ONLY_SHARED_SECRET_SIZE];
        match from_hex(s, &mut res) {
            Ok(X_ONLY_SHARED_SECRET_SIZE) => Ok(XOnlySharedSecret(res)),
            _ => Err(Error::InvalidSharedSecret),
        }
    }
}

#[cfg(feature = "serde")]
impl ::serde::Serialize for XOnlySharedSecret {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(self)
        } else {
            s.serialize_bytes(self.as_ref())
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for XOnlySharedSecret {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use crate::serde_util;

        if d.is_human_readable() {
            d.deserialize_str(serde_util::FromStrVisitor::new("an ASCII hex string"))
        } else {
            d.deserialize_bytes(serde_util::BytesVisitor::new(
                "a bytestring",
                XOnlySharedSecret::from_slice,
            ))
        }
    }
}

/// The whole ECDH shared point in uncompressed encoding, `0x04 || x || y`.
///
/// WARNING: this is the full shared point, unhashed, including the `y`
/// coordinate. It leaks everything the key exchange produced and is trivially
/// distinguishable from random bytes. It must never be used as symmetric key
/// material; its only legitimate use is as input to a custom construction
/// (e.g. an ECIES scheme) that does its own derivation. The distinct type
/// exists so it cannot be mistaken for a derived secret.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawSharedPoint([u8; RAW_SHARED_POINT_SIZE]);

impl RawSharedPoint {
    /// Computes the shared point between `point` and `scalar`, returning it
    /// whole. See the type-level warning.
    pub fn new(point: &PublicKey, scalar: &SecretKey) -> RawSharedPoint {
        let mut output = [0u8; RAW_SHARED_POINT_SIZE];
        let ret = ecdh(point, scalar, Some(serialize_whole_point), ptr::null_mut(), &mut output);
        debug_assert_eq!(ret, 1);

        RawSharedPoint(output)
    }

    /// Builds a [`RawSharedPoint`] from already-extracted coordinates.
    pub fn from_coordinates(
        x: &[u8; COORDINATE_SIZE],
        y: &[u8; COORDINATE_SIZE],
    ) -> RawSharedPoint {
        let mut ret = [0u8; RAW_SHARED_POINT_SIZE];
        ret[0] = 0x04;
        ret[1..1 + COORDINATE_SIZE].copy_from_slice(x);
        ret[1 + COORDINATE_SIZE..].copy_from_slice(y);
        RawSharedPoint(ret)
    }

    /// Parses a [`RawSharedPoint`] from its uncompressed encoding. The input
    /// must be 65 bytes starting with the `0x04` marker.
    #[inline]
    pub fn from_slice(data: &[u8]) -> Result<RawSharedPoint, Error> {
        match data.len() {
            RAW_SHARED_POINT_SIZE if data[0] == 0x04 => {
                let mut ret = [0; RAW_SHARED_POINT_SIZE];
                ret[..].copy_from_slice(data);
                Ok(RawSharedPoint(ret))
            }
            _ => Err(Error::InvalidSharedPoint),
        }
    }

    /// Serializes the point to its uncompressed encoding.
    pub fn serialize(&self) -> [u8; RAW_SHARED_POINT_SIZE] {
        self.0
    }

    /// The `x` coordinate of the shared point.
    pub fn x_coordinate(&self) -> [u8; COORDINATE_SIZE] {
        let mut x = [0u8; COORDINATE_SIZE];
        x.copy_from_slice(&self.0[1..1 + COORDINATE_SIZE]);
        x
    }

    /// The `y` coordinate of the shared point.
    pub fn y_coordinate(&self) -> [u8; COORDINATE_SIZE] {
        let mut y = [0u8; COORDINATE_SIZE];
        y.copy_from_slice(&self.0[1 + COORDINATE_SIZE..]);
        y
    }

    /// Drops the `y` coordinate, leaving the X9.63 x-only secret.
    pub fn to_x_only(&self) -> XOnlySharedSecret {
        XOnlySharedSecret(self.x_coordinate())
    }
}

impl AsRef<[u8]> for RawSharedPoint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RawSharedPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RawSharedPoint(")?;
        for i in self.0.iter() {
            write!(f, "{:02x}", i)?;
        }
        write!(f, ")")
    }
}

impl fmt::LowerHex for RawSharedPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ch in &self.0[..] {
            write!(f, "{:02x}", *ch)?;
        }
        Ok(())
    }
}

impl fmt::Display for RawSharedPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl str::FromStr for RawSharedPoint {
    type Err = Error;
    fn from_str(s: &str) -> Result<RawSharedPoint, Error> {
        let mut res = [0; RAW_SHARED_POINT_SIZE];
        match from_hex(s, &mut res) {
            Ok(RAW_SHARED_POINT_SIZE) => RawSharedPoint::from_slice(&res),
            _ => Err(Error::InvalidSharedPoint),
        }
    }
}

#[cfg(feature = "serde")]
impl ::serde::Serialize for RawSharedPoint {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(self)
        } else {
            s.serialize_bytes(self.as_ref())
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for RawSharedPoint {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use crate::serde_util;

        if d.is_human_readable() {
            d.deserialize_str(serde_util::FromStrVisitor::new("an ASCII hex string"))
        } else {
            d.deserialize_bytes(serde_util::BytesVisitor::new(
                "a bytestring",
                RawSharedPoint::from_slice,
            ))
        }
    }
}

/// An ECDH shared secret serialized with the upstream libsecp256k1 default:
/// SHA-256 of the compressed shared point.
///
/// Unlike [`SharedSecret`] from `secp256k1`, the constructor accepts
/// arbitrary pass-through data for the hash function callback.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct HashedSharedSecret([u8; HASHED_SHARED_SECRET_SIZE]);

impl HashedSharedSecret {
    /// Computes the shared secret between `point` and `scalar` with the
    /// upstream default serialization.
    pub fn new(point: &PublicKey, scalar: &SecretKey) -> HashedSharedSecret {
        HashedSharedSecret::with_arbitrary_data(point, scalar, None)
    }

    /// Like [`HashedSharedSecret::new`], threading `arbitrary_data` through
    /// to the hash function callback. The default hash function ignores it;
    /// a missing or empty slice is passed as a null pointer.
    pub fn with_arbitrary_data(
        point: &PublicKey,
        scalar: &SecretKey,
        arbitrary_data: Option<&[u8]>,
    ) -> HashedSharedSecret {
        let data = match arbitrary_data {
            Some(bytes) => bytes.as_c_ptr() as *mut c_void,
            None => ptr::null_mut(),
        };

        let mut output = [0u8; HASHED_SHARED_SECRET_SIZE];
        let hashfp = unsafe { ffi::secp256k1_ecdh_hash_function_default };
        let ret = ecdh(point, scalar, hashfp, data, &mut output);
        debug_assert_eq!(ret, 1);

        HashedSharedSecret(output)
    }

    /// Creates a [`HashedSharedSecret`] directly from a slice.
    #[inline]
    pub fn from_slice(data: &[u8]) -> Result<HashedSharedSecret, Error> {
        match data.len() {
            HASHED_SHARED_SECRET_SIZE => {
                let mut ret = [0; HASHED_SHARED_SECRET_SIZE];
                ret[..].copy_from_slice(data);
                Ok(HashedSharedSecret(ret))
            }
            _ => Err(Error::InvalidSharedSecret),
        }
    }

    /// Obtains the inner bytes of the secret.
    pub fn to_bytes(&self) -> [u8; HASHED_SHARED_SECRET_SIZE] {
        self.0
    }

    /// Obtains a reference to the inner bytes of the secret.
    pub fn as_bytes(&self) -> &[u8; HASHED_SHARED_SECRET_SIZE] {
        &self.0
    }
}

impl From<[u8; HASHED_SHARED_SECRET_SIZE]> for HashedSharedSecret {
    fn from(bytes: [u8; HASHED_SHARED_SECRET_SIZE]) -> Self {
        HashedSharedSecret(bytes)
    }
}

impl From<HashedSharedSecret> for [u8; HASHED_SHARED_SECRET_SIZE] {
    fn from(secret: HashedSharedSecret) -> Self {
        secret.0
    }
}

impl AsRef<[u8]> for HashedSharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HashedSharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HashedSharedSecret(")?;
        for i in self.0.iter() {
            write!(f, "{:02x}", i)?;
        }
        write!(f, ")")
    }
}

impl fmt::LowerHex for HashedSharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ch in &self.0[..] {
            write!(f, "{:02x}", *ch)?;
        }
        Ok(())
    }
}

impl fmt::Display for HashedSharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl str::FromStr for HashedSharedSecret {
    type Err = Error;
    fn from_str(s: &str) -> Result<HashedSharedSecret, Error> {
        let mut res = [0; HASHED_SHARED_SECRET_SIZE];
        match from_hex(s, &mut res) {
            Ok(HASHED_SHARED_SECRET_SIZE) => Ok(HashedSharedSecret(res)),
            _ => Err(Error::InvalidSharedSecret),
        }
    }
}

#[cfg(feature = "serde")]
impl ::serde::Serialize for HashedSharedSecret {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(self)
        } else {
            s.serialize_bytes(self.as_ref())
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for HashedSharedSecret {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use crate::serde_util;

        if d.is_human_readable() {
            d.deserialize_str(serde_util::FromStrVisitor::new("an ASCII hex string"))
        } else {
            d.deserialize_bytes(serde_util::BytesVisitor::new(
                "a bytestring",
                HashedSharedSecret::from_slice,
            ))
        }
    }
}
