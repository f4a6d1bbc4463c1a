// SPDX-License-Identifier: CC0-1.0

//! # Secp256k1-ext
//!
//! Extensions for `secp256k1`, the Rust bindings to libsecp256k1.
//!
//! This library re-exports everything from `secp256k1` and adds the following:
//!
//! - alternative serializations of the ECDH shared secret: the raw `x`
//!   coordinate as used by ANSI X9.63 key agreement, and the whole
//!   uncompressed shared point for custom schemes
//! - named outcomes for primitives whose raw form reports results as bare
//!   integers: public key comparison, signature normalization and
//!   signature verification
//!
//! As such, it can be used as a drop-in replacement for `secp256k1`. All types
//! are interoperable (as long as you are depending on the correct version)
//! which means [`SecretKey`]s and the [`Secp256k1`] context are interoperable.
//!

// Coding conventions
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]

pub extern crate secp256k1;

#[cfg(any(test, feature = "std"))]
extern crate core;
#[cfg(feature = "serde")]
pub extern crate actual_serde as serde;
#[cfg(all(test, feature = "serde"))]
extern crate serde_test;
#[cfg(test)]
extern crate rand;

use core::fmt;

pub use secp256k1::constants;
pub use secp256k1::ecdsa;
pub use secp256k1::ffi;
pub use secp256k1::schnorr;

pub use secp256k1::*;

pub mod ecdh;
mod outcome;
#[cfg(feature = "serde")]
mod serde_util;

pub use crate::ecdh::*;
pub use crate::outcome::*;

pub use secp256k1::Error as UpstreamError;

/// An extension-layer error
#[derive(Copy, PartialEq, Eq, Clone, Debug)]
pub enum Error {
    /// Calling through to `secp256k1` resulted in an error.
    Upstream(UpstreamError),
    /// The serialization callback reported failure, failing the whole ECDH exchange
    CannotComputeSharedSecret,
    /// Given bytes don't represent a valid shared secret
    InvalidSharedSecret,
    /// Given bytes don't represent a valid uncompressed shared point
    InvalidSharedPoint,
}

// Passthrough Debug to Display, since errors should be user-visible
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let str = match *self {
            Error::CannotComputeSharedSecret => "failed to compute ECDH shared secret",
            Error::InvalidSharedSecret => "malformed shared secret",
            Error::InvalidSharedPoint => "malformed uncompressed shared point",
            Error::Upstream(inner) => return write!(f, "{}", inner),
        };

        f.write_str(str)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<UpstreamError> for Error {
    fn from(e: UpstreamError) -> Self {
        Error::Upstream(e)
    }
}

/// Utility function used to parse hex into a target u8 buffer. Returns
/// the number of bytes converted or an error if it encounters an invalid
/// character or unexpected end of string.
fn from_hex(hex: &str, target: &mut [u8]) -> Result<usize, ()> {
    if hex.len() % 2 == 1 || hex.len() > target.len() * 2 {
        return Err(());
    }

    let mut b = 0;
    let mut idx = 0;
    for c in hex.bytes() {
        b <<= 4;
        match c {
            b'A'..=b'F' => b |= c - b'A' + 10,
            b'a'..=b'f' => b |= c - b'a' + 10,
            b'0'..=b'9' => b |= c - b'0',
            _ => return Err(()),
        }
        if (idx & 1) == 1 {
            target[idx / 2] = b;
            b = 0;
        }
        idx += 1;
    }
    Ok(idx / 2)
}
