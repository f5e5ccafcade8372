use core::fmt;

use k256::elliptic_curve::group::GroupEncoding;
use k256::{NonZeroScalar, ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::group;
use crate::{Error, PARAM_LEN, POINT_LEN, SCALAR_LEN};

/// A chameleon hash trapdoor: a non-zero scalar `x` with public key `Y = [x]G`.
#[derive(Clone)]
pub struct SecretKey(NonZeroScalar);

impl SecretKey {
    /// Generates a uniformly random secret key from `rng`.
    pub fn random(mut rng: impl RngCore + CryptoRng) -> SecretKey {
        SecretKey(NonZeroScalar::random(&mut rng))
    }

    /// Decodes a big-endian secret key. Zero and unreduced values are rejected.
    pub fn from_bytes(bytes: &[u8; SCALAR_LEN]) -> Result<SecretKey, Error> {
        let s = group::scalar_from_bytes(bytes)?;
        Self::from_scalar(s).ok_or(Error::InvalidEncoding)
    }

    /// Returns the big-endian encoding of the secret key.
    pub fn to_bytes(&self) -> [u8; SCALAR_LEN] {
        group::scalar_to_bytes(&self.0)
    }

    /// Returns the public key `[x]G`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret(self)
    }

    pub(crate) fn from_scalar(s: Scalar) -> Option<SecretKey> {
        Option::from(NonZeroScalar::new(s)).map(SecretKey)
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl ConstantTimeEq for SecretKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.scalar().ct_eq(other.scalar())
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

/// A chameleon hash public key: a non-identity point `Y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    point: ProjectivePoint,
    bytes: [u8; POINT_LEN],
}

impl PublicKey {
    /// Decodes a compressed SEC1 public key.
    pub fn from_bytes(bytes: &[u8; POINT_LEN]) -> Result<PublicKey, Error> {
        let point = group::point_from_bytes(bytes)?;
        Ok(PublicKey {
            point,
            bytes: *bytes,
        })
    }

    /// Returns the compressed SEC1 encoding of the public key.
    pub fn to_bytes(&self) -> [u8; POINT_LEN] {
        self.bytes
    }

    pub(crate) fn point(&self) -> &ProjectivePoint {
        &self.point
    }

    /// Returns true iff `sk` is the discrete log of this key. Runs in constant time.
    pub(crate) fn is_generated_by(&self, sk: &SecretKey) -> bool {
        (ProjectivePoint::GENERATOR * sk.scalar())
            .ct_eq(&self.point)
            .into()
    }

    fn from_secret(sk: &SecretKey) -> PublicKey {
        let point = ProjectivePoint::GENERATOR * sk.scalar();
        // [x]G for non-zero x is never the identity, so its compressed form is a SEC1 point.
        let mut bytes = [0u8; POINT_LEN];
        bytes.copy_from_slice(&point.to_bytes());
        PublicKey { point, bytes }
    }
}

/// The public parameter `W` shared by every party hashing under one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Param([u8; PARAM_LEN]);

impl Param {
    /// Wraps 32 opaque bytes as a parameter.
    pub const fn new(bytes: [u8; PARAM_LEN]) -> Param {
        Param(bytes)
    }

    /// Generates a random parameter from `rng`.
    pub fn random(mut rng: impl RngCore + CryptoRng) -> Param {
        let mut bytes = [0u8; PARAM_LEN];
        rng.fill_bytes(&mut bytes);
        Param(bytes)
    }

    /// Returns the parameter bytes.
    pub fn as_bytes(&self) -> &[u8; PARAM_LEN] {
        &self.0
    }
}
