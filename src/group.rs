//! Fixed-size encodings of secp256k1 scalars and points.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};

use crate::{Error, POINT_LEN, SCALAR_LEN};

/// Decodes a big-endian scalar, rejecting values which are not reduced modulo the group order.
pub fn scalar_from_bytes(bytes: &[u8; SCALAR_LEN]) -> Result<Scalar, Error> {
    Option::from(Scalar::from_repr(FieldBytes::from(*bytes))).ok_or(Error::InvalidEncoding)
}

pub fn scalar_to_bytes(s: &Scalar) -> [u8; SCALAR_LEN] {
    s.to_bytes().into()
}

/// Reduces a 32-byte digest modulo the group order.
pub fn scalar_from_digest(digest: &FieldBytes) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(digest)
}

/// Decodes a compressed SEC1 point. Only the `0x02`/`0x03` tags are accepted, which also excludes
/// the identity.
pub fn point_from_bytes(bytes: &[u8; POINT_LEN]) -> Result<ProjectivePoint, Error> {
    if bytes[0] != 0x02 && bytes[0] != 0x03 {
        return Err(Error::InvalidEncoding);
    }
    let enc = EncodedPoint::from_bytes(bytes).map_err(|_| Error::InvalidEncoding)?;
    let p: Option<AffinePoint> = AffinePoint::from_encoded_point(&enc).into();
    p.map(ProjectivePoint::from).ok_or(Error::PointNotOnCurve)
}

/// Encodes a point in compressed SEC1 form. The identity has no 33-byte encoding.
pub fn point_to_bytes(p: &ProjectivePoint) -> Result<[u8; POINT_LEN], Error> {
    if *p == ProjectivePoint::IDENTITY {
        return Err(Error::InvalidEncoding);
    }
    let enc = p.to_affine().to_encoded_point(true);
    enc.as_bytes().try_into().map_err(|_| Error::InvalidEncoding)
}
