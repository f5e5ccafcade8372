//! A discrete-log chameleon hash over secp256k1:
//!
//! ```text
//! CH(m, r, i) = [r]G + [e(m, i, W)]Y
//! ```
//!
//! The holder of `x = log_G(Y)` can open any hash value to any message. Conversely, any two
//! openings of the same value with different hash scalars reveal `x`.

use std::sync::OnceLock;

use k256::elliptic_curve::Field;
use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use tracing::{debug, error};

use crate::{group, oracle, Error, Param, PublicKey, SecretKey, POINT_LEN, SCALAR_LEN};

/// The randomness half of an opening: a scalar `r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Randomness(pub(crate) Scalar);

impl Randomness {
    /// Samples uniformly random randomness from `rng`.
    pub fn random(mut rng: impl RngCore + CryptoRng) -> Randomness {
        Randomness(Scalar::random(&mut rng))
    }

    /// Decodes big-endian randomness. Values not reduced modulo the group order are rejected.
    pub fn from_bytes(bytes: &[u8; SCALAR_LEN]) -> Result<Randomness, Error> {
        group::scalar_from_bytes(bytes).map(Randomness)
    }

    /// Returns the big-endian encoding.
    pub fn to_bytes(&self) -> [u8; SCALAR_LEN] {
        group::scalar_to_bytes(&self.0)
    }
}

/// A chameleon hash value: a compressed, non-identity curve point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HashValue([u8; POINT_LEN]);

impl HashValue {
    /// Decodes a hash value, checking that it is a valid point.
    pub fn from_bytes(bytes: &[u8; POINT_LEN]) -> Result<HashValue, Error> {
        group::point_from_bytes(bytes)?;
        Ok(HashValue(*bytes))
    }

    /// Returns a copy of the compressed SEC1 encoding.
    pub fn to_bytes(&self) -> [u8; POINT_LEN] {
        self.0
    }

    /// Borrows the compressed SEC1 encoding.
    pub fn as_bytes(&self) -> &[u8; POINT_LEN] {
        &self.0
    }
}

impl ConstantTimeEq for HashValue {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// The key material a [ChameleonHash] was constructed with.
pub trait Mode: sealed::Sealed {
    #[doc(hidden)]
    fn record(&self, sk: &SecretKey);
}

/// Only the public key is known. A trapdoor may be recovered later by [ChameleonHash::extract].
#[derive(Debug, Default)]
pub struct PublicKeyOnly {
    recovered: OnceLock<SecretKey>,
}

/// The trapdoor is known from construction.
#[derive(Clone, Debug)]
pub struct Trapdoor {
    sk: SecretKey,
    default_index: u32,
}

impl sealed::Sealed for PublicKeyOnly {}
impl sealed::Sealed for Trapdoor {}

impl Mode for PublicKeyOnly {
    fn record(&self, sk: &SecretKey) {
        // The discrete log is unique, so a later recovery can only yield the same key.
        self.recovered.get_or_init(|| sk.clone());
    }
}

impl Mode for Trapdoor {
    fn record(&self, _sk: &SecretKey) {}
}

/// A chameleon hash instance bound to one public key and one parameter `W`.
#[derive(Debug)]
pub struct ChameleonHash<K> {
    pk: PublicKey,
    param: Param,
    key: K,
}

impl<K: Mode> ChameleonHash<K> {
    /// The public key `Y`.
    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// The parameter `W`.
    pub fn param(&self) -> &Param {
        &self.param
    }

    /// Evaluates `CH(m, r, i)`.
    ///
    /// Fails with [Error::InvalidEncoding] if `message` is longer than
    /// [MAX_MESSAGE_LEN](crate::MAX_MESSAGE_LEN) bytes.
    pub fn ch(&self, message: &[u8], r: &Randomness, index: u32) -> Result<HashValue, Error> {
        let e = oracle::challenge(message, index, &self.param)?;
        self.evaluate(&e, r)
    }

    /// Recovers the trapdoor from two openings of the same hash value.
    ///
    /// * `(m1, r1, i1)`: the first opening
    /// * `(m2, r2, i2)`: the second opening
    ///
    /// Fails with [Error::NotACollision] if the openings hash to different values, and with
    /// [Error::DegenerateCollision] if they share a hash scalar. On success a public-only instance
    /// remembers the key, enabling [ChameleonHash::collision] on it.
    pub fn extract(
        &self,
        m1: &[u8],
        r1: &Randomness,
        i1: u32,
        m2: &[u8],
        r2: &Randomness,
        i2: u32,
    ) -> Result<SecretKey, Error> {
        let e1 = oracle::challenge(m1, i1, &self.param)?;
        let e2 = oracle::challenge(m2, i2, &self.param)?;
        if self.evaluate(&e1, r1)? != self.evaluate(&e2, r2)? {
            return Err(Error::NotACollision);
        }

        // [r1]G + [e1 x]G = [r2]G + [e2 x]G  =>  x = (r2 - r1) / (e1 - e2)
        let d_inv: Option<Scalar> = (e1 - e2).invert().into();
        let d_inv = d_inv.ok_or(Error::DegenerateCollision)?;
        let sk = SecretKey::from_scalar((r2.0 - r1.0) * d_inv)
            .filter(|sk| self.pk.is_generated_by(sk))
            .ok_or_else(|| {
                error!("extracted key does not match the public key");
                Error::ConsistencyViolation
            })?;

        debug!("recovered trapdoor from a collision");
        self.key.record(&sk);
        Ok(sk)
    }

    fn evaluate(&self, e: &Scalar, r: &Randomness) -> Result<HashValue, Error> {
        let p = ProjectivePoint::GENERATOR * r.0 + *self.pk.point() * e;
        group::point_to_bytes(&p).map(HashValue)
    }
}

impl ChameleonHash<PublicKeyOnly> {
    /// Creates an instance which can evaluate the hash but knows no trapdoor.
    pub fn new(pk: PublicKey, param: Param) -> ChameleonHash<PublicKeyOnly> {
        ChameleonHash {
            pk,
            param,
            key: PublicKeyOnly::default(),
        }
    }

    /// Finds `r2` with `CH(m2, r2, i2) = CH(m1, r1, i1)` using a previously recovered trapdoor.
    ///
    /// Fails with [Error::MissingTrapdoor] until [ChameleonHash::extract] has succeeded.
    pub fn collision(
        &self,
        m1: &[u8],
        r1: &Randomness,
        i1: u32,
        m2: &[u8],
        i2: u32,
    ) -> Result<Randomness, Error> {
        let sk = self.recovered_key().ok_or(Error::MissingTrapdoor)?;
        collide(sk, &self.param, m1, r1, i1, m2, i2)
    }

    /// The trapdoor recovered by a successful [ChameleonHash::extract], if any.
    pub fn recovered_key(&self) -> Option<&SecretKey> {
        self.key.recovered.get()
    }

    /// Upgrades to a trapdoor instance once the key has been recovered. Returns `self` unchanged
    /// otherwise.
    pub fn into_trapdoor(
        self,
        default_index: u32,
    ) -> Result<ChameleonHash<Trapdoor>, ChameleonHash<PublicKeyOnly>> {
        match self.recovered_key().cloned() {
            Some(sk) => Ok(ChameleonHash::with_trapdoor(sk, self.param, default_index)),
            None => Err(self),
        }
    }
}

impl ChameleonHash<Trapdoor> {
    /// Creates an instance which knows its trapdoor. The public key is derived as `[sk]G`.
    ///
    /// * `sk`: the trapdoor
    /// * `param`: the parameter `W`
    /// * `default_index`: the index used for openings the holder makes on its own behalf
    pub fn with_trapdoor(
        sk: SecretKey,
        param: Param,
        default_index: u32,
    ) -> ChameleonHash<Trapdoor> {
        ChameleonHash {
            pk: sk.public_key(),
            param,
            key: Trapdoor { sk, default_index },
        }
    }

    /// Finds `r2` with `CH(m2, r2, i2) = CH(m1, r1, i1)`.
    ///
    /// Only fails if either message is too long.
    pub fn collision(
        &self,
        m1: &[u8],
        r1: &Randomness,
        i1: u32,
        m2: &[u8],
        i2: u32,
    ) -> Result<Randomness, Error> {
        collide(&self.key.sk, &self.param, m1, r1, i1, m2, i2)
    }

    /// The trapdoor.
    pub fn secret_key(&self) -> &SecretKey {
        &self.key.sk
    }

    /// The index passed at construction.
    pub fn default_index(&self) -> u32 {
        self.key.default_index
    }

    /// Returns a public-only instance for the same key and parameter.
    pub fn to_public(&self) -> ChameleonHash<PublicKeyOnly> {
        ChameleonHash::new(self.pk, self.param)
    }
}

// r2 = r1 + x(e1 - e2)
fn collide(
    sk: &SecretKey,
    param: &Param,
    m1: &[u8],
    r1: &Randomness,
    i1: u32,
    m2: &[u8],
    i2: u32,
) -> Result<Randomness, Error> {
    let e1 = oracle::challenge(m1, i1, param)?;
    let e2 = oracle::challenge(m2, i2, param)?;
    Ok(Randomness(r1.0 + *sk.scalar() * (e1 - e2)))
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, Rng};

    use hex_literal::hex;

    use crate::test_utils::{random_message, randomness, secret_key, M1, M2, PK, R1, R2, W};
    use crate::MAX_MESSAGE_LEN;

    use super::*;

    fn public() -> ChameleonHash<PublicKeyOnly> {
        ChameleonHash::new(PublicKey::from_bytes(&PK).expect("valid public key"), W)
    }

    fn trapdoor(default_index: u32) -> ChameleonHash<Trapdoor> {
        ChameleonHash::with_trapdoor(secret_key(), W, default_index)
    }

    // CH("abc", R1, 0) under the shared test key and parameter.
    const CH_M1_R1: [u8; POINT_LEN] =
        hex!("0347cb1aabe072865ba9a1c874799b83976acf82bb58923528d1bfc9d2af222b17");

    #[test]
    fn ch_single_public() {
        let h = public().ch(M1, &randomness(&R1), 0).expect("valid input");
        assert_eq!(h.to_bytes(), CH_M1_R1);
    }

    #[test]
    fn ch_single_trapdoor() {
        let h = trapdoor(7).ch(M1, &randomness(&R1), 0).expect("valid input");
        assert_eq!(h.as_bytes(), &CH_M1_R1);
    }

    #[test]
    fn ch_agrees_across_modes() {
        let r1 = randomness(&R1);
        let h = public().ch(M1, &r1, 0).expect("valid input");

        assert_eq!(trapdoor(0).ch(M1, &r1, 0), Ok(h));
        assert_eq!(public().ch(M1, &r1, 0), Ok(h));
        assert_ne!(public().ch(M1, &r1, 1), Ok(h));
        assert_ne!(public().ch(M2, &r1, 0), Ok(h));
        assert_ne!(public().ch(M1, &randomness(&R2), 0), Ok(h));
        assert_eq!(HashValue::from_bytes(&h.to_bytes()), Ok(h));
    }

    #[test]
    fn ch_rejects_long_messages() {
        let r = Randomness::random(thread_rng());
        assert_eq!(
            public().ch(&[0u8; MAX_MESSAGE_LEN + 1], &r, 0),
            Err(Error::InvalidEncoding)
        );
    }

    #[test]
    fn collision_correct_single() {
        let ch = trapdoor(0);
        let r1 = randomness(&R1);

        let r2 = ch.collision(M1, &r1, 0, M2, 1).expect("short messages");
        assert_eq!(ch.ch(M2, &r2, 1), ch.ch(M1, &r1, 0));
    }

    #[test]
    fn collision_correct_random() {
        let ch = ChameleonHash::with_trapdoor(SecretKey::random(thread_rng()), W, 0);
        for _ in 0..100 {
            let (x1, x2) = (random_message(), random_message());
            let (i1, i2) = (thread_rng().gen(), thread_rng().gen());
            let r1 = Randomness::random(thread_rng());

            let r2 = ch.collision(&x1, &r1, i1, &x2, i2).expect("short messages");
            assert_eq!(ch.ch(&x2, &r2, i2), ch.ch(&x1, &r1, i1));
        }
    }

    #[test]
    fn collision_requires_trapdoor() {
        let r1 = randomness(&R1);
        assert_eq!(
            public().collision(M1, &r1, 0, M2, 1),
            Err(Error::MissingTrapdoor)
        );
    }

    #[test]
    fn extract_single() {
        let chsk = trapdoor(1);
        let r1 = randomness(&R1);
        let r2 = chsk.collision(M1, &r1, 1, M2, 0).expect("short messages");

        let ch = public();
        assert_eq!(ch.recovered_key(), None);
        assert_eq!(ch.extract(M1, &r1, 1, M2, &r2, 0), Ok(secret_key()));
        assert_eq!(ch.recovered_key(), Some(&secret_key()));

        // the recovered key reproduces both collisions computed with the trapdoor
        assert_eq!(ch.collision(M1, &r1, 1, M2, 0), Ok(r2));
        assert_eq!(ch.collision(M2, &r2, 0, M1, 1), Ok(r1));
    }

    #[test]
    fn repeated_extract_keeps_key() {
        let chsk = trapdoor(0);
        let r1 = randomness(&R1);
        let r2 = chsk.collision(M1, &r1, 0, M2, 0).expect("short messages");
        let r3 = chsk.collision(M1, &r1, 0, M1, 4).expect("short messages");

        let ch = public();
        assert_eq!(ch.extract(M1, &r1, 0, M2, &r2, 0), Ok(secret_key()));
        assert_eq!(ch.extract(M1, &r1, 0, M1, &r3, 4), Ok(secret_key()));
        assert_eq!(ch.recovered_key(), Some(&secret_key()));
    }

    #[test]
    fn extract_random() {
        for _ in 0..20 {
            let sk = SecretKey::random(thread_rng());
            let chsk = ChameleonHash::with_trapdoor(sk.clone(), W, 0);
            let ch = chsk.to_public();

            let (x1, x2) = (random_message(), random_message());
            let r1 = Randomness::random(thread_rng());
            let r2 = chsk.collision(&x1, &r1, 0, &x2, 0).expect("short messages");

            match ch.extract(&x1, &r1, 0, &x2, &r2, 0) {
                Ok(extracted) => assert_eq!(extracted, sk),
                // equal random messages share a hash scalar
                Err(e) => {
                    assert_eq!(e, Error::DegenerateCollision);
                    assert_eq!(x1, x2);
                }
            }
        }
    }

    #[test]
    fn extract_on_trapdoor_instance() {
        let ch = trapdoor(0);
        let r1 = randomness(&R1);
        let r2 = ch.collision(M1, &r1, 0, M2, 0).expect("short messages");

        assert_eq!(ch.extract(M1, &r1, 0, M2, &r2, 0), Ok(secret_key()));
    }

    #[test]
    fn extract_rejects_non_collisions() {
        let ch = public();
        let (r1, r2) = (randomness(&R1), randomness(&R2));

        assert_eq!(
            ch.extract(M1, &r1, 0, M2, &r2, 1),
            Err(Error::NotACollision)
        );
        assert_eq!(ch.recovered_key(), None);
    }

    #[test]
    fn extract_rejects_degenerate_collisions() {
        let ch = public();
        let r1 = randomness(&R1);

        assert_eq!(
            ch.extract(M1, &r1, 0, M1, &r1, 0),
            Err(Error::DegenerateCollision)
        );
        assert_eq!(ch.recovered_key(), None);
    }

    #[test]
    fn into_trapdoor_after_extract() {
        let r1 = randomness(&R1);
        let r2 = trapdoor(0).collision(M1, &r1, 0, M2, 3).expect("short messages");

        let ch = match public().into_trapdoor(5) {
            Ok(_) => panic!("no key has been recovered"),
            Err(ch) => ch,
        };
        ch.extract(M1, &r1, 0, M2, &r2, 3).expect("valid collision");

        let ch = ch.into_trapdoor(5).expect("key was recovered");
        assert_eq!(ch.secret_key(), &secret_key());
        assert_eq!(ch.default_index(), 5);
        assert_eq!(ch.collision(M1, &r1, 0, M2, 3), Ok(r2));
    }

    #[test]
    fn randomness_rejects_unreduced_scalars() {
        assert_eq!(
            Randomness::from_bytes(&[0xff; SCALAR_LEN]),
            Err(Error::InvalidEncoding)
        );
        let r = Randomness::random(thread_rng());
        assert_eq!(Randomness::from_bytes(&r.to_bytes()), Ok(r));
    }
}
