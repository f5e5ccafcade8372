//! chameleon-auth provides a discrete-log [chameleon hash](ChameleonHash) over secp256k1 and
//! one-time [authenticators](Authenticator) built on it.
//!
//! A chameleon hash `CH(m, r, i) = [r]G + [e(m, i, W)]Y` can be evaluated by anyone holding the
//! public key `Y`. The holder of the trapdoor `x = log_G(Y)` can open any hash value to any
//! message, and any two openings of one value disclose `x`. Authenticators use this to make
//! equivocation self-punishing: authenticating two different messages under the same context
//! reveals the signer's secret key to whoever sees both tokens.
//!
//! ```
//! use chameleon_auth::{Authenticator, Param, SecretKey, Verifier};
//! # let mut rng = rand::thread_rng();
//!
//! let sk = SecretKey::random(&mut rng);
//! let param = Param::random(&mut rng);
//! let acca = Authenticator::new(sk.clone(), param, 0).unwrap();
//!
//! // Anyone with the verifying key and the parameter can check tokens.
//! let verifier = Verifier::new(*acca.verifying_key(), param);
//! let ct = *b"block-42";
//!
//! let t1 = acca.authenticate(&ct, b"pay alice", 0).unwrap();
//! let t2 = acca.authenticate(&ct, b"pay bob", 0).unwrap();
//! assert!(verifier.verify(&t1, &ct, b"pay alice", 0));
//! assert!(verifier.verify(&t2, &ct, b"pay bob", 0));
//!
//! // But two messages under one context give the key away.
//! let leaked = verifier.extract(&t1, &t2, &ct, b"pay alice", b"pay bob", 0, 0).unwrap();
//! assert_eq!(leaked, sk);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use crate::authenticator::{Authenticator, Verifier, VerifyingKey};
pub use crate::chameleon::{ChameleonHash, HashValue, Mode, PublicKeyOnly, Randomness, Trapdoor};
pub use crate::error::Error;
pub use crate::keys::{Param, PublicKey, SecretKey};
pub use crate::token::{PathNode, Token};

mod authenticator;
mod chameleon;
mod error;
mod group;
mod keys;
mod oracle;
mod token;

#[cfg(test)]
mod test_utils;

/// The length of a commitment context in bytes.
pub const CT_LEN: usize = 8;

/// The depth of the authentication tree: one level per context bit.
pub const DEPTH: usize = 8 * CT_LEN;

/// The longest message which can be hashed.
pub const MAX_MESSAGE_LEN: usize = 255;

/// The length of an encoded scalar (secret keys and randomness).
pub const SCALAR_LEN: usize = 32;

/// The length of an encoded point (public keys and hash values).
pub const POINT_LEN: usize = 33;

/// The length of the public parameter `W`.
pub const PARAM_LEN: usize = 32;

/// A commitment context. Every token issued under one context opens the same tree leaf.
pub type Context = [u8; CT_LEN];

/// Given an encoded secret key `sk`, returns the encoded public key.
pub fn public_key(sk: &[u8; SCALAR_LEN]) -> Result<[u8; POINT_LEN], Error> {
    SecretKey::from_bytes(sk).map(|sk| sk.public_key().to_bytes())
}

/// Cryptographic functionality which will let you do stupid things to yourself.
pub mod hazmat {
    pub use k256::{ProjectivePoint, Scalar};

    pub use crate::oracle::challenge;
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{PK, SK};

    use super::*;

    #[test]
    fn known_public_key() {
        assert_eq!(public_key(&SK), Ok(PK));
        assert_eq!(public_key(&[0u8; SCALAR_LEN]), Err(Error::InvalidEncoding));
    }

    #[test]
    fn hazmat_challenge_matches_ch() {
        let sk = SecretKey::from_bytes(&SK).expect("valid secret key");
        let param = Param::new([3u8; PARAM_LEN]);
        let ch = ChameleonHash::with_trapdoor(sk.clone(), param, 0);
        let r = Randomness::from_bytes(&[1u8; SCALAR_LEN]).expect("reduced scalar");

        let e = hazmat::challenge(b"m", 9, &param).expect("short message");
        let p = hazmat::ProjectivePoint::GENERATOR * (r.0 + e * sk.scalar());
        let expected = group::point_to_bytes(&p).expect("non-identity point");

        assert_eq!(ch.ch(b"m", &r, 9).map(|h| h.to_bytes()), Ok(expected));
    }
}
