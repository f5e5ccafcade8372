//! One-time authenticators over a tree of chameleon hashes.
//!
//! The holder publishes the root of a binary tree of depth [DEPTH] whose leaves are addressed by
//! the bits of a [Context]. Every node value is `CH("", ρ, i_0)` for a pseudorandom `ρ` only the
//! holder can derive. Authenticating `(ct, m, i)` opens each node on the path to `ct` to its two
//! children, and the leaf to `(m, i)`, using the trapdoor. Internal openings are deterministic, so
//! two tokens for the same context only differ at the leaf: authenticating two different messages
//! under one context hands anyone a collision, and with it the secret key.

use k256::Scalar;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::chameleon::{PublicKeyOnly, Trapdoor};
use crate::token::PathNode;
use crate::{
    group, ChameleonHash, Context, Error, HashValue, Param, PublicKey, Randomness, SecretKey,
    Token, CT_LEN, DEPTH, MAX_MESSAGE_LEN, POINT_LEN,
};

const NODE_DST: &[u8] = b"chameleon-auth/node/v1";
const NODE_TAG: u8 = 0x4e;
const NODE_MSG_LEN: usize = 1 + 2 * POINT_LEN;

/// Everything needed to verify tokens: the chameleon hash public key, the tree root, and the
/// index internal nodes are opened under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    pk: PublicKey,
    root: HashValue,
    default_index: u32,
}

impl VerifyingKey {
    /// The length of an encoded verifying key.
    pub const LEN: usize = 2 * POINT_LEN + 4;

    /// The chameleon hash public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// The published tree root.
    pub fn root(&self) -> &HashValue {
        &self.root
    }

    /// The index internal nodes are opened under.
    pub fn default_index(&self) -> u32 {
        self.default_index
    }

    /// Encodes the key as `pk || root || be32(default_index)`.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..POINT_LEN].copy_from_slice(&self.pk.to_bytes());
        out[POINT_LEN..2 * POINT_LEN].copy_from_slice(self.root.as_bytes());
        out[2 * POINT_LEN..].copy_from_slice(&self.default_index.to_be_bytes());
        out
    }

    /// Decodes a verifying key, validating both points.
    pub fn from_bytes(bytes: &[u8; Self::LEN]) -> Result<VerifyingKey, Error> {
        let (pk, rest) = bytes.split_at(POINT_LEN);
        let (root, index) = rest.split_at(POINT_LEN);
        let invalid = |_| Error::InvalidEncoding;

        Ok(VerifyingKey {
            pk: PublicKey::from_bytes(pk.try_into().map_err(invalid)?)?,
            root: HashValue::from_bytes(root.try_into().map_err(invalid)?)?,
            default_index: u32::from_be_bytes(index.try_into().map_err(invalid)?),
        })
    }
}

/// Verifies tokens and punishes context reuse, using only public information.
#[derive(Debug)]
pub struct Verifier {
    vk: VerifyingKey,
    hash: ChameleonHash<PublicKeyOnly>,
}

impl Verifier {
    /// Creates a verifier for the holder of `vk` under parameter `param`.
    pub fn new(vk: VerifyingKey, param: Param) -> Verifier {
        Verifier {
            vk,
            hash: ChameleonHash::new(vk.pk, param),
        }
    }

    /// The verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.vk
    }

    /// Returns true iff `token` authenticates `message` at `index` under context `ct`.
    ///
    /// Malformed input, such as an overlong message, is never valid.
    #[must_use]
    pub fn verify(&self, token: &Token, ct: &Context, message: &[u8], index: u32) -> bool {
        self.chain(token, ct, message, index)
            .map(|chain| chain.first() == Some(&self.vk.root))
            .unwrap_or(false)
    }

    /// Recovers the holder's secret key from two valid tokens for the same context.
    ///
    /// * `t1`, `m1`, `i1`: the first token, message, and index
    /// * `t2`, `m2`, `i2`: the second token, message, and index
    /// * `ct`: the context both tokens were issued under
    ///
    /// Fails with [Error::NotACollision] unless both tokens verify, and with
    /// [Error::DegenerateCollision] if they authenticate the same message under the same index.
    /// On success the key is also available from [Verifier::recovered_key].
    #[allow(clippy::too_many_arguments)]
    pub fn extract(
        &self,
        t1: &Token,
        t2: &Token,
        ct: &Context,
        m1: &[u8],
        m2: &[u8],
        i1: u32,
        i2: u32,
    ) -> Result<SecretKey, Error> {
        let c1 = self.chain(t1, ct, m1, i1)?;
        let c2 = self.chain(t2, ct, m2, i2)?;
        if c1.first() != Some(&self.vk.root) || c2.first() != Some(&self.vk.root) {
            return Err(Error::NotACollision);
        }

        // Both chains start at the root. Walk down while the openings agree; the first node
        // opened two different ways is a collision.
        let di = self.vk.default_index;
        for (depth, (n1, n2)) in t1.path().iter().zip(t2.path()).enumerate() {
            let b = bit(ct, depth);
            let msg1 = node_message(b, &c1[depth + 1], &n1.sibling);
            let msg2 = node_message(b, &c2[depth + 1], &n2.sibling);
            if msg1 != msg2 || n1.randomness != n2.randomness {
                let sk = self.hash.extract(
                    &msg1,
                    &n1.randomness,
                    di,
                    &msg2,
                    &n2.randomness,
                    di,
                )?;
                warn!(depth, "conflicting internal openings revealed the signing key");
                return Ok(sk);
            }
        }

        let sk = self
            .hash
            .extract(m1, t1.randomness(), i1, m2, t2.randomness(), i2)?;
        warn!(i1, i2, "context reuse revealed the signing key");
        Ok(sk)
    }

    /// The secret key recovered by a successful [Verifier::extract], if any.
    pub fn recovered_key(&self) -> Option<&SecretKey> {
        self.hash.recovered_key()
    }

    // Recomputes the node values on the path to `ct`, indexed by depth (root first).
    fn chain(
        &self,
        token: &Token,
        ct: &Context,
        message: &[u8],
        index: u32,
    ) -> Result<Vec<HashValue>, Error> {
        if token.path().len() != DEPTH {
            return Err(Error::InvalidEncoding);
        }

        let mut chain = Vec::with_capacity(DEPTH + 1);
        let mut h = self.hash.ch(message, token.randomness(), index)?;
        chain.push(h);
        for (depth, node) in token.path().iter().enumerate().rev() {
            let msg = node_message(bit(ct, depth), &h, &node.sibling);
            h = self.hash.ch(&msg, &node.randomness, self.vk.default_index)?;
            chain.push(h);
        }
        chain.reverse();
        Ok(chain)
    }
}

/// Issues one-time tokens under a secret key.
///
/// Also verifies and extracts like a [Verifier] for its own verifying key.
#[derive(Debug)]
pub struct Authenticator {
    hash: ChameleonHash<Trapdoor>,
    verifier: Verifier,
}

impl Authenticator {
    /// Creates an authenticator and computes its tree root.
    ///
    /// * `sk`: the chameleon hash trapdoor
    /// * `param`: the parameter `W`, which verifiers must also use
    /// * `default_index`: the index internal tree nodes are opened under
    pub fn new(sk: SecretKey, param: Param, default_index: u32) -> Result<Authenticator, Error> {
        let hash = ChameleonHash::with_trapdoor(sk, param, default_index);
        let root = node_value(&hash, 0, &[0u8; CT_LEN])?;
        let vk = VerifyingKey {
            pk: *hash.public_key(),
            root,
            default_index,
        };

        Ok(Authenticator {
            verifier: Verifier::new(vk, param),
            hash,
        })
    }

    /// The verifying key to publish.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.verifier.verifying_key()
    }

    /// Authenticates `message` at `index` under context `ct`.
    ///
    /// Authenticating two different messages under one context reveals the secret key.
    pub fn authenticate(&self, ct: &Context, message: &[u8], index: u32) -> Result<Token, Error> {
        if message.len() > MAX_MESSAGE_LEN {
            return Err(Error::InvalidEncoding);
        }

        let di = self.hash.default_index();
        let mut path = Vec::with_capacity(DEPTH);
        for depth in 0..DEPTH {
            let p = prefix(ct, depth);
            let left = node_value(&self.hash, depth + 1, &p)?;
            let right = node_value(&self.hash, depth + 1, &with_bit(&p, depth))?;

            let r0 = reference(&self.hash, depth, &p);
            let msg = node_message(0, &left, &right);
            let randomness = self.hash.collision(&[], &r0, di, &msg, di)?;
            let sibling = if bit(ct, depth) == 0 { right } else { left };
            path.push(PathNode {
                randomness,
                sibling,
            });
        }

        let r0 = reference(&self.hash, DEPTH, ct);
        let randomness = self.hash.collision(&[], &r0, di, message, index)?;
        debug!(index, "issued token");
        Ok(Token::new(randomness, path))
    }

    /// See [Verifier::verify].
    #[must_use]
    pub fn verify(&self, token: &Token, ct: &Context, message: &[u8], index: u32) -> bool {
        self.verifier.verify(token, ct, message, index)
    }

    /// See [Verifier::extract].
    #[allow(clippy::too_many_arguments)]
    pub fn extract(
        &self,
        t1: &Token,
        t2: &Token,
        ct: &Context,
        m1: &[u8],
        m2: &[u8],
        i1: u32,
        i2: u32,
    ) -> Result<SecretKey, Error> {
        self.verifier.extract(t1, t2, ct, m1, m2, i1, i2)
    }

    /// The secret key recovered by a successful [Authenticator::extract], if any.
    pub fn recovered_key(&self) -> Option<&SecretKey> {
        self.verifier.recovered_key()
    }
}

// The trapdoor-known reference opening ("", ρ, i_0) of the node at `depth` on the path to `ct`.
fn reference(hash: &ChameleonHash<Trapdoor>, depth: usize, ct: &Context) -> Randomness {
    let sk = Zeroizing::new(hash.secret_key().to_bytes());
    let mut hasher = Sha256::new();
    hasher.update(NODE_DST);
    hasher.update(sk.as_slice());
    hasher.update(hash.param().as_bytes());
    hasher.update((depth as u64).to_be_bytes());
    hasher.update(prefix(ct, depth));
    let rho: Scalar = group::scalar_from_digest(&hasher.finalize());
    Randomness(rho)
}

fn node_value(
    hash: &ChameleonHash<Trapdoor>,
    depth: usize,
    ct: &Context,
) -> Result<HashValue, Error> {
    hash.ch(&[], &reference(hash, depth, ct), hash.default_index())
}

// The message a node is opened to, given the child on the path and its sibling.
fn node_message(bit: u8, child: &HashValue, sibling: &HashValue) -> [u8; NODE_MSG_LEN] {
    let (left, right) = if bit == 0 {
        (child, sibling)
    } else {
        (sibling, child)
    };

    let mut msg = [0u8; NODE_MSG_LEN];
    msg[0] = NODE_TAG;
    msg[1..1 + POINT_LEN].copy_from_slice(left.as_bytes());
    msg[1 + POINT_LEN..].copy_from_slice(right.as_bytes());
    msg
}

// Bits are numbered MSB-first.
fn bit(ct: &Context, depth: usize) -> u8 {
    (ct[depth / 8] >> (7 - depth % 8)) & 1
}

// Keeps the first `depth` bits of `ct` and clears the rest.
fn prefix(ct: &Context, depth: usize) -> Context {
    let mut out = [0u8; CT_LEN];
    for (i, (o, c)) in out.iter_mut().zip(ct).enumerate() {
        let keep = depth.saturating_sub(8 * i).min(8);
        *o = c & (0xff00u16 >> keep) as u8;
    }
    out
}

fn with_bit(ct: &Context, depth: usize) -> Context {
    let mut out = *ct;
    out[depth / 8] |= 0x80 >> (depth % 8);
    out
}
