use k256::Scalar;
use sha2::{Digest, Sha256};

use crate::{group, Error, Param, MAX_MESSAGE_LEN};

const E_DST: &[u8] = b"chameleon-auth/e/v1";

/// The domain-separated hash-to-scalar function `e(m, i, W)`:
///
/// ```text
/// e = SHA-256(DST || W || be32(i) || u8(len(m)) || m) mod n
/// ```
///
/// Messages longer than [MAX_MESSAGE_LEN] bytes are rejected rather than truncated.
pub fn challenge(message: &[u8], index: u32, param: &Param) -> Result<Scalar, Error> {
    let len = u8::try_from(message.len()).map_err(|_| Error::InvalidEncoding)?;
    debug_assert!(usize::from(len) <= MAX_MESSAGE_LEN);

    let mut hasher = Sha256::new();
    hasher.update(E_DST);
    hasher.update(param.as_bytes());
    hasher.update(index.to_be_bytes());
    hasher.update([len]);
    hasher.update(message);
    Ok(group::scalar_from_digest(&hasher.finalize()))
}
