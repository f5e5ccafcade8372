use crate::{Error, HashValue, Randomness, DEPTH, POINT_LEN, SCALAR_LEN};

/// One internal node of an authentication path: the randomness opening the node to its two
/// children, and the child which is not on the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathNode {
    /// Opens the node to `tag || left || right`.
    pub randomness: Randomness,
    /// The value of the child off the path.
    pub sibling: HashValue,
}

/// A one-time authentication token binding a message to a context.
///
/// Carries the leaf opening randomness plus the path from the published root down to the leaf
/// selected by the context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    randomness: Randomness,
    path: Vec<PathNode>,
}

impl Token {
    /// The length of an encoded token.
    pub const LEN: usize = SCALAR_LEN + DEPTH * NODE_LEN;

    pub(crate) fn new(randomness: Randomness, path: Vec<PathNode>) -> Token {
        debug_assert_eq!(path.len(), DEPTH);
        Token { randomness, path }
    }

    /// The randomness opening the leaf to the authenticated message.
    pub fn randomness(&self) -> &Randomness {
        &self.randomness
    }

    /// The authentication path, ordered from the root down to the leaf's parent.
    pub fn path(&self) -> &[PathNode] {
        &self.path
    }

    /// Encodes the token as `r || (r_0 || sibling_0) || ... || (r_{DEPTH-1} || sibling_{DEPTH-1})`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend(self.randomness.to_bytes());
        for node in &self.path {
            out.extend(node.randomness.to_bytes());
            out.extend(node.sibling.as_bytes());
        }
        out
    }

    /// Decodes a token, validating every scalar and point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Token, Error> {
        if bytes.len() != Self::LEN {
            return Err(Error::InvalidEncoding);
        }

        let (r, nodes) = bytes.split_at(SCALAR_LEN);
        let randomness = Randomness::from_bytes(array(r)?)?;
        let path = nodes
            .chunks_exact(NODE_LEN)
            .map(|node| {
                let (r, sibling) = node.split_at(SCALAR_LEN);
                Ok(PathNode {
                    randomness: Randomness::from_bytes(array(r)?)?,
                    sibling: HashValue::from_bytes(array(sibling)?)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Token { randomness, path })
    }
}

const NODE_LEN: usize = SCALAR_LEN + POINT_LEN;

fn array<const N: usize>(bytes: &[u8]) -> Result<&[u8; N], Error> {
    bytes.try_into().map_err(|_| Error::InvalidEncoding)
}
