use thiserror::Error;

/// The ways a chameleon hash or authenticator operation can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A key, point, scalar, or message has a malformed byte representation.
    #[error("malformed encoding of a key, point, scalar, or message")]
    InvalidEncoding,

    /// The supplied bytes do not decode to a point on the curve.
    #[error("the encoded point is not on the curve")]
    PointNotOnCurve,

    /// A collision was requested from an instance which does not know its trapdoor.
    #[error("finding a collision requires the trapdoor")]
    MissingTrapdoor,

    /// The two openings do not hash to the same value.
    #[error("the openings do not collide")]
    NotACollision,

    /// The two openings share the same hash scalar, so nothing can be extracted.
    #[error("the openings collide trivially and reveal nothing")]
    DegenerateCollision,

    /// An extracted key does not reproduce the public key it was extracted for.
    #[error("the recovered key does not match the public key")]
    ConsistencyViolation,
}
