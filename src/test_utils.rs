use hex_literal::hex;
use rand::{thread_rng, Rng, RngCore};

use crate::{Context, Param, Randomness, SecretKey, CT_LEN, MAX_MESSAGE_LEN};

// A secp256k1 key pair and parameter shared by the known-answer tests.
pub const SK: [u8; 32] = hex!("b21977c8ca1cbb55f0a3effd9966e3d5c9588688fa02bf7a0d2af7b6366f1e8f");
pub const PK: [u8; 33] = hex!("03170a377241d94a5f4c85f199c796c5a9f9f56b3e2d6aea18be9188d13131769c");
pub const W: Param = Param::new(SK);

pub const M1: &[u8] = b"abc";
pub const M2: &[u8] = b"123";
pub const R1: [u8; 32] = hex!("0102030405060708010203040506070801020304050607080102030405060708");
pub const R2: [u8; 32] = hex!("d1d2d3d4d5d6d7d8d1d2d3d4d5d6d7d8d1d2d3d4d5d6d7d8d1d2d3d4d5d6d7d8");
pub const CT: Context = hex!("4104ff175fa917ab");

pub fn secret_key() -> SecretKey {
    SecretKey::from_bytes(&SK).expect("valid secret key")
}

pub fn randomness(bytes: &[u8; 32]) -> Randomness {
    Randomness::from_bytes(bytes).expect("reduced scalar")
}

// A random message of up to the maximum length, possibly empty.
pub fn random_message() -> Vec<u8> {
    let mut rng = thread_rng();
    let mut m = vec![0u8; rng.gen_range(0..=MAX_MESSAGE_LEN)];
    rng.fill_bytes(&mut m);
    m
}

pub fn random_context() -> Context {
    thread_rng().gen::<[u8; CT_LEN]>()
}
