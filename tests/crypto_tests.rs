//! Integration tests for the pwvault crypto module.

use pwvault::crypto::kdf::{hash_master_password, is_password_hash, verify_master_password};
use pwvault::crypto::{decrypt, encrypt, Argon2Params, KeyMaterial};
use pwvault::errors::PwVaultError;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Authenticated encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = br#"{"github|alice":"S3cr3t"}"#;

    let ciphertext = encrypt(&key, plaintext, b"hdr").expect("encrypt should succeed");

    // 12-byte nonce + 16-byte tag.
    assert_eq!(ciphertext.len(), plaintext.len() + 28);

    let recovered = decrypt(&key, &ciphertext, b"hdr").expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"hunter2";

    let ct1 = encrypt(&key, plaintext, b"").expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext, b"").expect("encrypt 2");

    assert_ne!(
        ct1, ct2,
        "two encryptions of the same plaintext must differ"
    );
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let ciphertext = encrypt(&[0x11u8; 32], b"secret", b"").unwrap();
    let result = decrypt(&[0x22u8; 32], &ciphertext, b"");
    assert!(matches!(result, Err(PwVaultError::DecryptionFailed)));
}

#[test]
fn decrypt_with_different_aad_fails() {
    let key = [0x33u8; 32];
    let ciphertext = encrypt(&key, b"secret", b"PWVL\x01").unwrap();
    assert!(decrypt(&key, &ciphertext, b"PWVL\x02").is_err());
}

#[test]
fn decrypt_rejects_truncated_input() {
    let key = [0x44u8; 32];
    assert!(decrypt(&key, &[0u8; 27], b"").is_err());
    assert!(decrypt(&key, &[], b"").is_err());
}

#[test]
fn tampered_ciphertext_is_rejected() {
    let key = [0x55u8; 32];
    let mut ciphertext = encrypt(&key, b"do not touch", b"").unwrap();
    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0x01;
    assert!(decrypt(&key, &ciphertext, b"").is_err());
}

// ---------------------------------------------------------------------------
// Key material
// ---------------------------------------------------------------------------

#[test]
fn key_material_encoding_roundtrip() {
    let key = KeyMaterial::generate();
    let encoded = key.to_encoded();
    let decoded = KeyMaterial::from_encoded(&encoded).expect("decode");
    assert_eq!(*key.blob_key().unwrap(), *decoded.blob_key().unwrap());
}

#[test]
fn blob_key_is_not_the_raw_key_material() {
    let key = KeyMaterial::new([7u8; 32]);
    assert_ne!(*key.blob_key().unwrap(), [7u8; 32]);
}

#[test]
fn key_material_rejects_wrong_length_and_garbage() {
    // 16 bytes, base64-encoded.
    assert!(matches!(
        KeyMaterial::from_encoded("AAAAAAAAAAAAAAAAAAAAAA=="),
        Err(PwVaultError::InvalidKeyMaterial(_))
    ));
    assert!(KeyMaterial::from_encoded("not base64 at all!").is_err());
    assert!(KeyMaterial::from_encoded("").is_err());
}

// ---------------------------------------------------------------------------
// Master password hashing
// ---------------------------------------------------------------------------

#[test]
fn master_password_hash_verifies() {
    let phc = hash_master_password(b"correct horse", &fast_params()).unwrap();

    assert!(is_password_hash(&phc));
    assert!(verify_master_password(b"correct horse", &phc).unwrap());
    assert!(!verify_master_password(b"battery staple", &phc).unwrap());
}

#[test]
fn hashing_same_password_twice_uses_fresh_salt() {
    let a = hash_master_password(b"pw", &fast_params()).unwrap();
    let b = hash_master_password(b"pw", &fast_params()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn plaintext_is_not_mistaken_for_a_hash() {
    assert!(!is_password_hash("hunter2"));
}
