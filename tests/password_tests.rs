use pitchside_auth::auth::password::{hash_password, verify_password};
use pitchside_auth::auth::security_token::generate_secure_token;

#[test]
fn test_hash_and_verify_password() {
    let password = "secure_password_123";
    let hash = hash_password(password).expect("Failed to hash password");

    assert!(!hash.is_empty());
    assert_ne!(hash, password);

    let is_valid = verify_password(password, &hash).expect("Failed to verify password");
    assert!(is_valid);
}

#[test]
fn test_wrong_password_fails() {
    let hash = hash_password("correct123").expect("Failed to hash");

    let is_valid = verify_password("wrong456", &hash).expect("Failed to verify");
    assert!(!is_valid);
}

#[test]
fn test_case_sensitive_passwords() {
    let hash = hash_password("Password123").expect("Failed to hash");

    assert!(verify_password("Password123", &hash).expect("Failed to verify"));
    assert!(!verify_password("password123", &hash).expect("Failed to verify"));
    assert!(!verify_password("PASSWORD123", &hash).expect("Failed to verify"));
}

#[test]
fn test_hash_produces_different_results() {
    let password = "same_password";

    let hash1 = hash_password(password).expect("Failed to hash 1");
    let hash2 = hash_password(password).expect("Failed to hash 2");

    // Hashes should be different due to random salt, which is what rules out
    // indexed lookup for token hashes
    assert_ne!(hash1, hash2);

    assert!(verify_password(password, &hash1).expect("Failed to verify 1"));
    assert!(verify_password(password, &hash2).expect("Failed to verify 2"));
}

#[test]
fn test_invalid_hash_format_fails() {
    let invalid_hashes = vec!["", "not a valid hash", "random_string_123", "$2b$10$invalid"];

    for invalid_hash in invalid_hashes {
        let result = verify_password("test123", invalid_hash);
        assert!(
            result.is_err(),
            "Should fail for invalid hash format: {}",
            invalid_hash
        );
    }
}

#[test]
fn test_hash_format_is_argon2() {
    let hash = hash_password("test123").expect("Failed to hash");

    assert!(
        hash.starts_with("$argon2"),
        "Hash should be Argon2 format: {}",
        hash
    );
}

#[test]
fn test_generate_secure_token_shape() {
    let token = generate_secure_token();

    assert_eq!(token.len(), 64, "Token should be 64-char hex (32 bytes)");
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_generate_secure_token_uniqueness() {
    let token1 = generate_secure_token();
    let token2 = generate_secure_token();

    assert_ne!(token1, token2);
}
