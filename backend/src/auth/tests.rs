use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_AUTH_SECRET", SECRET);
    }
}

fn mint_token(claims: &LedgerClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_validate_ledger_jwt_success() {
    set_env_vars();
    let my_claims = LedgerClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        role: "user".to_string(),
        exp: 9999999999, // far future
    };

    let token = mint_token(&my_claims, SECRET);
    let claims = validate_ledger_jwt(&token).expect("Valid token should pass");
    assert_eq!(claims.sub, my_claims.sub);
    assert_eq!(claims.role, "user");
}

#[test]
fn test_validate_ledger_jwt_expired() {
    set_env_vars();
    let my_claims = LedgerClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        role: "user".to_string(),
        exp: 1, // past
    };

    let token = mint_token(&my_claims, SECRET);
    assert!(validate_ledger_jwt(&token).is_err());
}

#[test]
fn test_validate_ledger_jwt_invalid_signature() {
    set_env_vars();
    let my_claims = LedgerClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        role: "admin".to_string(),
        exp: 9999999999,
    };

    let token = mint_token(&my_claims, "wrongsecret");
    assert!(validate_ledger_jwt(&token).is_err());
}
