//! Password hashing and one-time secret generation.
//!
//! [`Argon2PasswordHasher`] stores PHC strings (`$argon2id$...`) so the
//! parameters travel with each hash. [`RandomSecretGenerator`] draws
//! verification codes and reset tokens from the operating system RNG.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use rand::{Rng as _, RngCore as _};

use crate::domain::ports::{PasswordHashError, PasswordHasher, SecretGenerator};
use crate::domain::{PasswordResetToken, PlainPassword, VerificationCode};

const RESET_TOKEN_BYTES: usize = 32;

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        Ok(self
            .argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Secret generator backed by the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSecretGenerator;

impl SecretGenerator for RandomSecretGenerator {
    fn verification_code(&self) -> VerificationCode {
        let value = rand::thread_rng().gen_range(VerificationCode::range());
        match VerificationCode::from_number(value) {
            Ok(code) => code,
            // gen_range stays inside the range it was given.
            Err(_) => unreachable!("verification code drawn outside its range"),
        }
    }

    fn reset_token(&self) -> PasswordResetToken {
        let mut bytes = [0_u8; RESET_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        PasswordResetToken::new(hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn password(raw: &str) -> PlainPassword {
        PlainPassword::new(raw).expect("long enough")
    }

    #[rstest]
    fn hash_round_trips_and_rejects_wrong_password() {
        let hasher = Argon2PasswordHasher::new();
        let stored = hasher.hash(&password("correct horse")).expect("hash");

        assert!(stored.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &stored).expect("verify"));
        assert!(!hasher.verify("battery staple", &stored).expect("verify"));
    }

    #[rstest]
    fn same_password_gets_distinct_salts() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash(&password("repeatable")).expect("hash");
        let second = hasher.hash(&password("repeatable")).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_stored_hash_is_an_error() {
        let err = Argon2PasswordHasher::new()
            .verify("anything", "plaintext-in-the-db")
            .expect_err("malformed");
        assert!(matches!(err, PasswordHashError::MalformedHash { .. }));
    }

    #[rstest]
    fn verification_codes_are_six_digits() {
        let generator = RandomSecretGenerator;
        for _ in 0..64 {
            let code = generator.verification_code();
            assert_eq!(code.as_ref().len(), 6);
            assert!(VerificationCode::parse(code.as_ref()).is_ok());
        }
    }

    #[rstest]
    fn reset_tokens_are_unique_hex() {
        let generator = RandomSecretGenerator;
        let first = generator.reset_token();
        let second = generator.reset_token();
        assert_eq!(first.expose().len(), RESET_TOKEN_BYTES * 2);
        assert!(first.expose().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(first.expose(), second.expose());
    }
}
