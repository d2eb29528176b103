use std::sync::RwLock;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

/// In-process store for the configured admin credential (session strategy).
/// The password is hashed once at startup and only the hash is retained;
/// rotation swaps the hash in memory and never touches configuration files.
pub struct CredentialStore {
    username: String,
    hash: RwLock<String>,
}

impl CredentialStore {
    pub fn new(username: &str, password: &str) -> anyhow::Result<Self> {
        Ok(Self {
            username: username.to_string(),
            hash: RwLock::new(hash_password(password)?),
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }
        let hash = match self.hash.read() {
            Ok(guard) => guard.clone(),
            Err(_) => return false,
        };
        let Ok(parsed) = PasswordHash::new(&hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn rotate(&self, new_password: &str) -> anyhow::Result<()> {
        let new_hash = hash_password(new_password)?;
        let mut guard = self
            .hash
            .write()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        *guard = new_hash;
        Ok(())
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_configured_pair() {
        let store = CredentialStore::new("boss", "hunter2").unwrap();
        assert!(store.verify("boss", "hunter2"));
        assert!(!store.verify("boss", "hunter3"));
        assert!(!store.verify("intern", "hunter2"));
    }

    #[test]
    fn rotate_invalidates_the_old_password() {
        let store = CredentialStore::new("boss", "hunter2").unwrap();
        store.rotate("correct horse").unwrap();
        assert!(!store.verify("boss", "hunter2"));
        assert!(store.verify("boss", "correct horse"));
    }

    #[test]
    fn hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("other", &hash));
    }
}
