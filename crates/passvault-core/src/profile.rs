//! Lazy, idempotent creation of per-user encryption profiles.

use chrono::Utc;
use tracing::debug;

use crate::crypto::{generate_salt, KeyDerivation};
use crate::error::Result;
use crate::storage::{EncryptionProfile, ProfileStore, UserId};

/// Get a user's encryption profile, creating it on first use.
///
/// A new profile gets a fresh 32-byte salt and the iteration count of
/// `kdf`. An existing profile is returned unchanged, whatever `kdf` says.
/// Creation relies on [`ProfileStore::insert_profile_if_absent`], so two
/// callers racing on the same user end up with the same salt.
pub fn get_or_create<S>(store: &S, user_id: &UserId, kdf: KeyDerivation) -> Result<EncryptionProfile>
where
    S: ProfileStore + ?Sized,
{
    if let Some(profile) = store.get_profile(user_id)? {
        return Ok(profile);
    }

    debug!(user = %user_id, "no encryption profile yet; generating salt");
    let candidate = EncryptionProfile {
        user_id: user_id.clone(),
        salt: generate_salt()?,
        kdf_iterations: kdf.iterations(),
        created_at: Utc::now(),
    };
    store.insert_profile_if_absent(candidate)
}

/// The key derivation a profile was created with.
pub fn key_derivation(profile: &EncryptionProfile) -> Result<KeyDerivation> {
    KeyDerivation::with_iterations(profile.kdf_iterations)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;
    use crate::crypto::DEFAULT_ITERATIONS;
    use crate::storage::SqliteStore;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = UserId::new("alice").unwrap();

        let first = get_or_create(&store, &user, KeyDerivation::default()).unwrap();
        let second = get_or_create(&store, &user, KeyDerivation::default()).unwrap();

        assert_eq!(first.salt, second.salt);
        assert_eq!(first.kdf_iterations, DEFAULT_ITERATIONS);
    }

    #[test]
    fn test_distinct_users_get_distinct_salts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let alice = get_or_create(&store, &UserId::new("alice").unwrap(), KeyDerivation::default())
            .unwrap();
        let bob = get_or_create(&store, &UserId::new("bob").unwrap(), KeyDerivation::default())
            .unwrap();

        assert_ne!(alice.salt, bob.salt);
    }

    #[test]
    fn test_existing_profile_keeps_its_iterations() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = UserId::new("alice").unwrap();

        get_or_create(&store, &user, KeyDerivation::default()).unwrap();
        let stronger = KeyDerivation::with_iterations(DEFAULT_ITERATIONS * 2).unwrap();
        let profile = get_or_create(&store, &user, stronger).unwrap();

        assert_eq!(profile.kdf_iterations, DEFAULT_ITERATIONS);
        assert_eq!(
            key_derivation(&profile).unwrap(),
            KeyDerivation::default()
        );
    }

    #[test]
    fn test_concurrent_first_use_yields_one_salt() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let user = UserId::new("alice").unwrap();
                    barrier.wait();
                    get_or_create(store.as_ref(), &user, KeyDerivation::default())
                        .unwrap()
                        .salt
                })
            })
            .collect();

        let salts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(salts.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
