use passvault_core::crypto::{decrypt, encrypt, SecretToken};
use passvault_core::storage::RecordStore;
use passvault_core::{
    Record, RecordDraft, RecordUpdate, SkipReason, SqliteStore, UserId, UserKey, Vault,
    VaultError,
};
use secrecy::{ExposeSecret, SecretString};

fn vault() -> Vault<SqliteStore> {
    Vault::new(SqliteStore::open_in_memory().expect("open in-memory store"))
}

fn alice() -> UserId {
    UserId::new("alice").expect("valid user id")
}

fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn reveal(vault: &Vault<SqliteStore>, key: &UserKey, record: &Record) -> String {
    vault
        .reveal_secret(key, record)
        .expect("reveal should succeed")
        .expect("record should have a secret")
        .expose_secret()
        .to_string()
}

#[test]
fn test_encrypt_decrypt_secret_round_trip() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");

    let plaintexts: [&[u8]; 4] = [b"", b"x", b"exactly sixteen!", "pässwörd ✓".as_bytes()];
    for plaintext in plaintexts {
        let token = vault
            .encrypt_secret(&alice(), &pass, plaintext)
            .expect("encrypt should succeed");
        let decrypted = vault
            .decrypt_secret(&alice(), &pass, &token)
            .expect("decrypt should succeed");
        assert_eq!(decrypted.as_slice(), plaintext);
    }
}

#[test]
fn test_token_survives_text_storage() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");

    let token = vault
        .encrypt_secret(&alice(), &pass, b"hunter2")
        .expect("encrypt should succeed");
    let stored = token.encode();
    assert!(stored.is_ascii());

    let decoded = SecretToken::decode(&stored).expect("decode should succeed");
    let decrypted = vault
        .decrypt_secret(&alice(), &pass, &decoded)
        .expect("decrypt should succeed");
    assert_eq!(decrypted.as_slice(), b"hunter2");
}

#[test]
fn test_wrong_passphrase_fails_closed() {
    let vault = vault();
    let token = vault
        .encrypt_secret(&alice(), &passphrase("passphrase-one"), b"secret")
        .expect("encrypt should succeed");

    let result = vault.decrypt_secret(&alice(), &passphrase("passphrase-two"), &token);
    assert!(matches!(result, Err(VaultError::AuthFailure)));
}

#[test]
fn test_other_users_key_fails_closed() {
    let vault = vault();
    let pass = passphrase("shared passphrase");
    let bob = UserId::new("bob").expect("valid user id");

    let token = vault
        .encrypt_secret(&alice(), &pass, b"secret")
        .expect("encrypt should succeed");

    // Same passphrase, different salt
    let result = vault.decrypt_secret(&bob, &pass, &token);
    assert!(matches!(result, Err(VaultError::AuthFailure)));
}

#[test]
fn test_empty_passphrase_is_invalid_input() {
    let vault = vault();
    let result = vault.encrypt_secret(&alice(), &passphrase(""), b"secret");
    assert!(matches!(result, Err(VaultError::InvalidInput(_))));
}

#[test]
fn test_profile_is_stable_and_key_is_deterministic() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");

    let first = vault.get_or_create_profile(&alice()).expect("profile");
    let second = vault.get_or_create_profile(&alice()).expect("profile");
    assert_eq!(first.salt, second.salt);

    let key1 = vault.unlock(&alice(), &pass).expect("unlock");
    let key2 = vault.unlock(&alice(), &pass).expect("unlock");
    assert_eq!(key1.key().as_bytes(), key2.key().as_bytes());

    // A token sealed in one "session" opens in the next
    let token = encrypt(b"carry over", key1.key()).expect("encrypt");
    assert_eq!(
        decrypt(&token, key2.key()).expect("decrypt").as_slice(),
        b"carry over"
    );
}

#[test]
fn test_same_plaintext_yields_distinct_tokens() {
    let vault = vault();
    let key = vault
        .unlock(&alice(), &passphrase("correct horse battery staple"))
        .expect("unlock");

    let token1 = encrypt(b"same", key.key()).expect("encrypt");
    let token2 = encrypt(b"same", key.key()).expect("encrypt");
    assert_ne!(token1, token2);
}

#[test]
fn test_flipped_byte_is_auth_failure() {
    let vault = vault();
    let key = vault
        .unlock(&alice(), &passphrase("correct horse battery staple"))
        .expect("unlock");
    let token = encrypt(b"integrity matters", key.key()).expect("encrypt");

    let original = token.to_bytes().expect("token bytes");

    for index in 0..original.len() {
        let mut bytes = original.clone();
        bytes[index] ^= 0x80;
        let result = decrypt(&SecretToken::from_bytes(bytes), key.key());
        assert!(
            matches!(result, Err(VaultError::AuthFailure)),
            "flip at byte {} was not rejected",
            index
        );
    }
}

#[test]
fn test_garbage_token_is_malformed() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");

    let short = SecretToken::from_bytes(vec![0x80; 10]);
    assert!(matches!(
        vault.decrypt_secret(&alice(), &pass, &short),
        Err(VaultError::MalformedToken(_))
    ));
    assert!(matches!(
        SecretToken::decode("%%%"),
        Err(VaultError::MalformedToken(_))
    ));
}

#[test]
fn test_import_scenario_with_url_and_comments() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");
    let text = "Bank:\nhttps://bank.example\nalice\nsecret123\nnote one\nnote two\n";

    let report = vault
        .import_from_text(&alice(), &pass, text.lines())
        .expect("import should succeed");

    assert!(report.warnings.is_empty());
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.owner_id, alice());
    assert_eq!(record.category_id, report.category.id);
    assert_eq!(record.service_name, "Bank");
    assert_eq!(record.service_url, "https://bank.example");
    assert_eq!(record.username, "alice");
    assert_eq!(record.comments, "note one\nnote two");

    let key = vault.unlock(&alice(), &pass).expect("unlock");
    assert_eq!(reveal(&vault, &key, record), "secret123");
}

#[test]
fn test_import_scenario_without_url() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");

    let report = vault
        .import_from_text(&alice(), &pass, "Mail:\nbob\npw1\n".lines())
        .expect("import should succeed");

    assert!(report.warnings.is_empty());
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.service_name, "Mail");
    assert_eq!(record.service_url, "");
    assert_eq!(record.username, "bob");
    assert_eq!(record.comments, "");

    let key = vault.unlock(&alice(), &pass).expect("unlock");
    assert_eq!(reveal(&vault, &key, record), "pw1");
}

#[test]
fn test_import_scenario_insufficient_data() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");

    let report = vault
        .import_from_text(&alice(), &pass, "Empty:\nonlyoneline\n".lines())
        .expect("import should succeed");

    assert!(report.records.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].service, "Empty");
    assert_eq!(report.warnings[0].reason, SkipReason::InsufficientData);
    assert!(vault.list_records(&alice()).expect("list").is_empty());
}

#[test]
fn test_import_keeps_good_blocks_around_bad_ones() {
    let vault = vault().with_import_category("legacy");
    let pass = passphrase("correct horse battery staple");
    let text = "Mail:\nbob\npw1\n\nBroken:\njust-one\n\nForum:\ncarol\nhunter2\nmod account\n";

    let report = vault
        .import_from_text(&alice(), &pass, text.lines())
        .expect("import should succeed");

    let names: Vec<&str> = report
        .records
        .iter()
        .map(|r| r.service_name.as_str())
        .collect();
    assert_eq!(names, vec!["Mail", "Forum"]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].service, "Broken");
    assert_eq!(report.category.name, "legacy");

    let stored = vault.list_records(&alice()).expect("list");
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.category_id == report.category.id));
}

#[test]
fn test_import_wrong_passphrase_later_fails_to_reveal() {
    let vault = vault();
    vault
        .import_from_text(
            &alice(),
            &passphrase("import passphrase"),
            "Mail:\nbob\npw1\n".lines(),
        )
        .expect("import should succeed");

    let wrong = vault
        .unlock(&alice(), &passphrase("not the passphrase"))
        .expect("unlock never fails on a wrong passphrase");
    let record = &vault.find_records(&alice(), "mail").expect("find")[0];
    assert!(matches!(
        vault.reveal_secret(&wrong, record),
        Err(VaultError::AuthFailure)
    ));
}

#[test]
fn test_add_update_reveal_record() {
    let vault = vault();
    let key = vault
        .unlock(&alice(), &passphrase("correct horse battery staple"))
        .expect("unlock");

    let record = vault
        .add_record(
            &key,
            RecordDraft {
                category: "work".to_string(),
                service_name: " GitHub ".to_string(),
                service_url: "https://github.com".to_string(),
                username: "alice".to_string(),
                secret: passphrase("first-secret"),
                comments: String::new(),
            },
        )
        .expect("add should succeed");
    assert_eq!(record.service_name, "GitHub");
    assert_eq!(reveal(&vault, &key, &record), "first-secret");

    // An empty secret keeps the current token
    let kept = vault
        .update_record(
            &key,
            &record.id,
            RecordUpdate {
                comments: Some("2FA enabled".to_string()),
                secret: Some(passphrase("")),
                ..Default::default()
            },
        )
        .expect("update should succeed");
    assert_eq!(kept.encrypted_secret, record.encrypted_secret);
    assert_eq!(kept.comments, "2FA enabled");

    let rotated = vault
        .update_record(
            &key,
            &record.id,
            RecordUpdate {
                secret: Some(passphrase("second-secret")),
                ..Default::default()
            },
        )
        .expect("update should succeed");
    let fetched = vault.get_record(&alice(), &rotated.id).expect("get");
    assert_eq!(reveal(&vault, &key, &fetched), "second-secret");
    assert_eq!(fetched.comments, "2FA enabled");
}

#[test]
fn test_record_without_secret_reveals_none() {
    let vault = vault();
    let key = vault
        .unlock(&alice(), &passphrase("correct horse battery staple"))
        .expect("unlock");

    let record = vault
        .add_record(
            &key,
            RecordDraft {
                category: "personal".to_string(),
                service_name: "Library".to_string(),
                service_url: String::new(),
                username: "alice".to_string(),
                secret: passphrase(""),
                comments: String::new(),
            },
        )
        .expect("add should succeed");

    assert!(record.encrypted_secret.is_none());
    assert!(vault
        .reveal_secret(&key, &record)
        .expect("reveal should succeed")
        .is_none());
}

#[test]
fn test_reveal_rejects_foreign_record() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");
    vault
        .import_from_text(&alice(), &pass, "Mail:\nbob\npw1\n".lines())
        .expect("import should succeed");
    let record = vault.list_records(&alice()).expect("list").remove(0);

    let bob = UserId::new("bob").expect("valid user id");
    let bob_key = vault.unlock(&bob, &pass).expect("unlock");
    assert!(matches!(
        vault.reveal_secret(&bob_key, &record),
        Err(VaultError::InvalidInput(_))
    ));
}

#[test]
fn test_delete_record() {
    let vault = vault();
    let pass = passphrase("correct horse battery staple");
    let report = vault
        .import_from_text(&alice(), &pass, "Mail:\nbob\npw1\n".lines())
        .expect("import should succeed");
    let id = report.records[0].id;

    vault.delete_record(&alice(), &id).expect("delete");
    assert!(matches!(
        vault.delete_record(&alice(), &id),
        Err(VaultError::RecordNotFound(_))
    ));
    assert!(vault.store().get_record(&alice(), &id).expect("get").is_none());
}
