use std::sync::Barrier;
use std::thread;

use credential_store::{Availability, Config, CredentialStore, StoreError};
use tempfile::TempDir;

fn open_store(pool_size: u32) -> (TempDir, CredentialStore) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("credentials.db");
    let mut config = Config::for_database(path.to_str().unwrap());
    config.pool_size = pool_size;
    let store = CredentialStore::open(&config).unwrap();
    (tmp, store)
}

#[test]
fn example_scenario() {
    let (_tmp, store) = open_store(2);

    store.register("alice", "alice@x.com", "secret1").unwrap();
    assert!(store.authenticate("alice", "secret1").unwrap());
    assert!(!store.authenticate("alice", "wrong").unwrap());
    assert!(matches!(
        store.register("bob", "alice@x.com", "secret2"),
        Err(StoreError::DuplicateEmail)
    ));
    assert_eq!(
        store.exists("alice", "carol@x.com").unwrap(),
        Availability {
            username_taken: true,
            email_taken: false
        }
    );
}

#[test]
fn every_registered_triple_authenticates() {
    let (_tmp, store) = open_store(2);
    let triples = [
        ("alice", "alice@x.com", "secret1"),
        ("bob", "bob@x.com", "correct horse battery staple"),
        ("émilie", "emilie@x.fr", "pässwörd"),
        ("dave", "dave@x.com", " "),
    ];

    for (username, email, password) in triples {
        store.register(username, email, password).unwrap();
    }
    for (username, _, password) in triples {
        assert!(store.authenticate(username, password).unwrap(), "{username}");
    }
    assert_eq!(store.account_count().unwrap(), triples.len() as i64);
}

#[test]
fn distinct_passwords_do_not_cross_authenticate() {
    let (_tmp, store) = open_store(2);
    store.register("alice", "alice@x.com", "secret1").unwrap();

    for wrong in ["secret2", "secret1 ", "SECRET1", "", "secret"] {
        assert!(!store.authenticate("alice", wrong).unwrap(), "{wrong:?}");
    }
}

#[test]
fn duplicate_username_leaves_existing_account_untouched() {
    let (_tmp, store) = open_store(2);
    store.register("alice", "alice@x.com", "secret1").unwrap();

    let err = store
        .register("alice", "other@x.com", "different")
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername));

    assert!(store.authenticate("alice", "secret1").unwrap());
    assert!(!store.authenticate("alice", "different").unwrap());
    assert_eq!(
        store.exists("nobody", "other@x.com").unwrap(),
        Availability {
            username_taken: false,
            email_taken: false
        }
    );
    assert_eq!(store.account_count().unwrap(), 1);
}

#[test]
fn collision_on_both_fields_is_a_duplicate() {
    let (_tmp, store) = open_store(1);
    store.register("alice", "alice@x.com", "secret1").unwrap();

    assert!(matches!(
        store.register("alice", "alice@x.com", "secret1"),
        Err(StoreError::DuplicateUsername | StoreError::DuplicateEmail)
    ));
    assert_eq!(store.account_count().unwrap(), 1);
}

#[test]
fn unknown_username_fails_without_error() {
    let (_tmp, store) = open_store(1);
    assert!(!store.authenticate("never-registered", "secret1").unwrap());

    store.register("alice", "alice@x.com", "secret1").unwrap();
    assert!(!store.authenticate("never-registered", "secret1").unwrap());
}

#[test]
fn concurrent_duplicate_registration_has_one_winner() {
    let (_tmp, store) = open_store(4);
    let barrier = Barrier::new(2);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = ["first@x.com", "second@x.com"]
            .into_iter()
            .map(|email| {
                let store = store.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    store.register("alice", email, "secret1")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(store.account_count().unwrap(), 1);
    assert!(store.authenticate("alice", "secret1").unwrap());
}

#[test]
fn many_concurrent_registrations_of_distinct_accounts_all_land() {
    let (_tmp, store) = open_store(4);

    thread::scope(|scope| {
        for worker in 0..4 {
            let store = store.clone();
            scope.spawn(move || {
                for n in 0..10 {
                    let name = format!("user-{worker}-{n}");
                    store
                        .register(&name, &format!("{name}@x.com"), "secret")
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(store.account_count().unwrap(), 40);
    assert!(store.authenticate("user-3-9", "secret").unwrap());
}

#[test]
fn reopening_the_same_file_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("credentials.db");
    let config = Config::for_database(path.to_str().unwrap());

    let store = CredentialStore::open(&config).unwrap();
    store.register("alice", "alice@x.com", "secret1").unwrap();
    drop(store);

    for _ in 0..3 {
        let store = CredentialStore::open(&config).unwrap();
        assert_eq!(store.account_count().unwrap(), 1);
    }
}

#[test]
fn unreachable_database_is_reported_as_unavailable() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("missing-dir").join("credentials.db");
    let mut config = Config::for_database(path.to_str().unwrap());
    config.pool_size = 1;
    config.connect_timeout = std::time::Duration::from_millis(200);

    let err = match CredentialStore::open(&config) {
        Ok(_) => panic!("opening a database in a missing directory should fail"),
        Err(err) => err,
    };
    assert!(matches!(err, StoreError::Unavailable(_)));
}
