//! Registry behaviour: validation rules, normalization and CRUD semantics

mod common;

use async_trait::async_trait;
use auth_certs::registry::{
    ERR_INVALID_NAME, ERR_MISSING_CLIENT_AUTH, ERR_NEGATIVE_MAX_TTL, ERR_NEGATIVE_TTL,
    ERR_PARSE_CERTIFICATE, ERR_TTL_EXCEEDS_MAX_TTL,
};
use auth_certs::{
    CertAuthError, CertRegistry, CertWriteRequest, FileStorage, InMemoryStorage,
    StaticSystemView, Storage, StorageEntry,
};
use common::*;
use std::sync::Arc;
use std::time::Duration;

const STORAGE_DOWN: &str = "storage backend unavailable";

/// Memory storage whose reads and writes can be made to fail independently.
struct FailingStorage {
    inner: InMemoryStorage,
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingStorage {
    fn check(&self, fail: bool) -> auth_certs::Result<()> {
        if fail {
            Err(CertAuthError::Storage(STORAGE_DOWN.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn get(&self, key: &str) -> auth_certs::Result<Option<StorageEntry>> {
        self.check(self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn put(&self, entry: StorageEntry) -> auth_certs::Result<()> {
        self.check(self.fail_writes)?;
        self.inner.put(entry).await
    }

    async fn delete(&self, key: &str) -> auth_certs::Result<()> {
        self.check(self.fail_writes)?;
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> auth_certs::Result<Vec<String>> {
        self.check(self.fail_reads)?;
        self.inner.list(prefix).await
    }
}

fn failing_registry(fail_reads: bool, fail_writes: bool) -> (CertRegistry, InMemoryStorage) {
    let inner = InMemoryStorage::new();
    let storage = FailingStorage {
        inner: inner.clone(),
        fail_reads,
        fail_writes,
    };
    let system = StaticSystemView::new(
        Duration::from_secs(SYSTEM_DEFAULT_TTL),
        Duration::from_secs(SYSTEM_MAX_TTL),
    );
    (CertRegistry::new(Arc::new(storage), Arc::new(system)), inner)
}

fn assert_storage_failure(err: CertAuthError) {
    assert!(
        matches!(err, CertAuthError::Storage(ref msg) if msg == STORAGE_DOWN),
        "expected Storage({}), got {:?}",
        STORAGE_DOWN,
        err
    );
}

fn assert_invalid(err: CertAuthError, expected: &str) {
    assert!(
        matches!(err, CertAuthError::InvalidArgument(ref msg) if msg == expected),
        "expected InvalidArgument({}), got {:?}",
        expected,
        err
    );
}

#[tokio::test]
async fn test_negative_ttl_rejected_without_write() {
    let (registry, storage) = test_registry();

    let err = registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_ttl(-1))
        .await
        .unwrap_err();

    assert_invalid(err, ERR_NEGATIVE_TTL);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_negative_max_ttl_rejected_without_write() {
    let (registry, storage) = test_registry();

    let err = registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_max_ttl(-30))
        .await
        .unwrap_err();

    assert_invalid(err, ERR_NEGATIVE_MAX_TTL);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_ttl_above_max_ttl_rejected() {
    let (registry, storage) = test_registry();

    // Well inside the system ceilings, but above the entry's own bound
    let err = registry
        .write(
            CertWriteRequest::new("web", client_auth_cert())
                .with_ttl(600)
                .with_max_ttl(300),
        )
        .await
        .unwrap_err();

    assert_invalid(err, ERR_TTL_EXCEEDS_MAX_TTL);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_ttl_equal_to_max_ttl_accepted() {
    let (registry, _storage) = test_registry();

    let outcome = registry
        .write(
            CertWriteRequest::new("web", client_auth_cert())
                .with_ttl(300)
                .with_max_ttl(300),
        )
        .await
        .unwrap();

    assert!(!outcome.has_warnings());
}

#[tokio::test]
async fn test_ttl_without_max_ttl_is_unbounded() {
    let (registry, _storage) = test_registry();

    let result = registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_ttl(600))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unparseable_certificate_rejected() {
    let (registry, storage) = test_registry();

    for bad in ["", "not a certificate", "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n"] {
        let err = registry
            .write(CertWriteRequest::new("web", bad))
            .await
            .unwrap_err();
        assert_invalid(err, ERR_PARSE_CERTIFICATE);
    }
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_leaf_without_client_auth_rejected() {
    let (registry, storage) = test_registry();

    let err = registry
        .write(CertWriteRequest::new("web", server_auth_cert()))
        .await
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_invalid(err, ERR_MISSING_CLIENT_AUTH);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_leaf_with_client_auth_accepted() {
    let (registry, _storage) = test_registry();

    registry
        .write(CertWriteRequest::new("web", client_auth_cert()))
        .await
        .unwrap();

    assert!(registry.read("web").await.unwrap().is_some());
}

#[tokio::test]
async fn test_leaf_with_any_usage_accepted() {
    let (registry, _storage) = test_registry();

    let result = registry
        .write(CertWriteRequest::new("web", any_usage_cert()))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_leaf_without_declared_usages_accepted() {
    let (registry, _storage) = test_registry();

    let result = registry
        .write(CertWriteRequest::new("web", unconstrained_leaf_cert()))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_ca_exempt_from_client_auth_rule() {
    let (registry, _storage) = test_registry();

    let result = registry
        .write(CertWriteRequest::new("root-ca", ca_cert_server_only()))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_only_first_certificate_in_bundle_is_checked() {
    let (registry, _storage) = test_registry();

    // Leading cert is acceptable; the trailing server-only leaf is not inspected
    let accepted = format!("{}\n{}", client_auth_cert(), server_auth_cert());
    registry
        .write(CertWriteRequest::new("bundle", accepted.clone()))
        .await
        .unwrap();

    let stored = registry.read("bundle").await.unwrap().unwrap();
    assert_eq!(stored.certificate, accepted);
    assert_eq!(stored.parsed_certificates().len(), 2);

    // Leading cert fails the rule even though a later one would pass
    let rejected = format!("{}\n{}", server_auth_cert(), client_auth_cert());
    let err = registry
        .write(CertWriteRequest::new("bundle", rejected))
        .await
        .unwrap_err();
    assert_invalid(err, ERR_MISSING_CLIENT_AUTH);
}

#[tokio::test]
async fn test_name_lookup_is_case_insensitive() {
    let (registry, _storage) = test_registry();

    registry
        .write(
            CertWriteRequest::new("Example", client_auth_cert())
                .with_policies("dev")
                .with_ttl(60),
        )
        .await
        .unwrap();

    let lower = registry.read("example").await.unwrap().unwrap();
    let upper = registry.read("EXAMPLE").await.unwrap().unwrap();

    assert_eq!(lower, upper);
    assert_eq!(lower.name, "example");
    assert_eq!(registry.list().await.unwrap(), vec!["example".to_string()]);
}

#[tokio::test]
async fn test_repeated_write_is_idempotent() {
    let (registry, storage) = test_registry();
    let cert = client_auth_cert();
    let request = CertWriteRequest::new("web", cert)
        .with_display_name("Web Frontend")
        .with_policies("ops,dev")
        .with_ttl(120)
        .with_max_ttl(600);

    registry.write(request.clone()).await.unwrap();
    let once = storage.snapshot();

    registry.write(request).await.unwrap();
    assert_eq!(storage.snapshot(), once);
}

#[tokio::test]
async fn test_write_replaces_entry_in_full() {
    let (registry, _storage) = test_registry();

    registry
        .write(
            CertWriteRequest::new("web", client_auth_cert())
                .with_display_name("Web Frontend")
                .with_policies("ops")
                .with_ttl(120),
        )
        .await
        .unwrap();

    // Omitted fields revert to defaults instead of keeping prior values
    registry
        .write(CertWriteRequest::new("web", client_auth_cert()))
        .await
        .unwrap();

    let entry = registry.read("web").await.unwrap().unwrap();
    assert_eq!(entry.display_name, "web");
    assert!(entry.policies.is_empty());
    assert_eq!(entry.ttl, Duration::ZERO);
}

#[tokio::test]
async fn test_delete_missing_entry_succeeds() {
    let (registry, _storage) = test_registry();

    registry.delete("never-written").await.unwrap();
}

#[tokio::test]
async fn test_delete_is_case_insensitive() {
    let (registry, storage) = test_registry();

    registry
        .write(CertWriteRequest::new("web", client_auth_cert()))
        .await
        .unwrap();
    registry.delete("WEB").await.unwrap();

    assert!(registry.read("web").await.unwrap().is_none());
    assert!(storage.get("cert/web").await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_missing_entry_is_none() {
    let (registry, _storage) = test_registry();

    assert!(registry.read("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_returns_written_names() {
    let (registry, _storage) = test_registry();

    for name in ["c", "a", "b"] {
        registry
            .write(CertWriteRequest::new(name, client_auth_cert()))
            .await
            .unwrap();
    }

    let mut names = registry.list().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_zero_ttls_always_accepted() {
    let (registry, _storage) = test_registry();

    let outcome = registry
        .write(
            CertWriteRequest::new("web", client_auth_cert())
                .with_ttl(0)
                .with_max_ttl(0),
        )
        .await
        .unwrap();

    assert!(!outcome.has_warnings());
    let entry = registry.read("web").await.unwrap().unwrap();
    assert_eq!(entry.ttl, Duration::ZERO);
    assert_eq!(entry.max_ttl, Duration::ZERO);
}

#[tokio::test]
async fn test_display_name_defaults_to_normalized_name() {
    let (registry, _storage) = test_registry();

    registry
        .write(CertWriteRequest::new("Web-Client", client_auth_cert()))
        .await
        .unwrap();

    let entry = registry.read("web-client").await.unwrap().unwrap();
    assert_eq!(entry.display_name, "web-client");
}

#[tokio::test]
async fn test_explicit_display_name_kept() {
    let (registry, _storage) = test_registry();

    registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_display_name("Web Frontend"))
        .await
        .unwrap();

    let entry = registry.read("web").await.unwrap().unwrap();
    assert_eq!(entry.display_name, "Web Frontend");
}

#[tokio::test]
async fn test_ttl_above_system_default_warns() {
    let (registry, _storage) = test_registry();

    let outcome = registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_ttl(5000))
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    let warning = &outcome.warnings[0];
    assert!(warning.contains("5000"), "{}", warning);
    assert!(warning.contains(&SYSTEM_DEFAULT_TTL.to_string()), "{}", warning);

    // The write still happened
    let entry = registry.read("web").await.unwrap().unwrap();
    assert_eq!(entry.ttl, Duration::from_secs(5000));
}

#[tokio::test]
async fn test_max_ttl_above_system_max_warns() {
    let (registry, _storage) = test_registry();

    let outcome = registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_max_ttl(10_000))
        .await
        .unwrap();

    assert_eq!(
        outcome.warnings,
        vec![format!(
            "Given max_ttl of 10000 seconds is greater than current mount/system default of {} seconds",
            SYSTEM_MAX_TTL
        )]
    );
}

#[tokio::test]
async fn test_both_ceilings_exceeded_warns_twice() {
    let (registry, _storage) = test_registry();

    let outcome = registry
        .write(
            CertWriteRequest::new("web", client_auth_cert())
                .with_ttl(8000)
                .with_max_ttl(9000),
        )
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 2);
    assert!(outcome.warnings[0].starts_with("Given ttl of 8000"));
    assert!(outcome.warnings[1].starts_with("Given max_ttl of 9000"));
}

#[tokio::test]
async fn test_policies_are_canonicalized() {
    let (registry, _storage) = test_registry();

    registry
        .write(
            CertWriteRequest::new("web", client_auth_cert())
                .with_policies(vec!["Ops".to_string(), " dev".to_string(), "ops".to_string()]),
        )
        .await
        .unwrap();

    let entry = registry.read("web").await.unwrap().unwrap();
    assert_eq!(entry.policies, vec!["dev".to_string(), "ops".to_string()]);
}

#[tokio::test]
async fn test_leaf_with_only_ipsec_usage_rejected() {
    let (registry, storage) = test_registry();

    let err = registry
        .write(CertWriteRequest::new("vpn", ipsec_user_cert()))
        .await
        .unwrap_err();

    assert_invalid(err, ERR_MISSING_CLIENT_AUTH);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_leaf_with_only_unrecognized_usage_rejected() {
    let (registry, storage) = test_registry();

    let err = registry
        .write(CertWriteRequest::new("private", private_usage_cert()))
        .await
        .unwrap_err();

    assert_invalid(err, ERR_MISSING_CLIENT_AUTH);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_names_outside_pattern_rejected() {
    let (registry, storage) = test_registry();

    for name in ["Team/Web", ".hidden", "web-", "../escape", "a b"] {
        let err = registry
            .write(CertWriteRequest::new(name, client_auth_cert()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CertAuthError::InvalidArgument(ref msg) if msg.starts_with(ERR_INVALID_NAME)),
            "{}: {:?}",
            name,
            err
        );
    }
    assert!(storage.is_empty());

    let err = registry.read("team/web").await.unwrap_err();
    assert!(err.is_invalid_argument());
    let err = registry.delete("team/web").await.unwrap_err();
    assert!(err.is_invalid_argument());
}

#[tokio::test]
async fn test_dotted_name_listed_on_file_storage() {
    let dir = tempfile::TempDir::new().unwrap();
    let system = StaticSystemView::new(
        Duration::from_secs(SYSTEM_DEFAULT_TTL),
        Duration::from_secs(SYSTEM_MAX_TTL),
    );
    let registry = CertRegistry::new(Arc::new(FileStorage::new(dir.path())), Arc::new(system));

    registry
        .write(CertWriteRequest::new("web.client", client_auth_cert()))
        .await
        .unwrap();

    let err = registry
        .write(CertWriteRequest::new("..", client_auth_cert()))
        .await
        .unwrap_err();
    assert!(matches!(err, CertAuthError::InvalidArgument(_)));

    assert_eq!(registry.list().await.unwrap(), vec!["web.client".to_string()]);
}

#[tokio::test]
async fn test_storage_failures_propagate_unchanged() {
    let (registry, inner) = failing_registry(true, true);

    let err = registry
        .write(CertWriteRequest::new("web", client_auth_cert()))
        .await
        .unwrap_err();
    assert_storage_failure(err);
    assert_storage_failure(registry.read("web").await.unwrap_err());
    assert_storage_failure(registry.list().await.unwrap_err());
    assert_storage_failure(registry.delete("web").await.unwrap_err());

    assert!(inner.is_empty());
}

#[tokio::test]
async fn test_failed_put_leaves_no_entry() {
    let (registry, inner) = failing_registry(false, true);

    let err = registry
        .write(CertWriteRequest::new("web", client_auth_cert()).with_ttl(8000))
        .await
        .unwrap_err();
    assert_storage_failure(err);

    assert!(inner.is_empty());
    assert!(registry.read("web").await.unwrap().is_none());
    assert!(registry.list().await.unwrap().is_empty());
}
