//! Shared fixtures: generated certificates and a registry over memory storage

#![allow(dead_code)]

use auth_certs::{CertRegistry, InMemoryStorage, StaticSystemView};
use rcgen::{BasicConstraints, CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyPair};
use std::sync::Arc;
use std::time::Duration;

pub const SYSTEM_DEFAULT_TTL: u64 = 3600;
pub const SYSTEM_MAX_TTL: u64 = 7200;

fn generate(is_ca: bool, usages: Vec<ExtendedKeyUsagePurpose>) -> String {
    let mut params = CertificateParams::new(vec!["client.rustcare.test".to_string()]).unwrap();
    if is_ca {
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    }
    params.extended_key_usages = usages;
    let key = KeyPair::generate().unwrap();
    params.self_signed(&key).unwrap().pem()
}

pub fn client_auth_cert() -> String {
    generate(false, vec![ExtendedKeyUsagePurpose::ClientAuth])
}

pub fn server_auth_cert() -> String {
    generate(false, vec![ExtendedKeyUsagePurpose::ServerAuth])
}

pub fn any_usage_cert() -> String {
    generate(false, vec![ExtendedKeyUsagePurpose::Any])
}

pub fn unconstrained_leaf_cert() -> String {
    generate(false, vec![])
}

pub fn ipsec_user_cert() -> String {
    generate(
        false,
        vec![ExtendedKeyUsagePurpose::Other(vec![1, 3, 6, 1, 5, 5, 7, 3, 7])],
    )
}

pub fn private_usage_cert() -> String {
    generate(
        false,
        vec![ExtendedKeyUsagePurpose::Other(vec![1, 3, 6, 1, 4, 1, 99999, 1])],
    )
}

pub fn ca_cert_server_only() -> String {
    generate(true, vec![ExtendedKeyUsagePurpose::ServerAuth])
}

pub fn test_registry() -> (CertRegistry, InMemoryStorage) {
    let storage = InMemoryStorage::new();
    let system = StaticSystemView::new(
        Duration::from_secs(SYSTEM_DEFAULT_TTL),
        Duration::from_secs(SYSTEM_MAX_TTL),
    );
    let registry = CertRegistry::new(Arc::new(storage.clone()), Arc::new(system));
    (registry, storage)
}
