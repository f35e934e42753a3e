//! PEM certificate decoding for trust entries
//!
//! Turns the PEM text an administrator registers into the handful of X.509
//! properties the registry validates:
//! - Basic constraints CA flag
//! - Extended key usages, split into recognized purposes and unknown OIDs
//! - Subject DN (for log context)

use serde::{Deserialize, Serialize};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::ExtendedKeyUsage;
use x509_parser::pem::Pem;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const TRUSTED_CERTIFICATE_LABEL: &str = "TRUSTED CERTIFICATE";

/// Recognized extended key usage purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyUsagePurpose {
    Any,
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    IpsecEndSystem,
    IpsecTunnel,
    IpsecUser,
    MicrosoftServerGatedCrypto,
    NetscapeServerGatedCrypto,
    MicrosoftCommercialCodeSigning,
    MicrosoftKernelCodeSigning,
}

impl KeyUsagePurpose {
    /// Map an EKU OID outside the x509-parser flag set to a known purpose
    pub fn from_oid(oid: &str) -> Option<Self> {
        let purpose = match oid {
            "1.3.6.1.5.5.7.3.5" => KeyUsagePurpose::IpsecEndSystem,
            "1.3.6.1.5.5.7.3.6" => KeyUsagePurpose::IpsecTunnel,
            "1.3.6.1.5.5.7.3.7" => KeyUsagePurpose::IpsecUser,
            "1.3.6.1.4.1.311.10.3.3" => KeyUsagePurpose::MicrosoftServerGatedCrypto,
            "2.16.840.1.113730.4.1" => KeyUsagePurpose::NetscapeServerGatedCrypto,
            "1.3.6.1.4.1.311.2.1.22" => KeyUsagePurpose::MicrosoftCommercialCodeSigning,
            "1.3.6.1.4.1.311.61.1.1" => KeyUsagePurpose::MicrosoftKernelCodeSigning,
            _ => return None,
        };
        Some(purpose)
    }

    /// Whether a certificate carrying this purpose may authenticate a TLS client.
    pub fn permits_client_auth(self) -> bool {
        matches!(self, KeyUsagePurpose::ClientAuth | KeyUsagePurpose::Any)
    }
}

/// Certificate properties extracted from one PEM block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    /// Subject distinguished name
    pub subject: String,
    /// Basic constraints `cA` flag
    pub is_ca: bool,
    /// Recognized extended key usages: x509-parser flags first, then
    /// purposes mapped from their OID
    pub extended_key_usages: Vec<KeyUsagePurpose>,
    /// Extended key usage OIDs with no [`KeyUsagePurpose`] mapping
    pub unknown_extended_key_usages: Vec<String>,
}

impl ParsedCertificate {
    fn from_x509(cert: &X509Certificate<'_>) -> Option<Self> {
        let is_ca = cert
            .basic_constraints()
            .ok()?
            .map(|ext| ext.value.ca)
            .unwrap_or(false);

        let (extended_key_usages, unknown_extended_key_usages) = match cert.extended_key_usage().ok()? {
            Some(ext) => split_key_usages(ext.value),
            None => (Vec::new(), Vec::new()),
        };

        Some(Self {
            subject: cert.subject().to_string(),
            is_ca,
            extended_key_usages,
            unknown_extended_key_usages,
        })
    }

    /// Whether the certificate declares any extended key usage, recognized
    /// or not
    pub fn declares_key_usages(&self) -> bool {
        !self.extended_key_usages.is_empty() || !self.unknown_extended_key_usages.is_empty()
    }

    /// Non-CA certificates that declare extended key usages must allow client
    /// authentication. CA certificates and certificates without any EKU entry
    /// are unconstrained.
    pub fn allows_client_auth(&self) -> bool {
        self.is_ca
            || !self.declares_key_usages()
            || self
                .extended_key_usages
                .iter()
                .any(|usage| usage.permits_client_auth())
    }
}

fn split_key_usages(eku: &ExtendedKeyUsage<'_>) -> (Vec<KeyUsagePurpose>, Vec<String>) {
    let flags = [
        (eku.any, KeyUsagePurpose::Any),
        (eku.server_auth, KeyUsagePurpose::ServerAuth),
        (eku.client_auth, KeyUsagePurpose::ClientAuth),
        (eku.code_signing, KeyUsagePurpose::CodeSigning),
        (eku.email_protection, KeyUsagePurpose::EmailProtection),
        (eku.time_stamping, KeyUsagePurpose::TimeStamping),
        (eku.ocsp_signing, KeyUsagePurpose::OcspSigning),
    ];

    let mut known: Vec<KeyUsagePurpose> = flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, purpose)| *purpose)
        .collect();
    let mut unknown = Vec::new();

    for oid in eku.other.iter().map(|oid| oid.to_id_string()) {
        match KeyUsagePurpose::from_oid(&oid) {
            Some(purpose) => known.push(purpose),
            None => unknown.push(oid),
        }
    }

    (known, unknown)
}

/// Decode every certificate in a PEM blob, preserving input order.
///
/// Decoding stops at the first malformed PEM block. Blocks with a label other
/// than `CERTIFICATE`/`TRUSTED CERTIFICATE`, and blocks whose body is not a
/// valid X.509 certificate, are skipped. Input without any certificate yields
/// an empty vector.
pub fn parse_pem(raw: &[u8]) -> Vec<ParsedCertificate> {
    let mut certs = Vec::new();

    for block in Pem::iter_from_buffer(raw) {
        let pem = match block {
            Ok(pem) => pem,
            Err(e) => {
                tracing::debug!("Stopping PEM decode at malformed block: {}", e);
                break;
            }
        };

        if pem.label != CERTIFICATE_LABEL && pem.label != TRUSTED_CERTIFICATE_LABEL {
            tracing::debug!(label = %pem.label, "Skipping non-certificate PEM block");
            continue;
        }

        match x509_parser::parse_x509_certificate(&pem.contents) {
            Ok((_rem, cert)) => {
                if let Some(parsed) = ParsedCertificate::from_x509(&cert) {
                    certs.push(parsed);
                }
            }
            Err(e) => {
                tracing::debug!("Skipping unparseable certificate block: {}", e);
            }
        }
    }

    certs
}
