//! Certificate records as exported to JSON and CSV.
//!
//! [`CertificateRecord::build`] turns the raw fields of a fetched
//! certificate into strings: dates are kept as printed by OpenSSL, the
//! serial becomes uppercase hex and the issuer a flat `name=value` list.

use crate::error::CertCheckError;
use crate::fetch::{RawCertificate, Rdn};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The exported, per-host result.
///
/// `host` is always the caller's entry exactly as given, port suffix
/// included. Failed hosts produce a record with empty certificate fields
/// and `error` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub host: String,
    #[serde(rename = "notBefore")]
    pub not_before: String,
    #[serde(rename = "notAfter")]
    pub not_after: String,
    pub serial: String,
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CertificateRecord {
    /// Normalises a fetched certificate into a record for `entry`.
    pub fn build(entry: &str, raw: &RawCertificate) -> CertificateRecord {
        CertificateRecord {
            host: entry.to_string(),
            not_before: raw.not_before.clone(),
            not_after: raw.not_after.clone(),
            serial: if raw.serial_negative {
                format!("-{}", format_serial(&raw.serial))
            } else {
                format_serial(&raw.serial)
            },
            issuer: format_issuer(&raw.issuer),
            error: None,
        }
    }

    /// An error-flagged record for an entry that could not be checked.
    pub fn failed(entry: &str, err: &CertCheckError) -> CertificateRecord {
        CertificateRecord {
            host: entry.to_string(),
            not_before: String::new(),
            not_after: String::new(),
            serial: String::new(),
            issuer: String::new(),
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Joins every issuer attribute as `name=value`, separated by `", "`.
///
/// RDN boundaries are not marked; a multi-valued RDN contributes all of its
/// attributes in order.
///
/// ```
/// # use certlister::{format_issuer, NameAttribute};
/// let issuer = vec![
///     vec![NameAttribute::new("countryName", "US")],
///     vec![NameAttribute::new("commonName", "Example CA")],
/// ];
/// assert_eq!(format_issuer(&issuer), "countryName=US, commonName=Example CA");
/// ```
pub fn format_issuer(issuer: &[Rdn]) -> String {
    issuer
        .iter()
        .flatten()
        .map(|attr| format!("{}={}", attr.name, attr.value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Uppercase hex of a serial number's magnitude, two digits per byte, no
/// separators. Zero is `"00"`. The sign is added by the caller.
pub fn format_serial(serial: &[u8]) -> String {
    if serial.is_empty() {
        return "00".to_string();
    }
    serial.iter().fold(String::with_capacity(serial.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02X}", b);
        s
    })
}
