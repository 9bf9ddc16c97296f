//! Certificate retrieval over TLS.
//!
//! [`OpenSslFetcher`] connects to a host, performs a verified TLS handshake
//! using the system trust store and hands back the leaf certificate as a
//! [`RawCertificate`]. The [`CertificateSource`] trait lets the batch driver
//! run against anything that can produce certificates.

use crate::error::{is_timeout, CertCheckError};
use crate::host::HostSpec;
use openssl::nid::Nid;
use openssl::ssl::{HandshakeError, SslConnector, SslMethod, SslStream};
use openssl::x509::{X509NameRef, X509Ref, X509VerifyResult};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Default limit for connecting and for the handshake, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One attribute of a distinguished name, e.g. `commonName=Example CA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAttribute {
    pub name: String,
    pub value: String,
}

impl NameAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        NameAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A relative distinguished name: one or more attributes.
pub type Rdn = Vec<NameAttribute>;

/// Certificate fields as read from the TLS layer, before normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCertificate {
    /// Validity start as printed by OpenSSL, e.g. `Aug 11 19:21:22 2025 GMT`
    pub not_before: String,
    /// Validity end, same format as `not_before`
    pub not_after: String,
    /// Serial number magnitude, big-endian, without leading zero bytes
    pub serial: Vec<u8>,
    /// Set for a (non-conforming) negative serial number
    pub serial_negative: bool,
    /// Issuer RDNs in certificate order
    pub issuer: Vec<Rdn>,
}

/// Anything that can produce the peer certificate for a host.
pub trait CertificateSource: Sync {
    fn fetch(&self, spec: &HostSpec) -> Result<RawCertificate, CertCheckError>;
}

impl<T: CertificateSource + ?Sized> CertificateSource for &T {
    fn fetch(&self, spec: &HostSpec) -> Result<RawCertificate, CertCheckError> {
        (**self).fetch(spec)
    }
}

impl<T: CertificateSource + ?Sized> CertificateSource for Box<T> {
    fn fetch(&self, spec: &HostSpec) -> Result<RawCertificate, CertCheckError> {
        (**self).fetch(spec)
    }
}

/// Fetches certificates with OpenSSL's default client configuration.
#[derive(Debug, Clone)]
pub struct OpenSslFetcher {
    timeout: Duration,
}

impl Default for OpenSslFetcher {
    fn default() -> Self {
        OpenSslFetcher::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl OpenSslFetcher {
    /// Creates a fetcher that gives up on connect or handshake after `timeout`.
    ///
    /// The timeout does not cover name resolution, which blocks for as long
    /// as the system resolver takes.
    pub fn new(timeout: Duration) -> Self {
        OpenSslFetcher { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connect(&self, spec: &HostSpec) -> Result<TcpStream, CertCheckError> {
        if self.timeout.is_zero() {
            return Err(CertCheckError::InvalidInput {
                field: "timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let addresses: Vec<SocketAddr> = (spec.hostname.as_str(), spec.port)
            .to_socket_addrs()
            .map_err(|source| CertCheckError::DnsResolution {
                hostname: spec.hostname.clone(),
                source,
            })?
            .collect();
        if addresses.is_empty() {
            return Err(CertCheckError::DnsResolution {
                hostname: spec.hostname.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            });
        }

        let mut last_error = None;
        for address in &addresses {
            match TcpStream::connect_timeout(address, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(e) => {
                    log::debug!("connect to {} failed: {}", address, e);
                    last_error = Some(e);
                }
            }
        }

        // addresses is non-empty, so at least one attempt failed
        let source = last_error.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotConnected));
        if is_timeout(&source) {
            Err(CertCheckError::Timeout {
                operation: format!("connect to {}", spec),
            })
        } else {
            Err(CertCheckError::ConnectionFailed {
                address: spec.to_string(),
                source,
            })
        }
    }

    fn handshake(
        &self,
        spec: &HostSpec,
        tcp_stream: TcpStream,
    ) -> Result<SslStream<TcpStream>, CertCheckError> {
        let connector = SslConnector::builder(SslMethod::tls())?.build();
        connector
            .connect(&spec.hostname, tcp_stream)
            .map_err(|e| handshake_error(spec, e))
    }
}

fn handshake_error(spec: &HostSpec, e: HandshakeError<TcpStream>) -> CertCheckError {
    match e {
        HandshakeError::SetupFailure(stack) => stack.into(),
        HandshakeError::WouldBlock(_) => CertCheckError::Timeout {
            operation: format!("TLS handshake with {}", spec),
        },
        HandshakeError::Failure(mid) => {
            if mid.error().io_error().map_or(false, is_timeout) {
                return CertCheckError::Timeout {
                    operation: format!("TLS handshake with {}", spec),
                };
            }
            let verify = mid.ssl().verify_result();
            let details = if verify == X509VerifyResult::OK {
                mid.error().to_string()
            } else {
                format!("{} ({})", mid.error(), verify.error_string())
            };
            CertCheckError::HandshakeFailed { details }
        }
    }
}

impl CertificateSource for OpenSslFetcher {
    fn fetch(&self, spec: &HostSpec) -> Result<RawCertificate, CertCheckError> {
        let tcp_stream = self.connect(spec)?;
        let mut stream = self.handshake(spec, tcp_stream)?;
        log::debug!(
            "connected to {} using {}",
            spec,
            stream.ssl().version_str()
        );

        let certificate = stream
            .ssl()
            .peer_certificate()
            .ok_or_else(|| CertCheckError::CertificateError {
                reason: format!("{} presented no certificate", spec),
            })
            .and_then(|x509| extract_raw_certificate(&x509));

        // close_notify is best effort; the socket is dropped either way
        if let Err(e) = stream.shutdown() {
            log::debug!("TLS shutdown with {} failed: {}", spec, e);
        }
        certificate
    }
}

/// Reads the fields of interest out of a parsed certificate.
pub fn extract_raw_certificate(cert: &X509Ref) -> Result<RawCertificate, CertCheckError> {
    let serial = cert.serial_number().to_bn()?;
    Ok(RawCertificate {
        not_before: cert.not_before().to_string(),
        not_after: cert.not_after().to_string(),
        serial: serial.to_vec(),
        serial_negative: serial.is_negative(),
        issuer: name_to_rdns(cert.issuer_name()),
    })
}

// openssl does not expose the multi-valued RDN set index, so each entry
// becomes its own group.
fn name_to_rdns(name: &X509NameRef) -> Vec<Rdn> {
    name.entries()
        .map(|entry| {
            let object = entry.object();
            let nid = object.nid();
            // unknown attributes come back as Nid::UNDEF named "undefined"
            let attr_name = match nid.long_name() {
                Ok(name) if nid != Nid::UNDEF => name.to_string(),
                _ => object.to_string(),
            };
            let value = entry
                .data()
                .as_utf8()
                .map(|s| s.to_string())
                .unwrap_or_else(|_| String::from_utf8_lossy(entry.data().as_slice()).into_owned());
            vec![NameAttribute::new(attr_name, value)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::asn1::{Asn1Integer, Asn1Time};
    use openssl::bn::BigNum;
    use openssl::hash::MessageDigest;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509Name, X509};

    fn build_cert(serial_hex: &str) -> X509 {
        build_cert_with_issuer(
            serial_hex,
            &[("C", "US"), ("O", "Example Org"), ("CN", "Example CA")],
        )
    }

    fn build_cert_with_issuer(serial_hex: &str, entries: &[(&str, &str)]) -> X509 {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut issuer = X509Name::builder().unwrap();
        for (field, value) in entries {
            issuer.append_entry_by_text(field, value).unwrap();
        }
        let issuer = issuer.build();

        let serial = Asn1Integer::from_bn(&BigNum::from_hex_str(serial_hex).unwrap()).unwrap();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&issuer).unwrap();
        builder.set_issuer_name(&issuer).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::from_str("20250811192122Z").unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::from_str("20251109192121Z").unwrap())
            .unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();
        builder.build()
    }

    #[test]
    fn test_extract_dates_serial_and_issuer() {
        let cert = build_cert("0A1B2C3D4E5F");
        let raw = extract_raw_certificate(&cert).unwrap();

        assert_eq!(raw.not_before, "Aug 11 19:21:22 2025 GMT");
        assert_eq!(raw.not_after, "Nov  9 19:21:21 2025 GMT");
        assert_eq!(raw.serial, vec![0x0A, 0x1B, 0x2C, 0x3D, 0x4E, 0x5F]);
        assert!(!raw.serial_negative);
        assert_eq!(
            raw.issuer,
            vec![
                vec![NameAttribute::new("countryName", "US")],
                vec![NameAttribute::new("organizationName", "Example Org")],
                vec![NameAttribute::new("commonName", "Example CA")],
            ]
        );
    }

    #[test]
    fn test_unknown_issuer_attribute_keeps_its_oid() {
        let cert = build_cert_with_issuer(
            "01",
            &[
                ("C", "US"),
                ("1.2.3.4.5", "Custom"),
                ("1.2.3.4.6", "Other"),
                ("CN", "Example CA"),
            ],
        );
        let raw = extract_raw_certificate(&cert).unwrap();

        assert_eq!(
            crate::record::format_issuer(&raw.issuer),
            "countryName=US, 1.2.3.4.5=Custom, 1.2.3.4.6=Other, commonName=Example CA"
        );
    }

    #[test]
    fn test_negative_serial_keeps_its_sign() {
        let cert = build_cert("-01");
        let raw = extract_raw_certificate(&cert).unwrap();

        assert_eq!(raw.serial, vec![0x01]);
        assert!(raw.serial_negative);
        assert_eq!(crate::record::CertificateRecord::build("neg.example", &raw).serial, "-01");
    }

    #[test]
    fn test_zero_timeout_is_rejected_before_connecting() {
        let fetcher = OpenSslFetcher::new(Duration::ZERO);
        let err = fetcher.fetch(&HostSpec::new("localhost", 443)).unwrap_err();
        assert!(matches!(err, CertCheckError::InvalidInput { .. }));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(
            OpenSslFetcher::default().timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }
}
