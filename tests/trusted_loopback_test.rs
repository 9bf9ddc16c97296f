//! Successful certificate retrieval from a loopback server whose
//! self-signed certificate is made the only trust root via `SSL_CERT_FILE`.
//!
//! Kept in its own test binary because it changes the process environment.

use certlister::{CertLister, CertificateSource, HostSpec, OpenSslFetcher, SilentReporter};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

mod common;

use common::{self_signed, spawn_tls_server};

#[test]
fn test_trusted_server_yields_a_complete_record() {
    let (cert, key) = self_signed();
    let mut trust_file = NamedTempFile::new().unwrap();
    trust_file.write_all(&cert.to_pem().unwrap()).unwrap();
    std::env::set_var("SSL_CERT_FILE", trust_file.path());

    // first connection: plain fetch of the raw fields
    let (port, server) = spawn_tls_server(&cert, &key);
    let fetcher = OpenSslFetcher::new(Duration::from_secs(5));
    let raw = fetcher.fetch(&HostSpec::new("localhost", port)).unwrap();
    assert_eq!(raw.not_before, cert.not_before().to_string());
    assert_eq!(raw.not_after, cert.not_after().to_string());
    assert_eq!(raw.serial, vec![0xAB, 0xCD]);
    // the session was closed after extraction, so the server's read returned
    assert!(server.join().unwrap());

    // second connection: the full pipeline keeps the entry verbatim
    let (port, server) = spawn_tls_server(&cert, &key);
    let entry = format!("localhost:{}", port);
    let lister = CertLister::new(fetcher).with_reporter(SilentReporter);
    let report = lister.check_all([entry.as_str()]);
    assert!(!report.has_failures());

    let record = &report.records()[0];
    assert_eq!(record.host, entry);
    assert!(record.not_before.ends_with(" GMT"));
    assert!(record.not_after.ends_with(" GMT"));
    assert_eq!(record.serial, "ABCD");
    assert_eq!(
        record.issuer,
        "countryName=US, organizationName=Loopback Test, commonName=localhost"
    );
    assert!(record.error.is_none());
    assert!(server.join().unwrap());
}
