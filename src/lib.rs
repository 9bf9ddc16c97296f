//! Batch TLS certificate auditing.
//!
//! Give [`CertLister`] a list of host entries (`host` or `host:port`) and it
//! returns, per entry and in order, the validity window, serial number and
//! issuer of the certificate the host presents. A host that cannot be
//! reached never stops the batch.
//!
//! ```no_run
//! use certlister::{CertLister, OpenSslFetcher};
//! use std::time::Duration;
//!
//! let lister = CertLister::new(OpenSslFetcher::new(Duration::from_secs(5)));
//! let report = lister.check_all(["google.com", "example.com:443"]);
//! for record in report.records() {
//!     println!("{} expires {}", record.host, record.not_after);
//! }
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod input;
pub mod output;
pub mod record;
pub mod report;

pub use checker::{BatchReport, CertLister, HostOutcome};
pub use error::{CertCheckError, ErrorKind};
pub use fetch::{
    extract_raw_certificate, CertificateSource, NameAttribute, OpenSslFetcher, RawCertificate, Rdn,
};
pub use host::{HostSpec, ParseWarning, DEFAULT_PORT};
pub use output::OutputFormat;
pub use record::{format_issuer, format_serial, CertificateRecord};
pub use report::{LogReporter, Reporter, SilentReporter};
