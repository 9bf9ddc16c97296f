//! Progress reporting for the batch driver.
//!
//! The driver never writes to the console itself. It calls a [`Reporter`]
//! that the caller injects, which keeps the library free of global output
//! state and lets tests observe what happened.

use crate::error::CertCheckError;
use crate::host::ParseWarning;
use crate::record::CertificateRecord;

/// Receives per-host events from [`CertLister`](crate::CertLister).
pub trait Reporter: Send + Sync {
    /// A host entry was read leniently.
    fn parse_warning(&self, warning: &ParseWarning);

    /// A certificate was retrieved.
    fn host_checked(&self, record: &CertificateRecord);

    /// A host could not be checked; the batch continues.
    fn host_failed(&self, entry: &str, err: &CertCheckError);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn parse_warning(&self, warning: &ParseWarning) {
        log::warn!("{}", warning);
    }

    fn host_checked(&self, record: &CertificateRecord) {
        log::info!(
            "{}: valid until {} (issuer: {})",
            record.host,
            record.not_after,
            record.issuer
        );
    }

    fn host_failed(&self, entry: &str, err: &CertCheckError) {
        log::error!("Fail to check host: {} [{}] {}", entry, err.kind(), err);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn parse_warning(&self, _warning: &ParseWarning) {}

    fn host_checked(&self, _record: &CertificateRecord) {}

    fn host_failed(&self, _entry: &str, _err: &CertCheckError) {}
}
