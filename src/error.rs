//! Error types for certificate retrieval.
//!
//! Every failure that can happen while turning a host entry into a
//! certificate record is expressed as a [`CertCheckError`]. Errors are
//! grouped into a small taxonomy through [`ErrorKind`] so that callers can
//! tell transport problems apart from TLS problems and timeouts.

use std::fmt;
use std::io;

/// Coarse classification of a [`CertCheckError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// Name resolution failed or the TCP connection could not be established
    Connection,
    /// TLS negotiation or certificate trust failed
    Handshake,
    /// Connect or handshake did not finish within the configured timeout
    Timeout,
    /// The peer certificate was missing or could not be read
    Certificate,
    /// The caller supplied something unusable
    Input,
    /// Anything else
    Other,
}

/// Error type for certificate retrieval failures.
///
/// Returned by a certificate source for a single host. The batch driver
/// catches it per host, so one failing host never stops a run.
#[derive(Debug)]
pub enum CertCheckError {
    /// DNS resolution failed for the given hostname
    DnsResolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TCP connection failed to the target address
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TLS handshake failed
    HandshakeFailed {
        /// Details about why the handshake failed
        details: String,
    },

    /// Certificate missing or unreadable
    CertificateError {
        /// Description of what went wrong
        reason: String,
    },

    /// Network operation timeout
    Timeout {
        /// Description of which operation timed out
        operation: String,
    },

    /// Invalid input provided to the API
    InvalidInput {
        /// Which field/parameter was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },

    /// OpenSSL error occurred outside of the handshake itself
    OpenSSLError {
        /// The underlying OpenSSL error
        details: String,
    },

    /// Generic I/O error
    IoError {
        /// The underlying I/O error
        source: io::Error,
    },
}

impl CertCheckError {
    /// Maps the error onto the connection/handshake/timeout taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DnsResolution { .. } | Self::ConnectionFailed { .. } => ErrorKind::Connection,
            Self::HandshakeFailed { .. } | Self::OpenSSLError { .. } => ErrorKind::Handshake,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::CertificateError { .. } => ErrorKind::Certificate,
            Self::InvalidInput { .. } => ErrorKind::Input,
            Self::IoError { source } if is_timeout(source) => ErrorKind::Timeout,
            Self::IoError { .. } => ErrorKind::Other,
        }
    }
}

/// True for the I/O error kinds a socket timeout produces.
///
/// Blocking sockets with a read timeout report `WouldBlock` on Unix and
/// `TimedOut` on Windows.
pub(crate) fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

impl fmt::Display for CertCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsResolution { hostname, .. } => {
                write!(
                    f,
                    "Failed to resolve hostname: {}. Check that the hostname is spelled correctly and your DNS configuration is working.",
                    hostname
                )
            }
            Self::ConnectionFailed { address, source } => {
                write!(f, "Connection failed to: {} ({})", address, source)
            }
            Self::HandshakeFailed { details } => {
                write!(f, "TLS handshake failed: {}", details)
            }
            Self::CertificateError { reason } => {
                write!(f, "Certificate error: {}", reason)
            }
            Self::Timeout { operation } => {
                write!(f, "Operation timed out: {}", operation)
            }
            Self::InvalidInput { field, reason } => {
                write!(f, "Invalid input for '{}': {}", field, reason)
            }
            Self::OpenSSLError { details } => {
                write!(f, "OpenSSL error: {}", details)
            }
            Self::IoError { source } => {
                write!(f, "I/O error: {}", source)
            }
        }
    }
}

impl std::error::Error for CertCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DnsResolution { source, .. } => Some(source),
            Self::ConnectionFailed { source, .. } => Some(source),
            Self::IoError { source } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for CertCheckError {
    fn from(e: io::Error) -> Self {
        Self::IoError { source: e }
    }
}

impl From<openssl::error::ErrorStack> for CertCheckError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSLError {
            details: e.to_string(),
        }
    }
}
