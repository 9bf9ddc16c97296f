//! Host entry parsing.
//!
//! A host entry is `host`, `host:port`, `[v6addr]` or `[v6addr]:port`.
//! Parsing never fails: anything that cannot be read as a port falls back
//! to [`DEFAULT_PORT`] and produces a [`ParseWarning`] for the caller to log.

use std::fmt;

/// Port used when an entry has no usable port suffix.
pub const DEFAULT_PORT: u16 = 443;

/// A hostname and the TCP port to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub hostname: String,
    pub port: u16,
}

/// Something in a host entry was ignored or reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// The text after the separator is not a port number in 1..=65535
    InvalidPort { entry: String, port: String },
    /// Several colons without brackets, read as a bare IPv6 address
    AmbiguousColons { entry: String },
    /// A `[` without matching `]`
    UnclosedBracket { entry: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { entry, port } => write!(
                f,
                "invalid port '{}' in '{}', using {}",
                port, entry, DEFAULT_PORT
            ),
            Self::AmbiguousColons { entry } => write!(
                f,
                "'{}' contains several ':' and no brackets, treating it as an IPv6 address on port {} (use [addr]:port to pick a port)",
                entry, DEFAULT_PORT
            ),
            Self::UnclosedBracket { entry } => write!(
                f,
                "'{}' has an unclosed '[', using it as a hostname on port {}",
                entry, DEFAULT_PORT
            ),
        }
    }
}

impl HostSpec {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        HostSpec {
            hostname: hostname.into(),
            port,
        }
    }

    /// Parses a host entry, discarding any warning.
    ///
    /// ```
    /// # use certlister::HostSpec;
    /// assert_eq!(HostSpec::parse("example.com"), HostSpec::new("example.com", 443));
    /// assert_eq!(HostSpec::parse("example.com:8443"), HostSpec::new("example.com", 8443));
    /// assert_eq!(HostSpec::parse("example.com:https"), HostSpec::new("example.com", 443));
    /// ```
    pub fn parse(entry: &str) -> HostSpec {
        Self::parse_with_warning(entry).0
    }

    /// Parses a host entry and reports what, if anything, was ignored.
    pub fn parse_with_warning(entry: &str) -> (HostSpec, Option<ParseWarning>) {
        if let Some(rest) = entry.strip_prefix('[') {
            return match rest.split_once(']') {
                Some((addr, "")) => (HostSpec::new(addr, DEFAULT_PORT), None),
                Some((addr, suffix)) => {
                    let port = suffix.strip_prefix(':').unwrap_or(suffix);
                    with_port(entry, addr, port)
                }
                None => (
                    HostSpec::new(entry, DEFAULT_PORT),
                    Some(ParseWarning::UnclosedBracket {
                        entry: entry.to_string(),
                    }),
                ),
            };
        }

        match entry.split_once(':') {
            None => (HostSpec::new(entry, DEFAULT_PORT), None),
            Some((_, port)) if port.contains(':') => (
                HostSpec::new(entry, DEFAULT_PORT),
                Some(ParseWarning::AmbiguousColons {
                    entry: entry.to_string(),
                }),
            ),
            Some((host, port)) => with_port(entry, host, port),
        }
    }
}

fn with_port(entry: &str, host: &str, port: &str) -> (HostSpec, Option<ParseWarning>) {
    match port.parse::<u16>() {
        Ok(p) if p != 0 => (HostSpec::new(host, p), None),
        _ => (
            HostSpec::new(host, DEFAULT_PORT),
            Some(ParseWarning::InvalidPort {
                entry: entry.to_string(),
                port: port.to_string(),
            }),
        ),
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hostname.contains(':') {
            write!(f, "[{}]:{}", self.hostname, self.port)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}
