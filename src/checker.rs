//! Per-host driver.
//!
//! [`CertLister`] runs parse → fetch → build for each host entry and keeps
//! going when a host fails. Results always come back in input order, also
//! when hosts are checked on several threads.

use crate::error::CertCheckError;
use crate::fetch::{CertificateSource, OpenSslFetcher};
use crate::host::HostSpec;
use crate::record::CertificateRecord;
use crate::report::{LogReporter, Reporter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// What happened to one host entry.
#[derive(Debug)]
pub struct HostOutcome {
    /// The entry as given by the caller
    pub entry: String,
    pub result: Result<CertificateRecord, CertCheckError>,
}

impl HostOutcome {
    /// The record for this entry, error-flagged when the check failed.
    pub fn to_record(&self) -> CertificateRecord {
        match &self.result {
            Ok(record) => record.clone(),
            Err(err) => CertificateRecord::failed(&self.entry, err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<HostOutcome>,
}

impl BatchReport {
    /// One record per entry; failures are error-flagged.
    pub fn records(&self) -> Vec<CertificateRecord> {
        self.outcomes.iter().map(HostOutcome::to_record).collect()
    }

    /// Records of the hosts that were checked successfully.
    pub fn successes(&self) -> Vec<&CertificateRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .collect()
    }

    /// Entries that failed, with their errors.
    pub fn failures(&self) -> Vec<(&str, &CertCheckError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.entry.as_str(), e)))
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Checks the certificates of a list of hosts.
pub struct CertLister<S = OpenSslFetcher> {
    source: S,
    reporter: Box<dyn Reporter>,
}

impl<S: CertificateSource> CertLister<S> {
    /// Creates a lister that logs through the `log` facade.
    pub fn new(source: S) -> Self {
        CertLister {
            source,
            reporter: Box::new(LogReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Runs the whole pipeline for one entry.
    pub fn check(&self, entry: &str) -> Result<CertificateRecord, CertCheckError> {
        let (spec, warning) = HostSpec::parse_with_warning(entry);
        if let Some(warning) = warning {
            self.reporter.parse_warning(&warning);
        }
        let raw = self.source.fetch(&spec)?;
        Ok(CertificateRecord::build(entry, &raw))
    }

    fn outcome(&self, entry: &str) -> HostOutcome {
        let result = self.check(entry);
        match &result {
            Ok(record) => self.reporter.host_checked(record),
            Err(err) => self.reporter.host_failed(entry, err),
        }
        HostOutcome {
            entry: entry.to_string(),
            result,
        }
    }

    /// Checks every entry, one after the other.
    pub fn check_all<I, T>(&self, entries: I) -> BatchReport
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        BatchReport {
            outcomes: entries
                .into_iter()
                .map(|entry| self.outcome(entry.as_ref()))
                .collect(),
        }
    }

    /// Checks entries on up to `workers` threads.
    ///
    /// The report lists outcomes in the same order as `entries`.
    pub fn check_all_parallel<T: AsRef<str> + Sync>(
        &self,
        entries: &[T],
        workers: usize,
    ) -> BatchReport {
        let workers = workers.min(entries.len());
        if workers <= 1 {
            return self.check_all(entries);
        }

        let next = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel::<(usize, HostOutcome)>();
        thread::scope(|scope| {
            for _ in 0..workers {
                let thread_tx = sender.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(entry) = entries.get(index) else {
                        break;
                    };
                    if thread_tx.send((index, self.outcome(entry.as_ref()))).is_err() {
                        break;
                    }
                });
            }
        });
        drop(sender);

        let mut indexed: Vec<(usize, HostOutcome)> = receiver.into_iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        BatchReport {
            outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{NameAttribute, RawCertificate};
    use crate::report::SilentReporter;
    use std::io;

    struct Scripted;

    impl CertificateSource for Scripted {
        fn fetch(&self, spec: &HostSpec) -> Result<RawCertificate, CertCheckError> {
            if spec.hostname.starts_with("down") {
                return Err(CertCheckError::ConnectionFailed {
                    address: spec.to_string(),
                    source: io::Error::from(io::ErrorKind::ConnectionRefused),
                });
            }
            Ok(RawCertificate {
                not_before: "Aug 11 19:21:22 2025 GMT".to_string(),
                not_after: "Nov  9 19:21:21 2025 GMT".to_string(),
                serial: vec![spec.port as u8],
                serial_negative: false,
                issuer: vec![vec![NameAttribute::new("commonName", spec.hostname.as_str())]],
            })
        }
    }

    #[test]
    fn test_check_passes_parsed_host_and_keeps_entry() {
        let lister = CertLister::new(Scripted).with_reporter(SilentReporter);
        let record = lister.check("example.com:8").unwrap();
        assert_eq!(record.host, "example.com:8");
        assert_eq!(record.issuer, "commonName=example.com");
        assert_eq!(record.serial, "08");
    }

    #[test]
    fn test_failure_in_the_middle_does_not_stop_the_batch() {
        let lister = CertLister::new(Scripted).with_reporter(SilentReporter);
        let report = lister.check_all(["a.example", "down.example", "c.example"]);

        assert_eq!(report.len(), 3);
        assert!(report.has_failures());
        assert_eq!(report.successes().len(), 2);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "down.example");

        let hosts: Vec<String> = report.records().into_iter().map(|r| r.host).collect();
        assert_eq!(hosts, vec!["a.example", "down.example", "c.example"]);
        assert!(report.records()[1].is_error());
    }

    #[test]
    fn test_parallel_keeps_input_order() {
        let lister = CertLister::new(Scripted).with_reporter(SilentReporter);
        let entries: Vec<String> = (0..40)
            .map(|i| {
                if i % 7 == 3 {
                    format!("down{}.example", i)
                } else {
                    format!("host{}.example", i)
                }
            })
            .collect();

        let report = lister.check_all_parallel(&entries, 8);
        let hosts: Vec<String> = report.records().into_iter().map(|r| r.host).collect();
        assert_eq!(hosts, entries);
        assert_eq!(report.failures().len(), 6);
    }

    #[derive(Default)]
    struct Recording {
        events: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Reporter for Recording {
        fn parse_warning(&self, warning: &crate::host::ParseWarning) {
            self.events.lock().unwrap().push(format!("warn {}", warning));
        }

        fn host_checked(&self, record: &CertificateRecord) {
            self.events.lock().unwrap().push(format!("ok {}", record.host));
        }

        fn host_failed(&self, entry: &str, err: &CertCheckError) {
            self.events
                .lock()
                .unwrap()
                .push(format!("fail {} {}", entry, err.kind()));
        }
    }

    #[test]
    fn test_reporter_sees_every_event() {
        let reporter = Recording::default();
        let events = reporter.events.clone();
        let lister = CertLister::new(Scripted).with_reporter(reporter);

        lister.check_all(["a.example:x", "down.example"]);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "warn invalid port 'x' in 'a.example:x', using 443".to_string(),
                "ok a.example:x".to_string(),
                "fail down.example connection".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_batch() {
        let lister = CertLister::new(Scripted).with_reporter(SilentReporter);
        let entries: Vec<String> = Vec::new();
        assert!(lister.check_all_parallel(&entries, 4).is_empty());
        assert!(!lister.check_all(entries).has_failures());
    }
}
