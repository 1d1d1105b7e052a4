//! Report formatting and delivery
//!
//! The run's result is rendered once into a plain text block and handed to
//! every enabled [`Reporter`]. Delivery failures are logged and otherwise
//! ignored.

use async_trait::async_trait;
use tracing::{error, info};

use crate::engine::ScanResult;
use crate::index::ReverseIndexBuilder;
use crate::traits::Reporter;

/// Render the report text
///
/// Empty when there are no offenders and the reverse index is not requested.
pub fn format_report(result: &ScanResult, min_ttl: u32, include_reverse_index: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !result.offending_records.is_empty() {
        lines.push(format!("Those records have TTLs lower than {}", min_ttl));
        for record in &result.offending_records {
            lines.push(format!("{} (ttl {})", record.fqdn, record.ttl));
        }
    }

    if include_reverse_index {
        push_index(&mut lines, "CNAMES", &result.reverse_index.aliases);
        push_index(&mut lines, "ARECORDS", &result.reverse_index.addresses);
    }

    lines.join("\n")
}

fn push_index(lines: &mut Vec<String>, title: &str, index: &ReverseIndexBuilder) {
    lines.push(title.to_string());
    for (target, zones) in index.snapshot() {
        lines.push(format!("\n{}", target));
        for zone in zones {
            lines.push(format!("\t{}", zone));
        }
    }
}

/// Deliver `text` to every reporter, logging failures
///
/// Returns the number of successful deliveries. Nothing is sent for an
/// empty report.
pub async fn deliver_all(reporters: &[Box<dyn Reporter>], text: &str) -> usize {
    if text.is_empty() {
        info!("Nothing to report");
        return 0;
    }

    let mut delivered = 0;
    for reporter in reporters {
        info!("Sending report to {}", reporter.name());
        match reporter.deliver(text).await {
            Ok(()) => delivered += 1,
            Err(e) => error!("Failed to deliver report to {}: {}", reporter.name(), e),
        }
    }
    delivered
}

/// Prints the report to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn deliver(&self, text: &str) -> Result<(), crate::Error> {
        println!("{}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OffendingRecord;
    use crate::policy::RecordKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn result_with_offender() -> ScanResult {
        let mut result = ScanResult::default();
        result.offending_records.push(OffendingRecord {
            zone: "example.com".to_string(),
            fqdn: "www.example.com".to_string(),
            ttl: 60,
            target: "10.0.0.5".to_string(),
            kind: RecordKind::Address,
        });
        result
            .reverse_index
            .addresses
            .record("10.0.0.5", "example.com");
        result
            .reverse_index
            .aliases
            .record("cdn.example.net", "example.com");
        result
            .reverse_index
            .aliases
            .record("cdn.example.net", "example.org");
        result
    }

    #[test]
    fn test_offenders_only() {
        let text = format_report(&result_with_offender(), 300, false);
        assert_eq!(
            text,
            "Those records have TTLs lower than 300\nwww.example.com (ttl 60)"
        );
    }

    #[test]
    fn test_with_reverse_index() {
        let text = format_report(&result_with_offender(), 300, true);
        let expected = "Those records have TTLs lower than 300\n\
                        www.example.com (ttl 60)\n\
                        CNAMES\n\
                        \ncdn.example.net\n\
                        \texample.com\n\
                        \texample.org\n\
                        ARECORDS\n\
                        \n10.0.0.5\n\
                        \texample.com";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_clean_run_is_empty() {
        assert!(format_report(&ScanResult::default(), 300, false).is_empty());
    }

    struct CountingReporter {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Reporter for CountingReporter {
        async fn deliver(&self, _text: &str) -> Result<(), crate::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(crate::Error::report("channel down"))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_delivery_failures_do_not_stop_other_reporters() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reporters: Vec<Box<dyn Reporter>> = vec![
            Box::new(CountingReporter {
                calls: Arc::clone(&calls),
                fail: true,
            }),
            Box::new(CountingReporter {
                calls: Arc::clone(&calls),
                fail: false,
            }),
        ];

        assert_eq!(deliver_all(&reporters, "report").await, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Empty reports are not sent
        assert_eq!(deliver_all(&reporters, "").await, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
