//! JSON report, the machine-readable form consumed by CI

use super::{Report, ReportError, ReportFormatter};

pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_report;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let out = JsonFormatter.format(&sample_report()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["timestamp"], "2026-01-02T03:04:05Z");
        assert_eq!(json["summary"]["totalIssues"], 3);
        assert_eq!(json["summary"]["criticalIssues"], 1);
        assert_eq!(json["summary"]["fixedIssues"], 2);
        assert_eq!(json["summary"]["byCategory"]["accessibility"], 1);
        assert_eq!(json["summary"]["byCategory"]["theme"], 0);
        assert_eq!(json["issues"]["security"][0]["type"], "unsafe-eval");
        assert_eq!(json["issues"]["security"][0]["severity"], "critical");
        assert_eq!(json["issues"]["performance"][0]["impact"], "high");
        assert_eq!(json["issues"]["i18n"], serde_json::json!([]));
        assert!(json["recommendations"].as_array().unwrap().len() >= 3);
    }

    #[test]
    fn test_json_round_trips_into_report() {
        let report = sample_report();
        let out = JsonFormatter.format(&report).unwrap();
        let back: Report = serde_json::from_str(&out).unwrap();
        assert_eq!(back, report);
    }
}
