//! Major purchase detection.

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Rule, Verdict};
use crate::signals::{Action, ActivityType, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "major_purchase",
    primary: LifeEventType::MajorPurchase,
    alternate: None,
    rules: &RULES,
};

static RULES: [Rule; 2] = [
    Rule {
        explanation: "Major asset added",
        effect: Effect::Add(0.7),
        window_days: Some(90),
        check: major_asset_added,
    },
    Rule {
        explanation: "Loan documentation uploaded",
        effect: Effect::Add(0.4),
        window_days: Some(60),
        check: loan_documents,
    },
];

/// Asset values strictly above this amount count as a major purchase.
pub const MAJOR_ASSET_VALUE: f64 = 50_000.0;

fn major_asset_added(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::AssetChange, window)
            .filter(|a| a.details.action() == Some(Action::Add))
            .any(|a| {
                a.details.value().is_some_and(|v| v > MAJOR_ASSET_VALUE)
                    || a.details.asset_type() == Some("real_estate")
            }),
    )
}

fn loan_documents(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::DocumentUpload, window)
            .any(|a| matches!(a.details.document_type(), Some("mortgage" | "loan"))),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::detectors::test_helpers::*;
    use crate::life_event::Urgency;
    use crate::signals::ActivityType::*;

    #[test]
    fn expensive_asset_alone_crosses_threshold() {
        let activities = vec![activity(
            AssetChange,
            30,
            &[("action", json!("add")), ("asset_type", json!("vehicle")), ("value", json!(65_000))],
        )];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        let candidate = DETECTOR.detect(&signals).unwrap();
        assert!(approx(candidate.confidence, 0.7));
        assert_eq!(candidate.urgency, Urgency::WhenConvenient);
    }

    #[test]
    fn value_at_limit_is_not_major() {
        let activities = vec![activity(
            AssetChange,
            30,
            &[("action", json!("add")), ("value", json!(50_000))],
        )];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(DETECTOR.detect(&signals).is_none());
    }

    #[test]
    fn real_estate_add_counts_without_value() {
        let activities = vec![
            activity(AssetChange, 30, &[("action", json!("add")), ("asset_type", json!("real_estate"))]),
            activity(DocumentUpload, 20, &[("document_type", json!("mortgage"))]),
        ];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        let candidate = DETECTOR.detect(&signals).unwrap();
        assert_eq!(candidate.confidence, 1.0);
        assert_eq!(candidate.indicators, vec!["Major asset added", "Loan documentation uploaded"]);
    }

    #[test]
    fn removed_asset_is_not_a_purchase() {
        let activities = vec![activity(
            AssetChange,
            30,
            &[("action", json!("remove")), ("value", json!(900_000))],
        )];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(DETECTOR.detect(&signals).is_none());
    }

    #[test]
    fn loan_document_alone_is_weak() {
        let activities = vec![activity(DocumentUpload, 5, &[("document_type", json!("loan"))])];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(approx(DETECTOR.detect(&signals).unwrap().confidence, 0.4));
    }
}
