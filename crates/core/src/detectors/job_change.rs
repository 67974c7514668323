//! Job change detection.

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Rule, Verdict};
use crate::signals::{ActivityType, ProfileChange, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "job_change",
    primary: LifeEventType::JobChange,
    alternate: None,
    rules: &RULES,
};

static RULES: [Rule; 3] = [
    Rule {
        explanation: "Employment information updated",
        effect: Effect::Add(0.5),
        window_days: Some(60),
        check: employment_changed,
    },
    Rule {
        explanation: "Significant income change",
        effect: Effect::Add(0.4),
        window_days: Some(60),
        check: income_shifted,
    },
    Rule {
        explanation: "Retirement account changes",
        effect: Effect::Add(0.3),
        window_days: Some(90),
        check: retirement_account_touched,
    },
];

/// Relative income change above which the income check fires.
pub const INCOME_CHANGE_RATIO: f64 = 0.2;

fn employment_changed(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .profile_changes(&["employer", "jobTitle"], window)
            .next()
            .is_some(),
    )
}

fn income_shifted(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .profile_changes(&["annualIncome"], window)
            .any(is_significant_income_change),
    )
}

/// `|new - old| / |old| > 0.2`. Going from zero to any income counts;
/// non-numeric values never do.
fn is_significant_income_change(change: &ProfileChange) -> bool {
    let (Some(old), Some(new)) = (change.old_number(), change.new_number()) else {
        return false;
    };
    if old == 0.0 {
        return new != 0.0;
    }
    ((new - old) / old).abs() > INCOME_CHANGE_RATIO
}

fn retirement_account_touched(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::AssetChange, window)
            .any(|a| a.details.asset_type() == Some("retirement_account")),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::detectors::test_helpers::*;
    use crate::life_event::Urgency;
    use crate::signals::ActivityType::*;

    #[test]
    fn employer_change_alone_is_sub_threshold() {
        let changes = vec![change("employer", "Acme", "Globex", 10)];
        let signals = SignalSet::at(now(), &[], &changes, &[]);
        let candidate = DETECTOR.detect(&signals).unwrap();
        assert!(approx(candidate.confidence, 0.5));
        assert_eq!(candidate.urgency, Urgency::Soon);
    }

    #[test]
    fn employer_and_income_change_combine() {
        let changes = vec![
            change("jobTitle", "Engineer", "Manager", 10),
            change("annualIncome", 100_000, 130_000, 10),
        ];
        let signals = SignalSet::at(now(), &[], &changes, &[]);
        let candidate = DETECTOR.detect(&signals).unwrap();
        assert!(approx(candidate.confidence, 0.9));
        assert_eq!(
            candidate.indicators,
            vec!["Employment information updated", "Significant income change"]
        );
    }

    #[test]
    fn small_income_change_is_ignored() {
        let changes = vec![change("annualIncome", 100_000, 110_000, 10)];
        let signals = SignalSet::at(now(), &[], &changes, &[]);
        assert!(DETECTOR.detect(&signals).is_none());
    }

    #[test]
    fn income_drop_counts() {
        let c = change("annualIncome", 100_000, 50_000, 1);
        assert!(is_significant_income_change(&c));
    }

    #[test]
    fn non_numeric_income_is_absent() {
        let c = change("annualIncome", Value::Null, "lots", 1);
        assert!(!is_significant_income_change(&c));
        let zero = change("annualIncome", 0, 0, 1);
        assert!(!is_significant_income_change(&zero));
        let from_zero = change("annualIncome", 0, 40_000, 1);
        assert!(is_significant_income_change(&from_zero));
    }

    #[test]
    fn retirement_account_activity_in_window() {
        let activities = vec![activity(AssetChange, 85, &[("asset_type", json!("retirement_account"))])];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(approx(DETECTOR.detect(&signals).unwrap().confidence, 0.3));
    }
}
