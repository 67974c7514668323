//! Death in the family detection.
//!
//! A death certificate settles the question on its own: it sets the
//! confidence to 1.0 regardless of anything else observed.

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Rule, Verdict};
use crate::signals::{Action, ActivityType, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "death",
    primary: LifeEventType::Death,
    alternate: None,
    rules: &RULES,
};

static RULES: [Rule; 3] = [
    Rule {
        explanation: "Family member marked as deceased",
        effect: Effect::Add(0.8),
        window_days: Some(30),
        check: family_member_deceased,
    },
    Rule {
        explanation: "Beneficiary removed",
        effect: Effect::Add(0.3),
        window_days: Some(30),
        check: beneficiary_removed,
    },
    Rule {
        explanation: "Death certificate detected",
        effect: Effect::Set(1.0),
        window_days: None,
        check: death_certificate,
    },
];

fn family_member_deceased(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::GuardianUpdate, window)
            .any(|a| a.details.action() == Some(Action::Remove) && a.details.reason() == Some("deceased")),
    )
}

fn beneficiary_removed(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::BeneficiaryUpdate, window)
            .any(|a| a.details.action() == Some(Action::Remove)),
    )
}

fn death_certificate(signals: &SignalSet<'_>, _window: Option<u32>) -> Verdict {
    Verdict::from_bool(signals.indicators(&["death_certificate"]).next().is_some())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::detectors::test_helpers::*;
    use crate::signals::ActivityType::*;

    #[test]
    fn death_certificate_alone_is_certain() {
        let indicators = vec![indicator("death_certificate")];
        let signals = SignalSet::at(now(), &[], &[], &indicators);
        let candidate = DETECTOR.detect(&signals).unwrap();
        assert_eq!(candidate.confidence, 1.0);
        assert_eq!(candidate.indicators, vec!["Death certificate detected"]);
    }

    #[test]
    fn certificate_with_other_signals_is_exactly_one() {
        let activities = vec![
            activity(GuardianUpdate, 3, &[("action", json!("remove")), ("reason", json!("deceased"))]),
            activity(BeneficiaryUpdate, 3, &[("action", json!("remove"))]),
        ];
        let indicators = vec![indicator("death_certificate")];
        let signals = SignalSet::at(now(), &activities, &[], &indicators);
        let candidate = DETECTOR.detect(&signals).unwrap();
        assert_eq!(candidate.confidence, 1.0);
        assert_eq!(candidate.indicators.len(), 3);
    }

    #[test]
    fn deceased_marking_and_beneficiary_removal_cap_at_one() {
        let activities = vec![
            activity(GuardianUpdate, 3, &[("action", json!("remove")), ("reason", json!("deceased"))]),
            activity(BeneficiaryUpdate, 3, &[("action", json!("remove"))]),
        ];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert_eq!(DETECTOR.detect(&signals).unwrap().confidence, 1.0);
    }

    #[test]
    fn removal_for_other_reason_is_not_death() {
        let activities = vec![activity(
            GuardianUpdate,
            3,
            &[("action", json!("remove")), ("reason", json!("moved_away"))],
        )];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(DETECTOR.detect(&signals).is_none());
    }

    #[test]
    fn beneficiary_removal_alone_is_weak() {
        let activities = vec![activity(BeneficiaryUpdate, 10, &[("action", json!("remove"))])];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(approx(DETECTOR.detect(&signals).unwrap().confidence, 0.3));
    }

    #[test]
    fn old_deceased_marking_is_ignored() {
        let activities = vec![activity(
            GuardianUpdate,
            31,
            &[("action", json!("remove")), ("reason", json!("deceased"))],
        )];
        let signals = SignalSet::at(now(), &activities, &[], &[]);
        assert!(DETECTOR.detect(&signals).is_none());
    }
}
