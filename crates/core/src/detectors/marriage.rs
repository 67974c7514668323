//! Marriage / divorce detection.
//!
//! The spouse-relationship and legal-document checks also decide the
//! direction: an `add` or a marriage certificate points at marriage, a
//! removal or a divorce decree at divorce. The legal document comes last in
//! the table, so it overrides the relationship change.

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Polarity, Rule, Verdict};
use crate::signals::{Action, ActivityType, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "marriage",
    primary: LifeEventType::Marriage,
    alternate: Some(LifeEventType::Divorce),
    rules: &RULES,
};

static RULES: [Rule; 4] = [
    Rule {
        explanation: "Name change detected",
        effect: Effect::Add(0.3),
        window_days: Some(90),
        check: surname_changed,
    },
    Rule {
        explanation: "Recent beneficiary updates",
        effect: Effect::Add(0.4),
        window_days: Some(60),
        check: beneficiaries_updated,
    },
    Rule {
        explanation: "Spouse relationship updated",
        effect: Effect::Add(0.5),
        window_days: Some(60),
        check: spouse_updated,
    },
    Rule {
        explanation: "Legal document detected",
        effect: Effect::Add(0.6),
        window_days: None,
        check: legal_document,
    },
];

const MARRIAGE_CERTIFICATE: &str = "marriage_certificate";
const DIVORCE_DECREE: &str = "divorce_decree";

fn surname_changed(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(signals.profile_changes(&["lastName"], window).next().is_some())
}

fn beneficiaries_updated(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::BeneficiaryUpdate, window)
            .next()
            .is_some(),
    )
}

fn spouse_updated(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    let spouse = signals
        .activities(ActivityType::GuardianUpdate, window)
        .find(|a| a.details.relationship() == Some("spouse"));

    match spouse {
        None => Verdict::Miss,
        Some(a) if a.details.action() == Some(Action::Add) => Verdict::Directed(Polarity::Primary),
        Some(_) => Verdict::Directed(Polarity::Alternate),
    }
}

fn legal_document(signals: &SignalSet<'_>, _window: Option<u32>) -> Verdict {
    match signals.indicators(&[MARRIAGE_CERTIFICATE, DIVORCE_DECREE]).next() {
        None => Verdict::Miss,
        Some(i) if i.is_type(MARRIAGE_CERTIFICATE) => Verdict::Directed(Polarity::Primary),
        Some(_) => Verdict::Directed(Polarity::Alternate),
    }
}
