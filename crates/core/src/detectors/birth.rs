//! New child (birth or adoption) detection.

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Rule, Verdict};
use crate::signals::{Action, ActivityType, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "birth",
    primary: LifeEventType::Birth,
    alternate: None,
    rules: &RULES,
};

static RULES: [Rule; 3] = [
    Rule {
        explanation: "New child added to family",
        effect: Effect::Add(0.6),
        window_days: Some(90),
        check: child_added,
    },
    Rule {
        explanation: "Guardianship documents updated",
        effect: Effect::Add(0.4),
        window_days: Some(60),
        check: guardianship_uploaded,
    },
    Rule {
        explanation: "Birth/adoption documentation detected",
        effect: Effect::Add(0.7),
        window_days: None,
        check: birth_documents,
    },
];

fn child_added(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::GuardianUpdate, window)
            .any(|a| {
                matches!(a.details.relationship(), Some("child" | "dependent"))
                    && a.details.action() == Some(Action::Add)
            }),
    )
}

fn guardianship_uploaded(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::DocumentUpload, window)
            .any(|a| a.details.document_type() == Some("guardianship")),
    )
}

fn birth_documents(signals: &SignalSet<'_>, _window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .indicators(&["birth_certificate", "adoption_papers"])
            .next()
            .is_some(),
    )
}
