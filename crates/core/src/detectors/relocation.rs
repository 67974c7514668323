//! Relocation detection.

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Rule, Verdict};
use crate::signals::{ActivityType, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "relocation",
    primary: LifeEventType::Move,
    alternate: None,
    rules: &RULES,
};

static RULES: [Rule; 3] = [
    Rule {
        explanation: "Address updated",
        effect: Effect::Add(0.6),
        window_days: Some(60),
        check: address_changed,
    },
    Rule {
        explanation: "Multiple contact updates",
        effect: Effect::Add(0.3),
        window_days: Some(60),
        check: many_contact_updates,
    },
    Rule {
        explanation: "Real estate changes",
        effect: Effect::Add(0.5),
        window_days: Some(90),
        check: real_estate_changed,
    },
];

/// Contact updates must exceed this count to fire.
const MIN_CONTACT_UPDATES: usize = 2;

fn address_changed(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .profile_changes(&["address", "city", "state"], window)
            .next()
            .is_some(),
    )
}

fn many_contact_updates(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    let count = signals
        .activities(ActivityType::GuardianUpdate, window)
        .filter(|a| a.details.update_type() == Some("contact_info"))
        .count();
    Verdict::from_bool(count > MIN_CONTACT_UPDATES)
}

fn real_estate_changed(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .activities(ActivityType::AssetChange, window)
            .any(|a| a.details.asset_type() == Some("real_estate")),
    )
}
