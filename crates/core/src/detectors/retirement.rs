//! Retirement detection.

use serde_json::Value;

use crate::life_event::LifeEventType;
use crate::rules::{DetectorSpec, Effect, Rule, Verdict};
use crate::signals::{ActivityType, SignalSet};

pub static DETECTOR: DetectorSpec = DetectorSpec {
    name: "retirement",
    primary: LifeEventType::Retirement,
    alternate: None,
    rules: &RULES,
};

static RULES: [Rule; 3] = [
    Rule {
        explanation: "Employment status changed to retired",
        effect: Effect::Add(0.8),
        window_days: Some(90),
        check: status_retired,
    },
    Rule {
        explanation: "Retirement account withdrawal activity",
        effect: Effect::Add(0.4),
        window_days: Some(180),
        check: repeated_withdrawals,
    },
    Rule {
        explanation: "Retirement age reached",
        effect: Effect::Add(0.2),
        window_days: None,
        check: retirement_age,
    },
];

/// Earliest age treated as a retirement signal.
pub const RETIREMENT_AGE: f64 = 62.0;

/// Withdrawals must exceed this count to fire.
const MIN_WITHDRAWALS: usize = 2;

fn status_retired(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .profile_changes(&["employmentStatus"], window)
            .any(|c| c.new_value == Value::from("retired")),
    )
}

fn repeated_withdrawals(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    let count = signals
        .activities(ActivityType::AssetChange, window)
        .filter(|a| {
            a.details.asset_type() == Some("retirement_account")
                && a.details.change_type() == Some("withdrawal")
        })
        .count();
    Verdict::from_bool(count > MIN_WITHDRAWALS)
}

fn retirement_age(signals: &SignalSet<'_>, window: Option<u32>) -> Verdict {
    Verdict::from_bool(
        signals
            .profile_changes(&["age"], window)
            .any(|c| c.new_number().is_some_and(|age| age >= RETIREMENT_AGE)),
    )
}
