//! Life event task checklists.
//!
//! A checklist is the actionable follow-up the presenter walks a user
//! through once an event is acknowledged. Titles and descriptions are i18n
//! keys; translation belongs to the presenter.

use serde::{Deserialize, Serialize};

use crate::life_event::LifeEventType;

// ---------------------------------------------------------------------------
// Checklist keys
// ---------------------------------------------------------------------------

pub const CHECKLIST_MARRIED_DIVORCED: &str = "married_divorced";
pub const CHECKLIST_NEW_CHILD: &str = "new_child";
pub const CHECKLIST_BOUGHT_SOLD_HOME: &str = "bought_sold_home";
pub const CHECKLIST_STARTED_BUSINESS: &str = "started_business";
pub const CHECKLIST_TRUSTED_PERSON_PASSED: &str = "trusted_person_passed";
pub const CHECKLIST_UNKNOWN: &str = "unknown";

pub const VALID_CHECKLISTS: &[&str] = &[
    CHECKLIST_MARRIED_DIVORCED,
    CHECKLIST_NEW_CHILD,
    CHECKLIST_BOUGHT_SOLD_HOME,
    CHECKLIST_STARTED_BUSINESS,
    CHECKLIST_TRUSTED_PERSON_PASSED,
];

/// `(task id, i18n stem, description suffix, action url)`.
type TaskDef = (&'static str, &'static str, &'static str, &'static str);

const MARRIED_DIVORCED_TASKS: &[TaskDef] = &[
    ("update_beneficiaries", "updateBeneficiaries", "Desc", "/vault"),
    ("update_will", "updateWill", "Desc", "/documents/will"),
    ("review_trusts", "reviewTrusts", "Desc", "/documents"),
    ("update_emergency_contacts", "updateEmergencyContacts", "Desc", "/trusted-circle"),
];

const NEW_CHILD_TASKS: &[TaskDef] = &[
    ("add_child_roster", "addChildRoster", "Desc", "/trusted-circle"),
    ("update_guardian", "updateGuardian", "Desc", "/trusted-circle"),
    ("review_life_insurance", "reviewLifeInsurance", "Desc", "/vault"),
    ("update_will_beneficiary", "updateWillBeneficiary", "Desc", "/documents/will"),
];

const BOUGHT_SOLD_HOME_TASKS: &[TaskDef] = &[
    ("update_property_armory", "updatePropertyArmory", "Desc", "/vault"),
    ("update_mortgage_info", "updateMortgageInfo", "Desc", "/documents"),
    ("review_homeowners_insurance", "reviewHomeownersInsurance", "Desc", "/vault"),
    ("update_net_worth", "updateNetWorth", "Desc", "/vault"),
];

const STARTED_BUSINESS_TASKS: &[TaskDef] = &[
    ("add_business_assets", "addBusinessAssets", "Desc", "/vault"),
    ("create_succession_plan", "createSuccessionPlan", "Desc", "/documents"),
    ("update_insurance", "updateInsurance", "Desc", "/vault"),
    ("separate_personal_business", "separatePersonalBusiness", "Desc", "/vault"),
];

const TRUSTED_PERSON_PASSED_TASKS: &[TaskDef] = &[
    ("remove_deceased", "removeDeceased", "Desc", "/trusted-circle"),
    ("appoint_new_executor", "appointNewExecutor", "Desc", "/trusted-circle"),
    ("update_beneficiaries", "updateBeneficiaries", "Desc2", "/vault"),
    ("update_emergency_contacts", "updateEmergencyContacts", "Desc2", "/trusted-circle"),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTask {
    pub id: String,
    pub title_key: String,
    pub description_key: String,
    pub action_url: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEventChecklist {
    pub event_key: String,
    pub title_key: String,
    pub congrats_key: Option<String>,
    pub tasks: Vec<ChecklistTask>,
}

impl LifeEventChecklist {
    /// Mark a task done or not done. Returns `false` if no task has `task_id`.
    pub fn set_task_completed(&mut self, task_id: &str, completed: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.completed = completed;
                true
            }
            None => false,
        }
    }

    /// `true` once every task is done. An empty checklist is never complete.
    pub fn is_complete(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.completed)
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Build the checklist for `event_key`, or an empty `unknown` checklist.
pub fn generate_checklist(event_key: &str) -> LifeEventChecklist {
    let (title_stem, congrats, tasks) = match event_key {
        CHECKLIST_MARRIED_DIVORCED => ("marriedDivorced", false, MARRIED_DIVORCED_TASKS),
        CHECKLIST_NEW_CHILD => ("newChild", true, NEW_CHILD_TASKS),
        CHECKLIST_BOUGHT_SOLD_HOME => ("boughtSoldHome", false, BOUGHT_SOLD_HOME_TASKS),
        CHECKLIST_STARTED_BUSINESS => ("startedBusiness", false, STARTED_BUSINESS_TASKS),
        CHECKLIST_TRUSTED_PERSON_PASSED => ("trustedPersonPassed", false, TRUSTED_PERSON_PASSED_TASKS),
        _ => {
            return LifeEventChecklist {
                event_key: CHECKLIST_UNKNOWN.to_string(),
                title_key: "lifeEvents.events.unknown".to_string(),
                congrats_key: None,
                tasks: Vec::new(),
            }
        }
    };

    LifeEventChecklist {
        event_key: event_key.to_string(),
        title_key: format!("lifeEvents.events.{title_stem}"),
        congrats_key: congrats.then(|| "lifeEvents.congratsMessage".to_string()),
        tasks: tasks.iter().map(build_task).collect(),
    }
}

fn build_task(&(id, stem, desc_suffix, action_url): &TaskDef) -> ChecklistTask {
    ChecklistTask {
        id: id.to_string(),
        title_key: format!("lifeEvents.tasks.{stem}"),
        description_key: format!("lifeEvents.tasks.{stem}{desc_suffix}"),
        action_url: action_url.to_string(),
        completed: false,
    }
}

/// Checklist key matching a detected event type, if one exists.
pub fn checklist_key_for(event_type: LifeEventType) -> Option<&'static str> {
    match event_type {
        LifeEventType::Marriage | LifeEventType::Divorce => Some(CHECKLIST_MARRIED_DIVORCED),
        LifeEventType::Birth => Some(CHECKLIST_NEW_CHILD),
        LifeEventType::MajorPurchase => Some(CHECKLIST_BOUGHT_SOLD_HOME),
        LifeEventType::Death => Some(CHECKLIST_TRUSTED_PERSON_PASSED),
        _ => None,
    }
}

/// Checklist for a detected event type (`unknown` when none is defined).
pub fn checklist_for_event(event_type: LifeEventType) -> LifeEventChecklist {
    generate_checklist(checklist_key_for(event_type).unwrap_or(CHECKLIST_UNKNOWN))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
