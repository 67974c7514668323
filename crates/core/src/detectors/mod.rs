//! The seven life event detectors.
//!
//! Each submodule defines one static rule table ([`DetectorSpec`]) and the
//! private predicates it references. Detectors are independent: none reads
//! another's output, so they may run in any order.

pub mod birth;
pub mod death;
pub mod job_change;
pub mod major_purchase;
pub mod marriage;
pub mod relocation;
pub mod retirement;

use crate::rules::DetectorSpec;

/// Every registered detector.
pub static ALL_DETECTORS: [&DetectorSpec; 7] = [
    &marriage::DETECTOR,
    &birth::DETECTOR,
    &death::DETECTOR,
    &job_change::DETECTOR,
    &relocation::DETECTOR,
    &retirement::DETECTOR,
    &major_purchase::DETECTOR,
];
