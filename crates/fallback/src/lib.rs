//! Rule-Based Fallback System
//!
//! Provides water-level heuristics when no trained classifier is available.

mod rules;

pub use rules::{FallbackEngine, RuleThresholds, RULE_CONFIDENCE};
