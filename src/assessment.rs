//! The assessment aggregate: the single unit that is persisted, exported and imported.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk selected by default when nothing else is selected
pub const SEED_RISK: &str = "system-failure";

pub const DEFAULT_PROCESS_NAME: &str = "Wire Transfer Assessment";
pub const DEFAULT_ASSESSMENT_PERIOD: &str = "December 2024";

/// Highest step number in the wizard
pub const TOTAL_STEPS: u8 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentState {
    #[serde(default = "seed_selection")]
    pub selected_risks: BTreeSet<String>,
    #[serde(default)]
    pub risk_assessments: BTreeMap<String, InherentRating>,
    #[serde(default)]
    pub control_mappings: BTreeMap<String, ControlMapping>,
    #[serde(default)]
    pub control_effectiveness: BTreeMap<String, EffectivenessRating>,
    #[serde(default)]
    pub residual_risk: BTreeMap<String, ResidualRecord>,
    #[serde(default)]
    pub risk_response: BTreeMap<String, ResponsePlan>,
    #[serde(default)]
    pub metadata: AssessmentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentMetadata {
    pub process_name: String,
    pub assessment_period: String,
    pub last_modified: DateTime<Utc>,
    pub current_step: u8,
    /// Set once the review step has been submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Default for AssessmentMetadata {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            assessment_period: DEFAULT_ASSESSMENT_PERIOD.to_string(),
            last_modified: Utc::now(),
            current_step: 1,
            submitted_at: None,
        }
    }
}

/// Inherent likelihood and impact, each on a 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InherentRating {
    pub likelihood: u8,
    pub impact: u8,
}

impl InherentRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(likelihood: u8, impact: u8) -> Self {
        Self {
            likelihood: likelihood.clamp(Self::MIN, Self::MAX),
            impact: impact.clamp(Self::MIN, Self::MAX),
        }
    }

    /// Likelihood × Impact, 1..=25 for ratings on the scale
    pub fn score(&self) -> u8 {
        self.likelihood.saturating_mul(self.impact)
    }

    /// Whether both factors are within 1..=5
    pub fn is_on_scale(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.likelihood)
            && (Self::MIN..=Self::MAX).contains(&self.impact)
    }

    pub fn cycle_likelihood(&mut self) {
        self.likelihood = cycle_scale(self.likelihood);
    }

    pub fn cycle_impact(&mut self) {
        self.impact = cycle_scale(self.impact);
    }
}

fn cycle_scale(value: u8) -> u8 {
    if value >= InherentRating::MAX {
        InherentRating::MIN
    } else {
        value + 1
    }
}

/// Controls linked to a single risk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMapping {
    #[serde(default)]
    pub controls: Vec<String>,
}

impl ControlMapping {
    /// Add or remove a control, returning whether it is now mapped
    pub fn toggle(&mut self, control_id: &str) -> bool {
        if let Some(pos) = self.controls.iter().position(|c| c == control_id) {
            self.controls.remove(pos);
            false
        } else {
            self.controls.push(control_id.to_string());
            true
        }
    }

    pub fn contains(&self, control_id: &str) -> bool {
        self.controls.iter().any(|c| c == control_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectivenessRating {
    Effective,
    PartiallyEffective,
    Ineffective,
    #[default]
    NotTested,
}

impl EffectivenessRating {
    pub fn label(&self) -> &'static str {
        match self {
            EffectivenessRating::Effective => "Effective",
            EffectivenessRating::PartiallyEffective => "Partially Effective",
            EffectivenessRating::Ineffective => "Ineffective",
            EffectivenessRating::NotTested => "Not Tested",
        }
    }

    /// Fraction of inherent risk this control removes
    pub fn reduction(&self) -> f64 {
        match self {
            EffectivenessRating::Effective => 0.5,
            EffectivenessRating::PartiallyEffective => 0.25,
            EffectivenessRating::Ineffective | EffectivenessRating::NotTested => 0.0,
        }
    }

    pub fn next(self) -> Self {
        match self {
            EffectivenessRating::NotTested => EffectivenessRating::Effective,
            EffectivenessRating::Effective => EffectivenessRating::PartiallyEffective,
            EffectivenessRating::PartiallyEffective => EffectivenessRating::Ineffective,
            EffectivenessRating::Ineffective => EffectivenessRating::NotTested,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualRecord {
    pub inherent_score: u8,
    pub residual_score: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseStrategy {
    Accept,
    #[default]
    Mitigate,
    Transfer,
    Avoid,
}

impl ResponseStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseStrategy::Accept => "Accept",
            ResponseStrategy::Mitigate => "Mitigate",
            ResponseStrategy::Transfer => "Transfer",
            ResponseStrategy::Avoid => "Avoid",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ResponseStrategy::Accept => ResponseStrategy::Mitigate,
            ResponseStrategy::Mitigate => ResponseStrategy::Transfer,
            ResponseStrategy::Transfer => ResponseStrategy::Avoid,
            ResponseStrategy::Avoid => ResponseStrategy::Accept,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePlan {
    pub strategy: ResponseStrategy,
}

fn seed_selection() -> BTreeSet<String> {
    BTreeSet::from([SEED_RISK.to_string()])
}

impl Default for AssessmentState {
    fn default() -> Self {
        Self {
            selected_risks: seed_selection(),
            risk_assessments: BTreeMap::new(),
            control_mappings: BTreeMap::new(),
            control_effectiveness: BTreeMap::new(),
            residual_risk: BTreeMap::new(),
            risk_response: BTreeMap::new(),
            metadata: AssessmentMetadata::default(),
        }
    }
}

impl AssessmentState {
    /// Create a fresh assessment for the given process
    pub fn for_process(process_name: &str, assessment_period: &str) -> Self {
        let mut state = Self::default();
        state.metadata.process_name = process_name.to_string();
        state.metadata.assessment_period = assessment_period.to_string();
        state
    }

    /// Repair invariants: a non-empty selection, ratings on the 1-5 scale
    /// and a step within 1..=7.
    ///
    /// Returns true when anything had to change.
    pub fn normalize(&mut self) -> bool {
        let mut repaired = false;
        if self.selected_risks.is_empty() {
            self.selected_risks = seed_selection();
            repaired = true;
        }
        for rating in self.risk_assessments.values_mut() {
            if !rating.is_on_scale() {
                *rating = InherentRating::new(rating.likelihood, rating.impact);
                repaired = true;
            }
        }
        let clamped = self.metadata.current_step.clamp(1, TOTAL_STEPS);
        if clamped != self.metadata.current_step {
            self.metadata.current_step = clamped;
            repaired = true;
        }
        repaired
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn is_submitted(&self) -> bool {
        self.metadata.submitted_at.is_some()
    }

    pub fn touch(&mut self) {
        self.metadata.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_has_seed_risk() {
        let state = AssessmentState::default();
        assert_eq!(state.selected_risks.len(), 1);
        assert!(state.selected_risks.contains(SEED_RISK));
        assert_eq!(state.metadata.current_step, 1);
        assert_eq!(state.metadata.process_name, DEFAULT_PROCESS_NAME);
        assert!(state.risk_assessments.is_empty());
        assert!(state.risk_response.is_empty());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let state = AssessmentState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("selectedRisks").is_some());
        assert!(json.get("riskAssessments").is_some());
        assert!(json.get("controlEffectiveness").is_some());
        assert_eq!(json["metadata"]["currentStep"], 1);
        assert_eq!(json["metadata"]["processName"], DEFAULT_PROCESS_NAME);
        assert!(json["metadata"].get("submittedAt").is_none());
    }

    #[test]
    fn test_parses_minimal_document() {
        let json = r#"{
            "selectedRisks": ["system-failure", "sanctions-screening"],
            "riskAssessments": {"system-failure": {"likelihood": 3, "impact": 4}},
            "controlMappings": {},
            "controlEffectiveness": {"ctl-failover": "partially-effective"},
            "residualRisk": {},
            "riskResponse": {"system-failure": {"strategy": "transfer"}},
            "metadata": {
                "processName": "Wire Transfer Assessment",
                "assessmentPeriod": "December 2024",
                "lastModified": "2024-12-02T10:00:00Z",
                "currentStep": 3
            }
        }"#;
        let state: AssessmentState = serde_json::from_str(json).unwrap();
        assert_eq!(state.selected_risks.len(), 2);
        assert_eq!(state.risk_assessments["system-failure"].score(), 12);
        assert_eq!(
            state.control_effectiveness["ctl-failover"],
            EffectivenessRating::PartiallyEffective
        );
        assert_eq!(
            state.risk_response["system-failure"].strategy,
            ResponseStrategy::Transfer
        );
        assert_eq!(state.metadata.current_step, 3);
    }

    #[test]
    fn test_normalize_repairs_empty_selection_and_step() {
        let mut state = AssessmentState::default();
        state.selected_risks.clear();
        state.metadata.current_step = 12;

        assert!(state.normalize());
        assert!(state.selected_risks.contains(SEED_RISK));
        assert_eq!(state.metadata.current_step, TOTAL_STEPS);

        assert!(!state.normalize());
    }

    #[test]
    fn test_normalize_clamps_ratings_off_the_scale() {
        let mut state = AssessmentState::default();
        state.risk_assessments.insert(
            SEED_RISK.to_string(),
            InherentRating {
                likelihood: 16,
                impact: 0,
            },
        );

        assert!(state.normalize());
        let rating = state.risk_assessments[SEED_RISK];
        assert_eq!(rating, InherentRating::new(5, 1));
        assert_eq!(rating.score(), 5);
    }

    #[test]
    fn test_score_saturates_instead_of_overflowing() {
        let rating = InherentRating {
            likelihood: 200,
            impact: 200,
        };
        assert_eq!(rating.score(), u8::MAX);
    }

    #[test]
    fn test_normalize_lifts_step_zero() {
        let mut state = AssessmentState::default();
        state.metadata.current_step = 0;
        state.normalize();
        assert_eq!(state.metadata.current_step, 1);
    }

    #[test]
    fn test_inherent_rating_cycles_within_scale() {
        let mut rating = InherentRating::new(5, 9);
        assert_eq!(rating.impact, 5);
        rating.cycle_likelihood();
        assert_eq!(rating.likelihood, 1);
        rating.cycle_likelihood();
        assert_eq!(rating.likelihood, 2);
        assert_eq!(rating.score(), 10);
    }

    #[test]
    fn test_control_mapping_toggle() {
        let mut mapping = ControlMapping::default();
        assert!(mapping.toggle("ctl-callback"));
        assert!(mapping.contains("ctl-callback"));
        assert!(!mapping.toggle("ctl-callback"));
        assert!(mapping.controls.is_empty());
    }

    #[test]
    fn test_rating_and_strategy_cycles_wrap() {
        let mut rating = EffectivenessRating::default();
        for _ in 0..4 {
            rating = rating.next();
        }
        assert_eq!(rating, EffectivenessRating::NotTested);

        let mut strategy = ResponseStrategy::Accept;
        for _ in 0..4 {
            strategy = strategy.next();
        }
        assert_eq!(strategy, ResponseStrategy::Accept);
    }
}
