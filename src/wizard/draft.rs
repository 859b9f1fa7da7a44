//! Live form values for the wizard panes.
//!
//! The draft is what the user is editing right now. It is only copied into the
//! persisted [`AssessmentState`] when a step is snapshotted.

use std::collections::{BTreeMap, BTreeSet};

use crate::assessment::{
    AssessmentState, ControlMapping, EffectivenessRating, InherentRating, ResidualRecord,
    ResponsePlan, ResponseStrategy, SEED_RISK,
};
use crate::catalog::{self, RiskCategory};
use crate::format::RiskLevel;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    pub selected_risks: BTreeSet<String>,
    pub risk_assessments: BTreeMap<String, InherentRating>,
    pub control_mappings: BTreeMap<String, ControlMapping>,
    pub control_effectiveness: BTreeMap<String, EffectivenessRating>,
    pub residual_risk: BTreeMap<String, ResidualRecord>,
    pub risk_response: BTreeMap<String, ResponsePlan>,
    /// Risk review list filter, not persisted
    pub category_filter: Option<RiskCategory>,
    /// Built when the review step is entered
    pub review: Option<ReviewSummary>,
}

impl FormDraft {
    /// Hydrate the form from a stored assessment
    pub fn from_state(state: &AssessmentState) -> Self {
        Self {
            selected_risks: state.selected_risks.clone(),
            risk_assessments: state.risk_assessments.clone(),
            control_mappings: state.control_mappings.clone(),
            control_effectiveness: state.control_effectiveness.clone(),
            residual_risk: state.residual_risk.clone(),
            risk_response: state.risk_response.clone(),
            category_filter: None,
            review: None,
        }
    }

    /// Selection as it is persisted: the seed risk stands in for an empty set
    pub fn selection_or_seed(&self) -> BTreeSet<String> {
        if self.selected_risks.is_empty() {
            BTreeSet::from([SEED_RISK.to_string()])
        } else {
            self.selected_risks.clone()
        }
    }

    pub fn is_selected(&self, risk_id: &str) -> bool {
        self.selected_risks.contains(risk_id)
    }

    /// Returns whether the risk is selected afterwards
    pub fn toggle_risk(&mut self, risk_id: &str) -> bool {
        if self.selected_risks.remove(risk_id) {
            false
        } else {
            self.selected_risks.insert(risk_id.to_string());
            true
        }
    }

    /// Add every pre-identified library risk; returns how many were new
    pub fn select_all_pre_identified(&mut self) -> usize {
        catalog::pre_selected_risks()
            .filter(|r| self.selected_risks.insert(r.id.to_string()))
            .count()
    }

    pub fn clear_selection(&mut self) {
        self.selected_risks.clear();
    }

    /// Flip between all categories and operational risks only
    pub fn toggle_operational_filter(&mut self) -> Option<RiskCategory> {
        self.category_filter = match self.category_filter {
            Some(RiskCategory::Operational) => None,
            _ => Some(RiskCategory::Operational),
        };
        self.category_filter
    }

    pub fn visible_risks(&self) -> Vec<&'static catalog::RiskDefinition> {
        catalog::risks_in(self.category_filter)
    }

    /// Controls mapped to any selected risk, in first-seen order
    pub fn mapped_controls(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.selected_risks
            .iter()
            .filter_map(|risk| self.control_mappings.get(risk))
            .flat_map(|mapping| mapping.controls.iter())
            .filter(|control| seen.insert(control.as_str()))
            .cloned()
            .collect()
    }

    /// Inherent score reduced by the average effectiveness of the risk's mapped controls.
    ///
    /// `None` until the risk has an inherent rating. The residual never drops below 1.
    pub fn compute_residual(&self, risk_id: &str) -> Option<ResidualRecord> {
        let inherent = self.risk_assessments.get(risk_id)?.score();
        let controls = self
            .control_mappings
            .get(risk_id)
            .map(|m| m.controls.as_slice())
            .unwrap_or_default();

        let reduction = if controls.is_empty() {
            0.0
        } else {
            let total: f64 = controls
                .iter()
                .map(|c| {
                    self.control_effectiveness
                        .get(c)
                        .copied()
                        .unwrap_or_default()
                        .reduction()
                })
                .sum();
            total / controls.len() as f64
        };

        let residual = (f64::from(inherent) * (1.0 - reduction)).round().max(1.0) as u8;
        Some(ResidualRecord {
            inherent_score: inherent,
            residual_score: residual,
        })
    }

    /// Strategy proposed for a risk from its residual level, else its inherent level
    pub fn proposed_strategy(&self, risk_id: &str) -> ResponseStrategy {
        let score = self
            .residual_risk
            .get(risk_id)
            .map(|r| r.residual_score)
            .or_else(|| self.risk_assessments.get(risk_id).map(InherentRating::score))
            .unwrap_or(0);
        if RiskLevel::from_score(u32::from(score)) >= RiskLevel::Medium {
            ResponseStrategy::Mitigate
        } else {
            ResponseStrategy::Accept
        }
    }
}

/// Totals shown on the review step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub risks_selected: usize,
    pub risks_scored: usize,
    /// Selected risks with an inherent level of High or Critical
    pub high_inherent: usize,
    pub controls_mapped: usize,
    pub controls_effective: usize,
    pub highest_residual: Option<(String, u8)>,
    pub strategies: BTreeMap<&'static str, usize>,
}

impl ReviewSummary {
    pub fn from_form(form: &FormDraft) -> Self {
        let selected = &form.selected_risks;
        let controls = form.mapped_controls();

        let high_inherent = selected
            .iter()
            .filter_map(|r| form.risk_assessments.get(r))
            .filter(|rating| RiskLevel::from_score(u32::from(rating.score())) >= RiskLevel::High)
            .count();

        let highest_residual = selected
            .iter()
            .filter_map(|r| form.residual_risk.get(r).map(|rec| (r, rec.residual_score)))
            .max_by_key(|(_, score)| *score)
            .map(|(r, score)| (r.clone(), score));

        let mut strategies = BTreeMap::new();
        for plan in selected.iter().filter_map(|r| form.risk_response.get(r)) {
            *strategies.entry(plan.strategy.label()).or_insert(0) += 1;
        }

        Self {
            risks_selected: selected.len(),
            risks_scored: selected
                .iter()
                .filter(|r| form.risk_assessments.contains_key(*r))
                .count(),
            high_inherent,
            controls_mapped: controls.len(),
            controls_effective: controls
                .iter()
                .filter(|c| {
                    form.control_effectiveness.get(*c) == Some(&EffectivenessRating::Effective)
                })
                .count(),
            highest_residual,
            strategies,
        }
    }
}
