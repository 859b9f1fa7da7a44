//! Selectable rows of each pane and the edits applied to them.

use rcsa_wizard::assessment::InherentRating;
use rcsa_wizard::catalog::{self, CONTROLS};
use rcsa_wizard::wizard::{FormDraft, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Risk(String),
    /// One control offered against one risk
    Mapping { risk: String, control: String },
    Control(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Space: select, map, or cycle depending on the pane
    Toggle,
    CycleLikelihood,
    CycleImpact,
}

pub fn rows(step: Step, form: &FormDraft) -> Vec<Row> {
    match step {
        Step::RiskReview => form
            .visible_risks()
            .into_iter()
            .map(|r| Row::Risk(r.id.to_string()))
            .collect(),
        Step::InherentRisk | Step::ResidualRisk | Step::RiskResponse => form
            .selected_risks
            .iter()
            .map(|r| Row::Risk(r.clone()))
            .collect(),
        Step::ControlMapping => form
            .selected_risks
            .iter()
            .flat_map(|risk| {
                CONTROLS.iter().map(move |c| Row::Mapping {
                    risk: risk.clone(),
                    control: c.id.to_string(),
                })
            })
            .collect(),
        Step::ControlEffectiveness => form
            .mapped_controls()
            .into_iter()
            .map(Row::Control)
            .collect(),
        Step::ReviewSubmit => Vec::new(),
    }
}

/// Apply `action` to `row` on `step`; returns whether anything changed
pub fn apply(form: &mut FormDraft, step: Step, row: &Row, action: RowAction) -> bool {
    match (step, row, action) {
        (Step::RiskReview, Row::Risk(id), RowAction::Toggle) => {
            form.toggle_risk(id);
            true
        }
        (Step::InherentRisk, Row::Risk(id), RowAction::CycleLikelihood | RowAction::CycleImpact) => {
            let rating = form
                .risk_assessments
                .entry(id.clone())
                .or_insert_with(|| baseline(id));
            if action == RowAction::CycleLikelihood {
                rating.cycle_likelihood();
            } else {
                rating.cycle_impact();
            }
            true
        }
        (Step::ControlMapping, Row::Mapping { risk, control }, RowAction::Toggle) => {
            form.control_mappings
                .entry(risk.clone())
                .or_default()
                .toggle(control);
            true
        }
        (Step::ControlEffectiveness, Row::Control(id), RowAction::Toggle) => {
            let rating = form.control_effectiveness.entry(id.clone()).or_default();
            *rating = rating.next();
            true
        }
        (Step::RiskResponse, Row::Risk(id), RowAction::Toggle) => {
            let plan = form.risk_response.entry(id.clone()).or_default();
            plan.strategy = plan.strategy.next();
            true
        }
        _ => false,
    }
}

fn baseline(risk_id: &str) -> InherentRating {
    catalog::risk(risk_id)
        .map(|r| InherentRating::new(r.baseline_likelihood, r.baseline_impact))
        .unwrap_or_else(|| InherentRating::new(InherentRating::MIN, InherentRating::MIN))
}
