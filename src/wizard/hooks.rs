//! Per-step initializers run when a pane becomes active.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::assessment::{AssessmentState, ControlMapping, InherentRating, ResponsePlan};
use crate::catalog;
use crate::wizard::{FormDraft, ReviewSummary, Step};

/// What an initializer may touch: the live form and the last persisted state
pub struct StepContext<'a> {
    pub step: Step,
    pub form: &'a mut FormDraft,
    pub state: &'a AssessmentState,
}

/// Prepares a pane's form values when its step is entered.
pub trait StepInitializer: Send + Sync {
    fn name(&self) -> &'static str;

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()>;
}

/// Initializers keyed by step; steps without an entry are shown as-is.
#[derive(Default)]
pub struct StepHooks {
    hooks: BTreeMap<Step, Box<dyn StepInitializer>>,
}

impl StepHooks {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in initializers for steps 2 through 7
    pub fn demo() -> Self {
        Self::empty()
            .with(Step::InherentRisk, InherentScoringCards)
            .with(Step::ControlMapping, SuggestedControls)
            .with(Step::ControlEffectiveness, EffectivenessRatings)
            .with(Step::ResidualRisk, ResidualScores)
            .with(Step::RiskResponse, ResponseProposals)
            .with(Step::ReviewSubmit, ReviewSummaryBuilder)
    }

    pub fn with(mut self, step: Step, hook: impl StepInitializer + 'static) -> Self {
        self.hooks.insert(step, Box::new(hook));
        self
    }

    pub fn get(&self, step: Step) -> Option<&dyn StepInitializer> {
        self.hooks.get(&step).map(|h| h.as_ref())
    }

    pub fn contains(&self, step: Step) -> bool {
        self.hooks.contains_key(&step)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Step 2: a scoring card per selected risk, seeded from the library baseline
pub struct InherentScoringCards;

impl StepInitializer for InherentScoringCards {
    fn name(&self) -> &'static str {
        "inherent-scoring"
    }

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()> {
        let form = ctx.form;
        let selected = form.selected_risks.clone();
        form.risk_assessments.retain(|risk, _| selected.contains(risk));

        for risk_id in &selected {
            let def = catalog::risk(risk_id)
                .with_context(|| format!("risk {risk_id} is not in the risk library"))?;
            form.risk_assessments
                .entry(risk_id.clone())
                .or_insert_with(|| {
                    InherentRating::new(def.baseline_likelihood, def.baseline_impact)
                });
        }
        Ok(())
    }
}

/// Step 3: pre-map the library's suggested controls for unmapped risks
pub struct SuggestedControls;

impl StepInitializer for SuggestedControls {
    fn name(&self) -> &'static str {
        "control-mapping"
    }

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()> {
        let form = ctx.form;
        let selected: Vec<String> = form.selected_risks.iter().cloned().collect();
        for risk_id in selected {
            let Some(def) = catalog::risk(&risk_id) else {
                continue;
            };
            form.control_mappings.entry(risk_id).or_insert_with(|| {
                ControlMapping {
                    controls: def.suggested_controls.iter().map(|c| c.to_string()).collect(),
                }
            });
        }
        Ok(())
    }
}

/// Step 4: every mapped control gets a rating, not-tested until changed
pub struct EffectivenessRatings;

impl StepInitializer for EffectivenessRatings {
    fn name(&self) -> &'static str {
        "control-effectiveness"
    }

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()> {
        let form = ctx.form;
        for control_id in form.mapped_controls() {
            form.control_effectiveness.entry(control_id).or_default();
        }
        Ok(())
    }
}

/// Step 5: recompute residual scores from the current ratings
pub struct ResidualScores;

impl StepInitializer for ResidualScores {
    fn name(&self) -> &'static str {
        "residual-risk"
    }

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()> {
        let form = ctx.form;
        let residual: BTreeMap<_, _> = form
            .selected_risks
            .iter()
            .filter_map(|risk| form.compute_residual(risk).map(|rec| (risk.clone(), rec)))
            .collect();
        form.residual_risk = residual;
        Ok(())
    }
}

/// Step 6: propose a response for risks that do not have one yet
pub struct ResponseProposals;

impl StepInitializer for ResponseProposals {
    fn name(&self) -> &'static str {
        "risk-response"
    }

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()> {
        let form = ctx.form;
        let proposals: Vec<(String, ResponsePlan)> = form
            .selected_risks
            .iter()
            .filter(|risk| !form.risk_response.contains_key(*risk))
            .map(|risk| {
                (
                    risk.clone(),
                    ResponsePlan {
                        strategy: form.proposed_strategy(risk),
                    },
                )
            })
            .collect();
        form.risk_response.extend(proposals);
        Ok(())
    }
}

/// Step 7: totals for the read-only review
pub struct ReviewSummaryBuilder;

impl StepInitializer for ReviewSummaryBuilder {
    fn name(&self) -> &'static str {
        "review-summary"
    }

    fn initialize(&self, ctx: StepContext<'_>) -> Result<()> {
        let summary = ReviewSummary::from_form(ctx.form);
        tracing::debug!(
            process = %ctx.state.metadata.process_name,
            risks = summary.risks_selected,
            controls = summary.controls_mapped,
            "Review summary built"
        );
        ctx.form.review = Some(summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{EffectivenessRating, ResponseStrategy};

    fn run(hook: &dyn StepInitializer, step: Step, form: &mut FormDraft) -> Result<()> {
        let state = AssessmentState::default();
        hook.initialize(StepContext {
            step,
            form,
            state: &state,
        })
    }

    #[test]
    fn test_demo_table_covers_steps_two_to_seven() {
        let hooks = StepHooks::demo();
        assert_eq!(hooks.len(), 6);
        assert!(!hooks.contains(Step::RiskReview));
        for step in &Step::all()[1..] {
            assert!(hooks.contains(*step), "missing hook for {step}");
        }
    }

    #[test]
    fn test_inherent_cards_use_baselines_and_keep_edits() {
        let mut form = FormDraft::default();
        form.toggle_risk("system-failure");
        form.toggle_risk("sanctions-screening");
        form.risk_assessments
            .insert("sanctions-screening".to_string(), InherentRating::new(1, 1));
        form.risk_assessments
            .insert("dropped".to_string(), InherentRating::new(5, 5));

        run(&InherentScoringCards, Step::InherentRisk, &mut form).unwrap();

        assert_eq!(form.risk_assessments["system-failure"], InherentRating::new(3, 4));
        assert_eq!(form.risk_assessments["sanctions-screening"], InherentRating::new(1, 1));
        assert!(!form.risk_assessments.contains_key("dropped"));
    }

    #[test]
    fn test_inherent_cards_reject_unknown_risk() {
        let mut form = FormDraft::default();
        form.toggle_risk("not-a-risk");
        let err = run(&InherentScoringCards, Step::InherentRisk, &mut form).unwrap_err();
        assert!(err.to_string().contains("not-a-risk"));
    }

    #[test]
    fn test_controls_then_ratings_then_residual_then_response() {
        let mut form = FormDraft::default();
        form.toggle_risk("unauthorized-transfer");

        run(&InherentScoringCards, Step::InherentRisk, &mut form).unwrap();
        run(&SuggestedControls, Step::ControlMapping, &mut form).unwrap();
        assert_eq!(
            form.control_mappings["unauthorized-transfer"].controls,
            vec!["ctl-dual-approval".to_string(), "ctl-callback".to_string()]
        );

        run(&EffectivenessRatings, Step::ControlEffectiveness, &mut form).unwrap();
        assert_eq!(form.control_effectiveness.len(), 2);
        assert!(form
            .control_effectiveness
            .values()
            .all(|r| *r == EffectivenessRating::NotTested));

        form.control_effectiveness
            .insert("ctl-dual-approval".to_string(), EffectivenessRating::Effective);
        form.control_effectiveness
            .insert("ctl-callback".to_string(), EffectivenessRating::Effective);
        run(&ResidualScores, Step::ResidualRisk, &mut form).unwrap();
        let record = form.residual_risk["unauthorized-transfer"];
        assert_eq!(record.inherent_score, 15);
        assert_eq!(record.residual_score, 8);

        run(&ResponseProposals, Step::RiskResponse, &mut form).unwrap();
        assert_eq!(
            form.risk_response["unauthorized-transfer"].strategy,
            ResponseStrategy::Accept
        );

        run(&ReviewSummaryBuilder, Step::ReviewSubmit, &mut form).unwrap();
        let review = form.review.unwrap();
        assert_eq!(review.risks_selected, 1);
        assert_eq!(review.controls_effective, 2);
    }

    #[test]
    fn test_response_proposals_keep_user_choice() {
        let mut form = FormDraft::default();
        form.toggle_risk("system-failure");
        form.risk_response.insert(
            "system-failure".to_string(),
            ResponsePlan {
                strategy: ResponseStrategy::Avoid,
            },
        );
        run(&ResponseProposals, Step::RiskResponse, &mut form).unwrap();
        assert_eq!(
            form.risk_response["system-failure"].strategy,
            ResponseStrategy::Avoid
        );
    }
}
