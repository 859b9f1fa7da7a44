//! Seven-step assessment wizard.
//!
//! [`WizardSession`] owns the step cursor, the live [`FormDraft`] and the last
//! persisted [`AssessmentState`](crate::assessment::AssessmentState). Moving
//! forward validates the current step, snapshots the form into the state,
//! saves it and runs the target step's initializer from [`StepHooks`].

mod controller;
mod draft;
mod hooks;
mod step;


pub use controller::{Transition, WizardSession, WizardView, DEFAULT_ANALYSIS_DELAY};
pub use draft::{FormDraft, ReviewSummary};
pub use hooks::{
    EffectivenessRatings, InherentScoringCards, ResidualScores, ResponseProposals,
    ReviewSummaryBuilder, StepContext, StepHooks, StepInitializer, SuggestedControls,
};
pub use step::{Step, StepStatus};
