//! The seven wizard steps and their static configuration.

use crate::assessment::TOTAL_STEPS;
use crate::wizard::FormDraft;

/// Steps in the assessment, numbered 1 through 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Select the risks that apply to the process
    RiskReview = 1,
    /// Score likelihood and impact before controls
    InherentRisk = 2,
    /// Link controls to the selected risks
    ControlMapping = 3,
    /// Rate how well each mapped control works
    ControlEffectiveness = 4,
    /// Inherent score reduced by control effectiveness
    ResidualRisk = 5,
    /// Accept / mitigate / transfer / avoid per risk
    RiskResponse = 6,
    /// Read-only summary and submission
    ReviewSubmit = 7,
}

/// Progress indicator classification of a step relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Future,
}

/// Messages shown while the simulated analysis runs
const ANALYSIS_MESSAGES: &[&str] = &[
    "AI analyzing risk patterns...",
    "Comparing with peer benchmarks...",
    "Calculating effectiveness scores...",
    "Optimizing recommendations...",
];

impl Step {
    pub fn all() -> &'static [Step] {
        &[
            Step::RiskReview,
            Step::InherentRisk,
            Step::ControlMapping,
            Step::ControlEffectiveness,
            Step::ResidualRisk,
            Step::RiskResponse,
            Step::ReviewSubmit,
        ]
    }

    pub fn first() -> Self {
        Step::RiskReview
    }

    pub fn last() -> Self {
        Step::ReviewSubmit
    }

    /// Step for a 1-based number; `None` outside 1..=7
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Step::RiskReview),
            2 => Some(Step::InherentRisk),
            3 => Some(Step::ControlMapping),
            4 => Some(Step::ControlEffectiveness),
            5 => Some(Step::ResidualRisk),
            6 => Some(Step::RiskResponse),
            7 => Some(Step::ReviewSubmit),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::RiskReview => "Risk Review",
            Step::InherentRisk => "Inherent Risk",
            Step::ControlMapping => "Control Mapping",
            Step::ControlEffectiveness => "Control Effectiveness",
            Step::ResidualRisk => "Residual Risk",
            Step::RiskResponse => "Risk Response",
            Step::ReviewSubmit => "Review & Submit",
        }
    }

    /// Validation predicate for leaving this step.
    ///
    /// Only the risk review has a rule today; the rest always pass.
    pub fn validate(self, form: &FormDraft) -> bool {
        match self {
            Step::RiskReview => !form.selected_risks.is_empty(),
            _ => true,
        }
    }

    /// Warning shown when validation blocks the step
    pub fn validation_message(self) -> &'static str {
        match self {
            Step::RiskReview => "Please select at least one risk to assess",
            Step::InherentRisk => "Please complete the inherent risk scoring",
            Step::ControlMapping => "Please map controls to all selected risks",
            Step::ControlEffectiveness => "Please assess the effectiveness of all controls",
            Step::ResidualRisk => "Please complete the residual risk assessment",
            Step::RiskResponse => "Please select risk response strategies",
            Step::ReviewSubmit => "Please review all sections before submitting",
        }
    }

    /// Whether leaving this step plays the simulated analysis
    pub fn runs_analysis(self) -> bool {
        matches!(
            self,
            Step::InherentRisk | Step::ControlEffectiveness | Step::ResidualRisk
        )
    }

    pub fn analysis_message(self) -> &'static str {
        ANALYSIS_MESSAGES[usize::from(self.number()) % ANALYSIS_MESSAGES.len()]
    }

    pub fn status(self, current: Step) -> StepStatus {
        match self.cmp(&current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Future,
        }
    }

    /// Breadcrumb rule: any earlier step, the current one, or the next one
    pub fn is_reachable_from(self, current: Step) -> bool {
        self <= current || self.number() == current.number() + 1
    }

    pub fn tooltip(self, current: Step) -> String {
        let base = match self {
            Step::RiskReview => "Review and select risks for assessment",
            Step::InherentRisk => "Score inherent risk likelihood and impact",
            Step::ControlMapping => "Map controls to identified risks",
            Step::ControlEffectiveness => "Evaluate control effectiveness",
            Step::ResidualRisk => "Calculate residual risk scores",
            Step::RiskResponse => "Select risk response strategies",
            Step::ReviewSubmit => "Review and submit assessment",
        };
        let suffix = match self.status(current) {
            StepStatus::Completed => " (completed)",
            StepStatus::Current => " (current step)",
            StepStatus::Future if self.is_reachable_from(current) => "",
            StepStatus::Future => " (complete previous steps first)",
        };
        format!("{base}{suffix}")
    }

    /// Contextual help lines (F1)
    pub fn help(self) -> &'static [&'static str] {
        match self {
            Step::RiskReview => &[
                "Select risks that apply to your process. Pre-identified risks are common for this process type.",
                "",
                "Pre-identified: common risks from the risk library",
                "AI Suggested: new risks based on industry trends",
                "",
                "Tip: consider both internal and external risk sources.",
            ],
            Step::InherentRisk => &[
                "Score each risk's inherent likelihood and impact before considering controls.",
                "",
                "Likelihood (1-5): how often might this occur?",
                "Impact (1-5): what would the consequence be?",
                "Score: Likelihood x Impact = Risk Score",
            ],
            Step::ControlMapping => &[
                "Link existing controls to your identified risks.",
                "",
                "AI Matching: suggested controls based on risk type",
                "Types: preventive vs detective controls",
            ],
            _ => &["Contextual help for this step is being developed."],
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.name(), self.number(), TOTAL_STEPS)
    }
}
