//! Demo risk and control library for the wire transfer process.

/// Risk taxonomy categories used for filtering the risk review list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Operational,
    Fraud,
    Compliance,
}

impl RiskCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            RiskCategory::Operational => "Operational",
            RiskCategory::Fraud => "Fraud",
            RiskCategory::Compliance => "Compliance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Preventive,
    Detective,
}

impl ControlKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ControlKind::Preventive => "Preventive",
            ControlKind::Detective => "Detective",
        }
    }
}

/// A risk from the library
#[derive(Debug, Clone)]
pub struct RiskDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub category: RiskCategory,
    pub description: &'static str,
    /// Common for this process type and offered as pre-identified
    pub pre_selected: bool,
    pub baseline_likelihood: u8,
    pub baseline_impact: u8,
    /// Short industry insight shown next to the highlighted risk
    pub insight: &'static str,
    pub suggested_controls: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct ControlDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ControlKind,
}

pub static RISKS: &[RiskDefinition] = &[
    RiskDefinition {
        id: "system-failure",
        title: "Payment system outage",
        category: RiskCategory::Operational,
        description: "Wire platform or gateway unavailable during cut-off windows",
        pre_selected: true,
        baseline_likelihood: 3,
        baseline_impact: 4,
        insight: "Most common risk for wire transfers (87% of banks)",
        suggested_controls: &["ctl-failover", "ctl-batch-recon"],
    },
    RiskDefinition {
        id: "unauthorized-transfer",
        title: "Unauthorized wire initiation",
        category: RiskCategory::Fraud,
        description: "Wires released without valid customer or officer authorization",
        pre_selected: true,
        baseline_likelihood: 3,
        baseline_impact: 5,
        insight: "Increased 35% industry-wide in 2024",
        suggested_controls: &["ctl-dual-approval", "ctl-callback"],
    },
    RiskDefinition {
        id: "sanctions-screening",
        title: "Sanctions screening gap",
        category: RiskCategory::Compliance,
        description: "Beneficiaries not screened against current sanctions lists",
        pre_selected: true,
        baseline_likelihood: 2,
        baseline_impact: 5,
        insight: "New SWIFT regulations in effect",
        suggested_controls: &["ctl-ofac-screen"],
    },
    RiskDefinition {
        id: "business-email-compromise",
        title: "Business email compromise",
        category: RiskCategory::Fraud,
        description: "Spoofed instructions change beneficiary account details",
        pre_selected: false,
        baseline_likelihood: 3,
        baseline_impact: 4,
        insight: "Emerging threat - 3 incidents at peer banks",
        suggested_controls: &["ctl-callback", "ctl-user-training"],
    },
    RiskDefinition {
        id: "instant-payment-settlement",
        title: "Instant payment settlement error",
        category: RiskCategory::Operational,
        description: "Real-time rail settlement breaks reconciliation assumptions",
        pre_selected: false,
        baseline_likelihood: 2,
        baseline_impact: 3,
        insight: "Related to FedNow implementation",
        suggested_controls: &["ctl-batch-recon", "ctl-limit-monitor"],
    },
];

pub static CONTROLS: &[ControlDefinition] = &[
    ControlDefinition {
        id: "ctl-dual-approval",
        name: "Dual authorization above threshold",
        kind: ControlKind::Preventive,
    },
    ControlDefinition {
        id: "ctl-callback",
        name: "Call-back verification of beneficiary changes",
        kind: ControlKind::Preventive,
    },
    ControlDefinition {
        id: "ctl-ofac-screen",
        name: "Real-time sanctions screening",
        kind: ControlKind::Preventive,
    },
    ControlDefinition {
        id: "ctl-failover",
        name: "Payment gateway failover",
        kind: ControlKind::Preventive,
    },
    ControlDefinition {
        id: "ctl-batch-recon",
        name: "End-of-day wire reconciliation",
        kind: ControlKind::Detective,
    },
    ControlDefinition {
        id: "ctl-limit-monitor",
        name: "Velocity and limit monitoring",
        kind: ControlKind::Detective,
    },
    ControlDefinition {
        id: "ctl-user-training",
        name: "Phishing awareness training",
        kind: ControlKind::Preventive,
    },
];

pub fn risk(id: &str) -> Option<&'static RiskDefinition> {
    RISKS.iter().find(|r| r.id == id)
}

pub fn control(id: &str) -> Option<&'static ControlDefinition> {
    CONTROLS.iter().find(|c| c.id == id)
}

/// Title for a risk id, falling back to the id for risks outside the library
pub fn risk_title(id: &str) -> &str {
    risk(id).map_or(id, |r| r.title)
}

pub fn control_name(id: &str) -> &str {
    control(id).map_or(id, |c| c.name)
}

pub fn pre_selected_risks() -> impl Iterator<Item = &'static RiskDefinition> {
    RISKS.iter().filter(|r| r.pre_selected)
}

/// Risks visible in the review list, optionally restricted to one category
pub fn risks_in(filter: Option<RiskCategory>) -> Vec<&'static RiskDefinition> {
    RISKS
        .iter()
        .filter(|r| filter.map_or(true, |c| r.category == c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::SEED_RISK;

    #[test]
    fn test_seed_risk_is_in_library() {
        let seed = risk(SEED_RISK).unwrap();
        assert!(seed.pre_selected);
        assert_eq!(seed.category, RiskCategory::Operational);
    }

    #[test]
    fn test_suggested_controls_exist() {
        for risk in RISKS {
            for control_id in risk.suggested_controls {
                assert!(
                    control(control_id).is_some(),
                    "{} suggests unknown control {}",
                    risk.id,
                    control_id
                );
            }
        }
    }

    #[test]
    fn test_category_filter() {
        let operational = risks_in(Some(RiskCategory::Operational));
        assert_eq!(operational.len(), 2);
        assert!(operational
            .iter()
            .all(|r| r.category == RiskCategory::Operational));
        assert_eq!(risks_in(None).len(), RISKS.len());
    }

    #[test]
    fn test_titles_fall_back_to_id() {
        assert_eq!(risk_title("system-failure"), "Payment system outage");
        assert_eq!(risk_title("custom-risk"), "custom-risk");
        assert_eq!(control_name("ctl-unknown"), "ctl-unknown");
    }

    #[test]
    fn test_pre_selected_count() {
        assert_eq!(pre_selected_risks().count(), 3);
    }
}
