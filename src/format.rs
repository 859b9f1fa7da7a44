//! Formatting helpers shared by the wizard panes, the dashboard and the CLI.

/// Display tone for a severity, mirrors the notification palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Danger,
    Warning,
    Info,
    Success,
}

/// Severity band for a likelihood × impact score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 20 => RiskLevel::Critical,
            s if s >= 15 => RiskLevel::High,
            s if s >= 10 => RiskLevel::Medium,
            s if s >= 5 => RiskLevel::Low,
            _ => RiskLevel::VeryLow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::VeryLow => "Very Low",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            RiskLevel::Critical => Tone::Danger,
            RiskLevel::High => Tone::Warning,
            RiskLevel::Medium => Tone::Info,
            RiskLevel::Low | RiskLevel::VeryLow => Tone::Success,
        }
    }
}

/// Format an integer with thousands separators (1234567 -> "1,234,567")
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a percentage with a fixed number of decimals (75.0, 0 -> "75%")
pub fn format_percentage(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{value}%");
    }
    format!("{value:.decimals$}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(15), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(14), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(10), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(5), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::VeryLow);
    }

    #[test]
    fn test_risk_level_labels_and_tones() {
        assert_eq!(RiskLevel::Critical.label(), "Critical");
        assert_eq!(RiskLevel::Critical.tone(), Tone::Danger);
        assert_eq!(RiskLevel::High.tone(), Tone::Warning);
        assert_eq!(RiskLevel::Medium.tone(), Tone::Info);
        assert_eq!(RiskLevel::Low.tone(), Tone::Success);
        assert_eq!(RiskLevel::VeryLow.label(), "Very Low");
        assert_eq!(RiskLevel::VeryLow.tone(), Tone::Success);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(-45_000), "-45,000");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(75.0, 0), "75%");
        assert_eq!(format_percentage(66.666, 1), "66.7%");
        assert_eq!(format_percentage(0.5, 2), "0.50%");
    }
}
