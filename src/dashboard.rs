//! Demo first-line dashboard: who is assessing, monthly metrics, and the queue.
//!
//! The data is static; it exists to show the formatting helpers in context.

use std::fmt::Write as _;

use serde::Serialize;

use crate::format::{format_number, format_percentage, RiskLevel};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub name: &'static str,
    pub role: &'static str,
    pub business_unit: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub assessments_this_month: u32,
    pub assessments_completed: u32,
    pub average_time: &'static str,
    pub issues_open: u32,
    pub issues_resolved: u32,
}

impl Metrics {
    /// Completed share of this month's assessments, 0 when none are scheduled
    pub fn completion_rate(&self) -> f64 {
        if self.assessments_this_month == 0 {
            return 0.0;
        }
        f64::from(self.assessments_completed) / f64::from(self.assessments_this_month) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::High => "HIGH",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityTask {
    pub title: &'static str,
    pub process: &'static str,
    pub due: &'static str,
    pub priority: TaskPriority,
    pub estimated_time: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentStatus {
    Pending,
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AssessmentStatus::Pending => "Pending",
            AssessmentStatus::InProgress => "In Progress",
            AssessmentStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCard {
    pub process_name: &'static str,
    pub business_unit: &'static str,
    pub status: AssessmentStatus,
    pub due: &'static str,
    pub risk_score: u32,
    pub control_count: u32,
    pub issue_count: u32,
}

impl AssessmentCard {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub current_user: CurrentUser,
    pub metrics: Metrics,
    pub priority_tasks: Vec<PriorityTask>,
    pub assessments: Vec<AssessmentCard>,
}

impl Dashboard {
    pub fn demo() -> Self {
        Self {
            current_user: CurrentUser {
                name: "Sarah Chen",
                role: "VP Operations",
                business_unit: "Retail Banking",
            },
            metrics: Metrics {
                assessments_this_month: 8,
                assessments_completed: 6,
                average_time: "12 min",
                issues_open: 3,
                issues_resolved: 12,
            },
            priority_tasks: vec![
                PriorityTask {
                    title: "Wire Transfer Assessment",
                    process: "Wire Transfers",
                    due: "Today",
                    priority: TaskPriority::High,
                    estimated_time: "8 min",
                },
                PriorityTask {
                    title: "Loan Origination Review",
                    process: "Commercial Lending",
                    due: "2 days",
                    priority: TaskPriority::Medium,
                    estimated_time: "6 min",
                },
                PriorityTask {
                    title: "ATM Reconciliation Process",
                    process: "Cash Management",
                    due: "3 days",
                    priority: TaskPriority::Medium,
                    estimated_time: "5 min",
                },
            ],
            assessments: vec![
                AssessmentCard {
                    process_name: "Wire Transfers",
                    business_unit: "Retail Banking",
                    status: AssessmentStatus::Pending,
                    due: "Today",
                    risk_score: 18,
                    control_count: 5,
                    issue_count: 2,
                },
                AssessmentCard {
                    process_name: "Commercial Lending",
                    business_unit: "Retail Banking",
                    status: AssessmentStatus::InProgress,
                    due: "Jan 25, 2025",
                    risk_score: 12,
                    control_count: 8,
                    issue_count: 0,
                },
            ],
        }
    }

    pub fn high_priority_count(&self) -> usize {
        self.priority_tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::High)
            .count()
    }

    /// Plain-text rendering for `rcsa dashboard`; `hour` picks the greeting
    pub fn render_text(&self, hour: u32) -> String {
        let mut out = String::new();
        let user = &self.current_user;
        let m = &self.metrics;

        // Writing into a String cannot fail
        let _ = writeln!(out, "{}, {}!", greeting(hour), user.name);
        let _ = writeln!(out, "{} · {}", user.role, user.business_unit);
        let _ = writeln!(out);

        let _ = writeln!(out, "Key Metrics");
        let _ = writeln!(out, "{}", "─".repeat(60));
        let _ = writeln!(
            out,
            "  Assessments this month   {}",
            format_number(i64::from(m.assessments_this_month))
        );
        let _ = writeln!(out, "  Average completion time  {}", m.average_time);
        let _ = writeln!(
            out,
            "  Open issues              {}",
            format_number(i64::from(m.issues_open))
        );
        let _ = writeln!(
            out,
            "  Completion rate          {}",
            format_percentage(m.completion_rate(), 0)
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Priority Tasks ({} high)", self.high_priority_count());
        let _ = writeln!(out, "{}", "─".repeat(60));
        for task in &self.priority_tasks {
            let _ = writeln!(
                out,
                "  [{:<6}] {:<28} {:<20} Due {:<8} {}",
                task.priority.label(),
                task.title,
                task.process,
                task.due,
                task.estimated_time
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "My Assessments");
        let _ = writeln!(out, "{}", "─".repeat(60));
        for card in &self.assessments {
            let _ = writeln!(
                out,
                "  {:<20} {:<12} Due {:<13} Risk {} ({}) · {} controls · {} issues",
                card.process_name,
                card.status.label(),
                card.due,
                card.risk_score,
                card.risk_level().label(),
                card.control_count,
                card.issue_count
            );
        }
        out
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}
