//! Body of each step pane.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use rcsa_wizard::assessment::{EffectivenessRating, ResponseStrategy};
use rcsa_wizard::catalog;
use rcsa_wizard::format::{format_number, RiskLevel, Tone};
use rcsa_wizard::wizard::{FormDraft, Step, WizardView};

use super::rows::Row;

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Danger => Color::Red,
        Tone::Warning => Color::Yellow,
        Tone::Info => Color::Cyan,
        Tone::Success => Color::Green,
    }
}

fn level_span(score: u8) -> Span<'static> {
    let level = RiskLevel::from_score(u32::from(score));
    Span::styled(
        format!("{:>2} {:<8}", score, level.label()),
        Style::default().fg(tone_color(level.tone())),
    )
}

fn marker(selected: bool) -> Span<'static> {
    if selected {
        Span::styled("▶ ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("  ")
    }
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn muted(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

/// Lines for the pane of `view.step`, with `cursor` highlighting one of `rows`
pub fn pane_lines(view: &WizardView, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let form = &view.form;
    match view.step {
        Step::RiskReview => risk_review(form, rows, cursor),
        Step::InherentRisk => inherent_risk(form, rows, cursor),
        Step::ControlMapping => control_mapping(form, rows, cursor),
        Step::ControlEffectiveness => control_effectiveness(form, rows, cursor),
        Step::ResidualRisk => residual_risk(form, rows, cursor),
        Step::RiskResponse => risk_response(form, rows, cursor),
        Step::ReviewSubmit => review(view),
    }
}

fn risk_review(form: &FormDraft, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let filter = match form.category_filter {
        Some(category) => format!("Showing {} only", category.display_name()),
        None => "Showing all categories".to_string(),
    };
    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("{} selected  ", form.selected_risks.len())),
            muted(filter),
        ]),
        Line::from(""),
    ];

    for (i, row) in rows.iter().enumerate() {
        let Row::Risk(id) = row else { continue };
        let Some(def) = catalog::risk(id) else { continue };
        let checked = if form.is_selected(id) { "[x]" } else { "[ ]" };
        let tag = if def.pre_selected {
            Span::styled(" Pre-identified", Style::default().fg(Color::Blue))
        } else {
            Span::styled(" AI Suggested", Style::default().fg(Color::Magenta))
        };
        lines.push(Line::from(vec![
            marker(i == cursor),
            Span::styled(format!("{checked} {}", def.title), row_style(i == cursor)),
            muted(format!("  {}", def.category.display_name())),
            tag,
        ]));
        if i == cursor {
            lines.push(Line::from(vec![Span::raw("      "), muted(def.description)]));
            lines.push(Line::from(vec![
                Span::raw("      "),
                Span::styled(def.insight, Style::default().fg(Color::Cyan)),
            ]));
        }
    }
    lines
}

fn inherent_risk(form: &FormDraft, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(muted("Likelihood x Impact = Risk Score (1-5 each)")),
        Line::from(""),
    ];
    for (i, row) in rows.iter().enumerate() {
        let Row::Risk(id) = row else { continue };
        let mut spans = vec![
            marker(i == cursor),
            Span::styled(
                format!("{:<36}", catalog::risk_title(id)),
                row_style(i == cursor),
            ),
        ];
        match form.risk_assessments.get(id) {
            Some(rating) => {
                spans.push(Span::raw(format!(
                    "L {}  I {}  = ",
                    rating.likelihood, rating.impact
                )));
                spans.push(level_span(rating.score()));
            }
            None => spans.push(muted("not scored")),
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn control_mapping(form: &FormDraft, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current_risk: Option<&str> = None;
    for (i, row) in rows.iter().enumerate() {
        let Row::Mapping { risk, control } = row else {
            continue;
        };
        if current_risk != Some(risk.as_str()) {
            if current_risk.is_some() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                catalog::risk_title(risk).to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            current_risk = Some(risk.as_str());
        }

        let mapped = form
            .control_mappings
            .get(risk)
            .is_some_and(|m| m.contains(control));
        let suggested = catalog::risk(risk)
            .is_some_and(|r| r.suggested_controls.contains(&control.as_str()));
        let kind = catalog::control(control)
            .map(|c| c.kind.display_name())
            .unwrap_or_default();

        let mut spans = vec![
            marker(i == cursor),
            Span::styled(
                format!(
                    "{} {:<34}",
                    if mapped { "[x]" } else { "[ ]" },
                    catalog::control_name(control)
                ),
                row_style(i == cursor),
            ),
            muted(kind),
        ];
        if suggested {
            spans.push(Span::styled("  AI match", Style::default().fg(Color::Magenta)));
        }
        lines.push(Line::from(spans));
    }
    if lines.is_empty() {
        lines.push(Line::from(muted("No risks selected")));
    }
    lines
}

fn effectiveness_color(rating: EffectivenessRating) -> Color {
    match rating {
        EffectivenessRating::Effective => Color::Green,
        EffectivenessRating::PartiallyEffective => Color::Yellow,
        EffectivenessRating::Ineffective => Color::Red,
        EffectivenessRating::NotTested => Color::DarkGray,
    }
}

fn control_effectiveness(form: &FormDraft, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(muted("Rate each mapped control (Space cycles)")),
        Line::from(""),
    ];
    for (i, row) in rows.iter().enumerate() {
        let Row::Control(id) = row else { continue };
        let rating = form.control_effectiveness.get(id).copied().unwrap_or_default();
        lines.push(Line::from(vec![
            marker(i == cursor),
            Span::styled(
                format!("{:<38}", catalog::control_name(id)),
                row_style(i == cursor),
            ),
            Span::styled(
                rating.label(),
                Style::default().fg(effectiveness_color(rating)),
            ),
        ]));
    }
    if rows.is_empty() {
        lines.push(Line::from(muted("No controls mapped")));
    }
    lines
}

fn residual_risk(form: &FormDraft, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(muted("Inherent score reduced by control effectiveness")),
        Line::from(""),
    ];
    for (i, row) in rows.iter().enumerate() {
        let Row::Risk(id) = row else { continue };
        let mut spans = vec![
            marker(i == cursor),
            Span::styled(
                format!("{:<36}", catalog::risk_title(id)),
                row_style(i == cursor),
            ),
        ];
        match form.residual_risk.get(id) {
            Some(record) => {
                spans.push(level_span(record.inherent_score));
                spans.push(Span::raw(" → "));
                spans.push(level_span(record.residual_score));
            }
            None => spans.push(muted("not scored")),
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn strategy_color(strategy: ResponseStrategy) -> Color {
    match strategy {
        ResponseStrategy::Accept => Color::Green,
        ResponseStrategy::Mitigate => Color::Cyan,
        ResponseStrategy::Transfer => Color::Blue,
        ResponseStrategy::Avoid => Color::Red,
    }
}

fn risk_response(form: &FormDraft, rows: &[Row], cursor: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(muted("Accept / Mitigate / Transfer / Avoid (Space cycles)")),
        Line::from(""),
    ];
    for (i, row) in rows.iter().enumerate() {
        let Row::Risk(id) = row else { continue };
        let strategy = form
            .risk_response
            .get(id)
            .map(|p| p.strategy)
            .unwrap_or_default();
        lines.push(Line::from(vec![
            marker(i == cursor),
            Span::styled(
                format!("{:<36}", catalog::risk_title(id)),
                row_style(i == cursor),
            ),
            Span::styled(
                strategy.label(),
                Style::default().fg(strategy_color(strategy)),
            ),
        ]));
    }
    lines
}

fn review(view: &WizardView) -> Vec<Line<'static>> {
    let meta = &view.state.metadata;
    let mut lines = vec![
        Line::from(vec![
            muted("Process: "),
            Span::raw(meta.process_name.clone()),
            muted("   Period: "),
            Span::raw(meta.assessment_period.clone()),
        ]),
        Line::from(""),
    ];

    let Some(summary) = &view.form.review else {
        lines.push(Line::from(muted("Summary not built yet")));
        return lines;
    };

    let stat = |label: &str, value: usize| {
        Line::from(vec![
            Span::raw(format!("  {label:<28}")),
            Span::styled(
                format_number(value as i64),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    };
    lines.push(stat("Risks selected", summary.risks_selected));
    lines.push(stat("Risks scored", summary.risks_scored));
    lines.push(stat("High or critical inherent", summary.high_inherent));
    lines.push(stat("Controls mapped", summary.controls_mapped));
    lines.push(stat("Controls effective", summary.controls_effective));

    if let Some((risk, score)) = &summary.highest_residual {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<28}", "Highest residual")),
            Span::raw(format!("{} ", catalog::risk_title(risk))),
            level_span(*score),
        ]));
    }

    if !summary.strategies.is_empty() {
        let breakdown = summary
            .strategies
            .iter()
            .map(|(label, count)| format!("{label} {count}"))
            .collect::<Vec<_>>()
            .join(" · ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<28}", "Responses")),
            Span::raw(breakdown),
        ]));
    }

    lines.push(Line::from(""));
    if view.state.is_submitted() {
        lines.push(Line::from(Span::styled(
            "Submitted",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(muted("Press Enter to submit the assessment")));
    }
    lines
}
