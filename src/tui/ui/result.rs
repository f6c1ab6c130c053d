//! Assessment result screen.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::view::{AssessmentView, ProbabilityBar};
use crate::tui::styles::ClinicTheme;

use super::{render_header, ServiceStatus};

/// Render a successful assessment
pub fn render_result(
    f: &mut Frame,
    area: Rect,
    view: &AssessmentView,
    completed_at: Option<DateTime<Utc>>,
    status: &ServiceStatus,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(
        f,
        chunks[0],
        "Résultat de l'Évaluation",
        "Centre Hospitalier",
        status,
    );

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .margin(1)
        .split(chunks[1]);

    render_summary(f, content[0], view, completed_at);
    render_advisory(f, content[1], view);
    render_result_footer(f, chunks[2]);
}

fn render_summary(
    f: &mut Frame,
    area: Rect,
    view: &AssessmentView,
    completed_at: Option<DateTime<Utc>>,
) {
    let block = Block::default()
        .title(Span::styled(" Prédiction ", ClinicTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Label and risk level
            Constraint::Length(2), // Confidence
            Constraint::Length(3), // No diabetes
            Constraint::Length(3), // Diabetes
            Constraint::Min(0),    // Patient id and timestamp
        ])
        .margin(1)
        .split(inner);

    let risk_style = ClinicTheme::risk_level(&view.risk_level);
    let headline = Paragraph::new(vec![
        Line::from(Span::styled(
            view.prediction_label.as_str(),
            ClinicTheme::advisory(view.advisory).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Niveau de risque : ", ClinicTheme::text_secondary()),
            Span::styled(view.risk_level.as_str(), risk_style.add_modifier(Modifier::BOLD)),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let confidence = Paragraph::new(Line::from(vec![
        Span::styled("Confiance : ", ClinicTheme::text_secondary()),
        Span::styled(view.confidence.as_str(), ClinicTheme::text()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(confidence, chunks[1]);

    f.render_widget(
        probability_gauge(" Pas de diabète ", &view.no_diabetes, ClinicTheme::success()),
        chunks[2],
    );
    f.render_widget(
        probability_gauge(" Diabète ", &view.diabetes, ClinicTheme::danger()),
        chunks[3],
    );

    let mut details = Vec::new();
    if let Some(id) = &view.patient_id {
        details.push(Line::from(vec![
            Span::styled("Patient : ", ClinicTheme::text_secondary()),
            Span::styled(id.as_str(), ClinicTheme::text()),
        ]));
    }
    if let Some(at) = completed_at {
        details.push(Line::from(Span::styled(
            format!("Évalué le {}", at.with_timezone(&Local).format("%d/%m/%Y à %H:%M")),
            ClinicTheme::text_muted(),
        )));
    }
    f.render_widget(Paragraph::new(details), chunks[4]);
}

/// The gauge widget only accepts ratios in `0..=1`; the label keeps the raw value.
fn probability_gauge<'a>(
    title: &'a str,
    bar: &'a ProbabilityBar,
    style: ratatui::style::Style,
) -> Gauge<'a> {
    Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(title, ClinicTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(ClinicTheme::border()),
        )
        .gauge_style(style)
        .ratio(gauge_ratio(bar.width))
        .label(bar.label.as_str())
}

fn gauge_ratio(width: f64) -> f64 {
    if width.is_nan() {
        return 0.0;
    }
    (width / 100.0).clamp(0.0, 1.0)
}

fn render_advisory(f: &mut Frame, area: Rect, view: &AssessmentView) {
    let style = ClinicTheme::advisory(view.advisory);
    let text = vec![
        Line::from(Span::styled(
            view.advisory.title(),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(view.advisory.body(), ClinicTheme::text())),
    ];

    let p = Paragraph::new(text)
        .block(
            Block::default()
                .title(Span::styled(" Recommandation ", ClinicTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(style),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[N] ", ClinicTheme::key_hint()),
        Span::styled("Nouvelle évaluation ", ClinicTheme::key_desc()),
        Span::styled("[Entrée/Échap] ", ClinicTheme::key_hint()),
        Span::styled("Retour au formulaire", ClinicTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}
