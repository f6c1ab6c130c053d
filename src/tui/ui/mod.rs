//! UI module: View components for the TUI.

pub mod form;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{PredictionError, ServiceHealth};
use crate::tui::styles::ClinicTheme;

/// Prediction service status, as seen at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    #[default]
    Unknown,
    Available { model: Option<String> },
    Unavailable(String),
}

impl ServiceStatus {
    #[must_use]
    pub fn from_health(health: Result<ServiceHealth, PredictionError>) -> Self {
        match health {
            Ok(h) if h.is_healthy() => Self::Available {
                model: h.model_type().map(str::to_string),
            },
            Ok(h) => Self::Unavailable(h.message.unwrap_or(h.status)),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    fn line(&self) -> Line<'_> {
        match self {
            Self::Unknown => Line::from(Span::styled(
                "Service : état inconnu",
                ClinicTheme::text_muted(),
            )),
            Self::Available { model } => Line::from(vec![
                Span::styled("● ", ClinicTheme::success()),
                Span::styled("Service disponible", ClinicTheme::text_secondary()),
                Span::styled(
                    model.as_deref().map(|m| format!(" ({m})")).unwrap_or_default(),
                    ClinicTheme::text_muted(),
                ),
            ]),
            Self::Unavailable(reason) => Line::from(vec![
                Span::styled("● ", ClinicTheme::danger()),
                Span::styled("Service indisponible : ", ClinicTheme::text_secondary()),
                Span::styled(reason.as_str(), ClinicTheme::text_muted()),
            ]),
        }
    }
}

/// Screen header: title, subtitle, and the service status on the right.
pub fn render_header(f: &mut Frame, area: Rect, title: &str, subtitle: &str, status: &ServiceStatus) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(ClinicTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicTheme::text()),
        Span::styled(title.to_string(), ClinicTheme::title()),
        Span::styled(" │ ", ClinicTheme::text_muted()),
        Span::styled(subtitle.to_string(), ClinicTheme::text_secondary()),
    ]));
    f.render_widget(header, inner);

    let status = Paragraph::new(status.line()).alignment(ratatui::layout::Alignment::Right);
    f.render_widget(status, inner);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "AVERTISSEMENT : cette évaluation est indicative et ne remplace pas un avis médical professionnel.",
        ClinicTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ClinicTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_health() {
        let healthy = ServiceHealth {
            status: "healthy".to_string(),
            message: None,
            model_info: Some(serde_json::json!({"model_type": "RandomForestClassifier"})),
        };
        assert_eq!(
            ServiceStatus::from_health(Ok(healthy)),
            ServiceStatus::Available {
                model: Some("RandomForestClassifier".to_string())
            }
        );

        assert_eq!(
            ServiceStatus::from_health(Err(PredictionError::Status(503))),
            ServiceStatus::Unavailable("Erreur HTTP: 503".to_string())
        );
    }
}
