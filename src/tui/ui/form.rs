//! Symptom intake form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::Snapshot;
use crate::domain::{FieldKind, FieldName, FormState};
use crate::tui::styles::ClinicTheme;

use super::{render_header, ServiceStatus};

/// Cursor position in the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormCursor {
    pub selected: usize,
}

impl FormCursor {
    #[must_use]
    pub fn field(&self) -> FieldName {
        FieldName::ALL[self.selected]
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % FieldName::COUNT;
    }

    pub fn prev(&mut self) {
        if self.selected == 0 {
            self.selected = FieldName::COUNT - 1;
        } else {
            self.selected -= 1;
        }
    }
}

/// Next value when cycling a categorical field's choices. `None` for age.
#[must_use]
pub fn cycle_choice(field: FieldName, current: &str, forward: bool) -> Option<&'static str> {
    let choices = field.kind().choices();
    if choices.is_empty() {
        return None;
    }
    let len = choices.len();
    let next = match (choices.iter().position(|c| *c == current), forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    };
    Some(choices[next])
}

/// Render the intake form
pub fn render_form(
    f: &mut Frame,
    area: Rect,
    cursor: FormCursor,
    snapshot: Snapshot<'_>,
    submit_label: &str,
    status: &ServiceStatus,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_header(
        f,
        chunks[0],
        "Évaluation des Symptômes du Diabète",
        "Centre Hospitalier",
        status,
    );
    render_form_fields(f, chunks[1], cursor, snapshot.form);
    render_form_footer(f, chunks[2], snapshot, submit_label);
}

fn render_form_fields(f: &mut Frame, area: Rect, cursor: FormCursor, form: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = FieldName::COUNT / 2;
    render_field_column(f, columns[0], &FieldName::ALL[..mid], form, cursor.field());
    render_field_column(f, columns[1], &FieldName::ALL[mid..], form, cursor.field());
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FieldName],
    form: &FormState,
    selected: FieldName,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = *field == selected;
        let (border_style, title_style) = if is_selected {
            (ClinicTheme::border_focused(), ClinicTheme::focused())
        } else {
            (ClinicTheme::border(), ClinicTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = form.get(*field);
        let mut spans = vec![Span::raw(" ")];
        match field.kind() {
            FieldKind::Age => {
                if value.is_empty() {
                    spans.push(Span::styled("années (0-120)", ClinicTheme::text_muted()));
                } else {
                    spans.push(Span::styled(value, ClinicTheme::text()));
                }
                if is_selected {
                    spans.push(Span::styled("▌", ClinicTheme::cursor()));
                }
            }
            kind => {
                for choice in kind.choices() {
                    let marker = if *choice == value { "(•) " } else { "( ) " };
                    let style = if *choice == value {
                        ClinicTheme::chosen()
                    } else {
                        ClinicTheme::text_secondary()
                    };
                    spans.push(Span::styled(
                        format!("{marker}{}", FieldKind::caption(choice)),
                        style,
                    ));
                    spans.push(Span::raw("  "));
                }
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, snapshot: Snapshot<'_>, submit_label: &str) {
    let content = if let Some(err) = snapshot.state.error_message() {
        Line::from(vec![
            Span::styled("! ", ClinicTheme::danger()),
            Span::styled(err.to_string(), ClinicTheme::danger()),
        ])
    } else {
        let submit_style = if snapshot.state.is_loading() {
            ClinicTheme::warning()
        } else {
            ClinicTheme::key_desc()
        };
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicTheme::key_hint()),
            Span::styled("Naviguer ", ClinicTheme::key_desc()),
            Span::styled("[←→] ", ClinicTheme::key_hint()),
            Span::styled("Choisir ", ClinicTheme::key_desc()),
            Span::styled("[Entrée] ", ClinicTheme::key_hint()),
            Span::styled(format!("{submit_label} "), submit_style),
            Span::styled("[S] ", ClinicTheme::key_hint()),
            Span::styled("Exemple ", ClinicTheme::key_desc()),
            Span::styled("[Échap] ", ClinicTheme::key_hint()),
            Span::styled("Quitter", ClinicTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_wraps() {
        let mut cursor = FormCursor::default();
        cursor.prev();
        assert_eq!(cursor.field(), FieldName::Obesity);
        cursor.next();
        assert_eq!(cursor.field(), FieldName::Age);
    }

    #[test]
    fn test_cycle_choice() {
        assert_eq!(cycle_choice(FieldName::Age, "45", true), None);
        assert_eq!(cycle_choice(FieldName::Gender, "", true), Some("Male"));
        assert_eq!(cycle_choice(FieldName::Gender, "Male", true), Some("Female"));
        assert_eq!(cycle_choice(FieldName::Gender, "Female", true), Some("Male"));
        assert_eq!(cycle_choice(FieldName::Itching, "", false), Some("No"));
        assert_eq!(cycle_choice(FieldName::Itching, "No", false), Some("Yes"));
    }
}
