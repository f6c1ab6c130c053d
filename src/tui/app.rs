//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Polling the form controller's in-flight request

use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::HttpPredictionClient;
use crate::application::FormController;
use crate::config::ClientConfig;
use crate::domain::{FieldKind, PredictionError, ResultView, ServiceHealth};
use crate::ports::PredictionApi;

use super::ui::{
    form::{cycle_choice, render_form, FormCursor},
    render_disclaimer,
    result::render_result,
    ServiceStatus,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App<A: PredictionApi> {
    screen: Screen,
    should_quit: bool,
    controller: FormController<A>,
    cursor: FormCursor,
    service_status: ServiceStatus,
    /// Startup health check, until it answers
    pending_health: Option<Receiver<Result<ServiceHealth, PredictionError>>>,
}

impl App<HttpPredictionClient> {
    /// Create a new application talking to the configured service.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = HttpPredictionClient::new(config)?;
        Ok(Self::with_dependencies(FormController::new(Arc::new(client))))
    }
}

impl<A: PredictionApi + 'static> App<A> {
    /// Create application with an injected controller.
    pub fn with_dependencies(controller: FormController<A>) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            controller,
            cursor: FormCursor::default(),
            service_status: ServiceStatus::Unknown,
            pending_health: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn controller(&self) -> &FormController<A> {
        &self.controller
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn service_status(&self) -> &ServiceStatus {
        &self.service_status
    }

    /// Ask the service for its health without blocking the UI. The status
    /// stays `Unknown` until [`tick`](Self::tick) sees the answer.
    pub fn start_health_check(&mut self) {
        self.service_status = ServiceStatus::Unknown;
        self.pending_health = Some(self.controller.check_health_in_background());
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        self.start_health_check();

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.tick();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let result_view = self.controller.result_view();
                match (&self.screen, &result_view) {
                    (Screen::Result, ResultView::Assessment(view)) => render_result(
                        f,
                        chunks[0],
                        view,
                        self.controller.completed_at(),
                        &self.service_status,
                    ),
                    _ => render_form(
                        f,
                        chunks[0],
                        self.cursor,
                        self.controller.snapshot(),
                        self.controller.submit_label(),
                        &self.service_status,
                    ),
                }
                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply settled background work: the health check, and the request,
    /// switching to the result screen on success.
    pub fn tick(&mut self) {
        self.poll_health();

        if self.controller.poll()
            && matches!(self.controller.result_view(), ResultView::Assessment(_))
        {
            self.screen = Screen::Result;
        }
    }

    fn poll_health(&mut self) {
        let Some(rx) = self.pending_health.as_ref() else {
            return;
        };

        let status = match rx.try_recv() {
            Ok(health) => ServiceStatus::from_health(health),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                ServiceStatus::Unavailable("vérification interrompue".to_string())
            }
        };

        self.pending_health = None;
        if let ServiceStatus::Unavailable(reason) = &status {
            tracing::warn!("Prediction service unavailable at startup: {}", reason);
        }
        self.service_status = status;
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        let field = self.cursor.field();
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.cursor.prev();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.cursor.next();
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let forward = key != KeyCode::Left;
                if let Some(next) = cycle_choice(field, self.controller.field(field), forward) {
                    self.controller.set_field(field, next);
                }
            }
            KeyCode::Enter => {
                self.controller.submit();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.controller.load_sample();
            }
            KeyCode::Char(c) => self.input_char(c),
            KeyCode::Backspace => {
                if field.kind() == FieldKind::Age {
                    let mut value = self.controller.field(field).to_string();
                    value.pop();
                    self.controller.set_field(field, value);
                }
            }
            KeyCode::Delete => {
                self.controller.set_field(field, "");
            }
            _ => {}
        }
    }

    /// Digits append to the age; letters pick a categorical answer directly.
    fn input_char(&mut self, c: char) {
        let field = self.cursor.field();
        match field.kind() {
            FieldKind::Age => {
                let current = self.controller.field(field);
                if c.is_ascii_digit() && current.len() < 3 {
                    let value = format!("{current}{c}");
                    self.controller.set_field(field, value);
                }
            }
            FieldKind::Gender => match c.to_ascii_lowercase() {
                'h' | 'm' => self.controller.set_field(field, "Male"),
                'f' => self.controller.set_field(field, "Female"),
                _ => {}
            },
            FieldKind::YesNo => match c.to_ascii_lowercase() {
                'o' | 'y' => self.controller.set_field(field, "Yes"),
                'n' => self.controller.set_field(field, "No"),
                _ => {}
            },
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.controller.reset();
                self.cursor = FormCursor::default();
                self.screen = Screen::Form;
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.screen = Screen::Form;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FieldName, PredictionError, PredictionResult, Probabilities, RequestPayload,
        ServiceHealth, SubmissionState,
    };

    struct StubApi;

    /// Health answers only after a delay.
    struct SlowHealthApi;

    impl PredictionApi for SlowHealthApi {
        fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, PredictionError> {
            StubApi.predict(payload)
        }

        fn health(&self) -> Result<ServiceHealth, PredictionError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(ServiceHealth {
                status: "healthy".to_string(),
                message: None,
                model_info: None,
            })
        }
    }

    impl PredictionApi for StubApi {
        fn predict(&self, _payload: &RequestPayload) -> Result<PredictionResult, PredictionError> {
            Ok(PredictionResult {
                success: true,
                prediction: 1,
                prediction_label: "Risque de diabète".to_string(),
                risk_level: "Élevé".to_string(),
                confidence: 0.87,
                probabilities: Probabilities {
                    no_diabetes: 0.13,
                    diabetes: 0.87,
                },
                patient_id: None,
            })
        }

        fn health(&self) -> Result<ServiceHealth, PredictionError> {
            Err(PredictionError::Transport("unreachable".to_string()))
        }
    }

    fn app() -> App<StubApi> {
        App::with_dependencies(FormController::new(Arc::new(StubApi)))
    }

    fn settle(app: &mut App<StubApi>) {
        assert!(app.controller.wait(Duration::from_secs(5)));
        // `wait` already applied the outcome; mirror the screen switch `tick` does.
        if matches!(app.controller.result_view(), ResultView::Assessment(_)) {
            app.screen = Screen::Result;
        }
    }

    #[test]
    fn test_age_accepts_digits_only() {
        let mut app = app();
        for c in ['4', 'x', '5', '1', '9'] {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(app.controller.field(FieldName::Age), "451");
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.controller.field(FieldName::Age), "45");
    }

    #[test]
    fn test_letter_shortcuts_and_cycling() {
        let mut app = app();
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(app.controller.field(FieldName::Gender), "Female");

        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('o'), KeyModifiers::NONE);
        assert_eq!(app.controller.field(FieldName::Polyuria), "Yes");
        app.handle_key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.controller.field(FieldName::Polyuria), "No");
        app.handle_key(KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(app.controller.field(FieldName::Polyuria), "");
    }

    #[test]
    fn test_incomplete_submit_stays_on_form() {
        let mut app = app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen(), Screen::Form);
        assert!(matches!(app.controller.state(), SubmissionState::Failure(_)));
    }

    #[test]
    fn test_success_then_new_assessment() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        settle(&mut app);
        assert_eq!(app.screen(), Screen::Result);

        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.screen(), Screen::Form);
        assert_eq!(app.controller.state(), &SubmissionState::Idle);
        assert_eq!(app.controller.field(FieldName::Age), "");
    }

    #[test]
    fn test_return_keeps_result() {
        let mut app = app();
        app.handle_key(KeyCode::Char('S'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        settle(&mut app);

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.screen(), Screen::Form);
        assert!(!app.should_quit());
        assert!(app.controller.state().result().is_some());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());

        let mut app = self::app();
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.should_quit());
    }

    #[test]
    fn test_health_check_does_not_block_startup() {
        let mut app = App::with_dependencies(FormController::new(Arc::new(SlowHealthApi)));
        let started = std::time::Instant::now();
        app.start_health_check();
        app.tick();
        assert!(started.elapsed() < Duration::from_millis(250));
        assert_eq!(app.service_status(), &ServiceStatus::Unknown);

        // Keys are handled while the check is pending.
        app.handle_key(KeyCode::Char('4'), KeyModifiers::NONE);
        assert_eq!(app.controller.field(FieldName::Age), "4");

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while app.service_status() == &ServiceStatus::Unknown
            && std::time::Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(20));
            app.tick();
        }
        assert_eq!(app.service_status(), &ServiceStatus::Available { model: None });
    }

    #[test]
    fn test_failed_health_check_marks_service_unavailable() {
        let mut app = app();
        app.start_health_check();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while app.service_status() == &ServiceStatus::Unknown
            && std::time::Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(10));
            app.tick();
        }
        assert_eq!(
            app.service_status(),
            &ServiceStatus::Unavailable("unreachable".to_string())
        );
    }
}
