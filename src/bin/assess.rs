//! Headless assessment: submit one form to the prediction service and print
//! the result.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin assess -- <form.json>
//! cargo run --bin assess -- --sample
//! ```
//!
//! The form file is a JSON object keyed by field name (`age`, `gender`,
//! `polyuria`, ...). Exit code is 0 on a successful assessment, 1 when the
//! assessment failed, 2 on bad usage or an unreadable form.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glycoscreen::adapters::sanitize::SanitizingMakeWriter;
use glycoscreen::adapters::HttpPredictionClient;
use glycoscreen::domain::view::{AssessmentView, ProbabilityBar};
use glycoscreen::domain::ResultView;
use glycoscreen::{ClientConfig, FormController, GlycoscreenError};

/// Upper bound on waiting when no request timeout is configured.
const DEFAULT_WAIT: Duration = Duration::from_secs(300);

enum FormSource {
    File(PathBuf),
    Sample,
}

fn usage() -> String {
    "Usage: assess <form.json> | assess --sample".to_string()
}

fn parse_args() -> Result<FormSource, String> {
    let mut source: Option<FormSource> = None;

    for arg in env::args().skip(1) {
        let next = match arg.as_str() {
            "--sample" => FormSource::Sample,
            "-h" | "--help" => return Err(usage()),
            _ if arg.starts_with('-') => return Err(usage()),
            _ => FormSource::File(PathBuf::from(arg)),
        };
        if source.replace(next).is_some() {
            return Err(usage());
        }
    }

    source.ok_or_else(usage)
}

fn load_form(
    controller: &mut FormController<HttpPredictionClient>,
    source: &FormSource,
) -> glycoscreen::Result<()> {
    let path = match source {
        FormSource::Sample => {
            controller.load_sample();
            return Ok(());
        }
        FormSource::File(path) => path,
    };

    let text = fs::read_to_string(path)?;
    let fields: Map<String, Value> = serde_json::from_str(&text)?;
    for (name, value) in fields {
        let value = match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        controller.set_field_by_name(&name, value)?;
    }
    Ok(())
}

fn print_bar(caption: &str, bar: &ProbabilityBar) {
    let filled = (bar.width / 5.0).clamp(0.0, 20.0) as usize;
    println!(
        "  {caption:<16} [{}{}] {}",
        "#".repeat(filled),
        " ".repeat(20 - filled),
        bar.label
    );
}

fn print_assessment(view: &AssessmentView) {
    println!("Prédiction       : {}", view.prediction_label);
    println!("Niveau de risque : {}", view.risk_level);
    println!("Confiance        : {}", view.confidence);
    println!("Probabilités :");
    print_bar("Pas de diabète", &view.no_diabetes);
    print_bar("Diabète", &view.diabetes);
    if let Some(id) = &view.patient_id {
        println!("Patient          : {id}");
    }
    println!();
    println!("{}", view.advisory.title());
    println!("{}", view.advisory.body());
}

/// Returns whether the assessment succeeded.
fn run(source: &FormSource) -> Result<bool, GlycoscreenError> {
    let config = ClientConfig::from_env();
    let wait_budget = config
        .request_timeout
        .map_or(DEFAULT_WAIT, |t| t + Duration::from_secs(5));

    let client = HttpPredictionClient::new(&config)?;
    let mut controller = FormController::new(Arc::new(client));
    load_form(&mut controller, source)?;

    tracing::info!("Submitting to {}", config.predict_url());
    controller.submit();
    if !controller.wait(wait_budget) {
        println!("Délai d'attente dépassé ({}s)", wait_budget.as_secs());
        return Ok(false);
    }

    match controller.result_view() {
        ResultView::Assessment(view) => {
            print_assessment(&view);
            Ok(true)
        }
        ResultView::Error(message) => {
            println!("{message}");
            Ok(false)
        }
        ResultView::Nothing => Ok(false),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(SanitizingMakeWriter::new(std::io::stderr)),
        )
        .init();

    let source = match parse_args() {
        Ok(source) => source,
        Err(usage) => {
            eprintln!("{usage}");
            return ExitCode::from(2);
        }
    };

    match run(&source) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
