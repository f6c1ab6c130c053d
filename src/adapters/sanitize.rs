//! Log redaction for patient identifiers.
//!
//! Form values are never passed to logging calls; this writer is the
//! fallback for identifiers that slip through in formatted text, such as a
//! patient id echoed by the service or an address in an error chain.
//!
//! Redacted:
//! - `patient_id` key/value pairs
//! - UUIDs
//! - Email addresses and phone numbers
//! - Bearer tokens

use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

/// Default cap on bytes scanned per call. Override with
/// `GLYCOSCREEN_SANITIZE_MAX_BYTES`.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 8 * 1024;

struct Redaction {
    regex: Regex,
    replacement: &'static str,
}

static REDACTIONS: OnceLock<Vec<Redaction>> = OnceLock::new();

fn redactions() -> &'static [Redaction] {
    REDACTIONS.get_or_init(|| {
        let rules: [(&str, &str); 5] = [
            (
                r#"(?i)("?patient_id"?\s*[:=]\s*"?)[^",}\s]+"#,
                "${1}[REDACTED-PATIENT-ID]",
            ),
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-UUID]",
            ),
            (
                r"(?i)\b[a-z0-9._%+-]{1,64}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+33\s?|0)[1-9](?:[\s.-]?\d{2}){4}\b",
                "[REDACTED-PHONE]",
            ),
            (r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]{8,}=*", "Bearer [REDACTED-TOKEN]"),
        ];

        rules
            .into_iter()
            .map(|(pattern, replacement)| Redaction {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect()
    })
}

fn max_sanitize_bytes() -> usize {
    std::env::var("GLYCOSCREEN_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace identifiers in `input` with redaction markers.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    // The line terminator survives truncation so records stay one per line.
    let (body, newline) = match input.strip_suffix('\n') {
        Some(body) => (body, "\n"),
        None => (input, ""),
    };
    let (prefix, truncated) = truncate_to_char_boundary(body, max_bytes);

    let mut result = prefix.to_string();
    for redaction in redactions() {
        if redaction.regex.is_match(&result) {
            result = redaction
                .regex
                .replace_all(&result, redaction.replacement)
                .into_owned();
        }
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result.push_str(newline);
    result
}

/// `MakeWriter` wrapper that sanitizes each formatted log line before it
/// reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer forever.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_patient_id() {
        let sanitized = sanitize(r#"response: {"patient_id": "P-2024-0042", "prediction": 1}"#);
        assert!(sanitized.contains("[REDACTED-PATIENT-ID]"));
        assert!(!sanitized.contains("P-2024-0042"));
        assert!(sanitized.contains(r#""prediction": 1"#));
    }

    #[test]
    fn test_sanitize_uuid_and_email() {
        let sanitized =
            sanitize("record 550e8400-e29b-41d4-a716-446655440000 sent by dr.martin@chfg.fr");
        assert!(sanitized.contains("[REDACTED-UUID]"));
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(!sanitized.contains("550e8400"));
    }

    #[test]
    fn test_sanitize_phone_and_token() {
        let sanitized = sanitize("call 06 12 34 56 78, auth Bearer abcdefghijkl12345");
        assert!(sanitized.contains("[REDACTED-PHONE]"));
        assert!(sanitized.contains("Bearer [REDACTED-TOKEN]"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let line = "Prediction received: prediction=0, confidence=92.0%, risk=Faible";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("é".repeat(10).as_str(), 5);
        assert!(sanitized.ends_with("[TRUNCATED]"));
        assert!(sanitized.starts_with("éé"));
    }

    #[test]
    fn test_truncated_line_keeps_its_newline() {
        let long = format!("{}\n", "a".repeat(9000));
        let sanitized = sanitize_with_limit(&long, 8 * 1024);
        assert!(sanitized.ends_with("a [TRUNCATED]\n"));

        let mut writer = SanitizingWriter::new(Vec::new());
        writer.write_all(long.as_bytes()).expect("write");
        writer.write_all(b"next line\n").expect("write");
        writer.flush().expect("flush");

        let out = String::from_utf8(std::mem::take(&mut writer.inner)).expect("utf8");
        assert!(out.ends_with(" [TRUNCATED]\nnext line\n"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut writer = SanitizingWriter::new(Vec::new());
        writer
            .write_all(b"patient_id=ABC123\nsecond line")
            .expect("write");
        writer.flush().expect("flush");

        let out = String::from_utf8(std::mem::take(&mut writer.inner)).expect("utf8");
        assert_eq!(out, "patient_id=[REDACTED-PATIENT-ID]\nsecond line");
    }
}
