use crate::APP_PREFIX;
use serde::Serialize;

pub(crate) fn app_url(value: &str) -> String {
    [APP_PREFIX, value.trim_start_matches('/')].join("")
}

/// A minijinja template filter for displaying an optional number. Missing values
/// are rendered as an empty string. Without a precision, the shortest
/// representation that round-trips is used.
pub(crate) fn format_number(value: Option<f64>, precision: Option<usize>) -> String {
    match (value, precision) {
        (None, _) => String::new(),
        (Some(v), Some(precision)) => format!("{v:.precision$}"),
        (Some(v), None) => v.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) enum FlashMessageKind {
    Success,
    Warning,
    Info,
    Error,
}

#[derive(Debug, Serialize)]
pub(crate) struct FlashMessage {
    pub kind: FlashMessageKind,
    pub msg: String,
}

impl FlashMessage {
    pub(crate) fn new<S: Into<String>>(kind: FlashMessageKind, msg: S) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }
}
