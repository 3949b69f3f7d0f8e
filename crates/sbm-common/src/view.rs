//! View state for the console.
//!
//! Each builder turns a record or error into the values a presentation
//! layer needs: field text, text-area heights and visibility flags. Nothing
//! here performs I/O.

use crate::error::ApiError;
use crate::models::{BootConfig, Machine, Variable};

/// Extra rows given to editable text areas below their content.
pub const EDITOR_PADDING_ROWS: usize = 5;
/// Extra rows given to the error dialog below the message.
pub const DIALOG_PADDING_ROWS: usize = 3;

/// Number of lines in `text`, treating `\r\n`, `\r` and `\n` as breaks.
/// An empty string is one (empty) line.
pub fn line_count(text: &str) -> usize {
    let mut count = 1;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                count += 1;
            }
            '\n' => count += 1,
            _ => {}
        }
    }
    count
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfigView {
    pub title: String,
    pub config: String,
    pub rows: usize,
}

impl BootConfigView {
    /// Ordered form fields, as a browser would serialize them.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("title".to_string(), self.title.clone()),
            ("config".to_string(), self.config.clone()),
        ]
    }
}

impl From<BootConfig> for BootConfigView {
    fn from(bc: BootConfig) -> Self {
        let rows = line_count(&bc.config) + EDITOR_PADDING_ROWS;
        Self {
            title: bc.title,
            config: bc.config,
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableView {
    pub key: String,
    pub value: String,
    pub rows: usize,
}

impl VariableView {
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("key".to_string(), self.key.clone()),
            ("value".to_string(), self.value.clone()),
        ]
    }
}

impl From<Variable> for VariableView {
    fn from(v: Variable) -> Self {
        let rows = line_count(&v.value) + EDITOR_PADDING_ROWS;
        Self {
            key: v.key,
            value: v.value,
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MachineView {
    pub hostname: String,
    pub default_boot: String,
    pub alternate_boot: String,
    pub switch_type: String,
    pub time_between: String,
    /// Only `timed` machines show the interval field.
    pub time_between_visible: bool,
    /// Last boot in UTC, when the server reported a parseable one.
    pub last_boot: Option<String>,
}

impl MachineView {
    /// Fills whichever of the boot fields are still empty with `title`.
    /// Used when a boot config is picked while a machine is being edited.
    pub fn offer_boot_config(&mut self, title: &str) {
        if self.default_boot.is_empty() {
            self.default_boot = title.to_string();
        }
        if self.alternate_boot.is_empty() {
            self.alternate_boot = title.to_string();
        }
    }

    /// Ordered form fields, as a browser would serialize them.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("hostname".to_string(), self.hostname.clone()),
            ("default_boot".to_string(), self.default_boot.clone()),
            ("alternate_boot".to_string(), self.alternate_boot.clone()),
            ("switch_type".to_string(), self.switch_type.clone()),
            ("time_between".to_string(), self.time_between.clone()),
        ]
    }
}

impl From<Machine> for MachineView {
    fn from(m: Machine) -> Self {
        Self {
            time_between_visible: m.switch_type.is_timed(),
            last_boot: m
                .last_boot_at()
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            hostname: m.hostname,
            default_boot: m.default_boot,
            alternate_boot: m.alternate_boot,
            switch_type: m.switch_type.to_string(),
            time_between: m.time_between.to_string(),
        }
    }
}

/// Modal shown when a request fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    /// `"{status}: {status_text}"`, e.g. `404: NOT FOUND`.
    pub title: String,
    pub message: String,
    pub rows: usize,
}

impl ErrorDialog {
    pub fn new(status: u16, status_text: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            title: format!("{}: {}", status, status_text),
            rows: line_count(&message) + DIALOG_PADDING_ROWS,
            message,
        }
    }
}

impl From<&ApiError> for ErrorDialog {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::RequestFailed {
                status,
                status_text,
                message,
            } => ErrorDialog::new(*status, status_text, message.clone()),
            ApiError::Decode { .. } => ErrorDialog::new(200, "unexpected response", err.to_string()),
            ApiError::InvalidUrl(_) | ApiError::InvalidKey(_) => ErrorDialog::new(0, "error", err.to_string()),
        }
    }
}
