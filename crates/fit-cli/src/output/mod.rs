//! Terminal output formatting and utilities.
//!
//! All user-facing text, errors included, goes to stdout through
//! [`OutputHandler`] so that it is formatted consistently and can be captured
//! in tests. Log events stay on stderr.

pub mod colors;
pub mod errors;

use std::cell::RefCell;

use colors::ColorSupport;

enum Sink {
    Terminal,
    #[cfg_attr(not(test), allow(dead_code))]
    Captured(RefCell<Vec<String>>),
}

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: ColorSupport,
    sink: Sink,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
            sink: Sink::Terminal,
        }
    }

    /// Collect lines in memory instead of printing them
    #[cfg(test)]
    pub fn captured() -> Self {
        Self {
            colors: ColorSupport::disabled(),
            sink: Sink::Captured(RefCell::new(Vec::new())),
        }
    }

    /// Lines collected by a captured handler
    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Captured(lines) => lines.borrow().clone(),
        }
    }

    fn emit(&self, line: String) {
        match &self.sink {
            Sink::Terminal => println!("{}", line),
            Sink::Captured(lines) => lines.borrow_mut().push(line),
        }
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        self.emit(message.to_string());
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.emit(self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(format!("{} {}", self.colors.green("✓"), message));
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.emit(format!("{} {}", self.colors.yellow("⚠"), message));
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        self.emit(format!("{} {}", self.colors.red("✗"), message));
    }

    /// Print a multi-line block, such as a formatted error
    pub fn block(&self, text: &str) {
        for line in text.lines() {
            self.emit(line.to_string());
        }
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
