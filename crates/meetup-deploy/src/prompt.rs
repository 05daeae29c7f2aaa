//! Operator prompts.

use std::borrow::Cow;
#[cfg(any(test, feature = "testing"))]
use std::collections::VecDeque;

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, Config, DefaultEditor, Editor, Helper};

#[cfg(any(test, feature = "testing"))]
use crate::DeployError;
use crate::Result;

/// Asks the operator for values.
pub trait Prompter {
    /// Reads a line, pre-filled with `default`.
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    /// Reads a line without echoing it.
    fn password(&mut self, message: &str) -> Result<String>;

    /// Asks a yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.prompt(&format!("{} {} ", message, hint), None)?;
        Ok(parse_yes_no(&answer).unwrap_or(default))
    }
}

/// `Some(true)` for y/yes, `Some(false)` for n/no, `None` otherwise.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Renders every typed character as '*'.
struct MaskingHelper;

impl Completer for MaskingHelper {
    type Candidate = String;
}

impl Hinter for MaskingHelper {
    type Hint = String;
}

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for MaskingHelper {}
impl Helper for MaskingHelper {}

/// Terminal prompts backed by rustyline.
pub struct RustylinePrompter {
    editor: DefaultEditor,
    masked: Editor<MaskingHelper, DefaultHistory>,
}

impl RustylinePrompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        let config = Config::builder()
            .auto_add_history(false)
            .color_mode(ColorMode::Forced)
            .build();
        let mut masked = Editor::with_config(config)?;
        masked.set_helper(Some(MaskingHelper));

        Ok(Self { editor, masked })
    }
}

impl Prompter for RustylinePrompter {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let line = match default {
            Some(initial) => self.editor.readline_with_initial(message, (initial, ""))?,
            None => self.editor.readline(message)?,
        };
        Ok(line.trim().to_string())
    }

    fn password(&mut self, message: &str) -> Result<String> {
        Ok(self.masked.readline(message)?)
    }
}

/// Answers prompts from a fixed list.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

#[cfg(any(test, feature = "testing"))]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompt messages shown so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next(&mut self, message: &str) -> Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or(DeployError::Aborted)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(message)?;
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        self.next(message)
    }
}
