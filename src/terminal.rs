//! Interactive [`Prompter`] on top of `dialoguer`, with an `indicatif`
//! spinner while the device is busy.
//!
//! This code makes blocking syscalls.

use std::io;
use std::time::Duration;

use dialoguer::console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::prompt::{Answer, Prompter, SelectQuestion, TextQuestion};

pub struct TerminalPrompter {
    theme: ColorfulTheme,
    term: Term,
    spinner: Option<ProgressBar>,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            term: Term::stderr(),
            spinner: None,
        }
    }

    /// `dialoguer` silently falls back to defaults without a tty; refuse instead.
    pub fn ensure_terminal(&self) -> io::Result<()> {
        if !self.term.is_term() {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "cannot prompt on a non-terminal",
            ));
        }
        Ok(())
    }
}

fn cancelled_on_interrupt<T>(result: dialoguer::Result<T>, f: impl FnOnce(T) -> Answer) -> io::Result<Answer> {
    match result.map_err(io::Error::from) {
        Ok(value) => Ok(f(value)),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Answer::Cancelled),
        Err(e) => Err(e),
    }
}

fn prompt_line(question: &TextQuestion) -> String {
    match (&question.placeholder, &question.default) {
        (_, Some(default)) => format!("{} [{default}]", question.message),
        (Some(placeholder), None) => format!("{} ({placeholder})", question.message),
        (None, None) => question.message.clone(),
    }
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, question: &TextQuestion) -> io::Result<Answer> {
        let result = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt_line(question))
            // blank answers are resolved by the step
            .allow_empty(true)
            .interact_text_on(&self.term);
        cancelled_on_interrupt(result, Answer::Text)
    }

    fn select(&mut self, question: &SelectQuestion) -> io::Result<Answer> {
        let result = Select::with_theme(&self.theme)
            .with_prompt(&question.message)
            .items(&question.options)
            .default(question.initial)
            .interact_on_opt(&self.term);
        cancelled_on_interrupt(result, |picked| {
            picked.map_or(Answer::Cancelled, Answer::Selected)
        })
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<Answer> {
        let result = Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact_on_opt(&self.term);
        cancelled_on_interrupt(result, |picked| {
            picked.map_or(Answer::Cancelled, Answer::Confirmed)
        })
    }

    fn rejected(&mut self, message: &str) {
        let _ = self.term.write_line(&format!("{}", style(message).red()));
    }

    fn note(&mut self, title: &str, body: &str) {
        let _ = self.term.write_line(&format!("\n{}\n{body}\n", style(title).bold()));
    }

    fn waiting(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn done_waiting(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(placeholder: Option<&str>, default: Option<&str>) -> TextQuestion {
        TextQuestion {
            message: "Enter the nonce".into(),
            placeholder: placeholder.map(Into::into),
            default: default.map(Into::into),
        }
    }

    #[test]
    fn prompt_line_shows_default_over_placeholder() {
        assert_eq!(prompt_line(&question(Some("e.g., 0"), Some("0"))), "Enter the nonce [0]");
        assert_eq!(prompt_line(&question(Some("e.g., 0"), None)), "Enter the nonce (e.g., 0)");
        assert_eq!(prompt_line(&question(None, None)), "Enter the nonce");
    }

    #[test]
    fn interrupt_maps_to_cancel() {
        let interrupted: dialoguer::Result<String> =
            Err(io::Error::from(io::ErrorKind::Interrupted).into());
        assert_eq!(
            cancelled_on_interrupt(interrupted, Answer::Text).unwrap(),
            Answer::Cancelled
        );

        let broken: dialoguer::Result<String> = Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        assert!(cancelled_on_interrupt(broken, Answer::Text).is_err());
    }
}
