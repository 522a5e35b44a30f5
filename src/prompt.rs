//! Declarative questions and the transition from a raw answer to a value.
//!
//! A step never touches the terminal: [`TextStep::transition`] and
//! [`SelectStep::transition`] map an [`Answer`] to a [`Transition`], and
//! [`ask`] / [`choose`] loop over a [`Prompter`] until a value is accepted
//! or the user cancels.

use std::collections::VecDeque;
use std::io;

use crate::error::Error;
use crate::validate::Validation;

/// Raw input as returned by a [`Prompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Selected(usize),
    Confirmed(bool),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<T> {
    Accepted(T),
    Rejected(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuestion {
    pub message: String,
    pub placeholder: Option<String>,
    /// Used when the answer is blank.
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuestion {
    pub message: String,
    pub options: Vec<String>,
    pub initial: usize,
}

pub struct TextStep<T> {
    pub question: TextQuestion,
    validate: Box<dyn Fn(&str) -> Validation<T>>,
}

impl<T> TextStep<T> {
    pub fn new(message: impl Into<String>, validate: impl Fn(&str) -> Validation<T> + 'static) -> Self {
        Self {
            question: TextQuestion {
                message: message.into(),
                placeholder: None,
                default: None,
            },
            validate: Box::new(validate),
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.question.placeholder = Some(placeholder.into());
        self
    }

    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.question.default = Some(default.into());
        self
    }

    pub fn transition(&self, answer: Answer) -> Transition<T> {
        let raw = match answer {
            Answer::Cancelled => return Transition::Cancelled,
            Answer::Text(raw) => raw,
            other => return Transition::Rejected(format!("expected text, got {other:?}")),
        };
        let input = match &self.question.default {
            Some(default) if raw.trim().is_empty() => default.as_str(),
            _ => raw.as_str(),
        };
        match (self.validate)(input) {
            Ok(value) => Transition::Accepted(value),
            Err(message) => Transition::Rejected(message),
        }
    }
}

pub struct SelectStep<V> {
    pub question: SelectQuestion,
    values: Vec<V>,
}

impl<V: Clone> SelectStep<V> {
    pub fn new(message: impl Into<String>, options: Vec<(String, V)>) -> Self {
        let (labels, values) = options.into_iter().unzip();
        Self {
            question: SelectQuestion {
                message: message.into(),
                options: labels,
                initial: 0,
            },
            values,
        }
    }

    pub fn initial(mut self, initial: usize) -> Self {
        self.question.initial = initial;
        self
    }

    pub fn transition(&self, answer: Answer) -> Transition<V> {
        match answer {
            Answer::Cancelled => Transition::Cancelled,
            Answer::Selected(i) => match self.values.get(i) {
                Some(value) => Transition::Accepted(value.clone()),
                None => Transition::Rejected(format!("no option #{i}")),
            },
            other => Transition::Rejected(format!("expected a choice, got {other:?}")),
        }
    }
}

/// The input source. Implementations render questions and return what the
/// user typed or picked, or [`Answer::Cancelled`].
pub trait Prompter {
    fn text(&mut self, question: &TextQuestion) -> io::Result<Answer>;

    fn select(&mut self, question: &SelectQuestion) -> io::Result<Answer>;

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<Answer>;

    /// Shown before the same question is asked again.
    fn rejected(&mut self, _message: &str) {}

    fn note(&mut self, _title: &str, _body: &str) {}

    /// Bracket a blocking device operation.
    fn waiting(&mut self, _message: &str) {}

    fn done_waiting(&mut self, _message: &str) {}
}

pub fn ask<T, P: Prompter + ?Sized>(prompter: &mut P, step: &TextStep<T>) -> Result<T, Error> {
    loop {
        let answer = prompter.text(&step.question)?;
        match step.transition(answer) {
            Transition::Accepted(value) => return Ok(value),
            Transition::Rejected(message) => prompter.rejected(&message),
            Transition::Cancelled => return Err(Error::Cancelled),
        }
    }
}

pub fn choose<V: Clone, P: Prompter + ?Sized>(
    prompter: &mut P,
    step: &SelectStep<V>,
) -> Result<V, Error> {
    loop {
        let answer = prompter.select(&step.question)?;
        match step.transition(answer) {
            Transition::Accepted(value) => return Ok(value),
            Transition::Rejected(message) => prompter.rejected(&message),
            Transition::Cancelled => return Err(Error::Cancelled),
        }
    }
}

/// A select whose `None` option ("Custom") falls through to a text step.
pub fn choose_or_custom<V: Clone, P: Prompter + ?Sized>(
    prompter: &mut P,
    step: &SelectStep<Option<V>>,
    custom: &TextStep<V>,
) -> Result<V, Error> {
    match choose(prompter, step)? {
        Some(value) => Ok(value),
        None => ask(prompter, custom),
    }
}

/// `false` and cancellation both end the workflow.
pub fn confirm<P: Prompter + ?Sized>(prompter: &mut P, message: &str) -> Result<(), Error> {
    loop {
        match prompter.confirm(message, true)? {
            Answer::Confirmed(true) => return Ok(()),
            Answer::Confirmed(false) | Answer::Cancelled => return Err(Error::Cancelled),
            other => prompter.rejected(&format!("expected yes or no, got {other:?}")),
        }
    }
}

/// Replays a fixed list of answers; once exhausted every question is
/// answered with [`Answer::Cancelled`]. Records what it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub asked: Vec<String>,
    pub rejections: Vec<String>,
    pub notes: Vec<(String, String)>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Answer {
        self.asked.push(message.to_string());
        self.answers.pop_front().unwrap_or(Answer::Cancelled)
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, question: &TextQuestion) -> io::Result<Answer> {
        Ok(self.next(&question.message))
    }

    fn select(&mut self, question: &SelectQuestion) -> io::Result<Answer> {
        Ok(self.next(&question.message))
    }

    fn confirm(&mut self, message: &str, _default: bool) -> io::Result<Answer> {
        Ok(self.next(message))
    }

    fn rejected(&mut self, message: &str) {
        self.rejections.push(message.to_string());
    }

    fn note(&mut self, title: &str, body: &str) {
        self.notes.push((title.to_string(), body.to_string()));
    }
}
