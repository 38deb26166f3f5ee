// Prompting seam between the controller and the terminal. The real
// implementation uses `dialoguer`; tests feed canned answers.

use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};

pub trait Prompter {
    /// Free-text line; may be empty.
    fn input(&mut self, prompt: &str) -> Result<String>;
    /// Masked input for secrets.
    fn password(&mut self, prompt: &str) -> Result<String>;
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
    /// Keyboard-navigable choice, returns the selected index.
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        Ok(Password::new().with_prompt(prompt).interact()?)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).interact()?)
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        Ok(Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }
}

/// Answers prompts from a fixed script, in order. Confirmations take
/// "y"/"n", selections take the index as text.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script ran out of answers at {prompt:?}"))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self.next(prompt)? == "y")
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        let idx: usize = self.next(prompt)?.parse()?;
        anyhow::ensure!(idx < items.len(), "selection {idx} out of range");
        Ok(idx)
    }
}
