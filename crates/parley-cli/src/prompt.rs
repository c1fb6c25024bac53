use std::io;

use anyhow::Result;
use cliclack::spinner;
use console::style;
use parley::Role;
use rustyline::error::ReadlineError;

const PROMPT: &str = "YOU: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    Message,
    /// Blank line; ask again without counting a turn
    Empty,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>,
}

impl Input {
    pub fn exit() -> Self {
        Input {
            input_type: InputType::Exit,
            content: None,
        }
    }

    /// Classify one raw line typed by the user
    pub fn from_line(line: &str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            Input {
                input_type: InputType::Empty,
                content: None,
            }
        } else if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            Input::exit()
        } else {
            Input {
                input_type: InputType::Message,
                content: Some(text.to_string()),
            }
        }
    }
}

/// Terminal surface of a test conversation
pub trait Prompt {
    fn render(&mut self, role: Role, text: &str);
    fn notice(&mut self, text: &str);
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn get_input(&mut self) -> Result<Input>;
}

pub struct RustylinePrompt {
    editor: rustyline::DefaultEditor,
    spinner: Option<cliclack::ProgressBar>,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            editor: rustyline::DefaultEditor::new()?,
            spinner: None,
        })
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, role: Role, text: &str) {
        let speaker = match role {
            Role::User => style("YOU:").green().bold(),
            _ => style("BOT:").cyan().bold(),
        };
        println!("{} {}\n", speaker, text);
    }

    fn notice(&mut self, text: &str) {
        println!("{}\n", style(text).dim());
    }

    fn show_busy(&mut self) {
        let busy = spinner();
        busy.start("Thinking...");
        self.spinner = Some(busy);
    }

    fn hide_busy(&mut self) {
        if let Some(busy) = self.spinner.take() {
            busy.stop("");
        }
    }

    fn get_input(&mut self) -> Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => Ok(Input::from_line(&line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(Input::exit()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Numbered-list selection; returns the index of the chosen item.
/// Ctrl-C exits the process, matching the rest of the menu flow.
pub fn select_from_list(prompt_text: &str, items: &[String]) -> Result<usize> {
    let mut select = cliclack::select(prompt_text);
    for (index, item) in items.iter().enumerate() {
        select = select.item(index, item, "");
    }
    match select.interact() {
        Ok(index) => Ok(index),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
            println!("\n\nExiting...");
            std::process::exit(0)
        }
        Err(e) => Err(e.into()),
    }
}
