//! Line-oriented command loop
//!
//! The loop reads a command per line, prompts for two operands when the
//! command names a registered operation, and prints results and history.
//! Input and output are generic so the loop can be driven from a test
//! transcript as well as from a terminal.

use crate::calculation::format_decimal;
use crate::session::CalculatorSession;
use anyhow::Result;
use colored::*;
use std::io::{BufRead, Write};
use tracing::{debug, error};

const CANCEL: &str = "cancel";

/// A parsed top-level command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Calculate(String),
    History,
    Clear,
    Undo,
    Redo,
    Save,
    Load,
    Help,
    Exit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str, session: &CalculatorSession) -> Option<Self> {
        let word = line.trim().to_lowercase();
        if word.is_empty() {
            return None;
        }
        let command = match word.as_str() {
            "history" => Self::History,
            "clear" => Self::Clear,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "save" => Self::Save,
            "load" => Self::Load,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            name if session.registry().contains(name) => Self::Calculate(word),
            _ => Self::Unknown(word),
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Info,
    Success,
    Failure,
    Value,
}

/// Interactive front end over a [`CalculatorSession`]
pub struct Repl<R, W> {
    session: CalculatorSession,
    input: R,
    output: W,
    use_color: bool,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(session: CalculatorSession, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            use_color: true,
        }
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn session(&self) -> &CalculatorSession {
        &self.session
    }

    /// Run until `exit` or end of input, then close the session.
    ///
    /// Returns the output sink so callers can inspect what was written.
    pub fn run(mut self) -> Result<W> {
        self.say("Calculator started. Type 'help' for commands.", Tone::Info)?;

        loop {
            write!(self.output, "\nEnter command: ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                self.say("\nInput terminated. Exiting...", Tone::Info)?;
                break;
            };
            let Some(command) = Command::parse(&line, &self.session) else {
                continue;
            };
            debug!(?command, "Dispatching command");
            if command == Command::Exit {
                break;
            }
            self.dispatch(command)?;
        }

        let Self {
            session,
            mut output,
            use_color,
            ..
        } = self;
        let farewell = match session.close() {
            Ok(()) => paint("History saved successfully.", Tone::Success, use_color),
            Err(e) => {
                error!("Failed to save session on exit: {e}");
                paint(&format!("Warning: Could not save history: {e}"), Tone::Failure, use_color)
            }
        };
        writeln!(output, "{farewell}")?;
        writeln!(output, "{}", paint("Goodbye!", Tone::Info, use_color))?;
        output.flush()?;
        Ok(output)
    }

    fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => self.print_help()?,
            Command::History => self.print_history()?,
            Command::Clear => {
                self.session.clear_history();
                self.say("History cleared", Tone::Success)?;
            }
            Command::Undo => {
                if self.session.undo() {
                    self.say("Operation undone", Tone::Success)?;
                } else {
                    self.say("Nothing to undo", Tone::Info)?;
                }
            }
            Command::Redo => {
                if self.session.redo() {
                    self.say("Operation redone", Tone::Success)?;
                } else {
                    self.say("Nothing to redo", Tone::Info)?;
                }
            }
            Command::Save => match self.session.save_history() {
                Ok(()) => self.say("History saved successfully", Tone::Success)?,
                Err(e) => self.say(&format!("Error saving history: {e}"), Tone::Failure)?,
            },
            Command::Load => match self.session.load_history() {
                Ok(true) => self.say("History loaded successfully", Tone::Success)?,
                Ok(false) => self.say("No saved history found", Tone::Info)?,
                Err(e) => self.say(&format!("Error loading history: {e}"), Tone::Failure)?,
            },
            Command::Calculate(name) => self.calculate(&name)?,
            Command::Unknown(word) => self.say(
                &format!("Unknown command: '{word}'. Type 'help' for available commands."),
                Tone::Info,
            )?,
            Command::Exit => {}
        }
        Ok(())
    }

    fn calculate(&mut self, name: &str) -> Result<()> {
        self.say("\nEnter numbers (or 'cancel' to abort):", Tone::Info)?;
        let Some(a) = self.prompt("First number: ")? else {
            return Ok(());
        };
        let Some(b) = self.prompt("Second number: ")? else {
            return Ok(());
        };

        match self.session.perform_input(name, &a, &b) {
            Ok(result) => {
                let shown = format_decimal(result, self.session.config().precision);
                let shown = paint(&shown, Tone::Value, self.use_color);
                writeln!(self.output, "\nResult: {shown}")?;
            }
            Err(e) => self.say(&format!("Error: {}", e.message()), Tone::Failure)?,
        }
        Ok(())
    }

    /// Ask for one operand. `None` means the entry was cancelled.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        match self.read_line()? {
            Some(value) if !value.trim().eq_ignore_ascii_case(CANCEL) => Ok(Some(value)),
            _ => {
                self.say("Operation cancelled", Tone::Info)?;
                Ok(None)
            }
        }
    }

    fn print_help(&mut self) -> Result<()> {
        let operations = self.session.registry().names().join(", ");
        self.say("\nAvailable commands:", Tone::Info)?;
        self.say(&format!("  {operations} - Perform calculations"), Tone::Info)?;
        for (name, about) in [
            ("history", "Show calculation history"),
            ("clear", "Clear calculation history"),
            ("undo", "Undo the last calculation"),
            ("redo", "Redo the last undone calculation"),
            ("save", "Save calculation history to file"),
            ("load", "Load calculation history from file"),
            ("exit", "Exit the calculator"),
        ] {
            self.say(&format!("  {name} - {about}"), Tone::Info)?;
        }
        Ok(())
    }

    fn print_history(&mut self) -> Result<()> {
        let lines = self.session.show_history();
        if lines.is_empty() {
            return self.say("No calculations in history", Tone::Info);
        }
        self.say("\nCalculation History:", Tone::Info)?;
        for (i, entry) in lines.iter().enumerate() {
            writeln!(self.output, "{}. {entry}", i + 1)?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, text: &str, tone: Tone) -> Result<()> {
        writeln!(self.output, "{}", paint(text, tone, self.use_color))?;
        Ok(())
    }
}

fn paint(text: &str, tone: Tone, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    match tone {
        Tone::Info => text.cyan().to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Failure => text.red().to_string(),
        Tone::Value => text.bold().yellow().to_string(),
    }
}
