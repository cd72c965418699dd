//! Console prompts.
//!
//! `TerminalPrompt` drives a real terminal through dialoguer. `LinePrompt`
//! reads plain lines from any reader, which is what piped input and tests use.

use std::io::{self, BufRead, Write};

use dialoguer::{Confirm, Input};

pub trait Prompt {
    /// Asks for one line. `None` means input is exhausted.
    fn ask(&mut self, label: &str) -> io::Result<Option<String>>;

    /// Yes/no question that defaults to "no".
    fn confirm(&mut self, label: &str) -> io::Result<bool>;

    fn say(&mut self, text: &str) -> io::Result<()>;
}

#[derive(Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        let answer = Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(answer))
    }

    fn confirm(&mut self, label: &str) -> io::Result<bool> {
        let answer = Confirm::new()
            .with_prompt(label)
            .default(false)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        println!("{}", text);
        Ok(())
    }
}

pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}: ", label)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn confirm(&mut self, label: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", label))?;
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some(text) if text.eq_ignore_ascii_case("y") || text.eq_ignore_ascii_case("yes")
        ))
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", text)
    }
}
