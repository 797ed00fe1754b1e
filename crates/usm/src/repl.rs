//! Interactive line editor over a [`Manager`].
//!
//! Reads one command per line. Text and number edits are re-validated after
//! the manager's idle window, so their violations show up on the next `show`
//! or `status`; `save` always validates the current values.

use std::io::{self, Write};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use usm_engine::{Error as EngineError, Manager};

use crate::render;

/// Command summary printed by `help`.
const HELP: &str = "\
commands:
  open                 open the editor and list owners
  close                close the editor, dropping unsaved edits
  list [FILTER]        list owners whose name or id contains FILTER
  select ID            edit an owner
  set KEY VALUE        change a setting
  add KEY TAG          add a tag to a list setting
  remove KEY TAG       remove a tag from a list setting
  status               show the draft status
  save                 validate and store the draft
  reset                delete stored values and restore defaults
  show                 show the draft
  quit                 leave";

/// One editor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the editor.
    Open,
    /// Close the editor.
    Close,
    /// List owners, optionally filtered.
    List(Option<String>),
    /// Start editing an owner.
    Select(String),
    /// Change a setting from raw input.
    Set {
        /// Field key.
        key: String,
        /// Raw input.
        value: String,
    },
    /// Add a tag.
    Add {
        /// Field key.
        key: String,
        /// Tag to add.
        tag: String,
    },
    /// Remove a tag.
    Remove {
        /// Field key.
        key: String,
        /// Tag to remove.
        tag: String,
    },
    /// Print the status.
    Status,
    /// Commit the draft.
    Save,
    /// Discard stored values.
    Reset,
    /// Print the draft.
    Show,
    /// Print the command summary.
    Help,
    /// Leave the editor.
    Quit,
}

/// A line that is not a valid command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Unrecognized command word.
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    /// Recognized command with missing arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Action {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = split_word(line);
        let action = match word {
            "open" => Self::Open,
            "close" => Self::Close,
            "list" | "ls" => Self::List((!rest.is_empty()).then(|| rest.to_string())),
            "select" | "sel" => {
                if rest.is_empty() {
                    return Err(ParseError::Usage("select ID"));
                }
                Self::Select(rest.to_string())
            }
            "set" => {
                let (key, value) = split_word(rest);
                if key.is_empty() {
                    return Err(ParseError::Usage("set KEY VALUE"));
                }
                Self::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            "add" | "remove" | "rm" => {
                let (key, tag) = split_word(rest);
                if key.is_empty() || tag.is_empty() {
                    return Err(ParseError::Usage(if word == "add" {
                        "add KEY TAG"
                    } else {
                        "remove KEY TAG"
                    }));
                }
                let (key, tag) = (key.to_string(), tag.to_string());
                if word == "add" {
                    Self::Add { key, tag }
                } else {
                    Self::Remove { key, tag }
                }
            }
            "status" => Self::Status,
            "save" => Self::Save,
            "reset" => Self::Reset,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(action))
    }
}

/// First whitespace-separated word and the trimmed remainder.
fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

/// What the input loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read another line.
    Continue,
    /// Stop.
    Quit,
}

/// Editor state: the manager plus whether the editor is open.
pub struct Repl<W> {
    /// Settings manager being edited.
    manager: Manager,
    /// Output sink.
    out: W,
    /// Editor visibility; most commands need it open.
    open: bool,
}

impl<W: Write> Repl<W> {
    /// Editor writing to `out`, initially open.
    pub fn new(manager: Manager, out: W) -> Self {
        Self {
            manager,
            out,
            open: true,
        }
    }

    /// Output written so far.
    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }

    /// Prompt naming the selected owner.
    pub fn prompt(&mut self) -> io::Result<()> {
        match self.manager.active_owner() {
            Some(owner) => write!(self.out, "usm:{}> ", owner)?,
            None => write!(self.out, "usm> ")?,
        }
        self.out.flush()
    }

    /// Parse and run one input line.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match Action::parse(line) {
            Ok(None) => Ok(Flow::Continue),
            Ok(Some(action)) => self.apply(action),
            Err(e) => {
                writeln!(self.out, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Run one command.
    pub fn apply(&mut self, action: Action) -> io::Result<Flow> {
        match action {
            Action::Quit => return Ok(Flow::Quit),
            Action::Help => writeln!(self.out, "{}", HELP)?,
            Action::Open => {
                self.open = true;
                render::owners(&mut self.out, &self.manager.owners())?;
            }
            Action::Close => {
                self.manager.close();
                self.open = false;
                writeln!(self.out, "closed")?;
            }
            _ if !self.open => writeln!(self.out, "editor is closed (type 'open')")?,
            Action::List(filter) => {
                let found = self
                    .manager
                    .filter_owners(filter.as_deref().unwrap_or_default());
                render::owners(&mut self.out, &found)?;
            }
            Action::Select(id) => match self.manager.select(&id) {
                Ok(()) => render::session(&mut self.out, &self.manager)?,
                Err(e) => self.report(&e)?,
            },
            Action::Set { key, value } => {
                let result = self.manager.edit_input(&key, &value);
                self.edited(&key, result)?;
            }
            Action::Add { key, tag } => {
                let result = self.manager.add_tag(&key, &tag);
                self.edited(&key, result)?;
            }
            Action::Remove { key, tag } => {
                let result = self.manager.remove_tag(&key, &tag);
                self.edited(&key, result)?;
            }
            Action::Status => match self.manager.status() {
                Some(status) => writeln!(self.out, "{}", status)?,
                None => writeln!(self.out, "no owner selected")?,
            },
            Action::Save => match self.manager.commit() {
                Ok(_) => writeln!(self.out, "Saved")?,
                Err(e) => self.report(&e)?,
            },
            Action::Reset => match self.manager.discard() {
                Ok(_) => {
                    writeln!(self.out, "Reset to defaults")?;
                    render::session(&mut self.out, &self.manager)?;
                }
                Err(e) => self.report(&e)?,
            },
            Action::Show => render::session(&mut self.out, &self.manager)?,
        }
        Ok(Flow::Continue)
    }

    /// Echo the new value of `key` and the status, or the edit failure.
    fn edited(&mut self, key: &str, result: usm_engine::Result<()>) -> io::Result<()> {
        if let Err(e) = result {
            return self.report(&e);
        }
        let Some(snap) = self.manager.snapshot() else {
            return Ok(());
        };
        let value = snap.values.get(key).cloned().unwrap_or_default();
        writeln!(self.out, "{} = {}  [{}]", key, value, snap.status)
    }

    /// Print an engine failure.
    fn report(&mut self, e: &EngineError) -> io::Result<()> {
        match e {
            EngineError::ValidationFailed { errors } => {
                writeln!(self.out, "Validation errors:")?;
                for (key, messages) in errors {
                    for message in messages {
                        writeln!(self.out, "  {}: {}", key, message)?;
                    }
                }
                Ok(())
            }
            other => writeln!(self.out, "error: {}", other),
        }
    }
}

/// Run the editor on stdin/stdout until `quit` or end of input.
pub async fn run(manager: Manager) -> io::Result<()> {
    let mut repl = Repl::new(manager, io::stdout());
    repl.apply(Action::Open)?;
    writeln!(repl.out, "type 'help' for commands")?;
    let mut lines = BufReader::new(stdin()).lines();
    loop {
        repl.prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if repl.handle_line(&line)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use schema::load_from_str;

    use super::*;

    const COUNTER: &str = r#"{
        "id": "s1", "name": "Counter", "version": "1",
        "settings": [
            { "key": "count", "type": "number", "label": "Count", "default": 5,
              "validation": { "min": 1, "max": 10 } },
            { "key": "tags", "type": "array-string", "label": "Tags", "default": [] }
        ]
    }"#;

    fn repl() -> Repl<Vec<u8>> {
        let m = Manager::in_memory();
        assert!(m.register(load_from_str(COUNTER, None).unwrap()));
        Repl::new(m, Vec::new())
    }

    fn run_lines(r: &mut Repl<Vec<u8>>, lines: &[&str]) -> String {
        for line in lines {
            r.handle_line(line).unwrap();
        }
        String::from_utf8(r.output().clone()).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Action::parse("   "), Ok(None));
        assert_eq!(Action::parse("list"), Ok(Some(Action::List(None))));
        assert_eq!(
            Action::parse("list  git hub "),
            Ok(Some(Action::List(Some("git hub".into()))))
        );
        assert_eq!(
            Action::parse("set note hello world"),
            Ok(Some(Action::Set {
                key: "note".into(),
                value: "hello world".into()
            }))
        );
        assert_eq!(
            Action::parse("set note"),
            Ok(Some(Action::Set {
                key: "note".into(),
                value: String::new()
            }))
        );
        assert_eq!(Action::parse("add tags"), Err(ParseError::Usage("add KEY TAG")));
        assert_eq!(Action::parse("select"), Err(ParseError::Usage("select ID")));
        assert_eq!(
            Action::parse("frobnicate"),
            Err(ParseError::Unknown("frobnicate".into()))
        );
        assert_eq!(Action::parse("q"), Ok(Some(Action::Quit)));
    }

    #[test]
    fn edit_and_save_session() {
        let mut r = repl();
        let out = run_lines(
            &mut r,
            &["select s1", "set count 15", "save", "set count 7", "save", "status"],
        );
        assert!(out.contains("Counter v1  [Saved]"));
        assert!(out.contains("count = 15  [Validation errors]"));
        assert!(out.contains("Validation errors:\n  count: Max: 10\n"));
        assert!(out.contains("count = 7  [Unsaved changes]"));
        assert!(out.ends_with("Saved\nSaved\n"));
        assert_eq!(
            r.manager.get_settings("s1").unwrap()["count"],
            schema::Value::from(7)
        );
    }

    #[test]
    fn tags_and_reset() {
        let mut r = repl();
        let out = run_lines(
            &mut r,
            &["select s1", "add tags a", "add tags b", "remove tags a", "save", "reset"],
        );
        assert!(out.contains("tags = a, b  [Unsaved changes]"));
        assert!(out.contains("tags = b  [Unsaved changes]"));
        assert!(out.contains("Reset to defaults\nCounter v1  [Saved]"));
    }

    #[test]
    fn closed_editor_refuses_edits() {
        let mut r = repl();
        let out = run_lines(&mut r, &["select s1", "close", "show", "open", "show"]);
        assert!(out.contains("closed\neditor is closed (type 'open')\n"));
        assert!(out.ends_with("Counter  s1  v1\nno owner selected\n"));
        assert_eq!(r.handle_line("quit").unwrap(), Flow::Quit);
    }

    #[test]
    fn unknown_owner_and_bad_commands_are_reported() {
        let mut r = repl();
        let out = run_lines(&mut r, &["select nope", "save", "bogus"]);
        assert!(out.contains("error: Unknown owner: nope\n"));
        assert!(out.contains("error: No owner selected for editing\n"));
        assert!(out.contains("unknown command 'bogus' (try 'help')\n"));
    }
}
