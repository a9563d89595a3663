//! A line-oriented command language for driving an address space.
//!
//! ```text
//! # comments and blank lines are ignored
//! alloc a 100     # reserve 100 cells, remember the handle as `a`
//! alloc b 20
//! release a
//! layout          # `start - end tag`, one range per line
//! table           # the same, column-aligned
//! stats
//! compact
//! reset
//! ```

use std::{collections::HashMap, io::Write};

use log::warn;

use crate::{AddressSpace, Error, Handle, Result, SearchMode, Strategy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Alloc { name: String, size: usize },
  Release { name: String },
  Layout,
  Table,
  Stats,
  Compact,
  Reset,
}

/// A command and the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
  pub line: usize,
  pub command: Command,
}

/// Parses a whole script, stopping at the first malformed line.
pub fn parse(text: &str) -> Result<Vec<Statement>> {
  let mut statements = Vec::new();
  for (index, raw) in text.lines().enumerate() {
    let line = index + 1;
    let content = raw.split('#').next().unwrap_or_default();
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
      continue;
    }
    let command = parse_words(&words).map_err(|message| Error::Script { line, message })?;
    statements.push(Statement { line, command });
  }
  Ok(statements)
}

fn parse_words(words: &[&str]) -> Result<Command, String> {
  let command = match words {
    ["alloc", name, size] => Command::Alloc {
      name: (*name).to_owned(),
      size: size
        .parse()
        .map_err(|_| format!("invalid size `{size}`"))?,
    },
    ["release", name] => Command::Release {
      name: (*name).to_owned(),
    },
    ["layout"] => Command::Layout,
    ["table"] => Command::Table,
    ["stats"] => Command::Stats,
    ["compact"] => Command::Compact,
    ["reset"] => Command::Reset,
    [keyword @ ("alloc" | "release" | "layout" | "table" | "stats" | "compact" | "reset"), ..] => {
      return Err(format!("wrong number of arguments for `{keyword}`"));
    }
    [other, ..] => return Err(format!("unknown command `{other}`")),
    [] => unreachable!("blank lines are skipped"),
  };
  Ok(command)
}

/// Runs commands against one address space, tracking handles by name.
pub struct Interpreter<S = SearchMode> {
  space: AddressSpace<S>,
  names: HashMap<String, Handle>,
}

impl<S: Strategy> Interpreter<S> {
  pub fn new(space: AddressSpace<S>) -> Self {
    Self {
      space,
      names: HashMap::new(),
    }
  }

  pub fn space(&self) -> &AddressSpace<S> {
    &self.space
  }

  pub fn handle(
    &self,
    name: &str,
  ) -> Option<Handle> {
    self.names.get(name).copied()
  }

  /// Runs every statement, reporting failed commands to `out` and carrying
  /// on. Returns the number of commands that failed.
  pub fn run(
    &mut self,
    statements: &[Statement],
    out: &mut impl Write,
  ) -> Result<usize> {
    let mut failures = 0;
    for statement in statements {
      match self.execute(&statement.command, out) {
        Ok(()) => {}
        Err(Error::Io(err)) => return Err(Error::Io(err)),
        Err(err) => {
          warn!("line {}: {}", statement.line, err);
          writeln!(out, "line {}: {}", statement.line, err)?;
          failures += 1;
        }
      }
    }
    Ok(failures)
  }

  pub fn execute(
    &mut self,
    command: &Command,
    out: &mut impl Write,
  ) -> Result<()> {
    match command {
      Command::Alloc { name, size } => {
        if self.names.contains_key(name) {
          return Err(Error::InvalidArgument(format!(
            "name `{name}` is already in use"
          )));
        }
        let handle = self.space.allocate(*size)?;
        writeln!(out, "{name} = {} ({size} cells)", handle.address())?;
        self.names.insert(name.clone(), handle);
      }
      Command::Release { name } => {
        let handle = self
          .handle(name)
          .ok_or_else(|| Error::InvalidArgument(format!("no allocation named `{name}`")))?;
        self.space.release(handle)?;
        self.names.remove(name);
        writeln!(out, "released {name}")?;
      }
      Command::Layout => write!(out, "{}", self.space.report())?,
      Command::Table => write!(out, "{}", self.space.report().table())?,
      Command::Stats => writeln!(out, "{}", self.space.stats())?,
      Command::Compact => self.space.compact()?,
      Command::Reset => {
        self.space.reset();
        self.names.clear();
        writeln!(out, "reset")?;
      }
    }
    Ok(())
  }
}
