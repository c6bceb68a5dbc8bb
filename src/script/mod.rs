// src/script/mod.rs

//! Defines structures for representing and building ordered sequences of
//! [`Command`]s.
//!
//! A `Script` is the emulator's program: the commands are run in order by an
//! [`Emulation`](crate::emulation::Emulation) directly or stepped through by a
//! [`Session`](crate::session::Session).

use crate::command::Command;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An ordered list of commands plus the nominal register names they touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Every nominal register named by any command.
    registers: BTreeSet<String>,
    /// The commands, in execution order.
    commands: Vec<Command>,
}

impl Script {
    /// Creates a new, empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn add_command(&mut self, command: Command) {
        self.registers.extend(command.registers().into_iter().map(str::to_string));
        self.commands.push(command);
    }

    /// Appends every command from an iterator.
    pub fn add_commands<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.add_command(command);
        }
    }

    /// Names of the nominal registers the script declares or uses.
    pub fn registers(&self) -> &BTreeSet<String> {
        &self.registers
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Script ({} commands on {} registers)", self.commands.len(), self.registers.len())?;
        for (line, command) in self.commands.iter().enumerate() {
            writeln!(f, "  {:04}: {}", line, command)?;
        }
        Ok(())
    }
}

/// Fluent construction of a [`Script`].
///
/// # Examples
/// ```
/// # use qregemu::{Command, ScriptBuilder};
/// let script = ScriptBuilder::new()
///     .add(Command::create(&[("q", 2)]))
///     .add(Command::gate("H", &[("q", 0)]))
///     .add(Command::gate("CNOT", &[("q", 0), ("q", 1)]))
///     .add(Command::measure("q", 1))
///     .build();
///
/// assert_eq!(script.len(), 4);
/// assert!(script.registers().contains("q"));
/// ```
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Script,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single command. Returns `self` for chaining.
    pub fn add(mut self, command: Command) -> Self {
        self.script.add_command(command);
        self
    }

    /// Adds several commands. Returns `self` for chaining.
    pub fn add_many<I>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = Command>,
    {
        self.script.add_commands(commands);
        self
    }

    pub fn build(self) -> Script {
        self.script
    }
}
