// src/session/runner.rs

use crate::emulation::{CommandOutput, Emulation, EmulationConfig};
use crate::script::Script;
use tracing::debug;

/// Steps an [`Emulation`] through a [`Script`].
///
/// Before each command the session keeps a deep copy of the emulation, so
/// [`step_back`](Session::step_back) restores the exact previous state,
/// including the measurement rng. Failed commands are recorded like any other
/// and do not stop [`run_all`](Session::run_all).
///
/// # Examples
///
/// ```
/// # use qregemu::{Command, EmulationConfig, ScriptBuilder, Session};
/// let script = ScriptBuilder::new()
///     .add(Command::create(&[("r", 1)]))
///     .add(Command::gate("X", &[("r", 0)]))
///     .build();
///
/// let mut session = Session::new(script, EmulationConfig::seeded(1));
/// session.run_all();
/// assert!(session.is_finished());
///
/// session.step_back();
/// assert_eq!(session.position(), 1);
/// assert_eq!(session.emulation().register_state("r").unwrap().to_string(), "|0>: 1.00 + 0.00i");
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    script: Script,
    /// Emulation before any command ran, used by `reset`.
    initial: Emulation,
    emulation: Emulation,
    /// `history[i]` is the emulation just before command `i` ran.
    history: Vec<Emulation>,
    outputs: Vec<CommandOutput>,
}

impl Session {
    /// A session over a fresh emulation built from `config`.
    pub fn new(script: Script, config: EmulationConfig) -> Self {
        Self::with_emulation(script, Emulation::with_config(config))
    }

    /// A session continuing from an existing emulation.
    pub fn with_emulation(script: Script, emulation: Emulation) -> Self {
        Self {
            script,
            initial: emulation.clone(),
            emulation,
            history: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Index of the next command to run.
    pub fn position(&self) -> usize {
        self.outputs.len()
    }

    /// `true` once every command has run.
    pub fn is_finished(&self) -> bool {
        self.position() >= self.script.len()
    }

    /// Runs the next command. Returns `None` when the script is exhausted.
    pub fn step(&mut self) -> Option<&CommandOutput> {
        let position = self.position();
        let command = self.script.get(position)?;
        self.history.push(self.emulation.clone());
        let output = self.emulation.run(command);
        debug!(position, succeeded = output.succeeded, "session step");
        self.outputs.push(output);
        self.outputs.last()
    }

    /// Undoes the most recent command. Returns `false` at the start of the
    /// script.
    pub fn step_back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.emulation = previous;
                self.outputs.pop();
                debug!(position = self.position(), "session stepped back");
                true
            }
            None => false,
        }
    }

    /// Runs every remaining command and returns all outputs so far.
    pub fn run_all(&mut self) -> &[CommandOutput] {
        while self.step().is_some() {}
        &self.outputs
    }

    /// Returns to the state before the first command.
    pub fn reset(&mut self) {
        self.emulation = self.initial.clone();
        self.history.clear();
        self.outputs.clear();
    }

    pub fn emulation(&self) -> &Emulation {
        &self.emulation
    }

    pub fn outputs(&self) -> &[CommandOutput] {
        &self.outputs
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::script::ScriptBuilder;

    fn bell_script() -> Script {
        ScriptBuilder::new()
            .add(Command::create(&[("q", 2)]))
            .add(Command::gate("H", &[("q", 0)]))
            .add(Command::gate("CNOT", &[("q", 0), ("q", 1)]))
            .add(Command::measure("q", 0))
            .build()
    }

    #[test]
    fn test_step_and_step_back() {
        let mut session = Session::new(bell_script(), EmulationConfig::seeded(11));
        assert!(!session.step_back());
        for _ in 0..3 {
            assert!(session.step().is_some_and(|out| out.succeeded));
        }
        let before_measure = session.emulation().register_state("q").cloned().ok();

        session.step();
        assert!(session.is_finished());
        assert!(session.step().is_none());

        assert!(session.step_back());
        assert_eq!(session.position(), 3);
        assert_eq!(session.emulation().register_state("q").cloned().ok(), before_measure);
    }

    #[test]
    fn test_replay_after_step_back_is_identical() {
        let mut session = Session::new(bell_script(), EmulationConfig::default());
        session.run_all();
        let first = session.outputs().last().cloned();
        session.step_back();
        session.step();
        assert_eq!(session.outputs().last().cloned(), first);
    }

    #[test]
    fn test_reset_and_failed_commands() {
        let script = ScriptBuilder::new()
            .add(Command::gate("X", &[("missing", 0)]))
            .add(Command::create(&[("r", 1)]))
            .build();
        let mut session = Session::new(script, EmulationConfig::seeded(3));
        let outputs = session.run_all();
        assert!(!outputs[0].succeeded);
        assert!(outputs[1].succeeded);

        session.reset();
        assert_eq!(session.position(), 0);
        assert!(session.emulation().register_state("r").is_err());
    }
}
