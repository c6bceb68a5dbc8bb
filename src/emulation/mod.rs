// src/emulation/mod.rs

//! The emulator front door: owns every register and oracle and executes
//! [`Command`]s against them.
//!
//! Nominal registers are looked up by name and resolved through the
//! [`RegisterArena`] to the real register that holds their amplitudes. An
//! operation touching several real registers first joins them by tensor
//! product and rebinds every affected nominal register to the joined one.

pub mod engine;
pub mod results;

pub use engine::apply;
pub use results::{CommandOutput, GateTrace, MergeInfo};

use crate::command::{Command, NominalSpec, Operand};
use crate::core::constants::emulator_constants::{DEGENERATE_MASS_EPSILON, MAX_QUBITS};
use crate::core::{EmulatorError, QubitRegister, RegisterArena, RegisterId, RegisterState, Result};
use crate::gates::{self, OracleDefinition, OracleGate, TableSource};
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::Xoshiro256PlusPlus;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Tunables for an [`Emulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulationConfig {
    /// Seed for measurement draws. `None` seeds from the thread rng.
    pub seed: Option<u64>,
    /// A measurement whose retained probability is below this fails with
    /// `ArithmeticDegenerate`.
    pub degenerate_mass_epsilon: f64,
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            degenerate_mass_epsilon: DEGENERATE_MASS_EPSILON,
        }
    }
}

impl EmulationConfig {
    /// Default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    fn rng(&self) -> Xoshiro256PlusPlus {
        match self.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
        }
    }
}

fn entropy_rng() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::from_rng(&mut rand::rng())
}

/// Where one real register lands inside a planned join.
struct MergePlan {
    /// Real registers in operand order, with their bit offset in the join.
    parts: Vec<(RegisterId, usize)>,
    /// Name of the joined register, `join(join(a,b),c)` style.
    name: String,
    /// Width of the joined register.
    size: usize,
}

impl MergePlan {
    fn offset_of(&self, real: RegisterId) -> Option<usize> {
        self.parts.iter().find(|(id, _)| *id == real).map(|(_, offset)| *offset)
    }
}

/// A sparse multi-register quantum emulator.
///
/// Cloning produces a fully independent deep copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emulation {
    arena: RegisterArena,
    /// Nominal register name -> arena id.
    nominals: BTreeMap<String, RegisterId>,
    /// Real register name -> arena id.
    reals: BTreeMap<String, RegisterId>,
    oracles: BTreeMap<String, OracleDefinition>,
    last_trace: Option<GateTrace>,
    /// Source of generated real register names.
    name_counter: u64,
    config: EmulationConfig,
    #[serde(skip, default = "entropy_rng")]
    rng: Xoshiro256PlusPlus,
}

impl Default for Emulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulation {
    /// An empty emulation with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EmulationConfig::default())
    }

    pub fn with_config(config: EmulationConfig) -> Self {
        let rng = config.rng();
        Self {
            arena: RegisterArena::new(),
            nominals: BTreeMap::new(),
            reals: BTreeMap::new(),
            oracles: BTreeMap::new(),
            last_trace: None,
            name_counter: 0,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &EmulationConfig {
        &self.config
    }

    /// Executes one command. Errors are reported in the returned status and
    /// leave every register unchanged.
    pub fn run(&mut self, command: &Command) -> CommandOutput {
        debug!(%command, "running command");
        let outcome = match command {
            Command::CreateRegister { real_name, real_size, specs } => {
                self.create_register(real_name.as_deref(), *real_size, specs).map(CommandOutput::ok)
            }
            Command::ApplyGate { gate, phase, operands } => self
                .apply_gate(gate, *phase, operands)
                .map(|(snapshot, merge)| CommandOutput::with_merge(snapshot, merge)),
            Command::Measure { register, index } => self.measure(register, *index).map(|bit| CommandOutput::ok(bit.to_string())),
            Command::Sample { register, index } => self.sample(register, *index).map(|bit| CommandOutput::ok(bit.to_string())),
            Command::DefineOracleFromTable { name, table } => self.define_oracle_from_table(name, table).map(CommandOutput::ok),
            Command::ApplyOracle { oracle, input, ancilla, ancilla_index } => {
                self.apply_oracle(oracle, input, ancilla, *ancilla_index).map(CommandOutput::ok)
            }
        };
        outcome.unwrap_or_else(|err| {
            warn!(%command, error = %err, "command failed");
            CommandOutput::failed(err.to_string())
        })
    }

    // --- Registers ---

    /// Creates one real register sized to the sum of `specs` and one nominal
    /// register per spec. The last spec sits at offset 0, earlier specs above
    /// it.
    ///
    /// Returns the snapshot of the new real register.
    pub fn create_register(&mut self, real_name: Option<&str>, real_size: Option<usize>, specs: &[NominalSpec]) -> Result<String> {
        if specs.is_empty() {
            return Err(EmulatorError::invalid("a register needs at least one nominal spec"));
        }
        let mut declared = BTreeSet::new();
        for spec in specs {
            if spec.name.is_empty() {
                return Err(EmulatorError::invalid("register name must not be empty"));
            }
            if spec.size == 0 {
                return Err(EmulatorError::invalid(format!("register '{}' must have at least one qubit", spec.name)));
            }
            if !declared.insert(spec.name.as_str()) || self.nominals.contains_key(&spec.name) {
                return Err(EmulatorError::DuplicateName { name: spec.name.clone() });
            }
        }
        let total = specs.iter().try_fold(0usize, |acc, spec| acc.checked_add(spec.size)).unwrap_or(usize::MAX);
        if let Some(size) = real_size {
            if size != total {
                return Err(EmulatorError::invalid(format!(
                    "real register size {} does not match the nominal sizes, which sum to {}",
                    size, total
                )));
            }
        }

        let (counter, name) = match real_name {
            Some(name) => (self.name_counter, name.to_string()),
            None => self.next_real_name(),
        };
        if self.reals.contains_key(&name) {
            return Err(EmulatorError::DuplicateName { name });
        }
        let real = QubitRegister::real(&name, total)?;

        self.name_counter = counter;
        let real_id = self.arena.insert_real(real)?;
        self.reals.insert(name.clone(), real_id);
        let mut offset = total;
        for spec in specs {
            offset -= spec.size;
            let id = self.arena.insert_nominal(&spec.name, spec.size, real_id, offset)?;
            self.nominals.insert(spec.name.clone(), id);
        }

        info!(real = %name, qubits = total, nominals = specs.len(), "created register");
        self.snapshot(&name)
    }

    fn next_real_name(&self) -> (u64, String) {
        let mut counter = self.name_counter;
        loop {
            counter += 1;
            let name = format!("real{}", counter);
            if !self.reals.contains_key(&name) {
                return (counter, name);
            }
        }
    }

    fn nominal_id(&self, name: &str) -> Result<RegisterId> {
        self.nominals.get(name).copied().ok_or_else(|| EmulatorError::unknown_register(name))
    }

    fn real_id(&self, name: &str) -> Result<RegisterId> {
        self.reals.get(name).copied().ok_or_else(|| EmulatorError::unknown_register(name))
    }

    fn check_index(&self, id: RegisterId, index: usize) -> Result<()> {
        let register = self.arena.get(id)?;
        if index >= register.size() {
            return Err(EmulatorError::IndexOutOfBounds {
                register: register.name().to_string(),
                index,
                size: register.size(),
            });
        }
        Ok(())
    }

    // --- Gates ---

    /// Applies gate `name` to `operands`, merging real registers first when
    /// the operands live on more than one.
    ///
    /// All checks run before anything is mutated: unknown registers, indices,
    /// gate name and arity, and the joined width. Returns the snapshot of the
    /// real register the gate ran on, plus merge details if a merge happened.
    pub fn apply_gate(&mut self, name: &str, phase: Option<f64>, operands: &[Operand]) -> Result<(String, Option<MergeInfo>)> {
        if operands.is_empty() {
            return Err(EmulatorError::invalid(format!("gate {} needs at least one operand", name)));
        }

        let mut resolved = Vec::with_capacity(operands.len());
        let mut involved: Vec<RegisterId> = Vec::new();
        for operand in operands {
            let id = self.nominal_id(&operand.register)?;
            self.check_index(id, operand.index)?;
            let (real, offset) = self.arena.resolve(id)?;
            if !involved.contains(&real) {
                involved.push(real);
            }
            resolved.push((real, offset + operand.index));
        }

        let plan = if involved.len() > 1 { Some(self.plan_merge(&involved)?) } else { None };
        let (targets, register_size) = match &plan {
            Some(plan) => {
                let targets = resolved
                    .iter()
                    .map(|(real, bit)| plan.offset_of(*real).map_or(*bit, |shift| shift + bit))
                    .collect::<Vec<_>>();
                (targets, plan.size)
            }
            None => {
                let size = self.arena.get(involved[0])?.size();
                (resolved.iter().map(|(_, bit)| *bit).collect(), size)
            }
        };
        let gate = gates::resolve(name, phase, &targets, register_size)?;

        let (real, merge) = match plan {
            Some(plan) => {
                let (real, info) = self.commit_merge(plan)?;
                (real, Some(info))
            }
            None => (involved[0], None),
        };

        let trace = apply(&gate, self.arena.state_mut(real)?);
        let real_name = self.arena.get(real)?.name().to_string();
        debug!(gate = %gate, real = %real_name, ?targets, contributions = trace.len(), "applied gate");
        self.last_trace = Some(trace);
        Ok((self.snapshot(&real_name)?, merge))
    }

    /// Lays out the join of `involved` (operand order, earlier registers in
    /// the more significant bits) without touching any register.
    fn plan_merge(&self, involved: &[RegisterId]) -> Result<MergePlan> {
        let mut registers = Vec::with_capacity(involved.len());
        for &id in involved {
            registers.push((id, self.arena.get(id)?));
        }
        let size: usize = registers.iter().map(|(_, reg)| reg.size()).sum();
        if size > MAX_QUBITS {
            return Err(EmulatorError::invalid(format!(
                "joining {} would need {} qubits, the limit is {}",
                registers.iter().map(|(_, reg)| reg.name()).collect::<Vec<_>>().join(", "),
                size,
                MAX_QUBITS
            )));
        }

        let mut name = registers[0].1.name().to_string();
        for (_, reg) in &registers[1..] {
            name = format!("join({},{})", name, reg.name());
        }
        if self.reals.contains_key(&name) {
            return Err(EmulatorError::DuplicateName { name });
        }

        let mut remaining = size;
        let parts = registers
            .iter()
            .map(|(id, reg)| {
                remaining -= reg.size();
                (*id, remaining)
            })
            .collect();
        Ok(MergePlan { parts, name, size })
    }

    /// Joins the planned registers, rebinds their nominal registers and
    /// drops the merged-away real registers.
    fn commit_merge(&mut self, plan: MergePlan) -> Result<(RegisterId, MergeInfo)> {
        let mut old_names = Vec::with_capacity(plan.parts.len());
        let mut joined: Option<QubitRegister> = None;
        for (id, _) in &plan.parts {
            let part = self.arena.get(*id)?;
            old_names.push(part.name().to_string());
            joined = Some(match joined {
                None => part.clone(),
                Some(acc) => {
                    let name = format!("join({},{})", acc.name(), part.name());
                    QubitRegister::tensor_product(&acc, part, &name)?
                }
            });
        }
        let joined = joined.ok_or_else(|| EmulatorError::invalid("nothing to merge"))?;
        let pre_merge_joined_state = joined.state().map(RegisterState::to_map).unwrap_or_default();
        let new_id = self.arena.insert_real(joined)?;

        // Work out every rebinding first, then apply them.
        let mut rebinds = Vec::new();
        for (name, &id) in &self.nominals {
            let (real, offset) = self.arena.resolve(id)?;
            if let Some(shift) = plan.offset_of(real) {
                rebinds.push((name.clone(), id, shift + offset));
            }
        }
        for (name, id, offset) in rebinds {
            self.arena.rebind(id, new_id, offset)?;
            debug!(nominal = %name, real = %plan.name, offset, "rebound nominal register");
        }

        for (id, _) in &plan.parts {
            self.arena.remove(*id);
        }
        self.reals.retain(|_, id| plan.offset_of(*id).is_none());
        self.reals.insert(plan.name.clone(), new_id);

        debug!(real = %plan.name, merged = ?old_names, qubits = plan.size, "merged real registers");
        Ok((
            new_id,
            MergeInfo {
                new_real_name: plan.name,
                old_real_names: old_names,
                pre_merge_joined_state,
            },
        ))
    }

    // --- Measurement ---

    fn draw(&mut self) -> f64 {
        StandardUniform.sample(&mut self.rng)
    }

    /// Measures qubit `index` of nominal register `name`, collapsing the
    /// state of its real register. Returns the observed bit.
    pub fn measure(&mut self, name: &str, index: usize) -> Result<u8> {
        let id = self.nominal_id(name)?;
        self.check_index(id, index)?;
        let sample = self.draw();
        let outcome = self.arena.measure_qubit(id, index, sample, self.config.degenerate_mass_epsilon)?;
        debug!(register = name, index, outcome, "measured qubit");
        Ok(outcome)
    }

    /// Draws an outcome for qubit `index` of `name` without collapsing.
    pub fn sample(&mut self, name: &str, index: usize) -> Result<u8> {
        let id = self.nominal_id(name)?;
        self.check_index(id, index)?;
        let sample = self.draw();
        self.arena.sample_qubit(id, index, sample)
    }

    // --- Oracles ---

    /// Defines oracle `name` from a truth table, replacing any previous
    /// definition of the same name.
    pub fn define_oracle_from_table(&mut self, name: &str, table: &TableSource) -> Result<String> {
        if name.is_empty() {
            return Err(EmulatorError::invalid("oracle name must not be empty"));
        }
        let definition = OracleDefinition::load(name, table)?;
        if self.oracles.contains_key(name) {
            warn!(oracle = name, "redefining oracle");
        }
        let status = format!(
            "Oracle '{}' defined: {} inputs, {} marked states",
            name,
            definition.input_size,
            definition.marked.len()
        );
        info!(oracle = name, inputs = definition.input_size, marked = definition.marked.len(), "defined oracle");
        self.oracles.insert(name.to_string(), definition);
        Ok(status)
    }

    /// Applies oracle `oracle` with nominal register `input` as its argument
    /// and `ancilla[ancilla_index]` as the flipped output bit.
    ///
    /// Both registers must already share a real register. The oracle reads
    /// every qubit of `input`, whatever the width of its table.
    pub fn apply_oracle(&mut self, oracle: &str, input: &str, ancilla: &str, ancilla_index: usize) -> Result<String> {
        let definition = self
            .oracles
            .get(oracle)
            .ok_or_else(|| EmulatorError::UnknownOracle { name: oracle.to_string() })?;
        let input_id = self.nominal_id(input)?;
        let ancilla_id = self.nominal_id(ancilla)?;
        self.check_index(ancilla_id, ancilla_index)?;

        let input_size = self.arena.get(input_id)?.size();
        let (input_real, input_offset) = self.arena.resolve(input_id)?;
        let (ancilla_real, ancilla_offset) = self.arena.resolve(ancilla_id)?;
        if input_real != ancilla_real {
            return Err(EmulatorError::UnsupportedMerge {
                message: format!("'{}' and '{}' live on different real registers", input, ancilla),
            });
        }
        let gate = OracleGate::new(definition, input_offset, input_size, ancilla_offset + ancilla_index)?;

        let trace = apply(&gate, self.arena.state_mut(input_real)?);
        let real_name = self.arena.get(input_real)?.name().to_string();
        debug!(oracle, input, ancilla, ancilla_index, real = %real_name, "applied oracle");
        self.last_trace = Some(trace);
        self.snapshot(&real_name)
    }

    // --- Queries ---

    /// State seen through nominal register `name`.
    pub fn register_state(&self, name: &str) -> Result<&RegisterState> {
        self.arena.state(self.nominal_id(name)?)
    }

    /// State of real register `name`.
    pub fn real_register_state(&self, name: &str) -> Result<&RegisterState> {
        self.arena.state(self.real_id(name)?)
    }

    /// Name of the real register behind nominal register `name`.
    pub fn real_name_of(&self, name: &str) -> Result<&str> {
        let (real, _) = self.arena.resolve(self.nominal_id(name)?)?;
        Ok(self.arena.get(real)?.name())
    }

    /// Nominal registers by name.
    pub fn nominal_registers(&self) -> impl Iterator<Item = (&str, &QubitRegister)> + '_ {
        self.nominals
            .iter()
            .filter_map(|(name, id)| self.arena.get(*id).ok().map(|reg| (name.as_str(), reg)))
    }

    /// Real registers by name.
    pub fn real_registers(&self) -> impl Iterator<Item = (&str, &QubitRegister)> + '_ {
        self.reals
            .iter()
            .filter_map(|(name, id)| self.arena.get(*id).ok().map(|reg| (name.as_str(), reg)))
    }

    pub fn oracle(&self, name: &str) -> Option<&OracleDefinition> {
        self.oracles.get(name)
    }

    /// Contributions recorded by the most recent gate or oracle application.
    pub fn last_gate_trace(&self) -> Option<&GateTrace> {
        self.last_trace.as_ref()
    }

    /// One line per active state of real register `name`.
    pub fn snapshot(&self, name: &str) -> Result<String> {
        Ok(self.real_register_state(name)?.to_string())
    }

    // --- Persistence ---

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores an emulation saved by [`Emulation::to_json`]. The measurement
    /// rng restarts from the saved configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut emulation: Emulation = serde_json::from_str(json)?;
        emulation.rng = emulation.config.rng();
        Ok(emulation)
    }
}
