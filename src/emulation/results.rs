// src/emulation/results.rs
use crate::core::complex::{Amplitude, AmplitudeExt};
use crate::core::state::basis_label;
use crate::core::store::BasisIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-application record of which basis states fed which, and by how much.
///
/// Contributions from the same `from` to the same `to` are summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateTrace {
    contributions: BTreeMap<BasisIndex, BTreeMap<BasisIndex, Amplitude>>,
}

impl GateTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, from: BasisIndex, to: BasisIndex, amp: Amplitude) {
        *self.contributions.entry(from).or_default().entry(to).or_default() += amp;
    }

    /// The amplitude `from` contributed to `to`, if any.
    pub fn contribution(&self, from: BasisIndex, to: BasisIndex) -> Option<Amplitude> {
        self.contributions.get(&from).and_then(|targets| targets.get(&to)).copied()
    }

    /// Targets reached from `from`.
    pub fn targets(&self, from: BasisIndex) -> Option<&BTreeMap<BasisIndex, Amplitude>> {
        self.contributions.get(&from)
    }

    /// All `(from, to, amplitude)` triples, ordered by `from` then `to`.
    pub fn iter(&self) -> impl Iterator<Item = (BasisIndex, BasisIndex, Amplitude)> + '_ {
        self.contributions
            .iter()
            .flat_map(|(&from, targets)| targets.iter().map(move |(&to, &amp)| (from, to, amp)))
    }

    /// Number of recorded `(from, to)` pairs.
    pub fn len(&self) -> usize {
        self.contributions.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Renders the trace with basis labels of `width` bits.
    pub fn render(&self, width: usize) -> String {
        self.iter()
            .map(|(from, to, amp)| format!("|{}> -> |{}>: {}", basis_label(from, width), basis_label(to, width), amp.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What a merge did: which real registers were joined, and the joined state
/// before the triggering gate ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeInfo {
    pub new_real_name: String,
    pub old_real_names: Vec<String>,
    pub pre_merge_joined_state: BTreeMap<BasisIndex, Amplitude>,
}

/// Outcome of one command run through [`Emulation::run`](super::Emulation::run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Human-readable result or error description.
    pub status: String,
    /// Present when the command merged real registers.
    pub merge: Option<MergeInfo>,
    /// `false` if the command failed and changed nothing.
    pub succeeded: bool,
}

impl CommandOutput {
    pub fn ok(status: impl Into<String>) -> Self {
        Self { status: status.into(), merge: None, succeeded: true }
    }

    pub fn with_merge(status: impl Into<String>, merge: Option<MergeInfo>) -> Self {
        Self { status: status.into(), merge, succeeded: true }
    }

    pub fn failed(status: impl Into<String>) -> Self {
        Self { status: status.into(), merge: None, succeeded: false }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.succeeded {
            write!(f, "Error: ")?;
        }
        write!(f, "{}", self.status)?;
        if let Some(merge) = &self.merge {
            write!(f, "\n[merged {} into {}]", merge.old_real_names.join(", "), merge.new_real_name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::complex::ONE;

    #[test]
    fn test_trace_sums_repeated_pairs() {
        let mut trace = GateTrace::new();
        trace.record(0, 1, ONE);
        trace.record(0, 1, ONE);
        trace.record(2, 3, -ONE);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.contribution(0, 1), Some(Amplitude::new(2.0, 0.0)));
        assert_eq!(trace.render(2), "|00> -> |01>: 2.00 + 0.00i\n|10> -> |11>: -1.00 + 0.00i");
    }

    #[test]
    fn test_output_display() {
        assert_eq!(CommandOutput::ok("done").to_string(), "done");
        assert_eq!(CommandOutput::failed("boom").to_string(), "Error: boom");
        let merge = MergeInfo {
            new_real_name: "join(a,b)".to_string(),
            old_real_names: vec!["a".to_string(), "b".to_string()],
            pre_merge_joined_state: BTreeMap::new(),
        };
        assert_eq!(
            CommandOutput::with_merge("ok", Some(merge)).to_string(),
            "ok\n[merged a, b into join(a,b)]"
        );
    }
}
