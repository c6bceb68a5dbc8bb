// src/core/store.rs

//! Sparse, chunked storage of basis-state amplitudes.

use super::complex::{Amplitude, AmplitudeExt, ZERO};
use super::constants::emulator_constants::CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Integer encoding one joint 0/1 assignment of a register's qubits.
/// Bit `i` holds the value of qubit `i`.
pub type BasisIndex = u64;

type Chunk = Box<[Amplitude; CHUNK_SIZE]>;

/// Maps basis indices to amplitudes, storing only chunks that hold a non-zero entry.
///
/// An absent index reads as zero and writing an exact zero frees the slot; a
/// chunk whose entries are all zero is dropped as a unit. There is no bounds
/// check against `2^n`, callers keep indices inside their register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(BasisIndex, Amplitude)>", into = "Vec<(BasisIndex, Amplitude)>")]
pub struct AmplitudeStore {
    chunks: HashMap<u64, Chunk>,
    /// Number of stored non-zero entries.
    populated: usize,
}

impl AmplitudeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn locate(index: BasisIndex) -> (u64, usize) {
        (index / CHUNK_SIZE as u64, (index % CHUNK_SIZE as u64) as usize)
    }

    /// Returns the amplitude stored at `index`, zero if unset.
    pub fn get(&self, index: BasisIndex) -> Amplitude {
        let (chunk_id, slot) = Self::locate(index);
        self.chunks.get(&chunk_id).map_or(ZERO, |chunk| chunk[slot])
    }

    /// Stores `value` at `index`. An exact zero frees the slot and, if the
    /// chunk becomes empty, the chunk itself.
    pub fn set(&mut self, index: BasisIndex, value: Amplitude) {
        let (chunk_id, slot) = Self::locate(index);
        if value.is_exact_zero() {
            let Some(chunk) = self.chunks.get_mut(&chunk_id) else {
                return;
            };
            if !chunk[slot].is_exact_zero() {
                self.populated -= 1;
            }
            chunk[slot] = ZERO;
            if chunk.iter().all(|c| c.is_exact_zero()) {
                self.chunks.remove(&chunk_id);
            }
            return;
        }

        let chunk = self.chunks.entry(chunk_id).or_insert_with(|| Box::new([ZERO; CHUNK_SIZE]));
        if chunk[slot].is_exact_zero() {
            self.populated += 1;
        }
        chunk[slot] = value;
    }

    /// Drops every stored amplitude.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.populated = 0;
    }

    /// Number of non-zero entries.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates over stored non-zero entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (BasisIndex, Amplitude)> + '_ {
        let mut chunk_ids: Vec<u64> = self.chunks.keys().copied().collect();
        chunk_ids.sort_unstable();
        chunk_ids.into_iter().flat_map(move |chunk_id| {
            let chunk = &self.chunks[&chunk_id];
            chunk
                .iter()
                .enumerate()
                .filter(|(_, amp)| !amp.is_exact_zero())
                .map(move |(slot, amp)| (chunk_id * CHUNK_SIZE as u64 + slot as u64, *amp))
        })
    }
}

impl From<Vec<(BasisIndex, Amplitude)>> for AmplitudeStore {
    fn from(entries: Vec<(BasisIndex, Amplitude)>) -> Self {
        let mut store = AmplitudeStore::new();
        for (index, amp) in entries {
            store.set(index, amp);
        }
        store
    }
}

impl From<AmplitudeStore> for Vec<(BasisIndex, Amplitude)> {
    fn from(store: AmplitudeStore) -> Self {
        store.iter().collect()
    }
}
