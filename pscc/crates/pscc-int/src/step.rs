//! The execution trace record.

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde_json::{Map, Value as Json};
use std::hash::BuildHasherDefault;

use crate::value::Value;

/// The global variable store. Insertion-ordered so snapshots and their
/// JSON form list variables in order of first assignment.
pub type VarStore = IndexMap<String, Value, BuildHasherDefault<FxHasher>>;

/// One recorded observation of interpreter progress.
///
/// `step_number` is monotone across a run. `snapshot` is a deep copy of
/// the store taken after the step completed, so the step following an
/// assignment already shows the new binding. `output_so_far` is the
/// cumulative output buffer at recording time and is therefore monotone
/// non-decreasing across the trace.
#[derive(Debug, Clone)]
pub struct ExecutionStep {
    pub step_number: usize,
    /// Node-kind name (`ASSIGNMENT`, `BIN_OP`, ...).
    pub node_kind: &'static str,
    /// Source line of the node; 0 for synthetic nodes (program, blocks).
    pub line: u32,
    /// Human-readable Romanian description of what happened.
    pub description: String,
    /// Deep copy of the variable store after the step.
    pub snapshot: VarStore,
    /// The value the node produced, if any.
    pub value: Option<Value>,
    /// The node's auxiliary attributes (operator, iterator, ...).
    pub node_details: Map<String, Json>,
    /// Cumulative output buffer contents at recording time.
    pub output_so_far: String,
}
