//! Run counters, failure records, and reproducer formatting.

use std::fmt::Write as _;

/// Overall verdict of a completed run.
///
/// `Skip` means at least one trial was skipped and none failed. Fatal
/// conditions never produce a verdict; they surface as
/// [`EngineError`](crate::EngineError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    /// Every attempted trial passed (duplicates aside).
    Pass,
    /// At least one trial failed.
    Fail,
    /// At least one trial was skipped and none failed.
    Skip,
}

/// Running totals over one run, updated monotonically per trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    /// Trials whose property held.
    pub passes: u64,
    /// Trials whose property was violated.
    pub failures: u64,
    /// Trials the property or allocator declined to judge.
    pub skipped: u64,
    /// Trials suppressed because the tuple was seen before.
    pub duplicates: u64,
}

impl RunReport {
    /// Trials actually attempted: the four counters always sum to this.
    pub fn attempted(&self) -> u64 {
        self.passes + self.failures + self.skipped + self.duplicates
    }
}

/// One reported counter-example, after shrinking.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Failure {
    /// Index of the failing trial within the run.
    pub trial: usize,
    /// Seed the whole run started from.
    pub run_seed: u64,
    /// Seed that reproduces this trial's argument tuple.
    pub trial_seed: u64,
    /// Rendering of each shrunk argument, `None` where the position has
    /// no print operation.
    pub arguments: Vec<Option<String>>,
}

impl Failure {
    /// Canonical human-readable reproducer block.
    ///
    /// A position without a printer is rendered as its seed-derived
    /// identity: the trial seed plus the position index pin the value
    /// down completely.
    pub fn render(&self, name: Option<&str>) -> String {
        let mut out = String::new();
        match name {
            Some(name) => {
                let _ = writeln!(out, "FAIL: property '{}' at trial {}", name, self.trial);
            }
            None => {
                let _ = writeln!(out, "FAIL: property at trial {}", self.trial);
            }
        }
        let _ = writeln!(out, "  run seed:   {:#018x}", self.run_seed);
        let _ = writeln!(out, "  trial seed: {:#018x}", self.trial_seed);
        for (pos, rendered) in self.arguments.iter().enumerate() {
            match rendered {
                Some(text) => {
                    let _ = writeln!(out, "  arg {}: {}", pos, text);
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  arg {}: <no printer; position {} of trial seed {:#018x}>",
                        pos, pos, self.trial_seed
                    );
                }
            }
        }
        out
    }
}

/// Everything a finished run reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Overall verdict across all attempted trials.
    pub verdict: Verdict,
    /// The run seed actually used; with an unseeded configuration this is
    /// the entropy-drawn seed that replays the whole run.
    pub seed: u64,
    /// Final counters.
    pub report: RunReport,
    /// Every counter-example found, already shrunk, in trial order.
    pub failures: Vec<Failure>,
}
