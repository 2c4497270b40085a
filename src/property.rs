//! Property definition trait and per-trial outcomes.

use crate::typeinfo::Args;

/// Verdict of one property invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrialOutcome {
    /// The property holds for this tuple.
    Pass,
    /// The property is violated; the tuple is a counter-example.
    Fail,
    /// The property declines to judge this input.
    Skip,
    /// Something went wrong; the whole run must abort.
    Error,
}

/// A logical property over one or more generated arguments.
///
/// Implemented for free by any `Fn(Args<'_>) -> TrialOutcome` closure.
pub trait Property {
    /// Judge the argument tuple.
    fn test(&self, args: Args<'_>) -> TrialOutcome;
}

impl<F> Property for F
where
    F: for<'a> Fn(Args<'a>) -> TrialOutcome,
{
    fn test(&self, args: Args<'_>) -> TrialOutcome {
        self(args)
    }
}
