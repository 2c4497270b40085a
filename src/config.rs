//! Run configuration and its builder.

use std::io;

use crate::error::EngineError;
use crate::property::{Property, TrialOutcome};
use crate::report::RunReport;
use crate::typeinfo::ArgInfo;

/// Upper bound on argument positions per property.
pub const MAX_ARGS: usize = 8;

/// Default number of trials when the configuration does not set one.
pub const DEFAULT_TRIALS: usize = 100;

/// What the progress hook tells the engine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Keep running trials.
    Continue,
    /// Terminate the run cleanly with the counters so far.
    Halt,
}

/// Per-trial snapshot handed to the progress hook.
#[derive(Debug)]
pub struct TrialUpdate<'a> {
    /// Index of the trial that just finished.
    pub trial: usize,
    /// Total trials the run was configured for.
    pub trials: usize,
    /// Outcome of this trial; `None` when the tuple was suppressed as a
    /// duplicate and the property never ran.
    pub outcome: Option<TrialOutcome>,
    /// Seed of the trial that just finished.
    pub trial_seed: u64,
    /// Counters after this trial.
    pub report: &'a RunReport,
}

pub(crate) type ProgressHook = Box<dyn FnMut(&TrialUpdate<'_>) -> Progress>;

/// Everything one run needs: the property, its argument vocabulary, and
/// the knobs around them.
///
/// Built through [`RunConfig::builder`]; validated by the engine before
/// the first trial so misconfiguration surfaces as
/// [`EngineError`](crate::EngineError) rather than a partial run.
pub struct RunConfig {
    pub(crate) name: Option<String>,
    pub(crate) trials: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) replay: Option<u64>,
    pub(crate) infos: Vec<ArgInfo>,
    pub(crate) property: Option<Box<dyn Property>>,
    pub(crate) progress: Option<ProgressHook>,
    pub(crate) sink: Option<Box<dyn io::Write>>,
}

impl RunConfig {
    /// Start building a configuration.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: RunConfig {
                name: None,
                trials: DEFAULT_TRIALS,
                seed: None,
                replay: None,
                infos: Vec::new(),
                property: None,
                progress: None,
                sink: None,
            },
        }
    }

    /// Property name used in failure reports, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Configured trial count.
    pub fn trials(&self) -> usize {
        self.trials
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.property.is_none() {
            return Err(EngineError::MissingProperty);
        }
        if self.infos.is_empty() {
            return Err(EngineError::NoArguments);
        }
        if self.infos.len() > MAX_ARGS {
            return Err(EngineError::TooManyArguments {
                given: self.infos.len(),
                max: MAX_ARGS,
            });
        }
        if self.trials == 0 {
            return Err(EngineError::InvalidTrials(self.trials));
        }
        Ok(())
    }
}

/// Builder for [`RunConfig`].
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Name the property for failure reports.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Number of trials to attempt (default 100).
    pub fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    /// Fix the run seed. Without one, the engine draws a seed from OS
    /// entropy and reports it, so every run stays reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Replay a single trial with exactly this trial seed instead of
    /// deriving seeds from the run seed. The reproduction path for a
    /// reported failure.
    pub fn replay(mut self, trial_seed: u64) -> Self {
        self.config.replay = Some(trial_seed);
        self
    }

    /// Append one argument position. Accepts a [`TypeInfo`] value or an
    /// [`ArgInfo`] handle; pass a cloned handle to share one vocabulary
    /// across positions.
    ///
    /// [`TypeInfo`]: crate::TypeInfo
    pub fn arg(mut self, info: impl Into<ArgInfo>) -> Self {
        self.config.infos.push(info.into());
        self
    }

    /// The property under test.
    pub fn property<P: Property + 'static>(mut self, property: P) -> Self {
        self.config.property = Some(Box::new(property));
        self
    }

    /// Hook invoked after every trial with the counters so far; return
    /// [`Progress::Halt`] to end the run cleanly.
    pub fn on_progress<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&TrialUpdate<'_>) -> Progress + 'static,
    {
        self.config.progress = Some(Box::new(hook));
        self
    }

    /// Sink for rendered failure reports. Without one they go to stderr.
    pub fn sink<W: io::Write + 'static>(mut self, sink: W) -> Self {
        self.config.sink = Some(Box::new(sink));
        self
    }

    /// Finish building. Validation happens in [`Engine::run`] so that
    /// configuration errors surface as run errors, before any trial.
    ///
    /// [`Engine::run`]: crate::Engine::run
    pub fn build(self) -> RunConfig {
        self.config
    }
}
