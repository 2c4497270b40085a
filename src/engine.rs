//! Trial runner: the engine that searches for counter-examples.

use std::io::Write as _;

use log::{debug, trace};

use crate::bloom::{BloomFilter, MAX_BITS};
use crate::config::{Progress, ProgressHook, RunConfig, TrialUpdate};
use crate::error::EngineError;
use crate::property::TrialOutcome;
use crate::report::{Failure, RunReport, RunSummary, Verdict};
use crate::shrink::shrink_tuple;
use crate::stream::{RandomStream, derive_trial_seed};
use crate::typeinfo::{ArgValue, Args, tuple_hash};

/// The search-and-shrink engine.
///
/// An engine is configured once (bloom sizing) and can drive any number
/// of runs. All state belonging to one run (the bloom filter, the
/// counters, the failures) is created inside [`Engine::run`] and handed
/// back in the [`RunSummary`]; dropping the engine releases everything.
///
/// The engine is single-threaded and non-reentrant: callbacks run
/// synchronously on the caller's thread and must not re-enter the same
/// engine instance.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    bloom_bits: Option<u8>,
}

impl Engine {
    /// Engine with auto-sized duplicate suppression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose bloom filter uses `2^bits` bits. Zero requests
    /// auto-sizing; anything above the supported cap is clamped.
    pub fn with_bloom_bits(bits: u8) -> Self {
        if bits == 0 {
            Self::new()
        } else {
            Self {
                bloom_bits: Some(bits.min(MAX_BITS)),
            }
        }
    }

    /// Execute a run: generate argument tuples trial by trial, invoke the
    /// property, shrink and report counter-examples.
    ///
    /// Configuration problems and a property signaling
    /// [`TrialOutcome::Error`] come back as `Err`; every informative
    /// outcome is a [`RunSummary`].
    pub fn run(&mut self, mut config: RunConfig) -> Result<RunSummary, EngineError> {
        config.validate()?;
        let Some(property) = config.property.take() else {
            return Err(EngineError::MissingProperty);
        };

        let run_seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let trials = if config.replay.is_some() {
            1
        } else {
            config.trials
        };

        let mut bloom = match self.bloom_bits {
            Some(bits) => BloomFilter::with_bit_exponent(bits),
            None => BloomFilter::sized_for(trials),
        };
        debug!(
            "run start: seed {:#018x}, {} trials, bloom {} bits",
            run_seed,
            trials,
            bloom.bit_count()
        );

        let mut report = RunReport::default();
        let mut failures: Vec<Failure> = Vec::new();

        for trial in 0..trials {
            let trial_seed = match config.replay {
                Some(seed) => seed,
                None => derive_trial_seed(run_seed, trial as u64),
            };
            let mut stream = RandomStream::new(trial_seed);

            // Allocate the tuple position by position, every allocator
            // drawing from the same stream.
            let mut values: Vec<ArgValue> = Vec::with_capacity(config.infos.len());
            let mut declined = false;
            for info in &config.infos {
                match info.erased().allocate(&mut stream) {
                    Some(value) => values.push(value),
                    None => {
                        declined = true;
                        break;
                    }
                }
            }
            if declined {
                drop(values);
                report.skipped += 1;
                trace!("trial {} ({:#018x}): allocator declined", trial, trial_seed);
                if notify(
                    &mut config.progress,
                    trial,
                    trials,
                    Some(TrialOutcome::Skip),
                    trial_seed,
                    &report,
                ) == Progress::Halt
                {
                    break;
                }
                continue;
            }

            if let Some(hash) = tuple_hash(&config.infos, &values)
                && bloom.test_and_set(hash)
            {
                drop(values);
                report.duplicates += 1;
                trace!("trial {} ({:#018x}): duplicate tuple", trial, trial_seed);
                if notify(
                    &mut config.progress,
                    trial,
                    trials,
                    None,
                    trial_seed,
                    &report,
                ) == Progress::Halt
                {
                    break;
                }
                continue;
            }

            let outcome = property.test(Args::new(&values));
            trace!("trial {} ({:#018x}): {:?}", trial, trial_seed, outcome);
            match outcome {
                TrialOutcome::Pass => {
                    drop(values);
                    report.passes += 1;
                }
                TrialOutcome::Skip => {
                    drop(values);
                    report.skipped += 1;
                }
                TrialOutcome::Error => {
                    drop(values);
                    // The hook still observes the terminal outcome; its
                    // verdict is moot since the run is ending anyway.
                    let _ = notify(
                        &mut config.progress,
                        trial,
                        trials,
                        Some(TrialOutcome::Error),
                        trial_seed,
                        &report,
                    );
                    return Err(EngineError::PropertyAborted {
                        trial,
                        seed: trial_seed,
                    });
                }
                TrialOutcome::Fail => {
                    report.failures += 1;
                    let shrunk =
                        shrink_tuple(&config.infos, property.as_ref(), &mut bloom, values);
                    let failure = Failure {
                        trial,
                        run_seed,
                        trial_seed,
                        arguments: config
                            .infos
                            .iter()
                            .zip(shrunk.iter())
                            .map(|(info, value)| info.erased().print(value.as_ref()))
                            .collect(),
                    };
                    drop(shrunk);

                    let text = failure.render(config.name.as_deref());
                    match config.sink.as_mut() {
                        Some(sink) => {
                            let _ = sink.write_all(text.as_bytes());
                        }
                        None => eprint!("{}", text),
                    }
                    failures.push(failure);
                }
            }

            if notify(
                &mut config.progress,
                trial,
                trials,
                Some(outcome),
                trial_seed,
                &report,
            ) == Progress::Halt
            {
                break;
            }
        }

        let verdict = if report.failures > 0 {
            Verdict::Fail
        } else if report.skipped > 0 {
            Verdict::Skip
        } else {
            Verdict::Pass
        };
        debug!(
            "run finished: {:?} after {} attempted trials",
            verdict,
            report.attempted()
        );

        Ok(RunSummary {
            verdict,
            seed: run_seed,
            report,
            failures,
        })
    }

    /// Replay a single trial with exactly `trial_seed`, re-deriving the
    /// reported argument tuple and verdict. Equivalent to setting
    /// [`RunConfigBuilder::replay`](crate::RunConfigBuilder::replay).
    pub fn reproduce(
        &mut self,
        mut config: RunConfig,
        trial_seed: u64,
    ) -> Result<RunSummary, EngineError> {
        config.replay = Some(trial_seed);
        self.run(config)
    }
}

fn notify(
    hook: &mut Option<ProgressHook>,
    trial: usize,
    trials: usize,
    outcome: Option<TrialOutcome>,
    trial_seed: u64,
    report: &RunReport,
) -> Progress {
    match hook.as_mut() {
        Some(hook) => hook(&TrialUpdate {
            trial,
            trials,
            outcome,
            trial_seed,
            report,
        }),
        None => Progress::Continue,
    }
}
