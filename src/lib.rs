//! # Refute - Counter-Example Search for Rust
//!
//! Refute is a property-based testing engine: it generates random
//! argument tuples from a 64-bit seed, runs a property over them, and
//! when the property fails, shrinks the counter-example to a locally
//! minimal failing case reported together with the seed that replays it.
//!
//! Argument types join a run through the [`TypeInfo`] vocabulary:
//! allocation is mandatory, hashing (which unlocks duplicate
//! suppression), shrinking, and printing are opt-in capabilities.
//!
//! ## Quick Start
//!
//! ```rust
//! use refute::primitives::IntInfo;
//! use refute::{Args, Engine, RunConfig, TrialOutcome, Verdict};
//!
//! let config = RunConfig::builder()
//!     .name("small sums stay small")
//!     .seed(0x5eed)
//!     .arg(IntInfo::new(0u32, 1000))
//!     .arg(IntInfo::new(0u32, 1000))
//!     .property(|args: Args<'_>| {
//!         let a = *args.get::<u32>(0).unwrap();
//!         let b = *args.get::<u32>(1).unwrap();
//!         if a + b <= 2000 {
//!             TrialOutcome::Pass
//!         } else {
//!             TrialOutcome::Fail
//!         }
//!     })
//!     .build();
//!
//! let mut engine = Engine::new();
//! let summary = engine.run(config).unwrap();
//! assert_eq!(summary.verdict, Verdict::Pass);
//! assert_eq!(summary.report.attempted(), 100);
//! ```
//!
//! Every trial derives its own seed from the run seed, so a reported
//! failure replays exactly from the printed trial seed, via
//! [`Engine::reproduce`] or [`RunConfigBuilder::replay`].

// Public modules
pub mod bloom;
pub mod config;
pub mod engine;
pub mod error;
pub mod primitives;
pub mod property;
pub mod report;
pub mod stream;
pub mod typeinfo;

mod shrink;

// Re-export the main public API
pub use bloom::BloomFilter;
pub use config::{DEFAULT_TRIALS, MAX_ARGS, Progress, RunConfig, RunConfigBuilder, TrialUpdate};
pub use engine::Engine;
pub use error::EngineError;
pub use property::{Property, TrialOutcome};
pub use report::{Failure, RunReport, RunSummary, Verdict};
pub use stream::{RandomStream, derive_trial_seed};
pub use typeinfo::{ArgInfo, Args, Shrunk, TypeInfo};
