//! Type-info vocabulary: how user input types participate in a run.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use xxhash_rust::xxh3::Xxh3;

use crate::stream::RandomStream;

/// Result of asking a vocabulary to simplify a value with one tactic.
#[derive(Debug)]
pub enum Shrunk<T> {
    /// A freshly owned, strictly simpler value.
    Value(T),
    /// This tactic does not apply to this value; try the next index.
    DeadEnd,
    /// No tactic with this index or higher applies to this value.
    NoMoreTactics,
}

/// Capability set describing one argument position.
///
/// `allocate` is the only required operation. The optional operations opt
/// the type into duplicate suppression (`hash`), counter-example reduction
/// (`shrink`), and failure-report rendering (`print`); each default
/// declines its capability. State a C-style implementation would thread
/// through an environment pointer lives in the implementing struct
/// instead, so every operation already sees it through `&self`.
///
/// Contracts, which the engine relies on and cannot check:
///
/// - `allocate` must be a pure function of the words it draws from the
///   stream, so a replayed trial seed rebuilds an equivalent value.
///   Returning `None` declines the seed; the trial is counted as skipped.
/// - `hash` must be stable across calls and distribute well.
/// - `shrink` must be deterministic for a fixed (value, tactic) pair and
///   globally well-founded: no infinite descending chain may exist across
///   any combination of tactics. Convention orders tactics from coarsest
///   to finest so the breadth-first descent converges quickly.
pub trait TypeInfo {
    /// The argument type this vocabulary describes.
    type Value: 'static;

    /// Draw a fresh value from the random stream.
    fn allocate(&self, stream: &mut RandomStream) -> Option<Self::Value>;

    /// Hash the value, or `None` if this position does not hash.
    fn hash(&self, value: &Self::Value) -> Option<u64> {
        let _ = value;
        None
    }

    /// Produce a strictly simpler variant of `value` under `tactic`.
    fn shrink(&self, value: &Self::Value, tactic: u32) -> Shrunk<Self::Value> {
        let _ = (value, tactic);
        Shrunk::NoMoreTactics
    }

    /// Render the value for a failure report, or `None` if this position
    /// does not print.
    fn print(&self, value: &Self::Value) -> Option<String> {
        let _ = value;
        None
    }
}

/// An argument value owned by the engine between allocation and release.
pub(crate) type ArgValue = Box<dyn Any>;

/// Object-safe face of [`TypeInfo`] used by the trial runner and shrinker.
pub(crate) trait ErasedTypeInfo {
    fn allocate(&self, stream: &mut RandomStream) -> Option<ArgValue>;
    fn hash(&self, value: &dyn Any) -> Option<u64>;
    fn shrink(&self, value: &dyn Any, tactic: u32) -> Shrunk<ArgValue>;
    fn print(&self, value: &dyn Any) -> Option<String>;
}

struct InfoCell<I> {
    info: I,
}

impl<I: TypeInfo> ErasedTypeInfo for InfoCell<I> {
    fn allocate(&self, stream: &mut RandomStream) -> Option<ArgValue> {
        self.info
            .allocate(stream)
            .map(|value| Box::new(value) as ArgValue)
    }

    fn hash(&self, value: &dyn Any) -> Option<u64> {
        let value = value.downcast_ref::<I::Value>()?;
        self.info.hash(value)
    }

    fn shrink(&self, value: &dyn Any, tactic: u32) -> Shrunk<ArgValue> {
        let Some(value) = value.downcast_ref::<I::Value>() else {
            return Shrunk::NoMoreTactics;
        };
        match self.info.shrink(value, tactic) {
            Shrunk::Value(simpler) => Shrunk::Value(Box::new(simpler) as ArgValue),
            Shrunk::DeadEnd => Shrunk::DeadEnd,
            Shrunk::NoMoreTactics => Shrunk::NoMoreTactics,
        }
    }

    fn print(&self, value: &dyn Any) -> Option<String> {
        let value = value.downcast_ref::<I::Value>()?;
        self.info.print(value)
    }
}

/// Type-erased, cheaply clonable handle to one [`TypeInfo`].
///
/// Cloning the handle shares the underlying vocabulary, so the same info
/// can back several argument positions; identity is the shared allocation,
/// not structural equality.
#[derive(Clone)]
pub struct ArgInfo {
    inner: Arc<dyn ErasedTypeInfo>,
}

impl ArgInfo {
    /// Erase a typed vocabulary into a positional handle.
    pub fn new<I: TypeInfo + 'static>(info: I) -> Self {
        Self {
            inner: Arc::new(InfoCell { info }),
        }
    }

    pub(crate) fn erased(&self) -> &dyn ErasedTypeInfo {
        self.inner.as_ref()
    }
}

impl fmt::Debug for ArgInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgInfo")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<I: TypeInfo + 'static> From<I> for ArgInfo {
    fn from(info: I) -> Self {
        ArgInfo::new(info)
    }
}

/// Positional, read-only view of the current argument tuple.
///
/// Handed to the property on every invocation, during generation and
/// during shrinking alike. Positions are addressed left to right in
/// registration order.
#[derive(Clone, Copy)]
pub struct Args<'a> {
    values: &'a [ArgValue],
}

impl<'a> Args<'a> {
    pub(crate) fn new(values: &'a [ArgValue]) -> Self {
        Self { values }
    }

    /// Number of argument positions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the tuple has no positions.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `pos`, or `None` when the position is out of range or
    /// holds a different type than `T`.
    pub fn get<T: 'static>(&self, pos: usize) -> Option<&'a T> {
        self.values.get(pos)?.downcast_ref::<T>()
    }
}

impl fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("len", &self.len()).finish()
    }
}

/// Composite hash of an argument tuple.
///
/// Folds each position's hash together with its index into one incremental
/// sink, so equal values at different positions hash differently. Returns
/// `None` as soon as any position declines to hash; such tuples are
/// treated as novel and never consult the bloom filter.
pub(crate) fn tuple_hash(infos: &[ArgInfo], values: &[ArgValue]) -> Option<u64> {
    let mut sink = Xxh3::new();
    for (pos, (info, value)) in infos.iter().zip(values.iter()).enumerate() {
        let hash = info.erased().hash(value.as_ref())?;
        sink.update(&(pos as u64).to_le_bytes());
        sink.update(&hash.to_le_bytes());
    }
    Some(sink.digest())
}
