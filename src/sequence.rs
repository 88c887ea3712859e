//! # Sequence Module
//!
//! Output sequences flowing through the spider middleware chain, and the
//! materializer that drains lazily produced sequences.
//!
//! ## Overview
//!
//! A spider callback or an output hook may hand back its results in two
//! shapes: an eager `Vec` that is already fully computed, or a lazy iterator
//! whose elements are computed on demand and which may fail partway through.
//! A lazy sequence left unevaluated would report its failure wherever it is
//! finally iterated, far from the stage that produced it. `materialize`
//! drives such a sequence to completion right away so that the failure is
//! attributed to the stage that produced it, and no partial output leaks
//! downstream.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spider_spidermw::sequence::{materialize, Sequence};
//!
//! let lazy = Sequence::lazy((0..3).map(|i| Ok(SpiderOutput::Item(i))));
//! let realized = materialize(lazy)?;
//! assert!(realized.is_realized());
//! ```

use crate::error::SpiderError;
use crate::item::SpiderOutput;
use std::fmt;
use std::vec;

type LazyIter<I> = Box<dyn Iterator<Item = Result<SpiderOutput<I>, SpiderError>> + Send>;

/// A sequence of items and requests.
pub enum Sequence<I> {
    /// Fully computed and reusable.
    Eager(Vec<SpiderOutput<I>>),
    /// Computed on demand; single use, may fail partway through.
    Lazy(LazyIter<I>),
    /// The drained contents of a lazy sequence; forward-only, iterated once.
    Realized(vec::IntoIter<SpiderOutput<I>>),
}

impl<I> Sequence<I> {
    /// An empty eager sequence.
    pub fn empty() -> Self {
        Sequence::Eager(Vec::new())
    }

    /// Wraps a fallible iterator as a lazy sequence.
    pub fn lazy<T>(iter: T) -> Self
    where
        T: Iterator<Item = Result<SpiderOutput<I>, SpiderError>> + Send + 'static,
    {
        Sequence::Lazy(Box::new(iter))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Sequence::Lazy(_))
    }

    pub fn is_realized(&self) -> bool {
        matches!(self, Sequence::Realized(_))
    }

    /// Collects the sequence into a vector, surfacing any lazy failure.
    pub fn into_vec(self) -> Result<Vec<SpiderOutput<I>>, SpiderError> {
        match self {
            Sequence::Eager(outputs) => Ok(outputs),
            Sequence::Realized(iter) => Ok(iter.collect()),
            Sequence::Lazy(iter) => iter.collect(),
        }
    }
}

impl<I> From<Vec<SpiderOutput<I>>> for Sequence<I> {
    fn from(outputs: Vec<SpiderOutput<I>>) -> Self {
        Sequence::Eager(outputs)
    }
}

impl<I> Default for Sequence<I> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<I> fmt::Debug for Sequence<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Eager(outputs) => write!(f, "Sequence::Eager(len={})", outputs.len()),
            Sequence::Lazy(_) => write!(f, "Sequence::Lazy(..)"),
            Sequence::Realized(iter) => write!(f, "Sequence::Realized(len={})", iter.len()),
        }
    }
}

/// Iterator over a `Sequence`, yielding `Err` only for a failing lazy source.
pub enum SequenceIter<I> {
    Owned(vec::IntoIter<SpiderOutput<I>>),
    Lazy(LazyIter<I>),
}

impl<I> Iterator for SequenceIter<I> {
    type Item = Result<SpiderOutput<I>, SpiderError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SequenceIter::Owned(iter) => iter.next().map(Ok),
            SequenceIter::Lazy(iter) => iter.next(),
        }
    }
}

impl<I> IntoIterator for Sequence<I> {
    type Item = Result<SpiderOutput<I>, SpiderError>;
    type IntoIter = SequenceIter<I>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Sequence::Eager(outputs) => SequenceIter::Owned(outputs.into_iter()),
            Sequence::Realized(iter) => SequenceIter::Owned(iter),
            Sequence::Lazy(iter) => SequenceIter::Lazy(iter),
        }
    }
}

/// Drains a lazy sequence now, in order, returning the first error it raises.
///
/// Eager and already realized sequences are returned as they are.
pub fn materialize<I>(sequence: Sequence<I>) -> Result<Sequence<I>, SpiderError> {
    match sequence {
        Sequence::Lazy(iter) => {
            let outputs = iter.collect::<Result<Vec<_>, _>>()?;
            Ok(Sequence::Realized(outputs.into_iter()))
        }
        other => Ok(other),
    }
}
