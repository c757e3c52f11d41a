use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{absolute_index, Error};

/// A sequence of binary strings with cheap insertion and removal at both ends.
#[derive(Debug, Default)]
pub struct List {
    items: Mutex<VecDeque<Bytes>>,
}

impl List {
    pub fn new() -> List {
        List::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Bytes>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `values` at the head one after another, so the last value ends up first. Returns
    /// the new length.
    pub fn hpush(&self, values: Vec<Bytes>) -> Result<usize, Error> {
        if values.is_empty() {
            return Err(Error::EmptyPush);
        }

        let mut items = self.lock();
        for value in values {
            items.push_front(value);
        }
        Ok(items.len())
    }

    /// Appends `values` at the tail in order. Returns the new length.
    pub fn tpush(&self, values: Vec<Bytes>) -> Result<usize, Error> {
        if values.is_empty() {
            return Err(Error::EmptyPush);
        }

        let mut items = self.lock();
        items.extend(values);
        Ok(items.len())
    }

    pub fn hpop(&self) -> Option<Bytes> {
        self.lock().pop_front()
    }

    pub fn tpop(&self) -> Option<Bytes> {
        self.lock().pop_back()
    }

    pub fn head(&self) -> Option<Bytes> {
        self.lock().front().cloned()
    }

    pub fn tail(&self) -> Option<Bytes> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the elements between `start` and `stop`, both inclusive. Negative indices count
    /// from the tail, `-1` being the last element.
    pub fn range(&self, start: i64, stop: i64) -> Vec<Bytes> {
        let items = self.lock();
        match bounds(start, stop, items.len()) {
            Some((start, stop)) => items.range(start..=stop).cloned().collect(),
            None => vec![],
        }
    }

    /// Keeps only the elements between `start` and `stop`, both inclusive. Bounds selecting
    /// nothing leave the list untouched.
    pub fn trim(&self, start: i64, stop: i64) {
        let mut items = self.lock();
        let len = items.len();

        let Some((start, stop)) = bounds(start, stop, len) else {
            return;
        };

        items.drain(..start);
        items.truncate(stop - start + 1);
    }
}

/// Resolves an inclusive `start..=stop` range against a list of `len` elements.
fn bounds(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let start = absolute_index(start, len).max(0);
    let stop = absolute_index(stop, len);

    if start >= len as i64 || stop < start {
        return None;
    }

    let stop = stop.min(len as i64 - 1);
    Some((start as usize, stop as usize))
}
