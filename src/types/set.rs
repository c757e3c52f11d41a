use bytes::Bytes;
use itertools::Itertools;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An unordered collection of unique binary strings.
///
/// Operations over several sets lock one set at a time, so they are consistent per input set but
/// not across all of them.
#[derive(Debug, Default)]
pub struct Set {
    members: Mutex<HashSet<Bytes>>,
}

impl Set {
    pub fn new() -> Set {
        Set::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Bytes>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> HashSet<Bytes> {
        self.lock().clone()
    }

    /// Adds `members`, returning how many were not present yet.
    pub fn add(&self, members: Vec<Bytes>) -> usize {
        let mut set = self.lock();
        let before = set.len();
        set.extend(members);
        set.len() - before
    }

    /// Removes `members`, returning how many were present.
    pub fn delete(&self, members: &[Bytes]) -> usize {
        let mut set = self.lock();
        members.iter().filter(|member| set.remove(*member)).count()
    }

    pub fn exists(&self, member: &[u8]) -> bool {
        self.lock().contains(member)
    }

    pub fn card(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All members in lexicographic order.
    pub fn members(&self) -> Vec<Bytes> {
        self.lock().iter().cloned().sorted().collect()
    }

    /// Members of the first set that are in none of the others.
    pub fn diff(sets: &[&Set]) -> Vec<Bytes> {
        let Some((first, others)) = sets.split_first() else {
            return vec![];
        };

        let mut result = first.snapshot();
        for other in others {
            let other = other.lock();
            result.retain(|member| !other.contains(member));
        }

        result.into_iter().sorted().collect()
    }

    /// Members present in every set. Starts from the smallest set, so the work is bounded by it.
    pub fn intersection(sets: &[&Set]) -> Vec<Bytes> {
        let Some(smallest) = sets.iter().position_min_by_key(|set| set.card()) else {
            return vec![];
        };

        let mut result = sets[smallest].snapshot();
        for (i, other) in sets.iter().enumerate() {
            if i == smallest || result.is_empty() {
                continue;
            }
            let other = other.lock();
            result.retain(|member| other.contains(member));
        }

        result.into_iter().sorted().collect()
    }

    /// Members present in any set. Starts from the largest set, so it is copied only once.
    pub fn union(sets: &[&Set]) -> Vec<Bytes> {
        let Some(largest) = sets.iter().position_max_by_key(|set| set.card()) else {
            return vec![];
        };

        let mut result = sets[largest].snapshot();
        for (i, other) in sets.iter().enumerate() {
            if i == largest {
                continue;
            }
            result.extend(other.lock().iter().cloned());
        }

        result.into_iter().sorted().collect()
    }

    /// Moves `member` from `src` to `dest`. Returns false, changing nothing, when `member` is not
    /// in `src`.
    pub fn move_member(member: Bytes, src: &Set, dest: &Set) -> bool {
        // Release `src` before touching `dest`, they may be the same set.
        if !src.lock().remove(&member) {
            return false;
        }
        dest.lock().insert(member);
        true
    }
}
