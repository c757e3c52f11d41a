//! Collection values a key can hold besides plain strings.
//!
//! Every collection guards its contents with its own lock, so a handle can be cloned out of the
//! store and used after the store lock is released.

pub mod hash;
pub mod list;
pub mod set;

use thiserror::Error as ThisError;

pub use hash::Hash;
pub use list::List;
pub use set::Set;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("no items to insert")]
    EmptyPush,
    #[error("field and value pairs are unbalanced")]
    OddFieldCount,
    #[error("invalid type, expected {0}")]
    InvalidType(&'static str),
    #[error("increment or decrement would overflow")]
    Overflow,
}

/// Translates a possibly negative index into an offset from the head of a sequence of `len`
/// elements. The result may still be out of range.
fn absolute_index(index: i64, len: usize) -> i64 {
    if index < 0 {
        index + len as i64
    } else {
        index
    }
}
