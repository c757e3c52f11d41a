use std::sync::Arc;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Set;

/// Returns the members of the set resulting from the union of all the given sets. Missing keys are
/// treated as empty sets.
///
/// Ref: <https://redis.io/docs/latest/commands/sunion/>
#[derive(Debug, PartialEq)]
pub struct Sunion {
    pub keys: Vec<String>,
}

impl Executable for Sunion {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let sets = store.lock().collections::<Set>(&self.keys)?;
        let sets: Vec<&Set> = sets.iter().map(Arc::as_ref).collect();

        let members = Set::union(&sets).into_iter().map(Frame::Bulk).collect();

        Ok(Frame::Set(members))
    }
}

impl TryFrom<&mut CommandParser> for Sunion {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings()?;
        Ok(Self { keys })
    }
}
