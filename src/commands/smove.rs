use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Set;

/// Moves `member` from the set at `source` to the set at `destination`. Returns 1 if the member
/// was moved, 0 if it is not a member of `source`. Both keys must hold sets when they exist.
///
/// Ref: <https://redis.io/docs/latest/commands/smove/>
#[derive(Debug, PartialEq)]
pub struct Smove {
    pub source: String,
    pub destination: String,
    pub member: Bytes,
}

impl Executable for Smove {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let source = state.collection::<Set>(&self.source)?;
        state.collection::<Set>(&self.destination)?;

        let Some(source) = source.filter(|set| set.exists(&self.member)) else {
            return Ok(Frame::Integer(0));
        };

        let destination = state.collection_or_default::<Set>(&self.destination)?;
        let moved = Set::move_member(self.member, &source, &destination);
        state.remove_if_empty(&self.source);

        Ok(Frame::Integer(moved as i64))
    }
}

impl TryFrom<&mut CommandParser> for Smove {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let source = parser.next_string()?;
        let destination = parser.next_string()?;
        let member = parser.next_bytes()?;

        Ok(Self {
            source,
            destination,
            member,
        })
    }
}
