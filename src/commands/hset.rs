use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Sets the specified fields to their respective values in the hash stored at `key`, creating the
/// hash when needed. Returns the number of fields that were added.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hset {
    pub key: String,
    pub pairs: Vec<Bytes>,
}

impl Executable for Hset {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let hash = state.collection_or_default::<Hash>(&self.key)?;
        let added = hash.set_bulk(self.pairs);
        state.remove_if_empty(&self.key);

        Ok(Frame::Integer(added? as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let pairs = parser.remaining_bytes()?;

        if pairs.len() % 2 != 0 {
            return Err(CommandParserError::WrongArity {
                command: "hset".to_string(),
            });
        }

        Ok(Self { key, pairs })
    }
}
