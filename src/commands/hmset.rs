use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Sets the specified fields to their respective values in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hmset/>
#[derive(Debug, PartialEq)]
pub struct Hmset {
    pub key: String,
    pub pairs: Vec<Bytes>,
}

impl Executable for Hmset {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let hash = state.collection_or_default::<Hash>(&self.key)?;
        let res = hash.set_bulk(self.pairs);
        state.remove_if_empty(&self.key);
        res?;

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Hmset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let pairs = parser.remaining_bytes()?;

        if pairs.len() % 2 != 0 {
            return Err(CommandParserError::WrongArity {
                command: "hmset".to_string(),
            });
        }

        Ok(Self { key, pairs })
    }
}
