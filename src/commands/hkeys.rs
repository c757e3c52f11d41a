use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns all field names in the hash stored at `key`, sorted.
///
/// Ref: <https://redis.io/docs/latest/commands/hkeys/>
#[derive(Debug, PartialEq)]
pub struct Hkeys {
    pub key: String,
}

impl Executable for Hkeys {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let Some(hash) = store.lock().collection::<Hash>(&self.key)? else {
            return Ok(Frame::Array(vec![]));
        };

        let values = hash.keys().into_iter().map(Frame::Bulk).collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Hkeys {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
