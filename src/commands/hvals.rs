use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns all values in the hash stored at `key`, ordered by their field.
///
/// Ref: <https://redis.io/docs/latest/commands/hvals/>
#[derive(Debug, PartialEq)]
pub struct Hvals {
    pub key: String,
}

impl Executable for Hvals {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let Some(hash) = store.lock().collection::<Hash>(&self.key)? else {
            return Ok(Frame::Array(vec![]));
        };

        let values = hash.vals().into_iter().map(Frame::Bulk).collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Hvals {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
