use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns all fields and values of the hash stored at `key`, as a map ordered by field.
///
/// Ref: <https://redis.io/docs/latest/commands/hgetall/>
#[derive(Debug, PartialEq)]
pub struct Hgetall {
    pub key: String,
}

impl Executable for Hgetall {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let Some(hash) = store.lock().collection::<Hash>(&self.key)? else {
            return Ok(Frame::Map(vec![]));
        };

        let pairs = hash
            .fields()
            .into_iter()
            .map(|(field, value)| (Frame::Bulk(field), Frame::Bulk(value)))
            .collect();

        Ok(Frame::Map(pairs))
    }
}

impl TryFrom<&mut CommandParser> for Hgetall {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
