use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Set;

/// Returns the cardinality of the set stored at `key`, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/scard/>
#[derive(Debug, PartialEq)]
pub struct Scard {
    pub key: String,
}

impl Executable for Scard {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let set = store.lock().collection::<Set>(&self.key)?;
        let card = set.map_or(0, |set| set.card());

        Ok(Frame::Integer(card as i64))
    }
}

impl TryFrom<&mut CommandParser> for Scard {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
