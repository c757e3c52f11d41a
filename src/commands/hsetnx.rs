use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Sets `field` in the hash stored at `key` to `value`, only if `field` does not yet exist.
/// Returns 1 if the field was set, 0 otherwise.
///
/// Ref: <https://redis.io/docs/latest/commands/hsetnx/>
#[derive(Debug, PartialEq)]
pub struct Hsetnx {
    pub key: String,
    pub field: Bytes,
    pub value: Bytes,
}

impl Executable for Hsetnx {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let hash = store.lock().collection_or_default::<Hash>(&self.key)?;
        let set = hash.setx(self.field, self.value);

        Ok(Frame::Integer(set as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hsetnx {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, field, value })
    }
}
