use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Set;

/// Returns 1 if `member` is a member of the set stored at `key`, 0 otherwise.
///
/// Ref: <https://redis.io/docs/latest/commands/sismember/>
#[derive(Debug, PartialEq)]
pub struct Sismember {
    pub key: String,
    pub member: Bytes,
}

impl Executable for Sismember {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let found = store
            .lock()
            .collection::<Set>(&self.key)?
            .is_some_and(|set| set.exists(&self.member));

        Ok(Frame::Integer(found as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sismember {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let member = parser.next_bytes()?;

        Ok(Self { key, member })
    }
}
