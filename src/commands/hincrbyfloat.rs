use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Increments the float stored at `field` in the hash stored at `key` by `increment`. Missing keys
/// and fields start from 0. The new value is replied as a bulk string.
///
/// Ref: <https://redis.io/docs/latest/commands/hincrbyfloat/>
#[derive(Debug, PartialEq)]
pub struct HincrByFloat {
    pub key: String,
    pub field: Bytes,
    pub increment: f64,
}

impl Executable for HincrByFloat {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let hash = state.collection_or_default::<Hash>(&self.key)?;
        let res = hash.increment_by_float(self.field, self.increment);
        state.remove_if_empty(&self.key);

        Ok(Frame::Bulk(Bytes::from(res?.to_string())))
    }
}

impl TryFrom<&mut CommandParser> for HincrByFloat {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_bytes()?;
        let increment = parser.next_float()?;

        Ok(Self {
            key,
            field,
            increment,
        })
    }
}
