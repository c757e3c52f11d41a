use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns the values associated with the specified fields in the hash stored at `key`. Missing
/// fields are replied as nil.
///
/// Ref: <https://redis.io/docs/latest/commands/hmget/>
#[derive(Debug, PartialEq)]
pub struct Hmget {
    pub key: String,
    pub fields: Vec<Bytes>,
}

impl Executable for Hmget {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let values = match store.lock().collection::<Hash>(&self.key)? {
            Some(hash) => hash.get_bulk(&self.fields),
            None => vec![None; self.fields.len()],
        };

        let values = values
            .into_iter()
            .map(|value| value.map_or(Frame::Null, Frame::Bulk))
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Hmget {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.remaining_bytes()?;

        Ok(Self { key, fields })
    }
}
