use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns the string length of the value associated with `field` in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hstrlen/>
#[derive(Debug, PartialEq)]
pub struct Hstrlen {
    pub key: String,
    pub field: Bytes,
}

impl Executable for Hstrlen {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let hash = store.lock().collection::<Hash>(&self.key)?;
        let len = hash.map_or(0, |hash| hash.field_len(&self.field));

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hstrlen {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_bytes()?;

        Ok(Self { key, field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn value_length() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HSTRLEN")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("a")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Hstrlen(Hstrlen {
                key: String::from("key1"),
                field: Bytes::from("a"),
            })
        );

        let store = Store::new();
        store
            .lock()
            .collection_or_default::<Hash>("key1")
            .unwrap()
            .set(Bytes::from("a"), Bytes::from("hello"));

        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(5));
    }
}
