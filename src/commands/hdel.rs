use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Removes the specified fields from the hash stored at `key`. Returns the number of fields that
/// were removed. A hash left empty is removed.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct Hdel {
    pub key: String,
    pub fields: Vec<Bytes>,
}

impl Executable for Hdel {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let Some(hash) = state.collection::<Hash>(&self.key)? else {
            return Ok(Frame::Integer(0));
        };

        let removed = hash.delete(&self.fields);
        state.remove_if_empty(&self.key);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hdel {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.remaining_bytes()?;

        Ok(Self { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn removes_fields_and_empty_hash() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HDEL")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("missing")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Hdel(Hdel {
                key: String::from("key1"),
                fields: vec![Bytes::from("a"), Bytes::from("missing")],
            })
        );

        let store = Store::new();
        store
            .lock()
            .collection_or_default::<Hash>("key1")
            .unwrap()
            .set(Bytes::from("a"), Bytes::from("1"));

        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(1));
        assert!(!store.lock().exists("key1"));
    }

    #[test]
    fn missing_key() {
        let cmd = Command::Hdel(Hdel {
            key: String::from("key1"),
            fields: vec![Bytes::from("a")],
        });

        assert_eq!(cmd.exec(Store::new()).unwrap(), Frame::Integer(0));
    }
}
