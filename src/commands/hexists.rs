use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns 1 if `field` exists in the hash stored at `key`, 0 otherwise.
///
/// Ref: <https://redis.io/docs/latest/commands/hexists/>
#[derive(Debug, PartialEq)]
pub struct Hexists {
    pub key: String,
    pub field: Bytes,
}

impl Executable for Hexists {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let exists = store
            .lock()
            .collection::<Hash>(&self.key)?
            .is_some_and(|hash| hash.exists(&self.field));

        Ok(Frame::Integer(exists as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hexists {
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
    fn field_presence() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HEXISTS")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("a")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Hexists(Hexists {
                key: String::from("key1"),
                field: Bytes::from("a"),
            })
        );

        let store = Store::new();
        store
            .lock()
            .collection_or_default::<Hash>("key1")
            .unwrap()
            .set(Bytes::from("a"), Bytes::from("1"));

        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(1));

        let cmd = Command::Hexists(Hexists {
            key: String::from("key1"),
            field: Bytes::from("b"),
        });
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(0));
    }
}
