use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Hash;

/// Returns the number of fields contained in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hlen/>
#[derive(Debug, PartialEq)]
pub struct Hlen {
    pub key: String,
}

impl Executable for Hlen {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let hash = store.lock().collection::<Hash>(&self.key)?;
        let len = hash.map_or(0, |hash| hash.len());

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hlen {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;

    #[test]
    fn number_of_fields() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HLEN")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Hlen(Hlen {
                key: String::from("key1")
            })
        );

        let store = Store::new();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(0));

        let hash = store.lock().collection_or_default::<Hash>("key1").unwrap();
        hash.set(Bytes::from("a"), Bytes::from("1"));
        hash.set(Bytes::from("b"), Bytes::from("2"));

        let cmd = Command::Hlen(Hlen {
            key: String::from("key1"),
        });
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(2));
    }
}
