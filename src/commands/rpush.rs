use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::List;

/// Insert all the specified values at the tail of the list stored at `key`. If `key` does not
/// exist, it is created as an empty list before performing the push. Returns the length of the
/// list after the push.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct Rpush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for Rpush {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let list = state.collection_or_default::<List>(&self.key)?;
        let len = list.tpush(self.values);
        // An empty push leaves a freshly created list behind.
        state.remove_if_empty(&self.key);

        Ok(Frame::Integer(len? as i64))
    }
}

impl TryFrom<&mut CommandParser> for Rpush {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let values = parser.remaining_bytes()?;

        Ok(Self { key, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn pushes_to_tail() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("RPUSH")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("b")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Rpush(Rpush {
                key: String::from("key1"),
                values: vec![Bytes::from("a"), Bytes::from("b")],
            })
        );

        let store = Store::new();

        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(2));

        let cmd = Command::Rpush(Rpush {
            key: String::from("key1"),
            values: vec![Bytes::from("c")],
        });
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(3));

        let list = store.lock().collection::<List>("key1").unwrap().unwrap();
        assert_eq!(
            list.range(0, -1),
            vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]
        );
    }

    #[test]
    fn requires_a_value() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("RPUSH")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'rpush' command"
        );
    }
}
