use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Set;

/// Removes the specified members from the set stored at `key`. Returns the number of members that
/// were removed. A set left empty is removed.
///
/// Ref: <https://redis.io/docs/latest/commands/srem/>
#[derive(Debug, PartialEq)]
pub struct Srem {
    pub key: String,
    pub members: Vec<Bytes>,
}

impl Executable for Srem {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let Some(set) = state.collection::<Set>(&self.key)? else {
            return Ok(Frame::Integer(0));
        };

        let removed = set.delete(&self.members);
        state.remove_if_empty(&self.key);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Srem {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_bytes()?;

        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn removes_members_and_empty_set() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SREM")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("z")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Srem(Srem {
                key: String::from("key1"),
                members: vec![Bytes::from("a"), Bytes::from("z")],
            })
        );

        let store = Store::new();
        let set = store.lock().collection_or_default::<Set>("key1").unwrap();
        set.add(vec![Bytes::from("a"), Bytes::from("b")]);

        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(1));
        assert!(store.lock().exists("key1"));

        let cmd = Command::Srem(Srem {
            key: String::from("key1"),
            members: vec![Bytes::from("b")],
        });
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(1));
        assert!(!store.lock().exists("key1"));
    }
}
