use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::List;

/// Trims the list stored at `key` so that it only contains the elements between the inclusive
/// offsets `start` and `stop`. Offsets follow the same rules as `LRANGE`.
///
/// Ref: <https://redis.io/docs/latest/commands/ltrim/>
#[derive(Debug, PartialEq)]
pub struct Ltrim {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for Ltrim {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        if let Some(list) = state.collection::<List>(&self.key)? {
            list.trim(self.start, self.stop);
            state.remove_if_empty(&self.key);
        }

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Ltrim {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;

    #[test]
    fn keeps_range() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("LTRIM")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Ltrim(Ltrim {
                key: String::from("key1"),
                start: 1,
                stop: -1,
            })
        );

        let store = Store::new();
        let list = store.lock().collection_or_default::<List>("key1").unwrap();
        list.tpush(vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")])
            .unwrap();

        assert_eq!(
            cmd.exec(store.clone()).unwrap(),
            Frame::Simple("OK".to_string())
        );
        assert_eq!(list.range(0, -1), vec![Bytes::from("b"), Bytes::from("c")]);
    }

    #[test]
    fn missing_key() {
        let store = Store::new();
        let cmd = Command::Ltrim(Ltrim {
            key: String::from("key1"),
            start: 0,
            stop: 1,
        });

        assert_eq!(
            cmd.exec(store.clone()).unwrap(),
            Frame::Simple("OK".to_string())
        );
        assert!(!store.lock().exists("key1"));
    }
}
