use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::List;

/// Returns the elements of the list stored at `key` between the inclusive offsets `start` and
/// `stop`. Negative offsets count from the tail, `-1` being the last element.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct Lrange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for Lrange {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let Some(list) = store.lock().collection::<List>(&self.key)? else {
            return Ok(Frame::Array(vec![]));
        };

        let values = list
            .range(self.start, self.stop)
            .into_iter()
            .map(Frame::Bulk)
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Lrange {
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

    fn store() -> Store {
        let store = Store::new();
        {
            let mut state = store.lock();
            let list = state.collection_or_default::<List>("key1").unwrap();
            list.tpush(vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")])
                .unwrap();
        }
        store
    }

    #[test]
    fn negative_offsets() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("LRANGE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("-2")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Lrange(Lrange {
                key: String::from("key1"),
                start: -2,
                stop: -1,
            })
        );

        assert_eq!(
            cmd.exec(store()).unwrap(),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("b")),
                Frame::Bulk(Bytes::from("c"))
            ])
        );
    }

    #[test]
    fn out_of_range() {
        let cmd = Command::Lrange(Lrange {
            key: String::from("key1"),
            start: 5,
            stop: 10,
        });

        assert_eq!(cmd.exec(store()).unwrap(), Frame::Array(vec![]));
    }

    #[test]
    fn missing_key() {
        let cmd = Command::Lrange(Lrange {
            key: String::from("key1"),
            start: 0,
            stop: -1,
        });

        assert_eq!(cmd.exec(Store::new()).unwrap(), Frame::Array(vec![]));
    }

    #[test]
    fn invalid_offset() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("LRANGE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("first")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(err, CommandError::Parser(CommandParserError::InvalidInteger));
    }
}
