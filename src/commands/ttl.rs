use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;

/// TTL returns the remaining time to live of a key that has a timeout. This introspection
/// capability allows a client to check how many seconds a given key will continue to be part of
/// the dataset.
///
/// Returns -2 if the key does not exist and -1 if it exists but has no associated expire.
///
/// Ref: <https://redis.io/docs/latest/commands/ttl>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: String,
}

impl Executable for Ttl {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let ttl = if state.exists(&self.key) { -1 } else { -2 };
        let ttl = state
            .ttl(&self.key)
            .map(|ttl| ((ttl.as_millis() + 500) / 1000) as i64)
            .unwrap_or(ttl);
        Ok(Frame::Integer(ttl))
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::time::{self, Duration};

    use super::*;
    use crate::commands::Command;

    #[tokio::test(start_paused = true)]
    async fn with_expiration() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("TTL")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Ttl(Ttl {
                key: String::from("key1")
            })
        );

        let store = Store::new();
        {
            let mut store = store.lock();
            store.set(String::from("key1"), Bytes::from("1"));
            store.set_expire("key1", 100).unwrap();
        }

        time::advance(Duration::from_secs(40)).await;

        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Integer(60));
    }

    #[test]
    fn without_expiration() {
        let store = Store::new();
        store.lock().set(String::from("key1"), Bytes::from("1"));

        let cmd = Command::Ttl(Ttl {
            key: String::from("key1"),
        });

        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(-1));
    }

    #[test]
    fn missing_key() {
        let cmd = Command::Ttl(Ttl {
            key: String::from("key1"),
        });

        assert_eq!(cmd.exec(Store::new()).unwrap(), Frame::Integer(-2));
    }
}
