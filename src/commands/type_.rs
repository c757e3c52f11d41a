use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;

/// Returns the string representation of the type of the value stored at `key`: `string`, `list`,
/// `hash` or `set`. If the key does not exist, `none` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/type/>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: String,
}

impl Executable for Type {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let mut state = store.lock();
        let type_ = state
            .get(&self.key)
            .map(|value| value.data.type_name())
            .unwrap_or("none");

        Ok(Frame::Simple(type_.to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Type {
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
    use crate::types::Hash;

    #[test]
    fn existing_key() {
        let store = Store::new();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("TYPE")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Type(Type {
                key: String::from("key1"),
            })
        );

        store.lock().set(String::from("key1"), Bytes::from("1"));

        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Simple("string".to_string()));
    }

    #[test]
    fn collection_key() {
        let store = Store::new();
        store.lock().collection_or_default::<Hash>("key1").unwrap();

        let cmd = Command::Type(Type {
            key: String::from("key1"),
        });

        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Simple("hash".to_string()));
    }

    #[test]
    fn missing_key() {
        let store = Store::new();

        let cmd = Command::Type(Type {
            key: String::from("key1"),
        });

        let result = cmd.exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Simple("none".to_string()));
    }
}
