use std::sync::Arc;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::types::Set;

/// Returns the members of the set resulting from the difference between the first set and all the
/// successive sets. Missing keys are treated as empty sets.
///
/// Ref: <https://redis.io/docs/latest/commands/sdiff/>
#[derive(Debug, PartialEq)]
pub struct Sdiff {
    pub keys: Vec<String>,
}

impl Executable for Sdiff {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let sets = store.lock().collections::<Set>(&self.keys)?;
        let sets: Vec<&Set> = sets.iter().map(Arc::as_ref).collect();

        let members = Set::diff(&sets).into_iter().map(Frame::Bulk).collect();

        Ok(Frame::Set(members))
    }
}

impl TryFrom<&mut CommandParser> for Sdiff {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings()?;
        Ok(Self { keys })
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
            let s1 = state.collection_or_default::<Set>("s1").unwrap();
            s1.add(vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
            let s2 = state.collection_or_default::<Set>("s2").unwrap();
            s2.add(vec![Bytes::from("b"), Bytes::from("c"), Bytes::from("d")]);
            state.set(String::from("text"), Bytes::from("1"));
        }
        store
    }

    fn set(members: &[&'static str]) -> Frame {
        Frame::Set(members.iter().map(|m| Frame::Bulk(Bytes::from(*m))).collect())
    }

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn first_set_only() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SDIFF")),
            Frame::Bulk(Bytes::from("s1")),
            Frame::Bulk(Bytes::from("s2")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Sdiff(Sdiff {
                keys: keys(&["s1", "s2"])
            })
        );

        assert_eq!(cmd.exec(store()).unwrap(), set(&["a"]));
    }

    #[test]
    fn missing_first_key() {
        let cmd = Command::Sdiff(Sdiff {
            keys: keys(&["missing", "s1"]),
        });

        assert_eq!(cmd.exec(store()).unwrap(), set(&[]));
    }
}
