pub mod decr;
pub mod del;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod get;
pub mod hdel;
pub mod hexists;
pub mod hget;
pub mod hgetall;
pub mod hincrby;
pub mod hincrbyfloat;
pub mod hkeys;
pub mod hlen;
pub mod hmget;
pub mod hmset;
pub mod hset;
pub mod hsetnx;
pub mod hstrlen;
pub mod hvals;
pub mod incr;
pub mod keys;
pub mod llen;
pub mod lpop;
pub mod lpush;
pub mod lrange;
pub mod ltrim;
pub mod ping;
pub mod rpop;
pub mod rpush;
pub mod sadd;
pub mod scard;
pub mod sdiff;
pub mod set;
pub mod sinter;
pub mod sismember;
pub mod smembers;
pub mod smove;
pub mod srem;
pub mod sunion;
pub mod ttl;
pub mod type_;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::{self, Store};
use crate::types;

use decr::Decr;
use del::Del;
use exists::Exists;
use expire::Expire;
use get::Get;
use hdel::Hdel;
use hexists::Hexists;
use hget::Hget;
use hgetall::Hgetall;
use hincrby::HincrBy;
use hincrbyfloat::HincrByFloat;
use hkeys::Hkeys;
use hlen::Hlen;
use hmget::Hmget;
use hmset::Hmset;
use hset::Hset;
use hsetnx::Hsetnx;
use hstrlen::Hstrlen;
use hvals::Hvals;
use incr::Incr;
use keys::Keys;
use llen::Llen;
use lpop::Lpop;
use lpush::Lpush;
use lrange::Lrange;
use ltrim::Ltrim;
use ping::Ping;
use rpop::Rpop;
use rpush::Rpush;
use sadd::Sadd;
use scard::Scard;
use sdiff::Sdiff;
use set::Set;
use sinter::Sinter;
use sismember::Sismember;
use smembers::Smembers;
use smove::Smove;
use srem::Srem;
use sunion::Sunion;
use ttl::Ttl;
use type_::Type;

/// Static description of a command, used to validate a request before it is parsed.
#[derive(Debug, PartialEq)]
pub struct CommandEntry {
    pub name: &'static str,
    /// Minimum number of arguments, the command name excluded.
    pub min_args: usize,
    /// Maximum number of arguments, `None` for variadic commands.
    pub max_args: Option<usize>,
    /// Whether a successful execution writes to the keyspace.
    pub mutates: bool,
}

impl CommandEntry {
    const fn new(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        mutates: bool,
    ) -> Self {
        CommandEntry {
            name,
            min_args,
            max_args,
            mutates,
        }
    }

    pub fn accepts(&self, args: usize) -> bool {
        args >= self.min_args && self.max_args.map_or(true, |max| args <= max)
    }
}

pub static COMMANDS: &[CommandEntry] = &[
    // Keyspace and strings.
    CommandEntry::new("ping", 0, Some(1), false),
    CommandEntry::new("exists", 1, Some(1), false),
    CommandEntry::new("del", 1, None, true),
    CommandEntry::new("keys", 0, Some(0), false),
    CommandEntry::new("expire", 2, Some(2), false),
    CommandEntry::new("ttl", 1, Some(1), false),
    CommandEntry::new("type", 1, Some(1), false),
    CommandEntry::new("get", 1, Some(1), false),
    CommandEntry::new("set", 2, Some(2), true),
    CommandEntry::new("incr", 1, Some(1), true),
    CommandEntry::new("decr", 1, Some(1), true),
    // Transactions.
    CommandEntry::new("multi", 0, Some(0), true),
    CommandEntry::new("exec", 0, Some(0), true),
    // Lists.
    CommandEntry::new("lpush", 2, None, true),
    CommandEntry::new("rpush", 2, None, true),
    CommandEntry::new("lpop", 1, Some(1), true),
    CommandEntry::new("rpop", 1, Some(1), true),
    CommandEntry::new("llen", 1, Some(1), false),
    CommandEntry::new("lrange", 3, Some(3), false),
    CommandEntry::new("ltrim", 3, Some(3), true),
    // Hashes.
    CommandEntry::new("hset", 3, None, true),
    CommandEntry::new("hsetnx", 3, Some(3), true),
    CommandEntry::new("hmset", 3, None, true),
    CommandEntry::new("hget", 2, Some(2), false),
    CommandEntry::new("hmget", 2, None, false),
    CommandEntry::new("hdel", 2, None, true),
    CommandEntry::new("hexists", 2, Some(2), false),
    CommandEntry::new("hlen", 1, Some(1), false),
    CommandEntry::new("hstrlen", 2, Some(2), false),
    CommandEntry::new("hkeys", 1, Some(1), false),
    CommandEntry::new("hvals", 1, Some(1), false),
    CommandEntry::new("hgetall", 1, Some(1), false),
    CommandEntry::new("hincrby", 3, Some(3), true),
    CommandEntry::new("hincrbyfloat", 3, Some(3), true),
    // Sets.
    CommandEntry::new("sadd", 2, None, true),
    CommandEntry::new("srem", 2, None, true),
    CommandEntry::new("sismember", 2, Some(2), false),
    CommandEntry::new("scard", 1, Some(1), false),
    CommandEntry::new("smembers", 1, Some(1), false),
    CommandEntry::new("sinter", 1, None, false),
    CommandEntry::new("sunion", 1, None, false),
    CommandEntry::new("sdiff", 1, None, false),
    CommandEntry::new("smove", 3, Some(3), true),
];

/// Finds the table entry of a lowercased command name.
pub fn lookup(name: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.name == name)
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Decr(Decr),
    Del(Del),
    Exists(Exists),
    Expire(Expire),
    Get(Get),
    Incr(Incr),
    Keys(Keys),
    Set(Set),
    Ttl(Ttl),
    Type(Type),

    Llen(Llen),
    Lpop(Lpop),
    Lpush(Lpush),
    Lrange(Lrange),
    Ltrim(Ltrim),
    Rpop(Rpop),
    Rpush(Rpush),

    Hdel(Hdel),
    Hexists(Hexists),
    Hget(Hget),
    Hgetall(Hgetall),
    HincrBy(HincrBy),
    HincrByFloat(HincrByFloat),
    Hkeys(Hkeys),
    Hlen(Hlen),
    Hmget(Hmget),
    Hmset(Hmset),
    Hset(Hset),
    Hsetnx(Hsetnx),
    Hstrlen(Hstrlen),
    Hvals(Hvals),

    Sadd(Sadd),
    Scard(Scard),
    Sdiff(Sdiff),
    Sinter(Sinter),
    Sismember(Sismember),
    Smembers(Smembers),
    Smove(Smove),
    Srem(Srem),
    Sunion(Sunion),

    Ping(Ping),
    // Transaction control, driven by the client session.
    Multi,
    Exec,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Decr(_) => "decr",
            Command::Del(_) => "del",
            Command::Exists(_) => "exists",
            Command::Expire(_) => "expire",
            Command::Get(_) => "get",
            Command::Incr(_) => "incr",
            Command::Keys(_) => "keys",
            Command::Set(_) => "set",
            Command::Ttl(_) => "ttl",
            Command::Type(_) => "type",
            Command::Llen(_) => "llen",
            Command::Lpop(_) => "lpop",
            Command::Lpush(_) => "lpush",
            Command::Lrange(_) => "lrange",
            Command::Ltrim(_) => "ltrim",
            Command::Rpop(_) => "rpop",
            Command::Rpush(_) => "rpush",
            Command::Hdel(_) => "hdel",
            Command::Hexists(_) => "hexists",
            Command::Hget(_) => "hget",
            Command::Hgetall(_) => "hgetall",
            Command::HincrBy(_) => "hincrby",
            Command::HincrByFloat(_) => "hincrbyfloat",
            Command::Hkeys(_) => "hkeys",
            Command::Hlen(_) => "hlen",
            Command::Hmget(_) => "hmget",
            Command::Hmset(_) => "hmset",
            Command::Hset(_) => "hset",
            Command::Hsetnx(_) => "hsetnx",
            Command::Hstrlen(_) => "hstrlen",
            Command::Hvals(_) => "hvals",
            Command::Sadd(_) => "sadd",
            Command::Scard(_) => "scard",
            Command::Sdiff(_) => "sdiff",
            Command::Sinter(_) => "sinter",
            Command::Sismember(_) => "sismember",
            Command::Smembers(_) => "smembers",
            Command::Smove(_) => "smove",
            Command::Srem(_) => "srem",
            Command::Sunion(_) => "sunion",
            Command::Ping(_) => "ping",
            Command::Multi => "multi",
            Command::Exec => "exec",
        }
    }

    /// Whether a successful execution of this command writes to the keyspace.
    pub fn mutates(&self) -> bool {
        lookup(self.name()).is_some_and(|entry| entry.mutates)
    }
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        match self {
            Command::Decr(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Expire(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Incr(cmd) => cmd.exec(store),
            Command::Keys(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
            Command::Ttl(cmd) => cmd.exec(store),
            Command::Type(cmd) => cmd.exec(store),
            Command::Llen(cmd) => cmd.exec(store),
            Command::Lpop(cmd) => cmd.exec(store),
            Command::Lpush(cmd) => cmd.exec(store),
            Command::Lrange(cmd) => cmd.exec(store),
            Command::Ltrim(cmd) => cmd.exec(store),
            Command::Rpop(cmd) => cmd.exec(store),
            Command::Rpush(cmd) => cmd.exec(store),
            Command::Hdel(cmd) => cmd.exec(store),
            Command::Hexists(cmd) => cmd.exec(store),
            Command::Hget(cmd) => cmd.exec(store),
            Command::Hgetall(cmd) => cmd.exec(store),
            Command::HincrBy(cmd) => cmd.exec(store),
            Command::HincrByFloat(cmd) => cmd.exec(store),
            Command::Hkeys(cmd) => cmd.exec(store),
            Command::Hlen(cmd) => cmd.exec(store),
            Command::Hmget(cmd) => cmd.exec(store),
            Command::Hmset(cmd) => cmd.exec(store),
            Command::Hset(cmd) => cmd.exec(store),
            Command::Hsetnx(cmd) => cmd.exec(store),
            Command::Hstrlen(cmd) => cmd.exec(store),
            Command::Hvals(cmd) => cmd.exec(store),
            Command::Sadd(cmd) => cmd.exec(store),
            Command::Scard(cmd) => cmd.exec(store),
            Command::Sdiff(cmd) => cmd.exec(store),
            Command::Sinter(cmd) => cmd.exec(store),
            Command::Sismember(cmd) => cmd.exec(store),
            Command::Smembers(cmd) => cmd.exec(store),
            Command::Smove(cmd) => cmd.exec(store),
            Command::Srem(cmd) => cmd.exec(store),
            Command::Sunion(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            // Only reachable outside a client session, where no transaction is open.
            Command::Multi => Err(CommandError::NestedMulti),
            Command::Exec => Err(CommandError::ExecWithoutMulti),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands as arrays of strings.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                }
                .into())
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        let entry = lookup(&command_name).ok_or_else(|| CommandParserError::UnknownCommand {
            command: command_name.clone(),
        })?;

        if !entry.accepts(parser.remaining()) {
            return Err(CommandParserError::WrongArity {
                command: command_name,
            }
            .into());
        }

        let command = match entry.name {
            "decr" => Decr::try_from(parser).map(Command::Decr),
            "del" => Del::try_from(parser).map(Command::Del),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "expire" => Expire::try_from(parser).map(Command::Expire),
            "get" => Get::try_from(parser).map(Command::Get),
            "incr" => Incr::try_from(parser).map(Command::Incr),
            "keys" => Keys::try_from(parser).map(Command::Keys),
            "set" => Set::try_from(parser).map(Command::Set),
            "ttl" => Ttl::try_from(parser).map(Command::Ttl),
            "type" => Type::try_from(parser).map(Command::Type),
            "llen" => Llen::try_from(parser).map(Command::Llen),
            "lpop" => Lpop::try_from(parser).map(Command::Lpop),
            "lpush" => Lpush::try_from(parser).map(Command::Lpush),
            "lrange" => Lrange::try_from(parser).map(Command::Lrange),
            "ltrim" => Ltrim::try_from(parser).map(Command::Ltrim),
            "rpop" => Rpop::try_from(parser).map(Command::Rpop),
            "rpush" => Rpush::try_from(parser).map(Command::Rpush),
            "hdel" => Hdel::try_from(parser).map(Command::Hdel),
            "hexists" => Hexists::try_from(parser).map(Command::Hexists),
            "hget" => Hget::try_from(parser).map(Command::Hget),
            "hgetall" => Hgetall::try_from(parser).map(Command::Hgetall),
            "hincrby" => HincrBy::try_from(parser).map(Command::HincrBy),
            "hincrbyfloat" => HincrByFloat::try_from(parser).map(Command::HincrByFloat),
            "hkeys" => Hkeys::try_from(parser).map(Command::Hkeys),
            "hlen" => Hlen::try_from(parser).map(Command::Hlen),
            "hmget" => Hmget::try_from(parser).map(Command::Hmget),
            "hmset" => Hmset::try_from(parser).map(Command::Hmset),
            "hset" => Hset::try_from(parser).map(Command::Hset),
            "hsetnx" => Hsetnx::try_from(parser).map(Command::Hsetnx),
            "hstrlen" => Hstrlen::try_from(parser).map(Command::Hstrlen),
            "hvals" => Hvals::try_from(parser).map(Command::Hvals),
            "sadd" => Sadd::try_from(parser).map(Command::Sadd),
            "scard" => Scard::try_from(parser).map(Command::Scard),
            "sdiff" => Sdiff::try_from(parser).map(Command::Sdiff),
            "sinter" => Sinter::try_from(parser).map(Command::Sinter),
            "sismember" => Sismember::try_from(parser).map(Command::Sismember),
            "smembers" => Smembers::try_from(parser).map(Command::Smembers),
            "smove" => Smove::try_from(parser).map(Command::Smove),
            "srem" => Srem::try_from(parser).map(Command::Srem),
            "sunion" => Sunion::try_from(parser).map(Command::Sunion),
            "ping" => Ping::try_from(parser).map(Command::Ping),
            "multi" => Ok(Command::Multi),
            "exec" => Ok(Command::Exec),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }),
        }?;

        Ok(command)
    }
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self.next_frame()?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Number of arguments not consumed yet.
    fn remaining(&self) -> usize {
        self.parts.len()
    }

    fn next_frame(&mut self) -> Result<Frame, CommandParserError> {
        self.parts.next().ok_or(CommandParserError::EndOfStream)
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        match self.next_frame()? {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        match self.next_frame()? {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        match self.next_frame()? {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(s) => s.parse().map_err(|_| CommandParserError::InvalidInteger),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(CommandParserError::InvalidInteger),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_float(&mut self) -> Result<f64, CommandParserError> {
        let float = match self.next_frame()? {
            Frame::Double(d) => Ok(d),
            Frame::Integer(i) => Ok(i as f64),
            Frame::Simple(s) => s.parse().map_err(|_| CommandParserError::InvalidFloat),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(CommandParserError::InvalidFloat),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "double".to_string(),
                actual: frame,
            }),
        }?;

        if float.is_nan() {
            return Err(CommandParserError::InvalidFloat);
        }
        Ok(float)
    }

    /// Consumes every remaining argument as a string.
    fn remaining_strings(&mut self) -> Result<Vec<String>, CommandParserError> {
        let mut strings = Vec::with_capacity(self.remaining());
        while self.remaining() > 0 {
            strings.push(self.next_string()?);
        }
        Ok(strings)
    }

    /// Consumes every remaining argument as raw bytes.
    fn remaining_bytes(&mut self) -> Result<Vec<Bytes>, CommandParserError> {
        let mut bytes = Vec::with_capacity(self.remaining());
        while self.remaining() > 0 {
            bytes.push(self.next_bytes()?);
        }
        Ok(bytes)
    }
}

/// Errors raised while turning a frame into a command. A command failing here never runs.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("ERR Protocol error: expected {expected}, got {}", actual.kind())]
    InvalidFrame { expected: String, actual: Frame },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("ERR Protocol error: invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("ERR value is not an integer or out of range")]
    InvalidInteger,
    #[error("ERR value is not a valid float")]
    InvalidFloat,
    #[error("ERR Protocol error: attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

/// Errors replied to the client. The message is the full error line, class prefix included.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error(transparent)]
    Parser(#[from] CommandParserError),
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error("ERR hash value is not an integer")]
    HashValueNotAnInteger,
    #[error("ERR hash value is not a float")]
    HashValueNotAFloat,
    #[error("ERR increment or decrement would overflow")]
    Overflow,
    #[error("ERR {0}")]
    Collection(types::Error),
    #[error("EXECABORT Transaction discarded because of previous errors.")]
    ExecAbort,
    #[error("ERR EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("ERR MULTI calls can not be nested")]
    NestedMulti,
}

impl From<types::Error> for CommandError {
    fn from(err: types::Error) -> Self {
        match err {
            types::Error::InvalidType("integer") => CommandError::HashValueNotAnInteger,
            types::Error::InvalidType(_) => CommandError::HashValueNotAFloat,
            types::Error::Overflow => CommandError::Overflow,
            err => CommandError::Collection(err),
        }
    }
}

impl From<CommandError> for Frame {
    fn from(err: CommandError) -> Self {
        // Simple errors are a single line.
        let message = err.to_string().replace(['\r', '\n'], " ");
        Frame::Error(message)
    }
}
