use bytes::Bytes;
use thiserror::Error;

use crate::db::Db;
use crate::protocol::add::AddCmd;
use crate::protocol::delete::DeleteCmd;
use crate::protocol::exists::ExistsCmd;
use crate::protocol::get::GetCmd;
use crate::protocol::list::ListCmd;
use crate::protocol::log::LogCmd;
use crate::protocol::ping::PingCmd;
use crate::protocol::resp::Frame;
use crate::protocol::update::UpdateCmd;

/// Request rejected before it reaches the store
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("ERR failed to parse command")]
    NotACommand,
    #[error("ERR unknown command '{0}'")]
    Unknown(String),
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),
    #[error("ERR invalid argument")]
    InvalidArgument,
}

/// Supported commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// PING [message]
    Ping(PingCmd),
    /// GET key
    Get(GetCmd),
    /// EXISTS key
    Exists(ExistsCmd),
    /// ADD key value
    Add(AddCmd),
    /// UPDATE key value
    Update(UpdateCmd),
    /// DELETE key
    Delete(DeleteCmd),
    /// LIST
    List(ListCmd),
    /// LOG
    Log(LogCmd),
}

impl Command {
    /// Decode a RESP array into a command
    pub fn from_frame(frame: Frame) -> Result<Self, CommandError> {
        let items = match frame {
            Frame::Array(Some(items)) if !items.is_empty() => items,
            _ => return Err(CommandError::NotACommand),
        };

        let mut items = items.into_iter();
        let name = match items.next() {
            Some(Frame::Bulk(Some(data))) => String::from_utf8_lossy(&data).to_uppercase(),
            Some(Frame::Simple(s)) => s.to_uppercase(),
            _ => return Err(CommandError::NotACommand),
        };

        let cmd = match name.as_str() {
            "PING" => Command::Ping(PingCmd::parse(Args::new("ping", items))?),
            "GET" => Command::Get(GetCmd::parse(Args::new("get", items))?),
            "EXISTS" => Command::Exists(ExistsCmd::parse(Args::new("exists", items))?),
            "ADD" => Command::Add(AddCmd::parse(Args::new("add", items))?),
            "UPDATE" => Command::Update(UpdateCmd::parse(Args::new("update", items))?),
            "DELETE" | "DEL" => Command::Delete(DeleteCmd::parse(Args::new("delete", items))?),
            "LIST" => Command::List(ListCmd::parse(Args::new("list", items))?),
            "LOG" => Command::Log(LogCmd::parse(Args::new("log", items))?),
            _ => return Err(CommandError::Unknown(name)),
        };
        Ok(cmd)
    }

    /// Run the command against the shared state and build the reply
    pub fn apply(self, db: &Db) -> Frame {
        match self {
            Command::Ping(cmd) => cmd.apply(),
            Command::Get(cmd) => cmd.apply(db),
            Command::Exists(cmd) => cmd.apply(db),
            Command::Add(cmd) => cmd.apply(db),
            Command::Update(cmd) => cmd.apply(db),
            Command::Delete(cmd) => cmd.apply(db),
            Command::List(cmd) => cmd.apply(db),
            Command::Log(cmd) => cmd.apply(db),
        }
    }

    /// Decode and run a request frame, turning rejections into error replies
    pub fn execute(frame: Frame, db: &Db) -> Frame {
        match Self::from_frame(frame) {
            Ok(cmd) => cmd.apply(db),
            Err(e) => Frame::error(e.to_string()),
        }
    }
}

/// Argument cursor over the items following the command name
pub struct Args {
    name: &'static str,
    items: std::vec::IntoIter<Frame>,
}

impl Args {
    pub fn new(name: &'static str, items: std::vec::IntoIter<Frame>) -> Self {
        Self { name, items }
    }

    /// Next argument as a non-empty UTF-8 string
    pub fn next_string(&mut self) -> Result<String, CommandError> {
        match self.next_optional()? {
            Some(s) => Ok(s),
            None => Err(CommandError::WrongArity(self.name)),
        }
    }

    /// Next argument as a non-empty UTF-8 string, if one remains
    pub fn next_optional(&mut self) -> Result<Option<String>, CommandError> {
        let data = match self.next_bytes()? {
            None => return Ok(None),
            Some(data) => data,
        };
        match String::from_utf8(data.to_vec()) {
            Ok(s) if !s.is_empty() => Ok(Some(s)),
            _ => Err(CommandError::InvalidArgument),
        }
    }

    /// Next argument as raw bytes, empty allowed
    pub fn next_bytes(&mut self) -> Result<Option<Bytes>, CommandError> {
        match self.items.next() {
            None => Ok(None),
            Some(Frame::Bulk(Some(data))) => Ok(Some(data)),
            Some(Frame::Simple(s)) => Ok(Some(Bytes::from(s))),
            Some(_) => Err(CommandError::InvalidArgument),
        }
    }

    /// Fail if any argument is left over
    pub fn finish(mut self) -> Result<(), CommandError> {
        match self.items.next() {
            Some(_) => Err(CommandError::WrongArity(self.name)),
            None => Ok(()),
        }
    }
}
