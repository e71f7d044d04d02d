use bytes::Bytes;

use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// PING command: PING [message]
///
/// The message is echoed back as-is, including an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct PingCmd {
    pub msg: Option<Bytes>,
}

impl PingCmd {
    pub fn parse(mut args: Args) -> Result<Self, CommandError> {
        let msg = args.next_bytes()?;
        args.finish()?;
        Ok(Self { msg })
    }

    pub fn apply(self) -> Frame {
        match self.msg {
            Some(msg) => Frame::Bulk(Some(msg)),
            None => Frame::Simple("PONG".to_string()),
        }
    }
}
