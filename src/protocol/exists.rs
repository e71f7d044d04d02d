use crate::audit::Operation;
use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// EXISTS command: EXISTS key
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsCmd {
    pub key: String,
}

impl ExistsCmd {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn parse(mut args: Args) -> Result<Self, CommandError> {
        let key = args.next_string()?;
        args.finish()?;
        Ok(Self::new(key))
    }

    pub fn apply(self, db: &Db) -> Frame {
        let found = db.store().exists(&self.key);
        db.audit().record(Operation::Exists, &self.key, found);
        Frame::boolean(found)
    }
}
