use crate::audit::Operation;
use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// ADD command: ADD key value
///
/// Replies `:1` when the key was created and `:0` when it already existed.
#[derive(Debug, Clone, PartialEq)]
pub struct AddCmd {
    pub key: String,
    pub value: String,
}

impl AddCmd {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn parse(mut args: Args) -> Result<Self, CommandError> {
        let key = args.next_string()?;
        let value = args.next_string()?;
        args.finish()?;
        Ok(Self::new(key, value))
    }

    pub fn apply(self, db: &Db) -> Frame {
        let created = db.store().add(self.key.clone(), self.value);
        db.audit().record(Operation::Create, &self.key, created);
        Frame::boolean(created)
    }
}
