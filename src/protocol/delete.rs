use crate::audit::Operation;
use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// DELETE command: DELETE key
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCmd {
    pub key: String,
}

impl DeleteCmd {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn parse(mut args: Args) -> Result<Self, CommandError> {
        let key = args.next_string()?;
        args.finish()?;
        Ok(Self::new(key))
    }

    pub fn apply(self, db: &Db) -> Frame {
        let removed = db.store().delete(&self.key);
        db.audit().record(Operation::Delete, &self.key, removed);
        Frame::boolean(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_twice() {
        let db = Db::default();
        db.store().add("k".to_string(), "v".to_string());

        assert_eq!(DeleteCmd::new("k").apply(&db), Frame::Integer(1));
        assert_eq!(DeleteCmd::new("k").apply(&db), Frame::Integer(0));
        assert!(!db.store().exists("k"));
    }
}
