use crate::audit::Operation;
use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// GET command: GET key
#[derive(Debug, Clone, PartialEq)]
pub struct GetCmd {
    pub key: String,
}

impl GetCmd {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn parse(mut args: Args) -> Result<Self, CommandError> {
        let key = args.next_string()?;
        args.finish()?;
        Ok(Self::new(key))
    }

    pub fn apply(self, db: &Db) -> Frame {
        let entry = db.store().get(&self.key);
        db.audit().record(Operation::Get, &self.key, entry.is_some());

        match entry {
            Some(entry) => Frame::bulk(entry.value().to_string()),
            None => Frame::null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cmd_execute() {
        let db = Db::default();
        db.store().add("testkey".to_string(), "testvalue".to_string());

        let result = GetCmd::new("testkey").apply(&db);
        assert_eq!(result, Frame::bulk("testvalue"));
    }

    #[test]
    fn test_get_cmd_execute_not_found() {
        let db = Db::default();
        let result = GetCmd::new("nonexistent").apply(&db);

        assert_eq!(result, Frame::null());
        assert_eq!(db.audit().records()[0].status(), 1);
    }
}
