use crate::audit::Operation;
use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// UPDATE command: UPDATE key value
///
/// Creates the key when it is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCmd {
    pub key: String,
    pub value: String,
}

impl UpdateCmd {
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
        let updated = db.store().update(self.key.clone(), self.value);
        db.audit().record(Operation::Update, &self.key, updated);
        Frame::boolean(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_existing() {
        let db = Db::default();
        db.store().add("k".to_string(), "v1".to_string());

        assert_eq!(UpdateCmd::new("k", "v2").apply(&db), Frame::Integer(1));
        assert_eq!(db.store().get("k").unwrap().value(), "v2");
    }

    #[test]
    fn test_update_missing_creates() {
        let db = Db::default();
        assert_eq!(UpdateCmd::new("b", "x").apply(&db), Frame::Integer(1));
        assert!(db.store().exists("b"));
    }
}
