use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;

/// LOG command: the retained audit text as one bulk string
#[derive(Debug, Clone, PartialEq)]
pub struct LogCmd;

impl LogCmd {
    pub fn parse(args: Args) -> Result<Self, CommandError> {
        args.finish()?;
        Ok(Self)
    }

    pub fn apply(self, db: &Db) -> Frame {
        Frame::bulk(db.audit().render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;

    #[test]
    fn test_log_renders_audit() {
        let db = Db::default();
        assert_eq!(LogCmd.apply(&db), Frame::bulk(""));

        db.audit().record(Operation::Delete, "gone", false);
        match LogCmd.apply(&db) {
            Frame::Bulk(Some(text)) => {
                assert!(text.ends_with(b" => DELETE 'gone' , Status: 1\n"));
            }
            other => panic!("Expected bulk, got {:?}", other),
        }
    }
}
