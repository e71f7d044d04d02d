use crate::db::Db;
use crate::protocol::command::{Args, CommandError};
use crate::protocol::resp::Frame;
use crate::util::time;

/// LIST command: every entry as `[key, value, created, updated]`, sorted by key
#[derive(Debug, Clone, PartialEq)]
pub struct ListCmd;

impl ListCmd {
    pub fn parse(args: Args) -> Result<Self, CommandError> {
        args.finish()?;
        Ok(Self)
    }

    pub fn apply(self, db: &Db) -> Frame {
        let rows = db
            .store()
            .snapshot()
            .into_iter()
            .map(|entry| {
                Frame::Array(Some(vec![
                    Frame::bulk(entry.key().to_string()),
                    Frame::bulk(entry.value().to_string()),
                    Frame::bulk(time::format(&entry.created())),
                    Frame::bulk(time::format(&entry.updated())),
                ]))
            })
            .collect();
        Frame::Array(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_empty() {
        let db = Db::default();
        assert_eq!(ListCmd.apply(&db), Frame::Array(Some(vec![])));
    }

    #[test]
    fn test_list_sorted_rows() {
        let db = Db::default();
        db.store().add("b".to_string(), "2".to_string());
        db.store().add("a".to_string(), "1".to_string());

        let rows = match ListCmd.apply(&db) {
            Frame::Array(Some(rows)) => rows,
            other => panic!("Expected array, got {:?}", other),
        };
        assert_eq!(rows.len(), 2);
        match &rows[0] {
            Frame::Array(Some(cols)) => {
                assert_eq!(cols.len(), 4);
                assert_eq!(cols[0], Frame::bulk("a"));
                assert_eq!(cols[1], Frame::bulk("1"));
            }
            other => panic!("Expected row, got {:?}", other),
        }
        assert_eq!(db.audit().records().len(), 0);
    }
}
