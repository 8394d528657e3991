use rusqlite::{
    Connection, ToSql,
    types::{ToSqlOutput, Value, ValueRef},
};
use std::path::Path;

use super::Error;
use crate::shared::{Cell, Record};

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Bool(value) => ToSqlOutput::Owned(Value::Integer(i64::from(*value))),
            Cell::Int(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Cell::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            Cell::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

pub fn open_database(path: &Path) -> Result<Connection, Error> {
    Connection::open(path).map_err(|source| Error::Sqlite {
        path: path.to_path_buf(),
        source,
    })
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Replaces table `category` with `records` in one transaction.
///
/// Columns are left untyped so SQLite keeps whatever affinity each cell
/// brings.
pub fn write_table<R: Record>(
    conn: &mut Connection,
    category: &str,
    records: &[R],
) -> rusqlite::Result<()> {
    let table = quote(category);
    let columns = R::columns()
        .iter()
        .map(|column| quote(column))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=R::columns().len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let tx = conn.transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS {table}"), [])?;
    tx.execute(&format!("CREATE TABLE {table} ({columns})"), [])?;
    {
        let mut stmt =
            tx.prepare_cached(&format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"))?;
        for record in records {
            stmt.execute(rusqlite::params_from_iter(record.cells()))?;
        }
    }
    tx.commit()
}

/// Opens `path` and replaces one table, see [`write_table`].
pub fn write_sqlite<R: Record>(path: &Path, category: &str, records: &[R]) -> Result<(), Error> {
    let mut conn = open_database(path)?;
    write_table(&mut conn, category, records).map_err(|source| Error::Sqlite {
        path: path.to_path_buf(),
        source,
    })
}
