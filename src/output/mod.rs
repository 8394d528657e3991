use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};
use thiserror::Error;
use tracing::debug;

mod sqlite;
pub use sqlite::*;

use crate::shared::{InvalidArgument, Record};

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("SQLite error in {}: {source}", .path.display())]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Error::Io { path, source }
    }

    fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Error::Csv { path, source }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Sqlite,
    Json,
}

impl OutputFormat {
    pub const NAMES: &'static [&'static str] = &["csv", "sqlite", "json"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Sqlite => "sqlite",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "sqlite" => Ok(OutputFormat::Sqlite),
            "json" => Ok(OutputFormat::Json),
            _ => Err(InvalidArgument::new("format", s, Self::NAMES)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes `<dir>/<category>.csv`, UTF-8 with a BOM so spreadsheet tools pick
/// up the Chinese text. The header is written even when there are no rows.
pub fn write_csv<R: Record>(dir: &Path, category: &str, records: &[R]) -> Result<PathBuf, Error> {
    let path = dir.join(format!("{category}.csv"));
    let mut file = BufWriter::new(File::create(&path).map_err(Error::io(&path))?);
    file.write_all(BOM).map_err(Error::io(&path))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(R::columns())
        .map_err(Error::csv(&path))?;
    for record in records {
        let row = record.cells().iter().map(ToString::to_string).collect::<Vec<_>>();
        writer.write_record(&row).map_err(Error::csv(&path))?;
    }
    writer.flush().map_err(Error::io(&path))?;
    Ok(path)
}

/// Writes `<dir>/<category>.json` as a pretty printed array.
pub fn write_json<R: Record>(dir: &Path, category: &str, records: &[R]) -> Result<PathBuf, Error> {
    let path = dir.join(format!("{category}.json"));
    let file = File::create(&path).map_err(Error::io(&path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    writer.flush().map_err(Error::io(&path))?;
    Ok(path)
}

/// Reads the `park_id` column back from a CSV written by [`write_csv`].
pub fn read_csv_park_ids(path: &Path) -> Result<Vec<String>, Error> {
    let bytes = fs::read(path).map_err(Error::io(path))?;
    let bytes = bytes.strip_prefix(BOM).unwrap_or(&bytes);

    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers().map_err(Error::csv(path))?.clone();
    let Some(index) = headers.iter().position(|header| header == "park_id") else {
        return Ok(Vec::new());
    };

    let mut ids = Vec::new();
    for row in reader.records() {
        let row = row.map_err(Error::csv(path))?;
        if let Some(id) = row.get(index) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Writes categories to every enabled format under one directory.
///
/// The SQLite file (`<dir>/<database>.db`) is opened on the first write that
/// needs it and shared by every category afterwards.
#[derive(Debug)]
pub struct Writer {
    dir: PathBuf,
    formats: Vec<OutputFormat>,
    database: PathBuf,
    conn: Option<rusqlite::Connection>,
}

impl Writer {
    pub fn new(
        dir: impl Into<PathBuf>,
        formats: &[OutputFormat],
        database: &str,
    ) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(Error::io(&dir))?;
        let database = dir.join(format!("{database}.db"));
        Ok(Self {
            dir,
            formats: formats.to_vec(),
            database,
            conn: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn database_path(&self) -> &Path {
        &self.database
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    pub fn write<R: Record>(&mut self, category: &str, records: &[R]) -> Result<(), Error> {
        let now = Instant::now();
        for format in self.formats.clone() {
            match format {
                OutputFormat::Csv => {
                    write_csv(&self.dir, category, records)?;
                }
                OutputFormat::Json => {
                    write_json(&self.dir, category, records)?;
                }
                OutputFormat::Sqlite => {
                    if self.conn.is_none() {
                        self.conn = Some(open_database(&self.database)?);
                    }
                    if let Some(conn) = self.conn.as_mut() {
                        write_table(conn, category, records).map_err(|source| Error::Sqlite {
                            path: self.database.clone(),
                            source,
                        })?;
                    }
                }
            }
        }
        debug!(
            "Writing {} {} rows took {:?}",
            records.len(),
            category,
            now.elapsed()
        );
        Ok(())
    }
}

#[test]
fn format_names_parse() {
    for name in OutputFormat::NAMES {
        let format: OutputFormat = name.parse().unwrap();
        assert_eq!(format.as_str(), *name);
    }
    assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
    assert!("parquet".parse::<OutputFormat>().is_err());
}
