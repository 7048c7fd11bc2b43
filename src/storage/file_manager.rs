//! Flat-file table storage
//!
//! Each table is two files inside the data directory:
//! - `<name>.schema`: one `"<column> <type>"` line per column
//! - `<name>.csv`: one row per line, values joined by `,`
//!
//! Values are written without quoting or escaping. A value containing a comma
//! or a newline will not survive a round trip.

use super::Storage;
use crate::config::DbConfig;
use crate::error::Result;
use crate::types::{Column, Row, Table};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA_EXT: &str = "schema";
const DATA_EXT: &str = "csv";

/// Storage backed by a directory of schema/row files
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
    durable_writes: bool,
}

impl FileStorage {
    pub fn new(config: &DbConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            durable_writes: config.durable_writes,
        }
    }

    /// Storage rooted at `data_dir` with default settings
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::new(&DbConfig::with_data_dir(data_dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn schema_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, SCHEMA_EXT))
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, DATA_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    fn read_columns(&self, name: &str) -> Result<Option<Vec<Column>>> {
        let text = match fs::read_to_string(self.schema_path(name)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let columns = text
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?;
                let col_type = parts.next().unwrap_or_default();
                Some(Column::new(name, col_type))
            })
            .collect();
        Ok(Some(columns))
    }

    fn read_rows(&self, name: &str) -> Result<Vec<Row>> {
        let text = match fs::read_to_string(self.data_path(name)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| Row::new(line.split(',').map(str::to_string).collect()))
            .collect())
    }
}

fn write_row<W: Write>(out: &mut W, row: &Row) -> io::Result<()> {
    writeln!(out, "{}", row.values.join(","))
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl Storage for FileStorage {
    fn create_table(&self, name: &str, columns: &[Column]) -> Result<bool> {
        self.ensure_dir()?;
        let schema_path = self.schema_path(name);
        if schema_path.exists() {
            return Ok(false);
        }

        let mut schema = BufWriter::new(File::create(&schema_path)?);
        for col in columns {
            writeln!(schema, "{} {}", col.name, col.col_type)?;
        }
        schema.flush()?;
        File::create(self.data_path(name))?;

        debug!(table = name, columns = columns.len(), "created table files");
        Ok(true)
    }

    fn load_table(&self, name: &str) -> Result<Table> {
        let Some(columns) = self.read_columns(name)? else {
            return Ok(Table::missing(name));
        };
        let mut table = Table::new(name, columns);
        table.rows = self.read_rows(name)?;
        debug!(table = name, rows = table.rows.len(), "loaded table");
        Ok(table)
    }

    fn save_table(&self, table: &Table) -> Result<bool> {
        self.ensure_dir()?;
        let data_path = self.data_path(&table.name);
        let tmp_path = data_path.with_extension(format!("{}.tmp", DATA_EXT));

        {
            let file = File::create(&tmp_path)?;
            let mut out = BufWriter::new(file);
            for row in &table.rows {
                write_row(&mut out, row)?;
            }
            let file = out.into_inner().map_err(|e| e.into_error())?;
            if self.durable_writes {
                file.sync_all()?;
            }
        }
        fs::rename(&tmp_path, &data_path)?;

        debug!(table = %table.name, rows = table.rows.len(), "rewrote row file");
        Ok(true)
    }

    fn append_row(&self, name: &str, row: &Row) -> Result<bool> {
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.data_path(name))?;
        write_row(&mut file, row)?;
        Ok(true)
    }

    fn drop_table(&self, name: &str) -> Result<bool> {
        let schema_removed = remove_if_present(&self.schema_path(name))?;
        let data_removed = remove_if_present(&self.data_path(name))?;
        Ok(schema_removed && data_removed)
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut tables = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SCHEMA_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tables.push(stem.to_string());
            }
        }
        tables.sort();
        Ok(tables)
    }

    fn get_table_schema(&self, name: &str) -> Result<Table> {
        Ok(match self.read_columns(name)? {
            Some(columns) => Table::new(name, columns),
            None => Table::missing(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(&DbConfig::for_testing(dir.path().join("db")));
        (dir, storage)
    }

    fn columns() -> Vec<Column> {
        vec![Column::new("id", "INT"), Column::new("name", "STRING")]
    }

    #[test]
    fn test_create_writes_schema_file() {
        let (_dir, storage) = storage();
        assert!(storage.create_table("users", &columns()).unwrap());

        let schema = fs::read_to_string(storage.schema_path("users")).unwrap();
        assert_eq!(schema, "id INT\nname STRING\n");
        assert!(storage.data_path("users").exists());
    }

    #[test]
    fn test_create_existing_table_returns_false() {
        let (_dir, storage) = storage();
        assert!(storage.create_table("users", &columns()).unwrap());
        assert!(!storage.create_table("users", &columns()).unwrap());
    }

    #[test]
    fn test_load_unknown_table_is_missing() {
        let (_dir, storage) = storage();
        let table = storage.load_table("ghost").unwrap();
        assert!(table.is_missing());
        assert_eq!(table.name, "ghost");
    }

    #[test]
    fn test_append_and_load() {
        let (_dir, storage) = storage();
        storage.create_table("users", &columns()).unwrap();
        storage.append_row("users", &Row::from(vec!["1", "alice"])).unwrap();
        storage.append_row("users", &Row::from(vec!["2", "bob"])).unwrap();

        let raw = fs::read_to_string(storage.data_path("users")).unwrap();
        assert_eq!(raw, "1,alice\n2,bob\n");

        let table = storage.load_table("users").unwrap();
        assert_eq!(table.columns, columns());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].values, vec!["2", "bob"]);
    }

    #[test]
    fn test_save_replaces_rows() {
        let (_dir, storage) = storage();
        storage.create_table("users", &columns()).unwrap();
        storage.append_row("users", &Row::from(vec!["1", "alice"])).unwrap();

        let mut table = storage.load_table("users").unwrap();
        table.rows = vec![Row::from(vec!["9", "zed"])];
        assert!(storage.save_table(&table).unwrap());

        let reloaded = storage.load_table("users").unwrap();
        assert_eq!(reloaded.rows, vec![Row::from(vec!["9", "zed"])]);
        assert!(!storage.data_path("users").with_extension("csv.tmp").exists());
    }

    #[test]
    fn test_comma_in_value_splits_row() {
        let (_dir, storage) = storage();
        storage.create_table("notes", &[Column::new("body", "STRING")]).unwrap();
        storage.append_row("notes", &Row::from(vec!["a,b"])).unwrap();

        let table = storage.load_table("notes").unwrap();
        assert_eq!(table.rows[0].values, vec!["a", "b"]);
    }

    #[test]
    fn test_list_and_drop() {
        let (_dir, storage) = storage();
        assert!(storage.list_tables().unwrap().is_empty());

        storage.create_table("zeta", &columns()).unwrap();
        storage.create_table("alpha", &columns()).unwrap();
        assert_eq!(storage.list_tables().unwrap(), vec!["alpha", "zeta"]);

        assert!(storage.drop_table("zeta").unwrap());
        assert!(!storage.drop_table("zeta").unwrap());
        assert_eq!(storage.list_tables().unwrap(), vec!["alpha"]);
    }

    #[test]
    fn test_schema_has_no_rows() {
        let (_dir, storage) = storage();
        storage.create_table("users", &columns()).unwrap();
        storage.append_row("users", &Row::from(vec!["1", "alice"])).unwrap();

        let schema = storage.get_table_schema("users").unwrap();
        assert_eq!(schema.columns.len(), 2);
        assert!(schema.rows.is_empty());
        assert!(storage.get_table_schema("ghost").unwrap().is_missing());
    }
}
