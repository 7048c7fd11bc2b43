//! In-process table storage, used by tests and embedders that do not want files

use super::Storage;
use crate::error::Result;
use crate::types::{Column, Row, Table};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn create_table(&self, name: &str, columns: &[Column]) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Ok(false);
        }
        tables.insert(name.to_string(), Table::new(name, columns.to_vec()));
        Ok(true)
    }

    fn load_table(&self, name: &str) -> Result<Table> {
        Ok(self
            .tables
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| Table::missing(name)))
    }

    fn save_table(&self, table: &Table) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.get_mut(&table.name) {
            Some(existing) => {
                existing.rows = table.rows.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn append_row(&self, name: &str, row: &Row) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.get_mut(name) {
            Some(table) => {
                table.rows.push(row.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn drop_table(&self, name: &str) -> Result<bool> {
        Ok(self.tables.write().remove(name).is_some())
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.read().keys().cloned().collect())
    }

    fn get_table_schema(&self, name: &str) -> Result<Table> {
        Ok(self
            .tables
            .read()
            .get(name)
            .map(Table::schema)
            .unwrap_or_else(|| Table::missing(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        let columns = vec![Column::new("id", "INT")];
        assert!(storage.create_table("t", &columns).unwrap());
        assert!(!storage.create_table("t", &columns).unwrap());
        assert!(storage.append_row("t", &Row::from(vec!["1"])).unwrap());
        assert!(!storage.append_row("ghost", &Row::from(vec!["1"])).unwrap());

        let table = storage.load_table("t").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(storage.get_table_schema("t").unwrap().rows.is_empty());
        assert_eq!(storage.list_tables().unwrap(), vec!["t"]);
        assert!(storage.drop_table("t").unwrap());
        assert!(storage.load_table("t").unwrap().is_missing());
    }
}
