use crate::catalog::batcher::Batch;
use crate::utils::{CatalogError, DataLayout, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

/// Writes and reads `<prefix>_<n>.json` batch files inside the data layout.
pub struct BatchWriter<'a> {
    layout: &'a DataLayout,
    prefix: String,
}

impl<'a> BatchWriter<'a> {
    pub fn new(layout: &'a DataLayout, prefix: impl Into<String>) -> Self {
        Self {
            layout,
            prefix: prefix.into(),
        }
    }

    pub fn file_name(&self, number: usize) -> String {
        format!("{}_{}.json", self.prefix, number)
    }

    pub fn write_batch<T: Serialize>(&self, batch: &Batch<T>) -> Result<PathBuf> {
        let path = write_json(self.layout, &self.file_name(batch.number), &batch.items)?;
        tracing::debug!(path = %path.display(), items = batch.len(), "Batch written");
        Ok(path)
    }

    pub fn write_all<T: Serialize>(&self, batches: &[Batch<T>]) -> Result<Vec<PathBuf>> {
        batches.iter().map(|b| self.write_batch(b)).collect()
    }

    pub fn read_batch<T: DeserializeOwned>(&self, number: usize) -> Result<Vec<T>> {
        let name = self.file_name(number);
        let path = self.layout.resolve(&name);
        if !path.exists() {
            return Err(CatalogError::BatchNotFound(name));
        }
        read_json(self.layout, &name)
    }

    /// Batch numbers present on disk, ascending.
    pub fn list_batches(&self) -> Result<Vec<usize>> {
        let probe = self.layout.resolve(self.file_name(1));
        let dir = match probe.parent() {
            Some(d) if d.exists() => d.to_path_buf(),
            _ => return Ok(Vec::new()),
        };

        let prefix = format!("{}_", self.prefix);
        let mut numbers: Vec<usize> = std::fs::read_dir(&dir)?
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_prefix(&prefix)?
                    .strip_suffix(".json")?
                    .parse::<usize>()
                    .ok()
            })
            .collect();
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Deletes every batch file of this prefix so a shorter rerun leaves no
    /// stale tail behind.
    pub fn remove_all(&self) -> Result<usize> {
        let numbers = self.list_batches()?;
        for number in &numbers {
            std::fs::remove_file(self.layout.resolve(self.file_name(*number)))?;
        }
        Ok(numbers.len())
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    layout: &DataLayout,
    name: &str,
    value: &T,
) -> Result<PathBuf> {
    let path = layout.resolve_for_write(name)?;
    let data = serde_json::to_vec_pretty(value)?;
    std::fs::write(&path, data)?;
    Ok(path)
}

pub fn read_json<T: DeserializeOwned>(layout: &DataLayout, name: &str) -> Result<T> {
    let path = layout.resolve(name);
    if !path.exists() {
        return Err(CatalogError::FileNotFound(path.display().to_string()));
    }
    let data = std::fs::read(&path)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::batcher::Batcher;

    #[test]
    fn writes_numbered_files_and_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        let writer = BatchWriter::new(&layout, "update_batch");

        let batches = Batcher::new(2).split(vec!["חלב", "גבינה", "ביצים"]);
        let paths = writer.write_all(&batches).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("updates/core/update_batch_1.json"));
        assert_eq!(writer.list_batches().unwrap(), vec![1, 2]);

        let second: Vec<String> = writer.read_batch(2).unwrap();
        assert_eq!(second, vec!["ביצים"]);

        let raw = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(raw.contains("גבינה"), "non-ASCII text must not be escaped");

        assert_eq!(writer.remove_all().unwrap(), 2);
        assert!(writer.list_batches().unwrap().is_empty());
    }

    #[test]
    fn missing_batch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        let writer = BatchWriter::new(&layout, "mongo_batch");

        assert!(writer.list_batches().unwrap().is_empty());
        assert!(matches!(
            writer.read_batch::<serde_json::Value>(4),
            Err(CatalogError::BatchNotFound(_))
        ));
    }
}
