use crate::utils::Result;
use std::path::{Component, Path, PathBuf};

/// Resolves bare output/input file names into the organised data tree.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
    data_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let root = data_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root, data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let path = name.as_ref();
        if path.is_absolute() {
            return path.to_path_buf();
        }

        let existing = self.root.join(path);
        if existing.exists() {
            return existing;
        }

        let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => {
                let file = file.to_string_lossy();
                self.data_dir.join(subdir_for(&file)).join(file.as_ref())
            }
            _ => self.data_dir.join(path),
        }
    }

    /// Like [`resolve`](Self::resolve) but creates the parent directory.
    pub fn resolve_for_write(&self, name: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

fn subdir_for(name: &str) -> &'static str {
    match name {
        "all_products_import.json"
        | "products_import.json"
        | "offers_import.json"
        | "mongodb_import_batch_1.json" => return "imports",
        "import_status.json" | "offers_import_status.json" => return "status",
        "batch_1_cleaned.json" => return "batches/misc",
        _ => {}
    }

    const PREFIXES: &[(&str, &str)] = &[
        ("product_id_mapping", "mappings"),
        ("product_mapping", "mappings"),
        ("product_translations", "mappings"),
        ("mongodb_updates", "updates/core"),
        ("update_batch_", "updates/core"),
        ("arabic_update_batch_", "updates/arabic"),
        ("products_batch_", "batches/products"),
        ("offers_batch_", "batches/offers"),
        ("processed_offers_batch_", "batches/offers"),
        ("mongo_batch_", "batches/mongo"),
        ("import_batch_final_", "imports/final"),
        ("import_chunk_", "imports/chunks"),
        ("ready_for_import_batch_", "imports/ready"),
        ("test_", "tests"),
    ];

    if let Some((_, dir)) = PREFIXES.iter().find(|(prefix, _)| name.starts_with(prefix)) {
        return dir;
    }

    if name.ends_with("_shufersal_with_images.xlsx") {
        return "raw";
    }

    ""
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> (tempfile::TempDir, DataLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        (dir, layout)
    }

    #[test]
    fn maps_known_names_to_subdirectories() {
        let (_dir, layout) = layout();
        let data = layout.data_dir().to_path_buf();

        assert_eq!(
            layout.resolve("all_products_import.json"),
            data.join("imports/all_products_import.json")
        );
        assert_eq!(
            layout.resolve("arabic_update_batch_3.json"),
            data.join("updates/arabic/arabic_update_batch_3.json")
        );
        assert_eq!(
            layout.resolve("update_batch_3.json"),
            data.join("updates/core/update_batch_3.json")
        );
        assert_eq!(
            layout.resolve("mongo_batch_19.json"),
            data.join("batches/mongo/mongo_batch_19.json")
        );
        assert_eq!(
            layout.resolve("processed_offers_batch_2.json"),
            data.join("batches/offers/processed_offers_batch_2.json")
        );
        assert_eq!(
            layout.resolve("חלב_וביצים_shufersal_with_images.xlsx"),
            data.join("raw/חלב_וביצים_shufersal_with_images.xlsx")
        );
        assert_eq!(layout.resolve("notes.txt"), data.join("notes.txt"));
    }

    #[test]
    fn absolute_and_nested_paths() {
        let (dir, layout) = layout();
        let abs = dir.path().join("elsewhere.json");
        assert_eq!(layout.resolve(&abs), abs);
        assert_eq!(
            layout.resolve("reports/summary.json"),
            layout.data_dir().join("reports/summary.json")
        );
    }

    #[test]
    fn existing_relative_path_is_kept() {
        let (dir, layout) = layout();
        std::fs::write(dir.path().join("mongo_batch_1.json"), "[]").unwrap();
        assert_eq!(
            layout.resolve("mongo_batch_1.json"),
            dir.path().join("mongo_batch_1.json")
        );
    }

    #[test]
    fn write_resolution_creates_parent() {
        let (_dir, layout) = layout();
        let path = layout.resolve_for_write("offers_batch_1.json").unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
