//! Content read from a directory tree laid out as `<root>/<namespace>/<path>`

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use folio_core::ContentId;

use super::{ContentReader, ContentStore};

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    name: String,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of an id. Ids escaping the root are refused.
    fn resolve(&self, id: &ContentId) -> io::Result<PathBuf> {
        if id.segments().any(|s| s == ".." || s == ".") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("content id {} leaves the store root", id),
            ));
        }
        let mut path = self.root.join(id.namespace());
        path.extend(id.segments());
        Ok(path)
    }
}

impl ContentStore for DirectoryStore {
    fn list_files(&self, prefix: &ContentId) -> io::Result<Vec<ContentId>> {
        let base = self.root.join(prefix.namespace());
        let start = self.resolve(prefix)?;
        let mut paths = Vec::new();
        collect_files(&start, &mut paths)?;
        paths.sort();

        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            let Ok(rel) = path.strip_prefix(&base) else {
                continue;
            };
            let rel = rel.to_string_lossy().replace('\\', "/");
            match ContentId::new(prefix.namespace(), rel) {
                Ok(id) => ids.push(id),
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(ids)
    }

    fn open(&self, id: &ContentId) -> io::Result<Option<ContentReader<'_>>> {
        let path = self.resolve(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        tracing::debug!("Loading {}", path.display());
        Ok(Some(Box::new(BufReader::new(File::open(path)?))))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Recursively collect file paths below `path`
fn collect_files(path: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    if path.is_file() {
        out.push(path.to_path_buf());
        return Ok(());
    }
    if !path.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            collect_files(&entry_path, out)?;
        } else {
            out.push(entry_path);
        }
    }
    Ok(())
}
