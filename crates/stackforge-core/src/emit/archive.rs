//! In-memory zip sink for downloadable bundles

use super::{check_relative, Sink, SinkError};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Packages the project into a zip with every entry under `<project_name>/`
pub struct ArchiveSink {
    prefix: String,
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: HashSet<String>,
}

impl ArchiveSink {
    pub fn new(project_name: &str) -> Self {
        Self {
            prefix: project_name.to_string(),
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated),
            entries: HashSet::new(),
        }
    }

    /// Number of files added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finalize the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>, SinkError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Sink for ArchiveSink {
    async fn write(&mut self, path: &str, content: &str) -> Result<(), SinkError> {
        check_relative(path)?;
        let entry = format!("{}/{}", self.prefix, path);
        if !self.entries.insert(entry.clone()) {
            return Err(SinkError::DuplicateEntry(entry));
        }

        self.zip.start_file(&entry, self.options)?;
        self.zip
            .write_all(content.as_bytes())
            .map_err(|source| SinkError::Io {
                path: entry.into(),
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[tokio::test]
    async fn test_entries_are_prefixed_with_project_name() {
        let mut sink = ArchiveSink::new("acme-api");
        sink.write("package.json", "{}").await.unwrap();
        sink.write("src/app.js", "// app").await.unwrap();
        assert_eq!(sink.len(), 2);

        let bytes = sink.finish().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        assert!(names.contains(&"acme-api/package.json".to_string()));
        assert!(names.contains(&"acme-api/src/app.js".to_string()));

        let mut content = String::new();
        archive
            .by_name("acme-api/src/app.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "// app");
    }

    #[tokio::test]
    async fn test_duplicate_entry_refused() {
        let mut sink = ArchiveSink::new("demo");
        sink.write("README.md", "a").await.unwrap();
        let err = sink.write("README.md", "b").await.unwrap_err();
        assert!(matches!(err, SinkError::DuplicateEntry(_)));
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let sink = ArchiveSink::new("demo");
        assert!(sink.is_empty());
        let bytes = sink.finish().unwrap();
        assert!(ZipArchive::new(Cursor::new(bytes)).unwrap().is_empty());
    }
}
