// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-backed document sink: the destination is a filesystem path.

use std::path::{Path, PathBuf};

use tracing::info;

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_document::{AssembledDocument, DocumentSink};

/// Writes each delivered document to the path named by its destination.
#[derive(Debug, Default)]
pub struct FileSink {
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DocumentSink for FileSink {
    fn deliver(
        &mut self,
        document: &AssembledDocument,
        display_name: &str,
        destination: &str,
    ) -> Result<()> {
        if destination.is_empty() {
            return Err(BlattwerkError::Sink("empty destination path".into()));
        }
        let path = Path::new(destination);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &document.bytes)?;
        info!(
            path = %path.display(),
            display_name,
            bytes = document.bytes.len(),
            sha256 = %document.sha256,
            "Wrote PDF"
        );
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> AssembledDocument {
        let bytes = b"%PDF-1.7 test".to_vec();
        AssembledDocument {
            sha256: blattwerk_document::integrity::hash_bytes(&bytes),
            bytes,
            page_count: 1,
        }
    }

    #[test]
    fn writes_into_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("out.pdf");
        let mut sink = FileSink::default();
        sink.deliver(&document(), "Test", &path.display().to_string())
            .expect("deliver");

        assert_eq!(std::fs::read(&path).expect("read"), document().bytes);
        assert_eq!(sink.written(), [path]);
    }

    #[test]
    fn empty_destination_is_refused() {
        let mut sink = FileSink::default();
        assert!(matches!(
            sink.deliver(&document(), "Test", ""),
            Err(BlattwerkError::Sink(_))
        ));
    }
}
