// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delivery seam for assembled documents. The engine never stores anything
// itself; whatever receives the finished PDF implements `DocumentSink`.

use blattwerk_core::error::Result;
use tracing::debug;

use super::writer::AssembledDocument;

/// Receives finished documents.
pub trait DocumentSink {
    /// Take ownership of a copy of `document`.
    ///
    /// `display_name` is the user-facing title; `destination` identifies
    /// where the document should end up (a folder, a task, an upload slot).
    fn deliver(
        &mut self,
        document: &AssembledDocument,
        display_name: &str,
        destination: &str,
    ) -> Result<()>;
}

/// One document handed to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub display_name: String,
    pub destination: String,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

/// Sink that keeps every delivery in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Vec<Delivery>,
}

impl MemorySink {
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn take(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }
}

impl DocumentSink for MemorySink {
    fn deliver(
        &mut self,
        document: &AssembledDocument,
        display_name: &str,
        destination: &str,
    ) -> Result<()> {
        debug!(display_name, destination, bytes = document.bytes.len(), "Stored in memory");
        self.deliveries.push(Delivery {
            display_name: display_name.to_owned(),
            destination: destination.to_owned(),
            bytes: document.bytes.clone(),
            sha256: document.sha256.clone(),
        });
        Ok(())
    }
}
