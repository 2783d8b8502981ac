// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — assembling page previews into one document and handing it on.

pub mod sink;
pub mod writer;

pub use sink::{Delivery, DocumentSink, MemorySink};
pub use writer::{AssembledDocument, DocumentAssembler};
