//! Page extraction module (DEPRECATED)
//!
//! This module previously contained page summarization code.
//! Post extraction now uses `posts::extraction::PostExtractor`.
//!
//! # Deprecation Notice
//!
//! This module is deprecated and empty. Use the extraction library instead:
//! - `extraction::pipeline::ingest::ingest_with_ingestor()` - full ingestion with summarization
//! - `extraction::AI::summarize()` - direct summarization
//!
//! The module is kept for backwards compatibility during migration.
