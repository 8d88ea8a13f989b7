// src/extract/mod.rs
// =============================================================================
// Link extraction and link classification.
//
// Submodules:
// - links: Finds absolute http:// links in anchor tags, spots image URLs
// =============================================================================

mod links;

pub use links::{extract_links, is_image};
