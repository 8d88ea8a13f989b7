// src/extract/links.rs
// =============================================================================
// This module pulls outbound links out of an HTML page.
//
// No DOM is built. Only the targets of anchor tags matter, found with three
// small patterns:
//   1. find every anchor tag:          <a ...>
//   2. inside it, find the href attr:  href="..."
//   3. inside that, find the URL:      http://...
//
// Only absolute `http://` links are recognised. Relative links, `https://`
// links and protocol-relative links (`//host/path`) are dropped.
//
// Rust concepts:
// - lazy_static!: Compile each Regex once, on first use, and share it
// - Iterators: filter_map lets us "try" each tag and keep the hits
// - Cow<str>: from_utf8_lossy borrows when it can and copies when it must
// =============================================================================

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    // `<a` must be followed by whitespace or `>` so that <abbr>, <area>,
    // <audio> and friends are not mistaken for anchors
    static ref TAG_RE: Regex = Regex::new(r#"<a(?:\s[^>]*)?>"#).unwrap();
    static ref ATTR_RE: Regex = Regex::new(r#"href="[^"]*""#).unwrap();
    static ref URL_RE: Regex = Regex::new(r#"http://[^"]*"#).unwrap();
}

const IMAGE_EXTENSIONS: [&str; 4] = [".gif", ".jpg", ".jpeg", ".png"];

// Extracts every absolute http:// link found in an anchor tag's href
//
// Parameters:
//   body: raw response body (bytes, we don't know the encoding)
//
// Returns: Vec<String> of URLs in document order
//   - duplicates are kept (the visited set deduplicates later)
//   - never fails: a body with no usable links gives an empty Vec
//
// Example:
//   body = r#"<a href="http://a.com/x">x</a><a href="/y">y</a>"#
//   result = ["http://a.com/x"]
pub fn extract_links(body: &[u8]) -> Vec<String> {
    // Invalid UTF-8 sequences become U+FFFD, the ASCII markup survives
    let text = String::from_utf8_lossy(body);

    TAG_RE
        .find_iter(&text)
        .filter_map(|tag| ATTR_RE.find(tag.as_str()))
        .filter_map(|attr| URL_RE.find(attr.as_str()))
        .map(|url| url.as_str().to_string())
        .collect()
}

// Reports whether a URL points at an image we don't want to crawl
//
// The match is on the URL *path* and is case-sensitive:
//   "http://a.com/cat.png"       -> true
//   "http://a.com/cat.png?w=100" -> true  (query is not part of the path)
//   "http://a.com/cat.PNG"       -> false
//
// If the string does not parse as a URL we fall back to matching the raw text.
pub fn is_image(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => has_image_extension(parsed.path()),
        Err(_) => has_image_extension(url),
    }
}

fn has_image_extension(path: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Regex scanning never fails: a broken page yields fewer links, never an
//    error
//
// 2. The patterns are constants, so Regex::new can only fail on a typo that
//    every test would hit
//
// 3. What does find() vs find_iter() do?
//    - find_iter() walks ALL non-overlapping matches (every anchor tag)
//    - find() returns only the FIRST match (first href in the tag, first URL
//      in the attribute)
// -----------------------------------------------------------------------------
