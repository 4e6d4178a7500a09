//! Default names and identities for fragments.

use roxmltree::Node;

use super::candidate::Strategy;
use super::document::{SourceDocument, is_visual};

/// Human-presentable name from an element's `id`, else its first class.
///
/// `arrow_left-2` becomes `Arrow Left 2`. Returns `None` when the element
/// carries neither, or the value has no letters or digits.
pub fn name_from_element(node: Node<'_, '_>) -> Option<String> {
    node.attribute("id")
        .and_then(humanize)
        .or_else(|| {
            node.attribute("class")
                .and_then(|class| class.split_whitespace().next())
                .and_then(humanize)
        })
}

/// Name of the nearest named wrapper group when `node` is its only drawing.
///
/// `<svg><g id="heart"><path/></g></svg>` names the path `Heart`. The root
/// `<svg>` never lends its name.
pub fn name_from_wrapper(doc: &SourceDocument<'_>, node: Node<'_, '_>) -> Option<String> {
    let root = doc.root().id();
    let layer = doc.content_layer();
    if layer.id() == root {
        return None;
    }
    let mut drawings = layer.children().filter(|n| n.is_element() && is_visual(*n));
    match (drawings.next(), drawings.next()) {
        (Some(only), None) if only.id() == node.id() => {}
        _ => return None,
    }
    layer
        .ancestors()
        .take_while(|a| a.id() != root)
        .find_map(name_from_element)
}

/// Ordinal placeholder name: `Icon 1`, `Icon 2`, ...
pub fn ordinal_name(index: usize) -> String {
    format!("Icon {}", index + 1)
}

/// Replace `_`/`-` with spaces, collapse whitespace, and title-case each word.
pub fn humanize(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();

    let name = words.join(" ");
    name.chars().any(char::is_alphanumeric).then_some(name)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// ASCII file-name-safe slug, e.g. `Café Icon` becomes `cafe-icon`.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode::deunicode(name).to_ascii_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "icon".to_string()
    } else {
        slug.to_string()
    }
}

/// Compute blake3 hash for identifiers (12 hex chars).
pub fn filename_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hash.to_hex()[..12].to_string()
}

/// Per-run seed that keeps fragment ids unique across files and runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSeed {
    /// Generation timestamp (nanoseconds since the epoch).
    pub stamp: u128,
    /// Position of the file in its batch.
    pub file_index: usize,
}

impl IdSeed {
    pub fn now(file_index: usize) -> Self {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self { stamp, file_index }
    }
}

/// `{source-slug}-{strategy}-{index}-{hash}`.
///
/// The hash covers the seed, position and content, so ids stay unique even
/// when two files share a name within one run.
pub fn fragment_id(source: &str, strategy: Strategy, index: usize, seed: IdSeed, content: &str) -> String {
    let key = format!(
        "{source}\0{}\0{}\0{index}\0{content}",
        seed.stamp, seed.file_index
    );
    format!(
        "{}-{}-{}-{}",
        slugify(source_stem(source)),
        strategy.as_str(),
        index,
        filename_hash(key.as_bytes())
    )
}

/// File name without directories or a trailing `.svg`.
pub fn source_stem(source: &str) -> &str {
    let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
    name.strip_suffix(".svg")
        .or_else(|| name.strip_suffix(".SVG"))
        .unwrap_or(name)
}
