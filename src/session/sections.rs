//! Section results: Fixed-size text storage for the three output sections.

use crate::protocol::Section;
use std::ops::Index;

/// Accumulated text for every [`Section`].
///
/// Storage is a fixed array indexed by [`Section::index`], so a result is
/// always "complete" in shape even while its texts are still empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionResult {
    texts: [String; 3],
}

impl SectionResult {
    /// Create a result with every section empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of one section.
    #[inline]
    pub fn get(&self, section: Section) -> &str {
        &self.texts[section.index()]
    }

    /// Append text to one section.
    #[inline]
    pub fn append(&mut self, section: Section, text: &str) {
        self.texts[section.index()].push_str(text);
    }

    /// Replace the contents with a copy of `other`, reusing allocations.
    pub fn copy_from(&mut self, other: &Self) {
        for (dst, src) in self.texts.iter_mut().zip(&other.texts) {
            dst.clone_from(src);
        }
    }

    /// Empty every section.
    pub fn clear(&mut self) {
        for text in &mut self.texts {
            text.clear();
        }
    }

    /// Whether every section is empty.
    pub fn is_empty(&self) -> bool {
        self.texts.iter().all(String::is_empty)
    }

    /// Iterate sections in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        Section::ALL.into_iter().map(|section| (section, self.get(section)))
    }
}

impl Index<Section> for SectionResult {
    type Output = str;

    fn index(&self, section: Section) -> &str {
        self.get(section)
    }
}
