//! Open-vocabulary list fields such as languages and operating areas.

use serde::{Deserialize, Serialize};

/// An ordered list of distinct, trimmed tags.
///
/// Entries may come from a suggestion list or free text; blank input and
/// exact duplicates are ignored.
///
/// # Examples
///
/// ```
/// use wayfarer_core::TagSet;
///
/// let mut areas = TagSet::default();
/// assert!(areas.add(" Kandy "));
/// assert!(!areas.add("Kandy"));
/// assert!(!areas.add("   "));
/// assert_eq!(areas.as_slice(), ["Kandy"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Add a tag; returns `false` when it was blank or already present.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_owned());
        true
    }

    /// Remove a tag; returns `false` when it was absent.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != tag.trim());
        self.0.len() != before
    }

    /// Add the tag if absent, remove it otherwise. Returns whether it is now
    /// present.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.remove(tag) {
            false
        } else {
            self.add(tag)
        }
    }

    /// Whether `tag` is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag.trim())
    }

    /// Tags in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tag is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.iter().map(String::as_str).collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tags = Self::default();
        for tag in iter {
            tags.add(tag);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn collapses_duplicates_from_backend() {
        let tags = TagSet::from(vec!["Tamil".to_owned(), "Tamil ".to_owned(), "English".to_owned()]);
        assert_eq!(tags.as_slice(), ["Tamil", "English"]);
    }

    #[rstest]
    fn toggles_checkbox_style() {
        let mut amenities = TagSet::default();
        assert!(amenities.toggle("Spa"));
        assert!(!amenities.toggle("Spa"));
        assert!(amenities.is_empty());
    }

    #[rstest]
    fn removal_reports_absence() {
        let mut tags: TagSet = ["Galle"].into_iter().collect();
        assert!(!tags.remove("Kandy"));
        assert!(tags.remove("Galle"));
    }
}
