// Tag vocabulary: the sorted set of distinct tags that defines the layout of
// every feature vector.
//
// Sorting makes the layout reproducible: component i is always the i-th tag
// in lexicographic order, whatever order the items arrived in.

use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    tags: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from any collection of tags; duplicates collapse.
    pub fn from_tags<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let unique: BTreeSet<&String> = tags.into_iter().collect();
        Self {
            tags: unique.into_iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Vector component index of a tag.
    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .ok()
    }

    pub fn tag(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_deduplicated() {
        let raw: Vec<String> = ["War", "Action", "Drama", "Action"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let vocab = Vocabulary::from_tags(&raw);
        assert_eq!(vocab.tags(), &["Action", "Drama", "War"]);
        assert_eq!(vocab.index_of("Drama"), Some(1));
        assert_eq!(vocab.index_of("Horror"), None);
        assert_eq!(vocab.tag(2), Some("War"));
    }
}
