//! Locators: how an action names its target element.
//!
//! Locators are strict: resolution succeeds only when exactly one node
//! matches. Strategies are ranked by stability, most stable first:
//!
//! 1. [`LocatorStrategy::StableTag`] - developer-assigned test tag
//! 2. [`LocatorStrategy::AccessibilityDescription`] - content description
//! 3. [`LocatorStrategy::HierarchyPath`] - positional path from the root
//! 4. [`LocatorStrategy::Text`] - visible text
//!
//! Hierarchy paths name every level and carry a sibling index on every
//! non-root segment, e.g. `Root>Container[2]>Row[0]>Button[1]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::ResolutionError;
use crate::tree::ROOT_MARKER;

/// Separator between hierarchy path segments
pub const PATH_SEPARATOR: char = '>';

/// Element selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocatorStrategy {
    /// Stable developer-assigned tag
    #[serde(alias = "StableTag", alias = "stable_tag", alias = "tag")]
    StableTag,
    /// Visible text content
    #[serde(alias = "Text")]
    Text,
    /// Accessibility content description
    #[serde(
        alias = "AccessibilityDescription",
        alias = "accessibility_description",
        alias = "contentDescription"
    )]
    AccessibilityDescription,
    /// Positional path from the root
    #[serde(alias = "HierarchyPath", alias = "hierarchy_path", alias = "path")]
    HierarchyPath,
}

impl LocatorStrategy {
    /// Rank in the stability order (0 = most stable)
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::StableTag => 0,
            Self::AccessibilityDescription => 1,
            Self::HierarchyPath => 2,
            Self::Text => 3,
        }
    }

    /// Whether `self` ranks strictly above `other`
    #[must_use]
    pub const fn outranks(self, other: Self) -> bool {
        self.priority() < other.priority()
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StableTag => "stableTag",
            Self::Text => "text",
            Self::AccessibilityDescription => "accessibilityDescription",
            Self::HierarchyPath => "hierarchyPath",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one target element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Selection strategy
    pub strategy: LocatorStrategy,
    /// Strategy-specific value (tag, text, description, or path)
    pub value: String,
    /// Why this strategy was selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
            rationale: None,
        }
    }

    /// Locate by stable tag
    #[must_use]
    pub fn stable_tag(tag: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::StableTag, tag)
    }

    /// Locate by visible text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Text, text)
    }

    /// Locate by accessibility description
    #[must_use]
    pub fn description(description: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AccessibilityDescription, description)
    }

    /// Locate by hierarchy path
    #[must_use]
    pub fn path(path: &HierarchyPath) -> Self {
        Self::new(LocatorStrategy::HierarchyPath, path.to_string())
    }

    /// Attach a selection rationale
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Check the value is usable for its strategy
    pub fn validate(&self) -> Result<(), ResolutionError> {
        if self.value.trim().is_empty() {
            return Err(ResolutionError::NotFound {
                locator: format!("{} with empty value", self.strategy),
            });
        }
        if self.strategy == LocatorStrategy::HierarchyPath {
            HierarchyPath::parse(&self.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.strategy, self.value)
    }
}

/// One level of a hierarchy path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Class name recorded for the level (informational; not matched)
    pub name: String,
    /// Position among the parent's children; `None` only for the root
    pub index: Option<usize>,
}

/// Parsed hierarchy path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HierarchyPath {
    segments: Vec<PathSegment>,
}

impl HierarchyPath {
    /// Build a path from sibling indices below the root
    #[must_use]
    pub fn from_indices<'a>(levels: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let mut segments = vec![PathSegment {
            name: ROOT_MARKER.to_string(),
            index: None,
        }];
        segments.extend(levels.into_iter().map(|(name, index)| PathSegment {
            name: name.to_string(),
            index: Some(index),
        }));
        Self { segments }
    }

    /// Parse `Root>Name[i]>...`.
    ///
    /// The first segment must be the root marker; every later segment needs a
    /// numeric index because untagged siblings are otherwise ambiguous.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let invalid = |reason: String| ResolutionError::InvalidPath {
            path: raw.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        for (depth, part) in raw.split(PATH_SEPARATOR).enumerate() {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid(format!("empty segment at depth {depth}")));
            }
            let (name, index) = split_segment(part).map_err(|e| invalid(e))?;
            if depth == 0 {
                if name != ROOT_MARKER {
                    return Err(invalid(format!(
                        "path must start with '{ROOT_MARKER}', found '{name}'"
                    )));
                }
                if index.is_some_and(|i| i != 0) {
                    return Err(invalid("root index must be 0".to_string()));
                }
                segments.push(PathSegment {
                    name: name.to_string(),
                    index: None,
                });
                continue;
            }
            if index.is_none() {
                return Err(invalid(format!(
                    "segment '{name}' at depth {depth} lacks a sibling index"
                )));
            }
            segments.push(PathSegment {
                name: name.to_string(),
                index,
            });
        }
        Ok(Self { segments })
    }

    /// All segments, root first
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Sibling indices below the root, top-down
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().skip(1).filter_map(|s| s.index)
    }

    /// Number of levels below the root
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

fn split_segment(part: &str) -> Result<(&str, Option<usize>), String> {
    let Some(open) = part.find('[') else {
        return Ok((part, None));
    };
    if !part.ends_with(']') {
        return Err(format!("segment '{part}' has an unterminated index"));
    }
    let name = part[..open].trim();
    if name.is_empty() {
        return Err(format!("segment '{part}' has no name"));
    }
    let digits = &part[open + 1..part.len() - 1];
    let index = digits
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("segment '{part}' has a non-numeric index"))?;
    Ok((name, Some(index)))
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(&segment.name)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_priority_order() {
            let ranks: Vec<u8> = [
                LocatorStrategy::StableTag,
                LocatorStrategy::AccessibilityDescription,
                LocatorStrategy::HierarchyPath,
                LocatorStrategy::Text,
            ]
            .iter()
            .map(|s| s.priority())
            .collect();
            assert_eq!(ranks, vec![0, 1, 2, 3]);
            assert!(LocatorStrategy::StableTag.outranks(LocatorStrategy::Text));
            assert!(LocatorStrategy::HierarchyPath.outranks(LocatorStrategy::Text));
            assert!(!LocatorStrategy::Text.outranks(LocatorStrategy::Text));
        }

        #[test]
        fn test_wire_names_and_aliases() {
            let json = serde_json::to_string(&LocatorStrategy::AccessibilityDescription).unwrap();
            assert_eq!(json, "\"accessibilityDescription\"");
            let tag: LocatorStrategy = serde_json::from_str("\"StableTag\"").unwrap();
            assert_eq!(tag, LocatorStrategy::StableTag);
            let path: LocatorStrategy = serde_json::from_str("\"hierarchy_path\"").unwrap();
            assert_eq!(path, LocatorStrategy::HierarchyPath);
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_rationale_omitted_when_absent() {
            let json = serde_json::to_string(&Locator::stable_tag("submit")).unwrap();
            assert_eq!(json, r#"{"strategy":"stableTag","value":"submit"}"#);
        }

        #[test]
        fn test_display() {
            assert_eq!(Locator::text("OK").to_string(), "text=\"OK\"");
        }

        #[test]
        fn test_validate_rejects_blank_value() {
            assert!(Locator::stable_tag("  ").validate().is_err());
            assert!(Locator::stable_tag("submit").validate().is_ok());
        }

        #[test]
        fn test_validate_checks_path_grammar() {
            let bad = Locator::new(LocatorStrategy::HierarchyPath, "Column>Button[0]");
            assert!(matches!(
                bad.validate(),
                Err(ResolutionError::InvalidPath { .. })
            ));
        }
    }

    mod path_tests {
        use super::*;

        #[test]
        fn test_parse_full_path() {
            let path = HierarchyPath::parse("Root>Container[2]>Row[0]>Button[1]").unwrap();
            assert_eq!(path.depth(), 3);
            assert_eq!(path.indices().collect::<Vec<_>>(), vec![2, 0, 1]);
            assert_eq!(path.segments()[1].name, "Container");
        }

        #[test]
        fn test_parse_tolerates_whitespace() {
            let path = HierarchyPath::parse("Root > Row[0] > Button[ 3 ]").unwrap();
            assert_eq!(path.to_string(), "Root>Row[0]>Button[3]");
        }

        #[test]
        fn test_root_only() {
            let path = HierarchyPath::parse("Root").unwrap();
            assert_eq!(path.depth(), 0);
            assert_eq!(HierarchyPath::parse("Root[0]").unwrap(), path);
        }

        #[test]
        fn test_missing_index_rejected() {
            let err = HierarchyPath::parse("Root>Row>Button[1]").unwrap_err();
            assert!(err.to_string().contains("lacks a sibling index"));
        }

        #[test]
        fn test_wrong_root_rejected() {
            let err = HierarchyPath::parse("Column[0]>Button[1]").unwrap_err();
            assert!(err.to_string().contains("must start with"));
        }

        #[test]
        fn test_malformed_index_rejected() {
            assert!(HierarchyPath::parse("Root>Row[a]").is_err());
            assert!(HierarchyPath::parse("Root>Row[1").is_err());
            assert!(HierarchyPath::parse("Root>>Row[1]").is_err());
            assert!(HierarchyPath::parse("Root>[1]").is_err());
        }

        #[test]
        fn test_from_indices_display() {
            let path = HierarchyPath::from_indices([("Column", 0), ("Button", 2)]);
            assert_eq!(path.to_string(), "Root>Column[0]>Button[2]");
            assert_eq!(Locator::path(&path).value, "Root>Column[0]>Button[2]");
        }
    }
}
