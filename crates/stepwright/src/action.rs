//! Structured, replayable UI actions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locator::Locator;

/// Kind of UI operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Tap the element
    Click,
    /// Press and hold
    LongClick,
    /// Tap twice
    DoubleClick,
    /// Replace (or insert) text
    TypeText,
    /// Clear text
    ClearText,
    /// Scroll until the element is in view
    ScrollTo,
    /// Element exists and is visible
    AssertVisible,
    /// Element text equals the value exactly
    AssertText,
    /// Element text contains the value
    AssertContains,
}

impl ActionKind {
    /// Kinds that carry a `value`
    #[must_use]
    pub const fn requires_value(self) -> bool {
        matches!(self, Self::TypeText | Self::AssertText | Self::AssertContains)
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::LongClick => "LongClick",
            Self::DoubleClick => "DoubleClick",
            Self::TypeText => "TypeText",
            Self::ClearText => "ClearText",
            Self::ScrollTo => "ScrollTo",
            Self::AssertVisible => "AssertVisible",
            Self::AssertText => "AssertText",
            Self::AssertContains => "AssertContains",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executable UI operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Operation kind
    pub kind: ActionKind,
    /// Text to type or expected text; only meaningful for some kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Target element
    pub locator: Locator,
}

impl Action {
    /// Create an action without a value
    #[must_use]
    pub const fn new(kind: ActionKind, locator: Locator) -> Self {
        Self {
            kind,
            value: None,
            locator,
        }
    }

    /// Create an action carrying a value
    #[must_use]
    pub fn with_value(kind: ActionKind, value: impl Into<String>, locator: Locator) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            locator,
        }
    }

    /// Tap
    #[must_use]
    pub const fn click(locator: Locator) -> Self {
        Self::new(ActionKind::Click, locator)
    }

    /// Type text
    #[must_use]
    pub fn type_text(text: impl Into<String>, locator: Locator) -> Self {
        Self::with_value(ActionKind::TypeText, text, locator)
    }

    /// Exact text assertion
    #[must_use]
    pub fn assert_text(expected: impl Into<String>, locator: Locator) -> Self {
        Self::with_value(ActionKind::AssertText, expected, locator)
    }

    /// Substring assertion
    #[must_use]
    pub fn assert_contains(expected: impl Into<String>, locator: Locator) -> Self {
        Self::with_value(ActionKind::AssertContains, expected, locator)
    }

    /// Visibility assertion
    #[must_use]
    pub const fn assert_visible(locator: Locator) -> Self {
        Self::new(ActionKind::AssertVisible, locator)
    }

    /// Enforce the value rule: required kinds must carry one, other kinds
    /// drop whatever they were given.
    pub fn normalized(mut self) -> Result<Self, String> {
        if self.kind.requires_value() {
            if self.value.is_none() {
                return Err(format!("{} requires a value", self.kind));
            }
        } else {
            self.value = None;
        }
        Ok(self)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "{}({value:?}) on {}", self.kind, self.locator),
            None => write!(f, "{} on {}", self.kind, self.locator),
        }
    }
}

/// A natural-language step and the actions it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step text as authored
    pub description: String,
    /// Actions in execution order
    pub actions: Vec<Action>,
}

impl Step {
    /// Create a step record; the description is stored trimmed
    #[must_use]
    pub fn new(description: impl Into<String>, actions: Vec<Action>) -> Self {
        let description = description.into();
        Self {
            description: description.trim().to_string(),
            actions,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_step_description_trimmed() {
        assert_eq!(Step::new(" Click save \n", vec![]).description, "Click save");
    }

    #[test]
    fn test_requires_value() {
        assert!(ActionKind::TypeText.requires_value());
        assert!(ActionKind::AssertText.requires_value());
        assert!(ActionKind::AssertContains.requires_value());
        assert!(!ActionKind::Click.requires_value());
        assert!(!ActionKind::AssertVisible.requires_value());
    }

    #[test]
    fn test_normalized_drops_stray_value() {
        let action = Action::with_value(ActionKind::Click, "ignored", Locator::stable_tag("b"));
        let action = action.normalized().unwrap();
        assert!(action.value.is_none());
    }

    #[test]
    fn test_normalized_rejects_missing_value() {
        let action = Action::new(ActionKind::TypeText, Locator::stable_tag("field"));
        let err = action.normalized().unwrap_err();
        assert!(err.contains("TypeText requires a value"));
    }

    #[test]
    fn test_wire_format() {
        let action = Action::type_text("Hello World", Locator::stable_tag("textField"));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "TypeText");
        assert_eq!(json["value"], "Hello World");
        assert_eq!(json["locator"]["strategy"], "stableTag");

        let click: Action = serde_json::from_str(
            r#"{"kind":"Click","locator":{"strategy":"stableTag","value":"submitButton"}}"#,
        )
        .unwrap();
        assert_eq!(click, Action::click(Locator::stable_tag("submitButton")));
    }

    #[test]
    fn test_display() {
        let action = Action::assert_text("Welcome", Locator::text("Welcome"));
        assert_eq!(
            action.to_string(),
            "AssertText(\"Welcome\") on text=\"Welcome\""
        );
    }
}
