//! Action execution.
//!
//! Each action captures a fresh snapshot, resolves its locator, performs one
//! adapter primitive (or evaluates an assertion) and lets the UI settle.
//! Nothing is performed when the locator does not resolve to exactly one node.

use crate::action::{Action, ActionKind};
use crate::adapter::UiAdapter;
use crate::resolver::resolve;
use crate::result::{ExecutionError, UiError};
use crate::tree::{NodeId, SemanticTree};

/// Drives a [`UiAdapter`] through structured actions
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    settle: bool,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    /// Executor that waits for the UI to settle after every action
    #[must_use]
    pub const fn new() -> Self {
        Self { settle: true }
    }

    /// Skip the settle call after each action
    #[must_use]
    pub const fn without_settle(mut self) -> Self {
        self.settle = false;
        self
    }

    /// Execute one action against the live UI
    pub async fn execute<A>(&self, action: &Action, adapter: &mut A) -> Result<(), ExecutionError>
    where
        A: UiAdapter + ?Sized,
    {
        let failed = |cause: String| ExecutionError::ActionFailed {
            kind: action.kind,
            cause,
        };

        let snapshot = adapter
            .capture_snapshot()
            .await
            .map_err(|e| failed(format!("snapshot capture failed: {e}")))?;
        let node = resolve(&action.locator, &snapshot).map_err(|reason| {
            ExecutionError::LocatorFailed {
                locator: action.locator.to_string(),
                reason,
            }
        })?;

        tracing::debug!(%action, %node, "executing");
        let ui = |result: Result<(), UiError>| result.map_err(|e| failed(e.to_string()));
        match action.kind {
            ActionKind::Click => ui(adapter.tap(node).await),
            ActionKind::LongClick => ui(adapter.long_press(node).await),
            ActionKind::DoubleClick => ui(adapter.double_tap(node).await),
            ActionKind::TypeText => {
                let text = required_value(action)?;
                ui(type_text(adapter, node, text).await)
            }
            ActionKind::ClearText => ui(adapter.clear_text(node).await),
            ActionKind::ScrollTo => ui(adapter.scroll_to(node).await),
            ActionKind::AssertVisible
            | ActionKind::AssertText
            | ActionKind::AssertContains => check_assertion(action, &snapshot, node).map_err(failed),
        }?;

        if self.settle {
            adapter
                .settle()
                .await
                .map_err(|e| failed(format!("settle failed: {e}")))?;
        }
        Ok(())
    }

    /// Execute actions in order, stopping at the first failure
    pub async fn execute_all<A>(
        &self,
        actions: &[Action],
        adapter: &mut A,
    ) -> Result<usize, (usize, ExecutionError)>
    where
        A: UiAdapter + ?Sized,
    {
        for (index, action) in actions.iter().enumerate() {
            self.execute(action, adapter)
                .await
                .map_err(|e| (index, e))?;
        }
        Ok(actions.len())
    }
}

fn required_value(action: &Action) -> Result<&str, ExecutionError> {
    action
        .value
        .as_deref()
        .ok_or_else(|| ExecutionError::ActionFailed {
            kind: action.kind,
            cause: "missing value".to_string(),
        })
}

async fn type_text<A>(adapter: &mut A, node: NodeId, text: &str) -> Result<(), UiError>
where
    A: UiAdapter + ?Sized,
{
    match adapter.replace_text(node, text).await {
        Err(UiError::Unsupported { operation }) => {
            tracing::debug!(%node, operation, "replace unsupported, inserting instead");
            adapter.insert_text(node, text).await
        }
        other => other,
    }
}

fn check_assertion(action: &Action, snapshot: &SemanticTree, node: NodeId) -> Result<(), String> {
    let target = snapshot
        .get(node)
        .ok_or_else(|| format!("node {node} vanished from the snapshot"))?;
    let actual = target.text.as_deref();
    match action.kind {
        ActionKind::AssertVisible => match target.bounds {
            Some(bounds) if !bounds.has_area() => {
                Err(format!("{} has empty bounds", action.locator))
            }
            _ => Ok(()),
        },
        ActionKind::AssertText => {
            let expected = action.value.as_deref().unwrap_or_default();
            if actual == Some(expected) {
                Ok(())
            } else {
                Err(format!("expected text {expected:?}, found {actual:?}"))
            }
        }
        ActionKind::AssertContains => {
            let expected = action.value.as_deref().unwrap_or_default();
            if actual.is_some_and(|text| text.contains(expected)) {
                Ok(())
            } else {
                Err(format!("expected text containing {expected:?}, found {actual:?}"))
            }
        }
        other => Err(format!("{other} is not an assertion")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::locator::{Locator, LocatorStrategy};
    use crate::memory_ui::MemoryUi;
    use crate::result::ResolutionError;
    use crate::tree::{Bounds, NodeSpec};

    fn screen() -> MemoryUi {
        MemoryUi::new(
            NodeSpec::new("Column")
                .child(NodeSpec::new("TextField").tag("name").editable())
                .child(NodeSpec::new("TextField").tag("notes"))
                .child(NodeSpec::new("Button").tag("save").text("Save"))
                .child(NodeSpec::new("Text").text("Status: idle"))
                .child(NodeSpec::new("Text").text("Delete"))
                .child(NodeSpec::new("Text").text("Delete"))
                .child(
                    NodeSpec::new("Box")
                        .tag("hidden")
                        .bounds(Bounds::new(10.0, 10.0, 10.0, 40.0)),
                )
                .build(),
        )
    }

    mod dispatch_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_taps_and_settles() {
            let mut ui = screen();
            Executor::new()
                .execute(&Action::click(Locator::stable_tag("save")), &mut ui)
                .await
                .unwrap();
            assert_eq!(ui.operations(), ["tap save", "settle"]);
        }

        #[tokio::test]
        async fn test_without_settle() {
            let mut ui = screen();
            Executor::new()
                .without_settle()
                .execute(&Action::click(Locator::stable_tag("save")), &mut ui)
                .await
                .unwrap();
            assert_eq!(ui.operations(), ["tap save"]);
        }

        #[tokio::test]
        async fn test_type_text_replaces() {
            let mut ui = screen();
            Executor::new()
                .execute(
                    &Action::type_text("Ada", Locator::stable_tag("name")),
                    &mut ui,
                )
                .await
                .unwrap();
            assert_eq!(ui.operations()[0], "replace_text name \"Ada\"");
            assert_eq!(ui.text_of("name").as_deref(), Some("Ada"));
        }

        #[tokio::test]
        async fn test_type_text_falls_back_to_insert() {
            let mut ui = screen();
            Executor::new()
                .execute(
                    &Action::type_text("later", Locator::stable_tag("notes")),
                    &mut ui,
                )
                .await
                .unwrap();
            assert_eq!(
                ui.operations(),
                ["replace_text notes \"later\"", "insert_text notes \"later\"", "settle"]
            );
            assert_eq!(ui.text_of("notes").as_deref(), Some("later"));
        }

        #[tokio::test]
        async fn test_ambiguous_locator_performs_nothing() {
            let mut ui = screen();
            let err = Executor::new()
                .execute(&Action::click(Locator::text("Delete")), &mut ui)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExecutionError::LocatorFailed {
                    reason: ResolutionError::Ambiguous { count: 2, .. },
                    ..
                }
            ));
            assert!(ui.operations().is_empty());
        }

        #[tokio::test]
        async fn test_bad_path_is_locator_failure() {
            let mut ui = screen();
            let locator = Locator::new(LocatorStrategy::HierarchyPath, "Root>Button[9]");
            let err = Executor::new()
                .execute(&Action::click(locator), &mut ui)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExecutionError::LocatorFailed {
                    reason: ResolutionError::InvalidPath { .. },
                    ..
                }
            ));
        }
    }

    mod assertion_tests {
        use super::*;

        #[tokio::test]
        async fn test_assert_text_exact() {
            let mut ui = screen();
            let executor = Executor::new();
            executor
                .execute(
                    &Action::assert_text("Save", Locator::stable_tag("save")),
                    &mut ui,
                )
                .await
                .unwrap();
            let err = executor
                .execute(
                    &Action::assert_text("save", Locator::stable_tag("save")),
                    &mut ui,
                )
                .await
                .unwrap_err();
            assert!(err.to_string().contains("expected text \"save\""));
        }

        #[tokio::test]
        async fn test_assert_contains() {
            let mut ui = screen();
            Executor::new()
                .execute(
                    &Action::assert_contains("idle", Locator::text("Status: idle")),
                    &mut ui,
                )
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_assert_visible_rejects_zero_area() {
            let mut ui = screen();
            let err = Executor::new()
                .execute(&Action::assert_visible(Locator::stable_tag("hidden")), &mut ui)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExecutionError::ActionFailed {
                    kind: ActionKind::AssertVisible,
                    ..
                }
            ));
        }

        #[tokio::test]
        async fn test_assert_visible_without_bounds_passes() {
            let mut ui = screen();
            Executor::new()
                .execute(&Action::assert_visible(Locator::stable_tag("save")), &mut ui)
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_assertions_only_settle() {
            let mut ui = screen();
            Executor::new()
                .execute(&Action::assert_visible(Locator::stable_tag("save")), &mut ui)
                .await
                .unwrap();
            assert_eq!(ui.operations(), ["settle"]);
        }
    }

    mod gesture_tests {
        use super::*;

        async fn run(action: Action) -> MemoryUi {
            let mut ui = screen();
            Executor::new().execute(&action, &mut ui).await.unwrap();
            ui
        }

        #[tokio::test]
        async fn test_long_click() {
            let ui = run(Action::new(ActionKind::LongClick, Locator::stable_tag("save"))).await;
            assert_eq!(ui.operations(), ["long_press save", "settle"]);
        }

        #[tokio::test]
        async fn test_double_click() {
            let ui = run(Action::new(ActionKind::DoubleClick, Locator::stable_tag("save"))).await;
            assert_eq!(ui.operations(), ["double_tap save", "settle"]);
        }

        #[tokio::test]
        async fn test_clear_text() {
            let mut ui = screen();
            let executor = Executor::new().without_settle();
            executor
                .execute(&Action::type_text("Ada", Locator::stable_tag("name")), &mut ui)
                .await
                .unwrap();
            executor
                .execute(&Action::new(ActionKind::ClearText, Locator::stable_tag("name")), &mut ui)
                .await
                .unwrap();
            assert_eq!(ui.operations().last().map(String::as_str), Some("clear_text name"));
            assert_eq!(ui.text_of("name"), None);
        }

        #[tokio::test]
        async fn test_scroll_to() {
            let ui = run(Action::new(ActionKind::ScrollTo, Locator::text("Status: idle"))).await;
            assert_eq!(ui.operations(), ["scroll_to Status: idle", "settle"]);
        }
    }

    mod adapter_failure_tests {
        use super::*;
        use async_trait::async_trait;

        /// Wraps [`MemoryUi`], rejecting taps or settles on demand
        struct Flaky {
            inner: MemoryUi,
            reject_tap: bool,
            reject_settle: bool,
            settles: usize,
        }

        impl Flaky {
            fn new(reject_tap: bool, reject_settle: bool) -> Self {
                Self {
                    inner: screen(),
                    reject_tap,
                    reject_settle,
                    settles: 0,
                }
            }
        }

        #[async_trait]
        impl UiAdapter for Flaky {
            async fn capture_snapshot(&mut self) -> Result<SemanticTree, UiError> {
                self.inner.capture_snapshot().await
            }

            async fn tap(&mut self, node: NodeId) -> Result<(), UiError> {
                if self.reject_tap {
                    return Err(UiError::Failed {
                        message: "gesture rejected".to_string(),
                    });
                }
                self.inner.tap(node).await
            }

            async fn long_press(&mut self, node: NodeId) -> Result<(), UiError> {
                self.inner.long_press(node).await
            }

            async fn double_tap(&mut self, node: NodeId) -> Result<(), UiError> {
                self.inner.double_tap(node).await
            }

            async fn replace_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError> {
                self.inner.replace_text(node, text).await
            }

            async fn insert_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError> {
                self.inner.insert_text(node, text).await
            }

            async fn clear_text(&mut self, node: NodeId) -> Result<(), UiError> {
                self.inner.clear_text(node).await
            }

            async fn scroll_to(&mut self, node: NodeId) -> Result<(), UiError> {
                self.inner.scroll_to(node).await
            }

            async fn settle(&mut self) -> Result<(), UiError> {
                self.settles += 1;
                if self.reject_settle {
                    return Err(UiError::Failed {
                        message: "still animating".to_string(),
                    });
                }
                Ok(())
            }
        }

        #[tokio::test]
        async fn test_tap_failure_wrapped_without_settle() {
            let mut ui = Flaky::new(true, false);
            let err = Executor::new()
                .execute(&Action::click(Locator::stable_tag("save")), &mut ui)
                .await
                .unwrap_err();
            match err {
                ExecutionError::ActionFailed { kind, cause } => {
                    assert_eq!(kind, ActionKind::Click);
                    assert!(cause.contains("gesture rejected"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(ui.settles, 0);
        }

        #[tokio::test]
        async fn test_settle_failure_wrapped() {
            let mut ui = Flaky::new(false, true);
            let err = Executor::new()
                .execute(&Action::click(Locator::stable_tag("save")), &mut ui)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExecutionError::ActionFailed {
                    kind: ActionKind::Click,
                    ..
                }
            ));
            assert!(err.to_string().contains("settle failed"));
            assert_eq!(ui.inner.operations(), ["tap save"]);
        }

        #[tokio::test]
        async fn test_clear_on_read_only_field_fails() {
            let mut ui = screen();
            let err = Executor::new()
                .execute(&Action::new(ActionKind::ClearText, Locator::stable_tag("notes")), &mut ui)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExecutionError::ActionFailed {
                    kind: ActionKind::ClearText,
                    ..
                }
            ));
            assert!(!ui.operations().iter().any(|op| op == "settle"));
        }
    }

    #[tokio::test]
    async fn test_execute_all_reports_failing_index() {
        let mut ui = screen();
        let actions = vec![
            Action::click(Locator::stable_tag("save")),
            Action::click(Locator::stable_tag("missing")),
            Action::click(Locator::stable_tag("save")),
        ];
        let (index, err) = Executor::new()
            .execute_all(&actions, &mut ui)
            .await
            .unwrap_err();
        assert_eq!(index, 1);
        assert!(matches!(err, ExecutionError::LocatorFailed { .. }));
        assert_eq!(ui.operations(), ["tap save", "settle"]);
    }
}
