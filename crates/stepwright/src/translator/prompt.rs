//! Prompt contract between the translator and the language model.

use crate::tree::SemanticTree;

/// Fixed system instruction: the locator-stability policy and response schema.
pub const SYSTEM_INSTRUCTION: &str = r#"You translate one natural-language UI test step into structured UI actions.

You receive the step and the current semantic tree of the screen. Each tree line is
`ClassName[siblingIndex] tag="..." text="..." desc="..."` with children indented below
their parent. The first line is the root.

Respond with exactly one JSON object and nothing else:
  {"status": "OK", "actions": [ACTION, ...]}
or, when the step cannot be mapped:
  {"status": "Error", "message": "...", "errorKind": "ambiguous" | "noMatch"}

ACTION = {"kind": KIND, "value": "...", "locator": {"strategy": STRATEGY, "value": "...", "rationale": "..."}}
KIND = Click | LongClick | DoubleClick | TypeText | ClearText | ScrollTo | AssertVisible | AssertText | AssertContains
STRATEGY = stableTag | accessibilityDescription | hierarchyPath | text

Locator stability policy:
1. Choose the highest-priority strategy that is present on the target node and matches
   exactly one node in the tree: stableTag, then accessibilityDescription, then
   hierarchyPath, then text.
2. Quoted text in the step ('...' or "...") is literal content. Strip the quote
   characters and use the content as the action value or as a text locator value.
   Quoting never forces the text strategy; the priority in rule 1 still decides.
3. hierarchyPath values start with Root and give every later level a sibling index,
   e.g. Root>Column[0]>Row[2]>Button[1]. Indices count all children of the parent.
4. Put the reason for the chosen strategy in "rationale".

Action rules:
- "value" is required for TypeText, AssertText and AssertContains and omitted otherwise.
- If the step names literal text to verify, emit AssertText with that exact text. You may
  also emit AssertVisible for the same locator.
- If the step only asks for presence, emit AssertVisible alone.
- If the step asks for partial or "contains" matching, emit AssertContains.
- A step may need several actions ("type X and submit" is TypeText then Click). List
  them in execution order.
- If several nodes fit the step equally well, return errorKind "ambiguous". If none
  fits, return errorKind "noMatch"."#;

/// Build the user prompt for one step
#[must_use]
pub fn build_user_prompt(step: &str, snapshot: &SemanticTree) -> String {
    format!(
        "Step: {step}\n\nSemantic tree:\n{tree}",
        step = step.trim(),
        tree = snapshot.render()
    )
}
