// draftline/src/prompt.rs

/// The planner's system prompt, with `{topic}` and `{mode}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate(String);

const DEFAULT_PLANNER_PROMPT: &str = "You are an expert analyst preparing a recommendation report on: {topic}.
The report is for the '{mode}' format; weigh every recommendation for that format.
Use the research in the conversation so far to choose the items worth a closer look.
Respond with a single JSON object and nothing else, shaped as:
{\"title\": string, \"items\": [{\"name\": string, \"rank\": number, \"reason\": string}]}
Order the items from strongest to weakest recommendation.";

impl PromptTemplate {
  pub fn new(template: impl Into<String>) -> Self {
    Self(template.into())
  }

  pub fn render(&self, topic: &str, mode: &str) -> String {
    fill_placeholders(&self.0, &[("topic", topic), ("mode", mode)])
  }
}

/// Replaces each `{key}` in `template` with its value in one left-to-right
/// pass. Substituted text is never scanned again, so a value containing
/// `{mode}` stays literal. Unknown placeholders and stray braces are kept.
pub fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
  let mut output = String::with_capacity(template.len());
  let mut rest = template;
  while let Some(open) = rest.find('{') {
    output.push_str(&rest[..open]);
    let tail = &rest[open + 1..];
    let matched = values
      .iter()
      .find(|(key, _)| tail.starts_with(*key) && tail[key.len()..].starts_with('}'));
    match matched {
      Some((key, value)) => {
        output.push_str(value);
        rest = &tail[key.len() + 1..];
      }
      None => {
        output.push('{');
        rest = tail;
      }
    }
  }
  output.push_str(rest);
  output
}

impl Default for PromptTemplate {
  fn default() -> Self {
    Self::new(DEFAULT_PLANNER_PROMPT)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn render_fills_both_placeholders() {
    let rendered = PromptTemplate::new("Plan {topic} for {mode}. Again: {topic}").render("Round 4 Wide Receivers", "PPR");
    assert_eq!(rendered, "Plan Round 4 Wide Receivers for PPR. Again: Round 4 Wide Receivers");
  }

  #[test]
  fn placeholders_inside_values_are_not_expanded() {
    let rendered = PromptTemplate::new("Plan {topic} for {mode}.").render("Picks for {mode} leagues", "PPR");
    assert_eq!(rendered, "Plan Picks for {mode} leagues for PPR.");
  }

  #[test]
  fn unknown_placeholders_and_stray_braces_are_kept() {
    let filled = fill_placeholders("{ {name} {other} }", &[("name", "x")]);
    assert_eq!(filled, "{ x {other} }");
  }

  #[test]
  fn default_prompt_keeps_json_braces() {
    let rendered = PromptTemplate::default().render("T", "M");
    assert!(rendered.contains("{\"title\": string"));
    assert!(!rendered.contains("{topic}"));
  }
}
