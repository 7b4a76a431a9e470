// demos/draft_agent/src/prompts.rs

pub const PLANNER_PROMPT: &str = "You are a fantasy football draft expert preparing a draft recommendation on: {topic}.
The league scoring format is {mode}; weigh every pick for that format.
Use the player research in the conversation so far to choose the players worth drafting.
Respond with a single JSON object and nothing else, shaped as:
{\"title\": string, \"items\": [{\"name\": string, \"rank\": number, \"team\": string, \"reason\": string}]}
Order the players from strongest to weakest recommendation. Recommend between three and six players.";

pub const RESEARCH_QUERIES_PROMPT: &str = "You are researching the fantasy football topic: {topic}.
Write exactly {count} short research questions about trending players, recent stats, injuries, and roles that would help with this topic.
Put each question on its own line with no numbering and no other text.";

pub const RESEARCH_ANSWER_PROMPT: &str = "You are a fantasy football researcher working on: {topic}.
Answer the question below with concrete, recent facts. Keep it under 150 words.";

pub const ANALYST_PROMPT: &str = "You are a fantasy football analyst writing one section of a draft report on: {topic}.
The section covers {name}. Planner notes for this player: {notes}
Using the research in the conversation, write a markdown section that starts with a '## {name}' heading,
then covers role, recent production, risks, and a one-line draft verdict. Keep it under 250 words.";

/// Replaces each `{key}` in `template` with its value, in a single pass.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
  draftline::fill_placeholders(template, values)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_replaces_every_occurrence() {
    let out = fill(ANALYST_PROMPT, &[("topic", "Round 4 WRs"), ("name", "Receiver A"), ("notes", "{}")]);
    assert!(out.contains("'## Receiver A' heading"));
    assert!(out.contains("covers Receiver A."));
    assert!(!out.contains("{name}"));
  }

  #[test]
  fn player_names_with_braces_are_left_alone() {
    let out = fill(ANALYST_PROMPT, &[("topic", "Sleepers"), ("name", "{topic} Jr."), ("notes", "{}")]);
    assert!(out.contains("covers {topic} Jr."));
    assert!(out.contains("draft report on: Sleepers."));
  }

  #[test]
  fn planner_prompt_asks_for_json() {
    let rendered = draftline::PromptTemplate::new(PLANNER_PROMPT).render("Round 4 Wide Receivers", "PPR");
    assert!(rendered.contains("scoring format is PPR"));
    assert!(rendered.contains("\"items\""));
  }
}
