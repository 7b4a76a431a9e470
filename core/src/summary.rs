// draftline/src/summary.rs

use crate::model::Plan;

/// Assembles the final report from a fully merged plan.
///
/// A `# {title}` heading, then each item's content in plan order, every
/// block followed by a blank line. Pure and deterministic.
pub fn assemble_report(plan: &Plan) -> String {
  let body_len: usize = plan.items.iter().map(|item| item.content.len() + 2).sum();
  let mut output = String::with_capacity(plan.title.len() + 4 + body_len);

  output.push_str("# ");
  output.push_str(&plan.title);
  output.push_str("\n\n");
  for item in &plan.items {
    output.push_str(&item.content);
    output.push_str("\n\n");
  }
  output
}
