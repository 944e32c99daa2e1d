//! Report assembler
//!
//! Appends a fixed-format plain-text summary of the raw inputs and
//! answers to the generated plan. The block is deterministic and
//! independent of the provider's output, so the final artifact is
//! self-describing even if the generated narrative omits details.

use crate::session::{Round, Session};

/// Combine the provider's plan text with the appended session summary
pub fn assemble(plan_text: &str, session: &Session) -> String {
    let mut out = String::with_capacity(plan_text.len() + 1024);

    out.push_str(plan_text.trim_end());
    out.push_str("\n\n");
    out.push_str("----------------------------------------\n");
    out.push_str("IDEA BUILDER SESSION SUMMARY\n\n");

    out.push_str("Original idea:\n");
    out.push_str(&session.idea);
    out.push('\n');

    for (round, title) in [
        (Round::One, "Round 1 (foundations)"),
        (Round::Two, "Round 2 (execution)"),
        (Round::Three, "Round 3 (priorities)"),
    ] {
        out.push('\n');
        out.push_str(title);
        out.push_str(":\n");

        let state = session.round(round);
        let mut any = false;
        for (index, record) in state.answered_pairs() {
            any = true;
            out.push_str(&format!("  Q{}. {}\n", index + 1, record.question));
            out.push_str(&format!(
                "      Answer: {} ({}/5)\n",
                record.label, record.scale
            ));
        }
        if !any {
            out.push_str("  (no answers recorded)\n");
        }
    }

    out
}
