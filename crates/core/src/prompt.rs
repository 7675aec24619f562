//! Prompt construction for a single turn.

use std::collections::BTreeMap;

/// Rendered in place of the context block when nothing was collected.
pub const EMPTY_CONTEXT_SENTINEL: &str = "No structured context was collected.";

const CLOSING_INSTRUCTION: &str = "Return only the spoken reply.";

/// Render context entries as `- key: value` lines sorted by key.
pub fn build_context_block<'a, I>(context: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let sorted: BTreeMap<&String, &String> = context.into_iter().collect();
    if sorted.is_empty() {
        return EMPTY_CONTEXT_SENTINEL.to_string();
    }
    sorted
        .iter()
        .map(|(key, value)| format!("- {}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user message that accompanies the screenshot.
///
/// A blank note is treated as no note.
pub fn build_user_prompt<'a, I>(context: I, user_note: Option<&str>) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let context_block = build_context_block(context);
    let note = user_note.map(str::trim).filter(|note| !note.is_empty());

    match note {
        Some(note) => format!(
            "You are talking with the user in real time as their desk buddy.\n\
             Primary objective: answer the user's note directly.\n\n\
             Behavior rules:\n\
             - Answer the note first.\n\
             - Lean on the screenshot and context only when they improve the answer.\n\
             - When the note asks for help, give clear practical steps.\n\
             - When the note is casual, keep a relaxed, friendly tone.\n\
             - No unsolicited productivity coaching.\n\
             - For recommendations, give one top pick plus 2 to 4 alternatives.\n\
             - Keep it short (1 to 4 sentences) unless asked for more.\n\n\
             User note:\n{note}\n\n\
             Structured context:\n{context_block}\n\n\
             {closing}",
            closing = CLOSING_INSTRUCTION,
        ),
        None => format!(
            "The user did not make an explicit request.\n\
             Use the screenshot and structured context for a short, buddy-style check-in.\n\n\
             Behavior rules:\n\
             - Sound like a person, not a status report.\n\
             - Mention one relevant observation.\n\
             - Optionally suggest one useful next step.\n\
             - Do not judge how the user spends their time.\n\
             - Keep it to 1 or 2 sentences.\n\n\
             Structured context:\n{context_block}\n\n\
             {closing}",
            closing = CLOSING_INSTRUCTION,
        ),
    }
}
