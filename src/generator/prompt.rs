use std::fmt::Write;

use crate::config::DECK_SIZE;
use crate::models::{format_identity, ArchetypeRules, Card};

pub const SYSTEM_PROMPT: &str = "You are an expert Magic: The Gathering Commander deck builder. \
You only recommend cards that are legal in Commander, respect the singleton rule and stay \
inside the commander's color identity. You answer with JSON only, no commentary.";

/// Build the user prompt for a full decklist.
pub fn deck_prompt(commander: &Card, rules: &ArchetypeRules) -> String {
    let mut p = String::new();

    let _ = writeln!(p, "Build a Commander deck for this commander:");
    let _ = writeln!(p, "- Name: {}", commander.name);
    let _ = writeln!(p, "- Color identity: {}", format_identity(&commander.color_identity));
    let _ = writeln!(p, "- Type: {}", commander.type_line);
    if let Some(text) = commander.oracle_text.as_deref() {
        let _ = writeln!(p, "- Text: {}", text.replace('\n', " "));
    }
    let _ = writeln!(p);

    let _ = writeln!(
        p,
        "Archetype: {}. Target power bracket {}-{} (1 = casual, 5 = competitive).",
        rules.archetype.label(),
        rules.power_bracket.0,
        rules.power_bracket.1
    );
    if let Some(budget) = rules.max_budget {
        let _ = writeln!(p, "Keep the total deck cost under ${:.0} USD.", budget);
    }
    let _ = writeln!(p);

    let _ = writeln!(p, "Card counts by category:");
    for (category, range) in rules.targets.entries() {
        let _ = writeln!(p, "- {}: {}", category.label(), range);
    }
    let _ = writeln!(
        p,
        "Fill any remaining slots with Utility or Finisher cards that support the plan."
    );
    let _ = writeln!(p);

    let _ = writeln!(p, "Rules:");
    let _ = writeln!(
        p,
        "- Exactly {} cards, not counting the commander. Do not include the commander.",
        DECK_SIZE
    );
    let _ = writeln!(p, "- One copy of each card except basic lands.");
    let _ = writeln!(
        p,
        "- Every card's color identity must be within {}.",
        format_identity(&commander.color_identity)
    );
    let _ = writeln!(p, "- No cards on the Commander ban list.");
    let _ = writeln!(p, "- Use exact English card names.");
    let _ = writeln!(p);

    let _ = writeln!(
        p,
        "Respond with a JSON array only, one object per card: \
         [{{\"name\": \"Card Name\", \"category\": \"Ramp\"}}]. \
         Categories: Lands, Ramp, Card Draw, Removal, Board Wipes, Protection, Strategy, Utility, Finisher."
    );

    p
}
