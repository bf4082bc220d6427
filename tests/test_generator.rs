//! Decklist generation against a scripted completion service.

mod common;

use commander_forge::generator::DeckGenerator;
use commander_forge::{Archetype, ArchetypeRules, ForgeError};

use common::ScriptedCompletion;

fn filler_names(n: usize) -> Vec<String> {
    common::names(&common::filler_cards(n))
}

#[test]
fn generate_without_service_is_a_configuration_error() {
    let err = DeckGenerator::new(None)
        .generate(Some(&common::krenko()), &ArchetypeRules::default())
        .unwrap_err();
    assert!(matches!(err, ForgeError::Configuration(_)));
    assert!(!err.is_retryable());
}

#[test]
fn generate_without_commander_is_a_generation_error() {
    let service = ScriptedCompletion::replying(&["[]"]);
    let err = DeckGenerator::new(Some(&service))
        .generate(None, &ArchetypeRules::default())
        .unwrap_err();
    assert!(matches!(err, ForgeError::Generation(_)));
    assert_eq!(service.calls(), 0);
}

#[test]
fn generate_returns_provisional_cards() {
    let service = ScriptedCompletion::replying(&[&common::deck_json(&filler_names(99))]);
    let cards = DeckGenerator::new(Some(&service))
        .generate(Some(&common::krenko()), &ArchetypeRules::default())
        .unwrap();
    assert_eq!(cards.len(), 99);
    assert!(cards.iter().all(|c| !c.is_resolved));
}

#[test]
fn known_violations_are_filtered_out() {
    let mut names = filler_names(60);
    names.push("Mana Crypt".to_string());
    names.push("Raugrin Triome".to_string());
    let service = ScriptedCompletion::replying(&[&common::deck_json(&names)]);

    let cards = DeckGenerator::new(Some(&service))
        .generate(Some(&common::krenko()), &ArchetypeRules::default())
        .unwrap();
    assert_eq!(cards.len(), 60);
    assert!(cards.iter().all(|c| c.name != "Mana Crypt" && c.name != "Raugrin Triome"));
}

#[test]
fn too_few_survivors_is_insufficient() {
    let mut names = filler_names(49);
    names.push("Jeweled Lotus".to_string());
    let service = ScriptedCompletion::replying(&[&common::deck_json(&names)]);

    let err = DeckGenerator::new(Some(&service))
        .generate(Some(&common::krenko()), &ArchetypeRules::default())
        .unwrap_err();
    match err {
        ForgeError::InsufficientCards { found, required } => {
            assert_eq!(found, 49);
            assert_eq!(required, 50);
        }
        other => panic!("expected insufficient cards, got {other:?}"),
    }
}

#[test]
fn garbage_response_is_a_retryable_parse_error() {
    let service = ScriptedCompletion::replying(&["I cannot help with that."]);
    let err = DeckGenerator::new(Some(&service))
        .generate(Some(&common::krenko()), &ArchetypeRules::default())
        .unwrap_err();
    assert!(matches!(err, ForgeError::Parse { .. }));
    assert!(err.is_retryable());
}

#[test]
fn service_failure_propagates() {
    let service = ScriptedCompletion::new(vec![Err("rate limited".to_string())]);
    let err = DeckGenerator::new(Some(&service))
        .generate(Some(&common::krenko()), &ArchetypeRules::default())
        .unwrap_err();
    assert!(err.to_string().contains("rate limited"));
}

#[test]
fn prompt_carries_commander_and_archetype() {
    let service = ScriptedCompletion::replying(&[&common::deck_json(&filler_names(99))]);
    let rules = ArchetypeRules::preset(Archetype::Tokens)
        .with_budget(150.0)
        .with_power_bracket(4, 2);
    DeckGenerator::new(Some(&service))
        .generate(Some(&common::krenko()), &rules)
        .unwrap();

    let prompt = &service.prompts()[0];
    assert!(prompt.contains("Krenko, Mob Boss"));
    assert!(prompt.contains("Color identity: R"));
    assert!(prompt.contains("Tokens"));
    assert!(prompt.contains("bracket 2-4"));
    assert!(prompt.contains("$150"));
    assert!(prompt.contains("Exactly 99 cards"));
}
