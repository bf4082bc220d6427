//! End-to-end builds over fake card data and a scripted model.

mod common;

use commander_forge::pipeline::{pad_with_basics, CancellationFlag, Pipeline};
use commander_forge::models::{Category, Legalities, Legality};
use commander_forge::{ArchetypeRules, BuildNotice, Card, DeckForge, ForgeError};
use std::collections::HashSet;
use std::time::Duration;

use common::{FakeCardSource, ScriptedCompletion};

const NO_VIOLATIONS: &str = r#"{"violations": []}"#;

fn source_with(cards: &[Card]) -> FakeCardSource {
    let mut source = FakeCardSource::with_cards(cards.to_vec());
    source.add(common::krenko());
    source.add(common::atraxa());
    source
}

fn run(
    source: &FakeCardSource,
    service: &ScriptedCompletion,
    commander: Option<Card>,
    rules: &ArchetypeRules,
) -> commander_forge::Result<commander_forge::BuiltDeck> {
    let cancel = CancellationFlag::new();
    Pipeline::new(Some(service), source, &cancel)
        .with_lookup_delay(Duration::ZERO)
        .run(commander, rules)
}

fn count_named(cards: &[Card], name: &str) -> usize {
    cards.iter().filter(|c| c.name == name).count()
}

fn rock(name: &str, colors: &[&str], text: &str) -> Card {
    let mut c = common::card(name, colors, "Artifact");
    c.oracle_text = Some(text.to_string());
    c
}

/// Cards a Ramp backfill search can reach. Only Mind Stone and Fire Diamond
/// are playable under Krenko.
fn ramp_pool() -> Vec<Card> {
    let mut birds = common::card("Birds of Paradise", &["G"], "Creature — Bird");
    birds.oracle_text = Some("{T}: Add one mana of any color.".to_string());
    let mut relic = rock("Forbidden Relic", &[], "{T}: Add {C}{C}{C}.");
    relic.legalities = Legalities::commander(Legality::Banned);
    vec![
        rock("Mind Stone", &[], "{T}: Add {C}."),
        rock("Fire Diamond", &["R"], "{T}: Add {R}."),
        birds,
        relic,
    ]
}

/// `utility` tagged Utility followed by `ramp` tagged Ramp.
fn deck_json_with_ramp(utility: &[String], ramp: &[String]) -> String {
    let entries: Vec<serde_json::Value> = utility
        .iter()
        .map(|n| serde_json::json!({ "name": n, "category": "Utility" }))
        .chain(
            ramp.iter()
                .map(|n| serde_json::json!({ "name": n, "category": "Ramp" })),
        )
        .collect();
    serde_json::to_string(&entries).unwrap()
}

fn imaginary_rocks(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Imaginary Rock {}", i)).collect()
}

#[test]
fn clean_build_returns_99_resolved_cards() {
    let filler = common::filler_cards(99);
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), NO_VIOLATIONS.to_string()]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert_eq!(deck.cards.len(), 99);
    assert!(deck.cards.iter().all(|c| c.is_resolved));
    assert_eq!(deck.commander.name, "Krenko, Mob Boss");
    assert!(deck.notices.is_empty(), "{:?}", deck.notices);
    assert_eq!(service.calls(), 2);
    assert!(deck.build_log.iter().any(|l| l.starts_with("[generating]")));
    assert!(deck.build_log.last().unwrap().starts_with("[complete]"));
}

#[test]
fn duplicate_is_replaced_with_a_fresh_card() {
    let filler = common::filler_cards(99);
    let source = source_with(&filler);
    let mut names = common::names(&filler[..98]);
    names.push("Filler Artifact 1".to_string());
    let replacement = r#"{"replacements": [{"originalCard": "Filler Artifact 1",
        "suggestedCards": [{"name": "Filler Artifact 2", "category": "Utility"},
                           {"name": "Filler Artifact 99", "category": "Utility"}]}]}"#;
    let service = ScriptedCompletion::replying(&[common::deck_json(&names), replacement.to_string()]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    // The singleton violation is critical, so the model scan is skipped.
    assert_eq!(service.calls(), 2);
    assert_eq!(deck.cards.len(), 99);
    assert_eq!(count_named(&deck.cards, "Filler Artifact 1"), 1);
    assert_eq!(count_named(&deck.cards, "Filler Artifact 2"), 1);
    assert_eq!(count_named(&deck.cards, "Filler Artifact 99"), 1);
    assert!(deck
        .build_log
        .iter()
        .any(|l| l.contains("Filler Artifact 1 -> Filler Artifact 99")));
    let keys: HashSet<String> = deck.cards.iter().map(Card::key).collect();
    assert_eq!(keys.len(), 99);
}

#[test]
fn short_deck_is_padded_with_basics() {
    let filler = common::filler_cards(60);
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), NO_VIOLATIONS.to_string()]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert_eq!(deck.cards.len(), 99);
    assert_eq!(count_named(&deck.cards, "Mountain"), 39);
    assert!(deck.notices.contains(&BuildNotice::Padded { count: 39 }));
}

#[test]
fn colorless_commander_pads_with_wastes() {
    let filler = common::filler_cards(70);
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), NO_VIOLATIONS.to_string()]);
    let karn = common::commander("Karn, Silver Golem", &[]);

    let deck = run(&source, &service, Some(karn), &ArchetypeRules::default()).unwrap();
    assert_eq!(count_named(&deck.cards, "Wastes"), 29);
}

#[test]
fn unknown_cards_become_lookup_gaps() {
    let filler = common::filler_cards(95);
    let source = source_with(&filler);
    let mut names = common::names(&filler);
    names.extend((1..=4).map(|i| format!("Imaginary Card {}", i)));
    let service = ScriptedCompletion::replying(&[common::deck_json(&names), NO_VIOLATIONS.to_string()]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    let gaps: Vec<&str> = deck
        .notices
        .iter()
        .filter_map(|n| match n {
            BuildNotice::LookupGap { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(gaps.len(), 4);
    assert!(gaps.contains(&"Imaginary Card 3"));
    assert!(deck.notices.contains(&BuildNotice::Padded { count: 4 }));
    assert_eq!(deck.cards.len(), 99);
    // Utility slots have no search phrase.
    assert_eq!(source.search_calls(), 0);
}

#[test]
fn lost_ramp_slots_are_backfilled_before_basics() {
    let filler = common::filler_cards(95);
    let source = source_with(&[filler.clone(), ramp_pool()].concat());
    let service = ScriptedCompletion::replying(&[
        deck_json_with_ramp(&common::names(&filler), &imaginary_rocks(4)),
        NO_VIOLATIONS.to_string(),
    ]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert_eq!(deck.cards.len(), 99);
    for name in ["Mind Stone", "Fire Diamond"] {
        let card = deck.cards.iter().find(|c| c.name == name).unwrap();
        assert_eq!(card.category, Some(Category::Ramp));
        assert!(card.is_resolved);
    }
    assert_eq!(count_named(&deck.cards, "Birds of Paradise"), 0);
    assert_eq!(count_named(&deck.cards, "Forbidden Relic"), 0);
    assert_eq!(count_named(&deck.cards, "Mountain"), 2);
    assert!(deck.notices.contains(&BuildNotice::Padded { count: 2 }));
    assert!(deck
        .build_log
        .iter()
        .any(|l| l.contains("Backfilled Fire Diamond into a lost Ramp slot")));
    // One search serves every slot of the same category.
    assert_eq!(source.search_calls(), 1);
}

#[test]
fn backfill_skips_cards_already_in_the_deck() {
    let mut kept = common::filler_cards(97);
    kept.push(rock("Mind Stone", &[], "{T}: Add {C}."));
    let source = source_with(&[kept.clone(), ramp_pool()].concat());
    let service = ScriptedCompletion::replying(&[
        deck_json_with_ramp(&common::names(&kept), &imaginary_rocks(1)),
        NO_VIOLATIONS.to_string(),
    ]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert_eq!(count_named(&deck.cards, "Mind Stone"), 1);
    assert_eq!(count_named(&deck.cards, "Fire Diamond"), 1);
    assert_eq!(count_named(&deck.cards, "Mountain"), 0);
    assert!(!deck
        .notices
        .iter()
        .any(|n| matches!(n, BuildNotice::Padded { .. })));
}

#[test]
fn failed_backfill_search_falls_back_to_basics() {
    let filler = common::filler_cards(95);
    let mut source = source_with(&[filler.clone(), ramp_pool()].concat());
    source.fail_search = true;
    let service = ScriptedCompletion::replying(&[
        deck_json_with_ramp(&common::names(&filler), &imaginary_rocks(4)),
        NO_VIOLATIONS.to_string(),
    ]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert_eq!(deck.cards.len(), 99);
    assert_eq!(count_named(&deck.cards, "Mountain"), 4);
    assert!(deck.notices.contains(&BuildNotice::Padded { count: 4 }));
}

#[test]
fn off_color_card_found_at_resolution_is_dropped() {
    let mut filler = common::filler_cards(99);
    filler[4] = common::card("Filler Artifact 5", &["U"], "Artifact");
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), NO_VIOLATIONS.to_string()]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert_eq!(count_named(&deck.cards, "Filler Artifact 5"), 0);
    assert!(deck
        .notices
        .iter()
        .any(|n| matches!(n, BuildNotice::DroppedCard { name, .. } if name == "Filler Artifact 5")));
    assert_eq!(count_named(&deck.cards, "Mountain"), 1);
}

#[test]
fn failed_scan_is_recorded_as_a_notice() {
    let filler = common::filler_cards(99);
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), "no idea".to_string()]);

    let deck = run(&source, &service, Some(common::krenko()), &ArchetypeRules::default()).unwrap();
    assert!(deck
        .notices
        .iter()
        .any(|n| matches!(n, BuildNotice::ValidationFallback { .. })));
    assert!(deck.build_log.iter().any(|l| l.starts_with("warning:")));
    assert_eq!(deck.cards.len(), 99);
}

#[test]
fn over_budget_deck_gets_a_notice() {
    let filler: Vec<Card> = common::filler_cards(99)
        .into_iter()
        .map(|mut c| {
            c.price_usd = Some(5.0);
            c
        })
        .collect();
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), NO_VIOLATIONS.to_string()]);
    let rules = ArchetypeRules::default().with_budget(100.0);

    let deck = run(&source, &service, Some(common::krenko()), &rules).unwrap();
    assert!(deck.notices.contains(&BuildNotice::OverBudget {
        total: 495.0,
        budget: 100.0
    }));
}

// ---------------------------------------------------------------------------
// Aborted builds
// ---------------------------------------------------------------------------

#[test]
fn missing_commander_aborts() {
    let source = source_with(&[]);
    let service = ScriptedCompletion::default();
    let err = run(&source, &service, None, &ArchetypeRules::default()).unwrap_err();
    assert!(matches!(err, ForgeError::Generation(_)));
    assert_eq!(service.calls(), 0);
}

#[test]
fn unknown_commander_aborts() {
    let source = source_with(&[]);
    let service = ScriptedCompletion::default();
    let err = run(
        &source,
        &service,
        Some(Card::provisional("Nobody In Particular", None)),
        &ArchetypeRules::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Nobody In Particular"));
}

#[test]
fn provisional_commander_is_resolved_first() {
    let filler = common::filler_cards(99);
    let source = source_with(&filler);
    let service = ScriptedCompletion::replying(&[common::deck_json(&common::names(&filler)), NO_VIOLATIONS.to_string()]);

    let deck = run(
        &source,
        &service,
        Some(Card::provisional("krenko, mob boss", None)),
        &ArchetypeRules::default(),
    )
    .unwrap();
    assert!(deck.commander.is_resolved);
    assert_eq!(deck.commander.name, "Krenko, Mob Boss");
}

#[test]
fn ineligible_commander_aborts() {
    let source = source_with(&[]);
    let service = ScriptedCompletion::default();
    let sol_ring = common::card("Sol Ring", &[], "Artifact");
    let err = run(&source, &service, Some(sol_ring), &ArchetypeRules::default()).unwrap_err();
    assert!(matches!(err, ForgeError::Generation(_)));
    assert_eq!(service.calls(), 0);
}

#[test]
fn cancelled_flag_stops_before_generation() {
    let source = source_with(&[]);
    let service = ScriptedCompletion::default();
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let err = Pipeline::new(Some(&service), &source, &cancel)
        .run(Some(common::krenko()), &ArchetypeRules::default())
        .unwrap_err();
    assert!(matches!(err, ForgeError::Cancelled(ref stage) if stage == "generating"));
    assert_eq!(service.calls(), 0);
}

#[test]
fn cancellation_flag_clones_share_state() {
    let flag = CancellationFlag::new();
    let other = flag.clone();
    other.cancel();
    assert!(flag.is_cancelled());
    flag.reset();
    assert!(!other.is_cancelled());
}

// ---------------------------------------------------------------------------
// DeckForge facade
// ---------------------------------------------------------------------------

#[test]
fn forge_without_model_cannot_build() {
    let forge = DeckForge::builder()
        .card_source(source_with(&[]))
        .lookup_delay(Duration::ZERO)
        .build()
        .unwrap();
    assert!(!forge.has_completion());
    let err = forge
        .build(Some(common::krenko()), &ArchetypeRules::default())
        .unwrap_err();
    assert!(matches!(err, ForgeError::Configuration(_)));
}

#[test]
fn forge_runs_a_full_build() {
    let filler = common::filler_cards(99);
    let forge = DeckForge::builder()
        .card_source(source_with(&filler))
        .completion_service(ScriptedCompletion::replying(&[
            common::deck_json(&common::names(&filler)),
            NO_VIOLATIONS.to_string(),
        ]))
        .lookup_delay(Duration::ZERO)
        .build()
        .unwrap();

    // A stale cancellation from an earlier build does not leak into this one.
    forge.cancellation_flag().cancel();
    let deck = forge
        .build(Some(common::atraxa()), &ArchetypeRules::default())
        .unwrap();
    assert_eq!(deck.cards.len(), 99);
}

#[test]
fn forge_resolves_commanders_by_name() {
    let forge = DeckForge::builder()
        .card_source(source_with(&[]))
        .build()
        .unwrap();
    assert_eq!(forge.resolve_commander("KRENKO, MOB BOSS").unwrap().name, "Krenko, Mob Boss");
    assert!(matches!(
        forge.resolve_commander("Nobody").unwrap_err(),
        ForgeError::NotFound(_)
    ));
}

#[test]
fn forge_display() {
    let forge = DeckForge::builder()
        .card_source(source_with(&[]))
        .completion_service(ScriptedCompletion::default())
        .lookup_delay(Duration::ZERO)
        .build()
        .unwrap();
    assert_eq!(
        forge.to_string(),
        "DeckForge(model=gpt-4o-mini, batch_limit=75, lookup_delay=0ms)"
    );

    let bare = DeckForge::builder()
        .card_source(source_with(&[]))
        .build()
        .unwrap();
    assert!(bare.to_string().starts_with("DeckForge(model=none,"));
}

// ---------------------------------------------------------------------------
// pad_with_basics
// ---------------------------------------------------------------------------

#[test]
fn padding_splits_across_commander_colors() {
    let mut cards = common::filler_cards(89);
    let added = pad_with_basics(&mut cards, &common::atraxa());
    assert_eq!(added, 10);
    assert_eq!(cards.len(), 99);
    for basic in ["Plains", "Island", "Swamp", "Forest"] {
        let n = count_named(&cards, basic);
        assert!((2..=3).contains(&n), "{basic}: {n}");
    }
    assert_eq!(count_named(&cards, "Mountain"), 0);
}

#[test]
fn full_deck_is_not_padded() {
    let mut cards = common::filler_cards(99);
    assert_eq!(pad_with_basics(&mut cards, &common::krenko()), 0);
    assert_eq!(cards.len(), 99);
}
