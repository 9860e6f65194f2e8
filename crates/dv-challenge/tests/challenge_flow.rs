//! Integration tests for the challenge flow.
use std::cell::RefCell;
use std::rc::Rc;

use dv_challenge::{
    ActionId, Challenge, ChallengeConfig, ChallengeError, ChallengeEvent, ChallengeSetup, DeckKind,
    MinorDeclaration, Outcome, Passive, Phase,
};
use dv_core::CombatantId;
use dv_mechanics::{
    ActionKind, ActionRequest, Card, Combatant, Condition, Deck, DamageType, Suit, Weapon,
    WoundStage,
};

fn card(suit: Suit, value: u32) -> Card {
    Card::new(suit, value).unwrap()
}

fn swords(value: u32) -> Card {
    card(Suit::Swords, value)
}

/// A GM deck that always loses initiative to a face card.
fn low_gm_deck() -> Deck {
    Deck::stacked(
        [5, 2, 3, 4, 1, 2, 3, 4, 1, 2]
            .into_iter()
            .map(|v| card(Suit::Pentacles, v))
            .collect(),
    )
}

struct Table {
    challenge: Challenge,
    pc: CombatantId,
    npc: CombatantId,
    events: Rc<RefCell<Vec<ChallengeEvent>>>,
}

fn table(pc: Combatant, npc: Combatant, config: ChallengeConfig) -> Table {
    let (pc_id, npc_id) = (pc.id, npc.id);
    let mut challenge = Challenge::new(config)
        .with_policy(Passive)
        .with_gm_deck(low_gm_deck());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    challenge.subscribe(move |e: &ChallengeEvent| sink.borrow_mut().push(e.clone()));
    challenge
        .start_challenge(ChallengeSetup::new(vec![pc], vec![npc]))
        .unwrap();
    Table {
        challenge,
        pc: pc_id,
        npc: npc_id,
        events,
    }
}

fn npc_health(challenge: &Challenge, id: CombatantId) -> u32 {
    challenge
        .combatant(id)
        .and_then(|c| c.health())
        .map(|h| h.current)
        .unwrap()
}

fn zone_of(challenge: &Challenge, id: CombatantId) -> String {
    challenge
        .combatant(id)
        .map(|c| c.zone.to_string())
        .unwrap()
}

/// Submit initiative, run the count until the PC is up.
fn start_round(t: &mut Table, initiative: Card) {
    assert_eq!(t.challenge.phase(), Phase::PreRound);
    t.challenge.submit_initiative(t.pc, initiative).unwrap();
    t.challenge.advance();
    assert_eq!(t.challenge.phase(), Phase::AwaitingAction);
    assert_eq!(t.challenge.active_id(), Some(t.pc));
}

/// Run the rest of the round and close the minor window.
fn finish_round(t: &mut Table) {
    t.challenge.advance();
    if t.challenge.phase() == Phase::MinorWindow {
        t.challenge.resume_from_minor_window().unwrap();
    }
}

#[test]
fn near_center_far_scenario() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![
        swords(10),
        swords(9),
        swords(8),
        swords(7),
    ]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());

    assert_eq!(t.challenge.awaiting_initiative(), &[t.pc]);
    assert_eq!(
        t.challenge.initiative_slot(t.npc).map(|s| s.card.value()),
        Some(5)
    );

    // Round 1: melee from near is rejected, the move to center is not.
    start_round(&mut t, swords(10));
    assert_eq!(t.challenge.initiative_order()[0].combatant, t.pc);

    let melee = ActionRequest::new(t.pc, ActionKind::Melee)
        .with_target(t.npc)
        .with_card(swords(7));
    let err = t.challenge.submit_action(melee.clone()).unwrap_err();
    assert!(matches!(err, ChallengeError::InvalidAction(_)));
    assert_eq!(t.challenge.phase(), Phase::AwaitingAction);
    assert_eq!(npc_health(&t.challenge, t.npc), 3);
    assert!(t.challenge.combatant(t.pc).unwrap().hand.contains(&swords(7)));

    t.challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Move).with_destination("center"))
        .unwrap();
    assert_eq!(zone_of(&t.challenge, t.pc), "center");
    finish_round(&mut t);
    assert_eq!(t.challenge.round(), 2);

    // Round 2: on to far.
    start_round(&mut t, swords(9));
    t.challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Move).with_destination("far"))
        .unwrap();
    assert_eq!(zone_of(&t.challenge, t.pc), "far");
    finish_round(&mut t);

    // Round 3: 7 against difficulty 5 is a margin of 2.
    start_round(&mut t, swords(8));
    let res = t.challenge.submit_action(melee).unwrap();
    assert!(res.success);
    assert_eq!(res.margin, Some(2));
    assert_eq!(npc_health(&t.challenge, t.npc), 1);
    assert!(t.challenge.zones().is_engaged(t.pc, t.npc));

    let wounds = t
        .events
        .borrow()
        .iter()
        .filter(|e| matches!(e, ChallengeEvent::WoundTaken { combatant, damage_type: DamageType::Blunt, .. } if *combatant == t.npc))
        .count();
    assert_eq!(wounds, 1);
}

#[test]
fn start_opens_pre_round_with_everyone_who_needs_a_card() {
    let wren = Combatant::pc("Wren", "near");
    let oda = Combatant::pc("Oda", "near");
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let rat = Combatant::npc("Rat", "far", 1, 0);
    let expected = vec![wren.id, oda.id, ghoul.id, rat.id];

    let mut challenge =
        Challenge::new(ChallengeConfig::default().with_auto_npc_initiative(false));
    challenge
        .start_challenge(ChallengeSetup::new(vec![wren, oda], vec![ghoul, rat]))
        .unwrap();
    assert_eq!(challenge.phase(), Phase::PreRound);
    assert_eq!(challenge.round(), 1);
    assert_eq!(challenge.count(), 0);
    assert_eq!(challenge.awaiting_initiative(), expected.as_slice());
}

#[test]
fn start_rejects_bad_setups() {
    let mut challenge = Challenge::new(ChallengeConfig::default());
    let lonely = ChallengeSetup::new(vec![Combatant::pc("Wren", "near")], Vec::new());
    assert!(matches!(
        challenge.start_challenge(lonely),
        Err(ChallengeError::InvalidAction(_))
    ));

    let lost = ChallengeSetup::new(
        vec![Combatant::pc("Wren", "attic")],
        vec![Combatant::npc("Ghoul", "far", 3, 0)],
    );
    assert!(matches!(
        challenge.start_challenge(lost),
        Err(ChallengeError::UnknownEntity(_))
    ));
    assert_eq!(challenge.phase(), Phase::Inactive);
}

#[test]
fn actions_out_of_turn_are_rejected_without_change() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(3)]);
    let ghoul = Combatant::npc("Ghoul", "near", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    let pass = ActionRequest::new(t.pc, ActionKind::Pass);

    // Pre-round.
    assert!(matches!(
        t.challenge.submit_action(pass.clone()),
        Err(ChallengeError::OutOfTurn(_))
    ));

    // Count-up, before the first tick.
    t.challenge.submit_initiative(t.pc, swords(10)).unwrap();
    assert_eq!(t.challenge.phase(), Phase::CountUp);
    assert!(matches!(
        t.challenge.submit_action(pass.clone()),
        Err(ChallengeError::OutOfTurn(_))
    ));
    assert_eq!(t.challenge.count(), 0);

    // Awaiting the PC: the NPC and strangers are out of turn.
    t.challenge.advance();
    for actor in [t.npc, CombatantId::new()] {
        assert!(matches!(
            t.challenge.submit_action(ActionRequest::new(actor, ActionKind::Pass)),
            Err(ChallengeError::OutOfTurn(_))
        ));
    }
    assert_eq!(t.challenge.phase(), Phase::AwaitingAction);
    assert_eq!(t.challenge.active_id(), Some(t.pc));

    // A card the PC does not hold.
    let bluff = ActionRequest::new(t.pc, ActionKind::Melee)
        .with_target(t.npc)
        .with_card(swords(14));
    assert!(matches!(
        t.challenge.submit_action(bluff),
        Err(ChallengeError::InvalidAction(_))
    ));

    // A destination that is not next door.
    assert!(matches!(
        t.challenge
            .submit_action(ActionRequest::new(t.pc, ActionKind::Move).with_destination("far")),
        Err(ChallengeError::ZoneNotAdjacent { .. })
    ));

    assert!(t.challenge.submit_action(pass).is_ok());
}

#[test]
fn initiative_errors() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(4)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());

    assert!(matches!(
        t.challenge.submit_initiative(t.pc, swords(2)),
        Err(ChallengeError::InvalidAction(_))
    ));
    assert!(matches!(
        t.challenge.submit_initiative(t.npc, swords(2)),
        Err(ChallengeError::OutOfTurn(_))
    ));
    assert!(matches!(
        t.challenge.submit_initiative(CombatantId::new(), swords(2)),
        Err(ChallengeError::UnknownEntity(_))
    ));
    t.challenge.submit_initiative(t.pc, swords(10)).unwrap();
    assert!(matches!(
        t.challenge.submit_initiative(t.pc, swords(4)),
        Err(ChallengeError::OutOfTurn(_))
    ));
}

#[test]
fn minor_window_holds_the_round_until_resumed() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(6), swords(2)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());

    start_round(&mut t, swords(10));
    t.challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Pass))
        .unwrap();
    t.challenge.advance();
    assert_eq!(t.challenge.phase(), Phase::MinorWindow);
    assert_eq!(t.challenge.round(), 1);

    // Minors must be allowed, and the phase check comes first.
    assert!(matches!(
        t.challenge
            .declare_minor_action(t.pc, swords(6), MinorDeclaration::new(ActionKind::Melee)),
        Err(ChallengeError::InvalidAction(_))
    ));

    t.challenge
        .declare_minor_action(
            t.pc,
            swords(6),
            MinorDeclaration::new(ActionKind::Move).with_destination("center"),
        )
        .unwrap();
    assert_eq!(t.challenge.declared_minors().len(), 1);
    assert!(matches!(
        t.challenge
            .declare_minor_action(t.pc, swords(2), MinorDeclaration::new(ActionKind::Guard)),
        Err(ChallengeError::InvalidAction(_))
    ));

    // Ticks while the window is open change nothing.
    t.challenge.tick();
    t.challenge.update(10.0);
    t.challenge.advance();
    assert_eq!(t.challenge.phase(), Phase::MinorWindow);
    assert_eq!(t.challenge.round(), 1);
    assert_eq!(zone_of(&t.challenge, t.pc), "near");

    let resolutions = t.challenge.resume_from_minor_window().unwrap();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(zone_of(&t.challenge, t.pc), "center");
    assert_eq!(t.challenge.round(), 2);
    assert_eq!(t.challenge.phase(), Phase::PreRound);
    assert!(!t.challenge.combatant(t.pc).unwrap().hand.contains(&swords(6)));

    assert!(matches!(
        t.challenge.resume_from_minor_window(),
        Err(ChallengeError::InvalidAction(_))
    ));
    assert!(matches!(
        t.challenge
            .declare_minor_action(t.pc, swords(2), MinorDeclaration::new(ActionKind::Guard)),
        Err(ChallengeError::InvalidAction(_))
    ));
}

#[test]
fn undeclared_pcs_are_reported_as_skipped() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(6)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));
    t.challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Pass))
        .unwrap();
    t.challenge.advance();
    t.challenge.resume_from_minor_window().unwrap();
    assert!(t.events.borrow().iter().any(
        |e| matches!(e, ChallengeEvent::MinorActionSkipped { combatant, .. } if *combatant == t.pc)
    ));
}

#[test]
fn no_window_without_cards_or_when_disabled() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));
    t.challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Pass))
        .unwrap();
    t.challenge.advance();
    assert_eq!(t.challenge.phase(), Phase::PreRound);
    assert_eq!(t.challenge.round(), 2);

    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(5)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default().with_minor_window(false));
    start_round(&mut t, swords(10));
    t.challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Pass))
        .unwrap();
    t.challenge.advance();
    assert_eq!(t.challenge.phase(), Phase::PreRound);
}

#[test]
fn slaying_the_last_npc_is_victory() {
    let wren = Combatant::pc("Wren", "far")
        .with_weapon(Weapon::new("Axe", 2, DamageType::Slashing))
        .with_hand(vec![swords(10), swords(12)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));

    t.challenge
        .submit_action(
            ActionRequest::new(t.pc, ActionKind::Melee)
                .with_target(t.npc)
                .with_card(swords(12)),
        )
        .unwrap();
    assert_eq!(t.challenge.phase(), Phase::Inactive);
    assert_eq!(t.challenge.outcome(), Some(Outcome::Victory));
    assert!(!t.challenge.is_active());
    assert_eq!(t.challenge.zones().engagement_count(), 0);
    assert!(t.challenge.combatant(t.npc).unwrap().is_dead());
    assert!(matches!(
        t.events.borrow().last(),
        Some(ChallengeEvent::Ended { outcome: Outcome::Victory, .. })
    ));
}

#[test]
fn ending_decides_outcome_from_the_board() {
    // All NPCs dead: victory, engagements cleared.
    let wren = Combatant::pc("Wren", "far").with_hand(vec![swords(10), swords(1)]);
    let ghoul = Combatant::npc("Ghoul", "far", 20, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));
    t.challenge
        .submit_action(
            ActionRequest::new(t.pc, ActionKind::Melee)
                .with_target(t.npc)
                .with_card(swords(1)),
        )
        .unwrap();
    assert!(t.challenge.zones().is_engaged(t.pc, t.npc));
    t.challenge.apply_condition(t.npc, Condition::Dead).unwrap();
    assert_eq!(t.challenge.outcome(), Some(Outcome::Victory));
    assert_eq!(t.challenge.phase(), Phase::Inactive);
    assert_eq!(t.challenge.zones().engagement_count(), 0);

    // All PCs down: defeat.
    let wren = Combatant::pc("Wren", "near");
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    t.challenge.apply_condition(t.pc, Condition::Dead).unwrap();
    assert_eq!(
        t.challenge.combatant(t.pc).and_then(|c| c.wound_stage()),
        Some(WoundStage::Dead)
    );
    assert_eq!(t.challenge.outcome(), Some(Outcome::Defeat));
    assert_eq!(t.challenge.phase(), Phase::Inactive);

    // Nobody prevailed: aborted, unless told otherwise.
    let mut t = table(
        Combatant::pc("Wren", "near"),
        Combatant::npc("Ghoul", "far", 3, 0),
        ChallengeConfig::default(),
    );
    assert_eq!(
        t.challenge
            .end_challenge(Some(Outcome::Fled), Some("the party ran".to_string())),
        Ok(Outcome::Fled)
    );
    assert_eq!(t.challenge.outcome(), Some(Outcome::Fled));
    assert!(matches!(
        t.challenge.end_challenge(None, None),
        Err(ChallengeError::InvalidAction(_))
    ));
}

#[test]
fn fleeing_pc_ends_in_flight() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));
    let res = t
        .challenge
        .submit_action(ActionRequest::new(t.pc, ActionKind::Flee))
        .unwrap();
    assert!(res.success);
    assert_eq!(t.challenge.outcome(), Some(Outcome::Fled));
    assert!(t.challenge.combatant(t.pc).unwrap().has_fled());
}

#[test]
fn test_of_fate_suspends_resolution() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![
        swords(10),
        swords(9),
        card(Suit::Cups, 12),
    ]);
    let ghoul = Combatant::npc("Ghoul", "far", 5, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));

    let res = t
        .challenge
        .submit_action(
            ActionRequest::new(t.pc, ActionKind::Cast)
                .with_target(t.npc)
                .with_card(swords(9)),
        )
        .unwrap();
    assert!(res.pending_test_of_fate);
    assert_eq!(t.challenge.phase(), Phase::Resolving);
    let id = t.challenge.pending_action().map(|p| p.id).unwrap();
    assert!(t.events.borrow().iter().any(
        |e| matches!(e, ChallengeEvent::TestOfFateRequested { action_id, .. } if *action_id == id)
    ));

    t.challenge.tick();
    t.challenge.update(5.0);
    assert_eq!(t.challenge.phase(), Phase::Resolving);
    assert_eq!(npc_health(&t.challenge, t.npc), 5);

    assert!(matches!(
        t.challenge.resolve_test_of_fate(ActionId(id.0 + 1), card(Suit::Cups, 12)),
        Err(ChallengeError::UnknownEntity(_))
    ));

    // 9 - 6 = 3, and a favorable fate card adds 3.
    let res = t
        .challenge
        .resolve_test_of_fate(id, card(Suit::Cups, 12))
        .unwrap();
    assert_eq!(res.margin, Some(6));
    assert_eq!(npc_health(&t.challenge, t.npc), 0);
    assert_eq!(t.challenge.outcome(), Some(Outcome::Victory));
    assert!(t.challenge.pending_action().is_none());
    assert!(t.challenge.combatant(t.pc).unwrap().hand.is_empty());
}

#[test]
fn fate_cards_come_from_the_gm_deck_or_the_hand() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(9)]);
    let ghoul = Combatant::npc("Ghoul", "far", 5, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));
    t.challenge
        .submit_action(
            ActionRequest::new(t.pc, ActionKind::Cast)
                .with_target(t.npc)
                .with_card(swords(9)),
        )
        .unwrap();
    let id = t.challenge.pending_action().map(|p| p.id).unwrap();
    let total = t.challenge.gm_deck().total();
    let in_play = t.challenge.gm_deck().in_play();
    let discarded = t.challenge.gm_deck().discarded();

    // A card from nowhere changes nothing.
    assert!(matches!(
        t.challenge.resolve_test_of_fate(id, card(Suit::Cups, 12)),
        Err(ChallengeError::InvalidAction(_))
    ));
    assert_eq!(t.challenge.phase(), Phase::Resolving);
    assert!(t.challenge.pending_action().is_some());
    assert_eq!(t.challenge.gm_deck().total(), total);
    assert_eq!(npc_health(&t.challenge, t.npc), 5);

    // Drawing twice puts the first card back before the second comes out.
    t.challenge.draw_fate_card().unwrap();
    let fate = t.challenge.draw_fate_card().unwrap();
    assert_eq!(t.challenge.gm_deck().in_play(), in_play + 1);
    assert_eq!(t.challenge.gm_deck().discarded(), discarded + 1);

    let res = t.challenge.resolve_test_of_fate(id, fate).unwrap();
    assert!(res.fate.is_some());
    assert!(t.challenge.pending_action().is_none());
    assert_ne!(t.challenge.phase(), Phase::Resolving);
    assert_eq!(t.challenge.gm_deck().total(), total);
    assert_eq!(t.challenge.gm_deck().in_play(), in_play);
    assert_eq!(t.challenge.gm_deck().discarded(), discarded + 2);
    assert!(!t.challenge.return_fate_card());
}

#[test]
fn fate_action_against_a_departed_target_fails_and_the_count_moves_on() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(9)]);
    let ghoul = Combatant::npc("Ghoul", "far", 5, 0);
    let rat = Combatant::npc("Rat", "far", 2, 0);
    let (pc, ghoul_id) = (wren.id, ghoul.id);
    let mut challenge = Challenge::new(ChallengeConfig::default())
        .with_policy(Passive)
        .with_gm_deck(low_gm_deck());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    challenge.subscribe(move |e: &ChallengeEvent| sink.borrow_mut().push(e.clone()));
    challenge
        .start_challenge(ChallengeSetup::new(vec![wren], vec![ghoul, rat]))
        .unwrap();
    challenge.submit_initiative(pc, swords(10)).unwrap();
    challenge.advance();
    assert_eq!(challenge.active_id(), Some(pc));

    challenge
        .submit_action(
            ActionRequest::new(pc, ActionKind::Cast)
                .with_target(ghoul_id)
                .with_card(swords(9)),
        )
        .unwrap();
    let id = challenge.pending_action().map(|p| p.id).unwrap();
    let total = challenge.gm_deck().total();
    let in_play = challenge.gm_deck().in_play();

    challenge.apply_condition(ghoul_id, Condition::Fled).unwrap();
    assert!(challenge.is_active());
    assert_eq!(challenge.phase(), Phase::Resolving);

    events.borrow_mut().clear();
    let fate = challenge.draw_fate_card().unwrap();
    let res = challenge.resolve_test_of_fate(id, fate).unwrap();
    assert!(!res.success);
    assert!(challenge.pending_action().is_none());
    assert_ne!(challenge.phase(), Phase::Resolving);
    assert!(challenge.active_id().is_none());
    assert!(events.borrow().iter().any(
        |e| matches!(e, ChallengeEvent::ActionResolved { resolution } if resolution.actor == pc)
    ));
    assert_eq!(challenge.gm_deck().total(), total);
    assert_eq!(challenge.gm_deck().in_play(), in_play);
    assert!(matches!(
        challenge.resolve_test_of_fate(id, swords(10)),
        Err(ChallengeError::InvalidAction(_))
    ));
}

#[test]
fn imposed_conditions_can_end_the_challenge() {
    // Felled before anyone commits a card.
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    assert_eq!(t.challenge.phase(), Phase::PreRound);
    t.challenge.apply_condition(t.npc, Condition::Dead).unwrap();
    assert_eq!(t.challenge.outcome(), Some(Outcome::Victory));
    assert_eq!(t.challenge.phase(), Phase::Inactive);
    assert!(matches!(
        t.events.borrow().last(),
        Some(ChallengeEvent::Ended { outcome: Outcome::Victory, .. })
    ));
    assert!(matches!(
        t.challenge.submit_initiative(t.pc, swords(10)),
        Err(ChallengeError::OutOfTurn(_))
    ));

    // The last PC runs mid-turn.
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    start_round(&mut t, swords(10));
    t.challenge.apply_condition(t.pc, Condition::Fled).unwrap();
    assert_eq!(t.challenge.outcome(), Some(Outcome::Fled));
    assert!(t.challenge.active_id().is_none());
}

#[test]
fn a_sidelined_combatant_stops_holding_up_the_round() {
    let party = || {
        let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(1)]);
        let oda = Combatant::pc("Oda", "near").with_hand(vec![swords(10)]);
        let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
        let ids = (wren.id, oda.id);
        let mut challenge = Challenge::new(ChallengeConfig::default())
            .with_policy(Passive)
            .with_gm_deck(low_gm_deck());
        challenge
            .start_challenge(ChallengeSetup::new(vec![wren, oda], vec![ghoul]))
            .unwrap();
        (challenge, ids)
    };

    // Dying before committing a card releases the reveal.
    let (mut challenge, (wren_id, oda_id)) = party();
    challenge.submit_initiative(oda_id, swords(10)).unwrap();
    assert_eq!(challenge.awaiting_initiative(), &[wren_id]);
    challenge.apply_condition(wren_id, Condition::Dead).unwrap();
    assert!(challenge.awaiting_initiative().is_empty());
    assert_eq!(challenge.phase(), Phase::CountUp);
    challenge.advance();
    assert_eq!(challenge.active_id(), Some(oda_id));

    // Fleeing on your own turn hands the count on.
    let (mut challenge, (wren_id, oda_id)) = party();
    challenge.submit_initiative(wren_id, swords(1)).unwrap();
    challenge.submit_initiative(oda_id, swords(10)).unwrap();
    challenge.advance();
    assert_eq!(challenge.active_id(), Some(oda_id));
    challenge.apply_condition(oda_id, Condition::Fled).unwrap();
    assert!(challenge.is_active());
    assert_eq!(challenge.phase(), Phase::CountUp);
    assert!(challenge.active_id().is_none());
    challenge.advance();
    assert_eq!(challenge.active_id(), Some(wren_id));
}

#[test]
fn the_fool_is_announced_and_reshuffled_at_round_end() {
    // A spare card keeps the round open in the minor window, so nothing
    // is drawn after the reshuffle.
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(10), swords(2)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let (pc, npc) = (wren.id, ghoul.id);
    let mut challenge = Challenge::new(ChallengeConfig::default())
        .with_policy(Passive)
        .with_gm_deck(Deck::stacked(vec![
            Card::fool(),
            swords(3),
            swords(4),
            swords(5),
        ]));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    challenge.subscribe(move |e: &ChallengeEvent| sink.borrow_mut().push(e.clone()));
    challenge
        .start_challenge(ChallengeSetup::new(vec![wren], vec![ghoul]))
        .unwrap();

    assert!(challenge.initiative_slot(npc).is_some_and(|s| s.card.is_fool()));
    assert!(events
        .borrow()
        .iter()
        .any(|e| matches!(e, ChallengeEvent::FoolDrawn { deck: DeckKind::Gm })));
    assert!(challenge.gm_deck().reshuffle_pending());

    challenge.submit_initiative(pc, swords(10)).unwrap();
    challenge.advance();
    challenge
        .submit_action(ActionRequest::new(pc, ActionKind::Pass))
        .unwrap();
    challenge.advance();

    assert_eq!(challenge.phase(), Phase::MinorWindow);
    assert!(!challenge.gm_deck().reshuffle_pending());
    let log = events.borrow();
    let ended = log
        .iter()
        .position(|e| matches!(e, ChallengeEvent::RoundEnded { round: 1 }))
        .unwrap();
    let reshuffled = log
        .iter()
        .position(|e| matches!(e, ChallengeEvent::DeckReshuffled { deck: DeckKind::Gm }))
        .unwrap();
    assert!(reshuffled > ended);
}

#[test]
fn update_ticks_once_per_interval() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(1)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(
        wren,
        ghoul,
        ChallengeConfig::default().with_count_interval(0.5),
    );
    // The ghoul's 5 beats the PC's 1, so the ghoul goes first.
    t.challenge.submit_initiative(t.pc, swords(1)).unwrap();
    assert_eq!(t.challenge.phase(), Phase::CountUp);

    t.challenge.update(0.3);
    assert_eq!(t.challenge.count(), 0);
    t.challenge.update(0.3);
    assert_eq!(t.challenge.count(), 1);
    assert_eq!(t.challenge.phase(), Phase::CountUp);

    t.challenge.update(0.5);
    assert_eq!(t.challenge.count(), 2);
    assert_eq!(t.challenge.phase(), Phase::AwaitingAction);
    assert_eq!(t.challenge.active_id(), Some(t.pc));
}

#[test]
fn dead_combatants_are_skipped_by_the_count() {
    let wren = Combatant::pc("Wren", "near").with_hand(vec![swords(1)]);
    let oda = Combatant::pc("Oda", "near").with_hand(vec![swords(10)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let (wren_id, oda_id) = (wren.id, oda.id);
    let mut challenge = Challenge::new(ChallengeConfig::default())
        .with_policy(Passive)
        .with_gm_deck(low_gm_deck());
    challenge
        .start_challenge(ChallengeSetup::new(vec![wren, oda], vec![ghoul]))
        .unwrap();
    challenge.submit_initiative(wren_id, swords(1)).unwrap();
    challenge.submit_initiative(oda_id, swords(10)).unwrap();
    assert_eq!(challenge.max_turns(), 3);

    challenge.advance();
    assert_eq!(challenge.active_id(), Some(oda_id));
    challenge.apply_condition(wren_id, Condition::Dead).unwrap();
    challenge
        .submit_action(ActionRequest::new(oda_id, ActionKind::Pass))
        .unwrap();
    challenge.advance();
    assert_eq!(challenge.round(), 2);
    assert_eq!(challenge.awaiting_initiative(), &[oda_id]);
}

#[test]
fn nearest_target_npc_attacks_a_pc_in_reach() {
    let wren = Combatant::pc("Wren", "far").with_hand(vec![swords(1)]);
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let (pc, npc) = (wren.id, ghoul.id);
    let mut challenge = Challenge::new(ChallengeConfig::default()).with_gm_deck(Deck::stacked(vec![
        swords(5),
        card(Suit::Major, 21),
        swords(2),
    ]));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    challenge.subscribe(move |e: &ChallengeEvent| sink.borrow_mut().push(e.clone()));
    challenge
        .start_challenge(ChallengeSetup::new(vec![wren], vec![ghoul]))
        .unwrap();
    challenge.submit_initiative(pc, swords(1)).unwrap();
    challenge.advance();

    // 21 - 5 = 16 reaches every wound threshold: four stages, straight to dead.
    assert!(events.borrow().iter().any(|e| matches!(
        e,
        ChallengeEvent::ActionResolved { resolution } if resolution.actor == npc && resolution.kind == ActionKind::Melee
    )));
    assert_eq!(
        challenge.combatant(pc).and_then(|c| c.wound_stage()),
        Some(WoundStage::Dead)
    );
    assert_eq!(challenge.outcome(), Some(Outcome::Defeat));
}

#[test]
fn dealing_moves_cards_from_the_player_deck() {
    let wren = Combatant::pc("Wren", "near");
    let ghoul = Combatant::npc("Ghoul", "far", 3, 0);
    let mut t = table(wren, ghoul, ChallengeConfig::default());
    let before = t.challenge.player_deck().remaining();
    let dealt = t.challenge.deal(t.pc, 3).unwrap();
    assert_eq!(dealt.len(), 3);
    assert_eq!(t.challenge.player_deck().remaining(), before - 3);
    assert_eq!(t.challenge.combatant(t.pc).unwrap().hand.len(), 3);
    assert!(matches!(
        t.challenge.deal(t.npc, 1),
        Err(ChallengeError::InvalidAction(_))
    ));
    assert!(t.challenge.draw_fate_card().is_some());
}

#[test]
fn same_seed_same_shuffle() {
    let a = Challenge::new(ChallengeConfig::default().with_seed(9));
    let b = Challenge::new(ChallengeConfig::default().with_seed(9));
    assert_eq!(a.player_deck().peek(), b.player_deck().peek());
    assert_eq!(a.gm_deck().peek(), b.gm_deck().peek());
}
