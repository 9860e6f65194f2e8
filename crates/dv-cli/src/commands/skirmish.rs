use std::path::Path;

use colored::Colorize;
use tracing::{debug, warn};

use dv_challenge::{
    Battlefield, Challenge, ChallengeConfig, ChallengeEvent, ChallengeSetup, Journal, JournalEntry,
    MinorDeclaration, NearestTarget, NpcPolicy, Outcome, Phase,
};
use dv_mechanics::{ActionKind, ActionRequest, Card};

use super::EventLog;

const HAND_SIZE: usize = 4;

pub struct SkirmishOptions<'a> {
    pub seed: u64,
    pub pcs: usize,
    pub npcs: usize,
    pub rules: Option<&'a str>,
    pub max_rounds: u32,
    pub journal: Option<&'a Path>,
    pub verbose: bool,
}

pub fn run(opts: &SkirmishOptions<'_>) -> Result<(), String> {
    let rules = super::load_rules(opts.rules)?;
    let rules_name = rules.name.clone();
    let config = ChallengeConfig::default()
        .with_seed(opts.seed)
        .with_rules(rules);

    let mut challenge = Challenge::new(config);
    let log = EventLog::attach(&mut challenge);
    let mut journal = Journal::new();
    journal.note(format!("Seed {}, {rules_name} rules.", opts.seed));

    challenge
        .start_challenge(
            ChallengeSetup::new(super::party(opts.pcs), super::foes(opts.npcs))
                .in_room("the ossuary"),
        )
        .map_err(|e| format!("failed to start challenge: {e}"))?;

    println!(
        "  {} {}",
        "Skirmish".bold(),
        format!("(seed={}, rules={rules_name})", opts.seed).dimmed()
    );
    println!();

    let mut party_ai = NearestTarget;
    let outcome = loop {
        report(&log, &challenge, &mut journal, opts.verbose);
        if let Some(outcome) = challenge.outcome() {
            break outcome;
        }
        if challenge.round() > opts.max_rounds {
            let outcome = challenge
                .end_challenge(None, Some("round limit reached".to_string()))
                .map_err(|e| e.to_string())?;
            report(&log, &challenge, &mut journal, opts.verbose);
            break outcome;
        }
        step(&mut challenge, &mut party_ai)?;
    };

    println!();
    println!(
        "  {} {} on round {}",
        "Outcome:".bold(),
        paint_outcome(outcome),
        challenge.round()
    );
    println!();
    println!("{}", super::status_table(&challenge));

    if let Some(path) = opts.journal {
        std::fs::write(path, journal.export_markdown())
            .map_err(|e| format!("cannot write journal {}: {e}", path.display()))?;
        println!();
        println!("  Journal written to {}", path.display());
    }
    Ok(())
}

/// Play one decision on behalf of whoever the challenge is waiting for.
fn step(challenge: &mut Challenge, party_ai: &mut NearestTarget) -> Result<(), String> {
    match challenge.phase() {
        Phase::PreRound => submit_initiatives(challenge),
        Phase::CountUp => {
            challenge.advance();
            Ok(())
        }
        Phase::AwaitingAction => take_turn(challenge, party_ai),
        Phase::Resolving => {
            let id = challenge
                .pending_action()
                .map(|p| p.id)
                .ok_or("challenge stuck resolving with nothing pending")?;
            let fate = challenge
                .draw_fate_card()
                .ok_or("the GM deck has no fate card left")?;
            challenge
                .resolve_test_of_fate(id, fate)
                .map(|_| ())
                .map_err(|e| {
                    challenge.return_fate_card();
                    e.to_string()
                })
        }
        Phase::MinorWindow => {
            declare_guards(challenge);
            challenge
                .resume_from_minor_window()
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        Phase::Inactive => Err("challenge ended unexpectedly".to_string()),
    }
}

fn submit_initiatives(challenge: &mut Challenge) -> Result<(), String> {
    let waiting = challenge.awaiting_initiative().to_vec();
    for id in waiting {
        let held = challenge.combatant(id).map_or(0, |c| c.hand.len());
        if held < HAND_SIZE {
            challenge
                .deal(id, HAND_SIZE - held)
                .map_err(|e| e.to_string())?;
        }
        let card = challenge
            .combatant(id)
            .and_then(|c| c.hand.highest().cloned());
        match card {
            Some(card) => challenge
                .submit_initiative(id, card)
                .map_err(|e| e.to_string())?,
            None => {
                warn!(combatant = %id, "no card for initiative; ending the skirmish");
                challenge
                    .end_challenge(None, Some("out of cards".to_string()))
                    .map_err(|e| e.to_string())?;
                return Ok(());
            }
        }
    }
    Ok(())
}

fn take_turn(challenge: &mut Challenge, party_ai: &mut NearestTarget) -> Result<(), String> {
    let Some(actor) = challenge.active_combatant() else {
        return Err("no active combatant".to_string());
    };
    let field = Battlefield {
        roster: challenge.roster(),
        zones: challenge.zones(),
        rules: challenge.rules(),
    };
    let request = party_ai.choose(actor, &field);
    let actor_id = actor.id;

    if let Err(e) = challenge.submit_action(request) {
        debug!(combatant = %actor_id, error = %e, "proposed action rejected; passing");
        challenge
            .submit_action(ActionRequest::new(actor_id, ActionKind::Pass))
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Every PC with a spare card raises a guard with its lowest one.
fn declare_guards(challenge: &mut Challenge) {
    let spare: Vec<(_, Card)> = challenge
        .pcs()
        .iter()
        .filter(|c| c.can_act() && c.hand.len() > 1)
        .filter_map(|c| c.hand.lowest().cloned().map(|card| (c.id, card)))
        .collect();
    for (id, card) in spare {
        if let Err(e) =
            challenge.declare_minor_action(id, card, MinorDeclaration::new(ActionKind::Guard))
        {
            debug!(combatant = %id, error = %e, "guard not declared");
        }
    }
}

fn report(log: &EventLog, challenge: &Challenge, journal: &mut Journal, verbose: bool) {
    for event in log.drain() {
        journal.record(&event, challenge.roster());
        if !verbose && !JournalEntry::is_notable(&event) {
            continue;
        }
        let text = event.describe(challenge.roster());
        let line = super::colorize_event(&event, &text);
        match &event {
            ChallengeEvent::RoundEnded { .. } => println!("  {line}\n"),
            _ => println!("  {line}"),
        }
    }
}

fn paint_outcome(outcome: Outcome) -> colored::ColoredString {
    let text = outcome.to_string();
    match outcome {
        Outcome::Victory => text.green().bold(),
        Outcome::Defeat => text.red().bold(),
        Outcome::Fled => text.yellow().bold(),
        Outcome::Aborted => text.dimmed(),
    }
}
