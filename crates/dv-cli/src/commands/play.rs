use std::io::{self, BufRead, Write};

use colored::Colorize;

use dv_challenge::{
    ActionId, Challenge, ChallengeConfig, ChallengeEvent, ChallengeSetup, MinorDeclaration, Phase,
};
use dv_core::{CombatantId, ZoneId};
use dv_mechanics::{ActionKind, ActionRequest, Card, Combatant};

use super::EventLog;

const HAND_SIZE: usize = 4;

const HELP: &str = "\
Commands:
  hand                                  show the party's cards
  status                                show the board
  init <n>                              commit card n as initiative
  act <kind> [target] [zone] [n]        take an action with card n
  minor <kind> <n> [target] [zone]      declare a minor action
  resume                                close the minor-action window
  fate [n]                              turn a fate card (card n, or the GM deck)
  flee [n]                              try to escape
  help                                  this list
  quit                                  leave the table

Action kinds: melee, ranged, cast, aid, guard, move, dash, flee, pass";

/// An interactive challenge driven one text command at a time.
pub struct PlaySession {
    challenge: Challenge,
    log: EventLog,
    dealt_round: u32,
}

impl PlaySession {
    pub fn new(seed: u64, rules: Option<&str>) -> Result<Self, String> {
        let rules = super::load_rules(rules)?;
        let config = ChallengeConfig::default().with_seed(seed).with_rules(rules);
        let mut challenge = Challenge::new(config);
        let log = EventLog::attach(&mut challenge);
        challenge
            .start_challenge(
                ChallengeSetup::new(super::party(2), super::foes(2)).in_room("the crypt"),
            )
            .map_err(|e| e.to_string())?;
        Ok(Self {
            challenge,
            log,
            dealt_round: 0,
        })
    }

    /// Everything that has happened so far, plus the first prompt.
    pub fn opening(&mut self) -> Result<String, String> {
        self.settle()?;
        Ok(self.flush())
    }

    /// Run one command and describe what followed.
    pub fn process(&mut self, input: &str) -> Result<String, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }
        let mut words = trimmed.split_whitespace();
        let cmd = words.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = words.collect();

        match cmd.as_str() {
            "hand" | "h" => return Ok(self.hands()),
            "status" | "s" => return Ok(self.status()),
            "help" | "?" => return Ok(HELP.to_string()),
            "quit" | "q" => return Ok("You leave the table.".to_string()),
            "init" => self.do_init(&args)?,
            "act" | "a" => self.do_act(&args)?,
            "minor" => self.do_minor(&args)?,
            "resume" => {
                self.challenge
                    .resume_from_minor_window()
                    .map_err(|e| e.to_string())?;
            }
            "fate" => self.do_fate(&args)?,
            "flee" => {
                let mut flee = vec!["flee"];
                flee.extend(args.iter().copied());
                self.do_act(&flee)?;
            }
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        }
        self.settle()?;
        Ok(self.flush())
    }

    fn do_init(&mut self, args: &[&str]) -> Result<(), String> {
        let id = self
            .challenge
            .awaiting_initiative()
            .iter()
            .copied()
            .find(|id| self.challenge.combatant(*id).is_some_and(|c| c.is_pc()))
            .ok_or("nobody owes an initiative card right now")?;
        let index = args.first().ok_or("usage: init <n>")?;
        let card = self.card_in_hand(id, index)?;
        self.challenge
            .submit_initiative(id, card)
            .map_err(|e| e.to_string())
    }

    fn do_act(&mut self, args: &[&str]) -> Result<(), String> {
        let actor = self
            .challenge
            .active_combatant()
            .filter(|c| c.is_pc())
            .map(|c| c.id)
            .ok_or("no player character is waiting to act")?;
        let kind_word = args.first().ok_or("usage: act <kind> [target] [zone] [n]")?;
        let kind =
            ActionKind::parse(kind_word).ok_or_else(|| format!("unknown action '{kind_word}'"))?;

        let mut request = ActionRequest::new(actor, kind);
        for word in &args[1..] {
            if word.parse::<usize>().is_ok() {
                request = request.with_card(self.card_in_hand(actor, word)?);
            } else if self.challenge.zones().contains(&ZoneId::new(*word)) {
                request = request.with_destination(*word);
            } else {
                request = request.with_target(self.find(word)?.id);
            }
        }
        self.challenge
            .submit_action(request)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn do_minor(&mut self, args: &[&str]) -> Result<(), String> {
        if self.challenge.phase() != Phase::MinorWindow {
            return Err("no minor-action window is open".to_string());
        }
        let declared: Vec<CombatantId> = self
            .challenge
            .declared_minors()
            .iter()
            .map(|m| m.actor)
            .collect();
        let id = self
            .challenge
            .pcs()
            .iter()
            .find(|c| c.can_act() && !c.hand.is_empty() && !declared.contains(&c.id))
            .map(|c| c.id)
            .ok_or("everyone has declared; type 'resume'")?;

        let (Some(kind_word), Some(index)) = (args.first(), args.get(1)) else {
            return Err("usage: minor <kind> <n> [target] [zone]".to_string());
        };
        let kind =
            ActionKind::parse(kind_word).ok_or_else(|| format!("unknown action '{kind_word}'"))?;
        let card = self.card_in_hand(id, index)?;

        let mut declaration = MinorDeclaration::new(kind);
        for word in &args[2..] {
            if self.challenge.zones().contains(&ZoneId::new(*word)) {
                declaration = declaration.with_destination(*word);
            } else {
                declaration = declaration.with_target(self.find(word)?.id);
            }
        }
        self.challenge
            .declare_minor_action(id, card, declaration)
            .map_err(|e| e.to_string())
    }

    fn do_fate(&mut self, args: &[&str]) -> Result<(), String> {
        let (id, actor): (ActionId, CombatantId) = self
            .challenge
            .pending_action()
            .map(|p| (p.id, p.request.actor))
            .ok_or("no action is waiting on a Test of Fate")?;
        let (card, drawn) = match args.first() {
            Some(index) => (self.card_in_hand(actor, index)?, false),
            None => (
                self.challenge
                    .draw_fate_card()
                    .ok_or("the GM deck is empty")?,
                true,
            ),
        };
        self.challenge
            .resolve_test_of_fate(id, card)
            .map(|_| ())
            .map_err(|e| {
                if drawn {
                    self.challenge.return_fate_card();
                }
                e.to_string()
            })
    }

    /// Run the count until a human decision is needed, topping up hands at
    /// the start of each round.
    fn settle(&mut self) -> Result<(), String> {
        loop {
            match self.challenge.phase() {
                Phase::CountUp => {
                    self.challenge.advance();
                }
                Phase::PreRound if self.dealt_round < self.challenge.round() => {
                    self.dealt_round = self.challenge.round();
                    let pcs: Vec<CombatantId> =
                        self.challenge.pcs().iter().filter(|c| c.can_act()).map(|c| c.id).collect();
                    for id in pcs {
                        let held = self.challenge.combatant(id).map_or(0, |c| c.hand.len());
                        if held < HAND_SIZE {
                            self.challenge
                                .deal(id, HAND_SIZE - held)
                                .map_err(|e| e.to_string())?;
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Describe new events and what the table is waiting for.
    fn flush(&self) -> String {
        let roster = self.challenge.roster();
        let mut lines: Vec<String> = self
            .log
            .drain()
            .iter()
            .filter(|e| !matches!(e, ChallengeEvent::PhaseChanged { .. }))
            .map(|e| super::colorize_event(e, &e.describe(roster)).to_string())
            .collect();
        lines.push(self.prompt());
        lines.join("\n")
    }

    fn prompt(&self) -> String {
        let name = |id: CombatantId| {
            self.challenge
                .combatant(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match self.challenge.phase() {
            Phase::PreRound => {
                let waiting: Vec<String> = self
                    .challenge
                    .awaiting_initiative()
                    .iter()
                    .map(|id| name(*id))
                    .collect();
                format!(
                    "Round {}: initiative owed by {} (init <n>)",
                    self.challenge.round(),
                    waiting.join(", ")
                )
            }
            Phase::AwaitingAction => match self.challenge.active_combatant() {
                Some(c) => format!(
                    "{} to act (count {}): {}",
                    c.name,
                    self.challenge.count(),
                    render_hand(c)
                ),
                None => "waiting for an action".to_string(),
            },
            Phase::Resolving => match self.challenge.pending_action() {
                Some(p) => format!("Test of Fate {} pending (fate [n])", p.id),
                None => "resolving".to_string(),
            },
            Phase::MinorWindow => {
                "Minor-action window open (minor <kind> <n>, then resume)".to_string()
            }
            Phase::CountUp => format!("count {}", self.challenge.count()),
            Phase::Inactive => match self.challenge.outcome() {
                Some(outcome) => format!("The challenge is over: {outcome}. Type 'quit'."),
                None => "No challenge is running.".to_string(),
            },
        }
    }

    fn hands(&self) -> String {
        self.challenge
            .pcs()
            .iter()
            .map(|c| format!("{}: {}", c.name, render_hand(c)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn status(&self) -> String {
        format!(
            "Round {}, count {}, {}\n{}",
            self.challenge.round(),
            self.challenge.count(),
            self.challenge.phase(),
            super::status_table(&self.challenge)
        )
    }

    fn card_in_hand(&self, id: CombatantId, index: &str) -> Result<Card, String> {
        let n: usize = index
            .parse()
            .map_err(|_| format!("'{index}' is not a card number"))?;
        self.challenge
            .combatant(id)
            .and_then(|c| n.checked_sub(1).and_then(|i| c.hand.get(i)))
            .cloned()
            .ok_or_else(|| format!("no card {n} in hand"))
    }

    /// Find a combatant by name or name prefix.
    fn find(&self, word: &str) -> Result<&Combatant, String> {
        let word = word.to_lowercase();
        self.challenge
            .roster()
            .iter()
            .find(|c| c.name.to_lowercase().starts_with(&word))
            .ok_or_else(|| format!("nobody called '{word}' here"))
    }
}

fn render_hand(c: &Combatant) -> String {
    if c.hand.is_empty() {
        return "(no cards)".to_string();
    }
    c.hand
        .cards()
        .iter()
        .enumerate()
        .map(|(i, card)| format!("{}. {card}", i + 1))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn run(seed: u64, rules: Option<&str>) -> Result<(), String> {
    let mut session = PlaySession::new(seed, rules)?;

    println!("  {} Delve challenge", "Starting".bold());
    println!("  Seed: {seed}");
    println!("  Type 'help' for commands, 'quit' to exit.\n");
    println!("{}\n", session.opening()?);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.process(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
                    break;
                }
            }
            Err(e) => {
                println!("{}\n", e.yellow());
            }
        }
    }

    Ok(())
}
