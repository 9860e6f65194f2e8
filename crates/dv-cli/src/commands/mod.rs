pub mod deck;
pub mod play;
pub mod rules;
pub mod skirmish;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use colored::{ColoredString, Colorize};
use comfy_table::{ContentArrangement, Table};

use dv_challenge::{Challenge, ChallengeEvent};
use dv_mechanics::rules::preset;
use dv_mechanics::{Combatant, DamageType, RuleSet, Weapon, WoundResult};

/// Resolve `--rules`: a preset name, a JSON file, or the standard rules.
pub fn load_rules(rules: Option<&str>) -> Result<RuleSet, String> {
    let Some(source) = rules else {
        return Ok(preset::standard());
    };
    if let Some(rules) = preset::by_name(source) {
        return Ok(rules);
    }
    let path = Path::new(source);
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read ruleset {}: {e}", path.display()))?;
    RuleSet::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

const PARTY: [(&str, &str, i32, DamageType, bool, u32); 4] = [
    ("Wren", "Shortsword", 1, DamageType::Slashing, false, 1),
    ("Oda", "Longbow", 1, DamageType::Piercing, true, 0),
    ("Brannoc", "Maul", 2, DamageType::Blunt, false, 2),
    ("Sela", "Dagger", 0, DamageType::Piercing, false, 0),
];

const FOES: [(&str, u32, u32, bool); 6] = [
    ("Ghoul", 4, 0, false),
    ("Skeleton Archer", 3, 1, true),
    ("Ghast", 6, 1, false),
    ("Cultist", 3, 0, true),
    ("Grave Rat", 2, 0, false),
    ("Bone Knight", 7, 2, false),
];

/// The first `n` adventurers, waiting by the door.
pub fn party(n: usize) -> Vec<Combatant> {
    PARTY
        .iter()
        .take(n.clamp(1, PARTY.len()))
        .map(|&(name, weapon, bonus, damage, ranged, armor)| {
            let weapon = Weapon::new(weapon, bonus, damage);
            let weapon = if ranged { weapon.ranged() } else { weapon };
            Combatant::pc(name, "near")
                .with_weapon(weapon)
                .with_armor(armor)
        })
        .collect()
}

/// The first `n` antagonists, lurking at the far end.
pub fn foes(n: usize) -> Vec<Combatant> {
    FOES.iter()
        .take(n.clamp(1, FOES.len()))
        .map(|&(name, health, defense, ranged)| {
            let npc = Combatant::npc(name, "far", health, defense);
            if ranged {
                npc.with_weapon(Weapon::new("Bow", 0, DamageType::Piercing).ranged())
            } else {
                npc.with_weapon(Weapon::new("Claws", 0, DamageType::Slashing))
            }
        })
        .collect()
}

/// Collects a challenge's events so they can be read once the challenge
/// is done mutating itself.
#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<ChallengeEvent>>>);

impl EventLog {
    pub fn attach(challenge: &mut Challenge) -> Self {
        let log = Self::default();
        let sink = Rc::clone(&log.0);
        challenge.subscribe(move |event: &ChallengeEvent| sink.borrow_mut().push(event.clone()));
        log
    }

    /// Take everything published since the last drain.
    pub fn drain(&self) -> Vec<ChallengeEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Colour an event description by how much it matters.
pub fn colorize_event(event: &ChallengeEvent, description: &str) -> ColoredString {
    match event {
        ChallengeEvent::Started { .. } | ChallengeEvent::Ended { .. } => description.bold(),
        ChallengeEvent::WoundTaken {
            result: WoundResult::Slain,
            ..
        } => description.red().bold(),
        ChallengeEvent::WoundTaken { .. } => description.red(),
        ChallengeEvent::ActionResolved { resolution } if resolution.success => {
            description.green()
        }
        ChallengeEvent::ActionResolved { .. } => description.yellow(),
        ChallengeEvent::InitiativeRevealed { .. } => description.cyan(),
        ChallengeEvent::FoolDrawn { .. } | ChallengeEvent::DeckReshuffled { .. } => {
            description.magenta()
        }
        ChallengeEvent::TestOfFateRequested { .. } => description.blue(),
        _ => description.dimmed(),
    }
}

/// One row per combatant: side, zone, and condition.
pub fn status_table(challenge: &Challenge) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Side", "Zone", "Health", "Conditions", "Hand"]);

    for c in challenge.roster().iter() {
        let health = match (c.wound_stage(), c.health()) {
            (Some(stage), _) => stage.to_string(),
            (None, Some(track)) => format!("{}/{}", track.current, track.max),
            (None, None) => "--".to_string(),
        };
        let conditions = if c.conditions().is_empty() {
            "--".to_string()
        } else {
            c.conditions()
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            c.name.clone(),
            c.kind().to_string(),
            c.zone.to_string(),
            health,
            conditions,
            c.hand.len().to_string(),
        ]);
    }
    table
}
