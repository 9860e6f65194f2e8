//! Domain events published by a challenge.

use dv_core::CombatantId;
use dv_mechanics::{ActionKind, DamageType, Effect, Resolution, Roster, WoundResult};
use serde::{Deserialize, Serialize};

use crate::challenge::ActionId;
use crate::initiative::InitiativeSlot;

/// The phases of the challenge state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No challenge running.
    Inactive,
    /// Collecting initiative cards.
    PreRound,
    /// Counting up through the initiative order.
    CountUp,
    /// Waiting for the active player character to act.
    AwaitingAction,
    /// An action is being resolved or waits for a Test of Fate.
    Resolving,
    /// End-of-round minor actions are being declared.
    MinorWindow,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::PreRound => write!(f, "pre_round"),
            Self::CountUp => write!(f, "count_up"),
            Self::AwaitingAction => write!(f, "awaiting_action"),
            Self::Resolving => write!(f, "resolving"),
            Self::MinorWindow => write!(f, "minor_window"),
        }
    }
}

/// How a challenge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every antagonist is dead or gone.
    Victory,
    /// Every player character is down.
    Defeat,
    /// The surviving player characters escaped.
    Fled,
    /// Ended from outside before a side prevailed.
    Aborted,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
            Self::Fled => write!(f, "fled"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// What sort of encounter this is. Carried through to presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// An ordinary fight.
    #[default]
    Combat,
    /// The party was caught off guard.
    Ambush,
    /// A set-piece fight against a single strong foe.
    Boss,
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Combat => write!(f, "combat"),
            Self::Ambush => write!(f, "ambush"),
            Self::Boss => write!(f, "boss"),
        }
    }
}

/// Which of the two decks an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckKind {
    /// The GM's deck, for antagonists and fate.
    Gm,
    /// The players' deck, for hands.
    Player,
}

impl std::fmt::Display for DeckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gm => write!(f, "GM deck"),
            Self::Player => write!(f, "player deck"),
        }
    }
}

/// Something that happened in a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ChallengeEvent {
    /// A challenge began.
    Started {
        /// Encounter kind.
        kind: ChallengeKind,
        /// Room the encounter takes place in, if any.
        room_id: Option<String>,
        /// Player characters.
        pcs: Vec<CombatantId>,
        /// Antagonists.
        npcs: Vec<CombatantId>,
    },
    /// A challenge ended.
    Ended {
        /// How it ended.
        outcome: Outcome,
        /// The round it ended in.
        round: u32,
        /// Free-form note from whoever ended it.
        meta: Option<String>,
    },
    /// The state machine moved to another phase.
    PhaseChanged {
        /// Previous phase.
        from: Phase,
        /// New phase.
        to: Phase,
    },
    /// All initiative cards were turned face up.
    InitiativeRevealed {
        /// The round.
        round: u32,
        /// Slots in activation order.
        order: Vec<InitiativeSlot>,
    },
    /// A combatant's slot came up.
    Activated {
        /// Who.
        combatant: CombatantId,
        /// The count at activation.
        count: u32,
    },
    /// An action finished resolving.
    ActionResolved {
        /// The result.
        resolution: Resolution,
    },
    /// A combatant was struck.
    WoundTaken {
        /// Who was struck.
        combatant: CombatantId,
        /// How badly.
        result: WoundResult,
        /// The kind of harm.
        damage_type: DamageType,
    },
    /// An action is waiting for a fate card.
    TestOfFateRequested {
        /// Pass this to `resolve_test_of_fate`.
        action_id: ActionId,
        /// Who is acting.
        actor: CombatantId,
        /// What they are attempting.
        kind: ActionKind,
    },
    /// A player character declared a minor action.
    MinorActionDeclared {
        /// Who.
        combatant: CombatantId,
        /// What.
        kind: ActionKind,
    },
    /// A player character's minor action did not happen.
    MinorActionSkipped {
        /// Who.
        combatant: CombatantId,
        /// Why.
        reason: String,
    },
    /// A round finished.
    RoundEnded {
        /// The round that finished.
        round: u32,
    },
    /// A deck's discard pile was shuffled back in.
    DeckReshuffled {
        /// Which deck.
        deck: DeckKind,
    },
    /// The Fool turned up; a reshuffle is owed at the end of the round.
    FoolDrawn {
        /// Which deck.
        deck: DeckKind,
    },
}

impl ChallengeEvent {
    /// A one-line description using the combatants' names.
    pub fn describe(&self, roster: &Roster) -> String {
        let name = |id: &CombatantId| {
            roster
                .get(*id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match self {
            Self::Started { kind, room_id, pcs, npcs } => {
                let place = room_id
                    .as_deref()
                    .map(|r| format!(" in {r}"))
                    .unwrap_or_default();
                format!(
                    "{kind} begins{place}: {} vs {}",
                    pcs.iter().map(name).collect::<Vec<_>>().join(", "),
                    npcs.iter().map(name).collect::<Vec<_>>().join(", ")
                )
            }
            Self::Ended { outcome, round, meta } => match meta {
                Some(meta) => format!("challenge ended in {outcome} on round {round} ({meta})"),
                None => format!("challenge ended in {outcome} on round {round}"),
            },
            Self::PhaseChanged { from, to } => format!("{from} -> {to}"),
            Self::InitiativeRevealed { round, order } => format!(
                "round {round} initiative: {}",
                order
                    .iter()
                    .map(|s| format!("{}. {} ({})", s.position, name(&s.combatant), s.card))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Activated { combatant, count } => {
                format!("count {count}: {} acts", name(combatant))
            }
            Self::ActionResolved { resolution } => describe_resolution(resolution, &name),
            Self::WoundTaken {
                combatant,
                result,
                damage_type,
            } => format!("{} takes a {damage_type} blow: {result}", name(combatant)),
            Self::TestOfFateRequested { actor, kind, .. } => {
                format!("{}'s {kind} awaits a Test of Fate", name(actor))
            }
            Self::MinorActionDeclared { combatant, kind } => {
                format!("{} readies a minor {kind}", name(combatant))
            }
            Self::MinorActionSkipped { combatant, reason } => {
                format!("{} skips the minor action: {reason}", name(combatant))
            }
            Self::RoundEnded { round } => format!("round {round} ends"),
            Self::DeckReshuffled { deck } => format!("the {deck} is reshuffled"),
            Self::FoolDrawn { deck } => format!("The Fool turns up in the {deck}"),
        }
    }
}

fn describe_resolution(resolution: &Resolution, name: &dyn Fn(&CombatantId) -> String) -> String {
    let actor = name(&resolution.actor);
    let margin = resolution
        .margin
        .map(|m| format!(" (margin {m:+})"))
        .unwrap_or_default();
    match &resolution.effect {
        Effect::Wound { target, result, .. } => {
            format!("{actor} uses {} on {}: {result}{margin}", resolution.kind, name(target))
        }
        Effect::Moved { to, .. } => format!("{actor} moves to {to}{margin}"),
        Effect::Mended { target, amount } => {
            format!("{actor} tends {} (+{amount}){margin}", name(target))
        }
        Effect::Guarding => format!("{actor} stands guard{margin}"),
        Effect::Fled => format!("{actor} flees{margin}"),
        Effect::None if resolution.success => format!("{actor} uses {}{margin}", resolution.kind),
        Effect::None => format!("{actor} fails to {}{margin}", resolution.kind),
    }
}
