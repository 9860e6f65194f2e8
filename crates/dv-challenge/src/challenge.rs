//! The challenge state machine.
//!
//! ```text
//! Inactive -> PreRound -> CountUp -> AwaitingAction -> Resolving -> CountUp -> ...
//!                            |                                        |
//!                            +--> (round over) MinorWindow -> PreRound
//! ```
//!
//! The controller owns the roster, the arena, both decks and the RNG.
//! Callers drive it with [`Challenge::tick`], [`Challenge::update`] or
//! [`Challenge::advance`] and feed it input through the `submit_*` and
//! `declare_*` calls. A rejected call returns an error and changes
//! nothing.

use dv_core::{CombatantId, EventBus, ListenerId, Zone, ZoneId, ZoneRegistry, default_arena};
use dv_mechanics::resolution::{self as resolver, Effect, Resolution, WoundResult};
use dv_mechanics::{
    ActionKind, ActionRequest, Card, Combatant, Condition, Deck, Roster, RuleSet, Vitality, WoundStage,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ChallengeConfig;
use crate::error::{ChallengeError, ChallengeResult};
use crate::events::{ChallengeEvent, ChallengeKind, DeckKind, Outcome, Phase};
use crate::initiative::{InitiativeSlot, order_slots};
use crate::npc::{self, Battlefield, NearestTarget, NpcPolicy};

/// Identifies an action suspended on a Test of Fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u64);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything needed to start a challenge.
#[derive(Debug, Clone, Default)]
pub struct ChallengeSetup {
    /// Player characters, in roster order.
    pub pcs: Vec<Combatant>,
    /// Antagonists, in roster order.
    pub npcs: Vec<Combatant>,
    /// Encounter kind.
    pub kind: ChallengeKind,
    /// The room the encounter takes place in.
    pub room_id: Option<String>,
    /// The arena. Empty means the default near/center/far line.
    pub zones: Vec<Zone>,
}

impl ChallengeSetup {
    /// A setup with the given sides in the default arena.
    pub fn new(pcs: Vec<Combatant>, npcs: Vec<Combatant>) -> Self {
        Self {
            pcs,
            npcs,
            ..Self::default()
        }
    }

    /// Set the encounter kind.
    pub fn with_kind(mut self, kind: ChallengeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the room.
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Use a custom arena.
    pub fn with_zones(mut self, zones: Vec<Zone>) -> Self {
        self.zones = zones;
        self
    }
}

/// An action waiting on a Test of Fate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    /// Handle for [`Challenge::resolve_test_of_fate`].
    pub id: ActionId,
    /// The action as declared.
    pub request: ActionRequest,
}

/// What a player character wants to do in the minor-action window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinorDeclaration {
    /// The action. Must be allowed as a minor action.
    pub kind: ActionKind,
    /// Target, for aid.
    pub target: Option<CombatantId>,
    /// Destination, for moves.
    pub destination: Option<ZoneId>,
}

impl MinorDeclaration {
    /// A declaration with no target or destination.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            target: None,
            destination: None,
        }
    }

    /// Aim at a combatant.
    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the destination zone.
    pub fn with_destination(mut self, zone: impl Into<ZoneId>) -> Self {
        self.destination = Some(zone.into());
        self
    }
}

/// A declared minor action, resolved when the window closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinorAction {
    /// Who declared it.
    pub actor: CombatantId,
    /// The card committed. Spent whether or not the action happens.
    pub card: Card,
    /// The action to resolve.
    pub request: ActionRequest,
}

/// One encounter.
pub struct Challenge {
    config: ChallengeConfig,
    phase: Phase,
    kind: ChallengeKind,
    room_id: Option<String>,
    round: u32,
    count: u32,
    roster: Roster,
    zones: ZoneRegistry,
    awaiting: Vec<CombatantId>,
    slots: Vec<InitiativeSlot>,
    active: Option<CombatantId>,
    pending: Option<PendingAction>,
    drawn_fate: Option<Card>,
    minors: Vec<MinorAction>,
    outcome: Option<Outcome>,
    gm_deck: Deck,
    player_deck: Deck,
    rng: StdRng,
    policy: Box<dyn NpcPolicy>,
    bus: EventBus<ChallengeEvent>,
    elapsed: f64,
    next_action_id: u64,
}

impl Challenge {
    /// Create an idle controller with shuffled tarot decks and the
    /// [`NearestTarget`] policy.
    pub fn new(config: ChallengeConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut gm_deck = Deck::tarot();
        gm_deck.shuffle(&mut rng);
        let mut player_deck = Deck::tarot();
        player_deck.shuffle(&mut rng);

        Self {
            config,
            phase: Phase::Inactive,
            kind: ChallengeKind::default(),
            room_id: None,
            round: 0,
            count: 0,
            roster: Roster::default(),
            zones: ZoneRegistry::new(),
            awaiting: Vec::new(),
            slots: Vec::new(),
            active: None,
            pending: None,
            drawn_fate: None,
            minors: Vec::new(),
            outcome: None,
            gm_deck,
            player_deck,
            rng,
            policy: Box::new(NearestTarget),
            bus: EventBus::new(),
            elapsed: 0.0,
            next_action_id: 0,
        }
    }

    /// Replace the antagonist policy.
    pub fn with_policy(mut self, policy: impl NpcPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Replace the GM deck. The deck is used as given, without shuffling.
    pub fn with_gm_deck(mut self, deck: Deck) -> Self {
        self.gm_deck = deck;
        self
    }

    /// Replace the player deck. The deck is used as given, without shuffling.
    pub fn with_player_deck(mut self, deck: Deck) -> Self {
        self.player_deck = deck;
        self
    }

    /// Register an event listener.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ChallengeEvent) + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a challenge is running.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Inactive
    }

    /// Current round, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Current count within the round.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of activations this round.
    pub fn max_turns(&self) -> u32 {
        self.slots.len() as u32
    }

    /// The combatant whose slot is up.
    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.active.and_then(|id| self.roster.get(id))
    }

    /// ID of the combatant whose slot is up.
    pub fn active_id(&self) -> Option<CombatantId> {
        self.active
    }

    /// A combatant's initiative slot this round.
    pub fn initiative_slot(&self, id: CombatantId) -> Option<&InitiativeSlot> {
        self.slots.iter().find(|s| s.combatant == id)
    }

    /// This round's slots; in activation order once revealed.
    pub fn initiative_order(&self) -> &[InitiativeSlot] {
        &self.slots
    }

    /// Everyone in the encounter.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Player characters.
    pub fn pcs(&self) -> &[Combatant] {
        self.roster.pcs()
    }

    /// Antagonists.
    pub fn npcs(&self) -> &[Combatant] {
        self.roster.npcs()
    }

    /// Look up a combatant.
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster.get(id)
    }

    /// The arena.
    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    /// How the last challenge ended. Cleared when a new one starts.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Combatants that still owe an initiative card, in roster order.
    pub fn awaiting_initiative(&self) -> &[CombatantId] {
        &self.awaiting
    }

    /// The action suspended on a Test of Fate, if any.
    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Minor actions declared in the open window, in submission order.
    pub fn declared_minors(&self) -> &[MinorAction] {
        &self.minors
    }

    /// Encounter kind.
    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    /// The room, if one was given.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Resolution policies in force.
    pub fn rules(&self) -> &RuleSet {
        &self.config.rules
    }

    /// The configuration.
    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// The GM deck.
    pub fn gm_deck(&self) -> &Deck {
        &self.gm_deck
    }

    /// The player deck.
    pub fn player_deck(&self) -> &Deck {
        &self.player_deck
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a challenge and open the first round's initiative.
    pub fn start_challenge(&mut self, setup: ChallengeSetup) -> ChallengeResult<()> {
        if self.is_active() {
            return Err(ChallengeError::InvalidAction(
                "a challenge is already running".to_string(),
            ));
        }
        if setup.pcs.is_empty() || setup.npcs.is_empty() {
            return Err(ChallengeError::InvalidAction(
                "a challenge needs at least one PC and one NPC".to_string(),
            ));
        }

        if setup.pcs.iter().all(|c| !c.can_act()) {
            return Err(ChallengeError::InvalidAction(
                "no player character is able to act".to_string(),
            ));
        }

        let zones = if setup.zones.is_empty() {
            default_arena()
        } else {
            setup.zones
        };
        let mut registry = ZoneRegistry::new();
        registry.register_zones(zones)?;
        if let Some(lost) = setup
            .pcs
            .iter()
            .chain(setup.npcs.iter())
            .find(|c| !registry.contains(&c.zone))
        {
            return Err(ChallengeError::UnknownEntity(format!(
                "zone {} (for {})",
                lost.zone, lost.name
            )));
        }

        let mut roster = Roster::new(setup.pcs, setup.npcs);
        for combatant in roster.iter_mut() {
            combatant.sync_conditions();
        }

        self.zones = registry;
        self.roster = roster;
        self.kind = setup.kind;
        self.room_id = setup.room_id;
        self.round = 1;
        self.count = 0;
        self.slots.clear();
        self.awaiting.clear();
        self.active = None;
        self.pending = None;
        self.minors.clear();
        self.outcome = None;
        self.elapsed = 0.0;

        info!(
            kind = %self.kind,
            pcs = self.roster.pcs().len(),
            npcs = self.roster.npcs().len(),
            "challenge started"
        );
        self.publish(ChallengeEvent::Started {
            kind: self.kind,
            room_id: self.room_id.clone(),
            pcs: self.roster.pcs().iter().map(|c| c.id).collect(),
            npcs: self.roster.npcs().iter().map(|c| c.id).collect(),
        });
        self.enter_pre_round();
        Ok(())
    }

    /// End the challenge.
    ///
    /// With no explicit outcome, the board decides: victory if no
    /// antagonist is left, defeat or flight if no player character can
    /// act, and aborted otherwise.
    pub fn end_challenge(
        &mut self,
        outcome: Option<Outcome>,
        meta: Option<String>,
    ) -> ChallengeResult<Outcome> {
        if !self.is_active() {
            return Err(ChallengeError::InvalidAction(
                "no challenge is running".to_string(),
            ));
        }
        let outcome = outcome
            .or_else(|| self.decided_outcome())
            .unwrap_or(Outcome::Aborted);
        self.finish(outcome, meta);
        Ok(outcome)
    }

    /// Impose a condition from outside action resolution, for scripted
    /// effects such as traps. `Dead` also empties the health model so the
    /// condition sticks; `Fled` breaks engagements.
    ///
    /// If this decides the challenge, it ends. A combatant taken out of
    /// the fight no longer owes initiative, and loses its turn if it was
    /// the one being waited on.
    pub fn apply_condition(&mut self, id: CombatantId, condition: Condition) -> ChallengeResult<()> {
        let combatant = self
            .roster
            .get_mut(id)
            .ok_or_else(|| ChallengeError::UnknownEntity(format!("combatant {id}")))?;
        match condition {
            Condition::Dead => {
                match &mut combatant.vitality {
                    Vitality::Pc(track) => track.stage = WoundStage::Dead,
                    Vitality::Npc(vitals) => vitals.health.deplete(),
                }
                combatant.sync_conditions();
                self.zones.disengage(id);
            }
            Condition::Fled => {
                combatant.add_condition(condition);
                self.zones.disengage(id);
            }
            _ => combatant.add_condition(condition),
        }
        debug!(combatant = %id, %condition, "condition applied");

        if !self.is_active() {
            return Ok(());
        }
        if let Some(outcome) = self.decided_outcome() {
            self.finish(outcome, None);
            return Ok(());
        }
        let sidelined = self.roster.get(id).is_some_and(|c| !c.can_act());
        if !sidelined {
            return Ok(());
        }
        match self.phase {
            Phase::PreRound if self.awaiting.contains(&id) => {
                self.awaiting.retain(|a| *a != id);
                if self.awaiting.is_empty() {
                    self.reveal_initiative();
                }
            }
            Phase::AwaitingAction if self.active == Some(id) => self.finish_activation(),
            _ => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decks
    // -----------------------------------------------------------------------

    /// Deal cards from the player deck into a player character's hand.
    pub fn deal(&mut self, pc: CombatantId, n: usize) -> ChallengeResult<Vec<Card>> {
        let combatant = self
            .roster
            .get(pc)
            .ok_or_else(|| ChallengeError::UnknownEntity(format!("combatant {pc}")))?;
        if !combatant.is_pc() {
            return Err(ChallengeError::InvalidAction(format!(
                "{} is not a player character",
                combatant.name
            )));
        }
        let mut dealt = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(card) = self.draw(DeckKind::Player) else {
                break;
            };
            dealt.push(card);
        }
        if let Some(hand) = self.roster.get_mut(pc).map(|c| &mut c.hand) {
            for card in &dealt {
                hand.add(card.clone());
            }
        }
        Ok(dealt)
    }

    /// Draw a fate card from the GM deck.
    ///
    /// The card stays out until it is played with
    /// [`resolve_test_of_fate`](Self::resolve_test_of_fate) or handed back
    /// with [`return_fate_card`](Self::return_fate_card). Drawing again
    /// discards the card still out.
    pub fn draw_fate_card(&mut self) -> Option<Card> {
        self.return_fate_card();
        let card = self.draw(DeckKind::Gm)?;
        self.drawn_fate = Some(card.clone());
        Some(card)
    }

    /// Discard the fate card drawn but not played. Returns false if none was out.
    pub fn return_fate_card(&mut self) -> bool {
        match self.drawn_fate.take() {
            Some(card) => {
                self.gm_deck.discard(card);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Initiative
    // -----------------------------------------------------------------------

    /// Commit an initiative card.
    ///
    /// Player characters must hold the card. Antagonists may be given any
    /// card; one from their hand is spent from it.
    pub fn submit_initiative(&mut self, id: CombatantId, card: Card) -> ChallengeResult<()> {
        if self.phase != Phase::PreRound {
            return Err(ChallengeError::OutOfTurn(format!(
                "initiative is not being collected ({})",
                self.phase
            )));
        }
        let combatant = self
            .roster
            .get(id)
            .ok_or_else(|| ChallengeError::UnknownEntity(format!("combatant {id}")))?;
        if !self.awaiting.contains(&id) {
            return Err(ChallengeError::OutOfTurn(format!(
                "{} does not owe an initiative card",
                combatant.name
            )));
        }
        if combatant.is_pc() && !combatant.hand.contains(&card) {
            return Err(ChallengeError::InvalidAction(format!(
                "{} does not hold {card}",
                combatant.name
            )));
        }

        self.record_initiative(id, card);
        if self.awaiting.is_empty() {
            self.reveal_initiative();
        }
        Ok(())
    }

    fn record_initiative(&mut self, id: CombatantId, card: Card) {
        debug!(combatant = %id, %card, "initiative committed");
        self.spend(id, &card);
        self.awaiting.retain(|a| *a != id);
        self.slots.push(InitiativeSlot::new(id, card));
    }

    fn reveal_initiative(&mut self) {
        order_slots(&mut self.slots, &self.roster);
        self.count = 0;
        self.publish(ChallengeEvent::InitiativeRevealed {
            round: self.round,
            order: self.slots.clone(),
        });
        self.set_phase(Phase::CountUp);
    }

    fn enter_pre_round(&mut self) {
        self.count = 0;
        self.slots.clear();
        self.active = None;
        self.awaiting = self
            .roster
            .iter()
            .filter(|c| c.can_act())
            .map(|c| c.id)
            .collect();
        self.set_phase(Phase::PreRound);

        if self.config.auto_npc_initiative {
            let npcs: Vec<CombatantId> = self
                .awaiting
                .iter()
                .copied()
                .filter(|id| self.roster.get(*id).is_some_and(|c| c.is_npc()))
                .collect();
            for id in npcs {
                match self.draw(DeckKind::Gm) {
                    Some(card) => {
                        if let Some(npc) = self.roster.get_mut(id) {
                            npc.hand.add(card.clone());
                        }
                        self.record_initiative(id, card);
                    }
                    None => {
                        warn!(combatant = %id, "GM deck exhausted; antagonist sits out the round");
                        self.awaiting.retain(|a| *a != id);
                    }
                }
            }
        }
        if self.awaiting.is_empty() {
            self.reveal_initiative();
        }
    }

    // -----------------------------------------------------------------------
    // Count-up
    // -----------------------------------------------------------------------

    /// Advance the count by one. Does nothing outside the count-up phase.
    pub fn tick(&mut self) {
        if self.phase != Phase::CountUp {
            return;
        }
        self.count += 1;
        if self.count > self.max_turns() {
            self.end_round();
            return;
        }

        let Some(id) = self
            .slots
            .iter()
            .find(|s| s.position == self.count)
            .map(|s| s.combatant)
        else {
            return;
        };
        let Some(combatant) = self.roster.get_mut(id) else {
            return;
        };
        if !combatant.can_act() {
            debug!(combatant = %id, count = self.count, "skipping combatant that cannot act");
            return;
        }
        combatant.remove_condition(Condition::Guarded);
        let is_pc = combatant.is_pc();

        self.active = Some(id);
        self.publish(ChallengeEvent::Activated {
            combatant: id,
            count: self.count,
        });
        if is_pc {
            self.set_phase(Phase::AwaitingAction);
        } else {
            self.run_npc(id);
        }
    }

    /// Feed elapsed time. One count step happens per configured interval
    /// while the challenge is counting up; time spent waiting on input is
    /// discarded.
    pub fn update(&mut self, dt: f64) {
        if self.phase != Phase::CountUp {
            self.elapsed = 0.0;
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.config.count_interval {
            self.elapsed -= self.config.count_interval;
            self.tick();
            if self.phase != Phase::CountUp {
                self.elapsed = 0.0;
                break;
            }
        }
    }

    /// Tick until the challenge needs input. Returns the number of ticks.
    pub fn advance(&mut self) -> u32 {
        let mut ticks = 0;
        while self.phase == Phase::CountUp {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn end_round(&mut self) {
        debug!(round = self.round, "round over");
        self.active = None;
        self.publish(ChallengeEvent::RoundEnded { round: self.round });
        for deck in [DeckKind::Gm, DeckKind::Player] {
            let settled = match deck {
                DeckKind::Gm => self.gm_deck.settle_fool(&mut self.rng),
                DeckKind::Player => self.player_deck.settle_fool(&mut self.rng),
            };
            if settled {
                self.publish(ChallengeEvent::DeckReshuffled { deck });
            }
        }

        let window = self.config.minor_window
            && self
                .roster
                .pcs()
                .iter()
                .any(|c| c.can_act() && !c.hand.is_empty());
        if window {
            self.minors.clear();
            self.set_phase(Phase::MinorWindow);
        } else {
            self.next_round();
        }
    }

    fn next_round(&mut self) {
        self.round += 1;
        self.enter_pre_round();
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Submit the active player character's action.
    ///
    /// Returns the resolution. If it reports a pending Test of Fate, the
    /// challenge waits in [`Phase::Resolving`] until
    /// [`resolve_test_of_fate`](Self::resolve_test_of_fate) is called with
    /// the id from [`pending_action`](Self::pending_action).
    pub fn submit_action(&mut self, request: ActionRequest) -> ChallengeResult<Resolution> {
        if self.phase != Phase::AwaitingAction {
            return Err(ChallengeError::OutOfTurn(format!(
                "not waiting for an action ({})",
                self.phase
            )));
        }
        if self.active != Some(request.actor) {
            return Err(ChallengeError::OutOfTurn(format!(
                "combatant {} is not active",
                request.actor
            )));
        }
        self.check_card_in_hand(request.actor, request.card.as_ref())?;

        let resolution = resolver::resolve(
            &self.config.rules,
            &mut self.roster,
            &mut self.zones,
            &request,
        )?;
        if let Some(card) = &request.card {
            self.spend(request.actor, card);
        }
        self.set_phase(Phase::Resolving);

        if resolution.pending_test_of_fate {
            let id = ActionId(self.next_action_id);
            self.next_action_id += 1;
            self.publish(ChallengeEvent::TestOfFateRequested {
                action_id: id,
                actor: request.actor,
                kind: request.kind,
            });
            self.pending = Some(PendingAction { id, request });
            return Ok(resolution);
        }

        self.after_resolution(&resolution);
        self.finish_activation();
        Ok(resolution)
    }

    /// Finish an action suspended on a Test of Fate.
    ///
    /// The fate card is either one the actor holds, which is spent from
    /// their hand, or the card last handed out by
    /// [`draw_fate_card`](Self::draw_fate_card). If the board changed so
    /// that the action no longer holds up, it fails without effect and the
    /// count moves on.
    pub fn resolve_test_of_fate(
        &mut self,
        action_id: ActionId,
        card: Card,
    ) -> ChallengeResult<Resolution> {
        let Some(pending) = &self.pending else {
            return Err(ChallengeError::InvalidAction(
                "no action is waiting for a Test of Fate".to_string(),
            ));
        };
        if pending.id != action_id {
            return Err(ChallengeError::UnknownEntity(format!("action {action_id}")));
        }
        let request = pending.request.clone();
        let held = self
            .roster
            .get(request.actor)
            .is_some_and(|c| c.hand.contains(&card));
        if !held && self.drawn_fate.as_ref() != Some(&card) {
            return Err(ChallengeError::InvalidAction(format!(
                "{card} was neither drawn from the GM deck nor held by the actor"
            )));
        }

        let resolution = match resolver::resolve_test_of_fate(
            &self.config.rules,
            &mut self.roster,
            &mut self.zones,
            &request,
            &card,
        ) {
            Ok(resolution) => resolution,
            Err(err) => {
                debug!(
                    actor = %request.actor,
                    error = %err,
                    "action no longer valid after waiting on fate"
                );
                failed(&request)
            }
        };
        self.pending = None;
        if held {
            self.spend(request.actor, &card);
        } else {
            self.return_fate_card();
        }

        self.after_resolution(&resolution);
        self.finish_activation();
        Ok(resolution)
    }

    fn check_card_in_hand(&self, actor: CombatantId, card: Option<&Card>) -> ChallengeResult<()> {
        let (Some(card), Some(combatant)) = (card, self.roster.get(actor)) else {
            return Ok(());
        };
        if combatant.hand.contains(card) {
            Ok(())
        } else {
            Err(ChallengeError::InvalidAction(format!(
                "{} does not hold {card}",
                combatant.name
            )))
        }
    }

    fn run_npc(&mut self, id: CombatantId) {
        if let Some(card) = self.draw(DeckKind::Gm) {
            if let Some(npc) = self.roster.get_mut(id) {
                npc.hand.add(card);
            }
        }

        let request = match self.roster.get(id) {
            Some(actor) => {
                let field = Battlefield {
                    roster: &self.roster,
                    zones: &self.zones,
                    rules: &self.config.rules,
                };
                self.policy.choose(actor, &field)
            }
            None => npc::pass(id),
        };
        self.set_phase(Phase::Resolving);

        let mut resolution = match resolver::resolve(
            &self.config.rules,
            &mut self.roster,
            &mut self.zones,
            &request,
        ) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(combatant = %id, kind = %request.kind, error = %err, "NPC action rejected; passing");
                self.pass_for(id)
            }
        };
        if resolution.pending_test_of_fate {
            resolution = match self.draw(DeckKind::Gm) {
                Some(fate) => {
                    let finished = resolver::resolve_test_of_fate(
                        &self.config.rules,
                        &mut self.roster,
                        &mut self.zones,
                        &request,
                        &fate,
                    );
                    self.gm_deck.discard(fate);
                    finished.unwrap_or_else(|_| self.pass_for(id))
                }
                None => self.pass_for(id),
            };
        }

        let leftover: Vec<Card> = self
            .roster
            .get_mut(id)
            .map(|c| std::mem::take(&mut c.hand).cards().to_vec())
            .unwrap_or_default();
        for card in leftover {
            self.gm_deck.discard(card);
        }

        self.after_resolution(&resolution);
        self.finish_activation();
    }

    fn pass_for(&mut self, id: CombatantId) -> Resolution {
        let pass = npc::pass(id);
        match resolver::resolve(
            &self.config.rules,
            &mut self.roster,
            &mut self.zones,
            &pass,
        ) {
            Ok(resolution) => resolution,
            Err(_) => Resolution {
                actor: id,
                kind: ActionKind::Pass,
                success: true,
                margin: None,
                effect: Effect::None,
                pending_test_of_fate: false,
                fate: None,
            },
        }
    }

    /// Publish the consequences of a finished action and apply morale.
    fn after_resolution(&mut self, resolution: &Resolution) {
        self.publish(ChallengeEvent::ActionResolved {
            resolution: resolution.clone(),
        });
        if let Effect::Wound {
            target,
            result,
            damage_type,
        } = &resolution.effect
        {
            if *result != WoundResult::Miss {
                self.publish(ChallengeEvent::WoundTaken {
                    combatant: *target,
                    result: *result,
                    damage_type: *damage_type,
                });
            }
            if *result == WoundResult::Slain && self.roster.get(*target).is_some_and(|c| c.is_npc()) {
                self.shake_morale(*target);
            }
        }
    }

    fn shake_morale(&mut self, fallen: CombatantId) {
        for npc in self.roster.iter_mut().filter(|c| c.is_npc() && c.id != fallen) {
            if let Vitality::Npc(vitals) = &mut npc.vitality {
                vitals.morale -= 1;
            }
        }
    }

    fn finish_activation(&mut self) {
        self.active = None;
        if let Some(outcome) = self.decided_outcome() {
            self.finish(outcome, None);
        } else {
            self.set_phase(Phase::CountUp);
        }
    }

    // -----------------------------------------------------------------------
    // Minor-action window
    // -----------------------------------------------------------------------

    /// Declare a player character's minor action for the open window.
    ///
    /// The card is committed immediately. Nothing resolves until
    /// [`resume_from_minor_window`](Self::resume_from_minor_window).
    pub fn declare_minor_action(
        &mut self,
        id: CombatantId,
        card: Card,
        declaration: MinorDeclaration,
    ) -> ChallengeResult<()> {
        if self.phase != Phase::MinorWindow {
            return Err(ChallengeError::InvalidAction(format!(
                "no minor-action window is open ({})",
                self.phase
            )));
        }
        let combatant = self
            .roster
            .get(id)
            .ok_or_else(|| ChallengeError::UnknownEntity(format!("combatant {id}")))?;
        if !combatant.is_pc() {
            return Err(ChallengeError::InvalidAction(format!(
                "{} is not a player character",
                combatant.name
            )));
        }
        if self.minors.iter().any(|m| m.actor == id) {
            return Err(ChallengeError::InvalidAction(format!(
                "{} has already declared a minor action",
                combatant.name
            )));
        }
        if !declaration.kind.spec().minor_allowed {
            return Err(ChallengeError::InvalidAction(format!(
                "{} is not a minor action",
                declaration.kind
            )));
        }
        self.check_card_in_hand(id, Some(&card))?;

        let mut request = ActionRequest::new(id, declaration.kind);
        request.target = declaration.target;
        request.destination = declaration.destination;
        if declaration.kind.spec().requires_card {
            request.card = Some(card.clone());
        }
        dv_mechanics::validate_action(&self.roster, &self.zones, &request)?;

        self.spend(id, &card);
        self.publish(ChallengeEvent::MinorActionDeclared {
            combatant: id,
            kind: declaration.kind,
        });
        self.minors.push(MinorAction {
            actor: id,
            card,
            request,
        });
        Ok(())
    }

    /// Close the minor-action window: resolve declared minors in
    /// submission order, then start the next round.
    pub fn resume_from_minor_window(&mut self) -> ChallengeResult<Vec<Resolution>> {
        if self.phase != Phase::MinorWindow {
            return Err(ChallengeError::InvalidAction(format!(
                "no minor-action window is open ({})",
                self.phase
            )));
        }

        let declared: Vec<CombatantId> = self.minors.iter().map(|m| m.actor).collect();
        let idle: Vec<CombatantId> = self
            .roster
            .pcs()
            .iter()
            .filter(|c| c.can_act() && !declared.contains(&c.id))
            .map(|c| c.id)
            .collect();
        for combatant in idle {
            self.publish(ChallengeEvent::MinorActionSkipped {
                combatant,
                reason: "no minor action declared".to_string(),
            });
        }

        let mut resolutions = Vec::new();
        for minor in std::mem::take(&mut self.minors) {
            match resolver::resolve(
                &self.config.rules,
                &mut self.roster,
                &mut self.zones,
                &minor.request,
            ) {
                Ok(resolution) => {
                    self.after_resolution(&resolution);
                    resolutions.push(resolution);
                }
                Err(err) => {
                    debug!(combatant = %minor.actor, error = %err, "minor action skipped");
                    self.publish(ChallengeEvent::MinorActionSkipped {
                        combatant: minor.actor,
                        reason: err.to_string(),
                    });
                }
            }
            if let Some(outcome) = self.decided_outcome() {
                self.finish(outcome, None);
                return Ok(resolutions);
            }
        }

        self.next_round();
        Ok(resolutions)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn decided_outcome(&self) -> Option<Outcome> {
        if self.roster.all_npcs_out() {
            Some(Outcome::Victory)
        } else if self.roster.all_pcs_out() {
            if self.roster.pcs().iter().any(|c| c.has_fled()) {
                Some(Outcome::Fled)
            } else {
                Some(Outcome::Defeat)
            }
        } else {
            None
        }
    }

    fn finish(&mut self, outcome: Outcome, meta: Option<String>) {
        info!(%outcome, round = self.round, "challenge ended");
        self.outcome = Some(outcome);
        self.zones.clear_engagements();
        self.active = None;
        self.pending = None;
        self.return_fate_card();
        self.minors.clear();
        self.awaiting.clear();
        self.set_phase(Phase::Inactive);
        self.publish(ChallengeEvent::Ended {
            outcome,
            round: self.round,
            meta,
        });
    }

    /// Draw from a deck, publishing Fool and reshuffle events.
    fn draw(&mut self, deck: DeckKind) -> Option<Card> {
        let draw = match deck {
            DeckKind::Gm => self.gm_deck.draw(&mut self.rng),
            DeckKind::Player => self.player_deck.draw(&mut self.rng),
        }?;
        if draw.reshuffled {
            self.publish(ChallengeEvent::DeckReshuffled { deck });
        }
        if draw.card.is_fool() {
            self.publish(ChallengeEvent::FoolDrawn { deck });
        }
        Some(draw.card)
    }

    /// Take a card out of a combatant's hand and discard it to the owning
    /// deck. Cards the combatant does not hold are left alone.
    fn spend(&mut self, id: CombatantId, card: &Card) {
        let Some(combatant) = self.roster.get_mut(id) else {
            return;
        };
        let is_pc = combatant.is_pc();
        if let Some(card) = combatant.hand.remove(card) {
            if is_pc {
                self.player_deck.discard(card);
            } else {
                self.gm_deck.discard(card);
            }
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!(%from, %to, round = self.round, count = self.count, "phase change");
        self.phase = to;
        self.publish(ChallengeEvent::PhaseChanged { from, to });
    }

    fn publish(&mut self, event: ChallengeEvent) {
        self.bus.publish(&event);
    }
}

/// An action that came to nothing.
fn failed(request: &ActionRequest) -> Resolution {
    Resolution {
        actor: request.actor,
        kind: request.kind,
        success: false,
        margin: None,
        effect: Effect::None,
        pending_test_of_fate: false,
        fate: None,
    }
}
