use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::{CoreError, CoreResult};
use crate::id::{CombatantId, ZoneId};
use crate::zone::Zone;

/// The arena of a single challenge: its zones, their adjacency, and which
/// combatants are locked in melee with each other.
///
/// Adjacency is symmetric: if `a` lists `b` as a neighbor, `b` is adjacent
/// to `a` as well. Engagements are unordered pairs. Nothing here survives
/// past the challenge that registered it.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, Zone>,
    order: Vec<ZoneId>,
    engagements: BTreeSet<(CombatantId, CombatantId)>,
}

impl ZoneRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Zones
    // -----------------------------------------------------------------------

    /// Replace the arena with `zones`.
    ///
    /// The whole list is validated before anything changes: duplicate IDs
    /// and neighbors that are not part of the list are rejected. Existing
    /// engagements are dropped.
    pub fn register_zones(&mut self, zones: Vec<Zone>) -> CoreResult<()> {
        if zones.is_empty() {
            return Err(CoreError::EmptyArena);
        }

        let mut by_id: BTreeMap<ZoneId, Zone> = BTreeMap::new();
        let mut order = Vec::with_capacity(zones.len());
        for zone in zones {
            if by_id.contains_key(&zone.id) {
                return Err(CoreError::DuplicateZone(zone.id));
            }
            order.push(zone.id.clone());
            by_id.insert(zone.id.clone(), zone);
        }

        let mut edges = Vec::new();
        for zone in by_id.values() {
            for neighbor in &zone.adjacent {
                if !by_id.contains_key(neighbor) {
                    return Err(CoreError::UnknownNeighbor {
                        zone: zone.id.clone(),
                        neighbor: neighbor.clone(),
                    });
                }
                edges.push((neighbor.clone(), zone.id.clone()));
            }
        }
        for (zone, neighbor) in edges.into_iter().filter(|(z, n)| z != n) {
            if let Some(z) = by_id.get_mut(&zone) {
                z.adjacent.insert(neighbor);
            }
        }

        tracing::debug!(zones = order.len(), "registered arena zones");
        self.zones = by_id;
        self.order = order;
        self.engagements.clear();
        Ok(())
    }

    /// Look up a zone by ID.
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    /// Returns true if the zone is part of the arena.
    pub fn contains(&self, id: &ZoneId) -> bool {
        self.zones.contains_key(id)
    }

    /// All zones, in registration order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.order.iter().filter_map(|id| self.zones.get(id))
    }

    /// Number of zones in the arena.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the arena has no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The zones a single move away from `id`.
    pub fn adjacent(&self, id: &ZoneId) -> CoreResult<&BTreeSet<ZoneId>> {
        self.zones
            .get(id)
            .map(|z| &z.adjacent)
            .ok_or_else(|| CoreError::ZoneNotFound(id.clone()))
    }

    /// Returns true if `b` is one move away from `a`.
    pub fn is_adjacent(&self, a: &ZoneId, b: &ZoneId) -> bool {
        self.zones.get(a).is_some_and(|z| z.adjacent.contains(b))
    }

    /// Number of moves between two zones, or `None` if either is unknown
    /// or they are not connected.
    pub fn distance(&self, from: &ZoneId, to: &ZoneId) -> Option<u32> {
        self.path(from, to).map(|p| p.len() as u32)
    }

    /// Returns true if `to` can be reached from `from` in at most `steps` moves.
    pub fn within(&self, from: &ZoneId, to: &ZoneId, steps: u32) -> bool {
        self.distance(from, to).is_some_and(|d| d <= steps)
    }

    /// The first zone on a shortest path from `from` to `to`.
    ///
    /// Returns `None` when already there or when no path exists. Ties are
    /// broken by zone ID so the answer is stable.
    pub fn step_toward(&self, from: &ZoneId, to: &ZoneId) -> Option<ZoneId> {
        self.path(from, to).and_then(|p| p.into_iter().next())
    }

    /// Breadth-first path from `from` to `to`, excluding `from` itself.
    fn path(&self, from: &ZoneId, to: &ZoneId) -> Option<Vec<ZoneId>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut previous: BTreeMap<&ZoneId, &ZoneId> = BTreeMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            let Some(zone) = self.zones.get(current) else {
                continue;
            };
            for next in &zone.adjacent {
                if next == from || previous.contains_key(next) {
                    continue;
                }
                previous.insert(next, current);
                if next == to {
                    let mut path = vec![next.clone()];
                    let mut cursor = current;
                    while cursor != from {
                        path.push(cursor.clone());
                        cursor = *previous.get(cursor)?;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Engagements
    // -----------------------------------------------------------------------

    /// Lock two combatants in melee.
    pub fn engage(&mut self, a: CombatantId, b: CombatantId) -> CoreResult<()> {
        if a == b {
            return Err(CoreError::SelfEngagement(a));
        }
        self.engagements.insert(ordered(a, b));
        Ok(())
    }

    /// Break every engagement involving `id`. Returns the former opponents.
    pub fn disengage(&mut self, id: CombatantId) -> Vec<CombatantId> {
        let released = self.engaged_with(id);
        self.engagements.retain(|(a, b)| *a != id && *b != id);
        released
    }

    /// Returns true if the two combatants are engaged with each other.
    pub fn is_engaged(&self, a: CombatantId, b: CombatantId) -> bool {
        self.engagements.contains(&ordered(a, b))
    }

    /// Everyone `id` is engaged with.
    pub fn engaged_with(&self, id: CombatantId) -> Vec<CombatantId> {
        self.engagements
            .iter()
            .filter_map(|&(a, b)| {
                if a == id {
                    Some(b)
                } else if b == id {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Number of engaged pairs.
    pub fn engagement_count(&self) -> usize {
        self.engagements.len()
    }

    /// Drop all engagements. Called when a challenge ends.
    pub fn clear_engagements(&mut self) {
        self.engagements.clear();
    }
}

fn ordered(a: CombatantId, b: CombatantId) -> (CombatantId, CombatantId) {
    if a <= b { (a, b) } else { (b, a) }
}
