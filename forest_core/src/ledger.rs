//! Per-agent record of surfaced chunks and planets.
//!
//! Each agent's state sits behind its own mutex so concurrent discovery for
//! one agent is serialized while different agents proceed in parallel.

use std::fmt;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use forest_schema::{Chunk, ChunkKey, LocationId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AgentDiscoveryState {
    chunk_keys: AHashSet<ChunkKey>,
    planet_ids: AHashSet<LocationId>,
}

impl AgentDiscoveryState {
    pub fn has_chunk(&self, key: &ChunkKey) -> bool {
        self.chunk_keys.contains(key)
    }

    pub fn has_planet(&self, id: &LocationId) -> bool {
        self.planet_ids.contains(id)
    }

    /// Records the chunk and its entries; returns how many planet ids were new.
    pub fn record(&mut self, chunk: &Chunk) -> usize {
        self.chunk_keys.insert(chunk.footprint.key());
        chunk
            .planet_ids()
            .filter(|id| self.planet_ids.insert(*id))
            .count()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_keys.len()
    }

    pub fn planet_count(&self) -> usize {
        self.planet_ids.len()
    }

    /// Chunk keys rendered as `"x,y,side"`, sorted.
    pub fn chunk_keys(&self) -> Vec<String> {
        let mut keys: Vec<ChunkKey> = self.chunk_keys.iter().copied().collect();
        keys.sort_unstable();
        keys.iter().map(ToString::to_string).collect()
    }

    pub fn planet_ids(&self) -> Vec<LocationId> {
        let mut ids: Vec<LocationId> = self.planet_ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.chunk_keys.clear();
        self.planet_ids.clear();
    }
}

pub type SharedAgentState = Arc<Mutex<AgentDiscoveryState>>;

#[derive(Debug, Default)]
pub struct DiscoveryLedger {
    agents: RwLock<AHashMap<AgentId, SharedAgentState>>,
}

impl DiscoveryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the agent's state, creating an empty one on first touch.
    pub fn get_or_create(&self, agent: &AgentId) -> SharedAgentState {
        if let Some(state) = self.agents.read().get(agent) {
            return Arc::clone(state);
        }
        let mut agents = self.agents.write();
        let state = agents.entry(agent.clone()).or_insert_with(|| {
            tracing::debug!(target: "forest::ledger", agent = %agent, "agent.created");
            Arc::new(Mutex::new(AgentDiscoveryState::default()))
        });
        Arc::clone(state)
    }

    /// Runs `f` with the agent's state locked.
    pub fn with_agent<R>(&self, agent: &AgentId, f: impl FnOnce(&mut AgentDiscoveryState) -> R) -> R {
        let state = self.get_or_create(agent);
        let mut guard = state.lock();
        f(&mut guard)
    }

    /// Drops everything recorded for the agent. Returns whether it was known.
    pub fn clear(&self, agent: &AgentId) -> bool {
        let removed = self.agents.write().remove(agent);
        match removed {
            Some(state) => {
                // Outstanding handles observe the cleared sets as well.
                state.lock().clear();
                tracing::info!(target: "forest::ledger", agent = %agent, "agent.cleared");
                true
            }
            None => false,
        }
    }

    pub fn contains_agent(&self, agent: &AgentId) -> bool {
        self.agents.read().contains_key(agent)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.read().len()
    }

    /// Sorted planet ids the agent has surfaced; empty for unknown agents.
    pub fn discovered_planet_ids(&self, agent: &AgentId) -> Vec<LocationId> {
        self.peek(agent, AgentDiscoveryState::planet_ids)
            .unwrap_or_default()
    }

    pub fn discovered_chunk_keys(&self, agent: &AgentId) -> Vec<String> {
        self.peek(agent, AgentDiscoveryState::chunk_keys)
            .unwrap_or_default()
    }

    pub fn has_discovered_chunk(&self, agent: &AgentId, key: &ChunkKey) -> bool {
        self.peek(agent, |state| state.has_chunk(key))
            .unwrap_or(false)
    }

    /// Read access that does not create state for unknown agents.
    fn peek<R>(&self, agent: &AgentId, f: impl FnOnce(&AgentDiscoveryState) -> R) -> Option<R> {
        let state = self.agents.read().get(agent).map(Arc::clone)?;
        let guard = state.lock();
        Some(f(&guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_schema::{ChunkFootprint, Coordinate, DiscoveredEntry};

    fn chunk_with(ids: &[u8]) -> Chunk {
        Chunk {
            footprint: ChunkFootprint::new(Coordinate::new(0, 0), 16),
            entries: ids
                .iter()
                .map(|byte| DiscoveredEntry {
                    coords: Coordinate::new(i64::from(*byte), 0),
                    hash: LocationId::from_bytes([*byte; 32]),
                    space_noise: 16.0,
                    biome_noise: 16.0,
                })
                .collect(),
            center_noise: 16.0,
        }
    }

    #[test]
    fn state_is_created_lazily() {
        let ledger = DiscoveryLedger::new();
        let agent = AgentId::from("0xagent");
        assert!(ledger.discovered_planet_ids(&agent).is_empty());
        assert!(!ledger.contains_agent(&agent));

        ledger.get_or_create(&agent);
        assert!(ledger.contains_agent(&agent));
        assert_eq!(ledger.agent_count(), 1);
    }

    #[test]
    fn recording_is_monotonic_and_counts_new_ids() {
        let ledger = DiscoveryLedger::new();
        let agent = AgentId::from("a");
        let first = ledger.with_agent(&agent, |state| state.record(&chunk_with(&[3, 1])));
        let second = ledger.with_agent(&agent, |state| state.record(&chunk_with(&[1, 2])));
        assert_eq!(first, 2);
        assert_eq!(second, 1);

        let ids = ledger.discovered_planet_ids(&agent);
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(ledger.discovered_chunk_keys(&agent), vec!["0,0,16".to_string()]);
    }

    #[test]
    fn clear_forgets_agent_and_old_handles() {
        let ledger = DiscoveryLedger::new();
        let agent = AgentId::from("a");
        let handle = ledger.get_or_create(&agent);
        handle.lock().record(&chunk_with(&[9]));

        assert!(ledger.clear(&agent));
        assert!(handle.lock().planet_ids().is_empty());
        assert!(!ledger.contains_agent(&agent));
        assert!(!ledger.clear(&agent));
    }

    #[test]
    fn agents_are_isolated() {
        let ledger = DiscoveryLedger::new();
        let key = ChunkFootprint::new(Coordinate::new(0, 0), 16).key();
        ledger.with_agent(&AgentId::from("a"), |state| state.record(&chunk_with(&[1])));
        assert!(ledger.has_discovered_chunk(&AgentId::from("a"), &key));
        assert!(!ledger.has_discovered_chunk(&AgentId::from("b"), &key));
    }
}
