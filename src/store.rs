//! Dashboard persistence
//!
//! Dashboards own cards; a card is a saved chart specification. Storage is a
//! capability (`Repository`) handed to callers explicitly, with a
//! thread-safe in-memory implementation for tests, demos, and anything that
//! does not need durable storage yet.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::spec::ChartSpec;
use crate::Result;

/// A saved chart on a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub spec: ChartSpec,
}

impl Card {
    /// Create a card with a generated id
    pub fn new(spec: ChartSpec) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            spec,
        }
    }
}

/// A named collection of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Display position within the dashboard list
    pub order: i64,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// RFC 3339 timestamp of the last card or metadata change
    pub last_modified: String,
    pub cards: Vec<Card>,
}

impl Dashboard {
    /// Create an empty dashboard with a generated id and current timestamps
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            category: None,
            order: 0,
            created_at: now.clone(),
            last_modified: now,
            cards: Vec::new(),
        }
    }

    /// Insert or replace a card by id, bumping `last_modified`
    pub fn upsert_card(&mut self, card: Card) {
        match self.cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => *existing = card,
            None => self.cards.push(card),
        }
        self.touch();
    }

    /// Remove a card by id; returns whether anything was removed
    pub fn remove_card(&mut self, card_id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != card_id);
        let removed = self.cards.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    fn touch(&mut self) {
        self.last_modified = chrono::Utc::now().to_rfc3339();
    }
}

/// Storage capability for dashboards
pub trait Repository {
    fn get(&self, id: &str) -> Option<Dashboard>;
    /// All dashboards, sorted by display order
    fn list(&self) -> Vec<Dashboard>;
    /// Insert or replace; a dashboard with an empty id gets one assigned
    fn upsert(&self, dashboard: Dashboard) -> Result<Dashboard>;
    /// Returns whether anything was deleted
    fn delete(&self, id: &str) -> bool;
}

/// Thread-safe in-memory repository
#[derive(Debug, Default)]
pub struct MemoryRepository {
    dashboards: RwLock<HashMap<String, Dashboard>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dashboards.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Repository for MemoryRepository {
    fn get(&self, id: &str) -> Option<Dashboard> {
        self.dashboards.read().unwrap().get(id).cloned()
    }

    fn list(&self) -> Vec<Dashboard> {
        let mut all: Vec<Dashboard> = self.dashboards.read().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        all
    }

    fn upsert(&self, mut dashboard: Dashboard) -> Result<Dashboard> {
        if dashboard.id.is_empty() {
            dashboard.id = Uuid::new_v4().to_string();
        }
        debug!(id = %dashboard.id, name = %dashboard.name, "upserting dashboard");
        self.dashboards
            .write()
            .unwrap()
            .insert(dashboard.id.clone(), dashboard.clone());
        Ok(dashboard)
    }

    fn delete(&self, id: &str) -> bool {
        let removed = self.dashboards.write().unwrap().remove(id).is_some();
        if removed {
            debug!(id = %id, "deleted dashboard");
        }
        removed
    }
}
