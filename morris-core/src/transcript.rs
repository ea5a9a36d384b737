//! Recorded event sequences and deterministic replay

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::game::{Event, Game};
use crate::notify::Notification;
use crate::ruleset::RuleSet;

/// The inbound events of one game, starting from a fresh board
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub rules: RuleSet,
    pub events: Vec<Event>,
}

impl Transcript {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Reset a new engine and feed it every event in order
    pub fn replay(&self) -> (Game, Vec<Notification>) {
        let mut game = Game::new(self.rules.clone());
        let mut out = game.reset();
        for &event in &self.events {
            out.extend(game.handle(event));
        }
        (game, out)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
        let transcript: Transcript = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse transcript: {}", path.display()))?;
        transcript.rules.validate()?;
        Ok(transcript)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
        Ok(())
    }
}
