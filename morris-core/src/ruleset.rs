//! RuleSet - adjustable game settings

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fewest tokens that can still form a mill
pub const MIN_TOKENS_PER_PLAYER: u8 = 3;

/// Most tokens per player that still leave an empty point after a
/// capture-free placement phase
pub const MAX_TOKENS_PER_PLAYER: u8 = 11;

/// Game settings shared by both players
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub name: String,
    /// Tokens each player starts with in hand
    pub tokens_per_player: u8,
    /// A player down to three tokens may move to any empty point
    pub allow_flying: bool,
    /// A player left without a legal move loses
    pub check_checkmate: bool,
}

impl RuleSet {
    /// Standard rules with the flying endgame enabled
    pub fn with_flying() -> Self {
        Self {
            name: "nine-mens-morris-flying".to_string(),
            allow_flying: true,
            ..Self::default()
        }
    }

    /// Reject settings the engine cannot play
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(MIN_TOKENS_PER_PLAYER..=MAX_TOKENS_PER_PLAYER).contains(&self.tokens_per_player) {
            bail!(
                "tokens_per_player must be between {} and {}, got {}",
                MIN_TOKENS_PER_PLAYER,
                MAX_TOKENS_PER_PLAYER,
                self.tokens_per_player
            );
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules: {}", path.display()))?;
        let rules: RuleSet = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rules: {}", path.display()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write rules: {}", path.display()))?;
        Ok(())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            name: "nine-mens-morris".to_string(),
            tokens_per_player: 9,
            allow_flying: false,
            check_checkmate: true,
        }
    }
}
