//! Error types for the `ec4x-core` crate.

use ec4x_state::AuditFinding;

/// Errors that can occur at the engine surface.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Game setup was given an impossible configuration.
    #[error("invalid game setup: {reason}")]
    InvalidSetup {
        /// Explanation of what is wrong with the setup.
        reason: String,
    },

    /// Map generation failed.
    #[error("map generation failed: {source}")]
    MapGeneration {
        /// The underlying map error.
        #[from]
        source: ec4x_map::MapError,
    },

    /// A post-phase invariant audit failed and the turn was rolled back.
    ///
    /// The findings describe the poisoning; the caller keeps the prior
    /// state.
    #[error("turn poisoned by {} invariant findings", findings.len())]
    Poisoned {
        /// The audit findings.
        findings: Vec<AuditFinding>,
    },

    /// A balance configuration string could not be parsed.
    #[error("failed to parse config YAML: {source}")]
    ConfigParse {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },
}
