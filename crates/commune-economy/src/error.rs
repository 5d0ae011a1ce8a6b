//! Error types for the commune-economy crate.
//!
//! Two families live here. [`EconomyError`] is a real failure that stops
//! the current zone's run. [`PlatformRejection`] is the world refusing an
//! intent; the scheduler records it and moves on to the next stage.

use commune_types::ZoneName;

/// Errors raised while computing a commune's economy.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// A derived metric needs planning data the zone does not have yet.
    #[error("zone {zone} is missing its {plan} plan")]
    ConfigurationMissing {
        /// Zone whose plan is absent.
        zone: ZoneName,
        /// Name of the missing plan.
        plan: &'static str,
    },

    /// The allied communication segment could not be parsed.
    #[error("malformed ally segment: {source}")]
    AllySegment {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Reasons the world platform refuses an intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformRejection {
    /// The structure does not hold enough of the resource, or of energy for
    /// the fee.
    #[error("not enough resources")]
    NotEnoughResources,

    /// The destination zone or order is not valid.
    #[error("invalid target")]
    InvalidTarget,

    /// Amount or price outside the accepted range.
    #[error("invalid arguments")]
    InvalidArgs,

    /// The terminal is still cooling down.
    #[error("terminal is tired")]
    Tired,

    /// The acting zone is not ours.
    #[error("not the owner")]
    NotOwner,

    /// The order no longer exists.
    #[error("unknown order")]
    UnknownOrder,

    /// The receiving store or the order book is full.
    #[error("target is full")]
    Full,

    /// Any other refusal.
    #[error("rejected: {0}")]
    Other(String),
}
