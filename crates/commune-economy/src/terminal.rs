//! The terminal stage chain.
//!
//! A terminal takes at most one outbound action per tick. Stages run in a
//! fixed order and the first one that acts ends the chain:
//!
//! 1. answer an internal request ([`matching::respond_to_internal`]);
//! 2. answer an allied request ([`matching::respond_to_allies`]);
//! 3. trade on the market ([`market::manage_resources`]).
//!
//! A platform rejection in one stage is recorded and the chain moves on.

use commune_types::TerminalAction;
use serde::Serialize;

use crate::allies::AlliedChannel;
use crate::commune::Commune;
use crate::error::PlatformRejection;
use crate::market;
use crate::matching;
use crate::platform::WorldPlatform;
use crate::registry::RequestRegistry;
use crate::settings::TradeSettings;

/// Why a stage took no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoActionReason {
    /// The zone has no terminal.
    NoTerminal,
    /// The controller level does not allow the terminal to act.
    NotActionable,
    /// The terminal is cooling down.
    Cooldown,
    /// The terminal already acted this tick.
    AlreadyActed,
    /// Stored energy is below the reserve threshold.
    EnergyDeficit,
    /// No energy is available to pay transfer fees.
    NoBudget,
    /// No request passed the cutoff.
    NoCandidate,
    /// Allied requests are switched off.
    AllyCommunicationDisabled,
    /// No ally segment was published this tick.
    NoAllySegment,
    /// Market use is switched off.
    MarketDisabled,
    /// The market does not accept orders on this server.
    MarketUnavailable,
    /// Every governed resource is within bounds.
    NothingToTrade,
    /// Our open orders already cover the need.
    AlreadyCovered,
    /// The resource has no price history to price against.
    NoPriceHistory,
    /// An order of ours for this resource is still open.
    OrderPending,
    /// We own as many standing orders as allowed.
    OrderCeiling,
}

/// Outcome of one stage, or of the whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// The terminal acted.
    Matched(TerminalAction),
    /// Nothing to do.
    NoAction(NoActionReason),
    /// The platform refused the intent. State was left untouched.
    Failed(PlatformRejection),
}

impl StageResult {
    /// Run `next` unless this stage acted.
    ///
    /// A failure is kept over a later stage's no-action so the rejection
    /// stays visible in the tick summary.
    pub fn or_else(self, next: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Matched(_) => self,
            Self::NoAction(_) => next(),
            Self::Failed(_) => match next() {
                Self::NoAction(_) => self,
                later => later,
            },
        }
    }

    /// The action taken, if any.
    pub const fn action(&self) -> Option<&TerminalAction> {
        match self {
            Self::Matched(action) => Some(action),
            Self::NoAction(_) | Self::Failed(_) => None,
        }
    }
}

/// Everything a terminal needs beyond its own commune.
pub struct TerminalContext<'a> {
    /// The world.
    pub platform: &'a mut dyn WorldPlatform,
    /// Shared internal requests.
    pub registry: &'a mut RequestRegistry,
    /// This tick's allied requests.
    pub allies: &'a mut AlliedChannel,
    /// Trade switches and limits.
    pub settings: &'a TradeSettings,
}

impl core::fmt::Debug for TerminalContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TerminalContext")
            .field("registry", &self.registry)
            .field("allies", &self.allies)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Run the stage chain for one commune.
pub fn run_terminal(commune: &mut Commune, ctx: &mut TerminalContext<'_>) -> StageResult {
    let Some(terminal) = commune.state().terminal.as_ref() else {
        return StageResult::NoAction(NoActionReason::NoTerminal);
    };
    if !terminal.actionable {
        return StageResult::NoAction(NoActionReason::NotActionable);
    }
    if terminal.cooldown > 0 {
        return StageResult::NoAction(NoActionReason::Cooldown);
    }
    if commune.terminal_intended {
        return StageResult::NoAction(NoActionReason::AlreadyActed);
    }

    matching::respond_to_internal(commune, ctx)
        .or_else(|| matching::respond_to_allies(commune, ctx))
        .or_else(|| market::manage_resources(commune, ctx))
}
