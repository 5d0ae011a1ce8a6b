//! Request matching: pick the request a zone should fulfil this tick.
//!
//! A responder looks at every outstanding request, works out how much it
//! could send given its surplus and its energy budget, and scores
//! the viable ones by `distance + priority * 100`. The lowest score wins;
//! on a tie the first request seen wins.

use std::collections::BTreeMap;

use commune_types::{RequestKey, Resource, TerminalAction, TransferRequest, ZoneName};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::commune::Commune;
use crate::targets;
use crate::terminal::{NoActionReason, StageResult, TerminalContext};
use crate::transaction::{largest_energy_transfer, largest_transaction_amount};

/// A request the responder can fulfil, with the amount it would send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<K> {
    /// Key of the request in its store.
    pub key: K,
    /// The request.
    pub request: TransferRequest,
    /// Amount the responder would send.
    pub amount: u32,
    /// Distance to the requesting zone.
    pub distance: u32,
    /// `distance + priority * 100`; lower is better.
    pub score: Decimal,
}

/// Pick the best request to fulfil.
///
/// `surplus` is what the responder can spare per resource; `distance`
/// gives the distance to a requesting zone. The amount is capped by the
/// budget, and an energy send must also cover its own fee from it.
/// Requests are skipped when the responder can send less than a quarter
/// of what they ask for.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn select_best<'r, K>(
    budget: f64,
    surplus: &BTreeMap<Resource, u32>,
    requests: impl IntoIterator<Item = (&'r K, &'r TransferRequest)>,
    distance: impl Fn(&ZoneName) -> u32,
) -> Option<Candidate<K>>
where
    K: Clone + 'r,
{
    let cap = budget.floor().clamp(0.0, f64::from(u32::MAX)) as u32;
    let mut best: Option<Candidate<K>> = None;

    for (key, request) in requests {
        if request.amount == 0 {
            continue;
        }
        let available = surplus.get(&request.resource).copied().unwrap_or(0);
        let distance_to = distance(&request.zone);
        let desired = request.amount.min(available).min(cap);
        let amount = if request.resource == Resource::Energy {
            largest_energy_transfer(budget, desired, distance_to)
        } else {
            largest_transaction_amount(budget, desired, distance_to)
        };

        // amount / requested < 0.25
        if u64::from(amount).saturating_mul(4) < u64::from(request.amount) {
            continue;
        }

        let Some(score) = request
            .priority
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|weighted| weighted.checked_add(Decimal::from(distance_to)))
        else {
            continue;
        };
        if best.as_ref().is_some_and(|current| score >= current.score) {
            continue;
        }

        best = Some(Candidate {
            key: key.clone(),
            request: request.clone(),
            amount,
            distance: distance_to,
            score,
        });
    }

    best
}

/// Energy the responder may spend on fees: the lesser of its stored energy
/// above reserve and its terminal's energy. Must be strictly positive.
#[allow(clippy::cast_precision_loss)]
pub fn responder_budget(commune: &mut Commune) -> Result<f64, NoActionReason> {
    let reserve = commune.min_stored_energy();
    let stored = i64::from(commune.stored(Resource::Energy));
    if stored < reserve {
        return Err(NoActionReason::EnergyDeficit);
    }
    let terminal_energy = commune
        .state()
        .terminal
        .as_ref()
        .map_or(0, |terminal| terminal.amount(Resource::Energy));

    let above_reserve = stored.checked_sub(reserve).ok_or(NoActionReason::NoBudget)?;
    let budget = above_reserve.min(i64::from(terminal_energy));
    if budget <= 0 {
        return Err(NoActionReason::NoBudget);
    }
    Ok(budget as f64)
}

/// What the responder can spare of every resource, limited to what its
/// terminal holds.
pub fn surplus_table(commune: &mut Commune) -> BTreeMap<Resource, u32> {
    let held = commune.state().terminal.clone().unwrap_or_default();
    Resource::ALL
        .into_iter()
        .map(|resource| (resource, targets::surplus(commune, resource).min(held.amount(resource))))
        .filter(|(_, amount)| *amount > 0)
        .collect()
}

/// Fulfil the best internal request posted by another zone.
pub fn respond_to_internal(commune: &mut Commune, ctx: &mut TerminalContext<'_>) -> StageResult {
    let budget = match responder_budget(commune) {
        Ok(budget) => budget,
        Err(reason) => return StageResult::NoAction(reason),
    };
    let surplus = surplus_table(commune);
    let name = commune.name().clone();

    let platform = &*ctx.platform;
    let best = select_best(
        budget,
        &surplus,
        ctx.registry.iter().filter(|(_, request)| request.zone != name),
        |to| platform.linear_distance(&name, to),
    );
    let Some(best) = best else {
        return StageResult::NoAction(NoActionReason::NoCandidate);
    };
    let Some(request) = ctx.registry.take(&best.key) else {
        return StageResult::NoAction(NoActionReason::NoCandidate);
    };

    match ctx.platform.send(&name, request.resource, best.amount, &request.zone) {
        Ok(()) => {
            commune.terminal_intended = true;
            info!(
                zone = %name,
                destination = %request.zone,
                resource = %request.resource,
                amount = best.amount,
                score = %best.score,
                "Fulfilled internal request"
            );
            StageResult::Matched(TerminalAction::Send {
                resource: request.resource,
                amount: best.amount,
                destination: request.zone,
                request: RequestKey::Internal(best.key),
            })
        }
        Err(rejection) => {
            warn!(zone = %name, destination = %request.zone, %rejection, "Internal send rejected");
            ctx.registry.insert(best.key, request);
            StageResult::Failed(rejection)
        }
    }
}

/// Fulfil the best request from this tick's ally segment.
pub fn respond_to_allies(commune: &mut Commune, ctx: &mut TerminalContext<'_>) -> StageResult {
    if !ctx.settings.ally_communication {
        return StageResult::NoAction(NoActionReason::AllyCommunicationDisabled);
    }
    if !ctx.allies.is_delivered() {
        return StageResult::NoAction(NoActionReason::NoAllySegment);
    }
    let budget = match responder_budget(commune) {
        Ok(budget) => budget,
        Err(reason) => return StageResult::NoAction(reason),
    };
    let surplus = surplus_table(commune);
    let name = commune.name().clone();

    let platform = &*ctx.platform;
    let best = select_best(budget, &surplus, ctx.allies.iter(), |to| {
        platform.linear_distance(&name, to)
    });
    let Some(best) = best else {
        return StageResult::NoAction(NoActionReason::NoCandidate);
    };
    let Some(request) = ctx.allies.take(&best.key) else {
        return StageResult::NoAction(NoActionReason::NoCandidate);
    };

    match ctx.platform.send(&name, request.resource, best.amount, &request.zone) {
        Ok(()) => {
            commune.terminal_intended = true;
            info!(
                zone = %name,
                destination = %request.zone,
                resource = %request.resource,
                amount = best.amount,
                score = %best.score,
                "Fulfilled ally request"
            );
            StageResult::Matched(TerminalAction::Send {
                resource: request.resource,
                amount: best.amount,
                destination: request.zone,
                request: RequestKey::Allied(best.key),
            })
        }
        Err(rejection) => {
            warn!(zone = %name, destination = %request.zone, %rejection, "Ally send rejected");
            ctx.allies.restore(best.key, request);
            StageResult::Failed(rejection)
        }
    }
}
