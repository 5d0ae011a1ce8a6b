//! Market trading: buy what a zone lacks, sell what it has too much of.
//!
//! Runs only when no request was answered. For each governed resource the
//! zone is eligible for, in table order, terminal stock below the minimum
//! triggers a buy and stock above the maximum triggers a sell. The first
//! deal or order created ends the pass.
//!
//! Buying and selling follow the same steps. Our open orders for the
//! resource count towards the need. If the rest is at most half the
//! target, nothing happens. Otherwise we deal against the best visible
//! order. Failing that, and if we have no open order and are under the
//! order ceiling, we post a standing order at a markup (buy) or a discount
//! (sell) on the average price.

use commune_types::{OrderDirection, Resource, StandingOrderRequest, TerminalAction, ZoneName};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::commune::Commune;
use crate::targets;
use crate::terminal::{NoActionReason, StageResult, TerminalContext};
use crate::transaction::largest_transaction_amount;

/// `1.2`: inflation of the minimum when buying, and the buy price markup.
const BUY_MARKUP: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// `0.8`: sell price discount.
const SELL_DISCOUNT: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Buy and sell what the zone is short of or long on.
pub fn manage_resources(commune: &mut Commune, ctx: &mut TerminalContext<'_>) -> StageResult {
    if !ctx.settings.market_usage {
        return StageResult::NoAction(NoActionReason::MarketDisabled);
    }
    if !ctx.platform.market_functional() {
        return StageResult::NoAction(NoActionReason::MarketUnavailable);
    }
    let Some(terminal) = commune.state().terminal.clone() else {
        return StageResult::NoAction(NoActionReason::NoTerminal);
    };
    let name = commune.name().clone();
    let terminal_energy = terminal.amount(Resource::Energy);

    let mut outcome = StageResult::NoAction(NoActionReason::NothingToTrade);
    for target in targets::targets(commune) {
        if !target.eligible {
            continue;
        }
        let stock = f64::from(terminal.amount(target.resource));

        let attempt = if stock < f64::from(target.min) {
            if ctx.platform.credits() < ctx.settings.min_credits {
                debug!(zone = %name, resource = %target.resource, "Too few credits to buy");
                continue;
            }
            let min = f64::from(target.min) * 1.2;
            advanced_buy(ctx, &name, target.resource, min - stock, min, terminal_energy)
        } else if stock > f64::from(target.max) {
            let max = f64::from(target.max) * 0.8;
            advanced_sell(ctx, &name, target.resource, stock - max, max, terminal_energy)
        } else {
            continue;
        };

        if let StageResult::Failed(rejection) = &attempt {
            warn!(zone = %name, resource = %target.resource, %rejection, "Market trade rejected");
        }
        match attempt {
            StageResult::Matched(_) => {
                commune.terminal_intended = true;
                return attempt;
            }
            StageResult::Failed(_) => outcome = attempt,
            StageResult::NoAction(_) => {
                if !matches!(outcome, StageResult::Failed(_)) {
                    outcome = attempt;
                }
            }
        }
    }
    outcome
}

/// Acquire `amount` of `resource`, aiming for `target` in stock.
pub fn advanced_buy(
    ctx: &mut TerminalContext<'_>,
    zone: &ZoneName,
    resource: Resource,
    amount: f64,
    target: f64,
    terminal_energy: u32,
) -> StageResult {
    advanced_trade(ctx, zone, OrderDirection::Buy, resource, amount, target, terminal_energy)
}

/// Dispose of `amount` of `resource`, aiming for `target` in stock.
pub fn advanced_sell(
    ctx: &mut TerminalContext<'_>,
    zone: &ZoneName,
    resource: Resource,
    amount: f64,
    target: f64,
    terminal_energy: u32,
) -> StageResult {
    advanced_trade(ctx, zone, OrderDirection::Sell, resource, amount, target, terminal_energy)
}

#[allow(clippy::cast_precision_loss)]
fn advanced_trade(
    ctx: &mut TerminalContext<'_>,
    zone: &ZoneName,
    direction: OrderDirection,
    resource: Resource,
    amount: f64,
    target: f64,
    terminal_energy: u32,
) -> StageResult {
    let open_orders = ctx.platform.my_orders(zone, direction, resource);
    let open: u64 = open_orders
        .iter()
        .fold(0_u64, |total, order| total.saturating_add(u64::from(order.remaining)));
    let need = amount - open as f64;
    if need <= target * 0.5 {
        return StageResult::NoAction(NoActionReason::AlreadyCovered);
    }
    let need = whole_units(need);

    let average = ctx.platform.average_price(resource);
    let visible = match direction {
        OrderDirection::Buy => {
            let Some(ceiling) = average.and_then(|avg| avg.checked_mul(BUY_MARKUP)) else {
                return StageResult::NoAction(NoActionReason::NoPriceHistory);
            };
            ctx.platform.best_sell_order(resource, Some(ceiling))
        }
        OrderDirection::Sell => ctx.platform.best_buy_order(resource, None),
    };

    if let Some(order) = visible {
        let distance = ctx.platform.linear_distance(zone, &order.zone);
        let affordable = largest_transaction_amount(f64::from(terminal_energy) * 0.75, need, distance);
        let deal_amount = affordable.min(order.remaining);
        if deal_amount == 0 {
            return StageResult::NoAction(NoActionReason::NoBudget);
        }
        return match ctx.platform.deal(order.id, deal_amount, zone) {
            Ok(()) => {
                info!(
                    zone = %zone,
                    %resource,
                    ?direction,
                    amount = deal_amount,
                    price = %order.price,
                    "Dealt on market"
                );
                StageResult::Matched(TerminalAction::Deal {
                    order: order.id,
                    resource,
                    direction,
                    amount: deal_amount,
                })
            }
            Err(rejection) => StageResult::Failed(rejection),
        };
    }

    if !open_orders.is_empty() {
        return StageResult::NoAction(NoActionReason::OrderPending);
    }
    if ctx.platform.order_count() >= ctx.settings.max_standing_orders {
        return StageResult::NoAction(NoActionReason::OrderCeiling);
    }

    let factor = match direction {
        OrderDirection::Buy => BUY_MARKUP,
        OrderDirection::Sell => SELL_DISCOUNT,
    };
    let Some(price) = average.and_then(|avg| avg.checked_mul(factor)) else {
        return StageResult::NoAction(NoActionReason::NoPriceHistory);
    };

    let request = StandingOrderRequest {
        zone: zone.clone(),
        direction,
        resource,
        price,
        amount: need,
    };
    match ctx.platform.create_order(&request) {
        Ok(id) => {
            info!(zone = %zone, %resource, ?direction, amount = need, %price, order = %id, "Created standing order");
            StageResult::Matched(TerminalAction::CreateOrder(request))
        }
        Err(rejection) => StageResult::Failed(rejection),
    }
}

/// Floor a positive quantity into whole units.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_units(value: f64) -> u32 {
    value.floor().clamp(0.0, f64::from(u32::MAX)) as u32
}
