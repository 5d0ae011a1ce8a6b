//! World constants the economy formulas depend on.

/// Energy a link can move in one transfer.
pub const LINK_CAPACITY: u32 = 800;

/// Fraction of every link transfer lost in transit.
pub const LINK_LOSS_RATIO: f64 = 0.03;

/// Distance scale of the terminal transfer fee curve.
pub const TRANSFER_FEE_RANGE: f64 = 30.0;

/// Threat level at which threat-only ramparts are maintained.
pub const THREAT_RAMPARTS_THRESHOLD: u32 = 20_000;

/// Rampart hit target used when the escalation formula yields nothing.
pub const DEFAULT_MIN_RAMPART_HITS: u64 = 20_000;

/// Upgrade strength assumed when no upgrade structure is available.
pub const NUDE_UPGRADE_STRENGTH: f64 = 100.0;

/// Share of link throughput credited to upgrading.
pub const LINK_UPGRADE_SHARE: f64 = 0.7;

/// Ticks a terminal rests after any transfer or deal.
pub const TERMINAL_COOLDOWN: u32 = 10;

/// Maximum rampart hits per control level.
pub const fn rampart_hits_max(level: u8) -> Option<u64> {
    match level {
        2 => Some(300_000),
        3 => Some(1_000_000),
        4 => Some(3_000_000),
        5 => Some(10_000_000),
        6 => Some(30_000_000),
        7 => Some(100_000_000),
        8 => Some(300_000_000),
        _ => None,
    }
}

/// Ticks until an untended controller loses a level.
pub const fn controller_downgrade(level: u8) -> Option<u32> {
    match level {
        1 => Some(20_000),
        2 => Some(10_000),
        3 => Some(20_000),
        4 => Some(40_000),
        5 => Some(80_000),
        6 => Some(120_000),
        7 => Some(150_000),
        8 => Some(200_000),
        _ => None,
    }
}
