//! Fixed limits and allowances for boom layout

/// Largest boom the resolver accepts
pub const MAX_NOZZLES: u32 = 200;

/// Spacing assumed when none is entered
pub const DEFAULT_SPACING_IN: f64 = 20.0;

/// VCM groups at or below this many nozzles mount at their hub-side end
pub const SIX_DROP_LIMIT: u32 = 6;

/// Nozzle drops carried by one drop harness
pub const DROPS_PER_HARNESS: u32 = 6;

/// Service loop added to every run that starts at the hub
pub const HUB_SERVICE_LOOP_FT: f64 = 5.0;

/// Slack for crossing one fold hinge
pub const FOLD_CROSSING_FT: f64 = 4.0;

/// Extension harnesses are stocked in these increments
pub const EXTENSION_STEP_FT: u32 = 5;

/// Tier heights for the drawn fold profile (fraction of full height)
pub const PRIMARY_TIER: f64 = 1.0;
pub const INNER_TIER: f64 = 0.6;
pub const OUTER_TIER: f64 = 0.4;
pub const BREAKAWAY_TIER: f64 = 0.15;
pub const TIP_TIER: f64 = 0.1;
