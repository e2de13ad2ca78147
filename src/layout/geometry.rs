//! Geometry resolver: raw boom parameters → validated boom model

use std::fmt;

use glam::DVec2;

use crate::config::{BoomConfig, FoldOffsets};
use crate::errors::{GeometryError, Warning};
use crate::types::{DrawingScale, Inches, NozzlePos};

use super::defaults;

/// Fold hinges, in nesting order from the boom tip inward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FoldKind {
    Breakaway,
    Outer,
    Inner,
    Primary,
}

impl FoldKind {
    /// Priority order used when accepting folds
    pub const ALL: [FoldKind; 4] =
        [FoldKind::Breakaway, FoldKind::Outer, FoldKind::Inner, FoldKind::Primary];

    fn raw(self, folds: &FoldOffsets) -> i64 {
        match self {
            FoldKind::Breakaway => folds.breakaway,
            FoldKind::Outer => folds.outer,
            FoldKind::Inner => folds.inner,
            FoldKind::Primary => folds.primary,
        }
    }

    fn tier(self) -> f64 {
        match self {
            FoldKind::Breakaway => defaults::BREAKAWAY_TIER,
            FoldKind::Outer => defaults::OUTER_TIER,
            FoldKind::Inner => defaults::INNER_TIER,
            FoldKind::Primary => defaults::PRIMARY_TIER,
        }
    }
}

impl fmt::Display for FoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FoldKind::Breakaway => "Breakaway",
            FoldKind::Outer => "Outer",
            FoldKind::Inner => "Inner",
            FoldKind::Primary => "Primary",
        };
        f.write_str(name)
    }
}

/// An accepted fold and its mirrored hinge positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fold {
    pub kind: FoldKind,
    /// Nozzles from each boom end
    pub offset: u32,
    pub left: NozzlePos,
    pub right: NozzlePos,
}

/// Where the hub sits relative to the boom centre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubPlacement {
    Center,
    LeftOfCenter,
    RightOfCenter,
}

/// Resolved boom model
#[derive(Debug, Clone, PartialEq)]
pub struct BoomGeometry {
    pub total_nozzles: u32,
    pub spacing: Inches,
    /// Accepted folds in priority order (breakaway first)
    pub folds: Vec<Fold>,
    /// Explicit gateway nozzle, if one was set
    pub gateway: Option<u32>,
    /// Hub position in nozzle-equivalents
    pub hub: NozzlePos,
}

impl BoomGeometry {
    /// Boom centre in nozzle-equivalents (between the two middle nozzles
    /// for an even count).
    pub fn center(&self) -> NozzlePos {
        NozzlePos(f64::from(self.total_nozzles) / 2.0 + 0.5)
    }

    pub fn fold(&self, kind: FoldKind) -> Option<&Fold> {
        self.folds.iter().find(|f| f.kind == kind)
    }

    /// All hinge positions, both sides
    pub fn crossing_points(&self) -> impl Iterator<Item = NozzlePos> + '_ {
        self.folds.iter().flat_map(|f| [f.left, f.right])
    }

    /// Hinges strictly between two positions
    pub fn crossings_between(&self, a: NozzlePos, b: NozzlePos) -> usize {
        self.crossing_points().filter(|p| p.strictly_between(a, b)).count()
    }

    /// Physical boom width in feet
    pub fn width_feet(&self) -> f64 {
        self.spacing.span_feet(f64::from(self.total_nozzles)).raw()
    }

    /// Hub side relative to centre. Only an explicit gateway moves the hub
    /// off-centre.
    pub fn hub_placement(&self) -> HubPlacement {
        let Some(gateway) = self.gateway else {
            return HubPlacement::Center;
        };
        let half = f64::from(self.total_nozzles) / 2.0;
        let g = f64::from(gateway);
        if g < half {
            HubPlacement::LeftOfCenter
        } else if g > half {
            HubPlacement::RightOfCenter
        } else {
            HubPlacement::Center
        }
    }

    /// Drawing-space fold outline, tip → primary on each side. Only a boom
    /// with an active primary fold has a raised profile.
    pub fn profile(&self, scale: &DrawingScale) -> Option<BoomProfile> {
        let primary = self.fold(FoldKind::Primary)?;

        let side = |hinge: fn(&Fold) -> NozzlePos, tip: NozzlePos| -> Vec<DVec2> {
            let mut pts = vec![scale.point(hinge(primary), FoldKind::Primary.tier())];
            for kind in [FoldKind::Inner, FoldKind::Outer, FoldKind::Breakaway] {
                if let Some(fold) = self.fold(kind) {
                    pts.push(scale.point(hinge(fold), kind.tier()));
                }
            }
            pts.push(scale.point(tip, defaults::TIP_TIER));
            pts
        };

        Some(BoomProfile {
            left: side(|f: &Fold| f.left, NozzlePos(0.5)),
            right: side(|f: &Fold| f.right, NozzlePos(f64::from(self.total_nozzles) + 0.5)),
            hub_x: scale.x(self.hub),
        })
    }
}

/// Fold outline for a renderer: points run from the primary hinge out to the tip
#[derive(Debug, Clone, PartialEq)]
pub struct BoomProfile {
    pub left: Vec<DVec2>,
    pub right: Vec<DVec2>,
    pub hub_x: f64,
}

/// Resolve raw parameters into a [`BoomGeometry`].
///
/// Out-of-range values are clamped or dropped with a warning; only a missing
/// nozzle count is fatal.
pub fn resolve(
    config: &BoomConfig,
    warnings: &mut Vec<Warning>,
) -> Result<BoomGeometry, GeometryError> {
    let raw_total = config.total_nozzles;
    if raw_total < 1 {
        crate::log::warn!(raw = raw_total, "no nozzles, refusing to lay out boom");
        return Err(GeometryError::NoNozzles { raw: raw_total });
    }
    let total = u32::try_from(raw_total).unwrap_or(u32::MAX).min(defaults::MAX_NOZZLES);
    if i64::from(total) != raw_total {
        warnings.push(Warning::NozzleCountClamped { raw: raw_total, clamped: total });
    }

    let spacing = match Inches::try_positive(config.nozzle_spacing) {
        Ok(s) => s,
        Err(_) => {
            // an unset spacing is routine; only flag values someone typed
            if config.nozzle_spacing != 0.0 {
                warnings.push(Warning::SpacingDefaulted {
                    raw: config.nozzle_spacing,
                    assumed: defaults::DEFAULT_SPACING_IN,
                });
            }
            Inches(defaults::DEFAULT_SPACING_IN)
        }
    };

    let folds = accept_folds(&config.folds, total, warnings);

    let gateway = match config.gateway_mount {
        g if g <= 0 => None,
        g if g > i64::from(total) => {
            warnings.push(Warning::GatewayClamped { raw: g, clamped: total });
            Some(total)
        }
        // bounded by total above
        g => Some(g as u32),
    };

    let center = NozzlePos(f64::from(total) / 2.0 + 0.5);
    let primary = folds.iter().find(|f| f.kind == FoldKind::Primary);
    let hub = match (gateway, primary) {
        (Some(g), _) => NozzlePos::at(g),
        (None, Some(p)) => p.left.midpoint(p.right),
        (None, None) => center,
    };

    crate::log::debug!(
        total,
        spacing = spacing.raw(),
        folds = folds.len(),
        hub = hub.raw(),
        "resolved boom geometry"
    );

    Ok(BoomGeometry { total_nozzles: total, spacing, folds, gateway, hub })
}

/// Drop folds at or past half the boom, then keep only folds that nest
/// strictly inside every fold accepted before them.
fn accept_folds(raw: &FoldOffsets, total: u32, warnings: &mut Vec<Warning>) -> Vec<Fold> {
    let half = f64::from(total) / 2.0;
    let mut accepted: Vec<Fold> = Vec::new();
    let mut deepest: i64 = 0;

    for kind in FoldKind::ALL {
        let value = kind.raw(raw);
        if value <= 0 {
            continue;
        }
        if (value as f64) >= half {
            warnings.push(Warning::FoldDiscarded { fold: kind, value, total });
            continue;
        }
        if value <= deepest {
            crate::log::debug!(fold = %kind, value, deepest, "fold does not nest, not drawn");
            continue;
        }
        deepest = value;
        // bounded by half of total above
        let offset = value as u32;
        accepted.push(Fold {
            kind,
            offset,
            left: NozzlePos(f64::from(offset) + 0.5),
            right: NozzlePos(f64::from(total - offset) + 0.5),
        });
    }
    accepted
}
