//! Bill of materials derived from a computed layout

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::config::HubMode;
use crate::layout::{BoomGeometry, HarnessGraph, VcmUnit};

/// Stocked 6-drop nozzle harnesses, keyed by nozzle spacing in inches
pub const HARNESS_BY_SPACING: [(u32, &str); 6] = [
    (2, "118202-202"),
    (10, "118200-203"),
    (15, "118200-201"),
    (20, "118200-200"),
    (22, "118200-204"),
    (30, "118200-205"),
];

/// Auxiliary connectors on every hub that ship capped
const HUB_AUX_PLUGS: u32 = 2;

/// One row of the parts list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomLine {
    pub part_number: String,
    pub description: String,
    pub quantity: u32,
}

impl BomLine {
    fn new(part_number: impl Into<String>, description: impl Into<String>, quantity: u32) -> Self {
        Self { part_number: part_number.into(), description: description.into(), quantity }
    }
}

/// Inputs the deriver reads; all of it comes from one layout pass
#[derive(Debug, Clone, Copy)]
pub struct BomInput<'a> {
    pub geometry: &'a BoomGeometry,
    pub hub_mode: HubMode,
    pub units: &'a [VcmUnit],
    pub harness: &'a HarnessGraph,
    /// Nozzle indices that need a 5' drop extension
    pub five_foot_drops: &'a [u32],
}

/// Closest stocked harness spacing. Ties go to the smaller spacing.
pub fn nearest_spacing(spacing_in: f64) -> (u32, &'static str) {
    let mut best = HARNESS_BY_SPACING[0];
    for candidate in HARNESS_BY_SPACING {
        let d = (f64::from(candidate.0) - spacing_in).abs();
        let best_d = (f64::from(best.0) - spacing_in).abs();
        if d < best_d {
            best = candidate;
        }
    }
    best
}

/// Extension harness part number for a stocked length, e.g. `150004-020`
pub fn extension_part(feet: u32) -> String {
    format!("150004-{:03}", feet.max(1))
}

/// Derive the ordered parts list. Lines with zero quantity are left out.
pub fn derive(input: &BomInput<'_>) -> Vec<BomLine> {
    let BomInput { geometry, hub_mode, units, harness, five_foot_drops } = *input;
    let mut lines = Vec::new();
    let mut push = |line: BomLine| {
        if line.quantity > 0 {
            lines.push(line);
        }
    };

    match hub_mode {
        HubMode::Lite => push(BomLine::new("123000-130", "Lite Hub", 1)),
        HubMode::Standard => push(BomLine::new("123000-150", "Standard Hub", 1)),
    }

    push(BomLine::new("123300-001", "LeapStart VCM", units.len() as u32));

    let drop_harnesses: u32 = units.iter().map(VcmUnit::drop_harnesses).sum();
    let (spacing, harness_pn) = nearest_spacing(geometry.spacing.raw());
    push(BomLine::new(harness_pn, format!("{spacing}\" 6-Drop Nozzle Harness"), drop_harnesses));

    let drops: BTreeSet<u32> = five_foot_drops
        .iter()
        .copied()
        .filter(|&n| (1..=geometry.total_nozzles).contains(&n))
        .collect();
    push(BomLine::new("118673-001", "5' Nozzle Drop Extension", drops.len() as u32));

    for (feet, qty) in harness.length_counts() {
        push(BomLine::new(extension_part(feet), format!("{feet}' Extension Harness"), qty));
    }

    let unused_drops = (drop_harnesses * crate::layout::defaults::DROPS_PER_HARNESS)
        .saturating_sub(geometry.total_nozzles);
    push(BomLine::new("116200-045", "2-Pin Dust Plug (cap unused drops)", unused_drops));

    push(BomLine::new("150003-005", "VCM Terminator", harness.chains.len() as u32));

    let ports_used = harness.ports_used().len() as u32;
    push(BomLine::new(
        "706530-348",
        "Dust Plug 6-Pin DT",
        u32::from(hub_mode.max_ports()).saturating_sub(ports_used),
    ));
    push(BomLine::new("706530-352", "Dust Plug 4-Pin DT", HUB_AUX_PLUGS));

    crate::log::debug!(lines = lines.len(), drop_harnesses, "derived bill of materials");
    lines
}

/// Plain-text parts table
pub struct BomTable<'a>(pub &'a [BomLine]);

impl fmt::Display for BomTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.0 {
            writeln!(
                f,
                "{:<10}  {:<36}  {:>3}",
                line.part_number, line.description, line.quantity
            )?;
        }
        Ok(())
    }
}
