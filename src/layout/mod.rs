//! Boom layout pipeline
//!
//! This module is organized into submodules:
//! - `defaults`: Fixed limits, allowances and drawing tiers
//! - `geometry`: Geometry resolver (nozzle count, folds, hub position)
//! - `allocate`: VCM allocator (nozzle ranges, mount positions)
//! - `harness`: Harness graph builder (chains, extension lengths, terminators)
//!
//! [`compute`] runs every stage in one synchronous pass. Nothing is carried
//! between passes except what the caller passes in.

pub mod allocate;
pub mod defaults;
pub mod geometry;
pub mod harness;

pub use allocate::{Side, VcmUnit};
pub use geometry::{BoomGeometry, BoomProfile, Fold, FoldKind, HubPlacement};
pub use harness::{Chain, EdgeId, ExtensionOverrides, HarnessEdge, HarnessGraph, Node};

use std::collections::BTreeSet;

use crate::bom::{self, BomLine};
use crate::config::{BoomConfig, HubMode};
use crate::errors::{GeometryError, Warning};
use crate::types::NozzlePos;

/// Everything derived from one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub geometry: BoomGeometry,
    pub hub_mode: HubMode,
    /// Units in port/slot allocation order
    pub units: Vec<VcmUnit>,
    pub harness: HarnessGraph,
    pub bom: Vec<BomLine>,
    /// Soft failures from every stage, in pipeline order
    pub warnings: Vec<Warning>,
}

impl Layout {
    pub fn hub(&self) -> NozzlePos {
        self.geometry.hub
    }

    pub fn edges(&self) -> &[HarnessEdge] {
        &self.harness.edges
    }

    pub fn terminators(&self) -> &BTreeSet<String> {
        &self.harness.terminators
    }

    /// Units sorted left to right by mount position (installer order)
    pub fn units_left_to_right(&self) -> Vec<&VcmUnit> {
        let mut ordered: Vec<&VcmUnit> = self.units.iter().collect();
        ordered.sort_by(|a, b| a.mount.total_cmp(&b.mount));
        ordered
    }

    /// Edges sorted left to right by run midpoint
    pub fn edges_left_to_right(&self) -> Vec<&HarnessEdge> {
        let hub = self.hub();
        let mut ordered: Vec<&HarnessEdge> = self.harness.edges.iter().collect();
        ordered.sort_by(|a, b| a.midpoint(hub).total_cmp(&b.midpoint(hub)));
        ordered
    }

    pub fn unit(&self, label: &str) -> Option<&VcmUnit> {
        self.units.iter().find(|u| u.label() == label)
    }
}

/// Run the full pipeline: geometry → allocation → harness graph → BOM.
///
/// Only a missing nozzle count aborts; everything else degrades to a
/// best-effort layout with warnings.
pub fn compute(config: &BoomConfig) -> Result<Layout, GeometryError> {
    let mut warnings = Vec::new();

    let geometry = geometry::resolve(config, &mut warnings)?;
    let units = allocate::allocate(config, &geometry, &mut warnings);
    let harness = harness::build(&units, &geometry, &config.extension_overrides);
    let bom = bom::derive(&bom::BomInput {
        geometry: &geometry,
        hub_mode: config.hub_mode,
        units: &units,
        harness: &harness,
        five_foot_drops: &config.five_foot_drops,
    });

    crate::log::debug!(
        units = units.len(),
        edges = harness.edges.len(),
        bom_lines = bom.len(),
        warnings = warnings.len(),
        "layout pass complete"
    );
    crate::log::report("layout", &warnings);

    Ok(Layout { geometry, hub_mode: config.hub_mode, units, harness, bom, warnings })
}
