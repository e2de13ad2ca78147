//! Harness graph builder: hub-outward daisy chains and extension lengths
//!
//! Every port wires two independent chains, one per side of the hub. Each
//! chain starts with a hub → nearest-unit extension and continues unit to
//! unit outward; the outermost unit carries the chain terminator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::OverrideParseError;
use crate::types::{Feet, NozzlePos};

use super::allocate::{Side, VcmUnit};
use super::defaults;
use super::geometry::BoomGeometry;

const HUB_TOKEN: &str = "hub";
const VCM_PREFIX: &str = "vcm:";

// ============================================================================
// Edge identity and overrides
// ============================================================================

/// Canonical extension id: sorted endpoint tokens joined with `->`
///
/// Tokens are `hub` or `vcm:<mount>`, so an id names a physical run between
/// two mount points rather than a particular port or label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeId(String);

impl EdgeId {
    fn from_tokens(a: &str, b: &str) -> EdgeId {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        EdgeId(format!("{lo}->{hi}"))
    }

    pub fn between(a: &Node, b: &Node) -> EdgeId {
        EdgeId::from_tokens(&a.token(), &b.token())
    }

    /// Parse a user or stored id. Accepts `->` and `<->` separators and
    /// endpoints in either order.
    pub fn parse(raw: &str) -> Option<EdgeId> {
        let raw = raw.trim();
        let (a, b) = raw.split_once("<->").or_else(|| raw.split_once("->"))?;
        let a = canonical_token(a)?;
        let b = canonical_token(b)?;
        Some(EdgeId::from_tokens(&a, &b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonical_token(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(HUB_TOKEN) {
        return Some(HUB_TOKEN.to_string());
    }
    let pos = raw.strip_prefix(VCM_PREFIX)?.trim().parse::<f64>().ok()?;
    pos.is_finite().then(|| format!("{VCM_PREFIX}{}", NozzlePos(pos)))
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EdgeId {
    type Error = OverrideParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        EdgeId::parse(&raw).ok_or(OverrideParseError::BadEdgeId { raw })
    }
}

impl From<EdgeId> for String {
    fn from(id: EdgeId) -> String {
        id.0
    }
}

/// Validate a user-chosen length: rounded to the nearest foot, at least 1.
pub fn override_feet(edge: &EdgeId, value: f64) -> Result<u32, OverrideParseError> {
    if !value.is_finite() {
        return Err(OverrideParseError::NotNumeric {
            edge: edge.to_string(),
            value: value.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(OverrideParseError::NotPositive { edge: edge.to_string(), value });
    }
    // saturating float → int cast
    Ok((value.round() as u32).max(1))
}

/// User-chosen extension lengths, keyed by edge id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionOverrides(BTreeMap<EdgeId, u32>);

impl ExtensionOverrides {
    pub fn insert(&mut self, id: EdgeId, feet: u32) {
        self.0.insert(id, feet.max(1));
    }

    pub fn remove(&mut self, id: &EdgeId) -> Option<u32> {
        self.0.remove(id)
    }

    pub fn get(&self, id: &EdgeId) -> Option<u32> {
        self.0.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Graph types
// ============================================================================

/// Edge endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Hub { port: u8 },
    Vcm { unit: usize, label: String, mount: NozzlePos },
}

impl Node {
    fn for_unit(index: usize, unit: &VcmUnit) -> Node {
        Node::Vcm { unit: index, label: unit.label(), mount: unit.mount }
    }

    pub fn token(&self) -> String {
        match self {
            Node::Hub { .. } => HUB_TOKEN.to_string(),
            Node::Vcm { mount, .. } => format!("{VCM_PREFIX}{mount}"),
        }
    }

    pub fn position(&self, hub: NozzlePos) -> NozzlePos {
        match self {
            Node::Hub { .. } => hub,
            Node::Vcm { mount, .. } => *mount,
        }
    }

    pub fn is_hub(&self) -> bool {
        matches!(self, Node::Hub { .. })
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Hub { port } => write!(f, "Hub (Port {port})"),
            Node::Vcm { label, .. } => write!(f, "VCM {label}"),
        }
    }
}

/// One extension harness run
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessEdge {
    pub id: EdgeId,
    pub port: u8,
    pub side: Side,
    pub from: Node,
    pub to: Node,
    /// Length the estimator produced
    pub computed_ft: u32,
    /// Length to order: the override when present, else `computed_ft`
    pub length_ft: u32,
    pub overridden: bool,
}

impl HarnessEdge {
    /// Position halfway along the run, for left-to-right listings
    pub fn midpoint(&self, hub: NozzlePos) -> NozzlePos {
        self.from.position(hub).midpoint(self.to.position(hub))
    }
}

/// Units on one side of one port, closest to the hub first
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub port: u8,
    pub side: Side,
    /// Indices into the unit list
    pub units: Vec<usize>,
}

impl Chain {
    /// The outermost unit, which takes the terminator
    pub fn terminal(&self) -> Option<usize> {
        self.units.last().copied()
    }
}

/// Harness graph output
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarnessGraph {
    pub chains: Vec<Chain>,
    pub edges: Vec<HarnessEdge>,
    /// Labels of units that carry a chain terminator
    pub terminators: BTreeSet<String>,
}

impl HarnessGraph {
    /// Edge count per ordered length, shortest first
    pub fn length_counts(&self) -> BTreeMap<u32, u32> {
        let mut counts = BTreeMap::new();
        for edge in &self.edges {
            *counts.entry(edge.length_ft).or_insert(0) += 1;
        }
        counts
    }

    /// Ports with at least one chain
    pub fn ports_used(&self) -> BTreeSet<u8> {
        self.chains.iter().map(|c| c.port).collect()
    }
}

// ============================================================================
// Building
// ============================================================================

/// Estimated extension length between two boom positions.
///
/// Straight run at the nozzle spacing, plus a service loop when the run
/// leaves the hub and slack for every fold hinge crossed, rounded up to the
/// next stocked length.
pub fn estimate_feet(geometry: &BoomGeometry, a: NozzlePos, b: NozzlePos, from_hub: bool) -> u32 {
    let mut run = geometry.spacing.span_feet(a.distance(b)).raw();
    if from_hub {
        run += defaults::HUB_SERVICE_LOOP_FT;
    }
    run += geometry.crossings_between(a, b) as f64 * defaults::FOLD_CROSSING_FT;
    Feet(run).round_up_to(defaults::EXTENSION_STEP_FT)
}

/// Split units into per-port, per-side chains ordered hub outward.
pub fn chains(units: &[VcmUnit], hub: NozzlePos) -> Vec<Chain> {
    let mut by_port: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (index, unit) in units.iter().enumerate() {
        by_port.entry(unit.port).or_default().push(index);
    }

    let mut out = Vec::new();
    for (port, members) in by_port {
        let (mut left, mut right): (Vec<usize>, Vec<usize>) =
            members.into_iter().partition(|&i| units[i].side(hub) == Side::Left);

        // stable: equal mounts keep allocation order
        left.sort_by(|&a, &b| units[b].mount.total_cmp(&units[a].mount));
        right.sort_by(|&a, &b| units[a].mount.total_cmp(&units[b].mount));

        for (side, list) in [(Side::Left, left), (Side::Right, right)] {
            if !list.is_empty() {
                out.push(Chain { port, side, units: list });
            }
        }
    }
    out
}

/// Build the harness graph for an allocation.
pub fn build(
    units: &[VcmUnit],
    geometry: &BoomGeometry,
    overrides: &ExtensionOverrides,
) -> HarnessGraph {
    let hub = geometry.hub;
    let chains = chains(units, hub);
    let mut edges = Vec::new();
    let mut terminators = BTreeSet::new();

    for chain in &chains {
        let mut prev = Node::Hub { port: chain.port };
        for &index in &chain.units {
            let next = Node::for_unit(index, &units[index]);
            edges.push(make_edge(chain, prev, next.clone(), geometry, overrides));
            prev = next;
        }
        if let Some(last) = chain.terminal() {
            terminators.insert(units[last].label());
        }
    }

    crate::log::debug!(
        chains = chains.len(),
        edges = edges.len(),
        terminators = terminators.len(),
        "built harness graph"
    );

    HarnessGraph { chains, edges, terminators }
}

fn make_edge(
    chain: &Chain,
    from: Node,
    to: Node,
    geometry: &BoomGeometry,
    overrides: &ExtensionOverrides,
) -> HarnessEdge {
    let id = EdgeId::between(&from, &to);
    let computed_ft = estimate_feet(
        geometry,
        from.position(geometry.hub),
        to.position(geometry.hub),
        from.is_hub() || to.is_hub(),
    );
    let override_ft = overrides.get(&id);
    if let Some(ft) = override_ft {
        crate::log::debug!(edge = %id, computed_ft, override_ft = ft, "using extension override");
    }

    HarnessEdge {
        id,
        port: chain.port,
        side: chain.side,
        from,
        to,
        computed_ft,
        length_ft: override_ft.unwrap_or(computed_ft),
        overridden: override_ft.is_some(),
    }
}
