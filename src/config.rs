//! Boom configuration schema (v1) and normalisation.
//!
//! `BoomConfig` is the single input to a layout pass. It serialises in the
//! flat camelCase contract; loading always goes through [`normalize`], which
//! never fails and fills every missing or malformed field with its default.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{OverrideParseError, Warning};
use crate::layout::defaults::MAX_NOZZLES;
use crate::layout::harness::{EdgeId, ExtensionOverrides, override_feet};

/// Current schema version written on save
pub const SCHEMA_VERSION: u32 = 1;

/// Valid range for a slot's manual mount shift, in nozzle pitches
pub const MAX_SHIFT: i32 = 6;

/// VCM slots per hub port
pub const SLOTS_PER_PORT: u8 = 3;

/// Hub variant; decides how many ports can carry VCM chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubMode {
    Lite,
    #[default]
    Standard,
}

impl HubMode {
    pub fn max_ports(self) -> u8 {
        match self {
            HubMode::Lite => 4,
            HubMode::Standard => 8,
        }
    }

    /// Anything other than `lite` is a standard hub.
    pub fn from_name(name: &str) -> HubMode {
        if name.trim().eq_ignore_ascii_case("lite") {
            HubMode::Lite
        } else {
            HubMode::Standard
        }
    }
}

/// Raw fold offsets, counted in nozzles from each boom end (0 = unused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldOffsets {
    pub breakaway: i64,
    pub outer: i64,
    pub inner: i64,
    pub primary: i64,
}

/// Sizing and manual offset for one VCM slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub nozzles: u32,
    pub shift: i32,
}

impl SlotConfig {
    /// A slot never asks for more nozzles than the largest boom holds.
    pub fn new(nozzles: u32, shift: i32) -> Self {
        SlotConfig {
            nozzles: nozzles.min(MAX_NOZZLES),
            shift: shift.clamp(-MAX_SHIFT, MAX_SHIFT),
        }
    }
}

/// The three VCM slots on one hub port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortRow {
    pub v1: SlotConfig,
    pub v2: SlotConfig,
    pub v3: SlotConfig,
}

impl PortRow {
    pub fn slots(&self) -> [SlotConfig; 3] {
        [self.v1, self.v2, self.v3]
    }

    /// Slot by 1-based sequence number
    pub fn slot_mut(&mut self, seq: u8) -> Option<&mut SlotConfig> {
        match seq {
            1 => Some(&mut self.v1),
            2 => Some(&mut self.v2),
            3 => Some(&mut self.v3),
            _ => None,
        }
    }

    pub fn configured_nozzles(&self) -> u32 {
        self.slots().iter().fold(0, |acc, s| acc.saturating_add(s.nozzles))
    }
}

/// Last generated install instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallSteps {
    pub version: u32,
    pub content: String,
    pub source: String,
}

impl Default for InstallSteps {
    fn default() -> Self {
        InstallSteps { version: 0, content: String::new(), source: "auto".to_string() }
    }
}

/// Full boom configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoomConfig {
    pub schema_version: u32,
    pub name: String,
    pub make: String,
    pub model: String,
    /// Raw nozzle count as entered; the geometry resolver validates it
    pub total_nozzles: i64,
    /// Inches between nozzles; 0 means "not entered"
    pub nozzle_spacing: f64,
    pub folds: FoldOffsets,
    /// Nozzle the hub/gateway mounts at, 0 = automatic
    pub gateway_mount: i64,
    pub hub_mode: HubMode,
    pub ports: BTreeMap<u8, PortRow>,
    pub extension_overrides: ExtensionOverrides,
    /// Nozzles that need a 5' drop extension
    pub five_foot_drops: Vec<u32>,
    pub install_steps: InstallSteps,
}

impl Default for BoomConfig {
    fn default() -> Self {
        BoomConfig {
            schema_version: SCHEMA_VERSION,
            name: String::new(),
            make: String::new(),
            model: String::new(),
            total_nozzles: 0,
            nozzle_spacing: 0.0,
            folds: FoldOffsets::default(),
            gateway_mount: 0,
            hub_mode: HubMode::default(),
            ports: BTreeMap::new(),
            extension_overrides: ExtensionOverrides::default(),
            five_foot_drops: Vec::new(),
            install_steps: InstallSteps::default(),
        }
    }
}

impl BoomConfig {
    /// Boom geometry a reset returns to: 54 nozzles at 20", nested
    /// breakaway/inner/primary folds, no VCMs.
    pub fn reset_geometry() -> Self {
        BoomConfig {
            total_nozzles: 54,
            nozzle_spacing: 20.0,
            folds: FoldOffsets { breakaway: 4, outer: 0, inner: 12, primary: 24 },
            ..Default::default()
        }
    }

    /// [`BoomConfig::reset_geometry`] with the usual five-VCM starter fill.
    pub fn starter() -> Self {
        let mut config = Self::reset_geometry();
        for (port, seq, nozzles) in [(1, 1, 12), (1, 2, 12), (2, 1, 6), (3, 1, 12), (3, 2, 12)] {
            config.set_slot(port, seq, nozzles, 0);
        }
        config
    }

    /// Set one slot, creating the port row if needed. Out-of-range ports or
    /// sequence numbers are ignored.
    pub fn set_slot(&mut self, port: u8, seq: u8, nozzles: u32, shift: i32) {
        if !(1..=8).contains(&port) {
            return;
        }
        if let Some(slot) = self.ports.entry(port).or_default().slot_mut(seq) {
            *slot = SlotConfig::new(nozzles, shift);
        }
    }

    /// Rows for ports the current hub mode actually exposes, ascending.
    pub fn active_ports(&self) -> impl Iterator<Item = (u8, PortRow)> + '_ {
        let max = self.hub_mode.max_ports();
        (1..=max).map(move |p| (p, self.ports.get(&p).copied().unwrap_or_default()))
    }

    /// Sum of nozzles requested across active ports
    pub fn configured_nozzles(&self) -> u32 {
        self.active_ports()
            .fold(0, |acc, (_, row)| acc.saturating_add(row.configured_nozzles()))
    }

    /// Parse and normalise a stored config. Never fails: unreadable text
    /// yields the default config plus a warning.
    pub fn load(text: &str) -> Normalized {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => normalize(&value),
            Err(e) => {
                crate::log::warn!(error = %e, "unreadable boom config, using defaults");
                Normalized {
                    config: BoomConfig::default(),
                    warnings: vec![Warning::UnreadableConfig { reason: e.to_string() }],
                }
            }
        }
    }

    pub fn to_json(&self) -> String {
        // plain data with string keys; serialisation cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for BoomConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(normalize(&value).config)
    }
}

/// A normalised config plus everything that had to be dropped or defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub config: BoomConfig,
    pub warnings: Vec<Warning>,
}

// ============================================================================
// Normalisation
// ============================================================================

/// Build a [`BoomConfig`] from any JSON value.
///
/// Accepts the flat contract (`totalNozzles`, `ports`, ...) and the older
/// nested layout (`meta`, `structure`, `vcm`, `extensions`). Flat fields win
/// when both are present.
pub fn normalize(raw: &Value) -> Normalized {
    let mut warnings = Vec::new();
    let mut config = BoomConfig::default();

    if !raw.is_object() {
        crate::log::warn!("boom config is not an object, using defaults");
        return Normalized { config, warnings };
    }

    let found_version = int(first(raw, &[&["schemaVersion"]]));
    if found_version > i64::from(SCHEMA_VERSION) {
        warnings.push(Warning::NewerSchema {
            found: u32::try_from(found_version).unwrap_or(u32::MAX),
            supported: SCHEMA_VERSION,
        });
    }

    config.name = text(first(raw, &[&["name"], &["metadata", "name"]]));
    config.make = text(first(raw, &[&["make"], &["meta", "make"], &["machine", "oem"]]));
    config.model = text(first(raw, &[&["model"], &["meta", "model"], &["machine", "model"]]));

    config.total_nozzles = int(first(raw, &[&["totalNozzles"], &["meta", "totalNozzles"]]));
    config.nozzle_spacing = num(first(
        raw,
        &[&["nozzleSpacing"], &["meta", "nozzleSpacing"], &["machine", "nozzleSpacingIn"]],
    ))
    .unwrap_or(0.0);
    config.gateway_mount = int(first(raw, &[&["gatewayMount"], &["structure", "gatewayMount"]]));

    if let Some(folds) =
        first(raw, &[&["folds"], &["structure", "folds"]]).filter(|v| v.is_object())
    {
        config.folds = FoldOffsets {
            breakaway: int(folds.get("breakaway")),
            outer: int(folds.get("outer")),
            inner: int(folds.get("inner")),
            primary: int(folds.get("primary")),
        };
    }

    config.hub_mode = first(raw, &[&["hubMode"], &["meta", "hubMode"], &["vcm", "mode"]])
        .and_then(Value::as_str)
        .map(HubMode::from_name)
        .unwrap_or_default();

    if let Some(Value::Object(ports)) = first(raw, &[&["ports"], &["vcm", "data"]]) {
        for (key, row) in ports {
            read_port_entry(&mut config, key, row);
        }
    }

    if let Some(Value::Object(overrides)) = first(
        raw,
        &[&["extensionOverrides"], &["extensions", "overrides"], &["overrides"]],
    ) {
        for (key, value) in overrides {
            match read_override(key, value) {
                Ok((id, feet)) => {
                    config.extension_overrides.insert(id, feet);
                }
                Err(e) => warnings.push(e.into()),
            }
        }
    }

    if let Some(Value::Array(drops)) =
        first(raw, &[&["fiveFootDrops"], &["extensions", "fiveFootDrops"]])
    {
        config.five_foot_drops = drops
            .iter()
            .filter_map(|d| num(Some(d)))
            .filter(|n| *n >= 1.0)
            .map(|n| n.trunc() as u32)
            .collect();
    }

    if let Some(steps) = raw.get("installSteps").filter(|v| v.is_object()) {
        config.install_steps = InstallSteps {
            version: u32::try_from(int(steps.get("version"))).unwrap_or(0),
            // kept verbatim, unlike the trimmed header fields
            content: first(steps, &[&["content"], &["contentHtml"]])
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            source: steps
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or("auto")
                .to_string(),
        };
    }

    crate::log::debug!(
        total = config.total_nozzles,
        spacing = config.nozzle_spacing,
        ports = config.ports.len(),
        overrides = config.extension_overrides.len(),
        "normalized boom config"
    );
    crate::log::report("config", &warnings);

    Normalized { config, warnings }
}

/// One entry of the ports map: either `"<port>": {v1, v2, v3}` or the flat
/// `"<port>-<seq>": count | {nozzles, shift}` form.
fn read_port_entry(config: &mut BoomConfig, key: &str, row: &Value) {
    if let Ok(port) = key.trim().parse::<u8>() {
        if let Value::Object(_) = row {
            for seq in 1..=SLOTS_PER_PORT {
                if let Some(slot) = row.get(format!("v{seq}").as_str()) {
                    let (nozzles, shift) = read_slot(slot);
                    config.set_slot(port, seq, nozzles, shift);
                }
            }
        }
        return;
    }

    let Some((port, seq)) = split_slot_key(key) else {
        return;
    };
    let (nozzles, shift) = read_slot(row);
    config.set_slot(port, seq, nozzles, shift);
}

fn split_slot_key(key: &str) -> Option<(u8, u8)> {
    let (port, seq) = key.trim().split_once(['-', ':', '_'])?;
    Some((port.parse().ok()?, seq.parse().ok()?))
}

fn read_slot(slot: &Value) -> (u32, i32) {
    match slot {
        Value::Object(_) => {
            let nozzles = int(first(slot, &[&["nozzles"], &["count"]])).max(0);
            let shift = int(slot.get("shift")).clamp(-i64::from(MAX_SHIFT), i64::from(MAX_SHIFT));
            (u32::try_from(nozzles).unwrap_or(u32::MAX), shift as i32)
        }
        other => (u32::try_from(int(Some(other)).max(0)).unwrap_or(u32::MAX), 0),
    }
}

fn read_override(key: &str, value: &Value) -> Result<(EdgeId, u32), OverrideParseError> {
    let id =
        EdgeId::parse(key).ok_or_else(|| OverrideParseError::BadEdgeId { raw: key.to_string() })?;
    let feet = match num(Some(value)) {
        Some(v) => override_feet(&id, v)?,
        None => {
            return Err(OverrideParseError::NotNumeric {
                edge: id.to_string(),
                value: value.to_string(),
            });
        }
    };
    Ok((id, feet))
}

// ============================================================================
// Lenient value access
// ============================================================================

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |v, key| v.get(key))
}

/// First non-null value among candidate paths
fn first<'a>(root: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().filter_map(|p| lookup(root, p)).find(|v| !v.is_null())
}

/// Numbers, numeric strings and booleans; NaN and junk are `None`.
fn num(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

fn int(value: Option<&Value>) -> i64 {
    num(value).map(|f| f.trunc() as i64).unwrap_or(0)
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_gives_defaults() {
        let n = normalize(&json!({}));
        assert_eq!(n.config, BoomConfig::default());
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn non_object_gives_defaults() {
        let n = normalize(&json!([1, 2, 3]));
        assert_eq!(n.config, BoomConfig::default());
    }

    #[test]
    fn unreadable_text_gives_defaults_and_warning() {
        let n = BoomConfig::load("{ not json");
        assert_eq!(n.config, BoomConfig::default());
        assert!(matches!(n.warnings.as_slice(), [Warning::UnreadableConfig { .. }]));
    }

    #[test]
    fn reads_flat_contract() {
        let n = normalize(&json!({
            "schemaVersion": 1,
            "totalNozzles": 54,
            "nozzleSpacing": 20,
            "folds": { "breakaway": 3, "outer": 0, "inner": 9, "primary": 18 },
            "gatewayMount": 0,
            "hubMode": "lite",
            "ports": {
                "1": { "v1": { "nozzles": 12, "shift": 0 }, "v2": { "nozzles": 12, "shift": -2 } },
                "2": { "v1": { "nozzles": 6 } }
            },
            "extensionOverrides": { "hub->vcm:18": 12 }
        }));
        let c = &n.config;
        assert_eq!(c.total_nozzles, 54);
        assert_eq!(c.nozzle_spacing, 20.0);
        assert_eq!(c.folds, FoldOffsets { breakaway: 3, outer: 0, inner: 9, primary: 18 });
        assert_eq!(c.hub_mode, HubMode::Lite);
        assert_eq!(c.ports[&1].v2, SlotConfig { nozzles: 12, shift: -2 });
        assert_eq!(c.ports[&2].v1.nozzles, 6);
        assert_eq!(c.extension_overrides.get(&EdgeId::parse("hub->vcm:18").unwrap()), Some(12));
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn reads_legacy_nested_layout() {
        let n = normalize(&json!({
            "name": "ET L-Series 120'",
            "meta": {
                "totalNozzles": "72",
                "nozzleSpacing": 20,
                "hubMode": "standard",
                "make": "ET",
                "model": "L"
            },
            "structure": { "gatewayMount": 30, "folds": { "primary": 20 } },
            "vcm": { "mode": "standard", "data": { "1": { "v1": { "nozzles": 12, "shift": 0 } } } },
            "extensions": { "overrides": { "vcm:6.5->hub": 40 }, "fiveFootDrops": [3, 4] }
        }));
        let c = &n.config;
        assert_eq!(c.total_nozzles, 72);
        assert_eq!(c.gateway_mount, 30);
        assert_eq!(c.folds.primary, 20);
        assert_eq!(c.make, "ET");
        assert_eq!(c.ports[&1].v1.nozzles, 12);
        assert_eq!(c.five_foot_drops, vec![3, 4]);
        // order of endpoints in the key does not matter
        assert_eq!(c.extension_overrides.get(&EdgeId::parse("hub->vcm:6.5").unwrap()), Some(40));
    }

    #[test]
    fn reads_flat_port_keys() {
        let n = normalize(&json!({
            "ports": { "1-1": 12, "1:2": { "count": 8, "shift": 9 }, "9-1": 4, "1-4": 4 }
        }));
        let c = &n.config;
        assert_eq!(c.ports[&1].v1, SlotConfig { nozzles: 12, shift: 0 });
        // shift clamps to the +/-6 range
        assert_eq!(c.ports[&1].v2, SlotConfig { nozzles: 8, shift: 6 });
        assert!(!c.ports.contains_key(&9));
        assert_eq!(c.ports[&1].v3, SlotConfig::default());
    }

    #[test]
    fn lenient_numbers() {
        let n = normalize(&json!({
            "totalNozzles": "abc",
            "nozzleSpacing": null,
            "gatewayMount": "12"
        }));
        assert_eq!(n.config.total_nozzles, 0);
        assert_eq!(n.config.nozzle_spacing, 0.0);
        assert_eq!(n.config.gateway_mount, 12);
    }

    #[test]
    fn bad_overrides_become_warnings() {
        let n = normalize(&json!({
            "extensionOverrides": {
                "hub->vcm:18": "ten",
                "hub->vcm:6.5": -5,
                "nonsense": 10,
                "hub->vcm:30": 12.6
            }
        }));
        assert_eq!(n.config.extension_overrides.len(), 1);
        let kept = EdgeId::parse("hub->vcm:30").unwrap();
        assert_eq!(n.config.extension_overrides.get(&kept), Some(13));
        assert_eq!(n.warnings.len(), 3);
        assert!(n.warnings.iter().all(|w| matches!(w, Warning::Override(_))));
    }

    #[test]
    fn newer_schema_warns_but_loads() {
        let n = normalize(&json!({ "schemaVersion": 7, "totalNozzles": 10 }));
        assert_eq!(n.config.total_nozzles, 10);
        assert_eq!(n.config.schema_version, SCHEMA_VERSION);
        assert_eq!(n.warnings, vec![Warning::NewerSchema { found: 7, supported: 1 }]);
    }

    #[test]
    fn oversized_slot_counts_are_capped() {
        let n = BoomConfig::load(
            r#"{"totalNozzles":54,"nozzleSpacing":20,
                "ports":{"1":{"v1":{"nozzles":5000000000},"v2":{"nozzles":12}}}}"#,
        );
        assert_eq!(n.config.ports[&1].v1.nozzles, MAX_NOZZLES);
        assert_eq!(n.config.configured_nozzles(), MAX_NOZZLES + 12);

        let layout = crate::layout::compute(&n.config).unwrap();
        assert_eq!(layout.units.len(), 1);
        assert_eq!((layout.units[0].nozzle_start, layout.units[0].nozzle_end), (1, 54));
        assert_eq!(
            layout.warnings,
            vec![Warning::AllocationExceeded { configured: 212, total: 54 }]
        );
    }

    #[test]
    fn slot_sums_saturate() {
        let huge = SlotConfig { nozzles: u32::MAX, shift: 0 };
        let row = PortRow { v1: huge, v2: huge, v3: SlotConfig::default() };
        assert_eq!(row.configured_nozzles(), u32::MAX);

        let mut config = BoomConfig::default();
        config.ports.insert(1, row);
        config.ports.insert(2, row);
        assert_eq!(config.configured_nozzles(), u32::MAX);
    }

    #[test]
    fn round_trips_through_json() {
        let mut config =
            BoomConfig { total_nozzles: 54, nozzle_spacing: 20.0, ..Default::default() };
        config.set_slot(1, 1, 12, 0);
        config.set_slot(2, 1, 6, -1);
        config.extension_overrides.insert(EdgeId::parse("hub<->vcm:18").unwrap(), 12);

        let back = BoomConfig::load(&config.to_json());
        assert_eq!(back.config, config);
        assert!(back.warnings.is_empty());
    }

    #[test]
    fn lite_mode_hides_upper_ports() {
        let mut config = BoomConfig { hub_mode: HubMode::Lite, ..Default::default() };
        config.set_slot(1, 1, 12, 0);
        config.set_slot(6, 1, 12, 0);
        assert_eq!(config.active_ports().count(), 4);
        assert_eq!(config.configured_nozzles(), 12);
    }
}
