//! The authoritative in-memory boom and its cached layout.
//!
//! Every mutation goes through [`BoomStore`] and bumps a revision. Layouts are
//! recomputed lazily, at most once per revision, so a burst of edits costs a
//! single pass on the next read.

use crate::config::{BoomConfig, HubMode, Normalized};
use crate::errors::{GeometryError, OverrideParseError, Warning};
use crate::install::{self, InstallDocument};
use crate::layout::{self, EdgeId, Layout, harness::override_feet};

#[derive(Debug, Clone)]
struct Computed {
    revision: u64,
    result: Result<Layout, GeometryError>,
}

#[derive(Debug, Clone)]
pub struct BoomStore {
    config: BoomConfig,
    revision: u64,
    cache: Option<Computed>,
    passes: u64,
    load_warnings: Vec<Warning>,
}

impl Default for BoomStore {
    fn default() -> Self {
        BoomStore::new(BoomConfig::starter())
    }
}

impl BoomStore {
    pub fn new(config: BoomConfig) -> Self {
        BoomStore { config, revision: 0, cache: None, passes: 0, load_warnings: Vec::new() }
    }

    /// Load a stored config. Never fails; see [`BoomStore::load_warnings`].
    pub fn from_json(text: &str) -> Self {
        let Normalized { config, warnings } = BoomConfig::load(text);
        BoomStore { load_warnings: warnings, ..BoomStore::new(config) }
    }

    pub fn to_json(&self) -> String {
        self.config.to_json()
    }

    pub fn config(&self) -> &BoomConfig {
        &self.config
    }

    /// Problems found while loading: malformed fields, rejected overrides
    pub fn load_warnings(&self) -> &[Warning] {
        &self.load_warnings
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of layout passes actually run
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// True when the next [`BoomStore::layout`] call will recompute
    pub fn is_stale(&self) -> bool {
        self.cache.as_ref().is_none_or(|c| c.revision != self.revision)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Apply an edit. Switching hub mode discards every extension override,
    /// since chains are rebuilt from scratch.
    pub fn update(&mut self, edit: impl FnOnce(&mut BoomConfig)) {
        let hub_mode = self.config.hub_mode;
        edit(&mut self.config);
        if self.config.hub_mode != hub_mode {
            crate::log::debug!(
                from = ?hub_mode,
                to = ?self.config.hub_mode,
                "hub mode changed, clearing overrides"
            );
            self.config.extension_overrides.clear();
        }
        self.revision += 1;
    }

    pub fn set_hub_mode(&mut self, mode: HubMode) {
        if self.config.hub_mode != mode {
            self.update(|c| c.hub_mode = mode);
        }
    }

    /// Record a user-chosen extension length.
    ///
    /// `edge` is an edge id in either endpoint order; `value` is the typed
    /// length in feet. Returns the stored (rounded) length. A rejected value
    /// leaves the store untouched.
    pub fn set_override(&mut self, edge: &str, value: &str) -> Result<u32, OverrideParseError> {
        let id = EdgeId::parse(edge)
            .ok_or_else(|| OverrideParseError::BadEdgeId { raw: edge.to_string() })?;
        let parsed: f64 = value.trim().parse().map_err(|_| OverrideParseError::NotNumeric {
            edge: id.to_string(),
            value: value.to_string(),
        })?;
        let feet = override_feet(&id, parsed)?;
        self.update(|c| c.extension_overrides.insert(id, feet));
        Ok(feet)
    }

    /// Drop one override. Returns whether there was one to drop.
    pub fn clear_override(&mut self, edge: &str) -> bool {
        let Some(id) = EdgeId::parse(edge) else {
            return false;
        };
        if self.config.extension_overrides.get(&id).is_none() {
            return false;
        }
        self.update(|c| {
            c.extension_overrides.remove(&id);
        });
        true
    }

    pub fn clear_overrides(&mut self) {
        if !self.config.extension_overrides.is_empty() {
            self.update(|c| c.extension_overrides.clear());
        }
    }

    /// Back to the reset boom with every port empty and no overrides. Names,
    /// hub mode and stored instructions survive.
    pub fn reset(&mut self) {
        self.update(|c| {
            let kept = std::mem::take(c);
            *c = BoomConfig {
                name: kept.name,
                make: kept.make,
                model: kept.model,
                hub_mode: kept.hub_mode,
                install_steps: kept.install_steps,
                ..BoomConfig::reset_geometry()
            };
        });
    }

    // ------------------------------------------------------------------------
    // Derived output
    // ------------------------------------------------------------------------

    /// Layout for the current revision, recomputed only if something changed
    /// since the last call.
    pub fn layout(&mut self) -> Result<&Layout, GeometryError> {
        let computed = refresh(&mut self.cache, &self.config, self.revision, &mut self.passes);
        computed.result.as_ref().map_err(Clone::clone)
    }

    /// Compose install instructions for the current layout and stamp them
    /// into the config as a new version.
    ///
    /// Stored instructions do not feed the layout, so this does not bump the
    /// revision.
    pub fn generate_install(&mut self) -> Result<InstallDocument, GeometryError> {
        let computed = refresh(&mut self.cache, &self.config, self.revision, &mut self.passes);
        let layout = computed.result.as_ref().map_err(Clone::clone)?;
        let document = install::compose(layout, &self.config);

        let steps = &mut self.config.install_steps;
        steps.version += 1;
        steps.content = document.to_string();
        steps.source = "auto".to_string();
        crate::log::debug!(version = steps.version, "stored install instructions");

        Ok(document)
    }
}

fn refresh<'a>(
    cache: &'a mut Option<Computed>,
    config: &BoomConfig,
    revision: u64,
    passes: &mut u64,
) -> &'a Computed {
    if cache.as_ref().is_some_and(|c| c.revision != revision) {
        *cache = None;
    }
    cache.get_or_insert_with(|| {
        *passes += 1;
        crate::log::debug!(revision, "recomputing layout");
        Computed { revision, result: layout::compute(config) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_store_holds_starter_boom() {
        let mut store = BoomStore::default();
        let layout = store.layout().unwrap();
        assert_eq!(layout.units.len(), 5);
        assert_eq!(layout.geometry.folds.len(), 3);
        assert!(layout.warnings.is_empty());
    }

    #[test]
    fn edits_coalesce_into_one_pass() {
        let mut store = BoomStore::default();
        store.layout().unwrap();
        assert_eq!(store.passes(), 1);

        for n in 1..=10 {
            store.update(|c| c.set_slot(4, 1, n, 0));
        }
        assert!(store.is_stale());
        assert_eq!(store.passes(), 1);

        let units = store.layout().unwrap().units.len();
        assert_eq!(units, 5);
        store.layout().unwrap();
        assert_eq!(store.passes(), 2);
        assert!(!store.is_stale());
    }

    #[test]
    fn latest_edit_wins() {
        let mut store = BoomStore::default();
        store.update(|c| c.set_slot(4, 1, 2, 0));
        store.update(|c| c.set_slot(4, 1, 0, 0));
        let layout = store.layout().unwrap();
        assert!(layout.unit("4-1").is_none());
    }

    #[test]
    fn rejected_override_leaves_store_untouched() {
        let mut store = BoomStore::default();
        let rev = store.revision();
        assert!(matches!(
            store.set_override("hub->vcm:25", "abc"),
            Err(OverrideParseError::NotNumeric { .. })
        ));
        assert!(matches!(
            store.set_override("hub->vcm:25", "-3"),
            Err(OverrideParseError::NotPositive { .. })
        ));
        assert!(matches!(
            store.set_override("nowhere", "10"),
            Err(OverrideParseError::BadEdgeId { .. })
        ));
        assert_eq!(store.revision(), rev);
        assert!(store.config().extension_overrides.is_empty());
    }

    #[test]
    fn hub_mode_switch_clears_overrides() {
        let mut store = BoomStore::default();
        assert_eq!(store.set_override("vcm:25 <-> hub", " 12.4 "), Ok(12));
        assert_eq!(store.config().extension_overrides.len(), 1);

        store.set_hub_mode(HubMode::Standard);
        assert_eq!(store.config().extension_overrides.len(), 1);

        store.set_hub_mode(HubMode::Lite);
        assert!(store.config().extension_overrides.is_empty());
    }

    #[test]
    fn clear_single_override() {
        let mut store = BoomStore::default();
        store.set_override("hub->vcm:25", "12").unwrap();
        assert!(!store.clear_override("hub->vcm:99"));
        assert!(store.clear_override("vcm:25->hub"));
        assert!(store.config().extension_overrides.is_empty());
    }

    #[test]
    fn reset_keeps_identity() {
        let mut store = BoomStore::default();
        store.update(|c| {
            c.name = "Field boom".into();
            c.total_nozzles = 90;
        });
        store.set_override("hub->vcm:25", "12").unwrap();
        store.reset();

        let c = store.config();
        assert_eq!(c.name, "Field boom");
        assert_eq!(c.total_nozzles, 54);
        assert!(c.ports.is_empty());
        assert!(c.extension_overrides.is_empty());
    }

    #[test]
    fn geometry_error_is_cached_too() {
        let mut store = BoomStore::new(BoomConfig::default());
        assert!(store.layout().is_err());
        assert!(store.layout().is_err());
        assert_eq!(store.passes(), 1);
        assert!(store.generate_install().is_err());
        assert_eq!(store.config().install_steps.version, 0);
    }

    #[test]
    fn generate_install_stamps_versions() {
        let mut store = BoomStore::default();
        store.generate_install().unwrap();
        let doc = store.generate_install().unwrap();

        let steps = &store.config().install_steps;
        assert_eq!(steps.version, 2);
        assert_eq!(steps.source, "auto");
        assert_eq!(steps.content, doc.to_string());
        assert!(!store.is_stale());
        assert_eq!(store.passes(), 1);
    }
}
