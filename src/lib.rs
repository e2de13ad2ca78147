//! Spray-boom VCM layout engine.
//!
//! Given a boom description (nozzle count, spacing, folds, hub position and
//! per-port VCM sizing), computes where every valve control module mounts,
//! how the hub-outward harness chains run and how long each extension must
//! be, the parts list, and installer instructions.
//!
//! ```
//! let config = boomplan::BoomConfig::starter();
//! let layout = boomplan::plan(&config).unwrap();
//! assert_eq!(layout.units.len(), 5);
//! ```

pub mod bom;
pub mod config;
pub mod errors;
pub mod install;
pub mod layout;
pub mod log;
pub mod store;
pub mod types;

pub use bom::{BomLine, BomTable};
pub use config::{BoomConfig, HubMode};
pub use errors::{GeometryError, OverrideParseError, Warning};
pub use install::InstallDocument;
pub use layout::{Layout, compute};
pub use store::BoomStore;

/// Compute a layout, reporting failure as a printable diagnostic.
pub fn plan(config: &BoomConfig) -> Result<Layout, miette::Report> {
    Ok(layout::compute(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_reports_missing_nozzles() {
        let err = plan(&BoomConfig::default()).unwrap_err();
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("boomplan::geometry::no_nozzles")
        );
    }

    #[test]
    fn plan_matches_compute() {
        let config = BoomConfig::starter();
        assert_eq!(plan(&config).unwrap(), compute(&config).unwrap());
    }
}
