//! Error and warning types with diagnostics using miette
//!
//! Only [`GeometryError`] is fatal. Everything else is a [`Warning`] handed
//! back next to a best-effort result.

use miette::Diagnostic;
use thiserror::Error;

use crate::layout::geometry::FoldKind;

// ============================================================================
// Fatal Errors
// ============================================================================

/// Errors that stop the pipeline before allocation runs
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("boom needs at least one nozzle (got {raw})")]
    #[diagnostic(
        code(boomplan::geometry::no_nozzles),
        help("enter the total nozzle count for the boom")
    )]
    NoNozzles { raw: i64 },
}

// ============================================================================
// Override Errors
// ============================================================================

/// A user-supplied extension length that could not be used
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum OverrideParseError {
    #[error("extension length for {edge} is not a number: {value:?}")]
    #[diagnostic(code(boomplan::harness::override_not_numeric))]
    NotNumeric { edge: String, value: String },

    #[error("extension length for {edge} must be positive (got {value})")]
    #[diagnostic(code(boomplan::harness::override_not_positive))]
    NotPositive { edge: String, value: f64 },

    #[error("not an extension harness id: {raw:?}")]
    #[diagnostic(
        code(boomplan::harness::bad_edge_id),
        help("edge ids look like `hub->vcm:18` or `vcm:6.5->vcm:18`")
    )]
    BadEdgeId { raw: String },
}

// ============================================================================
// Warnings
// ============================================================================

/// Non-fatal conditions surfaced alongside a layout or a loaded config
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("VCM drops ({configured}) exceed total nozzles ({total})")]
    #[diagnostic(
        code(boomplan::allocate::demand_exceeds_nozzles),
        severity(Warning),
        help("later VCM slots are truncated or dropped")
    )]
    AllocationExceeded { configured: u32, total: u32 },

    #[error("{fold} fold at {value} ignored on a {total}-nozzle boom")]
    #[diagnostic(
        code(boomplan::geometry::fold_discarded),
        severity(Warning),
        help("fold offsets must be below half the nozzle count")
    )]
    FoldDiscarded { fold: FoldKind, value: i64, total: u32 },

    #[error("nozzle count {raw} clamped to {clamped}")]
    #[diagnostic(code(boomplan::geometry::nozzles_clamped), severity(Warning))]
    NozzleCountClamped { raw: i64, clamped: u32 },

    #[error("nozzle spacing {raw} is not usable, assuming {assumed}\"")]
    #[diagnostic(code(boomplan::geometry::spacing_defaulted), severity(Warning))]
    SpacingDefaulted { raw: f64, assumed: f64 },

    #[error("gateway mount {raw} is past the boom end, using nozzle {clamped}")]
    #[diagnostic(code(boomplan::geometry::gateway_clamped), severity(Warning))]
    GatewayClamped { raw: i64, clamped: u32 },

    #[error("config schema version {found} is newer than supported version {supported}")]
    #[diagnostic(code(boomplan::config::newer_schema), severity(Warning))]
    NewerSchema { found: u32, supported: u32 },

    #[error("stored config could not be read: {reason}")]
    #[diagnostic(code(boomplan::config::unreadable), severity(Warning))]
    UnreadableConfig { reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Override(#[from] OverrideParseError),
}
