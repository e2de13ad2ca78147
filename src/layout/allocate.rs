//! VCM allocator: sequential nozzle ranges and mount positions

use crate::config::BoomConfig;
use crate::errors::Warning;
use crate::types::NozzlePos;

use super::defaults;
use super::geometry::BoomGeometry;

/// Which side of the hub a unit or chain sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One allocated valve control module
#[derive(Debug, Clone, PartialEq)]
pub struct VcmUnit {
    pub port: u8,
    /// Slot on the port, 1..=3
    pub seq: u8,
    pub nozzle_start: u32,
    pub nozzle_end: u32,
    pub nozzle_count: u32,
    /// Mount position after the 6-drop rule and manual shift
    pub mount: NozzlePos,
    /// Mount position before the manual shift was applied
    pub base_mount: NozzlePos,
    pub shift: i32,
}

impl VcmUnit {
    /// `port-seq`, e.g. `2-1`
    pub fn label(&self) -> String {
        format!("{}-{}", self.port, self.seq)
    }

    /// Endpoint token used in extension edge ids
    pub fn token(&self) -> String {
        format!("vcm:{}", self.mount)
    }

    /// Chain side; a unit mounted exactly at the hub belongs to the left chain.
    pub fn side(&self, hub: NozzlePos) -> Side {
        if self.mount.raw() > hub.raw() {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Small groups fit on a single drop harness
    pub fn drop_harnesses(&self) -> u32 {
        if self.nozzle_count <= defaults::SIX_DROP_LIMIT {
            1
        } else {
            2
        }
    }

    /// Harness drops left without a nozzle
    pub fn dust_plugs(&self) -> u32 {
        (self.drop_harnesses() * defaults::DROPS_PER_HARNESS).saturating_sub(self.nozzle_count)
    }
}

/// Assign contiguous nozzle ranges to every configured slot, in port/slot
/// order, until the boom runs out of nozzles.
///
/// Demand beyond the boom is truncated silently; a single
/// [`Warning::AllocationExceeded`] reports it.
pub fn allocate(
    config: &BoomConfig,
    geometry: &BoomGeometry,
    warnings: &mut Vec<Warning>,
) -> Vec<VcmUnit> {
    let total = geometry.total_nozzles;
    let configured = config.configured_nozzles();
    if configured > total {
        warnings.push(Warning::AllocationExceeded { configured, total });
    }

    let mut units = Vec::new();
    let mut cursor: u32 = 1;

    'ports: for (port, row) in config.active_ports() {
        for (idx, slot) in row.slots().into_iter().enumerate() {
            if slot.nozzles == 0 {
                continue;
            }
            if cursor > total {
                break 'ports;
            }

            let start = cursor;
            let end = cursor.saturating_add(slot.nozzles - 1).min(total);
            let count = end - start + 1;
            let midpoint = NozzlePos::at(start).midpoint(NozzlePos::at(end));
            let on_left = midpoint.raw() < geometry.hub.raw();

            let base_mount = if count <= defaults::SIX_DROP_LIMIT {
                // flush against the hub-side end
                if on_left {
                    NozzlePos::at(end)
                } else {
                    NozzlePos::at(start)
                }
            } else {
                midpoint
            };

            let unit = VcmUnit {
                port,
                seq: idx as u8 + 1,
                nozzle_start: start,
                nozzle_end: end,
                nozzle_count: count,
                mount: base_mount.shifted(slot.shift),
                base_mount,
                shift: slot.shift,
            };
            crate::log::debug!(
                label = %unit.label(),
                start,
                end,
                mount = unit.mount.raw(),
                "allocated VCM"
            );
            units.push(unit);
            cursor = end + 1;
        }
    }

    units
}
