//! Frame/scan header data model and the per-slot table registries
//! (spec §3, §9 "cyclic and back references"). Grounded on the per-
//! component record shape in `zune-jpeg/src/components.rs::Components`,
//! generalized to carry the frame/scan-level bookkeeping (table
//! iterations, MCU grid) that the teacher keeps inline on `Decoder`
//! instead of as its own value type.

use crate::errors::DecodeErrors;
use crate::misc::EncodingProcess;

/// A single image component as declared by SOF: `{id, H, V, qtable_sel}`.
#[derive(Clone, Debug)]
pub(crate) struct Component {
    pub id: u8,
    pub h_samp: u8,
    pub v_samp: u8,
    pub qtable_selector: u8,
    /// Mutated during entropy decode; not part of the wire format.
    pub dc_pred: i32,
}

/// Parsed SOF0/SOF2 segment plus the derived MCU geometry.
#[derive(Clone)]
pub(crate) struct FrameHeader {
    pub process: EncodingProcess,
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<Component>,
}

impl FrameHeader {
    pub fn max_h(&self) -> usize {
        self.components.iter().map(|c| c.h_samp as usize).max().unwrap_or(1)
    }

    pub fn max_v(&self) -> usize {
        self.components.iter().map(|c| c.v_samp as usize).max().unwrap_or(1)
    }

    pub fn mcu_px_w(&self) -> usize {
        8 * self.max_h()
    }

    pub fn mcu_px_h(&self) -> usize {
        8 * self.max_v()
    }

    pub fn mcu_grid_w(&self) -> usize {
        (self.width as usize + self.mcu_px_w() - 1) / self.mcu_px_w()
    }

    pub fn mcu_grid_h(&self) -> usize {
        (self.height as usize + self.mcu_px_h() - 1) / self.mcu_px_h()
    }

    pub fn component_index(&self, id: u8) -> Result<usize, DecodeErrors> {
        self.components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DecodeErrors::Format(format!("scan references undeclared component id {id}")))
    }
}

/// One component's entry inside a scan header.
#[derive(Clone)]
pub(crate) struct ScanComponent {
    pub component_index: usize,
    pub dc_table_selector: u8,
    pub ac_table_selector: u8,
    /// Table-registry iteration this scan's DC table selector resolved to
    /// at SOS-parse time; later DHTs do not retroactively change it.
    pub dc_iteration: usize,
    pub ac_iteration: usize,
    pub qt_iteration: usize,
}

/// Parsed SOS segment.
#[derive(Clone)]
pub(crate) struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub ah: u8,
    pub al: u8,
}

impl ScanHeader {
    pub fn is_dc_scan(&self) -> bool {
        self.spectral_start == 0
    }

    pub fn is_first_scan(&self) -> bool {
        self.ah == 0
    }
}

/// Per-slot (0..=3), ordered-by-iteration table registry (spec §3
/// "Table registries", §9 "cyclic and back references"): a new
/// definition pushes a new iteration only if the slot's current
/// iteration is already occupied, otherwise it fills the current one.
/// Scans resolve and store plain iteration indices rather than holding a
/// reference back into the registry, so later redefinitions never
/// retroactively change an already-parsed scan.
pub(crate) struct TableRegistry<T> {
    slots: [Vec<Option<T>>; 4],
}

impl<T> TableRegistry<T> {
    pub fn new() -> Self {
        TableRegistry {
            slots: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        }
    }

    pub fn define(&mut self, slot: usize, table: T) {
        let iterations = &mut self.slots[slot];
        match iterations.last_mut() {
            Some(last @ None) => *last = Some(table),
            _ => iterations.push(Some(table)),
        }
    }

    /// Index of the iteration currently being filled (or about to be, if
    /// the slot has never been defined).
    pub fn current_iteration(&self, slot: usize) -> usize {
        self.slots[slot].len().saturating_sub(1)
    }

    pub fn get(&self, slot: usize, iteration: usize) -> Option<&T> {
        self.slots[slot].get(iteration).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::TableRegistry;

    #[test]
    fn redefinition_does_not_retroact() {
        let mut reg: TableRegistry<u32> = TableRegistry::new();
        reg.define(0, 1);
        let first_iter = reg.current_iteration(0);
        reg.define(0, 2); // slot already occupied -> new iteration
        assert_eq!(*reg.get(0, first_iter).unwrap(), 1);
        assert_eq!(reg.current_iteration(0), first_iter + 1);
        assert_eq!(*reg.get(0, first_iter + 1).unwrap(), 2);
    }

    #[test]
    fn fills_unoccupied_current_iteration() {
        let mut reg: TableRegistry<u32> = TableRegistry::new();
        reg.define(1, 10);
        reg.define(2, 20); // different slot, unaffected
        assert_eq!(reg.current_iteration(1), 0);
        assert_eq!(*reg.get(1, 0).unwrap(), 10);
        assert_eq!(*reg.get(2, 0).unwrap(), 20);
    }
}
