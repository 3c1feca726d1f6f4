use std::collections::HashMap;

use crate::address::{CellAddress, RangeBounds};

/// Cell -> merged-region lookup for a single sheet.
///
/// Built once before a sheet walk and dropped afterwards. Every cell covered by a region
/// (including its anchor) maps to that region's A1 text.
#[derive(Clone, Debug, Default)]
pub struct MergedRegionIndex {
    regions: Vec<(RangeBounds, String)>,
    by_cell: HashMap<CellAddress, usize>,
}

impl MergedRegionIndex {
    /// Index `regions`, materializing only the cells that fall inside `extent`.
    ///
    /// Cells outside the extent hold no data, so they never need a lookup.
    pub fn build<I>(regions: I, extent: Option<&RangeBounds>) -> Self
    where
        I: IntoIterator<Item = RangeBounds>,
    {
        let mut index = Self::default();
        for region in regions {
            if region.is_single_cell() {
                continue;
            }
            let idx = index.regions.len();
            index.regions.push((region, region.to_string()));

            let covered = match extent {
                Some(extent) => region.clamp_to(extent),
                None => Some(region),
            };
            if let Some(covered) = covered {
                for cell in covered.cells() {
                    index.by_cell.entry(cell).or_insert(idx);
                }
            }
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn region_of(&self, cell: CellAddress) -> Option<&RangeBounds> {
        self.by_cell.get(&cell).map(|&idx| &self.regions[idx].0)
    }

    /// Region text (e.g. `A1:E1`) for a covered cell.
    pub fn region_text(&self, cell: CellAddress) -> Option<&str> {
        self.by_cell
            .get(&cell)
            .map(|&idx| self.regions[idx].1.as_str())
    }
}
