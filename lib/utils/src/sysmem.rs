//! Sparse byte-addressed memory.
//!
//! Hosts that stand in for a board keep the load area here: each write lands
//! in a region, regions grow when a write touches their end, and reads hand
//! out everything from an address to the end of its region.

use alloc::{collections::btree_map::BTreeMap, vec::Vec};

#[derive(Debug, Default, Clone)]
pub struct SparseMemory {
    /// Region start -> contents.
    regions: BTreeMap<usize, Vec<u8>>,
    /// Highest address (exclusive) a write may reach.
    limit: usize,
}

impl SparseMemory {
    pub const fn new(limit: usize) -> SparseMemory {
        SparseMemory {
            regions: BTreeMap::new(),
            limit,
        }
    }

    /// Start of the region that contains or ends exactly at `addr`.
    fn region_for(&self, addr: usize) -> Option<usize> {
        let (start, data) = self.regions.range(..=addr).next_back()?;
        if addr <= start + data.len() {
            Some(*start)
        } else {
            None
        }
    }

    /// Copy `data` to `addr`. Returns `false` when it would cross the limit.
    pub fn write(&mut self, addr: usize, data: &[u8]) -> bool {
        let Some(end) = addr.checked_add(data.len()) else {
            return false;
        };
        if end > self.limit {
            return false;
        }
        if data.is_empty() {
            return true;
        }
        let start = match self.region_for(addr) {
            Some(start) => start,
            None => {
                self.regions.insert(addr, Vec::new());
                addr
            }
        };
        // Swallow regions the write runs into so that regions never overlap.
        let swallowed: Vec<usize> = self
            .regions
            .range(start + 1..=end)
            .map(|(k, _)| *k)
            .collect();
        let mut tails = Vec::new();
        for key in swallowed {
            if let Some(region) = self.regions.remove(&key) {
                tails.push((key, region));
            }
        }
        let Some(region) = self.regions.get_mut(&start) else {
            return false;
        };
        let offset = addr - start;
        for (key, tail) in tails {
            let tail_offset = key - start;
            if region.len() < tail_offset + tail.len() {
                region.resize(tail_offset + tail.len(), 0);
            }
            region[tail_offset..tail_offset + tail.len()].copy_from_slice(&tail);
        }
        if region.len() < offset + data.len() {
            region.resize(offset + data.len(), 0);
        }
        region[offset..offset + data.len()].copy_from_slice(data);
        true
    }

    /// Bytes from `addr` to the end of its region.
    pub fn read(&self, addr: usize) -> Option<&[u8]> {
        let (start, data) = self.regions.range(..=addr).next_back()?;
        let offset = addr - start;
        if offset < data.len() {
            Some(&data[offset..])
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}
