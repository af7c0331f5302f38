//! Sorted, immutable IPv4 range table.

use std::ops::Index;
use std::slice;

use crate::{AddressRange, Error, Result};

/// An immutable table of disjoint address ranges sorted by `high`.
///
/// The table is built once before serving and shared read-only, usually as
/// `Arc<RangeTable>`. [`RangeTable::new`] trusts its input; use
/// [`RangeTable::checked`] or [`RangeTable::validate`] when the dataset does
/// not come from a trusted build step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    ranges: Vec<AddressRange>,
}

impl RangeTable {
    /// Create a table from ranges already sorted and non-overlapping.
    pub fn new(ranges: Vec<AddressRange>) -> Self {
        Self { ranges }
    }

    /// Create a table and verify its invariants.
    pub fn checked(ranges: Vec<AddressRange>) -> Result<Self> {
        let table = Self::new(ranges);
        table.validate()?;
        Ok(table)
    }

    /// Verify that every range has `low <= high` and starts after the
    /// previous one ends.
    pub fn validate(&self) -> Result<()> {
        let mut previous_high: Option<u32> = None;
        for (index, range) in self.ranges.iter().enumerate() {
            if range.low > range.high {
                return Err(Error::InvalidRange {
                    index,
                    low: range.low,
                    high: range.high,
                });
            }
            if let Some(high) = previous_high {
                if range.low <= high {
                    return Err(Error::UnsortedRanges { index });
                }
            }
            previous_high = Some(range.high);
        }
        Ok(())
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the table has no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Get the range at `index`.
    pub fn get(&self, index: usize) -> Option<&AddressRange> {
        self.ranges.get(index)
    }

    /// Iterate over ranges in ascending order.
    pub fn iter(&self) -> slice::Iter<'_, AddressRange> {
        self.ranges.iter()
    }

    /// Borrow the ranges as a slice.
    pub fn as_slice(&self) -> &[AddressRange] {
        &self.ranges
    }

    /// Index of the first range whose `high` is `>= address`.
    ///
    /// Returns `len()` when every range ends below `address`.
    pub fn lower_bound(&self, address: u32) -> usize {
        self.ranges.partition_point(|range| range.high < address)
    }

    /// Find the range owning `address`.
    ///
    /// Takes the first range whose `high` is not below `address`; the address
    /// belongs to it only if it is also not below its `low`. Anything else is
    /// a gap or lies outside the table.
    pub fn find(&self, address: u32) -> Option<&AddressRange> {
        self.ranges
            .get(self.lower_bound(address))
            .filter(|range| address >= range.low)
    }

    /// Total number of addresses covered by the table.
    pub fn coverage(&self) -> u64 {
        self.ranges.iter().map(AddressRange::size).sum()
    }
}

impl Index<usize> for RangeTable {
    type Output = AddressRange;

    fn index(&self, index: usize) -> &AddressRange {
        &self.ranges[index]
    }
}

impl<'a> IntoIterator for &'a RangeTable {
    type Item = &'a AddressRange;
    type IntoIter = slice::Iter<'a, AddressRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl FromIterator<AddressRange> for RangeTable {
    fn from_iter<I: IntoIterator<Item = AddressRange>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
