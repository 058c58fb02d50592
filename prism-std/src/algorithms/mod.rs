//! Standard profiling algorithms

mod fd;
mod statistics;
mod ucc;

pub use fd::FdApproximate;
pub use statistics::ColumnStatistics;
pub use ucc::UccNaive;

/// All `k`-element subsets of `items`, in lexicographic order of positions
pub(crate) fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if k == 0 || k > items.len() {
        return result;
    }
    let mut positions: Vec<usize> = (0..k).collect();
    loop {
        result.push(positions.iter().map(|&p| items[p]).collect());
        // Rightmost position that can still advance
        let Some(i) = (0..k).rev().find(|&i| positions[i] < items.len() - k + i) else {
            return result;
        };
        positions[i] += 1;
        for j in i + 1..k {
            positions[j] = positions[j - 1] + 1;
        }
    }
}

/// `subset` is contained in `superset`; both sorted ascending
pub(crate) fn is_subset(subset: &[usize], superset: &[usize]) -> bool {
    subset.iter().all(|c| superset.binary_search(c).is_ok())
}
