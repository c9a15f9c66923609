//! Region detection
//!
//! A region is a maximal 4-connected set of same-team cells. The board is
//! scanned column by column (rows inside), so the same grid always yields the
//! same regions in the same order; board generation relies on that when it
//! re-rolls a cell until no match exists.

use std::collections::HashSet;

use glam::IVec2;

use super::block::{BlockId, Team};
use super::grid::SpatialGrid;

/// What the grid stores per cell: who is there and which team they are on.
/// Two entries are equal when they name the same block.
#[derive(Debug, Clone, Copy)]
pub struct GridEntry {
    pub id: BlockId,
    pub team: Team,
}

impl PartialEq for GridEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GridEntry {}

pub type BlockGrid = SpatialGrid<GridEntry>;

/// Playable extent of the board in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub cols: i32,
    pub rows: i32,
}

impl Bounds {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    #[inline]
    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.x < self.cols && cell.y >= 0 && cell.y < self.rows
    }

    /// All cells, column-major (the scan order)
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.cols).flat_map(move |x| (0..self.rows).map(move |y| IVec2::new(x, y)))
    }
}

/// Flood-fill step order: right, left, down, up
const NEIGHBOURS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// A connected same-team cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub team: Team,
    /// Cells in visiting order
    pub cells: Vec<IVec2>,
    /// Occupants, parallel to `cells`
    pub blocks: Vec<BlockId>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The region containing `start`, or `None` if the cell is empty or off-board.
///
/// Depth-first with an explicit stack. Neighbours are pushed in reverse so the
/// visiting order matches the recursive right/left/down/up walk.
pub fn region_at(grid: &BlockGrid, bounds: Bounds, start: IVec2) -> Option<Region> {
    if !bounds.contains(start) {
        return None;
    }
    let team = grid.get(start.x, start.y)?.team;

    let mut seen: HashSet<IVec2> = HashSet::new();
    let mut region = Region {
        team,
        cells: Vec::new(),
        blocks: Vec::new(),
    };
    let mut stack = vec![start];

    while let Some(cell) = stack.pop() {
        if !bounds.contains(cell) || seen.contains(&cell) {
            continue;
        }
        let Some(entry) = grid.get(cell.x, cell.y) else {
            continue;
        };
        if entry.team != team {
            continue;
        }
        seen.insert(cell);
        region.cells.push(cell);
        region.blocks.push(entry.id);

        for offset in NEIGHBOURS.iter().rev() {
            stack.push(cell + *offset);
        }
    }

    Some(region)
}

/// Result of a board-wide scan
#[derive(Debug, Clone, Default)]
pub struct MatchScan {
    /// At least one region met the threshold
    pub found: bool,
    /// Qualifying regions in scan order (only the first when not marking)
    pub regions: Vec<Region>,
    /// Distinct blocks to remove (empty when not marking)
    pub to_remove: Vec<BlockId>,
}

/// Find regions of at least `threshold` blocks.
///
/// With `mark_for_removal` unset the scan stops at the first qualifying region
/// and only answers whether a match exists. With it set every qualifying
/// region is collected and their blocks gathered, deduplicated by identity,
/// into `to_remove`. The grid is never modified.
pub fn find_matches(
    grid: &BlockGrid,
    bounds: Bounds,
    threshold: usize,
    mark_for_removal: bool,
) -> MatchScan {
    let mut scan = MatchScan::default();
    let mut consumed: HashSet<IVec2> = HashSet::new();

    for cell in bounds.cells() {
        if consumed.contains(&cell) || grid.get(cell.x, cell.y).is_none() {
            continue;
        }
        let Some(region) = region_at(grid, bounds, cell) else {
            continue;
        };
        consumed.extend(region.cells.iter().copied());

        if region.len() >= threshold {
            scan.found = true;
            if !mark_for_removal {
                scan.regions.push(region);
                return scan;
            }
            scan.to_remove.extend(region.blocks.iter().copied());
            scan.regions.push(region);
        }
    }

    scan.to_remove = dedup_by_identity(scan.to_remove);
    scan
}

/// Drop repeated block ids, keeping first occurrences in order
pub fn dedup_by_identity(ids: Vec<BlockId>) -> Vec<BlockId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Build a grid from rows of teams (`None` = empty)
    fn grid_from(rows: &[Vec<Option<Team>>]) -> (BlockGrid, Bounds) {
        let bounds = Bounds::new(rows[0].len() as i32, rows.len() as i32);
        let mut grid = BlockGrid::new(bounds.cols);
        let mut next = 0;
        for (y, row) in rows.iter().enumerate() {
            for (x, team) in row.iter().enumerate() {
                if let Some(team) = team {
                    grid.set(
                        x as i32,
                        y as i32,
                        GridEntry {
                            id: BlockId(next),
                            team: *team,
                        },
                    );
                }
                next += 1;
            }
        }
        (grid, bounds)
    }

    fn full(rows: &[&[Team]]) -> (BlockGrid, Bounds) {
        let rows: Vec<Vec<Option<Team>>> = rows
            .iter()
            .map(|r| r.iter().map(|t| Some(*t)).collect())
            .collect();
        grid_from(&rows)
    }

    #[test]
    fn test_region_at_collects_connected_cells() {
        let (grid, bounds) = full(&[&[0, 0, 1], &[1, 0, 1], &[1, 1, 1]]);
        let region = region_at(&grid, bounds, IVec2::new(0, 0)).unwrap();
        assert_eq!(region.team, 0);
        assert_eq!(region.len(), 3);

        let ones = region_at(&grid, bounds, IVec2::new(2, 2)).unwrap();
        assert_eq!(ones.len(), 6);
    }

    #[test]
    fn test_region_at_visits_in_recursive_order() {
        // Plus shape: recursive walk from the centre goes right, left, down, up
        let rows = vec![
            vec![None, Some(0), None],
            vec![Some(0), Some(0), Some(0)],
            vec![None, Some(0), None],
        ];
        let (grid, bounds) = grid_from(&rows);
        let region = region_at(&grid, bounds, IVec2::new(1, 1)).unwrap();
        assert_eq!(
            region.cells,
            vec![
                IVec2::new(1, 1),
                IVec2::new(2, 1),
                IVec2::new(0, 1),
                IVec2::new(1, 2),
                IVec2::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_region_at_empty_cell_is_none() {
        let rows = vec![vec![None, Some(1)]];
        let (grid, bounds) = grid_from(&rows);
        assert!(region_at(&grid, bounds, IVec2::new(0, 0)).is_none());
        assert!(region_at(&grid, bounds, IVec2::new(5, 0)).is_none());
    }

    #[test]
    fn test_region_does_not_wrap_across_rows() {
        // (2,0) and (0,1) share a key neighbourhood through column wrap,
        // but must not connect
        let (grid, bounds) = full(&[&[1, 2, 0], &[0, 2, 1]]);
        let region = region_at(&grid, bounds, IVec2::new(2, 0)).unwrap();
        assert_eq!(region.len(), 1);
    }

    #[test]
    fn test_find_matches_no_match() {
        let (grid, bounds) = full(&[&[0, 1, 0], &[1, 0, 1], &[0, 1, 0]]);
        let scan = find_matches(&grid, bounds, 3, true);
        assert!(!scan.found);
        assert!(scan.to_remove.is_empty());
    }

    #[test]
    fn test_find_matches_marks_all_regions() {
        let (grid, bounds) = full(&[&[0, 0, 0], &[1, 2, 3], &[4, 4, 4]]);
        let scan = find_matches(&grid, bounds, 3, true);
        assert!(scan.found);
        assert_eq!(scan.regions.len(), 2);
        assert_eq!(scan.to_remove.len(), 6);
    }

    #[test]
    fn test_find_matches_without_marking_stops_at_first() {
        let (grid, bounds) = full(&[&[0, 0, 0], &[1, 2, 3], &[4, 4, 4]]);
        let scan = find_matches(&grid, bounds, 3, false);
        assert!(scan.found);
        assert_eq!(scan.regions.len(), 1);
        assert!(scan.to_remove.is_empty());
    }

    #[test]
    fn test_dedup_by_identity() {
        let ids = vec![BlockId(3), BlockId(1), BlockId(3), BlockId(2), BlockId(1)];
        assert_eq!(
            dedup_by_identity(ids),
            vec![BlockId(3), BlockId(1), BlockId(2)]
        );
    }

    /// Independent check: label propagation until fixpoint, then count sizes
    fn brute_force_has_match(cells: &[Option<Team>], cols: usize, rows: usize) -> bool {
        let mut labels: Vec<usize> = (0..cells.len()).collect();
        loop {
            let mut changed = false;
            for y in 0..rows {
                for x in 0..cols {
                    let i = y * cols + x;
                    let Some(team) = cells[i] else { continue };
                    let mut neighbours = Vec::new();
                    if x + 1 < cols {
                        neighbours.push(i + 1);
                    }
                    if x > 0 {
                        neighbours.push(i - 1);
                    }
                    if y + 1 < rows {
                        neighbours.push(i + cols);
                    }
                    if y > 0 {
                        neighbours.push(i - cols);
                    }
                    for n in neighbours {
                        if cells[n] == Some(team) && labels[n] < labels[i] {
                            labels[i] = labels[n];
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        let mut counts = std::collections::HashMap::new();
        for (i, cell) in cells.iter().enumerate() {
            if cell.is_some() {
                *counts.entry(labels[i]).or_insert(0usize) += 1;
            }
        }
        counts.values().any(|&c| c >= 3)
    }

    fn board_strategy() -> impl Strategy<Value = (usize, usize, Vec<Option<Team>>)> {
        (1usize..7, 1usize..7).prop_flat_map(|(cols, rows)| {
            let cell = prop_oneof![1 => Just(None), 4 => (0u8..3).prop_map(Some)];
            (Just(cols), Just(rows), prop::collection::vec(cell, cols * rows))
        })
    }

    proptest! {
        #[test]
        fn prop_find_without_marking_matches_brute_force((cols, rows, cells) in board_strategy()) {
            let grid_rows: Vec<Vec<Option<Team>>> = cells.chunks(cols).map(|c| c.to_vec()).collect();
            let (grid, bounds) = grid_from(&grid_rows);
            let before = grid.clone();

            let scan = find_matches(&grid, bounds, 3, false);

            prop_assert_eq!(scan.found, brute_force_has_match(&cells, cols, rows));
            prop_assert_eq!(grid, before);
        }

        #[test]
        fn prop_marked_removal_has_no_duplicates((cols, _rows, cells) in board_strategy()) {
            let grid_rows: Vec<Vec<Option<Team>>> = cells.chunks(cols).map(|c| c.to_vec()).collect();
            let (grid, bounds) = grid_from(&grid_rows);
            let scan = find_matches(&grid, bounds, 3, true);

            let distinct: HashSet<BlockId> = scan.regions.iter().flat_map(|r| r.blocks.iter().copied()).collect();
            let unique: HashSet<BlockId> = scan.to_remove.iter().copied().collect();
            prop_assert_eq!(unique.len(), scan.to_remove.len());
            prop_assert_eq!(scan.to_remove.len(), distinct.len());
        }

        #[test]
        fn prop_dedup_of_overlapping_regions(regions in prop::collection::vec(prop::collection::vec(0u32..20, 0..8), 0..6)) {
            let all: Vec<BlockId> = regions.iter().flatten().map(|&i| BlockId(i)).collect();
            let distinct: HashSet<BlockId> = all.iter().copied().collect();
            let deduped = dedup_by_identity(all);
            let unique: HashSet<BlockId> = deduped.iter().copied().collect();
            prop_assert_eq!(unique.len(), deduped.len());
            prop_assert_eq!(deduped.len(), distinct.len());
        }
    }
}
