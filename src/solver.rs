//
// Two solvers for Hashiwokakero grids: deterministic rule propagation
// with a speculative-repair fallback, and exhaustive backtracking.
//
// Copyright 2021 Simon Frankau
//

use log::debug;

use crate::grid::{Coord, Direction, Grid, ALL_DIRS};

////////////////////////////////////////////////////////////////////////
// Moves
//

// A candidate bridge, identified by its origin island, direction and
// destination island. Compared by value so a failed speculation can
// be recognised if it comes up again.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Move {
    from: Coord,
    dir: Direction,
    to: Coord,
}

impl Move {
    fn new(from: Coord, dir: Direction, to: Coord) -> Move {
        Move { from, dir, to }
    }

    fn can_build(&self, grid: &Grid) -> bool {
        grid.can_build_bridge(self.from, self.dir, self.to)
    }

    fn build(&self, grid: &mut Grid) {
        grid.build_bridge(self.from, self.dir, self.to);
    }

    fn remove(&self, grid: &mut Grid) {
        grid.remove_bridge(self.from, self.dir, self.to);
    }
}

////////////////////////////////////////////////////////////////////////
// Rule propagation with speculative repair
//

// Apply the two forced-move rules until they stall, then try building
// a single speculative bridge and recurse. A failed speculation is
// remembered and never speculated again, but this is one repair step,
// not a search: some solvable grids are beyond it, and that's what
// the backtracking solver is for. On failure the grid is cleared.
pub fn solve_by_rules(grid: &mut Grid) -> bool {
    let solved = match grid.find_first_island() {
        Some(start) => {
            let mut solver = RuleSolver {
                grid: &mut *grid,
                invalid: Vec::new(),
            };
            solver.solve(start)
        }
        None => grid.is_valid_grid(),
    };
    if !solved {
        debug!("rule solver failed, clearing the grid");
        grid.clear();
    }
    solved
}

struct RuleSolver<'a> {
    grid: &'a mut Grid,
    invalid: Vec<Move>,
}

impl<'a> RuleSolver<'a> {
    fn solve(&mut self, start: Coord) -> bool {
        // All islands satisfied but in separate components: dead end.
        if self.grid.not_connected_grid() {
            return false;
        }
        loop {
            let changed = self.sweep(start);
            if self.grid.is_valid_grid() {
                return true;
            }
            if !changed {
                break;
            }
        }
        // Propagation stalled. Speculate on one bridge; if that line
        // fails, blacklist it, take it back, and try once more.
        if let Some(mv) = self.build_first_open_bridge(start) {
            if self.solve(start) {
                return true;
            }
            self.invalid.push(mv);
            mv.remove(self.grid);
            if self.solve(start) {
                return true;
            }
        }
        false
    }

    // One pass over every island in raster order. True if anything
    // was built.
    fn sweep(&mut self, start: Coord) -> bool {
        let mut changed = false;
        let mut island = Some(start);
        while let Some(c) = island {
            changed |= self.build_forced_bridges(c);
            island = self.grid.find_next_island(c);
        }
        changed
    }

    // The two game rules. With V bridges still needed and N
    // accessible neighbours that can take more: V even and V/2 == N
    // forces a double bridge to every neighbour; V odd and
    // (V+1)/2 == N forces a single bridge to every neighbour, except
    // that a last bridge never pairs two 1-islands off into their own
    // component.
    fn build_forced_bridges(&mut self, island: Coord) -> bool {
        let value = self.grid.island(island).remaining() as usize;
        let neighbours = self.grid.accessible_neighbour_count(island);
        let per_neighbour = if value % 2 == 0 && value / 2 == neighbours {
            2
        } else if value % 2 == 1 && (value + 1) / 2 == neighbours {
            1
        } else {
            0
        };
        if per_neighbour == 0 {
            return false;
        }

        let mut changed = false;
        for &dir in ALL_DIRS {
            let neighbour = match self.grid.find_neighbour_from(island, dir) {
                Some(neighbour) => neighbour,
                None => continue,
            };
            if value == 1 && self.grid.island(neighbour).valence() == 1 {
                continue;
            }
            let mv = Move::new(island, dir, neighbour);
            if mv.can_build(self.grid) {
                mv.build(self.grid);
                changed = true;
                if per_neighbour > 1 {
                    mv.build(self.grid);
                }
            }
        }
        changed
    }

    // First legal bridge, in raster/direction order, that hasn't
    // already failed as a speculation. Builds it.
    fn build_first_open_bridge(&mut self, start: Coord) -> Option<Move> {
        let mut island = Some(start);
        while let Some(c) = island {
            for &dir in ALL_DIRS {
                if let Some(neighbour) = self.grid.find_neighbour_from(c, dir) {
                    let mv = Move::new(c, dir, neighbour);
                    if !self.invalid.contains(&mv) && mv.can_build(self.grid) {
                        debug!("speculating on {:?}", mv);
                        mv.build(self.grid);
                        return Some(mv);
                    }
                }
            }
            island = self.grid.find_next_island(c);
        }
        None
    }
}

////////////////////////////////////////////////////////////////////////
// Backtracking search
//

// Depth-first trial and undo over bridges, islands visited in raster
// order. On failure the grid is cleared.
pub fn solve_by_backtracking(grid: &mut Grid) -> bool {
    let solved = match grid.find_first_island() {
        Some(start) => backtrack(grid, start),
        None => grid.is_valid_grid(),
    };
    if !solved {
        debug!("backtracking found no solution, clearing the grid");
        grid.clear();
    }
    solved
}

fn backtrack(grid: &mut Grid, island: Coord) -> bool {
    if grid.is_valid_grid() {
        return true;
    }
    // Lock this island against re-entry while we explore from it.
    grid.set_evaluated(island, true);
    // Two passes per direction reach both a single and a double
    // bridge to the same neighbour: a first-pass bridge survives a
    // failed recursion, the second pass stacks one on top or clears
    // up afterwards.
    for pass in 0..2 {
        for &dir in ALL_DIRS {
            let next = match grid.find_neighbour_from(island, dir) {
                Some(next) => next,
                None => continue,
            };
            if grid.is_evaluated(next) {
                continue;
            }
            let mv = Move::new(island, dir, next);
            mv.build(grid);
            if backtrack(grid, next) {
                grid.set_evaluated(island, false);
                return true;
            }
            if pass > 0 {
                mv.remove(grid);
            }
        }
    }
    grid.set_evaluated(island, false);
    false
}

////////////////////////////////////////////////////////////////////////
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> Grid {
        let capacities: Vec<Vec<u8>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| ch.to_digit(10).unwrap() as u8)
                    .collect()
            })
            .collect();
        Grid::from_capacities(&capacities)
    }

    fn c(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    fn assert_no_marks(grid: &Grid) {
        for row in 0..grid.size() {
            for col in 0..grid.size() {
                assert!(!grid.is_evaluated(c(row, col)));
            }
        }
    }

    #[test]
    fn test_rules_solves_pair_of_ones() {
        let mut grid = grid_from(&["11", "00"]);
        // The 1-1 rule blocks the forced move; speculation finishes it.
        assert!(solve_by_rules(&mut grid));
        assert!(grid.is_valid_grid());
        assert_eq!(grid.island(c(0, 0)).placed(Direction::East), 1);
        assert_eq!(grid.island(c(0, 1)).placed(Direction::West), 1);
    }

    #[test]
    fn test_rules_builds_forced_double() {
        let mut grid = grid_from(&["202", "000", "000"]);
        assert!(solve_by_rules(&mut grid));
        assert!(grid.is_valid_grid());
        assert_eq!(grid.bridge_at(c(0, 1)).unwrap().count(), 2);
    }

    #[test]
    fn test_rules_builds_long_double() {
        let mut grid = grid_from(&["2002", "0000", "0000", "0000"]);
        assert!(solve_by_rules(&mut grid));
        assert_eq!(grid.bridge_at(c(0, 1)).unwrap().count(), 2);
        assert_eq!(grid.bridge_at(c(0, 2)).unwrap().count(), 2);
    }

    #[test]
    fn test_rules_unsatisfiable_clears_grid() {
        let fresh = grid_from(&["3"]);
        let mut grid = fresh.clone();
        assert!(!solve_by_rules(&mut grid));
        assert_eq!(grid, fresh);
    }

    #[test]
    fn test_rules_rejects_dead_disconnected_grid() {
        let mut grid = grid_from(&["11", "11"]);
        grid.build_bridge(c(0, 0), Direction::East, c(0, 1));
        grid.build_bridge(c(1, 0), Direction::East, c(1, 1));
        // Every island is satisfied but the pairs are separate
        // components, so the solver must give up immediately.
        assert!(!solve_by_rules(&mut grid));
        assert_eq!(grid.island(c(0, 0)).placed_total(), 0);
    }

    #[test]
    fn test_rules_solves_chain() {
        let mut grid = grid_from(&[
            "200003", "000000", "000000", "000000", "000000", "100002",
        ]);
        assert!(solve_by_rules(&mut grid));
        assert!(grid.is_valid_grid());
        // Double to the 3, singles down and across.
        assert_eq!(grid.bridge_at(c(0, 1)).unwrap().count(), 2);
        assert_eq!(grid.bridge_at(c(1, 5)).unwrap().count(), 1);
        assert_eq!(grid.bridge_at(c(5, 1)).unwrap().count(), 1);
        assert_eq!(grid.bridge_at(c(1, 0)), None);
    }

    #[test]
    fn test_rules_incomplete_on_ring() {
        // Four corner 2s want a ring of singles. The first
        // speculation walks into a dead end whose forced moves
        // poison the retries, so the rule solver never finds it.
        // This is the documented limit of single-step repair.
        let fresh = grid_from(&[
            "200002", "000000", "000000", "000000", "000000", "200002",
        ]);
        let mut grid = fresh.clone();
        assert!(!solve_by_rules(&mut grid));
        assert_eq!(grid, fresh);
        assert_no_marks(&grid);
    }

    #[test]
    fn test_backtracking_solves_pair_of_ones() {
        let mut grid = grid_from(&["11", "00"]);
        assert!(solve_by_backtracking(&mut grid));
        assert!(grid.is_valid_grid());
        assert_eq!(grid.island(c(0, 0)).placed(Direction::East), 1);
    }

    #[test]
    fn test_backtracking_reaches_double_bridge() {
        let mut grid = grid_from(&["202", "000", "000"]);
        assert!(solve_by_backtracking(&mut grid));
        assert_eq!(grid.bridge_at(c(0, 1)).unwrap().count(), 2);
        assert_no_marks(&grid);
    }

    #[test]
    fn test_backtracking_mixes_multiplicities() {
        let mut grid = grid_from(&["302", "000", "100"]);
        assert!(solve_by_backtracking(&mut grid));
        assert!(grid.is_valid_grid());
        assert_eq!(grid.island(c(0, 0)).placed(Direction::East), 2);
        assert_eq!(grid.island(c(0, 0)).placed(Direction::South), 1);
    }

    #[test]
    fn test_backtracking_solves_ring() {
        let mut grid = grid_from(&[
            "200002", "000000", "000000", "000000", "000000", "200002",
        ]);
        assert!(solve_by_backtracking(&mut grid));
        assert!(grid.is_valid_grid());
        // A ring of singles round the edge.
        assert_eq!(grid.bridge_at(c(0, 1)).unwrap().count(), 1);
        assert_eq!(grid.bridge_at(c(1, 0)).unwrap().count(), 1);
        assert_eq!(grid.bridge_at(c(5, 1)).unwrap().count(), 1);
        assert_eq!(grid.bridge_at(c(1, 5)).unwrap().count(), 1);
        assert_no_marks(&grid);
    }

    #[test]
    fn test_backtracking_unsatisfiable_clears_grid() {
        let fresh = grid_from(&["3"]);
        let mut grid = fresh.clone();
        assert!(!solve_by_backtracking(&mut grid));
        assert_eq!(grid, fresh);
        assert_no_marks(&grid);
    }

    #[test]
    fn test_backtracking_rejects_unreachable_islands() {
        let fresh = grid_from(&["10", "01"]);
        let mut grid = fresh.clone();
        assert!(!solve_by_backtracking(&mut grid));
        assert_eq!(grid, fresh);
    }

    #[test]
    fn test_backtracking_accepts_solved_grid() {
        let mut grid = grid_from(&["11", "00"]);
        grid.build_bridge(c(0, 0), Direction::East, c(0, 1));
        assert!(solve_by_backtracking(&mut grid));
        // Already solved: nothing should have been touched.
        assert_eq!(grid.island(c(0, 0)).placed(Direction::East), 1);
        assert_no_marks(&grid);
    }
}
