//
// Random generator for solvable Hashiwokakero instances. Grows a
// bridge network by random walks from a seed island, then reads the
// island values off the bridges it laid.
//
// Copyright 2021 Simon Frankau
//

use log::debug;
use rand::prelude::*;

use crate::grid::{Bridge, Direction, Grid, ALL_DIRS, BRIDGE_LIMIT};

////////////////////////////////////////////////////////////////////////
// Parameters
//

pub const AVAILABLE_SIZES: &[usize] = &[7, 10, 13];

// Cap on growth-loop attempts, counting failed walks.
const MAX_ITERATIONS: usize = 1000;

// Island marker used while the grid is being grown, before values are
// computed. 0 still means "no island here".
const UNKNOWN_ISLAND: i8 = -1;

// Half-open target range for the drawn island count, per side length.
fn island_range(size: usize) -> (usize, usize) {
    match size {
        7 => (9, 14),
        10 => (16, 28),
        13 => (25, 40),
        _ => panic!("no island range configured for size {}", size),
    }
}

////////////////////////////////////////////////////////////////////////
// The generator
//

pub struct Generator {
    size: usize,
    rng: SmallRng,
    islands: Vec<Vec<i8>>,
    bridges: Vec<Vec<Option<Bridge>>>,
    island_count: usize,
    last_puzzle: Option<Grid>,
    last_solution: Option<Grid>,
}

impl Generator {
    pub fn new(size: usize) -> Generator {
        Generator::with_rng(size, SmallRng::from_os_rng())
    }

    // Every random draw goes through the one seeded RNG, so a seed
    // reproduces the whole puzzle.
    pub fn with_seed(size: usize, seed: u64) -> Generator {
        Generator::with_rng(size, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(size: usize, rng: SmallRng) -> Generator {
        assert!(
            AVAILABLE_SIZES.contains(&size),
            "no island range configured for size {}",
            size
        );
        Generator {
            size,
            rng,
            islands: vec![vec![0; size]; size],
            bridges: vec![vec![None; size]; size],
            island_count: 0,
            last_puzzle: None,
            last_solution: None,
        }
    }

    // The puzzle as handed to a solver: islands only, no bridges.
    pub fn last_generated_grid(&self) -> Option<&Grid> {
        self.last_puzzle.as_ref()
    }

    // The fully-bridged grid the puzzle was read off.
    pub fn last_generated_solution(&self) -> Option<&Grid> {
        self.last_solution.as_ref()
    }

    pub fn capacity_matrix(&self) -> Vec<Vec<u8>> {
        self.islands
            .iter()
            .map(|row| row.iter().map(|&value| value as u8).collect())
            .collect()
    }

    pub fn generate(&mut self) {
        self.islands = vec![vec![0; self.size]; self.size];
        self.bridges = vec![vec![None; self.size]; self.size];
        self.island_count = 0;

        let (min_islands, max_islands) = island_range(self.size);
        let wanted = self.rng.random_range(min_islands..max_islands);

        self.place_seed_island();
        let mut iterations = 0;
        while self.island_count <= wanted && iterations < MAX_ITERATIONS {
            let from = self.choose_random_island();
            self.build_random_bridge_from(from);
            iterations += 1;
        }
        self.fill_island_values();
        debug!(
            "generated {} islands (target {}) in {} iterations",
            self.island_count, wanted, iterations
        );

        let capacities = self.capacity_matrix();
        self.last_solution = Some(Grid::with_bridges(&capacities, &self.bridges));
        self.last_puzzle = Some(Grid::from_capacities(&capacities));
        if let Some(puzzle) = self.last_generated_grid() {
            debug!("generated puzzle ({} islands):\n{}", puzzle.island_count(), puzzle);
        }
    }

    fn place_seed_island(&mut self) {
        let row = self.rng.random_range(0..self.size);
        let col = self.rng.random_range(0..self.size);
        self.place_island(row, col);
    }

    fn place_island(&mut self, row: usize, col: usize) {
        self.islands[row][col] = UNKNOWN_ISLAND;
        self.island_count += 1;
    }

    fn choose_random_island(&mut self) -> (usize, usize) {
        let mut islands = Vec::new();
        for row in 0..self.size {
            for col in 0..self.size {
                if self.islands[row][col] != 0 {
                    islands.push((row, col));
                }
            }
        }
        islands[self.rng.random_range(0..islands.len())]
    }

    // Walk from an island in a random direction, laying bridge cells
    // of a coin-flipped multiplicity, until the walk connects to an
    // existing island, crosses an existing bridge, runs out of room,
    // or a coin flip ends it with a fresh island.
    fn build_random_bridge_from(&mut self, from: (usize, usize)) {
        let dir = ALL_DIRS[self.rng.random_range(0..ALL_DIRS.len())];
        let (step_row, step_col) = dir.step();
        let size = self.size as isize;

        let (row, col) = (from.0 as isize + step_row, from.1 as isize + step_col);
        if row < 0 || row >= size || col < 0 || col >= size {
            return;
        }
        let (mut row, mut col) = (row as usize, col as usize);
        if !self.bridge_cell_allowed(dir, row, col)
            || self.islands[row][col] != 0
            || self.bridges[row][col].is_some()
        {
            return;
        }

        let count = if self.rng.random_bool(0.5) { 1 } else { BRIDGE_LIMIT };
        let mut laid = 0;

        loop {
            self.bridges[row][col] = Some(Bridge::new(dir, count));
            laid += 1;
            // The interior bound on the cell just laid keeps this
            // step on the grid.
            row = (row as isize + step_row) as usize;
            col = (col as isize + step_col) as usize;

            if self.islands[row][col] != 0 {
                // Connected to an existing island.
                return;
            }
            if self.bridges[row][col].is_some() {
                if self.can_put_island(dir, row, col) {
                    // Turn the crossing point into a junction island,
                    // splitting the bridge we ran into.
                    self.bridges[row][col] = None;
                    self.place_island(row, col);
                } else {
                    // Step back; keep the stub as a bridge to a new
                    // island only if a laid cell remains after giving
                    // this one up.
                    let prev_row = (row as isize - step_row) as usize;
                    let prev_col = (col as isize - step_col) as usize;
                    self.bridges[prev_row][prev_col] = None;
                    if laid >= 2 {
                        self.place_island(prev_row, prev_col);
                    }
                }
                return;
            }
            if !self.bridge_cell_allowed(dir, row, col) || self.rng.random_bool(0.5) {
                self.place_island(row, col);
                return;
            }
        }
    }

    // Bridge cells stay off the border rows/columns of their own
    // axis, leaving room for an island at each end.
    fn bridge_cell_allowed(&self, dir: Direction, row: usize, col: usize) -> bool {
        if dir.is_vertical() {
            row > 0 && row < self.size - 1
        } else {
            col > 0 && col < self.size - 1
        }
    }

    // A junction island must leave at least one cell of the crossed
    // bridge on each side, so neither flanking cell on its axis may
    // hold an island.
    fn can_put_island(&self, dir: Direction, row: usize, col: usize) -> bool {
        let (flank_row, flank_col): (isize, isize) =
            if dir.is_vertical() { (0, 1) } else { (1, 0) };
        let size = self.size as isize;
        for &sign in &[-1isize, 1] {
            let r = row as isize + sign * flank_row;
            let c = col as isize + sign * flank_col;
            if r < 0 || r >= size || c < 0 || c >= size {
                continue;
            }
            if self.islands[r as usize][c as usize] != 0 {
                return false;
            }
        }
        true
    }

    // An island's value is the sum of the multiplicities of the
    // adjacent bridge cells whose axis points at it.
    fn fill_island_values(&mut self) {
        for row in 0..self.size {
            for col in 0..self.size {
                if self.islands[row][col] == UNKNOWN_ISLAND {
                    self.islands[row][col] = self.near_bridge_count(row, col) as i8;
                }
            }
        }
    }

    fn near_bridge_count(&self, row: usize, col: usize) -> u8 {
        let mut total = 0;
        for &dir in ALL_DIRS {
            let (step_row, step_col) = dir.step();
            let r = row as isize + step_row;
            let c = col as isize + step_col;
            if r < 0 || r >= self.size as isize || c < 0 || c >= self.size as isize {
                continue;
            }
            if let Some(bridge) = self.bridges[r as usize][c as usize] {
                if bridge.direction() == dir || bridge.direction() == dir.flip() {
                    total += bridge.count();
                }
            }
        }
        total
    }
}

////////////////////////////////////////////////////////////////////////
// Tests
//
