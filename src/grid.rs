//
// Grid model for Hashiwokakero: islands, bridges, and the operations
// that keep them and the reachability graph consistent.
//
// Copyright 2021 Simon Frankau
//

use std::collections::HashMap;
use std::fmt;

use crate::graph::Graph;

////////////////////////////////////////////////////////////////////////
// Coordinates and directions
//

// (0, 0) is the NW corner; row grows southwards, col grows eastwards.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Coord {
        Coord { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// There are 4 directions from an island.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

// Fixed enumeration order. The solvers and the generator scan
// directions in this order, so it is part of observable behaviour.
pub const ALL_DIRS: &[Direction] = &[
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

// The (row, col) steps to move N E S W respectively.
const DIRECTION_STEPS: &[(isize, isize); 4] = &[(-1, 0), (0, 1), (1, 0), (0, -1)];

impl Direction {
    pub fn step(&self) -> (isize, isize) {
        DIRECTION_STEPS[*self as usize]
    }

    pub fn flip(&self) -> Direction {
        match *self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(*self, Direction::North | Direction::South)
    }

    pub fn is_horizontal(&self) -> bool {
        !self.is_vertical()
    }
}

////////////////////////////////////////////////////////////////////////
// Bridges
//

// At most two parallel bridges may join a pair of islands.
pub const BRIDGE_LIMIT: u8 = 2;

// One cell of an occupied segment between two islands. A cell with no
// bridge at all is represented by the absence of a Bridge, so the
// count here is always 1 or 2.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Bridge {
    direction: Direction,
    count: u8,
}

impl Bridge {
    pub fn new(direction: Direction, count: u8) -> Bridge {
        assert!(count >= 1 && count <= BRIDGE_LIMIT);
        Bridge { direction, count }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    fn add_parallel(&mut self) {
        assert!(self.count < BRIDGE_LIMIT);
        self.count += 1;
    }

    fn remove_parallel(&mut self) {
        assert!(self.count == BRIDGE_LIMIT);
        self.count -= 1;
    }
}

////////////////////////////////////////////////////////////////////////
// Islands
//

const MAX_VALENCE: u8 = 8;

// An island tracks its printed number (the valence), how many bridges
// it has placed in each direction, and which island each of those
// bridges reaches. The running total is kept alongside so capacity
// checks don't need to re-sum.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Island {
    valence: u8,
    placed: [u8; 4],
    neighbours: [Option<Coord>; 4],
    total: u8,
}

impl Island {
    fn new(valence: u8) -> Island {
        assert!(valence >= 1 && valence <= MAX_VALENCE);
        Island {
            valence,
            placed: [0; 4],
            neighbours: [None; 4],
            total: 0,
        }
    }

    pub fn valence(&self) -> u8 {
        self.valence
    }

    pub fn placed(&self, dir: Direction) -> u8 {
        self.placed[dir as usize]
    }

    pub fn placed_total(&self) -> u8 {
        self.total
    }

    pub fn remaining(&self) -> u8 {
        self.valence - self.total
    }

    pub fn is_complete(&self) -> bool {
        self.total == self.valence
    }

    pub fn neighbour(&self, dir: Direction) -> Option<Coord> {
        self.neighbours[dir as usize]
    }

    pub fn is_neighbour(&self, dir: Direction, c: Coord) -> bool {
        self.neighbour(dir) == Some(c)
    }

    // Both ends need spare valence, and both ends need room for
    // another parallel bridge on this axis.
    pub fn can_build_bridge(&self, dir: Direction, other: &Island) -> bool {
        self.total < self.valence
            && other.total < other.valence
            && self.placed(dir) < BRIDGE_LIMIT
            && other.placed(dir.flip()) < BRIDGE_LIMIT
    }

    // Single-sided update; the grid applies the symmetric update to
    // the island at the other end.
    fn add_bridge(&mut self, dir: Direction, neighbour: Coord) {
        assert!(self.placed[dir as usize] < BRIDGE_LIMIT);
        assert!(self.total < self.valence);
        self.placed[dir as usize] += 1;
        self.total += 1;
        self.neighbours[dir as usize] = Some(neighbour);
    }

    fn remove_bridge(&mut self, dir: Direction) {
        assert!(self.placed[dir as usize] > 0);
        self.placed[dir as usize] -= 1;
        self.total -= 1;
        if self.placed[dir as usize] == 0 {
            self.neighbours[dir as usize] = None;
        }
    }

    fn clear_bridges(&mut self) {
        self.placed = [0; 4];
        self.neighbours = [None; 4];
        self.total = 0;
    }
}

////////////////////////////////////////////////////////////////////////
// The grid
//

// Islands and bridge cells live in parallel square matrices, with a
// third matrix of "evaluated" marks used by the backtracking solver.
// Each island also gets a dense index (raster order) into the
// reachability graph. Bridge operations keep all of these in sync.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grid {
    size: usize,
    islands: Vec<Vec<Option<Island>>>,
    bridges: Vec<Vec<Option<Bridge>>>,
    evaluated: Vec<Vec<bool>>,
    index_of: HashMap<Coord, usize>,
    island_count: usize,
    graph: Graph,
}

impl Grid {
    // Build a bridgeless grid from a square matrix of island values,
    // 0 meaning "no island here".
    pub fn from_capacities(capacities: &[Vec<u8>]) -> Grid {
        let size = capacities.len();
        assert!(
            capacities.iter().all(|row| row.len() == size),
            "capacity matrix must be square"
        );

        let mut islands: Vec<Vec<Option<Island>>> = vec![vec![None; size]; size];
        let mut index_of = HashMap::new();
        let mut island_count = 0;
        for (row, values) in capacities.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value > 0 {
                    islands[row][col] = Some(Island::new(value));
                    index_of.insert(Coord::new(row, col), island_count);
                    island_count += 1;
                }
            }
        }

        Grid {
            size,
            islands,
            bridges: vec![vec![None; size]; size],
            evaluated: vec![vec![false; size]; size],
            index_of,
            island_count,
            graph: Graph::new(island_count),
        }
    }

    // Build a grid from a capacity matrix plus a matrix of bridge
    // cells, replaying each segment through build_bridge so island
    // counters and graph edges come out consistent.
    pub fn with_bridges(capacities: &[Vec<u8>], bridges: &[Vec<Option<Bridge>>]) -> Grid {
        let mut grid = Grid::from_capacities(capacities);
        assert!(bridges.len() == grid.size);
        assert!(bridges.iter().all(|row| row.len() == grid.size));

        // Scanning east and south from each island visits every
        // segment exactly once, from its west or north end.
        let mut island = grid.find_first_island();
        while let Some(from) = island {
            for &dir in &[Direction::East, Direction::South] {
                if let Some((to, count)) = segment_from(bridges, &grid, from, dir) {
                    for _ in 0..count {
                        grid.build_bridge(from, dir, to);
                    }
                }
            }
            island = grid.find_next_island(from);
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn island_count(&self) -> usize {
        self.island_count
    }

    // TODO: tighten the column bound to col < size once confirmed
    // nothing relies on the boundary value.
    pub fn is_valid_coord(&self, c: Coord) -> bool {
        c.row < self.size && c.col <= self.size
    }

    pub fn island(&self, c: Coord) -> &Island {
        if let Some(island) = &self.islands[c.row][c.col] {
            island
        } else {
            panic!("Expected island at {}", c)
        }
    }

    fn island_mut(&mut self, c: Coord) -> &mut Island {
        if let Some(island) = &mut self.islands[c.row][c.col] {
            island
        } else {
            panic!("Expected island at {}", c)
        }
    }

    pub fn island_at(&self, c: Coord) -> Option<&Island> {
        self.islands[c.row][c.col].as_ref()
    }

    pub fn bridge_at(&self, c: Coord) -> Option<Bridge> {
        self.bridges[c.row][c.col]
    }

    // Aligned on a row or column. Doesn't check what lies between.
    pub fn are_neighbours(&self, a: Coord, b: Coord) -> bool {
        a.row == b.row || a.col == b.col
    }

    pub fn can_build_bridge(&self, from: Coord, dir: Direction, to: Coord) -> bool {
        assert!(self.is_valid_coord(from) && self.is_valid_coord(to));
        if !self.are_neighbours(from, to) {
            return false;
        }
        // A second parallel bridge reuses a path already verified
        // clear, so only scan for obstructions when laying the first.
        // A bridge already laid that way also fixes which island it
        // joins.
        if self.island(from).placed(dir) == 0 {
            for c in self.internal_coords(from, dir, to) {
                if self.bridges[c.row][c.col].is_some() {
                    return false;
                }
            }
        } else if !self.island(from).is_neighbour(dir, to) {
            return false;
        }
        self.island(from).can_build_bridge(dir, self.island(to))
    }

    pub fn can_remove_bridge(&self, from: Coord, dir: Direction, to: Coord) -> bool {
        assert!(self.is_valid_coord(from) && self.is_valid_coord(to));
        self.island(from).is_neighbour(dir, to)
    }

    // Guarded command: does nothing when the bridge can't legally be
    // built. Updates both islands, the path cells, and the graph.
    pub fn build_bridge(&mut self, from: Coord, dir: Direction, to: Coord) {
        if !self.can_build_bridge(from, dir, to) {
            return;
        }
        self.island_mut(from).add_bridge(dir, to);
        self.island_mut(to).add_bridge(dir.flip(), from);
        for c in self.internal_coords(from, dir, to) {
            let cell = &mut self.bridges[c.row][c.col];
            match cell {
                Some(bridge) => bridge.add_parallel(),
                None => *cell = Some(Bridge::new(dir, 1)),
            }
        }
        let i = self.index_of[&from];
        let j = self.index_of[&to];
        self.graph.add_edge(i, j);
        self.graph.add_edge(j, i);
    }

    // Guarded command, the inverse of build_bridge. The graph edge
    // only goes away once the last parallel bridge does.
    pub fn remove_bridge(&mut self, from: Coord, dir: Direction, to: Coord) {
        if !self.can_remove_bridge(from, dir, to) {
            return;
        }
        self.island_mut(from).remove_bridge(dir);
        self.island_mut(to).remove_bridge(dir.flip());
        for c in self.internal_coords(from, dir, to) {
            let cell = &mut self.bridges[c.row][c.col];
            match cell {
                Some(bridge) if bridge.count() == BRIDGE_LIMIT => bridge.remove_parallel(),
                Some(_) => *cell = None,
                None => panic!("Expected bridge at {}", c),
            }
        }
        if self.island(from).placed(dir) == 0 {
            let i = self.index_of[&from];
            let j = self.index_of[&to];
            assert!(self.graph.are_accessible(i, j));
            self.graph.remove_edge(i, j);
            self.graph.remove_edge(j, i);
        }
    }

    // Cells strictly between two aligned islands. Walking off the
    // grid means the arguments weren't aligned, which is a bug at the
    // call site.
    fn internal_coords(&self, from: Coord, dir: Direction, to: Coord) -> Vec<Coord> {
        let (step_row, step_col) = dir.step();
        let size = self.size as isize;
        let mut coords = Vec::new();
        let (mut row, mut col) = (from.row as isize + step_row, from.col as isize + step_col);
        loop {
            let c = Coord::new(row as usize, col as usize);
            if c == to {
                return coords;
            }
            assert!(row >= 0 && row < size && col >= 0 && col < size);
            coords.push(c);
            row += step_row;
            col += step_col;
        }
    }

    // Raycast to the next island in a direction. A bridge crossing
    // the path blocks it, unless we already have a bridge of our own
    // that way (in which case the path is ours).
    pub fn find_neighbour_from(&self, from: Coord, dir: Direction) -> Option<Coord> {
        assert!(self.is_valid_coord(from));
        let (step_row, step_col) = dir.step();
        let size = self.size as isize;
        let (mut row, mut col) = (from.row as isize, from.col as isize);
        let mut crossed_bridge = false;
        loop {
            row += step_row;
            col += step_col;
            if row < 0 || row >= size || col < 0 || col >= size {
                return None;
            }
            let c = Coord::new(row as usize, col as usize);
            if self.islands[c.row][c.col].is_some() {
                if crossed_bridge && self.island(from).placed(dir) == 0 {
                    return None;
                }
                return Some(c);
            }
            if self.bridges[c.row][c.col].is_some() {
                crossed_bridge = true;
            }
        }
    }

    // How many directions lead to a neighbour that can still take
    // more bridges.
    pub fn accessible_neighbour_count(&self, from: Coord) -> usize {
        ALL_DIRS
            .iter()
            .filter_map(|&dir| self.find_neighbour_from(from, dir))
            .filter(|&n| !self.island(n).is_complete())
            .count()
    }

    pub fn find_first_island(&self) -> Option<Coord> {
        for row in 0..self.size {
            for col in 0..self.size {
                if self.islands[row][col].is_some() {
                    return Some(Coord::new(row, col));
                }
            }
        }
        None
    }

    // Next island in raster order, or None once past the last one.
    pub fn find_next_island(&self, from: Coord) -> Option<Coord> {
        let mut row = from.row;
        let mut col = from.col + 1;
        while row < self.size {
            while col < self.size {
                if self.islands[row][col].is_some() {
                    return Some(Coord::new(row, col));
                }
                col += 1;
            }
            col = 0;
            row += 1;
        }
        None
    }

    fn valid_bridge_counts(&self) -> bool {
        self.islands
            .iter()
            .flatten()
            .flatten()
            .all(|island| island.placed_total() == island.valence())
    }

    // Solved: every island satisfied, everything reachable.
    pub fn is_valid_grid(&self) -> bool {
        self.valid_bridge_counts() && self.graph.is_connected()
    }

    // Every island satisfied but the grid splits into separate
    // components; no further building can rescue it.
    pub fn not_connected_grid(&self) -> bool {
        self.valid_bridge_counts() && !self.graph.is_connected()
    }

    pub fn set_evaluated(&mut self, c: Coord, value: bool) {
        self.evaluated[c.row][c.col] = value;
    }

    pub fn is_evaluated(&self, c: Coord) -> bool {
        self.evaluated[c.row][c.col]
    }

    // Remove all bridges and marks, keeping the islands. The result
    // compares equal to a freshly-built grid.
    pub fn clear(&mut self) {
        for row in self.bridges.iter_mut() {
            for cell in row.iter_mut() {
                *cell = None;
            }
        }
        for row in self.evaluated.iter_mut() {
            for cell in row.iter_mut() {
                *cell = false;
            }
        }
        for island in self.islands.iter_mut().flatten().flatten() {
            island.clear_bridges();
        }
        self.graph.clear();
    }
}

// Read one bridge segment leaving an island in a raw bridge-cell
// matrix: the adjacent cell decides whether there is one (its axis
// must match), the walk finds the island at the far end.
fn segment_from(
    bridges: &[Vec<Option<Bridge>>],
    grid: &Grid,
    from: Coord,
    dir: Direction,
) -> Option<(Coord, u8)> {
    let (step_row, step_col) = dir.step();
    let size = grid.size() as isize;
    let (mut row, mut col) = (from.row as isize + step_row, from.col as isize + step_col);
    if row < 0 || row >= size || col < 0 || col >= size {
        return None;
    }
    let count = match bridges[row as usize][col as usize] {
        Some(b) if b.direction() == dir || b.direction() == dir.flip() => b.count(),
        _ => return None,
    };
    loop {
        let c = Coord::new(row as usize, col as usize);
        if grid.island_at(c).is_some() {
            return Some((c, count));
        }
        row += step_row;
        col += step_col;
        assert!(
            row >= 0 && row < size && col >= 0 && col < size,
            "bridge runs off the grid"
        );
    }
}

////////////////////////////////////////////////////////////////////////
// Tests
//
