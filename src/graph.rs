//
// Reachability graph over the islands of a Hashiwokakero grid.
//
// Copyright 2021 Simon Frankau
//

////////////////////////////////////////////////////////////////////////
// Adjacency-matrix graph
//

// Vertices are the dense indices the grid assigns to its islands, in
// raster order. Edges are directed cells in the matrix; callers that
// want symmetry (the grid does) must set both directions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Graph {
    matrix: Vec<Vec<bool>>,
    vertex_count: usize,
}

impl Graph {
    pub fn new(vertex_count: usize) -> Graph {
        assert!(vertex_count > 0, "graph needs at least one vertex");
        Graph {
            matrix: vec![vec![false; vertex_count]; vertex_count],
            vertex_count,
        }
    }

    pub fn are_accessible(&self, i: usize, j: usize) -> bool {
        assert!(i < self.vertex_count && j < self.vertex_count);
        self.matrix[i][j]
    }

    pub fn add_edge(&mut self, i: usize, j: usize) {
        assert!(i < self.vertex_count && j < self.vertex_count);
        self.matrix[i][j] = true;
    }

    pub fn remove_edge(&mut self, i: usize, j: usize) {
        assert!(i < self.vertex_count && j < self.vertex_count);
        self.matrix[i][j] = false;
    }

    pub fn clear(&mut self) {
        for row in self.matrix.iter_mut() {
            for cell in row.iter_mut() {
                *cell = false;
            }
        }
    }

    // True iff every vertex can reach every other. A single vertex is
    // trivially connected.
    pub fn is_connected(&self) -> bool {
        let reach = self.roy_warshall();
        reach.iter().all(|row| row.iter().all(|&cell| cell))
    }

    // Reflexive-transitive closure of the adjacency matrix.
    fn roy_warshall(&self) -> Vec<Vec<bool>> {
        let mut reach = self.matrix.clone();
        for (i, row) in reach.iter_mut().enumerate() {
            row[i] = true;
        }
        for k in 0..self.vertex_count {
            for i in 0..self.vertex_count {
                for j in 0..self.vertex_count {
                    reach[i][j] = reach[i][j] || (reach[i][k] && reach[k][j]);
                }
            }
        }
        reach
    }
}

////////////////////////////////////////////////////////////////////////
// Tests
//
