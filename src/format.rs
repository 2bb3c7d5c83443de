//
// Text formats for puzzles: parsing island grids from digit text, and
// rendering grids (with or without bridges) back out.
//
// Copyright 2021 Simon Frankau
//

use std::fmt::{self, Write};

use thiserror::Error;

use crate::grid::{Bridge, Coord, Grid};

////////////////////////////////////////////////////////////////////////
// Parsing
//

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("puzzle is empty")]
    Empty,
    #[error("line {line}: expected {expected} digits, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: island value {value} is outside 0-8")]
    ValueRange { line: usize, value: u8 },
}

// Read a capacity matrix from lines of text. Non-digit characters are
// decoration and get stripped, so "2 0 2" and "202" parse alike. The
// first line containing digits fixes the grid size.
pub fn parse_capacities<'a, I>(lines: I) -> Result<Vec<Vec<u8>>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut rows: Vec<Vec<u8>> = Vec::new();
    let mut size = 0;

    for (index, line) in lines.into_iter().enumerate() {
        let digits: Vec<u8> = line
            .chars()
            .filter(|c| c.is_ascii_digit())
            .map(|c| c as u8 - b'0')
            .collect();

        if size == 0 {
            if digits.is_empty() {
                return Err(ParseError::Empty);
            }
            size = digits.len();
        } else if rows.len() == size {
            // Ignore anything after a full grid.
            break;
        }

        if digits.len() != size {
            return Err(ParseError::RowLength {
                line: index + 1,
                expected: size,
                found: digits.len(),
            });
        }
        if let Some(&value) = digits.iter().find(|&&value| value > 8) {
            return Err(ParseError::ValueRange {
                line: index + 1,
                value,
            });
        }
        rows.push(digits);
    }

    if rows.is_empty() {
        return Err(ParseError::Empty);
    }
    // Missing trailing rows are treated as empty.
    rows.resize(size, vec![0; size]);
    Ok(rows)
}

////////////////////////////////////////////////////////////////////////
// Rendering
//

// The digit-matrix form that parse_capacities reads back.
pub fn capacity_text(capacities: &[Vec<u8>]) -> String {
    let mut text = String::new();
    for row in capacities {
        for &value in row {
            text.push((b'0' + value) as char);
        }
        text.push('\n');
    }
    text
}

fn bridge_char(bridge: Bridge) -> char {
    match (bridge.direction().is_horizontal(), bridge.count()) {
        (true, 1) => '-',
        (true, _) => '=',
        (false, 1) => '|',
        (false, _) => 'H',
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size() {
            for col in 0..self.size() {
                let coord = Coord::new(row, col);
                let cell = if let Some(island) = self.island_at(coord) {
                    (b'0' + island.valence()) as char
                } else if let Some(bridge) = self.bridge_at(coord) {
                    bridge_char(bridge)
                } else {
                    '.'
                };
                f.write_char(cell)?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// Tests
//
