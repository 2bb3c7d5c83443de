//
// Hashiwokakero solver and generator
//
// Copyright 2021 Simon Frankau
//

use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, Read, Write};

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand, ValueEnum};

mod format;
mod generator;
mod graph;
mod grid;
mod solver;

use crate::format::{capacity_text, parse_capacities};
use crate::generator::{Generator, AVAILABLE_SIZES};
use crate::grid::Grid;
use crate::solver::{solve_by_backtracking, solve_by_rules};

////////////////////////////////////////////////////////////////////////
// Command line
//

#[derive(Parser)]
#[command(version, author = "Simon Frankau <sgf@arbitrary.name>")]
#[command(about = "Hashiwokakero (Bridges) puzzle solver and generator")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle given as a digit grid.
    Solve {
        /// Input file. Uses stdin if none specified.
        #[arg(long)]
        input_file: Option<String>,
        /// Output file. Uses stdout if none specified.
        #[arg(long)]
        output_file: Option<String>,
        /// Solving strategy.
        #[arg(long, value_enum, default_value = "rules")]
        method: Method,
    },
    /// Generate a random solvable puzzle.
    Generate {
        /// Grid side length.
        #[arg(long)]
        size: usize,
        /// RNG seed, for reproducible puzzles.
        #[arg(long)]
        seed: Option<u64>,
        /// Output file. Uses stdout if none specified.
        #[arg(long)]
        output_file: Option<String>,
        /// Also print the solution the puzzle was generated from.
        #[arg(long)]
        show_solution: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Method {
    /// Rule propagation with a speculative fallback. Fast, but may
    /// give up on hard puzzles.
    Rules,
    /// Exhaustive backtracking search.
    Backtracking,
}

fn read_input(input_file: Option<&str>) -> Result<Vec<String>> {
    let file: Box<dyn Read> = match input_file {
        Some(name) => Box::new(File::open(name)?),
        None => Box::new(stdin()),
    };

    Ok(BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()?)
}

fn write_output(output_file: Option<&str>, s: &str) -> Result<()> {
    let mut file: Box<dyn Write> = match output_file {
        Some(name) => Box::new(File::create(name)?),
        None => Box::new(stdout()),
    };

    Ok(file.write_all(s.as_bytes())?)
}

////////////////////////////////////////////////////////////////////////
// Subcommands
//

fn run_solve(input_file: Option<&str>, output_file: Option<&str>, method: Method) -> Result<()> {
    let lines = read_input(input_file)?;
    let capacities = parse_capacities(lines.iter().map(String::as_str))?;
    ensure!(
        capacities.iter().flatten().any(|&value| value > 0),
        "the puzzle contains no islands"
    );

    let mut grid = Grid::from_capacities(&capacities);
    let solved = match method {
        Method::Rules => solve_by_rules(&mut grid),
        Method::Backtracking => solve_by_backtracking(&mut grid),
    };

    if solved {
        write_output(output_file, &grid.to_string())?;
    } else {
        eprintln!("No solutions");
    }
    Ok(())
}

fn run_generate(
    size: usize,
    seed: Option<u64>,
    output_file: Option<&str>,
    show_solution: bool,
) -> Result<()> {
    ensure!(
        AVAILABLE_SIZES.contains(&size),
        "--size must be one of {:?}",
        AVAILABLE_SIZES
    );

    let mut generator = match seed {
        Some(seed) => Generator::with_seed(size, seed),
        None => Generator::new(size),
    };
    generator.generate();

    write_output(output_file, &capacity_text(&generator.capacity_matrix()))?;
    if show_solution {
        if let Some(solution) = generator.last_generated_solution() {
            if output_file.is_none() {
                println!();
            }
            print!("{}", solution);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    match opts.command {
        Command::Solve {
            input_file,
            output_file,
            method,
        } => run_solve(input_file.as_deref(), output_file.as_deref(), method),
        Command::Generate {
            size,
            seed,
            output_file,
            show_solution,
        } => run_generate(size, seed, output_file.as_deref(), show_solution),
    }
}
