extern crate clap;

use std::fs;
use std::process;

use clap::{App, Arg};
use crossword_csp::{Crossword, Error, Solver};
use log::info;

fn main() {
    env_logger::init();

    let matches = App::new("run")
        .about("Fill a crossword structure with words from a list")
        .arg(
            Arg::with_name("structure")
                .value_name("STRUCTURE")
                .help("Structure file: `_` marks a cell to fill")
                .required(true),
        )
        .arg(
            Arg::with_name("words")
                .value_name("WORDS")
                .help("Word list, one word per line")
                .required(true),
        )
        .arg(
            Arg::with_name("text")
                .short("t")
                .long("text")
                .value_name("FILE")
                .help("Also write the filled grid as text to FILE"),
        )
        .get_matches();

    let structure = matches.value_of("structure").unwrap_or_default();
    let words = matches.value_of("words").unwrap_or_default();

    let puzzle = match Crossword::from_files(structure, words) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            eprintln!("failed to read puzzle: {}", err);
            process::exit(1);
        }
    };

    let solver = Solver::new(&puzzle);
    let assignment = match solver.solve() {
        Ok(assignment) => assignment,
        Err(Error::UnsatisfiableDomain(_)) | Err(Error::NoSolution) => {
            println!("No solution.");
            return;
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    info!("solved after {} guesses", solver.num_guesses());

    let grid = puzzle.render(&assignment);
    print!("{}", grid);

    if let Some(output) = matches.value_of("text") {
        if let Err(err) = fs::write(output, &grid) {
            eprintln!("failed to write {}: {}", output, err);
            process::exit(1);
        }
    }
}
