use colored::*;
use std::{fs, path::Path, process};
use clap::Parser as ClapParser;

extern crate frontend;
extern crate runtime;

use frontend::{dump::dump_program, read_program};
use runtime::Interpreter;
use tools::{errors::CodeErr, logging::init_tracing};


// --------
//   CLI
// --------

#[derive(ClapParser)]
#[command(version)]
#[command(about = "Interpreter for pyrite syntax trees")]
struct CLI {
    /// Path to the prefix-notation program to run
    file: Option<String>,

    /// Prints the program back in prefix notation before running it
    #[arg(short, long)]
    ast_print: bool,

    /// Golden test mode. Runs a `.ast` file, or every one in `tests/` with
    /// 'all', and compares the output with the sibling `.out` file
    #[arg(short, long)]
    test: Option<String>,
}


fn open_file(file_path: &Path) -> Result<String, String> {
    fs::read_to_string(file_path)
        .map_err(|e| format!("Error opening file {}: {e}", file_path.display()))
}

fn report(err: &CodeErr) {
    eprintln!(
        "{} (line {}): {}",
        err.kind().red().bold(),
        err.line() + 1,
        err.message()
    );
}

// Output of the run and its fault, if any
fn run_source(source: &str, cli: &CLI) -> Result<(String, Option<CodeErr>), CodeErr> {
    let program = read_program(source)?;

    if cli.ast_print {
        println!("{}\n", dump_program(&program));
    }

    let mut interp = Interpreter::new();
    let res = interp.interpret(&program);

    Ok((interp.output().to_string(), res.err()))
}

fn interpret_file(file_path: &Path, cli: &CLI) -> bool {
    let source = match open_file(file_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e.red());
            return false;
        }
    };

    match run_source(&source, cli) {
        Ok((output, fault)) => {
            print!("{output}");

            match fault {
                Some(e) => {
                    report(&e);
                    false
                }
                None => true,
            }
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

// --------
//  Golden
// --------

// A faulted run is expected to end with its `Kind: message` line
fn test_file(file_path: &Path, cli: &CLI) -> bool {
    let expected_path = file_path.with_extension("out");

    let outcome = open_file(file_path).and_then(|source| {
        let expected = open_file(&expected_path)?;
        let (mut output, fault) = run_source(&source, cli).map_err(|e| e.to_string())?;

        if let Some(e) = fault {
            output.push_str(&format!("{e}\n"));
        }

        Ok((output, expected))
    });

    let name = file_path.display().to_string();

    match outcome {
        Ok((output, expected)) if output == expected => {
            println!("{} {}", "Ok".green().bold(), name);
            true
        }
        Ok((output, expected)) => {
            println!("{} {}", "Ko".red().bold(), name);
            println!("  expected:\n{}", expected.yellow());
            println!("  found:\n{}", output.yellow());
            false
        }
        Err(e) => {
            println!("{} {}: {}", "Ko".red().bold(), name, e);
            false
        }
    }
}

fn golden_files(target: &str) -> Result<Vec<std::path::PathBuf>, String> {
    if target != "all" {
        return Ok(vec![target.into()]);
    }

    let entries = fs::read_dir("tests").map_err(|e| format!("Can't read test directory: {e}"))?;

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "ast"))
        .collect();
    files.sort();

    Ok(files)
}

fn main() {
    init_tracing();

    // Manage command line args
    let cli = CLI::parse();

    if let Some(target) = &cli.test {
        let files = match golden_files(target) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("{}", e.red());
                process::exit(2);
            }
        };

        let failed = files.iter().filter(|f| !test_file(f, &cli)).count();
        println!("\n{} passed, {} failed", files.len() - failed, failed);

        if failed > 0 {
            process::exit(1);
        }
    } else if let Some(file) = &cli.file {
        if !interpret_file(Path::new(file), &cli) {
            process::exit(1);
        }
    } else {
        eprintln!("{}", "No program given, see --help".yellow());
        process::exit(2);
    }
}
