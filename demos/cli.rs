use clap::Parser;
use env_logger::Env;
use rowops::{
    ops, rationalize, render_equations, rref, RrefOptions, Variables,
};
use std::io::{BufRead, BufReader};

/// Row reduce a matrix read from stdin, one row per line.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Apply these row operations (e.g. "R1 <=> R2") instead of reducing.
    #[arg(long = "op")]
    ops: Vec<String>,
    /// Trailing columns which may never hold a pivot.
    #[arg(long, default_value_t = 0)]
    extra_cols: usize,
    /// Print the row operations used by the reduction.
    #[arg(long)]
    log: bool,
    /// Also print the result as a system of equations.
    #[arg(long)]
    latex: bool,
    /// Comma or whitespace separated variable names for --latex.
    #[arg(long)]
    vars: Option<Variables>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .init();
    let args = Args::parse();

    let stdin = std::io::stdin();
    let mut rows = Vec::new();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|word| !word.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<f64>, _>>()?;

        if !row.is_empty() {
            rows.push(row);
        }
    }

    let matrix = rationalize(rows)?;
    log::info!("Read a {}x{} matrix", matrix.row_count(), matrix.column_count());

    let result = if args.ops.is_empty() {
        let mut options = RrefOptions::new().augmented(args.extra_cols);
        if args.log {
            options = options.recording();
        }

        let (reduced, log) = rref(&matrix, options);

        if let Some(log) = log {
            println!("Operations:");
            for op in &log {
                println!("  {}", op);
            }
        }

        reduced
    } else {
        ops::applied_sequence(&matrix, &args.ops)?
    };

    println!("{}", result);

    if args.latex {
        print!("{}", render_equations(&result, args.vars.as_ref())?);
    }

    Ok(())
}
