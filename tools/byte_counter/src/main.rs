use clap::Parser;
use listing_core::byte_length::{TitleBudget, TitleLength};
use serde_json::json;

/// Prints the UTF-8 and legacy double-byte lengths of each title.
#[derive(Debug, Parser)]
#[command(name = "byte_counter")]
struct Args {
    #[arg(long, default_value_t = 70)]
    min_bytes: usize,

    #[arg(long, default_value_t = 80)]
    max_bytes: usize,

    #[arg(required = true)]
    titles: Vec<String>,
}

fn main() {
    let args = Args::parse();
    let budget = TitleBudget {
        min_bytes: args.min_bytes,
        max_bytes: args.max_bytes,
    };

    let mut all_within = true;
    let rows: Vec<_> = args
        .titles
        .iter()
        .map(|t| {
            let len = TitleLength::measure(t, budget);
            all_within &= len.within_budget;
            json!({
                "title": t,
                "utf8_bytes": len.utf8_bytes,
                "legacy_double_bytes": len.legacy_double_bytes,
                "within_budget": len.within_budget,
            })
        })
        .collect();

    match serde_json::to_string_pretty(&rows) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("render error: {}", e);
            std::process::exit(2);
        }
    }
    if !all_within {
        std::process::exit(1);
    }
}
