//! CLI frontend for the Tafelrunde dining-session engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tr_engine::CategoryTotals;

#[derive(Parser)]
#[command(
    name = "tafel",
    about = "Tafelrunde — a scripted group-dining decision engine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full scripted session from invitation to settlement
    Run {
        /// Dataset file (JSON)
        #[arg(short, long, default_value = "demos/dinner.json")]
        dataset: PathBuf,

        /// Recommendation id to vote for (default: the best bet)
        #[arg(long)]
        vote: Option<String>,

        /// Vegetarian dish total
        #[arg(long, default_value = "400")]
        veg: f64,

        /// Non-vegetarian dish total
        #[arg(long, default_value = "350")]
        non_veg: f64,

        /// Mocktail add-on total
        #[arg(long, default_value = "90")]
        mocktail: f64,

        /// Cocktail add-on total
        #[arg(long, default_value = "90")]
        cocktail: f64,

        /// Show the full signal feed (not just the summary)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the dataset: who is invited, the venues, and the bill
    Show {
        /// Dataset file (JSON)
        #[arg(short, long, default_value = "demos/dinner.json")]
        dataset: PathBuf,
    },

    /// Compute the split for given category totals without running the session
    Split {
        /// Dataset file (JSON)
        #[arg(short, long, default_value = "demos/dinner.json")]
        dataset: PathBuf,

        /// Vegetarian dish total
        #[arg(long, default_value = "400")]
        veg: f64,

        /// Non-vegetarian dish total
        #[arg(long, default_value = "350")]
        non_veg: f64,

        /// Mocktail add-on total
        #[arg(long, default_value = "90")]
        mocktail: f64,

        /// Cocktail add-on total
        #[arg(long, default_value = "90")]
        cocktail: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            dataset,
            vote,
            veg,
            non_veg,
            mocktail,
            cocktail,
            verbose,
        } => commands::run::run(
            &dataset,
            vote.as_deref(),
            CategoryTotals::new(veg, non_veg, mocktail, cocktail),
            verbose,
        ),
        Commands::Show { dataset } => commands::show::run(&dataset),
        Commands::Split {
            dataset,
            veg,
            non_veg,
            mocktail,
            cocktail,
        } => commands::split::run(&dataset, CategoryTotals::new(veg, non_veg, mocktail, cocktail)),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
