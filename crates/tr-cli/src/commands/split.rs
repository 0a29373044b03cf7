use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tr_engine::{CategoryTotals, compute_split};

pub fn run(path: &Path, totals: CategoryTotals) -> Result<(), String> {
    let dataset = super::load_dataset(path)?;
    let session = dataset.to_session();

    let assignments = super::demo_consumption(&session);
    let shares = compute_split(&totals, &assignments);

    println!("  {}", "Split".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Participant", "Tags", "Share"]);
    for share in &shares {
        let tags: Vec<String> = share.categories.iter().map(|c| c.to_string()).collect();
        table.add_row(vec![
            session.participant_name(share.participant).to_string(),
            tags.join(", "),
            format!("₹{}", share.amount),
        ]);
    }
    println!("{table}");
    println!();

    let allocated: i64 = shares.iter().map(|share| share.amount).sum();
    println!(
        "  Allocated ₹{allocated} of computed ₹{} (nominal bill ₹{})",
        totals.computed_total(),
        dataset.nominal_total()
    );

    Ok(())
}
