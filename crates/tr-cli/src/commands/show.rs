use std::path::Path;

use chrono::Local;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tr_core::bill::Assignee;

pub fn run(path: &Path) -> Result<(), String> {
    let dataset = super::load_dataset(path)?;
    let session = dataset.to_session();

    println!(
        "  {} \"{}\" {}",
        "Session".bold(),
        session.id(),
        format!("(host {})", session.host_name()).dimmed()
    );
    println!();

    println!("  {}", "Participants".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Avatar", "Status"]);
    for participant in session.participants() {
        table.add_row(vec![
            participant.id.to_string(),
            participant.name.clone(),
            participant.avatar.clone(),
            participant.status.to_string(),
        ]);
    }
    println!("{table}");
    println!();

    println!("  {}", "Venues".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Match", "Tags", "Price"]);
    for rec in &dataset.recommendations {
        table.add_row(vec![
            rec.id.clone(),
            rec.name.clone(),
            format!("{}%", rec.match_score),
            rec.tags.join(", "),
            rec.price_level.clone(),
        ]);
    }
    println!("{table}");
    println!();

    println!(
        "  {} {}",
        "Receipt".bold().underline(),
        Local::now().format("%Y-%m-%d %H:%M").to_string().dimmed()
    );
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Item", "Assigned", "Price"]);
    for item in &dataset.bill_details.items {
        let assigned = if item.is_shared() {
            format!("shared ({})", session.participant_count())
        } else {
            item.assigned_to
                .iter()
                .filter_map(|assignee| match assignee {
                    Assignee::Participant(id) => {
                        Some(session.participant_name(*id).to_string())
                    }
                    Assignee::Tag(_) => None,
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            item.name.clone(),
            assigned,
            format!("₹{}", item.price),
        ]);
    }
    table.add_row(vec![
        "Taxes".to_string(),
        String::new(),
        format!("₹{}", dataset.bill_details.taxes),
    ]);
    table.add_row(vec![
        "Delivery".to_string(),
        String::new(),
        format!("₹{}", dataset.bill_details.delivery),
    ]);
    println!("{table}");
    println!();
    println!("  Total ₹{}", dataset.nominal_total());

    Ok(())
}
