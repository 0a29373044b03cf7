use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tr_engine::{
    CategoryTotals, EngineConfig, PaymentStatus, PreferenceForm, SessionEngine, SignalKind,
};

pub fn run(
    path: &Path,
    vote: Option<&str>,
    totals: CategoryTotals,
    verbose: bool,
) -> Result<(), String> {
    let dataset = super::load_dataset(path)?;
    if dataset.recommendations.is_empty() {
        return Err("dataset has no recommendations to vote on".into());
    }

    let config = EngineConfig::default().with_category_totals(totals);
    let mut engine = SessionEngine::new(dataset, config);

    println!(
        "  {} \"{}\" {}",
        "Session".bold(),
        engine.session().id(),
        format!(
            "(host {}, {} at the table)",
            engine.session().host_name(),
            engine.session().participant_count()
        )
        .dimmed()
    );
    println!();

    // Invitation through revelation runs on the scripted timers alone.
    engine.share_invite();
    engine.run_until_idle().map_err(|e| e.to_string())?;
    engine.submit_preferences(PreferenceForm::default());
    engine.run_until_idle().map_err(|e| e.to_string())?;

    let choice = match vote {
        Some(id) => id.to_string(),
        None => engine
            .ranking()
            .first()
            .map(|r| r.recommendation.id.clone())
            .unwrap_or_default(),
    };
    engine.start_voting().map_err(|e| e.to_string())?;
    engine.cast_vote(&choice).map_err(|e| e.to_string())?;
    engine.run_until_idle().map_err(|e| e.to_string())?;

    let consumption = super::demo_consumption(engine.session());
    engine.set_consumption(consumption).map_err(|e| e.to_string())?;
    engine.pay_share();
    engine.run_until_idle().map_err(|e| e.to_string())?;

    if verbose {
        println!("  {}", "Signal Feed".bold().underline());
        println!();
        for signal in engine.signals().signals() {
            let at = format!("[{:>6} ms]", signal.at_ms).dimmed();
            println!("  {at} {}", colorize_signal(&signal.kind, &signal.description));
        }
        println!();
    }

    let winner_name = engine
        .winner()
        .and_then(|id| engine.dataset().recommendation(id))
        .map_or("?".to_string(), |rec| rec.name.clone());
    println!(
        "  {} {} {}",
        "Decided:".bold(),
        winner_name.green().bold(),
        format!(
            "({} of {} votes, threshold {})",
            engine.winner().map_or(0, |id| engine.tally().votes_for(id)),
            engine.tally().total(),
            engine.threshold()
        )
        .dimmed()
    );
    println!();

    println!("  {}", "Split Summary".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Participant", "Tags", "Share", "Status"]);
    for share in engine.shares() {
        let name = engine.session().participant_name(share.participant);
        let tags: Vec<String> = share.categories.iter().map(|c| c.to_string()).collect();
        let status = match share.payment {
            PaymentStatus::Paid => "paid".to_string(),
            PaymentStatus::Pending => "pending".to_string(),
        };
        table.add_row(vec![
            name.to_string(),
            tags.join(", "),
            format!("₹{}", share.amount),
            status,
        ]);
    }
    println!("{table}");
    println!();

    println!(
        "  Collected ₹{} of computed ₹{} (nominal bill ₹{})",
        engine.total_collected(),
        engine.computed_total(),
        engine.dataset().nominal_total()
    );
    println!(
        "  Stages visited: {}",
        engine
            .visited_stages()
            .iter()
            .map(|stage| stage.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(())
}

fn colorize_signal(kind: &SignalKind, description: &str) -> colored::ColoredString {
    match kind {
        SignalKind::StageChanged { .. } => description.bold(),
        SignalKind::ParticipantJoined { .. } => description.cyan(),
        SignalKind::PreferenceSubmitted { .. } => description.blue(),
        SignalKind::RecommendationsRanked { .. } => description.magenta(),
        SignalKind::TallyUpdated { .. } => description.yellow(),
        SignalKind::WinnerDeclared { .. } => description.green().bold(),
        SignalKind::SplitRecomputed { .. } => description.normal(),
        SignalKind::PaymentReceived { .. } => description.green(),
    }
}
