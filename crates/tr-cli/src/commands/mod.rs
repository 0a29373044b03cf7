pub mod run;
pub mod show;
pub mod split;

use std::path::Path;

use tr_core::{ParticipantId, Session, SessionDataset};
use tr_engine::ShareCategory;

/// Load and validate a dataset file.
fn load_dataset(path: &Path) -> Result<SessionDataset, String> {
    SessionDataset::load(path).map_err(|e| format!("{}: {e}", path.display()))
}

/// Demo consumption policy: diets alternate around the table starting
/// non-veg at the host, and the first half of the table takes
/// mocktails, the rest cocktails.
fn demo_consumption(session: &Session) -> Vec<(ParticipantId, Vec<ShareCategory>)> {
    let headcount = session.participant_count();
    session
        .participants()
        .iter()
        .enumerate()
        .map(|(index, participant)| {
            let diet = if index % 2 == 0 {
                ShareCategory::NonVeg
            } else {
                ShareCategory::Veg
            };
            let drink = if index < headcount.div_ceil(2) {
                ShareCategory::Mocktail
            } else {
                ShareCategory::Cocktail
            };
            (participant.id, vec![diet, drink])
        })
        .collect()
}
