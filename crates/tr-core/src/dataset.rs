use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bill::{Assignee, BillDetails};
use crate::error::{TrError, TrResult};
use crate::participant::{Participant, ParticipantId};
use crate::recommendation::Recommendation;
use crate::session::Session;

/// The `session` section of the dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session id.
    pub id: String,
    /// Host display name.
    pub host_name: String,
    /// Invited participants, excluding the host.
    pub participants: Vec<Participant>,
}

/// The read-only input document describing a whole session: who is
/// invited, which venues are on the table, and the itemized bill.
///
/// Loaded once at startup and never written back. Absent or ill-typed
/// required fields fail the load; [`SessionDataset::validate`] rejects
/// structurally valid but inconsistent content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDataset {
    /// Who is at the table.
    pub session: SessionInfo,
    /// Candidate venues.
    pub recommendations: Vec<Recommendation>,
    /// The itemized bill.
    pub bill_details: BillDetails,
}

impl SessionDataset {
    /// Parse and validate a dataset from a JSON string.
    pub fn from_json(json: &str) -> TrResult<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Read, parse, and validate a dataset file.
    pub fn load(path: &Path) -> TrResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check content invariants the type system cannot express.
    pub fn validate(&self) -> TrResult<()> {
        if self.session.id.trim().is_empty() {
            return Err(TrError::Validation("session id is empty".into()));
        }
        if self.session.host_name.trim().is_empty() {
            return Err(TrError::Validation("host name is empty".into()));
        }

        let mut participant_ids = HashSet::new();
        for participant in &self.session.participants {
            if participant.id == ParticipantId::HOST {
                return Err(TrError::Validation(format!(
                    "participant \"{}\" uses the reserved host id",
                    participant.name
                )));
            }
            if !participant_ids.insert(participant.id) {
                return Err(TrError::Validation(format!(
                    "duplicate participant id {}",
                    participant.id
                )));
            }
        }

        let mut recommendation_ids = HashSet::new();
        for rec in &self.recommendations {
            if !recommendation_ids.insert(rec.id.as_str()) {
                return Err(TrError::Validation(format!(
                    "duplicate recommendation id \"{}\"",
                    rec.id
                )));
            }
            if rec.match_score > 100 {
                return Err(TrError::Validation(format!(
                    "match score {} out of range for \"{}\"",
                    rec.match_score, rec.name
                )));
            }
        }

        for item in &self.bill_details.items {
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(TrError::Validation(format!(
                    "negative or non-finite price for bill item \"{}\"",
                    item.name
                )));
            }
            for assignee in &item.assigned_to {
                match assignee {
                    Assignee::Participant(id) => {
                        if !id.is_host() && !participant_ids.contains(id) {
                            return Err(TrError::Validation(format!(
                                "bill item \"{}\" assigned to unknown participant {id}",
                                item.name
                            )));
                        }
                    }
                    Assignee::Tag(tag) if tag == Assignee::ALL => {}
                    Assignee::Tag(tag) => {
                        return Err(TrError::Validation(format!(
                            "bill item \"{}\" uses unknown assignment tag \"{tag}\"",
                            item.name
                        )));
                    }
                }
            }
        }

        for amount in [self.bill_details.taxes, self.bill_details.delivery] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(TrError::Validation(
                    "negative or non-finite bill surcharge".into(),
                ));
            }
        }

        Ok(())
    }

    /// Look up a recommendation by id.
    pub fn recommendation(&self, id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|rec| rec.id == id)
    }

    /// The nominal bill total, for reconciliation display.
    pub fn nominal_total(&self) -> f64 {
        self.bill_details.nominal_total()
    }

    /// Build the mutable session model from the `session` section.
    pub fn to_session(&self) -> Session {
        Session::new(
            self.session.id.clone(),
            self.session.host_name.clone(),
            self.session.participants.clone(),
        )
    }
}
