use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// One entry of a bill item's assignment list: either a concrete
/// participant or a named group tag. The only recognized tag is
/// [`Assignee::ALL`], meaning every participant shares the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignee {
    /// A specific participant.
    Participant(ParticipantId),
    /// A named group tag (`"all"`).
    Tag(String),
}

impl Assignee {
    /// The shared-by-everyone sentinel tag.
    pub const ALL: &str = "all";

    /// Whether this entry is the `"all"` sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::Tag(tag) if tag == Self::ALL)
    }
}

/// A single line of the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    /// Unique id within the bill.
    pub id: String,
    /// Dish or add-on name.
    pub name: String,
    /// Price in whole currency units (non-negative).
    pub price: f64,
    /// Who consumed the item.
    pub assigned_to: Vec<Assignee>,
}

impl BillItem {
    /// Whether the item is shared by the whole table.
    pub fn is_shared(&self) -> bool {
        self.assigned_to.iter().any(Assignee::is_all)
    }
}

/// The itemized bill plus its flat surcharges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDetails {
    /// Itemized lines.
    pub items: Vec<BillItem>,
    /// Flat tax amount on the whole bill.
    #[serde(default)]
    pub taxes: f64,
    /// Flat delivery or service amount.
    #[serde(default)]
    pub delivery: f64,
}

impl BillDetails {
    /// Sum of all item prices, before surcharges.
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    /// The nominal bill total: items plus taxes plus delivery.
    pub fn nominal_total(&self) -> f64 {
        self.items_total() + self.taxes + self.delivery
    }
}
