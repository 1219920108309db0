//! Dover Forest exercise model: the tutor roster, group roles, land
//! allocation, and the rule that gates Part C.

use serde::{Deserialize, Serialize};

/// Tutors a student can pick on the profile form.
pub const TUTORS: [&str; 9] = [
    "Ms Ang Wei Xuan",
    "Ms Fiona Lio Su-Yin",
    "Mr Lawrence Sunderaj",
    "Mr Lee Shing Shyan",
    "Mr Neo Chee Tiong",
    "Mr Ngoh Siyuan",
    "Ms Tan Lee Hui",
    "Mr Li Kelun",
    "Mr Justin Cheong",
];

/// Stakeholder groups a student can argue for in Part B.
pub const GROUP_ROLES: [&str; 4] = [
    "Members of the public",
    "Businesses",
    "Residents in Dover area",
    "Environmentalists",
];

/// One land use with its share of the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    #[serde(rename = "use")]
    pub land_use: String,
    pub percentage: u32,
    #[serde(default)]
    pub reason: String,
}

/// The three-way land allocation. Rows 0 and 1 are entered by the student;
/// row 2 (conservation) always holds the remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(pub Vec<AllocationRow>);

const HOUSING: &str = "Housing and civic infrastructure (e.g. Schools, playgrounds)";
const COMMERCIAL: &str =
    "Commercial and industrial infrastructure (e.g. Shopping centres, semiconductor manufacturing)";
const CONSERVATION: &str = "Conservation";

impl Default for Allocation {
    fn default() -> Self {
        let row = |land_use: &str, percentage| AllocationRow {
            land_use: land_use.to_string(),
            percentage,
            reason: String::new(),
        };
        Self(vec![
            row(HOUSING, 0),
            row(COMMERCIAL, 0),
            row(CONSERVATION, 100),
        ])
    }
}

impl Allocation {
    /// Sum of all percentages.
    pub fn total(&self) -> u32 {
        self.0.iter().map(|r| r.percentage).sum()
    }

    /// Set one of the two manual rows.
    ///
    /// The value is clamped to 0..=100; if both manual rows together exceed
    /// 100 the edited row is cut back to what the other leaves free. The
    /// conservation row is recomputed as the remainder. Other indices are
    /// ignored.
    pub fn set_manual_percentage(&mut self, index: usize, value: i64) {
        if index > 1 || self.0.len() < 3 {
            return;
        }
        let mut value = value.clamp(0, 100) as u32;
        let other = self.0[1 - index].percentage;
        if value + other > 100 {
            value = 100 - other;
        }
        self.0[index].percentage = value;
        self.0[2].percentage = 100 - (self.0[0].percentage + self.0[1].percentage);
    }

    /// Record the student's reasoning for a row.
    pub fn set_reason(&mut self, index: usize, reason: impl Into<String>) {
        if let Some(row) = self.0.get_mut(index) {
            row.reason = reason.into();
        }
    }
}

/// Whether `name` is on the tutor roster.
pub fn is_known_tutor(name: &str) -> bool {
    TUTORS.contains(&name)
}

/// Part C opens once the allocation is complete and one of the
/// [`GROUP_ROLES`] is chosen.
pub fn ready_for_part_c(allocation: &Allocation, group_role: &str) -> bool {
    allocation.total() == 100 && GROUP_ROLES.contains(&group_role.trim())
}
