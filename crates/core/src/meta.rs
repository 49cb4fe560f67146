//! Reference lists offered to form clients.

use crate::record::Department;

/// Number of teams offered by default in pick lists.
pub const DEFAULT_TEAM_COUNT: u32 = 5;

pub fn departments() -> Vec<&'static str> {
    Department::ALL.iter().map(|d| d.as_str()).collect()
}

pub fn teams() -> Vec<String> {
    (1..=DEFAULT_TEAM_COUNT).map(|n| format!("Team {n}")).collect()
}
