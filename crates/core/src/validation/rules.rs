//! Field specifications for shift records.

/// Wire name and human label of one record field.
///
/// The label prefixes every message about the field, e.g.
/// `"Worker count is required"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
}

/// Inclusive numeric bounds; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

pub const DATE: FieldSpec = FieldSpec {
    name: "date",
    label: "Date",
};
pub const DEPARTMENT: FieldSpec = FieldSpec {
    name: "department",
    label: "Department",
};
pub const TEAM: FieldSpec = FieldSpec {
    name: "team",
    label: "Team",
};
pub const TARGETED_PRODUCTIVITY: FieldSpec = FieldSpec {
    name: "targeted_productivity",
    label: "Targeted productivity",
};
pub const SMV_MINUTES: FieldSpec = FieldSpec {
    name: "smv_minutes",
    label: "SMV minutes",
};
pub const OVER_TIME_HOURS: FieldSpec = FieldSpec {
    name: "over_time_hours",
    label: "Overtime hours",
};
pub const INCENTIVE_LEVEL: FieldSpec = FieldSpec {
    name: "incentive_level",
    label: "Incentive level",
};
pub const IDLE_TIME_MINUTES: FieldSpec = FieldSpec {
    name: "idle_time_minutes",
    label: "Idle time minutes",
};
pub const IDLE_MEN_COUNT: FieldSpec = FieldSpec {
    name: "idle_men_count",
    label: "Idle men count",
};
pub const STYLE_CHANGE_COUNT: FieldSpec = FieldSpec {
    name: "style_change_count",
    label: "Style change count",
};
pub const WORKER_COUNT: FieldSpec = FieldSpec {
    name: "worker_count",
    label: "Worker count",
};

/// Every required field, in the order violations are reported.
pub const ALL_FIELDS: [FieldSpec; 11] = [
    DATE,
    DEPARTMENT,
    TEAM,
    TARGETED_PRODUCTIVITY,
    SMV_MINUTES,
    OVER_TIME_HOURS,
    INCENTIVE_LEVEL,
    IDLE_TIME_MINUTES,
    IDLE_MEN_COUNT,
    STYLE_CHANGE_COUNT,
    WORKER_COUNT,
];

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

pub const TARGETED_PRODUCTIVITY_BOUNDS: Bounds = Bounds::between(0.0, 150.0);
pub const SMV_MINUTES_BOUNDS: Bounds = Bounds::at_least(0.0);
pub const OVER_TIME_HOURS_BOUNDS: Bounds = Bounds::between(0.0, 8.0);
pub const IDLE_TIME_MINUTES_BOUNDS: Bounds = Bounds::at_least(0.0);
pub const IDLE_MEN_COUNT_BOUNDS: Bounds = Bounds::at_least(0.0);
pub const STYLE_CHANGE_COUNT_BOUNDS: Bounds = Bounds::at_least(0.0);
pub const WORKER_COUNT_BOUNDS: Bounds = Bounds::at_least(1.0);

// ---------------------------------------------------------------------------
// Messages without a field label
// ---------------------------------------------------------------------------

pub const MSG_DATE_IN_FUTURE: &str = "Date cannot be in the future";
pub const MSG_DATE_FORMAT: &str = "Invalid date format. Use YYYY-MM-DD";
pub const MSG_INVALID_DEPARTMENT: &str = "Invalid department";
pub const MSG_INVALID_TEAM: &str = "Invalid team format. Should be 'Team X'";
pub const MSG_INVALID_INCENTIVE: &str = "Invalid incentive level";

/// Date format accepted for the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
