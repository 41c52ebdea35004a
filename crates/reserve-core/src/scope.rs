//! Role-based visibility and reserve aggregation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::models::{Record, RecordStatus, Role, User};

/// Whether `user` may see `record`.
pub fn can_view(user: &User, record: &Record) -> bool {
    match user.role {
        Role::Admin | Role::BranchPresident => true,
        Role::VpCorporate | Role::VpRetail | Role::VpPersonal => {
            user.role.vp_line() == Some(record.line)
        }
        Role::DepartmentManager => record.department == user.department,
        Role::Staff => record.updated_by_user_id == user.id,
    }
}

/// The records `user` may see, in stored order.
pub fn visible_records<'a>(user: &User, records: &'a [Record]) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| can_view(user, record))
        .collect()
}

/// Totals over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReserveSummary {
    pub records: usize,
    pub estimated_new_payroll: u64,
    pub cards_issued: u64,
    /// Estimated new payroll still being followed up
    pub following: u64,
    pub completed: u64,
    pub failed: u64,
}

impl ReserveSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            let payroll = u64::from(record.estimated_new_payroll);
            summary.records += 1;
            summary.estimated_new_payroll += payroll;
            summary.cards_issued += u64::from(record.cards_issued);
            match record.status {
                RecordStatus::Following => summary.following += payroll,
                RecordStatus::Completed => summary.completed += payroll,
                RecordStatus::Failed => summary.failed += payroll,
            }
            summary
        })
    }

    /// Cards issued as a percentage of the estimated new payroll.
    #[allow(clippy::cast_precision_loss)]
    pub fn card_coverage(&self) -> f64 {
        if self.estimated_new_payroll == 0 {
            return 0.0;
        }
        self.cards_issued as f64 / self.estimated_new_payroll as f64 * 100.0
    }
}

/// Sum of the yearly targets that roll up to `viewer`: their own for
/// staff, their department for managers, their line for vice-presidents,
/// and everyone for the president and admin.
pub fn scoped_target(viewer: &User, users: &[User]) -> u64 {
    if viewer.role == Role::Staff {
        return u64::from(viewer.yearly_target);
    }
    users
        .iter()
        .filter(|user| counts_toward(viewer, user))
        .map(|user| u64::from(user.yearly_target))
        .sum()
}

fn counts_toward(viewer: &User, user: &User) -> bool {
    match viewer.role {
        Role::Admin | Role::BranchPresident => true,
        Role::VpCorporate | Role::VpRetail | Role::VpPersonal => {
            viewer.role.vp_line() == Some(user.line)
        }
        Role::DepartmentManager => user.department == viewer.department,
        Role::Staff => user.id == viewer.id,
    }
}

/// Landed and projected payroll against a yearly target, dated by each
/// record's estimated landing date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandingProgress {
    /// Completed records landing this year
    pub year_landed: u64,
    /// Completed records landing this month
    pub month_landed: u64,
    /// Records still followed up that are due to land this month
    pub month_projected: u64,
    pub target: u64,
}

impl LandingProgress {
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a Record>,
        target: u64,
        today: NaiveDate,
    ) -> Self {
        let mut progress = Self {
            target,
            ..Self::default()
        };
        for record in records {
            let Some(day) = record.landing_date() else {
                continue;
            };
            let payroll = u64::from(record.estimated_new_payroll);
            let this_year = day.year() == today.year();
            let this_month = this_year && day.month() == today.month();
            match record.status {
                RecordStatus::Completed => {
                    if this_year {
                        progress.year_landed += payroll;
                    }
                    if this_month {
                        progress.month_landed += payroll;
                    }
                }
                RecordStatus::Following if this_month => progress.month_projected += payroll,
                RecordStatus::Following | RecordStatus::Failed => {}
            }
        }
        progress
    }

    /// Payroll still needed to reach the target.
    pub const fn gap(&self) -> u64 {
        self.target.saturating_sub(self.year_landed)
    }

    /// Landed share of the target, or `None` without a target.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        (self.target > 0).then(|| self.year_landed as f64 / self.target as f64 * 100.0)
    }
}

/// Records still being followed up, soonest landing first. Records without
/// a readable landing date come last.
pub fn upcoming_landings<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    limit: usize,
) -> Vec<&'a Record> {
    let mut following: Vec<&Record> = records
        .into_iter()
        .filter(|record| record.status == RecordStatus::Following)
        .collect();
    following.sort_by(|a, b| match (a.landing_date(), b.landing_date()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    following.truncate(limit);
    following
}

/// Grouping axis for a reserve breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Line,
    Department,
    Owner,
    Company,
}

impl Dimension {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Department => "department",
            Self::Owner => "owner",
            Self::Company => "company",
        }
    }

    fn key(self, record: &Record) -> String {
        match self {
            Self::Line => record.line.label().to_string(),
            Self::Department => record.department.clone(),
            Self::Owner => record.updated_by_name.clone(),
            Self::Company => record.company_name.clone(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "department" | "dept" => Ok(Self::Department),
            "owner" | "staff" => Ok(Self::Owner),
            "company" => Ok(Self::Company),
            other => Err(format!("unknown breakdown '{other}'")),
        }
    }
}

impl Role {
    /// Drill-downs offered to this role, widest first.
    pub const fn breakdowns(self) -> &'static [Dimension] {
        match self {
            Self::Admin | Self::BranchPresident => &[
                Dimension::Line,
                Dimension::Department,
                Dimension::Owner,
                Dimension::Company,
            ],
            Self::VpCorporate | Self::VpRetail | Self::VpPersonal => {
                &[Dimension::Department, Dimension::Owner, Dimension::Company]
            }
            Self::DepartmentManager => &[Dimension::Owner, Dimension::Company],
            Self::Staff => &[Dimension::Company],
        }
    }
}

/// One group of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownRow {
    pub key: String,
    pub summary: ReserveSummary,
}

/// Group records by `dimension`, largest estimated new payroll first.
pub fn breakdown<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    dimension: Dimension,
) -> Vec<BreakdownRow> {
    let mut groups: HashMap<String, Vec<&Record>> = HashMap::new();
    for record in records {
        groups.entry(dimension.key(record)).or_default().push(record);
    }

    let mut rows: Vec<BreakdownRow> = groups
        .into_iter()
        .map(|(key, records)| BreakdownRow {
            key,
            summary: ReserveSummary::from_records(records),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.summary
            .estimated_new_payroll
            .cmp(&a.summary.estimated_new_payroll)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}
