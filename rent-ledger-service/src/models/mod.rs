//! Domain model for the rent payment ledger.

use chrono::NaiveDate;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status value reserved for system-generated due placeholders. A submitted
/// payment may carry any other free-form status.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";

/// Method value reserved for placeholders.
pub const METHOD_PENDING: &str = "pending";
pub const METHOD_CASH: &str = "Cash";

/// Calendar month, one of the twelve recognized English names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based offset within a year (January = 0).
    pub fn offset(self) -> i64 {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0) as i64
    }

    pub fn from_offset(offset: i64) -> Month {
        Self::ALL[offset.rem_euclid(12) as usize]
    }

    pub fn parse(name: &str) -> Option<Month> {
        Self::ALL.iter().copied().find(|m| m.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (month, year) pair with total ordering via the month-sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthYear {
    pub month: Month,
    pub year: i32,
}

impl MonthYear {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// Month-sequence index: `year * 12 + month_offset`. Ordered arithmetic
    /// over calendar months.
    pub fn seq(&self) -> i64 {
        self.year as i64 * 12 + self.month.offset()
    }

    pub fn from_seq(seq: i64) -> Self {
        Self {
            month: Month::from_offset(seq.rem_euclid(12)),
            year: seq.div_euclid(12) as i32,
        }
    }
}

/// Tenant profile as stored by the Tenant Directory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Tenant {
    #[serde(rename = "_id")]
    pub tenant_id: String,
    pub name: String,
    pub phone: String,
    pub room: String,
    pub bed: String,
    /// Standing rent, authoritative for due-record generation (adopted from
    /// the first payment).
    pub rent: f64,
    /// Free-form date string as stored; parsed leniently when backfilling.
    pub join_date: Option<String>,
    #[serde(default)]
    pub aadhaar_front: String,
    #[serde(default)]
    pub aadhaar_back: String,
    #[serde(default)]
    pub profile: String,
}

impl Tenant {
    /// Month-sequence index of the join month, if the join date parses.
    /// An unparsable or missing join date collapses the backfill range.
    pub fn join_month_seq(&self) -> Option<i64> {
        let raw = self.join_date.as_deref()?;
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.date_naive())
            })?;

        use chrono::Datelike;
        Some(date.year() as i64 * 12 + (date.month0() as i64))
    }
}

/// One ledger entry: either a submitted payment or a system-generated due
/// placeholder (status and method both "pending").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub tenant_id: String,
    /// Denormalized for read convenience.
    pub tenant_name: String,
    pub room: String,
    pub month: Month,
    pub year: i32,
    /// Rent snapshot at time of payment.
    pub rent: f64,
    /// Non-zero only on the tenant's first-ever record.
    pub deposit: f64,
    /// Non-zero only on the tenant's first-ever record.
    pub maintenance: f64,
    pub method: String,
    pub status: String,
    /// Absent on placeholders.
    pub paid_on: Option<NaiveDate>,
    pub created_at: DateTime,
}

impl PaymentRecord {
    pub fn month_year(&self) -> MonthYear {
        MonthYear::new(self.month, self.year)
    }

    pub fn is_placeholder(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parse_accepts_only_recognized_names() {
        assert_eq!(Month::parse("January"), Some(Month::January));
        assert_eq!(Month::parse("December"), Some(Month::December));
        assert_eq!(Month::parse("january"), None);
        assert_eq!(Month::parse("Jan"), None);
        assert_eq!(Month::parse(""), None);
    }

    #[test]
    fn month_seq_is_ordered_across_year_boundaries() {
        let dec = MonthYear::new(Month::December, 2023);
        let jan = MonthYear::new(Month::January, 2024);
        assert_eq!(jan.seq() - dec.seq(), 1);
    }

    #[test]
    fn seq_round_trips() {
        for year in [1999, 2024] {
            for month in Month::ALL {
                let my = MonthYear::new(month, year);
                assert_eq!(MonthYear::from_seq(my.seq()), my);
            }
        }
    }

    #[test]
    fn join_month_seq_parses_plain_and_rfc3339_dates() {
        let mut tenant = tenant_with_join(Some("2024-01-15".to_string()));
        assert_eq!(
            tenant.join_month_seq(),
            Some(MonthYear::new(Month::January, 2024).seq())
        );

        tenant.join_date = Some("2023-12-01T10:30:00Z".to_string());
        assert_eq!(
            tenant.join_month_seq(),
            Some(MonthYear::new(Month::December, 2023).seq())
        );
    }

    #[test]
    fn join_month_seq_is_none_for_missing_or_garbage_dates() {
        assert_eq!(tenant_with_join(None).join_month_seq(), None);
        assert_eq!(
            tenant_with_join(Some("soon".to_string())).join_month_seq(),
            None
        );
    }

    fn tenant_with_join(join_date: Option<String>) -> Tenant {
        Tenant {
            tenant_id: "t-1".to_string(),
            name: "Asha".to_string(),
            phone: "9000000000".to_string(),
            room: "101".to_string(),
            bed: "A".to_string(),
            rent: 5000.0,
            join_date,
            aadhaar_front: String::new(),
            aadhaar_back: String::new(),
            profile: String::new(),
        }
    }
}
