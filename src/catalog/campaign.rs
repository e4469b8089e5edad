use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"));
static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"));

const DAY_MS: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CampaignStatus {
    Upcoming,
    Live,
    Ended,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 3] = [
        CampaignStatus::Upcoming,
        CampaignStatus::Live,
        CampaignStatus::Ended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Upcoming => "Upcoming",
            CampaignStatus::Live => "Live",
            CampaignStatus::Ended => "Ended",
        }
    }
}

/// Derived state of a crowdfunding row.
#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub status: CampaignStatus,
    pub label: String,
    #[serde(skip)]
    pub launch_key: i64,
    #[serde(skip)]
    pub end_key: i64,
}

/// Parse `YYYY-MM-DD`, US `M/D/YYYY`, or `D/M/YYYY` when the day comes first
/// unambiguously (first number above 12).
pub fn parse_date_flexible(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DATE.captures(raw) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    let caps = SLASH_DATE.captures(raw)?;
    ymd(&caps[3], &caps[1], &caps[2]).or_else(|| {
        let first: u32 = caps[1].parse().ok()?;
        if first > 12 {
            ymd(&caps[3], &caps[2], &caps[1])
        } else {
            None
        }
    })
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Compute status, badge label and sort keys at local time `now`.
/// Dates are taken as local midnight.
pub fn compute(launch_raw: &str, end_raw: &str, now: NaiveDateTime) -> Campaign {
    let launch = parse_date_flexible(launch_raw).map(midnight);
    let end = parse_date_flexible(end_raw).map(midnight);
    let key = |dt: Option<NaiveDateTime>, missing: i64| dt.map_or(missing, millis);

    match (launch, end) {
        (Some(l), _) if now < l => {
            let days = days_between(now, l);
            let label = if days <= 7 {
                format!("Launches in {}", plural_days(days))
            } else {
                format!("Launches {}", fmt_date(l))
            };
            Campaign {
                status: CampaignStatus::Upcoming,
                label,
                launch_key: millis(l),
                end_key: key(end, i64::MAX),
            }
        }
        (Some(l), Some(e)) if now <= e => Campaign {
            status: CampaignStatus::Live,
            label: format!("Ends in {}", plural_days(days_between(now, e))),
            launch_key: millis(l),
            end_key: millis(e),
        },
        (_, Some(e)) if now > e => Campaign {
            status: CampaignStatus::Ended,
            label: format!("Ended {}", fmt_date(e)),
            launch_key: key(launch, i64::MIN),
            end_key: millis(e),
        },
        (None, Some(e)) => Campaign {
            status: CampaignStatus::Live,
            label: format!("Ends {}", fmt_date(e)),
            launch_key: 0,
            end_key: millis(e),
        },
        (launch, end) => Campaign {
            status: CampaignStatus::Upcoming,
            label: launch.map_or_else(|| "Date TBA".to_string(), |l| format!("Launches {}", fmt_date(l))),
            launch_key: key(launch, i64::MAX),
            end_key: key(end, i64::MAX),
        },
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    ((to - from).num_milliseconds() as f64 / DAY_MS).ceil() as i64
}

fn plural_days(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

fn fmt_date(dt: NaiveDateTime) -> String {
    dt.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let sept30 = NaiveDate::from_ymd_opt(2025, 9, 30);
        assert_eq!(parse_date_flexible("2025-09-30"), sept30);
        assert_eq!(parse_date_flexible("9/30/2025"), sept30);
        assert_eq!(parse_date_flexible("30/09/2025"), sept30);
        // US reading wins when both are valid
        assert_eq!(
            parse_date_flexible("03/04/2025"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(parse_date_flexible("2025-02-30"), None);
        assert_eq!(parse_date_flexible("soon"), None);
        assert_eq!(parse_date_flexible(""), None);
    }

    #[test]
    fn test_upcoming_labels() {
        let c = compute("2025-10-03", "2025-10-30", at("2025-10-01", 12));
        assert_eq!(c.status, CampaignStatus::Upcoming);
        assert_eq!(c.label, "Launches in 2 days");

        let c = compute("2025-10-02", "", at("2025-10-01", 12));
        assert_eq!(c.label, "Launches in 1 day");
        assert_eq!(c.end_key, i64::MAX);

        let c = compute("2025-12-25", "", at("2025-10-01", 12));
        assert_eq!(c.label, "Launches Dec 25, 2025");
    }

    #[test]
    fn test_live_and_ended() {
        let c = compute("2025-09-01", "2025-10-05", at("2025-10-01", 12));
        assert_eq!(c.status, CampaignStatus::Live);
        assert_eq!(c.label, "Ends in 4 days");

        let c = compute("2025-09-01", "2025-09-20", at("2025-10-01", 12));
        assert_eq!(c.status, CampaignStatus::Ended);
        assert_eq!(c.label, "Ended Sep 20, 2025");

        let c = compute("", "2025-09-20", at("2025-10-01", 12));
        assert_eq!(c.status, CampaignStatus::Ended);
        assert_eq!(c.launch_key, i64::MIN);

        let c = compute("", "2025-11-20", at("2025-10-01", 12));
        assert_eq!(c.status, CampaignStatus::Live);
        assert_eq!(c.label, "Ends Nov 20, 2025");
        assert_eq!(c.launch_key, 0);
    }

    #[test]
    fn test_missing_dates() {
        let c = compute("", "", at("2025-10-01", 12));
        assert_eq!(c.status, CampaignStatus::Upcoming);
        assert_eq!(c.label, "Date TBA");
        assert_eq!(c.launch_key, i64::MAX);
    }
}
