// ==========================================
// Seguimiento de pedidos - input normalization
// ==========================================
// The parse-validate boundary between the loosely-typed snapshot
// tables and the typed domain. Upstream rows carry percentages as
// formatted strings, dates in three representations and the
// occasional piece of garbage; everything here degrades to a
// default instead of erroring.
// ==========================================

use crate::domain::order::{ActualWindow, OrderProgress, RawOrderRecord, RawValue};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Epoch values >= this are treated as milliseconds rather than seconds.
/// (Year ~2128 in seconds, year 1970-03 in milliseconds.)
const EPOCH_MILLIS_CUTOVER: i64 = 5_000_000_000;

// ==========================================
// Percentage parsing
// ==========================================

/// Parse a completion percentage from whatever the source column holds.
///
/// Accepts `"73%"`, `"73.5 %"`, `"73,5"`, bare numerics; malformed or
/// null input yields 0, negatives floor at 0. Values above 100 are
/// preserved (fabric phases legitimately over-produce) and only the
/// chart-facing fraction clamps them (see `percent_to_fraction`).
pub fn parse_percent(value: &RawValue) -> f64 {
    let parsed = match value {
        RawValue::Null => 0.0,
        RawValue::Integer(i) => *i as f64,
        RawValue::Real(f) => *f,
        RawValue::Text(s) => {
            let cleaned = s.trim().trim_end_matches('%').trim().replace(',', ".");
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
    };
    if parsed.is_nan() || parsed < 0.0 {
        0.0
    } else {
        parsed
    }
}

/// Percent in [0, 100] to fraction in [0, 1].
pub fn percent_to_fraction(percent: f64) -> f64 {
    clamp(percent, 0.0, 100.0) / 100.0
}

// ==========================================
// Date parsing
// ==========================================

/// Parse a timestamp from whatever representation the source used.
///
/// Text may be an ISO date, an ISO datetime (space or `T` separated,
/// with or without fractional seconds), or the `dd/mm/yyyy` form older
/// exports wrote. Numeric cells are Unix epochs, seconds or
/// milliseconds. Anything else is `None`; this never errors.
pub fn parse_datetime(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Null => None,
        RawValue::Integer(epoch) => epoch_to_datetime(*epoch),
        RawValue::Real(epoch) => epoch_to_datetime(epoch.round() as i64),
        RawValue::Text(s) => parse_datetime_text(s),
    }
}

/// Date-only view of `parse_datetime`.
pub fn parse_date(value: &RawValue) -> Option<NaiveDate> {
    parse_datetime(value).map(|dt| dt.date())
}

fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"];
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // epoch that got coerced into a text cell; date formats have
    // already claimed 8-digit yyyymmdd strings at this point
    if let Ok(epoch) = trimmed.parse::<i64>() {
        return epoch_to_datetime(epoch);
    }

    None
}

fn epoch_to_datetime(epoch: i64) -> Option<NaiveDateTime> {
    let seconds = if epoch.abs() >= EPOCH_MILLIS_CUTOVER {
        epoch / 1000
    } else {
        epoch
    };
    chrono::DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}

// ==========================================
// Arithmetic helpers
// ==========================================

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// `numerator / denominator`, with a zero denominator yielding 0
/// instead of a division error.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Add a fractional number of days to a date, truncating the result
/// back to a date.
///
/// Matches the convention the historical reports were produced with:
/// the offset is applied with sub-day precision against midnight and
/// the time-of-day is then discarded, so +3.6 days lands on day +3.
pub fn add_fractional_days(date: NaiveDate, days: f64) -> NaiveDate {
    let seconds = (days * 86_400.0).round() as i64;
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    (midnight + Duration::seconds(seconds)).date()
}

// ==========================================
// Record normalization
// ==========================================

/// Convert one raw source row into the typed order snapshot.
pub fn normalize_order(raw: &RawOrderRecord) -> OrderProgress {
    let emission = parse_date(&raw.emission_date);
    let delivery = parse_date(&raw.delivery_date);

    // DIAS comes precomputed from the source; recompute it from the
    // dates when the column is missing or unparseable.
    let lead_time_days = match &raw.lead_time_days {
        RawValue::Integer(days) => *days,
        RawValue::Real(days) => days.round() as i64,
        RawValue::Text(s) => s.trim().parse::<i64>().ok().unwrap_or_else(|| {
            lead_time_from_dates(emission, delivery)
        }),
        RawValue::Null => lead_time_from_dates(emission, delivery),
    };

    let completion_pct = [
        parse_percent(&raw.assembly_pct),
        parse_percent(&raw.dyeing_pct),
        parse_percent(&raw.fabric_approval_pct),
        parse_percent(&raw.cutting_pct),
        parse_percent(&raw.sewing_pct),
    ];

    let actual = [
        ActualWindow::new(parse_datetime(&raw.assembly_min), parse_datetime(&raw.assembly_max)),
        ActualWindow::new(parse_datetime(&raw.dyeing_min), parse_datetime(&raw.dyeing_max)),
        ActualWindow::new(
            parse_datetime(&raw.fabric_approval_min),
            parse_datetime(&raw.fabric_approval_max),
        ),
        ActualWindow::new(parse_datetime(&raw.cutting_min), parse_datetime(&raw.cutting_max)),
        ActualWindow::new(parse_datetime(&raw.sewing_min), parse_datetime(&raw.sewing_max)),
    ];

    OrderProgress {
        order_code: raw.order_code.clone(),
        emission_date: emission,
        delivery_date: delivery,
        lead_time_days,
        client_name: raw.client_name.clone(),
        purchase_order: raw.purchase_order.clone(),
        requested_kg: numeric_or_zero(&raw.requested_kg),
        requested_units: numeric_or_zero(&raw.requested_units),
        completion_pct,
        actual,
    }
}

fn lead_time_from_dates(emission: Option<NaiveDate>, delivery: Option<NaiveDate>) -> i64 {
    match (emission, delivery) {
        (Some(from), Some(to)) => (to - from).num_days(),
        _ => 0,
    }
}

fn numeric_or_zero(value: &RawValue) -> f64 {
    match value {
        RawValue::Null => 0.0,
        RawValue::Integer(i) => *i as f64,
        RawValue::Real(f) => *f,
        RawValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_parse_percent_round_trip() {
        assert_eq!(parse_percent(&text("73%")), 73.0);
        assert_eq!(percent_to_fraction(parse_percent(&text("73%"))), 0.73);
        assert_eq!(parse_percent(&text("73.5%")), 73.5);
        assert_eq!(parse_percent(&text("73,5")), 73.5);
        assert_eq!(parse_percent(&text(" 8 % ")), 8.0);
    }

    #[test]
    fn test_parse_percent_defaults_and_clamps() {
        assert_eq!(parse_percent(&RawValue::Null), 0.0);
        assert_eq!(parse_percent(&text("no-data")), 0.0);
        assert_eq!(parse_percent(&text("")), 0.0);
        assert_eq!(parse_percent(&text("-12%")), 0.0);
        // overproduction survives parsing; the fraction is what clamps
        assert_eq!(parse_percent(&text("148%")), 148.0);
        assert_eq!(percent_to_fraction(148.0), 1.0);
        assert_eq!(parse_percent(&RawValue::Real(f64::NAN)), 0.0);
        // Whatever comes in, the fraction stays inside [0, 1]
        for raw in ["-5%", "240%", "xx", "1e99"] {
            let fraction = percent_to_fraction(parse_percent(&text(raw)));
            assert!((0.0..=1.0).contains(&fraction), "{raw} -> {fraction}");
        }
    }

    #[test]
    fn test_parse_datetime_representations() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(14, 23, 11)
            .unwrap();
        assert_eq!(parse_datetime(&text("2024-05-06 14:23:11")), Some(expected));
        assert_eq!(parse_datetime(&text("2024-05-06T14:23:11")), Some(expected));
        assert_eq!(
            parse_datetime(&RawValue::Integer(expected.and_utc().timestamp())),
            Some(expected)
        );
        assert_eq!(
            parse_datetime(&RawValue::Integer(expected.and_utc().timestamp_millis())),
            Some(expected)
        );
        let midnight = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime(&text("2024-05-06")), Some(midnight));
        assert_eq!(parse_datetime(&text("06/05/2024")), Some(midnight));
    }

    #[test]
    fn test_parse_datetime_tolerates_garbage() {
        assert_eq!(parse_datetime(&RawValue::Null), None);
        assert_eq!(parse_datetime(&text("")), None);
        assert_eq!(parse_datetime(&text("mañana")), None);
        assert_eq!(parse_datetime(&text("2024-13-45")), None);
    }

    #[test]
    fn test_ratio_or_zero() {
        assert_eq!(ratio_or_zero(5.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(5.0, 2.0), 2.5);
    }

    #[test]
    fn test_add_fractional_days_truncates() {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        // 0.06 * 60 = 3.6 days -> lands on day +3
        assert_eq!(
            add_fractional_days(base, 3.6),
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
        assert_eq!(
            add_fractional_days(base, 15.6),
            NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
        );
        assert_eq!(add_fractional_days(base, 0.0), base);
        // Negative offsets run the timeline backwards
        assert_eq!(
            add_fractional_days(base, -1.5),
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
        );
    }

    #[test]
    fn test_normalize_order_lead_time_fallback() {
        let raw = RawOrderRecord {
            order_code: "1160".to_string(),
            emission_date: text("2024-05-03"),
            delivery_date: text("2024-07-08"),
            lead_time_days: RawValue::Null,
            client_name: Some("RAGMAN TEXTILHA".to_string()),
            purchase_order: Some("224-122".to_string()),
            requested_kg: RawValue::Integer(1200),
            requested_units: text("4 300"),
            assembly_pct: text("73%"),
            dyeing_pct: text("150%"),
            fabric_approval_pct: RawValue::Null,
            cutting_pct: text("12,5%"),
            sewing_pct: text("oops"),
            assembly_min: text("2024-05-10"),
            assembly_max: text("2024-05-20 08:30:00"),
            dyeing_min: RawValue::Null,
            dyeing_max: RawValue::Null,
            fabric_approval_min: RawValue::Null,
            fabric_approval_max: RawValue::Null,
            cutting_min: RawValue::Null,
            cutting_max: RawValue::Null,
            sewing_min: RawValue::Null,
            sewing_max: RawValue::Null,
        };

        let order = normalize_order(&raw);
        assert_eq!(order.lead_time_days, 66);
        assert_eq!(order.completion_pct, [73.0, 150.0, 0.0, 12.5, 0.0]);
        assert_eq!(order.requested_kg, 1200.0);
        // Unparseable units degrade to zero weight, not an error
        assert_eq!(order.requested_units, 0.0);
        assert!(order.actual[0].start.is_some());
        assert!(order.actual[1].start.is_none());
    }
}
