use chrono::NaiveDate;

/// Parse a treasury `Date` cell.
///
/// The CSV export uses `MM/DD/YYYY`; ISO `YYYY-MM-DD` is accepted as well.
pub fn parse_curve_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // fast path: "MM/DD/YYYY"
    let b = s.as_bytes();
    if b.len() == 10 && s.is_ascii() && b[2] == b'/' && b[5] == b'/' {
        let month: u32 = s[0..2].parse().ok()?;
        let day: u32 = s[3..5].parse().ok()?;
        let year: i32 = s[6..10].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Legend label for a curve date, `MM/DD/YYYY`.
pub fn format_curve_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treasury_format() {
        assert_eq!(
            parse_curve_date("08/31/2006"),
            NaiveDate::from_ymd_opt(2006, 8, 31)
        );
    }

    #[test]
    fn test_unpadded_and_iso() {
        assert_eq!(
            parse_curve_date("8/1/2019"),
            NaiveDate::from_ymd_opt(2019, 8, 1)
        );
        assert_eq!(
            parse_curve_date(" 2000-08-31 "),
            NaiveDate::from_ymd_opt(2000, 8, 31)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_curve_date("13/01/2020"), None);
        assert_eq!(parse_curve_date("02/30/2020"), None);
        assert_eq!(parse_curve_date("yesterday"), None);
        assert_eq!(parse_curve_date(""), None);
    }

    #[test]
    fn test_non_ascii_ten_bytes_is_none() {
        assert_eq!("1é/3/2006".len(), 10);
        assert_eq!(parse_curve_date("1é/3/2006"), None);
        assert_eq!(parse_curve_date("08/3é/206"), None);
    }

    #[test]
    fn test_format_round_trip_label() {
        let d = NaiveDate::from_ymd_opt(2019, 8, 30).unwrap();
        assert_eq!(format_curve_date(d), "08/30/2019");
    }
}
