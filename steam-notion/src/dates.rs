//! Release-date parsing
//!
//! The storefront returns release dates as localized display strings ("8
//! Nov, 1998", "15 juin 2021", "2020年9月15日", sometimes just "2025").
//! This module normalizes them to calendar dates. Month-only dates resolve
//! to the first of the month and bare years to January 1st; strings that
//! cannot be parsed yield `None` and the caller decides what to do without
//! a date.

use chrono::NaiveDate;

/// Month names and abbreviations for the storefront's common display
/// locales. Matching is exact on the lowercased token; trailing dots are
/// stripped by tokenization.
static MONTHS: &[(&str, u32)] = &[
    // English
    ("january", 1), ("february", 2), ("march", 3), ("april", 4),
    ("may", 5), ("june", 6), ("july", 7), ("august", 8),
    ("september", 9), ("october", 10), ("november", 11), ("december", 12),
    ("jan", 1), ("feb", 2), ("mar", 3), ("apr", 4), ("jun", 6),
    ("jul", 7), ("aug", 8), ("sep", 9), ("sept", 9), ("oct", 10),
    ("nov", 11), ("dec", 12),
    // French
    ("janvier", 1), ("février", 2), ("fevrier", 2), ("mars", 3),
    ("avril", 4), ("mai", 5), ("juin", 6), ("juillet", 7),
    ("août", 8), ("aout", 8), ("septembre", 9), ("octobre", 10),
    ("novembre", 11), ("décembre", 12), ("decembre", 12),
    // German
    ("januar", 1), ("februar", 2), ("märz", 3), ("marz", 3),
    ("juni", 6), ("juli", 7), ("oktober", 10), ("dezember", 12),
    ("okt", 10), ("dez", 12),
    // Spanish
    ("enero", 1), ("febrero", 2), ("marzo", 3), ("abril", 4),
    ("mayo", 5), ("junio", 6), ("julio", 7), ("agosto", 8),
    ("septiembre", 9), ("octubre", 10), ("noviembre", 11), ("diciembre", 12),
    ("ene", 1), ("abr", 4), ("ago", 8), ("dic", 12),
    // Portuguese
    ("janeiro", 1), ("fevereiro", 2), ("março", 3), ("marco", 3),
    ("maio", 5), ("junho", 6), ("julho", 7), ("setembro", 9),
    ("outubro", 10), ("dezembro", 12),
    ("fev", 2), ("set", 9), ("out", 10),
    // Italian
    ("gennaio", 1), ("febbraio", 2), ("aprile", 4), ("maggio", 5),
    ("giugno", 6), ("luglio", 7), ("settembre", 9), ("ottobre", 10),
    ("dicembre", 12),
    // Polish (genitive, as dates are written)
    ("stycznia", 1), ("lutego", 2), ("marca", 3), ("kwietnia", 4),
    ("maja", 5), ("czerwca", 6), ("lipca", 7), ("sierpnia", 8),
    ("września", 9), ("wrzesnia", 9), ("października", 10),
    ("pazdziernika", 10), ("listopada", 11), ("grudnia", 12),
    // Russian (genitive)
    ("января", 1), ("февраля", 2), ("марта", 3), ("апреля", 4),
    ("мая", 5), ("июня", 6), ("июля", 7), ("августа", 8),
    ("сентября", 9), ("октября", 10), ("ноября", 11), ("декабря", 12),
    ("янв", 1), ("фев", 2), ("апр", 4), ("июн", 6), ("июл", 7),
    ("авг", 8), ("сен", 9), ("сент", 9), ("окт", 10), ("ноя", 11),
    ("дек", 12),
];

fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, number)| *number)
}

/// Parse a storefront release-date string into a calendar date.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Some(date);
    }

    // CJK ideographic dates: 2020年9月15日 / 2020년 9월 15일. The numeric
    // runs are year, month, day in order; the day may be missing.
    if text.contains('年') || text.contains('년') {
        return parse_numeric_runs(&text);
    }

    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let year = tokens
        .iter()
        .find(|t| t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()))
        .and_then(|t| t.parse::<i32>().ok())?;

    let month_word = tokens.iter().find_map(|t| month_number(t));
    let day = tokens
        .iter()
        .filter(|t| t.len() <= 2 && t.chars().all(|c| c.is_ascii_digit()))
        .find_map(|t| t.parse::<u32>().ok().filter(|d| (1..=31).contains(d)));

    if let Some(month) = month_word {
        return NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1));
    }

    // All-numeric forms: 15/09/2020 (or 09/15/2020 when the first number
    // cannot be a month).
    let numbers: Vec<u32> = tokens
        .iter()
        .filter(|t| t.len() <= 2)
        .filter_map(|t| t.parse().ok())
        .collect();
    match numbers.as_slice() {
        [a, b, ..] if *b <= 12 => NaiveDate::from_ymd_opt(year, *b, *a),
        [a, b, ..] if *a <= 12 => NaiveDate::from_ymd_opt(year, *a, *b),
        // A lone year; anything else alongside it ("Q1 2025") is not a date.
        [] if tokens.len() == 1 => NaiveDate::from_ymd_opt(year, 1, 1),
        _ => None,
    }
}

fn parse_numeric_runs(text: &str) -> Option<NaiveDate> {
    let mut runs: Vec<u32> = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(current.parse().ok()?);
            current.clear();
        }
    }
    if !current.is_empty() {
        runs.push(current.parse().ok()?);
    }
    match runs.as_slice() {
        [year] => NaiveDate::from_ymd_opt(*year as i32, 1, 1),
        [year, month] => NaiveDate::from_ymd_opt(*year as i32, *month, 1),
        [year, month, day, ..] => NaiveDate::from_ymd_opt(*year as i32, *month, *day),
        [] => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_english_forms() {
        assert_eq!(parse_release_date("8 Nov, 1998"), Some(date(1998, 11, 8)));
        assert_eq!(parse_release_date("Nov 8, 1998"), Some(date(1998, 11, 8)));
        assert_eq!(parse_release_date("November 8, 1998"), Some(date(1998, 11, 8)));
    }

    #[test]
    fn test_partial_dates_resolve_to_first() {
        assert_eq!(parse_release_date("Nov 1998"), Some(date(1998, 11, 1)));
        assert_eq!(parse_release_date("2025"), Some(date(2025, 1, 1)));
        assert_eq!(parse_release_date("Q1 2025"), None); // quarter is not a month
    }

    #[test]
    fn test_iso_passthrough() {
        assert_eq!(parse_release_date("2020-09-15"), Some(date(2020, 9, 15)));
    }

    #[test]
    fn test_cjk_forms() {
        assert_eq!(parse_release_date("2020年9月15日"), Some(date(2020, 9, 15)));
        assert_eq!(parse_release_date("2020年9月"), Some(date(2020, 9, 1)));
        assert_eq!(parse_release_date("2020년 9월 15일"), Some(date(2020, 9, 15)));
    }

    #[test]
    fn test_localized_month_names() {
        assert_eq!(parse_release_date("15 juin 2021"), Some(date(2021, 6, 15)));
        assert_eq!(parse_release_date("1 ene. 2010"), Some(date(2010, 1, 1)));
        assert_eq!(parse_release_date("3 окт. 2017"), Some(date(2017, 10, 3)));
        assert_eq!(parse_release_date("3 октября 2017"), Some(date(2017, 10, 3)));
        assert_eq!(parse_release_date("10. Okt. 2014"), Some(date(2014, 10, 10)));
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(parse_release_date("15/09/2020"), Some(date(2020, 9, 15)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_release_date(""), None);
        assert_eq!(parse_release_date("Coming soon"), None);
        assert_eq!(parse_release_date("To be announced"), None);
        assert_eq!(parse_release_date("31 Feb, 2020"), None); // invalid calendar day
    }
}
