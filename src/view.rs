//! Derivation of the displayed table from a snapshot and the user's
//! search/sort state.
//!
//! Everything here is a pure function of its inputs. Callers re-derive on
//! every change instead of holding on to a previously derived list.

use crate::models::{DisplayRow, Record, Snapshot, SortDirection, SortKey, ViewState};
use crate::numeric::format_with_commas;
use std::cmp::Ordering;

/// Filters `snapshot` by the search term and orders the survivors by the
/// selected column. Numeric columns that fail to parse sort last in either
/// direction.
pub fn derive_view(snapshot: &Snapshot, view_state: &ViewState) -> Vec<Record> {
    let needle = view_state.search_term.to_lowercase();
    let mut records = snapshot
        .records()
        .iter()
        .filter(|record| matches_search(record, &needle))
        .cloned()
        .collect::<Vec<_>>();

    sort_records(&mut records, view_state.sort_key, view_state.sort_direction);
    records
}

/// `needle` must already be lowercased.
pub fn matches_search(record: &Record, needle: &str) -> bool {
    needle.is_empty() || record.username.to_lowercase().contains(needle)
}

pub fn sort_records(records: &mut Vec<Record>, key: SortKey, direction: SortDirection) {
    if key == SortKey::Username {
        records.sort_by(|a, b| {
            apply_direction(compare_usernames(&a.username, &b.username), direction)
        });
        return;
    }

    let mut keyed = records
        .drain(..)
        .map(|record| {
            let value = record
                .metric(key)
                .map(|metric| metric.to_number())
                .unwrap_or(f64::NAN);
            (value, record)
        })
        .collect::<Vec<_>>();
    keyed.sort_by(|(a, _), (b, _)| compare_metrics(*a, *b, direction));
    records.extend(keyed.into_iter().map(|(_, record)| record));
}

/// NaN is placed after every number regardless of `direction`; two NaNs are
/// equal.
pub fn compare_metrics(a: f64, b: f64, direction: SortDirection) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            apply_direction(a.partial_cmp(&b).unwrap_or(Ordering::Equal), direction)
        }
    }
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Locale-aware name ordering. Characters fall into weight classes
/// (whitespace < punctuation < symbols < digits < letters) and letters compare
/// by their base form, so `_x < 1x < alpha < Bravo < émile < Frank`. `ß`
/// weighs as `ss`. Accents break ties before case does, lowercase precedes
/// uppercase, and raw code points settle anything left.
pub fn compare_usernames(a: &str, b: &str) -> Ordering {
    let left = CollationKey::new(a);
    let right = CollationKey::new(b);
    left.primary
        .cmp(&right.primary)
        .then_with(|| left.accents.cmp(&right.accents))
        .then_with(|| left.uppercase.cmp(&right.uppercase))
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum WeightClass {
    Whitespace,
    Punctuation,
    Symbol,
    Digit,
    Letter,
}

/// ASCII punctuation and symbols, each in root collation order.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%";
const SYMBOL_ORDER: &str = "`^+<=>|~$";

fn primary_weight(ch: char) -> (WeightClass, u32) {
    if let Some(rank) = PUNCTUATION_ORDER.find(ch) {
        return (WeightClass::Punctuation, rank as u32);
    }
    if let Some(rank) = SYMBOL_ORDER.find(ch) {
        return (WeightClass::Symbol, rank as u32);
    }

    let class = match ch {
        c if c.is_whitespace() || c.is_control() => WeightClass::Whitespace,
        c if c.is_numeric() => WeightClass::Digit,
        c if c.is_alphabetic() => WeightClass::Letter,
        _ => WeightClass::Symbol,
    };
    (class, ch as u32)
}

struct CollationKey {
    primary: Vec<(WeightClass, u32)>,
    accents: Vec<bool>,
    uppercase: Vec<bool>,
}

impl CollationKey {
    fn new(value: &str) -> Self {
        let mut key = Self {
            primary: Vec::with_capacity(value.len()),
            accents: Vec::with_capacity(value.len()),
            uppercase: Vec::with_capacity(value.len()),
        };

        for ch in value.chars() {
            let is_upper = ch.is_uppercase();
            for lower in ch.to_lowercase() {
                if lower == 'ß' {
                    key.push('s', true, is_upper);
                    key.push('s', true, is_upper);
                    continue;
                }
                let base = strip_accent(lower);
                key.push(base, base != lower, is_upper);
            }
        }

        key
    }

    fn push(&mut self, base: char, accented: bool, uppercase: bool) {
        self.primary.push(primary_weight(base));
        self.accents.push(accented);
        self.uppercase.push(uppercase);
    }
}

fn strip_accent(ch: char) -> char {
    match ch {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ł' | 'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Formats derived records for the table, grouping metric digits.
pub fn display_rows(records: &[Record]) -> Vec<DisplayRow> {
    records
        .iter()
        .map(|record| DisplayRow {
            id: record.id.clone(),
            username: record.username.clone(),
            average_viewers: format_with_commas(&record.average_viewers.to_text()),
            peak_viewers: format_with_commas(&record.peak_viewers.to_text()),
            hours_watched: format_with_commas(&record.hours_watched.to_text()),
        })
        .collect()
}
