use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// `YYYY-S` prefix with S in {0,1,2}, followed by a word boundary or end of
/// string. Trailing text after the code is ignored for matching.
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-([012])(?:\b|$)").expect("term regex"));

/// Academic sub-period within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Session {
    Summer,
    First,
    Second,
}

impl Session {
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(Session::Summer),
            '1' => Some(Session::First),
            '2' => Some(Session::Second),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Session::Summer => 0,
            Session::First => 1,
            Session::Second => 2,
        }
    }

    /// Short display code: Verano / 1er semestre / 2do semestre.
    pub fn code(self) -> &'static str {
        match self {
            Session::Summer => "V",
            Session::First => "I",
            Session::Second => "P",
        }
    }
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

/// One discovered academic period. Built fresh on every scan, never
/// persisted; courses refer to it by `term_id` only.
#[derive(Debug, Clone, Serialize)]
pub struct Term {
    pub term_id: String,
    pub year: i32,
    #[serde(rename = "sem")]
    pub session: Session,
    pub code: &'static str,
    #[serde(rename = "folderName")]
    pub folder_name: String,
    #[serde(rename = "folderRel")]
    pub folder_rel: String,
    #[serde(rename = "searchRootRel")]
    pub search_root_rel: String,
    #[serde(rename = "hasCoursesDir")]
    pub has_courses_dir: bool,
}

/// Parse a folder name against the term grammar.
pub fn parse_term(name: &str) -> Option<(i32, Session)> {
    let caps = TERM_RE.captures(name)?;
    let year = caps[1].parse::<i32>().ok()?;
    let session = Session::from_digit(caps[2].chars().next()?)?;
    Some((year, session))
}

pub fn term_name_matches(name: &str) -> bool {
    parse_term(name).is_some()
}

pub fn term_id(year: i32, session: Session) -> String {
    format!("{}-{}", year, session.number())
}

/// Chronological sort key; names that fail the grammar sort last, grouped
/// by name.
pub fn term_sort_key(name: &str) -> (i32, u8, String) {
    match parse_term(name) {
        Some((year, session)) => (year, session.number(), name.to_string()),
        None => (i32::MAX, u8::MAX, name.to_string()),
    }
}
