use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Deserializer};

const READER_SOURCE: &str = "<reader>";
const FINAL_STAGE: &str = "Final";

/// One played match, as exported by the upstream cleaning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub match_id: u64,
    pub season: u32,
    pub year: u32,
    pub stage: String,
    pub venue: String,
    pub team_1: String,
    pub team_2: String,
    pub score_1: u32,
    pub score_2: u32,
    pub max_score: u32,
    pub total_points: u32,
    pub winner: String,
    pub loser: String,
    pub winning_margin: u32,
    pub match_name: String,
}

impl MatchRecord {
    /// Stage labels are compared exactly; `stage` is trimmed at load.
    pub fn is_final(&self) -> bool {
        self.stage == FINAL_STAGE
    }

    /// False for tied matches.
    pub fn is_decided(&self) -> bool {
        self.score_1 != self.score_2
    }
}

/// One player-season roster line. A player may have several lines per season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub player_id: u64,
    pub name: String,
    pub season: u32,
    pub played_count: u32,
    pub green_cards: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub top_raider_count: u32,
    pub total_points: u32,
}

/// Both record sets, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    matches: Vec<MatchRecord>,
    rosters: Vec<RosterRecord>,
}

impl Dataset {
    pub fn new(matches: Vec<MatchRecord>, rosters: Vec<RosterRecord>) -> Self {
        Self { matches, rosters }
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn rosters(&self) -> &[RosterRecord] {
        &self.rosters
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.rosters.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid input schema in {path} (line {line}): {message}")]
    Schema {
        path: String,
        line: u64,
        message: String,
    },

    #[error("invalid match {match_id}: {message}")]
    Invariant { match_id: u64, message: String },
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(deserialize_with = "de_id")]
    match_id: u64,
    #[serde(deserialize_with = "de_count")]
    season: u32,
    #[serde(deserialize_with = "de_count")]
    year: u32,
    league_stage: String,
    venue: String,
    team_name_1: String,
    team_name_2: String,
    #[serde(deserialize_with = "de_count")]
    team_score_1: u32,
    #[serde(deserialize_with = "de_count")]
    team_score_2: u32,
    #[serde(deserialize_with = "de_count")]
    max_score: u32,
    #[serde(deserialize_with = "de_count")]
    total_points_match: u32,
    winner: String,
    loser: String,
    #[serde(deserialize_with = "de_count")]
    winning_margin: u32,
    match_name: String,
}

#[derive(Debug, Deserialize)]
struct RawRoster {
    #[serde(deserialize_with = "de_id")]
    player_id: u64,
    name: String,
    #[serde(deserialize_with = "de_count")]
    season: u32,
    #[serde(deserialize_with = "de_count")]
    played_count: u32,
    #[serde(deserialize_with = "de_count")]
    green_card_count: u32,
    #[serde(deserialize_with = "de_count")]
    yellow_card_count: u32,
    #[serde(deserialize_with = "de_count")]
    red_card_count: u32,
    #[serde(deserialize_with = "de_count")]
    top_raider_count: u32,
    #[serde(deserialize_with = "de_count")]
    total_points: u32,
}

impl From<RawMatch> for MatchRecord {
    fn from(raw: RawMatch) -> Self {
        Self {
            match_id: raw.match_id,
            season: raw.season,
            year: raw.year,
            stage: raw.league_stage.trim().to_string(),
            venue: raw.venue.trim().to_string(),
            team_1: raw.team_name_1.trim().to_string(),
            team_2: raw.team_name_2.trim().to_string(),
            score_1: raw.team_score_1,
            score_2: raw.team_score_2,
            max_score: raw.max_score,
            total_points: raw.total_points_match,
            winner: raw.winner.trim().to_string(),
            loser: raw.loser.trim().to_string(),
            winning_margin: raw.winning_margin,
            match_name: raw.match_name.trim().to_string(),
        }
    }
}

impl From<RawRoster> for RosterRecord {
    fn from(raw: RawRoster) -> Self {
        Self {
            player_id: raw.player_id,
            name: raw.name.trim().to_string(),
            season: raw.season,
            played_count: raw.played_count,
            green_cards: raw.green_card_count,
            yellow_cards: raw.yellow_card_count,
            red_cards: raw.red_card_count,
            top_raider_count: raw.top_raider_count,
            total_points: raw.total_points,
        }
    }
}

pub fn load_dataset(matches_path: &Path, rosters_path: &Path) -> Result<Dataset, DatasetError> {
    let matches = load_matches(matches_path)?;
    let rosters = load_rosters(rosters_path)?;
    info!(
        "loaded {} matches from {} and {} roster rows from {}",
        matches.len(),
        matches_path.display(),
        rosters.len(),
        rosters_path.display()
    );
    Ok(Dataset::new(matches, rosters))
}

pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>, DatasetError> {
    let file = open(path)?;
    read_matches(file, &path.display().to_string())
}

pub fn load_rosters(path: &Path) -> Result<Vec<RosterRecord>, DatasetError> {
    let file = open(path)?;
    read_rosters(file, &path.display().to_string())
}

pub fn load_matches_from_reader<R: Read>(rdr: R) -> Result<Vec<MatchRecord>, DatasetError> {
    read_matches(rdr, READER_SOURCE)
}

pub fn load_rosters_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterRecord>, DatasetError> {
    read_rosters(rdr, READER_SOURCE)
}

/// Checks the per-match invariants. `winner` and `loser` must name the two
/// sides of every match, tied ones included.
pub fn validate_match(m: &MatchRecord) -> Result<(), DatasetError> {
    let invalid = |message: String| DatasetError::Invariant {
        match_id: m.match_id,
        message,
    };

    let expected_max = m.score_1.max(m.score_2);
    if m.max_score != expected_max {
        return Err(invalid(format!(
            "max_score {} does not match team scores {}-{}",
            m.max_score, m.score_1, m.score_2
        )));
    }
    let expected_total = u64::from(m.score_1) + u64::from(m.score_2);
    if u64::from(m.total_points) != expected_total {
        return Err(invalid(format!(
            "total_points_match {} does not match team scores {}-{}",
            m.total_points, m.score_1, m.score_2
        )));
    }
    if m.winning_margin != m.score_1.abs_diff(m.score_2) {
        return Err(invalid(format!(
            "winning_margin {} does not match team scores {}-{}",
            m.winning_margin, m.score_1, m.score_2
        )));
    }
    let sides = [m.team_1.as_str(), m.team_2.as_str()];
    if m.winner == m.loser
        || !sides.contains(&m.winner.as_str())
        || !sides.contains(&m.loser.as_str())
    {
        return Err(invalid(format!(
            "winner/loser {}/{} are not the two sides {} and {}",
            m.winner, m.loser, m.team_1, m.team_2
        )));
    }
    if !m.is_decided() {
        return Ok(());
    }

    let (high, low) = if m.score_1 > m.score_2 {
        (&m.team_1, &m.team_2)
    } else {
        (&m.team_2, &m.team_1)
    };
    if &m.winner != high || &m.loser != low {
        return Err(invalid(format!(
            "winner/loser {}/{} disagree with scores ({} {} - {} {})",
            m.winner, m.loser, m.team_1, m.score_1, m.score_2, m.team_2
        )));
    }
    Ok(())
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_matches<R: Read>(rdr: R, source: &str) -> Result<Vec<MatchRecord>, DatasetError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for result in reader.deserialize::<RawMatch>() {
        let record = MatchRecord::from(result.map_err(|err| csv_error(source, err))?);
        validate_match(&record)?;
        if !seen.insert(record.match_id) {
            return Err(DatasetError::Invariant {
                match_id: record.match_id,
                message: "duplicate match_id".to_string(),
            });
        }
        matches.push(record);
    }
    debug!("validated {} match rows from {source}", matches.len());
    Ok(matches)
}

fn read_rosters<R: Read>(rdr: R, source: &str) -> Result<Vec<RosterRecord>, DatasetError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rosters = Vec::new();
    for result in reader.deserialize::<RawRoster>() {
        let raw = result.map_err(|err| csv_error(source, err))?;
        rosters.push(RosterRecord::from(raw));
    }
    debug!("validated {} roster rows from {source}", rosters.len());
    Ok(rosters)
}

fn csv_error(source: &str, err: csv::Error) -> DatasetError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    };
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => DatasetError::Io {
            path: source.to_string(),
            source: io_err,
        },
        _ => DatasetError::Schema {
            path: source.to_string(),
            line,
            message,
        },
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_whole_number(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a non-negative whole number, got {raw:?}"))
    })
}

fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_whole_number(&raw)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            serde::de::Error::custom(format!("expected a non-negative whole number, got {raw:?}"))
        })
}

// Float-typed columns come through as "12.0".
fn parse_whole_number(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
