//! Summary queries over match and roster records.
//!
//! Every function here is a pure transformation of its inputs. Rankings use
//! stable sorts, so rows that tie on the ranked metric keep the order in which
//! they were grouped (first appearance for value counts, name order for
//! per-player groupings).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::debug;
use serde::Serialize;

use crate::dataset::{MatchRecord, RosterRecord};

/// A label and how many times it was counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonWinner {
    pub season: u32,
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonMaxMatch {
    pub season: u32,
    pub total_points: u32,
    pub team_1: String,
    pub team_2: String,
}

impl SeasonMaxMatch {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.team_1, self.team_2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: u32,
    pub matches: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonTopTeams {
    pub season: u32,
    pub max_team_points: u32,
    /// Sorted and de-duplicated.
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CardCounts {
    pub green: u64,
    pub yellow: u64,
    pub red: u64,
}

impl CardCounts {
    pub fn get(&self, card: CardType) -> u64 {
        match card {
            CardType::Green => self.green,
            CardType::Yellow => self.yellow,
            CardType::Red => self.red,
        }
    }

    fn add(&mut self, row: &RosterRecord) {
        self.green += u64::from(row.green_cards);
        self.yellow += u64::from(row.yellow_cards);
        self.red += u64::from(row.red_cards);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CardType {
    Green,
    Yellow,
    Red,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Green, CardType::Yellow, CardType::Red];

    pub fn label(self) -> &'static str {
        match self {
            CardType::Green => "Green",
            CardType::Yellow => "Yellow",
            CardType::Red => "Red",
        }
    }

    /// Source column name, also used as the row label in card tables.
    pub fn column(self) -> &'static str {
        match self {
            CardType::Green => "green_card_count",
            CardType::Yellow => "yellow_card_count",
            CardType::Red => "red_card_count",
        }
    }

    pub fn next(self) -> Self {
        match self {
            CardType::Green => CardType::Yellow,
            CardType::Yellow => CardType::Red,
            CardType::Red => CardType::Green,
        }
    }

    fn count(self, row: &RosterRecord) -> u32 {
        match self {
            CardType::Green => row.green_cards,
            CardType::Yellow => row.yellow_cards,
            CardType::Red => row.red_cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaiderTotals {
    pub name: String,
    pub top_raider_count: u64,
    pub total_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAppearances {
    pub player_id: u64,
    pub name: String,
    pub total_matches: u64,
    pub seasons_played: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_matches: usize,
    pub total_players: usize,
    pub seasons: usize,
}

pub fn overview(matches: &[MatchRecord], rosters: &[RosterRecord]) -> Overview {
    let match_ids: HashSet<u64> = matches.iter().map(|m| m.match_id).collect();
    let player_ids: HashSet<u64> = rosters.iter().map(|r| r.player_id).collect();
    let seasons: HashSet<u32> = matches.iter().map(|m| m.season).collect();
    Overview {
        total_matches: match_ids.len(),
        total_players: player_ids.len(),
        seasons: seasons.len(),
    }
}

/// Every final's winner, by season. Seasons with no final are absent; a season
/// with several finals yields several rows in input order.
pub fn finals_winners_by_season(matches: &[MatchRecord]) -> Vec<SeasonWinner> {
    let mut rows: Vec<SeasonWinner> = matches
        .iter()
        .filter(|m| m.is_final())
        .map(|m| SeasonWinner {
            season: m.season,
            winner: m.winner.clone(),
        })
        .collect();
    rows.sort_by_key(|row| row.season);
    rows
}

pub fn matches_per_stage(matches: &[MatchRecord]) -> Vec<Tally> {
    value_counts(matches.iter().map(|m| m.stage.as_str()))
}

/// Matches reaching their season's highest combined score. Ties are all kept.
pub fn max_scoring_matches_by_season(matches: &[MatchRecord]) -> Vec<SeasonMaxMatch> {
    let best = season_maxima(matches, |m| m.total_points);
    best.iter()
        .flat_map(move |(&season, &max)| {
            matches
                .iter()
                .filter(move |m| m.season == season && m.total_points == max)
                .map(|m| SeasonMaxMatch {
                    season: m.season,
                    total_points: m.total_points,
                    team_1: m.team_1.clone(),
                    team_2: m.team_2.clone(),
                })
        })
        .collect()
}

pub fn matches_per_year(matches: &[MatchRecord]) -> Vec<YearCount> {
    let mut per_year: BTreeMap<u32, u64> = BTreeMap::new();
    for m in matches {
        *per_year.entry(m.year).or_default() += 1;
    }
    per_year
        .into_iter()
        .map(|(year, matches)| YearCount { year, matches })
        .collect()
}

/// Largest winning margins first; equal margins keep input order.
pub fn top_matches_by_margin(matches: &[MatchRecord], k: usize) -> Vec<&MatchRecord> {
    let mut ranked: Vec<&MatchRecord> = matches.iter().collect();
    ranked.sort_by(|a, b| b.winning_margin.cmp(&a.winning_margin));
    ranked.truncate(k);
    ranked
}

pub fn titles_per_team(matches: &[MatchRecord]) -> Vec<Tally> {
    value_counts(
        matches
            .iter()
            .filter(|m| m.is_final())
            .map(|m| m.winner.as_str()),
    )
}

/// Per season, the highest single-team score and every team that reached it.
pub fn max_scoring_teams_by_season(matches: &[MatchRecord]) -> Vec<SeasonTopTeams> {
    let best = season_maxima(matches, |m| m.max_score);
    best.into_iter()
        .map(|(season, max)| {
            let mut teams: BTreeSet<&str> = BTreeSet::new();
            for m in matches.iter().filter(|m| m.season == season) {
                if m.score_1 == max {
                    teams.insert(&m.team_1);
                }
                if m.score_2 == max {
                    teams.insert(&m.team_2);
                }
            }
            SeasonTopTeams {
                season,
                max_team_points: max,
                teams: teams.into_iter().map(str::to_string).collect(),
            }
        })
        .collect()
}

/// Finals played per team, counting both sides. Ties are ordered by name.
pub fn finals_played_per_team(matches: &[MatchRecord]) -> Vec<Tally> {
    let mut played: BTreeMap<&str, u64> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.is_final()) {
        *played.entry(m.team_1.as_str()).or_default() += 1;
        *played.entry(m.team_2.as_str()).or_default() += 1;
    }
    let rows = played
        .into_iter()
        .map(|(label, count)| Tally {
            label: label.to_string(),
            count,
        })
        .collect();
    rank_desc(rows, |row| row.count)
}

pub fn top_finals_played(matches: &[MatchRecord], k: usize) -> Vec<Tally> {
    top_k(finals_played_per_team(matches), k)
}

pub fn top_teams_by_wins(matches: &[MatchRecord], k: usize) -> Vec<Tally> {
    top_k(value_counts(matches.iter().map(|m| m.winner.as_str())), k)
}

pub fn top_venues(matches: &[MatchRecord], k: usize) -> Vec<Tally> {
    top_k(value_counts(matches.iter().map(|m| m.venue.as_str())), k)
}

pub fn card_totals(rosters: &[RosterRecord]) -> CardCounts {
    let mut totals = CardCounts::default();
    for row in rosters {
        totals.add(row);
    }
    totals
}

/// Card totals for one player across every season. Unknown names give zeros.
pub fn player_card_totals(rosters: &[RosterRecord], name: &str) -> CardCounts {
    let mut totals = CardCounts::default();
    for row in rosters.iter().filter(|r| r.name == name) {
        totals.add(row);
    }
    totals
}

pub fn top_players_by_card(rosters: &[RosterRecord], card: CardType, k: usize) -> Vec<Tally> {
    let mut per_player: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rosters {
        *per_player.entry(row.name.as_str()).or_default() += u64::from(card.count(row));
    }
    let rows = per_player
        .into_iter()
        .map(|(label, count)| Tally {
            label: label.to_string(),
            count,
        })
        .collect();
    top_k(rank_desc(rows, |row| row.count), k)
}

/// Ranked by total points; the top-raider count rides along for display.
pub fn top_raiders(rosters: &[RosterRecord], k: usize) -> Vec<RaiderTotals> {
    let mut per_player: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for row in rosters {
        let entry = per_player.entry(row.name.as_str()).or_default();
        entry.0 += u64::from(row.top_raider_count);
        entry.1 += u64::from(row.total_points);
    }
    let rows = per_player
        .into_iter()
        .map(|(name, (top_raider_count, total_points))| RaiderTotals {
            name: name.to_string(),
            top_raider_count,
            total_points,
        })
        .collect();
    top_k(rank_desc(rows, |row| row.total_points), k)
}

pub fn top_players_by_matches(rosters: &[RosterRecord], k: usize) -> Vec<PlayerAppearances> {
    let mut per_player: BTreeMap<(u64, &str), (u64, BTreeSet<u32>)> = BTreeMap::new();
    for row in rosters {
        let entry = per_player
            .entry((row.player_id, row.name.as_str()))
            .or_default();
        entry.0 += u64::from(row.played_count);
        entry.1.insert(row.season);
    }
    let rows = per_player
        .into_iter()
        .map(|((player_id, name), (total_matches, seasons))| PlayerAppearances {
            player_id,
            name: name.to_string(),
            total_matches,
            seasons_played: seasons.len(),
        })
        .collect();
    top_k(rank_desc(rows, |row| row.total_matches), k)
}

/// Sorted, de-duplicated player names for the card lookup picker.
pub fn player_names(rosters: &[RosterRecord]) -> Vec<String> {
    let names: BTreeSet<&str> = rosters.iter().map(|r| r.name.as_str()).collect();
    names.into_iter().map(str::to_string).collect()
}

fn season_maxima(matches: &[MatchRecord], metric: impl Fn(&MatchRecord) -> u32) -> BTreeMap<u32, u32> {
    let mut best: BTreeMap<u32, u32> = BTreeMap::new();
    for m in matches {
        let value = metric(m);
        best.entry(m.season)
            .and_modify(|max| *max = (*max).max(value))
            .or_insert(value);
    }
    debug!("season maxima computed for {} seasons", best.len());
    best
}

/// Counts labels in first-appearance order, then ranks by count.
fn value_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<Tally> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<Tally> = Vec::new();
    for label in labels {
        match index.get(label) {
            Some(&idx) => rows[idx].count += 1,
            None => {
                index.insert(label, rows.len());
                rows.push(Tally {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }
    rank_desc(rows, |row| row.count)
}

// `sort_by` is stable: equal keys keep their incoming order.
fn rank_desc<T>(mut rows: Vec<T>, key: impl Fn(&T) -> u64) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

fn top_k<T>(mut rows: Vec<T>, k: usize) -> Vec<T> {
    rows.truncate(k);
    rows
}
