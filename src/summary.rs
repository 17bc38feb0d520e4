use std::fmt;

use log::debug;
use serde::Serialize;

use crate::aggregate::{self, CardCounts, CardType};
use crate::dataset::Dataset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(u64),
    Text(String),
}

impl Cell {
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Cell::Int(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(u64::from(value))
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as u64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Ordered result of one query. Rows are aligned to `columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SummaryTable {
    fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Vec<&Cell> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows.iter().filter_map(|row| row.get(idx)).collect()
    }

    /// One (label, value) point per row: `metric` gives the value, the
    /// remaining cells joined by " | " give the label. Rows without an
    /// integer metric are skipped.
    pub fn chart_points(&self, metric: &str) -> Vec<(String, u64)> {
        let Some(metric_idx) = self.column_index(metric) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| {
                let value = row.get(metric_idx)?.as_int()?;
                let label = row
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != metric_idx)
                    .map(|(_, cell)| cell.to_string())
                    .collect::<Vec<_>>()
                    .join(" | ");
                Some((label, value))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Overview,
    FinalsWinners,
    StageCounts,
    MaxScoringMatches,
    MatchesPerYear,
    TopMarginMatches { k: usize },
    TitlesPerTeam,
    MaxScoringTeams,
    TopFinalsPlayed { k: usize },
    TopWinningTeams { k: usize },
    TopVenues { k: usize },
    CardTotals,
    PlayerCards { name: String },
    TopCardPlayers { card: CardType, k: usize },
    TopRaiders { k: usize },
    TopMatchesPlayed { k: usize },
}

impl Query {
    pub fn title(&self) -> String {
        match self {
            Query::Overview => "Basic PKL Overview".to_string(),
            Query::FinalsWinners => "Winner per Season".to_string(),
            Query::StageCounts => "Number of Matches per League Stage".to_string(),
            Query::MaxScoringMatches => "Max Scoring Matches per Season".to_string(),
            Query::MatchesPerYear => "Year-wise Number of Matches".to_string(),
            Query::TopMarginMatches { k } => {
                format!("Top {k} Matches with Highest Winning Margin (All Seasons)")
            }
            Query::TitlesPerTeam => "Number of PKL Titles per Team".to_string(),
            Query::MaxScoringTeams => "Max Scoring Team(s) per Season".to_string(),
            Query::TopFinalsPlayed { k } => format!("Top {k} Most Final-Playing Teams"),
            Query::TopWinningTeams { k } => format!("Top {k} Most Winning Teams (All Seasons)"),
            Query::TopVenues { k } => format!("Top {k} Most Matches Hosting Venues"),
            Query::CardTotals => "Total Number of Cards Issued".to_string(),
            Query::PlayerCards { name } => format!("Cards for {name}"),
            Query::TopCardPlayers { card, k } => {
                format!("Top {k} Players with Most {} Cards", card.label())
            }
            Query::TopRaiders { k } => format!("Top {k} Most Successful Raiders (by Total Points)"),
            Query::TopMatchesPlayed { k } => format!("Top {k} Players with Most Matches Played"),
        }
    }

    /// Numeric column charted as bar height. `None` renders as a plain table.
    pub fn metric_column(&self) -> Option<&'static str> {
        match self {
            Query::Overview | Query::FinalsWinners => None,
            Query::StageCounts => Some("count"),
            Query::MaxScoringMatches => Some("total_points_match"),
            Query::MatchesPerYear => Some("total matches"),
            Query::TopMarginMatches { .. } => Some("winning_margin"),
            Query::TitlesPerTeam => Some("titles"),
            Query::MaxScoringTeams => Some("max_team_points"),
            Query::TopFinalsPlayed { .. } => Some("finals_played"),
            Query::TopWinningTeams { .. } => Some("wins"),
            Query::TopVenues { .. } => Some("matches hosted"),
            Query::CardTotals | Query::PlayerCards { .. } => Some("Total Count"),
            Query::TopCardPlayers { card, .. } => Some(card.column()),
            Query::TopRaiders { .. } => Some("total_points"),
            Query::TopMatchesPlayed { .. } => Some("total_matches"),
        }
    }

    /// Worksheet name for exports. Kept under the 31-character sheet limit.
    pub fn sheet_name(&self) -> String {
        match self {
            Query::Overview => "Overview".to_string(),
            Query::FinalsWinners => "FinalsWinners".to_string(),
            Query::StageCounts => "StageCounts".to_string(),
            Query::MaxScoringMatches => "MaxScoringMatches".to_string(),
            Query::MatchesPerYear => "MatchesPerYear".to_string(),
            Query::TopMarginMatches { .. } => "TopMargins".to_string(),
            Query::TitlesPerTeam => "Titles".to_string(),
            Query::MaxScoringTeams => "MaxScoringTeams".to_string(),
            Query::TopFinalsPlayed { .. } => "FinalsPlayed".to_string(),
            Query::TopWinningTeams { .. } => "MostWins".to_string(),
            Query::TopVenues { .. } => "Venues".to_string(),
            Query::CardTotals => "CardTotals".to_string(),
            Query::PlayerCards { .. } => "PlayerCards".to_string(),
            Query::TopCardPlayers { card, .. } => format!("{}Cards", card.label()),
            Query::TopRaiders { .. } => "TopRaiders".to_string(),
            Query::TopMatchesPlayed { .. } => "MostMatchesPlayed".to_string(),
        }
    }
}

/// The summaries the dashboard shows, in tab order.
pub fn dashboard_queries() -> Vec<Query> {
    let mut queries = Vec::new();
    queries.extend(overview_queries());
    queries.extend(match_queries());
    queries.extend(team_queries());
    queries.extend(venue_queries());
    queries.extend(player_queries(CardType::ALL.as_slice()));
    queries
}

pub fn overview_queries() -> Vec<Query> {
    vec![Query::Overview, Query::FinalsWinners, Query::StageCounts]
}

pub fn match_queries() -> Vec<Query> {
    vec![
        Query::MaxScoringMatches,
        Query::MatchesPerYear,
        Query::TopMarginMatches { k: 10 },
    ]
}

pub fn team_queries() -> Vec<Query> {
    vec![
        Query::TitlesPerTeam,
        Query::MaxScoringTeams,
        Query::TopFinalsPlayed { k: 5 },
        Query::TopWinningTeams { k: 10 },
    ]
}

pub fn venue_queries() -> Vec<Query> {
    vec![Query::TopVenues { k: 10 }]
}

/// Player tab summaries, with a card ranking for each requested card type.
pub fn player_queries(cards: &[CardType]) -> Vec<Query> {
    let mut queries = vec![Query::CardTotals];
    queries.extend(cards.iter().map(|&card| Query::TopCardPlayers {
        card,
        k: card_ranking_size(card),
    }));
    queries.push(Query::TopRaiders { k: 10 });
    queries.push(Query::TopMatchesPlayed { k: 10 });
    queries
}

pub fn card_ranking_size(card: CardType) -> usize {
    match card {
        CardType::Red => 3,
        CardType::Green | CardType::Yellow => 10,
    }
}

pub fn run_query(dataset: &Dataset, query: &Query) -> SummaryTable {
    let matches = dataset.matches();
    let rosters = dataset.rosters();
    debug!("running query {query:?}");

    let table = match query {
        Query::Overview => {
            let stats = aggregate::overview(matches, rosters);
            let mut table = SummaryTable::new(query.title(), &["metric", "value"]);
            table.push(vec!["Total Matches".into(), stats.total_matches.into()]);
            table.push(vec!["Total Players".into(), stats.total_players.into()]);
            table.push(vec!["Seasons".into(), stats.seasons.into()]);
            table
        }
        Query::FinalsWinners => {
            let mut table = SummaryTable::new(query.title(), &["season", "winner"]);
            for row in aggregate::finals_winners_by_season(matches) {
                table.push(vec![row.season.into(), row.winner.into()]);
            }
            table
        }
        Query::StageCounts => {
            let mut table = SummaryTable::new(query.title(), &["league_stage", "count"]);
            for row in aggregate::matches_per_stage(matches) {
                table.push(vec![row.label.into(), row.count.into()]);
            }
            table
        }
        Query::MaxScoringMatches => {
            let mut table = SummaryTable::new(query.title(), &["season", "total_points_match", "match"]);
            for row in aggregate::max_scoring_matches_by_season(matches) {
                let label = row.label();
                table.push(vec![row.season.into(), row.total_points.into(), label.into()]);
            }
            table
        }
        Query::MatchesPerYear => {
            let mut table = SummaryTable::new(query.title(), &["year", "total matches"]);
            for row in aggregate::matches_per_year(matches) {
                table.push(vec![row.year.into(), row.matches.into()]);
            }
            table
        }
        Query::TopMarginMatches { k } => {
            let mut table = SummaryTable::new(
                query.title(),
                &["season", "winner", "loser", "winning_margin", "match_name"],
            );
            for m in aggregate::top_matches_by_margin(matches, *k) {
                table.push(vec![
                    m.season.into(),
                    m.winner.as_str().into(),
                    m.loser.as_str().into(),
                    m.winning_margin.into(),
                    m.match_name.as_str().into(),
                ]);
            }
            table
        }
        Query::TitlesPerTeam => {
            let mut table = SummaryTable::new(query.title(), &["winner", "titles"]);
            for row in aggregate::titles_per_team(matches) {
                table.push(vec![row.label.into(), row.count.into()]);
            }
            table
        }
        Query::MaxScoringTeams => {
            let mut table = SummaryTable::new(
                query.title(),
                &["season", "max_team_points", "max_scoring_team"],
            );
            for row in aggregate::max_scoring_teams_by_season(matches) {
                table.push(vec![
                    row.season.into(),
                    row.max_team_points.into(),
                    row.teams.join(",").into(),
                ]);
            }
            table
        }
        Query::TopFinalsPlayed { k } => {
            let mut table = SummaryTable::new(query.title(), &["team_name", "finals_played"]);
            for row in aggregate::top_finals_played(matches, *k) {
                table.push(vec![row.label.into(), row.count.into()]);
            }
            table
        }
        Query::TopWinningTeams { k } => {
            let mut table = SummaryTable::new(query.title(), &["winner", "wins"]);
            for row in aggregate::top_teams_by_wins(matches, *k) {
                table.push(vec![row.label.into(), row.count.into()]);
            }
            table
        }
        Query::TopVenues { k } => {
            let mut table = SummaryTable::new(query.title(), &["venue", "matches hosted"]);
            for row in aggregate::top_venues(matches, *k) {
                table.push(vec![row.label.into(), row.count.into()]);
            }
            table
        }
        Query::CardTotals => card_table(query.title(), aggregate::card_totals(rosters)),
        Query::PlayerCards { name } => {
            card_table(query.title(), aggregate::player_card_totals(rosters, name))
        }
        Query::TopCardPlayers { card, k } => {
            let mut table = SummaryTable::new(query.title(), &["name", card.column()]);
            for row in aggregate::top_players_by_card(rosters, *card, *k) {
                table.push(vec![row.label.into(), row.count.into()]);
            }
            table
        }
        Query::TopRaiders { k } => {
            let mut table = SummaryTable::new(
                query.title(),
                &["name", "total_points", "top_raider_count"],
            );
            for row in aggregate::top_raiders(rosters, *k) {
                table.push(vec![
                    row.name.into(),
                    row.total_points.into(),
                    row.top_raider_count.into(),
                ]);
            }
            table
        }
        Query::TopMatchesPlayed { k } => {
            let mut table = SummaryTable::new(
                query.title(),
                &["player_id", "name", "total_matches", "seasons_played"],
            );
            for row in aggregate::top_players_by_matches(rosters, *k) {
                table.push(vec![
                    row.player_id.into(),
                    row.name.into(),
                    row.total_matches.into(),
                    row.seasons_played.into(),
                ]);
            }
            table
        }
    };
    table
}

fn card_table(title: String, counts: CardCounts) -> SummaryTable {
    let mut table = SummaryTable::new(title, &["Card Type", "Total Count"]);
    for card in CardType::ALL {
        table.push(vec![card.column().into(), counts.get(card).into()]);
    }
    table
}
