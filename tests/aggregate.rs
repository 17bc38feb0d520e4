use pkl_terminal::aggregate::{
    self, CardCounts, CardType, SeasonTopTeams, SeasonWinner, Tally, YearCount,
};
use pkl_terminal::dataset::{MatchRecord, RosterRecord};

fn game(
    match_id: u64,
    season: u32,
    stage: &str,
    team_1: &str,
    score_1: u32,
    team_2: &str,
    score_2: u32,
) -> MatchRecord {
    let (winner, loser) = if score_2 > score_1 {
        (team_2, team_1)
    } else {
        (team_1, team_2)
    };
    MatchRecord {
        match_id,
        season,
        year: 2013 + season,
        stage: stage.to_string(),
        venue: "Arena".to_string(),
        team_1: team_1.to_string(),
        team_2: team_2.to_string(),
        score_1,
        score_2,
        max_score: score_1.max(score_2),
        total_points: score_1 + score_2,
        winner: winner.to_string(),
        loser: loser.to_string(),
        winning_margin: score_1.abs_diff(score_2),
        match_name: format!("{team_1} vs {team_2}"),
    }
}

fn roster(player_id: u64, name: &str, season: u32) -> RosterRecord {
    RosterRecord {
        player_id,
        name: name.to_string(),
        season,
        played_count: 0,
        green_cards: 0,
        yellow_cards: 0,
        red_cards: 0,
        top_raider_count: 0,
        total_points: 0,
    }
}

fn tally(label: &str, count: u64) -> Tally {
    Tally {
        label: label.to_string(),
        count,
    }
}

#[test]
fn empty_inputs_give_empty_results() {
    let matches: Vec<MatchRecord> = Vec::new();
    let rosters: Vec<RosterRecord> = Vec::new();

    assert!(aggregate::finals_winners_by_season(&matches).is_empty());
    assert!(aggregate::matches_per_stage(&matches).is_empty());
    assert!(aggregate::max_scoring_matches_by_season(&matches).is_empty());
    assert!(aggregate::matches_per_year(&matches).is_empty());
    assert!(aggregate::top_matches_by_margin(&matches, 10).is_empty());
    assert!(aggregate::titles_per_team(&matches).is_empty());
    assert!(aggregate::max_scoring_teams_by_season(&matches).is_empty());
    assert!(aggregate::finals_played_per_team(&matches).is_empty());
    assert!(aggregate::top_teams_by_wins(&matches, 10).is_empty());
    assert!(aggregate::top_venues(&matches, 10).is_empty());
    assert_eq!(aggregate::card_totals(&rosters), CardCounts::default());
    assert_eq!(aggregate::player_card_totals(&rosters, "X"), CardCounts::default());
    assert!(aggregate::top_players_by_card(&rosters, CardType::Red, 3).is_empty());
    assert!(aggregate::top_raiders(&rosters, 10).is_empty());
    assert!(aggregate::top_players_by_matches(&rosters, 10).is_empty());
    assert!(aggregate::player_names(&rosters).is_empty());
    assert_eq!(
        aggregate::overview(&matches, &rosters),
        aggregate::Overview::default()
    );
}

#[test]
fn one_final_per_season_gives_one_winner_row() {
    let matches = vec![
        game(1, 2, "Final", "B", 30, "C", 20),
        game(2, 1, "League", "A", 30, "B", 20),
        game(3, 1, "Final", "A", 31, "C", 29),
    ];
    let rows = aggregate::finals_winners_by_season(&matches);
    assert_eq!(
        rows,
        vec![
            SeasonWinner {
                season: 1,
                winner: "A".to_string()
            },
            SeasonWinner {
                season: 2,
                winner: "B".to_string()
            },
        ]
    );
}

#[test]
fn seasons_without_or_with_several_finals_are_not_forced_to_one_row() {
    let matches = vec![
        game(1, 1, "League", "A", 30, "B", 20),
        game(2, 2, "Final", "A", 30, "B", 20),
        game(3, 2, "Final", "C", 25, "B", 20),
    ];
    let rows = aggregate::finals_winners_by_season(&matches);
    let winners: Vec<(u32, &str)> = rows.iter().map(|r| (r.season, r.winner.as_str())).collect();
    assert_eq!(winners, vec![(2, "A"), (2, "C")]);
}

#[test]
fn stage_labels_are_matched_exactly() {
    let matches = vec![
        game(1, 1, "Final", "A", 30, "B", 20),
        game(2, 2, "final", "C", 30, "B", 20),
    ];
    assert_eq!(aggregate::titles_per_team(&matches), vec![tally("A", 1)]);
    assert_eq!(
        aggregate::finals_played_per_team(&matches),
        vec![tally("A", 1), tally("B", 1)]
    );
    assert_eq!(
        aggregate::matches_per_stage(&matches),
        vec![tally("Final", 1), tally("final", 1)]
    );
}

#[test]
fn stage_counts_rank_by_count_with_first_seen_ties() {
    let matches = vec![
        game(1, 1, "Eliminator", "A", 30, "B", 20),
        game(2, 1, "League", "A", 30, "B", 20),
        game(3, 1, "Final", "A", 30, "B", 20),
        game(4, 1, "League", "A", 30, "B", 20),
    ];
    assert_eq!(
        aggregate::matches_per_stage(&matches),
        vec![tally("League", 2), tally("Eliminator", 1), tally("Final", 1)]
    );
}

#[test]
fn tied_maximum_total_returns_every_tied_match() {
    let matches = vec![
        game(1, 1, "League", "A", 40, "B", 30),
        game(2, 1, "League", "C", 35, "D", 35),
        game(3, 1, "League", "E", 20, "F", 10),
        game(4, 2, "League", "A", 50, "C", 10),
    ];
    let rows = aggregate::max_scoring_matches_by_season(&matches);
    let labels: Vec<(u32, u32, String)> = rows
        .iter()
        .map(|r| (r.season, r.total_points, r.label()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (1, 70, "A vs B".to_string()),
            (1, 70, "C vs D".to_string()),
            (2, 60, "A vs C".to_string()),
        ]
    );
}

#[test]
fn matches_per_year_is_ascending() {
    let matches = vec![
        game(1, 3, "League", "A", 30, "B", 20),
        game(2, 1, "League", "A", 30, "B", 20),
        game(3, 3, "League", "A", 30, "B", 20),
    ];
    assert_eq!(
        aggregate::matches_per_year(&matches),
        vec![
            YearCount {
                year: 2014,
                matches: 1
            },
            YearCount {
                year: 2016,
                matches: 2
            },
        ]
    );
}

#[test]
fn top_margin_keeps_input_order_for_ties_at_the_cutoff() {
    let matches = vec![
        game(1, 1, "League", "A", 40, "B", 30),
        game(2, 1, "League", "C", 50, "D", 20),
        game(3, 1, "League", "E", 35, "F", 25),
        game(4, 1, "League", "G", 45, "H", 35),
    ];
    let top = aggregate::top_matches_by_margin(&matches, 2);
    let ids: Vec<u64> = top.iter().map(|m| m.match_id).collect();
    assert_eq!(ids, vec![2, 1]);

    let all = aggregate::top_matches_by_margin(&matches, 10);
    let ids: Vec<u64> = all.iter().map(|m| m.match_id).collect();
    assert_eq!(ids, vec![2, 1, 3, 4]);
}

#[test]
fn titles_count_only_finals() {
    let matches = vec![
        game(1, 1, "Final", "A", 30, "B", 20),
        game(2, 2, "Final", "B", 30, "A", 20),
        game(3, 2, "Group", "A", 30, "B", 20),
    ];
    assert_eq!(
        aggregate::titles_per_team(&matches),
        vec![tally("A", 1), tally("B", 1)]
    );
}

#[test]
fn max_scoring_team_is_only_the_side_that_hit_the_maximum() {
    let matches = vec![
        game(1, 1, "League", "A", 120, "B", 115),
        game(2, 1, "League", "C", 60, "D", 50),
    ];
    assert_eq!(
        aggregate::max_scoring_teams_by_season(&matches),
        vec![SeasonTopTeams {
            season: 1,
            max_team_points: 120,
            teams: vec!["A".to_string()],
        }]
    );
}

#[test]
fn max_scoring_teams_include_both_sides_and_deduplicate() {
    let matches = vec![
        game(1, 1, "League", "Zeta", 50, "Alpha", 50),
        game(2, 1, "League", "Zeta", 50, "Beta", 40),
        game(3, 2, "League", "Beta", 44, "Alpha", 30),
    ];
    let rows = aggregate::max_scoring_teams_by_season(&matches);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].max_team_points, 50);
    assert_eq!(rows[0].teams, vec!["Alpha".to_string(), "Zeta".to_string()]);
    assert_eq!(rows[1].teams, vec!["Beta".to_string()]);
}

#[test]
fn finals_played_sums_both_sides() {
    let matches = vec![
        game(1, 1, "Final", "A", 30, "B", 20),
        game(2, 2, "Final", "A", 30, "C", 20),
        game(3, 3, "Final", "D", 30, "A", 20),
        game(4, 3, "League", "A", 30, "B", 20),
    ];
    let rows = aggregate::finals_played_per_team(&matches);
    assert_eq!(
        rows,
        vec![tally("A", 3), tally("B", 1), tally("C", 1), tally("D", 1)]
    );
    assert_eq!(aggregate::top_finals_played(&matches, 2).len(), 2);
}

#[test]
fn wins_and_venues_take_top_k() {
    let mut matches = vec![
        game(1, 1, "League", "A", 30, "B", 20),
        game(2, 1, "League", "B", 30, "A", 20),
        game(3, 1, "League", "B", 30, "C", 20),
        game(4, 1, "League", "C", 30, "A", 20),
    ];
    matches[0].venue = "Pune".to_string();
    matches[2].venue = "Pune".to_string();

    assert_eq!(
        aggregate::top_teams_by_wins(&matches, 2),
        vec![tally("B", 2), tally("A", 1)]
    );
    assert_eq!(
        aggregate::top_venues(&matches, 10),
        vec![tally("Pune", 2), tally("Arena", 2)]
    );
}

#[test]
fn per_player_cards_sum_across_seasons() {
    let rosters = vec![
        RosterRecord {
            green_cards: 1,
            ..roster(1, "X", 1)
        },
        RosterRecord {
            green_cards: 2,
            yellow_cards: 1,
            ..roster(1, "X", 2)
        },
        RosterRecord {
            red_cards: 4,
            ..roster(2, "Y", 1)
        },
    ];
    assert_eq!(
        aggregate::player_card_totals(&rosters, "X"),
        CardCounts {
            green: 3,
            yellow: 1,
            red: 0
        }
    );
    assert_eq!(
        aggregate::card_totals(&rosters),
        CardCounts {
            green: 3,
            yellow: 1,
            red: 4
        }
    );
    assert_eq!(
        aggregate::player_card_totals(&rosters, "Nobody"),
        CardCounts::default()
    );
}

#[test]
fn card_rankings_group_by_name_and_break_ties_by_name() {
    let rosters = vec![
        RosterRecord {
            yellow_cards: 2,
            ..roster(3, "Charlie", 1)
        },
        RosterRecord {
            yellow_cards: 1,
            ..roster(1, "Bravo", 1)
        },
        RosterRecord {
            yellow_cards: 1,
            ..roster(1, "Bravo", 2)
        },
        RosterRecord {
            yellow_cards: 1,
            ..roster(2, "Alpha", 1)
        },
    ];
    assert_eq!(
        aggregate::top_players_by_card(&rosters, CardType::Yellow, 2),
        vec![tally("Bravo", 2), tally("Charlie", 2)]
    );
    assert_eq!(
        aggregate::top_players_by_card(&rosters, CardType::Yellow, 10).len(),
        3
    );
}

#[test]
fn top_raiders_sort_by_points_and_carry_raider_count() {
    let rosters = vec![
        RosterRecord {
            total_points: 100,
            top_raider_count: 9,
            ..roster(1, "A", 1)
        },
        RosterRecord {
            total_points: 80,
            top_raider_count: 1,
            ..roster(2, "B", 1)
        },
        RosterRecord {
            total_points: 80,
            top_raider_count: 2,
            ..roster(2, "B", 2)
        },
    ];
    let rows = aggregate::top_raiders(&rosters, 10);
    assert_eq!(rows[0].name, "B");
    assert_eq!(rows[0].total_points, 160);
    assert_eq!(rows[0].top_raider_count, 3);
    assert_eq!(rows[1].name, "A");
    assert_eq!(rows[1].top_raider_count, 9);
}

#[test]
fn matches_played_counts_distinct_seasons_and_tolerates_duplicates() {
    let rosters = vec![
        RosterRecord {
            played_count: 10,
            ..roster(7, "P", 1)
        },
        RosterRecord {
            played_count: 4,
            ..roster(7, "P", 1)
        },
        RosterRecord {
            played_count: 12,
            ..roster(7, "P", 2)
        },
        RosterRecord {
            played_count: 20,
            ..roster(8, "Q", 1)
        },
    ];
    let rows = aggregate::top_players_by_matches(&rosters, 10);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].player_id, 7);
    assert_eq!(rows[0].total_matches, 26);
    assert_eq!(rows[0].seasons_played, 2);
    assert_eq!(rows[1].name, "Q");
    assert_eq!(rows[1].seasons_played, 1);
}

#[test]
fn overview_counts_distinct_ids() {
    let matches = vec![
        game(1, 1, "League", "A", 30, "B", 20),
        game(2, 2, "League", "A", 30, "B", 20),
    ];
    let rosters = vec![roster(1, "X", 1), roster(1, "X", 2), roster(2, "Y", 1)];
    let stats = aggregate::overview(&matches, &rosters);
    assert_eq!(stats.total_matches, 2);
    assert_eq!(stats.total_players, 2);
    assert_eq!(stats.seasons, 2);
    assert_eq!(
        aggregate::player_names(&rosters),
        vec!["X".to_string(), "Y".to_string()]
    );
}

#[test]
fn repeated_calls_are_identical() {
    let matches = vec![
        game(1, 1, "Final", "A", 30, "B", 20),
        game(2, 1, "League", "C", 30, "B", 30),
        game(3, 2, "Final", "B", 44, "A", 20),
    ];
    let rosters = vec![
        RosterRecord {
            green_cards: 1,
            total_points: 5,
            ..roster(1, "X", 1)
        },
        RosterRecord {
            red_cards: 1,
            total_points: 5,
            ..roster(2, "Y", 1)
        },
    ];

    assert_eq!(
        aggregate::overview(&matches, &rosters),
        aggregate::overview(&matches, &rosters)
    );
    assert_eq!(
        aggregate::finals_winners_by_season(&matches),
        aggregate::finals_winners_by_season(&matches)
    );
    assert_eq!(
        aggregate::matches_per_stage(&matches),
        aggregate::matches_per_stage(&matches)
    );
    assert_eq!(
        aggregate::max_scoring_matches_by_season(&matches),
        aggregate::max_scoring_matches_by_season(&matches)
    );
    assert_eq!(
        aggregate::matches_per_year(&matches),
        aggregate::matches_per_year(&matches)
    );
    assert_eq!(
        aggregate::top_matches_by_margin(&matches, 2),
        aggregate::top_matches_by_margin(&matches, 2)
    );
    assert_eq!(
        aggregate::titles_per_team(&matches),
        aggregate::titles_per_team(&matches)
    );
    assert_eq!(
        aggregate::max_scoring_teams_by_season(&matches),
        aggregate::max_scoring_teams_by_season(&matches)
    );
    assert_eq!(
        aggregate::finals_played_per_team(&matches),
        aggregate::finals_played_per_team(&matches)
    );
    assert_eq!(
        aggregate::top_finals_played(&matches, 2),
        aggregate::top_finals_played(&matches, 2)
    );
    assert_eq!(
        aggregate::top_teams_by_wins(&matches, 5),
        aggregate::top_teams_by_wins(&matches, 5)
    );
    assert_eq!(
        aggregate::top_venues(&matches, 5),
        aggregate::top_venues(&matches, 5)
    );
    assert_eq!(
        aggregate::card_totals(&rosters),
        aggregate::card_totals(&rosters)
    );
    assert_eq!(
        aggregate::player_card_totals(&rosters, "X"),
        aggregate::player_card_totals(&rosters, "X")
    );
    for card in CardType::ALL {
        assert_eq!(
            aggregate::top_players_by_card(&rosters, card, 3),
            aggregate::top_players_by_card(&rosters, card, 3)
        );
    }
    assert_eq!(
        aggregate::top_raiders(&rosters, 5),
        aggregate::top_raiders(&rosters, 5)
    );
    assert_eq!(
        aggregate::top_players_by_matches(&rosters, 5),
        aggregate::top_players_by_matches(&rosters, 5)
    );
    assert_eq!(
        aggregate::player_names(&rosters),
        aggregate::player_names(&rosters)
    );
}
