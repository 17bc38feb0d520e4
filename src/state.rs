use std::collections::VecDeque;
use std::time::Instant;

use crate::aggregate::CardType;
use crate::summary::{self, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Matches,
    Teams,
    Venues,
    Players,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Matches,
        Tab::Teams,
        Tab::Venues,
        Tab::Players,
    ];

    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Matches => 1,
            Tab::Teams => 2,
            Tab::Venues => 3,
            Tab::Players => 4,
        }
    }

    /// `'1'` to `'5'`.
    pub fn from_digit(ch: char) -> Option<Tab> {
        let idx = ch.to_digit(10)? as usize;
        idx.checked_sub(1).and_then(|i| Tab::ALL.get(i).copied())
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub tab: Tab,
    pub player_names: Vec<String>,
    pub selected_player: usize,
    pub card: CardType,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub export: ExportState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AppState {
    pub fn new(player_names: Vec<String>) -> Self {
        Self {
            tab: Tab::Overview,
            player_names,
            selected_player: 0,
            card: CardType::Green,
            help_overlay: false,
            logs: VecDeque::new(),
            export: ExportState::new(),
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
    }

    pub fn select_next_player(&mut self) {
        let total = self.player_names.len();
        if total == 0 {
            self.selected_player = 0;
            return;
        }
        self.selected_player = (self.selected_player + 1) % total;
    }

    pub fn select_prev_player(&mut self) {
        let total = self.player_names.len();
        if total == 0 {
            self.selected_player = 0;
            return;
        }
        if self.selected_player == 0 {
            self.selected_player = total - 1;
        } else {
            self.selected_player -= 1;
        }
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.player_names
            .get(self.selected_player)
            .map(String::as_str)
    }

    pub fn cycle_card(&mut self) {
        self.card = self.card.next();
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Summaries shown on the active tab. The player tab follows the picker
    /// and the selected card type.
    pub fn tab_queries(&self) -> Vec<Query> {
        match self.tab {
            Tab::Overview => summary::overview_queries(),
            Tab::Matches => summary::match_queries(),
            Tab::Teams => summary::team_queries(),
            Tab::Venues => summary::venue_queries(),
            Tab::Players => {
                let mut queries = summary::player_queries(&[self.card]);
                if let Some(name) = self.selected_player() {
                    queries.insert(
                        1,
                        Query::PlayerCards {
                            name: name.to_string(),
                        },
                    );
                }
                queries
            }
        }
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub current: usize,
    pub total: usize,
    pub message: String,
    pub failed: bool,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            path: None,
            current: 0,
            total: 0,
            message: String::new(),
            failed: false,
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}

pub fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Overview => "Basic Overview",
        Tab::Matches => "Match-Level Analysis",
        Tab::Teams => "Team Analysis",
        Tab::Venues => "Venue Insights",
        Tab::Players => "Player-Level Analysis",
    }
}
