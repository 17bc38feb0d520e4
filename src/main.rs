use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{error, info, warn};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row,
    Table, Tabs,
};

use pkl_terminal::aggregate;
use pkl_terminal::config::DashboardConfig;
use pkl_terminal::dataset::{self, Dataset};
use pkl_terminal::export::export_summaries_with_progress;
use pkl_terminal::logging;
use pkl_terminal::state::{AppState, Tab, tab_label};
use pkl_terminal::summary::{Query, SummaryTable, run_query};

const LABEL_WIDTH: usize = 28;

struct App {
    state: AppState,
    dataset: Dataset,
    config: DashboardConfig,
    should_quit: bool,
}

impl App {
    fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let names = aggregate::player_names(dataset.rosters());
        let mut state = AppState::new(names);
        state.push_log(format!(
            "[INFO] Loaded {} matches, {} roster rows",
            dataset.matches().len(),
            dataset.rosters().len()
        ));
        Self {
            state,
            dataset,
            config,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(ch @ '1'..='5') => {
                if let Some(tab) = Tab::from_digit(ch) {
                    self.state.select_tab(tab);
                }
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.state.next_tab(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.state.prev_tab(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_player(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_player(),
            KeyCode::Char('c') => {
                self.state.cycle_card();
                self.state
                    .push_log(format!("[INFO] Card ranking: {}", self.state.card.label()));
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn export(&mut self) {
        let path = self.config.export_path_or_default();
        let display = path.display().to_string();
        self.state.export = Default::default();
        self.state.export.active = true;
        self.state.export.path = Some(display.clone());

        let export_state = &mut self.state.export;
        let result = export_summaries_with_progress(&path, &self.dataset, |progress| {
            export_state.current = progress.current;
            export_state.total = progress.total;
            export_state.message = progress.message;
        });

        self.state.export.done = true;
        self.state.export.last_updated = Some(Instant::now());
        match result {
            Ok(report) => {
                self.state.push_log(format!(
                    "[INFO] Exported {} sheets ({} rows) to {display}",
                    report.sheets, report.rows
                ));
            }
            Err(err) => {
                warn!("export to {display} failed: {err:#}");
                self.state.export.failed = true;
                self.state.push_log(format!("[WARN] Export failed: {err}"));
            }
        }
    }
}

fn main() -> Result<()> {
    let config = DashboardConfig::from_env_and_args();
    logging::init_file(&config.log_file)?;

    let dataset = dataset::load_dataset(&config.matches_path, &config.rosters_path)
        .context("load PKL dataset")?;
    info!("starting dashboard");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(dataset, config);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("dashboard stopped: {err}");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.state.maybe_clear_export(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_tabs(frame, chunks[0], &app.state);

    match app.state.tab {
        Tab::Players => render_players(frame, chunks[1], app),
        _ => {
            let queries = app.state.tab_queries();
            render_query_grid(frame, chunks[1], &app.dataset, &queries);
        }
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    let titles = Tab::ALL
        .iter()
        .map(|tab| format!("{} {}", tab.index() + 1, tab_label(*tab)))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .block(
            Block::default()
                .title("Pro Kabaddi League (Seasons 1-10) Analysis")
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_query_grid(frame: &mut Frame, area: Rect, dataset: &Dataset, queries: &[Query]) {
    for (query, cell) in queries.iter().zip(grid_cells(area, queries.len())) {
        render_query(frame, cell, dataset, query);
    }
}

/// Two columns, as many rows as needed. A single query fills the area.
fn grid_cells(area: Rect, count: usize) -> Vec<Rect> {
    if count <= 1 {
        return vec![area];
    }
    let rows = count.div_ceil(2);
    let row_constraints = vec![Constraint::Ratio(1, rows as u32); rows];
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    let mut cells = Vec::with_capacity(count);
    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let remaining = count - row_idx * 2;
        if remaining == 1 {
            cells.push(*row_area);
            continue;
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row_area);
        cells.push(cols[0]);
        cells.push(cols[1]);
    }
    cells
}

fn render_query(frame: &mut Frame, area: Rect, dataset: &Dataset, query: &Query) {
    let table = run_query(dataset, query);
    let block = Block::default().title(table.title.clone()).borders(Borders::ALL);
    if table.is_empty() {
        let empty = Paragraph::new("No data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    match query.metric_column() {
        Some(metric) => {
            let chart = summary_bar_chart(&table, metric).block(block);
            frame.render_widget(chart, area);
        }
        None => {
            let widget = summary_table(&table).block(block);
            frame.render_widget(widget, area);
        }
    }
}

fn summary_bar_chart(table: &SummaryTable, metric: &str) -> BarChart<'static> {
    let points = table.chart_points(metric);
    let max = points.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1);
    let bars = points
        .into_iter()
        .map(|(label, value)| {
            Bar::default()
                .value(value)
                .label(Line::from(truncate_label(&label, LABEL_WIDTH)))
                .text_value(value.to_string())
                .style(Style::default().fg(Color::Cyan))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect::<Vec<_>>();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(max)
}

fn summary_table(table: &SummaryTable) -> Table<'static> {
    let widths = vec![Constraint::Ratio(1, table.columns.len().max(1) as u32); table.columns.len()];
    let header = Row::new(table.columns.clone())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = table
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    Table::new(rows, widths).header(header)
}

fn render_players(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(7)])
        .split(columns[0]);

    render_player_picker(frame, left[0], &app.state);

    let mut queries = app.state.tab_queries();
    let lookup_idx = queries
        .iter()
        .position(|q| matches!(q, Query::PlayerCards { .. }));
    match lookup_idx {
        Some(idx) => {
            let lookup = queries.remove(idx);
            render_query(frame, left[1], &app.dataset, &lookup);
        }
        None => {
            let empty = Paragraph::new("No players loaded")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title("Player Card Lookup").borders(Borders::ALL));
            frame.render_widget(empty, left[1]);
        }
    }

    render_query_grid(frame, columns[1], &app.dataset, &queries);
}

fn render_player_picker(frame: &mut Frame, area: Rect, state: &AppState) {
    let items = state
        .player_names
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(Block::default().title("Select a player (j/k)").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !state.player_names.is_empty() {
        list_state.select(Some(state.selected_player));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn console_text(state: &AppState) -> String {
    let mut lines = Vec::new();
    if state.export.active {
        let status = if !state.export.done {
            format!(
                "Export {}/{}: {}",
                state.export.current, state.export.total, state.export.message
            )
        } else if state.export.failed {
            "Export failed".to_string()
        } else {
            format!(
                "Export done: {}",
                state.export.path.as_deref().unwrap_or("-")
            )
        };
        lines.push(status);
    }
    let take = 2usize.saturating_sub(lines.len());
    let recent = state
        .logs
        .iter()
        .rev()
        .take(take)
        .cloned()
        .collect::<Vec<_>>();
    lines.extend(recent.into_iter().rev());
    if lines.is_empty() {
        return "No alerts yet".to_string();
    }
    lines.join("\n")
}

fn footer_text(state: &AppState) -> String {
    match state.tab {
        Tab::Players => format!(
            "1-5 Tabs | Tab/←/→ Switch | j/k/↑/↓ Player | c Card: {} | e Export | ? Help | q Quit",
            state.card.label()
        ),
        _ => "1-5 Tabs | Tab/←/→ Switch | e Export | ? Help | q Quit".to_string(),
    }
}

fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let mut out = label.chars().take(width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "PKL Terminal - Help",
        "",
        "Global:",
        "  1-5          Jump to tab",
        "  Tab / →      Next tab",
        "  Shift-Tab/←  Previous tab",
        "  e            Export all summaries (.xlsx)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Player-Level Analysis:",
        "  j/k or ↑/↓   Move player picker",
        "  c            Cycle card type ranking",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
