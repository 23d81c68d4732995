use std::{collections::BTreeMap, io, thread, time::Duration};

use anyhow::{Context, Result};
use arcadia_core::{
    models::{GameCategory, GameDifficulty, GameFlag, GamePlatform, GameRecord},
    query::{SortOrder, SortSpec},
    session::{QuerySession, QueryStatus, SessionState},
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MIN_RATING_STEPS: [Option<f32>; 4] = [None, Some(3.5), Some(4.0), Some(4.5)];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Filters,
}

/// One toggle row of the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterEntry {
    Category(GameCategory),
    Difficulty(GameDifficulty),
    Platform(GamePlatform),
    Flag(GameFlag),
}

impl FilterEntry {
    fn all() -> Vec<FilterEntry> {
        GameFlag::ALL
            .into_iter()
            .map(FilterEntry::Flag)
            .chain(GameCategory::ALL.into_iter().map(FilterEntry::Category))
            .chain(GameDifficulty::ALL.into_iter().map(FilterEntry::Difficulty))
            .chain(GamePlatform::ALL.into_iter().map(FilterEntry::Platform))
            .collect()
    }

    fn is_selected(self, state: &SessionState) -> bool {
        let request = &state.request;
        match self {
            FilterEntry::Category(value) => request.categories.contains(&value),
            FilterEntry::Difficulty(value) => request.difficulties.contains(&value),
            FilterEntry::Platform(value) => request.platforms.contains(&value),
            FilterEntry::Flag(value) => request.flags.contains(&value),
        }
    }

    fn label(self, counts: &BTreeMap<GameCategory, usize>) -> String {
        match self {
            FilterEntry::Category(value) => {
                let count = counts.get(&value).copied().unwrap_or(0);
                format!("{} ({count})", value.label())
            }
            FilterEntry::Difficulty(value) => format!("Difficulty: {value}"),
            FilterEntry::Platform(value) => format!("Platform: {value}"),
            FilterEntry::Flag(value) => format!("Only {value}"),
        }
    }

    fn toggle(self, session: &QuerySession) {
        match self {
            FilterEntry::Category(value) => session.toggle_category(value),
            FilterEntry::Difficulty(value) => session.toggle_difficulty(value),
            FilterEntry::Platform(value) => session.toggle_platform(value),
            FilterEntry::Flag(value) => session.toggle_flag(value),
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front-end over a [`QuerySession`].
pub struct CatalogApp {
    session: QuerySession,
    state_rx: watch::Receiver<SessionState>,
    snapshot: SessionState,
    category_counts: BTreeMap<GameCategory, usize>,
    filter_entries: Vec<FilterEntry>,
    ui: UiState,
    theme: Theme,
}

impl CatalogApp {
    pub fn new(session: QuerySession) -> Self {
        let state_rx = session.subscribe();
        let snapshot = state_rx.borrow().clone();
        Self {
            session,
            state_rx,
            snapshot,
            category_counts: BTreeMap::new(),
            filter_entries: FilterEntry::all(),
            ui: UiState::default(),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.ui.should_quit {
                break;
            }

            tokio::select! {
                maybe_event = event_rx.recv() => {
                    if !self.process_app_event(maybe_event) {
                        break;
                    }
                }
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.refresh_snapshot();
                }
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn refresh_snapshot(&mut self) {
        self.snapshot = self.state_rx.borrow_and_update().clone();
        if self.category_counts.is_empty() {
            if let Some(catalog) = self.session.catalog() {
                self.category_counts = catalog.category_counts();
            }
        }
        if self.snapshot.status == QueryStatus::Ready {
            self.ui.clamp_cursor(self.snapshot.visible_items().len());
        }
        debug!(
            status = ?self.snapshot.status,
            generation = self.snapshot.generation,
            "Session state received"
        );
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                self.handle_key(key);
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.ui.mode {
            Mode::Search => self.handle_search_key(key),
            Mode::Filters => self.handle_filter_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.ui.mode = Mode::Browse,
            KeyCode::Enter => {
                self.ui.mode = Mode::Browse;
                self.session.submit_query();
            }
            KeyCode::Backspace => {
                self.ui.search.pop();
                self.session.set_query(self.ui.search.clone());
            }
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.ui.search.push(c);
                self.session.set_query(self.ui.search.clone());
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        let total = self.filter_entries.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('f') | KeyCode::Tab => self.ui.mode = Mode::Browse,
            KeyCode::Char('j') | KeyCode::Down => {
                self.ui.filter_cursor = (self.ui.filter_cursor + 1).min(total.saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.ui.filter_cursor = self.ui.filter_cursor.saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(entry) = self.filter_entries.get(self.ui.filter_cursor) {
                    entry.toggle(&self.session);
                    self.ui.cursor = 0;
                }
            }
            KeyCode::Char('x') => self.clear_filters(),
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let visible = self.snapshot.visible_items().len();
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.ui.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui.should_quit = true
            }
            KeyCode::Char('j') | KeyCode::Down => self.ui.move_cursor(1, visible),
            KeyCode::Char('k') | KeyCode::Up => self.ui.move_cursor(-1, visible),
            KeyCode::Char('g') | KeyCode::Home => self.ui.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => self.ui.cursor = visible.saturating_sub(1),
            KeyCode::Char(']') | KeyCode::Right | KeyCode::PageDown => {
                self.ui.cursor = 0;
                self.session.next_page();
            }
            KeyCode::Char('[') | KeyCode::Left | KeyCode::PageUp => {
                self.ui.cursor = 0;
                self.session.previous_page();
            }
            KeyCode::Char('/') => self.ui.mode = Mode::Search,
            KeyCode::Char('f') | KeyCode::Tab => self.ui.mode = Mode::Filters,
            KeyCode::Char('s') => {
                let key = self.snapshot.request.sort.key.next();
                self.session.set_sort(SortSpec::by(key));
            }
            KeyCode::Char('o') => {
                let mut sort = self.snapshot.request.sort;
                sort.order = match sort.order {
                    SortOrder::Ascending => SortOrder::Descending,
                    SortOrder::Descending => SortOrder::Ascending,
                };
                self.session.set_sort(sort);
            }
            KeyCode::Char('m') => {
                let next = next_min_rating(self.snapshot.request.min_rating);
                self.session.set_min_rating(next);
            }
            KeyCode::Char('x') => self.clear_filters(),
            KeyCode::Char('r') => self.session.retry(),
            _ => {}
        }
    }

    fn clear_filters(&mut self) {
        self.ui.search.clear();
        self.ui.cursor = 0;
        self.session.clear_filters();
        info!("Filters cleared from keyboard");
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(35),
                Constraint::Percentage(40),
            ])
            .split(chunks[1]);

        self.render_search(frame, chunks[0]);
        self.render_filters(frame, body[0]);
        self.render_game_list(frame, body[1]);
        self.render_game_info(frame, body[2]);
        self.render_status(frame, chunks[2]);
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let focused = self.ui.mode == Mode::Search;
        let border = if focused {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let text = if self.ui.search.is_empty() && !focused {
            Span::styled(
                "Press / to search titles, descriptions and tags",
                Style::default().fg(self.theme.muted),
            )
        } else {
            Span::raw(format!("{}{}", self.ui.search, if focused { "_" } else { "" }))
        };
        let paragraph = Paragraph::new(Line::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title("Search"),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let focused = self.ui.mode == Mode::Filters;
        let items: Vec<ListItem> = self
            .filter_entries
            .iter()
            .map(|entry| {
                let checked = if entry.is_selected(&self.snapshot) {
                    "[x] "
                } else {
                    "[ ] "
                };
                ListItem::new(Line::from(vec![
                    Span::styled(checked, Style::default().fg(self.theme.accent)),
                    Span::raw(entry.label(&self.category_counts)),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if focused {
            list_state.select(Some(self.ui.filter_cursor));
        }
        let title = format!("Filters ({})", self.snapshot.request.active_filter_count());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_list(&self, frame: &mut Frame, area: Rect) {
        let games = self.snapshot.visible_items();
        let mut list_state = ListState::default();
        if !games.is_empty() && self.ui.mode != Mode::Filters {
            list_state.select(Some(self.ui.cursor.min(games.len() - 1)));
        }

        let dimmed = self.snapshot.status != QueryStatus::Ready;
        let items: Vec<ListItem> = games
            .iter()
            .map(|game| {
                let title_style = if dimmed {
                    Style::default().fg(self.theme.muted)
                } else {
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(game.display_name(), title_style),
                    Span::styled(
                        format!(" · ★ {:.1}", game.rating.average),
                        Style::default().fg(self.theme.muted),
                    ),
                ]))
            })
            .collect();

        let title = list_title(&self.snapshot);
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Game Details");
        let Some(game) = self.current_game() else {
            let paragraph = Paragraph::new("No game selected").block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let paragraph = Paragraph::new(detail_lines(game, &self.theme))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let color = match self.snapshot.status {
            QueryStatus::Idle | QueryStatus::Loading => self.theme.warning,
            QueryStatus::Ready if self.snapshot.is_empty() => self.theme.warning,
            QueryStatus::Ready => self.theme.success,
            QueryStatus::Failed => self.theme.danger,
        };
        let primary = Line::from(Span::styled(
            status_line(&self.snapshot),
            Style::default().fg(color),
        ));
        let help = Line::from(Span::styled(
            help_line(self.ui.mode),
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![primary, help])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn current_game(&self) -> Option<&GameRecord> {
        let games = self.snapshot.visible_items();
        games.get(self.ui.cursor.min(games.len().saturating_sub(1)))
    }
}

fn detail_lines<'a>(game: &'a GameRecord, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            game.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            game.short_description.as_str(),
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
        Line::from(format!(
            "{} · {} · ★ {:.1} ({} ratings)",
            game.category.label(),
            game.difficulty,
            game.rating.average,
            game.rating.count
        )),
    ];
    if !game.developer.is_empty() {
        lines.push(Line::from(format!("Developer: {}", game.developer)));
    }
    lines.push(Line::from(format!(
        "Released: {}",
        game.release_date.format("%B %-d, %Y")
    )));
    lines.push(Line::from(format!(
        "Plays: {} · Size: {:.1} MB",
        game.play_count, game.file_size_mb
    )));
    let platforms: Vec<_> = game.platforms.iter().map(|p| p.as_str()).collect();
    lines.push(Line::from(format!("Platforms: {}", platforms.join(", "))));

    let mut badges = Vec::new();
    for flag in GameFlag::ALL {
        if game.flags.has(flag) {
            badges.push(Span::styled(
                format!("[{flag}] "),
                Style::default().fg(theme.accent),
            ));
        }
    }
    if !badges.is_empty() {
        lines.push(Line::from(badges));
    }
    if !game.tags.is_empty() {
        lines.push(Line::from(format!("Tags: {}", game.tags.join(", "))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(game.description.as_str()));
    lines
}

fn list_title(state: &SessionState) -> String {
    let Some(page) = &state.result else {
        return "Games".to_string();
    };
    format!(
        "Games · {}page {}/{}{} · sort {} {}",
        if page.has_previous() { "◀ " } else { "" },
        page.current_page,
        page.total_pages,
        if page.has_next() { " ▶" } else { "" },
        state.request.sort.key,
        order_arrow(state.request.sort.order)
    )
}

fn status_line(state: &SessionState) -> String {
    match state.status {
        QueryStatus::Idle => "Waiting for the catalog".to_string(),
        QueryStatus::Loading => "Loading games...".to_string(),
        QueryStatus::Failed => format!(
            "{} Press r to retry.",
            state.error.as_deref().unwrap_or("Something went wrong.")
        ),
        QueryStatus::Ready => match state.result.as_ref().and_then(|page| {
            page.range()
                .map(|(first, last)| (first, last, page.total_matches))
        }) {
            Some((first, last, total)) => format!("Showing {first} to {last} of {total} games"),
            None => "No games match the current filters. Press x to clear them.".to_string(),
        },
    }
}

fn help_line(mode: Mode) -> &'static str {
    match mode {
        Mode::Browse => {
            "j/k move  [/] page  / search  f filters  s sort  o order  m rating  x clear  r retry  q quit"
        }
        Mode::Search => "type to search  Enter run now  Esc done",
        Mode::Filters => "j/k move  space toggle  x clear  Esc back",
    }
}

fn order_arrow(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "↑",
        SortOrder::Descending => "↓",
    }
}

fn next_min_rating(current: Option<f32>) -> Option<f32> {
    let index = MIN_RATING_STEPS
        .iter()
        .position(|step| *step == current)
        .unwrap_or(0);
    MIN_RATING_STEPS[(index + 1) % MIN_RATING_STEPS.len()]
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    cursor: usize,
    filter_cursor: usize,
    search: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            filter_cursor: 0,
            search: String::new(),
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let idx = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = idx as usize;
    }

    fn clamp_cursor(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcadia_core::{
        catalog::CatalogStore,
        query::{run_query, FilterRequest, FilterUpdate},
    };

    fn ready_state(update: FilterUpdate, page_size: usize) -> SessionState {
        let catalog = CatalogStore::builtin().expect("builtin catalog");
        let mut request = FilterRequest::with_page_size(page_size).expect("valid size");
        request.apply(update);
        let page = run_query(&catalog, &request).expect("valid request");
        SessionState {
            status: QueryStatus::Ready,
            result: Some(page),
            error: None,
            request,
            generation: 1,
        }
    }

    #[test]
    fn status_line_reports_visible_range() {
        let state = ready_state(FilterUpdate::default().page(2), 5);
        assert_eq!(status_line(&state), "Showing 6 to 10 of 12 games");
    }

    #[test]
    fn status_line_distinguishes_empty_from_failed() {
        let empty = ready_state(FilterUpdate::default().query("zzz"), 12);
        assert!(status_line(&empty).starts_with("No games match"));

        let mut failed = empty.clone();
        failed.status = QueryStatus::Failed;
        failed.error = Some("The game catalog is unavailable right now.".to_string());
        assert_eq!(
            status_line(&failed),
            "The game catalog is unavailable right now. Press r to retry."
        );
    }

    #[test]
    fn list_title_marks_neighbouring_pages() {
        let first = ready_state(FilterUpdate::default(), 5);
        assert_eq!(list_title(&first), "Games · page 1/3 ▶ · sort relevance ↑");

        let middle = ready_state(FilterUpdate::default().page(2), 5);
        assert_eq!(list_title(&middle), "Games · ◀ page 2/3 ▶ · sort relevance ↑");

        let mut idle = middle;
        idle.result = None;
        assert_eq!(list_title(&idle), "Games");
    }

    #[test]
    fn filter_entries_cover_every_tag_once() {
        let entries = FilterEntry::all();
        assert_eq!(
            entries.len(),
            GameFlag::ALL.len()
                + GameCategory::ALL.len()
                + GameDifficulty::ALL.len()
                + GamePlatform::ALL.len()
        );
        let state = ready_state(FilterUpdate::default().flags([GameFlag::New]), 12);
        let selected: Vec<_> = entries
            .iter()
            .filter(|entry| entry.is_selected(&state))
            .collect();
        assert_eq!(selected, [&FilterEntry::Flag(GameFlag::New)]);
    }

    #[test]
    fn min_rating_steps_wrap_around() {
        let mut value = None;
        let mut seen = Vec::new();
        for _ in 0..MIN_RATING_STEPS.len() {
            value = next_min_rating(value);
            seen.push(value);
        }
        assert_eq!(seen, [Some(3.5), Some(4.0), Some(4.5), None]);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut ui = UiState::default();
        ui.move_cursor(-3, 4);
        assert_eq!(ui.cursor, 0);
        ui.move_cursor(10, 4);
        assert_eq!(ui.cursor, 3);
        ui.clamp_cursor(2);
        assert_eq!(ui.cursor, 1);
        ui.move_cursor(1, 0);
        assert_eq!(ui.cursor, 0);
    }
}
