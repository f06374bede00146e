//! ratatui-based UI.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context as _;
use nextread_application::{ResultsView, SearchOutcome, Session, SessionEvent};
use nextread_catalog::Catalog;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use nextread_core::{BookRecord, SearchMode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use unicode_width::UnicodeWidthStr;

pub struct Ui<'a> {
    catalog: &'a Catalog,
    session: Session,
    genres: Vec<String>,
    /// Cursor into `genres` while in genre mode; `None` until the user picks.
    genre_cursor: Option<usize>,
    selected: usize,
}

impl<'a> Ui<'a> {
    pub fn new(catalog: &'a Catalog, session: Session) -> Self {
        let genres = catalog.genres();
        Self {
            catalog,
            session,
            genres,
            genre_cursor: None,
            selected: 0,
        }
    }

    /// Run the UI until the user quits; hands the session back so the caller
    /// can inspect its final state.
    pub fn run(mut self) -> anyhow::Result<Session> {
        let mut terminal = setup_terminal()?;
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(())), Ok(())) => Ok(self.session),
            (Ok(Ok(())), Err(err)) => Err(err),
            (Ok(Err(err)), _) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame.area(), frame))?;
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    needs_redraw = true;
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Returns true when the UI should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => self.dispatch(SessionEvent::Surprise),
                KeyCode::Char('t') => self.dispatch(SessionEvent::TopRated),
                KeyCode::Char('u') => {
                    self.genre_cursor = None;
                    self.dispatch(SessionEvent::ClearQuery);
                }
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc => {
                if self.session.view != ResultsView::Search {
                    self.dispatch(SessionEvent::BackToSearch);
                    false
                } else {
                    true
                }
            }
            KeyCode::Tab => {
                let mode = self.session.mode.next();
                self.genre_cursor = None;
                self.dispatch(SessionEvent::SetMode(mode));
                false
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                false
            }
            KeyCode::Down => {
                let len = self.session.visible(self.catalog).len();
                if len > 0 && self.selected + 1 < len {
                    self.selected += 1;
                }
                false
            }
            KeyCode::Left if self.session.mode == SearchMode::Genre => {
                self.move_genre_cursor(-1);
                false
            }
            KeyCode::Right if self.session.mode == SearchMode::Genre => {
                self.move_genre_cursor(1);
                false
            }
            KeyCode::Enter => {
                if let Some(record) = self.selected_record() {
                    let id = record.id();
                    self.dispatch(SessionEvent::ToggleBookmark(id));
                }
                false
            }
            KeyCode::Backspace if self.session.mode != SearchMode::Genre => {
                self.dispatch(SessionEvent::QueryBackspace);
                false
            }
            KeyCode::Char(ch) if self.session.mode != SearchMode::Genre => {
                self.dispatch(SessionEvent::QueryInput(ch));
                false
            }
            _ => false,
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let session = std::mem::take(&mut self.session);
        self.session = session.apply(self.catalog, event);
        self.clamp_selection();
    }

    fn move_genre_cursor(&mut self, delta: isize) {
        if self.genres.is_empty() {
            return;
        }
        let len = self.genres.len() as isize;
        let cursor = match self.genre_cursor {
            Some(cursor) => (cursor as isize + delta).rem_euclid(len) as usize,
            // First pick lands on either end of the list.
            None if delta < 0 => self.genres.len() - 1,
            None => 0,
        };
        self.genre_cursor = Some(cursor);
        let genre = self.genres[cursor].clone();
        self.dispatch(SessionEvent::SetQuery(genre));
    }

    fn clamp_selection(&mut self) {
        let len = self.session.visible(self.catalog).len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn selected_record(&self) -> Option<&'a BookRecord> {
        self.session.visible(self.catalog).get(self.selected).copied()
    }

    fn draw(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_search_bar(rows[0], frame);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(rows[1]);

        self.draw_results(columns[0], frame);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        self.draw_details(side[0], frame);
        self.draw_bookmarks(side[1], frame);
        self.draw_status(rows[2], frame);
    }

    fn draw_search_bar(&self, area: Rect, frame: &mut ratatui::Frame) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let active = Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let mut mode_spans = vec![Span::styled("Search by: ", bold)];
        for mode in [SearchMode::Title, SearchMode::Author, SearchMode::Genre] {
            let style = if mode == self.session.mode {
                active
            } else {
                Style::default()
            };
            mode_spans.push(Span::styled(format!(" {mode} "), style));
            mode_spans.push(Span::raw(" "));
        }
        mode_spans.push(Span::raw("(Tab to switch)"));

        let input_line = if self.session.mode == SearchMode::Genre {
            let genre = if self.session.query.is_empty() {
                "(press ←/→ to pick a genre)".to_string()
            } else {
                self.session.query.clone()
            };
            Line::from(vec![Span::styled("Genre: ", bold), Span::raw(genre)])
        } else {
            Line::from(vec![
                Span::styled(format!("Enter {}: ", self.session.mode), bold),
                Span::raw(self.session.query.clone()),
                Span::styled("▏", Style::default().fg(Color::Yellow)),
            ])
        };

        let block = Block::default().borders(Borders::ALL).title("Book Finder");
        let paragraph = Paragraph::new(Text::from(vec![Line::from(mode_spans), input_line]))
            .block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_results(&self, area: Rect, frame: &mut ratatui::Frame) {
        let visible = self.session.visible(self.catalog);
        let title = match self.session.view {
            ResultsView::Search => {
                if visible.is_empty() {
                    "Results".to_string()
                } else {
                    format!("Results — {}/{} matches", visible.len(), self.catalog.len())
                }
            }
            ResultsView::Surprise => "Surprise picks (Esc to go back)".to_string(),
            ResultsView::TopRated => "Top rated (Esc to go back)".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.session.view == ResultsView::Search {
            // An empty query and a query with zero hits read differently.
            match self.session.outcome(self.catalog) {
                SearchOutcome::NotSearched => {
                    let hint = match self.session.mode {
                        SearchMode::Genre => "Pick a genre with ←/→ to browse.",
                        _ => "Start typing to search the catalog.",
                    };
                    let paragraph = Paragraph::new(Text::from(vec![
                        Line::raw(hint),
                        Line::raw(""),
                        Line::raw("Ctrl+R for a surprise, Ctrl+T for the top shelf."),
                    ]))
                    .block(block)
                    .wrap(Wrap { trim: true });
                    frame.render_widget(paragraph, area);
                    return;
                }
                SearchOutcome::NoMatches => {
                    let paragraph = Paragraph::new(Text::from(vec![
                        Line::raw("No books found."),
                        Line::raw(""),
                        Line::raw("Please try another search."),
                    ]))
                    .block(block)
                    .wrap(Wrap { trim: true });
                    frame.render_widget(paragraph, area);
                    return;
                }
                SearchOutcome::Matches(_) => {}
            }
        }

        let max_width = area.width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = visible
            .iter()
            .map(|book| {
                let marker = if self.session.bookmarks.contains(&book.id()) {
                    "★"
                } else {
                    " "
                };
                let label = format!("{marker} {} — {}", book.title, book.authors);
                let lines = wrap_text(&label, max_width.max(8))
                    .into_iter()
                    .map(Line::raw)
                    .collect::<Vec<_>>();
                ListItem::new(Text::from(lines))
            })
            .collect();

        let highlight_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        if !visible.is_empty() {
            state.select(Some(self.selected.min(visible.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_details(&self, area: Rect, frame: &mut ratatui::Frame) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let Some(book) = self.selected_record() else {
            let paragraph = Paragraph::new(Line::raw("Nothing selected."))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        };

        let bookmarked = self.session.bookmarks.contains(&book.id());
        let lines = vec![
            Line::from(vec![Span::styled("Title: ", bold), Span::raw(book.title.clone())]),
            Line::from(vec![
                Span::styled("Author: ", bold),
                Span::raw(book.authors.clone()),
            ]),
            Line::from(vec![Span::styled("Genre: ", bold), Span::raw(book.genre.clone())]),
            Line::from(vec![
                Span::styled("Rating: ", bold),
                Span::raw(format!("{:.1} / 5.0", book.average_rating)),
            ]),
            Line::raw(""),
            Line::raw(if bookmarked {
                "★ Bookmarked — Enter removes it."
            } else {
                "Enter bookmarks this book."
            }),
        ];

        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_bookmarks(&self, area: Rect, frame: &mut ratatui::Frame) {
        let records = self.session.bookmarked_records(self.catalog);
        let title = if records.is_empty() {
            "Bookmarks".to_string()
        } else {
            format!("Bookmarks ({})", records.len())
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if records.is_empty() {
            let paragraph = Paragraph::new(Line::raw("No bookmarks yet."))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let max_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = records
            .iter()
            .map(|book| {
                let label = format!("★ {} — {}", book.title, book.authors);
                let lines = wrap_text(&label, max_width.max(8))
                    .into_iter()
                    .map(Line::raw)
                    .collect::<Vec<_>>();
                ListItem::new(Text::from(lines))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_status(&self, area: Rect, frame: &mut ratatui::Frame) {
        let skipped = self.catalog.skipped();
        let loaded = if skipped > 0 {
            format!("{} books ({} rows skipped)", self.catalog.len(), skipped)
        } else {
            format!("{} books", self.catalog.len())
        };
        let line = Line::raw(format!(
            " {loaded}  ·  Tab mode  ·  Enter bookmark  ·  Ctrl+R surprise  ·  Ctrl+T top rated  ·  Ctrl+U clear  ·  Esc quit"
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        let sep_width = if current.is_empty() { 0 } else { 1 };

        if current_width + sep_width + word_width <= max_width {
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= max_width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        let mut chunk = String::new();
        let mut chunk_width = 0usize;
        for ch in word.chars() {
            let mut buf = [0u8; 4];
            let s = ch.encode_utf8(&mut buf);
            let w = UnicodeWidthStr::width(s);
            if chunk_width + w > max_width && !chunk.is_empty() {
                lines.push(std::mem::take(&mut chunk));
                chunk_width = 0;
            }
            chunk.push(ch);
            chunk_width += w;
        }
        if !chunk.is_empty() {
            current = chunk;
            current_width = chunk_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
