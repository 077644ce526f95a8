use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hdb_resale::bands::FloorLevel;
use hdb_resale::db::ResaleRecord;
use hdb_resale::entities::TownRegistry;
use hdb_resale::filter::FilterCriteria;
use hdb_resale::stats;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    TownSummary,
    Records,
    Views,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterType {
    None,
    AllRecords,
    LowFloor,
    MidFloor,
    HighFloor,
    ByTown(String),
    ByYear(i32),
}

#[derive(Debug, Clone)]
pub struct FilterState {
    pub active_filter: FilterType,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::TownSummary => Page::Records,
            Page::Records => Page::Views,
            Page::Views => Page::TownSummary,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::TownSummary => Page::Views,
            Page::Records => Page::TownSummary,
            Page::Views => Page::Records,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::TownSummary => "Town Summary",
            Page::Records => "Resale Records",
            Page::Views => "Views",
        }
    }
}

pub struct App {
    pub records: Vec<ResaleRecord>,
    pub filtered_records: Vec<ResaleRecord>,
    pub state: TableState,
    pub total_count: i64,
    pub current_page: Page,
    pub town_summary_state: TableState,
    pub show_detail: bool,
    pub filter_state: FilterState,
    towns: TownRegistry,
}

impl App {
    pub fn new(records: Vec<ResaleRecord>, total_count: i64) -> Self {
        let mut state = TableState::default();
        if !records.is_empty() {
            state.select(Some(0));
        }

        let mut town_summary_state = TableState::default();
        town_summary_state.select(Some(0));

        let filtered_records = records.clone();

        Self {
            records,
            filtered_records,
            state,
            total_count,
            current_page: Page::Records,
            town_summary_state,
            show_detail: false,
            filter_state: FilterState {
                active_filter: FilterType::None,
            },
            towns: TownRegistry::new(),
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_record(&self) -> Option<&ResaleRecord> {
        self.state.selected().and_then(|i| self.filtered_records.get(i))
    }

    /// Latest transaction year present in the loaded data
    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().filter_map(|r| r.year()).max()
    }

    pub fn apply_filter(&mut self, filter: FilterType) {
        self.filter_state.active_filter = filter.clone();

        let criteria = match filter {
            FilterType::None | FilterType::AllRecords => FilterCriteria::new(),
            FilterType::LowFloor => {
                FilterCriteria::new().with_floor_levels(vec![FloorLevel::Low])
            }
            FilterType::MidFloor => {
                FilterCriteria::new().with_floor_levels(vec![FloorLevel::Mid])
            }
            FilterType::HighFloor => {
                FilterCriteria::new().with_floor_levels(vec![FloorLevel::High])
            }
            FilterType::ByTown(ref town) => FilterCriteria::new().with_town(town.clone()),
            FilterType::ByYear(year) => FilterCriteria::new().with_years(vec![year]),
        };

        self.filtered_records = criteria.apply(&self.records);

        // Reset selection to first item
        if !self.filtered_records.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(FilterType::None);
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Per-town rows for the summary page: region, count, mean price
    pub fn town_summary(&self) -> Vec<(String, String, usize, f64)> {
        let counts = stats::town_counts(&self.records);

        counts
            .into_iter()
            .map(|tc| {
                let total: f64 = self
                    .records
                    .iter()
                    .filter(|r| r.town == tc.town)
                    .map(|r| r.resale_price)
                    .sum();
                let avg = total / tc.count as f64;
                let region = self
                    .towns
                    .region_of(&tc.town)
                    .map(|r| r.name().to_string())
                    .unwrap_or_else(|| "-".to_string());

                (tc.town, region, tc.count, avg)
            })
            .collect()
    }

    pub fn next(&mut self) {
        let len = self.filtered_records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered_records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered_records.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                let next = i + 20;
                if next >= len {
                    len - 1
                } else {
                    next
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if i < 20 {
                    0
                } else {
                    i - 20
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Char('c') => {
                    app.clear_filter();
                    app.current_page = Page::Records;
                }
                KeyCode::Char('1') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::AllRecords);
                    app.current_page = Page::Records;
                }
                KeyCode::Char('2') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::LowFloor);
                    app.current_page = Page::Records;
                }
                KeyCode::Char('3') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::MidFloor);
                    app.current_page = Page::Records;
                }
                KeyCode::Char('4') if app.current_page == Page::Views => {
                    app.apply_filter(FilterType::HighFloor);
                    app.current_page = Page::Records;
                }
                KeyCode::Char('5') if app.current_page == Page::Views => {
                    if let Some(year) = app.latest_year() {
                        app.apply_filter(FilterType::ByYear(year));
                        app.current_page = Page::Records;
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered_records.is_empty() {
                        app.state.select(Some(app.filtered_records.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    // Header with page navigation
    render_header(f, chunks[0], app);

    // Content area with optional split for detail panel
    if app.show_detail && app.current_page == Page::Records {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Record list
                Constraint::Percentage(40), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        // Normal full-width content
        match app.current_page {
            Page::TownSummary => render_town_summary(f, chunks[1], app),
            Page::Records => render_table(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    // Status bar
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    // Page tabs
    let pages = vec![
        (Page::TownSummary, "Town Summary"),
        (Page::Records, "Resale Records"),
        (Page::Views, "Views"),
    ];

    let mut tab_spans = vec![];
    for (i, (page, name)) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(*name, style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Total: {}", app.total_count),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Shown: {}", app.filtered_records.len()),
        Style::default().fg(Color::Green),
    ));

    let header_text = vec![Line::from(tab_spans)];

    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Month", "Town", "Type", "Storey", "Area m²", "Lease", "Price"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered_records.iter().map(|record| {
        let color = match record.floor_level() {
            FloorLevel::Low => Color::Cyan,
            FloorLevel::Mid => Color::Green,
            FloorLevel::High => Color::Magenta,
            FloorLevel::Unknown => Color::White,
        };

        let cells = vec![
            Cell::from(record.month.clone()),
            Cell::from(truncate(&record.town, 16)),
            Cell::from(record.flat_type.clone()),
            Cell::from(record.storey_range.clone()).style(Style::default().fg(color)),
            Cell::from(format!("{:.0}", record.floor_area_sqm)),
            Cell::from(record.remaining_lease.clone()),
            Cell::from(format!("${:>9.0}", record.resale_price))
                .style(Style::default().fg(Color::Green)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(18),
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(20),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Resale Transactions "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let lines = if let Some(record) = app.selected_record() {
        vec![
            Line::from(""),
            detail_line("Month", record.month.clone()),
            detail_line("Town", record.town.clone()),
            detail_line("Flat type", record.flat_type.clone()),
            detail_line("Block", record.block.clone()),
            detail_line("Street", record.street_name.clone()),
            detail_line(
                "Storey",
                format!("{} ({})", record.storey_range, record.floor_level().name()),
            ),
            detail_line("Floor area", format!("{:.1} sqm", record.floor_area_sqm)),
            detail_line("Model", record.flat_model.clone()),
            detail_line("Lease from", record.lease_commence_date.to_string()),
            detail_line(
                "Remaining",
                format!("{} ({})", record.remaining_lease, record.lease_band().name()),
            ),
            detail_line("Price", format!("${:.0}", record.resale_price)),
        ]
    } else {
        vec![Line::from(""), Line::from("  No record selected")]
    };

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Record Detail "),
    );

    f.render_widget(panel, area);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:<12}", label),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(value),
    ])
}

fn render_town_summary(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = app.town_summary();

    let header_cells = ["Town", "Region", "Transactions", "Avg Price"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = summary.iter().map(|(town, region, count, avg)| {
        let cells = vec![
            Cell::from(town.clone()),
            Cell::from(region.clone()),
            Cell::from(format!("{}", count)),
            Cell::from(format!("${:.0}", avg)).style(Style::default().fg(Color::Green)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Town Summary - Transactions by Town "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.town_summary_state);
}

fn render_views(f: &mut Frame, area: Rect, app: &App) {
    let latest = app
        .latest_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "latest".to_string());

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Press a number to apply a view:"),
        ]),
        Line::from(""),
        view_line("1", "All records".to_string()),
        view_line("2", FloorLevel::Low.name().to_string()),
        view_line("3", FloorLevel::Mid.name().to_string()),
        view_line("4", FloorLevel::High.name().to_string()),
        view_line("5", format!("{} transactions only", latest)),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  c clears the active view.",
            Style::default().fg(Color::DarkGray),
        )]),
    ];

    let views = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views - Canned Filters "),
    );

    f.render_widget(views, area);
}

fn view_line(key: &str, label: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  [{}] ", key),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(label),
    ])
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.filtered_records.len();

    let mut status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, total),
            Style::default().fg(Color::Cyan),
        ),
    ];

    // Show filter status if active
    if app.filter_state.active_filter != FilterType::None
        && app.filter_state.active_filter != FilterType::AllRecords {
        let filter_name = match &app.filter_state.active_filter {
            FilterType::LowFloor => FloorLevel::Low.name().to_string(),
            FilterType::MidFloor => FloorLevel::Mid.name().to_string(),
            FilterType::HighFloor => FloorLevel::High.name().to_string(),
            FilterType::ByTown(town) => town.clone(),
            FilterType::ByYear(year) => year.to_string(),
            _ => "CUSTOM".to_string(),
        };
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", filter_name),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Fast | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_text = vec![Line::from(status_spans)];

    let status_bar = Paragraph::new(status_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month: &str, town: &str, storey: &str, price: f64) -> ResaleRecord {
        ResaleRecord {
            month: month.to_string(),
            town: town.to_string(),
            flat_type: "4 ROOM".to_string(),
            block: "1".to_string(),
            street_name: "TEST ST".to_string(),
            storey_range: storey.to_string(),
            floor_area_sqm: 90.0,
            flat_model: "Model A".to_string(),
            lease_commence_date: 2000,
            remaining_lease: "75 years".to_string(),
            resale_price: price,
        }
    }

    fn test_app() -> App {
        let records = vec![
            record("2024-11", "BEDOK", "04 TO 06", 500000.0),
            record("2024-12", "BEDOK", "10 TO 12", 520000.0),
            record("2025-01", "YISHUN", "13 TO 15", 480000.0),
        ];
        App::new(records, 3)
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::TownSummary.next(), Page::Records);
        assert_eq!(Page::Views.next(), Page::TownSummary);
        assert_eq!(Page::TownSummary.previous(), Page::Views);
    }

    #[test]
    fn test_apply_floor_filter() {
        let mut app = test_app();
        app.apply_filter(FilterType::HighFloor);

        assert_eq!(app.filtered_records.len(), 1);
        assert_eq!(app.filtered_records[0].town, "YISHUN");
    }

    #[test]
    fn test_clear_filter_restores_all() {
        let mut app = test_app();
        app.apply_filter(FilterType::ByTown("BEDOK".to_string()));
        assert_eq!(app.filtered_records.len(), 2);

        app.clear_filter();
        assert_eq!(app.filtered_records.len(), 3);
    }

    #[test]
    fn test_latest_year() {
        let app = test_app();
        assert_eq!(app.latest_year(), Some(2025));
    }

    #[test]
    fn test_town_summary_regions() {
        let app = test_app();
        let summary = app.town_summary();

        // BEDOK leads with two transactions
        assert_eq!(summary[0].0, "BEDOK");
        assert_eq!(summary[0].1, "East");
        assert_eq!(summary[0].2, 2);
        assert_eq!(summary[0].3, 510000.0);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = test_app();
        app.state.select(Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
    }
}
