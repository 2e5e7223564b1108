//! Interactive TUI dashboard for the newsdesk backend
//!
//! The refresh scheduler writes into a shared `PageModel`; this module only
//! reads the page and draws it.

use crate::poller::{PollerOptions, StatusPoller};
use crate::render::{Cell, IndicatorState, PageModel, TargetContent, Tone};
use crate::scheduler::{IntervalScheduler, SchedulerHandle};
use crate::source::HttpStatusSource;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use newsdesk_common::{DashboardConfig, DisplayTargets};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TableCell, List, ListItem, Paragraph, Row as TableRow, Table},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Dashboard view state
struct Dashboard {
    page: Arc<PageModel>,
    targets: DisplayTargets,
    api_root: String,
    frequent: Duration,
    infrequent: Duration,
    should_quit: bool,
    refresh_requested: bool,
}

impl Dashboard {
    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                    KeyCode::Char('r') => self.refresh_requested = true,
                    _ => {}
                }
            }
        }
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Plain => Color::Reset,
        Tone::Primary => Color::Blue,
        Tone::Secondary => Color::Gray,
        Tone::Success => Color::Green,
        Tone::Info => Color::Cyan,
        Tone::Warning => Color::Yellow,
        Tone::Danger => Color::Red,
        Tone::Dark => Color::DarkGray,
    }
}

fn cell_span(cell: &Cell) -> Span<'static> {
    let style = Style::default().fg(tone_color(cell.tone));
    if cell.badge {
        Span::styled(format!(" {} ", cell.text), style.add_modifier(Modifier::REVERSED))
    } else {
        Span::styled(cell.text.clone(), style)
    }
}

fn indicator_span(state: Option<IndicatorState>) -> Span<'static> {
    let state = state.unwrap_or(IndicatorState::Unknown);
    Span::styled(
        state.label(),
        Style::default()
            .fg(tone_color(state.tone()))
            .add_modifier(Modifier::BOLD),
    )
}

/// Draw the dashboard UI
fn draw(f: &mut Frame, dashboard: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Counters
            Constraint::Length(8), // AI keys + services
            Constraint::Min(8),    // Recent articles
            Constraint::Length(3), // Footer
        ])
        .split(f.size());

    draw_header(f, chunks[0], dashboard);
    draw_stats(f, chunks[1], dashboard);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    draw_ai_status(f, middle[0], dashboard);
    draw_services(f, middle[1], dashboard);

    draw_recent_articles(f, chunks[3], dashboard);
    draw_footer(f, chunks[4], dashboard);
}

fn draw_header(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let version_str = format!("v{}", env!("CARGO_PKG_VERSION"));
    let time_str = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "  Newsdesk ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(version_str, Style::default().fg(Color::Gray)),
        Span::raw("  │  "),
        Span::styled(dashboard.api_root.clone(), Style::default().fg(Color::Gray)),
        Span::raw("  │  "),
        Span::styled(time_str, Style::default().fg(Color::Gray)),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .alignment(Alignment::Left);

    f.render_widget(header, area);
}

fn draw_stats(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let labels = [
        ("Total", Color::Cyan),
        ("Pending", Color::Gray),
        ("Processing", Color::Cyan),
        ("Processed", Color::Blue),
        ("Published", Color::Green),
        ("Failed", Color::Red),
        ("Today", Color::Green),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);

    for ((i, target), (label, color)) in dashboard
        .targets
        .stat_targets()
        .into_iter()
        .enumerate()
        .zip(labels)
    {
        let value = dashboard.page.text(target).unwrap_or_else(|| "-".to_string());
        let widget = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", label)),
        );
        f.render_widget(widget, cols[i]);
    }
}

fn draw_ai_status(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let placeholder = |text: &'static str| {
        vec![ListItem::new(Span::styled(text, Style::default().fg(Color::Gray)))]
    };

    let content = dashboard.page.content(&dashboard.targets.ai_status_container);
    let items: Vec<ListItem> = match &content {
        Some(TargetContent::Rows(rows)) if rows.is_empty() => placeholder("No providers"),
        Some(TargetContent::Rows(rows)) => rows
            .iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .cells
                    .iter()
                    .flat_map(|cell| [cell_span(cell), Span::raw(" ")])
                    .collect();
                ListItem::new(Line::from(spans))
            })
            .collect(),
        _ => placeholder("Loading..."),
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" AI Keys "),
    );
    f.render_widget(list, area);
}

fn draw_services(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let targets = &dashboard.targets;
    let mut lines = vec![Line::from(vec![
        Span::raw("  Scheduler:  "),
        indicator_span(dashboard.page.indicator(&targets.scheduler_status)),
    ])];
    if let Some(next_run) = dashboard.page.text(&targets.scheduler_next_run) {
        lines.push(Line::from(Span::styled(
            format!("              {}", next_run),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("  WordPress:  "),
        indicator_span(dashboard.page.indicator(&targets.wordpress_status)),
    ]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Services "),
    );
    f.render_widget(paragraph, area);
}

fn draw_recent_articles(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Recent Articles ");

    let rows = match dashboard.page.content(&dashboard.targets.recent_articles_body) {
        Some(TargetContent::Rows(rows)) => rows,
        _ => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(loading, area);
            return;
        }
    };

    let header = TableRow::new(["ID", "Title", "Status", "Feed", "Created", "Error"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table_rows: Vec<TableRow> = rows
        .iter()
        .map(|row| TableRow::new(row.cells.iter().map(|cell| TableCell::from(cell_span(cell)))))
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(44),
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Length(20),
        Constraint::Min(10),
    ];
    let table = Table::new(table_rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" q/Esc ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Quit  "),
        Span::styled(" r ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Refresh now  "),
        Span::raw(format!(
            "  Auto-refresh: {}s / WordPress {}s",
            dashboard.frequent.as_secs(),
            dashboard.infrequent.as_secs()
        )),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    )
    .alignment(Alignment::Left);

    f.render_widget(footer, area);
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the dashboard TUI until the user quits
pub async fn run(config: &DashboardConfig) -> Result<()> {
    let source = Arc::new(HttpStatusSource::new(&config.api, &config.http)?);
    let page = Arc::new(PageModel::for_targets(&config.targets));
    let poller = StatusPoller::new(
        source,
        page.clone(),
        config.targets.clone(),
        PollerOptions::from_config(config),
    );
    let scheduler = IntervalScheduler::from_config(&config.refresh);
    let handle: SchedulerHandle = scheduler.spawn(poller);

    let mut dashboard = Dashboard {
        page,
        targets: config.targets.clone(),
        api_root: config.api.api_root(),
        frequent: scheduler.frequent,
        infrequent: scheduler.infrequent,
        should_quit: false,
        refresh_requested: false,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(200);
    let result = loop {
        if let Err(e) = terminal.draw(|f| draw(f, &dashboard)) {
            break Err(e.into());
        }

        match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(event) => dashboard.handle_event(event),
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        if dashboard.refresh_requested {
            dashboard.refresh_requested = false;
            handle.refresh_now();
        }

        if dashboard.should_quit {
            break Ok(());
        }
    };

    restore_terminal(&mut terminal)?;
    handle.stop().await;
    result
}
