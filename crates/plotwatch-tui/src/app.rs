//! Application core -- the single event loop that owns all state.
//!
//! Everything the render surface reads (store, tables, selection) lives
//! here and is mutated only while processing actions from the queue.
//! The background poller and the event reader only enqueue.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::Text,
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};
use tokio::sync::mpsc;
use tracing::info;

use plotwatch_core::{PlotState, PollUpdate, SnapshotStore, TableModel, aggregate};

use crate::action::Action;
use crate::event::{Event, EventReader};
use crate::rows::{ActivePlotRow, ArchivedPlotRow, DestDirRow, HostRow, SourceDirRow};
use crate::tui::Tui;
use crate::widgets::fmt;

/// The dashboard panels, in Tab-cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Active,
    SourceDirs,
    DestDirs,
    Archived,
    Hosts,
    Log,
}

impl Panel {
    const ORDER: [Self; 6] = [
        Self::Active,
        Self::SourceDirs,
        Self::DestDirs,
        Self::Archived,
        Self::Hosts,
        Self::Log,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|&p| p == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    /// Index into the app's table arrays; `None` for the log panel.
    fn table_index(self) -> Option<usize> {
        match self {
            Self::Active => Some(0),
            Self::SourceDirs => Some(1),
            Self::DestDirs => Some(2),
            Self::Archived => Some(3),
            Self::Hosts => Some(4),
            Self::Log => None,
        }
    }
}

/// Top-level application state and event loop.
pub struct App {
    store: SnapshotStore,
    active_table: TableModel,
    source_table: TableModel,
    dest_table: TableModel,
    archived_table: TableModel,
    hosts_table: TableModel,
    /// Archived success/failure counts for the title badge.
    archived_ok: usize,
    archived_failed: usize,
    /// Panel with input focus.
    focus: Panel,
    /// Selection tracker: the job id mirrored into the log panel, and
    /// which plot table it was selected in.
    log_job_id: Option<String>,
    log_owner: Option<Panel>,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Widget scroll state, one per table panel.
    table_states: [TableState; 5],
    /// Last rendered area per panel, for mouse hit-testing.
    panel_areas: [Rect; 6],
}

impl App {
    pub fn new() -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            store: SnapshotStore::new(),
            active_table: TableModel::new::<ActivePlotRow>(),
            source_table: TableModel::new::<SourceDirRow>(),
            dest_table: TableModel::new::<DestDirRow>(),
            archived_table: TableModel::new::<ArchivedPlotRow>(),
            hosts_table: TableModel::new::<HostRow>(),
            archived_ok: 0,
            archived_failed: 0,
            focus: Panel::Active,
            log_job_id: None,
            log_owner: None,
            running: true,
            action_tx,
            action_rx,
            table_states: Default::default(),
            panel_areas: [Rect::default(); 6],
        }
    }

    /// Sender for external action producers (the poll bridge).
    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;

        let mut events = EventReader::new(Duration::from_millis(33)); // ~30 FPS

        info!("dashboard event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = Self::map_key(key) {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = Self::map_mouse(&mouse) {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // Drain and process all queued actions, one at a time.
            while let Ok(action) = self.action_rx.try_recv() {
                let render = matches!(action, Action::Render);
                self.process_action(action);
                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("dashboard event loop ended");
        Ok(())
    }

    // ── Input mapping ────────────────────────────────────────────────

    fn map_key(key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
                Some(Action::Quit)
            }
            (_, KeyCode::Tab) => Some(Action::FocusNext),
            (_, KeyCode::BackTab) => Some(Action::FocusPrev),
            (_, KeyCode::Up | KeyCode::Char('k')) => Some(Action::MoveSelection(-1)),
            (_, KeyCode::Down | KeyCode::Char('j')) => Some(Action::MoveSelection(1)),
            (_, KeyCode::PageUp) => Some(Action::MoveSelection(-10)),
            (_, KeyCode::PageDown) => Some(Action::MoveSelection(10)),
            (_, KeyCode::Char('g')) => Some(Action::MoveSelection(-10_000)),
            (_, KeyCode::Char('G')) => Some(Action::MoveSelection(10_000)),
            (_, KeyCode::Char('s')) => Some(Action::CycleSort),
            (_, KeyCode::Char('r')) => Some(Action::ReverseSort),
            _ => None,
        }
    }

    fn map_mouse(mouse: &MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                Some(Action::Click(mouse.column, mouse.row))
            }
            _ => None,
        }
    }

    // ── Action processing ────────────────────────────────────────────

    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            // The next draw picks up the new size from the backend.
            Action::Render | Action::Resize(..) => {}
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPrev => self.focus = self.focus.prev(),
            Action::MoveSelection(delta) => self.move_selection(delta),
            Action::CycleSort => {
                if let Some(table) = self.table_mut(self.focus) {
                    let next = (table.sort_col() + 1) % table.columns().len();
                    table.sort_by(next);
                }
            }
            Action::ReverseSort => {
                if let Some(table) = self.table_mut(self.focus) {
                    let col = table.sort_col();
                    table.sort_by(col);
                }
            }
            Action::Click(x, y) => self.handle_click(x, y),
            Action::Poll(update) => self.apply_poll(update),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let panel = self.focus;
        let key = self
            .table_mut(panel)
            .and_then(|table| table.move_selection(delta).map(str::to_owned));
        if let Some(key) = key {
            self.track_selection(panel, key);
        }
    }

    /// Selection tracker: plot-table selections drive the log panel.
    fn track_selection(&mut self, panel: Panel, key: String) {
        if matches!(panel, Panel::Active | Panel::Archived) {
            self.log_job_id = Some(key);
            self.log_owner = Some(panel);
        }
    }

    fn handle_click(&mut self, x: u16, y: u16) {
        let hit = Panel::ORDER
            .iter()
            .find(|panel| self.panel_areas[panel.position()].contains(Position::new(x, y)));
        let Some(&panel) = hit else {
            return;
        };
        self.focus = panel;

        let Some(state_idx) = panel.table_index() else {
            return;
        };
        let area = self.panel_areas[panel.position()];
        // Rows start below the border and header.
        if y <= area.y + 1 || y >= area.y + area.height.saturating_sub(1) {
            return;
        }
        let visual = usize::from(y - area.y - 2) + self.table_states[state_idx].offset();
        let key = self
            .table(panel)
            .and_then(|table| table.key_at(visual))
            .map(str::to_owned);
        if let Some(key) = key {
            if let Some(table) = self.table_mut(panel) {
                table.select_key(&key);
            }
            self.track_selection(panel, key);
        }
    }

    /// Apply one poll result. A failed poll only changes host status,
    /// so only the hosts table needs reconciling; a successful one can
    /// change every view.
    fn apply_poll(&mut self, update: PollUpdate) {
        let failed = update.result.is_err();
        self.store.apply(&update.host, update.result);
        if failed {
            self.rebuild_hosts_table();
        } else {
            self.rebuild_tables();
        }
    }

    // ── Table reconciliation ─────────────────────────────────────────

    fn rebuild_tables(&mut self) {
        let now = Utc::now();

        let mut active: HashMap<String, ActivePlotRow> = HashMap::new();
        let mut archived: HashMap<String, ArchivedPlotRow> = HashMap::new();
        let mut archived_ok = 0;
        let mut archived_failed = 0;

        for (host, report) in self.store.records() {
            for job in &report.active {
                active.insert(job.id.clone(), ActivePlotRow::new(host, job, now));
            }
            for job in &report.archived {
                match job.state {
                    PlotState::Finished => archived_ok += 1,
                    state if state.is_failure() => archived_failed += 1,
                    _ => {}
                }
                archived.insert(job.id.clone(), ArchivedPlotRow::new(host, job));
            }
        }

        self.active_table.reconcile(&active);
        self.archived_table.reconcile(&archived);
        self.archived_ok = archived_ok;
        self.archived_failed = archived_failed;

        let rollup = aggregate(&self.store);
        let source: HashMap<String, SourceDirRow> = rollup
            .source
            .into_iter()
            .map(|(key, stats)| (key, SourceDirRow(stats)))
            .collect();
        let dest: HashMap<String, DestDirRow> = rollup
            .dest
            .into_iter()
            .map(|(key, stats)| (key, DestDirRow(stats)))
            .collect();
        self.source_table.reconcile(&source);
        self.dest_table.reconcile(&dest);

        self.rebuild_hosts_table();
    }

    fn rebuild_hosts_table(&mut self) {
        let hosts: HashMap<String, HostRow> = self
            .store
            .records()
            .map(|(host, report)| {
                (
                    host.to_owned(),
                    HostRow { host: host.to_owned(), status: report.status.clone() },
                )
            })
            .collect();
        self.hosts_table.reconcile(&hosts);
    }

    fn table(&self, panel: Panel) -> Option<&TableModel> {
        match panel {
            Panel::Active => Some(&self.active_table),
            Panel::SourceDirs => Some(&self.source_table),
            Panel::DestDirs => Some(&self.dest_table),
            Panel::Archived => Some(&self.archived_table),
            Panel::Hosts => Some(&self.hosts_table),
            Panel::Log => None,
        }
    }

    fn table_mut(&mut self, panel: Panel) -> Option<&mut TableModel> {
        match panel {
            Panel::Active => Some(&mut self.active_table),
            Panel::SourceDirs => Some(&mut self.source_table),
            Panel::DestDirs => Some(&mut self.dest_table),
            Panel::Archived => Some(&mut self.archived_table),
            Panel::Hosts => Some(&mut self.hosts_table),
            Panel::Log => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Hosts panel is low priority: cap it at four data rows plus
        // border and header chrome.
        let host_rows = u16::try_from(self.hosts_table.len().min(4)).unwrap_or(4);
        let layout = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(host_rows + 3),
            Constraint::Fill(1),
        ])
        .split(area);
        let dirs = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(layout[1]);

        self.panel_areas = [layout[0], dirs[0], dirs[1], layout[2], layout[3], layout[4]];

        let active_title = format!(" Active Plots [{}] ", self.active_table.len());
        let source_title = format!(" Source Directories [{}] ", self.source_table.len());
        let dest_title = format!(" Dest Directories [{}] ", self.dest_table.len());
        let archived_title = if self.archived_failed > 0 {
            format!(" Archived Plots [{} ({} failed)] ", self.archived_ok, self.archived_failed)
        } else {
            format!(" Archived Plots [{}] ", self.archived_ok)
        };
        let hosts_title = format!(" Hosts [{}] ", self.hosts_table.len());

        self.render_table(frame, Panel::Active, layout[0], &active_title);
        self.render_table(frame, Panel::SourceDirs, dirs[0], &source_title);
        self.render_table(frame, Panel::DestDirs, dirs[1], &dest_title);
        self.render_table(frame, Panel::Archived, layout[2], &archived_title);
        self.render_table(frame, Panel::Hosts, layout[3], &hosts_title);
        self.render_log(frame, layout[4]);
    }

    fn render_table(&mut self, frame: &mut Frame, panel: Panel, area: Rect, title: &str) {
        let Some(state_idx) = panel.table_index() else {
            return;
        };
        let block = self.panel_block(panel, title);
        let highlight = self.highlight_style(panel);

        let (header, rows, constraints, selected) = {
            let Some(table) = self.table(panel) else {
                return;
            };
            let columns = table.columns();

            let mut widths: Vec<usize> =
                columns.iter().map(|c| c.title.chars().count()).collect();
            for (_, cells) in table.rows_in_order() {
                for (i, cell) in cells.iter().enumerate() {
                    if let Some(w) = widths.get_mut(i) {
                        *w = (*w).max(cell.chars().count());
                    }
                }
            }
            let constraints: Vec<Constraint> = widths
                .iter()
                .map(|&w| Constraint::Length(u16::try_from(w).unwrap_or(u16::MAX)))
                .collect();

            let header = Row::new(columns.iter().map(|c| {
                Cell::from(Text::from(c.title).alignment(alignment_of(c.right_align)))
                    .style(Style::default().add_modifier(Modifier::BOLD))
            }));

            let rows: Vec<Row> = table
                .rows_in_order()
                .map(|(_, cells)| {
                    Row::new(cells.iter().enumerate().map(|(i, cell)| {
                        let right = columns.get(i).is_some_and(|c| c.right_align);
                        Cell::from(Text::from(cell.clone()).alignment(alignment_of(right)))
                    }))
                })
                .collect();

            (header, rows, constraints, table.selected_index())
        };

        let widget = Table::new(rows, constraints)
            .header(header)
            .block(block)
            .row_highlight_style(highlight)
            .column_spacing(2);

        let state = &mut self.table_states[state_idx];
        state.select(selected);
        frame.render_stateful_widget(widget, area, state);
    }

    fn render_log(&mut self, frame: &mut Frame, area: Rect) {
        let (title, text) = self.log_view();
        let block = self.panel_block(Panel::Log, &title);

        // Keep the tail visible: scroll so the last lines fit the panel.
        let inner_height = area.height.saturating_sub(2);
        let line_count = u16::try_from(text.lines().count()).unwrap_or(u16::MAX);
        let scroll = line_count.saturating_sub(inner_height);

        let paragraph = Paragraph::new(text).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }

    /// Resolve the log panel's title and content from the selection.
    /// An orphaned or logless selection yields empty content, never an
    /// error.
    fn log_view(&self) -> (String, String) {
        let Some(id) = self.log_job_id.as_deref() else {
            return (" Log ".into(), String::new());
        };
        let title = format!(" Log ({}) ", fmt::shorten_id(id));
        let text = self
            .store
            .log_tail(id)
            .map(|lines| lines.concat())
            .unwrap_or_default();
        (title, text)
    }

    fn panel_block(&self, panel: Panel, title: &str) -> Block<'static> {
        let border_style = if self.focus == panel {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .title(title.to_owned())
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(border_style)
    }

    /// The plot table owning the current selection renders it bold;
    /// the other plot table keeps a dim remembered selection.
    fn highlight_style(&self, panel: Panel) -> Style {
        let modifier = match panel {
            Panel::Active | Panel::Archived => {
                if self.log_owner == Some(panel) {
                    Modifier::REVERSED | Modifier::BOLD
                } else {
                    Modifier::REVERSED | Modifier::DIM
                }
            }
            _ => Modifier::REVERSED,
        };
        Style::default().add_modifier(modifier)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn alignment_of(right: bool) -> Alignment {
    if right { Alignment::Right } else { Alignment::Left }
}
