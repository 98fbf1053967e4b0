//! All UI actions. Actions are the sole mechanism for state mutation:
//! key handlers and the poll bridge only ever enqueue, the app loop is
//! the single consumer.

use plotwatch_core::PollUpdate;

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Render,
    Resize(u16, u16),

    // ── Panel focus ────────────────────────────────────────────────
    FocusNext,
    FocusPrev,

    // ── Table interaction ──────────────────────────────────────────
    /// Move the focused table's selection by this many rows.
    MoveSelection(isize),
    /// Advance the focused table's sort to the next column.
    CycleSort,
    /// Flip the focused table's sort direction.
    ReverseSort,
    /// Select a row by click: (column, row) in terminal coordinates.
    Click(u16, u16),

    // ── Data ───────────────────────────────────────────────────────
    /// One poll result from the background loop.
    Poll(PollUpdate),
}
