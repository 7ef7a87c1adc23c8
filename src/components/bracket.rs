use std::collections::BTreeSet;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::text::{Line, Span};
use tui::widgets::Widget;
use wc26_core::timezone::{TimezoneMode, format_match_time, local_kickoff};
use wc26_core::{BracketSplit, FeederNode, Fixture, FixtureStore, Round, SlotRef};

use crate::components::theme::{Theme, ThemeColor, resolve};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: home line, match number/date line, away line.
pub const GAME_HEIGHT: u16 = 3;

/// Columns in one half of the draw: Round of 32 through Semi-final.
pub const HALF_DEPTHS: usize = 4;

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum match cell width in wider terminals.
const CELL_W_FULL: u16 = 22;

/// Below this the full diagram is unreadable and the stacked list is used.
pub const CELL_W_MIN: u16 = 9;

/// Slot height at a depth (0 = leaf). SH[0] = GAME_HEIGHT; SH[d] = 2 * SH[d-1] + 1.
pub const fn slot_height(depth: usize) -> u16 {
    ((GAME_HEIGHT + 1) << depth) - 1
}

/// Rows consumed by one half of the draw. Equals slot_height(3) = 31.
pub const HALF_HEIGHT: u16 = slot_height(HALF_DEPTHS - 1);

/// Two halves of four columns plus the centre column.
const FULL_COLUMNS: u16 = 2 * HALF_DEPTHS as u16 + 1;
/// Three connector zones inside each half plus one on each side of the centre.
const FULL_CONNECTORS: u16 = 2 * (HALF_DEPTHS as u16 - 1) + 2;

/// Cell width for the full diagram in `width` columns, or `None` when the
/// stacked list should be drawn instead.
pub fn cell_width_for(width: u16) -> Option<u16> {
    let cell = width.saturating_sub(FULL_CONNECTORS * CONNECTOR_WIDTH) / FULL_COLUMNS;
    (cell >= CELL_W_MIN).then_some(cell.min(CELL_W_FULL))
}

/// Total width of the full diagram at a given cell width.
pub fn full_width(cell_width: u16) -> u16 {
    FULL_COLUMNS * cell_width + FULL_CONNECTORS * CONNECTOR_WIDTH
}

// ---------------------------------------------------------------------------
// GameCell: pre-computed position for one match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameCell {
    /// Row of the middle line, relative to the top of the half. Not scroll-adjusted.
    pub center_row: u16,
    /// Starting x-column within the half.
    pub col: u16,
    pub cell_width: u16,
    /// 0 = leaf column.
    pub depth: usize,
    /// Position within the column, top to bottom before any flip.
    pub index: usize,
}

// ---------------------------------------------------------------------------
// BracketGrid: layout engine for one half
// ---------------------------------------------------------------------------

/// Pre-computed layout for a binary tree of `depths` columns.
///
/// Column order left to right: leaves | conn | ... | root. Mirrored grids put
/// the root on the left so two halves can face each other.
#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// All cells in depth-major order, leaves first.
    pub cells: Vec<GameCell>,
    /// Starting x-column for each depth.
    pub round_cols: Vec<u16>,
    pub total_width: u16,
    pub total_height: u16,
    pub cell_width: u16,
    pub mirrored: bool,
    depths: usize,
}

impl BracketGrid {
    /// Center rows follow the triangle formula:
    ///   center[d][i] = SH[d]/2 + i * (SH[d+1] - SH[d])
    ///
    /// For four depths:
    ///   R32 (d=0): [1, 5, 9, 13, 17, 21, 25, 29]  (spacing 4)
    ///   R16 (d=1): [3, 11, 19, 27]                 (spacing 8)
    ///   QF  (d=2): [7, 23]                         (spacing 16)
    ///   SF  (d=3): [15]
    pub fn compute(cell_width: u16, depths: usize) -> Self {
        Self::compute_inner(cell_width, depths, false)
    }

    /// Root on the left, leaves on the right.
    pub fn compute_mirrored(cell_width: u16, depths: usize) -> Self {
        Self::compute_inner(cell_width, depths, true)
    }

    fn compute_inner(cell_width: u16, depths: usize, mirrored: bool) -> Self {
        let depths = depths.max(1);
        let stride = cell_width + CONNECTOR_WIDTH;
        let last = depths as u16 - 1;
        let round_cols: Vec<u16> = (0..depths as u16)
            .map(|d| if mirrored { stride * (last - d) } else { stride * d })
            .collect();
        let total_width = stride * last + cell_width;

        let mut cells = Vec::with_capacity((1 << depths) - 1);
        for d in 0..depths {
            let first_center = slot_height(d) / 2;
            let spacing = slot_height(d + 1) - slot_height(d);
            for i in 0..Self::count_at(depths, d) {
                cells.push(GameCell {
                    center_row: first_center + i as u16 * spacing,
                    col: round_cols[d],
                    cell_width,
                    depth: d,
                    index: i,
                });
            }
        }

        Self {
            cells,
            round_cols,
            total_width,
            total_height: slot_height(depths - 1),
            cell_width,
            mirrored,
            depths,
        }
    }

    fn count_at(depths: usize, depth: usize) -> usize {
        1 << (depths - 1 - depth)
    }

    /// Cells for one depth, top to bottom.
    pub fn cells_for_depth(&self, depth: usize) -> &[GameCell] {
        if depth >= self.depths {
            return &[];
        }
        let offset: usize = (0..depth).map(|d| Self::count_at(self.depths, d)).sum();
        &self.cells[offset..offset + Self::count_at(self.depths, depth)]
    }

    /// Center row of the root cell; where the half meets the Final.
    pub fn root_row(&self) -> u16 {
        self.total_height / 2
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// The whole knockout draw: left half, Final and third-place match in the
/// centre, right half mirrored.
///
/// ```text
///  R32 ─┐                                     ┌─ R32
///       ├─ R16 ─┐                     ┌─ R16 ─┤
///  R32 ─┘       ├─ QF ─ SF ── FINAL ── SF ─ QF ┤
/// ```
pub struct BracketView<'a> {
    pub split: &'a BracketSplit<'a>,
    pub store: &'a FixtureStore,
    pub mode: &'a TimezoneMode,
    pub theme: Theme,
    /// Match numbers drawn in the "ours" colour.
    pub highlight: &'a BTreeSet<u16>,
    /// Vertical scroll offset in terminal rows.
    pub scroll_offset: u16,
}

impl Widget for BracketView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(cell_width) = cell_width_for(area.width) else {
            return;
        };
        let left = BracketGrid::compute(cell_width, HALF_DEPTHS);
        let right = BracketGrid::compute_mirrored(cell_width, HALF_DEPTHS);

        let x0 = area.x + (area.width - full_width(cell_width)) / 2;
        let centre_x = x0 + left.total_width + CONNECTOR_WIDTH;
        let right_x = centre_x + cell_width + CONNECTOR_WIDTH;

        let pen = Pen { area, scroll: self.scroll_offset, theme: self.theme };

        self.draw_half(&self.split.left, &left, x0, &pen, buf);
        self.draw_half(&self.split.right, &right, right_x, &pen, buf);

        // Semi-finals into the Final
        let root_row = left.root_row();
        let dim = resolve(ThemeColor::Dim, self.theme);
        for x in (x0 + left.total_width)..centre_x {
            pen.put(buf, x, root_row, '─', dim);
        }
        for x in (centre_x + cell_width)..right_x {
            pen.put(buf, x, root_row, '─', dim);
        }

        let accent = resolve(ThemeColor::Accent, self.theme);
        pen.label(buf, centre_x, root_row.saturating_sub(3), cell_width, "FINAL", accent);
        self.draw_cell(Some(self.split.final_fixture), centre_x, root_row, cell_width, &pen, buf);

        let third_row = root_row + 2 * GAME_HEIGHT + 2;
        pen.label(buf, centre_x, third_row.saturating_sub(2), cell_width, "3RD PLACE", accent);
        self.draw_cell(self.split.third_place, centre_x, third_row, cell_width, &pen, buf);
    }
}

impl BracketView<'_> {
    fn draw_half(&self, node: &FeederNode<'_>, grid: &BracketGrid, origin_x: u16, pen: &Pen, buf: &mut Buffer) {
        let columns = node.columns();

        // Pass 1: match cells
        for cell in &grid.cells {
            let fixture = columns.get(cell.depth).and_then(|c| c.get(cell.index)).copied();
            self.draw_cell(fixture, origin_x + cell.col, cell.center_row, cell.cell_width, pen, buf);
        }

        // Pass 2: connectors. Adjacent pairs in a column feed the same parent.
        for depth in 0..HALF_DEPTHS - 1 {
            let children = grid.cells_for_depth(depth);
            let parents = grid.cells_for_depth(depth + 1);
            let conn_x = if grid.mirrored {
                origin_x + grid.round_cols[depth].saturating_sub(CONNECTOR_WIDTH)
            } else {
                origin_x + grid.round_cols[depth] + grid.cell_width
            };
            for (j, parent) in parents.iter().enumerate() {
                let (Some(top), Some(bot)) = (children.get(2 * j), children.get(2 * j + 1)) else {
                    continue;
                };
                draw_connector(top.center_row, parent.center_row, bot.center_row, conn_x, grid.mirrored, pen, buf);
            }
        }
    }

    fn draw_cell(&self, fixture: Option<&Fixture>, x: u16, center_row: u16, width: u16, pen: &Pen, buf: &mut Buffer) {
        let Some(fixture) = fixture else {
            return;
        };
        let ours = self.highlight.contains(&fixture.match_number);
        let team_style = if ours {
            resolve(ThemeColor::Ours, self.theme)
        } else {
            resolve(ThemeColor::Text, self.theme)
        };
        let info_style = resolve(ThemeColor::Dim, self.theme);

        let venue = self.store.venue(&fixture.venue);
        let kickoff = local_kickoff(fixture.kickoff(), self.mode, venue);
        let info = format!("#{} {}", fixture.match_number, kickoff.format("%-d %b"));

        let width = width as usize;
        pen.text(buf, x, center_row.saturating_sub(1), &fit(&cell_label(self.store, &fixture.home), width), team_style);
        pen.text(buf, x, center_row, &fit(&info, width), info_style);
        pen.text(buf, x, center_row + 1, &fit(&cell_label(self.store, &fixture.away), width), team_style);
    }
}

// ---------------------------------------------------------------------------
// Stacked fallback for narrow terminals
// ---------------------------------------------------------------------------

const STACKED_ROUNDS: [Round; 6] = [
    Round::RoundOf32,
    Round::RoundOf16,
    Round::QuarterFinal,
    Round::SemiFinal,
    Round::ThirdPlace,
    Round::Final,
];

/// Round-by-round list of every knockout match, for terminals too narrow
/// for [`BracketView`].
pub fn stacked_lines(
    store: &FixtureStore,
    mode: &TimezoneMode,
    theme: Theme,
    highlight: &BTreeSet<u16>,
) -> Vec<Line<'static>> {
    let accent = resolve(ThemeColor::Accent, theme);
    let dim = resolve(ThemeColor::Dim, theme);
    let mut lines = Vec::new();

    for round in STACKED_ROUNDS {
        let fixtures = store.fixtures_in_round(round);
        if fixtures.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(round.label().to_uppercase(), accent)));
        for f in fixtures {
            let venue = store.venue(&f.venue);
            let kickoff = local_kickoff(f.kickoff(), mode, venue);
            let style = if highlight.contains(&f.match_number) {
                resolve(ThemeColor::Ours, theme)
            } else {
                resolve(ThemeColor::Text, theme)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>5} ", format!("#{}", f.match_number)), dim),
                Span::styled(
                    format!("{} {} ", kickoff.format("%a %-d %b"), format_match_time(f.kickoff(), mode, venue)),
                    dim,
                ),
                Span::styled(
                    format!("{} v {}", store.team_name(&f.home), store.team_name(&f.away)),
                    style,
                ),
            ]));
        }
        lines.push(Line::default());
    }
    lines
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

/// Team short name for a concrete team, otherwise the slot code ("1A", "W74").
pub fn cell_label(store: &FixtureStore, slot: &SlotRef) -> String {
    match slot.team_id().and_then(|id| store.team(id)) {
        Some(team) => team.short_name.clone(),
        None => slot.to_string(),
    }
}

/// Truncate or pad to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// Scroll- and clip-aware writer for bracket-relative rows.
struct Pen {
    area: Rect,
    scroll: u16,
    theme: Theme,
}

impl Pen {
    /// Bracket-relative row to an absolute screen y, or `None` if off-screen.
    fn screen_y(&self, bracket_row: u16) -> Option<u16> {
        let rel = bracket_row.checked_sub(self.scroll)?;
        (rel < self.area.height).then_some(self.area.y + rel)
    }

    fn put(&self, buf: &mut Buffer, x: u16, row: u16, ch: char, style: Style) {
        if x < self.area.x || x >= self.area.x + self.area.width {
            return;
        }
        if let Some(y) = self.screen_y(row)
            && let Some(cell) = buf.cell_mut((x, y))
        {
            cell.set_char(ch);
            cell.set_style(style);
        }
    }

    fn text(&self, buf: &mut Buffer, x: u16, row: u16, text: &str, style: Style) {
        let limit = self.area.x + self.area.width;
        if x >= limit {
            return;
        }
        if let Some(y) = self.screen_y(row) {
            let visible: String = text.chars().take((limit - x) as usize).collect();
            buf.set_string(x, y, visible, style);
        }
    }

    /// Text centred over a cell.
    fn label(&self, buf: &mut Buffer, x: u16, row: u16, width: u16, text: &str, style: Style) {
        let pad = width.saturating_sub(text.chars().count() as u16) / 2;
        self.text(buf, x + pad, row, text, style);
    }
}

/// Box-drawing connectors between one parent and its two children.
///
/// ```text
///  child_top  ──┐
///               │
///  parent     ──├──
///               │
///  child_bot  ──┘
/// ```
fn draw_connector(r_top: u16, r_mid: u16, r_bot: u16, conn_x: u16, mirrored: bool, pen: &Pen, buf: &mut Buffer) {
    let style = resolve(ThemeColor::Dim, pen.theme);
    let col_a = conn_x;
    let col_b = conn_x + 1;
    let col_c = conn_x + 2;

    if mirrored {
        // Children on the right, parent on the left.
        pen.put(buf, col_b, r_top, '┌', style);
        pen.put(buf, col_c, r_top, '─', style);
        for row in (r_top + 1)..r_mid {
            pen.put(buf, col_b, row, '│', style);
        }
        pen.put(buf, col_a, r_mid, '─', style);
        pen.put(buf, col_b, r_mid, '┤', style);
        for row in (r_mid + 1)..r_bot {
            pen.put(buf, col_b, row, '│', style);
        }
        pen.put(buf, col_b, r_bot, '└', style);
        pen.put(buf, col_c, r_bot, '─', style);
    } else {
        pen.put(buf, col_a, r_top, '─', style);
        pen.put(buf, col_b, r_top, '┐', style);
        for row in (r_top + 1)..r_mid {
            pen.put(buf, col_b, row, '│', style);
        }
        pen.put(buf, col_a, r_mid, '─', style);
        pen.put(buf, col_b, r_mid, '├', style);
        pen.put(buf, col_c, r_mid, '─', style);
        for row in (r_mid + 1)..r_bot {
            pen.put(buf, col_b, row, '│', style);
        }
        pen.put(buf, col_a, r_bot, '─', style);
        pen.put(buf, col_b, r_bot, '┘', style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
