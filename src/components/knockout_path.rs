use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget};
use wc26_core::timezone::{TimezoneMode, format_full_date};
use wc26_core::{FixtureStore, PathStep};

use crate::components::theme::{Theme, ThemeColor, resolve};

/// Most likely opponents listed under each step.
const MAX_CANDIDATES: usize = 3;

/// Vertical timeline of a team's route through the knockout rounds.
pub struct KnockoutPathView<'a> {
    pub steps: &'a [PathStep],
    pub store: &'a FixtureStore,
    pub mode: &'a TimezoneMode,
    pub theme: Theme,
    pub scroll_offset: u16,
}

impl Widget for KnockoutPathView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = path_lines(self.steps, self.store, self.mode, self.theme);
        Paragraph::new(lines)
            .scroll((self.scroll_offset, 0))
            .render(area, buf);
    }
}

pub fn path_lines(
    steps: &[PathStep],
    store: &FixtureStore,
    mode: &TimezoneMode,
    theme: Theme,
) -> Vec<Line<'static>> {
    let rail = resolve(ThemeColor::Dim, theme);
    let round_style = resolve(ThemeColor::Accent, theme);
    let text = resolve(ThemeColor::Text, theme);
    let opponent_style = resolve(ThemeColor::Secondary, theme);

    let mut lines = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let last = i + 1 == steps.len();
        let bullet = if last { "◆ " } else { "● " };
        let bar = if last { "  " } else { "│ " };

        lines.push(Line::from(vec![
            Span::styled(bullet, round_style),
            Span::styled(step.round.label().to_string(), round_style),
            Span::styled(format!("  Match {}", step.match_number), rail),
        ]));

        let venue = store.venue(&step.venue_id);
        let place = match &step.venue_city {
            Some(city) => format!("{}, {city}", step.venue_name),
            None => step.venue_name.clone(),
        };
        lines.push(Line::from(vec![
            Span::styled(bar, rail),
            Span::styled(format!("{} · {place}", format_full_date(step.kickoff(), mode, venue)), text),
        ]));

        let opponent = step
            .opponent
            .as_ref()
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "TBD".to_string());
        lines.push(Line::from(vec![
            Span::styled(bar, rail),
            Span::styled(format!("vs {opponent}"), opponent_style),
        ]));

        if let Some(candidates) = step.opponent.as_ref().map(|o| &o.candidates)
            && !candidates.is_empty()
        {
            let names: Vec<&str> = candidates
                .iter()
                .take(MAX_CANDIDATES)
                .map(|t| t.name.as_str())
                .collect();
            lines.push(Line::from(vec![
                Span::styled(bar, rail),
                Span::styled(format!("   likely: {}", names.join(", ")), rail),
            ]));
        }

        if !last {
            lines.push(Line::from(Span::styled("│", rail)));
        }
    }
    lines
}
