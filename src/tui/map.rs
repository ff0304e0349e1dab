//! US tile-grid choropleth.
//!
//! Each state is one equal-sized tile placed on a 12 x 8 grid that roughly
//! follows geography, filled with the colour the regional view assigned to it.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::app::views::RegionalView;
use crate::math::color::{NO_DATA_COLOR, Rgb};

pub const GRID_COLS: u16 = 12;
pub const GRID_ROWS: u16 = 8;

/// `(state code, row, col)`.
pub const TILES: [(&str, u16, u16); 51] = [
    ("AK", 0, 0),
    ("ME", 0, 11),
    ("VT", 1, 10),
    ("NH", 1, 11),
    ("WA", 2, 1),
    ("ID", 2, 2),
    ("MT", 2, 3),
    ("ND", 2, 4),
    ("MN", 2, 5),
    ("IL", 2, 6),
    ("WI", 2, 7),
    ("MI", 2, 8),
    ("NY", 2, 9),
    ("RI", 2, 10),
    ("MA", 2, 11),
    ("OR", 3, 1),
    ("NV", 3, 2),
    ("WY", 3, 3),
    ("SD", 3, 4),
    ("IA", 3, 5),
    ("IN", 3, 6),
    ("OH", 3, 7),
    ("PA", 3, 8),
    ("NJ", 3, 9),
    ("CT", 3, 10),
    ("CA", 4, 1),
    ("UT", 4, 2),
    ("CO", 4, 3),
    ("NE", 4, 4),
    ("MO", 4, 5),
    ("KY", 4, 6),
    ("WV", 4, 7),
    ("VA", 4, 8),
    ("MD", 4, 9),
    ("DE", 4, 10),
    ("AZ", 5, 2),
    ("NM", 5, 3),
    ("KS", 5, 4),
    ("AR", 5, 5),
    ("TN", 5, 6),
    ("NC", 5, 7),
    ("SC", 5, 8),
    ("DC", 5, 9),
    ("OK", 6, 4),
    ("LA", 6, 5),
    ("MS", 6, 6),
    ("AL", 6, 7),
    ("GA", 6, 8),
    ("HI", 7, 0),
    ("TX", 7, 4),
    ("FL", 7, 9),
];

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub struct StateTileMap<'a> {
    pub view: &'a RegionalView,
    pub selected: Option<&'a str>,
}

impl Widget for StateTileMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tile_w = (area.width / GRID_COLS).min(7);
        let tile_h = (area.height / GRID_ROWS).min(3);
        if area.is_empty() {
            return;
        }
        if tile_w < 3 || tile_h < 1 {
            buf.set_stringn(
                area.x,
                area.y,
                "Map area too small (resize terminal).",
                area.width as usize,
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        for (code, row, col) in TILES {
            let rect = Rect {
                x: area.x + col * tile_w,
                y: area.y + row * tile_h,
                // One column of spacing between tiles.
                width: tile_w - 1,
                height: tile_h,
            };
            let fill = to_color(self.view.color_of(code).unwrap_or(NO_DATA_COLOR));
            let mut style = Style::default().bg(fill).fg(Color::Black);
            if self.selected == Some(code) {
                style = Style::default()
                    .bg(Color::White)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD);
            }
            buf.set_style(rect, style);

            let label_x = rect.x + rect.width.saturating_sub(2) / 2;
            let label_y = rect.y + rect.height / 2;
            buf.set_string(label_x, label_y, code, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::data::catalog::STATES;
    use crate::domain::{RegionalSnapshot, StateRecord};
    use crate::math::color::{ColorScale, choropleth};

    #[test]
    fn every_state_has_one_tile() {
        let codes: HashSet<&str> = TILES.iter().map(|(c, _, _)| *c).collect();
        let cells: HashSet<(u16, u16)> = TILES.iter().map(|(_, r, c)| (*r, *c)).collect();
        assert_eq!(codes.len(), TILES.len());
        assert_eq!(cells.len(), TILES.len());
        for (code, _) in STATES {
            assert!(codes.contains(code), "{code} has no tile");
        }
        assert!(TILES.iter().all(|(_, r, c)| *r < GRID_ROWS && *c < GRID_COLS));
    }

    #[test]
    fn renders_labels_and_colours() {
        let states = vec![
            StateRecord {
                code: "CA".into(),
                name: "California".into(),
                value: Some(5.0),
                date: None,
                overview: None,
            },
            StateRecord {
                code: "TX".into(),
                name: "Texas".into(),
                value: Some(3.0),
                date: None,
                overview: None,
            },
        ];
        let colors = choropleth(&states, ColorScale::for_high_is_bad(true));
        let view = RegionalView {
            snapshot: RegionalSnapshot {
                indicator: "UNRATE".into(),
                name: "Unemployment Rate".into(),
                units: "percent".into(),
                states,
            },
            colors,
        };

        let area = Rect::new(0, 0, 60, 16);
        let mut buf = Buffer::empty(area);
        StateTileMap {
            view: &view,
            selected: Some("TX"),
        }
        .render(area, &mut buf);

        // 60 / 12 = 5 columns and 16 / 8 = 2 rows per tile; CA sits at (4, 1).
        let ca = &buf[(5 + 1, 8 + 1)];
        assert_eq!(ca.symbol(), "C");
        assert_eq!(ca.bg, to_color(view.color_of("CA").unwrap()));

        let tx = &buf[(20 + 1, 14 + 1)];
        assert_eq!(tx.symbol(), "T");
        assert_eq!(tx.bg, Color::White);

        let me = &buf[(55, 0)];
        assert_eq!(me.bg, to_color(NO_DATA_COLOR));
    }

    #[test]
    fn degenerate_areas_render_without_panicking() {
        let view = RegionalView {
            snapshot: RegionalSnapshot {
                indicator: "UNRATE".into(),
                name: "Unemployment Rate".into(),
                units: "percent".into(),
                states: Vec::new(),
            },
            colors: Vec::new(),
        };
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 4));
        let map = || StateTileMap {
            view: &view,
            selected: None,
        };

        map().render(Rect::new(0, 4, 20, 0), &mut buf);

        map().render(Rect::new(0, 0, 4, 4), &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "M");
        assert_eq!(buf[(4, 0)].symbol(), " ");
    }
}
