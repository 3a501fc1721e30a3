//! Plain-text preview of a layout result.
//!
//! One fixed-width slot per grid cell. The anchor cell of a tile shows its
//! label; the rest of its footprint is filled so spans are visible.

use std::io::Write;

use crate::error::Result;
use crate::layout::LayoutResult;
use crate::tile::TileId;
use crate::width::fit_to_width;

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub cell_width: usize,
    pub empty: char,
    pub fill: char,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            cell_width: 3,
            empty: '.',
            fill: '+',
        }
    }
}

pub fn render_text<W, F>(
    result: &LayoutResult,
    settings: &PreviewSettings,
    label: F,
    writer: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
    F: Fn(TileId) -> String,
{
    let columns = result.params.columns.max(1);
    let rows = result.rows_used;
    let width = settings.cell_width.max(1);

    let mut slots: Vec<Option<String>> = vec![None; rows * columns];
    for (id, rect) in result.placed() {
        let fill: String = std::iter::repeat_n(settings.fill, width).collect();
        for cell in rect.cells() {
            if cell.col >= columns {
                continue;
            }
            let text = if cell == rect.origin {
                fit_to_width(&label(id), width)
            } else {
                fill.clone()
            };
            slots[cell.row * columns + cell.col] = Some(text);
        }
    }

    let empty: String = std::iter::repeat_n(settings.empty, width).collect();
    for row in slots.chunks(columns) {
        let line = row
            .iter()
            .map(|slot| slot.as_deref().unwrap_or(&empty))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line.trim_end())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Span;
    use crate::layout::{LayoutParams, PlacementEngine};
    use crate::tile::TileSpec;

    #[test]
    fn preview_marks_anchors_spans_and_gaps() {
        let tiles = [
            TileSpec::new(TileId(0), Span::new(2, 1)).pinned(0, 1),
            TileSpec::new(TileId(1), Span::new(2, 2)),
        ];
        let result = PlacementEngine::new(LayoutParams::new(4)).run(&tiles);

        let mut out = Vec::new();
        let settings = PreviewSettings {
            cell_width: 2,
            ..PreviewSettings::default()
        };
        render_text(&result, &settings, |id| format!("t{}", id.0), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ".. t0 ++ ..\nt1 ++ .. ..\n++ ++ .. ..\n");
    }
}
