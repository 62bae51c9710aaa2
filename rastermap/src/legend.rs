//! Map legend: a box of color swatches with their labels, anchored at a corner of the image.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::render::{Canvas, PixelPoint, PixelRect, TextStyle};

const MARGIN: i32 = 10;
const PADDING: i32 = 8;
const SWATCH_SIZE: u32 = 12;
const ROW_GAP: i32 = 4;

/// Corner of the image the legend is anchored at.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    #[default]
    BottomRight,
}

/// Row of the legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    /// Swatch color.
    pub color: Color,
    /// Text next to the swatch.
    pub label: String,
}

impl LegendItem {
    /// Creates a new item.
    pub fn new(color: Color, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
        }
    }
}

/// Legend drawn on top of everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    position: LegendPosition,
    items: Vec<LegendItem>,
    text_style: TextStyle,
    background: Color,
    border: Color,
}

impl Legend {
    /// Creates an empty legend.
    pub fn new(position: LegendPosition) -> Self {
        Self {
            position,
            items: vec![],
            text_style: TextStyle::default(),
            background: Color::rgba(255, 255, 255, 220),
            border: Color::GRAY,
        }
    }

    /// Appends an item.
    pub fn add(&mut self, color: Color, label: impl Into<String>) -> &mut Self {
        self.items.push(LegendItem::new(color, label));
        self
    }

    /// Sets the style of the labels.
    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    /// Corner of the legend.
    pub fn position(&self) -> LegendPosition {
        self.position
    }

    /// Items in drawing order, top to bottom.
    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }

    /// Box the legend occupies on a canvas of the given size.
    pub fn bounds(&self, canvas: &dyn Canvas) -> PixelRect {
        let (canvas_width, canvas_height) = canvas.size();
        let row_height = self.row_height(canvas);
        let text_width = self
            .items
            .iter()
            .map(|item| canvas.measure_text(&item.label, &self.text_style).0)
            .max()
            .unwrap_or(0);

        let width = 2 * PADDING as u32 + SWATCH_SIZE + PADDING as u32 + text_width;
        let rows = self.items.len() as u32;
        let height =
            2 * PADDING as u32 + rows * row_height + rows.saturating_sub(1) * ROW_GAP as u32;

        let x = match self.position {
            LegendPosition::TopLeft | LegendPosition::BottomLeft => MARGIN,
            LegendPosition::TopRight | LegendPosition::BottomRight => {
                canvas_width as i32 - MARGIN - width as i32
            }
        };
        let y = match self.position {
            LegendPosition::TopLeft | LegendPosition::TopRight => MARGIN,
            LegendPosition::BottomLeft | LegendPosition::BottomRight => {
                canvas_height as i32 - MARGIN - height as i32
            }
        };

        PixelRect::new(x, y, width, height)
    }

    fn row_height(&self, canvas: &dyn Canvas) -> u32 {
        let (_, text_height) = canvas.measure_text("Hg", &self.text_style);
        text_height.max(SWATCH_SIZE)
    }

    /// Draws the legend. An empty legend draws nothing.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        if self.items.is_empty() {
            return;
        }

        let bounds = self.bounds(canvas);
        let row_height = self.row_height(canvas) as i32;

        canvas.fill_rect(bounds, self.background);
        canvas.stroke_rect(bounds, self.border, 1.0);

        let mut top = bounds.y + PADDING;
        for item in &self.items {
            let swatch = PixelRect::new(
                bounds.x + PADDING,
                top + (row_height - SWATCH_SIZE as i32) / 2,
                SWATCH_SIZE,
                SWATCH_SIZE,
            );
            canvas.fill_rect(swatch, item.color);
            canvas.stroke_rect(swatch, self.border, 1.0);

            let (_, text_height) = canvas.measure_text(&item.label, &self.text_style);
            let text_position = PixelPoint::new(
                swatch.right() + PADDING,
                top + (row_height - text_height as i32) / 2,
            );
            canvas.draw_text(&item.label, text_position, &self.text_style);

            top += row_height + ROW_GAP;
        }
    }
}
