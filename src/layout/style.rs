use serde::Serialize;
use std::fmt;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Palette {
    pub primary: Color,
    pub primary_dark: Color,
    pub secondary: Color,
    pub light_gray: Color,
    pub dark_gray: Color,
    pub border_gray: Color,
    pub white: Color,
    pub white70: Color,
    pub white60: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderStyle {
    pub height: f64,
    pub radius: f64,
    /// Darker strip along the bottom edge
    pub band_height: f64,
    pub padding: f64,
    pub title_size: f64,
    pub tagline_size: f64,
    pub badge_height: f64,
    pub badge_radius: f64,
    pub badge_padding: f64,
    pub badge_text_size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxStyle {
    pub height: f64,
    pub radius: f64,
    pub padding: f64,
    pub border_width: f64,
    pub label_size: f64,
    pub value_size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStyle {
    pub header_height: f64,
    pub min_row_height: f64,
    pub radius: f64,
    pub padding: f64,
    pub border_width: f64,
    pub text_size: f64,
    /// Relative widths of description, previous index, current index, kWh, price, amount
    pub columns: [f64; 6],
    /// Kept free on the right of the description cell when wrapping
    pub description_gutter: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStyle {
    pub height: f64,
    pub radius: f64,
    pub padding: f64,
    pub border_width: f64,
    pub text_size: f64,
    pub row_gap: f64,
    pub divider_width: f64,
    pub total_size: f64,
    pub pill_height: f64,
    pub pill_radius: f64,
    pub pill_padding: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterStyle {
    pub min_height: f64,
    pub radius: f64,
    pub padding: f64,
    pub thanks_size: f64,
    pub note_size: f64,
    pub copyright_size: f64,
    pub line_gap: f64,
}

/// Every measurement of the invoice design, in PDF points.
///
/// `Style::default()` is the production design on A4.
#[derive(Debug, Clone, Serialize)]
pub struct Style {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Line box height as a multiple of the font size
    pub line_height: f64,
    pub colors: Palette,
    pub header: HeaderStyle,
    pub header_gap: f64,
    pub meta: BoxStyle,
    pub meta_gap: f64,
    pub recipient_title_size: f64,
    pub recipient_title_gap: f64,
    pub recipient: BoxStyle,
    pub recipient_gap: f64,
    pub table: TableStyle,
    pub table_gap: f64,
    pub summary: SummaryStyle,
    pub summary_gap: f64,
    pub footer: FooterStyle,
}

impl Style {
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest y a block may reach on any page
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.margin
    }

    pub fn line(&self, size: f64) -> f64 {
        size * self.line_height
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 32.0,
            line_height: 1.2,
            colors: Palette {
                primary: Color(255, 168, 0),
                primary_dark: Color(230, 149, 0),
                secondary: Color(38, 38, 38),
                light_gray: Color(245, 245, 245),
                dark_gray: Color(102, 102, 102),
                border_gray: Color(224, 224, 224),
                white: Color(255, 255, 255),
                white70: Color(179, 179, 179),
                white60: Color(153, 153, 153),
            },
            header: HeaderStyle {
                height: 80.0,
                radius: 12.0,
                band_height: 25.0,
                padding: 24.0,
                title_size: 28.0,
                tagline_size: 14.0,
                badge_height: 30.0,
                badge_radius: 15.0,
                badge_padding: 16.0,
                badge_text_size: 12.0,
            },
            header_gap: 32.0,
            meta: BoxStyle {
                height: 60.0,
                radius: 8.0,
                padding: 20.0,
                border_width: 1.0,
                label_size: 12.0,
                value_size: 16.0,
            },
            meta_gap: 24.0,
            recipient_title_size: 14.0,
            recipient_title_gap: 12.0,
            recipient: BoxStyle {
                height: 70.0,
                radius: 8.0,
                padding: 20.0,
                border_width: 0.5,
                label_size: 12.0,
                value_size: 16.0,
            },
            recipient_gap: 32.0,
            table: TableStyle {
                header_height: 40.0,
                min_row_height: 40.0,
                radius: 8.0,
                padding: 20.0,
                border_width: 0.5,
                text_size: 12.0,
                columns: [2.0, 1.0, 1.0, 1.0, 1.0, 1.0],
                description_gutter: 10.0,
            },
            table_gap: 32.0,
            summary: SummaryStyle {
                height: 120.0,
                radius: 8.0,
                padding: 20.0,
                border_width: 2.0,
                text_size: 14.0,
                row_gap: 8.0,
                divider_width: 1.0,
                total_size: 18.0,
                pill_height: 34.0,
                pill_radius: 6.0,
                pill_padding: 16.0,
            },
            summary_gap: 40.0,
            footer: FooterStyle {
                min_height: 80.0,
                radius: 8.0,
                padding: 12.0,
                thanks_size: 16.0,
                note_size: 12.0,
                copyright_size: 10.0,
                line_gap: 4.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_render_as_hex() {
        assert_eq!(Style::default().colors.primary.to_string(), "#FFA800");
        assert_eq!(Color(38, 38, 38).to_string(), "#262626");
    }

    #[test]
    fn a4_content_area() {
        let style = Style::default();
        assert!((style.content_width() - 531.28).abs() < 1e-9);
        assert!((style.content_bottom() - 809.89).abs() < 1e-9);
    }
}
