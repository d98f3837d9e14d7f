use super::metrics::{text_width, wrap_text};
use super::scene::{Align, Block, BlockKind, Corners, Document, Node, Page, Rect, Rule, Stroke, Text};
use super::style::Style;
use crate::format::{format_amount, format_date, format_decimal, format_reading};
use crate::invoice::InvoiceData;

const TABLE_HEADINGS: [&str; 6] = [
    "Description",
    "Ancien Index",
    "Nouvel Index",
    "kWh",
    "Tarif/kWh",
    "Montant",
];

/// Top-to-bottom block flow over as many pages as needed
struct Flow<'a> {
    style: &'a Style,
    pages: Vec<Page>,
    cursor: f64,
}

impl<'a> Flow<'a> {
    fn new(style: &'a Style) -> Self {
        Self {
            style,
            pages: vec![Page::default()],
            cursor: style.margin,
        }
    }

    /// Start a new page unless `height` still fits below the cursor
    fn ensure_room(&mut self, height: f64) {
        let page_used = self.pages.last().is_some_and(|p| !p.blocks.is_empty());
        if page_used && self.cursor + height > self.style.content_bottom() {
            tracing::debug!(
                cursor = self.cursor,
                needed = height,
                page = self.pages.len() + 1,
                "page break"
            );
            self.pages.push(Page::default());
            self.cursor = self.style.margin;
        }
    }

    fn push(&mut self, block: Block, gap: f64) {
        self.cursor = block.bottom() + gap;
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(block);
        }
    }

    fn finish(self) -> Document {
        Document {
            page_width: self.style.page_width,
            page_height: self.style.page_height,
            pages: self.pages,
        }
    }
}

fn money(amount: f64, label: &str) -> String {
    format!("{} {}", format_amount(amount), label)
}

/// y of a single line vertically centred in `[top, top + height]`
fn centered(style: &Style, top: f64, height: f64, size: f64) -> f64 {
    top + (height - style.line(size)) / 2.0
}

/// Lay out the invoice design for `data`.
///
/// The summary and footer move to a fresh page when they would cross the
/// bottom margin; no block is ever split across pages.
pub fn layout_invoice(data: &InvoiceData, style: &Style) -> Document {
    let mut flow = Flow::new(style);

    let block = header(data, style, flow.cursor);
    flow.push(block, style.header_gap);

    let block = metadata(data, style, flow.cursor);
    flow.push(block, style.meta_gap);

    let block = recipient(data, style, flow.cursor);
    flow.push(block, style.recipient_gap);

    let block = table(data, style, flow.cursor);
    flow.push(block, style.table_gap);

    let footer_lines = footer_note_lines(data, style);
    let footer_height = footer_height(data, style, footer_lines.len());

    flow.ensure_room(style.summary.height + style.summary_gap + footer_height);
    let block = summary(data, style, flow.cursor);
    flow.push(block, style.summary_gap);

    flow.ensure_room(footer_height);
    let block = footer(data, style, flow.cursor, footer_height, &footer_lines);
    flow.push(block, 0.0);

    flow.finish()
}

fn header(data: &InvoiceData, style: &Style, top: f64) -> Block {
    let h = &style.header;
    let c = &style.colors;
    let x = style.margin;
    let width = style.content_width();

    let badge_label = data.status.badge();
    let badge_width =
        text_width(badge_label, h.badge_text_size, true) + 2.0 * h.badge_padding;
    let badge_x = x + width - h.padding - badge_width;
    let badge_y = top + (h.height - h.badge_height) / 2.0;
    let text_width_left = badge_x - (x + h.padding) - h.padding;

    let title_y = top + h.padding / 2.0 + 2.0;
    let tagline_y = title_y + style.line(h.title_size);

    let nodes: Vec<Node> = vec![
        Rect::new(x, top, width, h.height)
            .corners(Corners::all(h.radius))
            .fill(c.primary)
            .into(),
        Rect::new(x, top + h.height - h.band_height, width, h.band_height)
            .corners(Corners {
                top: 0.0,
                bottom: h.radius,
            })
            .fill(c.primary_dark)
            .into(),
        Text::new(&data.company.name, x + h.padding, title_y, text_width_left)
            .size(h.title_size)
            .bold()
            .color(c.white)
            .into(),
        Text::new(&data.company.tagline, x + h.padding, tagline_y, text_width_left)
            .size(h.tagline_size)
            .color(c.white70)
            .into(),
        Rect::new(badge_x, badge_y, badge_width, h.badge_height)
            .corners(Corners::all(h.badge_radius))
            .fill(c.white)
            .into(),
        Text::new(
            badge_label,
            badge_x,
            centered(style, badge_y, h.badge_height, h.badge_text_size),
            badge_width,
        )
        .size(h.badge_text_size)
        .bold()
        .color(c.primary)
        .align(Align::Center)
        .into(),
    ];

    Block {
        kind: BlockKind::Header,
        top,
        height: h.height,
        nodes,
    }
}

fn metadata(data: &InvoiceData, style: &Style, top: f64) -> Block {
    let m = &style.meta;
    let c = &style.colors;
    let x = style.margin;
    let width = style.content_width();
    let inner_x = x + m.padding;
    let inner_width = width - 2.0 * m.padding;

    let label_y = top + m.padding / 2.0 + 2.0;
    let value_y = label_y + style.line(m.label_size) + 2.0;
    let issued = data
        .issued_on
        .as_ref()
        .map(format_date)
        .unwrap_or_else(|| "N/A".to_string());

    let nodes: Vec<Node> = vec![
        Rect::new(x, top, width, m.height)
            .corners(Corners::all(m.radius))
            .fill(c.light_gray)
            .stroke(m.border_width, c.primary)
            .into(),
        Text::new("Numéro de facture", inner_x, label_y, inner_width)
            .size(m.label_size)
            .color(c.dark_gray)
            .into(),
        Text::new(&data.number, inner_x, value_y, inner_width)
            .size(m.value_size)
            .bold()
            .color(c.secondary)
            .into(),
        Text::new("Date d'émission", inner_x, label_y, inner_width)
            .size(m.label_size)
            .color(c.dark_gray)
            .align(Align::Right)
            .into(),
        Text::new(issued, inner_x, value_y, inner_width)
            .size(m.value_size)
            .bold()
            .color(c.secondary)
            .align(Align::Right)
            .into(),
    ];

    Block {
        kind: BlockKind::Metadata,
        top,
        height: m.height,
        nodes,
    }
}

fn recipient(data: &InvoiceData, style: &Style, top: f64) -> Block {
    let r = &style.recipient;
    let c = &style.colors;
    let x = style.margin;
    let width = style.content_width();
    let inner_x = x + r.padding;
    let column = (width - 2.0 * r.padding) / 2.0;

    let box_top = top + style.line(style.recipient_title_size) + style.recipient_title_gap;
    let first_y = box_top + r.padding / 2.0 + 4.0;
    let second_y = first_y + style.line(r.value_size) + 4.0;

    let nodes: Vec<Node> = vec![
        Text::new("Facturé à", x, top, width)
            .size(style.recipient_title_size)
            .bold()
            .color(c.secondary)
            .into(),
        Rect::new(x, box_top, width, r.height)
            .corners(Corners::all(r.radius))
            .fill(c.white)
            .stroke(r.border_width, c.border_gray)
            .into(),
        Text::new(&data.resident_name, inner_x, first_y, column)
            .size(r.value_size)
            .bold()
            .color(c.secondary)
            .into(),
        Text::new(&data.house_name, inner_x, second_y, column)
            .size(r.label_size)
            .color(c.dark_gray)
            .into(),
        Text::new(&data.phone, inner_x + column, first_y, column)
            .size(r.label_size)
            .color(c.dark_gray)
            .align(Align::Right)
            .into(),
        Text::new(&data.email, inner_x + column, second_y, column)
            .size(r.label_size)
            .color(c.dark_gray)
            .align(Align::Right)
            .into(),
    ];

    Block {
        kind: BlockKind::Recipient,
        top,
        height: box_top - top + r.height,
        nodes,
    }
}

/// Column `(x, width)` pairs across the table's inner width
fn columns(style: &Style) -> Vec<(f64, f64)> {
    let t = &style.table;
    let inner = style.content_width() - 2.0 * t.padding;
    let total: f64 = t.columns.iter().sum();
    let mut x = style.margin + t.padding;
    t.columns
        .iter()
        .map(|flex| {
            let width = inner * flex / total;
            let col = (x, width);
            x += width;
            col
        })
        .collect()
}

fn table(data: &InvoiceData, style: &Style, top: f64) -> Block {
    let t = &style.table;
    let c = &style.colors;
    let x = style.margin;
    let width = style.content_width();
    let cols = columns(style);

    let (desc_x, desc_width) = cols[0];
    let description = wrap_text(
        &data.description,
        desc_width - t.description_gutter,
        t.text_size,
        false,
    );
    let line = style.line(t.text_size);
    let row_height = t
        .min_row_height
        .max(2.0 * (t.padding - 4.0) + description.len() as f64 * line);
    let height = t.header_height + row_height;

    let mut nodes: Vec<Node> = vec![
        Rect::new(x, top, width, height)
            .corners(Corners::all(t.radius))
            .fill(c.white)
            .stroke(t.border_width, c.border_gray)
            .into(),
        Rect::new(x, top, width, t.header_height)
            .corners(Corners {
                top: t.radius,
                bottom: 0.0,
            })
            .fill(c.primary)
            .into(),
    ];

    let heading_y = centered(style, top, t.header_height, t.text_size);
    for (idx, (heading, (col_x, col_width))) in TABLE_HEADINGS.iter().zip(&cols).enumerate() {
        let align = if idx == 0 { Align::Left } else { Align::Center };
        nodes.push(
            Text::new(*heading, *col_x, heading_y, *col_width)
                .size(t.text_size)
                .bold()
                .color(c.white)
                .align(align)
                .into(),
        );
    }

    let row_top = top + t.header_height;
    let desc_top = centered(style, row_top, row_height, t.text_size)
        - (description.len() as f64 - 1.0) * line / 2.0;
    for (i, text) in description.iter().enumerate() {
        nodes.push(
            Text::new(text, desc_x, desc_top + i as f64 * line, desc_width)
                .size(t.text_size)
                .color(c.secondary)
                .into(),
        );
    }

    let label = &data.currency_label;
    let cells = [
        (format_reading(data.previous_index), false),
        (format_reading(data.current_index), false),
        (format_decimal(data.kwh, 2), false),
        (format!("{} {}", format_decimal(data.price_per_kwh, 4), label), false),
        (money(data.line_amount, label), true),
    ];
    let cell_y = centered(style, row_top, row_height, t.text_size);
    for ((content, bold), (col_x, col_width)) in cells.into_iter().zip(&cols[1..]) {
        let mut text = Text::new(content, *col_x, cell_y, *col_width)
            .size(t.text_size)
            .color(c.secondary)
            .align(Align::Center);
        if bold {
            text = text.bold();
        }
        nodes.push(text.into());
    }

    Block {
        kind: BlockKind::Table,
        top,
        height,
        nodes,
    }
}

fn summary(data: &InvoiceData, style: &Style, top: f64) -> Block {
    let s = &style.summary;
    let c = &style.colors;
    let x = style.margin;
    let width = style.content_width();
    let inner_x = x + s.padding;
    let inner_width = width - 2.0 * s.padding;
    let label = &data.currency_label;

    let first_y = top + s.padding;
    let second_y = first_y + style.line(s.text_size) + s.row_gap;
    let divider_y = second_y + style.line(s.text_size) + s.row_gap;
    let pill_y = divider_y + s.row_gap;

    let total = money(data.total, label);
    let pill_width = text_width(&total, s.total_size, true) + 2.0 * s.pill_padding;
    let pill_x = inner_x + inner_width - pill_width;

    let mut nodes: Vec<Node> = vec![
        Rect::new(x, top, width, s.height)
            .corners(Corners::all(s.radius))
            .fill(c.light_gray)
            .stroke(s.border_width, c.primary)
            .into(),
    ];

    let rows = [
        (format!("{}:", data.line_label), money(data.consumption_amount, label), first_y),
        ("Frais fixes:".to_string(), money(data.fixed_fee, label), second_y),
    ];
    for (caption, amount, y) in rows {
        nodes.push(
            Text::new(caption, inner_x, y, inner_width)
                .size(s.text_size)
                .color(c.secondary)
                .into(),
        );
        nodes.push(
            Text::new(amount, inner_x, y, inner_width)
                .size(s.text_size)
                .color(c.secondary)
                .align(Align::Right)
                .into(),
        );
    }

    nodes.push(
        Rule {
            x: inner_x,
            y: divider_y,
            length: inner_width,
            stroke: Stroke {
                width: s.divider_width,
                color: c.primary,
            },
        }
        .into(),
    );
    nodes.push(
        Text::new(
            "TOTAL TTC:",
            inner_x,
            centered(style, pill_y, s.pill_height, s.total_size),
            inner_width,
        )
        .size(s.total_size)
        .bold()
        .color(c.primary)
        .into(),
    );
    nodes.push(
        Rect::new(pill_x, pill_y, pill_width, s.pill_height)
            .corners(Corners::all(s.pill_radius))
            .fill(c.primary)
            .into(),
    );
    nodes.push(
        Text::new(
            total,
            pill_x,
            centered(style, pill_y, s.pill_height, s.total_size),
            pill_width,
        )
        .size(s.total_size)
        .bold()
        .color(c.white)
        .align(Align::Center)
        .into(),
    );

    Block {
        kind: BlockKind::Summary,
        top,
        height: s.height,
        nodes,
    }
}

fn footer_note_lines(data: &InvoiceData, style: &Style) -> Vec<String> {
    let f = &style.footer;
    wrap_text(
        &data.company.contact_note,
        style.content_width() - 2.0 * (f.padding + 8.0),
        f.note_size,
        false,
    )
}

fn footer_height(data: &InvoiceData, style: &Style, note_lines: usize) -> f64 {
    let f = &style.footer;
    let copyright = if data.company.copyright.is_some() {
        f.line_gap + style.line(f.copyright_size)
    } else {
        0.0
    };
    let content = style.line(f.thanks_size)
        + f.line_gap
        + note_lines as f64 * style.line(f.note_size)
        + copyright;
    f.min_height.max(content + 2.0 * f.padding)
}

fn footer(
    data: &InvoiceData,
    style: &Style,
    top: f64,
    height: f64,
    note_lines: &[String],
) -> Block {
    let f = &style.footer;
    let c = &style.colors;
    let x = style.margin;
    let width = style.content_width();

    let mut nodes: Vec<Node> = vec![
        Rect::new(x, top, width, height)
            .corners(Corners::all(f.radius))
            .fill(c.secondary)
            .into(),
        Text::new(&data.company.thanks, x, top + f.padding, width)
            .size(f.thanks_size)
            .bold()
            .color(c.white)
            .align(Align::Center)
            .into(),
    ];

    let mut y = top + f.padding + style.line(f.thanks_size) + f.line_gap;
    for line in note_lines {
        nodes.push(
            Text::new(line, x, y, width)
                .size(f.note_size)
                .color(c.white70)
                .align(Align::Center)
                .into(),
        );
        y += style.line(f.note_size);
    }

    if let Some(copyright) = &data.company.copyright {
        nodes.push(
            Text::new(copyright, x, y + f.line_gap, width)
                .size(f.copyright_size)
                .color(c.white60)
                .align(Align::Center)
                .into(),
        );
    }

    Block {
        kind: BlockKind::Footer,
        top,
        height,
        nodes,
    }
}
