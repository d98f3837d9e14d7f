use serde::Serialize;

use super::style::Color;

/// A laid-out invoice: pages of positioned blocks. Coordinates are absolute
/// page positions in points, origin at the top-left corner.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

impl Document {
    /// Page index and block of the first block of the given kind
    pub fn find_block(&self, kind: BlockKind) -> Option<(usize, &Block)> {
        self.pages.iter().enumerate().find_map(|(idx, page)| {
            page.blocks
                .iter()
                .find(|block| block.kind == kind)
                .map(|block| (idx, block))
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.pages
            .iter()
            .flat_map(|page| &page.blocks)
            .flat_map(|block| &block.nodes)
            .filter_map(|node| match node {
                Node::Text(text) => Some(text),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    Metadata,
    Recipient,
    Table,
    Summary,
    Footer,
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub top: f64,
    pub height: f64,
    pub nodes: Vec<Node>,
}

impl Block {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Rect(Rect),
    Rule(Rule),
    Text(Text),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Corners {
    pub top: f64,
    pub bottom: f64,
}

impl Corners {
    pub fn all(radius: f64) -> Self {
        Self {
            top: radius,
            bottom: radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corners: Corners,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

/// Horizontal rule
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One line of text, aligned inside the box `[x, x + width]` with its line box top at `y`
#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub align: Align,
    pub size: f64,
    pub bold: bool,
    pub color: Color,
    pub content: String,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            corners: Corners::default(),
            fill: None,
            stroke: None,
        }
    }

    pub fn corners(mut self, corners: Corners) -> Self {
        self.corners = corners;
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn stroke(mut self, width: f64, color: Color) -> Self {
        self.stroke = Some(Stroke { width, color });
        self
    }
}

impl Text {
    /// Left-aligned, regular weight, inside `[x, x + width]`
    pub fn new(content: impl Into<String>, x: f64, y: f64, width: f64) -> Self {
        Self {
            x,
            y,
            width,
            align: Align::Left,
            size: 12.0,
            bold: false,
            color: Color(0, 0, 0),
            content: content.into(),
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

impl From<Rect> for Node {
    fn from(rect: Rect) -> Self {
        Node::Rect(rect)
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}
