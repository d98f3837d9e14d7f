use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{FactureError, Result};
use crate::layout::{Align, Color, Corners, Document, Node, Rect, Rule, Stroke, Text};

/// Line box height relative to font size; matches the layout engine's line height
const LINE_HEIGHT: f64 = 1.2;

const PREAMBLE: &str = r#"#set text(
  font: ("Helvetica", "Liberation Sans", "Arial"),
  top-edge: "ascender",
  bottom-edge: "descender",
)
#set par(leading: 0pt)
"#;

fn pt(value: f64) -> String {
    format!("{:.2}pt", value)
}

fn rgb(color: Color) -> String {
    format!("rgb(\"{}\")", color)
}

fn stroke(stroke: &Stroke) -> String {
    format!("{} + {}", pt(stroke.width), rgb(stroke.color))
}

fn radius(corners: Corners) -> String {
    format!(
        "(top-left: {top}, top-right: {top}, bottom-left: {bottom}, bottom-right: {bottom})",
        top = pt(corners.top),
        bottom = pt(corners.bottom)
    )
}

/// Quote `content` as a Typst string literal
fn quote(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2);
    out.push('"');
    for ch in content.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn place(out: &mut String, x: f64, y: f64, body: &str) {
    let _ = writeln!(
        out,
        "#place(top + left, dx: {}, dy: {}, {})",
        pt(x),
        pt(y),
        body
    );
}

fn render_rect(out: &mut String, rect: &Rect) {
    let fill = rect.fill.map(rgb).unwrap_or_else(|| "none".to_string());
    let border = rect
        .stroke
        .as_ref()
        .map(stroke)
        .unwrap_or_else(|| "none".to_string());
    let body = format!(
        "rect(width: {}, height: {}, radius: {}, fill: {}, stroke: {})",
        pt(rect.width),
        pt(rect.height),
        radius(rect.corners),
        fill,
        border
    );
    place(out, rect.x, rect.y, &body);
}

fn render_rule(out: &mut String, rule: &Rule) {
    let body = format!(
        "line(length: {}, stroke: {})",
        pt(rule.length),
        stroke(&rule.stroke)
    );
    place(out, rule.x, rule.y, &body);
}

fn render_text(out: &mut String, text: &Text) {
    let align = match text.align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    };
    let weight = if text.bold { "bold" } else { "regular" };
    let body = format!(
        "box(width: {}, height: {}, align({} + horizon, text(size: {}, weight: \"{}\", fill: {}, {})))",
        pt(text.width),
        pt(text.size * LINE_HEIGHT),
        align,
        pt(text.size),
        weight,
        rgb(text.color),
        quote(&text.content)
    );
    place(out, text.x, text.y, &body);
}

/// Typst source drawing every node of `doc` at its absolute position, one page per scene page
pub fn render_typst(doc: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#set page(width: {}, height: {}, margin: 0pt)",
        pt(doc.page_width),
        pt(doc.page_height)
    );
    out.push_str(PREAMBLE);

    for (idx, page) in doc.pages.iter().enumerate() {
        if idx > 0 {
            out.push_str("#pagebreak()\n");
        }
        for block in &page.blocks {
            let _ = writeln!(out, "\n// {:?}", block.kind);
            for node in &block.nodes {
                match node {
                    Node::Rect(rect) => render_rect(&mut out, rect),
                    Node::Rule(rule) => render_rule(&mut out, rule),
                    Node::Text(text) => render_text(&mut out, text),
                }
            }
        }
    }
    out
}

/// `<prefix>_<number>.<ext>`, with path separators in the number replaced
pub fn invoice_file_name(prefix: &str, number: &str, ext: &str) -> String {
    let number: String = number
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("{}_{}.{}", prefix, number, ext)
}

/// Write the Typst source for `doc` without compiling it
pub fn write_typst(doc: &Document, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, render_typst(doc))?;
    Ok(())
}

/// Generate PDF using Typst CLI
pub fn generate_pdf(doc: &Document, output_path: &Path) -> Result<()> {
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(FactureError::TypstNotFound);
    }

    let temp_dir: PathBuf =
        std::env::temp_dir().join(format!("facture-{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir)?;

    let source_path = temp_dir.join("invoice.typ");
    std::fs::write(&source_path, render_typst(doc))?;

    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&source_path)
        .arg(output_path)
        .output();

    let _ = std::fs::remove_file(&source_path);
    let _ = std::fs::remove_dir(&temp_dir);

    let output = output?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FactureError::PdfGeneration(stderr.trim().to_string()));
    }

    tracing::debug!(path = %output_path.display(), "typst compile finished");
    Ok(())
}
