use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use png::{BitDepth, ColorType, Encoder};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, Tree, fontdb};
use tracing::debug;

use super::region::{CaptureNode, NodeKind};
use super::{ExportError, ImageBlob, PNG_MIME};

const CELL: u32 = 80;
const HEADER_HEIGHT: u32 = 44;
const MIN_WIDTH: u32 = 480;
const PAD: u32 = 8;
const TILE_FONT_SIZE: u32 = 12;
const TILE_LINE_HEIGHT: u32 = 15;
const TILE_LINES: usize = 3;
/// Half-width character slots that fit in one tile line.
const TILE_LINE_SLOTS: usize = 12;
const FONT_FAMILY: &str =
    "'Noto Sans CJK SC', 'Source Han Sans SC', 'PingFang SC', 'Microsoft YaHei', sans-serif";

const INK: &str = "#18181b";
const MUTED: &str = "#a1a1aa";
const BORDER: &str = "#e4e4e7";
const YEAR_FILL: &str = "#ef4444";
const SELECTED_FILL: &str = "#22c55e";
const TILE_FILL: &str = "#ffffff";

/// Vector rendering of a capture tree at 1x.
#[derive(Debug, Clone)]
pub(crate) struct SvgPage {
    pub(crate) markup: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

pub(crate) fn layout_svg(root: &CaptureNode) -> Result<SvgPage, ExportError> {
    let header = root
        .children
        .iter()
        .find(|node| node.kind == NodeKind::Header);
    let rows: Vec<&CaptureNode> = root
        .children
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::YearRow(_)))
        .collect();
    if header.is_none() && rows.is_empty() {
        return Err(ExportError::Capture("nothing left to capture".to_string()));
    }

    let max_tiles = rows.iter().map(|row| row.children.len()).max().unwrap_or(0) as u32;
    let width = (CELL * (1 + max_tiles)).max(MIN_WIDTH);
    let header_height = if header.is_some() { HEADER_HEIGHT } else { 0 };
    let height = header_height + CELL * rows.len() as u32;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="{FONT_FAMILY}">"#
    );
    let _ = writeln!(
        svg,
        r##"<rect x="0" y="0" width="{width}" height="{height}" fill="#ffffff"/>"##
    );

    if let Some(header) = header {
        write_header(&mut svg, header, width);
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let top = header_height + CELL * row_idx as u32;
        write_row(&mut svg, row, top);
    }
    let _ = writeln!(svg, "</svg>");

    Ok(SvgPage {
        markup: svg,
        width,
        height,
    })
}

fn write_header(svg: &mut String, header: &CaptureNode, width: u32) {
    let baseline = HEADER_HEIGHT / 2 + 6;
    let mut left = String::new();
    let mut right = String::new();
    for node in &header.children {
        match &node.kind {
            NodeKind::Title(text) => {
                let _ = write!(left, "<tspan>{}</tspan>", escape_xml(text));
            }
            NodeKind::Subtitle(text) => {
                let _ = write!(left, "<tspan>{}</tspan>", escape_xml(text));
            }
            NodeKind::Site(text) => {
                let _ = write!(
                    left,
                    r#"<tspan dx="8" fill="{MUTED}" font-weight="normal">{}</tspan>"#,
                    escape_xml(text)
                );
            }
            NodeKind::LanguageToggle(text) => {
                let _ = write!(
                    right,
                    r#"<tspan font-size="14" font-weight="normal">[{}]</tspan><tspan dx="12"> </tspan>"#,
                    escape_xml(text)
                );
            }
            NodeKind::Counter(text) => {
                let _ = write!(right, "<tspan>{}</tspan>", escape_xml(text));
            }
            _ => {}
        }
    }

    let _ = writeln!(
        svg,
        r#"<text x="{PAD}" y="{baseline}" font-size="18" font-weight="bold" fill="{INK}">{left}</text>"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{baseline}" font-size="18" font-weight="bold" fill="{INK}" text-anchor="end">{right}</text>"#,
        width - PAD
    );
    let _ = writeln!(
        svg,
        r#"<line x1="0" y1="{HEADER_HEIGHT}" x2="{width}" y2="{HEADER_HEIGHT}" stroke="{BORDER}"/>"#
    );
}

fn write_row(svg: &mut String, row: &CaptureNode, top: u32) {
    let NodeKind::YearRow(year) = row.kind else {
        return;
    };
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="{top}" width="{CELL}" height="{CELL}" fill="{YEAR_FILL}"/>"#
    );
    let _ = writeln!(
        svg,
        r##"<text x="{}" y="{}" font-size="16" font-weight="bold" fill="#ffffff" text-anchor="middle">{year}</text>"##,
        CELL / 2,
        top + CELL / 2 + 6
    );

    for (col, tile) in row.children.iter().enumerate() {
        let NodeKind::Tile { title, selected } = &tile.kind else {
            continue;
        };
        let left = CELL * (col as u32 + 1);
        let fill = if *selected { SELECTED_FILL } else { TILE_FILL };
        let _ = writeln!(
            svg,
            r#"<rect x="{left}" y="{top}" width="{CELL}" height="{CELL}" fill="{fill}" stroke="{BORDER}"/>"#
        );

        let lines = wrap_title(title);
        let block_height = TILE_LINE_HEIGHT * lines.len() as u32;
        let first_baseline = top + (CELL - block_height) / 2 + TILE_FONT_SIZE;
        let center = left + CELL / 2;
        let _ = write!(
            svg,
            r#"<text font-size="{TILE_FONT_SIZE}" fill="{INK}" text-anchor="middle">"#
        );
        for (line_idx, line) in lines.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<tspan x="{center}" y="{}">{}</tspan>"#,
                first_baseline + TILE_LINE_HEIGHT * line_idx as u32,
                escape_xml(line)
            );
        }
        let _ = writeln!(svg, "</text>");
    }
    let _ = writeln!(
        svg,
        r#"<line x1="0" y1="{}" x2="{}" y2="{}" stroke="{BORDER}"/>"#,
        top + CELL,
        CELL * (row.children.len() as u32 + 1),
        top + CELL
    );
}

fn char_slots(ch: char) -> usize {
    if ch as u32 >= 0x2E80 { 2 } else { 1 }
}

/// Greedy character wrap into at most three lines, ellipsizing overflow.
pub(crate) fn wrap_title(title: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in title.trim().chars() {
        let slots = char_slots(ch);
        if used + slots > TILE_LINE_SLOTS && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        if used == 0 && ch == ' ' {
            continue;
        }
        current.push(ch);
        used += slots;
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > TILE_LINES {
        lines.truncate(TILE_LINES);
        if let Some(last) = lines.last_mut() {
            last.pop();
            last.push('…');
        }
    }
    lines
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// Renders the page at `scale`x and encodes it as PNG.
pub(crate) fn rasterize(page: &SvgPage, scale: u32) -> Result<ImageBlob, ExportError> {
    let scale = scale.max(1);
    let options = usvg::Options {
        fontdb: system_fonts(),
        ..usvg::Options::default()
    };
    let tree = Tree::from_data(page.markup.as_bytes(), &options)
        .map_err(|err| ExportError::Capture(format!("SVG parse failed: {err}")))?;

    let width = page.width * scale;
    let height = page.height * scale;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| ExportError::Capture(format!("cannot allocate {width}x{height} image")))?;
    resvg::render(
        &tree,
        Transform::from_scale(scale as f32, scale as f32),
        &mut pixmap.as_mut(),
    );

    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder
        .write_header()
        .map_err(|err| ExportError::Encode(err.to_string()))?
        .write_image_data(pixmap.data())
        .map_err(|err| ExportError::Encode(err.to_string()))?;

    Ok(ImageBlob {
        mime: PNG_MIME,
        width,
        height,
        bytes,
    })
}

/// PNG bytes back to straight RGBA8, as the system clipboard wants them.
pub(crate) fn decode_rgba(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), ExportError> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    buf.truncate(info.buffer_size());

    if info.color_type != ColorType::Rgba || info.bit_depth != BitDepth::Eight {
        return Err(ExportError::Encode(format!(
            "unsupported PNG layout {:?}/{:?}",
            info.color_type, info.bit_depth
        )));
    }
    Ok((info.width, info.height, buf))
}
