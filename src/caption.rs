//! Caption markup.
//!
//! Captions are authored as a small HTML subset: paragraphs and line breaks,
//! `b`/`strong`, `i`/`em`, `h1`-`h3` and `img`. Unknown tags are dropped and
//! their text kept. An `img` may carry `data-annotated-aspect` with a ratio
//! expression; otherwise it takes the widget's aspect ratio.

use std::borrow::Cow;

use quick_xml::encoding::Decoder;
use quick_xml::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::aspect;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub heading: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptionImage {
    pub src: String,
    pub aspect: Option<f32>,
}

impl CaptionImage {
    /// Height when drawn `width` wide.
    pub fn height_at(&self, width: f32, fallback_aspect: f32) -> f32 {
        width * self.aspect.unwrap_or(fallback_aspect)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Text(Vec<Span>),
    Image(CaptionImage),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Caption {
    pub blocks: Vec<Block>,
}

impl Caption {
    pub fn parse(markup: &str) -> Self {
        let source = escape_stray_markup(markup);
        let mut reader = Reader::from_str(&source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        let decoder = reader.decoder();

        let mut builder = Builder::default();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => builder.start(&e, decoder),
                Ok(Event::Empty(e)) => {
                    builder.start(&e, decoder);
                    builder.end(&tag_name(e.name().as_ref(), decoder));
                }
                Ok(Event::End(e)) => builder.end(&tag_name(e.name().as_ref(), decoder)),
                Ok(Event::Text(e)) => match e.decode() {
                    Ok(text) => builder.text(&text),
                    Err(err) => log::warn!("undecodable caption text: {err}"),
                },
                Ok(Event::CData(e)) => match decoder.decode(&e) {
                    Ok(text) => builder.text(&text),
                    Err(err) => log::warn!("undecodable caption text: {err}"),
                },
                Ok(Event::GeneralRef(e)) => match e.decode() {
                    Ok(name) => builder.text(&unescape(&format!("&{name};"))),
                    Err(err) => log::warn!("undecodable caption reference: {err}"),
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    log::warn!(
                        "caption markup broken at byte {}: {err}",
                        reader.error_position()
                    );
                    break;
                }
            }
        }
        builder.finish()
    }

    pub fn plain_text(&self) -> String {
        let mut out = Vec::new();
        for block in &self.blocks {
            if let Block::Text(spans) = block {
                out.push(spans.iter().map(|s| s.text.as_str()).collect::<String>());
            }
        }
        out.join("\n")
    }

    /// Height of the caption laid out `width` wide. `text_height` measures a
    /// text block at that width; images are sized from their aspect ratio.
    pub fn measure(
        &self,
        width: f32,
        fallback_aspect: f32,
        mut text_height: impl FnMut(&[Span], f32) -> f32,
    ) -> f32 {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Text(spans) => text_height(spans, width),
                Block::Image(img) => img.height_at(width, fallback_aspect),
            })
            .sum()
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    bold: u32,
    italic: u32,
    heading: u32,
}

impl Builder {
    fn text(&mut self, decoded: &str) {
        let mut collapsed = String::with_capacity(decoded.len());
        let mut last_space = self
            .spans
            .last()
            .map_or(true, |s| s.text.ends_with([' ', '\n']));
        for c in decoded.chars() {
            if c.is_whitespace() && c != '\u{a0}' {
                if !last_space {
                    collapsed.push(' ');
                    last_space = true;
                }
            } else {
                collapsed.push(if c == '\u{a0}' { ' ' } else { c });
                last_space = false;
            }
        }
        if collapsed.is_empty() {
            return;
        }
        let (bold, italic, heading) = (self.bold > 0, self.italic > 0, self.heading > 0);
        if let Some(last) = self
            .spans
            .last_mut()
            .filter(|s| (s.bold, s.italic, s.heading) == (bold, italic, heading))
        {
            last.text.push_str(&collapsed);
        } else {
            self.spans.push(Span {
                text: collapsed,
                bold,
                italic,
                heading,
            });
        }
    }

    fn line_break(&mut self) {
        if let Some(last) = self.spans.last_mut() {
            let trimmed = last.text.trim_end_matches(' ').len();
            last.text.truncate(trimmed);
            last.text.push('\n');
        }
    }

    fn end_block(&mut self) {
        let mut spans = std::mem::take(&mut self.spans);
        if let Some(last) = spans.last_mut() {
            let trimmed = last.text.trim_end().len();
            last.text.truncate(trimmed);
        }
        spans.retain(|s| !s.text.is_empty());
        if !spans.is_empty() {
            self.blocks.push(Block::Text(spans));
        }
    }

    fn counter(&mut self, name: &str) -> Option<&mut u32> {
        match name {
            "b" | "strong" => Some(&mut self.bold),
            "i" | "em" => Some(&mut self.italic),
            "h1" | "h2" | "h3" => Some(&mut self.heading),
            _ => None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, decoder: Decoder) {
        let name = tag_name(e.name().as_ref(), decoder);
        if let Some(counter) = self.counter(&name) {
            *counter += 1;
            if name.starts_with('h') {
                self.end_block();
            }
            return;
        }
        match name.as_str() {
            "br" => self.line_break(),
            "p" | "div" | "li" | "ul" | "ol" => self.end_block(),
            "img" => {
                self.end_block();
                let Some(src) = attribute(e, decoder, "src") else {
                    return;
                };
                let aspect = attribute(e, decoder, "data-annotated-aspect")
                    .and_then(|expr| aspect::parse_ratio(&expr));
                self.blocks.push(Block::Image(CaptionImage { src, aspect }));
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str) {
        if let Some(counter) = self.counter(name) {
            *counter = counter.saturating_sub(1);
            if name.starts_with('h') {
                self.end_block();
            }
            return;
        }
        if matches!(name, "p" | "div" | "li" | "ul" | "ol") {
            self.end_block();
        }
    }

    fn finish(mut self) -> Caption {
        self.end_block();
        Caption {
            blocks: self.blocks,
        }
    }
}

fn tag_name(raw: &[u8], decoder: Decoder) -> String {
    decoder
        .decode(raw)
        .map(|name| name.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Value of attribute `name`, entities resolved. HTML forms (unquoted or
/// bare attributes) are accepted.
fn attribute(e: &BytesStart<'_>, decoder: Decoder, name: &str) -> Option<String> {
    e.html_attributes().flatten().find_map(|attr| {
        let key = decoder.decode(attr.key.as_ref()).ok()?;
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = decoder.decode(&attr.value).ok()?;
        Some(unescape(&value))
    })
}

fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        _ => escape::resolve_predefined_entity(name),
    }
}

/// Resolve references in `raw`; unknown ones are kept as written.
fn unescape(raw: &str) -> String {
    escape::unescape_with(raw, html_entity).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

/// Captions are hand-written HTML, so a `<` or `&` that cannot open a tag or
/// a reference is text, not a syntax error.
fn escape_stray_markup(markup: &str) -> Cow<'_, str> {
    if !markup.contains(['<', '&']) {
        return Cow::Borrowed(markup);
    }
    let mut out = String::with_capacity(markup.len() + 8);
    for (i, c) in markup.char_indices() {
        let rest = &markup[i + c.len_utf8()..];
        match c {
            '<' if !opens_tag(rest) => out.push_str("&lt;"),
            '&' if !opens_reference(rest) => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn opens_tag(rest: &str) -> bool {
    rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn opens_reference(rest: &str) -> bool {
    let len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
        .unwrap_or(rest.len());
    len > 0 && rest[len..].starts_with(';')
}
