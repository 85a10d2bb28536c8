use kuchiki::{traits::*, NodeRef};

use super::{BlockKind, ContentBlock, InlineStyle, TextLeaf};

pub fn html_to_blocks(html: &str) -> Vec<ContentBlock> {
    let document = kuchiki::parse_html().one(html.to_string());
    let root = document
        .select_first("body")
        .map(|body| body.as_node().clone())
        .unwrap_or(document);
    let mut builder = BlockBuilder::default();
    walk(&root, InlineStyle::default(), BlockKind::Paragraph, &mut builder);
    builder.finish()
}

fn heading_level(tag: &str) -> Option<u8> {
    (tag.len() == 2 && tag.starts_with('h'))
        .then(|| tag[1..].parse::<u8>().ok())
        .flatten()
        .filter(|lvl| (1..=6).contains(lvl))
}

fn block_kind(tag: &str, parent: BlockKind) -> Option<BlockKind> {
    if let Some(level) = heading_level(tag) {
        return Some(BlockKind::Heading(level));
    }
    match tag {
        "li" | "dt" | "dd" => Some(BlockKind::ListItem),
        "blockquote" => Some(BlockKind::Quote),
        "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "aside" | "nav"
        | "figure" | "figcaption" | "ul" | "ol" | "dl" | "table" | "tr" | "td" | "th"
        | "caption" => Some(match parent {
            BlockKind::Quote | BlockKind::ListItem => parent,
            _ => BlockKind::Paragraph,
        }),
        _ => None,
    }
}

fn inline_style(tag: &str, mut style: InlineStyle) -> InlineStyle {
    match tag {
        "em" | "i" | "cite" | "dfn" => style.italic = true,
        "strong" | "b" | "mark" => style.bold = true,
        "code" | "kbd" | "samp" | "tt" => style.code = true,
        _ => {}
    }
    style
}

fn walk(node: &NodeRef, style: InlineStyle, kind: BlockKind, out: &mut BlockBuilder) {
    if let Some(text) = node.as_text() {
        out.push_text(&text.borrow(), style, kind);
        return;
    }
    let Some(el) = node.as_element() else {
        for child in node.children() {
            walk(&child, style, kind, out);
        }
        return;
    };
    let tag = el.name.local.to_lowercase();
    match tag.as_str() {
        "script" | "style" | "head" | "title" | "noscript" | "template" | "img" | "svg"
        | "math" | "video" | "audio" | "iframe" => {}
        "br" => out.end_block(),
        "pre" => {
            out.end_block();
            let code = InlineStyle {
                code: true,
                ..style
            };
            for line in node.text_contents().lines() {
                if !line.trim().is_empty() {
                    out.push_block(ContentBlock::new(
                        BlockKind::Code,
                        vec![TextLeaf::new(line.trim_end(), code)],
                    ));
                }
            }
        }
        _ => {
            if let Some(child_kind) = block_kind(&tag, kind) {
                out.end_block();
                for child in node.children() {
                    walk(&child, style, child_kind, out);
                }
                out.end_block();
            } else {
                let style = inline_style(&tag, style);
                for child in node.children() {
                    walk(&child, style, kind, out);
                }
            }
        }
    }
}

/// Accumulates leaves for the block being built, collapsing whitespace the way
/// a browser lays out inline text.
#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<ContentBlock>,
    kind: Option<BlockKind>,
    leaves: Vec<TextLeaf>,
}

impl BlockBuilder {
    fn push_text(&mut self, raw: &str, style: InlineStyle, kind: BlockKind) {
        let collapsed = collapse_whitespace(raw);
        let pending_space = self.leaves.last().map_or(true, |l| l.text.ends_with(' '));
        let text = if pending_space {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if text.is_empty() {
            return;
        }
        if text.trim().is_empty() {
            // a lone space between inline elements belongs to the previous leaf
            if let Some(last) = self.leaves.last_mut() {
                last.text.push(' ');
            }
            return;
        }
        if self.kind.is_none() {
            self.kind = Some(kind);
        }
        self.leaves.push(TextLeaf::new(text, style));
    }

    fn end_block(&mut self) {
        if let Some(last) = self.leaves.last_mut() {
            let keep = last.text.trim_end().len();
            last.text.truncate(keep);
        }
        self.leaves.retain(|l| !l.text.is_empty());
        let leaves = std::mem::take(&mut self.leaves);
        if let Some(kind) = self.kind.take() {
            if !leaves.is_empty() {
                self.blocks.push(ContentBlock::new(kind, leaves));
            }
        }
    }

    fn push_block(&mut self, block: ContentBlock) {
        self.end_block();
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.end_block();
        self.blocks
    }
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        match ch {
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => continue,
            c if c.is_whitespace() => {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            }
            c => {
                out.push(c);
                last_space = false;
            }
        }
    }
    out
}
