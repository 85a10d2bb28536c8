use super::{BlockKind, ContentBlock, InlineStyle, TextLeaf};

/// Blank-line separated paragraphs; headings, fences and emphasis only when
/// `markdown` is set.
pub fn text_to_blocks(content: &str, markdown: bool) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut paragraph_lines: Vec<String> = Vec::new();
    let mut in_fence = false;

    for raw_line in content.lines() {
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if markdown && is_fence(trimmed) {
            flush_paragraph(&mut paragraph_lines, &mut blocks, markdown);
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            if !trimmed.is_empty() {
                blocks.push(ContentBlock::new(
                    BlockKind::Code,
                    vec![TextLeaf::new(
                        line.trim_end(),
                        InlineStyle {
                            code: true,
                            ..InlineStyle::default()
                        },
                    )],
                ));
            }
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph_lines, &mut blocks, markdown);
            continue;
        }

        if markdown {
            if let Some((level, text)) = parse_atx_heading(trimmed) {
                flush_paragraph(&mut paragraph_lines, &mut blocks, markdown);
                push_block(&mut blocks, BlockKind::Heading(level), &text, markdown);
                continue;
            }
        }

        if let Some(item) = parse_list_item(trimmed) {
            flush_paragraph(&mut paragraph_lines, &mut blocks, markdown);
            push_block(&mut blocks, BlockKind::ListItem, &item, markdown);
            continue;
        }

        if let Some(quote) = trimmed.strip_prefix('>') {
            flush_paragraph(&mut paragraph_lines, &mut blocks, markdown);
            push_block(&mut blocks, BlockKind::Quote, quote, markdown);
            continue;
        }

        paragraph_lines.push(trimmed.to_string());
    }

    flush_paragraph(&mut paragraph_lines, &mut blocks, markdown);
    blocks
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    let count = line.bytes().take_while(|b| *b == b'#').count();
    if count == 0 || count > 6 {
        return None;
    }
    let rest = &line[count..];
    if !rest.starts_with(' ') {
        return None;
    }
    let rest = rest.trim().trim_end_matches('#').trim();
    if rest.is_empty() {
        return None;
    }
    Some((count as u8, rest.to_string()))
}

fn parse_list_item(line: &str) -> Option<String> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            let rest = rest.trim();
            return (!rest.is_empty()).then(|| rest.to_string());
        }
    }
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest
        .strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))?
        .trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn flush_paragraph(lines: &mut Vec<String>, blocks: &mut Vec<ContentBlock>, markdown: bool) {
    if lines.is_empty() {
        return;
    }
    let text = lines.join(" ");
    lines.clear();
    push_block(blocks, BlockKind::Paragraph, &text, markdown);
}

fn push_block(blocks: &mut Vec<ContentBlock>, kind: BlockKind, text: &str, markdown: bool) {
    let text = collapse_spaces(text);
    if text.is_empty() {
        return;
    }
    let leaves = if markdown {
        inline_leaves(&text)
    } else {
        vec![TextLeaf::plain(text)]
    };
    if !leaves.is_empty() {
        blocks.push(ContentBlock::new(kind, leaves));
    }
}

fn collapse_spaces(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `**bold**`, `*italic*` / `_italic_` and `` `code` `` runs into leaves.
/// Unterminated markers are kept as literal text.
fn inline_leaves(text: &str) -> Vec<TextLeaf> {
    let mut leaves = Vec::new();
    let mut style = InlineStyle::default();
    let mut current = String::new();
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        let marker = if style.code && ch != '`' {
            None
        } else if rest.starts_with("**") {
            Some("**")
        } else if ch == '`' {
            Some("`")
        } else if ch == '*' || ch == '_' {
            Some(&rest[..1])
        } else {
            None
        };
        if let Some(marker) = marker {
            let opening = match marker {
                "**" => !style.bold,
                "`" => !style.code,
                _ => !style.italic,
            };
            let after = &rest[marker.len()..];
            if !opening || after.contains(marker) {
                if !current.is_empty() {
                    leaves.push(TextLeaf::new(std::mem::take(&mut current), style));
                }
                match marker {
                    "**" => style.bold = opening,
                    "`" => style.code = opening,
                    _ => style.italic = opening,
                }
                rest = after;
                continue;
            }
        }
        current.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    if !current.is_empty() {
        leaves.push(TextLeaf::new(current, style));
    }
    leaves
}
