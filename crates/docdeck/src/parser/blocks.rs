//! Slide markdown → block list.
//!
//! Line-oriented and forgiving: anything that is not a fence, heading, list,
//! or quote becomes paragraph text. Fenced `mermaid`/`graph` blocks become
//! diagram placeholders; their source is returned separately so the deck can
//! own the render state.

use super::Block;

/// Parse one slide. Returns the blocks plus the slide-local diagram sources
/// (referenced by `Block::Diagram::slot`, renumbered deck-wide by the
/// caller).
pub fn parse(content: &str) -> (Vec<Block>, Vec<String>) {
    let mut parsed = Vec::new();
    let mut diagrams = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if let Some(fence_info) = trimmed.strip_prefix("```") {
            flush_paragraph(&mut paragraph, &mut parsed);
            let language = fence_info.trim();
            let mut body: Vec<&str> = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with("```") {
                body.push(lines[i]);
                i += 1;
            }
            // An unterminated fence swallows the rest of the slide as code.
            i += 1;
            let code = body.join("\n");
            if language == "mermaid" || language == "graph" {
                parsed.push(Block::Diagram {
                    slot: diagrams.len(),
                });
                diagrams.push(code);
            } else {
                parsed.push(Block::CodeBlock {
                    language: (!language.is_empty()).then(|| language.to_string()),
                    code,
                });
            }
            continue;
        }

        if let Some((level, text)) = heading_of(trimmed) {
            flush_paragraph(&mut paragraph, &mut parsed);
            parsed.push(Block::Heading { level, text });
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            flush_paragraph(&mut paragraph, &mut parsed);
            let mut quoted: Vec<&str> = Vec::new();
            while i < lines.len() {
                let t = lines[i].trim();
                let Some(rest) = t.strip_prefix('>') else { break };
                quoted.push(rest.trim_start());
                i += 1;
            }
            parsed.push(Block::BlockQuote {
                text: quoted.join("\n").trim().to_string(),
            });
            continue;
        }

        if let Some((ordered, _)) = list_item_of(trimmed) {
            flush_paragraph(&mut paragraph, &mut parsed);
            let mut items = Vec::new();
            while i < lines.len() {
                match list_item_of(lines[i].trim()) {
                    Some((item_ordered, text)) if item_ordered == ordered => {
                        items.push(text.to_string());
                        i += 1;
                    }
                    _ => break,
                }
            }
            parsed.push(Block::List { ordered, items });
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut parsed);
        } else {
            paragraph.push(trimmed);
        }
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut parsed);
    (parsed, diagrams)
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph {
        text: paragraph.join(" "),
    });
    paragraph.clear();
}

fn heading_of(line: &str) -> Option<(u8, String)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    let text = rest.strip_prefix(' ')?;
    Some((hashes as u8, text.trim().to_string()))
}

fn list_item_of(line: &str) -> Option<(bool, &str)> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some((false, rest.trim()));
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return Some((true, rest.trim()));
        }
    }
    None
}
