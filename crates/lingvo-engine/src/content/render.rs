use pulldown_cmark::{Options, Parser, html};
use serde::Serialize;

use super::blocks::{BlockKind, ContentBlock, is_fence, strip_list_marker};
use super::sentence::{Sentence, TranslationLine};

/// A block shaped for a renderer: markers stripped, inline markdown
/// converted to HTML, speakable lines split into sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderedBlock {
    Heading {
        title: String,
        level: u8,
    },
    Audio {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        sentences: Vec<Sentence>,
    },
    Translation {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        lines: Vec<TranslationLine>,
    },
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<String>,
    },
    Quote {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        lines: Vec<String>,
    },
    Code {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        code: String,
    },
    Paragraph {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        html: String,
    },
}

pub fn render_block(block: &ContentBlock) -> RenderedBlock {
    let title = block.title.clone();
    match block.kind {
        BlockKind::Heading => RenderedBlock::Heading {
            title: title.unwrap_or_default(),
            level: block.level.unwrap_or(1),
        },
        BlockKind::Audio => RenderedBlock::Audio {
            title,
            sentences: block.lines.iter().map(|l| Sentence::parse(l)).collect(),
        },
        BlockKind::Translation => RenderedBlock::Translation {
            title,
            lines: block
                .lines
                .iter()
                .map(|l| TranslationLine::parse(l))
                .collect(),
        },
        BlockKind::List => RenderedBlock::List {
            title,
            items: block
                .lines
                .iter()
                .map(|l| render_inline(strip_list_marker(l)))
                .collect(),
        },
        BlockKind::Quote => RenderedBlock::Quote {
            title,
            lines: block
                .lines
                .iter()
                .map(|l| render_inline(l.trim_start().trim_start_matches('>').trim_start()))
                .collect(),
        },
        BlockKind::Code => {
            let language = block
                .lines
                .iter()
                .find(|l| is_fence(l))
                .map(|l| l.trim().trim_start_matches(['`', '~']).trim().to_string())
                .filter(|lang| !lang.is_empty());
            let code = block
                .lines
                .iter()
                .filter(|l| !is_fence(l))
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            RenderedBlock::Code {
                title,
                language,
                code,
            }
        }
        BlockKind::Paragraph => RenderedBlock::Paragraph {
            title,
            html: render_inline(&block.lines.join("\n")),
        },
    }
}

pub fn render_blocks(blocks: &[ContentBlock]) -> Vec<RenderedBlock> {
    blocks.iter().map(render_block).collect()
}

/// Render inline markdown (emphasis, links, code spans) to an HTML fragment
/// without the surrounding paragraph element.
pub fn render_inline(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(text.len() + 16);
    html::push_html(&mut out, parser);

    let trimmed = out.trim_end();
    trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(trimmed)
        .to_string()
}
