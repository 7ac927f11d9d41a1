//! Answer parsing and rendering into an [`AnswerView`].
//!
//! Answers arrive as semi-formatted text. An answer mentioning a "full squad" is split into
//! an intro paragraph and one player card per blank-line separated block; anything else
//! gets the markdown-lite treatment (`**bold**` and line breaks, nothing more).
//!
//! All strings stored in the view are raw text. Escaping is the job of whoever turns the
//! view into markup (see [`crate::html`]).

pub const SQUAD_MARKER: &str = "full squad";

const EMPHASIS: &str = "**";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub name: String,
    // (label, value); an empty label marks a note line that carried no colon.
    pub details: Vec<(String, String)>,
}

impl PlayerRecord {
    /// Rows the details take when wrapped at `width` columns; each detail gets at least one.
    pub fn wrapped_rows(&self, width: u16) -> u16 {
        let width = usize::from(width.max(1));
        let rows = self
            .details
            .iter()
            .map(|(label, value)| detail_text(label, value).chars().count().div_ceil(width).max(1))
            .fold(0usize, usize::saturating_add);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerNode {
    Paragraph(Vec<Inline>),
    Card(PlayerRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquadAnswer {
    pub intro: String,
    pub players: Vec<PlayerRecord>,
}

/// Render target for answers. Rendering always replaces the whole content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerView {
    nodes: Vec<AnswerNode>,
}

impl AnswerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[AnswerNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn push(&mut self, node: AnswerNode) {
        self.nodes.push(node);
    }

    /// Replace the content with literal text. No markup is interpreted.
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.push(AnswerNode::Paragraph(literal_inlines(text)));
    }

    pub fn cards(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.nodes.iter().filter_map(|node| match node {
            AnswerNode::Card(card) => Some(card),
            AnswerNode::Paragraph(_) => None,
        })
    }

    /// Flattened text content, roughly what a reader sees with styling removed.
    pub fn plain_text(&self) -> String {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                AnswerNode::Paragraph(inlines) => out.push(inlines_text(inlines)),
                AnswerNode::Card(card) => {
                    let mut lines = vec![card.name.clone()];
                    for (label, value) in &card.details {
                        lines.push(detail_text(label, value));
                    }
                    out.push(lines.join("\n"));
                }
            }
        }
        out.join("\n\n")
    }
}

pub fn is_squad_answer(answer: &str) -> bool {
    answer.contains(SQUAD_MARKER)
}

/// Full renderer: structured cards for squad listings, markdown-lite otherwise.
pub fn render(answer: &str, target: &mut AnswerView) {
    target.clear();
    if is_squad_answer(answer) {
        let squad = parse_squad_answer(answer);
        target.push(AnswerNode::Paragraph(literal_inlines(&squad.intro)));
        for player in squad.players {
            target.push(AnswerNode::Card(player));
        }
    } else {
        target.push(AnswerNode::Paragraph(parse_inline_markup(answer)));
    }
}

/// Verbatim renderer used when structured rendering is switched off.
pub fn render_text(answer: &str, target: &mut AnswerView) {
    target.set_text(answer);
}

pub fn parse_squad_answer(answer: &str) -> SquadAnswer {
    let normalized = answer.replace("\r\n", "\n");
    let mut parts = normalized.split("\n\n");
    let intro = parts.next().unwrap_or_default().trim().to_string();
    let players = parts.filter_map(parse_player_block).collect();
    SquadAnswer { intro, players }
}

/// Parse one blank-line separated block. Returns `None` when nothing but whitespace
/// (or bare ordinals) is left.
pub fn parse_player_block(block: &str) -> Option<PlayerRecord> {
    let mut lines = block
        .lines()
        .map(|line| strip_ordinal(line.trim()).trim())
        .filter(|line| !line.is_empty());

    let name = lines.next()?.replace(EMPHASIS, "").trim().to_string();
    let details = lines.map(parse_detail_line).collect();
    Some(PlayerRecord { name, details })
}

pub fn parse_detail_line(line: &str) -> (String, String) {
    let line = strip_bullet(line.trim());
    match line.split_once(':') {
        Some((label, value)) => (
            label.replace(EMPHASIS, "").trim().to_string(),
            strip_emphasis(value),
        ),
        None => (String::new(), strip_emphasis(line)),
    }
}

/// `**bold**` spans become [`Inline::Strong`], newlines become [`Inline::Break`].
/// Emphasis never spans lines; an unmatched marker stays literal.
pub fn parse_inline_markup(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push(Inline::Break);
        }
        let mut rest = line;
        while let Some(open) = rest.find(EMPHASIS) {
            let after_open = &rest[open + EMPHASIS.len()..];
            let Some(close) = after_open.find(EMPHASIS) else {
                break;
            };
            push_text(&mut out, &rest[..open]);
            out.push(Inline::Strong(after_open[..close].to_string()));
            rest = &after_open[close + EMPHASIS.len()..];
        }
        push_text(&mut out, rest);
    }
    out
}

pub fn inlines_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Strong(text) => out.push_str(text),
            Inline::Break => out.push('\n'),
        }
    }
    out
}

pub fn detail_text(label: &str, value: &str) -> String {
    if label.is_empty() {
        value.to_string()
    } else if value.is_empty() {
        format!("{label}:")
    } else {
        format!("{label}: {value}")
    }
}

fn literal_inlines(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push(Inline::Break);
        }
        push_text(&mut out, line);
    }
    out
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

fn strip_ordinal(line: &str) -> &str {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line)
}

// Values render as plain text, so every marker goes, not just the outer pair.
fn strip_emphasis(text: &str) -> String {
    text.replace(EMPHASIS, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ordinal_requires_period() {
        assert_eq!(strip_ordinal("12. **Bukayo Saka**"), "**Bukayo Saka**");
        assert_eq!(strip_ordinal("3.Rice"), "Rice");
        assert_eq!(strip_ordinal("2024 season"), "2024 season");
        assert_eq!(strip_ordinal("Saka"), "Saka");
    }

    #[test]
    fn strip_bullet_handles_dash_and_star() {
        assert_eq!(strip_bullet("- **Age**: 23"), "**Age**: 23");
        assert_eq!(strip_bullet("* Age: 23"), "Age: 23");
        assert_eq!(strip_bullet("-5 goal difference"), "-5 goal difference");
    }

    #[test]
    fn push_text_merges_adjacent_text() {
        let mut out = Vec::new();
        push_text(&mut out, "a");
        push_text(&mut out, "b");
        push_text(&mut out, "");
        assert_eq!(out, vec![Inline::Text("ab".to_string())]);
    }
}
