// src/services/editor.rs
//! Operações do editor de markdown sobre `(texto, início, fim)`.
//! As posições vêm em unidades UTF-16, como `selectionStart`/`selectionEnd` do
//! textarea, e o cursor devolvido usa a mesma unidade.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static HEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6} ").expect("regex de título"));

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("regex de cor"));

/// Fontes do menu "Fonte": (nome, valor CSS).
pub const FONTS: &[(&str, &str)] = &[
    ("Cinzel (Títulos)", "'Cinzel', serif"),
    ("Lora (Corpo)", "'Lora', serif"),
    ("Inter (UI)", "'Inter', sans-serif"),
    ("Georgia", "'Georgia', serif"),
    ("Times New Roman", "'Times New Roman', serif"),
    ("Arial", "'Arial', sans-serif"),
];

/// Tamanhos do menu "Tamanho": (nome, valor em rem).
pub const SIZES: &[(&str, &str)] = &[
    ("Muito Pequeno (12px)", "0.75rem"),
    ("Pequeno (14px)", "0.875rem"),
    ("Normal (16px)", "1rem"),
    ("Médio (18px)", "1.125rem"),
    ("Grande (20px)", "1.25rem"),
    ("Muito Grande (24px)", "1.5rem"),
    ("Extra Grande (32px)", "2rem"),
];

pub const COLORS: &[(&str, &str)] = &[
    ("Preto", "#000000"),
    ("Cinza escuro", "#4b5563"),
    ("Cinza", "#9ca3af"),
    ("Vermelho", "#dc2626"),
    ("Laranja", "#ea580c"),
    ("Amarelo", "#ca8a04"),
    ("Verde", "#16a34a"),
    ("Azul", "#2563eb"),
    ("Roxo", "#9333ea"),
    ("Rosa", "#db2777"),
    ("Marrom", "#78350f"),
    ("Branco", "#ffffff"),
];

pub const ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];

/// Resultado de uma operação: novo texto e posição do cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub text: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Bold,
    Italic,
    Underline,
    Highlight,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    Quote,
    Link,
    HorizontalRule,
    Font(String),
    Size(String),
    Color(String),
    Align(String),
}

impl EditorAction {
    /// Nome da ação vindo da barra de ferramentas, com o valor para as ações com parâmetro.
    /// Valores fora das listas conhecidas são recusados.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).unwrap_or_default();
        let action = match name {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "highlight" => Self::Highlight,
            "h1" => Self::Heading1,
            "h2" => Self::Heading2,
            "h3" => Self::Heading3,
            "bullet_list" => Self::BulletList,
            "numbered_list" => Self::NumberedList,
            "quote" => Self::Quote,
            "link" => Self::Link,
            "hr" => Self::HorizontalRule,
            "font" if FONTS.iter().any(|(_, css)| *css == value) => Self::Font(value.to_string()),
            "size" if SIZES.iter().any(|(_, rem)| *rem == value) => Self::Size(value.to_string()),
            "color" if HEX_COLOR.is_match(value) => Self::Color(value.to_string()),
            "align" if ALIGNMENTS.contains(&value) => Self::Align(value.to_string()),
            _ => return None,
        };
        Some(action)
    }
}

/// Atalho de teclado (Ctrl/Cmd + tecla).
pub fn shortcut(key: &str, modifier: bool) -> Option<EditorAction> {
    if !modifier {
        return None;
    }
    match key.to_lowercase().as_str() {
        "b" => Some(EditorAction::Bold),
        "i" => Some(EditorAction::Italic),
        "u" => Some(EditorAction::Underline),
        "k" => Some(EditorAction::Link),
        "1" => Some(EditorAction::Heading1),
        "2" => Some(EditorAction::Heading2),
        "3" => Some(EditorAction::Heading3),
        _ => None,
    }
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Byte de `text` na posição `units` (UTF-16). A meio de um par substituto
/// avança para o caractere seguinte; além do fim fica no fim.
fn byte_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (i, c) in text.char_indices() {
        if seen >= units {
            return i;
        }
        seen += c.len_utf16();
    }
    text.len()
}

/// Envolve a seleção com `before`/`after`. Sem seleção, o cursor fica entre os dois;
/// com seleção, logo depois do fecho.
pub fn wrap_selection(text: &str, start: usize, end: usize, before: &str, after: &str) -> Edit {
    let (from, to) = (byte_offset(text, start.min(end)), byte_offset(text, start.max(end)));
    let selected = &text[from..to];

    let mut out = String::with_capacity(text.len() + before.len() + after.len());
    out.push_str(&text[..from]);
    out.push_str(before);
    out.push_str(selected);
    out.push_str(after);
    out.push_str(&text[to..]);

    let cursor = if selected.is_empty() {
        utf16_len(&text[..from]) + utf16_len(before)
    } else {
        utf16_len(&text[..to]) + utf16_len(before) + utf16_len(after)
    };
    Edit { text: out, cursor }
}

/// Insere `prefix` no início da linha do cursor. Com `replace_heading`, um marcador
/// de título já existente é trocado em vez de acumulado.
pub fn prefix_line(text: &str, cursor: usize, prefix: &str, replace_heading: bool) -> Edit {
    let at_cursor = byte_offset(text, cursor);
    let line_start = text[..at_cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &text[line_start..];

    let removed = if replace_heading {
        HEADING_MARKER.find(line).map(|m| m.as_str().len()).unwrap_or(0)
    } else {
        0
    };

    let mut out = String::with_capacity(text.len() + prefix.len());
    out.push_str(&text[..line_start]);
    out.push_str(prefix);
    out.push_str(&line[removed..]);

    // O marcador é ASCII: bytes == unidades UTF-16
    let offset_in_line = utf16_len(&text[line_start..at_cursor]);
    let cursor = utf16_len(&text[..line_start])
        + utf16_len(prefix)
        + offset_in_line.saturating_sub(removed);
    Edit { text: out, cursor }
}

/// Aplica uma ação da barra de ferramentas à seleção `[start, end)`.
pub fn apply(action: &EditorAction, text: &str, start: usize, end: usize) -> Edit {
    match action {
        EditorAction::Bold => wrap_selection(text, start, end, "**", "**"),
        EditorAction::Italic => wrap_selection(text, start, end, "*", "*"),
        EditorAction::Underline => wrap_selection(text, start, end, "<u>", "</u>"),
        EditorAction::Highlight => wrap_selection(text, start, end, "==", "=="),
        EditorAction::Heading1 => prefix_line(text, start, "# ", true),
        EditorAction::Heading2 => prefix_line(text, start, "## ", true),
        EditorAction::Heading3 => prefix_line(text, start, "### ", true),
        EditorAction::BulletList => prefix_line(text, start, "- ", false),
        EditorAction::NumberedList => prefix_line(text, start, "1. ", false),
        EditorAction::Quote => prefix_line(text, start, "> ", false),
        EditorAction::Link => wrap_selection(text, start, end, "[", "](url)"),
        EditorAction::HorizontalRule => wrap_selection(text, start, end, "\n\n---\n\n", ""),
        EditorAction::Font(css) => wrap_selection(
            text,
            start,
            end,
            &format!("<span style=\"font-family: {}\">", css),
            "</span>",
        ),
        EditorAction::Size(rem) => wrap_selection(
            text,
            start,
            end,
            &format!("<span style=\"font-size: {}\">", rem),
            "</span>",
        ),
        EditorAction::Color(hex) => wrap_selection(
            text,
            start,
            end,
            &format!("<span style=\"color: {}\">", hex),
            "</span>",
        ),
        EditorAction::Align(align) => wrap_selection(
            text,
            start,
            end,
            &format!("<div style=\"text-align: {}\">", align),
            "</div>",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn wrapping_a_selection_moves_cursor_past_closing_token() {
        let edit = wrap_selection("hello world", 6, 11, "**", "**");
        assert_eq!(edit.text, "hello **world**");
        assert_eq!(edit.cursor, 15);
    }

    #[test]
    fn wrapping_without_selection_leaves_cursor_between_tokens() {
        let edit = wrap_selection("hello ", 6, 6, "**", "**");
        assert_eq!(edit.text, "hello ****");
        assert_eq!(edit.cursor, 8);
    }

    #[test]
    fn offsets_are_utf16_units_and_clamped() {
        let edit = wrap_selection("oração", 0, 99, "*", "*");
        assert_eq!(edit.text, "*oração*");
        assert_eq!(edit.cursor, 8);

        // Seleção invertida é reordenada
        let edit = wrap_selection("fé viva", 2, 0, "==", "==");
        assert_eq!(edit.text, "==fé== viva");
    }

    #[test]
    fn emoji_count_as_two_units() {
        // "amém" selecionado no textarea: unidades 3..7
        let edit = wrap_selection("🙏 amém", 3, 7, "**", "**");
        assert_eq!(edit.text, "🙏 **amém**");
        assert_eq!(edit.cursor, 11);

        let edit = wrap_selection("🙏🙏", 2, 2, "*", "*");
        assert_eq!(edit.text, "🙏**🙏");
        assert_eq!(edit.cursor, 3);

        // Posição a meio do par substituto avança para depois do emoji
        let edit = wrap_selection("🙏 paz", 1, 1, "==", "==");
        assert_eq!(edit.text, "🙏==== paz");
        assert_eq!(edit.cursor, 4);
    }

    #[test]
    fn prefix_after_emoji_line() {
        let edit = prefix_line("🙏 a\n🙌 b", 9, "> ", false);
        assert_eq!(edit.text, "🙏 a\n> 🙌 b");
        assert_eq!(edit.cursor, 11);
    }

    #[test]
    fn prefix_goes_to_start_of_current_line() {
        let edit = prefix_line("linha um\nlinha dois", 12, "- ", false);
        assert_eq!(edit.text, "linha um\n- linha dois");
        assert_eq!(edit.cursor, 14);
    }

    #[test]
    fn cursor_right_after_newline_belongs_to_next_line() {
        let edit = prefix_line("a\nb", 2, "> ", false);
        assert_eq!(edit.text, "a\n> b");
    }

    #[rstest]
    #[case("# Título", EditorAction::Heading2, "## Título")]
    #[case("### Título", EditorAction::Heading1, "# Título")]
    #[case("Título", EditorAction::Heading3, "### Título")]
    fn headings_replace_existing_marker(
        #[case] text: &str,
        #[case] action: EditorAction,
        #[case] expected: &str,
    ) {
        let len = text.encode_utf16().count();
        let edit = apply(&action, text, len, len);
        assert_eq!(edit.text, expected);
        assert_eq!(edit.cursor, expected.encode_utf16().count());
    }

    #[test]
    fn lists_stack_instead_of_replacing() {
        let edit = apply(&EditorAction::BulletList, "# Título", 0, 0);
        assert_eq!(edit.text, "- # Título");
    }

    #[test]
    fn link_and_rule() {
        assert_eq!(apply(&EditorAction::Link, "site", 0, 4).text, "[site](url)");
        let edit = apply(&EditorAction::HorizontalRule, "ab", 1, 1);
        assert_eq!(edit.text, "a\n\n---\n\nb");
        assert_eq!(edit.cursor, 8);
    }

    #[test]
    fn parameterised_actions_only_accept_known_values() {
        assert_eq!(
            EditorAction::parse("color", Some("#dc2626")),
            Some(EditorAction::Color("#dc2626".to_string()))
        );
        assert_eq!(EditorAction::parse("color", Some("red;background:url(x)")), None);
        assert_eq!(EditorAction::parse("align", Some("middle")), None);
        assert_eq!(EditorAction::parse("size", Some("2rem")), Some(EditorAction::Size("2rem".to_string())));
        assert_eq!(EditorAction::parse("desconhecida", None), None);
    }

    #[test]
    fn colored_span() {
        let action = EditorAction::parse("color", Some("#16a34a")).unwrap();
        let edit = apply(&action, "paz", 0, 3);
        assert_eq!(edit.text, "<span style=\"color: #16a34a\">paz</span>");
    }

    #[rstest]
    #[case("b", true, Some(EditorAction::Bold))]
    #[case("K", true, Some(EditorAction::Link))]
    #[case("2", true, Some(EditorAction::Heading2))]
    #[case("b", false, None)]
    #[case("x", true, None)]
    fn shortcuts(#[case] key: &str, #[case] modifier: bool, #[case] expected: Option<EditorAction>) {
        assert_eq!(shortcut(key, modifier), expected);
    }
}
