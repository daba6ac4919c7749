// src/services/content.rs
//! Conversão do conteúdo guardado (markdown ou HTML do editor) em HTML seguro.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

const YOUTUBE_EMBED: &str = "https://www.youtube.com/embed/";

static BARE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("regex de id do YouTube"));

static ID_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})")
            .expect("regex de URL do YouTube"),
        Regex::new(r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})").expect("regex de URL do YouTube"),
    ]
});

// Links que viram vídeo incorporado no conteúdo
static EMBEDDABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]+)")
        .expect("regex de link do YouTube")
});

static HIGHLIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"==([^=\n]+)==").expect("regex de destaque"));

const MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

/// ID do vídeo a partir de uma URL do YouTube (ou o próprio ID).
/// Entradas que não reconhece são devolvidas tal como vieram.
pub fn extract_youtube_id(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() || BARE_ID.is_match(input) {
        return input.to_string();
    }
    ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

pub fn embed_url(video_id: &str) -> String {
    format!("{}{}", YOUTUBE_EMBED, video_id)
}

fn embed_html(video_id: &str) -> String {
    format!(
        r#"<div class="video-embed" style="position:relative;padding-bottom:56.25%;height:0;overflow:hidden"><iframe src="{}" title="YouTube video" style="position:absolute;top:0;left:0;width:100%;height:100%" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></div>"#,
        embed_url(video_id)
    )
}

fn embeddable_id(url: &str) -> Option<String> {
    EMBEDDABLE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// Parágrafos só com um URL do YouTube e links para o YouTube viram iframes
fn embed_videos(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        if let (Event::Start(Tag::Paragraph), Some(Event::Text(text)), Some(Event::End(TagEnd::Paragraph))) =
            (&events[i], events.get(i + 1), events.get(i + 2))
        {
            if let Some(id) = embeddable_id(text) {
                out.push(Event::Html(embed_html(&id).into()));
                i += 3;
                continue;
            }
        }
        if let Event::Start(Tag::Link { dest_url, .. }) = &events[i] {
            if let Some(id) = embeddable_id(dest_url) {
                out.push(Event::Html(embed_html(&id).into()));
                // Descarta o texto do link
                while i < events.len() && !matches!(events[i], Event::End(TagEnd::Link)) {
                    i += 1;
                }
                i += 1;
                continue;
            }
        }
        out.push(events[i].clone());
        i += 1;
    }
    out
}

fn push_marked<'a>(out: &mut Vec<Event<'a>>, text: &str) {
    let mut last = 0;
    for caps in HIGHLIGHT.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Event::Text(text[last..whole.start()].to_string().into()));
        }
        out.push(Event::InlineHtml("<mark>".into()));
        out.push(Event::Text(inner.as_str().to_string().into()));
        out.push(Event::InlineHtml("</mark>".into()));
        last = whole.end();
    }
    if last < text.len() {
        out.push(Event::Text(text[last..].to_string().into()));
    }
}

// `==texto==` vira <mark>; código (inline ou em bloco) fica literal
fn highlight(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_code_block = false;
    for event in events {
        match &event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if !in_code_block && HIGHLIGHT.is_match(text) => {
                push_marked(&mut out, text);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn sanitize(html: &str) -> String {
    ammonia::Builder::default()
        .add_tags(&["u", "mark", "span", "div", "iframe"])
        .add_generic_attributes(&["style"])
        .add_tag_attributes("iframe", &["src", "title", "allow", "allowfullscreen", "frameborder"])
        .attribute_filter(|element, attribute, value| {
            // Só iframes do YouTube
            if element == "iframe" && attribute == "src" && !value.starts_with(YOUTUBE_EMBED) {
                None
            } else {
                Some(value.into())
            }
        })
        .clean(html)
        .to_string()
}

/// Markdown (com tabelas, riscado, quebras de linha simples e `==destaque==`) para HTML.
pub fn render_markdown(src: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events: Vec<Event<'_>> = TextMergeStream::new(Parser::new_ext(src, options))
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect();

    let mut out = String::new();
    html::push_html(&mut out, highlight(embed_videos(events)).into_iter());
    sanitize(&out)
}

/// Conteúdo vindo do editor: HTML é apenas limpo, o resto é markdown.
pub fn render_rich(src: &str) -> String {
    if src.trim_start().starts_with('<') {
        sanitize(src)
    } else {
        render_markdown(src)
    }
}

/// "24 de fevereiro de 2026". A data é de calendário, sem fuso.
pub fn format_date_pt(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// "24/02/2026", usado nas listas do admin.
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://youtu.be/dQw4w9WgXcQ?t=10", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("video-da-semana", "video-da-semana")]
    #[case("", "")]
    fn youtube_ids(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_youtube_id(input), expected);
    }

    #[test]
    fn highlight_skips_code() {
        let html = render_markdown("Use `==x==` para ==destacar==.\n\n```\na ==b== c\n```");
        assert!(html.contains("<code>==x==</code>"));
        assert!(html.contains("<mark>destacar</mark>"));
        assert!(html.contains("a ==b== c"));
        assert!(!html.contains("<mark>x</mark>"));
        assert!(!html.contains("<mark>b</mark>"));
    }

    #[test]
    fn markdown_basics_and_highlight() {
        let html = render_markdown("# Título\n\nTexto **forte** e ==marcado==.");
        assert!(html.contains("<h1>Título</h1>"));
        assert!(html.contains("<strong>forte</strong>"));
        assert!(html.contains("<mark>marcado</mark>"));
    }

    #[test]
    fn single_newlines_become_breaks() {
        let html = render_markdown("linha um\nlinha dois");
        assert!(html.contains("linha um<br>"));
    }

    #[test]
    fn scripts_are_removed_but_styles_kept() {
        let html = render_markdown(
            "<span style=\"color: #c00\">vermelho</span> <script>alert(1)</script>",
        );
        assert!(html.contains("<span style=\"color: #c00\">vermelho</span>"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn youtube_paragraph_becomes_embed() {
        let html = render_markdown("Antes\n\nhttps://www.youtube.com/watch?v=dQw4w9WgXcQ\n\nDepois");
        assert!(html.contains("<iframe src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\""));
        assert!(html.contains("Depois"));
    }

    #[test]
    fn youtube_link_becomes_embed() {
        let html = render_markdown("Veja [o culto](https://youtu.be/dQw4w9WgXcQ) completo");
        assert!(html.contains("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(!html.contains(">o culto<"));
    }

    #[test]
    fn foreign_iframes_are_dropped() {
        let html = render_rich("<p>x</p><iframe src=\"https://evil.example/\"></iframe>");
        assert!(!html.contains("evil.example"));
    }

    #[test]
    fn html_content_is_passed_through() {
        let html = render_rich("<p style=\"text-align: center\">Centro</p>");
        assert_eq!(html, "<p style=\"text-align: center\">Centro</p>");
    }

    #[test]
    fn dates_in_portuguese() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        assert_eq!(format_date_pt(date), "24 de fevereiro de 2026");
        assert_eq!(format_date_short(date), "24/02/2026");
    }
}
