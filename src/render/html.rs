//! HTML serialization of a [`Page`]

use std::fmt::Write;

use super::{Layout, Page, StatusKind};
use crate::detail::DetailState;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
#status:empty{display:none}.status-error{color:#b00020}\
.source{color:#666;margin-left:.5rem}\
table{border-collapse:collapse;width:100%}\
th,td{text-align:left;padding:.25rem .5rem;border-bottom:1px solid #ddd}\
pre{white-space:pre-wrap;background:#f6f6f6;padding:1rem}";

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(super) fn document(page: &Page) -> String {
    let config = page.config();
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(&config.title));
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    out.push_str("</head>\n<body>\n<main>\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape(&config.title));

    status(page, &mut out);
    match config.layout {
        Layout::List => list(page, &mut out),
        Layout::Table => table(page, &mut out),
    }
    detail(page, &mut out);

    out.push_str("</main>\n");
    if let Some(rendered_at) = page.rendered_at {
        let _ = writeln!(
            out,
            "<footer><small>Generated {}</small></footer>",
            rendered_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn status(page: &Page, out: &mut String) {
    let id = escape(&page.config().status_id);
    match page.status() {
        Some(status) => {
            let class = match status.kind {
                StatusKind::Loading => "status-loading",
                StatusKind::Empty => "status-empty",
                StatusKind::Error => "status-error",
            };
            let _ = writeln!(
                out,
                "<p id=\"{}\" class=\"{}\" role=\"status\">{}</p>",
                id,
                class,
                escape(&status.message)
            );
        }
        None => {
            let _ = writeln!(out, "<p id=\"{}\" role=\"status\"></p>", id);
        }
    }
}

fn list(page: &Page, out: &mut String) {
    let placeholder = &page.config().placeholder;
    let _ = writeln!(out, "<ul id=\"{}\">", escape(&page.config().list_id));
    for row in page.rows() {
        let text = format!(
            "{} — {}",
            row.date,
            row.count_label(&page.count_label, placeholder)
        );
        let _ = writeln!(
            out,
            "<li>{} <span class=\"source\">{}</span></li>",
            link(&row.href, &text),
            escape(row.source_label(placeholder))
        );
    }
    out.push_str("</ul>\n");
}

fn table(page: &Page, out: &mut String) {
    let placeholder = &page.config().placeholder;
    let _ = writeln!(out, "<table id=\"{}\">", escape(&page.config().list_id));
    out.push_str("<thead><tr><th>Date</th><th>Source</th><th>Count</th></tr></thead>\n<tbody>\n");
    for row in page.rows() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            link(&row.href, &row.date),
            escape(row.source_label(placeholder)),
            escape(&row.count_label("", placeholder))
        );
    }
    out.push_str("</tbody>\n</table>\n");
}

fn detail(page: &Page, out: &mut String) {
    let id = escape(&page.config().detail_id);
    let panel = page.detail();
    let (Some(selection), Some(state)) = (panel.selection(), panel.state()) else {
        let _ = writeln!(out, "<section id=\"{}\" hidden></section>", id);
        return;
    };

    let _ = writeln!(
        out,
        "<section id=\"{}\" data-date=\"{}\">\n<h2><a href=\"{}\">{}</a></h2>",
        id,
        escape(&selection.date),
        escape(&selection.href),
        escape(&selection.date)
    );
    match state {
        DetailState::Loading => out.push_str("<p class=\"status-loading\">…</p>\n"),
        DetailState::Loaded(text) => {
            let _ = writeln!(out, "<pre>{}</pre>", escape(text));
        }
        DetailState::Failed(message) => {
            let _ = writeln!(out, "<p class=\"status-error\">{}</p>", escape(message));
        }
    }
    out.push_str("</section>\n");
}

fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}
