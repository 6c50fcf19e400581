//! HTML rendering of a `PreviewDocument`.
//!
//! The form core never builds markup; this module is the only place that
//! turns the view model into a page. Every piece of user text is escaped.

use std::fmt::Write;

use crate::form::preview::{ContactKind, PreviewDocument, Section};

const EXPORT_STYLE: &str = "\
body{margin:0;background:#fff;font-family:'Segoe UI',Helvetica,Arial,sans-serif;color:#2c3e50}\
.resume{padding:40px;background:#fff}\
.resume-header{text-align:center;border-bottom:2px solid #3498db;padding-bottom:16px;margin-bottom:20px}\
.resume-header h1{margin:0 0 8px;font-size:28px}\
.contact{display:flex;flex-wrap:wrap;justify-content:center;gap:14px;font-size:13px;color:#555}\
.section{margin-bottom:18px}\
.section h2{font-size:16px;text-transform:uppercase;letter-spacing:1px;color:#3498db;border-bottom:1px solid #e1e8ed;padding-bottom:4px}\
.skills{display:flex;flex-wrap:wrap;gap:6px}\
.skill-item{background:#ecf0f1;border-radius:12px;padding:3px 10px;font-size:12px}\
.item{margin-bottom:12px}\
.item h4{margin:0;font-size:15px}\
.subtitle{font-weight:600;color:#555}\
.date{font-size:12px;color:#7f8c8d}\
.description{font-size:13px;white-space:pre-wrap;margin-top:4px}";

/// Escapes text for use inside HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
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

fn contact_label(kind: ContactKind) -> &'static str {
    match kind {
        ContactKind::Email => "email",
        ContactKind::Phone => "phone",
        ContactKind::Location => "location",
        ContactKind::Website => "website",
    }
}

/// Renders only the resume body, for embedding into a live preview pane.
pub fn render_fragment(doc: &PreviewDocument) -> String {
    let mut html = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        html,
        "<div class=\"resume\"><header class=\"resume-header\"><h1>{}</h1>",
        escape_html(&doc.name)
    );
    if doc.is_visible(Section::Contact) {
        html.push_str("<div class=\"contact\">");
        for line in &doc.contact {
            let _ = write!(
                html,
                "<span class=\"contact-{}\">{}</span>",
                contact_label(line.kind),
                escape_html(&line.value)
            );
        }
        html.push_str("</div>");
    }
    html.push_str("</header>");

    if let Some(summary) = &doc.summary {
        open_section(&mut html, Section::Summary);
        let _ = write!(html, "<p class=\"summary\">{}</p>", escape_html(summary));
        html.push_str("</section>");
    }

    if let Some(skills) = &doc.skills {
        open_section(&mut html, Section::Skills);
        html.push_str("<div class=\"skills\">");
        for skill in skills {
            let _ = write!(html, "<span class=\"skill-item\">{}</span>", escape_html(skill));
        }
        html.push_str("</div></section>");
    }

    if doc.is_visible(Section::Education) {
        open_section(&mut html, Section::Education);
        for item in &doc.education {
            let _ = write!(
                html,
                "<div class=\"item\"><h4>{}</h4><div class=\"subtitle\">{}</div><div class=\"date\">{}</div></div>",
                escape_html(&item.degree),
                escape_html(&item.institution),
                escape_html(&item.detail_line())
            );
        }
        html.push_str("</section>");
    }

    if doc.is_visible(Section::Experience) {
        open_section(&mut html, Section::Experience);
        for item in &doc.experience {
            let _ = write!(
                html,
                "<div class=\"item\"><h4>{}</h4><div class=\"subtitle\">{}</div><div class=\"date\">{}</div>",
                escape_html(&item.job_title),
                escape_html(&item.company),
                escape_html(item.date_range.as_deref().unwrap_or_default())
            );
            if let Some(description) = &item.description {
                let _ = write!(
                    html,
                    "<div class=\"description\">{}</div>",
                    escape_html(description)
                );
            }
            html.push_str("</div>");
        }
        html.push_str("</section>");
    }

    html.push_str("</div>");
    html
}

/// Renders a standalone page ready to hand to the document renderer.
pub fn render_document(doc: &PreviewDocument) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape_html(&doc.name),
        EXPORT_STYLE,
        render_fragment(doc)
    )
}

fn open_section(html: &mut String, section: Section) {
    let _ = write!(
        html,
        "<section class=\"section section-{}\"><h2>{}</h2>",
        section_slug(section),
        section.title()
    );
}

fn section_slug(section: Section) -> &'static str {
    match section {
        Section::Contact => "contact",
        Section::Summary => "summary",
        Section::Skills => "skills",
        Section::Education => "education",
        Section::Experience => "experience",
    }
}
