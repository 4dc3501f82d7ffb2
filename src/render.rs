use std::fmt;

/// Width of the dash line the gateway puts between two recommendations.
pub const SEPARATOR_WIDTH: usize = 94;

/// Heading lines shown above the item list instead of inside it.
pub const HEADINGS: &[&str] = &[
    "Te recomendamos las siguientes películas/shows:",
    "Te recomendandos las siguientes películas/shows:",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItem {
    Link { label: String, url: String },
    Labeled { label: String, text: String },
    Plain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Item(LineItem),
    Separator(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub heading: Option<String>,
    pub fragments: Vec<Fragment>,
}

impl Rendered {
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Item(item) => Some(item),
            Fragment::Separator(_) => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(ref heading) = self.heading {
            out.push_str("<p>");
            out.push_str(&escape_html(heading));
            out.push_str("</p>");
        }
        out.push_str("<ul>");
        for fragment in &self.fragments {
            match fragment {
                Fragment::Separator(line) => out.push_str(&escape_html(line)),
                Fragment::Item(item) => {
                    out.push_str("<li>");
                    match item {
                        LineItem::Link { label, url } => {
                            let url = escape_html(url);
                            out.push_str(&format!(
                                "<strong>{}:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                                escape_html(label),
                                url,
                                url
                            ));
                        }
                        LineItem::Labeled { label, text } => {
                            out.push_str(&format!(
                                "<strong>{}:</strong> {}",
                                escape_html(label),
                                escape_html(text)
                            ));
                        }
                        LineItem::Plain(text) => out.push_str(&escape_html(text)),
                    }
                    out.push_str("</li>");
                }
            }
        }
        out.push_str("</ul>");
        out
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineItem::Link { label, url } => write!(f, "{}: {}", label, url),
            LineItem::Labeled { label, text } => write!(f, "{}: {}", label, text),
            LineItem::Plain(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref heading) = self.heading {
            writeln!(f, "{}", heading)?;
        }
        for fragment in &self.fragments {
            match fragment {
                Fragment::Separator(line) => writeln!(f, "{}", line)?,
                Fragment::Item(item) => writeln!(f, "  • {}", item)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseFormatter {
    separator_width: usize,
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new(SEPARATOR_WIDTH)
    }
}

impl ResponseFormatter {
    pub fn new(separator_width: usize) -> Self {
        Self { separator_width }
    }

    pub fn format(&self, text: &str) -> Rendered {
        let mut rendered = Rendered::default();

        for line in text.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if HEADINGS.contains(&trimmed) {
                if rendered.heading.is_none() {
                    rendered.heading = Some(trimmed.to_string());
                }
                continue;
            }
            if self.is_separator(trimmed) {
                rendered.fragments.push(Fragment::Separator(line.to_string()));
                continue;
            }
            rendered.fragments.push(Fragment::Item(parse_line(line)));
        }

        rendered
    }

    fn is_separator(&self, trimmed: &str) -> bool {
        trimmed.len() == self.separator_width && trimmed.bytes().all(|b| b == b'-')
    }
}

pub fn format_response(text: &str) -> Rendered {
    ResponseFormatter::default().format(text)
}

fn parse_line(line: &str) -> LineItem {
    let Some((label, rest)) = line.split_once(':') else {
        return LineItem::Plain(line.trim().to_string());
    };

    let label = label.trim().to_string();
    let rest = rest.trim().to_string();

    if line.contains("https") {
        LineItem::Link { label, url: rest }
    } else {
        LineItem::Labeled { label, text: rest }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
