//! Component catalog: maps a node's type to its HTML implementation.
//!
//! Render entry points take the catalog as an explicit argument. `BuiltinCatalog` is the
//! fixed registry used by public and preview rendering; the editor may be handed any other
//! implementation (tests use a stub). Every value read from props is HTML-escaped.

use crate::layout::node::{ComponentType, Props};

pub trait ComponentCatalog: Send + Sync {
    /// Renders one node given its already-rendered children.
    /// Returns `None` when the catalog has no implementation for `kind`.
    fn render(&self, kind: &ComponentType, props: &Props, children: &str) -> Option<String>;
}

/// The registered implementations for every catalog type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl ComponentCatalog for BuiltinCatalog {
    fn render(&self, kind: &ComponentType, props: &Props, children: &str) -> Option<String> {
        let html = match kind {
            ComponentType::Container => container(props, children),
            ComponentType::TextBlock => text_block(props, children),
            ComponentType::HeroSection => hero_section(props, children),
            ComponentType::CtaButton => cta_button(props),
            ComponentType::Divider => "<hr class=\"flow-divider\">".to_string(),
            ComponentType::PricingCard => pricing_card(props, children),
            ComponentType::TestimonialCard => testimonial_card(props),
            ComponentType::FeatureCard => feature_card(props, children),
            ComponentType::CaptureForm => capture_form(props),
            ComponentType::VideoSection => video_section(props),
            ComponentType::StatsCounter => stats_counter(props),
            ComponentType::FaqItem => faq_item(props),
            ComponentType::TrustBadges => trust_badges(props),
            ComponentType::Image => image(props),
            ComponentType::Unknown(_) => return None,
        };
        Some(html)
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Only http(s), root-relative and fragment links are emitted; anything else (e.g.
/// `javascript:`) falls back to `#`.
fn safe_url(raw: Option<String>) -> String {
    match raw {
        Some(url)
            if url.starts_with("https://")
                || url.starts_with("http://")
                || url.starts_with('/')
                || url.starts_with('#') =>
        {
            escape_html(&url)
        }
        _ => "#".to_string(),
    }
}

fn optional_tag(tag: &str, class: &str, text: Option<String>) -> String {
    text.map(|t| format!("<{tag} class=\"{class}\">{}</{tag}>", escape_html(&t)))
        .unwrap_or_default()
}

fn container(props: &Props, children: &str) -> String {
    let layout = match props.text("direction").as_deref() {
        Some("row") => "flow-row",
        _ => "flow-column",
    };
    format!("<div class=\"flow-container {layout}\">{children}</div>")
}

fn text_block(props: &Props, children: &str) -> String {
    let tag = match props.text("variant").as_deref() {
        Some("h1") => "h1",
        Some("h2") => "h2",
        Some("h3") => "h3",
        _ => "p",
    };
    let text = escape_html(&props.text("text").unwrap_or_default());
    format!("<{tag} class=\"flow-text\">{text}{children}</{tag}>")
}

fn hero_section(props: &Props, children: &str) -> String {
    let title = optional_tag("h1", "flow-hero-title", props.text("title"));
    let subtitle = optional_tag("p", "flow-hero-subtitle", props.text("subtitle"));
    let cta = if props.text("ctaText").is_some() {
        cta_link(props, "ctaText", "ctaUrl")
    } else {
        String::new()
    };
    format!("<section class=\"flow-hero\">{title}{subtitle}{cta}{children}</section>")
}

fn cta_link(props: &Props, text_key: &str, url_key: &str) -> String {
    format!(
        "<a class=\"flow-cta\" href=\"{}\">{}</a>",
        safe_url(props.text(url_key)),
        escape_html(&props.text_or(text_key, "Get started"))
    )
}

fn cta_button(props: &Props) -> String {
    cta_link(props, "text", "url")
}

fn pricing_card(props: &Props, children: &str) -> String {
    let title = optional_tag("h3", "flow-pricing-title", props.text("title"));
    let price = props
        .text("price")
        .map(|p| {
            let period = props
                .text("period")
                .map(|per| format!("<span class=\"flow-pricing-period\">/{}</span>", escape_html(&per)))
                .unwrap_or_default();
            format!(
                "<p class=\"flow-pricing-price\">{}{}{period}</p>",
                escape_html(&props.text_or("currency", "$")),
                escape_html(&p)
            )
        })
        .unwrap_or_default();
    let features: String = props
        .list("features")
        .iter()
        .map(|f| format!("<li>{}</li>", escape_html(f)))
        .collect();
    let features = if features.is_empty() {
        features
    } else {
        format!("<ul class=\"flow-pricing-features\">{features}</ul>")
    };
    let cta = if props.text("ctaText").is_some() {
        cta_link(props, "ctaText", "ctaUrl")
    } else {
        String::new()
    };
    format!("<div class=\"flow-pricing-card\">{title}{price}{features}{cta}{children}</div>")
}

fn testimonial_card(props: &Props) -> String {
    let quote = escape_html(&props.text("quote").unwrap_or_default());
    let author = props
        .text("author")
        .map(|a| {
            let role = props
                .text("role")
                .map(|r| format!(", {}", escape_html(&r)))
                .unwrap_or_default();
            format!("<figcaption>{}{role}</figcaption>", escape_html(&a))
        })
        .unwrap_or_default();
    format!("<figure class=\"flow-testimonial\"><blockquote>{quote}</blockquote>{author}</figure>")
}

fn feature_card(props: &Props, children: &str) -> String {
    let icon = optional_tag("span", "flow-feature-icon", props.text("icon"));
    let title = optional_tag("h3", "flow-feature-title", props.text("title"));
    let description = optional_tag("p", "flow-feature-description", props.text("description"));
    format!("<div class=\"flow-feature-card\">{icon}{title}{description}{children}</div>")
}

fn capture_form(props: &Props) -> String {
    let mut fields = props.list("fields");
    if fields.is_empty() {
        fields = vec!["name".to_string(), "email".to_string()];
    }
    let inputs: String = fields
        .iter()
        .map(|field| {
            let name = escape_html(field);
            let input_type = if field == "email" { "email" } else { "text" };
            format!("<input type=\"{input_type}\" name=\"{name}\" placeholder=\"{name}\" required>")
        })
        .collect();
    let title = optional_tag("h3", "flow-form-title", props.text("title"));
    format!(
        "<form class=\"flow-capture-form\" method=\"post\" action=\"{}\">{title}{inputs}<button type=\"submit\">{}</button></form>",
        safe_url(props.text("action")),
        escape_html(&props.text_or("buttonText", "Submit"))
    )
}

fn video_section(props: &Props) -> String {
    let title = optional_tag("h2", "flow-video-title", props.text("title"));
    let player = match props.text("url") {
        Some(url) => format!(
            "<iframe class=\"flow-video\" src=\"{}\" allowfullscreen></iframe>",
            safe_url(Some(url))
        ),
        None => String::new(),
    };
    format!("<section class=\"flow-video-section\">{title}{player}</section>")
}

fn stats_counter(props: &Props) -> String {
    format!(
        "<div class=\"flow-stats\"><span class=\"flow-stats-value\">{}{}{}</span><span class=\"flow-stats-label\">{}</span></div>",
        escape_html(&props.text("prefix").unwrap_or_default()),
        escape_html(&props.text_or("value", "0")),
        escape_html(&props.text("suffix").unwrap_or_default()),
        escape_html(&props.text("label").unwrap_or_default())
    )
}

fn faq_item(props: &Props) -> String {
    format!(
        "<details class=\"flow-faq\"><summary>{}</summary><p>{}</p></details>",
        escape_html(&props.text("question").unwrap_or_default()),
        escape_html(&props.text("answer").unwrap_or_default())
    )
}

fn trust_badges(props: &Props) -> String {
    let badges: String = props
        .list("badges")
        .iter()
        .map(|b| format!("<li class=\"flow-badge\">{}</li>", escape_html(b)))
        .collect();
    format!("<ul class=\"flow-trust-badges\">{badges}</ul>")
}

fn image(props: &Props) -> String {
    match props.text("src") {
        Some(src) => format!(
            "<img class=\"flow-image\" src=\"{}\" alt=\"{}\">",
            safe_url(Some(src)),
            escape_html(&props.text("alt").unwrap_or_default())
        ),
        None => String::new(),
    }
}
