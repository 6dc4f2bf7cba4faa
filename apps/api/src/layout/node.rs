use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

/// The closed catalog of component types a layout node may name.
///
/// Tags outside the catalog (including a missing tag) are kept as `Unknown` so that
/// legacy content survives an editor round trip; renderers treat them as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Container,
    TextBlock,
    HeroSection,
    CtaButton,
    Divider,
    PricingCard,
    TestimonialCard,
    FeatureCard,
    CaptureForm,
    VideoSection,
    StatsCounter,
    FaqItem,
    TrustBadges,
    Image,
    Unknown(String),
}

impl ComponentType {
    /// Every registered type, in catalog order.
    pub fn known() -> [ComponentType; 14] {
        [
            ComponentType::Container,
            ComponentType::TextBlock,
            ComponentType::HeroSection,
            ComponentType::CtaButton,
            ComponentType::Divider,
            ComponentType::PricingCard,
            ComponentType::TestimonialCard,
            ComponentType::FeatureCard,
            ComponentType::CaptureForm,
            ComponentType::VideoSection,
            ComponentType::StatsCounter,
            ComponentType::FaqItem,
            ComponentType::TrustBadges,
            ComponentType::Image,
        ]
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Container" => ComponentType::Container,
            "TextBlock" => ComponentType::TextBlock,
            "HeroSection" => ComponentType::HeroSection,
            "CTAButton" => ComponentType::CtaButton,
            "Divider" => ComponentType::Divider,
            "PricingCard" => ComponentType::PricingCard,
            "TestimonialCard" => ComponentType::TestimonialCard,
            "FeatureCard" => ComponentType::FeatureCard,
            "CaptureForm" => ComponentType::CaptureForm,
            "VideoSection" => ComponentType::VideoSection,
            "StatsCounter" => ComponentType::StatsCounter,
            "FAQItem" => ComponentType::FaqItem,
            "TrustBadges" => ComponentType::TrustBadges,
            "Image" => ComponentType::Image,
            other => ComponentType::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ComponentType::Container => "Container",
            ComponentType::TextBlock => "TextBlock",
            ComponentType::HeroSection => "HeroSection",
            ComponentType::CtaButton => "CTAButton",
            ComponentType::Divider => "Divider",
            ComponentType::PricingCard => "PricingCard",
            ComponentType::TestimonialCard => "TestimonialCard",
            ComponentType::FeatureCard => "FeatureCard",
            ComponentType::CaptureForm => "CaptureForm",
            ComponentType::VideoSection => "VideoSection",
            ComponentType::StatsCounter => "StatsCounter",
            ComponentType::FaqItem => "FAQItem",
            ComponentType::TrustBadges => "TrustBadges",
            ComponentType::Image => "Image",
            ComponentType::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ComponentType::Unknown(_))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Opaque per-component configuration. Accessors coerce scalars to text so that a
/// number typed into the editor (`"price": 29`) renders the same as `"29"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(Map<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self(Map::new())
    }

    #[cfg(test)]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Non-blank text for `key`, if any.
    pub fn text(&self, key: &str) -> Option<String> {
        scalar_text(self.0.get(key)?).filter(|s| !s.trim().is_empty())
    }

    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    /// Text items of an array prop; non-scalar and blank entries are dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(scalar_text)
                .filter(|s| !s.trim().is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One element of a layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: ComponentType,
    pub props: Props,
    pub children: Vec<Node>,
    /// Top-level key when the node came from a keyed document.
    pub key: Option<String>,
    /// Fields other than `type`, `props` and `children`, written back untouched.
    pub extra: Map<String, Value>,
}

impl Node {
    #[cfg(test)]
    pub fn new(kind: ComponentType) -> Self {
        Self {
            kind,
            props: Props::new(),
            children: Vec::new(),
            key: None,
            extra: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Parses a node object. Non-objects yield `None`; malformed `props` or `children`
    /// fields degrade to empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let kind = match obj.get("type") {
            Some(Value::String(tag)) => ComponentType::from_tag(tag),
            _ => ComponentType::Unknown(String::new()),
        };

        let props = match obj.get("props") {
            Some(Value::Object(map)) => Props::from(map.clone()),
            _ => Props::new(),
        };

        let children = match obj.get("children") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    let child = Node::from_value(item);
                    if child.is_none() {
                        debug!("Dropping non-object child under {kind} node");
                    }
                    child
                })
                .collect(),
            _ => Vec::new(),
        };

        let extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "type" | "props" | "children"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            kind,
            props,
            children,
            key: None,
            extra,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if !self.kind.tag().is_empty() {
            obj.insert("type".to_string(), Value::String(self.kind.tag().to_string()));
        }
        if !self.props.is_empty() {
            obj.insert("props".to_string(), Value::Object(self.props.clone().into_map()));
        }
        if !self.children.is_empty() {
            obj.insert(
                "children".to_string(),
                Value::Array(self.children.iter().map(Node::to_value).collect()),
            );
        }
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}
