use serde::{Deserialize, Serialize};

/// Raw node as handed over by the document-tree provider.
///
/// Only the fields the extractor reads are modelled; everything else in the
/// provider's payload is ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Text payload of TEXT nodes.
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Text, direct children, and size of one screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenContent {
    pub text_content: Vec<String>,
    pub child_nodes: Vec<ChildNode>,
    pub dimensions: Dimensions,
}

/// One extracted screen, in document scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub content: ScreenContent,
    /// Labels of buttons, links and other interactive elements.
    pub interactive_labels: Vec<String>,
}

impl Screen {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: ScreenContent::default(),
            interactive_labels: vec![],
        }
    }

    pub fn with_content(mut self, content: ScreenContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_interactive_labels(mut self, labels: &[&str]) -> Self {
        self.interactive_labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }
}
