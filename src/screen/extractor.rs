use tracing::{debug, warn};

use crate::ai::error::ExtractionError;
use crate::screen::screen_model::{ChildNode, Dimensions, DocumentNode, Screen, ScreenContent};

/// Node types that count as a screen when they sit directly under a page.
const SCREEN_TYPES: [&str; 3] = ["FRAME", "COMPONENT", "SECTION"];

/// Container types that are walked through while looking for screens.
const PAGE_TYPES: [&str; 2] = ["DOCUMENT", "CANVAS"];

const INTERACTIVE_HINTS: [&str; 5] = ["button", "btn", "cta", "link", "action"];

/// Walk a document tree and return every screen in scan order.
///
/// Malformed screens are logged and skipped; the walk always continues.
pub fn extract_screens(root: &DocumentNode) -> Vec<Screen> {
    let mut screens = Vec::new();
    collect_screens(root, &mut screens);
    screens
}

fn collect_screens(node: &DocumentNode, out: &mut Vec<Screen>) {
    if is_screen(node) {
        match extract_screen(node) {
            Ok(screen) => out.push(screen),
            Err(e) => warn!(node = %node.name, error = %e, "skipping screen"),
        }
        return;
    }

    if PAGE_TYPES.contains(&node.node_type.as_str()) {
        for child in &node.children {
            collect_screens(child, out);
        }
    } else {
        debug!(node = %node.name, node_type = %node.node_type, "ignoring top-level node");
    }
}

fn is_screen(node: &DocumentNode) -> bool {
    SCREEN_TYPES.contains(&node.node_type.as_str())
}

/// Build the content record for a single screen node.
pub fn extract_screen(node: &DocumentNode) -> Result<Screen, ExtractionError> {
    let id = node
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ExtractionError::MissingId(node.name.clone()))?;

    let dimensions = dimensions_of(node)?;

    let mut text_content = Vec::new();
    let mut interactive_labels = Vec::new();
    for child in &node.children {
        walk_text(child, &mut text_content, &mut interactive_labels, false);
    }

    let child_nodes = node
        .children
        .iter()
        .map(|c| ChildNode {
            name: c.name.clone(),
            node_type: c.node_type.clone(),
        })
        .collect();

    Ok(Screen {
        id: id.to_string(),
        name: node.name.clone(),
        content: ScreenContent {
            text_content,
            child_nodes,
            dimensions,
        },
        interactive_labels,
    })
}

fn dimensions_of(node: &DocumentNode) -> Result<Dimensions, ExtractionError> {
    let width = node.width.unwrap_or(0.0);
    let height = node.height.unwrap_or(0.0);

    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(ExtractionError::InvalidDimensions {
            node: node.name.clone(),
            width,
            height,
        });
    }

    Ok(Dimensions { width, height })
}

fn walk_text(
    node: &DocumentNode,
    text: &mut Vec<String>,
    labels: &mut Vec<String>,
    inside_interactive: bool,
) {
    if node.visible == Some(false) {
        return;
    }

    let interactive = inside_interactive || is_interactive(node);

    if node.node_type == "TEXT" {
        if let Some(chars) = node.characters.as_deref() {
            let trimmed = chars.trim();
            if !trimmed.is_empty() {
                text.push(trimmed.to_string());
                if interactive {
                    labels.push(trimmed.to_string());
                }
            }
        }
    }

    for child in &node.children {
        walk_text(child, text, labels, interactive);
    }
}

fn is_interactive(node: &DocumentNode) -> bool {
    let name = node.name.to_lowercase();
    INTERACTIVE_HINTS.iter().any(|h| name.contains(h))
}

