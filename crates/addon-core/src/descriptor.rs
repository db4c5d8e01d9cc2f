//! Add-on list parsing.
//!
//! Two formats are understood. The XML form:
//!
//! ```xml
//! <add_on_products>
//!   <product_items>
//!     <product_item>
//!       <name>SLES-HA</name>
//!       <url>cd:/?devices=/dev/sr1</url>
//!       <path>/</path>
//!       <priority>50</priority>
//!       <confirm_license>true</confirm_license>
//!       <install_products><product>sle-ha</product></install_products>
//!     </product_item>
//!   </product_items>
//! </add_on_products>
//! ```
//!
//! and the plain form, one add-on per line: `url [product_dir [product ...]]`, with `#`
//! starting a comment line.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::{
    constants::DEFAULT_PRODUCT_DIR,
    error::{AddOnError, ErrorContext},
    types::AddOnDescriptor,
    AddOnResult,
};

/// Format of an add-on list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Xml,
    Plain,
    Other(String),
}

impl FromStr for SourceKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Self::Xml,
            "plain" => Self::Plain,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => write!(f, "xml"),
            Self::Plain => write!(f, "plain"),
            Self::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// An add-on list file and its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSource {
    pub file: PathBuf,
    pub kind: SourceKind,
}

impl DescriptorSource {
    pub fn new(file: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self {
            file: file.into(),
            kind,
        }
    }

    /// Guesses the format from the file extension; anything but `.xml` is plain.
    pub fn from_path(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let kind = match file.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => SourceKind::Xml,
            _ => SourceKind::Plain,
        };
        Self {
            file,
            kind,
        }
    }
}

/// Reads and parses an add-on list.
///
/// # Errors
///
/// * [`AddOnError::UnsupportedDescriptorSource`] for unknown formats, before reading
/// * [`AddOnError::IoError`] if the file cannot be read
/// * [`AddOnError::MalformedDescriptorSource`] if an XML list does not parse
pub fn read_source(source: &DescriptorSource) -> AddOnResult<Vec<AddOnDescriptor>> {
    if let SourceKind::Other(kind) = &source.kind {
        return Err(AddOnError::UnsupportedDescriptorSource {
            path: source.file.clone(),
            kind: kind.clone(),
        });
    }

    let content = fs::read_to_string(&source.file)
        .with_context(|| format!("reading add-on list {}", source.file.display()))?;

    let descriptors = match source.kind {
        SourceKind::Xml => parse_xml(&source.file, &content)?,
        _ => parse_plain(&content),
    };
    debug!(
        file = %source.file.display(),
        kind = %source.kind,
        count = descriptors.len(),
        "parsed add-on list"
    );
    Ok(descriptors)
}

/// Parses the plain add-on list format.
pub fn parse_plain(content: &str) -> Vec<AddOnDescriptor> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let mut descriptor = AddOnDescriptor::new(fields.next()?);
            if let Some(product_dir) = fields.next() {
                descriptor.product_dir = product_dir.to_string();
            }
            let products: Vec<String> = fields.map(str::to_string).collect();
            if !products.is_empty() {
                descriptor.install_products = Some(products);
            }
            Some(descriptor)
        })
        .collect()
}

/// Parses the XML add-on list format.
///
/// Items without a URL are skipped with a warning.
pub fn parse_xml(path: &Path, content: &str) -> AddOnResult<Vec<AddOnDescriptor>> {
    let malformed = |reason: String| {
        AddOnError::MalformedDescriptorSource {
            path: path.to_path_buf(),
            reason,
        }
    };

    let doc = Document::parse(content).map_err(|err| malformed(err.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "add_on_products" {
        return Err(malformed(format!(
            "expected <add_on_products>, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut descriptors = Vec::new();
    let items = elements(root)
        .filter(|node| node.tag_name().name() == "product_items")
        .flat_map(elements)
        .filter(|node| node.tag_name().name() == "product_item");

    for (index, item) in items.enumerate() {
        match parse_item(item).map_err(malformed)? {
            Some(descriptor) => descriptors.push(descriptor),
            None => warn!(item = index, "skipping add-on entry without URL"),
        }
    }

    Ok(descriptors)
}

fn parse_item(item: Node) -> Result<Option<AddOnDescriptor>, String> {
    let Some(url) = child_text(item, "url") else {
        return Ok(None);
    };

    let mut descriptor = AddOnDescriptor::new(url);
    descriptor.product_dir =
        child_text(item, "path").unwrap_or_else(|| DEFAULT_PRODUCT_DIR.to_string());
    if let Some(priority) = child_text(item, "priority") {
        descriptor.priority = priority
            .parse()
            .map_err(|_| format!("invalid priority `{priority}`"))?;
    }
    descriptor.name = child_text(item, "name");
    descriptor.alias = child_text(item, "alias");
    descriptor.confirm_license = child_bool(item, "confirm_license")?;
    if let Some(check_name) = child_bool(item, "check_name")? {
        descriptor.check_name = check_name;
    }

    if let Some(list) = elements(item).find(|node| node.tag_name().name() == "install_products") {
        let products: Vec<String> = elements(list)
            .filter(|node| node.tag_name().name() == "product")
            .filter_map(text_of)
            .collect();
        if !products.is_empty() {
            descriptor.install_products = Some(products);
        }
    }

    Ok(Some(descriptor))
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn text_of(node: Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn child_text(node: Node, name: &str) -> Option<String> {
    elements(node)
        .find(|child| child.tag_name().name() == name)
        .and_then(text_of)
}

fn child_bool(node: Node, name: &str) -> Result<Option<bool>, String> {
    let Some(value) = child_text(node, name) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        _ => Err(format!("invalid boolean `{value}` for <{name}>")),
    }
}
