//! HTML document model and the fragment walk.
//!
//! The document is parsed into an `RcDom`. A single depth-first traversal
//! collects every fragment candidate together with the inherited scope
//! (skip-context, `translate` override, `lang` hint); candidates are then
//! handed out grouped by source kind in the fixed visiting order, document
//! order within each kind.

use crate::classifier::{Classifier, SourceKind, TranslateOverride};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

const JSON_LD_TYPE: &str = "application/ld+json";

/// Inherited context of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub in_skip: bool,
    pub translate: Option<TranslateOverride>,
    pub lang: Option<String>,
}

/// Where a candidate's text lives in the tree.
#[derive(Debug, Clone)]
pub enum CandidateLocation {
    TextNode(Handle),
    Attribute { element: Handle, name: String },
    Script(Handle),
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: SourceKind,
    pub location: CandidateLocation,
    /// Parent tag, attribute name or meta field name.
    pub context: String,
    /// Owning element tag for attribute and metadata candidates.
    pub element: Option<String>,
    pub text: String,
    pub scope: Scope,
}

#[derive(Debug, Default)]
pub struct Candidates {
    pub text_nodes: Vec<Candidate>,
    pub attributes: Vec<Candidate>,
    pub metadata: Vec<Candidate>,
    pub titles: Vec<Candidate>,
    pub structured_data: Vec<Candidate>,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.text_nodes.len()
            + self.attributes.len()
            + self.metadata.len()
            + self.titles.len()
            + self.structured_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text nodes, attributes, metadata, title, structured data.
    pub fn into_visit_order(self) -> impl Iterator<Item = Candidate> {
        self.text_nodes
            .into_iter()
            .chain(self.attributes)
            .chain(self.metadata)
            .chain(self.titles)
            .chain(self.structured_data)
    }
}

pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    pub fn root(&self) -> Handle {
        self.dom.document.clone()
    }

    pub fn serialize(&self) -> io::Result<String> {
        let mut bytes = Vec::new();
        let document: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut bytes, &document, SerializeOpts::default())?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn collect_candidates(&self, classifier: &Classifier) -> Candidates {
        let mut candidates = Candidates::default();
        visit(&self.dom.document, &Scope::default(), classifier, &mut candidates);
        candidates
    }
}

fn visit(node: &Handle, scope: &Scope, classifier: &Classifier, out: &mut Candidates) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Element { name, attrs, .. } => {
                let tag = (&*name.local).to_ascii_lowercase();
                let attrs = attrs.borrow();
                let child_scope = element_scope(scope, &tag, &attrs, classifier);

                match tag.as_str() {
                    "script" => {
                        if is_json_ld(&attrs) {
                            out.structured_data.push(Candidate {
                                kind: SourceKind::StructuredData,
                                location: CandidateLocation::Script(child.clone()),
                                context: "$".to_string(),
                                element: Some(tag.clone()),
                                text: text_content(child),
                                scope: child_scope,
                            });
                        }
                        continue;
                    }
                    "style" => continue,
                    "title" => {
                        collect_title(child, &child_scope, out);
                        continue;
                    }
                    "meta" => {
                        collect_meta(child, &attrs, &child_scope, out);
                        continue;
                    }
                    _ => {}
                }

                for attr in attrs.iter() {
                    let attr_name = attr.name.local.to_string();
                    if matches!(attr_name.as_str(), "translate" | "lang" | "xml:lang" | "class") {
                        continue;
                    }
                    out.attributes.push(Candidate {
                        kind: SourceKind::Attribute,
                        location: CandidateLocation::Attribute {
                            element: child.clone(),
                            name: attr_name.clone(),
                        },
                        context: attr_name,
                        element: Some(tag.clone()),
                        text: attr.value.to_string(),
                        scope: child_scope.clone(),
                    });
                }

                drop(attrs);
                visit(child, &child_scope, classifier, out);
            }
            NodeData::Text { contents } => {
                let parent_tag = element_name(node).unwrap_or_default();
                out.text_nodes.push(Candidate {
                    kind: SourceKind::TextNode,
                    location: CandidateLocation::TextNode(child.clone()),
                    context: parent_tag,
                    element: None,
                    text: contents.borrow().to_string(),
                    scope: scope.clone(),
                });
            }
            // Comments, doctype and processing instructions are never fragments.
            _ => {}
        }
    }
}

fn element_scope(
    parent: &Scope,
    tag: &str,
    attrs: &[Attribute],
    classifier: &Classifier,
) -> Scope {
    let mut scope = parent.clone();
    if classifier.is_skip_tag(tag)
        || attr_value(attrs, "class").is_some_and(|class| classifier.has_skip_class(class))
    {
        scope.in_skip = true;
    }
    if let Some(translate) = attr_value(attrs, "translate").and_then(TranslateOverride::parse) {
        scope.translate = Some(translate);
    }
    if let Some(lang) = attr_value(attrs, "lang").or_else(|| attr_value(attrs, "xml:lang")) {
        let lang = lang.trim();
        if !lang.is_empty() {
            scope.lang = Some(lang.to_string());
        }
    }
    scope
}

fn collect_title(title: &Handle, scope: &Scope, out: &mut Candidates) {
    for child in title.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            out.titles.push(Candidate {
                kind: SourceKind::Title,
                location: CandidateLocation::TextNode(child.clone()),
                context: "title".to_string(),
                element: None,
                text: contents.borrow().to_string(),
                scope: scope.clone(),
            });
        }
    }
}

fn collect_meta(meta: &Handle, attrs: &[Attribute], scope: &Scope, out: &mut Candidates) {
    let Some(field) = attr_value(attrs, "name").or_else(|| attr_value(attrs, "property")) else {
        return;
    };
    let Some(content) = attr_value(attrs, "content") else {
        return;
    };
    out.metadata.push(Candidate {
        kind: SourceKind::Metadata,
        location: CandidateLocation::Attribute {
            element: meta.clone(),
            name: "content".to_string(),
        },
        context: field.trim().to_string(),
        element: Some("meta".to_string()),
        text: content.to_string(),
        scope: scope.clone(),
    });
}

fn is_json_ld(attrs: &[Attribute]) -> bool {
    attr_value(attrs, "type")
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
}

fn attr_value<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some((&*name.local).to_ascii_lowercase()),
        _ => None,
    }
}

/// Concatenated text of the direct text children.
pub fn text_content(node: &Handle) -> String {
    node.children
        .borrow()
        .iter()
        .filter_map(|child| match &child.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        })
        .collect()
}

/// Replace the text children of `node` with a single text node holding `text`.
pub fn set_text_content(node: &Handle, text: &str) {
    let mut children = node.children.borrow_mut();
    let mut replaced = false;
    children.retain(|child| match &child.data {
        NodeData::Text { contents } => {
            if replaced {
                false
            } else {
                *contents.borrow_mut() = StrTendril::from_slice(text);
                replaced = true;
                true
            }
        }
        _ => true,
    });
    if !replaced {
        let text_node = Node::new(NodeData::Text {
            contents: RefCell::new(StrTendril::from_slice(text)),
        });
        text_node.parent.set(Some(Rc::downgrade(node)));
        children.push(text_node);
    }
}
