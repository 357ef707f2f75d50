//! XML export store
//!
//! The export root holds one element per item. Every leaf element under an
//! item contributes its cleaned text to a multi-valued field named after
//! the element, so repeated elements accumulate instead of overwriting.
//! Compound items carry their pages under `structure/page` (or
//! `structure/node/page` in exports with an extra node level); each page
//! has a `pagemetadata` subtree plus `pagetitle` and `pageptr` siblings.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::RecordSource;
use crate::cleanup::cleanup_string;
use crate::error::{MetadataError, Result};
use crate::record::{
    FieldMap, FieldValue, Record, MARKUP_ID_FIELD, PAGE_POINTER_FIELD, PAGE_TITLE_FIELD,
};

const STRUCTURE_TAG: &str = "structure";
const NODE_TAG: &str = "node";
const PAGE_TAG: &str = "page";
const PAGE_METADATA_TAG: &str = "pagemetadata";

/// Parsed XML element: tag name, its own text, and child elements
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Descendants reached by following `path` one child level per step
    fn find_all<'a>(&'a self, path: &[&str]) -> Vec<&'a Element> {
        let mut current = vec![self];
        for step in path {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(|c| c.name == *step))
                .collect();
        }
        current
    }

    /// Visit every descendant, skipping subtrees rooted at `skip`
    fn walk<'a>(&'a self, skip: Option<&str>, visit: &mut dyn FnMut(&'a Element)) {
        for child in &self.children {
            if Some(child.name.as_str()) == skip {
                continue;
            }
            visit(child);
            child.walk(skip, visit);
        }
    }
}

/// Read the whole document into an element tree
fn parse_tree(xml: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => {
                return Err(MetadataError::MalformedMarkup(
                    "more than one root element".to_string(),
                ))
            }
        }
        Ok(())
    }

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::new(name))?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    MetadataError::MalformedMarkup("unexpected closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(MetadataError::MalformedMarkup(format!(
            "element <{}> is never closed",
            open.name
        )));
    }
    root.ok_or_else(|| MetadataError::MalformedMarkup("document has no root element".to_string()))
}

fn push_cleaned(fields: &mut FieldMap, element: &Element) {
    let text = cleanup_string(&element.text);
    if !text.is_empty() {
        fields.entry(element.name.clone()).or_default().push(text);
    }
}

/// One page of a compound item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    fields: FieldMap,
}

impl PageRecord {
    fn from_element(page: &Element) -> Self {
        let mut fields = FieldMap::new();
        if let Some(metadata) = page.child(PAGE_METADATA_TAG) {
            metadata.walk(None, &mut |e| push_cleaned(&mut fields, e));
        }

        // Title and pointer are always present, wrapped like every other field
        for name in [PAGE_TITLE_FIELD, PAGE_POINTER_FIELD] {
            let value = page
                .child(name)
                .map(|e| cleanup_string(&e.text))
                .unwrap_or_default();
            fields.insert(name.to_string(), vec![value]);
        }

        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn title(&self) -> &str {
        self.first(PAGE_TITLE_FIELD)
    }

    /// Identifier of the page's row in the tabular export
    pub fn pointer(&self) -> &str {
        self.first(PAGE_POINTER_FIELD)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &FieldMap {
        &self.fields
    }

    fn first(&self, name: &str) -> &str {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// One top-level item of the XML export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupRecord {
    data: FieldMap,
    pages: Vec<PageRecord>,
}

impl MarkupRecord {
    fn from_element(item: &Element) -> Self {
        let mut data = FieldMap::new();
        item.walk(Some(STRUCTURE_TAG), &mut |e| {
            if e.is_leaf() {
                push_cleaned(&mut data, e);
            }
        });

        let mut pages = item.find_all(&[STRUCTURE_TAG, PAGE_TAG]);
        if pages.is_empty() {
            pages = item.find_all(&[STRUCTURE_TAG, NODE_TAG, PAGE_TAG]);
        }
        let pages = pages.into_iter().map(PageRecord::from_element).collect();

        Self { data, pages }
    }

    /// Every value of `name` in document order
    pub fn as_list(&self, name: &str) -> Option<&[String]> {
        self.data.get(name).map(Vec::as_slice)
    }

    /// First value of the `cdmid` element
    pub fn id(&self) -> Option<&str> {
        self.data
            .get(MARKUP_ID_FIELD)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn data(&self) -> &FieldMap {
        &self.data
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    /// Record view rendered with `separator`, pages included
    ///
    /// This is the only rendered form of an item, so lookups through the
    /// store and through an engine agree once both use the same separator.
    pub fn to_record(&self, separator: &str) -> Record {
        let data = self
            .data
            .iter()
            .map(|(name, values)| (name.clone(), FieldValue::Multi(values.clone())))
            .collect();
        let pages = self.pages.iter().map(|p| p.fields.clone()).collect();
        Record::with_separator(data, pages, separator)
    }
}

/// All items of one XML export
#[derive(Debug, Clone)]
pub struct MarkupRecordStore {
    path: PathBuf,
    fields: BTreeSet<String>,
    records: Vec<MarkupRecord>,
}

impl MarkupRecordStore {
    /// Load and parse the export at `path`
    ///
    /// # Errors
    ///
    /// `InputNotFound` if the file does not exist; `Markup` or
    /// `MalformedMarkup` if the document cannot be parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MetadataError::InputNotFound(path.to_path_buf()));
        }
        let xml = std::fs::read(path)?;
        let mut store = Self::parse(&xml)?;
        store.path = path.to_path_buf();

        debug!(
            path = %path.display(),
            records = store.records.len(),
            pages = store.records.iter().map(|r| r.pages.len()).sum::<usize>(),
            fields = store.fields.len(),
            "Loaded markup export"
        );
        Ok(store)
    }

    /// Parse an export held in memory
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = parse_tree(xml)?;

        // First pass: every leaf tag outside the page structure
        let mut fields = BTreeSet::new();
        for item in &root.children {
            item.walk(Some(STRUCTURE_TAG), &mut |e| {
                if e.is_leaf() {
                    fields.insert(e.name.clone());
                }
            });
        }

        // Second pass: one record per item
        let records = root.children.iter().map(MarkupRecord::from_element).collect();

        Ok(Self {
            path: PathBuf::new(),
            fields,
            records,
        })
    }

    /// Source file the store was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarkupRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[MarkupRecord] {
        &self.records
    }

    /// Each item's own fields followed by each of its pages, in order
    ///
    /// Used to count the units a matching tabular export must describe.
    pub fn parts(&self) -> impl Iterator<Item = &FieldMap> {
        self.records.iter().flat_map(|record| {
            std::iter::once(&record.data).chain(record.pages.iter().map(|p| &p.fields))
        })
    }

    /// Total number of pages across all items
    pub fn page_count(&self) -> usize {
        self.records.iter().map(|r| r.pages.len()).sum()
    }
}

impl RecordSource for MarkupRecordStore {
    type Record = MarkupRecord;

    fn load_data(path: &Path) -> Result<Self> {
        Self::open(path)
    }

    fn get_record(&self, id: impl Display) -> Result<&MarkupRecord> {
        let id = id.to_string();
        self.records
            .iter()
            .find(|record| record.id() == Some(id.as_str()))
            .ok_or(MetadataError::RecordNotFound(id))
    }

    /// Sorted leaf tag names found while loading
    fn fields(&self) -> Result<Vec<String>> {
        Ok(self.fields.iter().cloned().collect())
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

impl<'a> IntoIterator for &'a MarkupRecordStore {
    type Item = &'a MarkupRecord;
    type IntoIter = std::slice::Iter<'a, MarkupRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <record>
    <title>Atlas</title>
    <unmapped>A1</unmapped>
    <unmapped>Drawer 3</unmapped>
    <cdmid>20</cdmid>
    <structure>
      <node>
        <nodetitle>Volume 1</nodetitle>
        <page>
          <pagetitle>Plate 1</pagetitle>
          <pageptr>18</pageptr>
          <pagemetadata>
            <title>Plate 1</title>
            <description>Coast &amp; interior</description>
          </pagemetadata>
        </page>
        <page>
          <pagetitle>Plate 2</pagetitle>
          <pageptr>19</pageptr>
          <pagemetadata/>
        </page>
      </node>
    </structure>
  </record>
  <record>
    <title>Loose sheet</title>
    <cdmid>21</cdmid>
    <cdmoclc/>
  </record>
</metadata>"#;

    #[test]
    fn test_node_fallback_finds_pages() {
        let store = MarkupRecordStore::parse(NESTED.as_bytes()).unwrap();
        let atlas = store.get_record(20).unwrap();

        assert_eq!(atlas.pages().len(), 2);
        assert_eq!(atlas.pages()[0].title(), "Plate 1");
        assert_eq!(atlas.pages()[1].pointer(), "19");
        assert_eq!(
            atlas.pages()[0].get("description").unwrap(),
            ["Coast & interior".to_string()]
        );
    }

    #[test]
    fn test_page_without_metadata_keeps_title_and_pointer() {
        let store = MarkupRecordStore::parse(NESTED.as_bytes()).unwrap();
        let page = &store.get_record(20).unwrap().pages()[1];
        let names: Vec<_> = page.fields().collect();
        assert_eq!(names, vec![PAGE_POINTER_FIELD, PAGE_TITLE_FIELD]);
    }

    #[test]
    fn test_structure_subtree_excluded_from_item_fields() {
        let store = MarkupRecordStore::parse(NESTED.as_bytes()).unwrap();
        let atlas = store.get_record(20).unwrap();

        assert!(atlas.as_list("nodetitle").is_none());
        assert!(atlas.as_list(PAGE_TITLE_FIELD).is_none());
        assert!(!store.has_field("nodetitle"));
        assert!(!store.has_field(PAGE_POINTER_FIELD));
    }

    #[test]
    fn test_empty_leaf_is_a_field_but_not_a_value() {
        let store = MarkupRecordStore::parse(NESTED.as_bytes()).unwrap();
        assert!(store.has_field("cdmoclc"));
        assert!(store.get_record(21).unwrap().as_list("cdmoclc").is_none());
    }

    #[test]
    fn test_repeated_elements_accumulate() {
        let store = MarkupRecordStore::parse(NESTED.as_bytes()).unwrap();
        let atlas = store.get_record("20").unwrap().to_record("; ");
        assert_eq!(atlas.get("unmapped").unwrap(), "A1; Drawer 3");
        assert_eq!(atlas.get("title").unwrap(), "Atlas");

        let atlas = store.get_record(20).unwrap().to_record("|");
        assert_eq!(atlas.get("unmapped").unwrap(), "A1|Drawer 3");
    }

    #[test]
    fn test_parts_counts_items_and_pages() {
        let store = MarkupRecordStore::parse(NESTED.as_bytes()).unwrap();
        assert_eq!(store.parts().count(), 4);
        assert_eq!(store.page_count(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let result = MarkupRecordStore::parse(b"<metadata><record><title>x</title>");
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_close_is_an_error() {
        let result = MarkupRecordStore::parse(b"<metadata><record></metadata>");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(matches!(
            MarkupRecordStore::parse(b""),
            Err(MetadataError::MalformedMarkup(_))
        ));
    }
}
