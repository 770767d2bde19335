//! Wire-format layer for the tracker's attribute/relation XML.
//!
//! Read side: `<Asset id="Type:NNN" href="...">` elements containing
//! `<Attribute name="Field">text</Attribute>` children, multi-valued
//! attributes nested as `<Attribute><Value>a</Value><Value>b</Value></Attribute>`,
//! and list responses wrapping repeated `<Asset>` elements in a collection
//! root. Relation subtrees inside an asset are skipped.
//!
//! Write side: small update documents of the shape
//! `<Asset><Attribute name="X" act="set">v</Attribute>...</Asset>` with
//! relation diffs as `<Relation name="R"><Asset idref="ID" act="..."/></Relation>`.

use crate::error::{Result, TrackerError};
use crate::types::{AttrValue, RawAsset};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Parse every `<Asset>` element in document order. An empty document is an
/// empty vec, not an error.
pub fn parse_asset_list(doc: &str) -> Result<Vec<RawAsset>> {
    let mut reader = Reader::from_str(doc);
    reader.config_mut().trim_text(true);

    let mut assets = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"Asset" => {
                assets.push(read_asset(&mut reader, &e)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"Asset" => {
                assets.push(asset_header(&e)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(assets)
}

/// First `<Asset>` element, or `None` for a genuinely empty collection.
/// Callers translate `None` into their own `NotFound`.
pub fn parse_first_asset(doc: &str) -> Result<Option<RawAsset>> {
    Ok(parse_asset_list(doc)?.into_iter().next())
}

/// Read the `id`/`href` attributes off an `<Asset>` start tag.
fn asset_header(start: &BytesStart) -> Result<RawAsset> {
    let oid = attr_value(start, "id")?.ok_or_else(|| TrackerError::malformed("Asset@id"))?;
    let href = attr_value(start, "href")?;
    Ok(RawAsset {
        oid,
        href,
        attrs: Vec::new(),
    })
}

/// Consume one `<Asset>` subtree, collecting its direct `<Attribute>`
/// children. `<Relation>` subtrees (which contain their own nested `<Asset>`
/// stubs) are skipped wholesale.
fn read_asset(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<RawAsset> {
    let mut asset = asset_header(start)?;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"Attribute" => {
                asset.attrs.push(read_attribute(reader, &e)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"Attribute" => {
                let name = attribute_name(&e)?;
                asset.attrs.push((name, AttrValue::Scalar(String::new())));
            }
            Event::Start(e) => {
                // Relation or other subtree: skip to its end tag.
                let end = e.to_end().into_owned();
                reader.read_to_end(end.name())?;
            }
            Event::End(e) if e.name().as_ref() == b"Asset" => break,
            Event::Eof => return Err(TrackerError::malformed("Asset")),
            _ => {}
        }
    }
    Ok(asset)
}

fn attribute_name(start: &BytesStart) -> Result<String> {
    attr_value(start, "name")?.ok_or_else(|| TrackerError::malformed("Attribute@name"))
}

/// One `<Attribute>`: scalar text, or a list when `<Value>` children appear.
fn read_attribute(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<(String, AttrValue)> {
    let name = attribute_name(start)?;
    let mut text = String::new();
    let mut values: Vec<String> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"Value" => {
                values.push(read_text(reader, b"Value")?);
            }
            Event::Empty(e) if e.name().as_ref() == b"Value" => {
                values.push(String::new());
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(e) if e.name().as_ref() == b"Attribute" => break,
            Event::Eof => return Err(TrackerError::malformed(name)),
            _ => {}
        }
    }
    let value = if values.is_empty() {
        AttrValue::Scalar(text)
    } else {
        AttrValue::List(values)
    };
    Ok((name, value))
}

/// Accumulate text until the named end tag.
fn read_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String> {
    let mut out = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => out.push_str(&t.unescape()?),
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Eof => return Err(TrackerError::malformed("Value")),
            _ => {}
        }
    }
    Ok(out)
}

fn attr_value(start: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

fn set_attribute(field: &str, value: &str) -> String {
    format!(
        r#"<Attribute name="{}" act="set">{}</Attribute>"#,
        escape(field),
        escape(value)
    )
}

/// Overwrite one scalar attribute.
pub fn update_document(field: &str, value: &str) -> String {
    format!("<Asset>{}</Asset>", set_attribute(field, value))
}

/// New-asset document: Name, Scope and Description.
pub fn create_document(title: &str, project_id: &str, description: &str) -> String {
    format!(
        "<Asset>{}{}{}</Asset>",
        set_attribute("Name", title),
        set_attribute("Scope", &format!("Scope:{project_id}")),
        set_attribute("Description", description),
    )
}

/// Relation diff: `act` is one of `add`, `remove`, `set`.
pub fn relation_document(relation: &str, target_oid: &str, act: &str) -> String {
    format!(
        r#"<Asset><Relation name="{}"><Asset idref="{}" act="{}"/></Relation></Asset>"#,
        escape(relation),
        escape(target_oid),
        act,
    )
}

/// Link-asset document: attributes plus the relation to its target asset.
pub fn link_document(name: &str, url: &str, on_menu: bool, target_oid: &str) -> String {
    format!(
        r#"<Asset>{}{}{}<Relation name="Asset"><Asset idref="{}" act="set"/></Relation></Asset>"#,
        set_attribute("Name", name),
        set_attribute("URL", url),
        set_attribute("OnMenu", if on_menu { "true" } else { "false" }),
        escape(target_oid),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_DOC: &str = r#"<Assets total="2">
  <Asset href="/Data/Defect/1234" id="Defect:1234">
    <Attribute name="Name">Broken &amp; busted</Attribute>
    <Attribute name="Number">D-01234</Attribute>
    <Attribute name="Status.Name">In Progress</Attribute>
    <Attribute name="Owners.Name"><Value>alice</Value><Value>bob</Value></Attribute>
    <Relation name="Scope"><Asset href="/Data/Scope/0" idref="Scope:0"/></Relation>
  </Asset>
  <Asset href="/Data/Defect/1235" id="Defect:1235">
    <Attribute name="Name">Second</Attribute>
    <Attribute name="Number">D-01235</Attribute>
    <Attribute name="Status.Name"/>
  </Asset>
</Assets>"#;

    #[test]
    fn list_parses_in_document_order() {
        let assets = parse_asset_list(LIST_DOC).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].oid, "Defect:1234");
        assert_eq!(assets[0].href.as_deref(), Some("/Data/Defect/1234"));
        assert_eq!(assets[1].oid, "Defect:1235");
    }

    #[test]
    fn scalar_text_is_unescaped() {
        let assets = parse_asset_list(LIST_DOC).unwrap();
        assert_eq!(
            assets[0].attr("Name"),
            Some(&AttrValue::Scalar("Broken & busted".into()))
        );
    }

    #[test]
    fn multi_valued_attribute_is_a_list() {
        let assets = parse_asset_list(LIST_DOC).unwrap();
        assert_eq!(
            assets[0].attr("Owners.Name"),
            Some(&AttrValue::List(vec!["alice".into(), "bob".into()]))
        );
    }

    #[test]
    fn relation_stubs_are_not_collected() {
        // The nested <Asset idref="Scope:0"/> inside the Relation must not
        // surface as a record of its own.
        let assets = parse_asset_list(LIST_DOC).unwrap();
        assert!(assets.iter().all(|a| a.oid.starts_with("Defect:")));
    }

    #[test]
    fn empty_attribute_is_empty_scalar() {
        let assets = parse_asset_list(LIST_DOC).unwrap();
        assert_eq!(
            assets[1].attr("Status.Name"),
            Some(&AttrValue::Scalar(String::new()))
        );
    }

    #[test]
    fn empty_collection_distinguishes_from_malformed() {
        assert_eq!(parse_first_asset(r#"<Assets total="0"></Assets>"#).unwrap(), None);
        assert!(parse_asset_list(r#"<Assets total="0"/>"#).unwrap().is_empty());
        assert!(matches!(
            parse_asset_list("<Assets><Asset id="),
            Err(TrackerError::Xml(_))
        ));
    }

    #[test]
    fn bare_asset_root_parses() {
        // The create endpoint answers with a bare <Asset> root.
        let doc = r#"<Asset href="/Data/Defect/4242" id="Defect:4242:105"/>"#;
        let asset = parse_first_asset(doc).unwrap().unwrap();
        assert_eq!(asset.oid, "Defect:4242:105");
        assert!(asset.attrs.is_empty());
    }

    #[test]
    fn asset_without_id_is_malformed() {
        let err = parse_asset_list(r#"<Assets><Asset href="/x"/></Assets>"#).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::MalformedResponse { field } if field == "Asset@id"
        ));
    }

    #[test]
    fn update_document_shape() {
        assert_eq!(
            update_document("Description", "a <b> & 'c'"),
            r#"<Asset><Attribute name="Description" act="set">a &lt;b&gt; &amp; &apos;c&apos;</Attribute></Asset>"#
        );
    }

    #[test]
    fn create_document_shape() {
        let doc = create_document("Title", "502342", "Desc");
        assert!(doc.starts_with("<Asset>"));
        assert!(doc.contains(r#"<Attribute name="Name" act="set">Title</Attribute>"#));
        assert!(doc.contains(r#"<Attribute name="Scope" act="set">Scope:502342</Attribute>"#));
        assert!(doc.contains(r#"<Attribute name="Description" act="set">Desc</Attribute>"#));
    }

    #[test]
    fn relation_document_shape() {
        assert_eq!(
            relation_document("Owners", "Member:20", "add"),
            r#"<Asset><Relation name="Owners"><Asset idref="Member:20" act="add"/></Relation></Asset>"#
        );
    }

    #[test]
    fn link_document_shape() {
        let doc = link_document("gerrit", "https://review/42", true, "Defect:1234");
        assert!(doc.contains(r#"<Attribute name="URL" act="set">https://review/42</Attribute>"#));
        assert!(doc.contains(r#"<Attribute name="OnMenu" act="set">true</Attribute>"#));
        assert!(doc.ends_with(
            r#"<Relation name="Asset"><Asset idref="Defect:1234" act="set"/></Relation></Asset>"#
        ));
    }
}
