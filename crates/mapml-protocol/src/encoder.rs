//! MapML XML serialization using quick-xml's event writer.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use mapml_common::{MapmlError, MapmlResult};

use crate::document::{Datalist, Extent, ExtentNode, Head, Input, Link, MapMlDocument, Meta};

/// XHTML namespace carried by the `mapml-` root.
pub const MAPML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serialize a document to MapML text.
pub fn encode_mapml(doc: &MapMlDocument) -> MapmlResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("mapml-");
    root.push_attribute(("xmlns", MAPML_NAMESPACE));
    write(&mut writer, Event::Start(root))?;

    write_head(&mut writer, &doc.head)?;

    write(&mut writer, Event::Start(BytesStart::new("map-body")))?;
    for extent in &doc.body.extents {
        write_extent(&mut writer, extent)?;
    }
    write(&mut writer, Event::End(BytesEnd::new("map-body")))?;
    write(&mut writer, Event::End(BytesEnd::new("mapml-")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| MapmlError::EncodingError(e.to_string()))
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> MapmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| MapmlError::EncodingError(e.to_string()))
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> MapmlResult<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_head(writer: &mut XmlWriter, head: &Head) -> MapmlResult<()> {
    write(writer, Event::Start(BytesStart::new("map-head")))?;
    write_text_element(writer, "map-title", &head.title)?;

    let mut base = BytesStart::new("map-base");
    base.push_attribute(("href", head.base.as_str()));
    write(writer, Event::Empty(base))?;

    for meta in &head.metas {
        write(writer, Event::Empty(meta_element(meta)))?;
    }
    for link in &head.links {
        write(writer, Event::Empty(link_element(link)))?;
    }
    write(writer, Event::End(BytesEnd::new("map-head")))
}

fn meta_element(meta: &Meta) -> BytesStart<'static> {
    let mut elem = BytesStart::new("map-meta");
    match meta {
        Meta::Charset { charset } => elem.push_attribute(("charset", charset.as_str())),
        Meta::HttpEquiv { http_equiv, content } => {
            elem.push_attribute(("http-equiv", http_equiv.as_str()));
            elem.push_attribute(("content", content.as_str()));
        }
        Meta::Named { name, content } => {
            elem.push_attribute(("name", name.as_str()));
            elem.push_attribute(("content", content.as_str()));
        }
    }
    elem
}

fn link_element(link: &Link) -> BytesStart<'static> {
    let mut elem = BytesStart::new("map-link");
    elem.push_attribute(("rel", link.rel.as_str()));
    if let Some(media_type) = &link.media_type {
        elem.push_attribute(("type", media_type.as_str()));
    }
    if let Some(projection) = link.projection {
        elem.push_attribute(("projection", projection.name()));
    }
    if let Some(tref) = &link.tref {
        elem.push_attribute(("tref", tref.as_str()));
    }
    if let Some(href) = &link.href {
        elem.push_attribute(("href", href.as_str()));
    }
    elem
}

fn input_element(input: &Input) -> BytesStart<'static> {
    let mut elem = BytesStart::new("map-input");
    elem.push_attribute(("name", input.name.as_str()));
    elem.push_attribute(("type", input.input_type.as_str()));
    if let Some(units) = input.units {
        elem.push_attribute(("units", units.as_str()));
    }
    if let Some(axis) = input.axis {
        elem.push_attribute(("axis", axis.as_str()));
    }
    if let Some(position) = input.position {
        elem.push_attribute(("position", position.as_str()));
    }
    if let Some(list) = &input.list {
        elem.push_attribute(("list", list.as_str()));
    }
    if input.shard {
        elem.push_attribute(("shard", "true"));
    }
    if let Some(min) = input.min {
        elem.push_attribute(("min", min.to_string().as_str()));
    }
    if let Some(max) = input.max {
        elem.push_attribute(("max", max.to_string().as_str()));
    }
    if let Some(value) = &input.value {
        elem.push_attribute(("value", value.as_str()));
    }
    elem
}

fn write_datalist(writer: &mut XmlWriter, list: &Datalist) -> MapmlResult<()> {
    let mut elem = BytesStart::new("map-datalist");
    elem.push_attribute(("id", list.id.as_str()));
    write(writer, Event::Start(elem))?;
    for (label, value) in &list.options {
        let mut option = BytesStart::new("map-option");
        option.push_attribute(("value", value.as_str()));
        write(writer, Event::Start(option))?;
        write(writer, Event::Text(BytesText::new(label)))?;
        write(writer, Event::End(BytesEnd::new("map-option")))?;
    }
    write(writer, Event::End(BytesEnd::new("map-datalist")))
}

fn write_extent(writer: &mut XmlWriter, extent: &Extent) -> MapmlResult<()> {
    let mut elem = BytesStart::new("map-extent");
    elem.push_attribute(("units", extent.units.name()));
    if let Some(label) = &extent.label {
        elem.push_attribute(("label", label.as_str()));
    }
    if extent.checked {
        elem.push_attribute(("checked", "checked"));
    }
    if extent.hidden {
        elem.push_attribute(("hidden", "hidden"));
    }
    write(writer, Event::Start(elem))?;

    for node in &extent.nodes {
        match node {
            ExtentNode::Input(input) => write(writer, Event::Empty(input_element(input)))?,
            ExtentNode::Link(link) => write(writer, Event::Empty(link_element(link)))?,
            ExtentNode::Datalist(list) => write_datalist(writer, list)?,
        }
    }

    write(writer, Event::End(BytesEnd::new("map-extent")))
}
