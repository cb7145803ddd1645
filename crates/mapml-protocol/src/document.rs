//! MapML document model.
//!
//! The model mirrors the MapML element tree closely enough that the XML
//! encoder is a straight walk over it. Extent children form a closed set of
//! node kinds, see [`ExtentNode`].

use serde::Serialize;

use mapml_common::TcrsId;

/// A complete MapML document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMlDocument {
    pub head: Head,
    pub body: Body,
}

impl MapMlDocument {
    pub fn title(&self) -> &str {
        &self.head.title
    }

    pub fn extents(&self) -> &[Extent] {
        &self.body.extents
    }

    /// Head links with the given relation.
    pub fn head_links(&self, rel: LinkRel) -> impl Iterator<Item = &Link> {
        self.head.links.iter().filter(move |l| l.rel == rel)
    }
}

/// `map-head`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Head {
    pub title: String,
    /// `map-base` href
    pub base: String,
    pub metas: Vec<Meta>,
    pub links: Vec<Link>,
}

/// `map-meta`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Meta {
    /// `<map-meta charset="..."/>`
    Charset { charset: String },
    /// `<map-meta http-equiv="..." content="..."/>`
    HttpEquiv { http_equiv: String, content: String },
    /// `<map-meta name="..." content="..."/>`
    Named { name: String, content: String },
}

impl Meta {
    pub fn named(name: &str, content: impl Into<String>) -> Self {
        Meta::Named {
            name: name.to_string(),
            content: content.into(),
        }
    }
}

/// `map-body`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Body {
    pub extents: Vec<Extent>,
}

/// `map-extent`: one mapped layer, layer group, or the whole request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extent {
    /// TCRS the templates are expressed in
    pub units: TcrsId,
    pub label: Option<String>,
    pub checked: bool,
    pub hidden: bool,
    pub nodes: Vec<ExtentNode>,
}

impl Extent {
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.nodes.iter().filter_map(|n| match n {
            ExtentNode::Link(link) => Some(link),
            _ => None,
        })
    }

    pub fn links_by_rel(&self, rel: LinkRel) -> impl Iterator<Item = &Link> {
        self.links().filter(move |l| l.rel == rel)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Input> {
        self.nodes.iter().filter_map(|n| match n {
            ExtentNode::Input(input) => Some(input),
            _ => None,
        })
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs().find(|i| i.name == name)
    }

    pub fn datalists(&self) -> impl Iterator<Item = &Datalist> {
        self.nodes.iter().filter_map(|n| match n {
            ExtentNode::Datalist(list) => Some(list),
            _ => None,
        })
    }
}

/// Child of a `map-extent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ExtentNode {
    Link(Link),
    Input(Input),
    Datalist(Datalist),
}

/// Link relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkRel {
    Image,
    Tile,
    Query,
    SelfStyle,
    Alternate,
}

impl LinkRel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkRel::Image => "image",
            LinkRel::Tile => "tile",
            LinkRel::Query => "query",
            LinkRel::SelfStyle => "self style",
            LinkRel::Alternate => "alternate",
        }
    }
}

/// `map-link`: a templated reference inside an extent, or a plain
/// reference in the head.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub rel: LinkRel,
    /// URL template with `{name}` placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<TcrsId>,
}

impl Link {
    pub fn template(rel: LinkRel, tref: String) -> Self {
        Self {
            rel,
            tref: Some(tref),
            href: None,
            media_type: None,
            projection: None,
        }
    }

    pub fn reference(rel: LinkRel, href: String, media_type: &str) -> Self {
        Self {
            rel,
            tref: None,
            href: Some(href),
            media_type: Some(media_type.to_string()),
            projection: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Zoom,
    Location,
    Width,
    Height,
    Hidden,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Zoom => "zoom",
            InputType::Location => "location",
            InputType::Width => "width",
            InputType::Height => "height",
            InputType::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Easting,
    Northing,
    Longitude,
    Latitude,
    Column,
    Row,
    I,
    J,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Easting => "easting",
            Axis::Northing => "northing",
            Axis::Longitude => "longitude",
            Axis::Latitude => "latitude",
            Axis::Column => "column",
            Axis::Row => "row",
            Axis::I => "i",
            Axis::J => "j",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Pcrs,
    Gcrs,
    Tilematrix,
    Tile,
    Map,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Pcrs => "pcrs",
            Units::Gcrs => "gcrs",
            Units::Tilematrix => "tilematrix",
            Units::Tile => "tile",
            Units::Map => "map",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }
}

/// `map-input`: a variable referenced by link templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Input {
    pub name: String,
    pub input_type: InputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Id of the datalist supplying values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    /// Marks the shard-server variable
    pub shard: bool,
}

impl Input {
    pub fn new(name: &str, input_type: InputType) -> Self {
        Self {
            name: name.to_string(),
            input_type,
            units: None,
            axis: None,
            position: None,
            min: None,
            max: None,
            value: None,
            list: None,
            shard: false,
        }
    }

    pub fn zoom(min: u32, max: u32) -> Self {
        Self {
            value: Some(max.to_string()),
            ..Self::new("z", InputType::Zoom).with_range(f64::from(min), f64::from(max))
        }
    }

    pub fn location(name: &str, units: Units, axis: Axis) -> Self {
        Self {
            units: Some(units),
            axis: Some(axis),
            ..Self::new(name, InputType::Location)
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// `map-datalist` with its options as (label, value) pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datalist {
    pub id: String,
    pub options: Vec<(String, String)>,
}
