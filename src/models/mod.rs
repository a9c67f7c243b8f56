use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned annotation id.
///
/// The backend has been observed emitting both numeric and string ids; we
/// keep it opaque and normalise to a string on the way in.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AnnotationId(pub String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = match RawId::deserialize(deserializer)? {
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
            RawId::Text(s) => s,
        };
        Ok(Self(id))
    }
}

/// Client-side copy of a "smell" annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub line_index: usize,
    pub author_handle: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Author {
    pub screen_name: String,
}

/// One record of the initial annotation payload embedded by the hosting page.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SmellRecord {
    pub id: AnnotationId,
    #[serde(deserialize_with = "deserialize_line")]
    pub line: usize,
    pub author: Author,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLine {
    Num(u64),
    Text(String),
}

/// Line numbers arrive as integers or as numeric strings (`"4"`).
fn deserialize_line<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    use serde::de::Error;
    match RawLine::deserialize(deserializer)? {
        RawLine::Num(n) => usize::try_from(n).map_err(D::Error::custom),
        RawLine::Text(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| D::Error::custom(format!("invalid line {s:?}"))),
    }
}

impl From<SmellRecord> for Annotation {
    fn from(r: SmellRecord) -> Self {
        Self {
            id: r.id,
            line_index: r.line,
            author_handle: r.author.screen_name,
        }
    }
}

/// Decodes the initial payload record by record.
///
/// Only a payload that is not a JSON array fails as a whole; a malformed
/// record is logged and skipped so its siblings still load.
pub fn parse_smell_payload(raw: &str) -> Result<Vec<SmellRecord>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let records = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<SmellRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping smell record {i}: {e}");
                None
            }
        })
        .collect();
    Ok(records)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreatedSmell {
    pub id: AnnotationId,
}

/// The person looking at the page. Anonymous when the host supplied no handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewer {
    handle: Option<String>,
}

impl Viewer {
    pub fn new(handle: Option<String>) -> Self {
        Self {
            handle: handle.filter(|h| !h.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self { handle: None }
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.handle.is_none()
    }

    pub fn owns(&self, annotation: &Annotation) -> bool {
        self.handle() == Some(annotation.author_handle.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PreviewResponse {
    pub result: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MoreCodeRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub page: u32,
}

/// Codes are rendered by the page's own template, so each entry stays opaque.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MoreCodeResponse {
    #[serde(default)]
    pub codes: Vec<serde_json::Value>,
    #[serde(default)]
    pub no_more: bool,
}
