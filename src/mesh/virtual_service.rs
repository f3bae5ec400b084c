//! VirtualService model and rule extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::admission::{AdmissionRequest, DecodeError, GroupVersionKind};

/// API group that owns VirtualService.
pub const ISTIO_NETWORKING_GROUP: &str = "networking.istio.io";

/// Served versions of the VirtualService API.
pub const VIRTUAL_SERVICE_VERSIONS: &[&str] = &["v1alpha3", "v1beta1", "v1"];

pub const VIRTUAL_SERVICE_KIND: &str = "VirtualService";

/// A string matcher: at most one of `exact`, `prefix` or `regex`.
///
/// An empty matcher (`{}`) carries no condition on the value; on a header it
/// asks only that the header be present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "MatchFields", into = "MatchFields")]
pub enum StringMatch {
    Exact(String),
    Prefix(String),
    Regex(String),
    Any,
}

impl StringMatch {
    /// The prefix value, when this is a prefix matcher.
    pub fn as_prefix(&self) -> Option<&str> {
        match self {
            StringMatch::Prefix(prefix) => Some(prefix),
            StringMatch::Exact(_) | StringMatch::Regex(_) | StringMatch::Any => None,
        }
    }
}

/// Wire shape of a `StringMatch`.
#[derive(Debug, Default, Deserialize, Serialize)]
struct MatchFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    regex: Option<String>,
}

impl TryFrom<MatchFields> for StringMatch {
    type Error = String;

    fn try_from(fields: MatchFields) -> Result<Self, Self::Error> {
        match (fields.exact, fields.prefix, fields.regex) {
            (None, None, None) => Ok(StringMatch::Any),
            (Some(exact), None, None) => Ok(StringMatch::Exact(exact)),
            (None, Some(prefix), None) => Ok(StringMatch::Prefix(prefix)),
            (None, None, Some(regex)) => Ok(StringMatch::Regex(regex)),
            _ => Err("string match sets more than one of exact, prefix, regex".to_string()),
        }
    }
}

impl From<StringMatch> for MatchFields {
    fn from(matcher: StringMatch) -> Self {
        match matcher {
            StringMatch::Exact(exact) => MatchFields {
                exact: Some(exact),
                ..Default::default()
            },
            StringMatch::Prefix(prefix) => MatchFields {
                prefix: Some(prefix),
                ..Default::default()
            },
            StringMatch::Regex(regex) => MatchFields {
                regex: Some(regex),
                ..Default::default()
            },
            StringMatch::Any => MatchFields::default(),
        }
    }
}

/// One match condition of an HTTP route.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<StringMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<StringMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<StringMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<StringMatch>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, StringMatch>,

    #[serde(default)]
    pub ignore_uri_case: bool,
}

/// Port on a destination service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortSelector {
    #[serde(default)]
    pub number: u32,
}

/// Where matching traffic is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Destination {
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortSelector>,
}

/// A weighted destination of an HTTP route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpRouteDestination {
    pub destination: Destination,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

/// One entry of `spec.http`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HttpRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<HttpMatchRequest>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<HttpRouteDestination>,
}

impl HttpRoute {
    /// URI prefixes declared by this route's match conditions, in order.
    pub fn uri_prefixes(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter_map(|m| m.uri.as_ref())
            .filter_map(StringMatch::as_prefix)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VirtualServiceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gateways: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http: Vec<HttpRoute>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// The routing resource under review.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: VirtualServiceSpec,
}

impl VirtualService {
    /// `namespace/name` for log lines, with placeholders for missing parts.
    pub fn display_name(&self) -> String {
        format!(
            "{}/{}",
            self.metadata.namespace.as_deref().unwrap_or("-"),
            self.metadata.name.as_deref().unwrap_or("-")
        )
    }
}

/// Decode the object carried by an admission request as a VirtualService.
///
/// The object's own `apiVersion`/`kind` decide its type; when either is
/// absent the request's `kind` fills in, mirroring a default-GVK decode.
pub fn decode_object(request: &AdmissionRequest) -> Result<VirtualService, DecodeError> {
    let raw = request.object()?;
    let vs = VirtualService::deserialize(raw.as_value()).map_err(|source| {
        DecodeError::Malformed {
            what: "VirtualService",
            source,
        }
    })?;

    let gvk = apparent_kind(&vs, &request.kind);
    let recognized = gvk.group == ISTIO_NETWORKING_GROUP
        && VIRTUAL_SERVICE_VERSIONS.contains(&gvk.version.as_str())
        && gvk.kind == VIRTUAL_SERVICE_KIND;
    if !recognized {
        return Err(DecodeError::UnexpectedKind {
            expected: format!("{}, Kind={}", ISTIO_NETWORKING_GROUP, VIRTUAL_SERVICE_KIND),
            found: gvk.to_string(),
        });
    }

    Ok(vs)
}

fn apparent_kind(vs: &VirtualService, fallback: &GroupVersionKind) -> GroupVersionKind {
    let mut gvk = match &vs.api_version {
        Some(api_version) => GroupVersionKind::from_api_version(api_version, ""),
        None => GroupVersionKind {
            group: fallback.group.clone(),
            version: fallback.version.clone(),
            kind: String::new(),
        },
    };
    gvk.kind = vs.kind.clone().unwrap_or_else(|| fallback.kind.clone());
    gvk
}

/// The ordered HTTP routes of a VirtualService. Never fails.
pub fn extract_routes(vs: &VirtualService) -> &[HttpRoute] {
    &vs.spec.http
}
