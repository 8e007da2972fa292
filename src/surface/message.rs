//! Display surface message protocol.
//!
//! The controller side and the surface side only talk through these
//! messages. Both directions serialize to tagged JSON so a webview bridge can
//! speak the same protocol:
//!
//! ```text
//! controller ──update / init / render-request / error──> surface
//! controller <──────────── render-result ─────────────── surface
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{ImageFormat, Theme};

/// Correlates a render request with its acknowledgement.
///
/// Only uniqueness per outstanding request is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Content delivered to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Messages into the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceMsg {
    /// Show content. Raw diagram source arriving here is rendered in-surface
    /// but never acknowledged; deferred renders use `RenderRequest`.
    Update {
        content: Payload,
        format: ImageFormat,
        theme: Theme,
    },
    /// (Re)initialize the in-surface engine. Idempotent.
    Init { theme: Theme },
    /// Render source in-surface and answer with exactly one `render-result`.
    RenderRequest {
        id: RequestId,
        source: String,
        theme: Theme,
    },
    /// Show an error state.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
}

/// Outcome of an in-surface render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderReply {
    Success { svg: String },
    Failure { message: String },
}

/// Messages out of the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceEvent {
    RenderResult { id: RequestId, reply: RenderReply },
}

macro_rules! json_codec {
    ($ty:ty) => {
        impl $ty {
            /// Serialize to JSON string
            pub fn to_json(&self) -> String {
                serde_json::to_string(self).unwrap_or_default()
            }

            /// Parse from JSON string
            pub fn from_json(s: &str) -> Option<Self> {
                serde_json::from_str(s).ok()
            }
        }
    };
}

json_codec!(SurfaceMsg);
json_codec!(SurfaceEvent);
