use bytes::Bytes;

/// Where the caller's audio comes from. Built once per HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionRequest {
    /// Bytes already buffered by the HTTP layer.
    Upload { bytes: Bytes, source_name: String },
    /// Remote file fetched with one GET.
    Url { location: String },
}

/// The two input fields a request can be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Upload,
    Url,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Url => "url",
        }
    }
}

impl ConversionRequest {
    /// Builds an upload request from the `audio` field, if one was sent.
    ///
    /// An empty payload still counts as present; the transcoder decides
    /// whether it is usable.
    pub fn from_upload(bytes: Option<Bytes>, source_name: Option<String>) -> Option<Self> {
        bytes.map(|bytes| Self::Upload {
            bytes,
            source_name: source_name.unwrap_or_else(|| "upload".to_string()),
        })
    }

    /// Builds a URL request. Blank URLs count as missing.
    pub fn from_url(url: Option<String>) -> Option<Self> {
        url.map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map(|location| Self::Url { location })
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Upload { .. } => InputKind::Upload,
            Self::Url { .. } => InputKind::Url,
        }
    }
}

/// Raw input ready for the transcoder.
#[derive(Debug, Clone)]
pub struct AcquiredInput {
    pub bytes: Bytes,
    /// Upload file name or the URL it came from, for logs.
    pub source_name: String,
}
