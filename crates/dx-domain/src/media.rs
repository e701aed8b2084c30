//! Imagen adjunta a un envío: bytes, tipo declarado y tamaño.
//!
//! El tipo declarado se conserva tal cual llega (`MediaType::Other`) para que
//! sea el validador quien lo rechace; aquí no se decide nada.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Jpeg,
    Png,
    Other(String),
}

impl MediaType {
    /// Interpreta un MIME declarado (`image/jpeg`, `image/png`, ...).
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => MediaType::Jpeg,
            "image/png" => MediaType::Png,
            other => MediaType::Other(other.to_string()),
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => MediaType::Jpeg,
            "png" => MediaType::Png,
            other => MediaType::Other(other.to_string()),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(MediaType::from_extension)
            .unwrap_or_else(|| MediaType::Other(String::new()))
    }

    pub fn mime(&self) -> &str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Other(raw) => raw,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, MediaType::Jpeg | MediaType::Png)
    }
}

impl From<String> for MediaType {
    fn from(raw: String) -> Self {
        MediaType::from_mime(&raw)
    }
}

impl From<MediaType> for String {
    fn from(media: MediaType) -> Self {
        media.mime().to_string()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Contenido binario inmutable; clonar sólo copia el `Arc`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(with = "base64_bytes")]
    bytes: Arc<[u8]>,
    media_type: MediaType,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Arc<[u8]>>, media_type: MediaType) -> Self {
        Self { bytes: bytes.into(), media_type }
    }

    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn media_type(&self) -> &MediaType { &self.media_type }
    pub fn size_bytes(&self) -> u64 { self.bytes.len() as u64 }

    /// Digest sha256 del contenido en hex (minúsculas).
    pub fn sha256_hex(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

// No volcamos los bytes en logs ni en Debug.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
         .field("media_type", &self.media_type)
         .field("size_bytes", &self.size_bytes())
         .finish()
    }
}

mod base64_bytes {
    use std::sync::Arc;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Arc<[u8]>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Arc<[u8]>, D::Error> {
        let raw = String::deserialize(d)?;
        STANDARD.decode(raw.as_bytes())
                .map(Arc::from)
                .map_err(serde::de::Error::custom)
    }
}
