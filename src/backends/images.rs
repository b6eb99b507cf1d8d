//! Pictogram image download for export

use reqwest::blocking::Client;

use crate::board::model::PictogramRef;

/// Source of pictogram image bytes.
///
/// `None` means the image is unavailable; the exporter then renders the
/// caption alone.
pub trait ImageSource {
    fn fetch(&self, picto: &PictogramRef) -> Option<Vec<u8>>;
}

/// Downloads `<base>/{id}` (PNG)
pub struct HttpImageSource {
    http: Client,
    base: String,
}

impl HttpImageSource {
    pub fn new(http: Client, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
        }
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, picto: &PictogramRef) -> Option<Vec<u8>> {
        let url = picto.url(&self.base);
        let response = match self.http.get(&url).send() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "image download failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(url = %url, status = response.status().as_u16(), "image not available");
            return None;
        }

        match response.bytes() {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "image body unreadable");
                None
            }
        }
    }
}

/// Never returns images; export renders captions only
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn fetch(&self, _picto: &PictogramRef) -> Option<Vec<u8>> {
        None
    }
}
