use image::GenericImageView;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Hosted text-to-image service. Generation happens entirely on the
/// remote side; this crate only builds the query and fetches the
/// result.
pub const ENDPOINT: &str = "https://text-to-image.bjcoderx.workers.dev/";

/// Characters escaped in the `text` query parameter.
///
/// Everything outside ASCII alphanumerics and `-_.!~*'()` is
/// percent-encoded. That is the unreserved set browsers use when
/// escaping a URI component, so spaces become `%20` and the literal
/// quotes around the prompt become `%22`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the request URL for a prompt.
///
/// The prompt is wrapped in literal double quotes and percent-encoded
/// as one component, then appended as the `text` query parameter. The
/// URL is fully determined by the prompt; resubmitting the same text
/// yields the same URL (what the service returns for it is its own
/// business).
pub fn image_url(prompt: &str) -> String {
    let quoted = format!("\"{prompt}\"");
    format!("{ENDPOINT}?text={}", utf8_percent_encode(&quoted, COMPONENT))
}

/// Errors from fetching or decoding a generated image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not decode image data: {0}")]
    Decode(#[from] image::ImageError),
}

/// A fetched image ready for display: the encoded bytes as served
/// plus the dimensions read while validating them
#[derive(Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for FetchedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Fetch the raw bytes behind a URL.
///
/// Non-2xx responses count as failures; the body is not inspected
/// beyond that.
pub async fn fetch_bytes(url: String) -> Result<Vec<u8>, FetchError> {
    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Fetch an image and validate it for display.
///
/// The bytes must decode as a supported image format; undecodable
/// payloads (service error pages, truncated bodies) are reported as
/// `FetchError::Decode` so the caller can show a broken-image
/// placeholder instead of handing garbage to the renderer.
pub async fn fetch_image(url: String) -> Result<FetchedImage, FetchError> {
    let bytes = fetch_bytes(url).await?;
    let decoded = image::load_from_memory(&bytes)?;
    let (width, height) = decoded.dimensions();
    Ok(FetchedImage {
        bytes,
        width,
        height,
    })
}
