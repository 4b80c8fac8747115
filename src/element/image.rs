use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

use crate::error::ImageSourceError;

/// Where an image element's pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// `data:<mime>;base64,<payload>`
    DataUri(&'a str),
    /// http(s) URL, fetched with a blocking client
    Remote(&'a str),
    /// Local file path
    Path(&'a Path),
}

impl<'a> ImageSource<'a> {
    pub fn classify(src: &'a str) -> Result<Self, ImageSourceError> {
        let src = src.trim();
        if src.is_empty() {
            Err(ImageSourceError::Empty)
        } else if src.starts_with("data:") {
            Ok(Self::DataUri(src))
        } else if src.starts_with("http://") || src.starts_with("https://") {
            Ok(Self::Remote(src))
        } else {
            Ok(Self::Path(Path::new(src)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Download a remote image. Blocks; call from a background thread.
pub fn fetch_remote(url: &str) -> Result<Vec<u8>, ImageSourceError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("page-composer/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()?;

    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(ImageSourceError::Status {
            url: url.to_owned(),
            status: response.status().as_u16(),
        });
    }
    let bytes = response.bytes()?;
    log::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

/// Read the raw bytes behind an image `src`
pub fn load_bytes(src: &str) -> Result<Vec<u8>, ImageSourceError> {
    match ImageSource::classify(src)? {
        ImageSource::DataUri(uri) => decode_data_uri(uri),
        ImageSource::Remote(url) => fetch_remote(url),
        ImageSource::Path(path) => Ok(std::fs::read(path)?),
    }
}

/// Decode the image behind an image `src`
pub fn load_image(src: &str) -> Result<DynamicImage, ImageSourceError> {
    let bytes = load_bytes(src)?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Decode the payload of a base64 data URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ImageSourceError> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(ImageSourceError::MalformedDataUri)?;
    if !header.ends_with(";base64") {
        return Err(ImageSourceError::MalformedDataUri);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Embed image bytes as a data URI, detecting the mime type from the content
pub fn data_uri_from_bytes(bytes: &[u8]) -> Result<String, ImageSourceError> {
    let format = image::guess_format(bytes)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

/// Read a local image file into a data URI, the way an upload embeds it
pub fn data_uri_from_file(path: &Path) -> Result<String, ImageSourceError> {
    let bytes = std::fs::read(path)?;
    data_uri_from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_classify() {
        assert!(matches!(ImageSource::classify(""), Err(ImageSourceError::Empty)));
        assert!(matches!(
            ImageSource::classify("https://example.com/a.png"),
            Ok(ImageSource::Remote(_))
        ));
        assert!(matches!(
            ImageSource::classify("data:image/png;base64,AAAA"),
            Ok(ImageSource::DataUri(_))
        ));
        assert!(matches!(ImageSource::classify("logo.png"), Ok(ImageSource::Path(_))));
    }

    #[test]
    fn test_data_uri_embeds_and_decodes() {
        let png = tiny_png();
        let uri = data_uri_from_bytes(&png).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let decoded = load_image(&uri).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    /// Serve one canned HTTP response on a local port
    fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        use std::io::{Read as _, Write as _};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
        });
        format!("http://{}/logo.png", addr)
    }

    #[test]
    fn test_remote_image_is_fetched() {
        let url = serve_once("200 OK", tiny_png());
        assert!(ImageSource::classify(&url).unwrap().is_remote());

        let decoded = load_image(&url).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn test_remote_error_status() {
        let url = serve_once("404 Not Found", Vec::new());
        match load_bytes(&url) {
            Err(ImageSourceError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected a status error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_malformed_sources() {
        assert!(matches!(
            decode_data_uri("data:image/png,plain"),
            Err(ImageSourceError::MalformedDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,@@@"),
            Err(ImageSourceError::Base64(_))
        ));
    }
}
