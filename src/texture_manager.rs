use std::collections::HashMap;
use std::sync::Arc;

use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use image::DynamicImage;
use parking_lot::Mutex;

use crate::element::image::{ImageSource, load_image};
use crate::error::ImageSourceError;

type Fetched = Arc<Mutex<HashMap<String, Result<DynamicImage, ImageSourceError>>>>;

enum Entry {
    /// Decoded and uploaded, or `None` when the source failed to load
    Ready(Option<TextureHandle>),
    /// A remote source is being downloaded on a worker thread
    Fetching,
}

/// Caches GPU textures for image sources, keyed by the `src` string.
///
/// Sources that fail to load are remembered too, so a broken path is
/// reported once instead of on every frame. Call [`Self::invalidate`]
/// to try again. Remote sources never block the frame.
pub struct TextureManager {
    textures: HashMap<String, Entry>,
    /// Finished downloads waiting to be uploaded on the UI thread
    fetched: Fetched,
    uploads: usize,
    /// Tracks when each texture was last used
    last_used: HashMap<String, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("cached", &self.textures.len())
            .field("current_frame", &self.current_frame)
            .field("max_cache_size", &self.max_cache_size)
            .finish()
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            textures: HashMap::new(),
            fetched: Arc::default(),
            uploads: 0,
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Texture for an image source, decoding it on first use.
    /// `None` while a remote source downloads or when the source can't be loaded.
    pub fn get_or_load(&mut self, ctx: &Context, src: &str) -> Option<TextureHandle> {
        self.last_used.insert(src.to_owned(), self.current_frame);
        self.collect_fetched(ctx);
        match self.textures.get(src) {
            Some(Entry::Ready(texture)) => return texture.clone(),
            Some(Entry::Fetching) => return None,
            None => {}
        }

        self.prune_cache_if_needed();

        let remote = ImageSource::classify(src).is_ok_and(|source| source.is_remote());
        if remote && self.spawn_fetch(ctx, src) {
            self.textures.insert(src.to_owned(), Entry::Fetching);
            return None;
        }

        let texture = self.upload(ctx, src, load_image(src));
        self.textures.insert(src.to_owned(), Entry::Ready(texture.clone()));
        texture
    }

    /// Whether a remote source is still downloading
    pub fn is_fetching(&self, src: &str) -> bool {
        matches!(self.textures.get(src), Some(Entry::Fetching))
    }

    fn spawn_fetch(&self, ctx: &Context, src: &str) -> bool {
        let fetched = Arc::clone(&self.fetched);
        let ctx = ctx.clone();
        let url = src.to_owned();
        let spawned = std::thread::Builder::new()
            .name("image-fetch".to_owned())
            .spawn(move || {
                let result = load_image(&url);
                fetched.lock().insert(url, result);
                ctx.request_repaint();
            });
        match spawned {
            Ok(_) => true,
            Err(err) => {
                log::warn!("Can't start image download: {}", err);
                false
            }
        }
    }

    /// Upload downloads that finished since the last frame
    fn collect_fetched(&mut self, ctx: &Context) {
        let finished = std::mem::take(&mut *self.fetched.lock());
        for (src, result) in finished {
            // invalidated or pruned while downloading
            if !self.is_fetching(&src) {
                continue;
            }
            let texture = self.upload(ctx, &src, result);
            self.textures.insert(src, Entry::Ready(texture));
        }
    }

    fn upload(
        &mut self,
        ctx: &Context,
        src: &str,
        image: Result<DynamicImage, ImageSourceError>,
    ) -> Option<TextureHandle> {
        match image {
            Ok(image) => {
                let rgba = image.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                self.uploads += 1;
                let name = format!("image_{}", self.uploads);
                Some(ctx.load_texture(name, color_image, TextureOptions::LINEAR))
            }
            Err(err) => {
                log::warn!("Can't display image {}: {}", abbreviate(src), err);
                None
            }
        }
    }

    /// Forget a source so it is loaded again on next use
    pub fn invalidate(&mut self, src: &str) {
        self.textures.remove(src);
        self.last_used.remove(src);
    }

    fn prune_cache_if_needed(&mut self) {
        if self.textures.len() < self.max_cache_size {
            return;
        }

        let mut entries = self
            .last_used
            .iter()
            .map(|(src, frame)| (src.clone(), *frame))
            .collect::<Vec<_>>();
        // oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = (self.textures.len() + 1).saturating_sub(self.max_cache_size);
        for (src, _) in entries.into_iter().take(to_remove) {
            self.textures.remove(&src);
            self.last_used.remove(&src);
        }
    }

}

/// Data URIs are long; keep log lines readable
fn abbreviate(src: &str) -> &str {
    match src.char_indices().nth(64) {
        Some((end, _)) => &src[..end],
        None => src,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &std::path::Path) {
        image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 128, 255, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_failed_load_retries_after_invalidate() {
        let ctx = Context::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        let src = path.to_string_lossy().into_owned();
        let mut textures = TextureManager::default();

        assert!(textures.get_or_load(&ctx, &src).is_none());
        write_png(&path);
        // failure stays cached
        assert!(textures.get_or_load(&ctx, &src).is_none());

        textures.invalidate(&src);
        let texture = textures.get_or_load(&ctx, &src).unwrap();
        assert_eq!(texture.size(), [3, 2]);
    }

    #[test]
    fn test_cache_is_pruned_to_capacity() {
        let ctx = Context::default();
        let dir = tempfile::tempdir().unwrap();
        let mut textures = TextureManager::new(2);
        for i in 0..4 {
            let path = dir.path().join(format!("{}.png", i));
            write_png(&path);
            textures.begin_frame();
            assert!(textures.get_or_load(&ctx, &path.to_string_lossy()).is_some());
        }
        assert!(textures.textures.len() <= 2);
    }

    #[test]
    fn test_remote_source_loads_in_background() {
        use std::io::{Read as _, Write as _};

        let mut body = Vec::new();
        DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4))
            .write_to(&mut std::io::Cursor::new(&mut body), image::ImageFormat::Png)
            .unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let src = format!("http://{}/remote.png", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
        });

        let ctx = Context::default();
        let mut textures = TextureManager::default();
        assert!(textures.get_or_load(&ctx, &src).is_none());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(20);
        let texture = loop {
            if let Some(texture) = textures.get_or_load(&ctx, &src) {
                break texture;
            }
            assert!(std::time::Instant::now() < deadline, "download never finished");
            std::thread::sleep(std::time::Duration::from_millis(10));
        };
        assert_eq!(texture.size(), [4, 4]);
        assert!(!textures.is_fetching(&src));
    }
}
