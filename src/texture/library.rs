//! Texture resolution on disk and the per-run texture cache

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;

use super::pal::VgaPalette;
use super::{bm, Texture, TextureError, TextureProvider};

/// Extensions tried, in order, when the referenced file itself is absent
const ALTERNATE_EXTENSIONS: [&str; 4] = ["png", "PNG", "bmp", "BMP"];

/// Resolves texture names against a list of directories.
///
/// For every directory the exact name is tried first, then the same stem
/// with an image extension. The bare name (relative to the working
/// directory, or absolute) is tried last.
pub struct FileTextureProvider {
    search_dirs: Vec<PathBuf>,
    palette: VgaPalette,
}

impl FileTextureProvider {
    pub fn new(search_dirs: Vec<PathBuf>, palette: VgaPalette) -> Self {
        Self {
            search_dirs,
            palette,
        }
    }

    /// Paths checked for `name`, in priority order
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let reference = Path::new(name);
        let file_name = reference.file_name().map(Path::new).unwrap_or(reference);
        let stem = reference.file_stem().and_then(|s| s.to_str()).unwrap_or(name);

        let mut paths = Vec::with_capacity(self.search_dirs.len() * 5 + 1);
        for dir in &self.search_dirs {
            paths.push(dir.join(file_name));
            for ext in ALTERNATE_EXTENSIONS {
                paths.push(dir.join(format!("{}.{}", stem, ext)));
            }
        }
        paths.push(reference.to_path_buf());
        paths
    }

    /// First existing candidate
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.candidates(name).into_iter().find(|p| p.is_file())
    }

    fn decode_file(&self, name: &str, path: &Path) -> Result<Texture, TextureError> {
        let is_bm = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("bm"));

        if is_bm {
            let bytes = std::fs::read(path)?;
            bm::decode(name, &bytes, &self.palette)
        } else {
            let image = image::open(path).map_err(|source| TextureError::Image {
                name: name.to_string(),
                source,
            })?;
            Texture::new(name, image.to_rgb8())
        }
    }
}

impl TextureProvider for FileTextureProvider {
    fn decode(&self, name: &str) -> Result<Texture, TextureError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| TextureError::NotFound(name.to_string()))?;
        tracing::debug!("Texture {} -> {}", name, path.display());
        self.decode_file(name, &path)
    }
}

/// All textures of one run, decoded once per name.
///
/// Names that fail to decode map to the shared fallback texture; each such
/// name is warned about once.
pub struct TextureSet {
    textures: AHashMap<String, Arc<Texture>>,
    fallback: Option<Arc<Texture>>,
    missing: Vec<String>,
}

impl TextureSet {
    pub fn load<'a>(
        names: impl IntoIterator<Item = &'a str>,
        provider: &dyn TextureProvider,
        fallback_name: &str,
    ) -> Result<Self, TextureError> {
        let mut set = Self {
            textures: AHashMap::new(),
            fallback: None,
            missing: Vec::new(),
        };

        for name in names {
            if set.textures.contains_key(name) {
                continue;
            }
            let texture = match provider.decode(name) {
                Ok(texture) => Arc::new(texture),
                Err(err) => {
                    tracing::warn!("{}, using fallback texture {}", err, fallback_name);
                    set.missing.push(name.to_string());
                    set.fallback_texture(provider, fallback_name)?
                }
            };
            set.textures.insert(name.to_string(), texture);
        }

        tracing::info!(
            "Loaded {} textures ({} replaced by fallback)",
            set.textures.len(),
            set.missing.len()
        );
        Ok(set)
    }

    fn fallback_texture(
        &mut self,
        provider: &dyn TextureProvider,
        fallback_name: &str,
    ) -> Result<Arc<Texture>, TextureError> {
        if let Some(fallback) = &self.fallback {
            return Ok(Arc::clone(fallback));
        }
        let fallback = provider
            .decode(fallback_name)
            .map_err(|source| TextureError::FallbackUnavailable {
                name: fallback_name.to_string(),
                source: Box::new(source),
            })?;
        let fallback = Arc::new(fallback);
        self.fallback = Some(Arc::clone(&fallback));
        Ok(fallback)
    }

    /// Texture for `name`; unknown names get the fallback when one was loaded
    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.textures
            .get(name)
            .or(self.fallback.as_ref())
            .map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Names that were replaced by the fallback
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Rgb;
    use std::cell::Cell;

    struct CountingProvider {
        calls: Cell<usize>,
    }

    impl TextureProvider for CountingProvider {
        fn decode(&self, name: &str) -> Result<Texture, TextureError> {
            self.calls.set(self.calls.get() + 1);
            match name {
                "RED.BM" => Ok(Texture::solid(4, 4, Rgb::new(255, 0, 0))),
                "DEFAULT.BM" => Ok(Texture::solid(2, 2, Rgb::new(9, 9, 9))),
                other => Err(TextureError::NotFound(other.to_string())),
            }
        }
    }

    #[test]
    fn test_missing_texture_uses_fallback() {
        let provider = CountingProvider { calls: Cell::new(0) };
        let set = TextureSet::load(["RED.BM", "GONE.BM", "RED.BM"], &provider, "DEFAULT.BM").unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.missing(), ["GONE.BM".to_string()]);
        assert_eq!(set.get("RED.BM").unwrap().sample(0, 0), Rgb::new(255, 0, 0));
        assert_eq!(set.get("GONE.BM").unwrap().sample(0, 0), Rgb::new(9, 9, 9));
        // RED once, GONE once, DEFAULT once
        assert_eq!(provider.calls.get(), 3);
    }

    #[test]
    fn test_fallback_missing_is_fatal() {
        let provider = CountingProvider { calls: Cell::new(0) };
        let result = TextureSet::load(["GONE.BM"], &provider, "ALSO_GONE.BM");
        assert!(matches!(result, Err(TextureError::FallbackUnavailable { .. })));
    }

    #[test]
    fn test_fallback_not_needed_when_all_present() {
        let provider = CountingProvider { calls: Cell::new(0) };
        let set = TextureSet::load(["RED.BM"], &provider, "ALSO_GONE.BM").unwrap();
        assert!(set.missing().is_empty());
        assert!(set.get("UNKNOWN.BM").is_none());
    }

    #[test]
    fn test_candidate_order() {
        let provider = FileTextureProvider::new(
            vec![PathBuf::from("res"), PathBuf::from("lev")],
            VgaPalette::grayscale(),
        );
        let candidates = provider.candidates("sub/IF3.BM");
        assert_eq!(candidates[0], PathBuf::from("res/IF3.BM"));
        assert_eq!(candidates[1], PathBuf::from("res/IF3.png"));
        assert_eq!(candidates[5], PathBuf::from("lev/IF3.BM"));
        assert_eq!(candidates.last().unwrap(), &PathBuf::from("sub/IF3.BM"));
    }
}
