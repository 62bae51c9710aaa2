//! Lookup of the fonts used for labels.

use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Source, ID};

use crate::error::GisError;
use crate::render::FontFace;

/// Families tried, in order, when no font is requested explicitly.
const PREFERRED_FAMILIES: [&str; 4] = ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"];

/// Catalog of the font faces available for labels.
///
/// The catalog is created once and handed to the map, which only reads from it. Besides the
/// system fonts it can hold the font bundled with the crate (see [`FontFace::bundled`]), so labels
/// are drawn even on machines without any fonts installed.
pub struct FontCatalog {
    db: Database,
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontCatalog {
    /// Catalog without any fonts.
    pub fn empty() -> Self {
        Self {
            db: Database::new(),
        }
    }

    /// Catalog with only the bundled font.
    pub fn bundled() -> Self {
        let mut catalog = Self::empty();
        catalog.load_bundled();
        catalog
    }

    /// Catalog with the fonts installed in the system and the bundled font.
    pub fn system() -> Self {
        let mut catalog = Self::empty();
        catalog.db.load_system_fonts();
        log::debug!("Loaded {} system font faces", catalog.db.len());
        catalog.load_bundled();

        catalog
    }

    fn load_bundled(&mut self) {
        self.db.load_font_data(FontFace::BUNDLED_DATA.to_vec());
    }

    /// Adds every font file found under `path`.
    pub fn load_fonts_dir(&mut self, path: impl AsRef<Path>) {
        self.db.load_fonts_dir(path);
    }

    /// Adds a single font file.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<(), GisError> {
        self.db.load_font_file(path)?;
        Ok(())
    }

    /// Number of font faces in the catalog.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Returns true if the catalog has no fonts.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Face best matching the family name.
    ///
    /// If no family matches, the first face whose file name contains `family` (case-insensitive)
    /// is returned.
    pub fn find(&self, family: &str) -> Option<FontFace> {
        if let Some(face) = self.query(family) {
            return Some(face);
        }

        let needle = family.to_lowercase();
        self.sorted_faces()
            .into_iter()
            .find(|(_, name)| name.to_lowercase().contains(&needle))
            .and_then(|(id, _)| self.load_face(id))
    }

    /// Face given as a font file path or a family name.
    ///
    /// A file that exists but holds no usable font resolves to nothing.
    pub fn resolve(&self, font: &str) -> Option<FontFace> {
        let path = Path::new(font);
        if path.is_file() {
            return match std::fs::read(path) {
                Ok(data) => FontFace::new(Arc::new(data), 0),
                Err(err) => {
                    log::warn!("Cannot read font file {}: {err}", path.display());
                    None
                }
            };
        }

        self.find(font)
    }

    /// Face used when none is requested.
    ///
    /// The first available of the preferred families, then the bundled font, otherwise the face
    /// with the alphabetically first source name, so the choice is the same on every run.
    pub fn default_font(&self) -> Option<FontFace> {
        PREFERRED_FAMILIES
            .iter()
            .chain([&FontFace::BUNDLED_FAMILY])
            .find_map(|family| self.query(family))
            .or_else(|| {
                self.sorted_faces()
                    .into_iter()
                    .find_map(|(id, _)| self.load_face(id))
            })
    }

    fn query(&self, family: &str) -> Option<FontFace> {
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            ..Default::default()
        };

        self.db.query(&query).and_then(|id| self.load_face(id))
    }

    fn load_face(&self, id: ID) -> Option<FontFace> {
        self.db
            .with_face_data(id, |data, index| FontFace::new(Arc::new(data.to_vec()), index))
            .flatten()
    }

    /// Faces with the name used for file name matching: the file name for faces loaded from
    /// files, the family name otherwise.
    fn sorted_faces(&self) -> Vec<(ID, String)> {
        let mut faces: Vec<(ID, String)> = self
            .db
            .faces()
            .map(|face| {
                let name = match &face.source {
                    Source::File(path) => path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    _ => face
                        .families
                        .first()
                        .map(|(name, _)| name.clone())
                        .unwrap_or_default(),
                };
                (face.id, name)
            })
            .collect();
        faces.sort_by(|a, b| a.1.cmp(&b.1));
        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::temp_dir;

    #[test]
    fn empty_catalog() {
        let catalog = FontCatalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.find("DejaVu Sans"), None);
        assert_eq!(catalog.default_font(), None);
    }

    #[test]
    fn bundled_font_is_default() {
        let catalog = FontCatalog::bundled();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.default_font(), FontFace::bundled());
        assert!(catalog.find("tuffy").is_some());
        assert_eq!(catalog.find("Missing Family"), None);
    }

    #[test]
    fn resolve_font_file() {
        let dir = temp_dir("font-resolve");
        let path = dir.join("custom.ttf");
        std::fs::write(&path, FontFace::BUNDLED_DATA).unwrap();

        let catalog = FontCatalog::empty();
        assert_eq!(catalog.resolve(path.to_str().unwrap()), FontFace::bundled());
        assert_eq!(catalog.resolve("Missing Family"), None);

        let broken = dir.join("broken.ttf");
        std::fs::write(&broken, b"not really a font").unwrap();
        assert_eq!(catalog.resolve(broken.to_str().unwrap()), None);
    }

    #[test]
    fn invalid_font_file_is_skipped() {
        let dir = temp_dir("font-invalid");
        std::fs::write(dir.join("broken.ttf"), b"garbage").unwrap();

        let mut catalog = FontCatalog::empty();
        catalog.load_fonts_dir(&dir);
        assert!(catalog.is_empty());
    }
}
