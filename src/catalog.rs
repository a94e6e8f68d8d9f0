//! Room types and the design style catalog.

use crate::error::{RenovizError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of space shown in the photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Living room.
    #[default]
    #[serde(rename = "Living Room")]
    LivingRoom,
    /// Bedroom.
    Bedroom,
    /// Bathroom.
    Bathroom,
    /// Kitchen.
    Kitchen,
    /// Outside of a building.
    #[serde(rename = "Building Exterior")]
    BuildingExterior,
}

impl RoomType {
    /// Every room type, in display order.
    pub const ALL: [RoomType; 5] = [
        Self::LivingRoom,
        Self::Bedroom,
        Self::Bathroom,
        Self::Kitchen,
        Self::BuildingExterior,
    ];

    /// Human-readable name, as used in the instruction text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LivingRoom => "Living Room",
            Self::Bedroom => "Bedroom",
            Self::Bathroom => "Bathroom",
            Self::Kitchen => "Kitchen",
            Self::BuildingExterior => "Building Exterior",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoomType {
    type Err = RenovizError;

    /// Accepts display names and slugs (`living-room`, `living_room`), any case.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "livingroom" | "living" => Ok(Self::LivingRoom),
            "bedroom" => Ok(Self::Bedroom),
            "bathroom" => Ok(Self::Bathroom),
            "kitchen" => Ok(Self::Kitchen),
            "buildingexterior" | "exterior" => Ok(Self::BuildingExterior),
            _ => Err(RenovizError::InvalidRequest(format!("unknown room type: {s}"))),
        }
    }
}

/// A design style the user can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignStyle {
    /// Stable identifier, e.g. `scandinavian`.
    pub id: String,
    /// Display name, e.g. `Scandinavian`.
    pub name: String,
    /// Free text inserted verbatim into the instruction.
    pub prompt_description: String,
}

impl DesignStyle {
    /// Creates a style.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_description: prompt_description.into(),
        }
    }
}

const BUILTIN_STYLES: &[(&str, &str, &str)] = &[
    (
        "modern",
        "Modern",
        "clean lines, neutral palette with bold accents, sleek furniture, open space, polished surfaces",
    ),
    (
        "scandinavian",
        "Scandinavian",
        "light wood, white walls, minimalism",
    ),
    (
        "industrial",
        "Industrial",
        "exposed brick, raw concrete, black metal fixtures, reclaimed wood, Edison bulb lighting",
    ),
    (
        "mid-century",
        "Mid-Century Modern",
        "walnut furniture with tapered legs, organic curves, mustard and teal accents, statement lamps",
    ),
    (
        "bohemian",
        "Bohemian",
        "layered textiles, rattan and macrame, abundant plants, warm earthy colors, eclectic patterns",
    ),
    (
        "japandi",
        "Japandi",
        "Japanese minimalism meets Scandinavian warmth, low furniture, natural oak, linen, muted tones",
    ),
    (
        "coastal",
        "Coastal",
        "airy whites and soft blues, driftwood textures, linen slipcovers, natural light, nautical touches",
    ),
    (
        "farmhouse",
        "Modern Farmhouse",
        "shiplap walls, rustic wood beams, apron sink, matte black hardware, cozy neutral textiles",
    ),
    (
        "art-deco",
        "Art Deco",
        "geometric patterns, brass and gold accents, velvet upholstery, rich jewel tones, lacquered surfaces",
    ),
    (
        "minimalist",
        "Minimalist",
        "uncluttered surfaces, monochrome palette, hidden storage, essential furniture only",
    ),
    (
        "traditional",
        "Traditional",
        "classic moldings, rich wood furniture, symmetrical layout, damask fabrics, elegant chandeliers",
    ),
    (
        "mediterranean",
        "Mediterranean",
        "terracotta tiles, whitewashed plaster, arched details, wrought iron, warm sunlit colors",
    ),
];

/// The set of styles offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCatalog {
    styles: Vec<DesignStyle>,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleCatalog {
    /// Styles shipped with the crate.
    pub fn builtin() -> Self {
        let styles = BUILTIN_STYLES
            .iter()
            .map(|(id, name, desc)| DesignStyle::new(*id, *name, *desc))
            .collect();
        Self { styles }
    }

    /// Builds a catalog from explicit styles. Ids must be unique and non-empty.
    pub fn from_styles(styles: Vec<DesignStyle>) -> Result<Self> {
        if styles.is_empty() {
            return Err(RenovizError::Config("style catalog is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for style in &styles {
            if style.id.trim().is_empty() {
                return Err(RenovizError::Config(format!(
                    "style '{}' has an empty id",
                    style.name
                )));
            }
            if !seen.insert(style.id.as_str()) {
                return Err(RenovizError::Config(format!(
                    "duplicate style id: {}",
                    style.id
                )));
            }
        }
        Ok(Self { styles })
    }

    /// Parses a JSON array of `{id, name, promptDescription}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let styles: Vec<DesignStyle> = serde_json::from_str(json)?;
        Self::from_styles(styles)
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), styles = catalog.len(), "loaded style catalog");
        Ok(catalog)
    }

    /// Looks up a style by id, falling back to a case-insensitive name match.
    pub fn get(&self, key: &str) -> Option<&DesignStyle> {
        let key = key.trim();
        self.styles
            .iter()
            .find(|s| s.id == key)
            .or_else(|| self.styles.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
    }

    /// Iterates over the styles in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &DesignStyle> {
        self.styles.iter()
    }

    /// Number of styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_default_and_display() {
        assert_eq!(RoomType::default(), RoomType::LivingRoom);
        assert_eq!(RoomType::BuildingExterior.to_string(), "Building Exterior");
        assert_eq!(RoomType::ALL.len(), 5);
    }

    #[test]
    fn test_room_type_from_str() {
        assert_eq!("Kitchen".parse::<RoomType>().unwrap(), RoomType::Kitchen);
        assert_eq!("living-room".parse::<RoomType>().unwrap(), RoomType::LivingRoom);
        assert_eq!("Living Room".parse::<RoomType>().unwrap(), RoomType::LivingRoom);
        assert_eq!("exterior".parse::<RoomType>().unwrap(), RoomType::BuildingExterior);
        assert!("garage".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_room_type_serde_uses_display_names() {
        let json = serde_json::to_string(&RoomType::LivingRoom).unwrap();
        assert_eq!(json, "\"Living Room\"");
        let room: RoomType = serde_json::from_str("\"Building Exterior\"").unwrap();
        assert_eq!(room, RoomType::BuildingExterior);
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = StyleCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_STYLES.len());

        let scandi = catalog.get("scandinavian").unwrap();
        assert_eq!(scandi.name, "Scandinavian");
        assert_eq!(scandi.prompt_description, "light wood, white walls, minimalism");

        assert_eq!(catalog.get("art deco").unwrap().id, "art-deco");
        assert!(catalog.get("brutalist").is_none());
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[
            {"id": "zen", "name": "Zen", "promptDescription": "bamboo, stone, calm"},
            {"id": "loft", "name": "Loft", "promptDescription": "double height, steel"}
        ]"#;
        let catalog = StyleCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("zen").unwrap().prompt_description, "bamboo, stone, calm");
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_empty() {
        let dup = vec![
            DesignStyle::new("a", "A", "x"),
            DesignStyle::new("a", "B", "y"),
        ];
        assert!(matches!(
            StyleCatalog::from_styles(dup),
            Err(RenovizError::Config(_))
        ));
        assert!(StyleCatalog::from_json("[]").is_err());
        assert!(StyleCatalog::from_json("not json").is_err());
    }

    #[test]
    fn test_catalog_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.json");
        std::fs::write(
            &path,
            r#"[{"id": "zen", "name": "Zen", "promptDescription": "bamboo"}]"#,
        )
        .unwrap();
        let catalog = StyleCatalog::load(&path).unwrap();
        assert_eq!(catalog.iter().next().unwrap().id, "zen");
    }
}
