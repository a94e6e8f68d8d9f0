//! Instruction text sent alongside the room photo.

use crate::catalog::{DesignStyle, RoomType};

/// Builds the renovation instruction for one room type and style.
///
/// The style description is inserted verbatim. The fixed directives keep the
/// room geometry and camera untouched so the result lines up with the photo.
pub fn build_instruction(room: RoomType, style: &DesignStyle) -> String {
    let room = room.as_str();
    let name = style.name.as_str();
    let details = style.prompt_description.trim().trim_end_matches('.');

    format!(
        "You are an expert interior architect.\n\
         Task: Redesign this {room} in the \"{name}\" style.\n\
         Style Details: {details}.\n\
         \n\
         CRITICAL INSTRUCTIONS:\n\
         1. PRESERVE THE EXACT SPATIAL STRUCTURE. Do not move walls, windows, doors, or change the camera angle. \
         The geometry of the room must remain identical to the original image.\n\
         2. APPLY THE STYLE. Change the materials, colors, furniture, lighting, and decor to match the {name} aesthetic perfectly.\n\
         3. REALISM. The output must be a photorealistic image indistinguishable from a real photograph.\n\
         4. LIGHTING. Ensure the lighting is natural and consistent with the scene.\n\
         \n\
         Input Image: The provided image is the base structure.\n\
         Output: A fully rendered renovation."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scandinavian() -> DesignStyle {
        DesignStyle::new(
            "scandinavian",
            "Scandinavian",
            "light wood, white walls, minimalism",
        )
    }

    #[test]
    fn test_embeds_room_and_style() {
        let text = build_instruction(RoomType::Kitchen, &scandinavian());
        assert!(text.contains("Redesign this Kitchen in the \"Scandinavian\" style."));
        assert!(text.contains("Style Details: light wood, white walls, minimalism."));
        assert!(text.contains("match the Scandinavian aesthetic"));
    }

    #[test]
    fn test_contains_fixed_directives() {
        let text = build_instruction(RoomType::BuildingExterior, &scandinavian());
        for needle in [
            "PRESERVE THE EXACT SPATIAL STRUCTURE",
            "walls, windows, doors",
            "camera angle",
            "photorealistic",
            "natural and consistent",
            "fully rendered renovation",
        ] {
            assert!(text.contains(needle), "missing directive: {needle}");
        }
    }

    #[test]
    fn test_description_trailing_period_not_doubled() {
        let style = DesignStyle::new("x", "X", "brass and velvet.");
        let text = build_instruction(RoomType::Bedroom, &style);
        assert!(text.contains("Style Details: brass and velvet.\n"));
    }
}
