//! Per-asset image requirements.
//!
//! Every image the editor can replace has a fixed target size, a size cap
//! and a list of accepted source formats. Assets without an entry cannot be
//! uploaded.

use serde::Serialize;

/// Target geometry and limits for one site image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageRequirement {
    /// Display name
    pub name: &'static str,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Largest accepted output, in kilobytes
    pub max_size_kb: u32,
    /// Accepted source extensions (lowercase)
    pub formats: &'static [&'static str],
}

const PHOTO_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp"];

const fn experience_image(name: &'static str) -> ImageRequirement {
    ImageRequirement {
        name,
        width: 1200,
        height: 800,
        max_size_kb: 300,
        formats: PHOTO_FORMATS,
    }
}

/// Canonical asset file name to requirement.
pub const IMAGE_REQUIREMENTS: &[(&str, ImageRequirement)] = &[
    (
        "hero-background.jpg",
        ImageRequirement {
            name: "Hero Background",
            width: 1920,
            height: 1080,
            max_size_kb: 500,
            formats: PHOTO_FORMATS,
        },
    ),
    (
        "logo.png",
        ImageRequirement {
            name: "Logo",
            width: 200,
            height: 200,
            max_size_kb: 100,
            formats: &["png", "svg"],
        },
    ),
    ("bespoke-travel.jpg", experience_image("Bespoke Travel")),
    ("family-holidays.jpg", experience_image("Family Holidays")),
    ("honeymoons.jpg", experience_image("Honeymoons")),
    ("safari-holidays.jpg", experience_image("Safari Holidays")),
    ("remote-destinations.jpg", experience_image("Remote Destinations")),
    ("unusual-holidays.jpg", experience_image("Unusual Holidays")),
];

/// Looks up the requirement for an asset file name.
pub fn requirement_for(asset: &str) -> Option<&'static ImageRequirement> {
    IMAGE_REQUIREMENTS
        .iter()
        .find(|(name, _)| *name == asset)
        .map(|(_, req)| req)
}

/// All asset names that accept uploads, in table order.
pub fn asset_names() -> impl Iterator<Item = &'static str> {
    IMAGE_REQUIREMENTS.iter().map(|(name, _)| *name)
}
