//! Shared test fixtures for integration tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::fs;
use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tempfile::TempDir;

use raou_studio::config::ServerConfig;

/// A complete content document in the on-disk shape.
pub fn sample_document() -> Value {
    json!({
        "site": {
            "name": "Raou Travel",
            "tagline": "Journeys beyond the ordinary",
            "description": "Luxury tailor-made travel",
            "companyInfo": {
                "fullName": "Raou Travel Ltd",
                "locations": ["London"],
                "email": "hello@raou.travel",
                "phone": "+44 20 0000 0000"
            },
            "social": {
                "instagram": "https://instagram.com/raou",
                "facebook": "https://facebook.com/raou",
                "twitter": "https://twitter.com/raou"
            }
        },
        "navigation": {
            "logo": "/src/assets/logo.png",
            "menuItems": [{"label": "Destinations", "path": "/destinations", "hasDropdown": true}],
            "ctaButton": {"label": "Plan a trip", "path": "/trip-finder"}
        },
        "destinations": [{
            "region": "Africa",
            "slug": "africa",
            "countries": ["Kenya"],
            "image": "/src/assets/safari-holidays.jpg",
            "description": "Wild places"
        }],
        "experiences": {
            "who": [{
                "title": "Honeymoons",
                "slug": "honeymoons",
                "icon": "heart",
                "image": "/src/assets/honeymoons.jpg",
                "description": "For two",
                "longDescription": "Slow mornings"
            }],
            "what": [],
            "remarkable": []
        },
        "home": {
            "hero": {
                "image": "/src/assets/hero-background.jpg",
                "subtitle": "Since 2010",
                "title": "Travel, remarkably",
                "description": "Bespoke journeys",
                "primaryCta": {"label": "Start", "path": "/trip-finder"},
                "secondaryCta": {"label": "Explore", "path": "/destinations"}
            },
            "whosTraveling": {"title": "Who", "subtitle": "Travellers"},
            "featuredDestinations": {"title": "Where", "subtitle": "Places"},
            "whatCallsToYou": {"title": "What", "subtitle": "Styles"},
            "remarkableExperiences": {"title": "Remarkable", "subtitle": "Rare", "items": []},
            "whyRaou": {"title": "Why", "description": "Because", "ctaLabel": "About", "ctaPath": "/about"},
            "finalCta": {"title": "Ready?", "description": "Talk to us", "ctaLabel": "Contact", "ctaPath": "/contact"}
        },
        "about": {
            "hero": {"title": "About", "subtitle": "Us", "image": "/src/assets/bespoke-travel.jpg"},
            "whatWereAbout": {"title": "What we're about", "paragraphs": ["One"]},
            "philosophy": {"title": "Philosophy", "subtitle": "Values", "values": [{"title": "Care", "description": "Always"}]},
            "whyChooseRaou": {"title": "Why", "items": []},
            "commitment": {"title": "Commitment", "paragraphs": []}
        },
        "contact": {
            "hero": {"title": "Contact", "subtitle": "Say hello"},
            "form": {
                "title": "Enquire",
                "fields": {"name": "Name", "email": "Email", "phone": "Phone", "subject": "Subject", "message": "Message"},
                "submitButton": "Send",
                "successMessage": "Thanks"
            },
            "officeInfo": {"title": "Offices", "offices": []}
        },
        "footer": {
            "brandName": "RAOU",
            "description": "Luxury travel",
            "sections": [],
            "newsletter": {"title": "News", "description": "Monthly", "placeholder": "Email", "buttonLabel": "Join"},
            "copyright": "© Raou"
        }
    })
}

/// A temporary site checkout with `public/content.json` in place.
pub fn temp_site() -> (TempDir, ServerConfig) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = ServerConfig::for_site(temp_dir.path());

    let content_path = config.content_path();
    fs::create_dir_all(content_path.parent().unwrap()).expect("Failed to create public dir");
    fs::write(
        &content_path,
        serde_json::to_string_pretty(&sample_document()).unwrap(),
    )
    .expect("Failed to write content.json");

    (temp_dir, config)
}

/// Encodes a solid-colour image.
pub fn solid_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([180, 120, 60]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode image");
    out.into_inner()
}

/// Encodes a PNG of per-pixel xorshift noise, which compresses poorly.
pub fn noise_image(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbImage::new(width, height);
    let mut seed: u32 = 0x1234_5678;
    for pixel in img.pixels_mut() {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let [a, b, c, _] = seed.to_le_bytes();
        *pixel = Rgb([a, b, c]);
    }
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode image");
    out.into_inner()
}

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub const BOUNDARY: &str = "----RaouTestBoundary";

/// Builds a `multipart/form-data` body with [`BOUNDARY`].
pub fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
