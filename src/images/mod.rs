//! Image preparation for uploads.
//!
//! Everything that happens before an image leaves the authoring tool:
//! requirement lookup, format check, cover resize and the size cap. A
//! rejected image never reaches the network.

pub mod requirements;
pub mod transform;

pub use requirements::{requirement_for, ImageRequirement, IMAGE_REQUIREMENTS};
pub use transform::{resize_cover, validate_format, OutputFormat, TransformError, Transformed};

use tracing::debug;

/// Why an image was not accepted for upload.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The asset has no requirement entry, so it cannot be replaced.
    #[error("no upload requirements for asset '{0}'")]
    UnknownAsset(String),

    /// The source extension is not one of the asset's formats.
    #[error("invalid format: please upload one of {}", .allowed.join(", "))]
    Format {
        /// Accepted extensions.
        allowed: &'static [&'static str],
    },

    /// The transformed image exceeds the asset's size cap.
    #[error("image is {size_kb:.0}KB, max is {max_kb}KB; try a lower quality image")]
    TooLarge {
        /// Output size in kilobytes.
        size_kb: f64,
        /// Size cap in kilobytes.
        max_kb: u32,
    },

    /// Decoding or encoding failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// An image ready to be sent to the upload endpoint.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Canonical asset file name it replaces.
    pub asset: String,
    /// Requirement it was prepared against.
    pub requirement: &'static ImageRequirement,
    /// Resized, re-encoded output.
    pub output: Transformed,
}

/// Validates, resizes and size-checks `data` for `asset`.
///
/// # Arguments
/// * `asset` - Canonical asset name (e.g., "logo.png")
/// * `source_name` - File name of the picked source, used for the format check
/// * `data` - Encoded source bytes
/// * `quality` - Lossy quality factor in (0, 1]
pub fn prepare_upload(
    asset: &str,
    source_name: &str,
    data: &[u8],
    quality: f32,
) -> Result<PreparedImage, ImageError> {
    let requirement =
        requirement_for(asset).ok_or_else(|| ImageError::UnknownAsset(asset.to_string()))?;

    if !validate_format(source_name, requirement.formats) {
        return Err(ImageError::Format {
            allowed: requirement.formats,
        });
    }

    let output = resize_cover(data, requirement.width, requirement.height, quality)?;

    let size_kb = output.size_kb();
    debug!(
        "Prepared {} at {}x{} ({:.1}KB)",
        asset, output.width, output.height, size_kb
    );
    if size_kb > f64::from(requirement.max_size_kb) {
        return Err(ImageError::TooLarge {
            size_kb,
            max_kb: requirement.max_size_kb,
        });
    }

    Ok(PreparedImage {
        asset: asset.to_string(),
        requirement,
        output,
    })
}
