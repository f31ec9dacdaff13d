use std::fmt;

use crate::{ImageReference, InvalidImageReference};

/// The digest algorithm assumed for the `sha` input.
pub const DIGEST_ALGORITHM: &str = "sha256";

const PATH_SEPARATOR: char = '/';
const TAG_PREFIX: char = ':';
const DIGEST_ALGORITHM_PREFIX: char = '@';
const DIGEST_HEX_PREFIX: char = ':';

/// Returns true if `image` already names a tag or a digest.
///
/// Only the segment after the last `/` is checked for a `:` or `@`, so the port in
/// `myhost:9090/myrepo/myimage` is not taken for a tag.
pub fn has_tag_or_digest(image: &str) -> bool {
    let last_segment = image
        .rsplit_once(PATH_SEPARATOR)
        .map_or(image, |(_, segment)| segment);
    last_segment.contains(TAG_PREFIX) || last_segment.contains(DIGEST_ALGORITHM_PREFIX)
}

/// Outcome of resolving an image reference. Borrows the inputs it was resolved from; the
/// canonical reference string is its [`Display`](fmt::Display) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedImage<'a> {
    /// No image, tag or digest was given. Renders as the empty string.
    Empty,
    /// `<image>@sha256:<sha>`
    Digest { image: &'a str, sha: &'a str },
    /// `<image>:<tag>`
    Tag { image: &'a str, tag: &'a str },
    /// `<image>:<version>`. The version may be empty, leaving a trailing `:`.
    Version { image: &'a str, version: &'a str },
    /// The image already carries a tag or digest and is used unmodified.
    Embedded { image: &'a str },
}

impl ResolvedImage<'_> {
    /// Short name of the precedence branch that produced this result.
    pub const fn kind(&self) -> &'static str {
        match self {
            ResolvedImage::Empty => "empty",
            ResolvedImage::Digest { .. } => "digest",
            ResolvedImage::Tag { .. } => "tag",
            ResolvedImage::Version { .. } => "version",
            ResolvedImage::Embedded { .. } => "embedded",
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, ResolvedImage::Empty)
    }

    /// Parses the rendered reference with [`ImageReference::parse`]. An empty resolution is valid.
    pub fn validate(&self) -> Result<(), InvalidImageReference> {
        if self.is_empty() {
            return Ok(());
        }
        let rendered = self.to_string();
        ImageReference::parse(&rendered)?;
        Ok(())
    }
}

impl fmt::Display for ResolvedImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ResolvedImage::Empty => Ok(()),
            ResolvedImage::Digest { image, sha } => write!(
                f,
                "{image}{DIGEST_ALGORITHM_PREFIX}{DIGEST_ALGORITHM}{DIGEST_HEX_PREFIX}{sha}"
            ),
            ResolvedImage::Tag { image, tag } => write!(f, "{image}{TAG_PREFIX}{tag}"),
            ResolvedImage::Version { image, version } => {
                write!(f, "{image}{TAG_PREFIX}{version}")
            }
            ResolvedImage::Embedded { image } => f.write_str(image),
        }
    }
}

fn select<'a>(
    image: &'a str,
    version: &'a str,
    tag: &'a str,
    sha: &'a str,
    keep_embedded: bool,
) -> ResolvedImage<'a> {
    if !sha.is_empty() {
        ResolvedImage::Digest { image, sha }
    } else if !tag.is_empty() {
        ResolvedImage::Tag { image, tag }
    } else if image.is_empty() {
        ResolvedImage::Empty
    } else if keep_embedded && has_tag_or_digest(image) {
        ResolvedImage::Embedded { image }
    } else {
        ResolvedImage::Version { image, version }
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Resolves `image`, `version`, `tag` and `sha` without any fallback. A tag already embedded in
/// `image` is not detected: the version is appended regardless.
pub fn resolve_image_path<'a>(
    image: &'a str,
    version: &'a str,
    tag: &'a str,
    sha: &'a str,
) -> ResolvedImage<'a> {
    select(image, version, tag, sha, false)
}

/// Resolves with operator-level fallbacks. `conf_image` and `conf_version` are only used when
/// `spec_image` and `spec_version` respectively are empty. An effective image that already carries
/// a tag or digest is returned unmodified unless `tag` or `sha` override it.
pub fn resolve_image_path_new<'a>(
    spec_image: &'a str,
    conf_image: &'a str,
    spec_version: &'a str,
    conf_version: &'a str,
    tag: &'a str,
    sha: &'a str,
) -> ResolvedImage<'a> {
    select(
        or_default(spec_image, conf_image),
        or_default(spec_version, conf_version),
        tag,
        sha,
        true,
    )
}

/// Builds the image reference for `image`, preferring `sha`, then `tag`, then `version`.
///
/// Never fails today; the error is reserved for validation of the inputs.
pub fn build_image_path(
    image: &str,
    version: &str,
    tag: &str,
    sha: &str,
) -> Result<String, InvalidImageReference> {
    Ok(resolve_image_path(image, version, tag, sha).to_string())
}

/// Like [`build_image_path`], but falls back to `conf_image` and `conf_version` for an empty
/// `spec_image` or `spec_version`. See [`resolve_image_path_new`].
pub fn build_image_path_new(
    spec_image: &str,
    conf_image: &str,
    spec_version: &str,
    conf_version: &str,
    tag: &str,
    sha: &str,
) -> Result<String, InvalidImageReference> {
    Ok(
        resolve_image_path_new(spec_image, conf_image, spec_version, conf_version, tag, sha)
            .to_string(),
    )
}
