//! Resolution of the container image reference a managed workload should run.
//!
//! An image reference is assembled from a repository, a version, an explicit tag and an explicit
//! `sha256` digest. Precedence, highest first: digest, tag, version. See [`build_image_path`] and
//! [`build_image_path_new`], the latter falling back to operator-level [`ImageDefaults`] for
//! whatever the workload leaves unset.
//!
//! Resolution never validates its inputs. Callers that want to reject malformed references can run
//! [`ResolvedImage::validate`], which parses the output with [`ImageReference::parse`].

mod reference;
mod resolve;
mod spec;

use std::fmt;

pub use reference::ImageReference;
pub use resolve::{
    build_image_path, build_image_path_new, has_tag_or_digest, resolve_image_path,
    resolve_image_path_new, ResolvedImage, DIGEST_ALGORITHM,
};
pub use spec::{ImageDefaults, ImageSpec, ImageSpecWithDefaults};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidImageReference(String);

impl InvalidImageReference {
    pub(crate) fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The string that failed to parse.
    pub fn reference(&self) -> &str {
        &self.0
    }
}

impl std::error::Error for InvalidImageReference {}

impl fmt::Display for InvalidImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid image reference: {:?}", self.0)
    }
}
