use crate::{resolve, InvalidImageReference, ResolvedImage};

/// The image identity requested by a workload. Empty fields are unset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ImageSpec {
    pub image: String,
    pub version: String,
    pub tag: String,
    pub sha: String,
}

impl ImageSpec {
    pub fn new(
        image: impl Into<String>,
        version: impl Into<String>,
        tag: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            version: version.into(),
            tag: tag.into(),
            sha: sha.into(),
        }
    }

    pub fn resolve(&self) -> ResolvedImage<'_> {
        resolve::resolve_image_path(&self.image, &self.version, &self.tag, &self.sha)
    }

    pub fn build_path(&self) -> Result<String, InvalidImageReference> {
        resolve::build_image_path(&self.image, &self.version, &self.tag, &self.sha)
    }

    pub fn with_defaults(self, defaults: ImageDefaults) -> ImageSpecWithDefaults {
        ImageSpecWithDefaults {
            spec: self,
            defaults,
        }
    }
}

/// Operator-wide image and version, used when a workload leaves its own unset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ImageDefaults {
    pub image: String,
    pub version: String,
}

impl ImageDefaults {
    pub fn new(image: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            version: version.into(),
        }
    }
}

/// An [`ImageSpec`] together with the [`ImageDefaults`] it falls back to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ImageSpecWithDefaults {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub spec: ImageSpec,
    pub defaults: ImageDefaults,
}

impl ImageSpecWithDefaults {
    pub fn resolve(&self) -> ResolvedImage<'_> {
        resolve::resolve_image_path_new(
            &self.spec.image,
            &self.defaults.image,
            &self.spec.version,
            &self.defaults.version,
            &self.spec.tag,
            &self.spec.sha,
        )
    }

    pub fn build_path(&self) -> Result<String, InvalidImageReference> {
        resolve::build_image_path_new(
            &self.spec.image,
            &self.defaults.image,
            &self.spec.version,
            &self.defaults.version,
            &self.spec.tag,
            &self.spec.sha,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_spec_build_path_works() {
        assert_eq!(ImageSpec::default().build_path().unwrap(), "");
        assert_eq!(
            ImageSpec::new("foo.com/bar", "0.0.1", "", "")
                .build_path()
                .unwrap(),
            "foo.com/bar:0.0.1"
        );
        assert_eq!(
            ImageSpec::new("myrepo.com/foo", "1.0", "latest", "abcd1234")
                .build_path()
                .unwrap(),
            "myrepo.com/foo@sha256:abcd1234"
        );
    }

    #[test]
    fn image_spec_with_defaults_build_path_works() {
        let defaults = ImageDefaults::new("default.com/foo", "9.0");

        assert_eq!(
            ImageSpec::new("", "1.0", "", "")
                .with_defaults(defaults.clone())
                .build_path()
                .unwrap(),
            "default.com/foo:1.0"
        );
        assert_eq!(
            ImageSpec::new("myrepo.com/foo", "", "", "")
                .with_defaults(defaults.clone())
                .build_path()
                .unwrap(),
            "myrepo.com/foo:9.0"
        );

        let spec = ImageSpec::new("myrepo.com/foo:10.0.1", "", "", "").with_defaults(defaults);
        assert_eq!(spec.build_path().unwrap(), "myrepo.com/foo:10.0.1");
        assert_eq!(
            spec.resolve(),
            ResolvedImage::Embedded {
                image: "myrepo.com/foo:10.0.1"
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn image_spec_serde_works() {
        let spec: ImageSpec = serde_json::from_str(r#"{"image":"foo.com/bar"}"#).unwrap();
        assert_eq!(spec, ImageSpec::new("foo.com/bar", "", "", ""));

        let spec: ImageSpecWithDefaults = serde_json::from_str(
            r#"{"image":"","version":"1.0","defaults":{"image":"default.com/foo","version":"9.0"}}"#,
        )
        .unwrap();
        assert_eq!(spec.spec, ImageSpec::new("", "1.0", "", ""));
        assert_eq!(spec.defaults, ImageDefaults::new("default.com/foo", "9.0"));
        assert_eq!(spec.build_path().unwrap(), "default.com/foo:1.0");

        let defaults: ImageDefaults = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, ImageDefaults::default());
    }
}
