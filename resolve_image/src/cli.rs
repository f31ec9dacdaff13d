use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use constcat::concat;
use image_reference::{ImageSpec, ResolvedImage, DIGEST_ALGORITHM};
use log::debug;

use crate::{defaults, Result};

#[derive(Debug, Default, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Print the image reference only.
    #[default]
    Text,
    /// Print a JSON object with the image reference and the rule that produced it.
    Json,
}

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Image repository requested by the workload, e.g. `quay.io/prometheus/prometheus`.
    #[arg(long = "image", default_value = "")]
    image: String,

    /// Image version requested by the workload. Appended as the tag when neither a tag nor a digest
    /// is given.
    #[arg(long = "image-version", default_value = "")]
    image_version: String,

    /// Image tag. Takes precedence over the version.
    #[arg(long = "tag", default_value = "")]
    tag: String,

    #[arg(long = "sha", default_value = "", help = concat!("Image digest without the \"", DIGEST_ALGORITHM, ":\" prefix. Takes precedence over the tag and version."))]
    sha: String,

    /// YAML or JSON file with the operator defaults, `image` and `version`, used when the workload
    /// leaves its own unset.
    #[arg(long = "defaults")]
    defaults: Option<PathBuf>,

    /// Override the default image from the defaults file.
    #[arg(long = "default-image")]
    default_image: Option<String>,

    /// Override the default version from the defaults file.
    #[arg(long = "default-version")]
    default_version: Option<String>,

    /// Fail if the resolved image reference is not a valid reference.
    #[arg(long = "strict", default_value_t)]
    strict: bool,

    #[arg(long = "output", value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    image: String,
    kind: &'a str,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        println!("{}", self.resolve()?);
        Ok(())
    }

    fn resolve(self) -> Result<String> {
        let Cli {
            image,
            image_version,
            tag,
            sha,
            defaults: defaults_path,
            default_image,
            default_version,
            strict,
            output,
        } = self;

        let spec = ImageSpec::new(image, image_version, tag, sha);
        match defaults::resolve(defaults_path.as_deref(), default_image, default_version)? {
            Some(defaults) => {
                let spec = spec.with_defaults(defaults);
                render(spec.resolve(), strict, output)
            }
            None => render(spec.resolve(), strict, output),
        }
    }
}

fn render(resolved: ResolvedImage<'_>, strict: bool, output: OutputFormat) -> Result<String> {
    debug!("resolved image reference using the {} rule", resolved.kind());

    if strict {
        resolved.validate()?;
    }

    Ok(match output {
        OutputFormat::Text => resolved.to_string(),
        OutputFormat::Json => serde_json::to_string(&JsonOutput {
            image: resolved.to_string(),
            kind: resolved.kind(),
        })?,
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn resolve<const N: usize>(args: [&str; N]) -> Result<String> {
        Cli::try_parse_from(std::iter::once("resolve-image").chain(args))?.resolve()
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_without_defaults_works() {
        assert_eq!(resolve([]).unwrap(), "");
        assert_eq!(
            resolve(["--image", "foo.com/bar", "--image-version", "0.0.1"]).unwrap(),
            "foo.com/bar:0.0.1"
        );
        assert_eq!(
            resolve([
                "--image",
                "myrepo.com/foo",
                "--image-version",
                "1.0",
                "--tag",
                "latest",
                "--sha",
                "abcd1234",
            ])
            .unwrap(),
            "myrepo.com/foo@sha256:abcd1234"
        );
    }

    #[test]
    fn resolve_with_defaults_works() {
        assert_eq!(
            resolve([
                "--image-version",
                "1.0",
                "--default-image",
                "default.com/foo",
                "--default-version",
                "9.0",
            ])
            .unwrap(),
            "default.com/foo:1.0"
        );
        assert_eq!(
            resolve([
                "--image",
                "myrepo.com/foo:10.0.1",
                "--default-image",
                "default.com/foo",
                "--default-version",
                "9.0",
            ])
            .unwrap(),
            "myrepo.com/foo:10.0.1"
        );
    }

    #[test]
    fn resolve_with_defaults_file_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.yaml");
        std::fs::write(&path, "image: default.com/foo\nversion: \"9.0\"\n").unwrap();
        let path = path.to_str().unwrap();

        assert_eq!(resolve(["--defaults", path]).unwrap(), "default.com/foo:9.0");
        assert_eq!(
            resolve(["--defaults", path, "--image", "myrepo.com/foo"]).unwrap(),
            "myrepo.com/foo:9.0"
        );
        assert_eq!(
            resolve(["--defaults", path, "--default-version", "9.1"]).unwrap(),
            "default.com/foo:9.1"
        );
    }

    #[test]
    fn resolve_strict_works() {
        assert_eq!(
            resolve(["--image", "Foo/Bar", "--image-version", "1.0"]).unwrap(),
            "Foo/Bar:1.0"
        );
        assert!(resolve(["--image", "Foo/Bar", "--image-version", "1.0", "--strict"]).is_err());
        assert_eq!(
            resolve(["--image", "foo.com/bar", "--tag", "latest", "--strict"]).unwrap(),
            "foo.com/bar:latest"
        );
    }

    #[test]
    fn resolve_json_output_works() {
        assert_eq!(
            resolve([
                "--image",
                "foo.com/bar",
                "--image-version",
                "0.0.1",
                "--output",
                "json",
            ])
            .unwrap(),
            r#"{"image":"foo.com/bar:0.0.1","kind":"version"}"#
        );
    }
}
