//! Container image reference grammar, following
//! [reference.go](https://github.com/distribution/distribution/blob/v2.7.1/reference/reference.go):
//!
//! ```txt
//! reference          := name [ ":" tag ] [ "@" digest ]
//! name               := [domain '/'] path-component ['/' path-component]*
//! domain             := domain-component ['.' domain-component]* [':' port-number]
//! domain-component   := /([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])/
//! port-number        := /[0-9]+/
//! path-component     := alpha-numeric [separator alpha-numeric]*
//! alpha-numeric      := /[a-z0-9]+/
//! separator          := /[_.]|__|[-]*/
//! tag                := /[\w][\w.-]{0,127}/
//! digest             := digest-algorithm ":" digest-hex
//! digest-algorithm   := /[A-Za-z][A-Za-z0-9]*/ [ /[+.-_]/ /[A-Za-z][A-Za-z0-9]*/ ]*
//! digest-hex         := /[0-9a-fA-F]{32,}/
//! ```
//!
//! The first component is only a domain when it looks like a host: it contains a `.`, carries a
//! port or equals `localhost`. Otherwise it is the first path component, as in `library/ubuntu`.

use std::{fmt, sync::LazyLock};

#[cfg(feature = "serde")]
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use regex::Regex;

use crate::InvalidImageReference;

macro_rules! path_component {
    () => {
        r"[a-z0-9]+(?:(?:[_.]|__|-+)[a-z0-9]+)*"
    };
}

macro_rules! domain_component {
    () => {
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?"
    };
}

static IMAGE_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^",
        r"(?:(?P<domain>",
        domain_component!(),
        r"(?:\.",
        domain_component!(),
        r")*)(?::(?P<port>[0-9]+))?/)?",
        r"(?P<path>",
        path_component!(),
        r"(?:/",
        path_component!(),
        r")*)",
        r"(?::(?P<tag>[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}))?",
        r"(?:@(?P<digest>(?P<algorithm>[A-Za-z][A-Za-z0-9]*(?:[+._-][A-Za-z][A-Za-z0-9]*)*):(?P<hex>[0-9a-fA-F]{32,})))?",
        r"$",
    ))
    .unwrap()
});

static PATH_COMPONENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(concat!(r"^", path_component!(), r"$")).unwrap());

const LOCALHOST: &str = "localhost";

/// A parsed container image reference that borrows the string it was parsed from:
/// ```txt
/// <domain>:<port>/<path>:<tag>@<algorithm>:<hex>
/// <registry----->/<path>:<tag>@<digest--------->
/// ```
/// Only `<path>` is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageReference<'a> {
    buffer: &'a str,
    registry: Option<&'a str>,
    domain: Option<&'a str>,
    port: Option<&'a str>,
    path: &'a str,
    tag: Option<&'a str>,
    digest: Option<&'a str>,
    digest_algorithm: Option<&'a str>,
    digest_hex: Option<&'a str>,
}

impl<'a> ImageReference<'a> {
    pub fn parse(value: &'a str) -> Result<Self, InvalidImageReference> {
        let captures = IMAGE_REFERENCE_REGEX
            .captures(value)
            .ok_or_else(|| InvalidImageReference::new(value))?;
        let capture = |name: &str| captures.name(name).map(|m| m.as_str());

        let path_match = captures
            .name("path")
            .ok_or_else(|| InvalidImageReference::new(value))?;
        let domain_match = captures.name("domain");
        let port_match = captures.name("port");

        let is_host = match domain_match {
            Some(domain) => {
                port_match.is_some()
                    || domain.as_str() == LOCALHOST
                    || domain.as_str().contains('.')
            }
            None => false,
        };

        let (registry, domain, port, path) = match domain_match {
            Some(domain) if is_host => {
                let end = port_match.map_or(domain.end(), |port| port.end());
                (
                    Some(&value[domain.start()..end]),
                    Some(domain.as_str()),
                    port_match.map(|port| port.as_str()),
                    path_match.as_str(),
                )
            }
            Some(domain) => {
                if !PATH_COMPONENT_REGEX.is_match(domain.as_str()) {
                    return Err(InvalidImageReference::new(value));
                }
                (None, None, None, &value[domain.start()..path_match.end()])
            }
            None => (None, None, None, path_match.as_str()),
        };

        Ok(Self {
            buffer: value,
            registry,
            domain,
            port,
            path,
            tag: capture("tag"),
            digest: capture("digest"),
            digest_algorithm: capture("algorithm"),
            digest_hex: capture("hex"),
        })
    }

    /// Returns the `<domain>(:<port>)?` section.
    pub fn registry(&self) -> Option<&'a str> {
        self.registry
    }

    pub fn domain(&self) -> Option<&'a str> {
        self.domain
    }

    pub fn port(&self) -> Option<&'a str> {
        self.port
    }

    /// Returns the repository path. This is the only required section.
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn tag(&self) -> Option<&'a str> {
        self.tag
    }

    /// Returns the `<algorithm>:<hex>` section.
    pub fn digest(&self) -> Option<&'a str> {
        self.digest
    }

    pub fn digest_algorithm(&self) -> Option<&'a str> {
        self.digest_algorithm
    }

    pub fn digest_hex(&self) -> Option<&'a str> {
        self.digest_hex
    }

    pub fn as_str(&self) -> &'a str {
        self.buffer
    }
}

impl<'a> TryFrom<&'a str> for ImageReference<'a> {
    type Error = InvalidImageReference;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for ImageReference<'_> {
    fn as_ref(&self) -> &str {
        self.buffer
    }
}

impl fmt::Display for ImageReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.buffer)
    }
}

#[cfg(feature = "serde")]
impl Serialize for ImageReference<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.buffer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ImageReference<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Self::parse(Deserialize::deserialize(deserializer)?).map_err(::serde::de::Error::custom)
    }
}
