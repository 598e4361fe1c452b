//! Icon font families: stylesheet imports and markup conventions.

use crate::escape::slug;

/// How a family selects a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Ligature fonts: the icon name is the element's text content.
    Ligature { class: &'static str },
    /// Class-per-icon fonts: `<base> <prefix><name>`.
    Class {
        base: Option<&'static str>,
        prefix: &'static str,
    },
}

/// A known icon font.
#[derive(Debug, Clone, Copy)]
pub struct IconFamily {
    pub import: &'static str,
    pub glyph: Glyph,
}

const FAMILIES: &[(&str, IconFamily)] = &[
    (
        "material-symbols-outlined",
        IconFamily {
            import: "https://fonts.googleapis.com/css2?family=Material+Symbols+Outlined",
            glyph: Glyph::Ligature {
                class: "material-symbols-outlined",
            },
        },
    ),
    (
        "material-symbols-rounded",
        IconFamily {
            import: "https://fonts.googleapis.com/css2?family=Material+Symbols+Rounded",
            glyph: Glyph::Ligature {
                class: "material-symbols-rounded",
            },
        },
    ),
    (
        "material-symbols-sharp",
        IconFamily {
            import: "https://fonts.googleapis.com/css2?family=Material+Symbols+Sharp",
            glyph: Glyph::Ligature {
                class: "material-symbols-sharp",
            },
        },
    ),
    (
        "material-icons",
        IconFamily {
            import: "https://fonts.googleapis.com/icon?family=Material+Icons",
            glyph: Glyph::Ligature {
                class: "material-icons",
            },
        },
    ),
    (
        "lucide",
        IconFamily {
            import: "https://unpkg.com/lucide-static@latest/font/lucide.css",
            glyph: Glyph::Class {
                base: None,
                prefix: "icon-",
            },
        },
    ),
    (
        "phosphor",
        IconFamily {
            import: "https://unpkg.com/@phosphor-icons/web@2.1.1/src/regular/style.css",
            glyph: Glyph::Class {
                base: Some("ph"),
                prefix: "ph-",
            },
        },
    ),
];

/// Look up a family by name, ignoring case and separators.
pub fn lookup(family: &str) -> Option<IconFamily> {
    let key = slug(family);
    FAMILIES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, family)| *family)
}

/// The set of icon stylesheet imports for one conversion, in first-use order.
#[derive(Debug, Default)]
pub struct IconImports {
    urls: Vec<&'static str>,
}

impl IconImports {
    /// Record an import. Returns `false` if it was already present.
    pub fn insert(&mut self, url: &'static str) -> bool {
        if self.urls.contains(&url) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// One `@import url("…");` line per family.
    pub fn to_css(&self) -> String {
        self.urls
            .iter()
            .map(|url| format!("@import url(\"{url}\");\n"))
            .collect()
    }
}
