//! Theming - light and dark colour palettes exposed as CSS variables

mod color;

pub use color::Color;

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// Base colours every palette is derived from
pub mod colors {
    use super::Color;

    pub const BLACK: Color = Color::rgb(0x23, 0x1f, 0x20);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const GRAY: Color = Color::rgb(0xf7, 0xf7, 0xf7);
    pub const RED: Color = Color::rgb(0xcc, 0x8b, 0x86);

    pub fn all() -> [(&'static str, Color); 4] {
        [("black", BLACK), ("white", WHITE), ("gray", GRAY), ("red", RED)]
    }
}

/// A named colour palette
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub colors: IndexMap<&'static str, String>,
}

impl Theme {
    /// The light theme
    pub fn light() -> Self {
        use colors::*;
        Self::with_palette(
            "default",
            [
                ("primary", WHITE.darken(0.1)),
                ("text", BLACK),
                ("headerText", BLACK),
                ("bodyBg", GRAY),
                ("headerBg", WHITE.darken(0.1)),
                ("link", RED),
            ],
        )
    }

    /// The dark theme
    pub fn dark() -> Self {
        use colors::*;
        Self::with_palette(
            "dark",
            [
                ("primary", BLACK.lighten(0.1)),
                ("text", WHITE),
                ("headerText", WHITE),
                ("bodyBg", BLACK.lighten(0.05)),
                ("headerBg", BLACK.lighten(0.1)),
                ("link", RED.lighten(0.1)),
            ],
        )
    }

    fn with_palette(name: &'static str, palette: [(&'static str, Color); 6]) -> Self {
        let mut colors: IndexMap<&'static str, String> = palette
            .iter()
            .map(|(key, color)| (*key, color.to_string()))
            .collect();
        for (key, color) in colors::all() {
            colors.insert(key, color.to_string());
        }
        // Secondary buttons sit on a translucent primary
        if let Some(primary) = palette.iter().find(|(k, _)| *k == "primary") {
            colors.insert("primaryTranslucent", primary.1.rgba(0.1));
        }
        Self { name, colors }
    }

    /// Look a theme up by name
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "default" | "light" => Ok(Self::light()),
            "dark" => Ok(Self::dark()),
            _ => bail!("Unknown theme: {}. Available: default, dark", name),
        }
    }

    /// utterances theme matching this palette
    pub fn comments_theme(&self) -> &'static str {
        if self.name == "default" {
            "github-light"
        } else {
            "github-dark"
        }
    }

    /// Palette as a block of CSS custom properties
    pub fn css_variables(&self, selector: &str) -> String {
        let mut css = format!("{} {{\n", selector);
        for (key, value) in &self.colors {
            css.push_str(&format!("  --{}: {};\n", css_name(key), value));
        }
        css.push('}');
        css
    }
}

/// `headerText` -> `header-text`
fn css_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_palette() {
        let theme = Theme::light();
        assert_eq!(theme.colors["primary"], "#e6e6e6");
        assert_eq!(theme.colors["headerBg"], "#e6e6e6");
        assert_eq!(theme.colors["link"], colors::RED.to_string());
        assert_eq!(theme.colors["white"], "#ffffff");
        assert_eq!(theme.comments_theme(), "github-light");
    }

    #[test]
    fn test_dark_palette() {
        let theme = Theme::dark();
        assert_eq!(theme.colors["text"], "#ffffff");
        assert_eq!(theme.colors["link"], colors::RED.lighten(0.1).to_string());
        assert_eq!(theme.comments_theme(), "github-dark");
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("dark").unwrap().name, "dark");
        assert_eq!(Theme::by_name("default").unwrap().name, "default");
        assert!(Theme::by_name("solarized").is_err());
    }

    #[test]
    fn test_css_variables() {
        let css = Theme::light().css_variables(":root");
        assert!(css.starts_with(":root {"));
        assert!(css.contains("--header-text: #231f20;"));
        assert!(css.contains("--primary-translucent: rgba(230,230,230,0.1);"));
    }
}
