#![forbid(unsafe_code)]

//! Immutable filter configuration and its builder.

use std::fmt;
use std::sync::Arc;

use chatkit_style::{Color, Decorations, TextDecoration};
use smallvec::SmallVec;

use crate::parse::PlaceholderResolver;

/// Invalid value handed to [`FilterConfigBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("luminance threshold {0} is outside 0..=255")]
    LuminanceOutOfRange(i32),
}

/// What markup a filter lets through.
///
/// Built once with [`FilterConfig::builder`] or a preset and shared freely;
/// nothing mutates it afterwards.
///
/// # Example
/// ```
/// use chatkit_style::{NamedColor, TextDecoration};
/// use chatkit_text::FilterConfig;
///
/// let config = FilterConfig::builder()
///     .legacy_colors(true)
///     .remove_decorations([TextDecoration::Obfuscated])
///     .remove_colors(true, [NamedColor::Black])
///     .prevent_luminance_below(16)
///     .build()
///     .unwrap();
/// assert!(config.legacy_colors());
/// assert_eq!(config.luminance_threshold(), 16);
/// ```
#[derive(Clone)]
pub struct FilterConfig {
    gradients: bool,
    hex_colors: bool,
    standard_colors: bool,
    legacy_colors: bool,
    advanced_transformations: bool,
    blocked_decorations: Decorations,
    blocked_colors: SmallVec<[Color; 4]>,
    block_close_hex: bool,
    luminance_threshold: u8,
    placeholder_resolver: Option<Arc<dyn PlaceholderResolver>>,
}

impl FilterConfig {
    #[must_use]
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::new()
    }

    /// Every modern category enabled, legacy codes stripped, nothing blocked.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            advanced_transformations: true,
            ..Self::default()
        }
    }

    /// Modern colors and decorations plus legacy codes; advanced
    /// transformations are shown as literal text.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            legacy_colors: true,
            ..Self::default()
        }
    }

    /// A builder preloaded with this configuration.
    #[must_use]
    pub fn to_builder(&self) -> FilterConfigBuilder {
        FilterConfigBuilder {
            config: self.clone(),
            luminance_threshold: i32::from(self.luminance_threshold),
        }
    }

    #[inline]
    pub const fn gradients(&self) -> bool {
        self.gradients
    }

    #[inline]
    pub const fn hex_colors(&self) -> bool {
        self.hex_colors
    }

    #[inline]
    pub const fn standard_colors(&self) -> bool {
        self.standard_colors
    }

    #[inline]
    pub const fn legacy_colors(&self) -> bool {
        self.legacy_colors
    }

    #[inline]
    pub const fn advanced_transformations(&self) -> bool {
        self.advanced_transformations
    }

    #[inline]
    pub const fn blocked_decorations(&self) -> Decorations {
        self.blocked_decorations
    }

    #[inline]
    pub fn blocked_colors(&self) -> &[Color] {
        &self.blocked_colors
    }

    #[inline]
    pub const fn block_close_hex(&self) -> bool {
        self.block_close_hex
    }

    #[inline]
    pub const fn luminance_threshold(&self) -> u8 {
        self.luminance_threshold
    }

    pub fn placeholder_resolver(&self) -> Option<&dyn PlaceholderResolver> {
        self.placeholder_resolver.as_deref()
    }

    #[inline]
    pub fn blocks_decoration(&self, decoration: TextDecoration) -> bool {
        self.blocked_decorations.contains(decoration.flag())
    }

    /// Whether `color` must not survive filtering.
    ///
    /// A color is blocked when its RGB value equals a blocked color, when
    /// `block_close_hex` is set and it is close to one, or when its
    /// luminance is below the threshold.
    pub fn blocks_color(&self, color: Color) -> bool {
        let rgb = color.to_rgb();
        if rgb.luminance_u8() < self.luminance_threshold {
            return true;
        }
        self.blocked_colors.iter().any(|blocked| {
            let blocked = blocked.to_rgb();
            blocked == rgb || (self.block_close_hex && blocked.is_close(rgb))
        })
    }
}

impl Default for FilterConfig {
    /// Builder defaults: gradients, hex and standard colors on; legacy and
    /// advanced off; nothing blocked.
    fn default() -> Self {
        Self {
            gradients: true,
            hex_colors: true,
            standard_colors: true,
            legacy_colors: false,
            advanced_transformations: false,
            blocked_decorations: Decorations::empty(),
            blocked_colors: SmallVec::new(),
            block_close_hex: false,
            luminance_threshold: 0,
            placeholder_resolver: None,
        }
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("gradients", &self.gradients)
            .field("hex_colors", &self.hex_colors)
            .field("standard_colors", &self.standard_colors)
            .field("legacy_colors", &self.legacy_colors)
            .field("advanced_transformations", &self.advanced_transformations)
            .field("blocked_decorations", &self.blocked_decorations)
            .field("blocked_colors", &self.blocked_colors)
            .field("block_close_hex", &self.block_close_hex)
            .field("luminance_threshold", &self.luminance_threshold)
            .field(
                "placeholder_resolver",
                &self.placeholder_resolver.as_ref().map(|_| "<resolver>"),
            )
            .finish()
    }
}

/// Chained setters for [`FilterConfig`].
#[derive(Debug, Clone)]
#[must_use]
pub struct FilterConfigBuilder {
    config: FilterConfig,
    /// Raw value, validated by [`FilterConfigBuilder::build`].
    luminance_threshold: i32,
}

impl Default for FilterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FilterConfig::default(),
            luminance_threshold: 0,
        }
    }

    pub fn gradients(mut self, enabled: bool) -> Self {
        self.config.gradients = enabled;
        self
    }

    pub fn hex_colors(mut self, enabled: bool) -> Self {
        self.config.hex_colors = enabled;
        self
    }

    pub fn standard_colors(mut self, enabled: bool) -> Self {
        self.config.standard_colors = enabled;
        self
    }

    pub fn legacy_colors(mut self, enabled: bool) -> Self {
        self.config.legacy_colors = enabled;
        self
    }

    pub fn advanced_transformations(mut self, enabled: bool) -> Self {
        self.config.advanced_transformations = enabled;
        self
    }

    /// Block decorations in addition to any already blocked.
    pub fn remove_decorations(mut self, decorations: impl IntoIterator<Item = TextDecoration>) -> Self {
        for decoration in decorations {
            self.config.blocked_decorations |= decoration.flag();
        }
        self
    }

    /// Block colors in addition to any already blocked, and set whether
    /// colors close to them are blocked too.
    pub fn remove_colors<C: Into<Color>>(
        mut self,
        block_close_hex: bool,
        colors: impl IntoIterator<Item = C>,
    ) -> Self {
        self.config.block_close_hex = block_close_hex;
        for color in colors {
            let color = color.into();
            if !self.config.blocked_colors.contains(&color) {
                self.config.blocked_colors.push(color);
            }
        }
        self
    }

    pub fn block_close_hex(mut self, enabled: bool) -> Self {
        self.config.block_close_hex = enabled;
        self
    }

    /// Colors with a luminance below `threshold` are removed; 0 disables
    /// the check. Must be within `0..=255`.
    pub fn prevent_luminance_below(mut self, threshold: i32) -> Self {
        self.luminance_threshold = threshold;
        self
    }

    pub fn placeholder_resolver(mut self, resolver: impl PlaceholderResolver + 'static) -> Self {
        self.config.placeholder_resolver = Some(Arc::new(resolver));
        self
    }

    /// Share a resolver that is already reference counted.
    pub fn shared_placeholder_resolver(mut self, resolver: Arc<dyn PlaceholderResolver>) -> Self {
        self.config.placeholder_resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Result<FilterConfig, ConfigError> {
        let threshold = u8::try_from(self.luminance_threshold)
            .map_err(|_| ConfigError::LuminanceOutOfRange(self.luminance_threshold))?;
        Ok(FilterConfig {
            luminance_threshold: threshold,
            ..self.config
        })
    }
}

#[cfg(feature = "serde")]
pub use settings::FilterSettings;

#[cfg(feature = "serde")]
mod settings {
    use chatkit_style::{Color, TextDecoration};
    use serde::{Deserialize, Serialize};

    use super::{ConfigError, FilterConfig};

    /// Serializable form of [`FilterConfig`] for configuration files.
    ///
    /// Missing fields take the builder defaults. Converting to a
    /// [`FilterConfig`] goes through the builder, so the same validation
    /// applies. The placeholder resolver is not serializable and is left
    /// unset.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct FilterSettings {
        pub gradients: bool,
        pub hex_colors: bool,
        pub standard_colors: bool,
        pub legacy_colors: bool,
        pub advanced_transformations: bool,
        pub blocked_decorations: Vec<TextDecoration>,
        pub blocked_colors: Vec<Color>,
        pub block_close_hex: bool,
        pub luminance_threshold: i32,
    }

    impl Default for FilterSettings {
        fn default() -> Self {
            Self::from(&FilterConfig::default())
        }
    }

    impl From<&FilterConfig> for FilterSettings {
        fn from(config: &FilterConfig) -> Self {
            Self {
                gradients: config.gradients(),
                hex_colors: config.hex_colors(),
                standard_colors: config.standard_colors(),
                legacy_colors: config.legacy_colors(),
                advanced_transformations: config.advanced_transformations(),
                blocked_decorations: TextDecoration::ALL
                    .into_iter()
                    .filter(|d| config.blocks_decoration(*d))
                    .collect(),
                blocked_colors: config.blocked_colors().to_vec(),
                block_close_hex: config.block_close_hex(),
                luminance_threshold: i32::from(config.luminance_threshold()),
            }
        }
    }

    impl TryFrom<FilterSettings> for FilterConfig {
        type Error = ConfigError;

        fn try_from(settings: FilterSettings) -> Result<Self, Self::Error> {
            FilterConfig::builder()
                .gradients(settings.gradients)
                .hex_colors(settings.hex_colors)
                .standard_colors(settings.standard_colors)
                .legacy_colors(settings.legacy_colors)
                .advanced_transformations(settings.advanced_transformations)
                .remove_decorations(settings.blocked_decorations)
                .remove_colors(settings.block_close_hex, settings.blocked_colors)
                .prevent_luminance_below(settings.luminance_threshold)
                .build()
        }
    }
}
