use std::path::Path;

/// The structural flavor of an object modification file.
///
/// All variants share one layout; they differ only in whether
/// modifications carry a level and data pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatVariant {
    /// Unit data (`.w3u`).
    Unit,
    /// Item data (`.w3t`).
    Item,
    /// Buff and effect data (`.w3h`).
    Buff,
    /// Ability data (`.w3a`).
    Ability,
}

impl FormatVariant {
    /// All supported variants.
    pub const ALL: [FormatVariant; 4] = [Self::Unit, Self::Item, Self::Buff, Self::Ability];

    /// Gets the file extension of the variant, without a dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Unit => "w3u",
            Self::Item => "w3t",
            Self::Buff => "w3h",
            Self::Ability => "w3a",
        }
    }

    /// Whether modifications carry a level and data pointer field.
    pub const fn has_level_pointer(self) -> bool {
        matches!(self, Self::Ability)
    }

    /// Resolves a variant from a file extension.
    ///
    /// The comparison ignores ASCII case and a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL
            .into_iter()
            .find(|v| v.extension().eq_ignore_ascii_case(ext))
    }

    /// Resolves a variant from the extension of a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_extensions() {
        assert_eq!(FormatVariant::from_extension("w3u"), Some(FormatVariant::Unit));
        assert_eq!(FormatVariant::from_extension(".W3T"), Some(FormatVariant::Item));
        assert_eq!(FormatVariant::from_extension("w3h"), Some(FormatVariant::Buff));
        assert_eq!(FormatVariant::from_extension("w3a"), Some(FormatVariant::Ability));
        assert_eq!(FormatVariant::from_extension("w3d"), None);
        assert_eq!(FormatVariant::from_extension("csv"), None);
    }

    #[test]
    fn resolve_paths() {
        assert_eq!(
            FormatVariant::from_path("maps/war3map.w3a"),
            Some(FormatVariant::Ability)
        );
        assert_eq!(FormatVariant::from_path("war3map"), None);
    }

    #[test]
    fn only_abilities_have_levels() {
        let with_levels: Vec<_> = FormatVariant::ALL
            .into_iter()
            .filter(|v| v.has_level_pointer())
            .collect();
        assert_eq!(with_levels, [FormatVariant::Ability]);
    }
}
