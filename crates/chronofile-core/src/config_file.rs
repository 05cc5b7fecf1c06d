use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{NamingStyle, RunConfig};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub dirs: Option<DirsConfig>,
    pub resolver: Option<ResolverFileConfig>,
    pub naming: Option<NamingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirsConfig {
    pub backup_dir_name: Option<String>,
    pub output_text_dir_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverFileConfig {
    pub date_label: Option<String>,
    pub date_format_primary: Option<String>,
    pub date_format_fallback: Option<String>,
    pub fixed_line_positions: Option<[usize; 2]>,
    pub fixed_line_format: Option<String>,
    pub year_min: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    /// `"auto"` or `"always-range"`.
    pub style: Option<String>,
}

/// Platform config directory path: `<config_dir>/chronofile/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chronofile").join("config.toml"))
}

/// Load config by cascading a working-directory `.chronofile.toml` over the
/// platform config. Working-directory values override platform values.
pub fn load_config(working_dir: &std::path::Path) -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let local = load_from_path(&working_dir.join(".chronofile.toml"));

    match (platform, local) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(l)) => l,
        (Some(p), Some(l)) => merge(p, l),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    fn pick<T: Clone, S>(
        overlay: &Option<S>,
        base: &Option<S>,
        get: impl Fn(&S) -> Option<T>,
    ) -> Option<T> {
        overlay
            .as_ref()
            .and_then(&get)
            .or_else(|| base.as_ref().and_then(&get))
    }

    ConfigFile {
        dirs: Some(DirsConfig {
            backup_dir_name: pick(&overlay.dirs, &base.dirs, |d| d.backup_dir_name.clone()),
            output_text_dir_name: pick(&overlay.dirs, &base.dirs, |d| {
                d.output_text_dir_name.clone()
            }),
        }),
        resolver: Some(ResolverFileConfig {
            date_label: pick(&overlay.resolver, &base.resolver, |r| r.date_label.clone()),
            date_format_primary: pick(&overlay.resolver, &base.resolver, |r| {
                r.date_format_primary.clone()
            }),
            date_format_fallback: pick(&overlay.resolver, &base.resolver, |r| {
                r.date_format_fallback.clone()
            }),
            fixed_line_positions: pick(&overlay.resolver, &base.resolver, |r| {
                r.fixed_line_positions
            }),
            fixed_line_format: pick(&overlay.resolver, &base.resolver, |r| {
                r.fixed_line_format.clone()
            }),
            year_min: pick(&overlay.resolver, &base.resolver, |r| r.year_min),
        }),
        naming: Some(NamingConfig {
            style: pick(&overlay.naming, &base.naming, |n| n.style.clone()),
        }),
    }
}

impl ConfigFile {
    /// Overlay file values onto a [`RunConfig`]. CLI flags applied after
    /// this call still win over file values.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(dirs) = &self.dirs {
            if let Some(v) = &dirs.backup_dir_name {
                config.backup_dir_name = v.clone();
            }
            if let Some(v) = &dirs.output_text_dir_name {
                config.output_text_dir_name = v.clone();
            }
        }
        if let Some(r) = &self.resolver {
            if let Some(v) = &r.date_label {
                config.resolver.date_label = v.clone();
            }
            if let Some(v) = &r.date_format_primary {
                config.resolver.date_format_primary = v.clone();
            }
            if let Some(v) = &r.date_format_fallback {
                config.resolver.date_format_fallback = v.clone();
            }
            if let Some(v) = r.fixed_line_positions {
                config.resolver.fixed_line_positions = v;
            }
            if let Some(v) = &r.fixed_line_format {
                config.resolver.fixed_line_format = v.clone();
            }
            if let Some(v) = r.year_min {
                config.resolver.year_min = v;
            }
        }
        if let Some(naming) = &self.naming
            && let Some(style) = &naming.style
        {
            match style.as_str() {
                "always-range" => config.naming = NamingStyle::AlwaysRange,
                "auto" => config.naming = NamingStyle::Auto,
                other => {
                    tracing::warn!(style = other, "unknown naming style in config, ignoring")
                }
            }
        }
    }
}
