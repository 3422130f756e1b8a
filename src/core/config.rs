use crate::core::category::{CategorySpec, FundFamily};
use crate::core::fund::{Metric, WeightSpec};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CategoryConfig {
    pub name: String,
    /// Provider query when it differs from the display name.
    pub query: Option<String>,
    pub family: FundFamily,
    /// Metric label to weight. Labels are validated at load time.
    pub weights: BTreeMap<String, f64>,
}

impl CategoryConfig {
    /// Resolves the config entry into a core category spec, parsing metric
    /// labels into their closed enum.
    pub fn to_spec(&self) -> Result<CategorySpec> {
        let mut weights = WeightSpec::new();
        for (label, weight) in &self.weights {
            let metric: Metric = label.parse().with_context(|| {
                format!("Unknown metric `{label}` in category `{}`", self.name)
            })?;
            weights.insert(metric, *weight);
        }

        Ok(CategorySpec {
            name: self.name.clone(),
            query: self.query.clone(),
            family: self.family,
            weights,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MoneycontrolProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdvisorkhojProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub moneycontrol: Option<MoneycontrolProviderConfig>,
    pub advisorkhoj: Option<AdvisorkhojProviderConfig>,
}

impl ProvidersConfig {
    pub fn moneycontrol_base_url(&self) -> &str {
        self.moneycontrol
            .as_ref()
            .map_or("https://api.moneycontrol.com", |p| p.base_url.as_str())
    }

    pub fn advisorkhoj_base_url(&self) -> &str {
        self.advisorkhoj
            .as_ref()
            .map_or("https://api.advisorkhoj.com", |p| p.base_url.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fundrank")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "fundrank")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Weight validation happens once here; the ranking core trusts its
    /// inputs afterwards.
    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            bail!("No categories configured");
        }

        for category in &self.categories {
            if category.name.trim().is_empty() {
                bail!("Category with an empty name in config");
            }
            if category.weights.is_empty() {
                bail!("Category `{}` has no metric weights", category.name);
            }
            for (label, weight) in &category.weights {
                label.parse::<Metric>().with_context(|| {
                    format!("Category `{}` weights unknown metric `{label}`", category.name)
                })?;
                if !weight.is_finite() || *weight < 0.0 {
                    bail!(
                        "Category `{}` has invalid weight {} for `{label}`",
                        category.name,
                        weight
                    );
                }
            }
        }

        Ok(())
    }
}
