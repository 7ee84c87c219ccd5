use crate::cli::GraftArgs;
use crate::error::{CliError, Result};
use abgraft::core::models::scheme::{CdrDefinition, Scheme};
use abgraft::engine::config::{GermlineChoice, HumanizationParams, HumanizationParamsBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialChainConfig {
    v_germline: Option<String>,
    j_germline: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialGraftConfig {
    scheme: Option<Scheme>,
    cdr_definition: Option<CdrDefinition>,
    backmutate_vernier: Option<bool>,
    germlines: Option<PathBuf>,
    heavy: Option<PartialChainConfig>,
    light: Option<PartialChainConfig>,
}

/// Fully resolved settings for one `graft` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftConfig {
    pub params: HumanizationParams,
    pub germlines_path: Option<PathBuf>,
}

impl PartialGraftConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        // Relative germline paths are taken from the config file's directory.
        if let (Some(germlines), Some(dir)) = (config.germlines.as_mut(), path.parent()) {
            if germlines.is_relative() {
                *germlines = dir.join(&*germlines);
            }
        }
        Ok(config)
    }

    /// Command-line values win over the file, which wins over the defaults.
    pub fn merge_with_cli(self, args: &GraftArgs) -> Result<GraftConfig> {
        let heavy = self.heavy.unwrap_or_default();
        let light = self.light.unwrap_or_default();
        let defaults = HumanizationParams::default();

        let choice = |cli: Option<&String>, file: Option<String>| -> GermlineChoice {
            cli.cloned()
                .or(file)
                .and_then(|id| id.parse().ok())
                .unwrap_or_default()
        };

        let params = HumanizationParamsBuilder::new()
            .scheme(args.scheme.or(self.scheme).unwrap_or(defaults.scheme))
            .cdr_definition(
                args.cdr_definition
                    .or(self.cdr_definition)
                    .unwrap_or(defaults.cdr_definition),
            )
            .heavy_v_germline(choice(args.heavy_v_germline.as_ref(), heavy.v_germline))
            .heavy_j_germline(choice(args.heavy_j_germline.as_ref(), heavy.j_germline))
            .light_v_germline(choice(args.light_v_germline.as_ref(), light.v_germline))
            .light_j_germline(choice(args.light_j_germline.as_ref(), light.j_germline))
            .backmutate_vernier(
                args.backmutate_vernier || self.backmutate_vernier.unwrap_or(defaults.backmutate_vernier),
            )
            .refinement_iterations(0)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(GraftConfig {
            params,
            germlines_path: args.germlines.clone().or(self.germlines),
        })
    }
}
