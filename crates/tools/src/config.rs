use affine_core::{layer_dims, InitConfig, Tolerance};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Problem shape, seed and tolerance for one demonstration run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub seed: u64,
    pub n_samples: usize,
    pub d_in: usize,
    pub hidden: Vec<usize>,
    pub d_out: usize,
    pub init: InitConfig,
    pub tolerance: Tolerance,
    /// Derive atol from the sequence magnitude instead of `tolerance`
    pub auto_tolerance: bool,
    /// Sample rows printed per output
    pub rows: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_samples: 8,
            d_in: 5,
            hidden: vec![7, 6, 4],
            d_out: 3,
            init: InitConfig::default(),
            tolerance: Tolerance::default(),
            auto_tolerance: false,
            rows: 3,
        }
    }
}

impl RunConfig {
    pub fn dims(&self) -> Vec<usize> {
        layer_dims(self.d_in, &self.hidden, self.d_out)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_samples == 0 {
            bail!("n_samples must be >= 1");
        }
        if let Some(pos) = self.dims().iter().position(|&d| d == 0) {
            bail!("layer dimension at position {} is zero (dims = {:?})", pos, self.dims());
        }
        if !(self.init.scale.is_finite() && self.init.scale >= 0.0) {
            bail!("init scale must be finite and >= 0, got {}", self.init.scale);
        }
        self.tolerance.validate().context("invalid tolerance")?;
        Ok(())
    }
}

/// Loads a run config; YAML for `.yaml`/`.yml`, JSON for `.json`,
/// otherwise JSON then YAML.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
    let cfg = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&data)
            .with_context(|| format!("invalid YAML config {}", path.display()))?,
        Some("json") => serde_json::from_str(&data)
            .with_context(|| format!("invalid JSON config {}", path.display()))?,
        _ => match serde_json::from_str(&data) {
            Ok(cfg) => cfg,
            Err(_) => serde_yaml::from_str(&data)
                .with_context(|| format!("config {} is neither JSON nor YAML", path.display()))?,
        },
    };
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.dims(), vec![5, 7, 6, 4, 3]);
        assert_eq!(cfg.init.scale, 0.5);
        assert_eq!(cfg.tolerance.atol, 1e-10);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_json() {
        let cfg: RunConfig =
            serde_json::from_str(r#"{"seed": 7, "hidden": [3], "tolerance": {"atol": 1e-8}}"#)
                .unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.dims(), vec![5, 3, 3]);
        assert_eq!(cfg.tolerance.atol, 1e-8);
        // 未指定は既定値
        assert_eq!(cfg.tolerance.rtol, 1e-5);
        assert_eq!(cfg.n_samples, 8);
    }

    #[test]
    fn test_yaml() {
        let cfg: RunConfig =
            serde_yaml::from_str("d_in: 2\nhidden: []\nd_out: 1\ninit:\n  scale: 0.1\n").unwrap();
        assert_eq!(cfg.dims(), vec![2, 1]);
        assert_eq!(cfg.init.scale, 0.1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<RunConfig>(r#"{"sead": 1}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_dim() {
        let cfg = RunConfig { hidden: vec![4, 0], ..RunConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let cfg = RunConfig {
            tolerance: Tolerance { atol: -1.0, rtol: 0.0 },
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
