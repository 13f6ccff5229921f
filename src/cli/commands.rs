// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   boost     : gradient-boosted trees (xgb / lgbm / catb preset)
//   attention : attention-based neural network
//   synth     : write a synthetic dataset CSV
//
// Every training subcommand shares DataArgs via #[command(flatten)].
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{builder::RangedU64ValueParser, Args, Subcommand, ValueEnum};

use crate::application::pipeline::{DataConfig, EstimatorConfig, PipelineConfig};
use crate::data::label_encoder::LabelEncoding;
use crate::data::synthetic::SyntheticConfig;
use crate::ml::attention::AttentionConfig;
use crate::ml::booster::{BoosterConfig, BoosterFlavor};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a gradient-boosted tree ensemble
    Boost(BoostArgs),

    /// Train the attention-based neural network
    Attention(AttentionArgs),

    /// Write a synthetic antibody-shaped CSV
    Synth(SynthArgs),
}

/// Label encoding strategy as typed on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EncodingArg {
    Auto,
    Offset,
    Categorical,
}

impl From<EncodingArg> for LabelEncoding {
    fn from(e: EncodingArg) -> Self {
        match e {
            EncodingArg::Auto        => LabelEncoding::Auto,
            EncodingArg::Offset      => LabelEncoding::Offset,
            EncodingArg::Categorical => LabelEncoding::Categorical,
        }
    }
}

/// Boosting preset as typed on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FlavorArg {
    Xgb,
    Lgbm,
    Catb,
}

impl From<FlavorArg> for BoosterFlavor {
    fn from(f: FlavorArg) -> Self {
        match f {
            FlavorArg::Xgb  => BoosterFlavor::Xgb,
            FlavorArg::Lgbm => BoosterFlavor::Lgbm,
            FlavorArg::Catb => BoosterFlavor::Catb,
        }
    }
}

/// Arguments shared by every training subcommand
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// CSV file with one label column and numeric feature columns
    #[arg(long, default_value = "data/antibodies.csv")]
    pub data: String,

    /// Name of the label column
    #[arg(long, default_value = "class")]
    pub label_column: String,

    /// Non-feature column to remove before training
    #[arg(long, default_value = "id")]
    pub drop_column: String,

    /// Keep every column (ignore --drop-column)
    #[arg(long)]
    pub no_drop: bool,

    /// How label strings become class indices
    #[arg(long, value_enum, default_value_t = EncodingArg::Auto)]
    pub label_encoding: EncodingArg,

    /// Label value that maps to class 0 (offset encoding only);
    /// defaults to the smallest label in the data
    #[arg(long, allow_negative_numbers = true)]
    pub label_offset: Option<i64>,

    /// Fraction of rows held out for testing
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Seed for the split and any stochastic training step
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Split without preserving class proportions
    #[arg(long)]
    pub no_stratify: bool,

    /// Directory for run_config.json, *_report.json and metrics.csv
    #[arg(long)]
    pub report_dir: Option<String>,

    /// Load the whole run configuration from a JSON file
    /// (e.g. a previous run_config.json); other flags are ignored
    #[arg(long)]
    pub config: Option<String>,
}

impl From<&DataArgs> for DataConfig {
    fn from(a: &DataArgs) -> Self {
        DataConfig {
            csv_path:       a.data.clone(),
            label_column:   a.label_column.clone(),
            drop_column:    (!a.no_drop).then(|| a.drop_column.clone()),
            label_encoding: a.label_encoding.into(),
            label_offset:   a.label_offset,
            test_fraction:  a.test_size,
            stratify:       !a.no_stratify,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `boost` command.
/// Unset tuning flags fall back to the chosen preset.
#[derive(Args, Debug)]
pub struct BoostArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Hyperparameter preset
    #[arg(long, value_enum, default_value_t = FlavorArg::Xgb)]
    pub flavor: FlavorArg,

    /// Maximum tree depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Shrinkage applied to each tree
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Number of boosting rounds
    #[arg(long)]
    pub rounds: Option<usize>,

    /// Minimum rows per leaf (higher = stronger regularization)
    #[arg(long)]
    pub min_leaf_size: Option<usize>,
}

impl From<&BoostArgs> for BoosterConfig {
    fn from(a: &BoostArgs) -> Self {
        let preset = BoosterFlavor::from(a.flavor).defaults();
        BoosterConfig {
            flavor:        preset.flavor,
            max_depth:     a.max_depth.unwrap_or(preset.max_depth),
            learning_rate: a.learning_rate.unwrap_or(preset.learning_rate),
            rounds:        a.rounds.unwrap_or(preset.rounds),
            min_leaf_size: a.min_leaf_size.unwrap_or(preset.min_leaf_size),
        }
    }
}

impl From<BoostArgs> for PipelineConfig {
    fn from(a: BoostArgs) -> Self {
        PipelineConfig {
            data:       DataConfig::from(&a.data),
            estimator:  EstimatorConfig::Booster(BoosterConfig::from(&a)),
            report_dir: a.data.report_dir.clone(),
        }
    }
}

/// All arguments for the `attention` command
#[derive(Args, Debug)]
pub struct AttentionArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Embedding width of each feature token
    /// (must be divisible by --num-heads)
    #[arg(long, default_value_t = 32, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub d_model: usize,

    /// Attention heads per encoder layer
    #[arg(long, default_value_t = 4, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub num_heads: usize,

    /// Stacked encoder layers
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Inner width of the feed-forward network
    #[arg(long, default_value_t = 64)]
    pub d_ff: usize,

    /// Dropout probability
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// AdamW weight decay
    #[arg(long, default_value_t = 1e-4)]
    pub weight_decay: f64,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,
}

impl From<AttentionArgs> for PipelineConfig {
    fn from(a: AttentionArgs) -> Self {
        let estimator = EstimatorConfig::Attention(AttentionConfig {
            d_model:       a.d_model,
            num_heads:     a.num_heads,
            num_layers:    a.num_layers,
            d_ff:          a.d_ff,
            dropout:       a.dropout,
            weight_decay:  a.weight_decay,
            learning_rate: a.lr,
            epochs:        a.epochs,
            batch_size:    a.batch_size,
        });
        PipelineConfig {
            data: DataConfig::from(&a.data),
            estimator,
            report_dir: a.data.report_dir,
        }
    }
}

/// All arguments for the `synth` command
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Where to write the CSV
    #[arg(long, default_value = "data/synthetic.csv")]
    pub output: String,

    #[arg(long, default_value_t = 100)]
    pub rows: usize,

    #[arg(long, default_value_t = 10)]
    pub features: usize,

    #[arg(long, default_value_t = 6)]
    pub classes: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<&SynthArgs> for SyntheticConfig {
    fn from(a: &SynthArgs) -> Self {
        SyntheticConfig {
            rows:     a.rows,
            features: a.features,
            classes:  a.classes,
            seed:     a.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["antibody-classifier"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_boost_defaults_follow_preset() {
        let Commands::Boost(args) = parse(&["boost", "--flavor", "lgbm"]) else {
            panic!("expected boost");
        };
        let cfg = PipelineConfig::from(args);
        assert_eq!(cfg.estimator, EstimatorConfig::Booster(BoosterFlavor::Lgbm.defaults()));
        assert!(cfg.data.stratify);
        assert_eq!(cfg.data.drop_column.as_deref(), Some("id"));
    }

    #[test]
    fn test_boost_overrides_and_flags() {
        let Commands::Boost(args) = parse(&[
            "boost", "--rounds", "7", "--no-drop", "--no-stratify",
            "--label-encoding", "categorical", "--test-size", "0.3",
        ]) else {
            panic!("expected boost");
        };
        let cfg = PipelineConfig::from(args);
        let EstimatorConfig::Booster(b) = &cfg.estimator else { panic!("expected booster") };
        assert_eq!(b.rounds, 7);
        assert_eq!(b.max_depth, BoosterFlavor::Xgb.defaults().max_depth);
        assert_eq!(cfg.data.drop_column, None);
        assert!(!cfg.data.stratify);
        assert_eq!(cfg.data.label_encoding, LabelEncoding::Categorical);
        assert_eq!(cfg.data.test_fraction, 0.3);
    }

    #[test]
    fn test_attention_args_map_to_config() {
        let Commands::Attention(args) = parse(&[
            "attention", "--num-layers", "3", "--d-model", "16", "--num-heads", "2",
            "--report-dir", "out",
        ]) else {
            panic!("expected attention");
        };
        let cfg = PipelineConfig::from(args);
        let EstimatorConfig::Attention(a) = &cfg.estimator else { panic!("expected attention") };
        assert_eq!((a.num_layers, a.d_model, a.num_heads), (3, 16, 2));
        assert_eq!(cfg.report_dir.as_deref(), Some("out"));
    }

    #[test]
    fn test_negative_label_offset_parses() {
        let Commands::Boost(args) = parse(&["boost", "--label-offset", "-1"]) else {
            panic!("expected boost");
        };
        assert_eq!(args.data.label_offset, Some(-1));
    }

    #[test]
    fn test_zero_heads_or_width_rejected_at_parse_time() {
        for flag in ["--num-heads", "--d-model"] {
            let argv = ["antibody-classifier", "attention", flag, "0"];
            assert!(Cli::try_parse_from(argv).is_err(), "{flag} 0 was accepted");
        }
    }
}
