//! Configuration types shared between foldwise crates.

mod settings;
mod types;

pub use settings::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_serde() {
        assert_eq!(
            serde_json::from_str::<Regime>("\"short\"").unwrap(),
            Regime::Short
        );
        assert_eq!(serde_json::to_string(&Regime::Long).unwrap(), "\"long\"");
    }

    #[test]
    fn test_regime_from_str() {
        assert_eq!("short".parse::<Regime>().unwrap(), Regime::Short);
        assert_eq!("OUT".parse::<Regime>().unwrap(), Regime::Long);
        assert!("medium".parse::<Regime>().is_err());
    }

    #[test]
    fn test_seeds_match_classic_layout() {
        let experiment = ExperimentSettings::default();
        assert_eq!(experiment.run_seed(0), 50);
        assert_eq!(experiment.run_seed(2), 52);
        // (i * 10) + j + 5
        assert_eq!(experiment.cell_seed(1, 3, 10), 18);
        assert_eq!(experiment.cell_seed(0, 0, 10), 5);
    }

    #[test]
    fn test_partition_defaults() {
        let partition = PartitionSettings::default();
        assert_eq!(partition.folds, 10);
        assert_eq!(partition.validation_folds, 2);
        assert_eq!(partition.training_folds(), 7);
    }

    #[test]
    fn test_regime_table_partial_override() {
        let table: RegimeTable = toml::from_str(
            r#"
[short]
label = "IN"
ledger = "in.txt"
generations = 8
epochs = 16
"#,
        )
        .unwrap();
        assert_eq!(table.short.budget(), Budget::new(8, 16));
        assert_eq!(table.long, RegimeSettings::default_for(Regime::Long));
        assert_eq!(table.get(Regime::Short).label, "IN");
    }

    #[test]
    fn test_empty_budget() {
        assert!(Budget::new(0, 10).is_empty());
        assert!(Budget::new(10, 0).is_empty());
        assert!(!Budget::new(1, 1).is_empty());
    }
}
