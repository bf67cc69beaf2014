//! Tests for command-line parsing and command execution

#[cfg(test)]
mod tests {
    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use clap::Parser;
    use std::path::PathBuf;
    use std::sync::Arc;
    use verbatim::io::cli::{Cli, Command};
    use verbatim::io::configuration::{
        DEFAULT_BEST_AMOUNT, DEFAULT_PREPARE_AMOUNT, DEFAULT_SEEDS_PER_CAPTION,
        EDGE_SCORE_COLUMN, SCORING_RESOLUTION,
    };
    use verbatim::table::frame::Table;

    // Tests attack defaults come from the configuration constants
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_attack_defaults() {
        let cli = Cli::parse_from([
            "verbatim", "attack", "-i", "in.parquet", "-o", "out.parquet", "--endpoint",
            "http://gpu:8000",
        ]);

        let Command::Attack(args) = &cli.command else {
            unreachable!("Expected attack command");
        };
        assert_eq!(args.input, PathBuf::from("in.parquet"));
        assert_eq!(args.seeds, DEFAULT_SEEDS_PER_CAPTION);
        assert_eq!(args.resolution, SCORING_RESOLUTION);
        assert_eq!(args.captions, None);

        let config = args.to_config(cli.should_show_progress());
        assert_eq!(config.seeds_per_caption, DEFAULT_SEEDS_PER_CAPTION);
        assert_eq!(config.steps, 1);
        assert!(config.show_progress);
        assert!(config.outfolder.is_none());
    }

    // Tests attack options map onto the run configuration
    // Verified by swapping caption offset and limit
    #[test]
    fn test_attack_options() {
        let cli = Cli::parse_from([
            "verbatim",
            "--quiet",
            "attack",
            "--input",
            "in.parquet",
            "--output",
            "out.parquet",
            "--replay",
            "gens",
            "-n",
            "6",
            "--seed-offset",
            "100",
            "--caption-offset",
            "20",
            "--captions",
            "5",
            "--outfolder",
            "vis",
        ]);

        let Command::Attack(args) = &cli.command else {
            unreachable!("Expected attack command");
        };
        let config = args.to_config(cli.should_show_progress());
        assert_eq!(config.seeds_per_caption, 6);
        assert_eq!(config.seed_offset, 100);
        assert_eq!(config.caption_offset, 20);
        assert_eq!(config.caption_limit, Some(5));
        assert_eq!(config.outfolder, Some(PathBuf::from("vis")));
        assert!(!config.show_progress);
    }

    // Tests a zero caption count means every remaining caption
    // Verified by passing the count through unchanged
    #[test]
    fn test_zero_captions_means_all() {
        let cli = Cli::parse_from([
            "verbatim", "attack", "-i", "a", "-o", "b", "--replay", "gens", "--captions", "0",
        ]);
        let Command::Attack(args) = &cli.command else {
            unreachable!("Expected attack command");
        };
        let config = args.to_config(false);
        assert_eq!(config.caption_limit, None);
        assert_eq!(config.caption_window(7), 0..7);
    }

    // Tests a generator source is required and exclusive
    // Verified by removing the argument constraints
    #[test]
    fn test_attack_requires_one_generator() {
        assert!(Cli::try_parse_from(["verbatim", "attack", "-i", "a", "-o", "b"]).is_err());
        assert!(
            Cli::try_parse_from([
                "verbatim", "attack", "-i", "a", "-o", "b", "--endpoint", "http://x",
                "--replay", "dir",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_prepare_and_best_defaults() {
        let cli = Cli::parse_from(["verbatim", "prepare", "-i", "a", "-o", "b"]);
        let Command::Prepare(args) = &cli.command else {
            unreachable!("Expected prepare command");
        };
        assert_eq!(args.amount, DEFAULT_PREPARE_AMOUNT);
        assert!(!args.drop);

        let cli = Cli::parse_from(["verbatim", "best", "-i", "a", "-o", "b", "--ascending"]);
        let Command::Best(args) = &cli.command else {
            unreachable!("Expected best command");
        };
        assert_eq!(args.amount, DEFAULT_BEST_AMOUNT);
        assert_eq!(args.sort_by, EDGE_SCORE_COLUMN);
        assert!(args.ascending);
    }

    // Tests worst-first rendering inverts the row direction
    // Verified by ignoring the worst flag
    #[test]
    fn test_combine_options() {
        let cli = Cli::parse_from([
            "verbatim", "combine", "-i", "ranked.parquet", "-a", "gens", "--worst", "-c", "3",
        ]);
        let Command::Combine(args) = &cli.command else {
            unreachable!("Expected combine command");
        };
        let options = args.to_options();
        assert!(!options.best);
        assert_eq!(options.attack_folder, PathBuf::from("gens"));
        assert_eq!(args.count, 3);
        assert_eq!(options.output_name, "onestep");
    }

    // Tests huge index and count saturate instead of overflowing
    // Verified by adding index and count unchecked
    #[test]
    fn test_combine_indices_saturate() {
        let max = usize::MAX.to_string();
        let cli = Cli::parse_from([
            "verbatim", "combine", "-i", "ranked.parquet", "-a", "gens", "--index", max.as_str(), "-c", "3",
        ]);
        let Command::Combine(args) = &cli.command else {
            unreachable!("Expected combine command");
        };
        assert_eq!(args.indices(), usize::MAX..usize::MAX);

        let cli = Cli::parse_from([
            "verbatim", "combine", "-i", "ranked.parquet", "-a", "gens", "--index", "2", "-c", "3",
        ]);
        let Command::Combine(args) = &cli.command else {
            unreachable!("Expected combine command");
        };
        assert_eq!(args.indices(), 2..5);
    }

    // Tests log filter follows the verbosity flags
    // Verified by letting verbose override quiet
    #[test]
    fn test_log_filter() {
        let cli = Cli::parse_from(["verbatim", "-v", "prepare", "-i", "a", "-o", "b"]);
        assert_eq!(cli.log_filter(), "debug");

        let cli = Cli::parse_from(["verbatim", "-q", "-v", "prepare", "-i", "a", "-o", "b"]);
        assert_eq!(cli.log_filter(), "warn");
    }

    // Tests the prepare command end to end on parquet files
    // Verified by writing the unsorted table
    #[test]
    fn test_run_prepare_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("analyzed.parquet");
        let output = dir.path().join("top.parquet");

        Table::from_columns(vec![
            (
                "caption",
                Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef,
            ),
            (
                "mse_real_gen",
                Arc::new(Float64Array::from(vec![5.0, 1.0, 3.0])) as ArrayRef,
            ),
        ])
        .unwrap()
        .write_parquet(&input)
        .unwrap();

        let cli = Cli::parse_from([
            "verbatim".to_string(),
            "-q".to_string(),
            "prepare".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-a".to_string(),
            "2".to_string(),
        ]);
        cli.run().unwrap();

        let prepared = Table::read_parquet(&output).unwrap();
        assert_eq!(prepared.row_ids(), &[1, 2]);
        assert_eq!(
            prepared.strings("caption").unwrap(),
            vec![Some("b".to_string()), Some("c".to_string())]
        );
    }
}
