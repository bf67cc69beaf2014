//! Tests for attack constants and column names

#[cfg(test)]
mod tests {
    use verbatim::io::configuration::{
        AUXILIARY_COLUMNS, DEFAULT_BEST_AMOUNT, DEFAULT_GENERATION_STEPS, DEFAULT_PREPARE_AMOUNT,
        DEFAULT_SEEDS_PER_CAPTION, EDGE_SCORE_COLUMN, MAX_FOLDER_NAME_LEN, MIN_GROUP_SIZE,
        MSE_COLUMN, PLACEHOLDER_SIZE, SCORING_RESOLUTION, TEMPLATE_COLUMN,
    };

    // Tests the attack is single-step with enough seeds to score
    // Verified by changing the step count
    #[test]
    fn test_generation_defaults() {
        assert_eq!(DEFAULT_GENERATION_STEPS, 1);
        assert_eq!(DEFAULT_SEEDS_PER_CAPTION, 4);
        assert!(DEFAULT_SEEDS_PER_CAPTION >= MIN_GROUP_SIZE);
    }

    // Tests scoring and placeholder resolutions agree
    // Verified by changing the placeholder size
    #[test]
    fn test_resolutions() {
        assert_eq!(SCORING_RESOLUTION, 256);
        assert_eq!(PLACEHOLDER_SIZE, SCORING_RESOLUTION);
    }

    #[test]
    fn test_ranking_defaults() {
        assert_eq!(DEFAULT_BEST_AMOUNT, 200);
        assert_eq!(DEFAULT_PREPARE_AMOUNT, 400);
        assert_eq!(MAX_FOLDER_NAME_LEN, 200);
    }

    // Tests the analysis columns cover the score columns and the marker
    // Verified by removing a column from the list
    #[test]
    fn test_auxiliary_columns() {
        assert!(AUXILIARY_COLUMNS.contains(&EDGE_SCORE_COLUMN));
        assert!(AUXILIARY_COLUMNS.contains(&MSE_COLUMN));
        assert!(AUXILIARY_COLUMNS.contains(&TEMPLATE_COLUMN));
        assert_eq!(AUXILIARY_COLUMNS.len(), 6);
    }
}
