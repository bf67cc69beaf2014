//! Tests for comparison strip assembly and row selection

#[cfg(test)]
mod tests {
    use arrow::array::{ArrayRef, StringArray};
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::sync::Arc;
    use verbatim::AttackError;
    use verbatim::attack::naming::generation_path;
    use verbatim::external::download::{Download, ImageSource};
    use verbatim::io::image::save_rgb;
    use verbatim::io::visualization::{ComparisonOptions, combine_horizontally, render_comparison};
    use verbatim::table::frame::Table;

    /// Serves a red 20x30 original and records requested URLs
    #[derive(Default)]
    struct RecordingSource {
        urls: RefCell<Vec<String>>,
    }

    impl ImageSource for RecordingSource {
        fn fetch(&self, url: &str) -> Download {
            self.urls.borrow_mut().push(url.to_string());
            Download::Image(RgbImage::from_pixel(20, 30, Rgb([255, 0, 0])))
        }
    }

    fn ranked_table() -> Table {
        Table::from_columns(vec![
            (
                "caption",
                Arc::new(StringArray::from(vec!["best caption", "worst caption"])) as ArrayRef,
            ),
            (
                "url",
                Arc::new(StringArray::from(vec![Some("http://best"), None])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    // Tests strips use summed widths and the tallest height
    // Verified by using the first image height
    #[test]
    fn test_combine_horizontally() {
        let left = RgbImage::from_pixel(2, 3, Rgb([255, 0, 0]));
        let right = RgbImage::from_pixel(4, 5, Rgb([0, 0, 255]));

        let strip = combine_horizontally(&[left, right]);
        assert_eq!(strip.dimensions(), (6, 5));
        assert_eq!(strip.get_pixel(1, 1), &Rgb([255, 0, 0]));
        assert_eq!(strip.get_pixel(3, 4), &Rgb([0, 0, 255]));
        assert_eq!(strip.get_pixel(0, 4), &Rgb([0, 0, 0]));
        assert_eq!(combine_horizontally(&[]).dimensions(), (0, 0));
    }

    // Tests the best row strip pairs the original with saved generations
    // Verified by loading generations of the wrong caption
    #[test]
    fn test_render_best_row() {
        let dir = tempfile::tempdir().unwrap();
        let attack_folder = dir.path().join("attack");
        for seed in 0..2 {
            let path = generation_path(&attack_folder, "best caption", seed);
            save_rgb(&RgbImage::from_pixel(10, 10, Rgb([0, 255, 0])), &path).unwrap();
        }

        let options = ComparisonOptions {
            attack_folder,
            output_root: dir.path().join("strips"),
            output_name: "onestep".to_string(),
            best: true,
            seeds: 3,
        };
        let source = RecordingSource::default();

        let path = render_comparison(&ranked_table(), 0, &options, &source).unwrap();
        assert_eq!(path, dir.path().join("strips").join("onestep").join("combined_0.jpg"));
        assert_eq!(source.urls.borrow().as_slice(), &["http://best".to_string()]);

        // original 20 + two generations of 10 + one placeholder of 256
        let strip = image::open(&path).unwrap();
        assert_eq!((strip.width(), strip.height()), (20 + 10 + 10 + 256, 256));
    }

    // Tests worst-first selection counts from the bottom and a missing url
    // falls back to a placeholder
    // Verified by counting from the top
    #[test]
    fn test_render_worst_row_without_url() {
        let dir = tempfile::tempdir().unwrap();
        let options = ComparisonOptions {
            attack_folder: dir.path().join("attack"),
            output_root: dir.path().join("strips"),
            best: false,
            seeds: 1,
            ..ComparisonOptions::default()
        };
        let source = RecordingSource::default();

        let path = render_comparison(&ranked_table(), 0, &options, &source).unwrap();
        assert!(path.exists());
        assert!(source.urls.borrow().is_empty());

        let strip = image::open(&path).unwrap();
        assert_eq!((strip.width(), strip.height()), (512, 256));
    }

    // Tests indices past the table are rejected in both directions
    // Verified by wrapping the worst index
    #[test]
    fn test_render_out_of_range() {
        let source = RecordingSource::default();
        for best in [true, false] {
            let options = ComparisonOptions {
                best,
                ..ComparisonOptions::default()
            };
            assert!(matches!(
                render_comparison(&ranked_table(), 2, &options, &source),
                Err(AttackError::InvalidParameter { parameter: "index", .. })
            ));
        }
    }

    #[test]
    fn test_default_options() {
        let options = ComparisonOptions::default();
        assert_eq!(options.seeds, 10);
        assert!(options.best);
        assert!(options.strip_path(4).ends_with("onestep/combined_4.jpg"));
    }
}
