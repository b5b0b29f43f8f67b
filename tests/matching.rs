//! Matching properties exercised through the public API.

use palmcode::{
    match_distance, masked_hamming, BinaryImage, BitGrid, Decision, ExtractConfig, GaborConfig,
    GrayImage, MatchResult, MatchingConfig, RoiExtraction, Scanner, Template,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_binary(rng: &mut StdRng, width: usize, height: usize) -> BinaryImage {
    let data = (0..width * height)
        .map(|_| if rng.random_range(0..2) == 1 { 255u8 } else { 0 })
        .collect();
    BinaryImage::from_gray(GrayImage::new(data, width, height).unwrap(), "test").unwrap()
}

fn full_mask(width: usize, height: usize) -> BitGrid {
    let img = GrayImage::new(vec![255u8; width * height], width, height).unwrap();
    BitGrid::from_mask(&BinaryImage::from_gray(img, "test").unwrap())
}

fn small_scanner(parallel: bool) -> Scanner {
    let gabor = GaborConfig {
        kernel_size: 7,
        orientations: 4,
        ..GaborConfig::default()
    };
    let matching = MatchingConfig {
        parallel,
        ..MatchingConfig::default()
    };
    Scanner::with_configs(ExtractConfig::default(), gabor, matching)
}

fn test_extraction(seed: usize) -> RoiExtraction {
    let roi =
        GrayImage::from_fn(30, 30, |x, y| ((x * 7 + y * 13 + seed * 41) % 251) as u8).unwrap();
    let mask_img = GrayImage::from_fn(30, 30, |x, y| {
        if x + y < 50 {
            255
        } else {
            0
        }
    })
    .unwrap();
    let mask = BinaryImage::from_gray(mask_img, "test").unwrap();
    RoiExtraction { roi, mask }
}

#[test]
fn hamming_distance_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..4 {
        let a = BitGrid::from_code(&random_binary(&mut rng, 25, 25));
        let b = BitGrid::from_code(&random_binary(&mut rng, 25, 25));
        let ma = BitGrid::from_mask(&random_binary(&mut rng, 25, 25));
        let mb = BitGrid::from_mask(&random_binary(&mut rng, 25, 25));
        assert_eq!(
            masked_hamming(&a, &ma, &b, &mb).unwrap(),
            masked_hamming(&b, &mb, &a, &ma).unwrap()
        );
    }
}

#[test]
fn translation_is_absorbed_by_the_palette() {
    let mut rng = StdRng::seed_from_u64(17);
    let query = BitGrid::from_code(&random_binary(&mut rng, 40, 40));
    let mask = full_mask(40, 40);
    let cfg = MatchingConfig::default();

    for &(dx, dy) in &MatchingConfig::default_offsets() {
        let tpl_code = query.shifted(dx, dy);
        let tpl_mask = mask.shifted(dx, dy);
        let d = match_distance(&query, &mask, &tpl_code, &tpl_mask, &cfg);
        assert_eq!(d, 0.0, "offset ({dx}, {dy}) not recovered");
    }
}

#[test]
fn acceptance_is_monotone_in_the_threshold() {
    let best = MatchResult {
        identity: "alice".into(),
        distance: 0.30,
    };
    let mut accepted_before = false;
    for threshold in [0.0, 0.1, 0.2, 0.3, 0.4, 0.43, 0.9] {
        let accepted = Decision::from_best(Some(best.clone()), threshold).is_accepted();
        assert!(accepted || !accepted_before, "acceptance flipped back off");
        accepted_before = accepted;
    }
}

#[test]
fn self_match_distance_is_zero_end_to_end() {
    let scanner = small_scanner(false);
    let extraction = test_extraction(3);
    let code = scanner.encode(&extraction.roi);
    let tpl = Template::new("carol", &code, &extraction.mask).unwrap();

    let decision = scanner.verify_roi(&extraction, &[tpl]);
    assert!(decision.is_accepted());
    assert_eq!(decision.best().unwrap().distance, 0.0);
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_and_serial_verification_agree() {
    let serial = small_scanner(false);
    let parallel = small_scanner(true);

    let templates: Vec<Template> = (0..6)
        .map(|i| {
            let extraction = test_extraction(i);
            let code = serial.encode(&extraction.roi);
            Template::new(format!("id-{i}"), &code, &extraction.mask).unwrap()
        })
        .collect();

    let query = test_extraction(2);
    let a = serial.verify_roi(&query, &templates);
    let b = parallel.verify_roi(&query, &templates);
    assert_eq!(a, b);
}
