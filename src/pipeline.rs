//! End-to-end palm scanning: extraction, encoding, enrollment, verification.
//!
//! [`Scanner`] owns the tuned configuration and the compiled filter bank and
//! exposes the pipeline stages as one object, so every enrollment and
//! verification in a deployment runs with the same parameters.

use crate::config::{ExtractConfig, GaborConfig, MatchingConfig};
use crate::contour::{tangent, trace_hand_contour, valley};
use crate::gabor::GaborBank;
use crate::image::{ops, BinaryImage, GrayImage};
use crate::matcher::{self, BitGrid, Decision, MatchResult};
use crate::roi::{self, RoiExtraction};
use crate::trace::{trace_event, trace_span};
use crate::util::{PalmcodeError, PalmcodeResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Enrolled palm code ready for comparison.
#[derive(Clone, Debug)]
pub struct Template {
    identity: String,
    code: BitGrid,
    mask: BitGrid,
}

impl Template {
    /// Builds a template from an encoded code and its foreground mask.
    ///
    /// The two must be cut from the same ROI; mismatched sizes are rejected.
    pub fn new(
        identity: impl Into<String>,
        code: &BinaryImage,
        mask: &BinaryImage,
    ) -> PalmcodeResult<Self> {
        let code = BitGrid::from_code(code);
        let mask = BitGrid::from_mask(mask);
        if code.len() != mask.len() {
            return Err(PalmcodeError::CodeSizeMismatch {
                left: code.len(),
                right: mask.len(),
            });
        }
        Ok(Self {
            identity: identity.into(),
            code,
            mask,
        })
    }

    /// Builds a template from raw grayscale images, validating both as
    /// binary. This is the entry point for bytes loaded back from storage.
    pub fn from_images(
        identity: impl Into<String>,
        code: GrayImage,
        mask: GrayImage,
    ) -> PalmcodeResult<Self> {
        let code = BinaryImage::from_gray(code, "stored code")?;
        let mask = BinaryImage::from_gray(mask, "stored mask")?;
        Self::new(identity, &code, &mask)
    }

    /// Identity label the template was enrolled under.
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// One enrollment artifact handed to the template store.
#[derive(Clone, Debug)]
pub struct EnrollmentRecord {
    /// Binary palm code of the ROI.
    pub code: BinaryImage,
    /// Foreground mask of the ROI.
    pub mask: BinaryImage,
    /// The pose-normalized ROI itself, kept for audits and re-encoding.
    pub roi: GrayImage,
    /// The source capture, kept so templates can be re-derived after a
    /// parameter change without recapturing the hand.
    pub source: GrayImage,
}

/// Persistence collaborator for enrollments.
pub trait TemplateStore {
    /// Persists one enrollment record under an identity label.
    fn store(&mut self, identity: &str, record: EnrollmentRecord) -> PalmcodeResult<()>;
}

/// The scanning pipeline with its tuned configuration.
pub struct Scanner {
    extract: ExtractConfig,
    matching: MatchingConfig,
    bank: GaborBank,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Builds a scanner with the tuned default configuration.
    pub fn new() -> Self {
        Self::with_configs(
            ExtractConfig::default(),
            GaborConfig::default(),
            MatchingConfig::default(),
        )
    }

    /// Builds a scanner with explicit configuration; the filter bank is
    /// compiled here, once.
    pub fn with_configs(
        extract: ExtractConfig,
        gabor: GaborConfig,
        matching: MatchingConfig,
    ) -> Self {
        Self {
            extract,
            matching,
            bank: GaborBank::compile(&gabor),
        }
    }

    /// Runs the geometric extraction: binarize, trace the hand contour,
    /// find the finger valleys, locate the keypoints and cut the canonical
    /// ROI with its mask.
    pub fn extract(&self, img: &GrayImage) -> PalmcodeResult<RoiExtraction> {
        let _guard = trace_span!("extract").entered();

        let blurred = ops::gaussian_blur(img, self.extract.blur_kernel);
        let threshold = self.extract.thresh_factor * blurred.mean();
        let bin = ops::binarize(&blurred, threshold);

        let contour = trace_hand_contour(&bin)?;
        trace_event!("contour_traced", points = contour.len());

        let valleys = valley::find_valleys(img, &bin, &contour, &self.extract);
        trace_event!("valleys_found", count = valleys.len());

        let keypoints = tangent::locate_keypoints(&valleys, &self.extract)?;
        let roi = roi::normalize_roi(img, keypoints, &self.extract)?;
        let mask = roi::build_mask(&roi, self.extract.mask_threshold);
        Ok(RoiExtraction { roi, mask })
    }

    /// Encodes a canonical ROI into its binary palm code.
    pub fn encode(&self, roi: &GrayImage) -> BinaryImage {
        self.bank.encode(roi)
    }

    /// Extracts and encodes every image, handing one record per image to the
    /// store under the given identity. Returns the number of records stored.
    ///
    /// The first failing image aborts the enrollment; records stored before
    /// it remain with the store.
    pub fn enroll<S: TemplateStore>(
        &self,
        identity: &str,
        images: &[GrayImage],
        store: &mut S,
    ) -> PalmcodeResult<usize> {
        let _guard = trace_span!("enroll", identity = identity).entered();

        for img in images {
            let extraction = self.extract(img)?;
            let code = self.bank.encode(&extraction.roi);
            store.store(
                identity,
                EnrollmentRecord {
                    code,
                    mask: extraction.mask,
                    roi: extraction.roi,
                    source: img.clone(),
                },
            )?;
        }
        trace_event!("enrolled", identity = identity, records = images.len());
        Ok(images.len())
    }

    /// Extracts and encodes a query image, then decides against the enrolled
    /// templates.
    pub fn verify(&self, img: &GrayImage, templates: &[Template]) -> PalmcodeResult<Decision> {
        let _guard = trace_span!("verify", templates = templates.len()).entered();
        let extraction = self.extract(img)?;
        Ok(self.verify_roi(&extraction, templates))
    }

    /// Decides an already-extracted ROI against the enrolled templates.
    ///
    /// A rejection is a normal outcome, not an error; the best comparison is
    /// carried in the decision either way.
    pub fn verify_roi(&self, extraction: &RoiExtraction, templates: &[Template]) -> Decision {
        let code = BitGrid::from_code(&self.bank.encode(&extraction.roi));
        let mask = BitGrid::from_mask(&extraction.mask);

        let best = self.best_comparison(&code, &mask, templates);
        if let Some(result) = &best {
            trace_event!(
                "best_comparison",
                identity = result.identity.as_str(),
                distance = result.distance
            );
        }
        Decision::from_best(best, self.matching.hamming_threshold)
    }

    /// Minimum-distance template for one query code; ties break toward the
    /// earlier template so the outcome is independent of evaluation order.
    fn best_comparison(
        &self,
        code: &BitGrid,
        mask: &BitGrid,
        templates: &[Template],
    ) -> Option<MatchResult> {
        let evaluate = |idx: usize, tpl: &Template| -> (usize, f64) {
            let distance =
                matcher::match_distance(code, mask, &tpl.code, &tpl.mask, &self.matching);
            (idx, distance)
        };
        let prefer = |a: &(usize, f64), b: &(usize, f64)| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0));

        #[cfg(feature = "rayon")]
        let best = if self.matching.parallel {
            templates
                .par_iter()
                .enumerate()
                .map(|(i, t)| evaluate(i, t))
                .min_by(prefer)
        } else {
            templates
                .iter()
                .enumerate()
                .map(|(i, t)| evaluate(i, t))
                .min_by(prefer)
        };
        #[cfg(not(feature = "rayon"))]
        let best = templates
            .iter()
            .enumerate()
            .map(|(i, t)| evaluate(i, t))
            .min_by(prefer);

        best.map(|(idx, distance)| MatchResult {
            identity: templates[idx].identity.clone(),
            distance,
        })
    }
}
