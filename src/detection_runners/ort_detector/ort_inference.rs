use anyhow::Result;
use image::RgbImage;
use ndarray::{s, ArrayView2, Axis};
use rayon::prelude::*;
use regex::Regex;

use crate::common::BottleDetection;
use crate::data::{ConfigOrt, ImageTransformInfo, X, Y};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::ort_detector::{image_ops, OrtEngine};

/// YOLOv8/v11 style detector: one output of shape `[batch, 4 + nc, anchors]`
/// holding `cx, cy, w, h` followed by the per-class scores.
#[derive(Debug)]
pub struct OrtYOLO {
    engine: OrtEngine,
    nc: usize,
    size: u32,
    conf: f32,
    iou: f32,
    max_det: usize,
    fill: u8,
    names: Vec<String>,
}

impl InferenceProcess for OrtYOLO {
    type Input = RgbImage;
    type Meta = ImageTransformInfo;

    fn new(options: ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(&options)?;

        // Class names: parsed from metadata, else user-defined
        let names = match Self::fetch_names(&engine) {
            Some(parsed) if !parsed.is_empty() => Some(parsed),
            _ => options.names,
        };

        let names = match names {
            Some(names) if !names.is_empty() => names,
            _ => anyhow::bail!(
                "Unable to obtain the class names. The model carries no `names` metadata, set `class_names` or `labels_path`."
            ),
        };
        let nc = names.len();

        log::info!("Detector classes ({}): {:?}", nc, names);

        Ok(Self {
            engine,
            nc,
            size: options.model_size,
            conf: options.conf,
            iou: options.iou,
            max_det: options.max_det,
            fill: options.letterbox_fill,
            names,
        })
    }

    fn preprocess(&self, xs: &[Self::Input]) -> Result<(X, Vec<Self::Meta>)> {
        // Batch size is fixed to one image
        let image = match xs {
            [image] => image,
            _ => anyhow::bail!("Expected exactly one image, got {}", xs.len()),
        };
        let (x, info) = image_ops::preprocess(image, self.size, self.fill)?;
        Ok((x, vec![info]))
    }

    fn inference(&mut self, xs: X) -> Result<X> {
        self.engine.run(xs)
    }

    fn postprocess(&self, xs: X, metas: &[Self::Meta]) -> Result<Vec<Y>> {
        if xs.ndim() != 3 {
            anyhow::bail!("Unexpected output rank {}, expected [batch, 4 + nc, anchors]", xs.ndim());
        }
        let features = xs.shape()[1];
        if features < 4 + self.nc {
            anyhow::bail!(
                "Output has {} features per anchor, expected at least {} for {} classes",
                features,
                4 + self.nc,
                self.nc
            );
        }

        xs.axis_iter(Axis(0))
            .zip(metas.iter())
            .map(|(preds, info)| -> Result<Y> {
                let preds = preds.into_dimensionality::<ndarray::Ix2>()?;
                Ok(self.decode(preds.t(), info))
            })
            .collect()
    }
}

impl OrtYOLO {
    fn decode(&self, preds: ArrayView2<f32>, info: &ImageTransformInfo) -> Y {
        decode_predictions(preds, info, &self.names, self.conf, self.iou, self.max_det)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn fetch_names(engine: &OrtEngine) -> Option<Vec<String>> {
        // fetch class names from onnx metadata
        // String format: `{0: 'bottle', 1: 'cap'}`
        engine.try_fetch("names").map(|names| parse_names(&names))
    }
}

/// Turns `[anchors, 4 + nc]` predictions into filtered, suppressed detections
/// in source-image coordinates. `nc` is `names.len()`.
pub fn decode_predictions(
    preds: ArrayView2<f32>,
    info: &ImageTransformInfo,
    names: &[String],
    conf: f32,
    iou: f32,
    max_det: usize,
) -> Y {
    let nc = names.len();
    let (width, height) = (info.width_src as f32, info.height_src as f32);

    let candidates: Vec<BottleDetection> = preds
        .axis_iter(Axis(0))
        .into_par_iter()
        .filter_map(|row| {
            let (class_id, &confidence) = row
                .slice(s![4..4 + nc])
                .into_iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))?;

            // filtering low scores
            if confidence <= conf {
                return None;
            }

            let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
            let (x1, y1) = info.to_source(cx - w / 2., cy - h / 2.);
            let (x2, y2) = info.to_source(cx + w / 2., cy + h / 2.);

            let det = BottleDetection::default()
                .with_x1y1_x2y2(x1, y1, x2, y2)
                .with_confidence(confidence)
                .with_class_id(class_id as isize)
                .with_label(&names[class_id]);
            Some(BottleDetection { bbox: det.bbox.clamp_to(width, height), ..det })
        })
        .collect();

    if candidates.is_empty() {
        return Y::default();
    }
    Y::default()
        .with_detections(&candidates)
        .apply_nms(iou)
        .truncate(max_det)
}

fn parse_names(raw: &str) -> Vec<String> {
    let re = match Regex::new(r#"(['"])([-()\w '"]+?)(['"])"#) {
        Ok(re) => re,
        Err(_) => return vec![],
    };
    re.captures_iter(raw)
        .map(|c| c.extract::<3>().1[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn parses_ultralytics_names_metadata() {
        assert_eq!(parse_names("{0: 'bottle'}"), vec!["bottle"]);
        assert_eq!(
            parse_names("{0: 'blue bottle', 1: \"cap\"}"),
            vec!["blue bottle", "cap"]
        );
        assert!(parse_names("{}").is_empty());
    }

    fn names() -> Vec<String> {
        vec!["bottle".to_string()]
    }

    // rows of [cx, cy, w, h, score] in model-input space
    fn preds(rows: &[[f32; 5]]) -> Array2<f32> {
        Array2::from_shape_vec((rows.len(), 5), rows.iter().flatten().copied().collect()).unwrap()
    }

    #[test]
    fn scores_at_or_below_threshold_are_dropped() {
        let info = ImageTransformInfo::letterbox(100, 100, 100, 100);
        let p = preds(&[[20., 20., 10., 10., 0.1], [60., 60., 10., 10., 0.11]]);
        let dets = decode_predictions(p.view(), &info, &names(), 0.1, 0.1, 300).into_detections();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].get_label(), "bottle");
        assert_eq!(dets[0].bbox.xy1_xy2(), (55., 55., 65., 65.));
    }

    #[test]
    fn boxes_are_mapped_back_through_the_letterbox() {
        // 200x100 source in a 100x100 input: scale 0.5, 25 px top padding
        let info = ImageTransformInfo::letterbox(200, 100, 100, 100);
        let p = preds(&[[50., 50., 20., 10., 0.9]]);
        let dets = decode_predictions(p.view(), &info, &names(), 0.1, 0.1, 300).into_detections();
        assert_eq!(dets[0].bbox.xy1_xy2(), (80., 40., 120., 60.));
    }

    #[test]
    fn overlapping_candidates_are_suppressed_and_clamped() {
        let info = ImageTransformInfo::letterbox(100, 100, 100, 100);
        let p = preds(&[
            [5., 5., 20., 20., 0.8],
            [6., 6., 20., 20., 0.7],
            [80., 80., 10., 10., 0.5],
        ]);
        let dets = decode_predictions(p.view(), &info, &names(), 0.1, 0.1, 300).into_detections();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].confidence, 0.8);
        assert_eq!(dets[0].bbox.xy1_xy2(), (0., 0., 15., 15.));
    }

    #[test]
    fn empty_predictions_give_empty_result() {
        let info = ImageTransformInfo::letterbox(100, 100, 100, 100);
        let p = Array2::<f32>::zeros((0, 5));
        let y = decode_predictions(p.view(), &info, &names(), 0.1, 0.1, 300);
        assert!(y.into_detections().is_empty());
    }
}
