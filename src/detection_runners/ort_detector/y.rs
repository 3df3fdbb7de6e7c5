use crate::common::BottleDetection;
use crate::detection_runners::ort_detector::nms;

/// Inference results for one image.
#[derive(Clone, PartialEq, Default)]
pub struct Y {
    detections: Option<Vec<BottleDetection>>,
}

impl std::fmt::Debug for Y {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut f = f.debug_struct("Y");
        if let Some(x) = &self.detections {
            if !x.is_empty() {
                f.field("BottleDetections", &x);
            }
        }
        f.finish()
    }
}

impl Y {
    /// Sets the `detections` field with the provided detections.
    ///
    /// # Arguments
    ///
    /// * `detections` - A slice of `BottleDetection` to be set.
    ///
    /// # Returns
    ///
    /// * `Self` - The updated struct instance with the new detections.
    pub fn with_detections(mut self, detections: &[BottleDetection]) -> Self {
        self.detections = Some(detections.to_vec());
        self
    }

    /// Returns a reference to the vector of detections, or `None` if it is not set.
    pub fn detections(&self) -> Option<&Vec<BottleDetection>> {
        self.detections.as_ref()
    }

    pub fn into_detections(self) -> Vec<BottleDetection> {
        self.detections.unwrap_or_default()
    }

    pub fn apply_nms(mut self, iou_threshold: f32) -> Self {
        if let Some(bboxes) = &mut self.detections {
            nms::nms(bboxes, iou_threshold);
        }
        self
    }

    /// Keeps at most `max_det` detections.
    pub fn truncate(mut self, max_det: usize) -> Self {
        if let Some(bboxes) = &mut self.detections {
            bboxes.truncate(max_det);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_no_detections() {
        let y = Y::default().apply_nms(0.1).truncate(10);
        assert!(y.detections().is_none());
        assert!(y.into_detections().is_empty());
    }

    #[test]
    fn truncate_keeps_best_after_nms() {
        let dets: Vec<BottleDetection> = (0..5)
            .map(|i| {
                BottleDetection::default()
                    .with_x1y1_wh(i as f32 * 20., 0., 10., 10.)
                    .with_confidence(0.1 * (i + 1) as f32)
            })
            .collect();
        let y = Y::default().with_detections(&dets).apply_nms(0.1).truncate(2);
        let kept = y.into_detections();
        assert_eq!(kept.len(), 2);
        assert!(kept[0].confidence > kept[1].confidence);
        assert!((kept[0].confidence - 0.5).abs() < 1e-6);
    }
}
