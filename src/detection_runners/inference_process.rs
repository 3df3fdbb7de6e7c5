use std::time::Instant;
use crate::data::{ConfigOrt, X, Y};
use crate::utils;

pub trait InferenceProcess: Sized {
    type Input; // RgbImage
    type Meta; // per-image placement, undone in postprocess

    /// Creates a new instance of the model with the given options.
    fn new(options: ConfigOrt) -> anyhow::Result<Self>;

    /// Pre-process the input data.
    fn preprocess(&self, xs: &[Self::Input]) -> anyhow::Result<(X, Vec<Self::Meta>)>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, xs: X) -> anyhow::Result<X>;

    /// Post-process the model's output.
    fn postprocess(&self, xs: X, metas: &[Self::Meta]) -> anyhow::Result<Vec<Y>>;

    /// Executes the full pipeline.
    fn run(&mut self, xs: &[Self::Input]) -> anyhow::Result<Vec<Y>> {
        let detect_time = Instant::now();
        let mut _detect_elapsed = detect_time.elapsed();

        let (ys, metas) = self.preprocess(xs)?;
        _detect_elapsed = utils::trace("TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let ys = self.inference(ys)?;
        _detect_elapsed = utils::trace("TIME", "Detection run", detect_time, _detect_elapsed);

        let ys = self.postprocess(ys, &metas)?;
        utils::trace("TIME", "Postprocessing", detect_time, _detect_elapsed);

        Ok(ys)
    }
}
