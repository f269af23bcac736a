//! One-shot grading: load, apply, write.

use std::path::{Path, PathBuf};

use regrade_core::transform::params::{ChannelBias, ColorParams, ParamId};
use regrade_engine::GradingPipeline;

use crate::config::AppConfig;
use crate::image_loader::{self, ImageLoadError};

/// Everything `regrade render` needs, already parsed.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub params: ColorParams,
    /// Where to write the histogram overlay, if anywhere.
    pub overlay: Option<PathBuf>,
    /// Where to write the raw histogram counts as JSON, if anywhere.
    pub histogram_json: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Image(#[from] ImageLoadError),
    #[error("{} has no pixels", .0.display())]
    EmptyImage(PathBuf),
    #[error("failed to read parameters from {}: {source}", path.display())]
    ParamsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid parameters in {}: {source}", path.display())]
    ParamsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write histogram to {}: {source}", path.display())]
    HistogramWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Starting parameters: a JSON file if given, defaults otherwise.
pub fn base_params(path: Option<&Path>) -> Result<ColorParams, RenderError> {
    let Some(path) = path else {
        return Ok(ColorParams::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| RenderError::ParamsRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RenderError::ParamsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply per-flag overrides on top of `params`.
pub fn with_overrides(
    mut params: ColorParams,
    sliders: &[(ParamId, Option<f32>)],
    bias: Option<ChannelBias>,
    bypass: bool,
) -> ColorParams {
    for &(id, value) in sliders {
        if let Some(value) = value {
            params.set(id, value);
        }
    }
    if let Some(bias) = bias {
        params.bias_mode = bias;
    }
    params.bypass |= bypass;
    params.sanitized()
}

pub fn run(config: &AppConfig, job: &RenderJob) -> Result<(), RenderError> {
    let source = image_loader::load_image(&job.input)?;
    if source.is_empty() {
        return Err(RenderError::EmptyImage(job.input.clone()));
    }
    tracing::info!(
        "grading {} ({}x{})",
        job.input.display(),
        source.width(),
        source.height()
    );

    let mut pipeline = GradingPipeline::with_slow_run_threshold(config.slow_run_threshold);
    pipeline.load_image(source);
    pipeline.set_params(job.params);

    let Some(id) = pipeline.run_blocking() else {
        return Err(RenderError::EmptyImage(job.input.clone()));
    };
    tracing::debug!("run {id} published");

    if let Some(output) = pipeline.output() {
        image_loader::save_image(&job.output, output)?;
        tracing::info!("wrote {}", job.output.display());
    }

    if let (Some(path), Some((_, overlay))) = (&job.overlay, pipeline.overlay()) {
        image_loader::save_image(path, overlay)?;
        tracing::info!("wrote histogram overlay {}", path.display());
    }

    if let (Some(path), Some(histogram)) = (&job.histogram_json, pipeline.histogram()) {
        let json = serde_json::to_string(histogram.as_ref()).map_err(|e| {
            RenderError::HistogramWrite {
                path: path.clone(),
                source: e.into(),
            }
        })?;
        std::fs::write(path, json).map_err(|source| RenderError::HistogramWrite {
            path: path.clone(),
            source,
        })?;
    }

    let stats = pipeline.stats();
    tracing::debug!(
        "kernel {:.2}ms, histogram {:.2}ms",
        stats.last_kernel_time.as_secs_f64() * 1000.0,
        stats.last_histogram_time.as_secs_f64() * 1000.0
    );
    Ok(())
}
