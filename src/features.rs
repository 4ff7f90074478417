use crate::activity::ActivityInterval;
use crate::data_loading::SensorStreams;
use crate::error::PipelineError;

/// The fixed per-subject feature record: one RMS magnitude per accelerometer
/// axis, one arithmetic mean per single-channel stream, and the ordered
/// segment-level activity labels (duplicates preserved).
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectFeatures {
    pub acc_x_rms: f64,
    pub acc_y_rms: f64,
    pub acc_z_rms: f64,
    pub heart_rate_mean: f64,
    pub eda_mean: f64,
    pub bvp_mean: f64,
    pub temperature_mean: f64,
    pub activity_labels: Vec<String>,
}

/// Root-mean-square over a full stream. An empty stream is a hard error so
/// NaN can never reach the output artifact.
pub fn rms(values: &[f64], stream: &'static str) -> Result<f64, PipelineError> {
    if values.is_empty() {
        return Err(PipelineError::EmptyStream(stream));
    }
    let sum_of_squares: f64 = values.iter().map(|v| v * v).sum();
    Ok((sum_of_squares / values.len() as f64).sqrt())
}

/// Arithmetic mean over a full stream; same empty-stream policy as [`rms`].
pub fn mean(values: &[f64], stream: &'static str) -> Result<f64, PipelineError> {
    if values.is_empty() {
        return Err(PipelineError::EmptyStream(stream));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Reduce the five sensor streams and the interval table to one feature
/// record. The label feature is segment-level: its values come straight from
/// the sanitized interval table, not from the row-expanded labels.
pub fn aggregate(
    streams: &SensorStreams,
    intervals: &[ActivityInterval],
) -> Result<SubjectFeatures, PipelineError> {
    Ok(SubjectFeatures {
        acc_x_rms: rms(&streams.acc_x, "accX")?,
        acc_y_rms: rms(&streams.acc_y, "accY")?,
        acc_z_rms: rms(&streams.acc_z, "accZ")?,
        heart_rate_mean: mean(&streams.heart_rate, "heart_rate")?,
        eda_mean: mean(&streams.eda, "eda")?,
        bvp_mean: mean(&streams.bvp, "bvp")?,
        temperature_mean: mean(&streams.temperature, "temperature")?,
        activity_labels: intervals.iter().map(|i| i.label.clone()).collect(),
    })
}
