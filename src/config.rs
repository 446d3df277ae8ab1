// Imports from other crates
use serde::Deserialize;

// Modules
pub mod directories;

/// Parameters controlling how a gesture stroke is sampled and recognized,
/// and how gesture input events are distinguished from fast typing events.
/// Lengths are expressed in key widths and speeds in key widths per second;
/// they get scaled to pixels once the keyboard geometry is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionParams {
    /// Static threshold for gesture detection after fast typing (msec).
    pub static_time_threshold_after_fast_typing: i32,
    /// Speed a pointer has to reach before a gesture may start (keyWidth/sec).
    pub detect_fast_move_speed_threshold: f32,
    /// How long the dynamic thresholds take to decay back to their resting
    /// values after fast typing (msec).
    pub dynamic_threshold_decay_duration: i32,
    /// Time based dynamic threshold values (msec).
    pub dynamic_time_threshold_from: i32,
    pub dynamic_time_threshold_to: i32,
    /// Distance based dynamic threshold values (keyWidth).
    pub dynamic_distance_threshold_from: f32,
    pub dynamic_distance_threshold_to: f32,
    /// Minimum distance between two kept samples (keyWidth).
    pub sampling_minimum_distance: f32,
    /// Minimum time between two decoder invocations (msec).
    pub recognition_minimum_time: i32,
    /// Below this speed a sample counts as confidently on a key (keyWidth/sec).
    pub recognition_speed_threshold: f32,
}

impl Default for RecognitionParams {
    fn default() -> RecognitionParams {
        RecognitionParams {
            static_time_threshold_after_fast_typing: 350,
            detect_fast_move_speed_threshold: 1.5,
            dynamic_threshold_decay_duration: 450,
            dynamic_time_threshold_from: 300,
            dynamic_time_threshold_to: 20,
            dynamic_distance_threshold_from: 6.0,
            dynamic_distance_threshold_to: 0.35,
            sampling_minimum_distance: 1.0 / 6.0,
            recognition_minimum_time: 100,
            recognition_speed_threshold: 5.5,
        }
    }
}

/// Parameters controlling how a gesture trail is sampled and interpolated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailParams {
    /// Minimum distance between two sampled trail points (pixel).
    pub min_sampling_distance: f64,
    /// Curve angle above which an interpolated span gets subdivided (radian).
    pub max_interpolation_angular_threshold: f64,
    /// Span length above which an interpolated span gets subdivided (pixel).
    pub max_interpolation_distance_threshold: f64,
    /// Upper bound of subdivisions per span.
    pub max_interpolation_segments: usize,
}

impl Default for TrailParams {
    fn default() -> TrailParams {
        TrailParams {
            min_sampling_distance: 0.0,
            max_interpolation_angular_threshold: 15.0_f64.to_radians(),
            max_interpolation_distance_threshold: 0.0,
            max_interpolation_segments: 4,
        }
    }
}

/// The tunable parameters of the typing recognition core, loaded once at
/// startup and shared read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Params {
    pub recognition: RecognitionParams,
    pub trail: TrailParams,
}

// Every field of the YAML file is optional. Unspecified fields keep their
// default value, just like unspecified keys of a layout description.
#[derive(Debug, Default, Deserialize)]
struct ParamsDeserialized {
    recognition: Option<RecognitionDeserialized>,
    trail: Option<TrailDeserialized>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognitionDeserialized {
    static_time_threshold_after_fast_typing: Option<i32>,
    detect_fast_move_speed_threshold: Option<f32>,
    dynamic_threshold_decay_duration: Option<i32>,
    dynamic_time_threshold_from: Option<i32>,
    dynamic_time_threshold_to: Option<i32>,
    dynamic_distance_threshold_from: Option<f32>,
    dynamic_distance_threshold_to: Option<f32>,
    sampling_minimum_distance: Option<f32>,
    recognition_minimum_time: Option<i32>,
    recognition_speed_threshold: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct TrailDeserialized {
    min_sampling_distance: Option<f64>,
    max_interpolation_angular_degree: Option<i32>,
    max_interpolation_distance_threshold: Option<f64>,
    max_interpolation_segments: Option<usize>,
}

impl Params {
    /// Load the parameters from the YAML file in the user's home directory.
    /// If the file is missing or malformed, the defaults are used instead;
    /// a broken configuration never takes the keyboard down.
    pub fn load() -> Params {
        if let Some(params_file_abs) = directories::get_absolute_path(directories::PARAMS_FILE_REL)
        {
            return Params::load_from_file(&params_file_abs);
        }
        Params::default()
    }

    /// Load the parameters from the given YAML file, with the same fallback
    /// behavior as [`Params::load`].
    pub fn load_from_file(path: &std::path::Path) -> Params {
        match std::fs::read_to_string(path) {
            Ok(yaml) => Params::from_yaml_str(&yaml),
            Err(err) => {
                info!(
                    "No gesture parameter file at {:?} ({}). Using default parameters",
                    path, err
                );
                Params::default()
            }
        }
    }

    /// Parse parameters from a YAML string, falling back to the defaults if
    /// the document does not deserialize.
    pub fn from_yaml_str(yaml: &str) -> Params {
        match Params::try_from_yaml_str(yaml) {
            Ok(params) => params,
            Err(err) => {
                error!(
                    "Error parsing gesture parameters. Default parameters are used instead. Error description: {}",
                    err
                );
                Params::default()
            }
        }
    }

    fn try_from_yaml_str(yaml: &str) -> Result<Params, serde_yaml::Error> {
        let deserialized: ParamsDeserialized = serde_yaml::from_str(yaml)?;
        let mut params = Params::default();
        if let Some(recognition) = deserialized.recognition {
            merge_recognition(&mut params.recognition, &recognition);
        }
        if let Some(trail) = deserialized.trail {
            merge_trail(&mut params.trail, &trail);
        }
        Ok(params)
    }
}

fn merge_recognition(params: &mut RecognitionParams, overrides: &RecognitionDeserialized) {
    if let Some(value) = overrides.static_time_threshold_after_fast_typing {
        params.static_time_threshold_after_fast_typing = value;
    }
    if let Some(value) = overrides.detect_fast_move_speed_threshold {
        params.detect_fast_move_speed_threshold = value;
    }
    if let Some(value) = overrides.dynamic_threshold_decay_duration {
        params.dynamic_threshold_decay_duration = value;
    }
    if let Some(value) = overrides.dynamic_time_threshold_from {
        params.dynamic_time_threshold_from = value;
    }
    if let Some(value) = overrides.dynamic_time_threshold_to {
        params.dynamic_time_threshold_to = value;
    }
    if let Some(value) = overrides.dynamic_distance_threshold_from {
        params.dynamic_distance_threshold_from = value;
    }
    if let Some(value) = overrides.dynamic_distance_threshold_to {
        params.dynamic_distance_threshold_to = value;
    }
    if let Some(value) = overrides.sampling_minimum_distance {
        params.sampling_minimum_distance = value;
    }
    if let Some(value) = overrides.recognition_minimum_time {
        params.recognition_minimum_time = value;
    }
    if let Some(value) = overrides.recognition_speed_threshold {
        params.recognition_speed_threshold = value;
    }
}

fn merge_trail(params: &mut TrailParams, overrides: &TrailDeserialized) {
    if let Some(value) = overrides.min_sampling_distance {
        params.min_sampling_distance = value;
    }
    if let Some(degree) = overrides.max_interpolation_angular_degree {
        // Non-positive angles would force endless subdivision.
        if degree > 0 {
            params.max_interpolation_angular_threshold = f64::from(degree).to_radians();
        }
    }
    if let Some(value) = overrides.max_interpolation_distance_threshold {
        params.max_interpolation_distance_threshold = value;
    }
    if let Some(value) = overrides.max_interpolation_segments {
        params.max_interpolation_segments = value;
    }
}
