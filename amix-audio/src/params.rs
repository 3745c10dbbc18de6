//! Physical mix parameters and their domains

use crate::error::{PipelineError, Result};

/// Closed interval a parameter must lie in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    const fn new(name: &'static str, min: f32, max: f32) -> Self {
        Self { name, min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, value: f32) -> Result<f32> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(self.out_of_range(value))
        }
    }

    fn out_of_range(&self, value: f32) -> PipelineError {
        PipelineError::ParameterOutOfRange {
            name: self.name,
            value,
            min: self.min,
            max: self.max,
        }
    }
}

/// How the pipeline treats parameters outside their domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ParamPolicy {
    /// Clamp silently into range (a warning is logged)
    #[default]
    Clamp,
    /// Fail the call with `ParameterOutOfRange`
    Reject,
}

impl ParamPolicy {
    /// Config / CLI spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamPolicy::Clamp => "clamp",
            ParamPolicy::Reject => "reject",
        }
    }
}

impl std::str::FromStr for ParamPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(ParamPolicy::Clamp),
            "reject" | "strict" => Ok(ParamPolicy::Reject),
            other => Err(format!("unknown parameter policy: {other}")),
        }
    }
}

/// The six already-resolved physical parameters that select stage behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainParams {
    /// Source distance in meters (0.1 - 1000)
    pub distance: f32,
    /// Room size (0.0 - 1.0)
    pub room_size: f32,
    /// Brightness (-1.0 dark - 1.0 bright)
    pub brightness: f32,
    /// Stereo width (0.0 mono - 2.0 exaggerated)
    pub width: f32,
    /// Dry/wet reverb mix (0.0 - 1.0)
    pub dry_wet: f32,
    /// Reverb intensity (0.0 - 1.0)
    pub intensity: f32,
}

impl Default for MainParams {
    fn default() -> Self {
        Self {
            distance: 10.0,
            room_size: 0.5,
            brightness: 0.0,
            width: 1.0,
            dry_wet: 0.5,
            intensity: 0.5,
        }
    }
}

impl MainParams {
    pub const DISTANCE: ParamRange = ParamRange::new("distance", 0.1, 1000.0);
    pub const ROOM_SIZE: ParamRange = ParamRange::new("room_size", 0.0, 1.0);
    pub const BRIGHTNESS: ParamRange = ParamRange::new("brightness", -1.0, 1.0);
    pub const WIDTH: ParamRange = ParamRange::new("width", 0.0, 2.0);
    pub const DRY_WET: ParamRange = ParamRange::new("dry_wet", 0.0, 1.0);
    pub const INTENSITY: ParamRange = ParamRange::new("intensity", 0.0, 1.0);

    /// Close, flat, dry: only attenuation at 1 m and the limiter act
    pub fn neutral() -> Self {
        Self {
            distance: 1.0,
            room_size: 0.0,
            brightness: 0.0,
            width: 1.0,
            dry_wet: 0.0,
            intensity: 0.0,
        }
    }

    /// Each parameter paired with its domain, in declaration order
    pub fn fields(&self) -> [(ParamRange, f32); 6] {
        [
            (Self::DISTANCE, self.distance),
            (Self::ROOM_SIZE, self.room_size),
            (Self::BRIGHTNESS, self.brightness),
            (Self::WIDTH, self.width),
            (Self::DRY_WET, self.dry_wet),
            (Self::INTENSITY, self.intensity),
        ]
    }

    /// Fail on the first parameter outside its domain
    pub fn validate(&self) -> Result<()> {
        for (range, value) in self.fields() {
            range.check(value)?;
        }
        Ok(())
    }

    /// Clamp every parameter into its domain. NaN is left as is.
    pub fn clamped(&self) -> Self {
        let clamp = |range: ParamRange, value: f32| value.clamp(range.min, range.max);
        Self {
            distance: clamp(Self::DISTANCE, self.distance),
            room_size: clamp(Self::ROOM_SIZE, self.room_size),
            brightness: clamp(Self::BRIGHTNESS, self.brightness),
            width: clamp(Self::WIDTH, self.width),
            dry_wet: clamp(Self::DRY_WET, self.dry_wet),
            intensity: clamp(Self::INTENSITY, self.intensity),
        }
    }

    /// Produce in-domain parameters according to `policy`
    ///
    /// Non-finite values are rejected under both policies since they have
    /// no meaningful clamp.
    pub fn resolve(&self, policy: ParamPolicy) -> Result<Self> {
        for (range, value) in self.fields() {
            if !value.is_finite() {
                return Err(range.out_of_range(value));
            }
        }

        match policy {
            ParamPolicy::Reject => {
                self.validate()?;
                Ok(*self)
            }
            ParamPolicy::Clamp => {
                let clamped = self.clamped();
                for ((range, before), (_, after)) in self.fields().into_iter().zip(clamped.fields())
                {
                    if before != after {
                        tracing::warn!(
                            "Clamped {} from {} to {} (domain [{}, {}])",
                            range.name,
                            before,
                            after,
                            range.min,
                            range.max
                        );
                    }
                }
                Ok(clamped)
            }
        }
    }
}
