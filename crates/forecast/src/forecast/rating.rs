use crate::config::{MapColors, RatingMargins};
use serde::{Deserialize, Serialize};

/// Qualitative rating band for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "Solid D")]
    SolidD,
    #[serde(rename = "Likely D")]
    LikelyD,
    #[serde(rename = "Lean D")]
    LeanD,
    #[serde(rename = "Tilt D")]
    TiltD,
    #[serde(rename = "Solid R")]
    SolidR,
    #[serde(rename = "Likely R")]
    LikelyR,
    #[serde(rename = "Lean R")]
    LeanR,
    #[serde(rename = "Tilt R")]
    TiltR,
    #[serde(rename = "Toss-Up")]
    TossUp,
}

impl Rating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SolidD => "Solid D",
            Self::LikelyD => "Likely D",
            Self::LeanD => "Lean D",
            Self::TiltD => "Tilt D",
            Self::SolidR => "Solid R",
            Self::LikelyR => "Likely R",
            Self::LeanR => "Lean R",
            Self::TiltR => "Tilt R",
            Self::TossUp => "Toss-Up",
        }
    }
}

/// Presentation switches that shape the rating ladder and map coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingOptions {
    pub use_tilt: bool,
    pub use_tossup: bool,
    pub solid_only: bool,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            use_tilt: true,
            use_tossup: true,
            solid_only: false,
        }
    }
}

/// Partial option update. Absent fields keep their current value; an explicit
/// `false` always disables the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOptionsPatch {
    #[serde(default, alias = "tilts")]
    pub use_tilt: Option<bool>,
    #[serde(default, alias = "tossups")]
    pub use_tossup: Option<bool>,
    #[serde(default)]
    pub solid_only: Option<bool>,
}

impl RatingOptionsPatch {
    pub fn is_empty(&self) -> bool {
        self.use_tilt.is_none() && self.use_tossup.is_none() && self.solid_only.is_none()
    }

    pub fn apply(&self, base: RatingOptions) -> RatingOptions {
        RatingOptions {
            use_tilt: self.use_tilt.unwrap_or(base.use_tilt),
            use_tossup: self.use_tossup.unwrap_or(base.use_tossup),
            solid_only: self.solid_only.unwrap_or(base.solid_only),
        }
    }
}

/// Maps a margin (Democratic minus Republican probability) onto a rating.
///
/// The ladder is evaluated top to bottom and the first matching rung wins. The
/// final fallback never yields a toss-up when toss-ups are disabled and the
/// margin is non-zero.
pub fn classify(margin: f64, margins: &RatingMargins, options: RatingOptions) -> Rating {
    let tilts = options.use_tilt;

    if margin >= margins.solid {
        Rating::SolidD
    } else if margin >= margins.likely {
        Rating::LikelyD
    } else if margin >= margins.lean {
        Rating::LeanD
    } else if margin >= margins.tilt && tilts {
        Rating::TiltD
    } else if margin <= -margins.solid {
        Rating::SolidR
    } else if margin <= -margins.likely {
        Rating::LikelyR
    } else if margin <= -margins.lean {
        Rating::LeanR
    } else if margin <= -margins.tilt && tilts {
        Rating::TiltR
    } else if options.use_tossup || margin == 0.0 {
        Rating::TossUp
    } else if margin > 0.0 {
        if tilts {
            Rating::TiltD
        } else {
            Rating::LeanD
        }
    } else if tilts {
        Rating::TiltR
    } else {
        Rating::LeanR
    }
}

/// Map color for a rating. Solid-only mode colors purely by margin sign and
/// ignores the rating.
pub fn color<'a>(
    rating: Rating,
    margin: f64,
    colors: &'a MapColors,
    options: RatingOptions,
) -> &'a str {
    if options.solid_only {
        return if margin > 0.0 {
            &colors.solid_d
        } else if margin < 0.0 {
            &colors.solid_r
        } else {
            &colors.tossup
        };
    }

    match rating {
        Rating::SolidD => &colors.solid_d,
        Rating::LikelyD => &colors.likely_d,
        Rating::LeanD => &colors.lean_d,
        Rating::TiltD => &colors.tilt_d,
        Rating::SolidR => &colors.solid_r,
        Rating::LikelyR => &colors.likely_r,
        Rating::LeanR => &colors.lean_r,
        Rating::TiltR => &colors.tilt_r,
        Rating::TossUp => &colors.tossup,
    }
}
