//! Target devices and image geometry

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Fixed set of platforms a wallpaper is uploaded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Mobile, Device::Desktop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
        }
    }

    /// Orientation wallpapers for this device are conventionally made in.
    pub fn expected_orientation(&self) -> Orientation {
        match self {
            Device::Mobile => Orientation::Portrait,
            Device::Desktop => Orientation::Landscape,
        }
    }

    /// Warning text when `resolution` does not suit this device.
    ///
    /// Square images suit both.
    pub fn orientation_warning(&self, resolution: Resolution) -> Option<String> {
        let actual = resolution.orientation();
        let expected = self.expected_orientation();
        if actual == Orientation::Square || actual == expected {
            return None;
        }
        Some(format!(
            "{} image ({}) uploaded for {}; {} wallpapers are usually {}",
            actual.as_str(),
            resolution,
            self.as_str(),
            self.as_str(),
            expected.as_str()
        ))
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Device {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mobile" => Ok(Device::Mobile),
            "desktop" => Ok(Device::Desktop),
            _ => Err(ValidationError::InvalidVariant {
                field: "device",
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
            Orientation::Square => "square",
        }
    }
}

/// Pixel dimensions of a decoded image, stored as `"WxH"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn orientation(&self) -> Orientation {
        match self.width.cmp(&self.height) {
            std::cmp::Ordering::Less => Orientation::Portrait,
            std::cmp::Ordering::Greater => Orientation::Landscape,
            std::cmp::Ordering::Equal => Orientation::Square,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = ValidationError::InvalidFormat {
            field: "resolution",
            reason: "expected WIDTHxHEIGHT",
        };
        let (w, h) = s.split_once('x').ok_or_else(|| invalid.clone())?;
        let width = w.parse().map_err(|_| invalid.clone())?;
        let height = h.parse().map_err(|_| invalid)?;
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_names() {
        assert_eq!("mobile".parse::<Device>().unwrap(), Device::Mobile);
        assert_eq!(" Desktop ".parse::<Device>().unwrap(), Device::Desktop);
        assert!(matches!(
            "tablet".parse::<Device>(),
            Err(ValidationError::InvalidVariant { .. })
        ));
    }

    #[test]
    fn orientation_from_dimensions() {
        assert_eq!(Resolution::new(1080, 1920).orientation(), Orientation::Portrait);
        assert_eq!(Resolution::new(1920, 1080).orientation(), Orientation::Landscape);
        assert_eq!(Resolution::new(512, 512).orientation(), Orientation::Square);
    }

    #[test]
    fn warns_only_on_mismatch() {
        let portrait = Resolution::new(1080, 1920);
        let landscape = Resolution::new(1920, 1080);
        let square = Resolution::new(800, 800);

        assert!(Device::Mobile.orientation_warning(portrait).is_none());
        assert!(Device::Desktop.orientation_warning(landscape).is_none());
        assert!(Device::Mobile.orientation_warning(square).is_none());

        let warning = Device::Mobile.orientation_warning(landscape).unwrap();
        assert!(warning.contains("landscape"));
        assert!(warning.contains("1920x1080"));
        assert!(Device::Desktop.orientation_warning(portrait).is_some());
    }

    #[test]
    fn resolution_text_form() {
        let r: Resolution = "1920x1080".parse().unwrap();
        assert_eq!(r, Resolution::new(1920, 1080));
        assert_eq!(r.to_string(), "1920x1080");
        assert!("1920*1080".parse::<Resolution>().is_err());
        assert!("x1080".parse::<Resolution>().is_err());
    }
}
