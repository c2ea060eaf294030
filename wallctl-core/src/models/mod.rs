//! Domain values with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod names;
pub mod device;
pub mod labels;
pub mod search;
pub mod pagination;

pub use validation::ValidationError;
pub use names::{CollectionName, Email, Password, Username, WallpaperName};
pub use device::{Device, Orientation, Resolution};
pub use labels::{LabelKind, LabelList};
pub use search::{fold_case, DeviceFilter, SearchTerms};
pub use pagination::{Paginated, Pagination, WALLPAPERS_PER_PAGE};
