pub mod legend;
pub mod notification;
#[cfg(feature = "egui")]
pub mod panels;
pub mod popup;
pub mod status;

pub use legend::{Legend, LegendEntry};
pub use notification::{Notification, NotificationKind, Notifier};
pub use popup::{FeatureBlock, Popup, PopupContent, PopupId};
pub use status::{scale_denominator, MapStatus};
