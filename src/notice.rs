// User notices
// Blocking messages shown to the user after an action completes or is refused

use std::fmt;

/// A message that blocks input until the user dismisses it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SavedToGallery,
    SaveFailed,
    CaptureFailed,
    CaptureUnavailable,
    SaveUnavailable,
}

impl Notice {
    /// Exact text shown to the user
    pub fn message(self) -> &'static str {
        match self {
            Notice::SavedToGallery => "Image successfully saved to gallery!",
            Notice::SaveFailed => "Saving the image failed!",
            Notice::CaptureFailed => "Error drawing image",
            Notice::CaptureUnavailable => {
                "Taking a photo is only available when running the app on a mobile device."
            }
            Notice::SaveUnavailable => {
                "Save to Gallery is only available when running the app on a mobile device."
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
