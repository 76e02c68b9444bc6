/// Haptic cues mirrored from the hosting platform's feedback API.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Haptic {
    LightImpact,
    MediumImpact,
    Success,
    Error,
}

/// Host-provided capabilities the game core depends on. Injected explicitly
/// so sessions stay testable with a recording substitute.
pub trait Platform {
    /// Fire a haptic feedback pulse.
    fn haptic(&self, feedback: Haptic);

    /// Show a blocking notice to the player.
    fn alert(&self, message: &str);

    /// Send an opaque payload over the platform's bot channel.
    fn send_data(&self, payload: &str);
}

/// Capability provider that swallows everything, for headless use.
pub struct NullPlatform;

impl Platform for NullPlatform {
    fn haptic(&self, _feedback: Haptic) {}

    fn alert(&self, _message: &str) {}

    fn send_data(&self, _payload: &str) {}
}
