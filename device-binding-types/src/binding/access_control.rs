use bitflags::bitflags;

bitflags! {
    /// Access control applied to a key pair at generation time, describing
    /// what user action must occur before the private key can be used.
    ///
    /// On a simulated or otherwise headless environment the hardware binding
    /// bit is dropped rather than failing key generation; this is a platform
    /// limitation, not an error.
    #[repr(transparent)]
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct AccessControl: u8 {
        /// The currently enrolled biometric set must match. Enrolling a new
        /// biometric invalidates the key.
        const BIOMETRY_CURRENT_SET = 1 << 0;
        /// Any user presence check satisfies the policy, biometry or the
        /// device credential.
        const USER_PRESENCE = 1 << 1;
        /// The key is only usable once an application supplied secret has
        /// been presented.
        const APPLICATION_PASSWORD = 1 << 2;
        /// The private key operations must happen inside dedicated hardware.
        const PRIVATE_KEY_USAGE = 1 << 3;
    }
}

impl AccessControl {
    /// Policy for biometric only gating.
    pub fn biometry_current_set(hardware_backed: bool) -> Self {
        Self::BIOMETRY_CURRENT_SET.hardware(hardware_backed)
    }

    /// Policy for user presence gating, biometry or device credential.
    pub fn user_presence(hardware_backed: bool) -> Self {
        Self::USER_PRESENCE.hardware(hardware_backed)
    }

    /// Policy for application PIN gating.
    pub fn application_password() -> Self {
        Self::APPLICATION_PASSWORD
    }

    fn hardware(self, hardware_backed: bool) -> Self {
        if hardware_backed {
            self | Self::PRIVATE_KEY_USAGE
        } else {
            self
        }
    }
}

impl From<AccessControl> for u8 {
    fn from(src: AccessControl) -> Self {
        src.bits()
    }
}
