use std::fmt;

use zeroize::Zeroizing;

/// An application PIN collected from the user.
///
/// The backing string is zeroized on drop and redacted from debug output;
/// it only ever leaves this wrapper through [`Self::as_str`].
pub struct Pin(Zeroizing<String>);

impl Pin {
    /// Wrap a collected PIN.
    pub fn new(pin: impl Into<String>) -> Self {
        Self(Zeroizing::new(pin.into()))
    }

    /// Borrow the PIN for verification or key protection.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the user submitted an empty PIN.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pin").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_pin() {
        let pin = Pin::new("3141");
        let debug = format!("{pin:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("3141"));
        assert_eq!(pin.as_str(), "3141");
    }
}
