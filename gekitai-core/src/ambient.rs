//! Ambient overrides: screen brightness and media volume.
//!
//! Both are a single scalar forced away from the system value and later put
//! back. The saved value is taken once per active period and restored once.

use tracing::debug;

use crate::platform::AmbientChannel;
use crate::request::BrightnessLevel;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OverrideTarget {
    Max,
    Value(i32),
}

pub struct AmbientOverride {
    name: &'static str,
    channel: Box<dyn AmbientChannel>,
    saved_system_value: Option<i32>,
    override_active: bool,
}

impl AmbientOverride {
    pub fn new(name: &'static str, channel: Box<dyn AmbientChannel>) -> Self {
        Self {
            name,
            channel,
            saved_system_value: None,
            override_active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.override_active
    }

    pub fn saved_system_value(&self) -> Option<i32> {
        self.saved_system_value
    }

    /// Force the channel to `target`. The system value is saved only when the
    /// override becomes active.
    pub fn activate(&mut self, target: OverrideTarget) {
        if !self.override_active {
            self.saved_system_value = Some(self.channel.read());
            self.override_active = true;
            debug!(channel = self.name, saved = ?self.saved_system_value, "override activated");
        }
        let value = match target {
            OverrideTarget::Max => self.channel.maximum(),
            OverrideTarget::Value(v) => v,
        };
        self.channel.write(value);
    }

    /// Put the saved system value back. Returns `true` if a restore happened.
    pub fn restore(&mut self) -> bool {
        if !self.override_active {
            return false;
        }
        if let Some(saved) = self.saved_system_value {
            self.channel.write(saved);
        }
        self.saved_system_value = None;
        self.override_active = false;
        debug!(channel = self.name, "override restored");
        true
    }
}

/// Brightness recognises two levels: full override, or none.
pub struct BrightnessOverride {
    inner: AmbientOverride,
    level: BrightnessLevel,
}

impl BrightnessOverride {
    pub fn new(channel: Box<dyn AmbientChannel>) -> Self {
        Self {
            inner: AmbientOverride::new("brightness", channel),
            level: BrightnessLevel::Normal,
        }
    }

    pub fn level(&self) -> BrightnessLevel {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn set(&mut self, level: BrightnessLevel) {
        self.level = level;
        self.apply();
    }

    /// Re-apply the last requested level (used on resume).
    pub fn apply(&mut self) {
        match self.level {
            BrightnessLevel::Brighter => self.inner.activate(OverrideTarget::Max),
            BrightnessLevel::Normal => {
                self.inner.restore();
            }
        }
    }

    /// Back to the system default; the requested level is kept for resume.
    pub fn restore(&mut self) -> bool {
        self.inner.restore()
    }
}

/// Media stream volume pinned to its maximum while an alarm sounds.
pub struct VolumeOverride {
    inner: AmbientOverride,
}

impl VolumeOverride {
    pub fn new(channel: Box<dyn AmbientChannel>) -> Self {
        Self {
            inner: AmbientOverride::new("volume", channel),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn maximize(&mut self) {
        self.inner.activate(OverrideTarget::Max);
    }

    pub fn restore(&mut self) -> bool {
        self.inner.restore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FakeChannel {
        value: Arc<Mutex<i32>>,
        writes: Arc<Mutex<Vec<i32>>>,
        max: i32,
    }

    impl AmbientChannel for FakeChannel {
        fn read(&self) -> i32 {
            *self.value.lock().unwrap()
        }
        fn write(&mut self, value: i32) {
            *self.value.lock().unwrap() = value;
            self.writes.lock().unwrap().push(value);
        }
        fn maximum(&self) -> i32 {
            self.max
        }
    }

    type Writes = Arc<Mutex<Vec<i32>>>;

    fn channel(initial: i32, max: i32) -> (Box<FakeChannel>, Arc<Mutex<i32>>, Writes) {
        let value = Arc::new(Mutex::new(initial));
        let writes = Arc::new(Mutex::new(Vec::new()));
        let fake = Box::new(FakeChannel {
            value: Arc::clone(&value),
            writes: Arc::clone(&writes),
            max,
        });
        (fake, value, writes)
    }

    #[test]
    fn second_activation_does_not_resave() {
        let (fake, value, _) = channel(4, 15);
        let mut ov = AmbientOverride::new("test", fake);

        ov.activate(OverrideTarget::Max);
        assert_eq!(ov.saved_system_value(), Some(4));
        ov.activate(OverrideTarget::Max);
        assert_eq!(ov.saved_system_value(), Some(4));
        assert_eq!(*value.lock().unwrap(), 15);

        assert!(ov.restore());
        assert_eq!(*value.lock().unwrap(), 4);
    }

    #[test]
    fn restore_happens_exactly_once() {
        let (fake, _, writes) = channel(7, 15);
        let mut ov = AmbientOverride::new("test", fake);
        ov.activate(OverrideTarget::Value(10));

        assert!(ov.restore());
        assert!(!ov.restore());
        assert_eq!(*writes.lock().unwrap(), vec![10, 7]);
        assert_eq!(ov.saved_system_value(), None);
        assert!(!ov.is_active());
    }

    #[test]
    fn restore_while_inactive_is_a_noop() {
        let (fake, _, writes) = channel(3, 15);
        let mut ov = AmbientOverride::new("test", fake);
        assert!(!ov.restore());
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn brightness_normal_clears_the_override() {
        let (fake, value, _) = channel(-1, 255);
        let mut brightness = BrightnessOverride::new(fake);

        brightness.set(BrightnessLevel::Brighter);
        assert!(brightness.is_active());
        assert_eq!(*value.lock().unwrap(), 255);

        brightness.set(BrightnessLevel::Normal);
        assert!(!brightness.is_active());
        assert_eq!(*value.lock().unwrap(), -1);
    }

    #[test]
    fn brightness_restore_keeps_level_for_reapply() {
        let (fake, value, _) = channel(-1, 255);
        let mut brightness = BrightnessOverride::new(fake);
        brightness.set(BrightnessLevel::Brighter);

        assert!(brightness.restore());
        assert_eq!(*value.lock().unwrap(), -1);
        assert_eq!(brightness.level(), BrightnessLevel::Brighter);

        brightness.apply();
        assert_eq!(*value.lock().unwrap(), 255);
    }

    #[test]
    fn volume_maximize_pins_to_stream_max() {
        let (fake, value, _) = channel(5, 15);
        let mut volume = VolumeOverride::new(fake);
        volume.maximize();
        assert_eq!(*value.lock().unwrap(), 15);
        volume.maximize();
        assert!(volume.restore());
        assert_eq!(*value.lock().unwrap(), 5);
    }
}
