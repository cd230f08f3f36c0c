//! Runtime permission gate in front of vibration.
//!
//! A request that arrives without the permission is dropped, never queued. The
//! gate starts the prompt flow instead; the user's answer only affects later
//! requests.

use tracing::{info, warn};

use crate::dialog::DialogSerializer;
use crate::error::{CapabilityError, CapabilityResult, Permission};
use crate::locale::{Locales, StringId};
use crate::notify::Notifications;
use crate::platform::PermissionService;
use crate::request::ToastKind;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GateState {
    /// No prompt in flight. The next denied use starts one.
    Idle,
    /// The rationale dialog is up; its OK button issues the platform request.
    RationaleShown,
    /// Waiting for the platform's answer.
    Requested,
}

pub struct PermissionGate {
    permission: Permission,
    service: Box<dyn PermissionService>,
    state: GateState,
}

impl PermissionGate {
    pub fn new(permission: Permission, service: Box<dyn PermissionService>) -> Self {
        Self {
            permission,
            service,
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// `Ok` when the permission is held. Otherwise starts (or keeps waiting on)
    /// the prompt flow and answers `PermissionDenied`.
    pub fn check(
        &mut self,
        dialogs: &mut DialogSerializer,
        locales: &mut Locales,
    ) -> CapabilityResult<()> {
        if self.service.is_granted(self.permission) {
            return Ok(());
        }

        if self.state == GateState::Idle {
            if self.service.should_show_rationale(self.permission) {
                locales.invalidate();
                let shown = dialogs.present_rationale(
                    locales.get(StringId::AppName),
                    locales.get(StringId::NeedsVibration),
                    locales.get(StringId::Ok),
                );
                if shown.is_err() {
                    // Another dialog is up; the next denied use tries again.
                    return Err(CapabilityError::PermissionDenied(self.permission));
                }
                self.state = GateState::RationaleShown;
            } else {
                self.service.request(self.permission);
                self.state = GateState::Requested;
            }
            info!(permission = ?self.permission, state = ?self.state, "permission prompt started");
        }

        Err(CapabilityError::PermissionDenied(self.permission))
    }

    pub fn on_rationale_acknowledged(&mut self) {
        if self.state != GateState::RationaleShown {
            warn!(state = ?self.state, "rationale acknowledged with no rationale shown");
            return;
        }
        self.service.request(self.permission);
        self.state = GateState::Requested;
    }

    /// Platform answer. A denial tells the user and re-arms the prompt.
    pub fn on_result(
        &mut self,
        permission: Permission,
        granted: bool,
        notifications: &mut Notifications,
        locales: &mut Locales,
    ) {
        if permission != self.permission {
            return;
        }
        self.state = GateState::Idle;
        if granted {
            info!(?permission, "permission granted");
        } else {
            warn!(?permission, "permission denied");
            let text = locales.get(StringId::CantUseVibration);
            notifications.toast(&text, ToastKind::Long);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogKind, DialogRequest, DialogResponse, rendezvous};
    use crate::locale::{BuiltinCatalog, Locale};
    use crate::platform::{
        DialogOrigin, DialogPresenter, DialogSpec, NoticeDuration, Notifier, Snackbar,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct World {
        granted: bool,
        rationale: bool,
        requests: usize,
        dialogs: Vec<DialogSpec>,
        toasts: Vec<(String, NoticeDuration)>,
    }

    type Shared = Arc<Mutex<World>>;

    struct Service(Shared);
    impl PermissionService for Service {
        fn is_granted(&self, _: Permission) -> bool {
            self.0.lock().unwrap().granted
        }
        fn should_show_rationale(&self, _: Permission) -> bool {
            self.0.lock().unwrap().rationale
        }
        fn request(&mut self, _: Permission) {
            self.0.lock().unwrap().requests += 1;
        }
    }

    struct Presenter(Shared);
    impl DialogPresenter for Presenter {
        fn present(&mut self, spec: DialogSpec) {
            self.0.lock().unwrap().dialogs.push(spec);
        }
        fn dismiss(&mut self) {}
    }

    struct Toasts(Shared);
    impl Notifier for Toasts {
        fn show_toast(&mut self, text: &str, duration: NoticeDuration) {
            self.0.lock().unwrap().toasts.push((text.to_owned(), duration));
        }
        fn cancel_toast(&mut self) {}
        fn show_snackbar(&mut self, _: Snackbar) {}
        fn dismiss_snackbar(&mut self) {}
    }

    struct Harness {
        gate: PermissionGate,
        dialogs: DialogSerializer,
        notifications: Notifications,
        locales: Locales,
        world: Shared,
    }

    fn harness(granted: bool, rationale: bool) -> Harness {
        let world = Arc::new(Mutex::new(World {
            granted,
            rationale,
            ..World::default()
        }));
        Harness {
            gate: PermissionGate::new(
                Permission::Vibrate,
                Box::new(Service(Arc::clone(&world))),
            ),
            dialogs: DialogSerializer::new(Box::new(Presenter(Arc::clone(&world)))),
            notifications: Notifications::new(Box::new(Toasts(Arc::clone(&world)))),
            locales: Locales::new(Locale::English, Box::new(BuiltinCatalog)),
            world,
        }
    }

    impl Harness {
        fn check(&mut self) -> CapabilityResult<()> {
            self.gate.check(&mut self.dialogs, &mut self.locales)
        }

        fn answer(&mut self, granted: bool) {
            self.world.lock().unwrap().granted = granted;
            self.gate.on_result(
                Permission::Vibrate,
                granted,
                &mut self.notifications,
                &mut self.locales,
            );
        }
    }

    #[test]
    fn granted_passes_straight_through() {
        let mut h = harness(true, false);
        assert_eq!(h.check(), Ok(()));
        assert_eq!(h.world.lock().unwrap().requests, 0);
    }

    #[test]
    fn missing_permission_requests_without_rationale() {
        let mut h = harness(false, false);
        assert_eq!(
            h.check(),
            Err(CapabilityError::PermissionDenied(Permission::Vibrate))
        );
        assert_eq!(h.gate.state(), GateState::Requested);
        assert_eq!(h.world.lock().unwrap().requests, 1);

        // A second use while waiting does not stack another prompt.
        assert!(h.check().is_err());
        assert_eq!(h.world.lock().unwrap().requests, 1);

        h.answer(true);
        assert_eq!(h.check(), Ok(()));
    }

    #[test]
    fn rationale_precedes_the_request() {
        let mut h = harness(false, true);
        assert!(h.check().is_err());
        assert_eq!(h.gate.state(), GateState::RationaleShown);
        {
            let world = h.world.lock().unwrap();
            assert_eq!(world.requests, 0);
            assert_eq!(world.dialogs.len(), 1);
            assert!(!world.dialogs[0].cancelable);
            assert_eq!(world.dialogs[0].negative_label, None);
            assert_eq!(world.dialogs[0].origin, DialogOrigin::Rationale);
        }

        h.gate.on_rationale_acknowledged();
        assert_eq!(h.gate.state(), GateState::Requested);
        assert_eq!(h.world.lock().unwrap().requests, 1);
    }

    #[test]
    fn denial_toasts_and_reprompts_next_time() {
        let mut h = harness(false, false);
        assert!(h.check().is_err());
        h.answer(false);
        assert_eq!(h.gate.state(), GateState::Idle);
        assert_eq!(
            h.world.lock().unwrap().toasts,
            vec![("Vibration is not available.".to_owned(), NoticeDuration::Long)]
        );

        assert!(h.check().is_err());
        assert_eq!(h.world.lock().unwrap().requests, 2);
    }

    #[test]
    fn stray_acknowledgement_is_ignored() {
        let mut h = harness(false, false);
        h.gate.on_rationale_acknowledged();
        assert_eq!(h.gate.state(), GateState::Idle);
        assert_eq!(h.world.lock().unwrap().requests, 0);
    }

    #[test]
    fn rationale_waits_for_the_dialog_slot() {
        let mut h = harness(false, true);
        let (reply, _ticket) = rendezvous();
        h.dialogs
            .present(
                DialogRequest {
                    kind: DialogKind::Confirm,
                    message: "busy".into(),
                },
                reply,
                &mut h.locales,
            )
            .unwrap();

        assert!(h.check().is_err());
        assert_eq!(h.gate.state(), GateState::Idle);
        assert_eq!(h.world.lock().unwrap().dialogs.len(), 1);

        h.dialogs.resolve(DialogResponse::Negative);
        assert!(h.check().is_err());
        assert_eq!(h.gate.state(), GateState::RationaleShown);
        assert_eq!(h.world.lock().unwrap().dialogs.len(), 2);
    }
}
