//! Toasts and snackbars. At most one of each is on screen.

use tracing::debug;

use crate::locale::{Locales, StringId};
use crate::platform::{NoticeDuration, Notifier, Snackbar};
use crate::request::{SnackKind, ToastKind};

pub struct Notifications {
    notifier: Box<dyn Notifier>,
    toast_shown: bool,
    snackbar_shown: bool,
}

impl Notifications {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            notifier,
            toast_shown: false,
            snackbar_shown: false,
        }
    }

    pub fn toast(&mut self, text: &str, kind: ToastKind) {
        if self.toast_shown {
            self.notifier.cancel_toast();
        }
        let duration = match kind {
            ToastKind::Short => NoticeDuration::Short,
            ToastKind::Long => NoticeDuration::Long,
        };
        debug!(?kind, "toast");
        self.notifier.show_toast(text, duration);
        self.toast_shown = true;
    }

    pub fn snackbar(&mut self, text: String, kind: SnackKind, locales: &mut Locales) {
        if self.snackbar_shown {
            self.notifier.dismiss_snackbar();
        }
        let (duration, action_label) = match kind {
            SnackKind::Short => (NoticeDuration::Short, None),
            SnackKind::Long => (NoticeDuration::Long, None),
            SnackKind::ActionOk => (NoticeDuration::Indefinite, Some(locales.get(StringId::Ok))),
        };
        debug!(?kind, "snackbar");
        self.notifier.show_snackbar(Snackbar {
            text,
            duration,
            action_label,
        });
        self.snackbar_shown = true;
    }

    /// Take everything off screen.
    pub fn dismiss_all(&mut self) {
        if self.toast_shown {
            self.notifier.cancel_toast();
            self.toast_shown = false;
        }
        if self.snackbar_shown {
            self.notifier.dismiss_snackbar();
            self.snackbar_shown = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{BuiltinCatalog, Locale};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq)]
    enum Call {
        Toast(String, NoticeDuration),
        CancelToast,
        Snack(Snackbar),
        DismissSnack,
    }

    struct FakeNotifier(Arc<Mutex<Vec<Call>>>);

    impl Notifier for FakeNotifier {
        fn show_toast(&mut self, text: &str, duration: NoticeDuration) {
            self.0.lock().unwrap().push(Call::Toast(text.to_owned(), duration));
        }
        fn cancel_toast(&mut self) {
            self.0.lock().unwrap().push(Call::CancelToast);
        }
        fn show_snackbar(&mut self, snackbar: Snackbar) {
            self.0.lock().unwrap().push(Call::Snack(snackbar));
        }
        fn dismiss_snackbar(&mut self) {
            self.0.lock().unwrap().push(Call::DismissSnack);
        }
    }

    fn setup() -> (Notifications, Locales, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let notifications = Notifications::new(Box::new(FakeNotifier(Arc::clone(&calls))));
        let locales = Locales::new(Locale::Japanese, Box::new(BuiltinCatalog));
        (notifications, locales, calls)
    }

    #[test]
    fn new_toast_replaces_the_previous_one() {
        let (mut n, _, calls) = setup();
        n.toast("a", ToastKind::Short);
        n.toast("b", ToastKind::Long);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                Call::Toast("a".into(), NoticeDuration::Short),
                Call::CancelToast,
                Call::Toast("b".into(), NoticeDuration::Long),
            ]
        );
    }

    #[test]
    fn action_snackbar_is_indefinite_with_localized_ok() {
        let (mut n, mut locales, calls) = setup();
        n.snackbar("saved".into(), SnackKind::ActionOk, &mut locales);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Snack(Snackbar {
                text: "saved".into(),
                duration: NoticeDuration::Indefinite,
                action_label: Some("OK".into()),
            })]
        );
    }

    #[test]
    fn dismiss_all_only_touches_what_is_shown() {
        let (mut n, mut locales, calls) = setup();
        n.dismiss_all();
        assert!(calls.lock().unwrap().is_empty());

        n.snackbar("x".into(), SnackKind::Short, &mut locales);
        n.dismiss_all();
        n.dismiss_all();
        assert_eq!(calls.lock().unwrap().last(), Some(&Call::DismissSnack));
        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}
