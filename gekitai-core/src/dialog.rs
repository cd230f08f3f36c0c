//! Dialog serializer: at most one modal on screen at a time.
//!
//! The content thread that asked for a dialog blocks on a single-slot
//! rendezvous ([`DialogTicket::wait`]). The coordinator fulfils it when the user
//! presses a button; it never blocks itself.

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, warn};

use crate::error::{CapabilityError, CapabilityResult};
use crate::locale::{Locales, StringId};
use crate::platform::{DialogOrigin, DialogPresenter, DialogSpec};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt { default: Option<String> },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DialogRequest {
    pub kind: DialogKind,
    pub message: String,
}

/// What the blocked content caller receives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogOutcome {
    /// Alert dismissed with OK.
    Acknowledged,
    /// Confirm answered with OK.
    Confirmed,
    /// Confirm or prompt answered with Cancel.
    Cancelled,
    /// Prompt answered with OK and the edited text.
    Text(String),
}

/// Which button the user pressed, as reported by the platform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogResponse {
    Positive { input: Option<String> },
    Negative,
}

pub type DialogReply = Sender<CapabilityResult<DialogOutcome>>;

/// The content side of the rendezvous.
pub struct DialogTicket {
    rx: Receiver<CapabilityResult<DialogOutcome>>,
}

impl DialogTicket {
    /// Block until the dialog is resolved. If the host goes away first the
    /// caller gets `Disposed`.
    pub fn wait(self) -> CapabilityResult<DialogOutcome> {
        self.rx.recv().unwrap_or(Err(CapabilityError::Disposed))
    }
}

/// Create a single-slot rendezvous.
pub fn rendezvous() -> (DialogReply, DialogTicket) {
    let (tx, rx) = bounded(1);
    (tx, DialogTicket { rx })
}

enum PendingDialog {
    Content { kind: DialogKind, reply: DialogReply },
    /// Permission rationale; cleared by [`DialogSerializer::finish_rationale`].
    Rationale,
}

pub struct DialogSerializer {
    presenter: Box<dyn DialogPresenter>,
    pending: Option<PendingDialog>,
}

impl DialogSerializer {
    pub fn new(presenter: Box<dyn DialogPresenter>) -> Self {
        Self {
            presenter,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Present a content dialog, or answer `DialogBusy` if one is already up.
    pub fn present(
        &mut self,
        request: DialogRequest,
        reply: DialogReply,
        locales: &mut Locales,
    ) -> CapabilityResult<()> {
        if self.pending.is_some() {
            warn!(kind = ?request.kind, "dialog requested while another is pending");
            let _ = reply.send(Err(CapabilityError::DialogBusy));
            return Err(CapabilityError::DialogBusy);
        }

        if matches!(request.kind, DialogKind::Prompt { .. }) {
            // The cached context may predate a locale switch made by content.
            locales.invalidate();
        }

        let negative_label = match request.kind {
            DialogKind::Alert => None,
            DialogKind::Confirm | DialogKind::Prompt { .. } => Some(locales.get(StringId::Cancel)),
        };
        let input = match &request.kind {
            DialogKind::Prompt { default } => Some(default.clone().unwrap_or_default()),
            _ => None,
        };
        let spec = DialogSpec {
            origin: DialogOrigin::Content,
            title: locales.get(StringId::AppName),
            message: request.message,
            positive_label: locales.get(StringId::Ok),
            negative_label,
            input,
            cancelable: false,
        };

        debug!(kind = ?request.kind, "presenting dialog");
        self.presenter.present(spec);
        self.pending = Some(PendingDialog::Content {
            kind: request.kind,
            reply,
        });
        Ok(())
    }

    /// Present the permission rationale with a single OK button. It takes the
    /// same slot as content dialogs, so it is refused while one is up.
    pub fn present_rationale(
        &mut self,
        title: String,
        message: String,
        ok_label: String,
    ) -> CapabilityResult<()> {
        if self.pending.is_some() {
            debug!("rationale deferred: a dialog is already up");
            return Err(CapabilityError::DialogBusy);
        }
        self.presenter.present(DialogSpec {
            origin: DialogOrigin::Rationale,
            title,
            message,
            positive_label: ok_label,
            negative_label: None,
            input: None,
            cancelable: false,
        });
        self.pending = Some(PendingDialog::Rationale);
        Ok(())
    }

    /// The rationale's OK button was pressed. Returns `false` if no rationale was up.
    pub fn finish_rationale(&mut self) -> bool {
        match self.pending {
            Some(PendingDialog::Rationale) => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Fulfil the pending rendezvous. Returns the outcome that was delivered.
    pub fn resolve(&mut self, response: DialogResponse) -> Option<DialogOutcome> {
        let (kind, reply) = match self.pending.take() {
            Some(PendingDialog::Content { kind, reply }) => (kind, reply),
            Some(PendingDialog::Rationale) => {
                warn!("dialog response while the rationale is up");
                self.pending = Some(PendingDialog::Rationale);
                return None;
            }
            None => {
                warn!("dialog response with no pending dialog");
                return None;
            }
        };

        let outcome = match (kind, response) {
            (DialogKind::Alert, _) => DialogOutcome::Acknowledged,
            (DialogKind::Confirm, DialogResponse::Positive { .. }) => DialogOutcome::Confirmed,
            (DialogKind::Prompt { default }, DialogResponse::Positive { input }) => {
                DialogOutcome::Text(input.or(default).unwrap_or_default())
            }
            (_, DialogResponse::Negative) => DialogOutcome::Cancelled,
        };

        // The caller may have gone away; nothing to do then.
        let _ = reply.send(Ok(outcome.clone()));
        Some(outcome)
    }

    /// Tear down whatever is on screen; a blocked content caller unblocks
    /// with `Disposed`.
    pub fn abandon(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.presenter.dismiss();
        if let PendingDialog::Content { reply, .. } = pending {
            let _ = reply.send(Err(CapabilityError::Disposed));
        }
    }
}
