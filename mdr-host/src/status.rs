//! Mode-change reporting through the host status surface

use mdr_core::ModeNotifier;
use std::cell::RefCell;
use std::rc::Rc;

use crate::host::StatusSurface;
use crate::l10n::Localizer;

/// Context flag observed by the host's command-enablement rules
pub const EDIT_MODE_CONTEXT: &str = "mdr.editMode";

/// Routes state-table notifications to the host: status messages go
/// through the localizer, the edit-mode flag to the named context key.
///
/// The surface is shared with the rest of the host adapter, hence the
/// `Rc<RefCell<..>>`; everything runs on the host's single cooperative
/// thread.
pub struct HostNotifier<S: StatusSurface, L: Localizer> {
    surface: Rc<RefCell<S>>,
    localizer: L,
}

impl<S: StatusSurface, L: Localizer> HostNotifier<S, L> {
    pub fn new(surface: Rc<RefCell<S>>, localizer: L) -> Self {
        Self { surface, localizer }
    }
}

impl<S: StatusSurface, L: Localizer> ModeNotifier for HostNotifier<S, L> {
    fn status_message(&self, message: &str) {
        // The bundled mode messages carry no placeholders
        let localized = self.localizer.localize(message, &[]);
        self.surface.borrow_mut().set_status_message(&localized);
    }

    fn set_edit_context(&self, edit_mode: bool) {
        self.surface
            .borrow_mut()
            .set_context(EDIT_MODE_CONTEXT, edit_mode);
    }
}
