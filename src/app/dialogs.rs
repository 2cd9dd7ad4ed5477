use ratatui::layout::Rect;
use tracing::{debug, warn};

use super::{
    edit_value::{EditOutcome, EditValueDialog},
    input::classify,
    modal::{self, DIALOG_CANCEL, DIALOG_OK, DIALOG_RESIZE, NoticeKind},
    options::DialogOptions,
    screen::Screen,
    select_type,
};
use crate::{
    domain::{ValueItem, ValueKind, ValueStore},
    error::{DialogError, DialogResult},
    form::codec::parse_ulong,
    presentation::Display,
};

/// Entry point for every dialog. Owns the screen and the display stack the
/// dialogs are layered on.
///
/// Each operation takes a `below` rectangle, the surface the dialog is
/// centred over; [`Dialogs::area`] is the whole screen.
pub struct Dialogs<S: Screen> {
    screen: S,
    display: Display,
    options: DialogOptions,
}

impl<S: Screen> Dialogs<S> {
    pub fn new(screen: S) -> Self {
        let display = Display::new(screen.area());
        Self {
            screen,
            display,
            options: DialogOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DialogOptions) -> Self {
        self.options = options;
        self
    }

    /// Layers the dialogs on an existing display stack, e.g. one with a
    /// handle limit.
    pub fn with_display(mut self, display: Display) -> Self {
        self.display = display;
        self
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn options(&self) -> &DialogOptions {
        &self.options
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn into_screen(self) -> S {
        self.screen
    }

    pub fn area(&self) -> Rect {
        self.screen.area()
    }

    /// Shows `message` until an action is chosen and returns its tag:
    /// [`DIALOG_OK`] or, for [`NoticeKind::Confirm`], [`DIALOG_CANCEL`].
    pub fn show_notice(
        &mut self,
        kind: NoticeKind,
        title: &str,
        below: Rect,
        message: &str,
    ) -> DialogResult<i32> {
        self.sync_area();
        let tag = modal::show_notice(
            &mut self.screen,
            &self.display,
            &self.options,
            kind,
            title,
            below,
            message,
        )?;
        self.settle()?;
        Ok(tag)
    }

    /// Asks for a line of text. `None` means the prompt was cancelled.
    pub fn prompt_text(
        &mut self,
        title: &str,
        below: Rect,
        message: &str,
    ) -> DialogResult<Option<String>> {
        self.sync_area();
        let text = modal::prompt_text(
            &mut self.screen,
            &self.display,
            &self.options,
            title,
            below,
            message,
        )?;
        self.settle()?;
        Ok(text)
    }

    /// Lets the user pick the kind of a new value.
    pub fn select_type(&mut self, below: Rect) -> DialogResult<Option<ValueKind>> {
        self.sync_area();
        let kind =
            select_type::select_type(&mut self.screen, &self.display, &self.options, below)?;
        self.settle()?;
        Ok(kind)
    }

    /// Edits `existing`, or creates a new value of `kind` when there is none,
    /// and writes the result to `store` on "Ok".
    ///
    /// A name clash when creating shows a notice and keeps the editor open.
    /// Store failures close the editor and are returned as
    /// [`DialogError::Storage`].
    pub fn edit_value<V>(
        &mut self,
        store: &mut V,
        kind: ValueKind,
        existing: Option<&ValueItem>,
        below: Rect,
    ) -> DialogResult<EditOutcome>
    where
        V: ValueStore + ?Sized,
    {
        self.sync_area();
        let outcome = self.run_editor(store, kind, existing, below);
        self.settle()?;
        outcome
    }

    fn run_editor<V>(
        &mut self,
        store: &mut V,
        kind: ValueKind,
        existing: Option<&ValueItem>,
        below: Rect,
    ) -> DialogResult<EditOutcome>
    where
        V: ValueStore + ?Sized,
    {
        let mut editor =
            EditValueDialog::open(&self.display, &self.options, kind, existing, below)?;
        self.screen.update(&self.display)?;
        loop {
            let key = classify(&self.screen.read_key()?);
            if let Some(tag) = editor.handle_input(key) {
                match tag {
                    DIALOG_OK => match editor.commit(store) {
                        Err(DialogError::NameConflict(name)) => {
                            warn!(%name, "value name already exists");
                            modal::show_notice(
                                &mut self.screen,
                                &self.display,
                                &self.options,
                                NoticeKind::Alert,
                                "Value exists",
                                below,
                                "Value name already exists.",
                            )?;
                        }
                        outcome => return outcome,
                    },
                    DIALOG_CANCEL => {
                        debug!("value edit cancelled");
                        return Ok(EditOutcome::Cancelled);
                    }
                    DIALOG_RESIZE => {
                        let answer = modal::prompt_text(
                            &mut self.screen,
                            &self.display,
                            &self.options,
                            "Resize buffer",
                            below,
                            "Enter new size",
                        )?;
                        if let Some(text) = answer {
                            let requested = parse_ulong(&text, 10);
                            let len = usize::try_from(requested)
                                .unwrap_or(usize::MAX)
                                .min(self.options.max_binary_len);
                            editor.resize_buffer(len);
                        }
                    }
                    _ => {}
                }
                editor.refocus();
            }
            self.screen.update(&self.display)?;
        }
    }

    /// Redraws the stack left behind by a closed dialog, with no cursor.
    fn settle(&mut self) -> DialogResult<()> {
        self.display.set_cursor(None);
        self.screen.update(&self.display)
    }

    fn sync_area(&self) {
        let area = self.screen.area();
        if self.display.area() != area {
            self.display.resize(area);
        }
    }
}
