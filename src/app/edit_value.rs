//! The value editor: a name field, a data widget chosen by the value kind and
//! an action row, with focus moving between them on Tab and Shift+Tab.

use ratatui::layout::Rect;
use regex::Regex;
use tracing::{debug, info, trace, warn};

use super::{input::KeyInput, options::DialogOptions};
use crate::{
    domain::{TypedValue, ValueItem, ValueKind, ValueStore},
    error::{DialogError, DialogResult},
    form::{HexCommand, HexEditor, Staged, TextField, codec},
    presentation::{ChoiceList, Display, OverlayFrame},
};

/// Accepted integer text: decimal digits or `0x` hex, optionally padded
/// with spaces.
pub(crate) const DWORD_PATTERN: &str = "^ *([0-9]+|0[xX][0-9a-fA-F]+) *$";

const BASE_LINES: u16 = 9;
const MULTI_EXTRA_LINES: u16 = 4;
const BINARY_EXTRA_LINES: u16 = 10;
const MULTI_DATA_ROWS: u16 = 5;
const NAME_ROW: u16 = 1;
const DATA_ROW: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Name,
    Data,
    Menu,
}

#[derive(Debug)]
enum DataWidget {
    Text(TextField),
    Bytes(HexEditor),
}

/// How a finished edit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The value was written to the store.
    Saved,
    /// An existing value was confirmed without touching its data.
    Unchanged,
    Cancelled,
}

#[derive(Debug)]
pub(crate) struct EditValueDialog {
    section: Section,
    name: TextField,
    data: DataWidget,
    choices: ChoiceList,
    frame: OverlayFrame,
    kind: ValueKind,
    creating: bool,
}

impl EditValueDialog {
    /// Builds the editor for a new value, or for `existing` with its name
    /// locked and its data pre-filled.
    pub(crate) fn open(
        display: &Display,
        options: &DialogOptions,
        kind: ValueKind,
        existing: Option<&ValueItem>,
        below: Rect,
    ) -> DialogResult<Self> {
        let lines = match kind {
            ValueKind::MultiString => BASE_LINES + MULTI_EXTRA_LINES,
            ValueKind::Binary => BASE_LINES + BINARY_EXTRA_LINES,
            _ => BASE_LINES,
        };
        let columns = options.edit_columns;
        let title = format!("Edit {} value", kind.name());
        let frame = OverlayFrame::create_centered(display, &title, lines, columns, below)?;

        let labels: &[&str] = if kind.is_binary() {
            &["Ok", "Cancel", "Resize"]
        } else {
            &["Ok", "Cancel"]
        };
        let choices =
            ChoiceList::attach(&frame, labels)?.with_mark(options.choice_mark.to_string());

        let field_width = frame
            .content_area()
            .map(|area| area.width.saturating_sub(2))
            .unwrap_or(1)
            .max(1);
        let mut name = TextField::new(&frame, 1, field_width, NAME_ROW, 1)?;
        let data = if kind.is_binary() {
            let initial = match existing {
                Some(item) => item.value.data.clone(),
                None => vec![0; options.default_binary_len],
            };
            let editor = HexEditor::new(
                &frame,
                options.hex_rows,
                options.hex_bytes_per_row,
                DATA_ROW,
                0,
                &initial,
            )?;
            editor.refresh();
            DataWidget::Bytes(editor)
        } else {
            let rows = if kind == ValueKind::MultiString {
                MULTI_DATA_ROWS
            } else {
                1
            };
            let mut field = TextField::new(&frame, rows, field_width, DATA_ROW, 1)?;
            if kind == ValueKind::Dword {
                match Regex::new(DWORD_PATTERN) {
                    Ok(pattern) => field.set_pattern(pattern),
                    Err(err) => warn!(%err, "integer pattern failed to compile"),
                }
            }
            if let Some(item) = existing {
                match codec::decode(kind, &item.value.data) {
                    Ok(Staged::Text(text)) => field.set_text(&text),
                    Ok(Staged::Bytes(_)) => {}
                    Err(err) => warn!(name = %item.name, %err, "stored data could not be decoded"),
                }
            }
            DataWidget::Text(field)
        };

        if let Some(item) = existing {
            name.set_text(&item.name);
            name.set_editable(false);
        }
        frame.write(0, 0, "Name");
        frame.write(DATA_ROW - 1, 0, "Data");

        let dialog = Self {
            section: Section::Name,
            name,
            data,
            choices,
            frame,
            kind,
            creating: existing.is_none(),
        };
        dialog.refocus();
        debug!(
            %kind,
            creating = dialog.creating,
            area = ?dialog.frame.outer_area(),
            "value editor opened"
        );
        Ok(dialog)
    }

    pub(crate) fn section(&self) -> Section {
        self.section
    }

    /// Tab.
    pub(crate) fn section_down(&mut self) {
        let target = match self.section {
            Section::Name if self.name.validate() => Section::Data,
            Section::Data if self.data_validates() => Section::Menu,
            Section::Menu => Section::Name,
            _ => return self.blocked(),
        };
        self.enter(target);
    }

    /// Shift+Tab.
    pub(crate) fn section_up(&mut self) {
        let target = match self.section {
            Section::Name if self.name.validate() => Section::Menu,
            Section::Data if self.data_validates() => Section::Name,
            Section::Menu => Section::Data,
            _ => return self.blocked(),
        };
        self.enter(target);
    }

    /// Routes one key to the focused section. Returns the action tag once
    /// the action row resolves.
    pub(crate) fn handle_input(&mut self, key: KeyInput) -> Option<i32> {
        match key {
            KeyInput::Tab => {
                self.section_down();
                return None;
            }
            KeyInput::BackTab => {
                self.section_up();
                return None;
            }
            _ => {}
        }
        match (self.section, &mut self.data) {
            (Section::Name, _) => {
                self.name.handle_key(key);
            }
            (Section::Data, DataWidget::Text(field)) => {
                field.handle_key(key);
            }
            (Section::Data, DataWidget::Bytes(editor)) => {
                if let Some(command) = HexCommand::from_key(key) {
                    editor.drive(command);
                }
                editor.set_cursor();
            }
            (Section::Menu, _) => {
                let tag = self.choices.drive(key);
                self.choices.focus();
                return tag;
            }
        }
        None
    }

    /// Puts the terminal cursor back into the focused section, e.g. after a
    /// nested dialog closed.
    pub(crate) fn refocus(&self) {
        match (self.section, &self.data) {
            (Section::Name, _) => self.name.focus(),
            (Section::Data, DataWidget::Text(field)) => field.focus(),
            (Section::Data, DataWidget::Bytes(editor)) => editor.set_cursor(),
            (Section::Menu, _) => self.choices.focus(),
        }
    }

    /// Changes the byte buffer's length. Text data is left alone.
    pub(crate) fn resize_buffer(&mut self, len: usize) {
        if let DataWidget::Bytes(editor) = &mut self.data {
            editor.resize(len);
            editor.refresh();
            debug!(len, "byte buffer resized");
        }
    }

    pub(crate) fn staged(&self) -> Staged {
        match &self.data {
            DataWidget::Text(field) => Staged::Text(field.text()),
            DataWidget::Bytes(editor) => Staged::Bytes(editor.current_bytes().to_vec()),
        }
    }

    pub(crate) fn name(&self) -> String {
        codec::trim_spaces(&self.name.text()).to_string()
    }

    /// Encodes the data and writes it under the entered name.
    pub(crate) fn commit<S>(&self, store: &mut S) -> DialogResult<EditOutcome>
    where
        S: ValueStore + ?Sized,
    {
        let name = self.name();
        if let DataWidget::Text(field) = &self.data
            && !self.creating
            && !field.is_changed()
        {
            debug!(%name, "value left unchanged");
            return Ok(EditOutcome::Unchanged);
        }
        if self.creating && store.value_exists(&name) {
            return Err(DialogError::NameConflict(name));
        }
        let data = codec::encode(self.kind, &self.staged())?;
        let len = data.len();
        store
            .set_value(&name, TypedValue::new(self.kind, data))
            .inspect_err(|err| warn!(%name, %err, "store rejected value"))?;
        info!(%name, kind = %self.kind, len, "value saved");
        Ok(EditOutcome::Saved)
    }

    fn data_validates(&self) -> bool {
        match &self.data {
            DataWidget::Text(field) => field.validate(),
            DataWidget::Bytes(_) => true,
        }
    }

    fn blocked(&self) {
        trace!(section = ?self.section, "focus change blocked by validation");
    }

    fn enter(&mut self, target: Section) {
        debug!(from = ?self.section, to = ?target, "section changed");
        self.section = target;
        if target == Section::Menu {
            self.choices.first();
        }
        self.refocus();
    }
}
